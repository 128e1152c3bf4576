//! 文档净化模块
//!
//! 移除所有脚本元素，并把超链接的跳转目标统一替换为固定值，
//! 使生成的快照既不能执行代码也不能导航到其他页面。

use markup5ever_rcdom::Handle;
use tracing::debug;

use crate::parsers::html::dom::{find_elements, get_node_attr, get_node_name, remove_node, set_node_attr};
use crate::parsers::html::utils::{HYPERLINK_ELEMENTS, SCRIPT_ELEMENTS, TRACKING_ATTRIBUTES};

/// What the sanitizer changed within one document
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub scripts_removed: usize,
    pub links_rewritten: usize,
}

/// 净化文档
///
/// # Arguments
///
/// * `document` - DOM树的根节点
/// * `link_replacement` - 所有超链接 `href` 的替换值
pub fn sanitize(document: &Handle, link_replacement: &str) -> SanitizeReport {
    let mut report = SanitizeReport::default();

    let scripts = find_elements(document, &|node: &Handle| {
        get_node_name(node).is_some_and(|name| SCRIPT_ELEMENTS.contains(&name))
    });

    for script in scripts {
        remove_node(&script);
        report.scripts_removed += 1;
    }

    let hyperlinks = find_elements(document, &|node: &Handle| {
        get_node_name(node).is_some_and(|name| HYPERLINK_ELEMENTS.contains(&name))
            && get_node_attr(node, "href").is_some()
    });

    for hyperlink in hyperlinks {
        set_node_attr(&hyperlink, "href", Some(link_replacement.to_string()));

        for attr_name in TRACKING_ATTRIBUTES {
            set_node_attr(&hyperlink, attr_name, None);
        }

        report.links_rewritten += 1;
    }

    debug!(
        "Removed {} scripts, neutralized {} links",
        report.scripts_removed, report.links_rewritten
    );

    report
}
