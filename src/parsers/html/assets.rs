//! HTML 静态资源本地化
//!
//! 本模块负责文档中三类上下文里的远程资源引用：
//! - 元素属性（img、SVG image、meta 预览图、样式表/图标 link、script）
//! - `<style>` 块中的 `url()` 引用
//! - 元素 `style` 属性中的 `url()` 引用
//!
//! 下载、去重和路径计算都交给 [`Localizer`]，这里只负责找到引用并写回替换结果。

use markup5ever_rcdom::Handle;
use tracing::info;

use crate::localizer::Localizer;
use crate::parsers::css::{has_css_urls, rewrite_css_urls};
use crate::utils::url::{is_skippable_reference, Url};

use super::dom::{
    find_elements, find_nodes_by_name, get_node_attr, get_node_name, get_text_content,
    set_node_attr, set_text_content,
};
use super::parser::{compose_srcset, parse_link_type, parse_srcset, LinkType};
use super::utils::META_IMAGE_MARKERS;

/// Elements of one kind whose attributes may point at remote assets
struct AssetTarget {
    tag: &'static str,
    attrs: &'static [&'static str],
    applies: fn(&Handle) -> bool,
}

/// Processed in this order, one element kind after another
const ASSET_TARGETS: &[AssetTarget] = &[
    AssetTarget {
        tag: "img",
        attrs: &["src"],
        applies: any_element,
    },
    // SVG images, `xlink:href` shares the local name with `href`
    AssetTarget {
        tag: "image",
        attrs: &["href", "src"],
        applies: any_element,
    },
    AssetTarget {
        tag: "meta",
        attrs: &["content"],
        applies: is_image_meta,
    },
    AssetTarget {
        tag: "link",
        attrs: &["href"],
        applies: is_asset_link,
    },
    AssetTarget {
        tag: "script",
        attrs: &["src"],
        applies: any_element,
    },
];

/// Elements carrying responsive image candidates
const SRCSET_ELEMENTS: &[&str] = &["img", "source"];

fn any_element(_node: &Handle) -> bool {
    true
}

fn is_image_meta(node: &Handle) -> bool {
    META_IMAGE_MARKERS.iter().any(|(attr_name, attr_value)| {
        get_node_attr(node, attr_name).is_some_and(|value| value.eq_ignore_ascii_case(attr_value))
    })
}

fn is_asset_link(node: &Handle) -> bool {
    let rel: String = get_node_attr(node, "rel").unwrap_or_default();

    parse_link_type(&rel).iter().any(|link_type| {
        matches!(
            link_type,
            LinkType::Stylesheet | LinkType::Favicon | LinkType::AppleTouchIcon | LinkType::Preload
        )
    })
}

/// Localizes assets referenced by element attributes
///
/// Returns the number of attribute values which were rewritten.
pub fn localize_attributes(document: &Handle, base_url: &Url, localizer: &mut Localizer) -> usize {
    info!("  Downloading external resources...");

    let mut rewritten: usize = 0;

    for target in ASSET_TARGETS {
        let elements = find_elements(document, &|node: &Handle| {
            get_node_name(node) == Some(target.tag) && (target.applies)(node)
        });

        for element in elements {
            for attr_name in target.attrs {
                let Some(attr_value) = get_node_attr(&element, attr_name) else {
                    continue;
                };

                if is_skippable_reference(&attr_value) {
                    continue;
                }

                if let Some(local) = localizer.localize(base_url, &attr_value) {
                    set_node_attr(&element, attr_name, Some(local));
                    rewritten += 1;
                }
            }
        }
    }

    for tag in SRCSET_ELEMENTS {
        for element in find_nodes_by_name(document, tag) {
            if localize_srcset(&element, base_url, localizer) {
                rewritten += 1;
            }
        }
    }

    rewritten
}

fn localize_srcset(node: &Handle, base_url: &Url, localizer: &mut Localizer) -> bool {
    let Some(srcset) = get_node_attr(node, "srcset") else {
        return false;
    };

    let mut changed = false;
    let items: Vec<(String, &str)> = parse_srcset(&srcset)
        .into_iter()
        .map(|item| {
            let local = if is_skippable_reference(item.path) {
                None
            } else {
                localizer.localize(base_url, item.path)
            };

            match local {
                Some(local) => {
                    changed = true;
                    (local, item.descriptor)
                }
                None => (item.path.to_string(), item.descriptor),
            }
        })
        .collect();

    if changed {
        set_node_attr(node, "srcset", Some(compose_srcset(&items)));
    }

    changed
}

/// Localizes `url()` references found within `<style>` blocks
///
/// Returns the number of blocks which were rewritten.
pub fn localize_style_blocks(document: &Handle, base_url: &Url, localizer: &mut Localizer) -> usize {
    info!("  Processing inline CSS for embedded resources...");

    let mut rewritten: usize = 0;

    for style in find_nodes_by_name(document, "style") {
        let css: String = get_text_content(&style);

        if !has_css_urls(&css) {
            continue;
        }

        let localized: String =
            rewrite_css_urls(&css, |reference| localizer.localize(base_url, reference));

        if localized != css {
            set_text_content(&style, &localized);
            rewritten += 1;
        }
    }

    rewritten
}

/// Localizes `url()` references found within `style` attributes
///
/// Returns the number of attributes which were rewritten.
pub fn localize_style_attributes(
    document: &Handle,
    base_url: &Url,
    localizer: &mut Localizer,
) -> usize {
    info!("  Processing inline style attributes for background images...");

    let mut rewritten: usize = 0;
    let styled = find_elements(document, &|node: &Handle| {
        get_node_attr(node, "style").is_some_and(|style| has_css_urls(&style))
    });

    for element in styled {
        let Some(style) = get_node_attr(&element, "style") else {
            continue;
        };

        let localized: String =
            rewrite_css_urls(&style, |reference| localizer.localize(base_url, reference));

        if localized != style {
            set_node_attr(&element, "style", Some(localized));
            rewritten += 1;
        }
    }

    rewritten
}
