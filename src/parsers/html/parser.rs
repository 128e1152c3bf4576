//! HTML 属性值解析
//!
//! - **链接类型解析**: 解析 `<link>` 元素的 `rel` 属性，判断是否需要本地化
//! - **SrcSet解析**: 解析 `srcset` 属性，逐个本地化其中的图片

use super::utils::{is_favicon, WHITESPACES};

/// `<link>` relations whose targets get localized
#[derive(Debug, PartialEq, Eq)]
pub enum LinkType {
    /// Apple设备触摸图标
    AppleTouchIcon,
    /// 网站图标
    Favicon,
    /// 预加载资源
    Preload,
    /// CSS样式表
    Stylesheet,
}

/// SrcSet 属性中的单个图片
pub struct SrcSetItem<'a> {
    pub path: &'a str,
    /// 宽度描述符（如 "480w"）或像素密度描述符（如 "2x"），可能为空
    pub descriptor: &'a str,
}

/// 解析 `rel` 属性值，不区分大小写，忽略不关心的类型
pub fn parse_link_type(link_attr_rel_value: &str) -> Vec<LinkType> {
    let mut types: Vec<LinkType> = vec![];

    for link_attr_rel_type in link_attr_rel_value.split_whitespace() {
        if link_attr_rel_type.eq_ignore_ascii_case("preload") {
            types.push(LinkType::Preload);
        } else if link_attr_rel_type.eq_ignore_ascii_case("stylesheet") {
            types.push(LinkType::Stylesheet);
        } else if is_favicon(link_attr_rel_type) {
            types.push(LinkType::Favicon);
        } else if link_attr_rel_type.eq_ignore_ascii_case("apple-touch-icon") {
            types.push(LinkType::AppleTouchIcon);
        }
    }

    types
}

/// 解析 `srcset` 属性
pub fn parse_srcset(srcset: &str) -> Vec<SrcSetItem> {
    let mut srcset_items: Vec<SrcSetItem> = vec![];

    let mut partials: Vec<&str> = srcset.split(WHITESPACES).collect();
    let mut path: Option<&str> = None;
    let mut descriptor: Option<&str> = None;
    let mut i = 0;

    while i < partials.len() {
        let partial = partials[i];
        i += 1;

        if partial.is_empty() {
            continue;
        }

        if let Some(stripped) = partial.strip_suffix(',') {
            // 逗号结尾意味着当前项结束
            if path.is_none() {
                path = Some(stripped);
                descriptor = Some("");
            } else {
                descriptor = Some(stripped);
            }
        } else if path.is_none() {
            path = Some(partial);
        } else {
            // 路径已确定，当前片段是描述符，后面可能紧跟 ",下一项"
            match partial.split_once(',') {
                Some((desc, rest)) => {
                    descriptor = Some(desc);
                    if !rest.is_empty() {
                        partials.insert(i, rest);
                    }
                }
                None => descriptor = Some(partial),
            }
        }

        if let (Some(p), Some(d)) = (path, descriptor) {
            srcset_items.push(SrcSetItem {
                path: p,
                descriptor: d,
            });

            path = None;
            descriptor = None;
        }
    }

    if let Some(p) = path {
        srcset_items.push(SrcSetItem {
            path: p,
            descriptor: descriptor.unwrap_or_default(),
        });
    }

    srcset_items
}

/// Puts a parsed `srcset` back together
pub fn compose_srcset(items: &[(String, &str)]) -> String {
    items
        .iter()
        .map(|(path, descriptor)| {
            if descriptor.is_empty() {
                path.clone()
            } else {
                format!("{} {}", path, descriptor)
            }
        })
        .collect::<Vec<String>>()
        .join(", ")
}
