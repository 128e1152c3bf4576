/// Favicon 相关的值
pub const FAVICON_VALUES: &[&str] = &["icon", "shortcut icon"];

/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// 指向页面预览图片的 `<meta>` 标记：(属性名, 属性值)
pub const META_IMAGE_MARKERS: &[(&str, &str)] = &[
    ("itemprop", "image"),
    ("property", "og:image"),
    ("name", "twitter:image"),
];

/// 带有导航目标的超链接元素
pub const HYPERLINK_ELEMENTS: &[&str] = &["a", "area"];

/// 导航时发出跟踪请求的属性
pub const TRACKING_ATTRIBUTES: &[&str] = &["ping"];

/// 可执行脚本元素
pub const SCRIPT_ELEMENTS: &[&str] = &["script"];

/// 检查是否为 favicon
pub fn is_favicon(attr_value: &str) -> bool {
    FAVICON_VALUES.contains(&attr_value.to_lowercase().as_str())
}
