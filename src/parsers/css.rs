//! CSS 处理模块
//!
//! 本模块只关心样式表中的 `url()` 引用，不做完整的CSS语法解析。
//! 引用通过正则表达式提取，因此被转义引号或注释拆开的 `url()` 不会被识别，
//! 这是已知且可接受的限制。
//!
//! # 主要功能
//!
//! - **引用提取**: 找出 `url(...)` 中的地址（无引号、单引号或双引号）
//! - **引用替换**: 逐个替换为本地资源路径，保留原有的引号
//! - **外部样式表**: 重写已下载到本地的样式表文件

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::{info, warn};

use crate::localizer::Localizer;
use crate::network::cache::CachedAsset;
use crate::utils::url::CanonicalUrl;

/// Matches `url(...)`, capturing the bare reference without its quotes
const CSS_URL_FUNCTION: &str = r#"url\(["']?([^"')\s]+)["']?\)"#;

fn css_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CSS_URL_FUNCTION).expect("invalid url() pattern"))
}

/// Tells whether the given CSS text may reference anything through `url()`
pub fn has_css_urls(css: &str) -> bool {
    css.contains("url(")
}

/// Lists every reference found inside of `url()` functions, in order of appearance
pub fn extract_css_urls(css: &str) -> Vec<&str> {
    css_url_regex()
        .captures_iter(css)
        .filter_map(|caps| caps.get(1))
        .map(|reference| reference.as_str())
        .collect()
}

/// Replaces references inside of `url()` functions
///
/// `replace` receives each raw reference and returns its substitute, or `None`
/// to keep the reference untouched. Quotes and everything outside of the
/// reference itself are preserved.
pub fn rewrite_css_urls<F>(css: &str, mut replace: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    css_url_regex()
        .replace_all(css, |caps: &Captures| {
            let whole = &caps[0];

            match (caps.get(0), caps.get(1)) {
                (Some(function), Some(reference)) => match replace(reference.as_str()) {
                    Some(substitute) => {
                        let start = reference.start() - function.start();
                        let end = reference.end() - function.start();
                        format!("{}{}{}", &whole[..start], substitute, &whole[end..])
                    }
                    None => whole.to_string(),
                },
                _ => whole.to_string(),
            }
        })
        .into_owned()
}

/// Rewrites `url()` references inside of every localized stylesheet
///
/// References get resolved against the stylesheet's own URL and rewritten relative
/// to the stylesheet's location on disk. Stylesheets pulled in by other stylesheets
/// are processed as well. Returns the number of stylesheet files which were changed.
///
/// Browsers resolve stylesheet references against the stylesheet, not the page,
/// so the page's base URL is intentionally not used here.
pub fn localize_stylesheets(localizer: &mut Localizer) -> usize {
    info!("  Processing CSS files for embedded resources...");

    let mut pending: VecDeque<(CanonicalUrl, CachedAsset)> =
        localizer.cache().stylesheets().into();
    let mut visited: HashSet<CanonicalUrl> = HashSet::new();
    let mut rewritten: usize = 0;

    while let Some((url, asset)) = pending.pop_front() {
        if !visited.insert(url.clone()) {
            continue;
        }

        match localize_stylesheet(localizer, &url, &asset.path) {
            Ok(true) => rewritten += 1,
            Ok(false) => {}
            Err(e) => warn!("    Error processing CSS file {}: {}", asset.path.display(), e),
        }

        for (other_url, other_asset) in localizer.cache().stylesheets() {
            if !visited.contains(&other_url) && !pending.iter().any(|(u, _)| *u == other_url) {
                pending.push_back((other_url, other_asset));
            }
        }
    }

    rewritten
}

fn localize_stylesheet(
    localizer: &mut Localizer,
    stylesheet_url: &CanonicalUrl,
    path: &Path,
) -> io::Result<bool> {
    let css: String = fs::read_to_string(path)?;

    if !has_css_urls(&css) {
        return Ok(false);
    }

    let anchor_dir: &Path = path.parent().unwrap_or(Path::new(""));
    let localized: String = rewrite_css_urls(&css, |reference| {
        localizer.localize_from(stylesheet_url.as_url(), reference, anchor_dir)
    });

    if localized == css {
        return Ok(false);
    }

    fs::write(path, localized)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_css_urls() {
        let css = r#"
            @font-face { src: url("/fonts/a.woff2") format("woff2"), url('b.ttf'); }
            .logo { background: url(//cdn.example.com/logo.svg) no-repeat; }
            .empty { background: url(data:image/png;base64,AAAA); }
        "#;

        assert_eq!(
            extract_css_urls(css),
            vec![
                "/fonts/a.woff2",
                "b.ttf",
                "//cdn.example.com/logo.svg",
                "data:image/png;base64,AAAA",
            ]
        );
    }

    #[test]
    fn test_extract_css_urls_none() {
        assert!(extract_css_urls("body { color: red; }").is_empty());
        assert!(!has_css_urls("body { color: red; }"));
    }

    #[test]
    fn test_rewrite_css_urls_keeps_quotes() {
        let css = r#"a { background: url("x.png"); } b { background: url('y.png'); } c { background: url(z.png); }"#;

        let result = rewrite_css_urls(css, |reference| match reference {
            "x.png" | "z.png" => Some(format!("resources/{}", reference)),
            _ => None,
        });

        assert_eq!(
            result,
            r#"a { background: url("resources/x.png"); } b { background: url('y.png'); } c { background: url(resources/z.png); }"#
        );
    }

    #[test]
    fn test_rewrite_css_urls_each_occurrence() {
        let css = "a{background:url(x.png)} b{background:url(x.png)}";
        let mut calls = 0;

        let result = rewrite_css_urls(css, |_| {
            calls += 1;
            Some("l.png".to_string())
        });

        assert_eq!(calls, 2);
        assert_eq!(result, "a{background:url(l.png)} b{background:url(l.png)}");
    }
}
