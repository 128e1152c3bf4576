//! 本地文件名生成
//!
//! 将规范化URL映射为资源目录中确定性的、文件系统安全的文件名。
//! 相同的URL和资源目录总是得到相同的路径；文件名中插入URL的哈希以避免冲突。

use std::path::{Component, Path, PathBuf};

use md5::{Digest, Md5};

use super::url::CanonicalUrl;

/// What a matching bundle rule does to the file name
enum BundleAction {
    /// Replace the file name altogether
    Rename(&'static str),
    /// Append an extension, unless the file name already has one
    AppendExtension(&'static str),
}

/// A URL-path heuristic for platform-specific combined assets
///
/// These rules are deliberately narrow. They recognize a handful of known URL shapes
/// and are not meant to be a general content-type sniffer.
struct BundleRule {
    /// Every marker must be present in the URL path
    markers: &'static [&'static str],
    action: BundleAction,
}

/// Evaluated top to bottom, the first rule whose markers all match wins
const BUNDLE_RULES: &[BundleRule] = &[
    BundleRule {
        markers: &["xjs", "_/ss/"],
        action: BundleAction::Rename("google_bundle_styles.css"),
    },
    BundleRule {
        markers: &["xjs", "_/js/"],
        action: BundleAction::Rename("google_bundle_scripts.js"),
    },
    BundleRule {
        markers: &["/images/"],
        action: BundleAction::AppendExtension(".png"),
    },
];

/// Keyword hints used to guess an extension from the whole URL, first category wins
const EXTENSION_HINTS: &[(&[&str], &str)] = &[
    (&["css", "style", "/ss/"], ".css"),
    (&["js", "script", "/js/"], ".js"),
    (&["font", "woff", "ttf"], ".woff2"),
    (&["png", "jpg", "jpeg", "gif", "svg", "webp"], ".png"),
];
const FALLBACK_EXTENSION: &str = ".html";

/// Length of the URL hash spliced into every file name
pub const URL_HASH_LENGTH: usize = 8;

/// Creates a safe local path for the given URL inside of the resources directory
pub fn create_local_filename(url: &CanonicalUrl, resources_dir: &Path) -> PathBuf {
    let path = url.path();
    let mut filename: String = base_filename(url);

    if let Some(rule) = BUNDLE_RULES
        .iter()
        .find(|rule| rule.markers.iter().all(|marker| path.contains(marker)))
    {
        match rule.action {
            BundleAction::Rename(name) => filename = name.to_string(),
            BundleAction::AppendExtension(extension) => {
                if !filename.contains('.') {
                    filename.push_str(extension);
                }
            }
        }
    }

    if !filename.contains('.') {
        filename.push_str(guess_extension(url.as_str()));
    }

    let safe_filename: String = filename
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let (stem, extension) = split_extension(&safe_filename);
    resources_dir.join(format!("{}_{}{}", stem, url_hash(url), extension))
}

/// First characters of the hex-encoded MD5 digest of the URL
pub fn url_hash(url: &CanonicalUrl) -> String {
    let digest = Md5::digest(url.as_str().as_bytes());
    let mut hex: String = format!("{:x}", digest);
    hex.truncate(URL_HASH_LENGTH);
    hex
}

/// Computes the reference to `target` as seen from within `from_dir`, using forward slashes
///
/// Both paths are made absolute and lexically normalized first, so `..` components
/// in either of them are resolved before the two are compared.
pub fn relative_reference(from_dir: &Path, target: &Path) -> String {
    let from_dir: &Path = if from_dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        from_dir
    };

    let from_dir: PathBuf = normalize_lexically(from_dir);
    let target: PathBuf = normalize_lexically(target);

    // 仅在两者没有共同根时（例如 Windows 下不同盘符）才会失败，此时只能使用绝对路径
    pathdiff::diff_paths(&target, &from_dir)
        .unwrap_or(target)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Makes the path absolute, then drops `.` components and lets `..` pop its parent
fn normalize_lexically(path: &Path) -> PathBuf {
    let absolute: PathBuf = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();

    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` 仍然是 `/`
                if !matches!(
                    normalized.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                ) {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

fn base_filename(url: &CanonicalUrl) -> String {
    let path = url.path();

    if path.is_empty() || path == "/" {
        let netloc = match url.as_url().port() {
            Some(port) => format!("{}:{}", url.host_str(), port),
            None => url.host_str().to_string(),
        };
        return format!("{}.html", netloc.replace('.', "_"));
    }

    let mut segments = path.rsplit('/');
    match segments.next() {
        Some(last) if !last.is_empty() => last.to_string(),
        // Path ends with a slash, name the file after the directory
        _ => format!("{}.html", segments.next().unwrap_or_default()),
    }
}

fn guess_extension(url: &str) -> &'static str {
    let lowercased = url.to_lowercase();

    EXTENSION_HINTS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowercased.contains(k)))
        .map(|(_, extension)| *extension)
        .unwrap_or(FALLBACK_EXTENSION)
}

/// Splits a file name into stem and extension, leading dots never start an extension
fn split_extension(filename: &str) -> (&str, &str) {
    let leading_dots = filename.len() - filename.trim_start_matches('.').len();

    match filename.rfind('.') {
        Some(index) if index > leading_dots => (&filename[..index], &filename[index..]),
        _ => (filename, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::url::Url;

    fn canonical(s: &str) -> CanonicalUrl {
        CanonicalUrl::new(Url::parse(s).unwrap()).unwrap()
    }

    fn file_name(url: &str) -> String {
        create_local_filename(&canonical(url), Path::new("resources"))
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string()
    }

    #[test]
    fn test_keeps_extension_and_splices_hash() {
        let url = canonical("https://example.com/logo.png");
        let path = create_local_filename(&url, Path::new("resources"));

        assert_eq!(
            path,
            Path::new("resources").join(format!("logo_{}.png", url_hash(&url)))
        );
    }

    #[test]
    fn test_url_hash_is_hex_prefix_of_md5() {
        let url = canonical("https://example.com/logo.png");
        let hash = url_hash(&url);
        let full = format!("{:x}", Md5::digest(b"https://example.com/logo.png"));

        assert_eq!(hash.len(), URL_HASH_LENGTH);
        assert!(full.starts_with(&hash));
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_host_only_url() {
        let name = file_name("https://www.example.com/");
        assert!(name.starts_with("www_example_com_"));
        assert!(name.ends_with(".html"));
    }

    #[test]
    fn test_trailing_slash_uses_directory_name() {
        let name = file_name("https://example.com/static/fonts/");
        assert!(name.starts_with("fonts_"));
        assert!(name.ends_with(".html"));
    }

    #[test]
    fn test_bundle_rules() {
        assert!(file_name("https://www.gstatic.com/og/_/ss/k=og.qtm.xjs/rs=AA")
            .starts_with("google_bundle_styles_"));
        assert!(file_name("https://www.google.com/xjs/_/js/k=xjs.s.en/am=AAA")
            .starts_with("google_bundle_scripts_"));

        let name = file_name("https://example.com/images/branding/logo");
        assert!(name.starts_with("logo_"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_guessed_extensions() {
        assert!(file_name("https://example.com/theme?format=css").ends_with(".css"));
        assert!(file_name("https://example.com/loader?type=script").ends_with(".js"));
        assert!(file_name("https://fonts.example.com/font?family=Roboto").ends_with(".woff2"));
        assert!(file_name("https://example.com/thumb?fmt=webp").ends_with(".png"));
        assert!(file_name("https://example.com/about").ends_with(".html"));
    }

    #[test]
    fn test_unsafe_characters_are_dropped() {
        let name = file_name("https://example.com/a%20b(1).png");
        let (stem, extension) = split_extension(&name);

        assert!(stem.starts_with("a20b1_"));
        assert_eq!(extension, ".png");
    }

    #[test]
    fn test_deterministic() {
        let url = canonical("https://example.com/a/b/c.css?v=1");
        assert_eq!(
            create_local_filename(&url, Path::new("resources")),
            create_local_filename(&url, Path::new("resources"))
        );
    }

    #[test]
    fn test_same_name_different_host() {
        let a = canonical("https://one.example.com/static/app.css");
        let b = canonical("https://two.example.com/static/app.css");

        assert_ne!(
            create_local_filename(&a, Path::new("resources")),
            create_local_filename(&b, Path::new("resources"))
        );
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.png"), ("a", ".png"));
        assert_eq!(split_extension("a.tar.gz"), ("a.tar", ".gz"));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("noext"), ("noext", ""));
    }

    #[test]
    fn test_relative_reference() {
        assert_eq!(
            relative_reference(Path::new(""), Path::new("resources/logo_0.png")),
            "resources/logo_0.png"
        );
        assert_eq!(
            relative_reference(Path::new("out/pages"), Path::new("resources/logo_0.png")),
            "../../resources/logo_0.png"
        );
        assert_eq!(
            relative_reference(Path::new("/srv/site"), Path::new("/srv/site/resources/a.css")),
            "resources/a.css"
        );
    }

    #[test]
    fn test_relative_reference_through_parent_dirs() {
        assert_eq!(
            relative_reference(Path::new("/srv/a/../site"), Path::new("/srv/a/resources/x.png")),
            "../a/resources/x.png"
        );
        assert_eq!(
            relative_reference(Path::new("/srv/a/.."), Path::new("/srv/a/resources/x.png")),
            "a/resources/x.png"
        );
        assert_eq!(
            relative_reference(Path::new("/srv/./site"), Path::new("/srv/site/../res/./x.png")),
            "../res/x.png"
        );
        assert_eq!(
            relative_reference(Path::new("../demo"), Path::new("resources/x.png")),
            format!(
                "../{}/resources/x.png",
                std::env::current_dir()
                    .unwrap()
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
            )
        );
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(normalize_lexically(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize_lexically(Path::new("/../a")), PathBuf::from("/a"));
    }
}
