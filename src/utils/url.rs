use std::fmt;

pub use url::Url;

/// Reference prefixes that never point at a fetchable resource
const NON_FETCHABLE_PREFIXES: &[&str] = &["data:", "javascript:", "mailto:", "tel:", "#"];

/// An absolute `http`/`https` URL that is safe to hand to the fetcher
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalUrl(Url);

impl CanonicalUrl {
    /// Wraps an already parsed URL, refusing anything that is not `http` or `https`
    pub fn new(url: Url) -> Option<CanonicalUrl> {
        match url.scheme() {
            "http" | "https" => Some(CanonicalUrl(url)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }

    pub fn host_str(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tells whether a raw reference must be left alone without being resolved
pub fn is_skippable_reference(reference: &str) -> bool {
    let reference = reference.trim();

    if reference.is_empty() {
        return true;
    }

    let lowercased = reference.to_ascii_lowercase();
    NON_FETCHABLE_PREFIXES
        .iter()
        .any(|prefix| lowercased.starts_with(prefix))
}

/// Resolves a raw reference found in a document against the given base URL
///
/// Protocol-relative references (`//host/path`) are pinned to `https`, root-relative and
/// relative references follow regular URL-join semantics. Returns `None` for references
/// which should not be fetched (data/javascript/mailto/tel/fragment) and for anything
/// that does not end up being an `http(s)` URL.
pub fn resolve_reference(base_url: &Url, reference: &str) -> Option<CanonicalUrl> {
    let reference = reference.trim();

    if is_skippable_reference(reference) {
        return None;
    }

    let resolved: Url = if let Some(rest) = reference.strip_prefix("//") {
        Url::parse(&format!("https://{}", rest)).ok()?
    } else if has_http_scheme(reference) {
        Url::parse(reference).ok()?
    } else {
        // Root-relative and document-relative paths alike
        base_url.join(reference).ok()?
    };

    CanonicalUrl::new(resolved)
}

fn has_http_scheme(reference: &str) -> bool {
    let lowercased = reference.to_ascii_lowercase();
    lowercased.starts_with("http://") || lowercased.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_is_skippable_reference() {
        assert!(is_skippable_reference(""));
        assert!(is_skippable_reference("   "));
        assert!(is_skippable_reference("#top"));
        assert!(is_skippable_reference("data:image/png;base64,AAAA"));
        assert!(is_skippable_reference("JavaScript:void(0)"));
        assert!(is_skippable_reference("mailto:someone@example.com"));
        assert!(is_skippable_reference("tel:+15555555555"));

        assert!(!is_skippable_reference("/logo.png"));
        assert!(!is_skippable_reference("https://example.com/a.css"));
        assert!(!is_skippable_reference("img/a.png"));
    }

    #[test]
    fn test_resolve_parent_relative() {
        let resolved =
            resolve_reference(&base("https://example.com/x/y/"), "../img/a.png").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/x/img/a.png");
    }

    #[test]
    fn test_resolve_protocol_relative() {
        let resolved =
            resolve_reference(&base("http://example.com/"), "//cdn.example.com/a.js").unwrap();
        assert_eq!(resolved.as_str(), "https://cdn.example.com/a.js");
    }

    #[test]
    fn test_resolve_root_relative() {
        let resolved =
            resolve_reference(&base("https://example.com/search?q=1"), "/logo.png").unwrap();
        assert_eq!(resolved.as_str(), "https://example.com/logo.png");
    }

    #[test]
    fn test_resolve_absolute_kept() {
        let resolved = resolve_reference(
            &base("https://example.com/"),
            "http://other.example.org/s.css?v=2",
        )
        .unwrap();
        assert_eq!(resolved.as_str(), "http://other.example.org/s.css?v=2");
    }

    #[test]
    fn test_resolve_rejects_non_fetchable() {
        let base_url = base("https://example.com/");

        assert!(resolve_reference(&base_url, "data:text/plain,hi").is_none());
        assert!(resolve_reference(&base_url, "javascript:alert(1)").is_none());
        assert!(resolve_reference(&base_url, "mailto:a@b.c").is_none());
        assert!(resolve_reference(&base_url, "tel:123").is_none());
        assert!(resolve_reference(&base_url, "#main").is_none());
        assert!(resolve_reference(&base_url, "ftp://example.com/file.txt").is_none());
        assert!(resolve_reference(&base_url, "blob:https://example.com/uuid").is_none());
    }
}
