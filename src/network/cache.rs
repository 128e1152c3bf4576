use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::utils::url::CanonicalUrl;

/// A remote resource which has already been saved to disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedAsset {
    /// Where the resource was written to
    pub path: PathBuf,
    /// Reference to the resource as seen from the output document's directory
    pub relative: String,
}

impl CachedAsset {
    pub fn is_stylesheet(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("css"))
    }
}

/// Maps canonical URLs to assets localized while processing a single document
///
/// One cache is created per job and handed down to every rewrite pass, which
/// guarantees that each distinct URL gets fetched and written at most once per job.
#[derive(Debug, Default)]
pub struct ResourceCache {
    assets: HashMap<CanonicalUrl, CachedAsset>,
    // Keeps iteration over stylesheets stable between runs
    order: Vec<CanonicalUrl>,
}

impl ResourceCache {
    pub fn new() -> ResourceCache {
        ResourceCache::default()
    }

    /// Returns the relative reference previously recorded for the URL
    pub fn lookup(&self, url: &CanonicalUrl) -> Option<&str> {
        self.assets.get(url).map(|asset| asset.relative.as_str())
    }

    pub fn get(&self, url: &CanonicalUrl) -> Option<&CachedAsset> {
        self.assets.get(url)
    }

    /// Remembers a localized asset; recording the same URL again simply overwrites it
    pub fn record(&mut self, url: &CanonicalUrl, path: &Path, relative: &str) {
        let asset = CachedAsset {
            path: path.to_path_buf(),
            relative: relative.to_string(),
        };

        if self.assets.insert(url.clone(), asset).is_none() {
            self.order.push(url.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Localized stylesheets, in the order they were recorded
    pub fn stylesheets(&self) -> Vec<(CanonicalUrl, CachedAsset)> {
        self.order
            .iter()
            .filter_map(|url| self.assets.get(url).map(|asset| (url.clone(), asset.clone())))
            .filter(|(_, asset)| asset.is_stylesheet())
            .collect()
    }
}
