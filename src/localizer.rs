//! Resource localization shared by every rewrite pass
//!
//! A [`Localizer`] ties together reference resolution, file name synthesis, the
//! per-job [`ResourceCache`] and the download [`Session`]. Each rewrite pass feeds it
//! raw references and substitutes whatever local reference it hands back.

use std::path::Path;

use tracing::debug;

use crate::network::cache::ResourceCache;
use crate::network::session::Session;
use crate::utils::filename::{create_local_filename, relative_reference};
use crate::utils::url::{resolve_reference, CanonicalUrl, Url};

pub struct Localizer<'a> {
    session: &'a Session,
    cache: &'a mut ResourceCache,
    resources_dir: &'a Path,
    output_dir: &'a Path,
}

impl<'a> Localizer<'a> {
    pub fn new(
        session: &'a Session,
        cache: &'a mut ResourceCache,
        resources_dir: &'a Path,
        output_dir: &'a Path,
    ) -> Localizer<'a> {
        Localizer {
            session,
            cache,
            resources_dir,
            output_dir,
        }
    }

    pub fn cache(&self) -> &ResourceCache {
        &*self.cache
    }

    /// Localizes a reference found in the output document itself
    ///
    /// Returns the reference to substitute, relative to the output document's directory,
    /// or `None` when the original reference has to stay as it is.
    pub fn localize(&mut self, base_url: &Url, reference: &str) -> Option<String> {
        let output_dir = self.output_dir;
        self.localize_from(base_url, reference, output_dir)
    }

    /// Localizes a reference found in a file living in `anchor_dir`
    pub fn localize_from(
        &mut self,
        base_url: &Url,
        reference: &str,
        anchor_dir: &Path,
    ) -> Option<String> {
        let url: CanonicalUrl = match resolve_reference(base_url, reference) {
            Some(url) => url,
            None => {
                debug!("Skipping reference: {}", reference);
                return None;
            }
        };

        if let Some(asset) = self.cache.get(&url) {
            debug!("Already localized: {}", url);

            return if anchor_dir == self.output_dir {
                Some(asset.relative.clone())
            } else {
                Some(relative_reference(anchor_dir, &asset.path))
            };
        }

        let local_path = create_local_filename(&url, self.resources_dir);
        self.session.download(&url, &local_path).ok()?;

        let relative: String = relative_reference(self.output_dir, &local_path);
        self.cache.record(&url, &local_path, &relative);

        if anchor_dir == self.output_dir {
            Some(relative)
        } else {
            Some(relative_reference(anchor_dir, &local_path))
        }
    }
}
