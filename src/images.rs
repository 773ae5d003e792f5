//! Stage 1: rewrite remote image references to local files.
//!
//! Exports reference images by absolute URL. Each one is downloaded into
//! the image directory under `<basename>.jpg` (the suffix is appended
//! unconditionally, whatever the original format) and the `src` attribute
//! is rewritten to that bare filename. A file that already exists is
//! trusted and never re-fetched, so re-running on the same input performs
//! no network calls.

use std::fs;
use std::path::Path;

use markup5ever_rcdom::Handle;
use tracing::debug;

use crate::dom;
use crate::error::PreprocessError;
use crate::fetch::ImageFetcher;

pub fn localize_images(
    root: &Handle,
    fetcher: &dyn ImageFetcher,
    image_dir: &Path,
) -> Result<(), PreprocessError> {
    for img in dom::collect_elements(root, &["img"]) {
        let Some(src) = dom::attr_get(&img, "src") else {
            continue;
        };
        let local = local_name_for(&src);
        let path = image_dir.join(&local);
        if path.exists() {
            debug!(file = %local, "image already cached");
        } else {
            debug!(uri = %src, file = %local, "fetching image");
            let bytes = fetcher.fetch(&src)?;
            fs::write(&path, bytes)?;
        }
        dom::attr_set(&img, "src", &local);
    }
    Ok(())
}

/// Basename of the URI (everything after the last `/`) plus `.jpg`.
/// Two remote images sharing a basename silently share one cache file.
fn local_name_for(uri: &str) -> String {
    let base = uri.rsplit('/').next().unwrap_or(uri);
    format!("{base}.jpg")
}
