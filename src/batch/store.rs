use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::batch::report::BatchOutcome;
use crate::foundation::error::BatchboardResult;
use crate::render::export::ExportFormat;

/// Destination for rendered images and reports.
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` and return a URL to it.
    fn put(&self, bytes: &[u8], key: &str, content_type: &str) -> BatchboardResult<String>;
}

/// Stores objects as files under a directory and hands out `file://` URLs.
#[derive(Clone, Debug)]
pub struct DirObjectStore {
    root: PathBuf,
}

impl DirObjectStore {
    /// Store rooted at `root`; the directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory objects are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ObjectStore for DirObjectStore {
    fn put(&self, bytes: &[u8], key: &str, content_type: &str) -> BatchboardResult<String> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("create output dir '{}'", self.root.display()))?;
        let path = self.root.join(key);
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        let abs = std::path::absolute(&path).with_context(|| format!("resolve '{}'", path.display()))?;
        tracing::debug!(path = %abs.display(), content_type, bytes = bytes.len(), "stored object");
        Ok(format!("file://{}", abs.display()))
    }
}

/// Key of the image produced for 1-based row `index`.
pub fn image_key(index: usize, format: ExportFormat) -> String {
    format!("image_{index}.{}", format.extension())
}

/// Store every successful image and return row index to URL.
pub fn publish_images(store: &dyn ObjectStore, outcome: &BatchOutcome) -> BatchboardResult<BTreeMap<usize, String>> {
    let mut links = BTreeMap::new();
    for row in &outcome.successful {
        let key = image_key(row.index, row.image.format);
        let url = store.put(&row.image.bytes, &key, row.image.format.content_type())?;
        links.insert(row.index, url);
    }
    Ok(links)
}

#[cfg(test)]
#[path = "../../tests/unit/batch/store.rs"]
mod tests;
