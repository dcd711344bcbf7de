//! Run configuration, loadable from JSON.

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::assets::fetch::FetchConfig;
use crate::effects::backend::FilterBackend;
use crate::foundation::error::BatchboardResult;
use crate::render::export::ExportFormat;
use crate::render::prepare::ExportMode;
use crate::render::renderer::RenderOptions;
use crate::text::fonts::FallbackFonts;

/// Initial and maximum filter processing capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterBackendConfig {
    /// Starting tile edge in pixels.
    pub tile_size: u32,
    /// Largest tile edge; bigger images are processed full-frame.
    pub max_texture_size: u32,
}

impl Default for FilterBackendConfig {
    fn default() -> Self {
        Self {
            tile_size: 2048,
            max_texture_size: 4096,
        }
    }
}

impl FilterBackendConfig {
    /// Backend with these limits.
    pub fn backend(&self) -> FilterBackend {
        FilterBackend::new(self.tile_size, self.max_texture_size)
    }
}

/// Everything a batch run can be tuned with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchConfig {
    /// Render workers; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Output encoding.
    pub format: ExportFormat,
    /// Frame or artboard export.
    pub export_mode: ExportMode,
    /// HTTP fetch limits.
    pub fetch: FetchConfig,
    /// Filter processing capacity.
    pub filters: FilterBackendConfig,
    /// Font families used when a download fails.
    pub fallback_fonts: FallbackFonts,
}

impl BatchConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json_str(s: &str) -> BatchboardResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> BatchboardResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Renderer settings derived from this configuration.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            mode: self.export_mode,
            format: self.format,
            filters: self.filters.backend(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
