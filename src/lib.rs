//! Batch template composition.
//!
//! A layered template (artboards, text, images, vectors, paths, masks, groups) is bound to each
//! row of a data table by layer name and rendered to PNG or WebP on a CPU worker pool.
//!
//! ```no_run
//! use std::sync::Arc;
//! use batchboard::{BatchConfig, BatchPipeline, DataTable, MemoryFetcher, TemplateDef};
//!
//! # fn main() -> batchboard::BatchboardResult<()> {
//! let def = TemplateDef::from_path("template.json")?;
//! let table = DataTable::from_json_str(r#"[["title"], ["Hello"], ["World"]]"#)?;
//! let pipeline = BatchPipeline::new(&BatchConfig::default(), Arc::new(MemoryFetcher::new()));
//! let outcome = pipeline.run(&def, &table)?;
//! println!("{} rendered, {} failed", outcome.successful.len(), outcome.failed.len());
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Fetching, decoding and SVG handling.
pub mod assets;
/// Row binding, worker pool and reporting.
pub mod batch;
/// Batch configuration.
pub mod config;
/// Image filters and compositing kernels.
pub mod effects;
/// Shared primitives and errors.
pub mod foundation;
/// Placement math and clip resolution.
pub mod geometry;
/// Scene import.
pub mod import;
/// Rasterization and encoding.
pub mod render;
/// Template model and normalization.
pub mod template;
/// Fonts, layout and text paths.
pub mod text;

pub use assets::{AssetFetcher, FetchConfig, HttpFetcher, MemoryFetcher};
pub use batch::{BatchOutcome, BatchPipeline, BatchSummary, DataTable, DirObjectStore, ObjectStore};
pub use config::BatchConfig;
pub use foundation::error::{BatchboardError, BatchboardResult};
pub use render::{ExportFormat, ExportMode, RenderOptions, RenderedImage, TemplateRenderer};
pub use template::{Template, TemplateDef, normalize};
pub use text::{FallbackFonts, FontCache};
