//! Template Renderer: pre-export normalization, CPU rasterization and encoding.

/// `vello_cpu` scene rasterization.
pub mod cpu;
/// PNG/WebP encoding.
pub mod export;
/// Helper removal and artboard rebasing.
pub mod prepare;
/// Prepare, import, rasterize, encode.
pub mod renderer;

pub use cpu::CpuRasterizer;
pub use export::{ExportFormat, RenderedImage, encode};
pub use prepare::{ExportMode, PreparedTemplate, prepare};
pub use renderer::{RenderOptions, TemplateRenderer};
