//! Per-row import: turns a bound template into a [`scene::Scene`] with every asset loaded.

/// Layer-by-layer asset resolution.
pub mod importer;
/// Resolved drawables.
pub mod scene;

pub use importer::LayerImporter;
pub use scene::{ClipShape, ImagePixels, NodeContent, Scene, SceneNode, StrokeSpec};
