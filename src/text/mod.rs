//! Text Path Transformer, font resolution and text layout.
//!
//! Fonts are resolved once per batch through [`fonts::FontCache`]; each render worker owns a
//! [`layout::TextLayoutEngine`] that shapes text with Parley, either wrapped inside the layer's
//! box or laid along a [`path::TextPath`].

/// Font cache with deterministic fallback families.
pub mod fonts;
/// Parley layout into positioned glyph runs.
pub mod layout;
/// Parametric text curves and truncation.
pub mod path;

pub use fonts::{FallbackFonts, FontCache, FontEntry, FontKey};
pub use layout::{PlacedGlyph, PlacedRun, TextBlock, TextBrush, TextLayoutEngine, TextStyle};
pub use path::{PathSampler, TextPath, text_path, truncate_to_path};
