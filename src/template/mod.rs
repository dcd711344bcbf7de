//! Layer Model.
//!
//! Templates arrive as JSON ([`model`]), are normalized once per batch into fully-defaulted
//! [`layer`] values, and are indexed by id through [`store::LayerStore`] when clip
//! references need resolving.

/// CSS-style color parsing.
pub mod color;
/// Normalized layer types.
pub mod layer;
/// Serde definitions of the template JSON format.
pub mod model;
/// Default filling and validation.
pub mod normalize;
/// Id-indexed layer lookup.
pub mod store;

pub use color::ColorDef;
pub use layer::{Layer, LayerKind, Template};
pub use model::TemplateDef;
pub use normalize::normalize;
pub use store::LayerStore;
