//! Geometry and clip resolution.
//!
//! Layers are placed by a fabric-style affine: `left`/`top` locate the box's origin anchor,
//! the box rotates, scales and skews around its center. Everything here is a pure function of
//! the final placement, so helper shapes are recomputed for every row instead of being kept in
//! sync by listeners.

/// Radius/outline synthesis, layer outlines and mask clip binding.
pub mod clip;
/// Image fit-to-frame.
pub mod fit;
/// Placement matrices, decomposition and group flattening.
pub mod transform;

pub use clip::{
    Outline, RadiusHelpers, bind_mask_clip, clip_placement, layer_outline, radius_helpers,
    rehome_clip, translate_clip,
};
pub use fit::{fit_image_into_frame, fit_scale};
pub use transform::{Decomposed, center_point, content_matrix, decompose, flatten_into, object_matrix};
