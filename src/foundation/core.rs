pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

use crate::foundation::error::{BatchboardError, BatchboardResult};

/// Longest canvas edge, in pixels, the rasterizer can address.
pub const MAX_CANVAS_EDGE: u32 = u16::MAX as u32;
/// Largest canvas area, in pixels. Every node and clip gets a surface of this size.
pub const MAX_CANVAS_PIXELS: u64 = 64 * 1024 * 1024;

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Build a canvas from fractional template dimensions, rounding up and keeping at least 1px.
    pub fn from_f64(width: f64, height: f64) -> Self {
        fn px(v: f64) -> u32 {
            if !v.is_finite() || v <= 1.0 {
                1
            } else {
                v.ceil().min(f64::from(u32::MAX)) as u32
            }
        }
        Self {
            width: px(width),
            height: px(height),
        }
    }

    /// Like [`Canvas::from_f64`], but rejects sizes beyond [`MAX_CANVAS_EDGE`] or
    /// [`MAX_CANVAS_PIXELS`] instead of allocating them.
    pub fn checked_from_f64(width: f64, height: f64) -> BatchboardResult<Self> {
        let canvas = Self::from_f64(width, height);
        if !canvas.within_limits() {
            return Err(BatchboardError::render(format!(
                "canvas {}x{} exceeds the {MAX_CANVAS_EDGE}px edge or {MAX_CANVAS_PIXELS}px area limit",
                canvas.width, canvas.height
            )));
        }
        Ok(canvas)
    }

    /// `true` when both edges and the area are within the rasterizer limits.
    pub fn within_limits(self) -> bool {
        self.width <= MAX_CANVAS_EDGE
            && self.height <= MAX_CANVAS_EDGE
            && u64::from(self.width) * u64::from(self.height) <= MAX_CANVAS_PIXELS
    }

    /// Number of RGBA8 bytes needed for one surface of this size.
    pub fn byte_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

/// Premultiply a tightly packed straight-alpha RGBA8 buffer.
pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Undo premultiplication of a tightly packed RGBA8 buffer.
pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u32;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
