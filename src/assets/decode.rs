use anyhow::Context;

use crate::foundation::core::premultiply_rgba8_in_place;
use crate::foundation::error::{BatchboardError, BatchboardResult};

/// Decoded raster in straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major straight-alpha RGBA8.
    pub rgba8: Vec<u8>,
}

impl DecodedImage {
    /// Wrap an existing straight-alpha buffer.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> BatchboardResult<Self> {
        if rgba8.len() != (width as usize) * (height as usize) * 4 {
            return Err(BatchboardError::asset(format!(
                "rgba buffer of {} bytes does not match {width}x{height}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8,
        })
    }

    /// Sub-image starting at `(x, y)`, clamped to the source bounds.
    ///
    /// A zero `width`/`height` keeps everything to the right/bottom of the offset.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width);
        let y = y.min(self.height);
        let max_w = self.width - x;
        let max_h = self.height - y;
        let w = if width == 0 { max_w } else { width.min(max_w) };
        let h = if height == 0 { max_h } else { height.min(max_h) };
        if (x, y, w, h) == (0, 0, self.width, self.height) {
            return self.clone();
        }

        let stride = self.width as usize * 4;
        let mut rgba8 = Vec::with_capacity(w as usize * h as usize * 4);
        for row in y..y + h {
            let start = row as usize * stride + x as usize * 4;
            rgba8.extend_from_slice(&self.rgba8[start..start + w as usize * 4]);
        }
        Self {
            width: w,
            height: h,
            rgba8,
        }
    }

    /// Premultiplied copy of the pixels.
    pub fn to_premul(&self) -> Vec<u8> {
        let mut out = self.rgba8.clone();
        premultiply_rgba8_in_place(&mut out);
        out
    }
}

/// Decode encoded image bytes (PNG, JPEG, WebP, GIF, ...) into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> BatchboardResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(BatchboardError::asset("decoded image has no pixels"));
    }
    Ok(DecodedImage {
        width,
        height,
        rgba8: rgba.into_raw(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
