use std::fmt;

use anyhow::Context as _;
use base64::{Engine as _, engine::general_purpose};
use image::ImageEncoder as _;
use serde::{Deserialize, Serialize};

use crate::foundation::core::unpremultiply_rgba8_in_place;
use crate::foundation::error::{BatchboardError, BatchboardResult};

/// Raster encoding of exported images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// Lossless WebP.
    Webp,
}

impl ExportFormat {
    /// MIME type.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One encoded output image.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoding of `bytes`.
    pub format: ExportFormat,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for RenderedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl RenderedImage {
    /// `data:<mime>;base64,<payload>` form of the encoded image.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.content_type(),
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Encode a premultiplied RGBA8 surface.
pub fn encode(premul: &[u8], width: u32, height: u32, format: ExportFormat) -> BatchboardResult<RenderedImage> {
    if premul.len() != (width as usize) * (height as usize) * 4 {
        return Err(BatchboardError::render(format!(
            "surface is {} bytes, expected {width}x{height} rgba8",
            premul.len()
        )));
    }
    let mut straight = premul.to_vec();
    unpremultiply_rgba8_in_place(&mut straight);

    let mut bytes = Vec::new();
    match format {
        ExportFormat::Png => image::codecs::png::PngEncoder::new(&mut bytes)
            .write_image(&straight, width, height, image::ExtendedColorType::Rgba8)
            .context("encode png")?,
        ExportFormat::Webp => image::codecs::webp::WebPEncoder::new_lossless(&mut bytes)
            .write_image(&straight, width, height, image::ExtendedColorType::Rgba8)
            .context("encode webp")?,
    }
    Ok(RenderedImage {
        width,
        height,
        format,
        bytes,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
