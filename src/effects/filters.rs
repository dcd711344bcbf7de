use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::effects::backend::{FilterBackend, ProcessingPlan};
use crate::effects::composite::blur_rgba8_premul;
use crate::foundation::core::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::foundation::error::BatchboardResult;
use crate::foundation::math::{clamp_u8, hash_unit};
use crate::template::color::ColorDef;

/// Declarative filter entry as stored on image layers: `{ "type": "Brightness", "brightness": 0.2 }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    /// Filter type name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Remaining parameters, keyed as authored.
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl FilterDescriptor {
    /// Descriptor from a type name and a JSON object of parameters.
    pub fn new(kind: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            params: match params {
                serde_json::Value::Object(m) => m,
                _ => serde_json::Map::new(),
            },
        }
    }

    /// Numeric parameter; numeric strings are accepted.
    fn number(&self, key: &str) -> Option<f32> {
        match self.params.get(key)? {
            serde_json::Value::Number(n) => n.as_f64().map(|v| v as f32),
            serde_json::Value::String(s) => s.trim().parse::<f32>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.params.get(key)?.as_str()
    }

    fn color(&self, key: &str, default: [u8; 3]) -> [u8; 3] {
        self.text(key)
            .and_then(|s| ColorDef::parse(s).ok())
            .map(|c| {
                let [r, g, b, _] = c.to_rgba8();
                [r, g, b]
            })
            .unwrap_or(default)
    }
}

const SEPIA: [f32; 20] = [
    0.393, 0.769, 0.189, 0.0, 0.0, //
    0.349, 0.686, 0.168, 0.0, 0.0, //
    0.272, 0.534, 0.131, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];
const POLAROID: [f32; 20] = [
    1.438, -0.062, -0.062, 0.0, 0.0, //
    -0.122, 1.378, -0.122, 0.0, 0.0, //
    -0.016, -0.016, 1.483, 0.0, 0.0, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];
const KODACHROME: [f32; 20] = [
    1.128_55, -0.396_73, -0.039_92, 0.0, 0.249_91, //
    -0.164_04, 1.083_52, -0.054_98, 0.0, 0.096_98, //
    -0.167_86, -0.560_34, 1.601_48, 0.0, 0.139_72, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];
const BROWNIE: [f32; 20] = [
    0.599_70, 0.345_53, -0.270_82, 0.0, 0.186, //
    -0.037_70, 0.860_95, 0.150_59, 0.0, -0.1449, //
    0.241_13, -0.074_41, 0.449_72, 0.0, -0.029_65, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];
const VINTAGE: [f32; 20] = [
    0.627_93, 0.320_21, -0.039_65, 0.0, 0.037_84, //
    0.025_78, 0.644_11, 0.032_59, 0.0, 0.029_26, //
    0.046_60, -0.085_12, 0.524_16, 0.0, 0.020_23, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];
const TECHNICOLOR: [f32; 20] = [
    1.912_52, -0.854_53, -0.091_55, 0.0, 0.046_24, //
    -0.308_78, 1.765_89, -0.106_01, 0.0, -0.275_89, //
    -0.231_10, -0.750_18, 1.978_99, 0.0, 0.238_09, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];
const BLACK_WHITE: [f32; 20] = [
    1.5, 1.5, 1.5, 0.0, -1.0, //
    1.5, 1.5, 1.5, 0.0, -1.0, //
    1.5, 1.5, 1.5, 0.0, -1.0, //
    0.0, 0.0, 0.0, 1.0, 0.0,
];
const SHARPEN: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];
const EMBOSS: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 0.7, -1.0, -1.0, -1.0, -1.0];
const GAMMA_PRESET: [f32; 3] = [1.0, 0.5, 2.1];
const BLEND_DEFAULT_COLOR: [u8; 3] = [0xF9, 0x5C, 0x63];
const MAX_BLUR_RADIUS: u32 = 64;

/// Blend modes of the `BlendColor` filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BlendMode {
    Multiply,
    Screen,
    Add,
    Difference,
    Subtract,
    Darken,
    Lighten,
    Overlay,
    Exclusion,
    Tint,
}

impl BlendMode {
    /// Parse a mode name; unknown names fall back to multiply.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "screen" => Self::Screen,
            "add" => Self::Add,
            "diff" | "difference" => Self::Difference,
            "subtract" => Self::Subtract,
            "darken" => Self::Darken,
            "lighten" => Self::Lighten,
            "overlay" => Self::Overlay,
            "exclusion" => Self::Exclusion,
            "tint" => Self::Tint,
            _ => Self::Multiply,
        }
    }

    fn apply(self, v: f32, tinted: f32, alpha: f32) -> f32 {
        match self {
            Self::Multiply => v * tinted / 255.0,
            Self::Screen => 255.0 - (255.0 - v) * (255.0 - tinted) / 255.0,
            Self::Add => v + tinted,
            Self::Difference => (v - tinted).abs(),
            Self::Subtract => v - tinted,
            Self::Darken => v.min(tinted),
            Self::Lighten => v.max(tinted),
            Self::Overlay => {
                if tinted < 128.0 {
                    2.0 * v * tinted / 255.0
                } else {
                    255.0 - 2.0 * (255.0 - v) * (255.0 - tinted) / 255.0
                }
            }
            Self::Exclusion => tinted + v - 2.0 * tinted * v / 255.0,
            Self::Tint => tinted + v * (1.0 - alpha),
        }
    }
}

/// One pixel operation. Channel math runs on straight (non-premultiplied) RGBA8.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterOp {
    /// Add `value * 255` to every color channel.
    Brightness(f32),
    /// Contrast in `-1..=1`.
    Contrast(f32),
    /// Saturation in `-1..=1`.
    Saturation(f32),
    /// Saturation boost weighted toward muted pixels.
    Vibrance(f32),
    /// Brighten (or darken, when negative) pixels above mid luma.
    Highlight(f32),
    /// Brighten (or darken, when negative) pixels below mid luma.
    Lowlight(f32),
    /// Warm (positive) or cool (negative) shift: red up and blue down by `value * 64`.
    Temperature(f32),
    /// 4x5 color matrix applied to color channels; offsets are in `0..=1` units.
    ColorMatrix([f32; 20]),
    /// Average-of-channels grayscale.
    Grayscale,
    /// Invert color channels.
    Invert,
    /// Deterministic per-pixel noise of the given amplitude.
    Noise {
        /// Amplitude in channel units.
        amount: f32,
        /// Hash seed.
        seed: u64,
    },
    /// Block size in pixels; each block takes its top-left pixel.
    Pixelate(u32),
    /// Gaussian blur with strength in `0..=1` relative to the image size.
    Blur(f32),
    /// 3x3 convolution (RGB and alpha).
    Convolute([f32; 9]),
    /// Make pixels close to `color` transparent.
    RemoveColor {
        /// Color to remove.
        color: [u8; 3],
        /// Per-channel tolerance in `0..=1`.
        distance: f32,
    },
    /// Per-channel gamma.
    Gamma([f32; 3]),
    /// Blend a flat color into the image.
    BlendColor {
        /// Blend color.
        color: [u8; 3],
        /// Blend equation.
        mode: BlendMode,
        /// Strength in `0..=1`.
        alpha: f32,
    },
}

impl FilterOp {
    /// Translate one descriptor. `None` for pass-through or unknown types.
    pub fn from_descriptor(d: &FilterDescriptor, seed: u64) -> Option<Self> {
        let op = match d.kind.as_str() {
            "Brightness" => Self::Brightness(d.number("brightness").unwrap_or(0.0)),
            "Contrast" => Self::Contrast(d.number("contrast").unwrap_or(0.0)),
            "Saturation" => Self::Saturation(d.number("saturation").unwrap_or(0.0)),
            "Vibrance" => Self::Vibrance(d.number("vibrance").unwrap_or(0.0)),
            "Highlight" => Self::Highlight(d.number("highlight").unwrap_or(0.0)),
            "Lowlight" => Self::Lowlight(d.number("lowlight").unwrap_or(0.0)),
            "Temperature" => Self::Temperature(d.number("temperature").unwrap_or(0.0)),
            "HueRotation" => Self::ColorMatrix(hue_rotation_matrix(
                d.number("rotation").unwrap_or(0.0),
            )),
            "Blur" => Self::Blur(d.number("blur").unwrap_or(0.0)),
            "Pixelate" => Self::Pixelate(d.number("blocksize").unwrap_or(4.0).max(0.0) as u32),
            "Noise" => Self::Noise {
                amount: d.number("noise").unwrap_or(0.0),
                seed,
            },
            "BlendColor" => Self::BlendColor {
                color: d.color("color", BLEND_DEFAULT_COLOR),
                mode: BlendMode::parse(d.text("mode").unwrap_or("multiply")),
                alpha: d.number("alpha").unwrap_or(1.0).clamp(0.0, 1.0),
            },
            "Sepia" => Self::ColorMatrix(SEPIA),
            "Polaroid" => Self::ColorMatrix(POLAROID),
            "Kodachrome" => Self::ColorMatrix(KODACHROME),
            "Brownie" => Self::ColorMatrix(BROWNIE),
            "Vintage" => Self::ColorMatrix(VINTAGE),
            "Technicolor" => Self::ColorMatrix(TECHNICOLOR),
            "BlackWhite" | "BlacknWhite" => Self::ColorMatrix(BLACK_WHITE),
            "Grayscale" | "Greyscale" => Self::Grayscale,
            "Invert" => Self::Invert,
            "Sharpen" => Self::Convolute(SHARPEN),
            "Emboss" => Self::Convolute(EMBOSS),
            "Convolute" => {
                let m = d.params.get("matrix")?.as_array()?;
                let m: Vec<f32> = m.iter().filter_map(|v| v.as_f64()).map(|v| v as f32).collect();
                Self::Convolute(m.try_into().ok()?)
            }
            "RemoveColor" => Self::RemoveColor {
                color: d.color("color", [255, 255, 255]),
                distance: d.number("distance").unwrap_or(0.5).clamp(0.0, 1.0),
            },
            "Gamma" => Self::Gamma(
                d.params
                    .get("gamma")
                    .and_then(|v| v.as_array())
                    .and_then(|a| {
                        let v: Vec<f32> = a.iter().filter_map(|x| x.as_f64()).map(|x| x as f32).collect();
                        v.try_into().ok()
                    })
                    .unwrap_or(GAMMA_PRESET),
            ),
            _ => return None,
        };
        Some(op)
    }

    fn is_per_pixel(&self) -> bool {
        !matches!(self, Self::Pixelate(_) | Self::Blur(_) | Self::Convolute(_))
    }

    /// Apply a per-pixel op to a band of whole rows starting at row `y0`.
    fn apply_pixels(&self, band: &mut [u8], width: u32, y0: u32) {
        let width = width.max(1) as usize;
        for (i, px) in band.chunks_exact_mut(4).enumerate() {
            let x = (i % width) as u32;
            let y = y0 + (i / width) as u32;
            self.apply_px(px, x, y);
        }
    }

    fn apply_px(&self, px: &mut [u8], x: u32, y: u32) {
        let (r, g, b) = (f32::from(px[0]), f32::from(px[1]), f32::from(px[2]));
        let rgb = match *self {
            Self::Brightness(v) => {
                let d = (v * 255.0).round();
                [r + d, g + d, b + d]
            }
            Self::Contrast(v) => {
                let c = (v * 255.0).floor();
                let f = 259.0 * (c + 255.0) / (255.0 * (259.0 - c));
                [
                    f * (r - 128.0) + 128.0,
                    f * (g - 128.0) + 128.0,
                    f * (b - 128.0) + 128.0,
                ]
            }
            Self::Saturation(v) => {
                let adjust = -v;
                let max = r.max(g).max(b);
                let s = |c: f32| if c != max { c + (max - c) * adjust } else { c };
                [s(r), s(g), s(b)]
            }
            Self::Vibrance(v) => {
                let adjust = -v;
                let max = r.max(g).max(b);
                let avg = (r + g + b) / 3.0;
                let amt = ((max - avg).abs() * 2.0 / 255.0) * adjust;
                let s = |c: f32| if c != max { c + (max - c) * amt } else { c };
                [s(r), s(g), s(b)]
            }
            Self::Highlight(v) => {
                let w = ((luma(r, g, b) / 255.0 - 0.5) * 2.0).max(0.0);
                let d = v * 255.0 * w;
                [r + d, g + d, b + d]
            }
            Self::Lowlight(v) => {
                let w = ((0.5 - luma(r, g, b) / 255.0) * 2.0).max(0.0);
                let d = v * 255.0 * w;
                [r + d, g + d, b + d]
            }
            Self::Temperature(v) => {
                let d = v * 64.0;
                [r + d, g, b - d]
            }
            Self::ColorMatrix(m) => [
                r * m[0] + g * m[1] + b * m[2] + m[4] * 255.0,
                r * m[5] + g * m[6] + b * m[7] + m[9] * 255.0,
                r * m[10] + g * m[11] + b * m[12] + m[14] * 255.0,
            ],
            Self::Grayscale => {
                let v = (r + g + b) / 3.0;
                [v, v, v]
            }
            Self::Invert => [255.0 - r, 255.0 - g, 255.0 - b],
            Self::Noise { amount, seed } => {
                let d = (0.5 - hash_unit(seed, x, y)) * amount;
                [r + d, g + d, b + d]
            }
            Self::RemoveColor { color, distance } => {
                let d = distance * 255.0;
                let within = [r, g, b].iter().zip(color).all(|(&v, c)| {
                    let c = f32::from(c);
                    v > c - d && v < c + d
                });
                if within {
                    px[3] = 0;
                }
                [r, g, b]
            }
            Self::Gamma(gm) => {
                let g1 = |v: f32, k: f32| {
                    if k <= 0.0 {
                        v
                    } else {
                        (v / 255.0).powf(1.0 / k) * 255.0
                    }
                };
                [g1(r, gm[0]), g1(g, gm[1]), g1(b, gm[2])]
            }
            Self::BlendColor { color, mode, alpha } => {
                let t = color.map(|c| f32::from(c) * alpha);
                [
                    mode.apply(r, t[0], alpha),
                    mode.apply(g, t[1], alpha),
                    mode.apply(b, t[2], alpha),
                ]
            }
            Self::Pixelate(_) | Self::Blur(_) | Self::Convolute(_) => return,
        };
        px[0] = clamp_u8(rgb[0]);
        px[1] = clamp_u8(rgb[1]);
        px[2] = clamp_u8(rgb[2]);
    }

    fn apply_spatial(&self, rgba: &mut [u8], width: u32, height: u32) -> BatchboardResult<()> {
        match *self {
            Self::Pixelate(block) => pixelate(rgba, width, height, block),
            Self::Convolute(k) => convolve3(rgba, width, height, &k),
            Self::Blur(strength) => {
                let max_dim = width.max(height) as f32;
                let radius = ((strength.clamp(0.0, 1.0) * max_dim * 0.05).round() as u32)
                    .min(MAX_BLUR_RADIUS);
                if radius == 0 {
                    return Ok(());
                }
                let mut premul = rgba.to_vec();
                premultiply_rgba8_in_place(&mut premul);
                let mut out = blur_rgba8_premul(&premul, width, height, radius, radius as f32 / 2.0)?;
                unpremultiply_rgba8_in_place(&mut out);
                rgba.copy_from_slice(&out);
            }
            _ => {}
        }
        Ok(())
    }
}

fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

/// Hue rotation matrix; `rotation` is in half-turns (`1.0` = 180 degrees).
pub fn hue_rotation_matrix(rotation: f32) -> [f32; 20] {
    let rad = rotation * std::f32::consts::PI;
    let (sin, cos) = rad.sin_cos();
    let third: f32 = 1.0 / 3.0;
    let third_sqrt_sin = third.sqrt() * sin;
    let one_minus_cos = 1.0 - cos;
    let mut m = [0.0f32; 20];
    m[0] = cos + one_minus_cos / 3.0;
    m[1] = third * one_minus_cos - third_sqrt_sin;
    m[2] = third * one_minus_cos + third_sqrt_sin;
    m[5] = third * one_minus_cos + third_sqrt_sin;
    m[6] = cos + third * one_minus_cos;
    m[7] = third * one_minus_cos - third_sqrt_sin;
    m[10] = third * one_minus_cos - third_sqrt_sin;
    m[11] = third * one_minus_cos + third_sqrt_sin;
    m[12] = cos + third * one_minus_cos;
    m[18] = 1.0;
    m
}

fn pixelate(rgba: &mut [u8], width: u32, height: u32, block: u32) {
    if block <= 1 {
        return;
    }
    let (w, h, block) = (width as usize, height as usize, block as usize);
    for by in (0..h).step_by(block) {
        for bx in (0..w).step_by(block) {
            let src = (by * w + bx) * 4;
            let px = [rgba[src], rgba[src + 1], rgba[src + 2], rgba[src + 3]];
            for y in by..(by + block).min(h) {
                for x in bx..(bx + block).min(w) {
                    let i = (y * w + x) * 4;
                    rgba[i..i + 4].copy_from_slice(&px);
                }
            }
        }
    }
}

fn convolve3(rgba: &mut [u8], width: u32, height: u32, k: &[f32; 9]) {
    let src = rgba.to_vec();
    let (w, h) = (width as i64, height as i64);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for cy in 0..3i64 {
                for cx in 0..3i64 {
                    let sy = y + cy - 1;
                    let sx = x + cx - 1;
                    if sy < 0 || sy >= h || sx < 0 || sx >= w {
                        continue;
                    }
                    let wt = k[(cy * 3 + cx) as usize];
                    let si = ((sy * w + sx) as usize) * 4;
                    for c in 0..4 {
                        acc[c] += f32::from(src[si + c]) * wt;
                    }
                }
            }
            let di = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                rgba[di + c] = clamp_u8(acc[c]);
            }
        }
    }
}

/// Application order of filter types. Aliases share a slot.
const CANONICAL_ORDER: &[&[&str]] = &[
    &["Brightness"],
    &["Blur"],
    &["Contrast"],
    &["Saturation"],
    &["HueRotation"],
    &["Lowlight"],
    &["Highlight"],
    &["Temperature"],
    &["Vibrance"],
    &["Pixelate"],
    &["Noise"],
    &["Polaroid"],
    &["Sepia"],
    &["Kodachrome"],
    &["Grayscale", "Greyscale"],
    &["Brownie"],
    &["Vintage"],
    &["Technicolor"],
    &["Invert"],
    &["Sharpen"],
    &["Emboss"],
    &["Convolute"],
    &["RemoveColor"],
    &["BlackWhite", "BlacknWhite"],
    &["Gamma"],
    &["BlendColor"],
];

/// Ordered list of pixel operations built from a descriptor list.
///
/// Operations run in a fixed canonical order regardless of descriptor order, and when a type
/// appears more than once the last descriptor wins. Rebuilt from descriptors on every use;
/// applying the same stack to the same pixels always yields the same result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterStack {
    ops: SmallVec<[FilterOp; 4]>,
}

impl FilterStack {
    /// Build the stack. Unknown types are skipped with a warning.
    pub fn from_descriptors(descriptors: &[FilterDescriptor], seed: u64) -> Self {
        for d in descriptors {
            let known = d.kind == "None"
                || CANONICAL_ORDER
                    .iter()
                    .any(|names| names.contains(&d.kind.as_str()));
            if !known {
                tracing::warn!(kind = %d.kind, "skipping unsupported filter");
            }
        }

        let mut ops = SmallVec::new();
        for names in CANONICAL_ORDER {
            let Some(d) = descriptors
                .iter()
                .rev()
                .find(|d| names.contains(&d.kind.as_str()))
            else {
                continue;
            };
            match FilterOp::from_descriptor(d, seed) {
                Some(op) => ops.push(op),
                None => tracing::warn!(kind = %d.kind, "filter descriptor has unusable parameters"),
            }
        }
        Self { ops }
    }

    /// Operations in application order.
    pub fn ops(&self) -> &[FilterOp] {
        &self.ops
    }

    /// `true` when applying the stack leaves pixels unchanged.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply every operation to a straight-alpha RGBA8 buffer in place.
    pub fn apply(
        &self,
        rgba: &mut [u8],
        width: u32,
        height: u32,
        backend: &mut FilterBackend,
    ) -> BatchboardResult<()> {
        if self.ops.is_empty() || width == 0 || height == 0 {
            return Ok(());
        }
        let plan = backend.plan_for(width, height);
        for op in &self.ops {
            if !op.is_per_pixel() {
                op.apply_spatial(rgba, width, height)?;
                continue;
            }
            match plan {
                ProcessingPlan::Tiled { rows } => {
                    let rows = rows.min(height);
                    let band_len = (rows as usize) * (width as usize) * 4;
                    rgba.par_chunks_mut(band_len)
                        .enumerate()
                        .for_each(|(i, band)| op.apply_pixels(band, width, i as u32 * rows));
                }
                ProcessingPlan::FullFrame => op.apply_pixels(rgba, width, 0),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filters.rs"]
mod tests;
