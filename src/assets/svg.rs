use std::sync::{Arc, OnceLock};

use anyhow::Context;

use crate::foundation::core::Affine;
use crate::foundation::error::{BatchboardError, BatchboardResult};
use crate::template::color::ColorDef;
use crate::template::layer::SubStroke;
use crate::template::model::LineJoinDef;

const PAINT_KEYS: [&str; 3] = ["stop-color", "stroke", "fill"];
const MAX_RASTER_DIM: u32 = 16_384;

/// Parsed SVG document.
#[derive(Clone, Debug)]
pub struct PreparedSvg {
    /// Parsed `usvg` tree.
    pub tree: Arc<usvg::Tree>,
}

impl PreparedSvg {
    /// Intrinsic size of the document.
    pub fn size(&self) -> (f64, f64) {
        let s = self.tree.size();
        (f64::from(s.width()), f64::from(s.height()))
    }
}

fn shared_fontdb() -> Arc<usvg::fontdb::Database> {
    static DB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    })
    .clone()
}

/// Parse SVG bytes. `<text>` elements resolve against the system fonts.
pub fn parse_svg(bytes: &[u8]) -> BatchboardResult<PreparedSvg> {
    let opts = usvg::Options {
        fontdb: shared_fontdb(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

fn same_rgb(a: ColorDef, b: ColorDef) -> bool {
    a.to_rgba8()[..3] == b.to_rgba8()[..3]
}

fn replacement(value: &str, pairs: &[(ColorDef, ColorDef)]) -> Option<String> {
    let color = ColorDef::parse(value.trim()).ok()?;
    pairs
        .iter()
        .find(|(from, _)| same_rgb(*from, color))
        .map(|(_, to)| to.to_hex())
}

/// Replace `fill`, `stroke` and `stop-color` values that match an original color of `pairs`.
///
/// Both attribute (`fill="#fff"`) and inline style (`fill:#fff`) forms are rewritten.
pub fn recolor_svg(markup: &str, pairs: &[(ColorDef, ColorDef)]) -> String {
    if pairs.is_empty() {
        return markup.to_owned();
    }
    let bytes = markup.as_bytes();
    let mut out = String::with_capacity(markup.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        let Some(key) = PAINT_KEYS.iter().find(|k| bytes[i..].starts_with(k.as_bytes())) else {
            i += 1;
            continue;
        };
        let at_boundary = i == 0 || !(bytes[i - 1].is_ascii_alphanumeric() || bytes[i - 1] == b'-');
        let mut j = i + key.len();
        while bytes.get(j).is_some_and(u8::is_ascii_whitespace) {
            j += 1;
        }

        let span = match bytes.get(j).copied() {
            Some(b'=') if at_boundary => {
                j += 1;
                while bytes.get(j).is_some_and(u8::is_ascii_whitespace) {
                    j += 1;
                }
                match bytes.get(j).copied() {
                    Some(q @ (b'"' | b'\'')) => {
                        let start = j + 1;
                        bytes[start..]
                            .iter()
                            .position(|&b| b == q)
                            .map(|len| (start, start + len))
                    }
                    _ => None,
                }
            }
            Some(b':') if at_boundary => {
                let start = j + 1;
                let len = bytes[start..]
                    .iter()
                    .position(|b| matches!(b, b';' | b'"' | b'\'' | b'}' | b'<'))
                    .unwrap_or(bytes.len() - start);
                Some((start, start + len))
            }
            _ => None,
        };

        let Some((start, end)) = span else {
            i += key.len();
            continue;
        };
        if let Some(hex) = replacement(&markup[start..end], pairs) {
            out.push_str(&markup[copied..start]);
            out.push_str(&hex);
            copied = end;
        }
        i = end;
    }
    out.push_str(&markup[copied..]);
    out
}

fn join_css(join: LineJoinDef) -> &'static str {
    match join {
        LineJoinDef::Miter => "miter",
        LineJoinDef::Round => "round",
        LineJoinDef::Bevel => "bevel",
    }
}

/// Add a uniform stroke to every basic shape of the document.
///
/// Markup without an `<svg>` root, or strokes without width or color, are returned unchanged.
pub fn stroke_sub_shapes(markup: &str, stroke: &SubStroke) -> String {
    let Some(color) = stroke.color.filter(|_| stroke.width > 0.0) else {
        return markup.to_owned();
    };
    let Some(root) = markup.find("<svg") else {
        return markup.to_owned();
    };
    let Some(close) = markup[root..].find('>').map(|p| root + p + 1) else {
        return markup.to_owned();
    };
    if markup[..close].ends_with("/>") {
        return markup.to_owned();
    }

    let style = format!(
        "<style>path,rect,circle,ellipse,line,polyline,polygon{{stroke:{};stroke-opacity:{};stroke-width:{};stroke-linejoin:{}}}</style>",
        color.to_hex(),
        color.a,
        stroke.width,
        join_css(stroke.join),
    );
    let mut out = String::with_capacity(markup.len() + style.len());
    out.push_str(&markup[..close]);
    out.push_str(&style);
    out.push_str(&markup[close..]);
    out
}

/// Rasterize `tree` into a `width x height` premultiplied RGBA8 surface.
///
/// `transform` maps SVG user space into surface pixels.
pub fn render_svg(
    tree: &usvg::Tree,
    transform: Affine,
    width: u32,
    height: u32,
) -> BatchboardResult<Vec<u8>> {
    if width > MAX_RASTER_DIM || height > MAX_RASTER_DIM {
        return Err(BatchboardError::render(format!(
            "svg raster size too large: {width}x{height} (max {MAX_RASTER_DIM}x{MAX_RASTER_DIM})"
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| BatchboardError::render("failed to allocate svg pixmap"))?;

    let [a, b, c, d, e, f] = transform.as_coeffs();
    let xform = resvg::tiny_skia::Transform::from_row(
        a as f32, b as f32, c as f32, d as f32, e as f32, f as f32,
    );
    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.take())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg.rs"]
mod tests;
