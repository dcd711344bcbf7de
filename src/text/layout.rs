use std::borrow::Cow;
use std::collections::HashMap;

use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::foundation::error::{BatchboardError, BatchboardResult};
use crate::template::color::ColorDef;
use crate::template::layer::{ListStyle, TextAlign, TextLayer};
use crate::text::fonts::FontEntry;
use crate::text::path::{PathSampler, TextPath, truncate_to_path};

/// Character spacing above which curved text stops centering on the curve.
const LEFT_ALIGN_SPACING: f64 = 10.0;

/// RGBA8 brush color carried through Parley layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<ColorDef> for TextBrush {
    fn from(c: ColorDef) -> Self {
        let [r, g, b, a] = c.to_rgba8();
        Self { r, g, b, a }
    }
}

/// One glyph in text-box space: origin on the baseline, rotated by `angle` radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    /// Glyph id in the run's font.
    pub id: u32,
    /// Baseline origin x.
    pub x: f64,
    /// Baseline origin y.
    pub y: f64,
    /// Rotation around the origin.
    pub angle: f64,
    /// Horizontal advance before rotation.
    pub advance: f64,
}

/// Glyphs sharing a font, size and brush.
#[derive(Clone)]
pub struct PlacedRun {
    /// Font the glyph ids index into.
    pub font: vello_cpu::peniko::FontData,
    /// Pixel size.
    pub font_size: f32,
    /// Fill color.
    pub brush: TextBrush,
    /// Positioned glyphs.
    pub glyphs: Vec<PlacedGlyph>,
}

impl std::fmt::Debug for PlacedRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacedRun")
            .field("font_size", &self.font_size)
            .field("brush", &self.brush)
            .field("glyphs", &self.glyphs.len())
            .finish()
    }
}

/// Laid-out text, ready to draw at the text box's content origin.
#[derive(Clone, Debug, Default)]
pub struct TextBlock {
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Glyph runs.
    pub runs: Vec<PlacedRun>,
    /// Underline rectangles.
    pub decorations: Vec<Rect>,
    /// Text actually laid out (after list prefixes or path truncation).
    pub text: String,
}

/// Style shared by every glyph of a text layer.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Registered family to request.
    pub family: String,
    /// Pixel size.
    pub size: f32,
    /// Line height as a multiple of the size.
    pub line_height: f32,
    /// Extra advance after every character, in pixels.
    pub letter_spacing: f32,
    /// Paragraph alignment.
    pub align: TextAlign,
    /// Draw an underline below every line.
    pub underline: bool,
    /// Fill color.
    pub brush: TextBrush,
}

impl TextStyle {
    /// Style for `layer` drawn with `family` in `fill`.
    pub fn for_layer(layer: &TextLayer, family: String, fill: ColorDef) -> Self {
        Self {
            family,
            size: layer.font_size as f32,
            line_height: layer.line_height as f32,
            letter_spacing: (layer.char_spacing * layer.font_size / 1000.0) as f32,
            align: layer.align,
            underline: layer.underline,
            brush: fill.into(),
        }
    }
}

/// Prefix every paragraph with its bullet or number.
pub fn list_text(text: &str, list: &ListStyle) -> String {
    match list {
        ListStyle::None => text.to_string(),
        ListStyle::Bullet(bullet) => text
            .split('\n')
            .map(|p| format!("{bullet} {p}"))
            .collect::<Vec<_>>()
            .join("\n"),
        ListStyle::Number => text
            .split('\n')
            .enumerate()
            .map(|(i, p)| format!("{}. {p}", i + 1))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// A glyph of a single laid-out line: id, pen position and advance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineGlyph {
    /// Glyph id.
    pub id: u32,
    /// Pen x relative to the line start.
    pub x: f64,
    /// Horizontal advance.
    pub advance: f64,
}

/// Place a single line of glyphs along `path`.
///
/// The run is centered on the curve (or starts at its beginning when `left_aligned`), shifted
/// by the curve's start offset. Each glyph is centered on its sample point and rotated to the
/// tangent; `baseline_shift` moves the baseline below the curve.
pub fn place_along_path(
    glyphs: &[LineGlyph],
    run_width: f64,
    path: &TextPath,
    sampler: &PathSampler,
    left_aligned: bool,
    baseline_shift: f64,
) -> Vec<PlacedGlyph> {
    let length = sampler.length();
    let start = if left_aligned {
        path.start_offset
    } else {
        (length - run_width) / 2.0 + path.start_offset
    };

    glyphs
        .iter()
        .filter_map(|g| {
            let mut s = start + g.x + g.advance / 2.0;
            if path.closed && length > 0.0 {
                s = s.rem_euclid(length);
            }
            let (at, angle) = sampler.sample(s)?;
            let origin = at + (Affine::rotate(angle) * Point::new(-g.advance / 2.0, baseline_shift)).to_vec2();
            Some(PlacedGlyph {
                id: g.id,
                x: origin.x,
                y: origin.y,
                angle,
                advance: g.advance,
            })
        })
        .collect()
}

/// Stateful helper for building Parley text layouts.
///
/// One engine lives on each render worker; downloaded font files are registered once per
/// engine, keyed by content hash.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    registered: HashMap<u64, String>,
    cpu_fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
            cpu_fonts: HashMap::new(),
        }
    }

    /// Family name to request for `font`, registering its file on first use.
    pub fn family_for(&mut self, font: &FontEntry) -> BatchboardResult<String> {
        let Some(data) = &font.data else {
            return Ok(font.family.clone());
        };
        if let Some(name) = self.registered.get(&font.content_id) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(data.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            BatchboardError::asset(format!("no font families registered for '{}'", font.family))
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| BatchboardError::asset("registered font family has no name"))?
            .to_string();

        tracing::debug!(requested = %font.family, registered = %name, "registered font");
        self.registered.insert(font.content_id, name.clone());
        Ok(name)
    }

    fn build(
        &mut self,
        text: &str,
        style: &TextStyle,
        max_width: Option<f32>,
    ) -> BatchboardResult<parley::Layout<TextBrush>> {
        if !style.size.is_finite() || style.size <= 0.0 {
            return Err(BatchboardError::validation("font size must be finite and > 0"));
        }

        let stack = format!("\"{}\", sans-serif", style.family.replace('"', ""));
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(stack)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size));
        builder.push_default(parley::style::StyleProperty::LineHeight(
            parley::style::LineHeight::FontSizeRelative(style.line_height),
        ));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(style.letter_spacing));
        builder.push_default(parley::style::StyleProperty::Brush(style.brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(max_width);
        let alignment = match style.align {
            TextAlign::Left => parley::Alignment::Start,
            TextAlign::Center => parley::Alignment::Center,
            TextAlign::Right => parley::Alignment::End,
            TextAlign::Justify => parley::Alignment::Justify,
        };
        layout.align(max_width, alignment, parley::AlignmentOptions::default());
        Ok(layout)
    }

    fn cpu_font(&mut self, blob_id: u64, index: u32, bytes: &[u8]) -> vello_cpu::peniko::FontData {
        self.cpu_fonts
            .entry((blob_id, index))
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(bytes.to_vec()),
                    index,
                )
            })
            .clone()
    }

    /// Collect glyph runs of `layout`, offset by `dx`.
    fn collect_runs(
        &mut self,
        layout: &parley::Layout<TextBrush>,
        dx: f64,
        underline: bool,
    ) -> (Vec<PlacedRun>, Vec<Rect>) {
        let mut runs = Vec::new();
        let mut decorations = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let run = glyph_run.run();
                let font = run.font();
                let cpu_font = self.cpu_font(font.data.id(), font.index, font.data.data());
                let font_size = run.font_size();

                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let glyphs = glyph_run
                    .glyphs()
                    .map(|g| {
                        let placed = PlacedGlyph {
                            id: u32::from(g.id),
                            x: dx + f64::from(x + g.x),
                            y: f64::from(y - g.y),
                            angle: 0.0,
                            advance: f64::from(g.advance),
                        };
                        x += g.advance;
                        placed
                    })
                    .collect::<Vec<_>>();

                if underline {
                    let x0 = dx + f64::from(glyph_run.offset());
                    let top = f64::from(y) + f64::from(font_size) * 0.1;
                    let thickness = (f64::from(font_size) / 15.0).max(1.0);
                    decorations.push(Rect::new(
                        x0,
                        top,
                        x0 + f64::from(glyph_run.advance()),
                        top + thickness,
                    ));
                }
                runs.push(PlacedRun {
                    font: cpu_font,
                    font_size,
                    brush: glyph_run.style().brush,
                    glyphs,
                });
            }
        }
        (runs, decorations)
    }

    /// Lay out a text box `box_width` wide: wrapped paragraphs, optional list prefixes.
    pub fn layout_box(
        &mut self,
        layer: &TextLayer,
        style: &TextStyle,
        box_width: f64,
    ) -> BatchboardResult<TextBlock> {
        let text = list_text(&layer.text, &layer.list);
        let indent = match layer.list {
            ListStyle::None => 0.0,
            _ => layer.font_size,
        };
        let wrap = (box_width - indent).max(1.0) as f32;
        let layout = self.build(&text, style, Some(wrap))?;
        let (runs, decorations) = self.collect_runs(&layout, indent, style.underline);
        Ok(TextBlock {
            width: box_width,
            height: f64::from(layout.height()),
            runs,
            decorations,
            text,
        })
    }

    /// Advance of a single character.
    pub fn char_width(&mut self, ch: char, style: &TextStyle) -> BatchboardResult<f64> {
        let mut buf = [0u8; 4];
        let layout = self.build(ch.encode_utf8(&mut buf), style, None)?;
        Ok(f64::from(layout.width()))
    }

    /// Lay the layer's source text along `path`, dropping what does not fit.
    pub fn layout_on_path(
        &mut self,
        layer: &TextLayer,
        style: &TextStyle,
        path: &TextPath,
    ) -> BatchboardResult<TextBlock> {
        let sampler = PathSampler::new(&path.path);
        let mut widths: HashMap<char, f64> = HashMap::new();
        let text = {
            let mut measure = |ch: char| {
                *widths
                    .entry(ch)
                    .or_insert_with(|| self.char_width(ch, style).unwrap_or(0.0))
            };
            truncate_to_path(&layer.source_text, sampler.length(), layer.char_spacing / 22.0, &mut measure)
        };

        let single_line = TextStyle {
            align: TextAlign::Left,
            ..style.clone()
        };
        let layout = self.build(&text, &single_line, None)?;
        let (runs, _) = self.collect_runs(&layout, 0.0, false);

        let bounds = kurbo::Shape::bounding_box(&path.path);
        let origin = Vec2::new(-bounds.x0, -bounds.y0);
        let baseline_shift = if style.underline {
            0.0
        } else {
            f64::from(style.size) * 0.3
        };
        let left_aligned = layer.char_spacing > LEFT_ALIGN_SPACING;
        let run_width = f64::from(layout.width());

        let runs = runs
            .into_iter()
            .map(|run| {
                let line: Vec<LineGlyph> = run
                    .glyphs
                    .iter()
                    .map(|g| LineGlyph {
                        id: g.id,
                        x: g.x,
                        advance: g.advance,
                    })
                    .collect();
                let glyphs = place_along_path(&line, run_width, path, &sampler, left_aligned, baseline_shift)
                    .into_iter()
                    .map(|g| PlacedGlyph {
                        x: g.x + origin.x,
                        y: g.y + origin.y,
                        ..g
                    })
                    .collect();
                PlacedRun { glyphs, ..run }
            })
            .collect();

        Ok(TextBlock {
            width: bounds.width().max(1.0),
            height: bounds.height().max(1.0),
            runs,
            decorations: Vec::new(),
            text,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
