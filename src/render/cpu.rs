use std::sync::Arc;

use kurbo::PathEl;

use crate::assets::svg::render_svg;
use crate::effects::composite::{blur_rgba8_premul, mask_in_place, over_in_place, shift, tint_alpha};
use crate::foundation::core::{Affine, BezPath, Canvas, Rect};
use crate::foundation::error::{BatchboardError, BatchboardResult};
use crate::import::scene::{ClipShape, ImagePixels, NodeContent, Scene, SceneNode, StrokeSpec};
use crate::template::color::ColorDef;
use crate::template::layer::Shadow;
use crate::template::model::{LineCapDef, LineJoinDef};
use crate::text::layout::TextBlock;

/// Premultiplied RGBA8 surface the size of the output canvas.
type Surface = Vec<u8>;

/// CPU rasterizer powered by `vello_cpu` for vector, image and text drawing.
///
/// Every node is drawn into its own canvas-sized surface, clipped there, and composited over
/// its parent with the node's opacity. The `vello_cpu` context is reused between draws of the
/// same size.
#[derive(Default)]
pub struct CpuRasterizer {
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuRasterizer {
    /// Rasterizer with no context allocated yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `scene` onto a transparent `canvas`; `view` maps template space to pixels.
    ///
    /// Returns premultiplied RGBA8 bytes.
    pub fn render(&mut self, scene: &Scene, view: Affine, canvas: Canvas) -> BatchboardResult<Vec<u8>> {
        let mut out = vec![0u8; canvas.byte_len()];
        self.composite_nodes(&scene.nodes, view, canvas, &mut out)?;
        Ok(out)
    }

    fn with_ctx_mut<R>(
        &mut self,
        canvas: Canvas,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> BatchboardResult<R>,
    ) -> BatchboardResult<(R, Surface)> {
        let (width, height) = canvas_u16(canvas)?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let out = f(&mut ctx)?;
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);
        Ok((out, pixmap.data_as_u8_slice().to_vec()))
    }

    fn composite_nodes(
        &mut self,
        nodes: &[SceneNode],
        view: Affine,
        canvas: Canvas,
        dst: &mut [u8],
    ) -> BatchboardResult<()> {
        for node in nodes {
            if node.opacity <= 0.0 {
                continue;
            }
            let surface = self.render_node(node, view, canvas)?;
            over_in_place(dst, &surface, node.opacity.clamp(0.0, 1.0) as f32)?;
        }
        Ok(())
    }

    /// Content, clips and shadow of one node, before its opacity.
    fn render_node(&mut self, node: &SceneNode, view: Affine, canvas: Canvas) -> BatchboardResult<Surface> {
        let mut surface = match &node.content {
            NodeContent::Group(children) => {
                let mut group = vec![0u8; canvas.byte_len()];
                self.composite_nodes(children, view, canvas, &mut group)?;
                group
            }
            content => self.draw_content(content, view, canvas)?,
        };

        for clip in &node.clips {
            let coverage = self.coverage(clip, view, canvas)?;
            mask_in_place(&mut surface, &coverage)?;
        }

        match &node.shadow {
            Some(shadow) if shadow.color.a > 0.0 => {
                let mut shadowed = drop_shadow(&surface, shadow, view, canvas)?;
                over_in_place(&mut shadowed, &surface, 1.0)?;
                Ok(shadowed)
            }
            _ => Ok(surface),
        }
    }

    fn draw_content(&mut self, content: &NodeContent, view: Affine, canvas: Canvas) -> BatchboardResult<Surface> {
        match content {
            NodeContent::Svg {
                tree,
                transform,
                tint,
            } => {
                let drawn = render_svg(tree, view * *transform, canvas.width, canvas.height)?;
                Ok(match tint {
                    Some(color) => tint_alpha(&drawn, color.to_rgba8_premul()),
                    None => drawn,
                })
            }
            NodeContent::Group(_) => Ok(vec![0u8; canvas.byte_len()]),
            NodeContent::Shape {
                path,
                transform,
                fill,
                stroke,
                uniform_stroke,
            } => {
                let (_, surface) = self.with_ctx_mut(canvas, |ctx| {
                    draw_shape(ctx, path, view, *transform, *fill, stroke.as_ref(), *uniform_stroke);
                    Ok(())
                })?;
                Ok(surface)
            }
            NodeContent::Image { pixels, transform } => {
                let paint = image_paint(pixels)?;
                let (_, surface) = self.with_ctx_mut(canvas, |ctx| {
                    ctx.set_transform(affine_to_cpu(view * *transform));
                    ctx.set_paint(paint);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        0.0,
                        0.0,
                        f64::from(pixels.width),
                        f64::from(pixels.height),
                    ));
                    Ok(())
                })?;
                Ok(surface)
            }
            NodeContent::Text { block, transform } => {
                let (_, surface) = self.with_ctx_mut(canvas, |ctx| {
                    draw_text(ctx, block, view * *transform);
                    Ok(())
                })?;
                Ok(surface)
            }
        }
    }

    fn coverage(&mut self, clip: &ClipShape, view: Affine, canvas: Canvas) -> BatchboardResult<Surface> {
        match clip {
            ClipShape::Svg { tree, transform } => {
                render_svg(tree, view * *transform, canvas.width, canvas.height)
            }
            ClipShape::Path(path) => {
                let (_, surface) = self.with_ctx_mut(canvas, |ctx| {
                    ctx.set_transform(affine_to_cpu(view));
                    ctx.set_fill_rule(vello_cpu::peniko::Fill::NonZero);
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
                    ctx.fill_path(&bezpath_to_cpu(path));
                    Ok(())
                })?;
                Ok(surface)
            }
        }
    }
}

fn canvas_u16(canvas: Canvas) -> BatchboardResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| BatchboardError::render("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| BatchboardError::render("canvas height exceeds u16"))?;
    Ok((w, h))
}

fn paint_color(c: ColorDef) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.to_rgba8();
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn cpu_stroke(s: &StrokeSpec) -> vello_cpu::kurbo::Stroke {
    use vello_cpu::kurbo::{Cap, Join};

    let mut stroke = vello_cpu::kurbo::Stroke::new(s.width);
    stroke.miter_limit = s.miter_limit;
    stroke.join = match s.join {
        LineJoinDef::Bevel => Join::Bevel,
        LineJoinDef::Miter => Join::Miter,
        LineJoinDef::Round => Join::Round,
    };
    let cap = match s.cap {
        LineCapDef::Butt => Cap::Butt,
        LineCapDef::Round => Cap::Round,
        LineCapDef::Square => Cap::Square,
    };
    stroke.start_cap = cap;
    stroke.end_cap = cap;
    stroke
}

fn draw_shape(
    ctx: &mut vello_cpu::RenderContext,
    path: &BezPath,
    view: Affine,
    transform: Affine,
    fill: Option<ColorDef>,
    stroke: Option<&StrokeSpec>,
    uniform_stroke: bool,
) {
    if let Some(fill) = fill.filter(|c| c.a > 0.0) {
        ctx.set_transform(affine_to_cpu(view * transform));
        ctx.set_fill_rule(vello_cpu::peniko::Fill::NonZero);
        ctx.set_paint(paint_color(fill));
        ctx.fill_path(&bezpath_to_cpu(path));
    }
    let Some(stroke) = stroke.filter(|s| s.width > 0.0) else {
        return;
    };
    ctx.set_paint(paint_color(stroke.color));
    ctx.set_stroke(cpu_stroke(stroke));
    if uniform_stroke {
        // Width stays in template units whatever the object's own scale.
        ctx.set_transform(affine_to_cpu(view));
        ctx.stroke_path(&bezpath_to_cpu(&(transform * path.clone())));
    } else {
        ctx.set_transform(affine_to_cpu(view * transform));
        ctx.stroke_path(&bezpath_to_cpu(path));
    }
}

fn draw_text(ctx: &mut vello_cpu::RenderContext, block: &TextBlock, to_canvas: Affine) {
    for run in &block.runs {
        let b = run.brush;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
        if run.glyphs.iter().all(|g| g.angle == 0.0) {
            ctx.set_transform(affine_to_cpu(to_canvas));
            let glyphs = run.glyphs.iter().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x as f32,
                y: g.y as f32,
            });
            ctx.glyph_run(&run.font).font_size(run.font_size).fill_glyphs(glyphs);
            continue;
        }
        for g in &run.glyphs {
            let at = to_canvas * Affine::translate((g.x, g.y)) * Affine::rotate(g.angle);
            ctx.set_transform(affine_to_cpu(at));
            ctx.glyph_run(&run.font)
                .font_size(run.font_size)
                .fill_glyphs(std::iter::once(vello_cpu::Glyph {
                    id: g.id,
                    x: 0.0,
                    y: 0.0,
                }));
        }
    }

    if block.decorations.is_empty() {
        return;
    }
    if let Some(first) = block.runs.first() {
        let b = first.brush;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
    }
    ctx.set_transform(affine_to_cpu(to_canvas));
    for r in &block.decorations {
        ctx.fill_rect(&rect_to_cpu(*r));
    }
}

fn drop_shadow(surface: &[u8], shadow: &Shadow, view: Affine, canvas: Canvas) -> BatchboardResult<Surface> {
    let scale = view.as_coeffs()[0].abs().max(f64::EPSILON);
    let tinted = tint_alpha(surface, shadow.color.to_rgba8_premul());
    let moved = shift(
        &tinted,
        canvas.width,
        canvas.height,
        (shadow.offset_x * scale).round() as i32,
        (shadow.offset_y * scale).round() as i32,
    );
    let radius = (shadow.blur * scale).round().max(0.0) as u32;
    if radius == 0 {
        return Ok(moved);
    }
    blur_rgba8_premul(&moved, canvas.width, canvas.height, radius, radius as f32 / 2.0)
}

fn image_paint(pixels: &ImagePixels) -> BatchboardResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(&pixels.premul, pixels.width, pixels.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> BatchboardResult<vello_cpu::Pixmap> {
    let (w, h) = canvas_u16(Canvas { width, height })
        .map_err(|_| BatchboardError::render(format!("image {width}x{height} is too large to draw")))?;
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(BatchboardError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
