use std::collections::HashSet;
use std::sync::Arc;

use kurbo::Shape;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::assets::fetch::AssetFetcher;
use crate::assets::svg::{PreparedSvg, parse_svg, recolor_svg, stroke_sub_shapes};
use crate::effects::backend::FilterBackend;
use crate::effects::filters::{FilterDescriptor, FilterStack};
use crate::foundation::core::{Affine, BezPath, Rect};
use crate::foundation::error::{BatchboardError, BatchboardResult};
use crate::foundation::math::Fnv1a64;
use crate::geometry::clip::{bind_mask_clip, layer_outline, radius_helpers, rehome_clip};
use crate::geometry::fit::fit_image_into_frame;
use crate::geometry::transform::{content_matrix, flatten_into, object_matrix};
use crate::import::scene::{ClipShape, ImagePixels, NodeContent, Scene, SceneNode, StrokeSpec};
use crate::template::color::ColorDef;
use crate::template::layer::{
    GroupLayer, ImageLayer, ImageRole, Layer, LayerKind, ListStyle, MaskLayer, PathLayer, Placement,
    StrokeStyle, Template, TextLayer, VectorLayer,
};
use crate::template::model::{LineCapDef, LineJoinDef};
use crate::template::store::LayerStore;
use crate::text::fonts::FontCache;
use crate::text::layout::{TextLayoutEngine, TextStyle};
use crate::text::path::text_path;

/// Prefix of the radius clip ids saved by the editor; recomputed on import.
const RADIUS_MASK_PREFIX: &str = "radiusMask-";
/// Mask fill opacities below this are treated as "no visible fill".
const MIN_MASK_FILL_OPACITY: f64 = 0.01;
const HIDDEN_MASK_FILL_OPACITY: f64 = 0.001;

/// Turns a normalized template into a [`Scene`], one layer at a time.
///
/// Asset failures drop only the affected layer, unless the layer id is listed as required, in
/// which case the error is returned and the whole row fails.
pub struct LayerImporter<'a> {
    fetcher: &'a dyn AssetFetcher,
    fonts: &'a FontCache,
    text: &'a mut TextLayoutEngine,
    filters: &'a mut FilterBackend,
    required: HashSet<String>,
}

impl<'a> LayerImporter<'a> {
    /// Importer borrowing the batch-wide collaborators and the worker's own engines.
    pub fn new(
        fetcher: &'a dyn AssetFetcher,
        fonts: &'a FontCache,
        text: &'a mut TextLayoutEngine,
        filters: &'a mut FilterBackend,
    ) -> Self {
        Self {
            fetcher,
            fonts,
            text,
            filters,
            required: HashSet::new(),
        }
    }

    /// Layers whose asset failures must fail the import instead of dropping the layer.
    pub fn with_required(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.required.extend(ids);
        self
    }

    /// Import every layer of `template` in paint order.
    #[tracing::instrument(level = "debug", skip_all, fields(template = %template.id))]
    pub fn import(&mut self, template: &Template) -> BatchboardResult<Scene> {
        let store = LayerStore::new(template);
        let mut nodes = Vec::with_capacity(template.layers.len());
        for layer in &template.layers {
            nodes.extend(self.import_soft(layer, layer.placement, None, &store)?);
        }
        Ok(Scene {
            width: template.frame_width,
            height: template.frame_height,
            nodes,
        })
    }

    fn import_soft(
        &mut self,
        layer: &Layer,
        placement: Placement,
        group: Option<Affine>,
        store: &LayerStore<'_>,
    ) -> BatchboardResult<Vec<SceneNode>> {
        match self.import_layer(layer, placement, group, store) {
            Ok(nodes) => Ok(nodes),
            Err(err) if self.required.contains(&layer.id) => Err(err),
            Err(err) => {
                tracing::warn!(
                    id = %layer.id,
                    kind = layer.kind.label(),
                    error = %err,
                    "dropping layer that failed to import"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Import one layer placed at `placement` (already in template space).
    pub fn import_layer(
        &mut self,
        layer: &Layer,
        placement: Placement,
        group: Option<Affine>,
        store: &LayerStore<'_>,
    ) -> BatchboardResult<Vec<SceneNode>> {
        let mut nodes = match &layer.kind {
            LayerKind::Artboard(_) => artboard_node(layer, &placement).into_iter().collect(),
            LayerKind::Text(t) => vec![self.text_node(layer, t, &placement)?],
            LayerKind::Image(img) => self.image_nodes(layer, img, &placement)?,
            LayerKind::Vector(v) => vec![self.vector_node(layer, v, &placement)?],
            LayerKind::Path(p) => vec![path_node(layer, p, &placement)?],
            LayerKind::Mask(m) => self.mask_nodes(layer, m, &placement, group)?,
            LayerKind::Group(g) => self.group_node(layer, g, &placement, store)?.into_iter().collect(),
        };

        // Mask backdrops sit under the primary node, radius outlines on top of it.
        let primary = match &layer.kind {
            LayerKind::Image(_) => nodes.first_mut(),
            _ => nodes.last_mut(),
        };
        if let Some(node) = primary {
            node.shadow = layer.shadow.clone();
            if let Some(clip) = resolve_clip_ref(layer, store) {
                node.clips.push(clip);
            }
        }
        Ok(nodes)
    }

    fn text_node(
        &mut self,
        layer: &Layer,
        t: &TextLayer,
        p: &Placement,
    ) -> BatchboardResult<SceneNode> {
        let entry = self
            .fonts
            .resolve(&t.font_family, t.font_url.as_deref(), self.fetcher);
        let family = match self.text.family_for(&entry) {
            Ok(family) => family,
            Err(err) => {
                let substitute = self.fonts.fallback().for_family(&t.font_family).to_string();
                tracing::warn!(
                    id = %layer.id,
                    family = %t.font_family,
                    %substitute,
                    error = %err,
                    "font registration failed, using fallback"
                );
                substitute
            }
        };
        let fill = layer.fill.unwrap_or(ColorDef::rgba(0.0, 0.0, 0.0, 1.0));
        let style = TextStyle::for_layer(t, family, fill);

        let curve = match (&t.transform, &t.list, t.editing) {
            (Some(tt), ListStyle::None, false) => text_path(tt, p.width, t.font_size),
            _ => None,
        };
        let block = match curve {
            Some(curve) => self.text.layout_on_path(t, &style, &curve)?,
            None => self.text.layout_box(t, &style, p.width)?,
        };

        let placed = Placement {
            width: block.width,
            height: block.height,
            ..*p
        };
        Ok(SceneNode::new(
            layer.id.clone(),
            p.opacity,
            NodeContent::Text {
                transform: content_matrix(&placed),
                block,
            },
        ))
    }

    fn load_raster(&self, src: &str, crop_x: f64, crop_y: f64) -> BatchboardResult<DecodedImage> {
        if src.trim().is_empty() {
            return Err(BatchboardError::asset("layer has no image source"));
        }
        let bytes = self.fetcher.fetch(src)?;
        let decoded = decode_image(&bytes)?;
        Ok(decoded.crop(crop_x.round() as u32, crop_y.round() as u32, 0, 0))
    }

    fn filtered(
        &mut self,
        mut image: DecodedImage,
        filters: &[FilterDescriptor],
        id: &str,
    ) -> BatchboardResult<ImagePixels> {
        let stack = FilterStack::from_descriptors(filters, filter_seed(id));
        stack.apply(&mut image.rgba8, image.width, image.height, self.filters)?;
        Ok(ImagePixels {
            width: image.width,
            height: image.height,
            premul: Arc::new(image.to_premul()),
        })
    }

    fn image_nodes(
        &mut self,
        layer: &Layer,
        img: &ImageLayer,
        p: &Placement,
    ) -> BatchboardResult<Vec<SceneNode>> {
        let decoded = self.load_raster(&img.src, img.crop_x, img.crop_y)?;
        let fitted = fit_image_into_frame(p, f64::from(decoded.width), f64::from(decoded.height));
        let pixels = self.filtered(decoded, &img.filters, &layer.id)?;

        let mut node = SceneNode::new(
            layer.id.clone(),
            p.opacity,
            NodeContent::Image {
                pixels,
                transform: content_matrix(&fitted),
            },
        );
        // Rounded corners and borders are a static-image feature.
        let helpers = match img.role {
            ImageRole::Static => radius_helpers(&fitted, img.radius, img.border_width, img.border_color),
            ImageRole::Background | ImageRole::VideoPreview => None,
        };
        let Some(helpers) = helpers else {
            return Ok(vec![node]);
        };

        node.clips.push(ClipShape::Path(helpers.clip));
        let mut nodes = vec![node];
        if let Some(outline) = helpers.outline {
            nodes.push(SceneNode::new(
                format!("{RADIUS_MASK_PREFIX}{}", layer.id),
                outline.opacity,
                NodeContent::Shape {
                    path: outline.path,
                    transform: Affine::IDENTITY,
                    fill: None,
                    stroke: Some(StrokeSpec {
                        color: outline.color,
                        width: outline.width,
                        cap: LineCapDef::Butt,
                        join: LineJoinDef::Miter,
                        miter_limit: 4.0,
                    }),
                    uniform_stroke: true,
                },
            ));
        }
        Ok(nodes)
    }

    fn load_svg(&self, src: &str, edit: impl FnOnce(String) -> String) -> BatchboardResult<PreparedSvg> {
        if src.trim().is_empty() {
            return Err(BatchboardError::asset("layer has no svg source"));
        }
        let bytes = self.fetcher.fetch(src)?;
        let markup = edit(String::from_utf8_lossy(&bytes).into_owned());
        parse_svg(markup.as_bytes())
    }

    fn vector_node(
        &mut self,
        layer: &Layer,
        v: &VectorLayer,
        p: &Placement,
    ) -> BatchboardResult<SceneNode> {
        let svg = self.load_svg(&v.src, |mut markup| {
            if !v.color_map.is_empty() {
                markup = recolor_svg(&markup, &v.color_map);
            }
            if let Some(stroke) = &v.sub_stroke {
                markup = stroke_sub_shapes(&markup, stroke);
            }
            markup
        })?;

        let (sw, sh) = svg.size();
        let placed = if v.declared_size {
            *p
        } else {
            Placement {
                width: sw,
                height: sh,
                ..*p
            }
        };
        let (w, h) = (placed.width, placed.height);
        let fit = Affine::scale_non_uniform(ratio(w, sw), ratio(h, sh));
        let sub = Affine::translate((w / 2.0, h / 2.0))
            * Affine::scale_non_uniform(v.sub_scale_x, v.sub_scale_y)
            * Affine::translate((-w / 2.0, -h / 2.0));

        Ok(SceneNode::new(
            layer.id.clone(),
            p.opacity,
            NodeContent::Svg {
                tree: svg.tree,
                transform: content_matrix(&placed) * sub * fit,
                tint: None,
            },
        ))
    }

    fn mask_nodes(
        &mut self,
        layer: &Layer,
        m: &MaskLayer,
        p: &Placement,
        group: Option<Affine>,
    ) -> BatchboardResult<Vec<SceneNode>> {
        let decoded = self.load_raster(&m.src, m.crop_x, m.crop_y)?;
        let carrier = if p.width > 0.0 && p.height > 0.0 {
            *p
        } else {
            Placement {
                width: f64::from(decoded.width),
                height: f64::from(decoded.height),
                ..*p
            }
        };

        let fill_opacity = m.fill_opacity.unwrap_or(0.0);
        let filters = if m.is_dummy {
            match m.fill {
                Some(color) if fill_opacity >= MIN_MASK_FILL_OPACITY => vec![FilterDescriptor::new(
                    "BlendColor",
                    serde_json::json!({ "color": color.to_hex(), "mode": "tint", "alpha": fill_opacity }),
                )],
                _ => Vec::new(),
            }
        } else {
            m.filters.clone()
        };
        let pixels = self.filtered(decoded, &filters, &layer.id)?;
        let mut node = SceneNode::new(
            layer.id.clone(),
            p.opacity,
            NodeContent::Image {
                pixels,
                transform: content_matrix(&carrier),
            },
        );

        let shape = match m.clip_src.as_deref() {
            Some(src) => match self.load_svg(src, |markup| markup) {
                Ok(svg) => Some(svg),
                Err(err) => {
                    tracing::warn!(id = %layer.id, error = %err, "mask shape failed to load; rendering unclipped");
                    None
                }
            },
            None => None,
        };
        let Some(shape) = shape else {
            return Ok(vec![node]);
        };

        let clip = match group {
            Some(g) => rehome_clip(&m.clip, g),
            None => m.clip,
        };
        let (cw, ch) = shape.size();
        let transform = bind_mask_clip(&carrier, &clip, m.clip_override.as_ref(), cw, ch);
        node.clips.push(ClipShape::Svg {
            tree: Arc::clone(&shape.tree),
            transform,
        });

        let shape_opacity = if fill_opacity >= MIN_MASK_FILL_OPACITY {
            fill_opacity
        } else {
            HIDDEN_MASK_FILL_OPACITY
        };
        let backdrop = SceneNode::new(
            format!("svgMask-{}", layer.id),
            shape_opacity * p.opacity,
            NodeContent::Svg {
                tree: shape.tree,
                transform,
                tint: Some(m.fill.unwrap_or(ColorDef::white())),
            },
        );
        Ok(vec![backdrop, node])
    }

    fn group_node(
        &mut self,
        layer: &Layer,
        g: &GroupLayer,
        p: &Placement,
        store: &LayerStore<'_>,
    ) -> BatchboardResult<Option<SceneNode>> {
        let matrix = object_matrix(p);
        let mut children = Vec::with_capacity(g.children.len());
        for child in &g.children {
            let placement = flatten_into(matrix, &child.placement);
            children.extend(self.import_soft(child, placement, Some(matrix), store)?);
        }
        if children.is_empty() {
            tracing::debug!(id = %layer.id, "group has nothing to draw");
            return Ok(None);
        }
        Ok(Some(SceneNode::new(
            layer.id.clone(),
            p.opacity,
            NodeContent::Group(children),
        )))
    }
}

fn ratio(target: f64, natural: f64) -> f64 {
    if natural > 0.0 { target / natural } else { 1.0 }
}

/// Noise seed derived from the layer id so filtered pixels repeat across runs.
pub(crate) fn filter_seed(id: &str) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_bytes(id.as_bytes());
    h.finish()
}

fn stroke_spec(s: &StrokeStyle) -> Option<StrokeSpec> {
    if !s.is_visible() {
        return None;
    }
    Some(StrokeSpec {
        color: s.color?,
        width: s.width,
        cap: s.cap,
        join: s.join,
        miter_limit: s.miter_limit,
    })
}

fn artboard_node(layer: &Layer, p: &Placement) -> Option<SceneNode> {
    let stroke = stroke_spec(&layer.stroke);
    if layer.fill.is_none() && stroke.is_none() {
        return None;
    }
    Some(SceneNode::new(
        layer.id.clone(),
        p.opacity,
        NodeContent::Shape {
            path: Rect::new(0.0, 0.0, p.width, p.height).to_path(0.1),
            transform: content_matrix(p),
            fill: layer.fill,
            stroke,
            uniform_stroke: layer.stroke.uniform,
        },
    ))
}

fn path_node(layer: &Layer, pl: &PathLayer, p: &Placement) -> BatchboardResult<SceneNode> {
    let path = BezPath::from_svg(pl.d.trim())
        .map_err(|e| BatchboardError::validation(format!("invalid path data: {e}")))?;
    let bbox = path.bounding_box();
    let placed = Placement {
        width: if p.width > 0.0 { p.width } else { bbox.width() },
        height: if p.height > 0.0 { p.height } else { bbox.height() },
        ..*p
    };
    // Path coordinates are drawn centered on the object, offset by their own bbox center.
    let transform = object_matrix(&placed) * Affine::translate(-bbox.center().to_vec2());
    Ok(SceneNode::new(
        layer.id.clone(),
        p.opacity,
        NodeContent::Shape {
            path,
            transform,
            fill: layer.fill,
            stroke: stroke_spec(&layer.stroke),
            uniform_stroke: layer.stroke.uniform,
        },
    ))
}

fn resolve_clip_ref(layer: &Layer, store: &LayerStore<'_>) -> Option<ClipShape> {
    let id = layer.clip_ref.as_deref()?;
    match store.get(id) {
        Some(target) if target.id != layer.id => store
            .placement(id)
            .map(|p| ClipShape::Path(layer_outline(&p))),
        Some(_) => None,
        None if id.starts_with(RADIUS_MASK_PREFIX) => None,
        None => {
            tracing::warn!(layer = %layer.id, clip = id, "dangling clip reference; rendering unclipped");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/import/importer.rs"]
mod tests;
