use crate::foundation::core::{Canvas, MAX_CANVAS_EDGE, MAX_CANVAS_PIXELS};
use crate::foundation::error::{BatchboardError, BatchboardResult};
use crate::template::color::ColorDef;
use crate::template::layer::{
    ArtboardLayer, GroupLayer, ImageLayer, ImageRole, Layer, LayerKind, ListStyle, MaskClip,
    MaskLayer, Origin, PathLayer, Placement, Shadow, StrokeStyle, SubStroke, Template, TextAlign,
    TextLayer, TextPathKind, TextTransform, VectorLayer,
};
use crate::template::model::{
    ClipRefDef, ImageDef, LayerBaseDef, LayerDef, LayerKindDef, LineCapDef, LineJoinDef,
    MaskClipDef, MaskDef, OriginDef, PathDataDef, TemplateDef, TextDef, VectorDef,
};

/// Id given to the background-derived main artboard.
pub const MAIN_ARTBOARD_ID: &str = "Main Artboard";
/// Id of the editor's canvas background layer; not exported while the checkerboard is shown.
pub const CANVAS_BACKGROUND_ID: &str = "background";
/// `metadata.type` of the editor's transparency checkerboard layer.
pub const CHECKBOX_BACKGROUND_TYPE: &str = "CHECKBOX_BACKGROUND";

const DEFAULT_TEXT_WIDTH: f64 = 240.0;
const DEFAULT_TEXT: &str = " ";
const DEFAULT_TEXT_FILL: &str = "#333333";
const DEFAULT_FONT_SIZE: f64 = 40.0;
const DEFAULT_FONT_FAMILY: &str = "Arial";
const DEFAULT_LINE_HEIGHT: f64 = 1.16;
const DEFAULT_BULLET: &str = "\u{25CF}";

/// Fill every optional field with its default and reject templates that cannot render at all.
///
/// Unknown layer types are dropped with a warning. Errors returned here are batch-level: they
/// surface before any row is processed.
pub fn normalize(def: &TemplateDef) -> BatchboardResult<Template> {
    let (width, height) = check_frame(def.frame.width, def.frame.height)?;
    if def.layers.is_empty() {
        return Err(BatchboardError::validation("template has no layers"));
    }

    // The canvas background is only an editor helper when the transparency checkerboard is shown.
    let has_checkbox = def.layers.iter().any(is_checkbox_background);
    let layers: Vec<Layer> = def
        .layers
        .iter()
        .filter_map(|l| normalize_layer(l, false, has_checkbox))
        .collect();
    if layers.is_empty() {
        return Err(BatchboardError::validation(
            "template has no renderable layers",
        ));
    }

    Ok(Template {
        id: def.id.clone(),
        name: def.name.clone(),
        frame_width: width,
        frame_height: height,
        layers,
    })
}

fn check_frame(width: f64, height: f64) -> BatchboardResult<(f64, f64)> {
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return Err(BatchboardError::validation(format!(
            "template frame must have positive finite size, got {width}x{height}"
        )));
    }
    if !Canvas::from_f64(width, height).within_limits() {
        return Err(BatchboardError::validation(format!(
            "template frame {width}x{height} exceeds the {MAX_CANVAS_EDGE}px edge or \
             {MAX_CANVAS_PIXELS}px area limit"
        )));
    }
    Ok((width, height))
}

fn is_checkbox_background(def: &LayerDef) -> bool {
    def.base.metadata.kind.as_deref() == Some(CHECKBOX_BACKGROUND_TYPE)
}

fn normalize_layer(def: &LayerDef, in_group: bool, has_checkbox: bool) -> Option<Layer> {
    let base = &def.base;
    if in_group && is_group_helper_id(&base.id) {
        return None;
    }

    let mut placement = placement(base);
    let mut fill = parse_color(base.fill.as_deref(), &base.id, "fill");
    let mut stroke = stroke_style(base, LineCapDef::Butt, LineJoinDef::Miter, false);
    let mut id = base.id.clone();
    let mut name = base.name.clone();
    let helper = (has_checkbox && base.id == CANVAS_BACKGROUND_ID) || is_checkbox_background(def);

    let kind = match &def.kind {
        LayerKindDef::Artboard(_) => {
            if id.is_empty() {
                id = "Artboard".to_owned();
            }
            if name.is_empty() {
                name = "Artboard 1".to_owned();
            }
            LayerKind::Artboard(ArtboardLayer {
                clip_to_frame: base.metadata.clip_to_frame.unwrap_or(true),
                from_background: false,
            })
        }
        LayerKindDef::Background(_) => {
            if (id.is_empty() || id == CANVAS_BACKGROUND_ID)
                && !base.metadata.not_main_frame.unwrap_or(false)
            {
                id = MAIN_ARTBOARD_ID.to_owned();
            }
            if fill.is_none() {
                fill = Some(ColorDef::white());
            }
            LayerKind::Artboard(ArtboardLayer {
                clip_to_frame: base.metadata.clip_to_frame.unwrap_or(true),
                from_background: true,
            })
        }
        LayerKindDef::StaticText(t) => {
            if base.width.is_none_or(|w| w <= 0.0) {
                placement.width = DEFAULT_TEXT_WIDTH;
            }
            if fill.is_none() {
                fill = ColorDef::parse(DEFAULT_TEXT_FILL).ok();
            }
            LayerKind::Text(text_layer(base, t))
        }
        LayerKindDef::StaticImage(img) => LayerKind::Image(image_layer(base, img, ImageRole::Static)),
        LayerKindDef::BackgroundImage(img) => {
            LayerKind::Image(image_layer(base, img, ImageRole::Background))
        }
        LayerKindDef::StaticVideo(img) => {
            LayerKind::Image(image_layer(base, img, ImageRole::VideoPreview))
        }
        LayerKindDef::StaticVector(v) => {
            placement.scale_x = 1.0;
            placement.scale_y = 1.0;
            LayerKind::Vector(vector_layer(base, v))
        }
        LayerKindDef::StaticPath(p) => {
            stroke = stroke_style(base, LineCapDef::Round, LineJoinDef::Round, true);
            LayerKind::Path(PathLayer {
                d: path_data(&p.path),
            })
        }
        LayerKindDef::Mask(m) => LayerKind::Mask(mask_layer(base, m)),
        LayerKindDef::Group(g) => LayerKind::Group(GroupLayer {
            children: g
                .objects
                .iter()
                .filter_map(|c| normalize_layer(c, true, has_checkbox))
                .collect(),
        }),
        LayerKindDef::Unknown => {
            tracing::warn!(id = %base.id, "dropping layer of unknown type");
            return None;
        }
    };

    let clip_ref = match &base.clip_path {
        Some(ClipRefDef::Id(id)) if !id.is_empty() => Some(id.clone()),
        _ => None,
    };

    let shadow = base.shadow.as_ref().map(|s| Shadow {
        color: parse_color(s.color.as_deref(), &base.id, "shadow.color")
            .unwrap_or(ColorDef::rgba(0.0, 0.0, 0.0, 1.0)),
        blur: s.blur.max(0.0),
        offset_x: s.offset_x,
        offset_y: s.offset_y,
    });

    Some(Layer {
        id,
        name,
        placement,
        fill,
        stroke,
        clip_ref,
        visible: base.visible.unwrap_or(true),
        helper,
        shadow,
        frame_id: base.metadata.frame_id.clone(),
        kind,
    })
}

fn is_group_helper_id(id: &str) -> bool {
    id.contains("svgMask") || id.contains("maskClipPathForGroup")
}

fn finite_or(v: Option<f64>, default: f64) -> f64 {
    v.filter(|x| x.is_finite()).unwrap_or(default)
}

/// Scales of zero are treated as absent.
fn scale_or_one(v: Option<f64>) -> f64 {
    v.filter(|x| x.is_finite() && *x != 0.0).unwrap_or(1.0)
}

fn origin(v: Option<OriginDef>) -> Origin {
    match v {
        None | Some(OriginDef::Left) | Some(OriginDef::Top) => Origin::Start,
        Some(OriginDef::Center) => Origin::Center,
        Some(OriginDef::Right) | Some(OriginDef::Bottom) => Origin::End,
    }
}

fn placement(base: &LayerBaseDef) -> Placement {
    Placement {
        left: finite_or(base.left, 0.0),
        top: finite_or(base.top, 0.0),
        width: finite_or(base.width, 0.0).max(0.0),
        height: finite_or(base.height, 0.0).max(0.0),
        scale_x: scale_or_one(base.scale_x),
        scale_y: scale_or_one(base.scale_y),
        angle: finite_or(base.angle, 0.0),
        flip_x: base.flip_x.unwrap_or(false),
        flip_y: base.flip_y.unwrap_or(false),
        skew_x: finite_or(base.skew_x, 0.0),
        skew_y: finite_or(base.skew_y, 0.0),
        origin_x: origin(base.origin_x),
        origin_y: origin(base.origin_y),
        opacity: finite_or(base.opacity, 1.0).clamp(0.0, 1.0),
    }
}

fn stroke_style(
    base: &LayerBaseDef,
    cap: LineCapDef,
    join: LineJoinDef,
    uniform: bool,
) -> StrokeStyle {
    StrokeStyle {
        color: parse_color(base.stroke.as_deref(), &base.id, "stroke"),
        width: finite_or(base.stroke_width, 0.0).max(0.0),
        cap: base.stroke_line_cap.unwrap_or(cap),
        join: base.stroke_line_join.unwrap_or(join),
        miter_limit: finite_or(base.stroke_miter_limit, 4.0),
        uniform: base.stroke_uniform.unwrap_or(uniform),
    }
}

fn parse_color(s: Option<&str>, layer: &str, field: &str) -> Option<ColorDef> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    match ColorDef::parse(s) {
        Ok(c) => Some(c),
        Err(e) => {
            tracing::warn!(layer, field, error = %e, "ignoring unparsable color");
            None
        }
    }
}

fn non_empty(s: Option<&String>) -> Option<&str> {
    s.map(String::as_str).filter(|s| !s.trim().is_empty())
}

fn text_layer(base: &LayerBaseDef, t: &TextDef) -> TextLayer {
    let text = t.text.clone().unwrap_or_else(|| DEFAULT_TEXT.to_owned());
    let source_text = base.metadata.os.clone().unwrap_or_else(|| text.clone());

    let align = match t.text_align.as_deref().map(str::to_ascii_lowercase) {
        Some(a) if a == "center" => TextAlign::Center,
        Some(a) if a == "right" => TextAlign::Right,
        Some(a) if a.starts_with("justify") => TextAlign::Justify,
        _ => TextAlign::Left,
    };

    let list = match t.list_type.as_deref() {
        Some("bullet") => ListStyle::Bullet(
            non_empty(t.list_bullet.as_ref())
                .unwrap_or(DEFAULT_BULLET)
                .to_owned(),
        ),
        Some("number") => ListStyle::Number,
        _ => ListStyle::None,
    };

    // Lists and curved text are mutually exclusive; the list wins.
    let transform = match (&list, &base.metadata.text_transform) {
        (ListStyle::None, Some(tt)) if tt.value != 0.0 && tt.value.is_finite() => {
            match TextPathKind::from_label(&tt.kind) {
                Some(kind) => Some(TextTransform {
                    kind,
                    value: tt.value,
                }),
                None => {
                    tracing::warn!(layer = %base.id, kind = %tt.kind, "unknown text transform");
                    None
                }
            }
        }
        _ => None,
    };

    TextLayer {
        text,
        source_text,
        font_family: non_empty(t.font_family.as_ref())
            .unwrap_or(DEFAULT_FONT_FAMILY)
            .to_owned(),
        font_url: non_empty(t.font_url.as_ref()).map(str::to_owned),
        font_size: t
            .font_size
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE),
        align,
        line_height: t
            .line_height
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_LINE_HEIGHT),
        char_spacing: finite_or(t.char_spacing, 0.0),
        underline: t.underline.unwrap_or(false),
        list,
        transform,
        editing: t.is_editing.unwrap_or(false),
    }
}

fn effective_src(preview: Option<&String>, src: Option<&String>) -> String {
    non_empty(preview)
        .or_else(|| non_empty(src))
        .unwrap_or_default()
        .to_owned()
}

fn image_layer(base: &LayerBaseDef, img: &ImageDef, role: ImageRole) -> ImageLayer {
    let meta = &base.metadata;
    ImageLayer {
        role,
        src: effective_src(img.preview.as_ref(), img.src.as_ref()),
        crop_x: finite_or(img.crop_x, 0.0).max(0.0),
        crop_y: finite_or(img.crop_y, 0.0).max(0.0),
        filters: img.filters.clone(),
        radius: finite_or(meta.current_radius, 0.0).max(0.0),
        border_width: finite_or(meta.current_stroke_width, 0.0).max(0.0),
        border_color: parse_color(meta.stroke.as_deref(), &base.id, "metadata.stroke"),
    }
}

fn vector_layer(base: &LayerBaseDef, v: &VectorDef) -> VectorLayer {
    let meta = &base.metadata;
    let mut pairs: Vec<(String, String)> = match &meta.custom_color_map {
        Some(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        None => v
            .object_colors
            .as_ref()
            .map(legacy_color_pairs)
            .unwrap_or_default(),
    };
    pairs.sort();

    let color_map = pairs
        .iter()
        .filter_map(|(from, to)| {
            let from = parse_color(Some(from), &base.id, "customColorMap key")?;
            let to = parse_color(Some(to), &base.id, "customColorMap value")?;
            Some((from, to))
        })
        .collect();

    let sub_stroke = meta
        .current_stroke_width
        .filter(|w| w.is_finite() && *w > 0.0)
        .map(|width| SubStroke {
            width,
            color: parse_color(meta.stroke.as_deref(), &base.id, "metadata.stroke"),
            join: meta.stroke_line_join.unwrap_or(LineJoinDef::Miter),
        });

    VectorLayer {
        src: effective_src(v.src.as_ref(), v.preview.as_ref()),
        color_map,
        sub_stroke,
        sub_scale_x: scale_or_one(v.sub_object_scale_x),
        sub_scale_y: scale_or_one(v.sub_object_scale_y),
        declared_size: base.width.is_some_and(|w| w > 0.0) && base.height.is_some_and(|h| h > 0.0),
    }
}

/// Migrate `{ "<original>": [{ "fill": "<current>" }, ..] }` into color pairs.
fn legacy_color_pairs(map: &serde_json::Map<String, serde_json::Value>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (original, objects) in map {
        let Some(current) = objects
            .as_array()
            .and_then(|a| a.iter().find_map(|o| o.get("fill")?.as_str()))
        else {
            continue;
        };
        if !current.eq_ignore_ascii_case(original) {
            out.push((original.clone(), current.to_owned()));
        }
    }
    out
}

fn path_data(p: &PathDataDef) -> String {
    match p {
        PathDataDef::Svg(d) => d.clone(),
        PathDataDef::Commands(cmds) => {
            let mut parts = Vec::with_capacity(cmds.len());
            for cmd in cmds {
                let words: Vec<String> = cmd
                    .iter()
                    .filter_map(|v| match v {
                        serde_json::Value::String(s) => Some(s.clone()),
                        serde_json::Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect();
                parts.push(words.join(" "));
            }
            parts.join(" ")
        }
    }
}

fn mask_clip(def: &MaskClipDef) -> MaskClip {
    MaskClip {
        left: def.left.filter(|v| v.is_finite()),
        top: def.top.filter(|v| v.is_finite()),
        scale_x: def.scale_x.filter(|v| v.is_finite() && *v != 0.0),
        scale_y: def.scale_y.filter(|v| v.is_finite() && *v != 0.0),
        angle: def.angle.filter(|v| v.is_finite()),
        flip_x: def.flip_x.unwrap_or(false),
        flip_y: def.flip_y.unwrap_or(false),
        origin_x: def.origin_x.map(|o| origin(Some(o))),
        origin_y: def.origin_y.map(|o| origin(Some(o))),
    }
}

fn mask_layer(base: &LayerBaseDef, m: &MaskDef) -> MaskLayer {
    let (clip, inline_src) = match &base.clip_path {
        Some(ClipRefDef::Shape(shape)) => (mask_clip(shape), shape.src.clone()),
        _ => (MaskClip::default(), None),
    };
    MaskLayer {
        src: effective_src(m.preview.as_ref(), m.src.as_ref()),
        crop_x: finite_or(m.crop_x, 0.0).max(0.0),
        crop_y: finite_or(m.crop_y, 0.0).max(0.0),
        filters: m.filters.clone(),
        clip_src: non_empty(m.mask_svg_url.as_ref())
            .map(str::to_owned)
            .or(inline_src),
        clip,
        clip_override: m.svg_mask_properties.as_ref().map(mask_clip),
        fill: parse_color(m.mask_fill.as_deref(), &base.id, "maskFill"),
        fill_opacity: m.mask_fill_opacity.filter(|v| v.is_finite()),
        is_dummy: m.is_dummy.unwrap_or(false),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/normalize.rs"]
mod tests;
