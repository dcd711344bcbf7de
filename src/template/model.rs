use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::error::{BatchboardError, BatchboardResult};

/// Serialized template document: an export frame plus an ordered layer list.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDef {
    /// Template identifier.
    #[serde(default)]
    pub id: String,
    /// Human readable template name.
    #[serde(default)]
    pub name: String,
    /// Export canvas size.
    pub frame: FrameDef,
    /// Layers in paint order (first is bottom-most).
    #[serde(default)]
    pub layers: Vec<LayerDef>,
    /// Free-form template metadata.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl TemplateDef {
    /// Parse a template from JSON text.
    pub fn from_json_str(s: &str) -> BatchboardResult<Self> {
        serde_json::from_str(s).map_err(|e| BatchboardError::serde(format!("template json: {e}")))
    }

    /// Read and parse a template JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> BatchboardResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read template '{}'", path.display()))?;
        Self::from_json_str(&text)
    }
}

/// Export frame dimensions in template units (pixels).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameDef {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

/// One layer record: shared placement/style fields plus a `type`-tagged payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayerDef {
    /// Fields every layer carries.
    #[serde(flatten)]
    pub base: LayerBaseDef,
    /// Variant payload, discriminated by `type`.
    #[serde(flatten)]
    pub kind: LayerKindDef,
}

/// Horizontal or vertical anchor of a layer's `left`/`top`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginDef {
    /// Left edge.
    Left,
    /// Top edge.
    Top,
    /// Middle.
    Center,
    /// Right edge.
    Right,
    /// Bottom edge.
    Bottom,
}

/// Stroke end cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCapDef {
    /// Flat end at the path end.
    Butt,
    /// Rounded end.
    Round,
    /// Squared end extending past the path end.
    Square,
}

/// Stroke corner join.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoinDef {
    /// Sharp corner.
    Miter,
    /// Rounded corner.
    Round,
    /// Cut-off corner.
    Bevel,
}

/// Shared layer fields. Every numeric field is optional here; defaults are applied by
/// [`crate::template::normalize`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct LayerBaseDef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_x: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_y: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skew_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skew_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_x: Option<OriginDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_y: Option<OriginDef>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_line_cap: Option<LineCapDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_line_join: Option<LineJoinDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_uniform: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_miter_limit: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub fill: Option<String>,

    /// Clip reference: a layer id, or (for masks) an inline clip-shape record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_path: Option<ClipRefDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowDef>,

    // Interaction flags. Irrelevant headless, kept so templates round-trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_controls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_movement_x: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_movement_y: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_scaling_x: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_scaling_y: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_rotation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_uni_scaling: Option<bool>,

    #[serde(default)]
    pub metadata: LayerMetadataDef,
}

/// `clipPath` is either an id reference or an inline mask clip-shape record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClipRefDef {
    /// Id of another layer in the same template.
    Id(String),
    /// Inline clip shape (mask layers).
    Shape(Box<MaskClipDef>),
}

/// Clip-shape sub-record of a mask layer. Placement is absolute (template space).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct MaskClipDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_x: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_y: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_x: Option<OriginDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_y: Option<OriginDef>,
}

/// Drop shadow.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ShadowDef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub color: Option<String>,
    #[serde(default)]
    pub blur: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
}

/// Authoring provenance carried in `metadata`. Unknown keys are preserved in `extra`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct LayerMetadataDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_stroke_width: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_line_join: Option<LineJoinDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_transform: Option<TextTransformDef>,
    /// Original (unwrapped) text content; the source of truth for curved text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_color_map: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_to_frame: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_main_frame: Option<bool>,
    /// Helper layer marker (`CHECKBOX_BACKGROUND`).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Curved-text directive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TextTransformDef {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub value: f64,
}

/// Variant payloads.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerKindDef {
    /// Crop frame.
    #[serde(alias = "Frame")]
    Artboard(ArtboardDef),
    /// Canvas background; normalized into an artboard.
    Background(ArtboardDef),
    /// Text box.
    #[serde(alias = "text", alias = "Text")]
    StaticText(TextDef),
    /// Raster image.
    StaticImage(ImageDef),
    /// Raster image used as a background.
    BackgroundImage(ImageDef),
    /// Video layer; renders its preview still.
    StaticVideo(ImageDef),
    /// Remote or inline SVG.
    StaticVector(VectorDef),
    /// Raw SVG path data.
    StaticPath(PathDef),
    /// Image cut by an SVG clip shape.
    Mask(MaskDef),
    /// Nested layers composited as one unit.
    #[serde(alias = "group")]
    Group(GroupDef),
    /// Any other type; dropped on import.
    #[serde(other)]
    Unknown,
}

/// Artboard / background payload (geometry and fill live on the base).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ArtboardDef {}

/// Text payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct TextDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, rename = "fontURL", skip_serializing_if = "Option::is_none")]
    pub font_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_bullet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_editing: Option<bool>,
}

/// Raster image payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ImageDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<crate::effects::filters::FilterDescriptor>,
}

/// Vector payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct VectorDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Legacy per-color object lists: `{ "<original fill>": [{ "fill": "<current>" }, ..] }`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_colors: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_object_scale_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_object_scale_y: Option<f64>,
}

/// Path data: an SVG `d` string or a list of `[command, args..]` arrays.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathDataDef {
    /// SVG path string.
    Svg(String),
    /// Command arrays, e.g. `[["M", 0, 0], ["L", 10, 0]]`.
    Commands(Vec<Vec<serde_json::Value>>),
}

/// Path payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct PathDef {
    pub path: PathDataDef,
}

/// Mask payload: the carrier image and the clip shape source.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct MaskDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<crate::effects::filters::FilterDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_svg_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub mask_fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_fill_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_dummy: Option<bool>,
    /// Clip placement override used when the mask lives inside a group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_mask_properties: Option<MaskClipDef>,
}

/// Group payload.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct GroupDef {
    #[serde(default)]
    pub objects: Vec<LayerDef>,
}

/// Accept strings; map anything else (gradient objects, numbers, null) to `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/template/model.rs"]
mod tests;
