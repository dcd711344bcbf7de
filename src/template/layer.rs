use crate::effects::filters::FilterDescriptor;
use crate::template::color::ColorDef;
use crate::template::model::{LineCapDef, LineJoinDef};

/// Normalized template: every optional field has been defaulted.
#[derive(Clone, Debug)]
pub struct Template {
    /// Template identifier.
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// Export frame width.
    pub frame_width: f64,
    /// Export frame height.
    pub frame_height: f64,
    /// Layers in paint order.
    pub layers: Vec<Layer>,
}

impl Template {
    /// Visit every layer (depth-first, including group children).
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Layer)) {
        fn go<'a>(layers: &'a [Layer], f: &mut impl FnMut(&'a Layer)) {
            for l in layers {
                f(l);
                if let LayerKind::Group(g) = &l.kind {
                    go(&g.children, f);
                }
            }
        }
        go(&self.layers, f);
    }

    /// Mutable depth-first visit, including group children.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Layer)) {
        fn go(layers: &mut [Layer], f: &mut impl FnMut(&mut Layer)) {
            for l in layers {
                f(l);
                if let LayerKind::Group(g) = &mut l.kind {
                    go(&mut g.children, f);
                }
            }
        }
        go(&mut self.layers, f);
    }
}

/// Anchor of `left`/`top` along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Left or top edge.
    Start,
    /// Middle.
    Center,
    /// Right or bottom edge.
    End,
}

impl Origin {
    /// Fraction of the extent between the edge and the anchor.
    pub fn factor(self) -> f64 {
        match self {
            Self::Start => 0.0,
            Self::Center => 0.5,
            Self::End => 1.0,
        }
    }
}

/// Affine placement of a layer in its parent's coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Degrees, clockwise.
    pub angle: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Degrees.
    pub skew_x: f64,
    /// Degrees.
    pub skew_y: f64,
    pub origin_x: Origin,
    pub origin_y: Origin,
    pub opacity: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            flip_x: false,
            flip_y: false,
            skew_x: 0.0,
            skew_y: 0.0,
            origin_x: Origin::Start,
            origin_y: Origin::Start,
            opacity: 1.0,
        }
    }
}

impl Placement {
    /// Width after scaling.
    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale_x.abs()
    }

    /// Height after scaling.
    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale_y.abs()
    }
}

/// Stroke settings shared by every layer kind.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct StrokeStyle {
    pub color: Option<ColorDef>,
    pub width: f64,
    pub cap: LineCapDef,
    pub join: LineJoinDef,
    pub miter_limit: f64,
    pub uniform: bool,
}

impl StrokeStyle {
    /// `true` when the stroke paints anything.
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.color.is_some_and(|c| c.a > 0.0)
    }
}

/// Drop shadow.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct Shadow {
    pub color: ColorDef,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// A normalized layer.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Unique id within the template.
    pub id: String,
    /// Data-binding key.
    pub name: String,
    /// Placement in the parent space.
    pub placement: Placement,
    /// Fill color, if any.
    pub fill: Option<ColorDef>,
    /// Stroke settings.
    pub stroke: StrokeStyle,
    /// Id of the layer whose outline clips this one.
    pub clip_ref: Option<String>,
    /// Hidden layers are dropped before export.
    pub visible: bool,
    /// Editor-only helper (checkbox background); never exported.
    pub helper: bool,
    /// Optional drop shadow.
    pub shadow: Option<Shadow>,
    /// Artboard this layer was authored on.
    pub frame_id: Option<String>,
    /// Variant payload.
    pub kind: LayerKind,
}

/// Variant payloads of a normalized layer.
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub enum LayerKind {
    Artboard(ArtboardLayer),
    Text(TextLayer),
    Image(ImageLayer),
    Vector(VectorLayer),
    Path(PathLayer),
    Mask(MaskLayer),
    Group(GroupLayer),
}

impl LayerKind {
    /// Stable type label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Artboard(_) => "artboard",
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Vector(_) => "vector",
            Self::Path(_) => "path",
            Self::Mask(_) => "mask",
            Self::Group(_) => "group",
        }
    }
}

/// Crop frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtboardLayer {
    /// Children authored on this frame are clipped to it.
    pub clip_to_frame: bool,
    /// Created from a `Background` record.
    pub from_background: bool,
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

/// List formatting of a text box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListStyle {
    /// Plain paragraphs.
    None,
    /// Bulleted paragraphs with the given bullet glyph.
    Bullet(String),
    /// `1. `, `2. `, ... prefixes.
    Number,
}

/// Curve family of a text path transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TextPathKind {
    Flag,
    Circular,
    Angle,
    Arch,
    Wave,
    Rise,
}

impl TextPathKind {
    /// Parse the authoring label (`flag`, `circularText`, `angle`, `arch`, `wave`, `rise`).
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "flag" => Some(Self::Flag),
            "circular" | "circulartext" | "circle" => Some(Self::Circular),
            "angle" => Some(Self::Angle),
            "arch" => Some(Self::Arch),
            "wave" => Some(Self::Wave),
            "rise" => Some(Self::Rise),
            _ => None,
        }
    }
}

/// Curved-text directive with its intensity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextTransform {
    /// Curve family.
    pub kind: TextPathKind,
    /// Intensity; zero disables the transform.
    pub value: f64,
}

/// Text box payload.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct TextLayer {
    pub text: String,
    /// Unwrapped source text; curved text is re-derived from it.
    pub source_text: String,
    pub font_family: String,
    pub font_url: Option<String>,
    pub font_size: f64,
    pub align: TextAlign,
    pub line_height: f64,
    /// Thousandths of an em.
    pub char_spacing: f64,
    pub underline: bool,
    pub list: ListStyle,
    pub transform: Option<TextTransform>,
    pub editing: bool,
}

/// Which authoring type produced an image layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ImageRole {
    Static,
    Background,
    VideoPreview,
}

/// Raster image payload.
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub struct ImageLayer {
    pub role: ImageRole,
    /// Effective source (preview wins over src).
    pub src: String,
    pub crop_x: f64,
    pub crop_y: f64,
    pub filters: Vec<FilterDescriptor>,
    /// Rounded-corner radius (`metadata.currentRadius`).
    pub radius: f64,
    /// Border width (`metadata.currentStrokeWidth`).
    pub border_width: f64,
    /// Border color (`metadata.stroke`).
    pub border_color: Option<ColorDef>,
}

/// Stroke applied to every sub-shape of a vector.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct SubStroke {
    pub width: f64,
    pub color: Option<ColorDef>,
    pub join: LineJoinDef,
}

/// Vector payload.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct VectorLayer {
    pub src: String,
    /// `(original, replacement)` color pairs.
    pub color_map: Vec<(ColorDef, ColorDef)>,
    pub sub_stroke: Option<SubStroke>,
    pub sub_scale_x: f64,
    pub sub_scale_y: f64,
    /// `false` when the record had no width/height; the SVG's own size is used.
    pub declared_size: bool,
}

/// Path payload.
#[derive(Clone, Debug, PartialEq)]
pub struct PathLayer {
    /// SVG path data.
    pub d: String,
}

/// Placement of a mask clip shape. Unset fields mean "not yet bound to the carrier".
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub struct MaskClip {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub angle: Option<f64>,
    pub flip_x: bool,
    pub flip_y: bool,
    pub origin_x: Option<Origin>,
    pub origin_y: Option<Origin>,
}

impl MaskClip {
    /// `true` once a position has been established.
    pub fn is_bound(&self) -> bool {
        self.left.is_some() && self.top.is_some()
    }
}

/// Mask payload.
#[derive(Clone, Debug)]
#[allow(missing_docs)]
pub struct MaskLayer {
    pub src: String,
    pub crop_x: f64,
    pub crop_y: f64,
    pub filters: Vec<FilterDescriptor>,
    /// SVG URL or inline markup of the clip shape.
    pub clip_src: Option<String>,
    pub clip: MaskClip,
    /// Placement override used inside groups.
    pub clip_override: Option<MaskClip>,
    pub fill: Option<ColorDef>,
    pub fill_opacity: Option<f64>,
    pub is_dummy: bool,
}

/// Group payload.
#[derive(Clone, Debug)]
pub struct GroupLayer {
    /// Children in paint order; placements are relative to the group's center.
    pub children: Vec<Layer>,
}
