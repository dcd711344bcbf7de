use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Rect};
use crate::template::color::ColorDef;
use crate::template::layer::Shadow;
use crate::template::model::{LineCapDef, LineJoinDef};
use crate::text::layout::TextBlock;

/// Fully resolved scene for one row: every asset loaded, every transform absolute.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Template frame width.
    pub width: f64,
    /// Template frame height.
    pub height: f64,
    /// Nodes in paint order.
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    /// Number of nodes, group children included.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[SceneNode]) -> usize {
            nodes
                .iter()
                .map(|n| match &n.content {
                    NodeContent::Group(children) => 1 + count(children),
                    _ => 1,
                })
                .sum()
        }
        count(&self.nodes)
    }

    /// Find a node by layer id, searching group children.
    pub fn find(&self, id: &str) -> Option<&SceneNode> {
        fn go<'a>(nodes: &'a [SceneNode], id: &str) -> Option<&'a SceneNode> {
            for n in nodes {
                if n.id == id {
                    return Some(n);
                }
                if let NodeContent::Group(children) = &n.content
                    && let Some(hit) = go(children, id)
                {
                    return Some(hit);
                }
            }
            None
        }
        go(&self.nodes, id)
    }
}

/// Shape restricting where a node is visible. Coordinates are template space.
#[derive(Clone, Debug)]
pub enum ClipShape {
    /// Filled path; coverage is the path interior.
    Path(BezPath),
    /// Rendered SVG document; coverage is its alpha.
    Svg {
        /// Parsed document.
        tree: Arc<usvg::Tree>,
        /// SVG user space to template space.
        transform: Affine,
    },
}

/// Stroke parameters in template units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeSpec {
    /// Stroke color.
    pub color: ColorDef,
    /// Line width.
    pub width: f64,
    /// End caps.
    pub cap: LineCapDef,
    /// Corner joins.
    pub join: LineJoinDef,
    /// Miter limit.
    pub miter_limit: f64,
}

/// Premultiplied RGBA8 pixels of a decoded, cropped and filtered image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePixels {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub premul: Arc<Vec<u8>>,
}

/// What a node draws.
#[derive(Clone, Debug)]
pub enum NodeContent {
    /// Filled and/or stroked path. `transform` maps path space to template space.
    Shape {
        /// Geometry.
        path: BezPath,
        /// Path space to template space.
        transform: Affine,
        /// Fill, if any.
        fill: Option<ColorDef>,
        /// Stroke, if any.
        stroke: Option<StrokeSpec>,
        /// When `true` the stroke width is not affected by `transform`.
        uniform_stroke: bool,
    },
    /// Raster drawn at `0..width, 0..height` under `transform`.
    Image {
        /// Pixels.
        pixels: ImagePixels,
        /// Pixel space to template space.
        transform: Affine,
    },
    /// SVG document, optionally painted flat with `tint` over its alpha.
    Svg {
        /// Parsed document.
        tree: Arc<usvg::Tree>,
        /// SVG user space to template space.
        transform: Affine,
        /// Flat color replacing the document's own paint.
        tint: Option<ColorDef>,
    },
    /// Laid-out text drawn at the text box origin.
    Text {
        /// Glyph runs and decorations.
        block: TextBlock,
        /// Text box space to template space.
        transform: Affine,
    },
    /// Children composited together before clipping and opacity.
    Group(Vec<SceneNode>),
}

/// One drawable in a resolved scene.
#[derive(Clone, Debug)]
pub struct SceneNode {
    /// Id of the layer this node came from.
    pub id: String,
    /// Opacity applied when compositing the node.
    pub opacity: f64,
    /// Clips, intersected.
    pub clips: Vec<ClipShape>,
    /// Drop shadow painted beneath the node.
    pub shadow: Option<Shadow>,
    /// Drawing.
    pub content: NodeContent,
}

impl SceneNode {
    /// Unclipped node without shadow.
    pub fn new(id: impl Into<String>, opacity: f64, content: NodeContent) -> Self {
        Self {
            id: id.into(),
            opacity,
            clips: Vec::new(),
            shadow: None,
            content,
        }
    }

    /// Axis-aligned bounds in template space, when cheaply known.
    pub fn bounds(&self) -> Option<Rect> {
        use kurbo::Shape;
        match &self.content {
            NodeContent::Shape {
                path, transform, ..
            } => Some((*transform * path.clone()).bounding_box()),
            NodeContent::Image { pixels, transform } => Some(
                transform.transform_rect_bbox(Rect::new(
                    0.0,
                    0.0,
                    f64::from(pixels.width),
                    f64::from(pixels.height),
                )),
            ),
            NodeContent::Text { block, transform } => {
                Some(transform.transform_rect_bbox(Rect::new(0.0, 0.0, block.width, block.height)))
            }
            NodeContent::Svg { tree, transform, .. } => {
                let s = tree.size();
                Some(transform.transform_rect_bbox(Rect::new(
                    0.0,
                    0.0,
                    f64::from(s.width()),
                    f64::from(s.height()),
                )))
            }
            NodeContent::Group(children) => children
                .iter()
                .filter_map(SceneNode::bounds)
                .reduce(|a, b| a.union(b)),
        }
    }
}
