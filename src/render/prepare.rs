use serde::{Deserialize, Serialize};

use crate::foundation::core::Vec2;
use crate::geometry::clip::translate_clip;
use crate::geometry::transform::translated;
use crate::template::layer::{Layer, LayerKind, MaskLayer, Template};
use crate::template::store::LayerStore;

/// Smallest exported artboard edge, in pixels.
pub const MIN_ARTBOARD_EDGE: f64 = 20.0;

/// What part of the template becomes the output image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// The whole frame, after rebasing onto the main artboard.
    #[default]
    Template,
    /// Only the main artboard's scaled box.
    Artboard,
}

/// Template ready to import: helpers and hidden layers gone, coordinates rebased.
#[derive(Clone, Debug)]
pub struct PreparedTemplate {
    /// Rebased template.
    pub template: Template,
    /// Output width in template units.
    pub width: f64,
    /// Output height in template units.
    pub height: f64,
    /// Amount subtracted from every top-level `left`/`top`.
    pub origin: Vec2,
}

/// Pre-export normalization of one row's template.
///
/// Invisible and helper layers are dropped, then every top-level layer (and every bound mask
/// clip) is shifted so the main artboard's `left`/`top` becomes `(0, 0)`. Group children keep
/// their group-relative coordinates.
pub fn prepare(template: &Template, mode: ExportMode) -> PreparedTemplate {
    let mut out = template.clone();
    out.layers = retain_exported(std::mem::take(&mut out.layers));

    let artboard = {
        let store = LayerStore::new(&out);
        store
            .main_artboard()
            .map(|a| (a.placement.left, a.placement.top, a.placement.scaled_width(), a.placement.scaled_height()))
    };
    let origin = artboard.map_or(Vec2::ZERO, |(left, top, _, _)| Vec2::new(left, top));
    if origin != Vec2::ZERO {
        rebase(&mut out.layers, origin);
    }

    let (width, height) = match (mode, artboard) {
        (ExportMode::Artboard, Some((_, _, w, h))) => (w.max(MIN_ARTBOARD_EDGE), h.max(MIN_ARTBOARD_EDGE)),
        (ExportMode::Artboard, None) => {
            tracing::debug!(template = %template.id, "no artboard to crop to; exporting the frame");
            (template.frame_width, template.frame_height)
        }
        (ExportMode::Template, _) => (template.frame_width, template.frame_height),
    };

    PreparedTemplate {
        template: out,
        width,
        height,
        origin,
    }
}

fn retain_exported(layers: Vec<Layer>) -> Vec<Layer> {
    layers
        .into_iter()
        .filter(|l| l.visible && !l.helper)
        .map(|mut l| {
            if let LayerKind::Group(g) = &mut l.kind {
                g.children = retain_exported(std::mem::take(&mut g.children));
            }
            l
        })
        .collect()
}

fn rebase(layers: &mut [Layer], by: Vec2) {
    for layer in layers {
        layer.placement = translated(&layer.placement, -by.x, -by.y);
        match &mut layer.kind {
            LayerKind::Mask(m) => {
                m.clip = translate_clip(&m.clip, -by.x, -by.y);
                rebase_override(m, by);
            }
            LayerKind::Group(g) => rebase_group_overrides(&mut g.children, by),
            _ => {}
        }
    }
}

/// Clip overrides are recorded in absolute space even for group children.
fn rebase_group_overrides(children: &mut [Layer], by: Vec2) {
    for child in children {
        match &mut child.kind {
            LayerKind::Mask(m) => rebase_override(m, by),
            LayerKind::Group(g) => rebase_group_overrides(&mut g.children, by),
            _ => {}
        }
    }
}

fn rebase_override(m: &mut MaskLayer, by: Vec2) {
    if let Some(o) = &m.clip_override {
        m.clip_override = Some(translate_clip(o, -by.x, -by.y));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/prepare.rs"]
mod tests;
