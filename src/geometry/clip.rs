use kurbo::{RoundedRect, Shape};

use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::geometry::transform::{center_point, content_matrix, decompose};
use crate::template::color::ColorDef;
use crate::template::layer::{MaskClip, Origin, Placement};

const PATH_TOLERANCE: f64 = 0.1;

/// Unfilled border drawn over a rounded image.
#[derive(Clone, Debug, PartialEq)]
pub struct Outline {
    /// Absolute-space stroke path.
    pub path: BezPath,
    /// Stroke width in template units.
    pub width: f64,
    /// Stroke color.
    pub color: ColorDef,
    /// Opacity inherited from the carrier.
    pub opacity: f64,
}

/// Clip and border shapes synthesized for a rounded or bordered image.
#[derive(Clone, Debug, PartialEq)]
pub struct RadiusHelpers {
    /// Rounded clip applied to the image, in absolute space.
    pub clip: BezPath,
    /// Border overlay, present when the border has a width and a color.
    pub outline: Option<Outline>,
}

/// Derive the rounded clip and border overlay from the carrier's final placement.
///
/// Returns `None` unless `radius > 0`. The rectangle is the carrier's scaled box shrunk by the
/// border width, centered on the carrier and rotated with it.
pub fn radius_helpers(
    p: &Placement,
    radius: f64,
    border_width: f64,
    border_color: Option<ColorDef>,
) -> Option<RadiusHelpers> {
    if radius.is_nan() || radius <= 0.0 {
        return None;
    }
    let border = border_width.max(0.0);
    let w = (p.scaled_width() - border).max(0.0);
    let h = (p.scaled_height() - border).max(0.0);
    let r = radius.min(w.min(h) / 2.0).max(0.0);

    let local = RoundedRect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0, r).to_path(PATH_TOLERANCE);
    let to_abs = Affine::translate(center_point(p).to_vec2()) * Affine::rotate(p.angle.to_radians());
    let clip = to_abs * local;

    let outline = match border_color {
        Some(color) if border > 0.0 => Some(Outline {
            path: clip.clone(),
            width: border,
            color,
            opacity: p.opacity,
        }),
        _ => None,
    };
    Some(RadiusHelpers { clip, outline })
}

/// The layer's transformed bounding box as a closed path in its parent space.
pub fn layer_outline(p: &Placement) -> BezPath {
    content_matrix(p) * Rect::new(0.0, 0.0, p.width, p.height).to_path(PATH_TOLERANCE)
}

/// Placement of a mask's clip shape in absolute space.
///
/// `clip_w x clip_h` is the untransformed size of the clip shape. An unbound clip is
/// stretched over the carrier's scaled box, centered on it and rotated with it; a bound
/// clip uses its recorded placement. `override_clip` wins over both.
pub fn clip_placement(
    carrier: &Placement,
    clip: &MaskClip,
    override_clip: Option<&MaskClip>,
    clip_w: f64,
    clip_h: f64,
) -> Placement {
    let clip = override_clip.filter(|c| c.is_bound()).unwrap_or(clip);
    match (clip.left, clip.top) {
        (Some(left), Some(top)) => Placement {
            left,
            top,
            width: clip_w,
            height: clip_h,
            scale_x: clip.scale_x.unwrap_or(1.0),
            scale_y: clip.scale_y.unwrap_or(1.0),
            angle: clip.angle.unwrap_or(0.0),
            flip_x: clip.flip_x,
            flip_y: clip.flip_y,
            origin_x: clip.origin_x.unwrap_or(Origin::Start),
            origin_y: clip.origin_y.unwrap_or(Origin::Start),
            ..Placement::default()
        },
        _ => {
            let center = center_point(carrier);
            let ratio = |target: f64, natural: f64| {
                if natural > 0.0 { target / natural } else { 1.0 }
            };
            Placement {
                left: center.x,
                top: center.y,
                width: clip_w,
                height: clip_h,
                scale_x: ratio(carrier.scaled_width(), clip_w),
                scale_y: ratio(carrier.scaled_height(), clip_h),
                angle: carrier.angle,
                origin_x: Origin::Center,
                origin_y: Origin::Center,
                ..Placement::default()
            }
        }
    }
}

/// Matrix mapping clip shape content (`0..clip_w`, `0..clip_h`) into absolute space.
pub fn bind_mask_clip(
    carrier: &Placement,
    clip: &MaskClip,
    override_clip: Option<&MaskClip>,
    clip_w: f64,
    clip_h: f64,
) -> Affine {
    content_matrix(&clip_placement(carrier, clip, override_clip, clip_w, clip_h))
}

/// Re-express a clip recorded relative to a group's center in the group's parent space.
pub fn rehome_clip(clip: &MaskClip, group: Affine) -> MaskClip {
    let (Some(left), Some(top)) = (clip.left, clip.top) else {
        return *clip;
    };
    let d = decompose(group);
    let at = group * Point::new(left, top);
    MaskClip {
        left: Some(at.x),
        top: Some(at.y),
        scale_x: Some(clip.scale_x.unwrap_or(1.0) * d.scale_x),
        scale_y: Some(clip.scale_y.unwrap_or(1.0) * d.scale_y.abs()),
        angle: Some(clip.angle.unwrap_or(0.0) + d.angle),
        ..*clip
    }
}

/// Shift a bound clip by `(dx, dy)`; unbound clips follow their carrier and stay unset.
pub fn translate_clip(clip: &MaskClip, dx: f64, dy: f64) -> MaskClip {
    MaskClip {
        left: clip.left.map(|v| v + dx),
        top: clip.top.map(|v| v + dy),
        ..*clip
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/clip.rs"]
mod tests;
