use crate::foundation::core::{Affine, Point, Vec2};
use crate::template::layer::{Origin, Placement};

/// Center of the layer's box in its parent space, honoring origin and rotation.
pub fn center_point(p: &Placement) -> Point {
    let offset = Vec2::new(
        (0.5 - p.origin_x.factor()) * p.scaled_width(),
        (0.5 - p.origin_y.factor()) * p.scaled_height(),
    );
    let rotated = Affine::rotate(p.angle.to_radians()) * offset.to_point();
    Point::new(p.left, p.top) + rotated.to_vec2()
}

/// Object matrix: maps the layer's centered local box to its parent space.
///
/// `translate(center) . rotate(angle) . scale(±sx, ±sy) . skewX . skewY`
pub fn object_matrix(p: &Placement) -> Affine {
    let center = center_point(p);
    let sx = if p.flip_x { -p.scale_x } else { p.scale_x };
    let sy = if p.flip_y { -p.scale_y } else { p.scale_y };
    let mut m = Affine::translate(center.to_vec2())
        * Affine::rotate(p.angle.to_radians())
        * Affine::scale_non_uniform(sx, sy);
    if p.skew_x != 0.0 {
        m *= Affine::skew(p.skew_x.to_radians().tan(), 0.0);
    }
    if p.skew_y != 0.0 {
        m *= Affine::skew(0.0, p.skew_y.to_radians().tan());
    }
    m
}

/// Maps layer content drawn at `(0, 0)..(width, height)` to the parent space.
pub fn content_matrix(p: &Placement) -> Affine {
    object_matrix(p) * Affine::translate((-p.width / 2.0, -p.height / 2.0))
}

/// Decomposition of an affine into translation, rotation, scale and horizontal skew.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decomposed {
    /// Translation (the box center for object matrices).
    pub translate: Vec2,
    /// Degrees.
    pub angle: f64,
    /// Horizontal scale (always positive).
    pub scale_x: f64,
    /// Vertical scale; negative when the matrix mirrors.
    pub scale_y: f64,
    /// Degrees.
    pub skew_x: f64,
}

/// QR-style decomposition of `m`.
pub fn decompose(m: Affine) -> Decomposed {
    let [a, b, c, d, e, f] = m.as_coeffs();
    let denom = a * a + b * b;
    let scale_x = denom.sqrt();
    let (scale_y, skew_x) = if scale_x > 0.0 {
        ((a * d - c * b) / scale_x, (a * c + b * d).atan2(denom).to_degrees())
    } else {
        ((c * c + d * d).sqrt(), 0.0)
    };
    Decomposed {
        translate: Vec2::new(e, f),
        angle: b.atan2(a).to_degrees(),
        scale_x,
        scale_y,
        skew_x,
    }
}

/// Re-express a child placement given relative to a group's center in the group's parent
/// space, so the child can be placed without the group's matrix.
pub fn flatten_into(group: Affine, child: &Placement) -> Placement {
    let d = decompose(group * object_matrix(child));
    Placement {
        left: d.translate.x,
        top: d.translate.y,
        scale_x: d.scale_x,
        scale_y: d.scale_y,
        angle: d.angle,
        flip_x: false,
        flip_y: false,
        skew_x: d.skew_x,
        skew_y: 0.0,
        origin_x: Origin::Center,
        origin_y: Origin::Center,
        ..*child
    }
}

/// Move a placement by `(dx, dy)`.
pub fn translated(p: &Placement, dx: f64, dy: f64) -> Placement {
    Placement {
        left: p.left + dx,
        top: p.top + dy,
        ..*p
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/transform.rs"]
mod tests;
