use std::f64::consts::PI;

use kurbo::{Arc, ParamCurve, ParamCurveArclen, ParamCurveDeriv, PathSeg, Shape};

use crate::foundation::core::{BezPath, Point, Vec2};
use crate::template::layer::{TextPathKind, TextTransform};

const ARCLEN_ACCURACY: f64 = 1e-3;
/// Run length kept free at the end of a curve.
pub const PATH_END_SLACK: f64 = 20.0;
const NBSP: char = '\u{a0}';

/// Curve a text run is laid along, in the text box's local space.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPath {
    /// Curve geometry.
    pub path: BezPath,
    /// Distance along the curve where a centered run's midpoint sits, relative to the middle.
    pub start_offset: f64,
    /// Closed curves wrap offsets around instead of clamping them.
    pub closed: bool,
}

/// Build the curve for a transform directive on a box `width` wide with `font_size` text.
///
/// Returns `None` for a zero intensity.
pub fn text_path(transform: &TextTransform, width: f64, font_size: f64) -> Option<TextPath> {
    let v = transform.value;
    if v == 0.0 || !v.is_finite() {
        return None;
    }
    let w = width;
    let mut path = BezPath::new();
    let mut start_offset = 0.0;
    let mut closed = false;

    match transform.kind {
        TextPathKind::Flag => {
            let cv = v / 100.0;
            let f = font_size * 0.7 * cv;
            path.move_to((0.0, 0.0));
            path.curve_to((w / 6.0, f), (w / 3.0, f), (w / 2.0, 0.0));
            path.curve_to((2.0 * w / 3.0, -f), (w, -f), (w, 0.0));
        }
        TextPathKind::Circular => {
            let r = font_size * 1.3 * (v / 90.0 + 0.2);
            let arc = Arc {
                center: Point::new(2.0 * r, 2.0 * r),
                radii: Vec2::new(r, r),
                start_angle: PI,
                sweep_angle: 2.0 * PI,
                x_rotation: 0.0,
            };
            path = arc.to_path(0.1);
            start_offset = -PI * r / 2.0;
            closed = true;
        }
        TextPathKind::Angle => {
            let cv = -v / 100.0;
            let vo = font_size * 72.0 / 150.0;
            path.move_to((0.0, -cv * vo));
            path.line_to((w, cv * vo));
        }
        TextPathKind::Arch => {
            let cv = v / 25.0;
            path.move_to((0.0, 0.0));
            path.quad_to((w / 2.0, -font_size / 2.0 * cv), (w, 0.0));
        }
        TextPathKind::Wave => {
            let cv = v / 80.0;
            let c1 = font_size * 70.0 / 72.0 * cv;
            let c2 = font_size * 75.0 / 72.0 * cv;
            let c3 = font_size * 90.0 / 72.0 * cv;
            path.move_to((0.0, 0.0));
            path.curve_to((w / 3.0, -c1), (w / 2.0, -c2), (w / 2.0, -c2));
            // Smooth continuation: the first control mirrors the previous one about the joint.
            path.curve_to((w / 2.0, -c2), (5.0 * w / 6.0, -c3), (w, -c1));
        }
        TextPathKind::Rise => {
            let cv = v / 80.0;
            let r1 = font_size * 0.70 * cv;
            let r2 = font_size * 0.65 * cv;
            let r3 = font_size * 0.30 * cv;
            let r4 = font_size * 0.40 * cv;
            path.move_to((0.0, r1));
            path.curve_to((w / 6.0, r2), (w / 3.0, r3), (w / 2.0, 0.0));
            path.curve_to((2.0 * w / 3.0, -r3), (4.0 * w / 6.0, -r3), (w, -r4));
        }
    }

    Some(TextPath {
        path,
        start_offset,
        closed,
    })
}

/// Arc-length parameterization of a path.
#[derive(Clone, Debug)]
pub struct PathSampler {
    segs: Vec<(PathSeg, f64, f64)>,
    total: f64,
}

impl PathSampler {
    /// Measure every segment of `path`.
    pub fn new(path: &BezPath) -> Self {
        let mut segs = Vec::new();
        let mut total = 0.0;
        for seg in path.segments() {
            let len = seg.arclen(ARCLEN_ACCURACY);
            segs.push((seg, total, len));
            total += len;
        }
        Self { segs, total }
    }

    /// Total length.
    pub fn length(&self) -> f64 {
        self.total
    }

    /// Point and tangent angle (radians) at distance `s` from the start, clamped to the path.
    pub fn sample(&self, s: f64) -> Option<(Point, f64)> {
        let s = s.clamp(0.0, self.total);
        let (seg, start, len) = self
            .segs
            .iter()
            .find(|(_, start, len)| s <= start + len)
            .or_else(|| self.segs.last())?;
        let local = s - start;
        let t = if local <= 0.0 || *len <= 0.0 {
            0.0
        } else if local >= *len {
            1.0
        } else {
            seg.inv_arclen(local, ARCLEN_ACCURACY)
        };
        let tangent = match seg {
            PathSeg::Line(l) => l.p1 - l.p0,
            PathSeg::Quad(q) => q.deriv().eval(t).to_vec2(),
            PathSeg::Cubic(c) => c.deriv().eval(t).to_vec2(),
        };
        Some((seg.eval(t), tangent.y.atan2(tangent.x)))
    }
}

/// Width of a single character in the run's font.
pub trait CharMeasure {
    /// Advance of `ch` in pixels.
    fn char_width(&mut self, ch: char) -> f64;
}

impl<F: FnMut(char) -> f64> CharMeasure for F {
    fn char_width(&mut self, ch: char) -> f64 {
        self(ch)
    }
}

/// Keep the prefix of `text` that fits a curve of `curve_length`.
///
/// Characters are appended while the advance accumulated so far is below
/// `curve_length - PATH_END_SLACK`; each appended character adds its width plus `spacing`.
/// Spaces and newlines become non-breaking spaces so the run stays on one line.
pub fn truncate_to_path(
    text: &str,
    curve_length: f64,
    spacing: f64,
    measure: &mut impl CharMeasure,
) -> String {
    let limit = curve_length - PATH_END_SLACK;
    let mut out = String::new();
    let mut advance = 0.0;
    for ch in text.chars() {
        if advance >= limit {
            break;
        }
        let ch = if ch == ' ' || ch == '\n' { NBSP } else { ch };
        out.push(ch);
        advance += measure.char_width(ch) + spacing;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/text/path.rs"]
mod tests;
