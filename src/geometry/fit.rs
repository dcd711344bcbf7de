use crate::template::layer::{Origin, Placement};

/// Uniform scale that fits an `img_w x img_h` image inside a `frame_w x frame_h` frame
/// without cropping.
pub fn fit_scale(frame_w: f64, frame_h: f64, img_w: f64, img_h: f64) -> f64 {
    let img_ratio = img_w / img_h;
    let frame_ratio = frame_w / frame_h;
    if img_ratio > frame_ratio {
        frame_w / img_w
    } else {
        frame_h / img_h
    }
}

/// Replace a placeholder frame with the fitted image placement.
///
/// The frame is the layer's scaled box. The image keeps its aspect ratio and is re-centered
/// inside the frame along every axis whose origin is not already the center. A placeholder
/// without a size takes the image's natural size.
pub fn fit_image_into_frame(p: &Placement, img_w: f64, img_h: f64) -> Placement {
    if img_w <= 0.0 || img_h <= 0.0 {
        return *p;
    }
    let frame_w = p.scaled_width();
    let frame_h = p.scaled_height();
    if frame_w <= 0.0 || frame_h <= 0.0 {
        return Placement {
            width: img_w,
            height: img_h,
            ..*p
        };
    }

    let scale = fit_scale(frame_w, frame_h, img_w, img_h);
    let slack_x = frame_w / 2.0 - img_w * scale / 2.0;
    let slack_y = frame_h / 2.0 - img_h * scale / 2.0;

    Placement {
        width: img_w,
        height: img_h,
        scale_x: scale,
        scale_y: scale,
        left: p.left + recenter(p.origin_x, slack_x),
        top: p.top + recenter(p.origin_y, slack_y),
        ..*p
    }
}

fn recenter(origin: Origin, slack: f64) -> f64 {
    match origin {
        Origin::Start => slack,
        Origin::Center => 0.0,
        Origin::End => -slack,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/fit.rs"]
mod tests;
