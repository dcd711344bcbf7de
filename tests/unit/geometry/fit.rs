use super::*;

#[test]
fn portrait_image_in_tall_frame_fits_width() {
    let frame = Placement {
        left: 0.0,
        top: 0.0,
        width: 540.0,
        height: 1040.0,
        ..Placement::default()
    };
    let fitted = fit_image_into_frame(&frame, 2160.0, 2880.0);

    let expected = (540.0f64 / 2160.0).min(1040.0 / 2880.0);
    assert_eq!(fitted.scale_x, expected);
    assert_eq!(fitted.scale_y, expected);
    assert_eq!(fitted.width, 2160.0);
    assert_eq!(fitted.height, 2880.0);
    // 2880 * 0.25 = 720 tall inside 1040: centered vertically, flush horizontally.
    assert_eq!(fitted.left, 0.0);
    assert_eq!(fitted.top, 160.0);
}

#[test]
fn scaled_frames_use_their_scaled_size() {
    let frame = Placement {
        width: 270.0,
        height: 520.0,
        scale_x: 2.0,
        scale_y: 2.0,
        origin_x: Origin::Center,
        origin_y: Origin::Center,
        left: 50.0,
        top: 60.0,
        ..Placement::default()
    };
    let fitted = fit_image_into_frame(&frame, 2160.0, 2880.0);
    assert_eq!(fitted.scale_x, 0.25);
    assert_eq!((fitted.left, fitted.top), (50.0, 60.0));
}

#[test]
fn wide_image_fits_height_when_frame_is_wider() {
    assert_eq!(fit_scale(400.0, 100.0, 200.0, 200.0), 0.5);
    assert_eq!(fit_scale(100.0, 400.0, 200.0, 200.0), 0.5);
    assert_eq!(fit_scale(100.0, 400.0, 400.0, 100.0), 0.25);
}

#[test]
fn unsized_placeholder_takes_natural_size() {
    let fitted = fit_image_into_frame(&Placement::default(), 30.0, 40.0);
    assert_eq!((fitted.width, fitted.height), (30.0, 40.0));
    assert_eq!(fitted.scale_x, 1.0);
}
