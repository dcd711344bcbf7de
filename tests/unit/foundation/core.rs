use super::*;

#[test]
fn canvas_rounds_up_and_clamps_to_one_pixel() {
    assert_eq!(
        Canvas::from_f64(99.2, 0.0),
        Canvas {
            width: 100,
            height: 1
        }
    );
    assert_eq!(Canvas::from_f64(f64::NAN, 3.0).width, 1);
    assert_eq!(Canvas::from_f64(2.0, 2.0).byte_len(), 16);
}

#[test]
fn checked_canvases_enforce_edge_and_area_limits() {
    assert_eq!(Canvas::from_f64(70_000.0, 2.0).width, 70_000);
    assert!(matches!(
        Canvas::checked_from_f64(70_000.0, 2.0),
        Err(BatchboardError::Render(_))
    ));
    assert!(Canvas::checked_from_f64(10_000.0, 10_000.0).is_err());
    assert_eq!(
        Canvas::checked_from_f64(640.0, 480.0).unwrap(),
        Canvas {
            width: 640,
            height: 480
        }
    );
}

#[test]
fn premultiply_then_unpremultiply_is_stable_for_opaque_and_half_alpha() {
    let mut px = vec![200, 100, 50, 255, 200, 100, 50, 128, 9, 9, 9, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[200, 100, 50, 255]);
    assert_eq!(&px[4..8], &[100, 50, 25, 128]);
    assert_eq!(&px[8..12], &[0, 0, 0, 0]);

    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[200, 100, 50, 255]);
    assert!((i32::from(px[4]) - 200).abs() <= 2);
    assert!((i32::from(px[5]) - 100).abs() <= 2);
}

#[test]
fn from_straight_rgba_premultiplies() {
    let c = Rgba8Premul::from_straight_rgba(255, 0, 0, 128);
    assert_eq!(c, Rgba8Premul { r: 128, g: 0, b: 0, a: 128 });
}
