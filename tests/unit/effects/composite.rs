use super::*;

#[test]
fn over_with_opaque_source_replaces_destination() {
    assert_eq!(over([10, 20, 30, 255], [200, 100, 50, 255], 1.0), [200, 100, 50, 255]);
    assert_eq!(over([10, 20, 30, 255], [200, 100, 50, 255], 0.0), [10, 20, 30, 255]);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
}

#[test]
fn mask_scales_by_mask_alpha() {
    let mut dst = vec![10u8, 20, 30, 40, 200, 200, 200, 200];
    let mask = vec![0u8, 0, 0, 128, 9, 9, 9, 0];
    mask_in_place(&mut dst, &mask).unwrap();
    let w = 128u16;
    assert_eq!(dst[0], mul_div255_u8(10, w));
    assert_eq!(dst[3], mul_div255_u8(40, w));
    assert_eq!(&dst[4..], &[0, 0, 0, 0]);
}

#[test]
fn tint_keeps_coverage() {
    let src = vec![1u8, 2, 3, 255, 9, 9, 9, 0];
    let out = tint_alpha(&src, Rgba8Premul::from_straight_rgba(0, 0, 0, 255));
    assert_eq!(out, vec![0, 0, 0, 255, 0, 0, 0, 0]);
}

#[test]
fn shift_moves_pixels_and_clears_edges() {
    let src = vec![
        1, 1, 1, 1, 2, 2, 2, 2, //
        3, 3, 3, 3, 4, 4, 4, 4,
    ];
    let out = shift(&src, 2, 2, 1, 0);
    assert_eq!(out, vec![0, 0, 0, 0, 1, 1, 1, 1, 0, 0, 0, 0, 3, 3, 3, 3]);
}

#[test]
fn blur_radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_constant_image_is_identity() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    let out = blur_rgba8_premul(&src, w, h, 3, 2.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_spreads_energy_from_single_pixel() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8_premul(&src, w, h, 2, 1.2).unwrap();

    assert!(out.chunks_exact(4).filter(|px| px[3] != 0).count() > 1);
    let sum_a: u32 = out.chunks_exact(4).map(|px| u32::from(px[3])).sum();
    assert!((sum_a as i32 - 255).abs() <= 4);
}
