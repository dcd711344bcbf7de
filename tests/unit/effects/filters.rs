use super::*;
use serde_json::json;

fn descriptors(v: serde_json::Value) -> Vec<FilterDescriptor> {
    serde_json::from_value(v).unwrap()
}

fn gradient(w: u32, h: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            out.extend_from_slice(&[(x * 17 % 256) as u8, (y * 29 % 256) as u8, 90, 255]);
        }
    }
    out
}

fn run(stack: &FilterStack, px: &mut [u8], w: u32, h: u32) {
    stack
        .apply(px, w, h, &mut FilterBackend::default())
        .unwrap();
}

#[test]
fn stack_uses_canonical_order_and_skips_unknown_types() {
    let stack = FilterStack::from_descriptors(
        &descriptors(json!([
            { "type": "Sepia" },
            { "type": "Sparkle" },
            { "type": "None" },
            { "type": "Brightness", "brightness": 0.1 }
        ])),
        0,
    );
    assert_eq!(stack.ops().len(), 2);
    assert_eq!(stack.ops()[0], FilterOp::Brightness(0.1));
    assert_eq!(stack.ops()[1], FilterOp::ColorMatrix(SEPIA));
}

#[test]
fn last_descriptor_of_a_type_wins() {
    let stack = FilterStack::from_descriptors(
        &descriptors(json!([
            { "type": "Contrast", "contrast": 0.1 },
            { "type": "Contrast", "contrast": 0.4 }
        ])),
        0,
    );
    assert_eq!(stack.ops(), &[FilterOp::Contrast(0.4)]);
}

#[test]
fn empty_stack_is_pass_through() {
    let stack = FilterStack::from_descriptors(&[], 0);
    assert!(stack.is_empty());
    let mut px = gradient(3, 3);
    let before = px.clone();
    run(&stack, &mut px, 3, 3);
    assert_eq!(px, before);
}

#[test]
fn brightness_and_invert_match_channel_math() {
    let stack = FilterStack::from_descriptors(
        &descriptors(json!([{ "type": "Invert" }, { "type": "Brightness", "brightness": 0.2 }])),
        0,
    );
    let mut px = vec![10u8, 100, 250, 128];
    run(&stack, &mut px, 1, 1);
    // +51 then invert; 250 saturates first.
    assert_eq!(px, vec![255 - 61, 255 - 151, 0, 128]);
}

#[test]
fn grayscale_averages_channels() {
    let stack = FilterStack::from_descriptors(&descriptors(json!([{ "type": "Greyscale" }])), 0);
    let mut px = vec![30u8, 60, 90, 255];
    run(&stack, &mut px, 1, 1);
    assert_eq!(px, vec![60, 60, 60, 255]);
}

#[test]
fn sepia_matrix_uses_straight_channels() {
    let stack = FilterStack::from_descriptors(&descriptors(json!([{ "type": "Sepia" }])), 0);
    let mut px = vec![100u8, 100, 100, 255];
    run(&stack, &mut px, 1, 1);
    assert_eq!(px[0], clamp_u8(100.0 * (0.393 + 0.769 + 0.189)));
    assert_eq!(px[1], clamp_u8(100.0 * (0.349 + 0.686 + 0.168)));
    assert_eq!(px[2], clamp_u8(100.0 * (0.272 + 0.534 + 0.131)));
    assert_eq!(px[3], 255);
}

#[test]
fn hue_rotation_by_zero_is_identity() {
    let m = hue_rotation_matrix(0.0);
    assert!((m[0] - 1.0).abs() < 1e-6);
    assert!(m[1].abs() < 1e-6);
    assert!((m[12] - 1.0).abs() < 1e-6);
}

#[test]
fn remove_color_clears_alpha_near_target() {
    let stack = FilterStack::from_descriptors(
        &descriptors(json!([{ "type": "RemoveColor", "color": "#FFFFFF", "distance": 0.1 }])),
        0,
    );
    let mut px = vec![250u8, 250, 250, 255, 10, 10, 10, 255];
    run(&stack, &mut px, 2, 1);
    assert_eq!(px[3], 0);
    assert_eq!(px[7], 255);
}

#[test]
fn blend_color_tint_mixes_toward_color() {
    let stack = FilterStack::from_descriptors(
        &descriptors(json!([{ "type": "BlendColor", "color": "#ff0000", "mode": "tint", "alpha": 0.5 }])),
        0,
    );
    let mut px = vec![0u8, 100, 200, 255];
    run(&stack, &mut px, 1, 1);
    assert_eq!(px, vec![128, 50, 100, 255]);
}

#[test]
fn pixelate_copies_block_origin() {
    let stack =
        FilterStack::from_descriptors(&descriptors(json!([{ "type": "Pixelate", "blocksize": "2" }])), 0);
    let mut px = gradient(4, 4);
    let origin = px[0..4].to_vec();
    run(&stack, &mut px, 4, 4);
    assert_eq!(&px[4..8], origin.as_slice());
    assert_eq!(&px[16..20], origin.as_slice());
}

#[test]
fn sharpen_keeps_flat_images_flat() {
    let stack = FilterStack::from_descriptors(&descriptors(json!([{ "type": "Sharpen" }])), 0);
    let mut px = [40u8, 80, 120, 255].repeat(9);
    run(&stack, &mut px, 3, 3);
    assert_eq!(&px[16..20], &[40, 80, 120, 255]);
}

#[test]
fn reapplying_a_rebuilt_stack_is_deterministic() {
    let desc = descriptors(json!([
        { "type": "Noise", "noise": 80 },
        { "type": "Contrast", "contrast": 0.3 },
        { "type": "Blur", "blur": 0.4 },
        { "type": "Vibrance", "vibrance": 0.5 }
    ]));
    let mut a = gradient(40, 30);
    let mut b = a.clone();
    run(&FilterStack::from_descriptors(&desc, 7), &mut a, 40, 30);
    run(&FilterStack::from_descriptors(&desc, 7), &mut b, 40, 30);
    assert_eq!(a, b);
}

#[test]
fn banding_does_not_change_pixels() {
    let desc = descriptors(json!([
        { "type": "Noise", "noise": 120 },
        { "type": "Saturation", "saturation": -0.4 }
    ]));
    let stack = FilterStack::from_descriptors(&desc, 3);
    let mut tiled = gradient(16, 16);
    let mut full = tiled.clone();
    let mut small = FilterBackend::new(4, 8);
    let mut banded = FilterBackend::new(64, 64);
    assert_eq!(small.plan_for(16, 16), ProcessingPlan::FullFrame);
    assert_eq!(banded.plan_for(16, 16), ProcessingPlan::Tiled { rows: 2 });
    stack.apply(&mut full, 16, 16, &mut small).unwrap();
    stack.apply(&mut tiled, 16, 16, &mut banded).unwrap();
    assert_eq!(tiled, full);
}
