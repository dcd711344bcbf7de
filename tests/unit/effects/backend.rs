use super::*;

#[test]
fn small_images_use_the_current_tile() {
    let mut b = FilterBackend::new(256, 1024);
    assert_eq!(b.plan_for(100, 200), ProcessingPlan::Tiled { rows: 8 });
    assert_eq!(b.tile_size(), 256);
}

#[test]
fn larger_images_grow_the_tile_up_to_the_limit() {
    let mut b = FilterBackend::new(256, 1024);
    assert_eq!(b.plan_for(300, 800), ProcessingPlan::Tiled { rows: 25 });
    assert_eq!(b.tile_size(), 800);
    // Growth is sticky.
    assert_eq!(b.plan_for(10, 10), ProcessingPlan::Tiled { rows: 25 });
}

#[test]
fn images_past_the_limit_fall_back_to_full_frame() {
    let mut b = FilterBackend::new(256, 1024);
    assert_eq!(b.plan_for(2000, 10), ProcessingPlan::FullFrame);
    assert_eq!(b.tile_size(), 256);
}

#[test]
fn tile_is_clamped_to_the_limit() {
    let b = FilterBackend::new(9000, 4096);
    assert_eq!(b.tile_size(), 4096);
    assert_eq!(b.max_texture_size(), 4096);
}
