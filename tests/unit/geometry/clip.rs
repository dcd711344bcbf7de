use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn boxed(left: f64, top: f64, w: f64, h: f64) -> Placement {
    Placement {
        left,
        top,
        width: w,
        height: h,
        ..Placement::default()
    }
}

#[test]
fn no_radius_means_no_helpers() {
    let p = boxed(0.0, 0.0, 100.0, 60.0);
    assert!(radius_helpers(&p, 0.0, 4.0, Some(ColorDef::white())).is_none());
    assert!(radius_helpers(&p, f64::NAN, 0.0, None).is_none());
}

#[test]
fn rounded_clip_shrinks_by_border_and_centers_on_carrier() {
    let mut p = boxed(0.0, 0.0, 100.0, 60.0);
    p.opacity = 0.5;
    let h = radius_helpers(&p, 8.0, 10.0, Some(ColorDef::rgba(1.0, 0.0, 0.0, 1.0))).unwrap();
    let bb = h.clip.bounding_box();
    assert!(close(bb.x0, 5.0) && close(bb.y0, 5.0));
    assert!(close(bb.x1, 95.0) && close(bb.y1, 55.0));

    let outline = h.outline.unwrap();
    assert_eq!(outline.width, 10.0);
    assert_eq!(outline.opacity, 0.5);
    assert_eq!(outline.path, h.clip);
}

#[test]
fn outline_needs_width_and_color() {
    let p = boxed(0.0, 0.0, 100.0, 60.0);
    assert!(radius_helpers(&p, 8.0, 0.0, Some(ColorDef::white())).unwrap().outline.is_none());
    assert!(radius_helpers(&p, 8.0, 3.0, None).unwrap().outline.is_none());
}

#[test]
fn helpers_follow_the_carrier_scale() {
    let mut p = boxed(0.0, 0.0, 50.0, 30.0);
    p.scale_x = 2.0;
    p.scale_y = 2.0;
    let bb = radius_helpers(&p, 4.0, 0.0, None).unwrap().clip.bounding_box();
    assert!(close(bb.width(), 100.0) && close(bb.height(), 60.0));
}

#[test]
fn layer_outline_is_the_transformed_box() {
    let mut p = boxed(10.0, 20.0, 30.0, 40.0);
    p.scale_x = 2.0;
    let bb = layer_outline(&p).bounding_box();
    assert_eq!(bb, Rect::new(10.0, 20.0, 70.0, 60.0));
}

#[test]
fn unbound_clip_stretches_over_the_carrier() {
    let mut carrier = boxed(10.0, 20.0, 100.0, 50.0);
    carrier.scale_x = 2.0;
    carrier.scale_y = 2.0;
    let placed = clip_placement(&carrier, &MaskClip::default(), None, 50.0, 50.0);
    assert_eq!((placed.scale_x, placed.scale_y), (4.0, 2.0));

    let m = bind_mask_clip(&carrier, &MaskClip::default(), None, 50.0, 50.0);
    assert_eq!(m * Point::new(0.0, 0.0), Point::new(10.0, 20.0));
    assert_eq!(m * Point::new(50.0, 50.0), Point::new(210.0, 120.0));
}

#[test]
fn bound_clip_keeps_its_record() {
    let carrier = boxed(0.0, 0.0, 500.0, 500.0);
    let clip = MaskClip {
        left: Some(5.0),
        top: Some(6.0),
        scale_x: Some(2.0),
        scale_y: Some(2.0),
        ..MaskClip::default()
    };
    let m = bind_mask_clip(&carrier, &clip, None, 10.0, 10.0);
    assert_eq!(m * Point::new(0.0, 0.0), Point::new(5.0, 6.0));
    assert_eq!(m * Point::new(10.0, 10.0), Point::new(25.0, 26.0));
}

#[test]
fn override_wins_when_bound() {
    let carrier = boxed(0.0, 0.0, 100.0, 100.0);
    let clip = MaskClip {
        left: Some(5.0),
        top: Some(6.0),
        ..MaskClip::default()
    };
    let over = MaskClip {
        left: Some(40.0),
        top: Some(41.0),
        ..MaskClip::default()
    };
    let placed = clip_placement(&carrier, &clip, Some(&over), 10.0, 10.0);
    assert_eq!((placed.left, placed.top), (40.0, 41.0));

    let placed = clip_placement(&carrier, &clip, Some(&MaskClip::default()), 10.0, 10.0);
    assert_eq!((placed.left, placed.top), (5.0, 6.0));
}

#[test]
fn rehoming_applies_the_group_matrix() {
    let clip = MaskClip {
        left: Some(10.0),
        top: Some(5.0),
        angle: Some(15.0),
        ..MaskClip::default()
    };
    let group = Affine::translate((100.0, 100.0)) * Affine::scale(2.0);
    let out = rehome_clip(&clip, group);
    assert_eq!(out.left, Some(120.0));
    assert_eq!(out.top, Some(110.0));
    assert_eq!(out.scale_x, Some(2.0));
    assert_eq!(out.scale_y, Some(2.0));
    assert!(close(out.angle.unwrap(), 15.0));

    assert_eq!(rehome_clip(&MaskClip::default(), group), MaskClip::default());
}

#[test]
fn translating_leaves_unbound_clips_unset() {
    let bound = MaskClip {
        left: Some(1.0),
        top: Some(2.0),
        ..MaskClip::default()
    };
    let moved = translate_clip(&bound, -1.0, -2.0);
    assert_eq!((moved.left, moved.top), (Some(0.0), Some(0.0)));
    assert_eq!(translate_clip(&MaskClip::default(), 5.0, 5.0), MaskClip::default());
}
