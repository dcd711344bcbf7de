use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn placement(left: f64, top: f64, w: f64, h: f64) -> Placement {
    Placement {
        left,
        top,
        width: w,
        height: h,
        ..Placement::default()
    }
}

#[test]
fn center_follows_origin() {
    let mut p = placement(10.0, 20.0, 100.0, 50.0);
    assert_eq!(center_point(&p), Point::new(60.0, 45.0));

    p.origin_x = Origin::Center;
    p.origin_y = Origin::End;
    assert_eq!(center_point(&p), Point::new(10.0, -5.0));
}

#[test]
fn center_rotates_around_the_anchor() {
    let mut p = placement(0.0, 0.0, 100.0, 0.0);
    p.angle = 90.0;
    let c = center_point(&p);
    assert!(close(c.x, 0.0));
    assert!(close(c.y, 50.0));
}

#[test]
fn content_matrix_maps_box_corners() {
    let mut p = placement(10.0, 20.0, 100.0, 50.0);
    p.scale_x = 2.0;
    let m = content_matrix(&p);
    assert_eq!(m * Point::new(0.0, 0.0), Point::new(10.0, 20.0));
    assert_eq!(m * Point::new(100.0, 50.0), Point::new(210.0, 70.0));

    p.flip_x = true;
    let m = content_matrix(&p);
    assert_eq!(m * Point::new(0.0, 0.0), Point::new(210.0, 20.0));
}

#[test]
fn decompose_recovers_rotation_and_scale() {
    let m = Affine::translate((5.0, 6.0)) * Affine::rotate(30f64.to_radians()) * Affine::scale_non_uniform(2.0, 3.0);
    let d = decompose(m);
    assert!(close(d.angle, 30.0));
    assert!(close(d.scale_x, 2.0));
    assert!(close(d.scale_y, 3.0));
    assert!(close(d.skew_x, 0.0));
    assert_eq!(d.translate, Vec2::new(5.0, 6.0));
}

#[test]
fn flattening_a_child_composes_the_group_matrix() {
    let mut group = placement(100.0, 100.0, 200.0, 200.0);
    group.scale_x = 2.0;
    group.scale_y = 2.0;
    // Child centered 10px right of the group center, relative coordinates.
    let mut child = placement(10.0, 0.0, 20.0, 20.0);
    child.origin_x = Origin::Center;
    child.origin_y = Origin::Center;

    let flat = flatten_into(object_matrix(&group), &child);
    // Group center is (300, 300); the offset doubles.
    assert!(close(flat.left, 320.0));
    assert!(close(flat.top, 300.0));
    assert!(close(flat.scale_x, 2.0));
    assert_eq!(flat.width, 20.0);

    let direct = content_matrix(&flat) * Point::new(0.0, 0.0);
    let nested = object_matrix(&group) * content_matrix(&child) * Point::new(0.0, 0.0);
    assert!(close(direct.x, nested.x) && close(direct.y, nested.y));
}
