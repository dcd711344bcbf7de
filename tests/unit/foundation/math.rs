use super::*;

#[test]
fn fnv_is_deterministic_and_seed_sensitive() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"row");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"row");
    assert_eq!(a.finish(), b.finish());

    let mut c = Fnv1a64::new(7);
    c.write_bytes(b"row");
    assert_ne!(a.finish(), c.finish());
}

#[test]
fn hash_unit_stays_in_range() {
    for x in 0..32 {
        for y in 0..8 {
            let v = hash_unit(42, x, y);
            assert!((0.0..1.0).contains(&v));
        }
    }
    assert_eq!(hash_unit(1, 3, 4), hash_unit(1, 3, 4));
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(0, 200), 0);
    assert_eq!(clamp_u8(300.0), 255);
    assert_eq!(clamp_u8(-4.0), 0);
}
