use super::*;

fn tt(kind: TextPathKind, value: f64) -> TextTransform {
    TextTransform { kind, value }
}

#[test]
fn zero_intensity_has_no_path() {
    assert!(text_path(&tt(TextPathKind::Arch, 0.0), 300.0, 40.0).is_none());
}

#[test]
fn angle_is_a_tilted_line() {
    let p = text_path(&tt(TextPathKind::Angle, 100.0), 300.0, 150.0).unwrap();
    let s = PathSampler::new(&p.path);
    let expected = (300.0f64.powi(2) + 144.0f64.powi(2)).sqrt();
    assert!((s.length() - expected).abs() < 1e-6);

    let (start, angle) = s.sample(0.0).unwrap();
    assert_eq!(start, Point::new(0.0, 72.0));
    assert!((angle - (-144.0f64).atan2(300.0)).abs() < 1e-9);
    assert!(!p.closed);
}

#[test]
fn arch_spans_the_box_width() {
    let p = text_path(&tt(TextPathKind::Arch, 25.0), 200.0, 40.0).unwrap();
    let s = PathSampler::new(&p.path);
    let (a, _) = s.sample(0.0).unwrap();
    let (b, _) = s.sample(s.length()).unwrap();
    assert_eq!(a, Point::new(0.0, 0.0));
    assert!((b.x - 200.0).abs() < 0.01 && b.y.abs() < 0.01);
    // The midpoint of the curve bulges upward.
    let (mid, angle) = s.sample(s.length() / 2.0).unwrap();
    assert!(mid.y < -5.0);
    assert!(angle.abs() < 1e-3);
}

#[test]
fn circle_is_closed_and_starts_a_quarter_turn_back() {
    let p = text_path(&tt(TextPathKind::Circular, 72.0), 300.0, 50.0).unwrap();
    let r = 50.0 * 1.3 * (72.0 / 90.0 + 0.2);
    assert!(p.closed);
    assert!((p.start_offset + std::f64::consts::PI * r / 2.0).abs() < 1e-9);
    let len = PathSampler::new(&p.path).length();
    assert!((len - 2.0 * std::f64::consts::PI * r).abs() < 1.0);
}

#[test]
fn flag_wave_and_rise_end_at_the_box_edge() {
    for kind in [TextPathKind::Flag, TextPathKind::Wave, TextPathKind::Rise] {
        let p = text_path(&tt(kind, 40.0), 240.0, 40.0).unwrap();
        let s = PathSampler::new(&p.path);
        let (end, _) = s.sample(f64::MAX).unwrap();
        assert!((end.x - 240.0).abs() < 0.01, "{kind:?}");
    }
}

#[test]
fn truncation_stops_once_the_budget_is_spent() {
    let mut ten = |_: char| 10.0;
    // Budget 45: after five glyphs the run is 50 wide, the sixth is dropped.
    assert_eq!(truncate_to_path("abcdefgh", 65.0, 0.0, &mut ten), "abcde");
    // A run that fits keeps every glyph.
    assert_eq!(truncate_to_path("abc", 200.0, 0.0, &mut ten), "abc");
}

#[test]
fn truncation_counts_spacing_and_converts_spaces() {
    let mut ten = |_: char| 10.0;
    assert_eq!(truncate_to_path("a b\nc", 55.0, 5.0, &mut ten), "a\u{a0}b");
}

#[test]
fn short_curves_keep_nothing() {
    let mut ten = |_: char| 10.0;
    assert_eq!(truncate_to_path("abc", 15.0, 0.0, &mut ten), "");
}
