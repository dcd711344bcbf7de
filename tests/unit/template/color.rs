use super::*;
use serde_json::json;

#[test]
fn parses_hex_forms() {
    let c: ColorDef = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, ColorDef::rgba(1.0, 0.0, 0.0, 1.0));

    let c: ColorDef = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);

    assert_eq!(ColorDef::parse("#FFF").unwrap(), ColorDef::white());
    assert_eq!(ColorDef::parse("#333333").unwrap().to_hex(), "#333333");
}

#[test]
fn parses_css_functions_and_names() {
    let c = ColorDef::parse("rgba(255, 0, 0, 0.5)").unwrap();
    assert_eq!(c.to_rgba8(), [255, 0, 0, 128]);

    let c = ColorDef::parse("rgb(0 128 255)").unwrap();
    assert_eq!(c.to_rgba8(), [0, 128, 255, 255]);

    let c = ColorDef::parse("hsl(120, 100%, 50%)").unwrap();
    assert_eq!(c.to_rgba8(), [0, 255, 0, 255]);

    assert_eq!(ColorDef::parse("transparent").unwrap().a, 0.0);
    assert_eq!(ColorDef::parse(" White ").unwrap(), ColorDef::white());
}

#[test]
fn parses_rgba_object_and_array() {
    let c: ColorDef = serde_json::from_value(json!({"r": 0.25, "g": 0.5, "b": 0.75})).unwrap();
    assert_eq!(c, ColorDef::rgba(0.25, 0.5, 0.75, 1.0));

    let c: ColorDef = serde_json::from_value(json!([0.25, 0.5, 0.75, 0.9])).unwrap();
    assert_eq!(c, ColorDef::rgba(0.25, 0.5, 0.75, 0.9));
}

#[test]
fn rejects_garbage() {
    assert!(ColorDef::parse("#12345").is_err());
    assert!(ColorDef::parse("rgb(1,2)").is_err());
    assert!(ColorDef::parse("not-a-color").is_err());
}

#[test]
fn alpha_multiplication_clamps() {
    let c = ColorDef::white().with_alpha_mul(0.5);
    assert_eq!(c.to_rgba8()[3], 128);
    assert_eq!(c.to_hex(), "#ffffff80");
    assert_eq!(ColorDef::white().with_alpha_mul(3.0).a, 1.0);
}
