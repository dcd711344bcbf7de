use super::*;
use crate::template::model::TemplateDef;
use crate::template::normalize::normalize;
use serde_json::json;

fn template(layers: serde_json::Value) -> Template {
    let def: TemplateDef = serde_json::from_value(json!({
        "frame": { "width": 400, "height": 300 },
        "layers": layers
    }))
    .unwrap();
    normalize(&def).unwrap()
}

#[test]
fn artboard_position_becomes_the_origin() {
    let t = template(json!([
        { "id": "Main Artboard", "type": "Artboard", "left": 100, "top": 50, "width": 200, "height": 100 },
        { "id": "child", "type": "StaticPath", "path": "M0 0 L1 1", "left": 150, "top": 90 }
    ]));
    let prepared = prepare(&t, ExportMode::Template);
    let layers = &prepared.template.layers;
    assert_eq!((layers[0].placement.left, layers[0].placement.top), (0.0, 0.0));
    assert_eq!((layers[1].placement.left, layers[1].placement.top), (50.0, 40.0));
    assert_eq!(prepared.origin, Vec2::new(100.0, 50.0));
    assert_eq!((prepared.width, prepared.height), (400.0, 300.0));
}

#[test]
fn hidden_and_helper_layers_are_dropped_everywhere() {
    let t = template(json!([
        { "id": "background", "type": "Background", "width": 400, "height": 300 },
        { "id": "cb", "type": "StaticPath", "path": "M0 0",
          "metadata": { "type": "CHECKBOX_BACKGROUND" } },
        { "id": "a", "type": "StaticPath", "path": "M0 0", "visible": false },
        { "id": "g", "type": "group", "objects": [
            { "id": "b", "type": "StaticPath", "path": "M0 0", "visible": false },
            { "id": "c", "type": "StaticPath", "path": "M0 0" }
        ] }
    ]));
    let prepared = prepare(&t, ExportMode::Template);
    let ids: Vec<_> = prepared.template.layers.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, ["g"]);
    let LayerKind::Group(g) = &prepared.template.layers[0].kind else {
        panic!("expected group");
    };
    assert_eq!(g.children.len(), 1);
    assert_eq!(g.children[0].id, "c");
}

#[test]
fn artboard_mode_uses_the_scaled_box_with_a_minimum_edge() {
    let t = template(json!([
        { "id": "Main Artboard", "type": "Artboard", "left": 10, "top": 10, "width": 100,
          "height": 5, "scaleX": 2 }
    ]));
    let prepared = prepare(&t, ExportMode::Artboard);
    assert_eq!((prepared.width, prepared.height), (200.0, MIN_ARTBOARD_EDGE));
}

#[test]
fn artboard_mode_without_artboards_exports_the_frame() {
    let t = template(json!([{ "id": "p", "type": "StaticPath", "path": "M0 0", "left": 7 }]));
    let prepared = prepare(&t, ExportMode::Artboard);
    assert_eq!((prepared.width, prepared.height), (400.0, 300.0));
    assert_eq!(prepared.template.layers[0].placement.left, 7.0);
}

#[test]
fn bound_mask_clips_move_with_their_carrier() {
    let t = template(json!([
        { "id": "Main Artboard", "type": "Artboard", "left": 100, "top": 50, "width": 10, "height": 10 },
        { "id": "m", "type": "Mask", "src": "x", "left": 120, "top": 60,
          "clipPath": { "left": 130, "top": 70 } },
        { "id": "n", "type": "Mask", "src": "x", "clipPath": { "scaleX": 2 } }
    ]));
    let prepared = prepare(&t, ExportMode::Template);
    let LayerKind::Mask(m) = &prepared.template.layers[1].kind else {
        panic!("expected mask");
    };
    assert_eq!((m.clip.left, m.clip.top), (Some(30.0), Some(20.0)));
    let LayerKind::Mask(n) = &prepared.template.layers[2].kind else {
        panic!("expected mask");
    };
    assert_eq!(n.clip.left, None);
}
