use super::*;
use crate::assets::fetch::MemoryFetcher;
use crate::foundation::error::BatchboardError;
use crate::template::model::TemplateDef;
use crate::template::normalize::normalize;
use serde_json::json;

fn template() -> Template {
    let def: TemplateDef = serde_json::from_value(json!({
        "frame": { "width": 60, "height": 40 },
        "layers": [
            { "id": "Main Artboard", "type": "Artboard", "left": 10, "top": 10,
              "width": 30, "height": 10, "fill": "#00ff00" },
            { "id": "dot", "type": "StaticPath", "path": "M0 0 L4 0 L4 4 L0 4 Z", "fill": "#ff0000",
              "left": 12, "top": 12, "width": 4, "height": 4 }
        ]
    }))
    .unwrap();
    normalize(&def).unwrap()
}

fn pixels(img: &RenderedImage) -> image::RgbaImage {
    image::load_from_memory(&img.bytes).unwrap().to_rgba8()
}

#[test]
fn template_mode_keeps_the_frame_size_and_rebases() {
    let mut r = TemplateRenderer::new(RenderOptions::default());
    let img = r
        .render(&template(), &MemoryFetcher::new(), &FontCache::default(), [])
        .unwrap();
    assert_eq!((img.width, img.height), (60, 40));
    let px = pixels(&img);
    // The artboard now sits at the origin.
    assert_eq!(px.get_pixel(1, 1).0, [0, 255, 0, 255]);
    assert_eq!(px.get_pixel(3, 3).0, [255, 0, 0, 255]);
    assert_eq!(px.get_pixel(50, 30).0[3], 0);
}

#[test]
fn artboard_mode_crops_with_the_minimum_edge() {
    let mut r = TemplateRenderer::new(RenderOptions {
        mode: ExportMode::Artboard,
        format: ExportFormat::Webp,
        ..RenderOptions::default()
    });
    let img = r
        .render(&template(), &MemoryFetcher::new(), &FontCache::default(), [])
        .unwrap();
    assert_eq!((img.width, img.height), (30, 20));
    assert_eq!(img.format, ExportFormat::Webp);
}

#[test]
fn rendering_twice_is_byte_identical() {
    let t = template();
    let fetcher = MemoryFetcher::new();
    let fonts = FontCache::default();
    let mut r = TemplateRenderer::new(RenderOptions::default());
    let a = r.render(&t, &fetcher, &fonts, []).unwrap();
    let b = r.render(&t, &fetcher, &fonts, []).unwrap();
    assert_eq!(a, b);
}

#[test]
fn lone_canvas_background_is_painted() {
    let def: TemplateDef = serde_json::from_value(json!({
        "frame": { "width": 20, "height": 20 },
        "layers": [
            { "id": "background", "type": "Background", "width": 20, "height": 20, "fill": "#ff0000" }
        ]
    }))
    .unwrap();
    let mut r = TemplateRenderer::new(RenderOptions::default());
    let img = r
        .render(&normalize(&def).unwrap(), &MemoryFetcher::new(), &FontCache::default(), [])
        .unwrap();
    assert_eq!(pixels(&img).get_pixel(10, 10).0, [255, 0, 0, 255]);
}

#[test]
fn oversized_artboard_crop_fails_the_row() {
    let def: TemplateDef = serde_json::from_value(json!({
        "frame": { "width": 100, "height": 100 },
        "layers": [
            { "id": "Main Artboard", "type": "Artboard", "width": 70000, "height": 10 }
        ]
    }))
    .unwrap();
    let mut r = TemplateRenderer::new(RenderOptions {
        mode: ExportMode::Artboard,
        ..RenderOptions::default()
    });
    let err = r
        .render(&normalize(&def).unwrap(), &MemoryFetcher::new(), &FontCache::default(), [])
        .unwrap_err();
    assert!(matches!(err, BatchboardError::Render(_)));
}
