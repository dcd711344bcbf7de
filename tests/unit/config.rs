use super::*;

#[test]
fn empty_document_gives_defaults() {
    let c = BatchConfig::from_json_str("{}").unwrap();
    assert_eq!(c, BatchConfig::default());
    assert_eq!(c.threads, None);
    assert_eq!(c.format, ExportFormat::Png);
    assert_eq!(c.export_mode, ExportMode::Template);
    assert_eq!(c.fetch.timeout_secs, 30);
    assert_eq!(c.filters.tile_size, 2048);
    assert_eq!(c.fallback_fonts.sans_serif, "Arial");
}

#[test]
fn camel_case_fields_override_defaults() {
    let c = BatchConfig::from_json_str(
        r#"{
            "threads": 3,
            "format": "webp",
            "exportMode": "artboard",
            "fetch": { "timeoutSecs": 5 },
            "filters": { "tileSize": 512 },
            "fallbackFonts": { "monospace": "Menlo" }
        }"#,
    )
    .unwrap();
    assert_eq!(c.threads, Some(3));
    assert_eq!(c.fetch.timeout_secs, 5);
    assert_eq!(c.fetch.max_bytes, FetchConfig::default().max_bytes);
    assert_eq!(c.filters.max_texture_size, 4096);
    assert_eq!(c.fallback_fonts.monospace, "Menlo");
    assert_eq!(c.fallback_fonts.serif, "Times New Roman");

    let opts = c.render_options();
    assert_eq!(opts.mode, ExportMode::Artboard);
    assert_eq!(opts.format, ExportFormat::Webp);
    assert_eq!(opts.filters.tile_size(), 512);
}

#[test]
fn malformed_documents_are_serde_errors() {
    let err = BatchConfig::from_json_str(r#"{ "format": "gif" }"#).unwrap_err();
    assert!(err.to_string().starts_with("serialization error:"));
    assert!(BatchConfig::from_path("/definitely/not/here.json").is_err());
}
