use super::*;
use crate::assets::fetch::MemoryFetcher;

fn table(rows: &[&[&str]]) -> DataTable {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect();
    DataTable::from_rows(rows).unwrap()
}

fn def() -> TemplateDef {
    TemplateDef::from_json_str(
        r##"{
            "frame": { "width": 20, "height": 20 },
            "layers": [
                { "id": "Main Artboard", "type": "Artboard", "width": 20, "height": 20, "fill": "#fff" },
                { "id": "img", "name": "image_link", "type": "StaticImage", "src": "",
                  "width": 20, "height": 20 }
            ]
        }"##,
    )
    .unwrap()
}

#[test]
fn zero_threads_is_a_batch_error() {
    assert!(matches!(build_thread_pool(Some(0)), Err(BatchboardError::Validation(_))));
    assert!(build_thread_pool(Some(2)).is_ok());
}

#[test]
fn malformed_templates_fail_before_any_row() {
    let pipeline = BatchPipeline::new(&BatchConfig::default(), Arc::new(MemoryFetcher::new()));
    let empty = TemplateDef::from_json_str(r#"{ "frame": { "width": 10, "height": 10 }, "layers": [] }"#).unwrap();
    let err = pipeline.run(&empty, &table(&[&["a"], &["1"]])).unwrap_err();
    assert!(matches!(err, BatchboardError::Validation(_)));
}

#[test]
fn a_missing_bound_image_fails_only_its_row() {
    let config = BatchConfig {
        threads: Some(2),
        ..BatchConfig::default()
    };
    let pipeline = BatchPipeline::new(&config, Arc::new(MemoryFetcher::new()));
    let outcome = pipeline
        .run(&def(), &table(&[&["image_link"], &["mem://missing.png"], &["mem://also-missing.png"]]))
        .unwrap();
    assert!(outcome.successful.is_empty());
    let failed: Vec<_> = outcome.failed.iter().map(|f| f.index).collect();
    assert_eq!(failed, [1, 2]);
    assert!(outcome.failed[0].error.contains("mem://missing.png"));
}

#[test]
fn empty_tables_produce_empty_outcomes() {
    let pipeline = BatchPipeline::new(&BatchConfig::default(), Arc::new(MemoryFetcher::new()));
    let outcome = pipeline.run(&def(), &table(&[&["image_link"]])).unwrap();
    assert_eq!(outcome, BatchOutcome::default());
}

#[test]
fn preview_renders_template_defaults() {
    let pipeline = BatchPipeline::new(&BatchConfig::default(), Arc::new(MemoryFetcher::new()));
    // The unbound image has no source and is dropped, the artboard still renders.
    let image = pipeline.preview(&def()).unwrap();
    assert_eq!((image.width, image.height), (20, 20));
}
