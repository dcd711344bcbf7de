use super::*;
use crate::render::export::ExportFormat;

fn image() -> RenderedImage {
    RenderedImage {
        width: 1,
        height: 1,
        format: ExportFormat::Png,
        bytes: vec![0xff],
    }
}

fn outcome() -> BatchOutcome {
    BatchOutcome::from_results(vec![Ok(image()), Err("asset error: gone"), Ok(image())])
}

#[test]
fn indices_are_one_based_and_positional() {
    let o = outcome();
    let ok: Vec<_> = o.successful.iter().map(|s| s.index).collect();
    assert_eq!(ok, [1, 3]);
    assert_eq!(o.failed, [RowFailure { index: 2, error: "asset error: gone".into() }]);
    assert_eq!(
        o.summary(),
        BatchSummary {
            total_rows: 3,
            successful_images: 2,
            failed_images: 1
        }
    );
}

#[test]
fn serializes_to_the_result_contract() {
    let v = serde_json::to_value(outcome()).unwrap();
    assert_eq!(v["successful"][0]["index"], 1);
    assert_eq!(v["successful"][0]["imageBuffer"], "data:image/png;base64,/w==");
    assert_eq!(v["failed"][0]["index"], 2);
    assert_eq!(v["failed"][0]["error"], "asset error: gone");
    let s = serde_json::to_value(outcome().summary()).unwrap();
    assert_eq!(s["totalRows"], 3);
    assert_eq!(s["failedImages"], 1);
}

#[test]
fn report_rows_add_the_generated_url_column() {
    let header = vec!["title".to_string()];
    let rows = vec![vec!["a".to_string()], vec!["b".to_string()], vec!["c".to_string()]];
    let links = BTreeMap::from([(1, "file:///out/image_1.png".to_string())]);
    let table = report_rows(&header, &rows, &outcome(), &links);

    assert_eq!(table[0], ["title", GENERATED_IMAGE_COLUMN]);
    assert_eq!(table[1], ["a", "file:///out/image_1.png"]);
    assert_eq!(table[2], ["b", NO_IMAGE]);
    // Rendered but never published.
    assert_eq!(table[3], ["c", NO_IMAGE]);
}
