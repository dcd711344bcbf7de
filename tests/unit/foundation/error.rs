use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BatchboardError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(BatchboardError::asset("x").to_string().contains("asset error:"));
    assert!(BatchboardError::render("x").to_string().contains("render error:"));
    assert!(
        BatchboardError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BatchboardError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: BatchboardError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, BatchboardError::Serde(_)));
}
