use super::*;

#[test]
fn base64_data_urls_decode() {
    let bytes = decode_data_url("data:text/plain;base64,aGVsbG8=").unwrap();
    assert_eq!(bytes, b"hello");
}

#[test]
fn url_safe_base64_is_accepted() {
    // 0xfb 0xff encodes to "-_8=" in the URL-safe alphabet.
    let bytes = decode_data_url("data:application/octet-stream;base64,-_8=").unwrap();
    assert_eq!(bytes, vec![0xfb, 0xff]);
}

#[test]
fn percent_encoded_payloads_decode() {
    let bytes = decode_data_url("data:image/svg+xml,%3Csvg%3E%3C/svg%3E").unwrap();
    assert_eq!(bytes, b"<svg></svg>");
    assert!(decode_data_url("data:text/plain,%zz").is_err());
    assert!(decode_data_url("data:text/plain").is_err());
    assert!(decode_data_url("http://x").is_err());
}

#[test]
fn memory_fetcher_serves_registered_and_embedded_assets() {
    let f = MemoryFetcher::new().with("https://cdn/a.png", vec![1u8, 2, 3]);
    assert_eq!(f.fetch("https://cdn/a.png").unwrap(), vec![1, 2, 3]);
    assert_eq!(f.fetch("<svg/>").unwrap(), b"<svg/>".to_vec());
    assert_eq!(f.fetch("data:,abc").unwrap(), b"abc".to_vec());

    let err = f.fetch("https://cdn/missing.png").unwrap_err();
    assert!(matches!(err, BatchboardError::Asset(_)));
}

#[test]
fn fetchers_compose_through_references() {
    fn via<F: AssetFetcher>(f: F) -> Vec<u8> {
        f.fetch("k").unwrap()
    }
    let f = MemoryFetcher::new().with("k", b"v".to_vec());
    assert_eq!(via(&f), b"v");
    assert_eq!(via(std::sync::Arc::new(f)), b"v");
}

#[test]
fn inline_svg_detection_ignores_leading_whitespace() {
    assert!(is_inline_svg("  <svg/>"));
    assert!(!is_inline_svg("https://x/a.svg"));
}

#[test]
fn default_limits() {
    let c = FetchConfig::default();
    assert_eq!(c.timeout_secs, 30);
    assert_eq!(c.max_bytes, 64 * 1024 * 1024);
    assert!(c.user_agent.starts_with("batchboard/"));
}
