use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::assets::fetch::MemoryFetcher;
use crate::foundation::error::BatchboardResult;

struct Counting {
    inner: MemoryFetcher,
    calls: AtomicUsize,
}

impl AssetFetcher for Counting {
    fn fetch(&self, url: &str) -> BatchboardResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(url)
    }
}

fn fake_ttf() -> Vec<u8> {
    let mut v = vec![0x00, 0x01, 0x00, 0x00];
    v.extend_from_slice(b"glyph tables");
    v
}

#[test]
fn fallback_family_is_chosen_by_substring() {
    let f = FallbackFonts::default();
    assert_eq!(f.for_family("Noto Serif Display"), "Times New Roman");
    assert_eq!(f.for_family("JetBrains Mono"), "Courier New");
    assert_eq!(f.for_family("Poppins"), "Arial");
}

#[test]
fn failed_download_resolves_to_the_fallback() {
    let cache = FontCache::default();
    let entry = cache.resolve("Fancy Serif", Some("https://fonts/missing.ttf"), &MemoryFetcher::new());
    assert!(entry.fallback);
    assert_eq!(entry.family, "Times New Roman");
    assert!(entry.data.is_none());
}

#[test]
fn non_font_payloads_fall_back() {
    let fetcher = MemoryFetcher::new().with("https://fonts/page.html", b"<html>".to_vec());
    let entry = FontCache::default().resolve("Roboto Mono", Some("https://fonts/page.html"), &fetcher);
    assert!(entry.fallback);
    assert_eq!(entry.family, "Courier New");
}

#[test]
fn downloads_once_per_key() {
    let fetcher = Counting {
        inner: MemoryFetcher::new().with("https://fonts/a.ttf", fake_ttf()),
        calls: AtomicUsize::new(0),
    };
    let cache = FontCache::default();
    let a = cache.resolve("Brand", Some("https://fonts/a.ttf"), &fetcher);
    let b = cache.resolve("Brand", Some("https://fonts/a.ttf"), &fetcher);
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&a, &b));
    assert!(!a.fallback);
    assert_eq!(a.family, "Brand");
    assert_eq!(a.content_id, xxh3_64(&fake_ttf()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn missing_url_means_system_family() {
    let cache = FontCache::default();
    let entry = cache.resolve("Arial", None, &MemoryFetcher::new());
    assert_eq!(*entry, FontEntry::system("Arial"));
    assert!(cache.is_empty());
}
