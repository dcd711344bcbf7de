use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::assets::fetch::AssetFetcher;
use crate::template::layer::{LayerKind, Template};

/// Families substituted when a remote font cannot be used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FallbackFonts {
    /// Used for family names containing "serif".
    pub serif: String,
    /// Used for family names containing "mono".
    pub monospace: String,
    /// Used for everything else.
    pub sans_serif: String,
}

impl Default for FallbackFonts {
    fn default() -> Self {
        Self {
            serif: "Times New Roman".to_string(),
            monospace: "Courier New".to_string(),
            sans_serif: "Arial".to_string(),
        }
    }
}

impl FallbackFonts {
    /// Deterministic substitute for `family`.
    pub fn for_family(&self, family: &str) -> &str {
        let lower = family.to_ascii_lowercase();
        if lower.contains("serif") {
            &self.serif
        } else if lower.contains("mono") {
            &self.monospace
        } else {
            &self.sans_serif
        }
    }
}

/// Cache key: the family as authored plus the URL it is served from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontKey {
    /// Authored family name.
    pub family: String,
    /// Font file URL.
    pub url: String,
}

/// Resolved font for one key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontEntry {
    /// Family to request from the layout engine.
    pub family: String,
    /// Downloaded font file, absent for system families.
    pub data: Option<Arc<Vec<u8>>>,
    /// Content hash of `data`, used to register each file once per layout engine.
    pub content_id: u64,
    /// `true` when `family` is a substitute.
    pub fallback: bool,
}

impl FontEntry {
    /// A system family, no download involved.
    pub fn system(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            data: None,
            content_id: 0,
            fallback: false,
        }
    }
}

const FONT_MAGIC: [&[u8]; 4] = [&[0x00, 0x01, 0x00, 0x00], b"OTTO", b"true", b"ttcf"];

fn looks_like_font(bytes: &[u8]) -> bool {
    FONT_MAGIC.iter().any(|m| bytes.starts_with(m))
}

/// Process-wide font registry shared by every row of a batch.
///
/// Entries are written once and never replaced, so concurrent rows only ever observe a
/// complete entry for a key.
#[derive(Debug, Default)]
pub struct FontCache {
    entries: RwLock<HashMap<FontKey, Arc<FontEntry>>>,
    fallback: FallbackFonts,
}

impl FontCache {
    /// Empty cache using `fallback` for failed downloads.
    pub fn new(fallback: FallbackFonts) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            fallback,
        }
    }

    /// Substitution table used on failure.
    pub fn fallback(&self) -> &FallbackFonts {
        &self.fallback
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// `true` when nothing has been cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached entry for `(family, url)`.
    pub fn get(&self, family: &str, url: &str) -> Option<Arc<FontEntry>> {
        let key = FontKey {
            family: family.to_string(),
            url: url.to_string(),
        };
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Resolve the font for a text layer.
    ///
    /// Without a URL the family is used as a system family. A failed download or a payload
    /// that is not a font resolves to the fallback family; text always renders.
    pub fn resolve(&self, family: &str, url: Option<&str>, fetcher: &dyn AssetFetcher) -> Arc<FontEntry> {
        let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
            return Arc::new(FontEntry::system(family));
        };
        if let Some(hit) = self.get(family, url) {
            tracing::debug!(family, url, "font cache hit");
            return hit;
        }

        tracing::debug!(family, url, "font cache miss");
        let entry = match fetcher.fetch(url) {
            Ok(bytes) if looks_like_font(&bytes) => FontEntry {
                family: family.to_string(),
                content_id: xxh3_64(&bytes),
                data: Some(Arc::new(bytes)),
                fallback: false,
            },
            Ok(_) => {
                let substitute = self.fallback.for_family(family);
                tracing::warn!(family, url, substitute, "font payload is not a font file, using fallback");
                self.fallback_entry(family)
            }
            Err(err) => {
                let substitute = self.fallback.for_family(family);
                tracing::warn!(family, url, substitute, error = %err, "font loading failed, using fallback");
                self.fallback_entry(family)
            }
        };

        let key = FontKey {
            family: family.to_string(),
            url: url.to_string(),
        };
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.entry(key).or_insert_with(|| Arc::new(entry)).clone()
    }

    fn fallback_entry(&self, family: &str) -> FontEntry {
        FontEntry {
            fallback: true,
            ..FontEntry::system(self.fallback.for_family(family))
        }
    }

    /// Resolve every distinct `(family, url)` pair used by text layers of `template`.
    ///
    /// Returns the number of pairs visited.
    pub fn preload(&self, template: &Template, fetcher: &dyn AssetFetcher) -> usize {
        let mut seen = std::collections::HashSet::new();
        template.walk(&mut |layer| {
            if let LayerKind::Text(t) = &layer.kind
                && let Some(url) = t.font_url.as_deref()
            {
                seen.insert((t.font_family.clone(), url.to_string()));
            }
        });
        for (family, url) in &seen {
            self.resolve(family, Some(url), fetcher);
        }
        seen.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
