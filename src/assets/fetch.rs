use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::foundation::error::{BatchboardError, BatchboardResult};

/// Resolves an asset reference to raw bytes.
///
/// Implementations must be shareable across render workers.
pub trait AssetFetcher: Send + Sync {
    /// Fetch the bytes behind `url`.
    fn fetch(&self, url: &str) -> BatchboardResult<Vec<u8>>;
}

impl<T: AssetFetcher + ?Sized> AssetFetcher for &T {
    fn fetch(&self, url: &str) -> BatchboardResult<Vec<u8>> {
        (**self).fetch(url)
    }
}

impl<T: AssetFetcher + ?Sized> AssetFetcher for std::sync::Arc<T> {
    fn fetch(&self, url: &str) -> BatchboardResult<Vec<u8>> {
        (**self).fetch(url)
    }
}

/// HTTP client settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    /// Whole-request timeout.
    pub timeout_secs: u64,
    /// Largest accepted response body.
    pub max_bytes: u64,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_bytes: 64 * 1024 * 1024,
            user_agent: concat!("batchboard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Embedded payloads that never need a network round trip.
///
/// Returns `Ok(None)` when `url` is an ordinary reference.
pub fn embedded_bytes(url: &str) -> BatchboardResult<Option<Vec<u8>>> {
    let s = url.trim();
    if s.starts_with("data:") {
        return decode_data_url(s)
            .map(Some)
            .map_err(|e| BatchboardError::asset(format!("{e:#}")));
    }
    if is_inline_svg(s) {
        return Ok(Some(s.as_bytes().to_vec()));
    }
    Ok(None)
}

/// `true` for markup passed in place of a URL.
pub fn is_inline_svg(s: &str) -> bool {
    s.trim_start().starts_with('<')
}

/// Blocking HTTP(S) fetcher backed by `ureq`.
pub struct HttpFetcher {
    agent: ureq::Agent,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Build a fetcher with the given limits.
    pub fn new(config: FetchConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs.max(1))))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent, config }
    }

    fn get(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let mut resp = self
            .agent
            .get(url)
            .header("User-Agent", self.config.user_agent.as_str())
            .call()
            .with_context(|| format!("request to {url} failed"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("{url} answered HTTP {}", status.as_u16());
        }
        resp.body_mut()
            .with_config()
            .limit(self.config.max_bytes)
            .read_to_vec()
            .with_context(|| format!("reading body of {url}"))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> BatchboardResult<Vec<u8>> {
        if let Some(bytes) = embedded_bytes(url)? {
            return Ok(bytes);
        }
        if url.trim().is_empty() {
            return Err(BatchboardError::asset("empty asset url"));
        }
        tracing::debug!(url, "fetching asset");
        self.get(url.trim())
            .map_err(|e| BatchboardError::asset(format!("{e:#}")))
    }
}

/// In-memory `url -> bytes` map.
#[derive(Clone, Debug, Default)]
pub struct MemoryFetcher {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `url`.
    pub fn insert(&mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(url.into(), bytes.into());
    }

    /// Builder-style [`MemoryFetcher::insert`].
    pub fn with(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, bytes);
        self
    }
}

impl AssetFetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> BatchboardResult<Vec<u8>> {
        if let Some(bytes) = embedded_bytes(url)? {
            return Ok(bytes);
        }
        self.entries
            .get(url.trim())
            .cloned()
            .ok_or_else(|| BatchboardError::asset(format!("{url} is not available")))
    }
}

fn percent_decode(s: &str) -> anyhow::Result<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let hex = |b: u8| (b as char).to_digit(16).map(|d| d as u8);
        let (Some(hi), Some(lo)) = (
            bytes.get(i + 1).copied().and_then(hex),
            bytes.get(i + 2).copied().and_then(hex),
        ) else {
            bail!("invalid percent-encoding at byte {i}");
        };
        out.push((hi << 4) | lo);
        i += 3;
    }
    Ok(out)
}

/// Decode a `data:` URL (base64 or percent-encoded payload).
pub fn decode_data_url(data_url: &str) -> anyhow::Result<Vec<u8>> {
    let rest = data_url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("not a data URL"))?;
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("invalid data URL: missing comma"))?;

    let is_base64 = meta
        .split(';')
        .any(|t| t.trim().eq_ignore_ascii_case("base64"));
    if is_base64 {
        general_purpose::STANDARD
            .decode(data.trim())
            .or_else(|_| general_purpose::URL_SAFE.decode(data.trim()))
            .context("invalid base64 in data URL")
    } else {
        percent_decode(data)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
