//! Media path resolution
//!
//! Datasets reference media either by URL or by the local path the crawler
//! wrote (`/data/crawl/weibo/...`, `./weibo/...`). Local paths are rebased
//! onto a configured media host; anything unresolvable yields `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HTTP_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://").expect("valid regex"));

const WEIBO_SEGMENT: &str = "weibo/";

/// Where local media paths are served from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaResolveConfig {
    /// Base URL that serves the media tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_base_url: Option<String>,
    /// Local path prefix to strip before joining with the base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_weibo_prefix: Option<String>,
}

impl MediaResolveConfig {
    /// Create config with a base URL
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            media_base_url: Some(base_url.into()),
            local_weibo_prefix: None,
        }
    }

    /// With local prefix
    #[inline]
    #[must_use]
    pub fn with_local_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.local_weibo_prefix = Some(prefix.into());
        self
    }

    /// Fill unset fields from `fallback`
    #[must_use]
    pub fn or(self, fallback: &Self) -> Self {
        Self {
            media_base_url: self
                .media_base_url
                .or_else(|| fallback.media_base_url.clone()),
            local_weibo_prefix: self
                .local_weibo_prefix
                .or_else(|| fallback.local_weibo_prefix.clone()),
        }
    }
}

/// Check whether a string is an http(s) URL
#[inline]
#[must_use]
pub fn is_http_url(s: &str) -> bool {
    HTTP_URL.is_match(s)
}

/// Resolve a media path into an http(s) URL
///
/// Supported inputs:
/// - http(s) URLs, returned as is
/// - absolute local paths under `local_weibo_prefix`
/// - relative `weibo/...` or `./weibo/...` paths
#[must_use]
pub fn resolve_media_url(media_path: &str, cfg: &MediaResolveConfig) -> Option<String> {
    let raw = media_path.trim();
    if raw.is_empty() {
        return None;
    }
    if is_http_url(raw) {
        return Some(raw.to_string());
    }

    let base = cfg.media_base_url.as_deref().map(str::trim).unwrap_or_default();
    if base.is_empty() {
        return None;
    }

    let prefix = cfg
        .local_weibo_prefix
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();

    let rel = if !prefix.is_empty() && raw.starts_with(prefix) {
        &raw[prefix.len()..]
    } else {
        let normalized = raw.strip_prefix("./").unwrap_or(raw);
        if !normalized.starts_with(WEIBO_SEGMENT) {
            return None;
        }
        normalized
    };

    let base = base.trim_end_matches('/');
    let mut rel = rel.trim_start_matches('/');

    // Base may already point at the weibo tree.
    if base.ends_with("/weibo") {
        rel = rel.strip_prefix(WEIBO_SEGMENT).unwrap_or(rel);
    }

    Some(format!("{base}/{rel}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> MediaResolveConfig {
        MediaResolveConfig::with_base_url("https://media.example.com/")
            .with_local_prefix("/data/crawl/")
    }

    #[test]
    fn http_urls_pass_through() {
        assert_eq!(
            resolve_media_url("HTTPS://cdn.example/x.jpg", &MediaResolveConfig::default()),
            Some("HTTPS://cdn.example/x.jpg".to_string())
        );
    }

    #[test]
    fn blank_path_is_none() {
        assert_eq!(resolve_media_url("   ", &cfg()), None);
    }

    #[test]
    fn local_path_needs_base_url() {
        assert_eq!(
            resolve_media_url("weibo/a.jpg", &MediaResolveConfig::default()),
            None
        );
    }

    #[test]
    fn strips_local_prefix() {
        assert_eq!(
            resolve_media_url("/data/crawl/weibo/123/a.jpg", &cfg()),
            Some("https://media.example.com/weibo/123/a.jpg".to_string())
        );
    }

    #[test]
    fn relative_weibo_paths() {
        assert_eq!(
            resolve_media_url("./weibo/1/b.png", &cfg()),
            Some("https://media.example.com/weibo/1/b.png".to_string())
        );
        assert_eq!(resolve_media_url("other/1/b.png", &cfg()), None);
    }

    #[test]
    fn avoids_duplicate_weibo_segment() {
        let cfg = MediaResolveConfig::with_base_url("https://media.example.com/weibo/");
        assert_eq!(
            resolve_media_url("weibo/1/c.mp4", &cfg),
            Some("https://media.example.com/weibo/1/c.mp4".to_string())
        );
    }

    #[test]
    fn config_fallback_fills_gaps() {
        let state_cfg = MediaResolveConfig {
            media_base_url: None,
            local_weibo_prefix: Some("/mnt/".to_string()),
        };
        let merged = state_cfg.or(&cfg());
        assert_eq!(merged.media_base_url.as_deref(), Some("https://media.example.com/"));
        assert_eq!(merged.local_weibo_prefix.as_deref(), Some("/mnt/"));
    }
}
