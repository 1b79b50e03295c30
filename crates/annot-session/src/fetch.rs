//! Resource fetching for datasets and questionnaire definitions
//!
//! A location is either an http(s) URL or a local path. Fetches are single
//! attempts: no retries, no timeouts beyond the client defaults.

use crate::error::{FetchError, FetchResult};
use annot_dataset::is_http_url;
use std::path::{Path, PathBuf};

/// Fetches the text behind a location
#[async_trait::async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the full text at `location`
    async fn fetch_text(&self, location: &str) -> FetchResult<String>;

    /// Fetch text, mapping an unavailable resource to `None`
    async fn fetch_optional(&self, location: &str) -> FetchResult<Option<String>> {
        match self.fetch_text(location).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.is_unavailable() => {
                tracing::debug!(location, error = %e, "resource unavailable");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// HTTP(S) fetcher
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher reusing an existing client
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch_text(&self, location: &str) -> FetchResult<String> {
        let transport = |source| FetchError::Transport {
            location: location.to_string(),
            source,
        };

        let response = self.client.get(location).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(transport)
    }
}

/// Local filesystem fetcher; relative locations resolve against `root`
#[derive(Debug, Clone, Default)]
pub struct FsFetcher {
    root: Option<PathBuf>,
}

impl FsFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher resolving relative paths under `root`
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl ResourceFetcher for FsFetcher {
    async fn fetch_text(&self, location: &str) -> FetchResult<String> {
        let path = self.resolve(location);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io { path, source })
    }
}

/// Routes URLs to HTTP and everything else to the filesystem
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher {
    http: HttpFetcher,
    fs: FsFetcher,
}

impl DefaultFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With filesystem root for relative paths
    #[inline]
    #[must_use]
    pub fn with_fs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.fs = FsFetcher::with_root(root);
        self
    }
}

#[async_trait::async_trait]
impl ResourceFetcher for DefaultFetcher {
    async fn fetch_text(&self, location: &str) -> FetchResult<String> {
        if is_http_url(location) {
            self.http.fetch_text(location).await
        } else {
            self.fs.fetch_text(location).await
        }
    }
}

/// Label recorded as the dataset source
///
/// URLs are kept as is; local files become `file:<name>`.
#[must_use]
pub fn source_label(location: &str) -> String {
    if is_http_url(location) {
        return location.to_string();
    }
    let name = Path::new(location)
        .file_name()
        .map_or_else(|| location.into(), |name| name.to_string_lossy());
    format!("file:{name}")
}

/// Join a questionnaire base (URL or directory) with a resource name
#[must_use]
pub fn join_location(base: &str, name: &str) -> String {
    if is_http_url(base) {
        format!("{}/{name}", base.trim_end_matches('/'))
    } else {
        Path::new(base).join(name).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(
            source_label("https://data.example/tasks.jsonl"),
            "https://data.example/tasks.jsonl"
        );
        assert_eq!(source_label("./data/tasks.jsonl"), "file:tasks.jsonl");
        assert_eq!(source_label("tasks.json"), "file:tasks.json");
    }

    #[test]
    fn joins() {
        assert_eq!(
            join_location("https://site.example/questionnaires/", "BFI.json"),
            "https://site.example/questionnaires/BFI.json"
        );
        assert_eq!(
            join_location("questionnaires", "BFI.json"),
            Path::new("questionnaires").join("BFI.json").to_string_lossy()
        );
    }

    #[tokio::test]
    async fn fs_fetcher_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tasks.json"), "[]").unwrap();

        let fetcher = FsFetcher::with_root(dir.path());
        assert_eq!(fetcher.fetch_text("tasks.json").await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn missing_file_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = DefaultFetcher::new().with_fs_root(dir.path());

        assert!(fetcher.fetch_optional("BFI.json").await.unwrap().is_none());
        let err = fetcher.fetch_text("BFI.json").await.unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let fetcher = HttpFetcher::new();
        let err = fetcher
            .fetch_optional("http://127.0.0.1:9/tasks.json")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
