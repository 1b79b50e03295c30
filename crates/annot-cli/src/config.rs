//! `annot.toml` configuration
//!
//! Lookup order: `--config`, then `$ANNOT_CONFIG`, then `./annot.toml`.
//! A `--config` file must exist; a missing `$ANNOT_CONFIG` or
//! `./annot.toml` file means defaults.

use annot_dataset::MediaResolveConfig;
use annot_state::DEFAULT_DEBOUNCE_MS;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub(crate) const CONFIG_ENV: &str = "ANNOT_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "annot.toml";
const DEFAULT_LOG_FILTER: &str = "annot=info";

/// Config loading errors
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Where questionnaire definitions are read from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct QuestionnaireSection {
    pub(crate) dir: PathBuf,
    /// Wins over `dir` when set
    pub(crate) base_url: Option<String>,
}

impl Default for QuestionnaireSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("questionnaires"),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MediaSection {
    pub(crate) base_url: Option<String>,
    pub(crate) local_prefix: Option<String>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct AnnotConfig {
    pub(crate) data_dir: PathBuf,
    pub(crate) debounce_ms: i64,
    pub(crate) dataset: Option<String>,
    pub(crate) questionnaires: QuestionnaireSection,
    pub(crate) media: MediaSection,
    pub(crate) log_filter: Option<String>,
}

impl Default for AnnotConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".annot"),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            dataset: None,
            questionnaires: QuestionnaireSection::default(),
            media: MediaSection::default(),
            log_filter: None,
        }
    }
}

impl AnnotConfig {
    /// Load configuration from the first location that applies
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        Self::load_from(explicit, from_env.as_deref())
    }

    fn load_from(explicit: Option<&Path>, from_env: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        Self::from_implicit_file(from_env.unwrap_or(Path::new(DEFAULT_CONFIG_FILE)))
    }

    fn from_implicit_file(path: &Path) -> Result<Self, ConfigError> {
        match Self::from_file(path) {
            Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub(crate) fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub(crate) fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// With data directory
    #[inline]
    #[must_use]
    pub(crate) fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// With dataset location
    #[inline]
    #[must_use]
    pub(crate) fn with_dataset(mut self, location: impl Into<String>) -> Self {
        self.dataset = Some(location.into());
        self
    }

    /// Questionnaire base: URL if configured, else the directory
    pub(crate) fn questionnaire_base(&self) -> String {
        self.questionnaires
            .base_url
            .clone()
            .unwrap_or_else(|| self.questionnaires.dir.to_string_lossy().into_owned())
    }

    /// Media settings used when the state carries none
    pub(crate) fn media_defaults(&self) -> MediaResolveConfig {
        MediaResolveConfig {
            media_base_url: self.media.base_url.clone(),
            local_weibo_prefix: self.media.local_prefix.clone(),
        }
    }

    pub(crate) fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
