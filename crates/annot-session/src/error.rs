//! Session error types

use crate::readiness::Requirement;
use annot_dataset::DatasetError;
use annot_questionnaire::QuestionnaireError;
use annot_state::{SnapshotError, StorageError};
use std::path::PathBuf;

/// Resource fetch errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Server answered with a non-success status
    #[error("fetch {location} failed: HTTP {status}")]
    Status { location: String, status: u16 },

    /// Request never completed
    #[error("fetch {location} failed: {source}")]
    Transport {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    /// Local file could not be read
    #[error("read {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Whether the server or filesystem reported the resource as unavailable
    ///
    /// Any non-success status counts; transport failures do not.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Status { .. } => true,
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            Self::Transport { .. } => false,
        }
    }
}

/// Errors surfaced by session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Questionnaire(#[from] QuestionnaireError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Edited payload is not valid JSON; nothing was saved
    #[error("payload is not valid JSON: {0}")]
    PayloadParse(String),

    /// Annotation attempted before the prerequisites are met
    #[error("not ready to annotate: {}", describe(.0))]
    NotReady(Vec<Requirement>),

    /// No dataset is loaded
    #[error("no task selected")]
    NoCurrentTask,
}

fn describe(missing: &[Requirement]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type alias for fetches
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_ready_lists_requirements() {
        let err = SessionError::NotReady(vec![Requirement::AnnotatorId, Requirement::Consent]);
        assert_eq!(
            err.to_string(),
            "not ready to annotate: annotator id missing, consent not given"
        );
    }

    #[test]
    fn dataset_errors_pass_through() {
        let err: SessionError = DatasetError::EmptyDataset.into();
        assert_eq!(err.to_string(), DatasetError::EmptyDataset.to_string());
    }

    #[test]
    fn unavailable_detection() {
        let status = FetchError::Status {
            location: "https://x/BFI.json".into(),
            status: 404,
        };
        assert!(status.is_unavailable());

        let missing = FetchError::Io {
            path: "/nope".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(missing.is_unavailable());

        let denied = FetchError::Io {
            path: "/secret".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!denied.is_unavailable());
    }
}
