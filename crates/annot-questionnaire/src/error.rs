//! Error types for questionnaire loading

use std::path::PathBuf;

/// Errors while loading questionnaire definitions
#[derive(Debug, thiserror::Error)]
pub enum QuestionnaireError {
    /// Resource exists but is not a usable definition
    #[error("malformed questionnaire {name}: {message}")]
    Malformed { name: String, message: String },

    /// IO error other than "not found"
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl QuestionnaireError {
    /// Create malformed-definition error
    pub fn malformed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for questionnaire operations
pub type QuestionnaireResult<T> = Result<T, QuestionnaireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_display() {
        let err = QuestionnaireError::malformed("BFI.json", "expected object");
        assert_eq!(
            err.to_string(),
            "malformed questionnaire BFI.json: expected object"
        );
    }
}
