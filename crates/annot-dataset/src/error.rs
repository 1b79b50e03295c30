//! Error types for dataset ingestion
//!
//! Parse failures and "nothing usable" are kept apart so callers can show a
//! distinct message for each.

/// Errors while turning raw dataset text into tasks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    /// Text is neither valid JSON nor valid JSONL
    #[error("{}", malformed_message(.line, .message))]
    MalformedInput {
        /// 1-based line number for JSONL input, `None` for a single JSON value
        line: Option<usize>,
        /// Underlying parser message
        message: String,
    },

    /// Parsing succeeded but no record carried a usable post id
    #[error("no usable records (missing post_id/content)")]
    EmptyDataset,
}

impl DatasetError {
    /// Create malformed-input error for a single JSON document
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            line: None,
            message: message.into(),
        }
    }

    /// Create malformed-input error for one JSONL line
    pub fn malformed_line(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            line: Some(line),
            message: message.into(),
        }
    }

    /// Check if the failure happened while parsing
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }
}

fn malformed_message(line: &Option<usize>, message: &str) -> String {
    match line {
        Some(line) => format!("could not parse line {line} as JSON: {message}"),
        None => format!("could not parse input as JSON: {message}"),
    }
}

/// Result type alias for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
