//! Annot Dataset
//!
//! Ingests extraction datasets exported by several generations of the
//! upstream pipeline and projects every record into one canonical [`Task`].
//!
//! # Core Concepts
//!
//! - [`parse_json_or_jsonl`]: raw text → JSON value (array, object or JSONL)
//! - [`RecordShape`]: per-record schema family detected at parse time
//! - [`normalize_tasks`]: JSON value → ordered, de-duplicated tasks
//! - [`resolve_media_url`]: local crawler paths → servable URLs
//!
//! # Example
//!
//! ```rust,ignore
//! use annot_dataset::load_tasks;
//!
//! let tasks = load_tasks(r#"[{"post_id":"p1","content":"hello"}]"#)?;
//! assert_eq!(tasks[0].post_id, "p1");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod media;
mod parse;
mod record;
mod task;

pub use error::{DatasetError, DatasetResult};
pub use media::{is_http_url, resolve_media_url, MediaResolveConfig};
pub use parse::parse_json_or_jsonl;
pub use record::{normalize_tasks, FlatRecord, PipelineRecord, RecordShape};
pub use task::{MediaRefs, Task};

/// Parse and normalize dataset text in one step
///
/// # Errors
/// - [`DatasetError::MalformedInput`] if the text is not JSON/JSONL
/// - [`DatasetError::EmptyDataset`] if no record has a usable post id
pub fn load_tasks(text: &str) -> DatasetResult<Vec<Task>> {
    let raw = parse_json_or_jsonl(text)?;
    let tasks = normalize_tasks(&raw);
    if tasks.is_empty() {
        return Err(DatasetError::EmptyDataset);
    }
    tracing::debug!("normalized {} tasks", tasks.len());
    Ok(tasks)
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_simple_array() {
        let tasks =
            load_tasks(r#"[{"post_id":"p1","content":"hello"},{"id":"p2","content":"world"}]"#)
                .unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].post_id, "p1");
        assert_eq!(tasks[1].post_id, "p2");
        for task in &tasks {
            assert_eq!(task.extraction, json!({}));
            assert!(task.media.images.is_empty());
            assert!(task.media.videos.is_empty());
        }
    }

    #[test]
    fn zero_usable_records_is_empty_dataset() {
        assert_eq!(
            load_tasks(r#"[{"content":"no id"}]"#).unwrap_err(),
            DatasetError::EmptyDataset
        );
        assert_eq!(load_tasks("").unwrap_err(), DatasetError::EmptyDataset);
    }

    #[test]
    fn parse_failure_is_malformed() {
        assert!(load_tasks("{\"id\":\"a\"},\n").unwrap_err().is_malformed());
    }
}
