//! Canonical task shape
//!
//! Every dataset record, whatever pipeline version produced it, ends up as a
//! [`Task`]. Tasks are rebuilt on every load and never mutated.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Media referenced by a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRefs {
    /// Image paths or URLs
    pub images: Vec<String>,
    /// Video paths or URLs
    pub videos: Vec<String>,
}

impl MediaRefs {
    /// Check whether the task references any media at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.videos.is_empty()
    }
}

/// One normalized unit of annotation work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identifier; non-empty and unique within a loaded dataset
    pub post_id: String,
    /// Post text shown to the annotator
    pub content: String,
    /// Link back to the source article
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Opaque extraction payload, never schema-checked
    pub extraction: Value,
    /// Media attached to the post
    pub media: MediaRefs,
}

impl Task {
    /// Create a task with empty extraction and no media
    #[must_use]
    pub fn new(post_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            content: content.into(),
            source_url: None,
            extraction: Value::Object(serde_json::Map::new()),
            media: MediaRefs::default(),
        }
    }

    /// With extraction payload
    #[inline]
    #[must_use]
    pub fn with_extraction(mut self, extraction: Value) -> Self {
        self.extraction = extraction;
        self
    }

    /// With source URL
    #[inline]
    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// With media references
    #[inline]
    #[must_use]
    pub fn with_media(mut self, media: MediaRefs) -> Self {
        self.media = media;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_task_defaults() {
        let task = Task::new("p1", "hello");
        assert_eq!(task.post_id, "p1");
        assert_eq!(task.extraction, json!({}));
        assert!(task.media.is_empty());
        assert!(task.source_url.is_none());
    }

    #[test]
    fn task_serializes_camel_case() {
        let task = Task::new("p1", "hello").with_source_url("https://a.example/1");
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["postId"], "p1");
        assert_eq!(value["sourceUrl"], "https://a.example/1");
    }
}
