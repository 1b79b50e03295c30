//! Record shape detection and normalization
//!
//! Upstream pipelines emitted two families of record:
//!
//! - **Pipeline** records nest their fields under `meta`, `input` and
//!   `result` (`meta.post_id`, `input.content`, `result.extraction`,
//!   `result.media_used.images`).
//! - **Flat** records keep everything at the top level (`post_id`/`id`,
//!   `content`, `extraction`, `images`).
//!
//! A record is classified once, then normalized by the function for its
//! family. Pipeline records still fall back to flat fields, since partially
//! migrated exports mix both.

use crate::task::{MediaRefs, Task};
use serde_json::{Map, Value};
use std::collections::HashSet;

type Object = Map<String, Value>;

/// A dataset record classified by schema family
#[derive(Debug, Clone, Copy)]
pub enum RecordShape<'a> {
    /// Nested `meta`/`input`/`result` record
    Pipeline(PipelineRecord<'a>),
    /// Top-level fields only
    Flat(FlatRecord<'a>),
}

/// Flat record view
#[derive(Debug, Clone, Copy)]
pub struct FlatRecord<'a> {
    fields: &'a Object,
}

/// Nested record view
#[derive(Debug, Clone, Copy)]
pub struct PipelineRecord<'a> {
    meta: Option<&'a Object>,
    input: Option<&'a Object>,
    result: Option<&'a Object>,
    flat: FlatRecord<'a>,
}

impl<'a> RecordShape<'a> {
    /// Classify a record object
    #[must_use]
    pub fn detect(fields: &'a Object) -> Self {
        let section = |key: &str| fields.get(key).and_then(Value::as_object);
        let (meta, input, result) = (section("meta"), section("input"), section("result"));
        let flat = FlatRecord { fields };

        if meta.is_some() || input.is_some() || result.is_some() {
            Self::Pipeline(PipelineRecord {
                meta,
                input,
                result,
                flat,
            })
        } else {
            Self::Flat(flat)
        }
    }

    /// Normalize into a task; `None` if no post id can be resolved
    #[must_use]
    pub fn normalize(&self) -> Option<Task> {
        match self {
            Self::Pipeline(record) => record.normalize(),
            Self::Flat(record) => record.normalize(),
        }
    }

    /// Schema family name, for logging
    #[must_use]
    pub fn family(&self) -> &'static str {
        match self {
            Self::Pipeline(_) => "pipeline",
            Self::Flat(_) => "flat",
        }
    }
}

impl<'a> FlatRecord<'a> {
    fn post_id(&self) -> Option<String> {
        id_text(self.fields.get("post_id")).or_else(|| id_text(self.fields.get("id")))
    }

    fn content(&self) -> Option<&'a str> {
        non_empty_str(self.fields.get("content"))
    }

    fn source_url(&self) -> Option<&'a str> {
        non_empty_str(self.fields.get("article_url"))
            .or_else(|| non_empty_str(self.fields.get("articleUrl")))
    }

    fn extraction(&self) -> Option<&'a Value> {
        present(self.fields.get("extraction"))
    }

    fn media_list(&self, key: &str) -> Option<&'a Value> {
        present(self.fields.get(key))
    }

    fn normalize(&self) -> Option<Task> {
        let post_id = self.post_id()?;
        Some(build_task(
            post_id,
            self.content(),
            self.source_url(),
            self.extraction(),
            self.media_list("images"),
            self.media_list("videos"),
        ))
    }
}

impl<'a> PipelineRecord<'a> {
    fn media_used(&self) -> Option<&'a Object> {
        self.result
            .and_then(|r| r.get("media_used"))
            .and_then(Value::as_object)
    }

    fn normalize(&self) -> Option<Task> {
        let post_id = id_text(self.meta.and_then(|m| m.get("post_id")))
            .or_else(|| self.flat.post_id())?;

        let input_str = |key: &str| non_empty_str(self.input.and_then(|i| i.get(key)));

        let content = input_str("content").or_else(|| self.flat.content());
        let source_url = input_str("article_url")
            .or_else(|| input_str("articleUrl"))
            .or_else(|| self.flat.source_url());
        let extraction = present(self.result.and_then(|r| r.get("extraction")))
            .or_else(|| self.flat.extraction());
        let images = present(self.media_used().and_then(|m| m.get("images")))
            .or_else(|| self.flat.media_list("images"));
        let videos = present(self.media_used().and_then(|m| m.get("videos")))
            .or_else(|| self.flat.media_list("videos"));

        Some(build_task(
            post_id, content, source_url, extraction, images, videos,
        ))
    }
}

fn build_task(
    post_id: String,
    content: Option<&str>,
    source_url: Option<&str>,
    extraction: Option<&Value>,
    images: Option<&Value>,
    videos: Option<&Value>,
) -> Task {
    Task {
        post_id,
        content: content.unwrap_or_default().to_string(),
        source_url: source_url.map(str::to_string),
        extraction: extraction
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())),
        media: MediaRefs {
            images: string_entries(images),
            videos: string_entries(videos),
        },
    }
}

/// Map parsed dataset JSON to tasks
///
/// A single object is treated as a one-element list. Non-object elements and
/// records without a post id are skipped; later duplicates of a post id are
/// dropped so ids stay unique. Input order is preserved.
#[must_use]
pub fn normalize_tasks(raw: &Value) -> Vec<Task> {
    let records: &[Value] = match raw {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    };

    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let Some(fields) = record.as_object() else {
            tracing::debug!(index = idx, "skipping non-object record");
            continue;
        };

        let shape = RecordShape::detect(fields);
        let Some(task) = shape.normalize() else {
            tracing::debug!(index = idx, family = shape.family(), "dropping record without post id");
            continue;
        };

        if !seen.insert(task.post_id.clone()) {
            tracing::debug!(index = idx, post_id = %task.post_id, "dropping duplicate post id");
            continue;
        }

        tasks.push(task);
    }

    tasks
}

/// Treat JSON `null` as absent
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Identifier text: non-empty string or integral number
fn id_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

fn string_entries(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
