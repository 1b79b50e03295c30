//! Questionnaire definition model and normalization
//!
//! Instruments arrive in two schema families:
//!
//! - **Keyed**: `questions` is an object of item id → item
//!   (`rewritten_zh`/`origin_zh`/`origin_en`, optional `options`)
//! - **Listed**: `items` is an array of `{id|qid|key, text, ...}`
//!
//! Both normalize to [`QuestionnaireDef`]. A numeric scale (`range` or
//! `response_scale`) applies to items without explicit options.

use crate::error::{QuestionnaireError, QuestionnaireResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

type Object = Map<String, Value>;

/// Default scale lower bound
pub const DEFAULT_SCALE_MIN: i64 = 1;

/// Default scale upper bound
pub const DEFAULT_SCALE_MAX: i64 = 7;

/// One questionnaire item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionItem {
    /// Item id, the answer key
    pub id: String,
    /// Prompt text
    pub text: String,
    /// Explicit options: option value → localized label metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Object>,
    /// Scale labels, one per scale point when they line up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl QuestionItem {
    /// Create item without options or labels
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            options: None,
            labels: None,
        }
    }
}

/// Normalized questionnaire definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireDef {
    /// Answer-set key
    pub key: String,
    /// Display title
    pub title: String,
    /// Instructions shown above the items
    pub instructions: String,
    /// Lowest scale point
    pub scale_min: i64,
    /// Highest scale point
    pub scale_max: i64,
    /// Items in document order
    pub items: Vec<QuestionItem>,
}

impl QuestionnaireDef {
    /// Create definition with the default 1..=7 scale
    #[must_use]
    pub fn new(key: impl Into<String>, items: Vec<QuestionItem>) -> Self {
        let key = key.into();
        Self {
            title: key.clone(),
            key,
            instructions: String::new(),
            scale_min: DEFAULT_SCALE_MIN,
            scale_max: DEFAULT_SCALE_MAX,
            items,
        }
    }

    /// With scale bounds
    #[inline]
    #[must_use]
    pub fn with_scale(mut self, min: i64, max: i64) -> Self {
        self.scale_min = min;
        self.scale_max = max;
        self
    }

    /// Number of items
    #[inline]
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Look up an item by id
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&QuestionItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Item layout detected in a raw definition
#[derive(Debug, Clone, Copy)]
pub enum DefinitionShape<'a> {
    /// `questions` object keyed by item id
    Keyed(&'a Object),
    /// `items` array
    Listed(&'a [Value]),
    /// Neither layout present
    Bare,
}

impl<'a> DefinitionShape<'a> {
    /// Detect item layout; `questions` wins over `items`
    #[must_use]
    pub fn detect(raw: &'a Object) -> Self {
        if let Some(questions) = raw.get("questions").and_then(Value::as_object) {
            Self::Keyed(questions)
        } else if let Some(items) = raw.get("items").and_then(Value::as_array) {
            Self::Listed(items)
        } else {
            Self::Bare
        }
    }

    fn items(&self, labels: Option<&Vec<String>>) -> Vec<QuestionItem> {
        match self {
            Self::Keyed(questions) => keyed_items(questions, labels),
            Self::Listed(items) => listed_items(items, labels),
            Self::Bare => Vec::new(),
        }
    }
}

fn keyed_items(questions: &Object, labels: Option<&Vec<String>>) -> Vec<QuestionItem> {
    questions
        .iter()
        .map(|(qid, item)| QuestionItem {
            id: qid.clone(),
            text: first_text(item, &["rewritten_zh", "origin_zh", "origin_en"]).unwrap_or_default(),
            options: item.get("options").and_then(Value::as_object).cloned(),
            labels: labels.cloned(),
        })
        .collect()
}

fn listed_items(items: &[Value], labels: Option<&Vec<String>>) -> Vec<QuestionItem> {
    items
        .iter()
        .map(|item| QuestionItem {
            id: first_text(item, &["id", "qid", "key"]).unwrap_or_default(),
            text: first_text(item, &["text", "origin_zh", "origin_en"]).unwrap_or_default(),
            options: None,
            labels: labels.cloned(),
        })
        .collect()
}

/// Parse a definition resource
///
/// # Errors
/// Returns [`QuestionnaireError::Malformed`] if the text is not a JSON object.
pub fn parse_definition(file_name: &str, text: &str) -> QuestionnaireResult<QuestionnaireDef> {
    let raw: Value = serde_json::from_str(text)
        .map_err(|e| QuestionnaireError::malformed(file_name, e.to_string()))?;
    normalize_definition(file_name, &raw)
}

/// Normalize a raw definition value
///
/// # Errors
/// Returns [`QuestionnaireError::Malformed`] if `raw` is not a JSON object.
pub fn normalize_definition(file_name: &str, raw: &Value) -> QuestionnaireResult<QuestionnaireDef> {
    let obj = raw
        .as_object()
        .ok_or_else(|| QuestionnaireError::malformed(file_name, "expected a JSON object"))?;

    let stem = file_stem(file_name);
    let key = first_text(raw, &["name", "id", "title", "full_name"]).unwrap_or(stem);
    let title = first_text(raw, &["full_name", "title", "name"]).unwrap_or_else(|| key.clone());
    let instructions = first_text(
        raw,
        &[
            "psychobench_prompt_choice_instruction",
            "instructions",
            "psychobench_prompt",
        ],
    )
    .unwrap_or_default();

    let response_scale = obj.get("response_scale").and_then(Value::as_object);
    let (scale_min, scale_max) = scale_bounds(obj, response_scale);
    let labels = response_scale
        .and_then(|scale| scale.get("labels"))
        .and_then(Value::as_array)
        .map(|labels| labels.iter().map(display_text).collect::<Vec<_>>());

    let items = DefinitionShape::detect(obj).items(labels.as_ref());

    tracing::debug!(key = %key, items = items.len(), "normalized questionnaire definition");

    Ok(QuestionnaireDef {
        key,
        title,
        instructions,
        scale_min,
        scale_max,
        items,
    })
}

fn scale_bounds(raw: &Object, response_scale: Option<&Object>) -> (i64, i64) {
    if let Some([min, max]) = raw.get("range").and_then(Value::as_array).map(Vec::as_slice) {
        if let (Some(min), Some(max)) = (scale_point(min), scale_point(max)) {
            return (min, max);
        }
    }

    if let Some(scale) = response_scale {
        let min = scale.get("min").and_then(scale_point).unwrap_or(DEFAULT_SCALE_MIN);
        let max = scale.get("max").and_then(scale_point).unwrap_or(DEFAULT_SCALE_MAX);
        return (min, max);
    }

    (DEFAULT_SCALE_MIN, DEFAULT_SCALE_MAX)
}

fn scale_point(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First non-empty scalar among `keys`, rendered as text
fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter(|v| is_truthy(v))
        .map(display_text)
        .next()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn file_stem(file_name: &str) -> String {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".json") {
        file_name[..file_name.len() - ".json".len()].to_string()
    } else {
        file_name.to_string()
    }
}
