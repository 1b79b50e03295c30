//! Persisted state model
//!
//! [`UserState`] is the single unit of persistence, export and import.
//! Field names serialize in camelCase; fields this version does not know
//! about are carried through untouched in [`UserState::extra`].

use annot_dataset::MediaResolveConfig;
use annot_questionnaire::QuestionnaireAnswers;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

/// Post id → saved annotation
pub type Annotations = IndexMap<String, AnnotationEntry>;

/// The annotator's saved judgment for one task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotationEntry {
    /// Whether the extraction was judged correct as is
    pub correct: bool,
    /// Edited extraction
    pub payload: Value,
    /// Last write time
    pub updated_at: Timestamp,
}

/// Informed-consent record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Consent {
    pub agreed: bool,
    pub signed_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<Timestamp>,
}

/// Where the current dataset came from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasetInfo {
    /// URL, or `file:<name>` for local files
    pub source: String,
    pub loaded_at: Timestamp,
    /// Task count at load time
    pub total: usize,
}

/// Root persisted object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserState {
    pub annotator_id: String,
    pub consent: Consent,
    pub questionnaires: QuestionnaireAnswers,
    /// Position in the current task list
    pub progress_index: usize,
    pub annotations: Annotations,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_info: Option<DatasetInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_config: Option<MediaResolveConfig>,
    /// Unrecognized top-level fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserState {
    /// Saved entry for `post_id`
    #[inline]
    #[must_use]
    pub fn annotation(&self, post_id: &str) -> Option<&AnnotationEntry> {
        self.annotations.get(post_id)
    }

    /// Whether an annotator id has been entered
    #[must_use]
    pub fn has_annotator(&self) -> bool {
        !self.annotator_id.trim().is_empty()
    }
}
