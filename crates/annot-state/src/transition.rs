//! Pure state transitions
//!
//! Every mutation consumes the prior state and returns the next one.
//! Callers swap the whole value in, so a half-applied update is never
//! observable.

use crate::model::{AnnotationEntry, Consent, DatasetInfo, Timestamp, UserState};
use annot_dataset::MediaResolveConfig;
use serde_json::{Map, Value};

/// Highest valid progress index for `total` tasks
#[inline]
#[must_use]
pub fn max_index(total: usize) -> usize {
    total.saturating_sub(1)
}

/// Clamp `index` into `[0, max(0, total - 1)]`
#[inline]
#[must_use]
pub fn clamp_index(index: usize, total: usize) -> usize {
    index.min(max_index(total))
}

impl UserState {
    /// Record one questionnaire answer; re-selection overwrites
    #[must_use]
    pub fn set_answer(
        mut self,
        questionnaire: impl Into<String>,
        item: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.questionnaires
            .entry(questionnaire.into())
            .or_default()
            .insert(item.into(), value.into());
        self
    }

    /// Save an edited payload for `post_id`
    ///
    /// Keeps the entry's `correct` flag. With `advance`, moves to the next
    /// task, never past the last one.
    #[must_use]
    pub fn save_annotation(
        mut self,
        post_id: &str,
        payload: Value,
        advance: bool,
        total: usize,
        now: Timestamp,
    ) -> Self {
        let correct = self.annotations.get(post_id).is_some_and(|e| e.correct);
        self.annotations.insert(
            post_id.to_string(),
            AnnotationEntry {
                correct,
                payload,
                updated_at: now,
            },
        );
        if advance {
            self.progress_index = clamp_index(self.progress_index.saturating_add(1), total);
        }
        self
    }

    /// Toggle the `correct` flag for `post_id`
    ///
    /// A new entry takes `extraction` as its payload.
    #[must_use]
    pub fn set_correct_flag(
        mut self,
        post_id: &str,
        correct: bool,
        extraction: Option<&Value>,
        now: Timestamp,
    ) -> Self {
        let payload = match self.annotations.get(post_id) {
            Some(entry) => entry.payload.clone(),
            None => extraction
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new())),
        };
        self.annotations.insert(
            post_id.to_string(),
            AnnotationEntry {
                correct,
                payload,
                updated_at: now,
            },
        );
        self
    }

    /// Move by `delta` tasks, clamped to the task list
    #[must_use]
    pub fn step(mut self, delta: isize, total: usize) -> Self {
        let moved = self.progress_index.saturating_add_signed(delta);
        self.progress_index = clamp_index(moved, total);
        self
    }

    /// Pull the progress index back into range for `total` tasks
    #[must_use]
    pub fn clamp_progress(mut self, total: usize) -> Self {
        self.progress_index = clamp_index(self.progress_index, total);
        self
    }

    #[must_use]
    pub fn set_annotator_id(mut self, annotator_id: impl Into<String>) -> Self {
        self.annotator_id = annotator_id.into();
        self
    }

    /// Agree to or revoke consent
    ///
    /// Agreeing stamps `signed_at`; revoking clears it. The signed name is
    /// kept either way.
    #[must_use]
    pub fn set_consent(mut self, agreed: bool, now: Timestamp) -> Self {
        self.consent = Consent {
            agreed,
            signed_at: agreed.then_some(now),
            signed_name: self.consent.signed_name,
        };
        self
    }

    #[must_use]
    pub fn set_signed_name(mut self, name: impl Into<String>) -> Self {
        self.consent.signed_name = name.into();
        self
    }

    #[must_use]
    pub fn set_media_config(mut self, config: Option<MediaResolveConfig>) -> Self {
        self.media_config = config;
        self
    }

    /// A new dataset replaced the task list
    ///
    /// Progress restarts at the first task.
    #[must_use]
    pub fn dataset_loaded(mut self, source: impl Into<String>, total: usize, now: Timestamp) -> Self {
        self.progress_index = 0;
        self.dataset_info = Some(DatasetInfo {
            source: source.into(),
            loaded_at: now,
            total,
        });
        self
    }
}
