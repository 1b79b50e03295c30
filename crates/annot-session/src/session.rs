//! The annotation session
//!
//! [`AnnotationSession`] owns everything one annotator works with: the
//! loaded tasks, the questionnaire definitions and the persisted state.
//! Every state mutation is a pure transition swapped in whole, followed by
//! a debounced write. The caller drives the debounce with [`tick`] (or
//! waits on [`next_write_at`]) and must [`teardown`] to flush.
//!
//! [`tick`]: AnnotationSession::tick
//! [`next_write_at`]: AnnotationSession::next_write_at
//! [`teardown`]: AnnotationSession::teardown

use crate::error::{SessionError, SessionResult};
use crate::fetch::{join_location, source_label, ResourceFetcher};
use crate::readiness::{Readiness, Requirement};
use annot_dataset::{load_tasks, resolve_media_url, MediaResolveConfig, Task};
use annot_questionnaire::{
    definitions_from_resources, is_complete, QuestionnaireDef, QUESTIONNAIRE_FILES,
};
use annot_state::{
    export_file_name, export_snapshot, import_snapshot, Clock, Debouncer, StateStorage,
    StateStore, Timestamp, UserState,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Media of the current task, resolved for display
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub images: Vec<MediaLink>,
    pub videos: Vec<MediaLink>,
}

/// One media reference and where it can be fetched, if anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLink {
    pub path: String,
    pub url: Option<String>,
}

/// A portable export artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub contents: String,
}

/// Single-annotator session over one state blob
pub struct AnnotationSession<S, C> {
    store: StateStore<S>,
    clock: C,
    debouncer: Debouncer,
    state: UserState,
    tasks: Vec<Task>,
    questionnaires: Vec<QuestionnaireDef>,
    media_defaults: MediaResolveConfig,
}

impl<S: StateStorage, C: Clock> AnnotationSession<S, C> {
    /// Start a session, hydrating state from `storage`
    pub fn init(storage: S, clock: C, debouncer: Debouncer) -> Self {
        let store = StateStore::new(storage);
        let state = store.load();
        tracing::debug!(
            annotator = %state.annotator_id,
            annotations = state.annotations.len(),
            "session initialized"
        );
        Self {
            store,
            clock,
            debouncer,
            state,
            tasks: Vec::new(),
            questionnaires: Vec::new(),
            media_defaults: MediaResolveConfig::default(),
        }
    }

    /// With fallback media settings for states that carry none
    #[inline]
    #[must_use]
    pub fn with_media_defaults(mut self, defaults: MediaResolveConfig) -> Self {
        self.media_defaults = defaults;
        self
    }

    /// End the session, writing any pending state
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] if the final write fails.
    pub fn teardown(mut self) -> SessionResult<()> {
        self.flush()
    }

    #[inline]
    pub fn state(&self) -> &UserState {
        &self.state
    }

    #[inline]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[inline]
    pub fn questionnaires(&self) -> &[QuestionnaireDef] {
        &self.questionnaires
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[inline]
    pub fn storage(&self) -> &S {
        self.store.storage()
    }

    /// Apply a transition and schedule a write
    pub fn update(&mut self, transition: impl FnOnce(UserState) -> UserState) {
        let prior = std::mem::take(&mut self.state);
        self.state = transition(prior);
        self.debouncer.schedule(self.clock.now());
    }

    // ---- persistence ----

    /// Write the state if the debounce deadline has passed
    ///
    /// Returns whether a write happened.
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] if the write fails.
    pub fn tick(&mut self) -> SessionResult<bool> {
        if !self.debouncer.take_due(self.clock.now()) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Write a pending state now
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] if the write fails.
    pub fn flush(&mut self) -> SessionResult<()> {
        if self.debouncer.take_pending() {
            self.persist()?;
        }
        Ok(())
    }

    /// Deadline of the pending write
    #[inline]
    pub fn next_write_at(&self) -> Option<Timestamp> {
        self.debouncer.pending()
    }

    /// A failed write is dropped; the next mutation schedules a fresh one
    fn persist(&mut self) -> SessionResult<()> {
        self.store.save(&self.state)?;
        Ok(())
    }

    // ---- dataset ----

    /// Replace the task list with the records in `text`
    ///
    /// Progress restarts at the first task. On failure the previous tasks
    /// and state are kept.
    ///
    /// # Errors
    /// - [`SessionError::Dataset`] for unparsable or empty datasets
    pub fn load_dataset(&mut self, text: &str, source: &str) -> SessionResult<usize> {
        let tasks = load_tasks(text)?;
        let total = tasks.len();
        self.tasks = tasks;

        let now = self.clock.now();
        self.update(|state| state.dataset_loaded(source, total, now));
        tracing::info!(source, total, "dataset loaded");
        Ok(total)
    }

    /// Reload the dataset a previous run was working on
    ///
    /// When `source` matches the persisted `datasetInfo`, keeps the
    /// persisted progress, clamped to the new task count. A different
    /// source is loaded like [`load_dataset`](Self::load_dataset).
    ///
    /// # Errors
    /// - [`SessionError::Dataset`] for unparsable or empty datasets
    pub fn restore_dataset(&mut self, text: &str, source: &str) -> SessionResult<usize> {
        let same_source = self
            .state
            .dataset_info
            .as_ref()
            .is_some_and(|info| info.source == source);
        if !same_source {
            return self.load_dataset(text, source);
        }

        let tasks = load_tasks(text)?;
        let total = tasks.len();
        self.tasks = tasks;
        if self.state.progress_index >= total {
            self.update(|state| state.clamp_progress(total));
        }
        tracing::debug!(total, progress = self.state.progress_index, "dataset restored");
        Ok(total)
    }

    /// Fetch and load a dataset from a URL or path
    ///
    /// # Errors
    /// - [`SessionError::Fetch`] if the resource cannot be fetched
    /// - [`SessionError::Dataset`] for unparsable or empty datasets
    pub async fn fetch_dataset<F>(&mut self, fetcher: &F, location: &str) -> SessionResult<usize>
    where
        F: ResourceFetcher + ?Sized,
    {
        let text = fetcher.fetch_text(location).await?;
        self.load_dataset(&text, &source_label(location))
    }

    // ---- questionnaires ----

    /// Install questionnaire definitions
    pub fn load_questionnaires(&mut self, defs: Vec<QuestionnaireDef>) {
        tracing::debug!(count = defs.len(), "questionnaires installed");
        self.questionnaires = defs;
    }

    /// Fetch the fixed questionnaire files under `base`
    ///
    /// Unavailable files are skipped. A no-op once definitions are loaded.
    ///
    /// # Errors
    /// - [`SessionError::Fetch`] for transport failures
    /// - [`SessionError::Questionnaire`] for malformed definitions
    pub async fn fetch_questionnaires<F>(&mut self, fetcher: &F, base: &str) -> SessionResult<usize>
    where
        F: ResourceFetcher + ?Sized,
    {
        if !self.questionnaires.is_empty() {
            return Ok(self.questionnaires.len());
        }

        let mut resources = Vec::with_capacity(QUESTIONNAIRE_FILES.len());
        for name in QUESTIONNAIRE_FILES {
            let text = fetcher.fetch_optional(&join_location(base, name)).await?;
            resources.push((name, text));
        }

        let defs = definitions_from_resources(resources)?;
        let count = defs.len();
        self.load_questionnaires(defs);
        Ok(count)
    }

    /// Record one questionnaire answer
    pub fn set_answer(&mut self, questionnaire: &str, item: &str, value: &str) {
        self.update(|state| state.set_answer(questionnaire, item, value));
    }

    #[inline]
    pub fn questionnaires_complete(&self) -> bool {
        is_complete(&self.state.questionnaires, &self.questionnaires)
    }

    // ---- identity ----

    pub fn set_annotator_id(&mut self, annotator_id: &str) {
        self.update(|state| state.set_annotator_id(annotator_id));
    }

    pub fn set_signed_name(&mut self, name: &str) {
        self.update(|state| state.set_signed_name(name));
    }

    pub fn set_consent(&mut self, agreed: bool) {
        let now = self.clock.now();
        self.update(|state| state.set_consent(agreed, now));
    }

    pub fn set_media_config(&mut self, config: Option<MediaResolveConfig>) {
        self.update(|state| state.set_media_config(config));
    }

    // ---- readiness ----

    /// Prerequisites still unmet before annotation may start
    pub fn readiness(&self) -> Readiness {
        let mut missing = Vec::new();
        if !self.state.has_annotator() {
            missing.push(Requirement::AnnotatorId);
        }
        if !self.state.consent.agreed {
            missing.push(Requirement::Consent);
        }
        if self.questionnaires.is_empty() {
            missing.push(Requirement::QuestionnairesLoaded);
        } else if !self.questionnaires_complete() {
            missing.push(Requirement::QuestionnairesComplete);
        }
        if self.tasks.is_empty() {
            missing.push(Requirement::DatasetLoaded);
        }
        Readiness::new(missing)
    }

    fn ensure_ready(&self) -> SessionResult<()> {
        let readiness = self.readiness();
        if readiness.is_ready() {
            Ok(())
        } else {
            Err(SessionError::NotReady(readiness.into_missing()))
        }
    }

    // ---- navigation ----

    /// Index of the current task, clamped to the task list
    #[inline]
    pub fn current_index(&self) -> usize {
        annot_state::clamp_index(self.state.progress_index, self.tasks.len())
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.tasks.get(self.current_index())
    }

    /// Move to the previous task
    pub fn previous(&mut self) {
        self.step(-1);
    }

    /// Move to the next task
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        self.step(1);
    }

    fn step(&mut self, delta: isize) {
        let total = self.tasks.len();
        let index = self.current_index();
        self.update(|mut state| {
            state.progress_index = index;
            state.step(delta, total)
        });
    }

    // ---- payload editing ----

    /// Editor text for the current task
    ///
    /// The saved payload if any, else the task's extraction, pretty-printed.
    /// Empty when no task is loaded.
    pub fn payload_text(&self) -> String {
        let Some(task) = self.current_task() else {
            return String::new();
        };
        let payload = self
            .state
            .annotation(&task.post_id)
            .map_or(&task.extraction, |entry| &entry.payload);
        pretty(payload)
    }

    /// Editor text restored to the task's original extraction
    pub fn reset_payload(&self) -> String {
        self.current_task()
            .map(|task| pretty(&task.extraction))
            .unwrap_or_default()
    }

    /// Save edited payload text for the current task
    ///
    /// Blank text saves an empty object. The `correct` flag is kept.
    ///
    /// # Errors
    /// - [`SessionError::NotReady`] if prerequisites are unmet
    /// - [`SessionError::PayloadParse`] if `text` is not JSON; nothing is saved
    pub fn save_current(&mut self, text: &str, advance: bool) -> SessionResult<()> {
        self.ensure_ready()?;
        let payload = parse_payload(text)?;
        let post_id = self
            .current_task()
            .map(|task| task.post_id.clone())
            .ok_or(SessionError::NoCurrentTask)?;

        let total = self.tasks.len();
        let index = self.current_index();
        let now = self.clock.now();
        self.update(|mut state| {
            state.progress_index = index;
            state.save_annotation(&post_id, payload, advance, total, now)
        });
        tracing::debug!(post_id = %post_id, advance, "annotation saved");
        Ok(())
    }

    /// Mark the current task's extraction as correct or not
    ///
    /// Not gated on readiness; any shown task can be flagged.
    ///
    /// # Errors
    /// - [`SessionError::NoCurrentTask`] if no dataset is loaded
    pub fn set_correct_flag(&mut self, correct: bool) -> SessionResult<()> {
        let (post_id, extraction) = self
            .current_task()
            .map(|task| (task.post_id.clone(), task.extraction.clone()))
            .ok_or(SessionError::NoCurrentTask)?;

        let now = self.clock.now();
        self.update(|state| state.set_correct_flag(&post_id, correct, Some(&extraction), now));
        Ok(())
    }

    // ---- media ----

    /// Effective media settings: the state's, filled from the defaults
    pub fn media_config(&self) -> MediaResolveConfig {
        self.state
            .media_config
            .clone()
            .unwrap_or_default()
            .or(&self.media_defaults)
    }

    /// Media of the current task with resolved URLs
    pub fn current_media(&self) -> ResolvedMedia {
        let Some(task) = self.current_task() else {
            return ResolvedMedia::default();
        };
        let cfg = self.media_config();
        let link = |path: &String| MediaLink {
            path: path.clone(),
            url: resolve_media_url(path, &cfg),
        };
        ResolvedMedia {
            images: task.media.images.iter().map(link).collect(),
            videos: task.media.videos.iter().map(link).collect(),
        }
    }

    // ---- export / import / clear ----

    /// Serialize the full state for download
    ///
    /// # Errors
    /// Returns [`SessionError::Snapshot`] if serialization fails.
    pub fn export_snapshot(&self) -> SessionResult<ExportArtifact> {
        let now = self.clock.now();
        let contents = export_snapshot(&self.state, self.tasks.len(), now)?;
        let at = DateTime::<Utc>::from_timestamp_millis(now).unwrap_or_default();
        let file_name = export_file_name(&self.state.annotator_id, at);
        tracing::info!(file = %file_name, tasks = self.tasks.len(), "state exported");
        Ok(ExportArtifact {
            file_name,
            contents,
        })
    }

    /// Replace the whole state with an imported one
    ///
    /// # Errors
    /// Returns [`SessionError::Snapshot`] if `text` is not a usable state;
    /// the current state is kept.
    pub fn import_snapshot(&mut self, text: &str) -> SessionResult<()> {
        let imported = import_snapshot(text)?;
        let total = self.tasks.len();
        self.update(|_| imported);
        if !self.tasks.is_empty() {
            self.update(|state| state.clamp_progress(total));
        }
        Ok(())
    }

    /// Purge persisted state and reset to a fresh session
    ///
    /// # Errors
    /// Returns [`SessionError::Storage`] if storage cannot be cleared.
    pub fn clear(&mut self) -> SessionResult<()> {
        self.debouncer.cancel();
        self.store.clear()?;
        self.state = UserState::default();
        self.tasks.clear();
        Ok(())
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn parse_payload(text: &str) -> SessionResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(text).map_err(|e| SessionError::PayloadParse(e.to_string()))
}
