//! Annot State
//!
//! The annotator's persisted state and everything that changes or stores it.
//!
//! # Core Concepts
//!
//! - [`UserState`]: the single unit of persistence, export and import
//! - Transitions: consuming methods on [`UserState`] (`set_answer`,
//!   `save_annotation`, `set_correct_flag`, `step`, ...)
//! - [`StateStore`]: load/save/clear over a pluggable [`StateStorage`]
//! - [`Debouncer`] + [`Clock`]: coalesced writes, testable with [`ManualClock`]
//! - [`export_snapshot`] / [`import_snapshot`]: portable state artifacts
//!
//! # Example
//!
//! ```rust,ignore
//! use annot_state::{FileStorage, StateStore};
//!
//! let store = StateStore::new(FileStorage::new(".annot"));
//! let state = store.load().set_annotator_id("annotator1");
//! store.save(&state)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod clock;
mod debounce;
mod error;
mod model;
mod snapshot;
mod storage;
mod store;
mod transition;

pub use clock::{Clock, ManualClock, SystemClock};
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE_MS};
pub use error::{SnapshotError, SnapshotResult, StorageError, StorageResult};
pub use model::{AnnotationEntry, Annotations, Consent, DatasetInfo, Timestamp, UserState};
pub use snapshot::{export_file_name, export_snapshot, import_snapshot};
pub use storage::{FileStorage, MemoryStorage, StateStorage, STORAGE_KEY};
pub use store::StateStore;
pub use transition::{clamp_index, max_index};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
