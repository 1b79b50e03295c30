//! Annot Session
//!
//! One annotator's working session: dataset, questionnaires, persisted state
//! and the gate between them.
//!
//! # Core Concepts
//!
//! - [`AnnotationSession`]: explicit `init`/`teardown` owner of all session data
//! - [`Readiness`]: which prerequisites block annotation
//! - [`ResourceFetcher`]: HTTP and filesystem access for datasets and questionnaires
//! - Debounced persistence: mutations schedule a write, `tick`/`flush` perform it
//!
//! # Example
//!
//! ```rust,ignore
//! use annot_session::{AnnotationSession, DefaultFetcher};
//! use annot_state::{Debouncer, FileStorage, SystemClock};
//!
//! let mut session = AnnotationSession::init(
//!     FileStorage::new(".annot"),
//!     SystemClock,
//!     Debouncer::default(),
//! );
//! session.fetch_dataset(&DefaultFetcher::new(), "tasks.jsonl").await?;
//! println!("{}", session.payload_text());
//! session.teardown()?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod fetch;
mod readiness;
mod session;

pub use error::{FetchError, FetchResult, SessionError, SessionResult};
pub use fetch::{
    join_location, source_label, DefaultFetcher, FsFetcher, HttpFetcher, ResourceFetcher,
};
pub use readiness::{Readiness, Requirement};
pub use session::{AnnotationSession, ExportArtifact, MediaLink, ResolvedMedia};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
