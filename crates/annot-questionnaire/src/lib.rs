//! Annot Questionnaire
//!
//! Psychometric instruments the annotator completes before annotating.
//!
//! # Core Concepts
//!
//! - [`QuestionnaireDef`]: uniform item/option model over both schema families
//! - [`DefinitionShape`]: keyed (`questions`) vs listed (`items`) layout
//! - [`ResponseOption`]: explicit or scale-derived answer choices
//! - [`is_complete`]: gate that must pass before annotation is allowed

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod completion;
mod definition;
mod error;
mod loader;
mod options;

pub use completion::{
    answered_count, completed_items, is_complete, is_definition_complete, unanswered_items,
    ItemAnswers, QuestionnaireAnswers,
};
pub use definition::{
    normalize_definition, parse_definition, DefinitionShape, QuestionItem, QuestionnaireDef,
    DEFAULT_SCALE_MAX, DEFAULT_SCALE_MIN,
};
pub use error::{QuestionnaireError, QuestionnaireResult};
pub use loader::{definitions_from_resources, load_from_dir, QUESTIONNAIRE_FILES};
pub use options::{ResponseOption, MAX_SCALE_POINTS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
