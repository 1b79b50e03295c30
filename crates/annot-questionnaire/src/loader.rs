//! Loading the fixed questionnaire resources
//!
//! Each of the five instruments is optional. A missing resource is skipped;
//! a present but malformed one fails the load.

use crate::definition::{parse_definition, QuestionnaireDef};
use crate::error::{QuestionnaireError, QuestionnaireResult};
use std::io::ErrorKind;
use std::path::Path;

/// Resource names, in presentation order
pub const QUESTIONNAIRE_FILES: [&str; 5] = [
    "16Personalities.json",
    "BFI.json",
    "PVQ.json",
    "EIS.json",
    "LMS.json",
];

/// Build definitions from fetched resources
///
/// `resources` yields `(file name, text)` pairs; `None` text marks a
/// resource that was not available.
///
/// # Errors
/// Returns [`QuestionnaireError::Malformed`] for the first unusable resource.
pub fn definitions_from_resources<'a, I>(resources: I) -> QuestionnaireResult<Vec<QuestionnaireDef>>
where
    I: IntoIterator<Item = (&'a str, Option<String>)>,
{
    let mut defs = Vec::new();
    for (name, text) in resources {
        match text {
            Some(text) => defs.push(parse_definition(name, &text)?),
            None => tracing::debug!("questionnaire {name} not available, skipping"),
        }
    }
    Ok(defs)
}

/// Load the fixed questionnaire files from a directory
///
/// # Errors
/// - [`QuestionnaireError::Io`] for read failures other than "not found"
/// - [`QuestionnaireError::Malformed`] for unusable definitions
pub fn load_from_dir(dir: &Path) -> QuestionnaireResult<Vec<QuestionnaireDef>> {
    let resources = QUESTIONNAIRE_FILES
        .iter()
        .map(|name| {
            let path = dir.join(name);
            match std::fs::read_to_string(&path) {
                Ok(text) => Ok((*name, Some(text))),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok((*name, None)),
                Err(e) => Err(QuestionnaireError::io_error(path, e)),
            }
        })
        .collect::<QuestionnaireResult<Vec<_>>>()?;

    let defs = definitions_from_resources(resources)?;
    tracing::info!("loaded {} questionnaires from {}", defs.len(), dir.display());
    Ok(defs)
}
