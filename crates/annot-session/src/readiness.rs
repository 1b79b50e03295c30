//! Gate in front of annotation

use std::fmt;

/// One prerequisite for annotating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    AnnotatorId,
    Consent,
    QuestionnairesLoaded,
    QuestionnairesComplete,
    DatasetLoaded,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::AnnotatorId => "annotator id missing",
            Self::Consent => "consent not given",
            Self::QuestionnairesLoaded => "no questionnaires loaded",
            Self::QuestionnairesComplete => "questionnaires incomplete",
            Self::DatasetLoaded => "no dataset loaded",
        };
        f.write_str(text)
    }
}

/// Unmet prerequisites, in the order the annotator would address them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Readiness {
    missing: Vec<Requirement>,
}

impl Readiness {
    pub(crate) fn new(missing: Vec<Requirement>) -> Self {
        Self { missing }
    }

    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn missing(&self) -> &[Requirement] {
        &self.missing
    }

    /// Unmet prerequisites, consuming the report
    #[must_use]
    pub fn into_missing(self) -> Vec<Requirement> {
        self.missing
    }
}
