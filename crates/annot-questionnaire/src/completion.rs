//! Answer sets and completion checks

use crate::definition::QuestionnaireDef;
use indexmap::IndexMap;

/// Item id → selected option value, for one questionnaire
pub type ItemAnswers = IndexMap<String, String>;

/// Questionnaire key → answers
pub type QuestionnaireAnswers = IndexMap<String, ItemAnswers>;

/// Number of answers recorded under a definition's key
///
/// Counts stored answers, including ids the definition does not know.
#[must_use]
pub fn answered_count(answers: &QuestionnaireAnswers, def: &QuestionnaireDef) -> usize {
    answers.get(&def.key).map_or(0, IndexMap::len)
}

/// Item ids of `def` still lacking an answer, in item order
#[must_use]
pub fn unanswered_items<'a>(
    answers: &QuestionnaireAnswers,
    def: &'a QuestionnaireDef,
) -> Vec<&'a str> {
    let filled = answers.get(&def.key);
    def.items
        .iter()
        .map(|item| item.id.as_str())
        .filter(|id| !filled.is_some_and(|filled| filled.contains_key(*id)))
        .collect()
}

/// Number of the definition's own items that have an answer
///
/// Unlike [`answered_count`], ignores ids the definition does not know.
#[must_use]
pub fn completed_items(answers: &QuestionnaireAnswers, def: &QuestionnaireDef) -> usize {
    def.item_count() - unanswered_items(answers, def).len()
}

/// Whether one definition has every item answered
#[must_use]
pub fn is_definition_complete(answers: &QuestionnaireAnswers, def: &QuestionnaireDef) -> bool {
    unanswered_items(answers, def).is_empty()
}

/// Whether the whole questionnaire set is complete
///
/// With no definitions loaded the set is never complete. Otherwise every item
/// id of every definition must have an answer under that definition's key.
#[must_use]
pub fn is_complete(answers: &QuestionnaireAnswers, defs: &[QuestionnaireDef]) -> bool {
    !defs.is_empty() && defs.iter().all(|def| is_definition_complete(answers, def))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::QuestionItem;

    fn def(key: &str, ids: &[&str]) -> QuestionnaireDef {
        QuestionnaireDef::new(
            key,
            ids.iter().map(|id| QuestionItem::new(*id, "")).collect(),
        )
    }

    fn answer(answers: &mut QuestionnaireAnswers, key: &str, item: &str) {
        answers
            .entry(key.to_string())
            .or_default()
            .insert(item.to_string(), "1".to_string());
    }

    #[test]
    fn no_definitions_is_incomplete() {
        assert!(!is_complete(&QuestionnaireAnswers::new(), &[]));
    }

    #[test]
    fn completes_after_all_items() {
        let defs = vec![def("BFI", &["1", "2", "3"])];
        let mut answers = QuestionnaireAnswers::new();

        answer(&mut answers, "BFI", "1");
        answer(&mut answers, "BFI", "2");
        assert!(!is_complete(&answers, &defs));
        assert_eq!(unanswered_items(&answers, &defs[0]), vec!["3"]);

        answer(&mut answers, "BFI", "3");
        assert!(is_complete(&answers, &defs));
    }

    #[test]
    fn unknown_ids_do_not_count_toward_completion() {
        let defs = vec![def("BFI", &["1", "2"])];
        let mut answers = QuestionnaireAnswers::new();

        answer(&mut answers, "BFI", "1");
        answer(&mut answers, "BFI", "stale");
        assert_eq!(answered_count(&answers, &defs[0]), 2);
        assert_eq!(completed_items(&answers, &defs[0]), 1);
        assert!(!is_complete(&answers, &defs));
    }

    #[test]
    fn every_definition_must_be_complete() {
        let defs = vec![def("A", &["1"]), def("B", &["1"])];
        let mut answers = QuestionnaireAnswers::new();

        answer(&mut answers, "A", "1");
        assert!(!is_complete(&answers, &defs));

        answer(&mut answers, "B", "1");
        assert!(is_complete(&answers, &defs));
    }

    #[test]
    fn empty_definition_is_trivially_complete() {
        let defs = vec![def("EMPTY", &[])];
        assert!(is_complete(&QuestionnaireAnswers::new(), &defs));
    }
}
