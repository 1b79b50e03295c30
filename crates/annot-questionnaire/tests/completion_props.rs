//! Property tests for questionnaire completion

use annot_questionnaire::{
    is_complete, parse_definition, unanswered_items, QuestionItem, QuestionnaireAnswers,
    QuestionnaireDef,
};
use proptest::prelude::*;

fn definition(key: &str, n: usize) -> QuestionnaireDef {
    QuestionnaireDef::new(
        key,
        (0..n).map(|i| QuestionItem::new(format!("q{i}"), "")).collect(),
    )
}

fn answer_all(answers: &mut QuestionnaireAnswers, def: &QuestionnaireDef, skip: Option<usize>) {
    let slot = answers.entry(def.key.clone()).or_default();
    for (idx, item) in def.items.iter().enumerate() {
        if Some(idx) != skip {
            slot.insert(item.id.clone(), "1".to_string());
        }
    }
}

proptest! {
    #[test]
    fn prop_one_missing_item_blocks_completion(n in 1usize..30, missing in 0usize..30) {
        let missing = missing % n;
        let def = definition("BFI", n);
        let defs = vec![def.clone()];

        let mut answers = QuestionnaireAnswers::new();
        answer_all(&mut answers, &def, Some(missing));
        prop_assert!(!is_complete(&answers, &defs));
        let expected = format!("q{missing}");
        prop_assert_eq!(unanswered_items(&answers, &def), vec![expected.as_str()]);

        answer_all(&mut answers, &def, None);
        prop_assert!(is_complete(&answers, &defs));
    }

    #[test]
    fn prop_reanswering_keeps_completion(n in 1usize..20, value in "[1-7]") {
        let def = definition("PVQ", n);
        let defs = vec![def.clone()];
        let mut answers = QuestionnaireAnswers::new();
        answer_all(&mut answers, &def, None);

        answers
            .get_mut("PVQ")
            .unwrap()
            .insert("q0".to_string(), value);
        prop_assert!(is_complete(&answers, &defs));
    }

    #[test]
    fn prop_scale_options_cover_range(min in -3i64..3, span in 0i64..10) {
        let def = QuestionnaireDef::new("X", vec![]).with_scale(min, min + span);
        let options = def.options_for(&QuestionItem::new("1", ""));
        prop_assert_eq!(options.len() as i64, span + 1);
        prop_assert_eq!(options[0].value.clone(), min.to_string());
    }
}

#[test]
fn parsed_definition_drives_completion() {
    let def = parse_definition(
        "BFI.json",
        r#"{"name": "BFI", "range": [1, 5], "questions": {"1": {"origin_en": "a"}, "2": {"origin_en": "b"}}}"#,
    )
    .unwrap();
    let defs = vec![def];

    let mut answers = QuestionnaireAnswers::new();
    answers.entry("BFI".to_string()).or_default().insert("1".to_string(), "5".to_string());
    assert!(!is_complete(&answers, &defs));

    answers.entry("BFI".to_string()).or_default().insert("2".to_string(), "1".to_string());
    assert!(is_complete(&answers, &defs));
}
