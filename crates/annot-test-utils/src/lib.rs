//! Testing utilities for the Annot workspace
//!
//! Shared dataset and questionnaire fixtures.

#![allow(missing_docs)]

use annot_questionnaire::{parse_definition, QuestionnaireDef};
use annot_state::UserState;
use serde_json::{json, Value};
use std::path::Path;

/// Records covering both schema families and one record without an id
pub fn sample_records() -> Vec<Value> {
    vec![
        json!({
            "meta": {"post_id": "p1"},
            "input": {"content": "first post", "article_url": "https://weibo.example/p1"},
            "result": {
                "extraction": {"stance": "pro", "targets": ["policy"]},
                "media_used": {"images": ["weibo/img/p1.jpg"], "videos": []}
            }
        }),
        json!({"post_id": "p2", "content": "second post", "extraction": {"stance": "con"}}),
        json!({"content": "no id, dropped"}),
        json!({"id": 3, "content": "third post", "images": ["/data/crawl/weibo/img/p3.jpg", 7]}),
    ]
}

/// Post ids `sample_records` normalizes to
pub const SAMPLE_POST_IDS: [&str; 3] = ["p1", "p2", "3"];

/// Records as one JSON array
pub fn dataset_json(records: &[Value]) -> String {
    Value::Array(records.to_vec()).to_string()
}

/// Records as JSONL, one compact object per line
pub fn dataset_jsonl(records: &[Value]) -> String {
    records
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keyed-schema definition text
pub fn keyed_definition_json() -> String {
    json!({
        "name": "BFI",
        "full_name": "Big Five Inventory",
        "psychobench_prompt_choice_instruction": "Rate each statement.",
        "range": [1, 5],
        "questions": {
            "1": {"origin_en": "is talkative", "rewritten_zh": "健谈"},
            "2": {"origin_en": "tends to find fault with others"}
        }
    })
    .to_string()
}

/// Listed-schema definition text
pub fn listed_definition_json() -> String {
    json!({
        "title": "LMS",
        "response_scale": {"min": 1, "max": 3, "labels": ["disagree", "neutral", "agree"]},
        "items": [
            {"id": "m1", "text": "Money is important"},
            {"qid": "m2", "text": "Money is power"}
        ]
    })
    .to_string()
}

/// Both sample definitions, parsed
pub fn sample_definitions() -> Vec<QuestionnaireDef> {
    vec![
        parse_definition("BFI.json", &keyed_definition_json()).unwrap(),
        parse_definition("LMS.json", &listed_definition_json()).unwrap(),
    ]
}

/// Write the sample definitions as `BFI.json` and `LMS.json` into `dir`
pub fn write_questionnaire_dir(dir: &Path) {
    std::fs::write(dir.join("BFI.json"), keyed_definition_json()).unwrap();
    std::fs::write(dir.join("LMS.json"), listed_definition_json()).unwrap();
}

/// Answer every item of every definition with its lowest scale point
pub fn answer_all(mut state: UserState, defs: &[QuestionnaireDef]) -> UserState {
    for def in defs {
        for item in &def.items {
            state = state.set_answer(def.key.as_str(), item.id.as_str(), def.scale_min.to_string());
        }
    }
    state
}

/// State that passes every readiness check except the dataset
pub fn consented_state(defs: &[QuestionnaireDef]) -> UserState {
    let state = UserState::default()
        .set_annotator_id("annotator1")
        .set_signed_name("Test Annotator")
        .set_consent(true, 1_000);
    answer_all(state, defs)
}
