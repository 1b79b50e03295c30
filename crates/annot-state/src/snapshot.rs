//! Export and import of the full state
//!
//! An export is the state object plus two export-only fields, `exportAt`
//! and `tasksTotal`, pretty-printed. Import takes any JSON object of the
//! state's shape and replaces the state wholesale.

use crate::error::{SnapshotError, SnapshotResult};
use crate::model::{Timestamp, UserState};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

const EXPORT_AT: &str = "exportAt";
const TASKS_TOTAL: &str = "tasksTotal";

/// Serialize `state` for export
///
/// # Errors
/// Returns [`SnapshotError::Export`] if serialization fails.
pub fn export_snapshot(state: &UserState, tasks_total: usize, now: Timestamp) -> SnapshotResult<String> {
    let mut value = serde_json::to_value(state)?;
    if let Value::Object(obj) = &mut value {
        obj.insert(EXPORT_AT.to_string(), Value::from(now));
        obj.insert(TASKS_TOTAL.to_string(), Value::from(tasks_total));
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Parse an import artifact into a replacement state
///
/// Export-only fields are dropped; other unknown fields are kept.
///
/// # Errors
/// Returns [`SnapshotError::MalformedImport`] if `text` is not JSON, is not
/// an object, or has a known field of the wrong type.
pub fn import_snapshot(text: &str) -> SnapshotResult<UserState> {
    let mut value: Value =
        serde_json::from_str(text).map_err(|e| SnapshotError::MalformedImport(e.to_string()))?;

    let Value::Object(obj) = &mut value else {
        return Err(SnapshotError::MalformedImport(
            "expected a JSON object".to_string(),
        ));
    };
    obj.shift_remove(EXPORT_AT);
    obj.shift_remove(TASKS_TOTAL);

    let state: UserState =
        serde_json::from_value(value).map_err(|e| SnapshotError::MalformedImport(e.to_string()))?;
    tracing::info!(
        annotator = %state.annotator_id,
        annotations = state.annotations.len(),
        "state imported"
    );
    Ok(state)
}

/// Export artifact name: `annotations_<id|unknown>_<timestamp>.json`
///
/// The timestamp is ISO-8601 with millisecond precision, with `:` and `.`
/// replaced by `-`.
#[must_use]
pub fn export_file_name(annotator_id: &str, at: DateTime<Utc>) -> String {
    let id = match annotator_id.trim() {
        "" => "unknown",
        id => id,
    };
    let ts = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("annotations_{id}_{ts}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn export_adds_export_fields() {
        let state = UserState::default().set_annotator_id("a1");
        let text = export_snapshot(&state, 12, 1_700_000_000_000).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["annotatorId"], json!("a1"));
        assert_eq!(value["exportAt"], json!(1_700_000_000_000_i64));
        assert_eq!(value["tasksTotal"], json!(12));
        assert!(text.contains("\n  \"annotatorId\""));
    }

    #[test]
    fn import_strips_export_fields() {
        let state = UserState::default()
            .set_annotator_id("a1")
            .save_annotation("p1", json!({"x": 1}), false, 1, 5);
        let text = export_snapshot(&state, 1, 10).unwrap();

        let imported = import_snapshot(&text).unwrap();
        assert_eq!(imported, state);
        assert!(imported.extra.is_empty());
    }

    #[test]
    fn import_rejects_bad_json() {
        let err = import_snapshot("{oops").unwrap_err();
        assert!(matches!(err, SnapshotError::MalformedImport(_)));
    }

    #[test]
    fn import_rejects_non_object() {
        for text in ["[]", "42", "\"state\"", "null"] {
            let err = import_snapshot(text).unwrap_err();
            assert!(matches!(err, SnapshotError::MalformedImport(_)), "{text}");
        }
    }

    #[test]
    fn import_rejects_mistyped_field() {
        let err = import_snapshot(r#"{"progressIndex": "three"}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::MalformedImport(_)));
    }

    #[test]
    fn import_fills_defaults() {
        let state = import_snapshot(r#"{"annotatorId": "b2"}"#).unwrap();
        assert_eq!(state.annotator_id, "b2");
        assert_eq!(state.progress_index, 0);
        assert!(state.annotations.is_empty());
    }

    #[test]
    fn file_name_pattern() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
            + chrono::Duration::milliseconds(123);

        assert_eq!(
            export_file_name("a1", at),
            "annotations_a1_2024-03-05T14-07-09-123Z.json"
        );
        assert_eq!(
            export_file_name("  ", at),
            "annotations_unknown_2024-03-05T14-07-09-123Z.json"
        );
    }
}
