//! Raw dataset text parsing
//!
//! Accepts a single JSON document (array or object) or newline-delimited JSON.
//! A JSONL file of objects also starts with `{`, so object-looking text that
//! fails as one document is retried line by line.

use crate::error::{DatasetError, DatasetResult};
use serde_json::Value;

/// Parse dataset text as JSON or JSONL
///
/// Blank text yields an empty array. A JSONL failure aborts the whole parse
/// and names the first offending (1-based) line.
///
/// # Errors
/// Returns [`DatasetError::MalformedInput`] if the text cannot be parsed.
pub fn parse_json_or_jsonl(text: &str) -> DatasetResult<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| DatasetError::malformed(e.to_string()));
    }

    if trimmed.starts_with('{') {
        match serde_json::from_str(trimmed) {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::debug!("input is not a single JSON object ({e}), trying JSONL");
            }
        }
    }

    parse_jsonl(trimmed).map(Value::Array)
}

/// Parse newline-delimited JSON, skipping blank lines
fn parse_jsonl(text: &str) -> DatasetResult<Vec<Value>> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| {
            serde_json::from_str(line)
                .map_err(|e| DatasetError::malformed_line(line_no, e.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_text_is_empty_array() {
        assert_eq!(parse_json_or_jsonl("  \n\t ").unwrap(), json!([]));
    }

    #[test]
    fn parses_json_array() {
        let value = parse_json_or_jsonl(r#" [{"id": "a"}, {"id": "b"}] "#).unwrap();
        assert_eq!(value, json!([{"id": "a"}, {"id": "b"}]));
    }

    #[test]
    fn parses_single_object() {
        let value = parse_json_or_jsonl("{\n  \"id\": \"a\"\n}\n").unwrap();
        assert_eq!(value, json!({"id": "a"}));
    }

    #[test]
    fn parses_jsonl_with_blank_lines_and_crlf() {
        let text = "{\"id\": \"a\"}\r\n\r\n   \n{\"id\": \"b\"}\r\n";
        let value = parse_json_or_jsonl(text).unwrap();
        assert_eq!(value, json!([{"id": "a"}, {"id": "b"}]));
    }

    #[test]
    fn jsonl_of_scalars_is_parsed() {
        let value = parse_json_or_jsonl("1\n\"two\"\nnull").unwrap();
        assert_eq!(value, json!([1, "two", null]));
    }

    #[test]
    fn malformed_jsonl_line_fails_whole_parse() {
        let text = "{\"id\": \"a\"}\n{\"id\": \"b\"},\n{\"id\": \"c\"}";
        let err = parse_json_or_jsonl(text).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MalformedInput { line: Some(2), .. }
        ));
    }

    #[test]
    fn malformed_array_reports_no_line() {
        let err = parse_json_or_jsonl("[{\"id\": \"a\"},]").unwrap_err();
        assert!(matches!(err, DatasetError::MalformedInput { line: None, .. }));
    }
}
