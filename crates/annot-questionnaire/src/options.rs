//! Response option derivation for rendering

use crate::definition::{QuestionItem, QuestionnaireDef};
use serde::Serialize;
use serde_json::Value;

/// Language variants tried, in order, for an explicit option label
const LABEL_LOCALES: &[&str] = &["zh", "en"];

/// Largest numeric scale options are synthesized for
pub const MAX_SCALE_POINTS: i64 = 101;

/// A selectable answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseOption {
    /// Stored answer value
    pub value: String,
    /// Display label
    pub label: String,
}

impl ResponseOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl QuestionnaireDef {
    /// Options offered for `item`
    ///
    /// Explicit `options` win. Otherwise every integer in
    /// `scale_min..=scale_max` is offered, labeled from the item's scale
    /// labels only when their count matches the scale size exactly. Inverted
    /// scales and scales wider than [`MAX_SCALE_POINTS`] offer nothing.
    #[must_use]
    pub fn options_for(&self, item: &QuestionItem) -> Vec<ResponseOption> {
        if let Some(options) = &item.options {
            return options
                .iter()
                .map(|(value, meta)| ResponseOption::new(value.clone(), explicit_label(value, meta)))
                .collect();
        }

        let points = self
            .scale_max
            .checked_sub(self.scale_min)
            .and_then(|span| span.checked_add(1));
        if !points.is_some_and(|points| (1..=MAX_SCALE_POINTS).contains(&points)) {
            tracing::debug!(
                key = %self.key,
                min = self.scale_min,
                max = self.scale_max,
                "no options synthesized for scale"
            );
            return Vec::new();
        }

        let scale: Vec<i64> = (self.scale_min..=self.scale_max).collect();
        let labels = item.labels.as_ref().filter(|labels| labels.len() == scale.len());

        scale
            .iter()
            .enumerate()
            .map(|(idx, point)| {
                let value = point.to_string();
                let label = labels.map_or_else(|| value.clone(), |labels| labels[idx].clone());
                ResponseOption::new(value, label)
            })
            .collect()
    }
}

fn explicit_label(value: &str, meta: &Value) -> String {
    LABEL_LOCALES
        .iter()
        .filter_map(|locale| meta.get(*locale))
        .find_map(|label| match label {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| value.to_string())
}
