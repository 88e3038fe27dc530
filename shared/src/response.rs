//! API Response types
//!
//! The backend answers with bare JSON bodies on success. Error bodies come in
//! two shapes: `{ "message": "..." }` from the application handlers and
//! problem-details `{ "title": "...", "errors": { "field": ["..."] } }` from
//! model validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl ApiErrorBody {
    /// Best human-readable summary of the error, if the body carried any
    pub fn summary(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();
        if let Some(message) = self.message.as_ref().or(self.title.as_ref()) {
            parts.push(message.clone());
        }
        match &self.errors {
            Some(Value::Object(map)) => {
                for value in map.values() {
                    collect_strings(value, &mut parts);
                }
            }
            Some(other) => collect_strings(other, &mut parts),
            None => {}
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}
