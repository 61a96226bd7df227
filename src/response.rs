use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error envelope the backend returns alongside a non-2xx status.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Value>,
}

impl ApiMessage {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            message: Some(message.into()),
            error: None,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors.into_iter().map(Value::String).collect();
        self
    }

    pub fn error_list(&self) -> Vec<String> {
        flatten_errors(&self.errors)
    }

    /// The most specific human-readable message available.
    pub fn text(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Field errors arrive either as plain strings or as `{ field, message }`
/// objects depending on the endpoint.
pub fn flatten_errors(errors: &[Value]) -> Vec<String> {
    errors
        .iter()
        .map(|value| match value {
            Value::String(s) => s.clone(),
            Value::Object(map) => {
                let message = map.get("message").and_then(Value::as_str);
                let field = map
                    .get("field")
                    .or_else(|| map.get("path"))
                    .and_then(Value::as_str);
                match (field, message) {
                    (Some(field), Some(message)) => format!("{field}: {message}"),
                    (None, Some(message)) => message.to_string(),
                    _ => value.to_string(),
                }
            }
            other => other.to_string(),
        })
        .collect()
}
