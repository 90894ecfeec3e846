//! Common types shared across models.

use serde::{Deserialize, Serialize};

/// Plain confirmation body, e.g. after a delete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse a JSON array column, reporting malformed content to the caller
pub fn parse_json_list<T: serde::de::DeserializeOwned>(
    json: &str,
) -> Result<Vec<T>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serialize a list for storage in a JSON column
pub fn serialize_json_list<T: Serialize>(items: &[T]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}
