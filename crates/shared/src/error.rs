use serde::{Deserialize, Serialize};

/// Message used when a failed response carries no readable `error` field.
pub const FALLBACK_ERROR_MESSAGE: &str = "request failed";

/// Error body the backend attaches to every non-2xx response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiError {
    /// Extracts the backend message from a raw error body, falling back to
    /// [`FALLBACK_ERROR_MESSAGE`] when the body is not JSON or the field is
    /// missing or blank.
    pub fn message_from_body(body: &[u8]) -> String {
        serde_json::from_slice::<ApiError>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
    }
}
