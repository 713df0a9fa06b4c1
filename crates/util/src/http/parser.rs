//! # HTTP body helpers
//!
//! Strict JSON decoding of provider responses, plus the body-preview helper
//! used to keep error messages short while still carrying the offending
//! fragment of the upstream answer.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Upper bound on the body fragment carried by error messages.
pub const BODY_PREVIEW_LIMIT: usize = 200;

/// Decode an HTTP response body into `T`, providing detailed errors on failure.
///
/// Any parse error is decorated with the originating status code and a
/// truncated preview of the body so callers can surface it directly.
///
/// # Example
/// ```rust
/// use atlas_util::http::decode_json_strict;
///
/// let names: Vec<String> = decode_json_strict(r#"["France", "Germany"]"#, Some(200)).unwrap();
/// assert_eq!(names.len(), 2);
///
/// let error = decode_json_strict::<Vec<String>>("<html>oops</html>", Some(502)).unwrap_err();
/// assert!(error.to_string().contains("status 502"));
/// assert_eq!(error.body_preview(), "<html>oops</html>");
/// ```
pub fn decode_json_strict<T: DeserializeOwned>(text: &str, status: Option<u16>) -> Result<T, JsonParseError> {
    serde_json::from_str::<T>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());
        let preview = truncate_response_preview(text, BODY_PREVIEW_LIMIT);

        JsonParseError::new(status_note, error, preview)
    })
}

/// Collapse whitespace and cut `text` down to roughly `limit` characters.
///
/// Empty or whitespace-only bodies are rendered as `<empty>`.
pub fn truncate_response_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for (count, ch) in text.chars().enumerate() {
        if count >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

/// Error returned when strict JSON decoding of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to parse JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    /// Access the truncated response preview captured during parsing.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }

    /// Access the underlying serde parse error for logging or inspection.
    pub fn source_error(&self) -> &serde_json::Error {
        &self.source
    }
}
