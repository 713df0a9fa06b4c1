//! Error taxonomy shared by the provider clients, the query cache and the
//! detail orchestrator.
//!
//! Errors are `Clone`: one failed fetch is handed to every caller attached to
//! it, and a cached failure is handed out again until its entry expires.

use thiserror::Error;

use crate::ProviderId;

/// Failure surfaced by a provider request or by a query node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AtlasError {
    /// Network failure, non-success status, or malformed payload after every
    /// fallback attempt was exhausted.
    #[error("{provider} request failed{}: {message}", status_note(.status))]
    Provider {
        provider: ProviderId,
        status: Option<u16>,
        message: String,
    },

    /// The provider answered with a valid but empty sequence where data was expected.
    #[error("{provider} returned an empty result for {subject}")]
    EmptyResult { provider: ProviderId, subject: String },

    /// No candidate matched a lookup.
    #[error("no information found for '{subject}' ({provider})")]
    NotFound { provider: ProviderId, subject: String },

    /// The subject has neither capital-level nor entity-level coordinates.
    #[error("'{subject}' has no coordinates for a weather lookup")]
    MissingCoordinates { subject: String },
}

fn status_note(status: &Option<u16>) -> String {
    status.map(|code| format!(" (status {code})")).unwrap_or_default()
}

impl AtlasError {
    /// Network-level failure: the request never produced a status.
    pub fn network(provider: ProviderId, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            status: None,
            message: message.into(),
        }
    }

    /// Non-success HTTP status; `body_preview` is the already truncated body fragment.
    pub fn status(provider: ProviderId, status: u16, body_preview: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            status: Some(status),
            message: body_preview.into(),
        }
    }

    /// Successful status whose body could not be decoded.
    pub fn malformed(provider: ProviderId, status: u16, detail: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            status: Some(status),
            message: format!("malformed payload: {}", detail.into()),
        }
    }

    pub fn not_found(provider: ProviderId, subject: impl Into<String>) -> Self {
        Self::NotFound {
            provider,
            subject: subject.into(),
        }
    }

    pub fn empty_result(provider: ProviderId, subject: impl Into<String>) -> Self {
        Self::EmptyResult {
            provider,
            subject: subject.into(),
        }
    }

    pub fn missing_coordinates(subject: impl Into<String>) -> Self {
        Self::MissingCoordinates { subject: subject.into() }
    }

    /// Provider that produced the error, when one was involved.
    pub fn provider(&self) -> Option<ProviderId> {
        match self {
            Self::Provider { provider, .. } | Self::EmptyResult { provider, .. } | Self::NotFound { provider, .. } => Some(*provider),
            Self::MissingCoordinates { .. } => None,
        }
    }

    /// HTTP status attached to the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
