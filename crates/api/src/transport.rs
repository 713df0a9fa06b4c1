//! Transport seam between the provider clients and the network.
//!
//! Provider clients only issue `GET` requests and inspect the status and body
//! themselves. Tests substitute a scripted implementation; production uses
//! [`ProviderClient`].

use std::time::Instant;

use async_trait::async_trait;
use atlas_types::{AtlasError, ProviderId};
use atlas_util::redact_sensitive;
use reqwest::header;
use tracing::{debug, warn};
use url::Url;

use crate::ProviderClient;

/// Raw answer from a provider: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a `GET` against a provider.
///
/// Implementations return `Err` only when no status was obtained (connection
/// failure, timeout, unreadable body). Non-success statuses are returned as
/// replies so callers can decide how to fall back.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, provider: ProviderId, url: Url) -> Result<HttpReply, AtlasError>;
}

#[async_trait]
impl HttpTransport for ProviderClient {
    async fn get(&self, provider: ProviderId, url: Url) -> Result<HttpReply, AtlasError> {
        let start = Instant::now();
        let redacted_url = redact_sensitive(url.as_str());
        debug!(provider = %provider, url = %redacted_url, "http request started");

        let response = self
            .http
            .get(url)
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|error| {
                warn!(
                    provider = %provider,
                    url = %redacted_url,
                    duration_ms = start.elapsed().as_millis(),
                    error = %redact_sensitive(&error.to_string()),
                    "http request failed"
                );
                AtlasError::network(provider, format!("network error: {}", redact_sensitive(&error.to_string())))
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|error| {
                AtlasError::network(provider, format!("reading response body: {}", redact_sensitive(&error.to_string())))
            })?;

        debug!(
            provider = %provider,
            url = %redacted_url,
            status,
            body_len = body.len(),
            duration_ms = start.elapsed().as_millis(),
            "http request completed"
        );
        Ok(HttpReply { status, body })
    }
}
