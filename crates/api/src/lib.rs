//! Provider HTTP client.
//!
//! This crate owns everything that touches the network:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Resolving each provider's base URL from `ATLAS_*_BASE` or its default
//! - Validating base URLs for safety
//! - The [`HttpTransport`] seam the engine issues requests through
//!
//! The primary entry points are [`ProviderClient`], which implements
//! [`HttpTransport`] on top of `reqwest`, and [`ProviderEndpoints`].
//!
//! # Example
//!
//! ```ignore
//! use atlas_api::{HttpTransport, ProviderClient, ProviderEndpoints};
//! use atlas_types::ProviderId;
//!
//! async fn fetch_all() -> anyhow::Result<()> {
//!     let client = ProviderClient::new()?;
//!     let endpoints = ProviderEndpoints::from_env()?;
//!     let url = endpoints.url(ProviderId::CountryRegistry, "all")?;
//!     let reply = client.get(ProviderId::CountryRegistry, url).await?;
//!     println!("status: {}", reply.status);
//!     Ok(())
//! }
//! ```

mod transport;

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use atlas_types::{ProviderId, ToProviderInfo};
use atlas_util::http::join_url;
use reqwest::{Client, header};
use thiserror::Error;
use tracing::debug;
use url::Url;

pub use transport::{HttpReply, HttpTransport};

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Request timeout applied to every provider call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while configuring the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("build http client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("invalid {variable} URL '{value}': {reason}")]
    InvalidBaseUrl {
        variable: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for provider access.
///
/// The client pre-configures the `Accept` header, a request timeout and a
/// User-Agent. It carries no credentials; the photo provider's key travels as
/// a query parameter chosen by the caller.
pub struct ProviderClient {
    pub http: Client,
    pub user_agent: String,
}

impl ProviderClient {
    pub fn new() -> Result<Self, ClientError> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            user_agent: format!("atlas/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }
}

/// Validated base URLs for every provider.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    base_urls: HashMap<ProviderId, String>,
}

impl ProviderEndpoints {
    /// Resolve each provider's base URL from its environment variable, falling
    /// back to the public default. Every value is validated.
    pub fn from_env() -> Result<Self, ClientError> {
        let mut base_urls = HashMap::new();
        for provider in ProviderId::ALL {
            let base_url = env::var(provider.env_var())
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| provider.default_base_url().to_string());
            validate_base_url(provider.env_var(), &base_url)?;
            debug!(provider = %provider, base_url = %base_url, "resolved provider base URL");
            base_urls.insert(provider, base_url);
        }
        Ok(Self { base_urls })
    }

    /// Replace one provider's base URL after validating it.
    pub fn with_base_url(mut self, provider: ProviderId, base_url: &str) -> Result<Self, ClientError> {
        validate_base_url(provider.env_var(), base_url)?;
        self.base_urls.insert(provider, base_url.to_string());
        Ok(self)
    }

    pub fn base_url(&self, provider: ProviderId) -> &str {
        self.base_urls
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_else(|| provider.default_base_url())
    }

    /// Build an absolute URL for a provider-relative path. `path` must already
    /// be percent-encoded where needed.
    pub fn url(&self, provider: ProviderId, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&join_url(self.base_url(provider), path))
    }
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            base_urls: ProviderId::ALL
                .into_iter()
                .map(|provider| (provider, provider.default_base_url().to_string()))
                .collect(),
        }
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(variable: &str, base: &str) -> Result<(), ClientError> {
    let invalid = |reason: String| ClientError::InvalidBaseUrl {
        variable: variable.to_string(),
        value: base.to_string(),
        reason,
    };
    let parsed_base_url = Url::parse(base).map_err(|error| invalid(error.to_string()))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| invalid("must include a host".to_string()))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(invalid(format!(
            "must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_and_localhost() {
        assert!(validate_base_url("ATLAS_COUNTRIES_BASE", "https://restcountries.com/v3.1").is_ok());
        assert!(validate_base_url("ATLAS_COUNTRIES_BASE", "http://localhost:8080").is_ok());
        assert!(validate_base_url("ATLAS_COUNTRIES_BASE", "http://127.0.0.1:9000/v3.1").is_ok());
    }

    #[test]
    fn rejects_plain_http_and_garbage() {
        let error = validate_base_url("ATLAS_WEATHER_BASE", "http://api.open-meteo.com/v1").expect_err("plain http");
        assert!(error.to_string().contains("ATLAS_WEATHER_BASE"), "{error}");
        assert!(error.to_string().contains("https"), "{error}");
        assert!(validate_base_url("ATLAS_WEATHER_BASE", "not a url").is_err());
    }

    #[test]
    fn endpoints_read_overrides_from_environment() {
        temp_env::with_vars(
            [
                ("ATLAS_COUNTRIES_BASE", Some("http://localhost:4010/v3.1/")),
                ("ATLAS_WEATHER_BASE", None),
                ("ATLAS_WIKI_BASE", None),
                ("ATLAS_PHOTOS_BASE", None),
            ],
            || {
                let endpoints = ProviderEndpoints::from_env().expect("endpoints");
                let url = endpoints.url(ProviderId::CountryRegistry, "all").expect("url");
                assert_eq!(url.as_str(), "http://localhost:4010/v3.1/all");
                assert_eq!(endpoints.base_url(ProviderId::Weather), "https://api.open-meteo.com/v1");
            },
        );
    }

    #[test]
    fn endpoints_reject_invalid_overrides() {
        temp_env::with_vars(
            [
                ("ATLAS_COUNTRIES_BASE", None),
                ("ATLAS_WEATHER_BASE", None),
                ("ATLAS_WIKI_BASE", Some("ftp://en.wikipedia.org")),
                ("ATLAS_PHOTOS_BASE", None),
            ],
            || {
                assert!(ProviderEndpoints::from_env().is_err());
            },
        );
    }

    #[test]
    fn unconfigured_providers_fall_back_to_their_default() {
        let endpoints = ProviderEndpoints { base_urls: HashMap::new() };
        assert_eq!(endpoints.base_url(ProviderId::Encyclopedia), "https://en.wikipedia.org/api/rest_v1");
    }

    #[test]
    fn client_sets_user_agent() {
        let client = ProviderClient::new().expect("client");
        assert!(client.user_agent.starts_with("atlas/"));
    }
}
