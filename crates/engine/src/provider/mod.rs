//! Provider clients.
//!
//! Modules:
//! - `countries`: field-reduced registry requests with a single unrestricted fallback
//! - `weather`: current conditions for a coordinate pair
//! - `encyclopedia`: page summaries by title
//! - `photos`: photo search with a cascade of query candidates
//! - `scripted`: canned-reply transport for tests and offline demos

mod countries;
mod encyclopedia;
mod photos;
mod scripted;
mod weather;

use atlas_api::HttpReply;
use atlas_types::{AtlasError, ProviderId};
use atlas_util::http::{BODY_PREVIEW_LIMIT, decode_json_strict, truncate_response_preview};
use serde::de::DeserializeOwned;

pub use countries::{CountryRegistry, select_candidate};
pub use encyclopedia::EncyclopediaService;
pub use photos::{PhotoSearchService, photo_queries};
pub use scripted::{RecordedRequest, ScriptedReply, ScriptedTransport};
pub use weather::WeatherService;

/// Turn a non-success reply into a provider error carrying the status and a body fragment.
pub(crate) fn status_error(provider: ProviderId, reply: &HttpReply) -> AtlasError {
    AtlasError::status(provider, reply.status, truncate_response_preview(&reply.body, BODY_PREVIEW_LIMIT))
}

/// Decode a successful reply into `T`.
pub(crate) fn decode_success<T: DeserializeOwned>(provider: ProviderId, reply: &HttpReply) -> Result<T, AtlasError> {
    if !reply.is_success() {
        return Err(status_error(provider, reply));
    }
    decode_json_strict(&reply.body, Some(reply.status))
        .map_err(|error| AtlasError::malformed(provider, reply.status, error.to_string()))
}

pub(crate) fn invalid_url(provider: ProviderId, error: url::ParseError) -> AtlasError {
    AtlasError::network(provider, format!("invalid request URL: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_success_rejects_error_statuses_with_body_fragment() {
        let reply = HttpReply::new(400, "{\"message\": \"unknown fields parameter\"}");
        let error = decode_success::<Vec<serde_json::Value>>(ProviderId::CountryRegistry, &reply).expect_err("400");
        assert_eq!(error.status_code(), Some(400));
        assert!(error.to_string().contains("unknown fields parameter"), "{error}");
    }

    #[test]
    fn decode_success_flags_malformed_bodies() {
        let reply = HttpReply::new(200, "<html>maintenance</html>");
        let error = decode_success::<Vec<serde_json::Value>>(ProviderId::CountryRegistry, &reply).expect_err("html");
        assert!(error.to_string().contains("malformed payload"), "{error}");
        assert!(error.to_string().contains("maintenance"), "{error}");
    }
}
