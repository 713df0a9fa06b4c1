//! Country registry client.
//!
//! Every call first asks for a reduced field set. The registry intermittently
//! rejects field selections, so an unsuccessful first attempt (error status,
//! malformed body or empty sequence) is followed by exactly one unrestricted
//! request. There is no further retry.

use std::sync::Arc;

use atlas_api::{HttpTransport, ProviderEndpoints};
use atlas_types::{AtlasError, CountryEntity, DETAIL_FIELDS, LIST_FIELDS, ProviderId};
use atlas_util::{http::encode_path_segment, locale_compare};
use tracing::{debug, info, warn};
use url::Url;

use super::{decode_success, invalid_url};

const PROVIDER: ProviderId = ProviderId::CountryRegistry;

#[derive(Clone)]
pub struct CountryRegistry {
    transport: Arc<dyn HttpTransport>,
    endpoints: Arc<ProviderEndpoints>,
}

impl CountryRegistry {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: Arc<ProviderEndpoints>) -> Self {
        Self { transport, endpoints }
    }

    /// Fetch every country, sorted by common name.
    ///
    /// Fails with a provider error only when both the field-reduced and the
    /// unrestricted request fail; the error carries both attempts' details.
    pub async fn fetch_all_entities(&self) -> Result<Vec<CountryEntity>, AtlasError> {
        let restricted_url = self.url("all", Some(LIST_FIELDS))?;
        let restricted_error = match self.fetch_candidates(restricted_url, "the country list").await {
            Ok(entities) => return Ok(sort_by_common_name(entities)),
            Err(error) => error,
        };
        warn!(
            provider = %PROVIDER,
            error = %restricted_error,
            "field-reduced country list request failed; falling back to the full payload"
        );

        let unrestricted_url = self.url("all", None)?;
        match self.fetch_candidates(unrestricted_url, "the country list").await {
            Ok(entities) => Ok(sort_by_common_name(entities)),
            Err(error @ AtlasError::EmptyResult { .. }) => Err(error),
            Err(error) => Err(after_fallback(restricted_error, error)),
        }
    }

    /// Look up one country by display name.
    ///
    /// Name search is substring based upstream, so several candidates may come
    /// back; see [`select_candidate`].
    pub async fn fetch_entity_by_name(&self, name: &str) -> Result<CountryEntity, AtlasError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AtlasError::not_found(PROVIDER, name));
        }
        let path = format!("name/{}", encode_path_segment(name));

        let restricted_url = self.url(&path, Some(DETAIL_FIELDS))?;
        let candidates = match self.fetch_candidates(restricted_url, name).await {
            Ok(candidates) => candidates,
            Err(restricted_error) => {
                warn!(
                    provider = %PROVIDER,
                    name,
                    error = %restricted_error,
                    "field-reduced name search failed; falling back to the full payload"
                );
                let unrestricted_url = self.url(&path, None)?;
                match self.fetch_candidates(unrestricted_url, name).await {
                    Ok(candidates) => candidates,
                    Err(AtlasError::EmptyResult { .. }) => return Err(AtlasError::not_found(PROVIDER, name)),
                    Err(error) if error.status_code() == Some(404) => return Err(AtlasError::not_found(PROVIDER, name)),
                    Err(error) => return Err(after_fallback(restricted_error, error)),
                }
            }
        };

        select_candidate(name, candidates).ok_or_else(|| AtlasError::not_found(PROVIDER, name))
    }

    async fn fetch_candidates(&self, url: Url, subject: &str) -> Result<Vec<CountryEntity>, AtlasError> {
        let reply = self.transport.get(PROVIDER, url).await?;
        let entities: Vec<CountryEntity> = decode_success(PROVIDER, &reply)?;
        if entities.is_empty() {
            return Err(AtlasError::empty_result(PROVIDER, subject));
        }
        info!(provider = %PROVIDER, item_count = entities.len(), "country registry fetch completed");
        Ok(entities)
    }

    fn url(&self, path: &str, fields: Option<&[&str]>) -> Result<Url, AtlasError> {
        let mut url = self.endpoints.url(PROVIDER, path).map_err(|error| invalid_url(PROVIDER, error))?;
        if let Some(fields) = fields {
            url.set_query(Some(&format!("fields={}", fields.join(","))));
        }
        debug!(provider = %PROVIDER, url = %url, restricted = fields.is_some(), "country registry request prepared");
        Ok(url)
    }
}

/// Pick the candidate whose common name equals `name` ignoring case, else the
/// first candidate. Returns `None` only for an empty sequence.
pub fn select_candidate(name: &str, candidates: Vec<CountryEntity>) -> Option<CountryEntity> {
    let wanted = name.trim().to_lowercase();
    let exact = candidates
        .iter()
        .position(|candidate| candidate.name.common.to_lowercase() == wanted);
    let index = exact.unwrap_or(0);
    candidates.into_iter().nth(index)
}

fn sort_by_common_name(mut entities: Vec<CountryEntity>) -> Vec<CountryEntity> {
    entities.sort_by(|left, right| locale_compare(&left.name.common, &right.name.common));
    entities
}

/// Fold the field-reduced attempt's failure into the final error.
fn after_fallback(restricted: AtlasError, unrestricted: AtlasError) -> AtlasError {
    match unrestricted {
        AtlasError::Provider {
            provider,
            status,
            message,
        } => AtlasError::Provider {
            provider,
            status,
            message: format!("{message}; field-reduced attempt: {restricted}"),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ScriptedReply, ScriptedTransport};
    use atlas_api::HttpReply;
    use serde_json::json;

    fn registry(transport: Arc<ScriptedTransport>) -> CountryRegistry {
        CountryRegistry::new(transport, Arc::new(ProviderEndpoints::default()))
    }

    fn country_json(common: &str, region: &str) -> serde_json::Value {
        json!({
            "cca2": common[..2].to_uppercase(),
            "cca3": common[..3].to_uppercase(),
            "name": { "common": common },
            "region": region,
            "flags": { "svg": format!("https://flagcdn.com/{}.svg", common.to_lowercase()) }
        })
    }

    #[test]
    fn select_candidate_prefers_exact_case_insensitive_match() {
        let candidates: Vec<CountryEntity> = serde_json::from_value(json!([
            country_json("Dominican Republic", "Americas"),
            country_json("Dominica", "Americas"),
        ]))
        .expect("candidates");
        let chosen = select_candidate("dominica", candidates).expect("candidate");
        assert_eq!(chosen.name.common, "Dominica");
    }

    #[test]
    fn select_candidate_falls_back_to_first_and_rejects_empty() {
        let candidates: Vec<CountryEntity> = serde_json::from_value(json!([
            country_json("Guinea-Bissau", "Africa"),
            country_json("Equatorial Guinea", "Africa"),
        ]))
        .expect("candidates");
        let chosen = select_candidate("guinea", candidates).expect("candidate");
        assert_eq!(chosen.name.common, "Guinea-Bissau");
        assert!(select_candidate("guinea", Vec::new()).is_none());
    }

    #[tokio::test]
    async fn restricted_success_issues_a_single_request() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "/all?fields=",
            ScriptedReply::json(200, json!([country_json("Germany", "Europe"), country_json("France", "Europe")])),
        );

        let entities = registry(Arc::clone(&transport)).fetch_all_entities().await.expect("list");
        let names: Vec<_> = entities.iter().map(|entity| entity.name.common.as_str()).collect();
        assert_eq!(names, vec!["France", "Germany"]);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn empty_restricted_list_triggers_fallback() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/all?fields=", ScriptedReply::json(200, json!([])));
        transport.respond("/all", ScriptedReply::json(200, json!([country_json("Peru", "Americas")])));

        let entities = registry(Arc::clone(&transport)).fetch_all_entities().await.expect("list");
        assert_eq!(entities.len(), 1);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn both_attempts_failing_reports_both() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/all?fields=", ScriptedReply::Reply(HttpReply::new(400, "bad fields")));
        transport.respond("/all", ScriptedReply::Reply(HttpReply::new(503, "upstream down")));

        let error = registry(Arc::clone(&transport)).fetch_all_entities().await.expect_err("both fail");
        let message = error.to_string();
        assert_eq!(error.status_code(), Some(503));
        assert!(message.contains("upstream down"), "{message}");
        assert!(message.contains("bad fields"), "{message}");
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn empty_unrestricted_list_is_an_empty_result() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/all", ScriptedReply::json(200, json!([])));

        let error = registry(Arc::clone(&transport)).fetch_all_entities().await.expect_err("empty");
        assert!(matches!(error, AtlasError::EmptyResult { .. }), "{error:?}");
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn name_search_encodes_the_name_and_requests_detail_fields() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/name/", ScriptedReply::json(200, json!([country_json("United Kingdom", "Europe")])));

        let entity = registry(Arc::clone(&transport))
            .fetch_entity_by_name("United Kingdom")
            .await
            .expect("entity");
        assert_eq!(entity.name.common, "United Kingdom");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].url.contains("/name/United%20Kingdom?fields="), "{}", requests[0].url);
        assert!(requests[0].url.contains("currencies"), "{}", requests[0].url);
    }

    #[tokio::test]
    async fn name_search_unknown_everywhere_is_not_found() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/name/", ScriptedReply::Reply(HttpReply::new(404, r#"{"status":404,"message":"Not Found"}"#)));

        let error = registry(Arc::clone(&transport))
            .fetch_entity_by_name("Atlantis")
            .await
            .expect_err("not found");
        assert!(error.is_not_found(), "{error:?}");
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_without_a_request() {
        let transport = Arc::new(ScriptedTransport::new());
        let error = registry(Arc::clone(&transport)).fetch_entity_by_name("   ").await.expect_err("blank");
        assert!(error.is_not_found());
        assert_eq!(transport.request_count(), 0);
    }
}
