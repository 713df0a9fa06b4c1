//! Photo search client.
//!
//! A country name alone often yields nothing useful, so the client walks a
//! short list of query candidates (names, capital, scenic variants, region)
//! and keeps the first non-empty result.

use std::sync::Arc;

use atlas_api::{HttpTransport, ProviderEndpoints};
use atlas_types::{AtlasError, CountryEntity, MAX_PHOTOS, PhotoRecord, PhotoSearchPage, ProviderId};
use atlas_util::redact_sensitive;
use tracing::{debug, info, warn};

use super::{decode_success, invalid_url, status_error};

const PROVIDER: ProviderId = ProviderId::PhotoSearch;
const RESULTS_PER_PAGE: &str = "12";

#[derive(Clone)]
pub struct PhotoSearchService {
    transport: Arc<dyn HttpTransport>,
    endpoints: Arc<ProviderEndpoints>,
}

impl PhotoSearchService {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: Arc<ProviderEndpoints>) -> Self {
        Self { transport, endpoints }
    }

    /// Search photos for `entity`, returning at most four.
    ///
    /// Without a credential nothing is requested and the result is empty.
    /// Candidates answered with an error status are skipped; if none of them
    /// succeeded, the last such error is returned.
    pub async fn search(&self, entity: &CountryEntity, credential: Option<&str>) -> Result<Vec<PhotoRecord>, AtlasError> {
        let Some(credential) = credential.map(str::trim).filter(|key| !key.is_empty()) else {
            debug!(provider = %PROVIDER, "no photo credential configured; skipping search");
            return Ok(Vec::new());
        };

        let mut last_error = None;
        let mut any_success = false;
        for query in photo_queries(entity) {
            let mut url = self
                .endpoints
                .url(PROVIDER, "search/photos")
                .map_err(|error| invalid_url(PROVIDER, error))?;
            url.query_pairs_mut()
                .append_pair("query", &query)
                .append_pair("per_page", RESULTS_PER_PAGE)
                .append_pair("orientation", "landscape")
                .append_pair("content_filter", "high")
                .append_pair("client_id", credential);

            let reply = self.transport.get(PROVIDER, url).await?;
            if !reply.is_success() {
                let error = status_error(PROVIDER, &reply);
                warn!(
                    provider = %PROVIDER,
                    query = %query,
                    error = %redact_sensitive(&error.to_string()),
                    "photo query failed; trying next candidate"
                );
                last_error = Some(error);
                continue;
            }
            any_success = true;

            let page: PhotoSearchPage = decode_success(PROVIDER, &reply)?;
            if !page.results.is_empty() {
                let mut photos = page.results;
                photos.truncate(MAX_PHOTOS);
                info!(provider = %PROVIDER, query = %query, item_count = photos.len(), "photos fetched");
                return Ok(photos);
            }
            debug!(provider = %PROVIDER, query = %query, "photo query returned no matches");
        }

        match last_error {
            Some(error) if !any_success => Err(error),
            _ => Ok(Vec::new()),
        }
    }
}

/// Query candidates for `entity`, in the order they are tried. Blank and
/// repeated candidates are dropped.
pub fn photo_queries(entity: &CountryEntity) -> Vec<String> {
    let common = entity.name.common.trim();
    let candidates = [
        common.to_string(),
        entity.name.official.clone().unwrap_or_default(),
        entity.primary_capital().unwrap_or_default().to_string(),
        format!("{common} landscape"),
        format!("{common} city"),
        entity.region.clone(),
    ];

    let mut queries: Vec<String> = Vec::new();
    for candidate in candidates {
        let candidate = candidate.trim().to_string();
        if candidate.is_empty() || queries.iter().any(|seen| seen.eq_ignore_ascii_case(&candidate)) {
            continue;
        }
        queries.push(candidate);
    }
    queries
}
