use std::sync::Arc;

use atlas_api::{HttpTransport, ProviderEndpoints};
use atlas_types::{AtlasError, ProviderId, SummaryRecord};
use atlas_util::http::encode_path_segment;
use tracing::{debug, info};

use super::{decode_success, invalid_url};

const PROVIDER: ProviderId = ProviderId::Encyclopedia;

/// Page-summary client for the encyclopedia service. Lookups are by title.
#[derive(Clone)]
pub struct EncyclopediaService {
    transport: Arc<dyn HttpTransport>,
    endpoints: Arc<ProviderEndpoints>,
}

impl EncyclopediaService {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: Arc<ProviderEndpoints>) -> Self {
        Self { transport, endpoints }
    }

    /// Fetch the summary for `title`. A 404 means the service has no page for
    /// it and surfaces as `NotFound`.
    pub async fn summary(&self, title: &str) -> Result<SummaryRecord, AtlasError> {
        let path = format!("page/summary/{}", encode_path_segment(title.trim()));
        let url = self.endpoints.url(PROVIDER, &path).map_err(|error| invalid_url(PROVIDER, error))?;

        let reply = self.transport.get(PROVIDER, url).await?;
        if reply.status == 404 {
            debug!(provider = %PROVIDER, title, "no summary page");
            return Err(AtlasError::not_found(PROVIDER, title.trim()));
        }
        let record: SummaryRecord = decode_success(PROVIDER, &reply)?;
        info!(provider = %PROVIDER, title = %record.title, "summary fetched");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ScriptedReply, ScriptedTransport};
    use atlas_api::HttpReply;
    use serde_json::json;

    fn service(transport: Arc<ScriptedTransport>) -> EncyclopediaService {
        EncyclopediaService::new(transport, Arc::new(ProviderEndpoints::default()))
    }

    #[tokio::test]
    async fn fetches_summary_by_encoded_title() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "/page/summary/",
            ScriptedReply::json(200, json!({ "title": "New Zealand", "extract": "New Zealand is an island country." })),
        );

        let record = service(Arc::clone(&transport)).summary("New Zealand").await.expect("summary");
        assert_eq!(record.title, "New Zealand");
        assert!(transport.requests()[0].url.ends_with("/page/summary/New%20Zealand"));
    }

    #[tokio::test]
    async fn missing_page_is_not_found() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/page/summary/", ScriptedReply::Reply(HttpReply::new(404, "{\"type\":\"not_found\"}")));

        let error = service(transport).summary("Atlantis").await.expect_err("404");
        assert!(error.is_not_found());
        assert!(error.to_string().contains("no information found"));
    }

    #[tokio::test]
    async fn other_statuses_are_provider_errors() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/page/summary/", ScriptedReply::Reply(HttpReply::new(500, "internal error")));

        let error = service(transport).summary("France").await.expect_err("500");
        assert_eq!(error.status_code(), Some(500));
        assert!(error.to_string().contains("internal error"));
    }
}
