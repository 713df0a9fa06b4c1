use std::sync::Arc;

use atlas_api::{HttpTransport, ProviderEndpoints};
use atlas_types::{AtlasError, CURRENT_METRICS, Coordinates, ProviderId, WeatherSnapshot};
use serde::Deserialize;
use tracing::info;

use super::{decode_success, invalid_url};

const PROVIDER: ProviderId = ProviderId::Weather;

#[derive(Debug, Deserialize)]
struct ForecastEnvelope {
    #[serde(default)]
    current: Option<WeatherSnapshot>,
}

/// Current-conditions client for the weather service.
#[derive(Clone)]
pub struct WeatherService {
    transport: Arc<dyn HttpTransport>,
    endpoints: Arc<ProviderEndpoints>,
}

impl WeatherService {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: Arc<ProviderEndpoints>) -> Self {
        Self { transport, endpoints }
    }

    /// Fetch current temperature, wind speed and weather code at `coordinates`,
    /// using the location's own timezone.
    pub async fn current(&self, coordinates: Coordinates) -> Result<WeatherSnapshot, AtlasError> {
        let mut url = self
            .endpoints
            .url(PROVIDER, "forecast")
            .map_err(|error| invalid_url(PROVIDER, error))?;
        url.query_pairs_mut()
            .append_pair("latitude", &coordinates.latitude.to_string())
            .append_pair("longitude", &coordinates.longitude.to_string())
            .append_pair("current", &CURRENT_METRICS.join(","))
            .append_pair("timezone", "auto");

        let reply = self.transport.get(PROVIDER, url).await?;
        let envelope: ForecastEnvelope = decode_success(PROVIDER, &reply)?;
        let snapshot = envelope
            .current
            .ok_or_else(|| AtlasError::malformed(PROVIDER, reply.status, "response has no 'current' block"))?;
        info!(
            provider = %PROVIDER,
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            "current weather fetched"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ScriptedReply, ScriptedTransport};
    use serde_json::json;

    fn service(transport: Arc<ScriptedTransport>) -> WeatherService {
        WeatherService::new(transport, Arc::new(ProviderEndpoints::default()))
    }

    #[tokio::test]
    async fn requests_current_metrics_for_the_coordinates() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "/forecast",
            ScriptedReply::json(
                200,
                json!({ "latitude": 36.0, "current": { "temperature_2m": 18.4, "wind_speed_10m": 7.2, "weather_code": 2 } }),
            ),
        );

        let snapshot = service(Arc::clone(&transport))
            .current(Coordinates::new(36.0, 138.0))
            .await
            .expect("weather");
        assert_eq!(snapshot.temperature_2m, Some(18.4));
        assert_eq!(snapshot.condition(), Some("Partly cloudy"));

        let url = &transport.requests()[0].url;
        assert!(url.contains("latitude=36&longitude=138"), "{url}");
        assert!(url.contains("current=temperature_2m%2Cwind_speed_10m%2Cweather_code"), "{url}");
        assert!(url.contains("timezone=auto"), "{url}");
    }

    #[tokio::test]
    async fn missing_current_block_is_malformed() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/forecast", ScriptedReply::json(200, json!({ "latitude": 1.0 })));

        let error = service(transport).current(Coordinates::new(1.0, 2.0)).await.expect_err("malformed");
        assert!(error.to_string().contains("no 'current' block"), "{error}");
    }

    #[tokio::test]
    async fn error_status_keeps_upstream_reason() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "/forecast",
            ScriptedReply::json(400, json!({ "error": true, "reason": "Latitude must be in range of -90 to 90°." })),
        );

        let error = service(transport).current(Coordinates::new(91.0, 2.0)).await.expect_err("400");
        assert_eq!(error.status_code(), Some(400));
        assert!(error.to_string().contains("Latitude must be in range"), "{error}");
    }
}
