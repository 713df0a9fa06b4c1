use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use atlas_api::{HttpTransport, ProviderEndpoints};
use atlas_types::{Coordinates, CountryEntity, PhotoRecord, SummaryRecord, WeatherSnapshot};
use atlas_util::{TtlOverrides, normalize_subject_key};
use tokio::sync::broadcast;

use super::{CacheEvent, EVENT_CHANNEL_CAPACITY, KeyedQueryCache, QueryResult};
use crate::provider::{CountryRegistry, EncyclopediaService, PhotoSearchService, WeatherService};

const ALL_COUNTRIES_KEY: &str = "countries";

/// Cache lifetimes per data kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTtls {
    /// Country list and single-country lookups.
    pub countries: Duration,
    pub weather: Duration,
    pub summary: Duration,
    pub photos: Duration,
}

impl Default for QueryTtls {
    fn default() -> Self {
        Self {
            countries: Duration::from_secs(10 * 60),
            weather: Duration::from_secs(5 * 60),
            summary: Duration::from_secs(60 * 60),
            photos: Duration::from_secs(30 * 60),
        }
    }
}

impl QueryTtls {
    pub fn with_overrides(overrides: &TtlOverrides) -> Self {
        let defaults = Self::default();
        Self {
            countries: overrides.countries().unwrap_or(defaults.countries),
            weather: overrides.weather().unwrap_or(defaults.weather),
            summary: overrides.summary().unwrap_or(defaults.summary),
            photos: overrides.photos().unwrap_or(defaults.photos),
        }
    }
}

/// Session-scoped query front end: provider clients behind one cache per data kind.
///
/// All caches report to a single event channel, see [`QueryClient::subscribe`].
pub struct QueryClient {
    registry: CountryRegistry,
    weather_service: WeatherService,
    encyclopedia: EncyclopediaService,
    photo_search: PhotoSearchService,
    ttls: QueryTtls,
    countries: KeyedQueryCache<Vec<CountryEntity>>,
    entities: KeyedQueryCache<CountryEntity>,
    weather: KeyedQueryCache<WeatherSnapshot>,
    summaries: KeyedQueryCache<SummaryRecord>,
    photos: KeyedQueryCache<Vec<PhotoRecord>>,
    events: broadcast::Sender<CacheEvent>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("ttls", &self.ttls)
            .field("countries", &self.countries)
            .field("entities", &self.entities)
            .field("weather", &self.weather)
            .field("summaries", &self.summaries)
            .field("photos", &self.photos)
            .finish_non_exhaustive()
    }
}

impl QueryClient {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: Arc<ProviderEndpoints>, ttls: QueryTtls) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            registry: CountryRegistry::new(Arc::clone(&transport), Arc::clone(&endpoints)),
            weather_service: WeatherService::new(Arc::clone(&transport), Arc::clone(&endpoints)),
            encyclopedia: EncyclopediaService::new(Arc::clone(&transport), Arc::clone(&endpoints)),
            photo_search: PhotoSearchService::new(transport, endpoints),
            ttls,
            countries: KeyedQueryCache::new("countries", events.clone()),
            entities: KeyedQueryCache::new("country", events.clone()),
            weather: KeyedQueryCache::new("weather", events.clone()),
            summaries: KeyedQueryCache::new("summary", events.clone()),
            photos: KeyedQueryCache::new("photos", events.clone()),
            events,
        }
    }

    pub fn ttls(&self) -> QueryTtls {
        self.ttls
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Every country, sorted by common name.
    pub async fn all_countries(&self) -> QueryResult<Vec<CountryEntity>> {
        let registry = self.registry.clone();
        self.countries
            .get(ALL_COUNTRIES_KEY, self.ttls.countries, move || async move {
                registry.fetch_all_entities().await
            })
            .await
    }

    /// One country by display name. Lookups differing only in case or
    /// whitespace share a cache entry.
    pub async fn country(&self, name: &str) -> QueryResult<CountryEntity> {
        let registry = self.registry.clone();
        let name = name.trim().to_string();
        self.entities
            .get(&country_key(&name), self.ttls.countries, move || async move {
                registry.fetch_entity_by_name(&name).await
            })
            .await
    }

    pub async fn weather(&self, coordinates: Coordinates) -> QueryResult<WeatherSnapshot> {
        let service = self.weather_service.clone();
        self.weather
            .get(&weather_key(coordinates), self.ttls.weather, move || async move {
                service.current(coordinates).await
            })
            .await
    }

    pub async fn summary(&self, title: &str) -> QueryResult<SummaryRecord> {
        let service = self.encyclopedia.clone();
        let title = title.trim().to_string();
        self.summaries
            .get(&format!("summary:{title}"), self.ttls.summary, move || async move {
                service.summary(&title).await
            })
            .await
    }

    /// Photos for `entity`. Callers decide whether a search should happen at
    /// all; without a credential the stored result is empty.
    pub async fn photos(&self, entity: &CountryEntity, credential: Option<&str>) -> QueryResult<Vec<PhotoRecord>> {
        let service = self.photo_search.clone();
        let entity = entity.clone();
        let key = photos_key(entity.common_name(), credential);
        let credential = credential.map(str::to_string);
        self.photos
            .get(&key, self.ttls.photos, move || async move {
                service.search(&entity, credential.as_deref()).await
            })
            .await
    }

    /// Drop every stored outcome across all data kinds.
    pub fn clear(&self) {
        self.countries.clear();
        self.entities.clear();
        self.weather.clear();
        self.summaries.clear();
        self.photos.clear();
    }

    pub fn invalidate_countries(&self) {
        self.countries.invalidate(ALL_COUNTRIES_KEY);
    }

    pub fn invalidate_country(&self, name: &str) {
        self.entities.invalidate(&country_key(name));
    }
}

fn country_key(name: &str) -> String {
    format!("country:{}", normalize_subject_key(name))
}

fn weather_key(coordinates: Coordinates) -> String {
    format!("weather:{:.4},{:.4}", coordinates.latitude, coordinates.longitude)
}

/// Photo results depend on the credential, so it takes part in the key. Only
/// a fingerprint is kept; the key shows up in logs and cache events.
fn photos_key(common_name: &str, credential: Option<&str>) -> String {
    let common_name = common_name.trim();
    match credential.map(str::trim).filter(|key| !key.is_empty()) {
        Some(credential) => {
            let mut hasher = DefaultHasher::new();
            credential.hash(&mut hasher);
            format!("photos:{common_name}#{:016x}", hasher.finish())
        }
        None => format!("photos:{common_name}"),
    }
}
