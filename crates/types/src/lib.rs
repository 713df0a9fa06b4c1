//! Shared type definitions for Atlas.
//!
//! - `country`: registry records and the weather coordinate policy
//! - `weather`, `summary`, `photo`: secondary provider payloads
//! - `params`: shareable list-view parameters and the region enumeration
//! - `provider`: provider identities and their connection defaults
//! - `error`: the error taxonomy used across the workspace

pub mod country;
pub mod error;
pub mod params;
pub mod photo;
pub mod provider;
pub mod summary;
pub mod weather;

pub use country::{CapitalInfo, Coordinates, CountryEntity, CountryName, Currency, DETAIL_FIELDS, Flags, LIST_FIELDS};
pub use error::AtlasError;
pub use params::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, ListParameters, ParseRegionError, Region};
pub use photo::{MAX_PHOTOS, PhotoAuthor, PhotoLinks, PhotoRecord, PhotoSearchPage, PhotoUrls};
pub use provider::{ParseProviderIdError, ProviderId, ToProviderInfo};
pub use summary::{ContentUrls, PageLink, SummaryRecord, Thumbnail};
pub use weather::{CURRENT_METRICS, WeatherSnapshot, describe_weather_code};
