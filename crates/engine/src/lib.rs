//! # Atlas Engine
//!
//! The Atlas engine fetches country data from several public providers,
//! caches it per session, sequences the dependent detail queries and projects
//! the country list into filtered, paginated views.
//!
//! ## Key Features
//!
//! - **Field-Reduced Fetching**: Registry requests ask for a reduced field set and fall back once
//! - **Keyed Query Cache**: Per-key TTLs with deduplication of concurrent fetches
//! - **Dependent Queries**: Weather, summary and photos start only after the country resolves
//! - **List Projection**: Region and text filtering, page clamping and a compact pagination strip
//!
//! ## Usage
//!
//! ```rust
//! use atlas_engine::listing::{ParameterStore, PageControl, project};
//! use atlas_types::CountryEntity;
//!
//! let entities: Vec<CountryEntity> = serde_json::from_str(
//!     r#"[{"name":{"common":"France"},"region":"Europe"},{"name":{"common":"Peru"},"region":"Americas"}]"#,
//! )?;
//! let store = ParameterStore::from_query_string("region=Europe&page=4");
//! let projection = project(&entities, &store.snapshot());
//! store.reconcile(&projection);
//!
//! assert_eq!(projection.items.len(), 1);
//! assert_eq!(projection.controls, vec![PageControl::Page(1)]);
//! assert_eq!(store.to_query_string(), "region=Europe");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`provider`**: Provider clients over the `HttpTransport` seam, plus a scripted transport
//! - **`cache`**: `KeyedQueryCache` and the session-scoped `QueryClient`
//! - **`detail`**: The dependent query graph behind the country detail view
//! - **`listing`**: List projection and the shareable parameter store

pub mod cache;
pub mod detail;
pub mod listing;
pub mod provider;

pub use cache::{CacheEvent, CacheEventKind, KeyedQueryCache, QueryClient, QueryResult, QueryTtls};
pub use detail::{DetailEvent, DetailOrchestrator, DetailSnapshot, NodeKind, NodeState, NodeStatus};
pub use listing::{ListProjection, ListView, PageControl, ParameterStore};
pub use provider::{CountryRegistry, EncyclopediaService, PhotoSearchService, ScriptedReply, ScriptedTransport, WeatherService};
