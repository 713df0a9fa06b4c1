//! Country list projection.
//!
//! Modules:
//! - `projection`: filtering, page clamping and the pagination control window
//! - `store`: the shareable parameter state and its clamp write-back
//! - `view`: a store paired with an entity set

mod projection;
mod store;
mod view;

pub use projection::{ListProjection, PageControl, clamp_page, filter, pagination_window, project, total_pages};
pub use store::ParameterStore;
pub use view::ListView;
