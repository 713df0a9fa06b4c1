use atlas_types::{DEFAULT_PAGE, ListParameters, Region};
use tokio::sync::watch;
use tracing::debug;

use super::projection::ListProjection;

/// Canonical holder of the shareable list parameters.
///
/// Every mutation that actually changes the parameters notifies subscribers;
/// setting a value to what it already is does not.
#[derive(Debug)]
pub struct ParameterStore {
    state: watch::Sender<ListParameters>,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(ListParameters::default())
    }
}

impl ParameterStore {
    pub fn new(initial: ListParameters) -> Self {
        let (state, _) = watch::channel(initial);
        Self { state }
    }

    pub fn from_query_string(raw: &str) -> Self {
        Self::new(ListParameters::from_query_string(raw))
    }

    pub fn snapshot(&self) -> ListParameters {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListParameters> {
        self.state.subscribe()
    }

    pub fn to_query_string(&self) -> String {
        self.state.borrow().to_query_string()
    }

    /// Replace the query text and return to the first page.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.update(|parameters| {
            parameters.query = query;
            parameters.page = DEFAULT_PAGE;
        });
    }

    /// Replace the region filter and return to the first page.
    pub fn set_region(&self, region: Region) {
        self.update(|parameters| {
            parameters.region = region;
            parameters.page = DEFAULT_PAGE;
        });
    }

    /// Change the page size and return to the first page. Zero is ignored.
    pub fn set_page_size(&self, page_size: usize) {
        if page_size == 0 {
            return;
        }
        self.update(|parameters| {
            parameters.page_size = page_size;
            parameters.page = DEFAULT_PAGE;
        });
    }

    /// Change only the page. Zero is treated as the first page.
    pub fn set_page(&self, page: usize) {
        self.update(|parameters| parameters.page = page.max(DEFAULT_PAGE));
    }

    pub fn next_page(&self) {
        self.update(|parameters| parameters.page = parameters.page.saturating_add(1));
    }

    pub fn previous_page(&self) {
        self.update(|parameters| parameters.page = parameters.page.saturating_sub(1).max(DEFAULT_PAGE));
    }

    /// Write the clamped page of `projection` back into the store.
    ///
    /// Applies only when the projection was computed from the parameters the
    /// store currently holds; a projection of older parameters is ignored.
    /// Returns whether the stored page changed.
    pub fn reconcile(&self, projection: &ListProjection<'_>) -> bool {
        self.state.send_if_modified(|parameters| {
            if *parameters != projection.parameters || parameters.page == projection.page {
                return false;
            }
            debug!(requested = parameters.page, clamped = projection.page, "page out of range; clamping");
            parameters.page = projection.page;
            true
        })
    }

    fn update(&self, mutate: impl FnOnce(&mut ListParameters)) {
        self.state.send_if_modified(|parameters| {
            let before = parameters.clone();
            mutate(parameters);
            *parameters != before
        });
    }
}
