use std::sync::Arc;

use atlas_types::CountryEntity;

use super::projection::{ListProjection, project};
use super::store::ParameterStore;

/// A parameter store paired with the entity set it projects over.
#[derive(Debug)]
pub struct ListView {
    store: ParameterStore,
    entities: Arc<Vec<CountryEntity>>,
}

impl ListView {
    pub fn new(store: ParameterStore, entities: Arc<Vec<CountryEntity>>) -> Self {
        Self { store, entities }
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    pub fn entities(&self) -> &[CountryEntity] {
        &self.entities
    }

    /// Swap in a newer entity set, for example after a cache refresh.
    pub fn replace_entities(&mut self, entities: Arc<Vec<CountryEntity>>) {
        self.entities = entities;
    }

    /// Project the current parameters and write back a clamped page. The
    /// returned projection always reflects the reconciled parameters.
    pub fn refresh(&self) -> ListProjection<'_> {
        let projection = project(&self.entities, &self.store.snapshot());
        if self.store.reconcile(&projection) {
            return project(&self.entities, &self.store.snapshot());
        }
        projection
    }
}
