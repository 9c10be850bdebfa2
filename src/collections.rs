//! Named collections: declared once as `(predicate, sort)`, resolved on demand.
//!
//! ## Liveness
//!
//! A live collection never caches membership. Every [`CollectionRegistry::resolve`]
//! re-filters and re-sorts the store as it is at that moment, so a metadata
//! change shows up on the next resolve without re-registering anything.
//!
//! A collection declared with `live = false` is a snapshot instead: its
//! membership and order are captured by [`CollectionRegistry::freeze`] (the
//! site does this right after ingestion) and later resolves return the same
//! documents, with their current metadata, minus any that were removed.
//!
//! ## Declaration
//!
//! ```toml
//! [collections.articles]
//! filter = { url = { "$startsWith" = "/articles" }, layout = "single", isPagedAuto = { "$ne" = true } }
//! sort = [{ date = -1 }]
//! ```
//!
//! Excluding auto-generated pagination pages is just another `$ne` term on
//! `isPagedAuto`. Malformed filters or sort specs are rejected by
//! [`CollectionRegistry::define_from_config`], never at resolve time.

use crate::config::CollectionConfig;
use crate::query::{Predicate, QueryError};
use crate::sort::SortSpec;
use crate::store::DocumentStore;
use crate::types::Document;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectionError {
    #[error("Collection '{0}' is already defined")]
    Duplicate(String),
    #[error("Unknown collection: {0}")]
    Unknown(String),
    #[error("Invalid definition for collection '{name}': {source}")]
    Invalid { name: String, source: QueryError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub name: String,
    pub predicate: Predicate,
    pub sort: SortSpec,
    pub live: bool,
    snapshot: Option<Vec<String>>,
}

impl Collection {
    fn resolve<'s>(&self, store: &'s DocumentStore) -> Vec<&'s Document> {
        match (&self.snapshot, self.live) {
            (Some(ids), false) => ids.iter().filter_map(|id| store.get(id)).collect(),
            _ => store.find_all_live(&self.predicate, &self.sort),
        }
    }
}

/// Collections in definition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionRegistry {
    collections: Vec<Collection>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live collection.
    pub fn define(
        &mut self,
        name: &str,
        predicate: Predicate,
        sort: SortSpec,
    ) -> Result<(), CollectionError> {
        self.insert(name, predicate, sort, true)
    }

    /// Register a snapshot collection; see [`CollectionRegistry::freeze`].
    pub fn define_snapshot(
        &mut self,
        name: &str,
        predicate: Predicate,
        sort: SortSpec,
    ) -> Result<(), CollectionError> {
        self.insert(name, predicate, sort, false)
    }

    fn insert(
        &mut self,
        name: &str,
        predicate: Predicate,
        sort: SortSpec,
        live: bool,
    ) -> Result<(), CollectionError> {
        if self.get(name).is_some() {
            return Err(CollectionError::Duplicate(name.to_string()));
        }
        self.collections.push(Collection {
            name: name.to_string(),
            predicate,
            sort,
            live,
            snapshot: None,
        });
        Ok(())
    }

    /// Compile and register a declarative collection.
    pub fn define_from_config(
        &mut self,
        name: &str,
        config: &CollectionConfig,
    ) -> Result<(), CollectionError> {
        let invalid = |source| CollectionError::Invalid {
            name: name.to_string(),
            source,
        };
        let predicate = Predicate::from_spec(&config.filter).map_err(invalid)?;
        let sort = SortSpec::from_spec(&config.sort).map_err(invalid)?;
        self.insert(name, predicate, sort, config.live)
    }

    pub fn from_config(
        collections: &BTreeMap<String, CollectionConfig>,
    ) -> Result<Self, CollectionError> {
        let mut registry = Self::new();
        for (name, config) in collections {
            registry.define_from_config(name, config)?;
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Capture current membership for every snapshot collection.
    pub fn freeze(&mut self, store: &DocumentStore) {
        for collection in self.collections.iter_mut().filter(|c| !c.live) {
            let ids = store
                .find_all_live(&collection.predicate, &collection.sort)
                .into_iter()
                .map(|d| d.id.clone())
                .collect();
            collection.snapshot = Some(ids);
        }
    }

    /// Documents of collection `name` as of now.
    pub fn resolve<'s>(
        &self,
        name: &str,
        store: &'s DocumentStore,
    ) -> Result<Vec<&'s Document>, CollectionError> {
        self.get(name)
            .map(|c| c.resolve(store))
            .ok_or_else(|| CollectionError::Unknown(name.to_string()))
    }
}
