//! In-memory document store.
//!
//! Holds the materialized documents handed over by the external content
//! pipeline and answers the two queries everything else is built on:
//!
//! - [`DocumentStore::find_all_live`]: filter + stable sort, recomputed on
//!   every call against current metadata.
//! - [`DocumentStore::find_one`]: first match in store order.
//!
//! ## Metadata Hooks
//!
//! A [`MetadataHook`] is a pure `Document -> Option<MetadataPatch>` function
//! registered on the store. Hooks run exactly once per document, at insertion,
//! in registration order. Because [`DocumentStore::find_all_live`] borrows the
//! store immutably and every mutation needs `&mut self`, no hook or
//! [`DocumentStore::set_meta`] call can interleave with a resolve that is in
//! progress.
//!
//! Store order is insertion order. It is the order [`DocumentStore::find_one`]
//! scans and the tie-break order for every sort.

use crate::query::Predicate;
use crate::sort::SortSpec;
use crate::types::{Document, MetadataPatch};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Document JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate document id: {0}")]
    DuplicateId(String),
    #[error("Unknown document id: {0}")]
    UnknownDocument(String),
}

/// A metadata transformation applied to each document as it enters the store.
pub trait MetadataHook {
    fn patch(&self, document: &Document) -> Option<MetadataPatch>;
}

impl<F> MetadataHook for F
where
    F: Fn(&Document) -> Option<MetadataPatch>,
{
    fn patch(&self, document: &Document) -> Option<MetadataPatch> {
        self(document)
    }
}

/// Assigns the tag-page layout to every document that carries a `tag`.
#[derive(Debug, Clone, PartialEq)]
pub struct TagLayoutHook {
    layout: String,
}

impl TagLayoutHook {
    pub fn new(layout: impl Into<String>) -> Self {
        Self {
            layout: layout.into(),
        }
    }
}

impl MetadataHook for TagLayoutHook {
    fn patch(&self, document: &Document) -> Option<MetadataPatch> {
        document
            .meta
            .tag
            .as_ref()
            .map(|_| MetadataPatch::layout(self.layout.clone()))
    }
}

#[derive(Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
    hooks: Vec<Box<dyn MetadataHook>>,
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("documents", &self.documents)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook. Only documents inserted afterwards are affected.
    pub fn add_hook(&mut self, hook: impl MetadataHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn with_hook(mut self, hook: impl MetadataHook + 'static) -> Self {
        self.add_hook(hook);
        self
    }

    /// Insert a document at the end of store order, running every hook on it.
    pub fn insert(&mut self, mut document: Document) -> Result<(), StoreError> {
        if self.get(&document.id).is_some() {
            return Err(StoreError::DuplicateId(document.id));
        }
        for hook in &self.hooks {
            if let Some(patch) = hook.patch(&document) {
                patch.apply_to(&mut document.meta);
            }
        }
        self.documents.push(document);
        Ok(())
    }

    pub fn extend(
        &mut self,
        documents: impl IntoIterator<Item = Document>,
    ) -> Result<(), StoreError> {
        for document in documents {
            self.insert(document)?;
        }
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Option<Document> {
        let pos = self.documents.iter().position(|d| d.id == id)?;
        Some(self.documents.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.documents.iter()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Merge a metadata patch into an existing document.
    pub fn set_meta(&mut self, id: &str, patch: &MetadataPatch) -> Result<(), StoreError> {
        let document = self
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::UnknownDocument(id.to_string()))?;
        patch.apply_to(&mut document.meta);
        Ok(())
    }

    /// All documents currently matching `predicate`, ordered by `sort`.
    pub fn find_all_live(&self, predicate: &Predicate, sort: &SortSpec) -> Vec<&Document> {
        let mut matches: Vec<&Document> =
            self.documents.iter().filter(|d| predicate.matches(d)).collect();
        sort.sort(&mut matches);
        matches
    }

    /// First document in store order matching `predicate`.
    pub fn find_one(&self, predicate: &Predicate) -> Option<&Document> {
        self.documents.iter().find(|d| predicate.matches(d))
    }
}

/// Parse the store's JSON export: an array of document objects.
pub fn parse_documents(json: &str) -> Result<Vec<Document>, StoreError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_documents(path: &Path) -> Result<Vec<Document>, StoreError> {
    let content = fs::read_to_string(path)?;
    parse_documents(&content)
}
