//! # Quire
//!
//! Live, declarative document collections and the derived values templates
//! need at render time.
//!
//! A content site keeps its documents (articles, presentations, specs,
//! sandbox pages) in an external store. Quire sits between that store and the
//! renderer: it organizes documents into named collections declared as
//! filter-and-sort rules, and answers the per-document questions a template
//! asks (page title, description excerpt, author links, sticky item, active
//! menu entry, column-friendly ordering).
//!
//! # Data Flow
//!
//! ```text
//! documents.json ──▶ DocumentStore ──(metadata hooks)──▶ CollectionRegistry
//!                                                          │ resolve(name)
//! site.toml ──▶ SiteConfig ──▶ Site ──▶ TemplateContext ◀──┘
//!                                       (one per rendered document)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | `Document`, typed `Metadata` with an extension map, `MetadataPatch` |
//! | [`query`] | Filter predicates: equality, `$startsWith`, `$ne`, implicit AND |
//! | [`sort`] | Stable multi-key ordering with a distinct rank for missing values |
//! | [`store`] | In-memory document store, live queries, metadata hooks |
//! | [`collections`] | Named collections compiled from configuration |
//! | [`authors`] | Author directory and profile URLs |
//! | [`helpers`] | Pure helpers: excerpt, sticky, fix-order, human dates |
//! | [`context`] | `Site` and the per-render `TemplateContext` |
//! | [`config`] | Layered `site.toml` loading, validation and environments |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## No Cached Membership
//!
//! Collections are views, not data. Resolving a collection filters and sorts
//! the store as it is at that moment; there is nothing to invalidate when a
//! document's metadata changes.
//!
//! ## Fail at Definition Time
//!
//! Collection filters and sort specs are static configuration. They are
//! compiled when the site loads, so an unknown operator or a bad sort
//! direction stops the build before any page renders.
//!
//! ## Explicit Render Context
//!
//! Templates never read a global "current document". Every derived value is a
//! method on a [`context::TemplateContext`] that borrows the site and names
//! the document being rendered, and metadata can only change through
//! `&mut Site`, between render passes.

pub mod authors;
pub mod collections;
pub mod config;
pub mod context;
pub mod helpers;
pub mod output;
pub mod query;
pub mod sort;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
