//! CLI output formatting.
//!
//! # Entity Display Contract
//!
//! Every entity follows the same two-level pattern:
//!
//! 1. **Header line**: positional index + title (+ optional count)
//! 2. **Context lines**: indented `URL:`, `Date:`, `Source:` and the like
//!
//! # Output Format
//!
//! ## Collections
//!
//! ```text
//! Collections
//! 001 articles (3 documents)
//!     001 Shadow DOM 101
//!         URL: /articles/shadow-dom-101
//!         Date: 2021-06-01
//!     002 (articles/untitled.html.md)
//!         URL: /articles/untitled
//! 002 specs (empty)
//! ```
//!
//! ## Feeds
//!
//! ```text
//! Feeds
//! 001 articles → /articles.xml
//!     Collection: articles (3 documents)
//!     Page: Articles
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::context::Site;
use crate::types::Document;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Collection header: index, name and member count.
fn collection_header(index: usize, name: &str, count: usize) -> String {
    match count {
        0 => format!("{} {} (empty)", format_index(index), name),
        1 => format!("{} {} (1 document)", format_index(index), name),
        n => format!("{} {} ({} documents)", format_index(index), name, n),
    }
}

/// Titled documents show their title; untitled ones show the id in parens.
fn document_line(index: usize, document: &Document) -> String {
    match document.title() {
        Some(t) if !t.is_empty() => format!("{} {}", format_index(index), t),
        _ => format!("{} ({})", format_index(index), document.id),
    }
}

fn document_lines(depth: usize, documents: &[&Document]) -> Vec<String> {
    let mut lines = Vec::new();
    let base = indent(depth);
    for (i, doc) in documents.iter().enumerate() {
        lines.push(format!("{}{}", base, document_line(i + 1, doc)));
        if !doc.meta.url.is_empty() {
            lines.push(format!("{}    URL: {}", base, doc.meta.url));
        }
        if let Some(date) = doc.meta.date {
            lines.push(format!("{}    Date: {}", base, date.format("%Y-%m-%d")));
        }
        if doc.meta.sticky == Some(true) {
            lines.push(format!("{}    Sticky", base));
        }
    }
    lines
}

// ============================================================================
// Collections
// ============================================================================

/// Every registered collection with its current members.
pub fn format_collections_output(site: &Site) -> Vec<String> {
    let mut lines = vec!["Collections".to_string()];
    for (i, name) in site.registry().names().enumerate() {
        let members = site.collection(name).unwrap_or_default();
        lines.push(collection_header(i + 1, name, members.len()));
        lines.extend(document_lines(1, &members));
    }
    lines
}

/// One collection's members, without the section header.
pub fn format_collection_output(name: &str, members: &[&Document]) -> Vec<String> {
    let mut lines = vec![collection_header(1, name, members.len())];
    lines.extend(document_lines(1, members));
    lines
}

// ============================================================================
// Feeds
// ============================================================================

pub fn format_feeds_output(site: &Site) -> Vec<String> {
    let mut lines = vec!["Feeds".to_string()];
    for (i, (name, feed)) in site.feeds().iter().enumerate() {
        lines.push(format!("{} {} → {}", format_index(i + 1), name, feed.url));
        let count = site.collection(&feed.collection).map(|c| c.len()).unwrap_or(0);
        lines.push(format!(
            "    Collection: {} ({} documents)",
            feed.collection, count
        ));
        if let Some(page) = &feed.page_title {
            lines.push(format!("    Page: {}", page));
        }
    }
    lines
}

// ============================================================================
// Check / render
// ============================================================================

pub fn format_check_output(site: &Site) -> Vec<String> {
    vec![
        format!("Documents: {}", site.store().len()),
        format!("Collections: {}", site.registry().len()),
        format!("Authors: {}", site.authors().len()),
        format!("Feeds: {}", site.feeds().len()),
    ]
}

/// One line per document whose render was skipped.
pub fn format_render_failure(id: &str, error: &dyn std::error::Error) -> String {
    format!("Skipped {}: {}", id, error)
}

pub fn print_collections_output(site: &Site) {
    for line in format_collections_output(site) {
        println!("{}", line);
    }
}

pub fn print_collection_output(name: &str, members: &[&Document]) {
    for line in format_collection_output(name, members) {
        println!("{}", line);
    }
}

pub fn print_feeds_output(site: &Site) {
    for line in format_feeds_output(site) {
        println!("{}", line);
    }
}

pub fn print_check_output(site: &Site) {
    for line in format_check_output(site) {
        println!("{}", line);
    }
}
