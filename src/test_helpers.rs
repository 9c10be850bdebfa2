//! Shared test utilities for the quire test suite.
//!
//! Date constructors and extractors that keep assertions about ordered
//! document lists short:
//!
//! ```text
//! let articles = registry.resolve("articles", &store).unwrap();
//! assert_eq!(ids(&articles), vec!["b", "a", "c"]);
//! ```

use chrono::{DateTime, NaiveDate, Utc};

use crate::types::Document;

/// Midnight UTC on the given day. Panics on an invalid date.
pub fn ymd(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_else(|| panic!("invalid test date {year}-{month}-{day}"))
        .and_utc()
}

/// Document ids in order.
pub fn ids<'a>(documents: &[&'a Document]) -> Vec<&'a str> {
    documents.iter().map(|d| d.id.as_str()).collect()
}
