//! Pure template helpers that need nothing but their arguments.
//!
//! [`crate::context::TemplateContext`] wraps these with the current document
//! and configured constants; they are kept free-standing so they can be used
//! and tested without a site.

use crate::types::Document;
use chrono::{DateTime, Datelike, Utc};

/// Marker separating the excerpt from the rest of an article.
pub const READ_MORE_MARKER: &str = "<!-- Read more -->";

/// Content before the first `marker`, minus the one character that precedes
/// it (normally the newline separating the excerpt from the marker).
///
/// Returns `content` unchanged when the marker does not occur. When the
/// content starts with the marker, the cut counts from the end instead:
/// everything but the last character is returned.
pub fn excerpt<'a>(content: &'a str, marker: &str) -> &'a str {
    let kept = match content.find(marker) {
        Some(0) => content,
        Some(i) => &content[..i],
        None => return content,
    };
    match kept.char_indices().next_back() {
        Some((last, _)) => &kept[..last],
        None => "",
    }
}

pub fn has_read_more(content: &str, marker: &str) -> bool {
    content.contains(marker)
}

/// Pick the single item to feature from a collection.
///
/// The first document flagged `sticky = true` wins; without one, the first
/// document of the collection. Empty in, empty out.
pub fn sticky<'a>(collection: &[&'a Document]) -> Vec<&'a Document> {
    collection
        .iter()
        .find(|d| d.meta.sticky == Some(true))
        .or_else(|| collection.first())
        .map(|d| vec![*d])
        .unwrap_or_default()
}

/// Reorder into the even-indexed items followed by the odd-indexed items.
///
/// CSS columns fill top-to-bottom; emitting the list in this order makes the
/// cards of a two-column layout read left-to-right.
pub fn fix_order<T>(items: Vec<T>) -> Vec<T> {
    let (evens, odds): (Vec<(usize, T)>, Vec<(usize, T)>) =
        items.into_iter().enumerate().partition(|(i, _)| i % 2 == 0);
    evens
        .into_iter()
        .chain(odds)
        .map(|(_, item)| item)
        .collect()
}

/// [`fix_order`] for template-facing JSON: arrays are reordered, anything
/// else is returned untouched.
pub fn fix_order_value(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Array(items) => serde_json::Value::Array(fix_order(items)),
        other => other,
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Long-form date, e.g. `June 1st, 2021`.
pub fn human_date(date: &DateTime<Utc>) -> String {
    let day = date.day();
    format!(
        "{} {}{}, {}",
        date.format("%B"),
        day,
        ordinal_suffix(day),
        date.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ids, ymd};
    use serde_json::json;

    const MARK: &str = "<!-- MARK -->";

    #[test]
    fn excerpt_without_marker_is_identity() {
        let content = "<p>No marker here</p>";
        assert_eq!(excerpt(content, MARK), content);
        assert!(!has_read_more(content, MARK));
    }

    #[test]
    fn excerpt_drops_character_before_marker() {
        let content = "Hello world <!-- MARK --> more text";
        let i = content.find(MARK).unwrap();
        assert_eq!(excerpt(content, MARK), &content[..i - 1]);
        assert_eq!(excerpt(content, MARK), "Hello world");
        assert!(has_read_more(content, MARK));
    }

    #[test]
    fn excerpt_trims_trailing_newline() {
        let content = "<p>Intro</p>\n<!-- Read more -->\n<p>Body</p>";
        assert_eq!(excerpt(content, READ_MORE_MARKER), "<p>Intro</p>");
    }

    #[test]
    fn excerpt_uses_first_marker() {
        let content = "a\n<!-- MARK -->b\n<!-- MARK -->c";
        assert_eq!(excerpt(content, MARK), "a");
    }

    #[test]
    fn excerpt_marker_at_start_cuts_from_the_end() {
        assert_eq!(excerpt("<!-- MARK -->rest", MARK), "<!-- MARK -->res");
        assert_eq!(excerpt("<!-- MARK -->é", MARK), "<!-- MARK -->");
        assert_eq!(excerpt("<!-- MARK -->", MARK), "<!-- MARK --");
    }

    #[test]
    fn excerpt_respects_multibyte_characters() {
        assert_eq!(excerpt("café—<!-- MARK -->", MARK), "café");
    }

    #[test]
    fn sticky_prefers_first_flagged_item() {
        let docs = [
            Document::new("1").with_sticky(false),
            Document::new("2").with_sticky(true),
            Document::new("3").with_sticky(false),
            Document::new("4").with_sticky(true),
        ];
        let refs: Vec<&Document> = docs.iter().collect();
        assert_eq!(ids(&sticky(&refs)), vec!["2"]);
    }

    #[test]
    fn sticky_falls_back_to_first_item() {
        let docs = [Document::new("1"), Document::new("2")];
        let refs: Vec<&Document> = docs.iter().collect();
        assert_eq!(ids(&sticky(&refs)), vec!["1"]);
    }

    #[test]
    fn sticky_of_empty_collection_is_empty() {
        assert!(sticky(&[]).is_empty());
    }

    #[test]
    fn fix_order_interleaves_evens_then_odds() {
        assert_eq!(fix_order(vec![1, 2, 3, 4, 5]), vec![1, 3, 5, 2, 4]);
        assert_eq!(fix_order(vec![1, 2, 3, 4]), vec![1, 3, 2, 4]);
        assert_eq!(fix_order(Vec::<i32>::new()), Vec::<i32>::new());
        assert_eq!(fix_order(vec![7]), vec![7]);
    }

    #[test]
    fn fix_order_is_not_idempotent() {
        let once = fix_order(vec![1, 2, 3, 4, 5]);
        let twice = fix_order(once.clone());
        assert_eq!(twice, vec![1, 5, 4, 3, 2]);
        assert_ne!(once, twice);
    }

    #[test]
    fn fix_order_is_a_permutation() {
        let input: Vec<u32> = (0..11).collect();
        let mut output = fix_order(input.clone());
        output.sort();
        assert_eq!(output, input);
    }

    #[test]
    fn fix_order_value_passes_non_arrays_through() {
        assert_eq!(fix_order_value(json!("cards")), json!("cards"));
        assert_eq!(fix_order_value(json!(null)), json!(null));
        assert_eq!(fix_order_value(json!({"a": 1})), json!({"a": 1}));
        assert_eq!(fix_order_value(json!(["a", "b", "c"])), json!(["a", "c", "b"]));
    }

    #[test]
    fn human_date_uses_ordinals() {
        assert_eq!(human_date(&ymd(2021, 6, 1)), "June 1st, 2021");
        assert_eq!(human_date(&ymd(2021, 6, 2)), "June 2nd, 2021");
        assert_eq!(human_date(&ymd(2021, 6, 3)), "June 3rd, 2021");
        assert_eq!(human_date(&ymd(2021, 6, 4)), "June 4th, 2021");
        assert_eq!(human_date(&ymd(2020, 12, 11)), "December 11th, 2020");
        assert_eq!(human_date(&ymd(2020, 12, 12)), "December 12th, 2020");
        assert_eq!(human_date(&ymd(2020, 12, 13)), "December 13th, 2020");
        assert_eq!(human_date(&ymd(2020, 12, 22)), "December 22nd, 2020");
        assert_eq!(human_date(&ymd(2020, 12, 31)), "December 31st, 2020");
    }
}
