//! Shared document types.
//!
//! A [`Document`] is owned by the external document store and is read-only to
//! everything in this crate except the store's metadata hooks. Metadata is a
//! typed record with a known field set plus an `extra` extension map for
//! arbitrary keys, so predicates and sort keys resolve through
//! [`Metadata::field`] instead of dynamic property access.
//!
//! ## Field Names
//!
//! Field names follow the content store's camelCase convention:
//!
//! | Name | Type |
//! |------|------|
//! | `id` | text (the source path) |
//! | `title` | optional text |
//! | `date` | optional timestamp |
//! | `order` | optional number |
//! | `sticky` | optional boolean |
//! | `tag` | optional text |
//! | `layout` | text |
//! | `url` | text |
//! | `relativeDirPath` | text |
//! | `isPagedAuto` | optional boolean |
//!
//! Any other name is looked up in [`Metadata::extra`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A metadata value.
///
/// Deserialization is untagged: booleans, numbers and strings map to the
/// obvious variants. Strings are never promoted to [`FieldValue::Date`] on
/// input; dates only come from the typed `date` field or from Rust callers.
///
/// Arrays (e.g. a `tags` list) and `null` are carried so an export with such
/// keys still loads, but they never satisfy a constraint: [`Metadata::field`]
/// reports a `null` key as absent, and a list matches nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Date(DateTime<Utc>),
    List(Vec<FieldValue>),
    Null,
}

impl FieldValue {
    /// Rank used to order values of different kinds against each other.
    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Number(_) => 2,
            FieldValue::Date(_) => 3,
            FieldValue::Text(_) => 4,
            FieldValue::List(_) => 5,
        }
    }

    /// Total order over present values.
    ///
    /// Values of the same kind compare naturally (text lexicographically,
    /// numbers via `total_cmp`, `false < true`, lists element by element).
    /// Values of different kinds, a date against text included, compare by
    /// kind rank only.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            (FieldValue::List(a), FieldValue::List(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.compare(y))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Equality as used by `field = value` and `$ne` constraints.
    ///
    /// A date matches text that parses to the same instant, so
    /// `date = "2021-06-01"` works from configuration. Lists and `null`
    /// match nothing.
    pub fn matches(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::List(_) | FieldValue::Null, _)
            | (_, FieldValue::List(_) | FieldValue::Null) => false,
            (FieldValue::Number(a), FieldValue::Number(b)) => a == b,
            (FieldValue::Date(a), FieldValue::Text(b))
            | (FieldValue::Text(b), FieldValue::Date(a)) => parse_date(b).is_some_and(|b| *a == b),
            _ => self == other,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value)
    }
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

mod flexible_date {
    use super::parse_date;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(
        date: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_some(&d.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            parse_date(&s).ok_or_else(|| {
                de::Error::custom(format!(
                    "invalid date '{s}', expected YYYY-MM-DD or RFC 3339"
                ))
            })
        })
        .transpose()
    }
}

/// Document metadata: the known field set plus an extension map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, with = "flexible_date", skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticky: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub relative_dir_path: String,
    /// Set on machine-generated pagination pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paged_auto: Option<bool>,
    /// Arbitrary keys not covered by the typed fields (e.g. `author`).
    #[serde(flatten)]
    pub extra: BTreeMap<String, FieldValue>,
}

impl Metadata {
    /// Look up a field by name. Absent optional fields return `None`.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "title" => self.title.clone().map(FieldValue::Text),
            "date" => self.date.map(FieldValue::Date),
            "order" => self.order.map(FieldValue::Number),
            "sticky" => self.sticky.map(FieldValue::Bool),
            "tag" => self.tag.clone().map(FieldValue::Text),
            "layout" => Some(FieldValue::Text(self.layout.clone())),
            "url" => Some(FieldValue::Text(self.url.clone())),
            "relativeDirPath" => Some(FieldValue::Text(self.relative_dir_path.clone())),
            "isPagedAuto" => self.is_paged_auto.map(FieldValue::Bool),
            other => self
                .extra
                .get(other)
                .filter(|v| **v != FieldValue::Null)
                .cloned(),
        }
    }

    /// Text value of an extension field, if present and textual.
    pub fn extra_text(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(FieldValue::as_text)
    }
}

/// A content document as materialized by the external store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Source path, unique within a store.
    pub id: String,
    #[serde(flatten)]
    pub meta: Metadata,
    /// Fully rendered body, before layouts are applied.
    #[serde(default)]
    pub content_rendered_without_layouts: String,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            meta: Metadata::default(),
            content_rendered_without_layouts: String::new(),
        }
    }

    /// Field lookup including the document `id`.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(FieldValue::Text(self.id.clone())),
            other => self.meta.field(other),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.title.as_deref()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.meta.title = Some(title.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.meta.url = url.into();
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.meta.layout = layout.into();
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.meta.date = Some(date);
        self
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.meta.order = Some(order);
        self
    }

    pub fn with_sticky(mut self, sticky: bool) -> Self {
        self.meta.sticky = Some(sticky);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.meta.tag = Some(tag.into());
        self
    }

    pub fn with_dir(mut self, relative_dir_path: impl Into<String>) -> Self {
        self.meta.relative_dir_path = relative_dir_path.into();
        self
    }

    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.meta.extra.insert(name.into(), value.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content_rendered_without_layouts = content.into();
        self
    }
}

/// A sparse metadata update. `None` fields leave the document untouched;
/// `extra` entries are inserted or overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct MetadataPatch {
    pub title: Option<String>,
    #[serde(with = "flexible_date")]
    pub date: Option<DateTime<Utc>>,
    pub order: Option<f64>,
    pub sticky: Option<bool>,
    pub tag: Option<String>,
    pub layout: Option<String>,
    pub url: Option<String>,
    pub relative_dir_path: Option<String>,
    pub is_paged_auto: Option<bool>,
    pub extra: BTreeMap<String, FieldValue>,
}

impl MetadataPatch {
    /// A patch that only assigns a rendering layout.
    pub fn layout(layout: impl Into<String>) -> Self {
        Self {
            layout: Some(layout.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, meta: &mut Metadata) {
        if let Some(title) = &self.title {
            meta.title = Some(title.clone());
        }
        if let Some(date) = self.date {
            meta.date = Some(date);
        }
        if let Some(order) = self.order {
            meta.order = Some(order);
        }
        if let Some(sticky) = self.sticky {
            meta.sticky = Some(sticky);
        }
        if let Some(tag) = &self.tag {
            meta.tag = Some(tag.clone());
        }
        if let Some(layout) = &self.layout {
            meta.layout = layout.clone();
        }
        if let Some(url) = &self.url {
            meta.url = url.clone();
        }
        if let Some(dir) = &self.relative_dir_path {
            meta.relative_dir_path = dir.clone();
        }
        if let Some(paged) = self.is_paged_auto {
            meta.is_paged_auto = Some(paged);
        }
        for (key, value) in &self.extra {
            meta.extra.insert(key.clone(), value.clone());
        }
    }
}
