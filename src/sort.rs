//! Multi-key, stable document ordering.
//!
//! A [`SortSpec`] is an ordered list of `(field, direction)` keys. Documents
//! compare on the first key, fall through to the next on a tie, and keep
//! their input order when every key ties. Declaratively a spec is written the
//! way the content store expects it:
//!
//! ```toml
//! sort = [{ date = -1 }, { title = 1 }]
//! ```
//!
//! ## Missing Values
//!
//! An absent field is its own rank, strictly below every present value, and
//! the direction reverses the whole comparison. Ascending therefore puts
//! undated documents first and descending puts them last.

use crate::query::QueryError;
use crate::types::{Document, FieldValue};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// Parse the store's `1` / `-1` notation.
    pub fn from_number(field: &str, n: i64) -> Result<Self, QueryError> {
        match n {
            1 => Ok(Direction::Ascending),
            -1 => Ok(Direction::Descending),
            other => Err(QueryError::InvalidDirection {
                field: field.to_string(),
                direction: other,
            }),
        }
    }

    pub fn as_number(self) -> i64 {
        match self {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

/// Compare two optional field values, with `None` ranked below everything.
pub fn compare_values(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.compare(b),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// An empty spec keeps input order.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by(mut self, field: &str, direction: Direction) -> Self {
        self.keys.push(SortKey {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn ascending(self, field: &str) -> Self {
        self.by(field, Direction::Ascending)
    }

    pub fn descending(self, field: &str) -> Self {
        self.by(field, Direction::Descending)
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Compile the declarative `[{ field = 1 | -1 }, ...]` form.
    ///
    /// Each entry must name exactly one field.
    pub fn from_spec(raw: &[BTreeMap<String, i64>]) -> Result<Self, QueryError> {
        let mut spec = SortSpec::new();
        for (index, entry) in raw.iter().enumerate() {
            let mut fields = entry.iter();
            match (fields.next(), fields.next()) {
                (Some((field, &n)), None) => {
                    let direction = Direction::from_number(field, n)?;
                    spec = spec.by(field, direction);
                }
                _ => {
                    return Err(QueryError::MalformedSortKey {
                        index,
                        count: entry.len(),
                    });
                }
            }
        }
        Ok(spec)
    }

    /// Inverse of [`SortSpec::from_spec`].
    pub fn to_spec(&self) -> Vec<BTreeMap<String, i64>> {
        self.keys
            .iter()
            .map(|k| BTreeMap::from([(k.field.clone(), k.direction.as_number())]))
            .collect()
    }

    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for key in &self.keys {
            let ordering = compare_values(
                a.field(&key.field).as_ref(),
                b.field(&key.field).as_ref(),
            );
            if ordering != Ordering::Equal {
                return key.direction.apply(ordering);
            }
        }
        Ordering::Equal
    }

    /// Stable sort in place.
    ///
    /// Field values are extracted once per document rather than once per
    /// comparison.
    pub fn sort(&self, documents: &mut Vec<&Document>) {
        if self.keys.is_empty() {
            return;
        }
        let mut decorated: Vec<(Vec<Option<FieldValue>>, &Document)> = documents
            .drain(..)
            .map(|doc| {
                let values = self.keys.iter().map(|k| doc.field(&k.field)).collect();
                (values, doc)
            })
            .collect();

        // `sort_by` is stable, which the tie-preservation contract relies on.
        decorated.sort_by(|(a, _), (b, _)| {
            for (key, (va, vb)) in self.keys.iter().zip(a.iter().zip(b.iter())) {
                let ordering = compare_values(va.as_ref(), vb.as_ref());
                if ordering != Ordering::Equal {
                    return key.direction.apply(ordering);
                }
            }
            Ordering::Equal
        });

        documents.extend(decorated.into_iter().map(|(_, doc)| doc));
    }
}
