//! Author directory: static author profiles keyed by identifier.
//!
//! Loaded once from the `[authors]` table of the site configuration:
//!
//! ```toml
//! [authors.zenorocha]
//! name = "Zeno Rocha"
//! gravatar = "e190023b66e2b8aa73a842b106920c93"
//! twitter = "zenorocha"
//! gplus = "+ZenoRocha"
//! ```
//!
//! Lookups go through [`AuthorDirectory::get`], which returns
//! [`AuthorError::UnknownAuthor`] for identifiers that are not declared.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const GRAVATAR_BASE: &str = "https://2.gravatar.com/avatar/";
pub const GOOGLE_PLUS_BASE: &str = "https://plus.google.com/";
pub const TWITTER_BASE: &str = "https://twitter.com/";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthorError {
    #[error("Unknown author id: {0}")]
    UnknownAuthor(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Gravatar hash. Takes priority over `image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gplus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    /// Remaining display fields (bio, site, etc.), passed through to templates.
    #[serde(flatten)]
    pub profile: BTreeMap<String, String>,
}

impl Author {
    /// Gravatar URL when a hash is set, otherwise the plain image URL.
    pub fn image_url(&self) -> Option<String> {
        match &self.gravatar {
            Some(hash) => Some(format!("{GRAVATAR_BASE}{hash}")),
            None => self.image.clone(),
        }
    }

    pub fn google_plus_url(&self) -> Option<String> {
        self.gplus
            .as_ref()
            .map(|handle| format!("{GOOGLE_PLUS_BASE}{handle}/"))
    }

    pub fn twitter_url(&self) -> Option<String> {
        self.twitter
            .as_ref()
            .map(|handle| format!("{TWITTER_BASE}{handle}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorDirectory {
    authors: BTreeMap<String, Author>,
}

impl AuthorDirectory {
    pub fn new(authors: BTreeMap<String, Author>) -> Self {
        Self { authors }
    }

    pub fn get(&self, id: &str) -> Result<&Author, AuthorError> {
        self.authors
            .get(id)
            .ok_or_else(|| AuthorError::UnknownAuthor(id.to_string()))
    }

    pub fn insert(&mut self, id: impl Into<String>, author: Author) {
        self.authors.insert(id.into(), author);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Author)> {
        self.authors.iter().map(|(id, a)| (id.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}
