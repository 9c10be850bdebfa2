//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Configuration is
//! layered: stock defaults are overridden by the site file, which is in turn
//! overridden by the selected environment's overlay.
//!
//! ```text
//! stock defaults                  ← the WebComponents.org site, built in
//! site.toml                       ← overrides stock defaults
//! [environments.development]      ← overrides site.toml when --env development
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "WebComponents.org"
//! description = "A place to discuss and evolve Web Component best-practices"
//! url = "http://webcomponents.org"
//!
//! [github]
//! user = "webcomponents"
//! repo = "webcomponents.github.io"
//! edit_path = "edit/site/src/documents"
//!
//! [content]
//! read_more_marker = "<!-- Read more -->"
//! title_separator = " — "
//!
//! [tags]
//! extension = ".html"
//! layout = "tags"
//!
//! [authors.zenorocha]
//! name = "Zeno Rocha"
//! gravatar = "..."
//!
//! [collections.articles]
//! filter = { url = { "$startsWith" = "/articles" }, layout = "single", isPagedAuto = { "$ne" = true } }
//! sort = [{ date = -1 }]
//!
//! [feeds.articles]
//! collection = "articles"
//! url = "/articles.xml"
//! page_title = "Articles"
//!
//! [environments.development.site]
//! url = "http://localhost:9778"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [site]
//! title = "My Components"
//! ```
//!
//! Tables merge key by key, so a file can also add a filter term to a stock
//! collection. Arrays (such as `sort`) replace the stock value wholesale.
//! Unknown keys are rejected to catch typos early.

use crate::authors::AuthorDirectory;
use crate::collections::{CollectionError, CollectionRegistry};
use crate::helpers::READ_MORE_MARKER;
use crate::query::ConstraintSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Unknown environment '{0}' (declare it under [environments.{0}])")]
    UnknownEnvironment(String),
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),
}

/// Site configuration loaded from `site.toml`.
///
/// All fields have defaults that reproduce the stock site. User config files
/// need only specify the values they want to override. Unknown keys are
/// rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site constants exposed to every template.
    pub site: SiteConstants,
    /// Repository used for "view source" and "edit this page" links.
    pub github: GithubConfig,
    /// Excerpt marker and title composition.
    pub content: ContentConfig,
    /// Tag page generation settings.
    pub tags: TagsConfig,
    /// Author profiles keyed by identifier.
    pub authors: AuthorDirectory,
    /// Named collections, compiled at load time.
    pub collections: BTreeMap<String, CollectionConfig>,
    /// Feed descriptions for the feed generator.
    pub feeds: BTreeMap<String, FeedConfig>,
    /// Sparse overlays selected with `--env`.
    pub environments: BTreeMap<String, toml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteConstants::default(),
            github: GithubConfig::default(),
            content: ContentConfig::default(),
            tags: TagsConfig::default(),
            authors: AuthorDirectory::default(),
            collections: default_collections(),
            feeds: default_feeds(),
            environments: default_environments(),
        }
    }
}

impl SiteConfig {
    /// Validate values and compile every collection.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.title must not be empty".into(),
            ));
        }
        if self.content.read_more_marker.is_empty() {
            return Err(ConfigError::Validation(
                "content.read_more_marker must not be empty".into(),
            ));
        }
        if self.github.user.is_empty() || self.github.repo.is_empty() {
            return Err(ConfigError::Validation(
                "github.user and github.repo must not be empty".into(),
            ));
        }
        for (name, feed) in &self.feeds {
            if !self.collections.contains_key(&feed.collection) {
                return Err(ConfigError::Validation(format!(
                    "feeds.{name}.collection refers to unknown collection '{}'",
                    feed.collection
                )));
            }
            if !feed.url.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "feeds.{name}.url must start with '/'"
                )));
            }
        }
        CollectionRegistry::from_config(&self.collections)?;
        Ok(())
    }
}

/// Constants every template sees as `site.*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConstants {
    pub title: String,
    pub description: String,
    /// Absolute base URL; environments typically override this.
    pub url: String,
}

impl Default for SiteConstants {
    fn default() -> Self {
        Self {
            title: "WebComponents.org".to_string(),
            description: "A place to discuss and evolve Web Component best-practices"
                .to_string(),
            url: "http://webcomponents.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubConfig {
    pub user: String,
    pub repo: String,
    /// Path segment between the repository URL and a document's source path.
    pub edit_path: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            user: "webcomponents".to_string(),
            repo: "webcomponents.github.io".to_string(),
            edit_path: "edit/site/src/documents".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Token separating an article's excerpt from the rest of its body.
    pub read_more_marker: String,
    /// Placed between a document title and the site title.
    pub title_separator: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            read_more_marker: READ_MORE_MARKER.to_string(),
            title_separator: " — ".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagsConfig {
    /// Output extension of generated tag pages.
    pub extension: String,
    /// Layout assigned to every tag document on ingestion.
    pub layout: String,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            extension: ".html".to_string(),
            layout: "tags".to_string(),
        }
    }
}

/// Declarative collection: filter terms, sort keys, liveness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    #[serde(default)]
    pub filter: BTreeMap<String, ConstraintSpec>,
    #[serde(default)]
    pub sort: Vec<BTreeMap<String, i64>>,
    #[serde(default = "default_live")]
    pub live: bool,
}

fn default_live() -> bool {
    true
}

impl CollectionConfig {
    /// Documents under `prefix`, sorted by one key.
    fn under(prefix: &str, sort_field: &str, direction: i64) -> Self {
        Self {
            filter: BTreeMap::from([("url".to_string(), ConstraintSpec::starts_with(prefix))]),
            sort: vec![BTreeMap::from([(sort_field.to_string(), direction)])],
            live: true,
        }
    }

    fn with_term(mut self, field: &str, constraint: ConstraintSpec) -> Self {
        self.filter.insert(field.to_string(), constraint);
        self
    }
}

/// A feed the external generator should write for a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    pub collection: String,
    /// Output path, e.g. `/articles.xml`.
    pub url: String,
    /// Title of the listing page that advertises this feed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
}

fn default_collections() -> BTreeMap<String, CollectionConfig> {
    let dated_singles = |prefix| {
        CollectionConfig::under(prefix, "date", -1)
            .with_term("layout", ConstraintSpec::equal("single"))
            .with_term("isPagedAuto", ConstraintSpec::not_equal(true))
    };
    BTreeMap::from([
        ("articles".to_string(), dated_singles("/articles")),
        (
            "browserSupport".to_string(),
            CollectionConfig::under("/browser-support", "order", 1),
        ),
        (
            "discover".to_string(),
            CollectionConfig::under("/discover", "title", 1),
        ),
        (
            "libraries".to_string(),
            CollectionConfig::under("/libraries", "title", 1),
        ),
        ("presentations".to_string(), dated_singles("/presentations")),
        (
            "sandbox".to_string(),
            CollectionConfig::under("/sandbox", "title", 1)
                .with_term("layout", ConstraintSpec::equal("page")),
        ),
        (
            "specs".to_string(),
            CollectionConfig::under("/specs", "order", 1),
        ),
    ])
}

fn default_feeds() -> BTreeMap<String, FeedConfig> {
    BTreeMap::from([
        (
            "articles".to_string(),
            FeedConfig {
                collection: "articles".to_string(),
                url: "/articles.xml".to_string(),
                page_title: Some("Articles".to_string()),
            },
        ),
        (
            "presentations".to_string(),
            FeedConfig {
                collection: "presentations".to_string(),
                url: "/presentations.xml".to_string(),
                page_title: Some("Presentations".to_string()),
            },
        ),
    ])
}

fn default_environments() -> BTreeMap<String, toml::Value> {
    let mut site = toml::Table::new();
    site.insert(
        "url".to_string(),
        toml::Value::String("http://localhost:9778".to_string()),
    );
    let mut development = toml::Table::new();
    development.insert("site".to_string(), toml::Value::Table(site));
    BTreeMap::from([("development".to_string(), toml::Value::Table(development))])
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, apply the selected
/// environment, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
    environment: Option<&str>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.clone().try_into()?;
    let config = match environment {
        Some(env) => {
            let env_overlay = config
                .environments
                .get(env)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownEnvironment(env.to_string()))?;
            merge_toml(merged, env_overlay).try_into()?
        }
        None => config,
    };
    config.validate()?;
    Ok(config)
}

/// Load config from `path`.
///
/// Merges user values on top of stock defaults, applies `environment`,
/// rejects unknown keys, and validates the result. A missing file yields the
/// stock configuration.
pub fn load_config(path: &Path, environment: Option<&str>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay, environment)
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Quire Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Layers, later wins:
#   built-in defaults -> this file -> [environments.<name>] (with --env <name>)
#
# Tables merge key by key; arrays replace. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site constants (available to templates as site.*)
# ---------------------------------------------------------------------------
[site]
title = "WebComponents.org"
description = "A place to discuss and evolve Web Component best-practices"
url = "http://webcomponents.org"

# ---------------------------------------------------------------------------
# GitHub repository for source and edit links
# ---------------------------------------------------------------------------
[github]
user = "webcomponents"
repo = "webcomponents.github.io"
# Edit URL = https://github.com/<user>/<repo>/<edit_path>/<document id>
edit_path = "edit/site/src/documents"

# ---------------------------------------------------------------------------
# Content helpers
# ---------------------------------------------------------------------------
[content]
# Everything before this token is the article excerpt / page description.
read_more_marker = "<!-- Read more -->"

# Page title = "<document title><title_separator><site title>"
title_separator = " — "

# ---------------------------------------------------------------------------
# Tag pages
# ---------------------------------------------------------------------------
[tags]
extension = ".html"
# Layout assigned to every document carrying a `tag` when it is loaded.
layout = "tags"

# ---------------------------------------------------------------------------
# Authors (referenced from documents by id)
# ---------------------------------------------------------------------------
# [authors.zenorocha]
# name = "Zeno Rocha"
# gravatar = "<hash>"            # wins over `image` when both are set
# image = "https://..."
# twitter = "zenorocha"
# gplus = "+ZenoRocha"

# ---------------------------------------------------------------------------
# Collections
# ---------------------------------------------------------------------------
# filter: field = value             equality
#         field = { "$startsWith" = "..." }
#         field = { "$ne" = value }  absent counts as "not equal"
# sort:   [{ field = 1 }, { other = -1 }]   1 ascending, -1 descending
# live:   false freezes membership after loading
[collections.articles]
filter = { url = { "$startsWith" = "/articles" }, layout = "single", isPagedAuto = { "$ne" = true } }
sort = [{ date = -1 }]

[collections.browserSupport]
filter = { url = { "$startsWith" = "/browser-support" } }
sort = [{ order = 1 }]

[collections.discover]
filter = { url = { "$startsWith" = "/discover" } }
sort = [{ title = 1 }]

[collections.libraries]
filter = { url = { "$startsWith" = "/libraries" } }
sort = [{ title = 1 }]

[collections.presentations]
filter = { url = { "$startsWith" = "/presentations" }, layout = "single", isPagedAuto = { "$ne" = true } }
sort = [{ date = -1 }]

[collections.sandbox]
filter = { url = { "$startsWith" = "/sandbox" }, layout = "page" }
sort = [{ title = 1 }]

[collections.specs]
filter = { url = { "$startsWith" = "/specs" } }
sort = [{ order = 1 }]

# ---------------------------------------------------------------------------
# Feeds (descriptions only; written by the feed generator)
# ---------------------------------------------------------------------------
[feeds.articles]
collection = "articles"
url = "/articles.xml"
page_title = "Articles"

[feeds.presentations]
collection = "presentations"
url = "/presentations.xml"
page_title = "Presentations"

# ---------------------------------------------------------------------------
# Environments
# ---------------------------------------------------------------------------
[environments.development.site]
url = "http://localhost:9778"
"##
}
