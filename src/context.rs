//! The site and its per-render template context.
//!
//! [`Site`] owns everything a build pass shares: configuration, the author
//! directory, the compiled collection registry and the document store. A
//! [`TemplateContext`] is a cheap borrowed view pairing the site with the one
//! document being rendered; every derived value a template can ask for is a
//! method on it, so the "current document" is always an explicit argument
//! rather than ambient state.
//!
//! ## Phases
//!
//! ```text
//! Site::new     load documents → run metadata hooks → freeze snapshots
//! render pass   site.context(doc).get_title(), .collection("articles"), ...
//! between       site.set_meta(...) / site.store_mut()  (needs &mut Site)
//! ```
//!
//! Contexts borrow the site immutably, so the borrow checker keeps metadata
//! mutation out of any render pass that could observe it.

use crate::authors::{Author, AuthorDirectory, AuthorError};
use crate::collections::{CollectionError, CollectionRegistry};
use crate::config::{self, ConfigError, FeedConfig, SiteConfig, SiteConstants};
use crate::helpers;
use crate::query::Predicate;
use crate::store::{self, DocumentStore, StoreError, TagLayoutHook};
use crate::types::{Document, MetadataPatch};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const GITHUB_BASE: &str = "https://github.com/";

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Collection error: {0}")]
    Collection(#[from] CollectionError),
}

#[derive(Debug)]
pub struct Site {
    config: SiteConfig,
    registry: CollectionRegistry,
    store: DocumentStore,
}

impl Site {
    /// Compile collections, ingest documents through the tag hook, then
    /// freeze snapshot collections.
    pub fn new(config: SiteConfig, documents: Vec<Document>) -> Result<Self, SiteError> {
        config.validate()?;
        let mut registry = CollectionRegistry::from_config(&config.collections)?;
        let mut store = DocumentStore::new().with_hook(TagLayoutHook::new(&config.tags.layout));
        store.extend(documents)?;
        registry.freeze(&store);
        Ok(Self {
            config,
            registry,
            store,
        })
    }

    /// Load `config_path` (stock defaults if absent) and the JSON document
    /// export at `documents_path`.
    pub fn load(
        config_path: &Path,
        documents_path: &Path,
        environment: Option<&str>,
    ) -> Result<Self, SiteError> {
        let config = config::load_config(config_path, environment)?;
        let documents = store::load_documents(documents_path)?;
        Self::new(config, documents)
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn authors(&self) -> &AuthorDirectory {
        &self.config.authors
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    pub fn feeds(&self) -> &BTreeMap<String, FeedConfig> {
        &self.config.feeds
    }

    pub fn set_meta(&mut self, id: &str, patch: &MetadataPatch) -> Result<(), SiteError> {
        Ok(self.store.set_meta(id, patch)?)
    }

    pub fn collection(&self, name: &str) -> Result<Vec<&Document>, CollectionError> {
        self.registry.resolve(name, &self.store)
    }

    pub fn context<'a>(&'a self, document: &'a Document) -> TemplateContext<'a> {
        TemplateContext {
            site: self,
            document,
        }
    }

    pub fn context_for(&self, id: &str) -> Result<TemplateContext<'_>, StoreError> {
        self.store
            .get(id)
            .map(|doc| self.context(doc))
            .ok_or_else(|| StoreError::UnknownDocument(id.to_string()))
    }
}

/// Author fields as templates see them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorCard {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_plus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

/// Snapshot of the derived values for one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedValues {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub github_edit_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human_date: Option<String>,
    pub has_read_more: bool,
    pub has_rss_feed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorCard>,
}

/// Per-render view: the site plus the document being rendered.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    site: &'a Site,
    document: &'a Document,
}

impl<'a> TemplateContext<'a> {
    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn site(&self) -> &'a SiteConstants {
        &self.site.config.site
    }

    pub fn get_author(&self, id: &str) -> Result<&'a Author, AuthorError> {
        self.site.authors().get(id)
    }

    pub fn get_author_image(&self, id: &str) -> Result<Option<String>, AuthorError> {
        Ok(self.get_author(id)?.image_url())
    }

    pub fn get_author_google_plus(&self, id: &str) -> Result<Option<String>, AuthorError> {
        Ok(self.get_author(id)?.google_plus_url())
    }

    pub fn get_author_twitter(&self, id: &str) -> Result<Option<String>, AuthorError> {
        Ok(self.get_author(id)?.twitter_url())
    }

    pub fn get_github_url(&self) -> String {
        let github = &self.site.config.github;
        format!("{GITHUB_BASE}{}/{}", github.user, github.repo)
    }

    pub fn get_github_edit_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.get_github_url(),
            self.site.config.github.edit_path,
            path
        )
    }

    /// URL of the page for `tag`, or `""` when no document carries it.
    ///
    /// Several documents sharing a tag resolve to the first in store order.
    pub fn get_tag_url(&self, tag: &str) -> String {
        self.site
            .store
            .find_one(&Predicate::new().eq("tag", tag))
            .map(|doc| doc.meta.url.clone())
            .unwrap_or_default()
    }

    pub fn get_title(&self) -> String {
        let site_title = &self.site().title;
        match self.document.title() {
            Some(title) if !title.is_empty() => format!(
                "{title}{}{site_title}",
                self.site.config.content.title_separator
            ),
            _ => site_title.clone(),
        }
    }

    pub fn get_description(&self) -> String {
        let content = &self.document.content_rendered_without_layouts;
        if self.has_read_more(content) {
            self.get_excerpt(content).to_string()
        } else {
            self.site().description.clone()
        }
    }

    pub fn get_excerpt<'c>(&self, content: &'c str) -> &'c str {
        helpers::excerpt(content, &self.site.config.content.read_more_marker)
    }

    pub fn has_read_more(&self, content: &str) -> bool {
        helpers::has_read_more(content, &self.site.config.content.read_more_marker)
    }

    /// True on the listing pages that advertise a feed.
    pub fn has_rss_feed(&self) -> bool {
        let Some(title) = self.document.title() else {
            return false;
        };
        self.site
            .feeds()
            .values()
            .any(|feed| feed.page_title.as_deref() == Some(title))
    }

    pub fn get_sticky(&self, collection: &[&'a Document]) -> Vec<&'a Document> {
        helpers::sticky(collection)
    }

    /// `Some(true)` when `path` is the current document's directory, `None`
    /// otherwise. Never `Some(false)`.
    pub fn is_active_menu(&self, path: &str) -> Option<bool> {
        (path == self.document.meta.relative_dir_path).then_some(true)
    }

    pub fn fix_order<T>(&self, list: Vec<T>) -> Vec<T> {
        helpers::fix_order(list)
    }

    pub fn human_date(&self) -> Option<String> {
        self.document.meta.date.as_ref().map(helpers::human_date)
    }

    pub fn collection(&self, name: &str) -> Result<Vec<&'a Document>, CollectionError> {
        self.site.collection(name)
    }

    pub fn tag_page_path(&self, tag: &str) -> String {
        format!("tags/{tag}{}", self.site.config.tags.extension)
    }

    /// Evaluate the per-document values. Fails only when the document names
    /// an `author` that is not in the directory.
    pub fn render(&self) -> Result<RenderedValues, AuthorError> {
        let author = match self.document.meta.extra_text("author") {
            Some(id) => {
                let author = self.get_author(id)?;
                Some(AuthorCard {
                    id: id.to_string(),
                    name: author.name.clone(),
                    image: author.image_url(),
                    google_plus: author.google_plus_url(),
                    twitter: author.twitter_url(),
                })
            }
            None => None,
        };
        let content = &self.document.content_rendered_without_layouts;
        Ok(RenderedValues {
            id: self.document.id.clone(),
            title: self.get_title(),
            description: self.get_description(),
            url: self.document.meta.url.clone(),
            github_edit_url: self.get_github_edit_url(&self.document.id),
            human_date: self.human_date(),
            has_read_more: self.has_read_more(content),
            has_rss_feed: self.has_rss_feed(),
            author,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ids, ymd};

    fn config_with_authors() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.site.title = "Bar".into();
        config.authors.insert(
            "zenorocha",
            Author {
                name: Some("Zeno Rocha".into()),
                gravatar: Some("abc".into()),
                twitter: Some("zenorocha".into()),
                ..Author::default()
            },
        );
        config
    }

    fn site(documents: Vec<Document>) -> Site {
        Site::new(config_with_authors(), documents).unwrap()
    }

    fn article(id: &str) -> Document {
        Document::new(id)
            .with_url(format!("/articles/{id}"))
            .with_layout("single")
            .with_dir("articles")
    }

    #[test]
    fn title_composes_with_site_title() {
        let site = site(vec![article("a").with_title("Foo"), article("b")]);
        assert_eq!(site.context_for("a").unwrap().get_title(), "Foo — Bar");
        assert_eq!(site.context_for("b").unwrap().get_title(), "Bar");
    }

    #[test]
    fn empty_title_treated_as_absent() {
        let site = site(vec![article("a").with_title("")]);
        assert_eq!(site.context_for("a").unwrap().get_title(), "Bar");
    }

    #[test]
    fn description_uses_excerpt_when_marker_present() {
        let site = site(vec![
            article("a").with_content("<p>Intro</p>\n<!-- Read more -->\n<p>Rest</p>"),
            article("b").with_content("<p>No marker</p>"),
        ]);
        assert_eq!(
            site.context_for("a").unwrap().get_description(),
            "<p>Intro</p>"
        );
        assert_eq!(
            site.context_for("b").unwrap().get_description(),
            "A place to discuss and evolve Web Component best-practices"
        );
    }

    #[test]
    fn author_helpers() {
        let site = site(vec![article("a")]);
        let ctx = site.context_for("a").unwrap();

        assert_eq!(ctx.get_author("zenorocha").unwrap().name.as_deref(), Some("Zeno Rocha"));
        assert_eq!(
            ctx.get_author_image("zenorocha").unwrap().as_deref(),
            Some("https://2.gravatar.com/avatar/abc")
        );
        assert_eq!(
            ctx.get_author_twitter("zenorocha").unwrap().as_deref(),
            Some("https://twitter.com/zenorocha")
        );
        assert_eq!(ctx.get_author_google_plus("zenorocha").unwrap(), None);
    }

    #[test]
    fn unknown_author_fails_fast() {
        let site = site(vec![article("a")]);
        let ctx = site.context_for("a").unwrap();
        assert_eq!(
            ctx.get_author_image("ghost"),
            Err(AuthorError::UnknownAuthor("ghost".into()))
        );
    }

    #[test]
    fn github_urls() {
        let site = site(vec![article("a")]);
        let ctx = site.context_for("a").unwrap();
        assert_eq!(
            ctx.get_github_url(),
            "https://github.com/webcomponents/webcomponents.github.io"
        );
        assert_eq!(
            ctx.get_github_edit_url("articles/intro.html.md"),
            "https://github.com/webcomponents/webcomponents.github.io/edit/site/src/documents/articles/intro.html.md"
        );
    }

    #[test]
    fn tag_url_found_or_empty() {
        let site = site(vec![
            article("a"),
            Document::new("tags/polymer.html")
                .with_tag("polymer")
                .with_url("/tags/polymer.html"),
        ]);
        let ctx = site.context_for("a").unwrap();
        assert_eq!(ctx.get_tag_url("polymer"), "/tags/polymer.html");
        assert_eq!(ctx.get_tag_url("x-tag"), "");
    }

    #[test]
    fn tag_documents_get_tag_layout() {
        let site = site(vec![
            Document::new("tags/polymer.html")
                .with_tag("polymer")
                .with_layout("default"),
        ]);
        assert_eq!(
            site.store().get("tags/polymer.html").unwrap().meta.layout,
            "tags"
        );
        let ctx = site.context_for("tags/polymer.html").unwrap();
        assert_eq!(ctx.tag_page_path("polymer"), "tags/polymer.html");
    }

    #[test]
    fn active_menu_is_true_or_none() {
        let site = site(vec![article("a")]);
        let ctx = site.context_for("a").unwrap();
        assert_eq!(ctx.is_active_menu("articles"), Some(true));
        assert_eq!(ctx.is_active_menu("specs"), None);
    }

    #[test]
    fn rss_feed_on_listing_pages_only() {
        let site = site(vec![
            Document::new("articles.html").with_title("Articles"),
            Document::new("presentations.html").with_title("Presentations"),
            Document::new("specs.html").with_title("Specs"),
            Document::new("index.html"),
        ]);
        assert!(site.context_for("articles.html").unwrap().has_rss_feed());
        assert!(site.context_for("presentations.html").unwrap().has_rss_feed());
        assert!(!site.context_for("specs.html").unwrap().has_rss_feed());
        assert!(!site.context_for("index.html").unwrap().has_rss_feed());
    }

    #[test]
    fn sticky_and_fix_order_through_context() {
        let site = site(vec![
            article("a").with_date(ymd(2021, 1, 1)),
            article("b").with_date(ymd(2021, 6, 1)).with_sticky(true),
            article("c").with_date(ymd(2020, 12, 1)),
        ]);
        let ctx = site.context_for("a").unwrap();
        let articles = ctx.collection("articles").unwrap();
        assert_eq!(ids(&articles), vec!["b", "a", "c"]);
        assert_eq!(ids(&ctx.get_sticky(&articles)), vec!["b"]);
        assert_eq!(ids(&ctx.fix_order(articles)), vec!["b", "c", "a"]);
    }

    #[test]
    fn collections_see_metadata_changes_between_passes() {
        let mut site = site(vec![
            article("a").with_date(ymd(2021, 1, 1)),
            article("b").with_date(ymd(2021, 6, 1)),
        ]);
        assert_eq!(ids(&site.collection("articles").unwrap()), vec!["b", "a"]);

        let patch = MetadataPatch {
            is_paged_auto: Some(true),
            ..MetadataPatch::default()
        };
        site.set_meta("b", &patch).unwrap();
        assert_eq!(ids(&site.collection("articles").unwrap()), vec!["a"]);
    }

    #[test]
    fn render_collects_values() {
        let site = site(vec![
            article("a")
                .with_title("Foo")
                .with_date(ymd(2021, 6, 1))
                .with_extra("author", "zenorocha")
                .with_content("Short\n<!-- Read more -->\nLong"),
        ]);
        let values = site.context_for("a").unwrap().render().unwrap();

        assert_eq!(values.title, "Foo — Bar");
        assert_eq!(values.description, "Short");
        assert_eq!(values.human_date.as_deref(), Some("June 1st, 2021"));
        assert!(values.has_read_more);
        assert!(!values.has_rss_feed);
        let author = values.author.unwrap();
        assert_eq!(author.image.as_deref(), Some("https://2.gravatar.com/avatar/abc"));

        let json = serde_json::to_value(site.context_for("a").unwrap().render().unwrap()).unwrap();
        assert_eq!(json["humanDate"], "June 1st, 2021");
        assert_eq!(json["githubEditUrl"], "https://github.com/webcomponents/webcomponents.github.io/edit/site/src/documents/a");
    }

    #[test]
    fn render_fails_for_unknown_author() {
        let site = site(vec![article("a").with_extra("author", "ghost")]);
        assert_eq!(
            site.context_for("a").unwrap().render(),
            Err(AuthorError::UnknownAuthor("ghost".into()))
        );
    }

    #[test]
    fn context_for_unknown_document() {
        let site = site(vec![]);
        assert!(matches!(
            site.context_for("missing"),
            Err(StoreError::UnknownDocument(_))
        ));
    }

    #[test]
    fn invalid_config_rejected_by_site() {
        let mut config = SiteConfig::default();
        config.site.title.clear();
        assert!(matches!(
            Site::new(config, vec![]),
            Err(SiteError::Config(_))
        ));
    }
}
