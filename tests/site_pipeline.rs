//! End-to-end: site.toml + documents.json on disk through `Site::load`.

use quire::authors::AuthorError;
use quire::context::{Site, SiteError};
use quire::types::{Document, MetadataPatch};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SITE_TOML: &str = r##"
[site]
title = "Bar"

[authors.zenorocha]
name = "Zeno Rocha"
gravatar = "abc123"
twitter = "zenorocha"

[authors.addyosmani]
name = "Addy Osmani"
image = "https://example.com/addy.png"
"##;

const DOCUMENTS_JSON: &str = r##"[
  {"id": "index.html", "url": "/", "layout": "default", "relativeDirPath": ""},
  {"id": "articles.html", "title": "Articles", "url": "/articles.html", "layout": "default"},
  {"id": "articles/a.html.md", "title": "Polymer", "url": "/articles/a", "layout": "single",
   "relativeDirPath": "articles", "date": "2021-01-01", "author": "zenorocha",
   "contentRenderedWithoutLayouts": "<p>Intro</p>\n<!-- Read more -->\n<p>Body</p>"},
  {"id": "articles/b.html.md", "title": "X-Tag", "url": "/articles/b", "layout": "single",
   "relativeDirPath": "articles", "date": "2021-06-01", "author": "addyosmani", "sticky": true},
  {"id": "articles/c.html.md", "title": "Bosonic", "url": "/articles/c", "layout": "single",
   "relativeDirPath": "articles", "date": "2020-12-01", "author": "ghost"},
  {"id": "articles/page/2.html", "url": "/articles/page/2", "layout": "single",
   "isPagedAuto": true, "date": "2022-01-01"},
  {"id": "specs/shadow-dom.html.md", "title": "Shadow DOM", "url": "/specs/shadow-dom", "order": 2},
  {"id": "specs/custom-elements.html.md", "title": "Custom Elements", "url": "/specs/custom-elements", "order": 1},
  {"id": "tags/polymer.html", "tag": "polymer", "url": "/tags/polymer.html", "layout": "default"}
]"##;

fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let config = dir.join("site.toml");
    let documents = dir.join("documents.json");
    fs::write(&config, SITE_TOML).unwrap();
    fs::write(&documents, DOCUMENTS_JSON).unwrap();
    (config, documents)
}

fn load(env: Option<&str>) -> (TempDir, Site) {
    let tmp = TempDir::new().unwrap();
    let (config, documents) = write_inputs(tmp.path());
    let site = Site::load(&config, &documents, env).unwrap();
    (tmp, site)
}

fn ids(documents: &[&Document]) -> Vec<String> {
    documents.iter().map(|d| d.id.clone()).collect()
}

#[test]
fn articles_resolve_newest_first_without_paged_pages() {
    let (_tmp, site) = load(None);
    assert_eq!(
        ids(&site.collection("articles").unwrap()),
        vec!["articles/b.html.md", "articles/a.html.md", "articles/c.html.md"]
    );
}

#[test]
fn specs_resolve_by_order() {
    let (_tmp, site) = load(None);
    assert_eq!(
        ids(&site.collection("specs").unwrap()),
        vec!["specs/custom-elements.html.md", "specs/shadow-dom.html.md"]
    );
}

#[test]
fn tag_pages_get_tag_layout_and_resolve_by_tag() {
    let (_tmp, site) = load(None);
    assert_eq!(site.store().get("tags/polymer.html").unwrap().meta.layout, "tags");

    let ctx = site.context_for("index.html").unwrap();
    assert_eq!(ctx.get_tag_url("polymer"), "/tags/polymer.html");
    assert_eq!(ctx.get_tag_url("bosonic"), "");
}

#[test]
fn derived_values_for_an_article() {
    let (_tmp, site) = load(None);
    let values = site.context_for("articles/a.html.md").unwrap().render().unwrap();

    assert_eq!(values.title, "Polymer — Bar");
    assert_eq!(values.description, "<p>Intro</p>");
    assert_eq!(values.human_date.as_deref(), Some("January 1st, 2021"));
    let author = values.author.unwrap();
    assert_eq!(author.name.as_deref(), Some("Zeno Rocha"));
    assert_eq!(author.image.as_deref(), Some("https://2.gravatar.com/avatar/abc123"));
    assert_eq!(author.twitter.as_deref(), Some("https://twitter.com/zenorocha"));
}

#[test]
fn unknown_author_fails_only_that_document() {
    let (_tmp, site) = load(None);
    let results: Vec<_> = site
        .store()
        .iter()
        .map(|doc| (doc.id.clone(), site.context(doc).render()))
        .collect();

    let failures: Vec<_> = results.iter().filter(|(_, r)| r.is_err()).collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "articles/c.html.md");
    assert_eq!(
        failures[0].1,
        Err(AuthorError::UnknownAuthor("ghost".into()))
    );
}

#[test]
fn sticky_selection_over_a_live_collection() {
    let (_tmp, site) = load(None);
    let ctx = site.context_for("articles.html").unwrap();
    let articles = ctx.collection("articles").unwrap();
    let sticky = ctx.get_sticky(&articles);
    assert_eq!(ids(&sticky), vec!["articles/b.html.md"]);
    assert!(ctx.has_rss_feed());
    assert_eq!(ctx.is_active_menu("articles"), None);
}

#[test]
fn metadata_changes_show_up_on_next_resolve() {
    let (_tmp, mut site) = load(None);
    site.set_meta(
        "articles/b.html.md",
        &MetadataPatch {
            layout: Some("page".into()),
            ..MetadataPatch::default()
        },
    )
    .unwrap();
    assert_eq!(
        ids(&site.collection("articles").unwrap()),
        vec!["articles/a.html.md", "articles/c.html.md"]
    );

    site.store_mut()
        .insert(
            Document::new("articles/d.html.md")
                .with_url("/articles/d")
                .with_layout("single"),
        )
        .unwrap();
    assert_eq!(site.collection("articles").unwrap().len(), 3);
}

#[test]
fn development_environment_uses_local_url() {
    let (_tmp, site) = load(Some("development"));
    assert_eq!(site.config().site.url, "http://localhost:9778");
    assert_eq!(site.config().site.title, "Bar");

    let (_tmp, production) = load(None);
    assert_eq!(production.config().site.url, "http://webcomponents.org");
}

#[test]
fn missing_config_file_uses_stock_site() {
    let tmp = TempDir::new().unwrap();
    let (_, documents) = write_inputs(tmp.path());
    let site = Site::load(&tmp.path().join("absent.toml"), &documents, None).unwrap();
    assert_eq!(site.config().site.title, "WebComponents.org");
    assert_eq!(site.registry().len(), 7);
}

#[test]
fn duplicate_document_ids_rejected() {
    let tmp = TempDir::new().unwrap();
    let (config, documents) = write_inputs(tmp.path());
    fs::write(&documents, r#"[{"id": "a"}, {"id": "a"}]"#).unwrap();
    assert!(matches!(
        Site::load(&config, &documents, None),
        Err(SiteError::Store(_))
    ));
}

#[test]
fn malformed_collection_stops_loading() {
    let tmp = TempDir::new().unwrap();
    let (config, documents) = write_inputs(tmp.path());
    fs::write(
        &config,
        "[collections.broken]\nfilter = { url = \"/x\" }\nsort = [{ date = 0 }]\n",
    )
    .unwrap();
    let err = Site::load(&config, &documents, None).unwrap_err();
    assert!(matches!(err, SiteError::Config(_)));
    assert!(err.to_string().contains("broken"));
}

#[test]
fn export_with_tag_lists_and_null_keys_loads() {
    let tmp = TempDir::new().unwrap();
    let (config, documents) = write_inputs(tmp.path());
    fs::write(
        &documents,
        r#"[
          {"id": "articles/a.html.md", "title": "Polymer", "url": "/articles/a",
           "layout": "single", "date": "2021-01-01",
           "tags": ["polymer", "x-tag"], "author": null}
        ]"#,
    )
    .unwrap();

    let site = Site::load(&config, &documents, None).unwrap();
    assert_eq!(
        ids(&site.collection("articles").unwrap()),
        vec!["articles/a.html.md"]
    );
    let values = site.context_for("articles/a.html.md").unwrap().render().unwrap();
    assert_eq!(values.author, None);
}
