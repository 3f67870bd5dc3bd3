//! HTML site generation.
//!
//! Final stage of the linkshelf build pipeline. Takes the finished category
//! tree and renders every page, plus the machine-readable exports from
//! [`export`](crate::export), into the output directory.
//!
//! ## Generated Pages
//!
//! - **Home page** (`/index.html`): top-level categories with link counts,
//!   uncategorized links, and the most recent links
//! - **Category pages** (`/{dir}/index.html`): breadcrumbs, description,
//!   child categories, and the links placed directly in the category
//! - **Link pages** (`/{dir}/{slug}.html`): the link with its description,
//!   metadata, and a share link
//!
//! ## Output Structure
//!
//! ```text
//! docs/
//! ├── index.html
//! ├── data.json
//! ├── sitemap.xml
//! ├── rss.xml
//! ├── atom.xml
//! ├── links/                       # Links without a category
//! │   └── https-bar-example.html
//! └── tech/
//!     ├── index.html
//!     └── ai/
//!         ├── index.html
//!         └── https-foo-example.html
//! ```
//!
//! Every page links to its neighbours with relative URLs (`../` per directory
//! level), so the site works from any base path and from `file://`.
//!
//! ## Determinism
//!
//! [`render_site`] is a pure function of the tree, the config and the build
//! date: the same inputs produce byte-identical output.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::config::{SiteConfig, SiteMeta};
use crate::export;
use crate::naming::{CategoryPath, slugify};
use crate::tree::{CategoryNode, CategoryTree};
use crate::types::Link;
use chrono::{DateTime, FixedOffset, NaiveDate};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Directory holding links that have no category.
pub const ROOT_LINKS_DIR: &str = "links";

const SHARE_ENDPOINT: &str = "https://twitter.com/intent/tweet";

/// One rendered output file.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Output-relative path with `/` separators.
    pub path: String,
    pub content: String,
}

impl Page {
    fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// What [`generate`] wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateReport {
    pub category_pages: usize,
    pub link_pages: usize,
    pub feed_entries: usize,
    pub files: usize,
}

// ============================================================================
// Permalinks
// ============================================================================

/// Output locations of every category and link page.
///
/// Category directories are the slugified names of the path's segments.
/// Siblings whose slugs collide get `-2`, `-3`, … in child order; link file
/// names collide-resolve the same way per directory.
#[derive(Debug, Clone)]
pub struct Permalinks {
    categories: HashMap<CategoryPath, String>,
    links: Vec<String>,
}

impl Permalinks {
    pub fn assign(tree: &CategoryTree) -> Self {
        let mut permalinks = Self {
            categories: HashMap::new(),
            links: vec![String::new(); tree.links().len()],
        };
        permalinks.assign_node(tree, tree.root(), String::new());
        permalinks
    }

    fn assign_node(&mut self, tree: &CategoryTree, node: &CategoryNode, dir: String) {
        let mut taken_dirs = HashSet::new();
        let links_dir = if node.is_root() {
            if !node.link_indices().is_empty() {
                taken_dirs.insert(ROOT_LINKS_DIR.to_string());
            }
            ROOT_LINKS_DIR.to_string()
        } else {
            dir.clone()
        };

        let mut taken_files = HashSet::from(["index".to_string()]);
        for (index, link) in tree.links_of(node) {
            let stem = unique_slug(&link.url, "link", &mut taken_files);
            self.links[index] = join(&links_dir, &format!("{stem}.html"));
        }

        for child in node.children() {
            let slug = unique_slug(child.name(), "category", &mut taken_dirs);
            self.assign_node(tree, child, join(&dir, &slug));
        }
        self.categories.insert(node.path().clone(), dir);
    }

    /// Output directory of a category, empty for the root.
    pub fn category_dir(&self, path: &CategoryPath) -> &str {
        self.categories.get(path).map(String::as_str).unwrap_or("")
    }

    /// Output-relative path of a category's index page.
    pub fn category_page(&self, path: &CategoryPath) -> String {
        join(self.category_dir(path), "index.html")
    }

    /// Output-relative path of a link's page.
    pub fn link_page(&self, index: usize) -> &str {
        &self.links[index]
    }
}

fn unique_slug(text: &str, fallback: &str, taken: &mut HashSet<String>) -> String {
    let base = match slugify(text) {
        slug if slug.is_empty() => fallback.to_string(),
        slug => slug,
    };
    let mut candidate = base.clone();
    let mut n = 1;
    while !taken.insert(candidate.clone()) {
        n += 1;
        candidate = format!("{base}-{n}");
    }
    candidate
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Relative prefix from a page's directory back to the site root.
fn root_prefix(page_path: &str) -> String {
    "../".repeat(page_path.matches('/').count())
}

/// Link indices ordered newest first.
///
/// Links without a creation date rank after dated ones; ties go to the
/// later spreadsheet row.
pub fn recent_links(tree: &CategoryTree, limit: usize) -> Vec<usize> {
    let links = tree.links();
    let mut order: Vec<usize> = (0..links.len()).collect();
    order.sort_by_key(|&i| Reverse((links[i].created, links[i].row)));
    order.truncate(limit);
    order
}

// ============================================================================
// Entry points
// ============================================================================

/// Render every output file in memory.
pub fn render_site(
    tree: &CategoryTree,
    config: &SiteConfig,
    build_date: NaiveDate,
) -> Result<Vec<Page>, GenerateError> {
    let permalinks = Permalinks::assign(tree);
    let ctx = Context {
        tree,
        permalinks: &permalinks,
        site: &config.site,
        build_date,
    };

    let mut pages = vec![Page::new(
        "index.html",
        render_home(&ctx, config.site.latest_links).into_string(),
    )];
    for node in tree.walk().into_iter().filter(|n| !n.is_root()) {
        pages.push(Page::new(
            permalinks.category_page(node.path()),
            render_category(&ctx, node).into_string(),
        ));
    }
    for index in 0..tree.links().len() {
        pages.push(Page::new(
            permalinks.link_page(index),
            render_link(&ctx, index).into_string(),
        ));
    }

    let recent = recent_links(tree, config.feed.size);
    pages.push(Page::new("data.json", export::render_json(tree, &permalinks)?));
    pages.push(Page::new(
        "sitemap.xml",
        export::render_sitemap(tree, &permalinks, &config.site, build_date).into_string(),
    ));
    pages.push(Page::new(
        "rss.xml",
        export::render_rss(tree, &permalinks, &config.site, &recent, build_date).into_string(),
    ));
    pages.push(Page::new(
        "atom.xml",
        export::render_atom(tree, &permalinks, &config.site, &recent, build_date).into_string(),
    ));
    Ok(pages)
}

/// Render the site and write it under `output_dir`.
pub fn generate(
    tree: &CategoryTree,
    config: &SiteConfig,
    output_dir: &Path,
    build_date: NaiveDate,
) -> Result<GenerateReport, GenerateError> {
    let pages = render_site(tree, config, build_date)?;

    fs::create_dir_all(output_dir)?;
    for page in &pages {
        let target = output_dir.join(&page.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &page.content)?;
        debug!(path = %page.path, "written");
    }

    let report = GenerateReport {
        category_pages: tree.category_count(),
        link_pages: tree.links().len(),
        feed_entries: tree.links().len().min(config.feed.size),
        files: pages.len(),
    };
    info!(
        files = report.files,
        output = %output_dir.display(),
        "site generated"
    );
    Ok(report)
}

// ============================================================================
// HTML Components
// ============================================================================

struct Context<'a> {
    tree: &'a CategoryTree,
    permalinks: &'a Permalinks,
    site: &'a SiteMeta,
    build_date: NaiveDate,
}

/// Renders the base HTML document structure
fn base_document(
    ctx: &Context,
    title: &str,
    root: &str,
    description: Option<&str>,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(ctx.site.language) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @if let Some(desc) = description.filter(|d| !d.is_empty()) {
                    meta name="description" content=(desc);
                }
                link rel="stylesheet" href={ (root) "style.css" };
                link rel="alternate" type="application/rss+xml" title=(ctx.site.title) href={ (root) "rss.xml" };
                link rel="alternate" type="application/atom+xml" title=(ctx.site.title) href={ (root) "atom.xml" };
            }
            body {
                header.site-header {
                    a.site-title href={ (root) "index.html" } { (ctx.site.title) }
                }
                main {
                    (content)
                }
                footer.site-footer {
                    "Last update: "
                    time datetime=(ctx.build_date.to_string()) { (ctx.build_date.to_string()) }
                    " · "
                    a href={ (root) "rss.xml" } { "RSS" }
                    " · "
                    a href={ (root) "atom.xml" } { "Atom" }
                    " · "
                    a href={ (root) "data.json" } { "JSON" }
                }
            }
        }
    }
}

/// Home link followed by every category down to `path`.
///
/// The last category is plain text on its own page and a link on the pages
/// of the links it holds.
fn breadcrumbs(ctx: &Context, path: &CategoryPath, root: &str, link_last: bool) -> Markup {
    let lineage = ctx.tree.lineage(path);
    html! {
        nav.breadcrumb {
            a href={ (root) "index.html" } { "Home" }
            @for (i, node) in lineage.iter().enumerate() {
                " › "
                @if i + 1 == lineage.len() && !link_last {
                    span.current { (node.title()) }
                } @else {
                    a href={ (root) (ctx.permalinks.category_page(node.path())) } { (node.title()) }
                }
            }
        }
    }
}

/// Markdown converted to HTML.
fn markdown(text: &str) -> Markup {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new(text));
    PreEscaped(out)
}

fn short_date(date: &DateTime<FixedOffset>) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn category_list(ctx: &Context, children: &[CategoryNode], root: &str) -> Markup {
    html! {
        ul.category-list {
            @for child in children {
                li {
                    a href={ (root) (ctx.permalinks.category_page(child.path())) } { (child.title()) }
                    " "
                    span.count { "(" (child.descendant_link_count()) ")" }
                }
            }
        }
    }
}

fn link_list(ctx: &Context, indices: &[usize], root: &str) -> Markup {
    html! {
        ul.link-list {
            @for &index in indices {
                @let link = &ctx.tree.links()[index];
                li.link-item {
                    @if let Some(favicon) = &link.favicon {
                        img.favicon src=(favicon) alt="" width="16" height="16" loading="lazy";
                    }
                    a href={ (root) (ctx.permalinks.link_page(index)) } { (link.title) }
                    @if let Some(created) = &link.created {
                        " "
                        time datetime=(created.to_rfc3339()) { (short_date(created)) }
                    }
                }
            }
        }
    }
}

/// Share intent URL for a link page, `None` without a social handle.
fn share_url(site: &SiteMeta, link: &Link, page_url: &str) -> Option<String> {
    let handle = site.social_handle.trim().trim_start_matches('@');
    if handle.is_empty() {
        return None;
    }
    url::Url::parse_with_params(
        SHARE_ENDPOINT,
        &[
            ("text", link.title.as_str()),
            ("url", page_url),
            ("via", handle),
        ],
    )
    .ok()
    .map(|u| u.to_string())
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page
fn render_home(ctx: &Context, latest: usize) -> Markup {
    let root = "";
    let home = ctx.tree.root();
    let recent = recent_links(ctx.tree, latest);

    let content = html! {
        header.page-header {
            h1 { (ctx.site.title) }
            @if !ctx.site.description.is_empty() {
                p.site-description { (ctx.site.description) }
            }
            p.stats { (ctx.tree.links().len()) " links" }
        }
        @if !home.children().is_empty() {
            section.categories {
                h2 { "Categories" }
                (category_list(ctx, home.children(), root))
            }
        }
        @if !home.link_indices().is_empty() {
            section.uncategorized {
                h2 { "Uncategorized" }
                (link_list(ctx, home.link_indices(), root))
            }
        }
        @if !recent.is_empty() {
            section.latest {
                h2 { "Latest links" }
                (link_list(ctx, &recent, root))
            }
        }
    };

    base_document(
        ctx,
        &ctx.site.title,
        root,
        Some(ctx.site.description.as_str()),
        content,
    )
}

/// Renders a category listing page
fn render_category(ctx: &Context, node: &CategoryNode) -> Markup {
    let root = root_prefix(&ctx.permalinks.category_page(node.path()));
    let page_title = format!("{} - {}", node.title(), ctx.site.title);

    let content = html! {
        (breadcrumbs(ctx, node.path(), &root, false))
        header.page-header {
            h1 { (node.title()) }
            @if let Some(desc) = node.description() {
                div.description { (markdown(desc)) }
            }
        }
        @if !node.children().is_empty() {
            section.subcategories {
                h2 { "Categories" }
                (category_list(ctx, node.children(), &root))
            }
        }
        @if !node.link_indices().is_empty() {
            section.links {
                h2 { "Links" }
                (link_list(ctx, node.link_indices(), &root))
            }
        }
    };

    base_document(ctx, &page_title, &root, node.description(), content)
}

/// Renders a link detail page
fn render_link(ctx: &Context, index: usize) -> Markup {
    let link = &ctx.tree.links()[index];
    let page = ctx.permalinks.link_page(index);
    let root = root_prefix(page);
    let share = share_url(ctx.site, link, &ctx.site.absolute(page));
    let page_title = format!("{} - {}", link.title, ctx.site.title);

    let content = html! {
        (breadcrumbs(ctx, ctx.tree.placement(index), &root, true))
        article.link-detail {
            h1 {
                @if let Some(favicon) = &link.favicon {
                    img.favicon src=(favicon) alt="" width="32" height="32";
                    " "
                }
                (link.title)
            }
            @if !link.description.is_empty() {
                div.description { (markdown(&link.description)) }
            }
            p.outbound {
                a href=(link.url) rel="noopener" target="_blank" { (link.url) }
            }
            dl.meta {
                @if let Some(kind) = &link.kind {
                    dt { "Type" } dd { (kind) }
                }
                @if let Some(lang) = &link.lang {
                    dt { "Language" } dd { (lang) }
                }
                @if let Some(source) = &link.source {
                    dt { "Source" } dd { (source) }
                }
                @if let Some(sender) = &link.sender {
                    dt { "Sent by" } dd { (sender) }
                }
                @if let Some(created) = &link.created {
                    dt { "Added" }
                    dd { time datetime=(created.to_rfc3339()) { (short_date(created)) } }
                }
            }
            @if let Some(share) = share {
                p.share {
                    a href=(share) rel="noopener" target="_blank" { "Share" }
                }
            }
        }
    };

    let description = (!link.description.is_empty()).then_some(link.description.as_str());
    base_document(ctx, &page_title, &root, description, content)
}

// ============================================================================
// Tests
// ============================================================================
