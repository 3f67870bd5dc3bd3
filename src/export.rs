//! Machine-readable exports: `data.json`, `sitemap.xml`, `rss.xml`, `atom.xml`.
//!
//! The XML documents are maud markup like the HTML pages, prefixed with an
//! XML declaration. Elements that must stay empty are written with an empty
//! body (`link href=(..) {}`) so the output is well-formed XML.
//!
//! All locations in the sitemap and feeds are absolute against `site.url`.

use crate::config::SiteMeta;
use crate::generate::Permalinks;
use crate::tree::CategoryTree;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use maud::{Markup, PreEscaped, html};
use serde::Serialize;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// One entry of `data.json`.
#[derive(Debug, Serialize)]
struct LinkRecord<'a> {
    title: &'a str,
    url: &'a str,
    description: &'a str,
    /// Canonical category path, empty for uncategorized links.
    category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lang: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<String>,
    /// Output-relative path of the link's page.
    page: &'a str,
}

/// Every link in sheet order as a pretty-printed JSON array.
pub fn render_json(tree: &CategoryTree, permalinks: &Permalinks) -> Result<String, serde_json::Error> {
    let records: Vec<LinkRecord> = tree
        .links()
        .iter()
        .enumerate()
        .map(|(index, link)| LinkRecord {
            title: &link.title,
            url: &link.url,
            description: &link.description,
            category: tree.category_of(index),
            kind: link.kind.as_deref(),
            lang: link.lang.as_deref(),
            created: link.created.map(|c| c.to_rfc3339()),
            page: permalinks.link_page(index),
        })
        .collect();
    serde_json::to_string_pretty(&records)
}

fn build_datetime(build_date: NaiveDate) -> DateTime<Utc> {
    build_date.and_time(NaiveTime::MIN).and_utc()
}

/// Sitemap of the home page, every category page, and every link page.
pub fn render_sitemap(
    tree: &CategoryTree,
    permalinks: &Permalinks,
    site: &SiteMeta,
    build_date: NaiveDate,
) -> Markup {
    let lastmod = build_date.to_string();
    let categories = tree
        .walk()
        .into_iter()
        .filter(|n| !n.is_root())
        .map(|n| permalinks.category_page(n.path()));
    let links = (0..tree.links().len()).map(|i| permalinks.link_page(i).to_string());
    let locs: Vec<String> = std::iter::once(site.absolute(""))
        .chain(categories.chain(links).map(|page| site.absolute(&page)))
        .collect();

    html! {
        (PreEscaped(XML_DECLARATION))
        urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" {
            @for loc in &locs {
                url {
                    loc { (loc) }
                    lastmod { (lastmod) }
                }
            }
        }
    }
}

/// RSS 2.0 feed of the links at `recent` (already ordered and truncated).
pub fn render_rss(
    tree: &CategoryTree,
    permalinks: &Permalinks,
    site: &SiteMeta,
    recent: &[usize],
    build_date: NaiveDate,
) -> Markup {
    html! {
        (PreEscaped(XML_DECLARATION))
        rss version="2.0" {
            channel {
                title { (site.title) }
                link { (site.absolute("")) }
                description { (site.description) }
                language { (site.language) }
                lastBuildDate { (build_datetime(build_date).to_rfc2822()) }
                @for &index in recent {
                    @let link = &tree.links()[index];
                    @let page = site.absolute(permalinks.link_page(index));
                    item {
                        title { (link.title) }
                        link { (page) }
                        guid isPermaLink="true" { (page) }
                        description { (link.description) }
                        @if let Some(created) = &link.created {
                            pubDate { (created.to_rfc2822()) }
                        }
                    }
                }
            }
        }
    }
}

/// Atom 1.0 feed of the links at `recent` (already ordered and truncated).
///
/// Undated entries use the build date as their `updated` value. The feed's
/// own `updated` is the later of the build date and the newest entry.
pub fn render_atom(
    tree: &CategoryTree,
    permalinks: &Permalinks,
    site: &SiteMeta,
    recent: &[usize],
    build_date: NaiveDate,
) -> Markup {
    let built_at = build_datetime(build_date);
    let built = built_at.to_rfc3339();
    let feed_updated = recent
        .iter()
        .filter_map(|&index| tree.links()[index].created)
        .filter(|created| created.with_timezone(&Utc) > built_at)
        .max()
        .map_or_else(|| built.clone(), |newest| newest.to_rfc3339());
    html! {
        (PreEscaped(XML_DECLARATION))
        feed xmlns="http://www.w3.org/2005/Atom" {
            id { (site.absolute("")) }
            title { (site.title) }
            @if !site.description.is_empty() {
                subtitle { (site.description) }
            }
            link href=(site.absolute("")) rel="alternate" {}
            link href=(site.absolute("atom.xml")) rel="self" {}
            updated { (feed_updated) }
            @for &index in recent {
                @let link = &tree.links()[index];
                @let page = site.absolute(permalinks.link_page(index));
                entry {
                    id { (page) }
                    title { (link.title) }
                    link href=(page) rel="alternate" type="text/html" {}
                    updated {
                        (link.created.map(|c| c.to_rfc3339()).unwrap_or_else(|| built.clone()))
                    }
                    @if !link.description.is_empty() {
                        summary { (link.description) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::recent_links;
    use crate::test_helpers::*;
    use crate::tree::build;
    use chrono::{FixedOffset, TimeZone};

    fn site() -> SiteMeta {
        SiteMeta {
            url: "https://links.example/".to_string(),
            ..SiteMeta::default()
        }
    }

    fn build_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn sample_tree() -> CategoryTree {
        let mut foo = link(2, "Foo", "https://foo.example", "Tech > AI");
        foo.description = "Foo & friends".to_string();
        foo.kind = Some("website".to_string());
        foo.created = Some(
            FixedOffset::east_opt(3 * 3600)
                .unwrap()
                .with_ymd_and_hms(2020, 1, 1, 12, 0, 0)
                .unwrap(),
        );
        build(
            &[decl("Tech"), decl("Tech>AI")],
            vec![foo, link(3, "Bar", "https://bar.example", "")],
            '>',
        )
    }

    #[test]
    fn json_lists_links_with_canonical_category() {
        let tree = sample_tree();
        let json = render_json(&tree, &Permalinks::assign(&tree)).unwrap();
        assert!(json.contains(r#""category": "Tech>AI""#));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["title"], "Foo");
        assert_eq!(records[0]["kind"], "website");
        assert_eq!(records[0]["created"], "2020-01-01T12:00:00+03:00");
        assert_eq!(records[0]["page"], "tech/ai/https-foo-example.html");
        assert_eq!(records[1]["category"], "");
        assert!(records[1].get("kind").is_none());
        assert!(records[1].get("created").is_none());
    }

    #[test]
    fn sitemap_has_absolute_location_per_page() {
        let tree = sample_tree();
        let xml = render_sitemap(&tree, &Permalinks::assign(&tree), &site(), build_date()).into_string();

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("<loc>https://links.example/</loc>"));
        assert!(xml.contains("<loc>https://links.example/tech/index.html</loc>"));
        assert!(xml.contains("<loc>https://links.example/tech/ai/index.html</loc>"));
        assert!(xml.contains("<loc>https://links.example/tech/ai/https-foo-example.html</loc>"));
        assert!(xml.contains("<loc>https://links.example/links/https-bar-example.html</loc>"));
        assert_eq!(xml.matches("<url>").count(), 5);
        assert_eq!(xml.matches("<lastmod>2024-05-01</lastmod>").count(), 5);
    }

    #[test]
    fn rss_items_follow_recency() {
        let tree = sample_tree();
        let recent = recent_links(&tree, 50);
        let xml = render_rss(&tree, &Permalinks::assign(&tree), &site(), &recent, build_date()).into_string();

        let foo = xml.find("<title>Foo</title>").unwrap();
        let bar = xml.find("<title>Bar</title>").unwrap();
        assert!(foo < bar);
        assert!(xml.contains("<link>https://links.example/tech/ai/https-foo-example.html</link>"));
        assert!(xml.contains("Jan 2020 12:00:00 +0300</pubDate>"));
        assert!(xml.contains("Foo &amp; friends"));
        assert_eq!(xml.matches("<item>").count(), 2);
    }

    #[test]
    fn rss_respects_feed_size() {
        let tree = sample_tree();
        let recent = recent_links(&tree, 1);
        let xml = render_rss(&tree, &Permalinks::assign(&tree), &site(), &recent, build_date()).into_string();
        assert_eq!(xml.matches("<item>").count(), 1);
        assert!(!xml.contains("Bar"));
    }

    #[test]
    fn atom_links_are_well_formed() {
        let tree = sample_tree();
        let recent = recent_links(&tree, 50);
        let xml = render_atom(&tree, &Permalinks::assign(&tree), &site(), &recent, build_date()).into_string();

        assert!(xml.contains(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#));
        assert!(xml.contains(r#"<link href="https://links.example/atom.xml" rel="self"></link>"#));
        assert!(xml.contains("<updated>2020-01-01T12:00:00+03:00</updated>"));
        // Bar has no date and falls back to the build date
        assert!(xml.contains("<updated>2024-05-01T00:00:00+00:00</updated>"));
        assert_eq!(xml.matches("<entry>").count(), 2);
    }

    #[test]
    fn atom_feed_updated_covers_entries_from_the_build_day() {
        let mut late = link(2, "Late", "https://late.example", "Tech");
        late.created = Some(
            FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 5, 1, 18, 30, 0)
                .unwrap(),
        );
        let tree = build(&[], vec![late, link(3, "Bar", "https://bar.example", "")], '>');
        let recent = recent_links(&tree, 50);
        let xml = render_atom(&tree, &Permalinks::assign(&tree), &site(), &recent, build_date()).into_string();

        let feed_updated = &xml[..xml.find("<entry>").unwrap()];
        assert!(feed_updated.contains("<updated>2024-05-01T18:30:00+00:00</updated>"));
    }

    #[test]
    fn atom_feed_updated_is_build_date_for_older_entries() {
        let tree = sample_tree();
        let recent = recent_links(&tree, 50);
        let xml = render_atom(&tree, &Permalinks::assign(&tree), &site(), &recent, build_date()).into_string();

        let feed_updated = &xml[..xml.find("<entry>").unwrap()];
        assert!(feed_updated.contains("<updated>2024-05-01T00:00:00+00:00</updated>"));
    }
}
