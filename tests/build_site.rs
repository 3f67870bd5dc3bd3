//! End-to-end build: in-memory workbook → ingest → tree → assets → site.

use chrono::NaiveDate;
use linkshelf::config::SiteConfig;
use linkshelf::source::{Cell, Sheet, Workbook};
use linkshelf::types::Warning;
use linkshelf::{assets, generate, ingest, tree};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

fn text(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|v| Cell::Text(v.to_string())).collect()
}

fn workbook() -> Workbook {
    Workbook {
        links: Sheet::new(
            "Links",
            vec![
                text(&["title", "url", "description", "category", "kind", "lang", "sender", "source", "created"]),
                text(&["Foo", "https://foo.example/", "Foo *site*", "Tech > AI", "website", "English", "", "", "2024-03-01"]),
                text(&["Bar", "https://bar.example/", "", "", "", "", "", "", ""]),
                text(&["Baz", "https://baz.example/", "", "Science>Space", "", "", "", "", "2024-03-05 10:00"]),
                text(&["Foo again", "https://foo.example/", "", "Tech", "", "", "", "", ""]),
            ],
        ),
        categories: Sheet::new(
            "Categories",
            vec![
                text(&["category", "title", "description"]),
                text(&["Tech", "", ""]),
                text(&["Tech>AI", "", "Machines that *learn*"]),
                text(&["Empty", "", ""]),
            ],
        ),
    }
}

fn config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.site.title = "Test Links".to_string();
    config.site.url = "https://links.example/".to_string();
    config
}

fn build_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn build_site(output: &Path) -> Vec<Warning> {
    let config = config();
    let ingested = ingest::ingest(&workbook(), &config.spreadsheet).unwrap();
    let mut warnings = ingested.warnings;
    let tree = tree::build(
        &ingested.categories,
        ingested.links,
        config.spreadsheet.category_separator,
    );
    warnings.extend(tree.warnings().iter().cloned());

    assets::publish(None, output, config.assets.minify_css).unwrap();
    generate::generate(&tree, &config, output, build_date()).unwrap();
    warnings
}

fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().to_string_lossy().to_string();
            (relative, fs::read(e.path()).unwrap())
        })
        .collect()
}

#[test]
fn tech_ai_scenario() {
    let tmp = TempDir::new().unwrap();
    build_site(tmp.path());

    let tech = fs::read_to_string(tmp.path().join("tech/index.html")).unwrap();
    assert!(tech.contains(r#"<a href="../tech/ai/index.html">AI</a>"#));
    assert!(!tech.contains("Foo"));

    let ai = fs::read_to_string(tmp.path().join("tech/ai/index.html")).unwrap();
    assert!(ai.contains(r#"<a href="../../tech/ai/https-foo-example.html">Foo</a>"#));
    assert!(ai.contains("<em>learn</em>"));

    let data = fs::read_to_string(tmp.path().join("data.json")).unwrap();
    assert!(data.contains(r#""category": "Tech>AI""#));
}

#[test]
fn every_expected_file_is_written() {
    let tmp = TempDir::new().unwrap();
    build_site(tmp.path());

    for path in [
        "index.html",
        "style.css",
        "data.json",
        "sitemap.xml",
        "rss.xml",
        "atom.xml",
        "tech/index.html",
        "tech/ai/index.html",
        "tech/ai/https-foo-example.html",
        "science/index.html",
        "science/space/index.html",
        "science/space/https-baz-example.html",
        "empty/index.html",
        "links/https-bar-example.html",
    ] {
        assert!(tmp.path().join(path).is_file(), "{path} missing");
    }
}

#[test]
fn data_quality_warnings_are_collected() {
    let tmp = TempDir::new().unwrap();
    let warnings = build_site(tmp.path());

    assert_eq!(
        warnings,
        vec![
            Warning::DuplicateLink {
                row: 5,
                url: "https://foo.example/".to_string(),
                first_row: 2,
            },
            Warning::BlankCategory {
                row: 3,
                title: "Bar".to_string(),
            },
            Warning::UnusedCategory {
                path: "Empty".to_string(),
            },
        ]
    );
}

#[test]
fn home_lists_latest_links_newest_first() {
    let tmp = TempDir::new().unwrap();
    build_site(tmp.path());

    let home = fs::read_to_string(tmp.path().join("index.html")).unwrap();
    let latest = &home[home.find("Latest links").unwrap()..];
    let baz = latest.find(">Baz<").unwrap();
    let foo = latest.find(">Foo<").unwrap();
    let bar = latest.find(">Bar<").unwrap();
    assert!(baz < foo && foo < bar);
}

#[test]
fn rendering_twice_is_byte_identical() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    build_site(first.path());
    build_site(second.path());

    let first = read_tree(first.path());
    let second = read_tree(second.path());
    assert!(!first.is_empty());
    assert_eq!(first, second);
}
