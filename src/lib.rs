//! # linkshelf
//!
//! A static site generator for curated link directories. A published
//! spreadsheet is the data source: one sheet lists links, a second sheet
//! declares categories, and every run turns both into a plain directory of
//! HTML pages, a JSON export, a sitemap and feeds.
//!
//! # Architecture: One-Way Pipeline
//!
//! A build runs once, top to bottom, with no state carried between runs:
//!
//! ```text
//! 1. Source     .xlsx bytes    →  Workbook       (HTTP fetch or local file)
//! 2. Ingest     Workbook       →  Link, CategoryDecl + warnings
//! 3. Tree       records        →  CategoryTree   (implicit ancestors, root fallback)
//! 4. Generate   CategoryTree   →  docs/          (HTML, data.json, sitemap, feeds)
//! 5. Assets     assets/        →  docs/          (stylesheet, theme files)
//! ```
//!
//! Every stage takes the resolved [`config::SiteConfig`] by reference; no
//! stage reads the environment or global state.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`source`] | Fetches the workbook and flattens both sheets into typed cells |
//! | [`ingest`] | Row normalization: typed records, required fields, data-quality warnings |
//! | [`tree`] | Builds the category tree from declarations and link placements |
//! | [`generate`] | Renders the HTML site with Maud and assigns permalinks |
//! | [`export`] | `data.json`, `sitemap.xml`, `rss.xml`, `atom.xml` |
//! | [`assets`] | Embedded stylesheet, theme directory copy, CSS minification |
//! | [`config`] | Layered configuration: defaults, `linkshelf.toml`, `.env`, environment |
//! | [`types`] | Records shared between stages (`Link`, `CategoryDecl`, `Warning`) |
//! | [`naming`] | Category path parsing and URL slugs |
//! | [`output`] | CLI output formatting: tree-based display of pipeline results |
//!
//! # Design Decisions
//!
//! ## Bad Data Degrades, Then Speaks Up
//!
//! A link without a category is still published (at the root), a duplicate
//! URL keeps its first row, and a declared category nobody uses still gets a
//! page. Each of these yields a [`types::Warning`] that is logged and listed
//! by `linkshelf check`, so the sheet's editors see what to fix without the
//! site going stale. Missing titles or URLs and unreadable dates are the
//! exception: they stop the build and name the sheet, row, and column.
//!
//! ## Maud Over Template Engines
//!
//! HTML (and the XML exports) are generated with [Maud](https://maud.lambda.xyz/),
//! a compile-time HTML macro system:
//!
//! - **Compile-time checking**: malformed markup is a build error, not a runtime surprise.
//! - **XSS-safe by default**: all interpolation is auto-escaped, and spreadsheet
//!   cells are untrusted input.
//! - **Zero runtime files**: no template directory to ship or get out of sync.
//!
//! ## Deterministic Output
//!
//! Rendering is a pure function of the tree, the config and the build date.
//! Two builds of the same spreadsheet on the same day produce identical
//! files, so a deploy that commits `docs/` only shows real changes.

pub mod assets;
pub mod config;
pub mod export;
pub mod generate;
pub mod ingest;
pub mod naming;
pub mod output;
pub mod source;
pub mod tree;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
