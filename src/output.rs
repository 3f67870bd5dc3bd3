//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (category, link) is its semantic identity, title and
//! positional index, with URLs and output paths shown as secondary context.
//! This makes the output readable as a content inventory while still letting
//! users trace data back to spreadsheet rows and generated files.
//!
//! # Entity Display Contract
//!
//! Every entity follows a consistent two-level pattern across all stages:
//!
//! 1. **Header line**: positional index + title (+ optional link count)
//! 2. **Context lines**: indented `URL:` lines, or `→ path` on the same line
//!
//! Shared helpers (`entity_header`, `link_line`) enforce this pattern so
//! check and build output look consistent for the same entities.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Categories
//! 001 Tech (2 links)
//!     001 AI (1 link)
//!         001 Foo
//!             URL: https://foo.example
//!     001 Baz
//!         URL: https://baz.example
//!
//! Uncategorized
//!     001 Bar
//!         URL: https://bar.example
//!
//! Warnings
//!     row 3: link "Bar" has no category, listed at the root
//!
//! 2 categories, 3 links, 1 warning
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! 001 Tech → tech/index.html
//!     001 AI → tech/ai/index.html
//!         001 Foo → tech/ai/https-foo-example.html
//!     001 Baz → tech/https-baz-example.html
//! Uncategorized
//!     001 Bar → links/https-bar-example.html
//!
//! Generated 2 category pages, 3 link pages, 3 feed entries
//! Assets: style.css, 2 theme files (1 minified)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::assets::AssetReport;
use crate::generate::{GenerateReport, Permalinks};
use crate::tree::{CategoryNode, CategoryTree};
use crate::types::Warning;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Format an entity header: positional index + title, with optional link count.
///
/// ```text
/// 001 Tech (2 links)
/// 001 Tech
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, plural(n, "link", "links")),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Format a link line: positional index + title, truncated.
fn link_line(index: usize, title: &str) -> String {
    format!("{} {}", format_index(index), truncate(title, 60))
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn format_warnings(lines: &mut Vec<String>, warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push("Warnings".to_string());
    for warning in warnings {
        lines.push(format!("    {}", warning));
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the category tree with every link and the collected warnings.
///
/// Links appear below their category, after its child categories, one level
/// deeper.
pub fn format_check_output(tree: &CategoryTree, warnings: &[Warning]) -> Vec<String> {
    fn push_links(lines: &mut Vec<String>, tree: &CategoryTree, node: &CategoryNode, depth: usize) {
        for (i, (_, link)) in tree.links_of(node).enumerate() {
            lines.push(format!("{}{}", indent(depth), link_line(i + 1, &link.title)));
            lines.push(format!("{}    URL: {}", indent(depth), link.url));
        }
    }

    fn visit(lines: &mut Vec<String>, tree: &CategoryTree, node: &CategoryNode, depth: usize) {
        for (i, child) in node.children().iter().enumerate() {
            lines.push(format!(
                "{}{}",
                indent(depth),
                entity_header(i + 1, child.title(), Some(child.descendant_link_count()))
            ));
            visit(lines, tree, child, depth + 1);
            push_links(lines, tree, child, depth + 1);
        }
    }

    let mut lines = vec!["Categories".to_string()];
    visit(&mut lines, tree, tree.root(), 0);

    if !tree.root().link_indices().is_empty() {
        lines.push(String::new());
        lines.push("Uncategorized".to_string());
        push_links(&mut lines, tree, tree.root(), 1);
    }

    format_warnings(&mut lines, warnings);

    lines.push(String::new());
    lines.push(format!(
        "{}, {}, {}",
        plural(tree.category_count(), "category", "categories"),
        plural(tree.links().len(), "link", "links"),
        plural(warnings.len(), "warning", "warnings"),
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(tree: &CategoryTree, warnings: &[Warning]) {
    for line in format_check_output(tree, warnings) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format build output showing every generated page.
///
/// Information-first: each entity leads with its positional index and title,
/// followed by `→` and the output path.
pub fn format_build_output(
    tree: &CategoryTree,
    permalinks: &Permalinks,
    report: &GenerateReport,
    assets: &AssetReport,
) -> Vec<String> {
    fn push_links(
        lines: &mut Vec<String>,
        tree: &CategoryTree,
        permalinks: &Permalinks,
        node: &CategoryNode,
        depth: usize,
    ) {
        for (i, (index, link)) in tree.links_of(node).enumerate() {
            lines.push(format!(
                "{}{} \u{2192} {}",
                indent(depth),
                link_line(i + 1, &link.title),
                permalinks.link_page(index)
            ));
        }
    }

    fn visit(
        lines: &mut Vec<String>,
        tree: &CategoryTree,
        permalinks: &Permalinks,
        node: &CategoryNode,
        depth: usize,
    ) {
        for (i, child) in node.children().iter().enumerate() {
            lines.push(format!(
                "{}{} \u{2192} {}",
                indent(depth),
                entity_header(i + 1, child.title(), None),
                permalinks.category_page(child.path())
            ));
            visit(lines, tree, permalinks, child, depth + 1);
            push_links(lines, tree, permalinks, child, depth + 1);
        }
    }

    let mut lines = vec!["Home \u{2192} index.html".to_string()];
    visit(&mut lines, tree, permalinks, tree.root(), 0);

    if !tree.root().link_indices().is_empty() {
        lines.push("Uncategorized".to_string());
        push_links(&mut lines, tree, permalinks, tree.root(), 1);
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}",
        plural(report.category_pages, "category page", "category pages"),
        plural(report.link_pages, "link page", "link pages"),
        plural(report.feed_entries, "feed entry", "feed entries"),
    ));
    lines.push(format!(
        "Assets: style.css, {} ({} minified)",
        plural(assets.copied, "theme file", "theme files"),
        assets.minified
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(
    tree: &CategoryTree,
    permalinks: &Permalinks,
    report: &GenerateReport,
    assets: &AssetReport,
) {
    for line in format_build_output(tree, permalinks, report, assets) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
