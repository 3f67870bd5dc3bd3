//! Shared test utilities for the linkshelf test suite.
//!
//! Provides in-memory workbook builders, record constructors, node lookups,
//! and a tree-shape assertion that work with the pipeline's data structures
//! (`Workbook`, `Link`, `CategoryTree`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tree = build(
//!     &[decl("Tech"), decl("Tech>AI")],
//!     vec![link(2, "Foo", "https://foo.example", "Tech > AI")],
//!     '>',
//! );
//!
//! assert_eq!(link_titles(&tree, "Tech>AI"), vec!["Foo"]);
//! assert_tree_shape(&tree, &[
//!     ("Tech", &["Tech>AI"]),
//!     ("Tech>AI", &[]),
//! ]);
//! ```

use crate::source::{Cell, Sheet, Workbook};
use crate::tree::{CategoryNode, CategoryTree};
use crate::types::{CategoryDecl, Link};

// =========================================================================
// Workbook builders
// =========================================================================

/// A workbook whose sheets hold a header row followed by `links` and
/// `categories`. Data rows start at spreadsheet row 2.
pub fn workbook(links: Vec<Vec<Cell>>, categories: Vec<Vec<Cell>>) -> Workbook {
    let with_header = |header: &[&str], rows: Vec<Vec<Cell>>| {
        let mut all = vec![header.iter().map(|h| Cell::Text(h.to_string())).collect()];
        all.extend(rows);
        all
    };
    Workbook {
        links: Sheet::new(
            "Links",
            with_header(&["title", "url", "description", "category"], links),
        ),
        categories: Sheet::new(
            "Categories",
            with_header(&["category", "title", "description"], categories),
        ),
    }
}

/// Cells for a links-sheet row in the default column layout.
pub fn link_row(title: &str, url: &str, description: &str, category: &str) -> Vec<Cell> {
    [title, url, description, category]
        .iter()
        .map(|v| Cell::Text(v.to_string()))
        .collect()
}

// =========================================================================
// Record constructors
// =========================================================================

/// A category declaration on row 2 with no overrides.
pub fn decl(path: &str) -> CategoryDecl {
    CategoryDecl::new(2, path)
}

/// A link with only the required fields and a category.
pub fn link(row: usize, title: &str, url: &str, category: &str) -> Link {
    Link {
        row,
        title: title.to_string(),
        url: url.to_string(),
        description: String::new(),
        favicon: None,
        category: category.to_string(),
        kind: None,
        lang: None,
        sender: None,
        source: None,
        created: None,
    }
}

// =========================================================================
// Tree lookups: panic with the available paths on a miss
// =========================================================================

/// All non-root canonical paths in walk order.
pub fn node_paths(tree: &CategoryTree) -> Vec<String> {
    tree.walk()
        .iter()
        .filter(|n| !n.is_root())
        .map(|n| n.path().to_canonical(tree.separator()))
        .collect()
}

/// Find a node by its path (any spacing around separators). Panics if not found.
pub fn find_node<'a>(tree: &'a CategoryTree, path: &str) -> &'a CategoryNode {
    tree.resolve(path).unwrap_or_else(|| {
        let paths = node_paths(tree);
        panic!("category '{path}' not found. Available: {paths:?}")
    })
}

/// Child names of a node in order.
pub fn child_names(node: &CategoryNode) -> Vec<&str> {
    node.children().iter().map(|c| c.name()).collect()
}

/// Titles of the links placed directly on `path`. Panics if not found.
pub fn link_titles<'a>(tree: &'a CategoryTree, path: &str) -> Vec<&'a str> {
    let node = find_node(tree, path);
    tree.links_of(node).map(|(_, l)| l.title.as_str()).collect()
}

/// Assert that the full category tree matches an expected shape.
///
/// Each entry is `(path, child paths)` in walk order, root excluded. Use
/// `&[]` for leaf nodes.
///
/// ```rust
/// assert_tree_shape(&tree, &[
///     ("Tech", &["Tech>AI"]),
///     ("Tech>AI", &[]),
///     ("Science", &[]),
/// ]);
/// ```
pub fn assert_tree_shape(tree: &CategoryTree, expected: &[(&str, &[&str])]) {
    let expected_paths: Vec<&str> = expected.iter().map(|(p, _)| *p).collect();
    assert_eq!(node_paths(tree), expected_paths, "tree nodes mismatch");

    for (path, children) in expected {
        let actual: Vec<String> = find_node(tree, path)
            .children()
            .iter()
            .map(|c| c.path().to_canonical(tree.separator()))
            .collect();
        assert_eq!(actual, children.to_vec(), "children of '{path}' mismatch");
    }
}
