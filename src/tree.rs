//! Category tree construction.
//!
//! Turns the flat category declarations and link rows into a rooted tree.
//! Every category path is walked from the root one segment at a time; a
//! missing child is appended on the spot, so intermediate categories that
//! were never declared on their own row are materialized implicitly:
//!
//! ```text
//! declarations: "Tech", "Tech>AI", "Science>Space"
//! links:        "Tech > AI" (Foo), "" (Bar), "Science>Biology" (Baz)
//!
//! (root)            links: Bar
//! ├── Tech
//! │   └── AI        links: Foo
//! └── Science       (implicit)
//!     ├── Space
//!     └── Biology   links: Baz   (implicit)
//! ```
//!
//! Children keep the order in which their names first appeared, declarations
//! before links, so a depth-first walk reproduces the spreadsheet's ordering.
//! Names are matched exactly; `Tech` and `tech` become two siblings.
//!
//! Nothing here fails. Links with a blank category land on the root and a
//! [`Warning::BlankCategory`] is recorded; declared categories that end up
//! without any link below them yield [`Warning::UnusedCategory`].

use crate::naming::CategoryPath;
use crate::types::{CategoryDecl, Link, Warning};
use tracing::debug;

/// One category. The root has an empty name and path.
#[derive(Debug, Clone)]
pub struct CategoryNode {
    name: String,
    path: CategoryPath,
    title: Option<String>,
    description: Option<String>,
    declared: bool,
    children: Vec<CategoryNode>,
    links: Vec<usize>,
}

impl CategoryNode {
    fn new(path: CategoryPath) -> Self {
        Self {
            name: path.name().unwrap_or_default().to_string(),
            path,
            title: None,
            description: None,
            declared: false,
            children: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &CategoryPath {
        &self.path
    }

    /// Display title: the sheet's override, falling back to the name.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether a categories-sheet row named this exact path.
    pub fn is_declared(&self) -> bool {
        self.declared
    }

    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }

    pub fn children(&self) -> &[CategoryNode] {
        &self.children
    }

    /// Indices into [`CategoryTree::links`] of the links placed directly here.
    pub fn link_indices(&self) -> &[usize] {
        &self.links
    }

    /// Links placed here or anywhere below.
    pub fn descendant_link_count(&self) -> usize {
        self.links.len()
            + self
                .children
                .iter()
                .map(CategoryNode::descendant_link_count)
                .sum::<usize>()
    }

    fn child(&self, name: &str) -> Option<&CategoryNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// The finished tree plus the links it indexes.
#[derive(Debug, Clone)]
pub struct CategoryTree {
    root: CategoryNode,
    links: Vec<Link>,
    placements: Vec<CategoryPath>,
    separator: char,
    warnings: Vec<Warning>,
}

impl CategoryTree {
    pub fn root(&self) -> &CategoryNode {
        &self.root
    }

    /// All links in sheet order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn node(&self, path: &CategoryPath) -> Option<&CategoryNode> {
        path.segments()
            .iter()
            .try_fold(&self.root, |node, segment| node.child(segment))
    }

    /// Parse `raw` with the tree's separator and look the node up.
    pub fn resolve(&self, raw: &str) -> Option<&CategoryNode> {
        self.node(&CategoryPath::parse(raw, self.separator))
    }

    /// Path of the node the link at `index` was attached to.
    pub fn placement(&self, index: usize) -> &CategoryPath {
        &self.placements[index]
    }

    /// Canonical category string of a link, empty for root links.
    pub fn category_of(&self, index: usize) -> String {
        self.placements[index].to_canonical(self.separator)
    }

    /// Links placed directly on `node`, in sheet order.
    pub fn links_of<'a>(&'a self, node: &'a CategoryNode) -> impl Iterator<Item = (usize, &'a Link)> {
        node.links.iter().map(|&i| (i, &self.links[i]))
    }

    /// Nodes from root to `path`, root excluded. Stops at the first missing
    /// segment.
    pub fn lineage(&self, path: &CategoryPath) -> Vec<&CategoryNode> {
        path.ancestors().map_while(|p| self.node(&p)).collect()
    }

    /// Every node, root first, depth-first in child order.
    pub fn walk(&self) -> Vec<&CategoryNode> {
        fn visit<'a>(node: &'a CategoryNode, out: &mut Vec<&'a CategoryNode>) {
            out.push(node);
            for child in &node.children {
                visit(child, out);
            }
        }
        let mut out = Vec::new();
        visit(&self.root, &mut out);
        out
    }

    /// Number of categories, root excluded.
    pub fn category_count(&self) -> usize {
        self.walk().len() - 1
    }
}

/// Build the tree from category declarations, then place every link.
pub fn build(decls: &[CategoryDecl], links: Vec<Link>, separator: char) -> CategoryTree {
    let mut root = CategoryNode::new(CategoryPath::root());
    let mut warnings = Vec::new();

    for decl in decls {
        let path = CategoryPath::parse(&decl.path, separator);
        if path.is_root() {
            continue;
        }
        let node = materialize(&mut root, &path);
        node.declared = true;
        if let Some(title) = &decl.title {
            node.title = Some(title.clone());
        }
        if let Some(description) = &decl.description {
            node.description = Some(description.clone());
        }
    }

    let mut placements = Vec::with_capacity(links.len());
    for (index, link) in links.iter().enumerate() {
        let path = CategoryPath::parse(&link.category, separator);
        if path.is_root() {
            warnings.push(Warning::BlankCategory {
                row: link.row,
                title: link.title.clone(),
            });
        }
        materialize(&mut root, &path).links.push(index);
        placements.push(path);
    }

    let mut tree = CategoryTree {
        root,
        links,
        placements,
        separator,
        warnings,
    };

    let unused: Vec<Warning> = tree
        .walk()
        .into_iter()
        .filter(|node| node.declared && node.descendant_link_count() == 0)
        .map(|node| Warning::UnusedCategory {
            path: node.path.to_canonical(separator),
        })
        .collect();
    tree.warnings.extend(unused);

    debug!(
        categories = tree.category_count(),
        links = tree.links.len(),
        "category tree built"
    );
    tree
}

/// Walk `path` from `root`, appending any missing child, and return the
/// final node.
fn materialize<'a>(root: &'a mut CategoryNode, path: &CategoryPath) -> &'a mut CategoryNode {
    let mut node = root;
    for segment in path.segments() {
        let index = match node.children.iter().position(|c| c.name == *segment) {
            Some(index) => index,
            None => {
                let child = CategoryNode::new(node.path.child(segment));
                node.children.push(child);
                node.children.len() - 1
            }
        };
        node = &mut node.children[index];
    }
    node
}
