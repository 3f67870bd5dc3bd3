//! Records shared across pipeline stages.
//!
//! [`ingest`](crate::ingest) produces them from spreadsheet rows,
//! [`tree`](crate::tree) arranges them, and the renderers read them.

use chrono::{DateTime, FixedOffset};
use std::fmt;

/// One row of the links sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// 1-based spreadsheet row, for diagnostics.
    pub row: usize,
    pub title: String,
    pub url: String,
    /// Markdown text; empty when the cell is blank.
    pub description: String,
    /// Favicon image URL derived from the link's host.
    pub favicon: Option<String>,
    /// Category path exactly as typed in the sheet (trimmed).
    pub category: String,
    pub kind: Option<String>,
    pub lang: Option<String>,
    pub sender: Option<String>,
    pub source: Option<String>,
    pub created: Option<DateTime<FixedOffset>>,
}

/// One row of the categories sheet: a category and its optional overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDecl {
    pub row: usize,
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl CategoryDecl {
    pub fn new(row: usize, path: &str) -> Self {
        Self {
            row,
            path: path.to_string(),
            title: None,
            description: None,
        }
    }
}

/// A data-quality finding that does not stop the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A link with no category; it is listed under the root.
    BlankCategory { row: usize, title: String },
    /// A link URL seen on an earlier row; the later row is skipped.
    DuplicateLink {
        row: usize,
        url: String,
        first_row: usize,
    },
    /// A categories-sheet row with content but no path; skipped.
    BlankDeclaration { row: usize },
    /// A declared category with no links anywhere below it.
    UnusedCategory { path: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::BlankCategory { row, title } => {
                write!(f, "row {row}: link \"{title}\" has no category, listed at the root")
            }
            Warning::DuplicateLink {
                row,
                url,
                first_row,
            } => write!(f, "row {row}: {url} already listed on row {first_row}, skipped"),
            Warning::BlankDeclaration { row } => {
                write!(f, "row {row}: category row without a path, skipped")
            }
            Warning::UnusedCategory { path } => {
                write!(f, "category \"{path}\" is declared but has no links")
            }
        }
    }
}
