//! Spreadsheet retrieval.
//!
//! The link directory lives in a published `.xlsx` workbook with two sheets:
//! one row per link and one row per category declaration. This module fetches
//! the workbook (or reads a local copy) and flattens both sheets into
//! [`Workbook`], a plain grid of typed [`Cell`]s that the rest of the pipeline
//! works on without knowing anything about the file format.
//!
//! Spreadsheet ranges start at their first non-empty cell; [`Sheet`] pads the
//! grid back so column indices match the sheet's real columns and
//! [`Sheet::first_row`] keeps reported row numbers aligned with what the
//! editor shows.

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use chrono::NaiveDateTime;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("Sheet \"{name}\" not found (available: {available})")]
    MissingSheet { name: String, available: String },
    #[error("No spreadsheet URL configured (set spreadsheet.url or SPREADSHEET_URL)")]
    NoUrl,
}

/// A single spreadsheet value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// A formula error such as `#REF!` or `#N/A`.
    Error(String),
}

impl Cell {
    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Trimmed textual value, `None` when blank.
    pub fn text(&self) -> Option<String> {
        let text = match self {
            Cell::Empty | Cell::Error(_) => return None,
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => format_number(*n),
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        };
        (!text.is_empty()).then_some(text)
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(Cell::DateTime)
                .unwrap_or(Cell::Number(dt.as_f64())),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }
}

/// Integral values print without a fractional part (`3`, not `3.0`).
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One worksheet as a grid of cells, header row included.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    /// 1-based spreadsheet row number of `rows[0]`.
    pub first_row: usize,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: &str, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.to_string(),
            first_row: 1,
            rows,
        }
    }

    /// Rows after the header, paired with their spreadsheet row number.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[Cell])> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, row)| (self.first_row + i, row.as_slice()))
    }
}

/// The two sheets the build reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub links: Sheet,
    pub categories: Sheet,
}

/// Download the workbook export from `url`.
pub fn fetch(url: &str) -> Result<Vec<u8>, SourceError> {
    if url.trim().is_empty() {
        return Err(SourceError::NoUrl);
    }
    info!(url, "fetching spreadsheet");
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let bytes = response.bytes()?;
    debug!(bytes = bytes.len(), "spreadsheet downloaded");
    Ok(bytes.to_vec())
}

/// Read a workbook export from disk.
pub fn read_file(path: &Path) -> Result<Vec<u8>, SourceError> {
    info!(path = %path.display(), "reading spreadsheet");
    Ok(std::fs::read(path)?)
}

/// Parse `.xlsx` bytes and extract the links and categories sheets.
pub fn parse_workbook(
    bytes: Vec<u8>,
    links_sheet: &str,
    categories_sheet: &str,
) -> Result<Workbook, SourceError> {
    let mut xlsx: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let names = xlsx.sheet_names();

    let mut read_sheet = |name: &str| -> Result<Sheet, SourceError> {
        if !names.iter().any(|n| n == name) {
            return Err(SourceError::MissingSheet {
                name: name.to_string(),
                available: names.join(", "),
            });
        }
        let range = xlsx.worksheet_range(name)?;
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let rows = range
            .rows()
            .map(|row| {
                let mut cells = vec![Cell::Empty; start_col as usize];
                cells.extend(row.iter().map(Cell::from));
                cells
            })
            .collect::<Vec<_>>();
        debug!(sheet = name, rows = rows.len(), "sheet read");
        Ok(Sheet {
            name: name.to_string(),
            first_row: start_row as usize + 1,
            rows,
        })
    };

    Ok(Workbook {
        links: read_sheet(links_sheet)?,
        categories: read_sheet(categories_sheet)?,
    })
}
