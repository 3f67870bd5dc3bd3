//! Row normalization.
//!
//! Converts the raw sheet grids into typed [`Link`] and [`CategoryDecl`]
//! records. This is the ingestion boundary: every cell is converted to its
//! semantic type here, and nothing downstream looks at raw cells again.
//!
//! ## Rules
//!
//! - The first row of each sheet is a header and is skipped.
//! - Rows whose cells are all blank are skipped.
//! - Text is trimmed.
//! - A link without a title or URL, a URL that does not parse, or a creation
//!   date that cannot be read is fatal: the error names the sheet, row, and
//!   column so the sheet can be fixed.
//! - A URL already listed on an earlier row is skipped with a
//!   [`Warning::DuplicateLink`].
//! - A categories row with content but no path is skipped with a
//!   [`Warning::BlankDeclaration`].
//!
//! Creation dates are spreadsheet-local; they are pinned to the configured
//! UTC offset (`spreadsheet.timezone_hours`).

use crate::config::{ColumnsConfig, SpreadsheetConfig};
use crate::source::{Cell, Sheet, Workbook};
use crate::types::{CategoryDecl, Link, Warning};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, PartialEq)]
pub enum IngestError {
    #[error("{sheet} row {row}: missing value in column \"{column}\"")]
    MissingValue {
        sheet: String,
        row: usize,
        column: &'static str,
    },
    #[error("{sheet} row {row}: invalid {column} \"{value}\": {reason}")]
    InvalidValue {
        sheet: String,
        row: usize,
        column: &'static str,
        value: String,
        reason: String,
    },
}

/// Normalized spreadsheet contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub links: Vec<Link>,
    pub categories: Vec<CategoryDecl>,
    pub warnings: Vec<Warning>,
}

pub fn ingest(workbook: &Workbook, config: &SpreadsheetConfig) -> Result<Ingested, IngestError> {
    let mut warnings = Vec::new();
    let offset = utc_offset(config.timezone_hours);
    let links = read_links(
        &workbook.links,
        &config.columns,
        offset,
        &config.favicon_service,
        &mut warnings,
    )?;
    let categories = read_categories(&workbook.categories, &mut warnings)?;
    info!(
        links = links.len(),
        categories = categories.len(),
        "spreadsheet rows normalized"
    );
    Ok(Ingested {
        links,
        categories,
        warnings,
    })
}

/// Fixed offset for `hours`, clamped to the valid ±23h range.
pub fn utc_offset(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours.clamp(-23, 23) * 3600).unwrap_or_else(|| Utc.fix())
}

static EMPTY_CELL: Cell = Cell::Empty;

fn read_links(
    sheet: &Sheet,
    columns: &ColumnsConfig,
    offset: FixedOffset,
    favicon_service: &str,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Link>, IngestError> {
    let mut links = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for (row, cells) in sheet.data_rows() {
        if cells.iter().all(Cell::is_blank) {
            continue;
        }
        let cell = |index: usize| cells.get(index).unwrap_or(&EMPTY_CELL);
        let text = |index: usize| cell(index).text();
        let required = |index: usize, column: &'static str| {
            text(index).ok_or_else(|| IngestError::MissingValue {
                sheet: sheet.name.clone(),
                row,
                column,
            })
        };

        let named = [
            (columns.title, "title"),
            (columns.url, "url"),
            (columns.description, "description"),
            (columns.category, "category"),
            (columns.kind, "kind"),
            (columns.lang, "lang"),
            (columns.sender, "sender"),
            (columns.source, "source"),
            (columns.created, "created"),
        ];
        reject_formula_errors(sheet, row, cells, &named)?;

        let title = required(columns.title, "title")?;
        let url = required(columns.url, "url")?;
        let parsed = url::Url::parse(&url).map_err(|e| IngestError::InvalidValue {
            sheet: sheet.name.clone(),
            row,
            column: "url",
            value: url.clone(),
            reason: e.to_string(),
        })?;
        let created = read_timestamp(cell(columns.created), offset).map_err(|reason| {
            IngestError::InvalidValue {
                sheet: sheet.name.clone(),
                row,
                column: "created",
                value: text(columns.created).unwrap_or_default(),
                reason,
            }
        })?;

        if let Some(&first_row) = seen.get(&url) {
            warnings.push(Warning::DuplicateLink {
                row,
                url,
                first_row,
            });
            continue;
        }
        seen.insert(url.clone(), row);

        let favicon = parsed
            .host_str()
            .map(|host| format!("{favicon_service}{host}"));

        links.push(Link {
            row,
            title,
            url,
            description: text(columns.description).unwrap_or_default(),
            favicon,
            category: text(columns.category).unwrap_or_default(),
            kind: text(columns.kind),
            lang: text(columns.lang),
            sender: text(columns.sender),
            source: text(columns.source),
            created,
        });
    }

    debug!(sheet = %sheet.name, links = links.len(), "links read");
    Ok(links)
}

fn read_categories(
    sheet: &Sheet,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<CategoryDecl>, IngestError> {
    let mut decls = Vec::new();
    for (row, cells) in sheet.data_rows() {
        if cells.iter().all(Cell::is_blank) {
            continue;
        }
        reject_formula_errors(
            sheet,
            row,
            cells,
            &[(0, "category"), (1, "title"), (2, "description")],
        )?;
        let text = |index: usize| cells.get(index).and_then(Cell::text);
        let Some(path) = text(0) else {
            warnings.push(Warning::BlankDeclaration { row });
            continue;
        };
        decls.push(CategoryDecl {
            row,
            path,
            title: text(1),
            description: text(2),
        });
    }
    Ok(decls)
}

/// A formula error in a column we read is fatal, whatever the column.
fn reject_formula_errors(
    sheet: &Sheet,
    row: usize,
    cells: &[Cell],
    columns: &[(usize, &'static str)],
) -> Result<(), IngestError> {
    for &(index, column) in columns {
        if let Some(Cell::Error(code)) = cells.get(index) {
            return Err(IngestError::InvalidValue {
                sheet: sheet.name.clone(),
                row,
                column,
                value: code.clone(),
                reason: "the cell holds a spreadsheet formula error".to_string(),
            });
        }
    }
    Ok(())
}

/// Serial of 9999-12-31, the last day a spreadsheet date can hold.
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Excel serial dates count days from 1899-12-30.
///
/// Negative, non-finite and post-9999 serials are rejected.
fn excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..MAX_EXCEL_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

fn parse_timestamp_text(text: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Read a creation timestamp. Blank cells yield `Ok(None)`.
fn read_timestamp(
    cell: &Cell,
    offset: FixedOffset,
) -> Result<Option<DateTime<FixedOffset>>, String> {
    let naive = match cell {
        Cell::Empty => return Ok(None),
        Cell::Text(s) if s.trim().is_empty() => return Ok(None),
        Cell::Text(s) if DateTime::parse_from_rfc3339(s.trim()).is_ok() => {
            return Ok(DateTime::parse_from_rfc3339(s.trim()).ok());
        }
        Cell::DateTime(dt) => *dt,
        Cell::Number(n) => excel_serial(*n).ok_or("serial date out of range")?,
        Cell::Text(s) => parse_timestamp_text(s.trim())
            .ok_or("expected YYYY-MM-DD, YYYY-MM-DD HH:MM[:SS] or RFC 3339")?,
        Cell::Bool(_) | Cell::Error(_) => return Err("expected a date".to_string()),
    };
    offset
        .from_local_datetime(&naive)
        .single()
        .map(Some)
        .ok_or_else(|| "ambiguous local time".to_string())
}
