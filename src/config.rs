//! Site configuration module.
//!
//! Handles loading, validating, and layering configuration. Each layer
//! overrides the one before it:
//!
//! ```text
//! stock defaults
//!   ← linkshelf.toml          (optional, unknown keys rejected)
//!     ← .env                  (optional, dotenv syntax)
//!       ← process environment (same keys as .env)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [spreadsheet]
//! url = ""                      # Published .xlsx export
//! links_sheet = "Links"
//! categories_sheet = "Categories"
//! category_separator = ">"      # Splits "Tech > AI" into segments
//! timezone_hours = 0            # UTC offset of spreadsheet dates
//! favicon_service = "https://www.google.com/s2/favicons?domain="
//!
//! [spreadsheet.columns]         # 0-based column indices, links sheet
//! title = 0
//! url = 1
//! description = 2
//! category = 3
//! kind = 4
//! lang = 5
//! sender = 6
//! source = 7
//! created = 8
//!
//! [site]
//! title = "Links"
//! url = "https://example.com/"
//! description = ""
//! language = "en"
//! social_handle = ""
//! latest_links = 50             # Links listed on the home page
//!
//! [feed]
//! size = 50                     # Entries in rss.xml / atom.xml
//!
//! [assets]
//! dir = "assets"                # Theme files copied to the output root
//! minify_css = true
//! ```
//!
//! ## Environment Keys
//!
//! `.env` files and the process environment use flat keys (see
//! [`ENV_KEYS`]), e.g. `SPREADSHEET_URL`, `SITE_TITLE`, `MINIMIZE_CSS`.
//! Booleans accept `y/yes/t/true/on/1` and `n/no/f/false/off/0`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(".env parse error: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full build configuration.
///
/// All fields have defaults; config files and environment variables only
/// need the values they change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Where the data comes from and how its columns are laid out.
    pub spreadsheet: SpreadsheetConfig,
    /// Metadata rendered into pages and feeds.
    pub site: SiteMeta,
    pub feed: FeedConfig,
    pub assets: AssetsConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spreadsheet.category_separator.is_whitespace() {
            return Err(ConfigError::Validation(
                "spreadsheet.category_separator must not be whitespace".into(),
            ));
        }
        if !(-23..=23).contains(&self.spreadsheet.timezone_hours) {
            return Err(ConfigError::Validation(
                "spreadsheet.timezone_hours must be between -23 and 23".into(),
            ));
        }
        if let Err(e) = url::Url::parse(&self.site.url) {
            return Err(ConfigError::Validation(format!(
                "site.url \"{}\" is not an absolute URL: {e}",
                self.site.url
            )));
        }
        if self.site.latest_links == 0 {
            return Err(ConfigError::Validation(
                "site.latest_links must be at least 1".into(),
            ));
        }
        if self.feed.size == 0 {
            return Err(ConfigError::Validation(
                "feed.size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Spreadsheet location and layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpreadsheetConfig {
    /// URL of the published `.xlsx` export.
    pub url: String,
    pub links_sheet: String,
    pub categories_sheet: String,
    /// Character separating category path segments.
    pub category_separator: char,
    /// UTC offset, in hours, applied to spreadsheet dates.
    pub timezone_hours: i32,
    /// Prefix the link's host is appended to for its favicon URL.
    pub favicon_service: String,
    pub columns: ColumnsConfig,
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            links_sheet: "Links".to_string(),
            categories_sheet: "Categories".to_string(),
            category_separator: '>',
            timezone_hours: 0,
            favicon_service: "https://www.google.com/s2/favicons?domain=".to_string(),
            columns: ColumnsConfig::default(),
        }
    }
}

/// 0-based column indices of the links sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnsConfig {
    pub title: usize,
    pub url: usize,
    pub description: usize,
    pub category: usize,
    pub kind: usize,
    pub lang: usize,
    pub sender: usize,
    pub source: usize,
    pub created: usize,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            title: 0,
            url: 1,
            description: 2,
            category: 3,
            kind: 4,
            lang: 5,
            sender: 6,
            source: 7,
            created: 8,
        }
    }
}

/// Site metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    /// Public base URL; sitemap and feed links are absolute against it.
    pub url: String,
    pub description: String,
    /// `lang` attribute of pages and feed language.
    pub language: String,
    /// Social handle used for share links (without `@`). Empty disables them.
    pub social_handle: String,
    /// Number of recent links on the home page.
    pub latest_links: usize,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "Links".to_string(),
            url: "https://example.com/".to_string(),
            description: String::new(),
            language: "en".to_string(),
            social_handle: String::new(),
            latest_links: 50,
        }
    }
}

impl SiteMeta {
    /// Absolute URL of an output-relative path.
    pub fn absolute(&self, relative: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            relative.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Number of most recent links in each feed.
    pub size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { size: 50 }
    }
}

/// Theme asset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Directory copied into the output root. Missing is fine.
    pub dir: String,
    pub minify_css: bool,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: "assets".to_string(),
            minify_css: true,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a TOML config file as a raw value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// How an environment value is converted before it lands in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvKind {
    Str,
    Int,
    Bool,
}

/// Flat environment keys and the config entry each one sets.
pub const ENV_KEYS: &[(&str, &[&str], EnvKind)] = &[
    ("SPREADSHEET_URL", &["spreadsheet", "url"], EnvKind::Str),
    ("SPREADSHEET_LINKS_PAGE_NAME", &["spreadsheet", "links_sheet"], EnvKind::Str),
    ("SPREADSHEET_CATEGORIES_PAGE_NAME", &["spreadsheet", "categories_sheet"], EnvKind::Str),
    ("SPREADSHEET_CATEGORY_SEPARATOR", &["spreadsheet", "category_separator"], EnvKind::Str),
    ("SPREADSHEET_CATEGORY_COLUMN", &["spreadsheet", "columns", "category"], EnvKind::Int),
    ("TIMEZONE_HOURS", &["spreadsheet", "timezone_hours"], EnvKind::Int),
    ("SITE_TITLE", &["site", "title"], EnvKind::Str),
    ("SITE_URL", &["site", "url"], EnvKind::Str),
    ("SITE_DESC", &["site", "description"], EnvKind::Str),
    ("SITE_LANGUAGE", &["site", "language"], EnvKind::Str),
    ("SOCIAL_HANDLE", &["site", "social_handle"], EnvKind::Str),
    ("FEED_SIZE", &["feed", "size"], EnvKind::Int),
    ("ASSETS_DIR", &["assets", "dir"], EnvKind::Str),
    ("MINIMIZE_CSS", &["assets", "minify_css"], EnvKind::Bool),
];

/// Parse a boolean the way the environment keys expect.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Build a TOML overlay from environment-style key/value pairs.
///
/// Unknown keys are ignored (the environment holds plenty of unrelated
/// variables). Returns `Ok(None)` when no known key is present.
pub fn env_overlay<I>(vars: I) -> Result<Option<toml::Value>, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut root = toml::Table::new();
    let mut found = false;

    for (key, raw) in vars {
        let Some((_, path, kind)) = ENV_KEYS.iter().find(|(k, _, _)| *k == key) else {
            continue;
        };
        let value = match kind {
            EnvKind::Str => toml::Value::String(raw),
            EnvKind::Int => raw.trim().parse::<i64>().map(toml::Value::Integer).map_err(|_| {
                ConfigError::Validation(format!("{key} must be an integer, got \"{raw}\""))
            })?,
            EnvKind::Bool => parse_bool(&raw).map(toml::Value::Boolean).ok_or_else(|| {
                ConfigError::Validation(format!("{key} must be a boolean, got \"{raw}\""))
            })?,
        };
        insert_path(&mut root, path, value);
        found = true;
    }

    Ok(found.then_some(toml::Value::Table(root)))
}

fn insert_path(table: &mut toml::Table, path: &[&str], value: toml::Value) {
    match path {
        [] => {}
        [last] => {
            table.insert(last.to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = table
                .entry(head.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            if let toml::Value::Table(inner) = entry {
                insert_path(inner, rest, value);
            }
        }
    }
}

/// Parse `.env` content into key/value pairs.
///
/// Follows the usual dotenv rules: `#` comments (also after a value),
/// an optional `export ` prefix, quoted values, escapes inside double
/// quotes. Values containing spaces must be quoted. Pairs are returned, the
/// process environment is left untouched.
pub fn parse_dotenv(content: &str) -> Result<Vec<(String, String)>, ConfigError> {
    Ok(dotenvy::from_read_iter(content.as_bytes()).collect::<Result<Vec<_>, dotenvy::Error>>()?)
}

/// Read a `.env` file, `Ok(vec![])` when it does not exist.
pub fn load_dotenv(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    Ok(dotenvy::from_path_iter(path)?.collect::<Result<Vec<_>, dotenvy::Error>>()?)
}

/// Merge overlays onto a base value in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = Option<toml::Value>>,
) -> Result<SiteConfig, ConfigError> {
    let merged = overlays
        .into_iter()
        .flatten()
        .fold(base, merge_toml);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the full configuration.
///
/// Layers the config file, the `.env` file, and `env` (normally
/// `std::env::vars()`) on top of the stock defaults.
pub fn load_config<I>(config_path: &Path, dotenv_path: &Path, env: I) -> Result<SiteConfig, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let file = load_raw_config(config_path)?;
    let dotenv = env_overlay(load_dotenv(dotenv_path)?)?;
    let process_env = env_overlay(env)?;
    resolve_config(stock_defaults_value(), [file, dotenv, process_env])
}

/// Returns a fully-commented stock `linkshelf.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# linkshelf configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Every value can also come from a .env file or the environment; those
# override this file. Unknown keys in this file cause an error.

# ---------------------------------------------------------------------------
# Spreadsheet
# ---------------------------------------------------------------------------
[spreadsheet]
# Published .xlsx export of the spreadsheet.           env: SPREADSHEET_URL
url = ""

# Sheet holding one row per link.                      env: SPREADSHEET_LINKS_PAGE_NAME
links_sheet = "Links"

# Sheet holding category declarations.                 env: SPREADSHEET_CATEGORIES_PAGE_NAME
# Columns: path, title override, description override.
categories_sheet = "Categories"

# Character separating category path segments.         env: SPREADSHEET_CATEGORY_SEPARATOR
# "Tech > AI" becomes the category AI inside Tech.
category_separator = ">"

# UTC offset, in hours, of dates typed into the sheet. env: TIMEZONE_HOURS
timezone_hours = 0

# The link's host is appended to this for its favicon.
favicon_service = "https://www.google.com/s2/favicons?domain="

# 0-based column indices of the links sheet.
[spreadsheet.columns]
title = 0
url = 1
description = 2
category = 3                                           # env: SPREADSHEET_CATEGORY_COLUMN
kind = 4
lang = 5
sender = 6
source = 7
created = 8

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
title = "Links"                                        # env: SITE_TITLE
url = "https://example.com/"                           # env: SITE_URL
description = ""                                       # env: SITE_DESC
language = "en"                                        # env: SITE_LANGUAGE
social_handle = ""                                     # env: SOCIAL_HANDLE

# Number of recent links on the home page.
latest_links = 50

# ---------------------------------------------------------------------------
# Feeds (rss.xml, atom.xml)
# ---------------------------------------------------------------------------
[feed]
size = 50                                              # env: FEED_SIZE

# ---------------------------------------------------------------------------
# Theme assets
# ---------------------------------------------------------------------------
[assets]
# Copied into the output root; may override style.css.  env: ASSETS_DIR
dir = "assets"

# Strip comments and whitespace from .css files.       env: MINIMIZE_CSS
minify_css = true
"##
}
