//! Centralized parsing for category paths and URL slugs.
//!
//! Category paths arrive from the spreadsheet as a single cell, with segments
//! joined by a configurable separator character:
//!
//! ```text
//! "Internet > Search Engines"   → ["Internet", "Search Engines"]
//! " Tech>AI "                   → ["Tech", "AI"]
//! ">Tech>>AI>"                  → ["Tech", "AI"]
//! "   "                         → []  (root)
//! ```
//!
//! Segments are trimmed and empty pieces are dropped. Nothing else is
//! normalized: `"Tech"` and `"tech"` are different categories.
//!
//! ## Slugs
//!
//! Output directories and file names are derived with [`slugify`], which
//! transliterates to ASCII, lowercases, and collapses every run of other
//! characters into a single dash:
//! - `"Search Engines"` → `"search-engines"`
//! - `"Günün Linki"` → `"gunun-linki"`
//! - `"https://example.com/a?b"` → `"https-example-com-a-b"`

/// An ordered list of category names. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryPath {
    segments: Vec<String>,
}

impl CategoryPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Split `raw` on `separator`, trim every piece, drop empty pieces.
    pub fn parse(raw: &str, separator: char) -> Self {
        let segments = raw
            .split(separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn child(&self, name: &str) -> CategoryPath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Every non-root prefix of this path, shortest first, ending with the
    /// path itself.
    pub fn ancestors(&self) -> impl Iterator<Item = CategoryPath> + '_ {
        (1..=self.segments.len()).map(|n| Self {
            segments: self.segments[..n].to_vec(),
        })
    }

    /// Segments joined with the bare separator, e.g. `Tech>AI`.
    ///
    /// Parsing the canonical form yields an equal path.
    pub fn to_canonical(&self, separator: char) -> String {
        self.segments.join(&separator.to_string())
    }
}

/// Convert arbitrary text into a lowercase ASCII slug.
///
/// Every character is transliterated with `deunicode`, so non-Latin names
/// keep a readable slug (`"Новости"` → `"novosti"`, `"日本"` → `"ri-ben"`).
/// Returns an empty string when nothing alphanumeric survives; callers pick
/// their own fallback.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut need_dash = false;

    for ch in text.chars() {
        for b in deunicode::deunicode_char(ch).unwrap_or("-").bytes() {
            if b.is_ascii_alphanumeric() {
                if need_dash {
                    slug.push('-');
                    need_dash = false;
                }
                slug.push(b.to_ascii_lowercase() as char);
            } else {
                need_dash = !slug.is_empty();
            }
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_segments() {
        let p = CategoryPath::parse("Internet > Search Engines", '>');
        assert_eq!(p.segments(), ["Internet", "Search Engines"]);
    }

    #[test]
    fn parse_drops_empty_segments() {
        let p = CategoryPath::parse(">Tech>> AI >", '>');
        assert_eq!(p.segments(), ["Tech", "AI"]);
    }

    #[test]
    fn parse_blank_is_root() {
        assert!(CategoryPath::parse("", '>').is_root());
        assert!(CategoryPath::parse("   ", '>').is_root());
        assert!(CategoryPath::parse(" > > ", '>').is_root());
    }

    #[test]
    fn parse_uses_configured_separator() {
        let p = CategoryPath::parse("a / b > c", '/');
        assert_eq!(p.segments(), ["a", "b > c"]);
    }

    #[test]
    fn parse_is_case_sensitive() {
        let a = CategoryPath::parse("Tech", '>');
        let b = CategoryPath::parse("tech", '>');
        assert_ne!(a, b);
    }

    #[test]
    fn canonical_form_round_trips() {
        let p = CategoryPath::parse("  Tech >  AI  ", '>');
        let canonical = p.to_canonical('>');
        assert_eq!(canonical, "Tech>AI");
        assert_eq!(CategoryPath::parse(&canonical, '>'), p);
    }

    #[test]
    fn child_appends_segment() {
        let p = CategoryPath::parse("a>b", '>');
        assert_eq!(p.child("c"), CategoryPath::parse("a>b>c", '>'));
        assert_eq!(CategoryPath::root().child("a"), CategoryPath::parse("a", '>'));
    }

    #[test]
    fn ancestors_shortest_first() {
        let p = CategoryPath::parse("a>b>c", '>');
        let canon: Vec<String> = p.ancestors().map(|a| a.to_canonical('>')).collect();
        assert_eq!(canon, vec!["a", "a>b", "a>b>c"]);
        assert_eq!(CategoryPath::root().ancestors().count(), 0);
    }

    #[test]
    fn name_is_last_segment() {
        assert_eq!(CategoryPath::parse("a>b", '>').name(), Some("b"));
        assert_eq!(CategoryPath::root().name(), None);
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Search Engines"), "search-engines");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
    }

    #[test]
    fn slugify_folds_accents() {
        assert_eq!(slugify("Günün Linki"), "gunun-linki");
        assert_eq!(slugify("İstanbul Şehir Ağı"), "istanbul-sehir-agi");
        assert_eq!(slugify("Straße"), "strasse");
    }

    #[test]
    fn slugify_url() {
        assert_eq!(
            slugify("https://example.com/a?b=1"),
            "https-example-com-a-b-1"
        );
    }

    #[test]
    fn slugify_transliterates_non_latin() {
        assert_eq!(slugify("Новости"), "novosti");
        assert_eq!(slugify("日本"), "ri-ben");
        let greek = slugify("Ελληνικά");
        assert!(greek.starts_with("ell"), "{greek}");
        assert!(greek.bytes().all(|b| b.is_ascii_lowercase()), "{greek}");
    }

    #[test]
    fn slugify_nothing_left() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify("  -- "), "");
    }
}
