//! Stylesheet and theme asset publishing.
//!
//! The default stylesheet is embedded at compile time and written to
//! `style.css` in the output root. A theme directory, if present, is then
//! copied over the output root file by file, so a theme `style.css` replaces
//! the default one and anything else (fonts, images, a favicon) lands next to
//! the pages.
//!
//! `.css` files are minified on the way out when `assets.minify_css` is set:
//! comments are stripped and whitespace collapsed. Other files are copied
//! byte-for-byte.

use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

const STYLE_CSS: &str = include_str!("../static/style.css");

/// What [`publish`] wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetReport {
    /// Theme files copied, minified ones included.
    pub copied: usize,
    pub minified: usize,
}

/// Write the default stylesheet, then copy the theme directory on top.
///
/// A missing theme directory is not an error.
pub fn publish(
    theme_dir: Option<&Path>,
    output_dir: &Path,
    minify_css: bool,
) -> Result<AssetReport, AssetError> {
    fs::create_dir_all(output_dir)?;
    write_css(&output_dir.join("style.css"), STYLE_CSS, minify_css)?;

    let mut report = AssetReport::default();
    let Some(theme_dir) = theme_dir.filter(|dir| dir.is_dir()) else {
        debug!(dir = ?theme_dir, "no theme directory, default stylesheet only");
        return Ok(report);
    };

    for entry in WalkDir::new(theme_dir).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(theme_dir) else {
            continue;
        };
        let target = output_dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if minify_css && is_css(entry.path()) {
            let content = fs::read_to_string(entry.path())?;
            write_css(&target, &content, true)?;
            report.minified += 1;
        } else {
            fs::copy(entry.path(), &target)?;
        }
        report.copied += 1;
        debug!(from = %entry.path().display(), to = %target.display(), "asset copied");
    }

    Ok(report)
}

fn is_css(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("css"))
}

fn write_css(target: &Path, css: &str, minify: bool) -> std::io::Result<()> {
    if minify {
        fs::write(target, minify_css(css))
    } else {
        fs::write(target, css)
    }
}

/// Strip comments and collapse whitespace.
///
/// Whitespace next to `{ } ; , >` is dropped entirely, a trailing `;`
/// before `}` goes too. After `:` whitespace is dropped, but a space before
/// it is kept: in `.nav :first-child` it is a descendant combinator. String
/// literals are copied untouched.
pub fn minify_css(css: &str) -> String {
    const TIGHT: &[char] = &['{', '}', ';', ':', ',', '>'];
    const TIGHT_BEFORE: &[char] = &['{', '}', ';', ',', '>'];

    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '"' | '\'' => {
                if pending_space && !out.is_empty() && !out.ends_with(TIGHT) {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
                let mut escaped = false;
                for s in chars.by_ref() {
                    out.push(s);
                    if escaped {
                        escaped = false;
                    } else if s == '\\' {
                        escaped = true;
                    } else if s == c {
                        break;
                    }
                }
            }
            c if c.is_whitespace() => pending_space = true,
            c => {
                if c == '}' && out.ends_with(';') {
                    out.pop();
                }
                if pending_space && !out.is_empty() && !out.ends_with(TIGHT) && !TIGHT_BEFORE.contains(&c) {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn minify_strips_comments_and_whitespace() {
        let css = "/* header */\nbody {\n  color: red;\n  margin: 0 auto;\n}\n\na > b,\nc { x: y }\n";
        assert_eq!(minify_css(css), "body{color:red;margin:0 auto}a>b,c{x:y}");
    }

    #[test]
    fn minify_keeps_strings() {
        let css = r#"a::before { content: "/* not a comment */  ;" }"#;
        assert_eq!(minify_css(css), r#"a::before{content:"/* not a comment */  ;"}"#);
    }

    #[test]
    fn minify_keeps_descendant_selectors() {
        assert_eq!(minify_css(".nav   ul li { }"), ".nav ul li{}");
    }

    #[test]
    fn minify_keeps_space_before_pseudo_class() {
        assert_eq!(
            minify_css(".nav :first-child { color: red }"),
            ".nav :first-child{color:red}"
        );
        assert_eq!(minify_css("a:hover ::selection {}"), "a:hover ::selection{}");
    }

    #[test]
    fn embedded_stylesheet_is_written() {
        let tmp = TempDir::new().unwrap();
        let report = publish(None, tmp.path(), false).unwrap();

        assert_eq!(report, AssetReport::default());
        let written = fs::read_to_string(tmp.path().join("style.css")).unwrap();
        assert_eq!(written, STYLE_CSS);
    }

    #[test]
    fn embedded_stylesheet_is_minified() {
        let tmp = TempDir::new().unwrap();
        publish(None, tmp.path(), true).unwrap();
        let written = fs::read_to_string(tmp.path().join("style.css")).unwrap();
        assert!(written.len() < STYLE_CSS.len());
        assert!(!written.contains("/*"));
    }

    #[test]
    fn missing_theme_dir_is_fine() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        let report = publish(Some(&tmp.path().join("nope")), &out, true).unwrap();
        assert_eq!(report.copied, 0);
        assert!(out.join("style.css").is_file());
    }

    #[test]
    fn theme_files_are_copied_and_override_default() {
        let tmp = TempDir::new().unwrap();
        let theme = tmp.path().join("assets");
        fs::create_dir_all(theme.join("fonts")).unwrap();
        fs::write(theme.join("style.css"), "body {\n  color: blue;\n}\n").unwrap();
        fs::write(theme.join("fonts/sans.woff2"), [0u8, 159, 146, 150]).unwrap();
        let out = tmp.path().join("docs");

        let report = publish(Some(&theme), &out, true).unwrap();

        assert_eq!(report, AssetReport { copied: 2, minified: 1 });
        assert_eq!(
            fs::read_to_string(out.join("style.css")).unwrap(),
            "body{color:blue}"
        );
        assert_eq!(fs::read(out.join("fonts/sans.woff2")).unwrap(), vec![0u8, 159, 146, 150]);
    }

    #[test]
    fn css_copied_verbatim_without_minify() {
        let tmp = TempDir::new().unwrap();
        let theme = tmp.path().join("assets");
        fs::create_dir_all(&theme).unwrap();
        fs::write(theme.join("extra.css"), "a { b: c; }\n").unwrap();
        let out = tmp.path().join("docs");

        let report = publish(Some(&theme), &out, false).unwrap();

        assert_eq!(report.minified, 0);
        assert_eq!(fs::read_to_string(out.join("extra.css")).unwrap(), "a { b: c; }\n");
    }
}
