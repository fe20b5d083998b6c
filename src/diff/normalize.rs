use std::sync::OnceLock;

use regex::Regex;

/// Canonicalize routine source so cosmetic edits do not count as drift.
///
/// Steps run in a fixed order: unify line endings, collapse whitespace runs,
/// strip `--` comments, strip `/* */` comments, trim. Line comments are
/// stripped after the collapse, so a `--` swallows the rest of the text
/// rather than just its own line.
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n");
    let collapsed = whitespace_re().replace_all(&unified, " ");
    let without_line = line_comment_re().replace_all(&collapsed, "");
    let without_block = block_comment_re().replace_all(&without_line, "");
    without_block.trim_matches(is_space).to_string()
}

/// Whether two routine bodies are equivalent after normalization.
pub fn equivalent(left: &str, right: &str) -> bool {
    normalize(left) == normalize(right)
}

// ECMAScript whitespace plus line terminators. Unlike `char::is_whitespace`
// this includes U+FEFF and excludes U+0085.
fn is_space(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' ' | '\u{A0}' | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}' | '\u{2029}' | '\u{202F}' | '\u{205F}' | '\u{3000}' | '\u{FEFF}'
    )
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"[\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]+",
        )
        .expect("valid regex")
    })
}

fn line_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)--.*$").expect("valid regex"))
}

fn block_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_line_comment_is_ignored() {
        assert_eq!(normalize("SELECT 1; -- comment"), normalize("SELECT   1;"));
        assert_eq!(normalize("SELECT   1;"), "SELECT 1;");
    }

    #[test]
    fn line_endings_are_unified() {
        assert_eq!(normalize("a\r\nb"), normalize("a\nb"));
        assert_eq!(normalize("a\r\nb"), "a b");
    }

    #[test]
    fn leading_block_comment_is_ignored() {
        assert_eq!(normalize("/* x */ SELECT 1"), normalize("SELECT 1"));
        assert_eq!(normalize("/* x */ SELECT 1"), "SELECT 1");
    }

    #[test]
    fn block_comment_spanning_lines_is_removed() {
        let sql = "CREATE PROC p AS\n/* multi\n   line */\nSELECT 1";
        assert_eq!(normalize(sql), "CREATE PROC p AS  SELECT 1");
    }

    #[test]
    fn block_comments_are_non_greedy() {
        assert_eq!(normalize("/* a */ x /* b */ y"), "x  y");
    }

    #[test]
    fn line_comment_consumes_rest_of_text_after_collapse() {
        // Statements after a `--` on an earlier line are dropped as well.
        let sql = "SELECT 1; -- first\nSELECT 2;";
        assert_eq!(normalize(sql), "SELECT 1;");
        assert!(equivalent(sql, "SELECT 1;\n-- other\nSELECT 3;"));
    }

    #[test]
    fn line_comment_inside_block_comment_truncates_first() {
        assert_eq!(normalize("/* a -- b */ SELECT 1"), "/* a");
    }

    #[test]
    fn empty_and_blank_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\r\n "), "");
        assert_eq!(normalize("\u{feff}SELECT 1\u{feff}"), "SELECT 1");
    }

    #[test]
    fn next_line_is_not_whitespace() {
        assert_eq!(normalize("a\u{0085}b"), "a\u{0085}b");
        assert_eq!(normalize("\u{0085}a\u{0085}"), "\u{0085}a\u{0085}");
        assert_eq!(normalize("a\u{3000}\u{2028}b\u{00A0}"), "a b");
    }

    #[test]
    fn substantive_changes_still_differ() {
        assert!(!equivalent("SELECT 1", "SELECT 2"));
        assert!(!equivalent("select 1", "SELECT 1"));
    }
}
