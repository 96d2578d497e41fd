use std::borrow::Cow;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// A start/end marker pair delimiting a block that is dropped as a whole,
/// content included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMarkers {
    pub start: String,
    pub end: String,
}

impl BlockMarkers {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn comment() -> Self {
        Self::new("<!--", "-->")
    }

    pub fn script() -> Self {
        Self::new("<script", "</script>")
    }

    pub fn style() -> Self {
        Self::new("<style", "</style>")
    }

    /// Comment, script, style: the order the HTML pipeline strips them in.
    pub fn html_defaults() -> Vec<Self> {
        vec![Self::comment(), Self::script(), Self::style()]
    }

    pub fn strip<'a>(&self, text: &'a str) -> Cow<'a, str> {
        remove_block(text, &self.start, &self.end)
    }
}

/// Outcome of one scan over the current text.
#[derive(Debug, PartialEq, Eq)]
enum Scan {
    /// Byte span from the start marker through the end marker.
    Found(Range<usize>),
    /// Start marker at this offset with no end marker after it.
    Unterminated(usize),
    /// No start marker left.
    Exhausted,
}

/// Remove every `start ... end` block, markers included.
///
/// Markers match case-insensitively. The end marker is searched from one
/// character past the start of the start marker, so the two may overlap.
/// Each pass rescans from the top and stops at the first start marker that
/// has no end marker after it; everything from there on is kept as-is.
/// Blocks of the same kind do not nest: removal runs to the nearest end
/// marker. Empty markers match nothing.
pub fn remove_block<'a>(text: &'a str, start: &str, end: &str) -> Cow<'a, str> {
    if text.is_empty() || start.is_empty() || end.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut buf = Cow::Borrowed(text);
    // Each Found strictly shortens `buf`, every other outcome exits.
    loop {
        match scan(&buf, start, end) {
            Scan::Found(span) => {
                trace!(start, at = span.start, len = span.len(), "removing block");
                buf.to_mut().replace_range(span, "");
            }
            Scan::Unterminated(at) => {
                debug!(start, end, at, "unterminated block, leaving remainder");
                break;
            }
            Scan::Exhausted => break,
        }
    }
    buf
}

fn scan(text: &str, start: &str, end: &str) -> Scan {
    let Some(open) = find_ignore_case(text, start, 0) else {
        return Scan::Exhausted;
    };
    let first_char = text[open.start..].chars().next().map_or(1, char::len_utf8);
    match find_ignore_case(text, end, open.start + first_char) {
        Some(close) => Scan::Found(open.start..close.end),
        None => Scan::Unterminated(open.start),
    }
}

/// Byte span of the first case-insensitive `needle` in `haystack` at or
/// after byte offset `from` (which must be a char boundary).
fn find_ignore_case(haystack: &str, needle: &str, from: usize) -> Option<Range<usize>> {
    let tail = haystack.get(from..)?;
    tail.char_indices().find_map(|(i, _)| {
        let at = from + i;
        match_len(&haystack[at..], needle).map(|len| at..at + len)
    })
}

/// Byte length of the prefix of `hay` equal to `needle` ignoring case.
fn match_len(hay: &str, needle: &str) -> Option<usize> {
    let mut hay_chars = hay.char_indices();
    for n in needle.chars() {
        let (_, h) = hay_chars.next()?;
        if !eq_ignore_case(h, n) {
            return None;
        }
    }
    Some(hay_chars.next().map_or(hay.len(), |(i, _)| i))
}

/// Per-char lowercase comparison, independent of locale.
fn eq_ignore_case(a: char, b: char) -> bool {
    if a == b {
        return true;
    }
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(&b);
    }
    a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        assert_eq!(remove_block("", "<!--", "-->"), "");
    }

    #[test]
    fn single_comment() {
        assert_eq!(remove_block("x<!-- hidden -->y", "<!--", "-->"), "xy");
    }

    #[test]
    fn repeated_until_none_left() {
        assert_eq!(remove_block("x<!-- a --><!-- b -->y", "<!--", "-->"), "xy");
        assert_eq!(remove_block("1<!--a-->2<!--b-->3<!--c-->4", "<!--", "-->"), "1234");
    }

    #[test]
    fn unterminated_left_alone() {
        let text = "x<!-- unterminated y";
        let out = remove_block(text, "<!--", "-->");
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, text);
    }

    #[test]
    fn stops_at_first_unterminated() {
        assert_eq!(
            remove_block("a<!--x-->b<!--c<!--d-->", "<!--", "-->"),
            "ab"
        );
        assert_eq!(remove_block("a<!--x-->b<!--c", "<!--", "-->"), "ab<!--c");
    }

    #[test]
    fn case_insensitive_markers() {
        assert_eq!(
            remove_block("a<SCRIPT type=\"x\">1 > 0</Script>b", "<script", "</script>"),
            "ab"
        );
        assert_eq!(remove_block("a<style>p{}</STYLE>b", "<STYLE", "</style>"), "ab");
    }

    #[test]
    fn same_kind_does_not_nest() {
        assert_eq!(
            remove_block("<!-- a <!-- b --> c -->", "<!--", "-->"),
            " c -->"
        );
    }

    #[test]
    fn end_search_begins_one_char_into_start() {
        // "ba" overlaps the tail of "ab" and still terminates the block.
        assert_eq!(remove_block("xaby", "ab", "ba"), "xaby");
        assert_eq!(remove_block("xabay", "ab", "ba"), "xy");
    }

    #[test]
    fn multibyte_text_around_blocks() {
        assert_eq!(remove_block("é<STYLE>ü</style>ß", "<style", "</style>"), "éß");
        assert_eq!(remove_block("日本<!--語-->語", "<!--", "-->"), "日本語");
    }

    #[test]
    fn non_ascii_markers_fold_case() {
        assert_eq!(remove_block("aÄxäb", "Ä", "ä"), "ab");
        assert_eq!(remove_block("aΣxσb", "σ", "Σ"), "ab");
    }

    #[test]
    fn empty_markers_match_nothing() {
        assert_eq!(remove_block("a<!--b-->c", "", "-->"), "a<!--b-->c");
        assert_eq!(remove_block("a<!--b-->c", "<!--", ""), "a<!--b-->c");
    }

    #[test]
    fn no_start_marker_borrows() {
        assert!(matches!(remove_block("plain", "<!--", "-->"), Cow::Borrowed(_)));
    }

    #[test]
    fn scan_states() {
        assert_eq!(scan("a<!--b-->", "<!--", "-->"), Scan::Found(1..9));
        assert_eq!(scan("a<!--b", "<!--", "-->"), Scan::Unterminated(1));
        assert_eq!(scan("ab", "<!--", "-->"), Scan::Exhausted);
    }

    #[test]
    fn markers_helper() {
        let m = BlockMarkers::comment();
        assert_eq!(m.strip("a<!--b-->c"), "ac");
        assert_eq!(
            BlockMarkers::html_defaults(),
            vec![
                BlockMarkers::new("<!--", "-->"),
                BlockMarkers::new("<script", "</script>"),
                BlockMarkers::new("<style", "</style>"),
            ]
        );
    }
}
