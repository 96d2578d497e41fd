use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// `<`, then at least one non-`>` char (newlines included), then `>`.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// What to put where a tag used to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
    /// Remove the tag outright.
    Drop,
    /// Replace the tag with a single space so neighbouring words stay apart.
    Space,
}

impl TagMode {
    fn replacement(self) -> &'static str {
        match self {
            TagMode::Drop => "",
            TagMode::Space => " ",
        }
    }
}

/// Remove every `<...>` tag, keeping the text between tags verbatim.
///
/// A `<` that is never closed is left as-is. Borrows when nothing matched.
pub fn remove_tags(text: &str) -> Cow<'_, str> {
    remove_tags_with(text, TagMode::Drop)
}

pub fn remove_tags_with(text: &str, mode: TagMode) -> Cow<'_, str> {
    if text.is_empty() {
        return Cow::Borrowed("");
    }
    TAG_RE.replace_all(text, mode.replacement())
}
