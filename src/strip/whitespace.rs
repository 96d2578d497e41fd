/// Replace every run of whitespace with a single space and trim both ends.
///
/// Whitespace is the Unicode `White_Space` set (`char::is_whitespace`), so
/// tabs, newlines, carriage returns and non-breaking spaces all collapse.
pub fn collapse_whitespace(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }

    // At most one space sits at each end after the pass.
    let trimmed = out.trim_matches(' ');
    if trimmed.len() == out.len() {
        out
    } else {
        trimmed.to_string()
    }
}
