//! Decoding stages run before markup is stripped.
//!
//! Each stage is total: malformed input is passed through as best it can be,
//! never rejected.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};

/// `%uXXXX`, with a surrogate pair (`%uD83D%uDE00`) taken as one unit.
static UNICODE_ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)%u(d[89ab][0-9a-f]{2})%u(d[c-f][0-9a-f]{2})|%u([0-9a-f]{4})").unwrap()
});

pub trait Decode {
    fn decode<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

impl<D: Decode + ?Sized> Decode for &D {
    fn decode<'a>(&self, text: &'a str) -> Cow<'a, str> {
        (**self).decode(text)
    }
}

impl<D: Decode + ?Sized> Decode for Box<D> {
    fn decode<'a>(&self, text: &'a str) -> Cow<'a, str> {
        (**self).decode(text)
    }
}

/// URL (form) decoding: `+` becomes a space, `%XX` escapes become bytes and
/// `%uXXXX` escapes become UTF-16 code units.
///
/// Decoded bytes that are not valid UTF-8 become U+FFFD, as does an unpaired
/// surrogate. A `%` not followed by two hex digits (or `u` and four) is kept
/// literally. Decoding is a single pass: `%u0025` yields `%`, not an escape.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlDecoder;

impl Decode for UrlDecoder {
    fn decode<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !text.contains(['+', '%']) {
            return Cow::Borrowed(text);
        }
        let spaced = text.replace('+', " ");
        let bytes_only = UNICODE_ESCAPE_RE.replace_all(&spaced, expand_unicode_escape);
        let decoded = percent_decode_str(&bytes_only).decode_utf8_lossy().into_owned();
        Cow::Owned(decoded)
    }
}

/// Re-encode a `%uXXXX` match as `%XX` UTF-8 bytes so one percent-decoding
/// pass handles both forms.
fn expand_unicode_escape(caps: &Captures) -> String {
    let unit = |i: usize| {
        caps.get(i)
            .and_then(|m| u32::from_str_radix(m.as_str(), 16).ok())
    };
    let ch = match (unit(1), unit(2), unit(3)) {
        (Some(hi), Some(lo), _) => char::from_u32(0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00)),
        (_, _, Some(cp)) => char::from_u32(cp),
        _ => None,
    }
    .unwrap_or(char::REPLACEMENT_CHARACTER);

    let mut buf = [0u8; 4];
    let mut out = String::with_capacity(12);
    for b in ch.encode_utf8(&mut buf).bytes() {
        let _ = write!(out, "%{:02X}", b);
    }
    out
}

/// HTML entity decoding: named (`&amp;`), decimal (`&#38;`) and hex
/// (`&#x26;`) references. Unknown entities are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityDecoder;

impl Decode for EntityDecoder {
    fn decode<'a>(&self, text: &'a str) -> Cow<'a, str> {
        html_escape::decode_html_entities(text)
    }
}

/// Leaves text untouched. Stands in for a disabled stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Decode for Passthrough {
    fn decode<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }
}
