//! Markup-to-text sanitization: drop comment/script/style blocks, strip
//! tags, decode URL and entity escapes, collapse whitespace.

pub mod batch;
pub mod config;
pub mod decode;
pub mod error;
pub mod strip;

pub use config::StripConfig;
pub use decode::{Decode, EntityDecoder, Passthrough, UrlDecoder};
pub use error::{Error, Result};
pub use strip::blocks::BlockMarkers;
pub use strip::tags::{remove_tags_with, TagMode};
pub use strip::{collapse_whitespace, remove_block, remove_tags, strip_html, Sanitizer};
