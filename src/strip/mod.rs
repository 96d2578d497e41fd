pub mod blocks;
pub mod tags;
pub mod whitespace;

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use tracing::debug;

use crate::config::StripConfig;
use crate::decode::{Decode, EntityDecoder, Passthrough, UrlDecoder};
use blocks::BlockMarkers;
use tags::TagMode;

pub use blocks::remove_block;
pub use tags::remove_tags;
pub use whitespace::collapse_whitespace;

static DEFAULT_SANITIZER: LazyLock<Sanitizer> = LazyLock::new(Sanitizer::default);

type BoxedDecoder = Box<dyn Decode + Send + Sync>;

/// Full markup-to-text pipeline:
/// url-decode → entity-decode → drop blocks → tags to spaces → collapse whitespace.
pub struct Sanitizer {
    url: BoxedDecoder,
    entities: BoxedDecoder,
    blocks: Vec<BlockMarkers>,
}

impl Sanitizer {
    /// Pipeline with the given decoders and the comment/script/style blocks.
    pub fn new<U, E>(url: U, entities: E) -> Self
    where
        U: Decode + Send + Sync + 'static,
        E: Decode + Send + Sync + 'static,
    {
        Self {
            url: Box::new(url),
            entities: Box::new(entities),
            blocks: BlockMarkers::html_defaults(),
        }
    }

    /// Replace the blocks to drop. They are stripped in the order given.
    pub fn with_blocks(mut self, blocks: Vec<BlockMarkers>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn from_config(config: &StripConfig) -> Self {
        let url: BoxedDecoder = if config.url_decode {
            Box::new(UrlDecoder)
        } else {
            Box::new(Passthrough)
        };
        let entities: BoxedDecoder = if config.entity_decode {
            Box::new(EntityDecoder)
        } else {
            Box::new(Passthrough)
        };
        Self {
            url,
            entities,
            blocks: config.blocks.clone(),
        }
    }

    pub fn blocks(&self) -> &[BlockMarkers] {
        &self.blocks
    }

    pub fn strip_html(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let url_decoded = self.url.decode(text);
        let mut body = self.entities.decode(&url_decoded);

        for markers in &self.blocks {
            let stripped = match markers.strip(&body) {
                Cow::Owned(s) => Some(s),
                Cow::Borrowed(_) => None,
            };
            if let Some(s) = stripped {
                body = Cow::Owned(s);
            }
        }

        let spaced = tags::remove_tags_with(&body, TagMode::Space);
        let out = collapse_whitespace(&spaced);
        debug!(input_len = text.len(), output_len = out.len(), "stripped html");
        out
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(UrlDecoder, EntityDecoder)
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sanitizer")
            .field("blocks", &self.blocks)
            .finish_non_exhaustive()
    }
}

/// Plain text from markup, using the stock decoders and blocks.
pub fn strip_html(text: &str) -> String {
    DEFAULT_SANITIZER.strip_html(text)
}
