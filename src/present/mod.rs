//! Derived values shown next to catalog rows: config badges and related linters.

mod emoji;
mod related;

pub use emoji::{CONFIG_EMOJI_PALETTE, config_emojis};
pub use related::{RELATED_LINTERS_LIMIT, linter_document_text, related_linters};
