//! Content rendering pipeline.
//!
//! Raw post text is classified as markdown or HTML. Markdown is segmented
//! line by line into a closed tree of display blocks; HTML is passed through
//! a blacklist sanitiser. Rendering is pure and never fails: the worst case
//! for markdown is literal text and the worst case for HTML is the raw input.

mod blocks;
mod detect;
mod inline;
mod lists;
mod plain;
mod sanitize;
mod service;
mod types;

pub use blocks::segment;
pub use detect::detect_mode;
pub use inline::format_inline;
pub use lists::ListAccumulator;
pub use plain::{DEFAULT_PREVIEW_LENGTH, preview_text, strip_rich_text};
pub use sanitize::{sanitize_html, sanitize_or_raw};
pub use service::{LineRenderService, render_service};
pub use types::{RenderError, RenderService, RenderedContent};

pub(crate) use sanitize::METRIC_SANITIZE_FALLBACK;

use crate::domain::content::ContentDocument;

/// Pair raw text with its detected mode.
pub fn classify(raw: &str) -> ContentDocument<'_> {
    ContentDocument::new(raw, detect_mode(raw))
}

/// Render raw content with the shared service.
pub fn render(raw: &str) -> RenderedContent {
    render_service().render(raw)
}
