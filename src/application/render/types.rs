use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::content::{BlockNode, Mode};

/// Display-ready form of a piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RenderedContent {
    /// Markdown input, segmented into blocks in source order.
    Markdown { blocks: Vec<BlockNode> },
    /// HTML input after sanitisation.
    Html { html: String },
}

impl RenderedContent {
    pub fn mode(&self) -> Mode {
        match self {
            RenderedContent::Markdown { .. } => Mode::Markdown,
            RenderedContent::Html { .. } => Mode::Html,
        }
    }

    pub fn blocks(&self) -> Option<&[BlockNode]> {
        match self {
            RenderedContent::Markdown { blocks } => Some(blocks),
            RenderedContent::Html { .. } => None,
        }
    }

    pub fn html(&self) -> Option<&str> {
        match self {
            RenderedContent::Markdown { .. } => None,
            RenderedContent::Html { html } => Some(html),
        }
    }
}

/// Structured errors surfaced by the rendering pipeline.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("sanitisation rejected content: {message}")]
    Sanitisation { message: String },
}

/// Trait exposed by the rendering pipeline. Implementations must be pure and
/// deterministic: given the same input, they return identical output.
pub trait RenderService: Send + Sync {
    fn render(&self, raw: &str) -> RenderedContent;
}
