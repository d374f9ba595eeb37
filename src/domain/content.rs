//! Display tree produced by the content-rendering pipeline.
//!
//! The tree is closed: every consumer matches [`BlockNode`] and
//! [`InlineSpan`] exhaustively, so adding a node kind is a compile-time
//! breaking change for view layers rather than a silent rendering gap.

use serde::{Deserialize, Serialize};

/// How a raw document will be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Markdown,
    Html,
}

/// Raw user-authored text paired with its detected [`Mode`]. Lives only for
/// the duration of a single render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentDocument<'a> {
    raw: &'a str,
    mode: Mode,
}

impl<'a> ContentDocument<'a> {
    pub fn new(raw: &'a str, mode: Mode) -> Self {
        Self { raw, mode }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }
}

/// Block-level unit of rendered markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockNode {
    Paragraph {
        spans: Vec<InlineSpan>,
    },
    Heading {
        level: u8,
        spans: Vec<InlineSpan>,
    },
    /// Each item is the formatted content of one `- item` line.
    BulletList {
        items: Vec<Vec<InlineSpan>>,
    },
    /// Each item is the formatted content of one `N. item` line.
    OrderedList {
        items: Vec<Vec<InlineSpan>>,
    },
    Image {
        url: String,
        alt: String,
    },
    /// Vertical gap left by a blank source line.
    Spacer,
}

/// Formatted run of text inside a block.
///
/// `Bold` and `Italic` only ever hold a single `Text` child: the formatter
/// resolves one level of emphasis and treats the inner text as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InlineSpan {
    Text { text: String },
    Bold { children: Vec<InlineSpan> },
    Italic { children: Vec<InlineSpan> },
    Link { text: String, url: String },
}

impl InlineSpan {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text { text: value.into() }
    }

    pub fn bold(inner: impl Into<String>) -> Self {
        Self::Bold {
            children: vec![Self::text(inner)],
        }
    }

    pub fn italic(inner: impl Into<String>) -> Self {
        Self::Italic {
            children: vec![Self::text(inner)],
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Link {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Which kind of list a run of list lines belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Ordered,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_nodes_serialise_with_kind_tag() {
        let block = BlockNode::Heading {
            level: 2,
            spans: vec![InlineSpan::text("Title")],
        };
        let json = serde_json::to_value(&block).expect("serialise");
        assert_eq!(json["kind"], "heading");
        assert_eq!(json["level"], 2);
        assert_eq!(json["spans"][0]["kind"], "text");
        assert_eq!(json["spans"][0]["text"], "Title");
    }

    #[test]
    fn spacer_serialises_as_bare_tag() {
        let json = serde_json::to_string(&BlockNode::Spacer).expect("serialise");
        assert_eq!(json, r#"{"kind":"spacer"}"#);
    }
}
