use crate::domain::content::{BlockNode, ListKind};

use super::inline::format_inline;

/// Pending run of same-kind list lines awaiting emission as one list block.
#[derive(Debug, Default)]
pub struct ListAccumulator {
    kind: Option<ListKind>,
    items: Vec<String>,
}

impl ListAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item, first flushing a pending list of the other kind.
    pub fn push(&mut self, kind: ListKind, text: &str, out: &mut Vec<BlockNode>) {
        if self.kind != Some(kind) {
            self.flush(out);
            self.kind = Some(kind);
        }
        self.items.push(text.to_string());
    }

    /// Emit the buffered items as a single list block, if any, and reset.
    pub fn flush(&mut self, out: &mut Vec<BlockNode>) {
        let kind = self.kind.take();
        if self.items.is_empty() {
            return;
        }

        let items = self
            .items
            .drain(..)
            .map(|item| format_inline(&item))
            .collect();

        out.push(match kind {
            Some(ListKind::Ordered) => BlockNode::OrderedList { items },
            Some(ListKind::Bullet) | None => BlockNode::BulletList { items },
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
