//! Line-oriented block segmenter for the lightweight markdown dialect.
//!
//! Each line is classified independently, first match wins: image, `##`
//! heading, `-` bullet, `N.` ordered item, blank line, paragraph. Only list
//! lines carry state between lines, through [`ListAccumulator`].

use crate::domain::content::{BlockNode, ListKind};

use super::inline::format_inline;
use super::lists::ListAccumulator;

/// Split markdown into display blocks. Never fails; unrecognised syntax is a
/// paragraph of literal text.
pub fn segment(markdown: &str) -> Vec<BlockNode> {
    let mut blocks = Vec::new();
    let mut lists = ListAccumulator::new();

    for raw_line in markdown.split('\n') {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

        if let Some((alt, url)) = parse_image(line) {
            lists.flush(&mut blocks);
            blocks.push(BlockNode::Image {
                url: url.to_string(),
                alt: alt.to_string(),
            });
        } else if let Some(text) = strip_marker(line, "##") {
            lists.flush(&mut blocks);
            blocks.push(BlockNode::Heading {
                level: 2,
                spans: format_inline(text),
            });
        } else if let Some(text) = strip_marker(line, "-") {
            lists.push(ListKind::Bullet, text, &mut blocks);
        } else if let Some(text) = strip_ordered_marker(line) {
            lists.push(ListKind::Ordered, text, &mut blocks);
        } else if line.trim().is_empty() {
            lists.flush(&mut blocks);
            blocks.push(BlockNode::Spacer);
        } else {
            lists.flush(&mut blocks);
            blocks.push(BlockNode::Paragraph {
                spans: format_inline(line),
            });
        }
    }

    lists.flush(&mut blocks);
    blocks
}

/// `![alt](url)` spanning the whole line. `alt` may be empty and contains no
/// `]`; `url` is non-empty and contains no `)`.
fn parse_image(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix("![")?;
    let alt_end = rest.find(']')?;
    let alt = &rest[..alt_end];
    let url = rest[alt_end..].strip_prefix("](")?.strip_suffix(')')?;
    if url.is_empty() || url.contains(')') {
        return None;
    }
    Some((alt, url))
}

/// `marker`, at least one whitespace character, then at least one more
/// character of any kind. The text is whatever follows the whitespace run;
/// when only whitespace follows the marker, the text is its last character.
fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    let text = rest.trim_start();
    let gap = &rest[..rest.len() - text.len()];
    let last = gap.chars().next_back()?;

    if !text.is_empty() {
        return Some(text);
    }
    if gap.len() == last.len_utf8() {
        return None;
    }
    Some(&gap[gap.len() - last.len_utf8()..])
}

/// One or more ASCII digits followed by `.`, then as [`strip_marker`].
fn strip_ordered_marker(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    strip_marker(&line[digits..], ".")
}
