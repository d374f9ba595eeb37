//! Plain-text extraction for list previews and notifications.

use std::{cell::RefCell, rc::Rc};

use html_escape::decode_html_entities;
use lol_html::{RewriteStrSettings, doc_text, element, rewrite_str};
use serde_json::Value;

pub const DEFAULT_PREVIEW_LENGTH: usize = 160;

const MARKDOWN_PUNCTUATION: [char; 6] = ['`', '*', '_', '>', '#', '-'];

/// Reduce stored post content to a single line of plain text.
///
/// Block-editor JSON contributes the text of each block, HTML contributes its
/// text content, and anything else has its markdown syntax stripped.
pub fn strip_rich_text(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Some(text) = editor_blocks_text(trimmed) {
        return collapse_whitespace(&text);
    }

    if trimmed.contains('<')
        && trimmed.contains('>')
        && let Some(text) = html_text_content(trimmed)
    {
        return collapse_whitespace(&text);
    }

    collapse_whitespace(&strip_markdown(trimmed))
}

/// [`strip_rich_text`] truncated to `max_chars` characters, with `...`
/// appended when anything was cut.
pub fn preview_text(input: &str, max_chars: usize) -> String {
    let plain = strip_rich_text(input);
    match plain.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &plain[..cut]),
        None => plain,
    }
}

fn editor_blocks_text(input: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(input).ok()?;
    let blocks = parsed.get("blocks")?.as_array()?;

    let parts: Vec<String> = blocks
        .iter()
        .filter_map(|block| {
            let data = block.get("data")?;
            if let Some(text) = data.get("text").and_then(Value::as_str) {
                return Some(text.to_string());
            }
            let items = data.get("items")?.as_array()?;
            Some(
                items
                    .iter()
                    .filter_map(|item| {
                        item.as_str()
                            .or_else(|| item.get("content").and_then(Value::as_str))
                    })
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        })
        .collect();

    Some(parts.join(" "))
}

/// Text content of an HTML fragment: `script`, `style` and `head` bodies are
/// dropped first, then every remaining text chunk is concatenated.
fn html_text_content(html: &str) -> Option<String> {
    let visible = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("script, style, head", |el| {
                el.remove();
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .ok()?;

    let text = Rc::new(RefCell::new(String::new()));
    rewrite_str(
        &visible,
        RewriteStrSettings {
            document_content_handlers: vec![doc_text!({
                let text = Rc::clone(&text);
                move |chunk| {
                    text.borrow_mut().push_str(chunk.as_str());
                    Ok(())
                }
            })],
            ..RewriteStrSettings::new()
        },
    )
    .ok()?;

    let collected = text.borrow();
    Some(decode_html_entities(collected.as_str()).into_owned())
}

fn strip_markdown(input: &str) -> String {
    let without_images = rewrite_bracketed(input, true);
    let without_links = rewrite_bracketed(&without_images, false);
    without_links
        .chars()
        .filter(|c| !MARKDOWN_PUNCTUATION.contains(c))
        .collect()
}

/// Replace every `![alt](url)` with nothing (`images`) or every
/// `[text](url)` with `text`, scanning left to right without overlap.
fn rewrite_bracketed(input: &str, images: bool) -> String {
    let opener = if images { "![" } else { "[" };
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;

    while let Some(offset) = input[cursor..].find(opener) {
        let start = cursor + offset;
        out.push_str(&input[cursor..start]);

        match match_bracketed(&input[start + opener.len()..], !images) {
            Some((label, consumed)) => {
                if !images {
                    out.push_str(label);
                }
                cursor = start + opener.len() + consumed;
            }
            None => {
                let step = input[start..].chars().next().map_or(1, char::len_utf8);
                out.push_str(&input[start..start + step]);
                cursor = start + step;
            }
        }
    }

    out.push_str(&input[cursor..]);
    out
}

/// Match `label](target)` at the start of `input`; returns the label and the
/// number of bytes consumed.
fn match_bracketed(input: &str, label_required: bool) -> Option<(&str, usize)> {
    let label_end = input.find(']')?;
    if label_required && label_end == 0 {
        return None;
    }
    let after = input[label_end..].strip_prefix("](")?;
    let target_len = after.find(')')?;
    if target_len == 0 {
        return None;
    }
    Some((&input[..label_end], label_end + 2 + target_len + 1))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
