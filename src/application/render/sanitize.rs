//! Blacklist HTML sanitiser for HTML-mode content.
//!
//! Removes `<script>` and `<style>` elements with their contents, every
//! `on*` event-handler attribute, and `href`/`src` attributes carrying a
//! `javascript:` URL. Everything else passes through untouched. Document
//! wrappers (`<html>`, `<body>`) are unwrapped and `<head>` is dropped, so the
//! output is always a body fragment.

use std::{cell::RefCell, rc::Rc};

use html_escape::decode_html_entities;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use metrics::counter;
use tracing::warn;

use super::types::RenderError;

pub(crate) const METRIC_SANITIZE_FALLBACK: &str = "bridgeus_render_sanitize_fallback_total";

const URL_ATTRIBUTES: [&str; 2] = ["href", "src"];

/// Strip executable content from `html`.
pub fn sanitize_html(html: &str) -> Result<String, RenderError> {
    let removed = Rc::new(RefCell::new(0usize));

    let sanitized = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("script, style, head", {
                    let removed = Rc::clone(&removed);
                    move |el| {
                        *removed.borrow_mut() += 1;
                        el.remove();
                        Ok(())
                    }
                }),
                element!("html, body", |el| {
                    el.remove_and_keep_content();
                    Ok(())
                }),
                element!("*", {
                    let removed = Rc::clone(&removed);
                    move |el| {
                        let doomed: Vec<String> = el
                            .attributes()
                            .iter()
                            .filter(|attr| is_unsafe_attribute(&attr.name(), &attr.value()))
                            .map(|attr| attr.name())
                            .collect();

                        *removed.borrow_mut() += doomed.len();
                        for name in &doomed {
                            el.remove_attribute(name);
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::new()
        },
    )
    .map_err(|err| RenderError::Sanitisation {
        message: err.to_string(),
    })?;

    let removed = *removed.borrow();
    if removed > 0 {
        tracing::debug!(removed, "stripped unsafe html");
    }

    Ok(sanitized)
}

/// Sanitise, falling back to the unmodified input when the sanitiser itself
/// fails. The fallback is logged and counted since it lets unsanitised markup
/// through.
pub fn sanitize_or_raw(html: &str) -> String {
    sanitize_with(html, sanitize_html)
}

fn sanitize_with<F>(html: &str, sanitizer: F) -> String
where
    F: FnOnce(&str) -> Result<String, RenderError>,
{
    match sanitizer(html) {
        Ok(sanitized) => sanitized,
        Err(err) => {
            counter!(METRIC_SANITIZE_FALLBACK).increment(1);
            warn!(
                target = "bridgeus::render::sanitize",
                error = %err,
                bytes = html.len(),
                "sanitiser failed; passing raw html through"
            );
            html.to_string()
        }
    }
}

fn is_unsafe_attribute(name: &str, value: &str) -> bool {
    let name = name.to_ascii_lowercase();
    if name.starts_with("on") {
        return true;
    }
    URL_ATTRIBUTES.contains(&name.as_str()) && is_javascript_url(value)
}

/// Matches the URL a browser would resolve: attribute text is entity-decoded
/// first, leading whitespace and control characters are skipped, and tabs or
/// newlines inside the scheme are dropped.
fn is_javascript_url(value: &str) -> bool {
    let decoded = decode_html_entities(value);
    let scheme: String = decoded
        .trim_start_matches(|c: char| c.is_whitespace() || c.is_control())
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .take(11)
        .collect();
    scheme.eq_ignore_ascii_case("javascript:")
}
