//! Inline formatter: resolves `[text](url)`, `**bold**` and `*italic*` inside
//! a single line.
//!
//! Both passes are cursor scans over byte offsets. Every match advances the
//! cursor past its closing delimiter and every failed candidate advances it past
//! the opening one, so no input can stall the loop. Unterminated markers are
//! never errors; they stay in the surrounding `Text` span verbatim.

use crate::domain::content::InlineSpan;

/// Format one line of text. Total: the worst case is a single `Text` span
/// holding the whole line. Empty input yields no spans.
pub fn format_inline(line: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while cursor < line.len() {
        let rest = &line[cursor..];
        match find_link(rest) {
            Some(link) => {
                format_emphasis(&rest[..link.start], &mut spans);
                spans.push(InlineSpan::link(link.text, link.url));
                cursor += link.end;
            }
            None => {
                format_emphasis(rest, &mut spans);
                break;
            }
        }
    }

    spans
}

struct LinkMatch<'a> {
    start: usize,
    end: usize,
    text: &'a str,
    url: &'a str,
}

/// Leftmost `[text](url)` where `text` has no `]` and `url` has no `)`, both
/// non-empty.
fn find_link(input: &str) -> Option<LinkMatch<'_>> {
    let mut cursor = 0;

    while let Some(offset) = input[cursor..].find('[') {
        let start = cursor + offset;
        let text_start = start + 1;
        // No `]` left means no later `[` can close either.
        let text_end = text_start + input[text_start..].find(']')?;

        if text_end > text_start && input[text_end..].starts_with("](") {
            let url_start = text_end + 2;
            let url_end = url_start + input[url_start..].find(')')?;
            if url_end > url_start {
                return Some(LinkMatch {
                    start,
                    end: url_end + 1,
                    text: &input[text_start..text_end],
                    url: &input[url_start..url_end],
                });
            }
        }

        cursor = text_start;
    }

    None
}

/// Bold is searched across the whole remainder before italic is considered,
/// so `**x**` never splits into two italics. Text preceding a match is emitted
/// as-is.
fn format_emphasis(segment: &str, spans: &mut Vec<InlineSpan>) {
    let mut rest = segment;

    while !rest.is_empty() {
        let matched = find_delimited(rest, "**")
            .map(|found| (found, Emphasis::Bold))
            .or_else(|| find_delimited(rest, "*").map(|found| (found, Emphasis::Italic)));

        let Some((found, emphasis)) = matched else {
            spans.push(InlineSpan::text(rest));
            return;
        };

        if found.start > 0 {
            spans.push(InlineSpan::text(&rest[..found.start]));
        }
        spans.push(match emphasis {
            Emphasis::Bold => InlineSpan::bold(found.inner),
            Emphasis::Italic => InlineSpan::italic(found.inner),
        });
        rest = &rest[found.end..];
    }
}

#[derive(Clone, Copy)]
enum Emphasis {
    Bold,
    Italic,
}

struct Delimited<'a> {
    start: usize,
    end: usize,
    inner: &'a str,
}

/// Leftmost `marker inner marker` where `inner` is non-empty and contains no
/// `*`. Candidates start at every `*`, including ones inside a longer run.
fn find_delimited<'a>(input: &'a str, marker: &str) -> Option<Delimited<'a>> {
    let mut cursor = 0;

    while let Some(offset) = input[cursor..].find('*') {
        let start = cursor + offset;
        cursor = start + 1;

        if !input[start..].starts_with(marker) {
            continue;
        }

        let inner_start = start + marker.len();
        // Without another `*` nothing after this point can close.
        let inner_end = inner_start + input[inner_start..].find('*')?;
        if inner_end > inner_start && input[inner_end..].starts_with(marker) {
            return Some(Delimited {
                start,
                end: inner_end + marker.len(),
                inner: &input[inner_start..inner_end],
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> InlineSpan {
        InlineSpan::text(value)
    }

    #[test]
    fn plain_line_is_single_text_span() {
        assert_eq!(format_inline("hello world"), vec![text("hello world")]);
    }

    #[test]
    fn empty_line_has_no_spans() {
        assert!(format_inline("").is_empty());
    }

    #[test]
    fn link_splits_surrounding_text() {
        assert_eq!(
            format_inline("Visit [site](http://x.com) now"),
            vec![
                text("Visit "),
                InlineSpan::link("site", "http://x.com"),
                text(" now"),
            ]
        );
    }

    #[test]
    fn link_text_is_not_formatted() {
        assert_eq!(
            format_inline("[**x**](u)"),
            vec![InlineSpan::link("**x**", "u")]
        );
    }

    #[test]
    fn text_before_link_is_formatted() {
        assert_eq!(
            format_inline("**a** [b](c)"),
            vec![InlineSpan::bold("a"), text(" "), InlineSpan::link("b", "c")]
        );
    }

    #[test]
    fn multiple_links_in_order() {
        assert_eq!(
            format_inline("[a](1)[b](2)"),
            vec![InlineSpan::link("a", "1"), InlineSpan::link("b", "2")]
        );
    }

    #[test]
    fn link_text_may_contain_open_bracket() {
        assert_eq!(format_inline("[a[b](c)"), vec![InlineSpan::link("a[b", "c")]);
    }

    #[test]
    fn empty_link_parts_are_literal() {
        assert_eq!(format_inline("[](x)"), vec![text("[](x)")]);
        assert_eq!(format_inline("[x]()"), vec![text("[x]()")]);
        assert_eq!(format_inline("[x] (y)"), vec![text("[x] (y)")]);
    }

    #[test]
    fn unterminated_link_is_literal() {
        assert_eq!(format_inline("see [docs](http://x"), vec![text("see [docs](http://x")]);
    }

    #[test]
    fn bold_and_italic() {
        assert_eq!(format_inline("**a**"), vec![InlineSpan::bold("a")]);
        assert_eq!(format_inline("*a*"), vec![InlineSpan::italic("a")]);
        assert_eq!(
            format_inline("x *y* z"),
            vec![text("x "), InlineSpan::italic("y"), text(" z")]
        );
    }

    #[test]
    fn unterminated_bold_is_literal() {
        assert_eq!(format_inline("**a"), vec![text("**a")]);
        assert_eq!(format_inline("a*"), vec![text("a*")]);
    }

    #[test]
    fn bold_wins_even_when_italic_comes_first() {
        assert_eq!(
            format_inline("*a* **b**"),
            vec![text("*a* "), InlineSpan::bold("b")]
        );
    }

    #[test]
    fn triple_asterisks_resolve_to_inner_bold() {
        assert_eq!(
            format_inline("***a***"),
            vec![text("*"), InlineSpan::bold("a"), text("*")]
        );
    }

    #[test]
    fn lone_asterisks_are_text() {
        assert_eq!(format_inline("**"), vec![text("**")]);
        assert_eq!(format_inline("2 * 3 = 6"), vec![text("2 * 3 = 6")]);
    }

    #[test]
    fn multibyte_text_survives_scanning() {
        assert_eq!(
            format_inline("你好 **世界** [链接](https://例子.cn)"),
            vec![
                text("你好 "),
                InlineSpan::bold("世界"),
                text(" "),
                InlineSpan::link("链接", "https://例子.cn"),
            ]
        );
    }
}
