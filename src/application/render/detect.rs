use crate::domain::content::Mode;

/// Classify raw input as HTML when it contains something shaped like an
/// opening or closing tag: `<`, an optional `/`, an ASCII letter, and a `>`
/// anywhere after it. This is a heuristic; a markdown post containing `<b ... >`
/// prose is routed to the HTML path.
pub fn detect_mode(input: &str) -> Mode {
    let bytes = input.as_bytes();
    let mut cursor = 0;

    while let Some(offset) = input[cursor..].find('<') {
        let open = cursor + offset;
        let mut name_start = open + 1;
        if bytes.get(name_start) == Some(&b'/') {
            name_start += 1;
        }

        if bytes.get(name_start).is_some_and(u8::is_ascii_alphabetic) {
            // Any later `<` would also need a `>` after it, so the first
            // tag-shaped opener decides.
            return if input[name_start..].contains('>') {
                Mode::Html
            } else {
                Mode::Markdown
            };
        }

        cursor = open + 1;
    }

    Mode::Markdown
}
