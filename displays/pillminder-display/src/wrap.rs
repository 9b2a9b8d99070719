//! Word wrap for menu rows
//!
//! A row longer than the display width is split at the last whitespace that
//! still leaves the head within the width; the remainder goes to the next
//! row and is wrapped again if needed. Exactly one whitespace character is
//! consumed at each split.
//!
//! If no whitespace fits, the split falls back to the last whitespace in the
//! remaining text (the head then overflows and is truncated by the display).
//! Text without any whitespace is emitted unsplit.

/// Wrap `line` into rows of at most `width` characters
pub fn wrap_line(line: &str, width: usize) -> Vec<&str> {
    let mut rows = Vec::new();
    let mut rest = line;

    while rest.chars().count() > width {
        // Byte offset just past the first `width + 1` chars: a whitespace at
        // char index `width` still yields a head of exactly `width` chars
        let limit = rest
            .char_indices()
            .nth(width + 1)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        let split = rest[..limit]
            .rfind(char::is_whitespace)
            .or_else(|| rest.rfind(char::is_whitespace));

        match split {
            Some(at) => {
                let ws_len = rest[at..].chars().next().map_or(1, char::len_utf8);
                rows.push(&rest[..at]);
                rest = &rest[at + ws_len..];
            }
            None => break,
        }
    }

    rows.push(rest);
    rows
}
