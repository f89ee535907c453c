//! Escaping of raw text embedded in style markup.

/// Escape `text` so markup parsers read it literally.
///
/// `[` becomes `\[` and `\` becomes `\\`; everything else is unchanged.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '[' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_markup("notes.txt"), "notes.txt");
        assert_eq!(escape_markup("notes[1].txt"), "notes\\[1].txt");
        assert_eq!(escape_markup("a\\b"), "a\\\\b");
        assert_eq!(escape_markup("[red]x[/]"), "\\[red]x\\[/]");
    }
}
