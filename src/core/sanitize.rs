/// Vulgar fractions and Roman numerals: numeric in Unicode but neither letters
/// nor digits for filename purposes.
fn is_numeric_symbol(c: char) -> bool {
    matches!(c, '\u{00BC}'..='\u{00BE}' | '\u{2150}'..='\u{218B}')
}

fn is_allowed(c: char) -> bool {
    if is_numeric_symbol(c) {
        return false;
    }
    c.is_alphabetic() || c.is_numeric() || matches!(c, ' ' | '.' | '-' | '_' | '(' | ')')
}

/// Keeps letters, digits, space and `.-_()`; every other character is dropped.
/// The result is trimmed, so applying it twice changes nothing.
pub fn sanitize_filename(s: &str) -> String {
    s.chars()
        .filter(|&c| is_allowed(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Builds the `"{artist} - {name}"` stem shared by the audio and lyric files of one track.
pub fn build_basename(artist: &str, name: &str) -> String {
    format!("{} - {}", sanitize_filename(artist), sanitize_filename(name))
        .trim()
        .to_string()
}
