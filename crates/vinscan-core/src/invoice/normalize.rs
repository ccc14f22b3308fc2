//! OCR text normalization applied before any field rule runs.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HORIZONTAL_SPACE: Regex = Regex::new(r"[^\S\n]+").unwrap();
    static ref SPACE_BEFORE_NEWLINE: Regex = Regex::new(r"\s+\n").unwrap();
}

/// Canonicalize raw OCR text.
///
/// Carriage returns become line feeds, horizontal whitespace runs collapse to
/// one space, the OCR wrap artifact `"\n "` is dropped, `’` becomes `'`, any
/// whitespace before a line feed (blank lines included) is removed and the
/// result is trimmed. Applying it twice gives the same text as applying it
/// once.
pub fn normalize(raw: &str) -> String {
    let text = raw.replace('\r', "\n");
    let text = HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = text.replace("\n ", "\n");
    let text = text.replace('\u{2019}', "'");
    let text = SPACE_BEFORE_NEWLINE.replace_all(&text, "\n");

    text.trim().to_string()
}
