//! Character classes and validation shared by the line model and the tokenizer.

use crate::{Error, Result};

/// The code points that separate WSV values.
pub const WHITESPACE: [char; 24] = [
    '\u{0009}', '\u{000B}', '\u{000C}', '\u{000D}', '\u{0020}', '\u{0085}', '\u{00A0}',
    '\u{1680}', '\u{2000}', '\u{2001}', '\u{2002}', '\u{2003}', '\u{2004}', '\u{2005}',
    '\u{2006}', '\u{2007}', '\u{2008}', '\u{2009}', '\u{200A}', '\u{2028}', '\u{2029}',
    '\u{202F}', '\u{205F}', '\u{3000}',
];

/// Returns `true` for the 24 recognized whitespace code points.
///
/// Line feed is not among them; it terminates lines instead.
#[inline]
#[must_use]
pub fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        '\u{0009}'
            | '\u{000B}'..='\u{000D}'
            | '\u{0020}'
            | '\u{0085}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}

/// Returns `true` if the value cannot be written without quotes.
///
/// # Examples
///
/// ```rust
/// use wsv_sml::whitespace::contains_special_char;
///
/// assert!(contains_special_char("a b"));
/// assert!(contains_special_char("#1"));
/// assert!(!contains_special_char("plain-text"));
/// ```
#[inline]
#[must_use]
pub fn contains_special_char(value: &str) -> bool {
    value
        .chars()
        .any(|ch| ch == '"' || ch == '#' || ch == '\n' || is_whitespace(ch))
}

/// Returns `true` if the value must be quoted: it is empty, is the null marker
/// text `-`, or contains a special character.
#[inline]
#[must_use]
pub fn is_special(value: &str) -> bool {
    value.is_empty() || value == "-" || contains_special_char(value)
}

/// Validates one whitespace run. Only the first run of a line may be empty.
///
/// # Examples
///
/// ```rust
/// use wsv_sml::whitespace::validate_space;
///
/// assert!(validate_space("", 0).is_ok());
/// assert!(validate_space("", 1).is_err());
/// assert!(validate_space(" \t\u{3000}", 1).is_ok());
/// assert!(validate_space("  a", 1).is_err());
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidWhitespace`] naming the slot index.
pub fn validate_space(space: &str, index: usize) -> Result<()> {
    if space.is_empty() && index != 0 {
        return Err(Error::invalid_whitespace(
            index,
            "non-first whitespace string cannot be empty",
        ));
    }
    if let Some((offset, ch)) = space.char_indices().find(|&(_, ch)| !is_whitespace(ch)) {
        return Err(Error::invalid_whitespace(
            index,
            &format!("invalid code point U+{:04X} at byte {}", ch as u32, offset),
        ));
    }
    Ok(())
}

/// Validates a full sequence of whitespace runs.
///
/// # Errors
///
/// Returns the first [`Error::InvalidWhitespace`] found.
pub fn validate_spaces<S: AsRef<str>>(spaces: &[S]) -> Result<()> {
    spaces
        .iter()
        .enumerate()
        .try_for_each(|(index, space)| validate_space(space.as_ref(), index))
}

/// Validates the whitespace runs of a line holding `len` values: the list has
/// 0, `len` or `len + 1` runs, and each run passes [`validate_space`].
///
/// # Examples
///
/// ```rust
/// use wsv_sml::whitespace::validate_layout;
///
/// assert!(validate_layout::<&str>(&[], 2).is_ok());
/// assert!(validate_layout(&["", " "], 2).is_ok());
/// assert!(validate_layout(&["", " ", "  "], 2).is_ok());
/// assert!(validate_layout(&["  "], 2).is_err());
/// assert!(validate_layout(&["", " ", " ", " "], 2).is_err());
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidWhitespace`] naming the first slot that is missing
/// or extra, or the first invalid run.
pub fn validate_layout<S: AsRef<str>>(spaces: &[S], len: usize) -> Result<()> {
    let count = spaces.len();
    if count != 0 && count != len && count != len + 1 {
        return Err(Error::invalid_whitespace(
            count.min(len + 1),
            &format!("{} whitespace runs do not fit {} values", count, len),
        ));
    }
    validate_spaces(spaces)
}

/// Validates comment text.
///
/// Comments run to the end of the line, so they cannot hold a line feed.
/// Unpaired surrogates cannot occur in a `str` and are rejected while decoding.
///
/// # Errors
///
/// Returns [`Error::InvalidComment`].
pub fn validate_comment(comment: &str) -> Result<()> {
    if comment.contains('\n') {
        return Err(Error::invalid_comment("line feed in comment is not allowed"));
    }
    Ok(())
}

/// Compares names the way SML does everywhere: case-insensitively, by mapping
/// each character to lowercase.
///
/// # Examples
///
/// ```rust
/// use wsv_sml::whitespace::names_match;
///
/// assert!(names_match("End", "end"));
/// assert!(names_match("STRASSE", "strasse"));
/// assert!(!names_match("end", "ends"));
/// ```
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
