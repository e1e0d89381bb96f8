//! WSV line tokenization.
//!
//! This module turns one line of text into a [`WsvLine`].
//!
//! ## Overview
//!
//! The tokenizer is a pure state machine: [`step`] takes the current state and
//! one character and returns the next state plus at most one emitted token.
//! Text being accumulated (a bare value, a whitespace run, a quoted value, the
//! comment) lives inside the state value itself, so nothing is shared between
//! iterations except what the state carries forward.
//!
//! - **Single pass**: one loop over the characters, no backtracking
//! - **Null markers**: a bare token that is exactly `-` is a null
//! - **Escapes**: `""` is a quote, `"/"` a line feed, `"#"` and `"-"` keep
//!   the character inside the quoted context
//! - **Error reporting**: 1-based line and column (in characters)
//!
//! ## Examples
//!
//! ```rust
//! use wsv_sml::parse_line;
//!
//! let line = parse_line("  a \"b c\" - \"\"\"\"  # note", true).unwrap();
//! assert_eq!(line.iter().collect::<Vec<_>>(), vec![Some("a"), Some("b c"), None, Some("\"")]);
//! assert_eq!(line.comment(), Some(" note"));
//! assert_eq!(line.to_string(), "  a \"b c\" - \"\"\"\"  # note");
//!
//! let minimal = parse_line("  a   b  # note", false).unwrap();
//! assert_eq!(minimal.to_string(), "a b#");
//! ```

use crate::line::{NullMask, WsvLine};
use crate::whitespace::is_whitespace;
use crate::{Error, Result};
use std::str::FromStr;
use tracing::trace;

/// Text accumulated in the default state.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    None,
    Space(String),
    Bare(String),
}

/// Tokenizer state. `open` is the column of the quote that started the value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Default(Pending),
    Comment(String),
    Quoted { text: String, open: usize },
    AfterQuote { text: String, open: usize },
    ExpectQuote { text: String, open: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Space(String),
    Value(String),
    Null,
    Comment(String),
}

fn bare_token(text: String) -> Token {
    if text == "-" {
        Token::Null
    } else {
        Token::Value(text)
    }
}

/// The state reached from `Default` with nothing pending. Never emits a token.
fn start(ch: char, col: usize) -> State {
    match ch {
        '"' => State::Quoted {
            text: String::new(),
            open: col,
        },
        '#' => State::Comment(String::new()),
        ch if is_whitespace(ch) => State::Default(Pending::Space(ch.to_string())),
        ch => State::Default(Pending::Bare(ch.to_string())),
    }
}

/// Advances the tokenizer by one character at 1-based column `col`.
fn step(state: State, ch: char, col: usize) -> Result<(State, Option<Token>)> {
    let next = match state {
        State::Default(pending) => match (pending, ch) {
            (Pending::None, ch) => (start(ch, col), None),
            (Pending::Space(space), '"') => (
                State::Quoted {
                    text: String::new(),
                    open: col,
                },
                Some(Token::Space(space)),
            ),
            (Pending::Bare(text), '"') => (State::Quoted { text, open: col }, None),
            (Pending::Space(space), '#') => {
                (State::Comment(String::new()), Some(Token::Space(space)))
            }
            (Pending::Bare(text), '#') => (State::Comment(String::new()), Some(bare_token(text))),
            (Pending::Space(mut space), ch) if is_whitespace(ch) => {
                space.push(ch);
                (State::Default(Pending::Space(space)), None)
            }
            (Pending::Bare(text), ch) if is_whitespace(ch) => (
                State::Default(Pending::Space(ch.to_string())),
                Some(bare_token(text)),
            ),
            (Pending::Space(space), ch) => (
                State::Default(Pending::Bare(ch.to_string())),
                Some(Token::Space(space)),
            ),
            (Pending::Bare(mut text), ch) => {
                text.push(ch);
                (State::Default(Pending::Bare(text)), None)
            }
        },
        State::Comment(mut text) => {
            text.push(ch);
            (State::Comment(text), None)
        }
        State::Quoted { mut text, open } => {
            if ch == '"' {
                (State::AfterQuote { text, open }, None)
            } else {
                text.push(ch);
                (State::Quoted { text, open }, None)
            }
        }
        State::AfterQuote { mut text, open } => match ch {
            '"' => {
                text.push('"');
                (State::Quoted { text, open }, None)
            }
            '#' | '-' => {
                text.push(ch);
                (State::ExpectQuote { text, open }, None)
            }
            '/' => {
                text.push('\n');
                (State::ExpectQuote { text, open }, None)
            }
            ch => (start(ch, col), Some(Token::Value(text))),
        },
        State::ExpectQuote { text, open } => {
            if ch == '"' {
                (State::Quoted { text, open }, None)
            } else {
                return Err(Error::invalid_escape(1, col, ch));
            }
        }
    };
    Ok(next)
}

/// Flushes whatever the final state holds.
fn finish(state: State) -> Result<Option<Token>> {
    match state {
        State::Default(Pending::None) => Ok(None),
        State::Default(Pending::Space(space)) => Ok(Some(Token::Space(space))),
        State::Default(Pending::Bare(text)) => Ok(Some(bare_token(text))),
        State::Comment(text) => Ok(Some(Token::Comment(text))),
        State::AfterQuote { text, .. } => Ok(Some(Token::Value(text))),
        State::Quoted { open, .. } | State::ExpectQuote { open, .. } => {
            Err(Error::unterminated_quote(1, open))
        }
    }
}

/// Collects tokens into the parts of a line.
#[derive(Default)]
struct Assembler {
    values: Vec<String>,
    nulls: NullMask,
    spaces: Vec<String>,
    comment: Option<String>,
}

impl Assembler {
    fn push(&mut self, token: Token) {
        trace!(?token, "wsv token");
        match token {
            Token::Space(space) => self.spaces.push(space),
            Token::Value(value) => self.push_value(value, false),
            Token::Null => self.push_value(String::new(), true),
            Token::Comment(text) => self.comment = Some(text),
        }
    }

    fn push_value(&mut self, value: String, null: bool) {
        // Adjacent values such as `"a"b` have no run between them.
        if self.spaces.len() == self.values.len() {
            let filler = if self.values.is_empty() { "" } else { " " };
            self.spaces.push(filler.to_string());
        }
        self.nulls.set(self.values.len(), null);
        self.values.push(value);
    }

    fn into_line(self, preserve_layout: bool) -> WsvLine {
        if preserve_layout {
            return WsvLine::from_raw_parts(self.values, self.nulls, self.spaces, self.comment);
        }
        let spaces = (0..self.values.len())
            .map(|i| if i == 0 { String::new() } else { " ".to_string() })
            .collect();
        let comment = self.comment.map(|_| String::new());
        WsvLine::from_raw_parts(self.values, self.nulls, spaces, comment)
    }
}

/// Parses one line of WSV text.
///
/// With `preserve_layout` the whitespace runs and comment text are kept so the
/// line renders back to `text` exactly. Without it the layout is canonical:
/// no leading or trailing run, single spaces between values, and an empty
/// comment if the line had one.
///
/// The exact rendering (`Display`) of a canonical line still writes `#` for
/// that empty comment, since `a#` must read back as a line with a comment.
/// The value-only form is [`WsvLine::to_minimal_string`], which is stable under
/// repeated canonical parses.
///
/// Errors report line 1; document parsers move them to the physical line.
///
/// # Examples
///
/// ```rust
/// use wsv_sml::{parse_line, Error};
///
/// let line = parse_line("\"line\"/\"feed\" \"-\" -", true).unwrap();
/// assert_eq!(line.value(0), Some("line\nfeed"));
/// assert_eq!(line.value(1), Some("-"));
/// assert!(line.is_null(2));
///
/// let canonical = parse_line("  a   b  # note", false).unwrap();
/// assert_eq!(canonical.to_string(), "a b#");
/// assert_eq!(canonical.to_minimal_string(), "a b");
/// assert_eq!(parse_line("a b", false).unwrap().to_minimal_string(), "a b");
///
/// assert_eq!(
///     parse_line("\"a\"#b", true),
///     Err(Error::InvalidEscapeContinuation { line: 1, col: 5, found: 'b' })
/// );
/// ```
///
/// # Errors
///
/// Returns [`Error::UnterminatedQuote`] if the line ends inside a quoted value,
/// [`Error::InvalidEscapeContinuation`] if an escaped `#`, `-` or `/` is not
/// followed by a quote, and [`Error::Custom`] if `text` holds a line feed.
pub fn parse_line(text: &str, preserve_layout: bool) -> Result<WsvLine> {
    if text.contains('\n') {
        return Err(Error::custom("a WSV line cannot contain a line feed"));
    }
    let mut assembler = Assembler::default();
    let mut state = State::Default(Pending::None);
    for (index, ch) in text.chars().enumerate() {
        let (next, token) = step(state, ch, index + 1)?;
        if let Some(token) = token {
            assembler.push(token);
        }
        state = next;
    }
    if let Some(token) = finish(state)? {
        assembler.push(token);
    }
    Ok(assembler.into_line(preserve_layout))
}

impl FromStr for WsvLine {
    type Err = Error;

    /// Parses with layout preserved.
    fn from_str(s: &str) -> Result<Self> {
        parse_line(s, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(line: &WsvLine) -> Vec<Option<&str>> {
        line.iter().collect()
    }

    #[test]
    fn test_step_is_pure() {
        let state = State::Default(Pending::Bare("a".to_string()));
        let (next, token) = step(state.clone(), ' ', 2).unwrap();
        assert_eq!(next, State::Default(Pending::Space(" ".to_string())));
        assert_eq!(token, Some(Token::Value("a".to_string())));
        // Same input, same output.
        assert_eq!(step(state, ' ', 2).unwrap(), (next, token));
    }

    #[test]
    fn test_after_quote_reprocesses_from_default() {
        let state = State::AfterQuote {
            text: "x".to_string(),
            open: 1,
        };
        let (next, token) = step(state, ' ', 4).unwrap();
        assert_eq!(next, State::Default(Pending::Space(" ".to_string())));
        assert_eq!(token, Some(Token::Value("x".to_string())));
    }

    #[test]
    fn test_exact_round_trip_corpus() {
        let corpus = [
            "",
            " ",
            "\t  \t",
            "a",
            "a b c",
            "  a  b  ",
            "a\u{3000}b\u{00A0}c",
            "#",
            "# only a comment",
            "   # indented comment",
            "a#no space",
            "a b # c # d",
            "-",
            "- - -",
            "a - b",
            "\"\"",
            "\"-\"",
            "\"a b\" \"c#d\" \"\"\"\"",
            "\"line\"/\"feed\"",
            "-a a-b a-",
            "\u{1D11E} ¥ é",
            "a\rb",
            "\"\" - \"\"   # trailing",
        ];
        for text in corpus {
            let line = parse_line(text, true).unwrap();
            assert_eq!(line.to_string(), text, "{:?}", text);
        }
    }

    #[test]
    fn test_values_and_nulls() {
        let line = parse_line("a -  -b \"-\" \"\" c-", true).unwrap();
        assert_eq!(
            values(&line),
            vec![Some("a"), None, Some("-b"), Some("-"), Some(""), Some("c-")]
        );
        assert!(line.is_null(1));
        assert!(!line.is_null(3));
    }

    #[test]
    fn test_spaces_and_comment() {
        let line = parse_line("  a \t b  #c", true).unwrap();
        assert_eq!(line.spaces(), &["  ", " \t ", "  "]);
        assert_eq!(line.comment(), Some("c"));

        let line = parse_line("a", true).unwrap();
        assert_eq!(line.spaces(), &[""]);
        assert_eq!(line.comment(), None);

        let line = parse_line("a#", true).unwrap();
        assert_eq!(line.comment(), Some(""));
    }

    #[test]
    fn test_escapes() {
        let line = parse_line("\"a\"\"b\" \"x\"#\"y\" \"p\"-\"q\" \"1\"/\"2\"", true).unwrap();
        assert_eq!(
            values(&line),
            vec![Some("a\"b"), Some("x#y"), Some("p-q"), Some("1\n2")]
        );
    }

    #[test]
    fn test_bare_prefix_continues_into_quotes() {
        let line = parse_line("ab\"c d\"", true).unwrap();
        assert_eq!(values(&line), vec![Some("abc d")]);
    }

    #[test]
    fn test_adjacent_values_get_a_slot() {
        let line = parse_line("\"a\"b", true).unwrap();
        assert_eq!(values(&line), vec![Some("a"), Some("b")]);
        assert_eq!(line.spaces(), &["", " "]);
        assert_eq!(line.to_string(), "a b");
    }

    #[test]
    fn test_canonical_mode() {
        let line = parse_line("   a \t  b   # comment", false).unwrap();
        assert_eq!(line.spaces(), &["", " "]);
        assert_eq!(line.comment(), Some(""));
        assert_eq!(line.to_string(), "a b#");
        assert_eq!(line.to_minimal_string(), "a b");

        let line = parse_line("  ", false).unwrap();
        assert!(line.spaces().is_empty());
        assert_eq!(line.to_string(), "");
    }

    #[test]
    fn test_errors_report_columns() {
        assert_eq!(
            parse_line("ab \"cd", true),
            Err(Error::UnterminatedQuote { line: 1, col: 4 })
        );
        assert_eq!(
            parse_line("\u{00E9} \"x\"-", true),
            Err(Error::UnterminatedQuote { line: 1, col: 3 })
        );
        assert_eq!(
            parse_line("\"x\"/y", true),
            Err(Error::InvalidEscapeContinuation {
                line: 1,
                col: 5,
                found: 'y'
            })
        );
        assert!(matches!(parse_line("a\nb", true), Err(Error::Custom(_))));
    }

    #[test]
    fn test_from_str() {
        let line: WsvLine = " x ".parse().unwrap();
        assert_eq!(line.to_string(), " x ");
    }
}
