//! Error types for WSV/SML parsing, building and encoding.
//!
//! This module provides error reporting with enough context to locate the
//! problem in the source text.
//!
//! ## Error Categories
//!
//! - **Layout Errors**: Whitespace runs or comments that would break the line format
//! - **Syntax Errors**: Unterminated quotes and bad escape sequences, with line/column
//! - **Structure Errors**: Unbalanced `end` lines and invalid tree edits
//! - **Encoding Errors**: Unsupported schemes and malformed byte streams
//!
//! ## Partial Results
//!
//! Document and tree parsers stop at the first error and hand back whatever was
//! assembled before it, wrapped in a [`PartialParse`]. It converts into [`Error`]
//! so `?` works whenever the partial value is not needed.
//!
//! ## Examples
//!
//! ```rust
//! use wsv_sml::{parse_line, Error};
//!
//! let result = parse_line("a \"unterminated", true);
//! assert!(matches!(result, Err(Error::UnterminatedQuote { line: 1, .. })));
//! ```

use crate::rtxt::Encoding;
use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// A whitespace run is empty where it must not be, or holds a non-whitespace code point
    #[error("Invalid whitespace at slot {index}: {msg}")]
    InvalidWhitespace { index: usize, msg: String },

    /// A comment contains a line feed
    #[error("Invalid comment: {msg}")]
    InvalidComment { msg: String },

    /// The line ended inside a quoted value
    #[error("Unterminated quoted value at line {line}, column {col}")]
    UnterminatedQuote { line: usize, col: usize },

    /// Something other than a quote followed an escaped `#`, `-` or `/`
    #[error("Invalid character '{found}' after escaped segment at line {line}, column {col}\nHelp: an escaped character must be followed by '\"' to continue the quoted value")]
    InvalidEscapeContinuation {
        line: usize,
        col: usize,
        found: char,
    },

    /// An `end` line with no open element
    #[error("Unmatched end tag at line {line}")]
    UnmatchedEndTag { line: usize },

    /// Input ended while elements were still open
    #[error("Missing end tag(s) for: {}", .names.join(", "))]
    MissingEndTag { names: Vec<String> },

    /// The requested encoding scheme is recognized but not implemented
    #[error("Encoding {0} is not implemented")]
    UnsupportedEncoding(Encoding),

    /// The byte stream is not valid under its encoding scheme
    #[error("Invalid encoded input: {0}")]
    InvalidEncoding(String),

    /// Children can only be added to the root or to elements
    #[error("Cannot add children to a node of kind {kind}")]
    NotAContainer { kind: String },

    /// The operation needs a node of another kind
    #[error("Expected {expected} node, found {found}")]
    WrongKind { expected: String, found: String },

    /// An attribute needs a name and at least one data value
    #[error("Attribute '{name}' must have at least one value")]
    InvalidAttribute { name: String },

    /// The name would be read back as an end line
    #[error("'{name}' is reserved as the end keyword")]
    ReservedName { name: String },

    /// A node id that does not belong to this document
    #[error("No node with id {0}")]
    NoSuchNode(usize),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a whitespace validation error for the given slot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wsv_sml::Error;
    ///
    /// let err = Error::invalid_whitespace(2, "non-first whitespace cannot be empty");
    /// assert!(err.to_string().contains("slot 2"));
    /// ```
    pub fn invalid_whitespace(index: usize, msg: &str) -> Self {
        Error::InvalidWhitespace {
            index,
            msg: msg.to_string(),
        }
    }

    /// Creates a comment validation error.
    pub fn invalid_comment(msg: &str) -> Self {
        Error::InvalidComment {
            msg: msg.to_string(),
        }
    }

    /// Creates an unterminated quote error.
    pub fn unterminated_quote(line: usize, col: usize) -> Self {
        Error::UnterminatedQuote { line, col }
    }

    /// Creates an escape continuation error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wsv_sml::Error;
    ///
    /// let err = Error::invalid_escape(3, 7, 'x');
    /// assert!(err.to_string().contains("line 3, column 7"));
    /// assert!(err.to_string().contains("Help:"));
    /// ```
    pub fn invalid_escape(line: usize, col: usize, found: char) -> Self {
        Error::InvalidEscapeContinuation { line, col, found }
    }

    /// Creates a node kind mismatch error.
    pub fn wrong_kind(expected: &str, found: &str) -> Self {
        Error::WrongKind {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an invalid encoding error for malformed input bytes.
    pub fn invalid_encoding(msg: &str) -> Self {
        Error::InvalidEncoding(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wsv_sml::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Moves a line-relative syntax error to an absolute line number.
    ///
    /// Errors without a line position are returned unchanged.
    #[must_use]
    pub fn at_line(self, line: usize) -> Self {
        match self {
            Error::UnterminatedQuote { col, .. } => Error::UnterminatedQuote { line, col },
            Error::InvalidEscapeContinuation { col, found, .. } => {
                Error::InvalidEscapeContinuation { line, col, found }
            }
            Error::UnmatchedEndTag { .. } => Error::UnmatchedEndTag { line },
            other => other,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(&err.to_string())
    }
}

/// The outcome of a parse that stopped early: everything assembled before the
/// failing line, plus the error that stopped it.
///
/// # Examples
///
/// ```rust
/// use wsv_sml::{ParseOptions, WsvDocument};
///
/// let failure = WsvDocument::from_str("a b\nc \"d", &ParseOptions::new()).unwrap_err();
/// assert_eq!(failure.partial.len(), 1);
/// assert_eq!(failure.error.to_string(), "Unterminated quoted value at line 2, column 3");
/// ```
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct PartialParse<T: fmt::Debug> {
    /// Whatever was built before the error.
    pub partial: T,
    /// The error that ended the parse.
    pub error: Error,
}

impl<T: fmt::Debug> PartialParse<T> {
    pub fn new(partial: T, error: Error) -> Self {
        PartialParse { partial, error }
    }

    /// Discards the partial value.
    pub fn into_error(self) -> Error {
        self.error
    }
}

impl<T: fmt::Debug> From<PartialParse<T>> for Error {
    fn from(failure: PartialParse<T>) -> Self {
        failure.error
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Result of a document or tree parse: the full value, or the partial one and its error.
pub type ParseResult<T> = std::result::Result<T, PartialParse<T>>;
