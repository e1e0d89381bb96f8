//! Configuration options for parsing and formatting.
//!
//! This module provides the option types that tune parsers and formatters:
//!
//! - [`ParseOptions`]: Layout preservation and starting line for document/tree parsing
//! - [`AlignOptions`]: Separator, column count and right alignment for attribute tables
//!
//! ## Examples
//!
//! ```rust
//! use wsv_sml::{ParseOptions, WsvDocument};
//!
//! // Keep whitespace and comments exactly as written (the default)
//! let exact = WsvDocument::from_str("a   b  # note", &ParseOptions::new()).unwrap();
//! assert_eq!(exact.to_string(), "a   b  # note");
//!
//! // Discard layout and comment text
//! let minimal = WsvDocument::from_str("a   b  # note", &ParseOptions::minimal()).unwrap();
//! assert_eq!(minimal.to_minimal_string(), "a b");
//! ```

use serde::{Deserialize, Serialize};

/// Options controlling how WSV and SML text is parsed.
///
/// # Examples
///
/// ```rust
/// use wsv_sml::ParseOptions;
///
/// let options = ParseOptions::new();
/// assert!(options.preserve_layout);
/// assert_eq!(options.start_line, 0);
///
/// let options = ParseOptions::minimal().with_start_line(2);
/// assert!(!options.preserve_layout);
/// assert_eq!(options.start_line, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Keep whitespace runs and comment text for exact re-serialization.
    pub preserve_layout: bool,
    /// Number of leading lines to skip before parsing starts.
    pub start_line: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            preserve_layout: true,
            start_line: 0,
        }
    }
}

impl ParseOptions {
    /// Creates default options (layout preserved, start at the first line).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options that canonicalize layout and drop comment text.
    #[must_use]
    pub fn minimal() -> Self {
        ParseOptions {
            preserve_layout: false,
            ..Default::default()
        }
    }

    /// Sets whether whitespace runs and comments are preserved.
    #[must_use]
    pub fn with_preserve_layout(mut self, preserve_layout: bool) -> Self {
        self.preserve_layout = preserve_layout;
        self
    }

    /// Sets the number of leading lines to skip.
    ///
    /// Skipped lines still count towards the line numbers reported in errors.
    #[must_use]
    pub fn with_start_line(mut self, start_line: usize) -> Self {
        self.start_line = start_line;
        self
    }
}

/// Options for aligning the attribute rows of an SML element into columns.
///
/// # Examples
///
/// ```rust
/// use wsv_sml::AlignOptions;
///
/// let options = AlignOptions::new()
///     .with_separator("\t")
///     .with_min_columns(3)
///     .with_right_aligned(vec![false, true, true]);
/// assert_eq!(options.separator, "\t");
/// assert!(options.is_right_aligned(1));
/// assert!(!options.is_right_aligned(7));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignOptions {
    /// Whitespace placed between columns. Must be a non-empty whitespace run.
    pub separator: String,
    /// Minimum number of columns to lay out.
    pub min_columns: usize,
    /// Per-column right alignment; columns past the end are left-aligned.
    pub right_aligned: Vec<bool>,
}

impl Default for AlignOptions {
    fn default() -> Self {
        AlignOptions {
            separator: " ".to_string(),
            min_columns: 0,
            right_aligned: Vec::new(),
        }
    }
}

impl AlignOptions {
    /// Creates default options (single space separator, all columns left-aligned).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    #[must_use]
    pub fn with_min_columns(mut self, min_columns: usize) -> Self {
        self.min_columns = min_columns;
        self
    }

    #[must_use]
    pub fn with_right_aligned(mut self, right_aligned: Vec<bool>) -> Self {
        self.right_aligned = right_aligned;
        self
    }

    /// Returns whether the given column is right-aligned.
    #[inline]
    #[must_use]
    pub fn is_right_aligned(&self, column: usize) -> bool {
        self.right_aligned.get(column).copied().unwrap_or(false)
    }
}
