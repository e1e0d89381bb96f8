//! # wsv_sml
//!
//! Layout-preserving readers and writers for WSV (Whitespace-Separated Values),
//! SML (Simple Markup Language) and the ReliableTXT line framing beneath them.
//!
//! ## What is WSV?
//!
//! WSV is a line-based table format: values are separated by whitespace, `-`
//! marks a null, `#` starts a comment, and values holding special characters
//! are double-quoted. SML nests WSV lines into a tree, opening an element with
//! a single name and closing it with `end`.
//!
//! ## Key Features
//!
//! - **Lossless**: Whitespace and comments survive a parse → edit → write cycle
//!   byte for byte
//! - **Null Aware**: Nulls are tracked per index, apart from empty strings
//! - **Tree Editing**: SML documents are arena trees with stable [`NodeId`]s
//! - **Column Alignment**: Attribute rows can be re-spaced into aligned columns
//! - **Encodings**: UTF-8 and UTF-16 (both byte orders) with mandatory BOM
//! - **No Unsafe Code**: Written entirely in safe Rust
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! wsv_sml = "0.1"
//! ```
//!
//! ### Lines
//!
//! ```rust
//! use wsv_sml::parse_line;
//!
//! let mut line = parse_line("  Alice  30  \"New York\"  # user", true).unwrap();
//! assert_eq!(line.value(2), Some("New York"));
//!
//! line.set_value(1, "31");
//! line.set_null(2);
//! assert_eq!(line.to_string(), "  Alice  31  -  # user");
//! ```
//!
//! ### Documents
//!
//! ```rust
//! use wsv_sml::{ParseOptions, WsvDocument};
//!
//! let text = "a b c\n# comment\n1 2 -";
//! let doc = WsvDocument::from_str(text, &ParseOptions::new()).unwrap();
//! assert_eq!(doc.len(), 3);
//! assert_eq!(doc.to_string(), text);
//! ```
//!
//! ### Trees
//!
//! ```rust
//! use wsv_sml::{AlignOptions, ParseOptions, SmlDocument};
//!
//! let text = "Users\n  Name Alice\n  Age 30\n  Location \"New York\"\nend";
//! let mut doc = SmlDocument::from_str(text, &ParseOptions::new()).unwrap();
//! let users = doc.element(doc.root(), "users").unwrap();
//!
//! doc.align_attributes(users, &AlignOptions::new()).unwrap();
//! assert_eq!(
//!     doc.to_string(),
//!     "Users\n  Name     Alice\n  Age      30\n  Location \"New York\"\nend"
//! );
//! ```
//!
//! ### Building Lines with the wsv_line! Macro
//!
//! ```rust
//! use wsv_sml::wsv_line;
//!
//! let line = wsv_line!["x", null, "a b"];
//! assert_eq!(line.to_string(), "x - \"a b\"");
//! ```
//!
//! ## Error Handling
//!
//! Setters validate their input and leave the value untouched on failure.
//! Document and tree parsers stop at the first error and return a
//! [`PartialParse`] holding everything parsed before it.
//!
//! ## Logging
//!
//! Parsers and formatters emit [`tracing`] events: `debug` for document-level
//! progress and errors, `trace` for individual tokens and alignment columns.
//! No subscriber is installed by this crate.
//!
//! ## Format Reference
//!
//! See the [`grammar`] module.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - Parsing, editing and writing WSV lines
//! - **`sml_tree.rs`** - Reading, querying and building SML trees
//! - **`align_table.rs`** - Aligning attribute rows into columns
//! - **`encodings.rs`** - Writing and reading UTF-8 and UTF-16 files
//!
//! Run any example with: `cargo run --example <name>`

pub mod align;
pub mod de;
pub mod document;
pub mod error;
pub mod grammar;
pub mod line;
pub mod macros;
pub mod options;
pub mod rtxt;
pub mod ser;
pub mod sml;
pub mod whitespace;

pub use de::parse_line;
pub use document::WsvDocument;
pub use error::{Error, ParseResult, PartialParse, Result};
pub use line::{LineBuilder, NullMask, WsvLine};
pub use options::{AlignOptions, ParseOptions};
pub use rtxt::Encoding;
pub use sml::{NodeId, SmlDocument, SmlKind, SmlNode};

use std::io;

/// Parses WSV text with default options.
///
/// # Examples
///
/// ```rust
/// let doc = wsv_sml::from_str("a b\nc -").unwrap();
/// assert!(doc.lines()[1].is_null(1));
/// ```
///
/// # Errors
///
/// Returns the first tokenizer error, positioned at its line.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(text: &str) -> Result<WsvDocument> {
    Ok(WsvDocument::from_str(text, &ParseOptions::new())?)
}

/// Decodes and parses a WSV byte stream, detecting the encoding from its BOM.
///
/// # Errors
///
/// Returns an error if reading or decoding fails or a line does not tokenize.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(reader: R) -> Result<WsvDocument>
where
    R: io::Read,
{
    Ok(WsvDocument::from_reader(reader, &ParseOptions::new())?)
}

/// Decodes and parses WSV bytes, detecting the encoding from their BOM.
///
/// # Examples
///
/// ```rust
/// let doc = wsv_sml::from_slice(b"\xEF\xBB\xBFa\xC2\xA5 b").unwrap();
/// assert_eq!(doc.lines()[0].value(0), Some("a¥"));
/// ```
///
/// # Errors
///
/// Returns an error if decoding fails or a line does not tokenize.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(bytes: &[u8]) -> Result<WsvDocument> {
    Ok(WsvDocument::from_bytes(bytes, &ParseOptions::new())?)
}

/// Parses SML text with default options.
///
/// # Examples
///
/// ```rust
/// let doc = wsv_sml::sml_from_str("Root\n  Key Value\nEnd").unwrap();
/// let root = doc.element(doc.root(), "root").unwrap();
/// assert_eq!(doc.values(doc.attribute(root, "key").unwrap()), vec![Some("Value")]);
/// ```
///
/// # Errors
///
/// Returns the first tokenizer or nesting error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn sml_from_str(text: &str) -> Result<SmlDocument> {
    Ok(SmlDocument::from_str(text, &ParseOptions::new())?)
}

/// Writes a WSV document as UTF-8 with BOM and returns the number of bytes written.
///
/// # Errors
///
/// Returns an error if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(writer: W, doc: &WsvDocument) -> Result<usize>
where
    W: io::Write,
{
    doc.to_writer(writer, Encoding::Utf8)
}
