//! WSV documents: sequences of lines.
//!
//! A [`WsvDocument`] parses every line of a decoded text with
//! [`parse_line`](crate::parse_line) and writes them back joined by line feeds,
//! with no trailing terminator.
//!
//! ## Examples
//!
//! ```rust
//! use wsv_sml::{Encoding, ParseOptions, WsvDocument};
//!
//! let text = "# header\nname  age\nAlice 30\nBob   -";
//! let doc = WsvDocument::from_str(text, &ParseOptions::new()).unwrap();
//! assert_eq!(doc.len(), 4);
//! assert!(doc.lines()[3].is_null(1));
//! assert_eq!(doc.to_string(), text);
//!
//! let bytes = doc.to_bytes(Encoding::Utf16Be).unwrap();
//! let back = WsvDocument::from_bytes(&bytes, &ParseOptions::new()).unwrap();
//! assert_eq!(back, doc);
//! ```
//!
//! Parsing stops at the first bad line and hands back what came before it:
//!
//! ```rust
//! use wsv_sml::{Error, ParseOptions, WsvDocument};
//!
//! let failure = WsvDocument::from_str("a\nb\n\"c", &ParseOptions::new()).unwrap_err();
//! assert_eq!(failure.partial.len(), 2);
//! assert_eq!(failure.error, Error::UnterminatedQuote { line: 3, col: 1 });
//! ```

use crate::de::parse_line;
use crate::error::{ParseResult, PartialParse};
use crate::line::WsvLine;
use crate::options::ParseOptions;
use crate::rtxt::{self, Encoding, LineReader};
use crate::{Error, Result};
use std::fmt;
use std::io::{Read, Write};
use tracing::debug;

/// Feeds each decoded line at or after `options.start_line` through the
/// tokenizer. `each` receives the parsed line and its 1-based physical line
/// number. Returns the number of lines handed to `each`.
pub(crate) fn parse_lines<I, S, F>(lines: I, options: &ParseOptions, mut each: F) -> Result<usize>
where
    I: IntoIterator<Item = Result<S>>,
    S: AsRef<str>,
    F: FnMut(WsvLine, usize) -> Result<()>,
{
    let mut parsed = 0;
    for (index, text) in lines.into_iter().enumerate() {
        let number = index + 1;
        let text = text?;
        if index < options.start_line {
            continue;
        }
        let line =
            parse_line(text.as_ref(), options.preserve_layout).map_err(|e| e.at_line(number))?;
        each(line, number)?;
        parsed += 1;
    }
    Ok(parsed)
}

/// An ordered sequence of WSV lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WsvDocument {
    lines: Vec<WsvLine>,
}

impl WsvDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a sequence of decoded lines, such as a [`LineReader`].
    ///
    /// Lines before `options.start_line` are skipped but still counted in the
    /// line numbers of errors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wsv_sml::rtxt::LineReader;
    /// use wsv_sml::{Encoding, ParseOptions, WsvDocument};
    ///
    /// let bytes = [0xFF, 0xFE, b'a', 0, b' ', 0, b'b', 0];
    /// let reader = LineReader::with_encoding(&bytes[..], Encoding::Utf16Le).unwrap();
    /// let doc = WsvDocument::parse(reader, &ParseOptions::new()).unwrap();
    /// assert_eq!(doc.to_string(), "a b");
    /// ```
    ///
    /// # Errors
    ///
    /// Stops at the first decoding or tokenizer error and returns the lines
    /// parsed before it together with the error.
    pub fn parse<I, S>(lines: I, options: &ParseOptions) -> ParseResult<Self>
    where
        I: IntoIterator<Item = Result<S>>,
        S: AsRef<str>,
    {
        debug!(
            start_line = options.start_line,
            preserve_layout = options.preserve_layout,
            "parsing WSV document"
        );
        let mut doc = WsvDocument::new();
        match parse_lines(lines, options, |line, _| {
            doc.lines.push(line);
            Ok(())
        }) {
            Ok(count) => {
                debug!(lines = count, "parsed WSV document");
                Ok(doc)
            }
            Err(error) => {
                debug!(%error, lines = doc.len(), "WSV document parse stopped");
                Err(PartialParse::new(doc, error))
            }
        }
    }

    /// Parses decoded text, splitting it on line feeds.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str, options: &ParseOptions) -> ParseResult<Self> {
        Self::parse(rtxt::split(text).into_iter().map(Ok), options)
    }

    /// Reads and decodes a byte stream, detecting the encoding from its BOM.
    pub fn from_reader<R: Read>(reader: R, options: &ParseOptions) -> ParseResult<Self> {
        Self::parse(LineReader::new(reader), options)
    }

    /// Decodes a complete byte buffer, detecting the encoding from its BOM.
    pub fn from_bytes(bytes: &[u8], options: &ParseOptions) -> ParseResult<Self> {
        Self::from_reader(bytes, options)
    }

    /// Returns the exact rendering of every line.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }

    /// Encodes the document under `encoding`, BOM first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedEncoding`] for [`Encoding::Utf32`].
    pub fn to_bytes(&self, encoding: Encoding) -> Result<Vec<u8>> {
        rtxt::encode_lines(&self.to_lines(), encoding)
    }

    /// Writes the document under `encoding` and returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoding is unsupported (nothing is written) or
    /// the writer fails.
    pub fn to_writer<W: Write>(&self, writer: W, encoding: Encoding) -> Result<usize> {
        rtxt::write_lines(writer, &self.to_lines(), encoding)
    }

    /// Renders only the values of every line, one line per row.
    #[must_use]
    pub fn to_minimal_string(&self) -> String {
        let lines: Vec<String> = self.lines.iter().map(WsvLine::to_minimal_string).collect();
        rtxt::join(&lines)
    }

    #[must_use]
    pub fn lines(&self) -> &[WsvLine] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut Vec<WsvLine> {
        &mut self.lines
    }

    pub fn push(&mut self, line: WsvLine) {
        self.lines.push(line);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WsvLine> {
        self.lines.iter()
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<WsvLine> {
        self.lines
    }
}

impl fmt::Display for WsvDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            crate::ser::write_line(&mut out, line);
        }
        f.write_str(&out)
    }
}

impl From<Vec<WsvLine>> for WsvDocument {
    fn from(lines: Vec<WsvLine>) -> Self {
        WsvDocument { lines }
    }
}

impl FromIterator<WsvLine> for WsvDocument {
    fn from_iter<T: IntoIterator<Item = WsvLine>>(iter: T) -> Self {
        WsvDocument {
            lines: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for WsvDocument {
    type Item = WsvLine;
    type IntoIter = std::vec::IntoIter<WsvLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

impl<'a> IntoIterator for &'a WsvDocument {
    type Item = &'a WsvLine;
    type IntoIter = std::slice::Iter<'a, WsvLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

impl std::str::FromStr for WsvDocument {
    type Err = Error;

    /// Parses with default options, discarding the partial result on error.
    fn from_str(s: &str) -> Result<Self> {
        Ok(WsvDocument::from_str(s, &ParseOptions::new())?)
    }
}
