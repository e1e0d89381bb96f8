//! ReliableTXT line framing.
//!
//! Text files in this family always start with a byte order mark naming their
//! encoding and are split into lines on U+000A only. This module turns bytes into
//! decoded lines ([`LineReader`]) and lines back into bytes ([`write_lines`],
//! [`encode_lines`]).
//!
//! ## Encodings
//!
//! | Scheme | BOM | Status |
//! |--------|-----|--------|
//! | UTF-8 | `EF BB BF` | supported |
//! | UTF-16 big endian | `FE FF` | supported |
//! | UTF-16 little endian | `FF FE` | supported |
//! | UTF-32 | `00 00 FE FF` / `FF FE 00 00` | recognized, always fails |
//!
//! Carriage returns are ordinary content. A text with n line feeds has n + 1
//! lines, so [`split`] and [`join`] are inverses.
//!
//! ## Examples
//!
//! ```rust
//! use wsv_sml::rtxt::{encode_lines, LineReader, Encoding};
//!
//! let bytes = encode_lines(&["a¥", "b"], Encoding::Utf16Le).unwrap();
//! assert_eq!(&bytes[..2], &[0xFF, 0xFE]);
//!
//! let lines: Vec<String> = LineReader::new(bytes.as_slice())
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(lines, vec!["a¥", "b"]);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use tracing::debug;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF32_BE_BOM: &[u8] = &[0x00, 0x00, 0xFE, 0xFF];
const UTF32_LE_BOM: &[u8] = &[0xFF, 0xFE, 0x00, 0x00];

/// Encoding scheme of a ReliableTXT byte stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Be,
    Utf16Le,
    /// Recognized so it can be reported, but never encoded or decoded.
    Utf32,
}

impl Encoding {
    /// Returns the byte order mark written in front of every encoded stream.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wsv_sml::Encoding;
    ///
    /// assert_eq!(Encoding::Utf8.bom(), &[0xEF, 0xBB, 0xBF]);
    /// assert_eq!(Encoding::Utf16Be.bom(), &[0xFE, 0xFF]);
    /// ```
    #[must_use]
    pub const fn bom(&self) -> &'static [u8] {
        match self {
            Encoding::Utf8 => UTF8_BOM,
            Encoding::Utf16Be => UTF16_BE_BOM,
            Encoding::Utf16Le => UTF16_LE_BOM,
            Encoding::Utf32 => UTF32_BE_BOM,
        }
    }

    /// Detects the encoding from a leading byte order mark.
    ///
    /// Returns the encoding and the length of the BOM, or `None` if the input
    /// carries no recognized BOM.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wsv_sml::Encoding;
    ///
    /// assert_eq!(Encoding::detect(&[0xFE, 0xFF, 0x00, 0x61]), Some((Encoding::Utf16Be, 2)));
    /// assert_eq!(Encoding::detect(&[0xFF, 0xFE, 0x00, 0x00]), Some((Encoding::Utf32, 4)));
    /// assert_eq!(Encoding::detect(b"abc"), None);
    /// ```
    #[must_use]
    pub fn detect(input: &[u8]) -> Option<(Encoding, usize)> {
        // UTF-32 LE shares its first two bytes with UTF-16 LE, so it is checked first
        if input.starts_with(UTF32_LE_BOM) || input.starts_with(UTF32_BE_BOM) {
            Some((Encoding::Utf32, 4))
        } else if input.starts_with(UTF8_BOM) {
            Some((Encoding::Utf8, 3))
        } else if input.starts_with(UTF16_BE_BOM) {
            Some((Encoding::Utf16Be, 2))
        } else if input.starts_with(UTF16_LE_BOM) {
            Some((Encoding::Utf16Le, 2))
        } else {
            None
        }
    }

    fn ensure_supported(self) -> Result<Self> {
        match self {
            Encoding::Utf32 => Err(Error::UnsupportedEncoding(self)),
            other => Ok(other),
        }
    }

    /// Appends the encoded form of `text` (without BOM) to `out`.
    fn encode_into(self, text: &str, out: &mut Vec<u8>) {
        match self {
            Encoding::Utf8 => out.extend_from_slice(text.as_bytes()),
            Encoding::Utf16Be => {
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
            }
            Encoding::Utf16Le => {
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
            }
            Encoding::Utf32 => {}
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::Utf32 => "UTF-32",
        };
        f.write_str(name)
    }
}

/// Splits decoded text into lines on U+000A only.
///
/// # Examples
///
/// ```rust
/// use wsv_sml::rtxt::split;
///
/// assert_eq!(split("a\r\nb\n"), vec!["a\r", "b", ""]);
/// assert_eq!(split(""), vec![""]);
/// ```
#[must_use]
pub fn split(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Joins lines with U+000A, without a trailing terminator.
#[must_use]
pub fn join<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.as_ref());
    }
    out
}

/// Encodes lines under `encoding`, BOM first, lines joined by line feeds.
///
/// # Errors
///
/// Returns [`Error::UnsupportedEncoding`] for [`Encoding::Utf32`].
pub fn encode_lines<S: AsRef<str>>(lines: &[S], encoding: Encoding) -> Result<Vec<u8>> {
    let encoding = encoding.ensure_supported()?;
    let mut out = Vec::with_capacity(encoding.bom().len() + 64);
    out.extend_from_slice(encoding.bom());
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            encoding.encode_into("\n", &mut out);
        }
        encoding.encode_into(line.as_ref(), &mut out);
    }
    Ok(out)
}

/// Writes lines to `writer` under `encoding` and returns the number of bytes written.
///
/// Nothing is written when the encoding is rejected.
///
/// # Examples
///
/// ```rust
/// use wsv_sml::rtxt::write_lines;
/// use wsv_sml::{Encoding, Error};
///
/// let mut buffer = Vec::new();
/// let written = write_lines(&mut buffer, &["a¥"], Encoding::Utf8).unwrap();
/// assert_eq!(written, 6);
///
/// let mut buffer = Vec::new();
/// let err = write_lines(&mut buffer, &["a¥"], Encoding::Utf32).unwrap_err();
/// assert_eq!(err, Error::UnsupportedEncoding(Encoding::Utf32));
/// assert!(buffer.is_empty());
/// ```
///
/// # Errors
///
/// Returns an error if the encoding is unsupported or the writer fails.
pub fn write_lines<W, S>(mut writer: W, lines: &[S], encoding: Encoding) -> Result<usize>
where
    W: Write,
    S: AsRef<str>,
{
    let bytes = encode_lines(lines, encoding)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    debug!(lines = lines.len(), bytes = bytes.len(), %encoding, "wrote lines");
    Ok(bytes.len())
}

/// Decodes a complete byte buffer into lines, detecting the encoding from its BOM.
///
/// # Errors
///
/// Returns an error if the input is malformed or UTF-32 encoded.
pub fn decode_lines(bytes: &[u8]) -> Result<Vec<String>> {
    LineReader::new(bytes).collect()
}

/// A lazy, finite, non-restartable source of decoded lines.
///
/// The encoding is taken from the leading BOM (no BOM means UTF-8) unless the
/// reader is created with [`LineReader::with_encoding`]. Each item is one line
/// without its line feed; the iterator ends after the last line or the first error.
pub struct LineReader<R> {
    reader: BufReader<R>,
    encoding: Option<Encoding>,
    finished: bool,
}

impl<R: Read> LineReader<R> {
    /// Creates a reader that detects the encoding from the BOM.
    pub fn new(reader: R) -> Self {
        LineReader {
            reader: BufReader::new(reader),
            encoding: None,
            finished: false,
        }
    }

    /// Creates a reader for a known encoding. A matching leading BOM is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedEncoding`] for [`Encoding::Utf32`].
    pub fn with_encoding(reader: R, encoding: Encoding) -> Result<Self> {
        let encoding = encoding.ensure_supported()?;
        let mut reader = BufReader::new(reader);
        let head = reader.fill_buf()?;
        if head.starts_with(encoding.bom()) {
            let len = encoding.bom().len();
            reader.consume(len);
        }
        Ok(LineReader {
            reader,
            encoding: Some(encoding),
            finished: false,
        })
    }

    /// Returns the encoding in use, once known.
    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    fn resolve_encoding(&mut self) -> Result<Encoding> {
        if let Some(encoding) = self.encoding {
            return Ok(encoding);
        }
        let head = self.reader.fill_buf()?;
        let encoding = match Encoding::detect(head) {
            Some((encoding, len)) => {
                let encoding = encoding.ensure_supported()?;
                self.reader.consume(len);
                encoding
            }
            None => Encoding::Utf8,
        };
        debug!(%encoding, "detected encoding");
        self.encoding = Some(encoding);
        Ok(encoding)
    }

    /// Reads the next line. Returns the decoded text and whether a line feed ended it.
    fn read_line(&mut self) -> Result<(String, bool)> {
        match self.resolve_encoding()? {
            Encoding::Utf8 => {
                let mut buf = Vec::new();
                self.reader.read_until(b'\n', &mut buf)?;
                let terminated = buf.last() == Some(&b'\n');
                if terminated {
                    buf.pop();
                }
                let text = String::from_utf8(buf)
                    .map_err(|e| Error::invalid_encoding(&format!("UTF-8: {}", e)))?;
                Ok((text, terminated))
            }
            encoding @ (Encoding::Utf16Be | Encoding::Utf16Le) => {
                let mut units = Vec::new();
                let mut terminated = false;
                while let Some(unit) = self.read_unit(encoding)? {
                    if unit == 0x000A {
                        terminated = true;
                        break;
                    }
                    units.push(unit);
                }
                let text = String::from_utf16(&units)
                    .map_err(|e| Error::invalid_encoding(&format!("{}: {}", encoding, e)))?;
                Ok((text, terminated))
            }
            Encoding::Utf32 => Err(Error::UnsupportedEncoding(Encoding::Utf32)),
        }
    }

    fn read_unit(&mut self, encoding: Encoding) -> Result<Option<u16>> {
        let mut pair = [0u8; 2];
        let mut filled = 0;
        while filled < pair.len() {
            match self.reader.read(&mut pair[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        match filled {
            0 => Ok(None),
            1 => Err(Error::invalid_encoding(&format!(
                "{}: odd number of bytes",
                encoding
            ))),
            _ => Ok(Some(match encoding {
                Encoding::Utf16Le => u16::from_le_bytes(pair),
                _ => u16::from_be_bytes(pair),
            })),
        }
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_line() {
            Ok((line, terminated)) => {
                self.finished = !terminated;
                Some(Ok(line))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
