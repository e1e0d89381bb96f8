//! WSV, SML and ReliableTXT Format Reference
//!
//! This module documents the formats as implemented by this library. It contains
//! no code.
//!
//! # ReliableTXT
//!
//! The byte layer under both formats.
//!
//! - Every stream starts with a byte order mark naming its encoding:
//!   `EF BB BF` (UTF-8), `FE FF` (UTF-16 big endian), `FF FE` (UTF-16 little endian)
//! - UTF-32 marks (`00 00 FE FF`, `FF FE 00 00`) are recognized and rejected
//! - Lines are separated by U+000A only. U+000D is ordinary content
//! - There is no final terminator: `n` line feeds mean `n + 1` lines
//!
//! # WSV lines
//!
//! ```text
//! Line    := (Space? Token)* Space? ("#" Comment)?
//! Token   := Null | Bare | Quoted
//! Null    := "-"
//! Bare    := one or more characters other than '"', '#' and whitespace
//! Quoted  := '"' Segment* '"' (Escape '"' Segment* '"')*
//! Escape  := '"' | "#" | "-" | "/"
//! ```
//!
//! ## Whitespace
//!
//! Exactly these 24 code points separate values:
//!
//! ```text
//! U+0009 U+000B U+000C U+000D U+0020 U+0085 U+00A0 U+1680
//! U+2000 U+2001 U+2002 U+2003 U+2004 U+2005 U+2006 U+2007
//! U+2008 U+2009 U+200A U+2028 U+2029 U+202F U+205F U+3000
//! ```
//!
//! ## Quoting
//!
//! Inside a quoted value, `""` is one quote character and `"/"` is a line feed.
//! `"#"` and `"-"` keep `#` and `-` inside the value; the quote after them is
//! required.
//!
//! ```text
//! a "b c" - "" "-" "say ""hi""" "one"/"two"   # comment
//! ```
//!
//! reads as the values `a`, `b c`, null, the empty string, the string `-`,
//! `say "hi"` and `one⏎two`, followed by the comment ` comment`.
//!
//! A bare `-` inside a longer token is ordinary text: `-a`, `a-b` and `a-` are
//! plain values.
//!
//! ## Layout
//!
//! A line keeps the whitespace before every value, the whitespace after the last
//! value and the comment, so it can be written back byte for byte. Without
//! layout, a line has single spaces between values and no outer whitespace.
//!
//! # SML
//!
//! An SML document is a sequence of WSV lines:
//!
//! | values | meaning |
//! |---|---|
//! | 0 | empty line (blank, whitespace or comment only) |
//! | 1, equal to `end` in any case | closes the innermost open element |
//! | 1, anything else | opens an element with that name |
//! | 2 or more | attribute: a name followed by data values |
//!
//! ```text
//! Config
//!   # network
//!   Server
//!     Host  example.org
//!     Ports 80 443
//!   End
//! end
//! ```
//!
//! Name comparison ignores case, using per-character Unicode lowercase mapping.
//! There is no explicit root line: the top level belongs to an implicit root.
//! Every element must be closed before the input ends.
