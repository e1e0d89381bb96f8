//! WSV value quoting and line rendering.
//!
//! Two renderings exist for every line:
//!
//! - **Exact** ([`line_to_string`], `Display`): each value preceded by its
//!   whitespace run, then the trailing run, then `#` and the comment text
//! - **Minimal** ([`line_to_minimal_string`]): the values joined by single
//!   spaces, without comment
//!
//! ## Quoting
//!
//! | value | written as |
//! |---|---|
//! | null | `-` |
//! | empty string | `""` |
//! | the string `-` | `"-"` |
//! | contains `"`, `#`, whitespace or a line feed | quoted, `"` doubled, line feed as `"/"` |
//! | anything else | verbatim |
//!
//! ```rust
//! use wsv_sml::ser::serialize_value;
//!
//! assert_eq!(serialize_value(None), "-");
//! assert_eq!(serialize_value(Some("")), "\"\"");
//! assert_eq!(serialize_value(Some("-")), "\"-\"");
//! assert_eq!(serialize_value(Some("say \"hi\"")), "\"say \"\"hi\"\"\"");
//! assert_eq!(serialize_value(Some("a\nb")), "\"a\"/\"b\"");
//! assert_eq!(serialize_value(Some("plain")), "plain");
//! ```

use crate::line::WsvLine;
use crate::whitespace::is_special;

/// Appends the serialized form of one value to `out`.
#[inline]
pub fn write_value(out: &mut String, value: Option<&str>) {
    let value = match value {
        None => {
            out.push('-');
            return;
        }
        Some(value) => value,
    };
    if !is_special(value) {
        out.push_str(value);
        return;
    }
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\"\""),
            '\n' => out.push_str("\"/\""),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

/// Returns the serialized form of one value.
#[must_use]
pub fn serialize_value(value: Option<&str>) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Width of the serialized value in code points.
#[must_use]
pub fn serialized_width(value: Option<&str>) -> usize {
    match value {
        None => 1,
        Some(value) if !is_special(value) => value.chars().count(),
        Some(value) => {
            2 + value
                .chars()
                .map(|ch| match ch {
                    '"' => 2,
                    '\n' => 3,
                    _ => 1,
                })
                .sum::<usize>()
        }
    }
}

/// Appends the exact rendering of `line` to `out`.
pub fn write_line(out: &mut String, line: &WsvLine) {
    for (index, value) in line.iter().enumerate() {
        out.push_str(line.space_before(index));
        write_value(out, value);
    }
    let trailing = line.spaces().get(line.len());
    if let Some(trailing) = trailing {
        out.push_str(trailing);
    }
    if let Some(comment) = line.comment() {
        // `"a"#` would read back as an escaped hash.
        if trailing.is_none() && ends_quoted(line) {
            out.push(' ');
        }
        out.push('#');
        out.push_str(comment);
    }
}

fn ends_quoted(line: &WsvLine) -> bool {
    matches!(line.iter().last(), Some(Some(value)) if is_special(value))
}

/// Renders a line exactly, layout and comment included.
#[must_use]
pub fn line_to_string(line: &WsvLine) -> String {
    let mut out = String::new();
    write_line(&mut out, line);
    out
}

/// Appends the minimal rendering of `line` to `out`.
pub fn write_minimal_line(out: &mut String, line: &WsvLine) {
    for (index, value) in line.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        write_value(out, value);
    }
}

/// Renders only the values, separated by single spaces.
#[must_use]
pub fn line_to_minimal_string(line: &WsvLine) -> String {
    let mut out = String::new();
    write_minimal_line(&mut out, line);
    out
}

impl WsvLine {
    /// Renders only the values, separated by single spaces, without comment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wsv_sml::parse_line;
    ///
    /// let line = parse_line("\t\"a b\"   -  c  # note", true).unwrap();
    /// assert_eq!(line.to_minimal_string(), "\"a b\" - c");
    /// ```
    #[must_use]
    pub fn to_minimal_string(&self) -> String {
        line_to_minimal_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_line;

    #[test]
    fn test_quoting_rules() {
        let cases = [
            (None, "-"),
            (Some(""), "\"\""),
            (Some("-"), "\"-\""),
            (Some("--"), "--"),
            (Some("a#b"), "\"a#b\""),
            (Some("a\tb"), "\"a\tb\""),
            (Some("a\u{2028}b"), "\"a\u{2028}b\""),
            (Some("\n"), "\"\"/\"\""),
            (Some("\""), "\"\"\"\""),
            (Some("a\rb"), "\"a\rb\""),
            (Some("¥"), "¥"),
        ];
        for (value, expected) in cases {
            assert_eq!(serialize_value(value), expected, "{:?}", value);
        }
    }

    #[test]
    fn test_serialized_width_counts_code_points() {
        let values = [
            None,
            Some(""),
            Some("-"),
            Some("ab\"c"),
            Some("x\ny"),
            Some("日本語"),
            Some("a ¥"),
        ];
        for value in values {
            assert_eq!(
                serialized_width(value),
                serialize_value(value).chars().count(),
                "{:?}",
                value
            );
        }
    }

    #[test]
    fn test_minimal_rendering_is_idempotent() {
        for text in ["  a   b  # c", "\"x y\"  -  \"\"", "#only", "\"a\"/\"b\"\t-"] {
            let minimal = parse_line(text, false).unwrap().to_minimal_string();
            let again = parse_line(&minimal, false).unwrap();
            assert_eq!(again.to_minimal_string(), minimal, "{:?}", text);
            assert_eq!(again.to_string(), minimal, "{:?}", text);
        }
    }

    #[test]
    fn test_comment_after_quoted_value_gets_a_space() {
        let mut line = WsvLine::from_values(["a b"]);
        line.set_comment("c").unwrap();
        assert_eq!(line_to_string(&line), "\"a b\" #c");
        assert_eq!(parse_line(&line_to_string(&line), true).unwrap().value(0), Some("a b"));

        line.set_spaces(vec![String::new(), "\t".to_string()]).unwrap();
        assert_eq!(line_to_string(&line), "\"a b\"\t#c");
    }

    #[test]
    fn test_missing_slots_use_default_spacing() {
        let line = WsvLine::from_values(["a", "b"]);
        assert_eq!(line_to_string(&line), "a b");
        assert_eq!(line_to_minimal_string(&line), "a b");
    }
}
