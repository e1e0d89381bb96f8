//! The WSV line model.
//!
//! A [`WsvLine`] keeps everything needed to write a line back byte for byte:
//!
//! - **Values**: the strings of the line, in order
//! - **Nulls**: a growable bit set marking which values are the null marker `-`
//! - **Spaces**: the whitespace runs; slot `i` precedes value `i`, and slot
//!   `values.len()` is the trailing run before the comment or end of line.
//!   The list holds 0, `len` or `len + 1` runs; missing runs render as the
//!   default spacing
//! - **Comment**: the text after `#`, if the line had one
//!
//! ## Examples
//!
//! ```rust
//! use wsv_sml::WsvLine;
//!
//! let mut line = WsvLine::from_values(["name", "Alice"]);
//! line.set_spaces(vec!["  ".to_string(), "\t".to_string()]).unwrap();
//! line.set_comment("user").unwrap();
//! line.push_null();
//! assert_eq!(line.to_string(), "  name\tAlice -#user");
//! assert_eq!(line.to_minimal_string(), "name Alice -");
//! ```

use crate::whitespace::{validate_comment, validate_layout, validate_space};
use crate::{Error, Result};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A growable set of value indices, one bit per index.
///
/// # Examples
///
/// ```rust
/// use wsv_sml::NullMask;
///
/// let mut mask = NullMask::new();
/// mask.set(70, true);
/// assert!(mask.get(70));
/// assert!(!mask.get(3));
/// assert_eq!(mask.iter().collect::<Vec<_>>(), vec![70]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NullMask(BigUint);

impl NullMask {
    #[must_use]
    pub fn new() -> Self {
        NullMask(BigUint::default())
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> bool {
        self.0.bit(index as u64)
    }

    #[inline]
    pub fn set(&mut self, index: usize, null: bool) {
        self.0.set_bit(index as u64, null);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.bits() == 0
    }

    pub fn clear(&mut self) {
        self.0 = BigUint::default();
    }

    /// Drops every bit at or above `len`.
    pub fn truncate(&mut self, len: usize) {
        for index in self.iter().filter(|&i| i >= len).collect::<Vec<_>>() {
            self.set(index, false);
        }
    }

    /// Iterates the set indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.0.bits() as usize).filter(move |&i| self.get(i))
    }
}

/// One line of WSV text: values, null flags, whitespace runs and an optional comment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LineParts", into = "LineParts")]
pub struct WsvLine {
    values: Vec<String>,
    nulls: NullMask,
    spaces: Vec<String>,
    comment: Option<String>,
}

impl WsvLine {
    /// Creates an empty line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a line holding the given non-null values and default spacing.
    #[must_use]
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        WsvLine {
            values: values.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Creates a line from values, spaces and comment, validating the layout.
    ///
    /// # Errors
    ///
    /// Returns an error if a whitespace run or the comment is invalid.
    pub fn with_layout(
        values: Vec<String>,
        spaces: Vec<String>,
        comment: Option<String>,
    ) -> Result<Self> {
        let mut line = WsvLine {
            values,
            ..Default::default()
        };
        line.set_spaces(spaces)?;
        if let Some(comment) = comment {
            line.set_comment(comment)?;
        }
        Ok(line)
    }

    /// Builds a line from parts the tokenizer has already validated.
    pub(crate) fn from_raw_parts(
        values: Vec<String>,
        nulls: NullMask,
        spaces: Vec<String>,
        comment: Option<String>,
    ) -> Self {
        WsvLine {
            values,
            nulls,
            spaces,
            comment,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the stored value strings. Null entries hold whatever string was
    /// last stored at that index (usually empty); check [`WsvLine::is_null`].
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns the value at `index`, or `None` if it is null or out of range.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&str> {
        if self.is_null(index) {
            None
        } else {
            self.values.get(index).map(String::as_str)
        }
    }

    /// Iterates the values, yielding `None` for nulls.
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, v)| (!self.nulls.get(i)).then_some(v.as_str()))
    }

    /// Sets the value at `index`, clearing its null flag. Indices between the
    /// current end and `index` are filled with nulls.
    ///
    /// # Panics
    ///
    /// Panics if `index` is `usize::MAX`.
    pub fn set_value(&mut self, index: usize, value: impl Into<String>) {
        self.grow_with_nulls(index);
        self.values[index] = value.into();
        self.nulls.set(index, false);
    }

    /// Replaces all values with non-null strings. The leading and trailing
    /// runs are kept; gaps are dropped or added with default spacing.
    pub fn set_values<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let old_len = self.values.len();
        self.values = values.into_iter().map(Into::into).collect();
        self.nulls.clear();
        self.fit_spaces(old_len);
    }

    pub fn push_value(&mut self, value: impl Into<String>) {
        let old_len = self.values.len();
        self.values.push(value.into());
        self.fit_spaces(old_len);
    }

    pub fn push_null(&mut self) {
        let old_len = self.values.len();
        self.values.push(String::new());
        self.nulls.set(old_len, true);
        self.fit_spaces(old_len);
    }

    /// Removes the value at `index`, shifting later values and their null flags down.
    /// Returns `None` if out of range, `Some(None)` for a removed null.
    pub fn remove_value(&mut self, index: usize) -> Option<Option<String>> {
        if index >= self.values.len() {
            return None;
        }
        let was_null = self.nulls.get(index);
        let value = self.values.remove(index);
        // Drop the gap before the value; the first value takes its following gap.
        let slot = index.max(1);
        if slot < self.spaces.len() {
            self.spaces.remove(slot);
        }
        for i in index..self.values.len() {
            let next = self.nulls.get(i + 1);
            self.nulls.set(i, next);
        }
        self.nulls.truncate(self.values.len());
        Some((!was_null).then_some(value))
    }

    /// Returns the null flag at `index`; out-of-range indices are not null.
    #[inline]
    #[must_use]
    pub fn is_null(&self, index: usize) -> bool {
        index < self.values.len() && self.nulls.get(index)
    }

    /// Marks the value at `index` as null, growing the line with nulls if needed.
    ///
    /// # Panics
    ///
    /// Panics if `index` is `usize::MAX`.
    pub fn set_null(&mut self, index: usize) {
        self.grow_with_nulls(index);
        self.nulls.set(index, true);
    }

    /// Clears the null flag at `index`; the stored string becomes visible again.
    pub fn unset_null(&mut self, index: usize) {
        self.nulls.set(index, false);
    }

    #[must_use]
    pub fn nulls(&self) -> &NullMask {
        &self.nulls
    }

    /// Grows the line with nulls until `index` is in range.
    fn grow_with_nulls(&mut self, index: usize) {
        let old_len = self.values.len();
        if index < old_len {
            return;
        }
        assert!(index < usize::MAX, "value index {} is out of range", index);
        for i in old_len..=index {
            self.values.push(String::new());
            self.nulls.set(i, true);
        }
        self.fit_spaces(old_len);
    }

    /// Re-fits the whitespace runs after the value count changed from `old_len`.
    fn fit_spaces(&mut self, old_len: usize) {
        let len = self.values.len();
        if self.spaces.is_empty() || len == old_len {
            return;
        }
        let trailing = if old_len > 0 && self.spaces.len() == old_len + 1 {
            self.spaces.pop()
        } else {
            None
        };
        self.spaces.truncate(len.max(1));
        while self.spaces.len() < len {
            self.spaces.push(" ".to_string());
        }
        if let Some(trailing) = trailing.filter(|_| len > 0) {
            self.spaces.push(trailing);
        }
    }

    #[must_use]
    pub fn spaces(&self) -> &[String] {
        &self.spaces
    }

    /// Replaces all whitespace runs. On error the line is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWhitespace`] if the list does not hold 0, `len`
    /// or `len + 1` runs, a run holds a non-whitespace code point, or a run
    /// other than the first is empty.
    pub fn set_spaces(&mut self, spaces: Vec<String>) -> Result<()> {
        validate_layout(&spaces, self.values.len())?;
        self.spaces = spaces;
        Ok(())
    }

    /// Sets the whitespace run at slot `index`, filling the other slots up to
    /// the value count with default spacing. Slot `len()` is the trailing run.
    /// On error the line is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWhitespace`] if the run is invalid for its slot
    /// or `index` is past the trailing slot.
    pub fn set_space(&mut self, index: usize, space: impl Into<String>) -> Result<()> {
        let space = space.into();
        if index > self.values.len() {
            return Err(Error::invalid_whitespace(
                index,
                &format!("no whitespace slot after {} values", self.values.len()),
            ));
        }
        validate_space(&space, index)?;
        while self.spaces.len() <= index || self.spaces.len() < self.values.len() {
            let filler = if self.spaces.is_empty() { "" } else { " " };
            self.spaces.push(filler.to_string());
        }
        self.spaces[index] = space;
        Ok(())
    }

    /// Removes all explicit whitespace runs; the line renders with default spacing.
    pub fn clear_spaces(&mut self) {
        self.spaces.clear();
    }

    /// Returns the whitespace written before value `index` (or the trailing run
    /// for `index == len()`), falling back to default spacing.
    #[must_use]
    pub fn space_before(&self, index: usize) -> &str {
        match self.spaces.get(index) {
            Some(space) => space,
            None if index == 0 || index >= self.values.len() => "",
            None => " ",
        }
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn has_comment(&self) -> bool {
        self.comment.is_some()
    }

    /// Sets the comment text (without the leading `#`). On error the line is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidComment`] if the text contains a line feed.
    pub fn set_comment(&mut self, comment: impl Into<String>) -> Result<()> {
        let comment = comment.into();
        validate_comment(&comment)?;
        self.comment = Some(comment);
        Ok(())
    }

    pub fn clear_comment(&mut self) {
        self.comment = None;
    }
}

impl fmt::Display for WsvLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::ser::line_to_string(self))
    }
}

/// Serde form of a line. Deserializing goes through the layout validators.
#[derive(Serialize, Deserialize)]
struct LineParts {
    values: Vec<Option<String>>,
    #[serde(default)]
    spaces: Vec<String>,
    #[serde(default)]
    comment: Option<String>,
}

impl TryFrom<LineParts> for WsvLine {
    type Error = Error;

    fn try_from(parts: LineParts) -> Result<Self> {
        let mut nulls = NullMask::new();
        let values = parts
            .values
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                nulls.set(i, value.is_none());
                value.unwrap_or_default()
            })
            .collect();
        let mut line = WsvLine::with_layout(values, parts.spaces, parts.comment)?;
        line.nulls = nulls;
        Ok(line)
    }
}

impl From<WsvLine> for LineParts {
    fn from(line: WsvLine) -> Self {
        let values = line
            .iter()
            .map(|value| value.map(str::to_string))
            .collect();
        LineParts {
            values,
            spaces: line.spaces,
            comment: line.comment,
        }
    }
}

/// Chained construction of a [`WsvLine`]. The first failing step is reported
/// by [`LineBuilder::build`]; later steps are still applied.
///
/// # Examples
///
/// ```rust
/// use wsv_sml::LineBuilder;
///
/// let line = LineBuilder::new()
///     .values(["a", "b"])
///     .null(2)
///     .space(0, "\t")
///     .comment(" trailing")
///     .build()
///     .unwrap();
/// assert_eq!(line.to_string(), "\ta b -# trailing");
///
/// assert!(LineBuilder::new().space(1, "x").build().is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineBuilder {
    line: WsvLine,
    error: Option<Error>,
}

impl LineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(mut self, index: usize, value: impl Into<String>) -> Self {
        self.line.set_value(index, value);
        self
    }

    #[must_use]
    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.line.set_values(values);
        self
    }

    #[must_use]
    pub fn space(mut self, index: usize, space: impl Into<String>) -> Self {
        let result = self.line.set_space(index, space);
        self.record(result)
    }

    #[must_use]
    pub fn spaces<I, S>(mut self, spaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let result = self
            .line
            .set_spaces(spaces.into_iter().map(Into::into).collect());
        self.record(result)
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        let result = self.line.set_comment(comment);
        self.record(result)
    }

    #[must_use]
    pub fn clear_comment(mut self) -> Self {
        self.line.clear_comment();
        self
    }

    #[must_use]
    pub fn null(mut self, index: usize) -> Self {
        self.line.set_null(index);
        self
    }

    #[must_use]
    pub fn not_null(mut self, index: usize) -> Self {
        self.line.unset_null(index);
        self
    }

    fn record(mut self, result: Result<()>) -> Self {
        if let Err(e) = result {
            self.error.get_or_insert(e);
        }
        self
    }

    /// Finishes the line.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a builder step.
    pub fn build(self) -> Result<WsvLine> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_with_layout_accepts_valid_shapes() {
        let v1 = strings(&["a"]);
        let v2 = strings(&["a", "b"]);
        let s1 = strings(&["\t\t"]);
        let s1e = strings(&[""]);
        let s2 = strings(&["\t\t", "  "]);
        let cases = [
            (vec![], vec![], None),
            (v1.clone(), vec![], None),
            (v2.clone(), vec![], None),
            (vec![], s1.clone(), None),
            (v1.clone(), s1.clone(), None),
            (v1.clone(), s2.clone(), None),
            (vec![], vec![], Some("c")),
            (vec![], s1e.clone(), Some("c")),
            (vec![], s1.clone(), Some("c")),
            (v1.clone(), s1e.clone(), Some("c")),
            (v1.clone(), s2.clone(), Some("c")),
            (v2.clone(), s2.clone(), Some("")),
        ];
        for (i, (values, spaces, comment)) in cases.into_iter().enumerate() {
            let result = WsvLine::with_layout(values, spaces, comment.map(str::to_string));
            assert!(result.is_ok(), "case {}: {:?}", i, result);
        }
    }

    #[test]
    fn test_with_layout_rejects_run_counts() {
        let cases = [
            (strings(&[]), strings(&["", " "])),
            (strings(&["a"]), strings(&["", " ", " "])),
            (strings(&["a", "b", "c"]), strings(&["  "])),
            (strings(&["a", "b", "c"]), strings(&["", " "])),
        ];
        for (values, spaces) in cases {
            let result = WsvLine::with_layout(values.clone(), spaces.clone(), None);
            assert!(
                matches!(result, Err(Error::InvalidWhitespace { .. })),
                "{:?} {:?}",
                values,
                spaces
            );
        }
    }

    #[test]
    fn test_set_spaces_rejects_extra_runs() {
        let mut line = WsvLine::from_values(["a"]);
        let result = line.set_spaces(strings(&["", " ", "\t\t", "   "]));
        assert_eq!(
            result,
            Err(Error::invalid_whitespace(2, "4 whitespace runs do not fit 1 values"))
        );
        assert!(line.spaces().is_empty());
        assert_eq!(line.to_string(), "a");

        assert!(line.set_space(2, " ").is_err());
        line.set_space(1, "  ").unwrap();
        assert_eq!(line.spaces(), &strings(&["", "  "])[..]);
    }

    #[test]
    fn test_value_count_changes_keep_outer_runs() {
        let mut line = crate::parse_line("  Size 1 2   # c", true).unwrap();
        line.set_values(["Size", "9"]);
        assert_eq!(line.spaces(), &strings(&["  ", " ", "   "])[..]);
        assert_eq!(line.to_string(), "  Size 9   # c");

        line.push_value("x");
        assert_eq!(line.to_string(), "  Size 9 x   # c");
        line.set_null(4);
        assert_eq!(line.to_string(), "  Size 9 x - -   # c");
        assert_eq!(line.spaces().len(), line.len() + 1);

        assert_eq!(line.remove_value(1), Some(Some("9".to_string())));
        assert_eq!(line.to_string(), "  Size x - -   # c");
        assert_eq!(line.remove_value(0), Some(Some("Size".to_string())));
        assert_eq!(line.to_string(), "  x - -   # c");

        line.set_values(Vec::<String>::new());
        assert_eq!(line.spaces(), &strings(&["  "])[..]);
        assert_eq!(line.to_string(), "  # c");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_null_at_max_index_panics() {
        WsvLine::new().set_null(usize::MAX);
    }

    #[test]
    fn test_setters_reject_without_mutation() {
        let mut line = WsvLine::from_values(["a", "b"]);
        line.set_spaces(strings(&["", "  "])).unwrap();
        line.set_comment("keep").unwrap();

        assert!(line.set_spaces(strings(&["", ""])).is_err());
        assert!(line.set_space(1, "x").is_err());
        assert!(line.set_comment("two\nlines").is_err());

        assert_eq!(line.spaces(), &strings(&["", "  "])[..]);
        assert_eq!(line.comment(), Some("keep"));
        assert_eq!(line.to_string(), "a  b#keep");
    }

    #[test]
    fn test_comment_presence_is_distinct_from_empty() {
        let mut line = WsvLine::from_values(["a"]);
        assert!(!line.has_comment());
        line.set_comment("").unwrap();
        assert!(line.has_comment());
        assert_eq!(line.to_string(), "a#");
        line.clear_comment();
        assert_eq!(line.to_string(), "a");
    }

    #[test]
    fn test_null_flags_follow_indices() {
        let mut line = WsvLine::new();
        line.set_null(2);
        assert_eq!(line.len(), 3);
        assert!(line.is_null(0) && line.is_null(1) && line.is_null(2));

        line.set_value(1, "x");
        assert_eq!(line.iter().collect::<Vec<_>>(), vec![None, Some("x"), None]);
        assert_eq!(line.to_string(), "- x -");

        assert_eq!(line.remove_value(0), Some(None));
        assert_eq!(line.iter().collect::<Vec<_>>(), vec![Some("x"), None]);
        assert_eq!(line.remove_value(5), None);
        assert!(!line.is_null(7));
    }

    #[test]
    fn test_set_space_fills_gaps() {
        let mut line = WsvLine::from_values(["a", "b", "c"]);
        line.set_space(2, "\t").unwrap();
        assert_eq!(line.spaces(), &strings(&["", " ", "\t"])[..]);
        assert_eq!(line.to_string(), "a b\tc");
    }

    #[test]
    fn test_builder() {
        let v1 = ["a"];
        let v2 = ["a", "b"];
        let s1 = ["\t\t"];
        let s1e = [""];
        let s2 = ["\t\t", "  "];
        let cases = [
            (LineBuilder::new(), "", ""),
            (LineBuilder::new().values(v1), "a", "a"),
            (LineBuilder::new().values(v2), "a b", "a b"),
            (LineBuilder::new().spaces(s1), "\t\t", ""),
            (LineBuilder::new().values(v1).spaces(s1), "\t\ta", "a"),
            (LineBuilder::new().values(v1).spaces(s2), "\t\ta  ", "a"),
            (LineBuilder::new().comment("c"), "#c", ""),
            (LineBuilder::new().comment("c").spaces(s1e), "#c", ""),
            (LineBuilder::new().comment("c").spaces(s1), "\t\t#c", ""),
            (LineBuilder::new().values(v1).comment("c"), "a#c", "a"),
            (LineBuilder::new().values(v1).spaces(s1e), "a", "a"),
            (
                LineBuilder::new().values(v1).spaces(s2).comment("c"),
                "\t\ta  #c",
                "a",
            ),
            (LineBuilder::new().null(0), "-", "-"),
            (LineBuilder::new().values(v1).null(1), "a -", "a -"),
            (LineBuilder::new().null(0).not_null(0), "\"\"", "\"\""),
        ];
        for (i, (builder, exact, minimal)) in cases.into_iter().enumerate() {
            let line = builder.build().unwrap();
            assert_eq!(line.to_string(), exact, "case {}", i);
            assert_eq!(line.to_minimal_string(), minimal, "case {}", i);
        }
    }

    #[test]
    fn test_builder_keeps_first_error() {
        let err = LineBuilder::new()
            .comment("a\nb")
            .space(1, "")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidComment { .. }));
    }

    #[test]
    fn test_serde_round_trip_revalidates() {
        let line = LineBuilder::new()
            .values(["a b", "c"])
            .null(2)
            .spaces([" ", "\t", " "])
            .comment("x")
            .build()
            .unwrap();
        let json = serde_json::to_string(&line).unwrap();
        assert_eq!(
            json,
            r#"{"values":["a b","c",null],"spaces":[" ","\t"," "],"comment":"x"}"#
        );
        let back: WsvLine = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);

        let bad = r#"{"values":["a"],"spaces":["","x"]}"#;
        assert!(serde_json::from_str::<WsvLine>(bad).is_err());
    }
}
