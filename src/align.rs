//! Column alignment of SML attribute rows.
//!
//! [`SmlDocument::align_attributes`] rewrites the whitespace of every attribute
//! directly below one element so that, in a monospace font, the name and each
//! data value start in the same column on every row. Right-aligned columns end
//! in the same column instead. Widths are counted in code points of the
//! serialized token, so quoting and multi-byte scripts are accounted for.
//!
//! ## Examples
//!
//! ```rust
//! use wsv_sml::{AlignOptions, ParseOptions, SmlDocument};
//!
//! let text = "Points\n  A 1 2\n  Long 10 \"x y\"\n  B 100 -\nend";
//! let mut doc = SmlDocument::from_str(text, &ParseOptions::new()).unwrap();
//! let points = doc.element(doc.root(), "points").unwrap();
//!
//! let options = AlignOptions::new().with_right_aligned(vec![false, true]);
//! doc.align_attributes(points, &options).unwrap();
//! assert_eq!(
//!     doc.to_string(),
//!     "Points\n  A      1 2\n  Long  10 \"x y\"\n  B    100 -\nend"
//! );
//! ```

use crate::options::AlignOptions;
use crate::ser::serialized_width;
use crate::sml::{NodeId, SmlDocument, SmlKind, SmlNode};
use crate::whitespace::validate_space;
use crate::{Error, Result};
use tracing::trace;

/// One attribute row: its id, token widths and the runs kept from the original line.
struct Row {
    id: NodeId,
    widths: Vec<usize>,
    leading: String,
    trailing: Option<String>,
}

impl Row {
    fn new(id: NodeId, node: &SmlNode) -> Option<Row> {
        let line = node.line()?;
        Some(Row {
            id,
            widths: line.iter().map(serialized_width).collect(),
            leading: line.spaces().first().cloned().unwrap_or_default(),
            trailing: line.spaces().get(line.len()).cloned(),
        })
    }
}

impl SmlDocument {
    /// Aligns the attribute children of `id` into columns.
    ///
    /// Every row keeps its leading run (indentation) and its trailing run
    /// (the gap before a comment). Between tokens the row gets
    /// `options.separator`, widened by the padding of left-aligned columns.
    /// The padding of a right-aligned column goes into the run before its
    /// token. Rows without a token in a column are left alone for that column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWhitespace`] if the separator is not a non-empty
    /// whitespace run and [`Error::WrongKind`] if `id` is not an element or the
    /// root. Nothing is modified on error.
    pub fn align_attributes(&mut self, id: NodeId, options: &AlignOptions) -> Result<()> {
        validate_space(&options.separator, 1)?;
        match self.kind(id)? {
            SmlKind::Root | SmlKind::Element => {}
            other => return Err(Error::wrong_kind("element", &other.to_string())),
        }

        let rows: Vec<Row> = self
            .each(id)
            .filter(|(_, node)| node.kind() == SmlKind::Attribute)
            .filter_map(|(child, node)| Row::new(child, node))
            .collect();
        let longest = rows.iter().map(|row| row.widths.len()).max().unwrap_or(0);
        let columns = options.min_columns.max(longest);

        let max_widths: Vec<usize> = (0..columns)
            .map(|column| {
                let width = rows
                    .iter()
                    .filter_map(|row| row.widths.get(column).copied())
                    .max()
                    .unwrap_or(0);
                trace!(
                    column,
                    width,
                    right_aligned = options.is_right_aligned(column),
                    "aligning attribute column"
                );
                width
            })
            .collect();

        for row in rows {
            let spaces = row_spaces(&row, &max_widths, options);
            self.attribute_line_mut(row.id)?.set_spaces(spaces)?;
        }
        Ok(())
    }
}

/// Computes the whitespace runs of one row.
fn row_spaces(row: &Row, max_widths: &[usize], options: &AlignOptions) -> Vec<String> {
    let count = row.widths.len();
    let mut spaces = Vec::with_capacity(count + 1);
    spaces.push(row.leading.clone());
    for (column, &width) in row.widths.iter().enumerate() {
        let fill = " ".repeat(max_widths[column].saturating_sub(width));
        let right = options.is_right_aligned(column);
        if right {
            if let Some(before) = spaces.last_mut() {
                before.push_str(&fill);
            }
        }
        if column + 1 < count {
            let mut gap = if right { String::new() } else { fill };
            gap.push_str(&options.separator);
            spaces.push(gap);
        }
    }
    if let Some(trailing) = &row.trailing {
        spaces.push(trailing.clone());
    }
    spaces
}
