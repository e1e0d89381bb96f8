//! SML trees built from WSV lines.
//!
//! An SML document is a sequence of WSV lines read as a tree:
//!
//! - one value other than `end` opens an **element** of that name
//! - one value equal to `end` (any case) closes the nearest open element
//! - two or more values form an **attribute**: a name and its data values
//! - no values at all (blank or comment-only lines) form an **empty** node
//!
//! The top level is the child list of an implicit root.
//!
//! ## Arena
//!
//! All nodes live in one [`SmlDocument`] and refer to their children by
//! [`NodeId`]. Ids stay valid while more nodes are added, so the parser keeps
//! its open elements as a stack of ids, and callers can hold on to ids while
//! they build.
//!
//! ## Examples
//!
//! ```rust
//! use wsv_sml::{ParseOptions, SmlDocument};
//!
//! let text = "Config\n  # servers\n  Server\n    Host  example.org\n    Port  8080\n  End\nend";
//! let doc = SmlDocument::from_str(text, &ParseOptions::new()).unwrap();
//!
//! let config = doc.filter_elements(doc.root(), "config")[0];
//! let server = doc.element(config, "SERVER").unwrap();
//! let port = doc.attribute(server, "port").unwrap();
//! assert_eq!(doc.values(port), vec![Some("8080")]);
//! assert_eq!(doc.depth(doc.root()), 2);
//!
//! // Comments, indentation and the spelling of `End` survive the round trip
//! assert_eq!(doc.to_string(), text);
//! ```
//!
//! Building a tree:
//!
//! ```rust
//! use wsv_sml::SmlDocument;
//!
//! let mut doc = SmlDocument::new();
//! let root = doc.root();
//! let point = doc.add_element(root, "Point").unwrap();
//! doc.add_attribute(point, "X", ["1.5"]).unwrap();
//! let label = doc.add_attribute(point, "Label", ["a b", ""]).unwrap();
//! doc.set_null(label, 1).unwrap();
//! assert_eq!(doc.to_string(), "Point\nX 1.5\nLabel \"a b\" -\nend");
//! ```

use crate::document::parse_lines;
use crate::error::{ParseResult, PartialParse};
use crate::line::WsvLine;
use crate::options::ParseOptions;
use crate::rtxt::{self, Encoding, LineReader};
use crate::whitespace::names_match;
use crate::{Error, Result};
use std::fmt;
use std::io::{Read, Write};
use tracing::debug;

/// The value that closes an element.
pub const END_KEYWORD: &str = "end";

/// Stable index of a node inside its [`SmlDocument`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

const ROOT: NodeId = NodeId(0);

/// The four kinds of SML node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SmlKind {
    Root,
    Element,
    Attribute,
    Empty,
}

impl fmt::Display for SmlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SmlKind::Root => "root",
            SmlKind::Element => "element",
            SmlKind::Attribute => "attribute",
            SmlKind::Empty => "empty",
        };
        f.write_str(name)
    }
}

/// A node of an SML tree. Only the root and elements own children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SmlNode {
    /// The implicit top level; has no lines of its own.
    Root { children: Vec<NodeId> },
    /// A start line holding the name, children, and an end line holding `end`.
    Element {
        start: WsvLine,
        end: WsvLine,
        children: Vec<NodeId>,
    },
    /// A line with a name and one or more data values.
    Attribute { line: WsvLine },
    /// A line without values, possibly carrying whitespace and a comment.
    Empty { line: WsvLine },
}

impl SmlNode {
    #[must_use]
    pub fn kind(&self) -> SmlKind {
        match self {
            SmlNode::Root { .. } => SmlKind::Root,
            SmlNode::Element { .. } => SmlKind::Element,
            SmlNode::Attribute { .. } => SmlKind::Attribute,
            SmlNode::Empty { .. } => SmlKind::Empty,
        }
    }

    /// Returns the element or attribute name; `None` for other kinds or a null name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            SmlNode::Element { start: line, .. } | SmlNode::Attribute { line } => line.value(0),
            _ => None,
        }
    }

    /// Returns the node's own line (the start line for elements).
    #[must_use]
    pub fn line(&self) -> Option<&WsvLine> {
        match self {
            SmlNode::Root { .. } => None,
            SmlNode::Element { start: line, .. }
            | SmlNode::Attribute { line }
            | SmlNode::Empty { line } => Some(line),
        }
    }

    #[must_use]
    pub fn end_line(&self) -> Option<&WsvLine> {
        match self {
            SmlNode::Element { end, .. } => Some(end),
            _ => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        match self {
            SmlNode::Root { children } | SmlNode::Element { children, .. } => children,
            _ => &[],
        }
    }
}

fn default_end_line() -> WsvLine {
    WsvLine::from_values([END_KEYWORD])
}

/// An SML tree held in an arena. Node 0 is the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmlDocument {
    nodes: Vec<SmlNode>,
}

impl Default for SmlDocument {
    fn default() -> Self {
        SmlDocument {
            nodes: vec![SmlNode::Root {
                children: Vec::new(),
            }],
        }
    }
}

impl SmlDocument {
    /// Creates a document holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// # Errors
    ///
    /// Returns [`Error::NoSuchNode`] if `id` does not belong to this document.
    pub fn node(&self, id: NodeId) -> Result<&SmlNode> {
        self.nodes.get(id.0).ok_or(Error::NoSuchNode(id.0))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SmlNode> {
        self.nodes.get_mut(id.0).ok_or(Error::NoSuchNode(id.0))
    }

    /// # Errors
    ///
    /// Returns [`Error::NoSuchNode`] if `id` does not belong to this document.
    pub fn kind(&self, id: NodeId) -> Result<SmlKind> {
        self.node(id).map(SmlNode::kind)
    }

    #[must_use]
    pub fn is_root(&self, id: NodeId) -> bool {
        self.kind(id) == Ok(SmlKind::Root)
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.kind(id) == Ok(SmlKind::Element)
    }

    #[must_use]
    pub fn is_attribute(&self, id: NodeId) -> bool {
        self.kind(id) == Ok(SmlKind::Attribute)
    }

    #[must_use]
    pub fn is_empty(&self, id: NodeId) -> bool {
        self.kind(id) == Ok(SmlKind::Empty)
    }

    /// Returns the direct children of `id`; empty for leaves and unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(SmlNode::children)
            .unwrap_or(&[])
    }

    /// Iterates the direct children of `id` together with their nodes.
    pub fn each(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &SmlNode)> + '_ {
        self.children(id)
            .iter()
            .filter_map(move |&child| self.nodes.get(child.0).map(|node| (child, node)))
    }

    /// Iterates every node below `id` in document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Returns the direct children of `id` accepted by `predicate`.
    pub fn filter<P>(&self, id: NodeId, mut predicate: P) -> Vec<NodeId>
    where
        P: FnMut(NodeId, &SmlNode) -> bool,
    {
        self.each(id)
            .filter(|&(child, node)| predicate(child, node))
            .map(|(child, _)| child)
            .collect()
    }

    /// Returns the direct child elements of `id` named `name`, ignoring case.
    #[must_use]
    pub fn filter_elements(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.filter(id, |_, node| matches_named(node, SmlKind::Element, name))
    }

    /// Returns the direct child attributes of `id` named `name`, ignoring case.
    #[must_use]
    pub fn filter_attributes(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.filter(id, |_, node| matches_named(node, SmlKind::Attribute, name))
    }

    /// Returns the first direct child element named `name`.
    #[must_use]
    pub fn element(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.each(id)
            .find(|(_, node)| matches_named(node, SmlKind::Element, name))
            .map(|(child, _)| child)
    }

    /// Returns the first direct child attribute named `name`.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.each(id)
            .find(|(_, node)| matches_named(node, SmlKind::Attribute, name))
            .map(|(child, _)| child)
    }

    /// Number of nested element levels at and below `id`.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(id, 0)];
        while let Some((node, above)) = stack.pop() {
            let level = if self.is_element(node) { above + 1 } else { above };
            deepest = deepest.max(level);
            stack.extend(self.children(node).iter().map(|&child| (child, level)));
        }
        deepest
    }

    /// Returns the element or attribute name of `id`.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).and_then(SmlNode::name)
    }

    /// Renames an element or attribute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedName`] if an element would be named `end`, and
    /// [`Error::WrongKind`] for the root and empty nodes.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        match self.node_mut(id)? {
            SmlNode::Element { start, .. } => {
                if names_match(&name, END_KEYWORD) {
                    return Err(Error::ReservedName { name });
                }
                start.set_value(0, name);
            }
            SmlNode::Attribute { line } => line.set_value(0, name),
            other => {
                return Err(Error::wrong_kind(
                    "element or attribute",
                    &other.kind().to_string(),
                ))
            }
        }
        Ok(())
    }

    /// Returns the data values of an attribute (the name excluded), `None` for nulls.
    /// Other kinds have no data values.
    #[must_use]
    pub fn values(&self, id: NodeId) -> Vec<Option<&str>> {
        match self.nodes.get(id.0) {
            Some(SmlNode::Attribute { line }) => line.iter().skip(1).collect(),
            _ => Vec::new(),
        }
    }

    /// Replaces the data values of an attribute, keeping its name and comment.
    /// The leading run and the run before the comment are kept; gaps follow
    /// the new value count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongKind`] if `id` is not an attribute and
    /// [`Error::InvalidAttribute`] if `values` is empty.
    pub fn set_values<I, S>(&mut self, id: NodeId, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let line = self.attribute_line_mut(id)?;
        if values.is_empty() {
            return Err(Error::InvalidAttribute {
                name: line.value(0).unwrap_or("-").to_string(),
            });
        }
        let name_null = line.is_null(0);
        let name = line.values().first().cloned().unwrap_or_default();
        line.set_values(std::iter::once(name).chain(values));
        if name_null {
            line.set_null(0);
        }
        Ok(())
    }

    /// Returns whether data value `index` of an attribute is null.
    #[must_use]
    pub fn is_null(&self, id: NodeId, index: usize) -> bool {
        match (self.nodes.get(id.0), data_slot(index)) {
            (Some(SmlNode::Attribute { line }), Ok(slot)) => line.is_null(slot),
            _ => false,
        }
    }

    /// Marks data value `index` of an attribute as null, growing it with nulls if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongKind`] if `id` is not an attribute and
    /// [`Error::Custom`] for an index no line can hold.
    pub fn set_null(&mut self, id: NodeId, index: usize) -> Result<()> {
        let line = self.attribute_line_mut(id)?;
        line.set_null(data_slot(index).and_then(grown_slot)?);
        Ok(())
    }

    /// Clears the null flag of data value `index` of an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WrongKind`] if `id` is not an attribute and
    /// [`Error::Custom`] for an index no line can hold.
    pub fn unset_null(&mut self, id: NodeId, index: usize) -> Result<()> {
        let line = self.attribute_line_mut(id)?;
        line.unset_null(data_slot(index)?);
        Ok(())
    }

    /// Returns the node's own line (the start line for elements).
    #[must_use]
    pub fn line(&self, id: NodeId) -> Option<&WsvLine> {
        self.nodes.get(id.0).and_then(SmlNode::line)
    }

    /// Returns the end line of an element.
    #[must_use]
    pub fn end_line(&self, id: NodeId) -> Option<&WsvLine> {
        self.nodes.get(id.0).and_then(SmlNode::end_line)
    }

    fn line_mut(&mut self, id: NodeId) -> Result<&mut WsvLine> {
        match self.node_mut(id)? {
            SmlNode::Root { .. } => Err(Error::wrong_kind("element, attribute or empty", "root")),
            SmlNode::Element { start: line, .. }
            | SmlNode::Attribute { line }
            | SmlNode::Empty { line } => Ok(line),
        }
    }

    pub(crate) fn end_line_mut(&mut self, id: NodeId) -> Result<&mut WsvLine> {
        match self.node_mut(id)? {
            SmlNode::Element { end, .. } => Ok(end),
            other => Err(Error::wrong_kind("element", &other.kind().to_string())),
        }
    }

    pub(crate) fn attribute_line_mut(&mut self, id: NodeId) -> Result<&mut WsvLine> {
        match self.node_mut(id)? {
            SmlNode::Attribute { line } => Ok(line),
            other => Err(Error::wrong_kind("attribute", &other.kind().to_string())),
        }
    }

    /// Returns the comment of the node's own line.
    #[must_use]
    pub fn comment(&self, id: NodeId) -> Option<&str> {
        self.line(id).and_then(WsvLine::comment)
    }

    /// Sets the comment of the node's own line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidComment`] for text with a line feed and
    /// [`Error::WrongKind`] for the root.
    pub fn set_comment(&mut self, id: NodeId, comment: impl Into<String>) -> Result<()> {
        self.line_mut(id)?.set_comment(comment)
    }

    /// Returns the comment of an element's end line.
    #[must_use]
    pub fn end_comment(&self, id: NodeId) -> Option<&str> {
        self.end_line(id).and_then(WsvLine::comment)
    }

    /// Sets the comment of an element's end line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidComment`] for text with a line feed and
    /// [`Error::WrongKind`] if `id` is not an element.
    pub fn set_end_comment(&mut self, id: NodeId, comment: impl Into<String>) -> Result<()> {
        self.end_line_mut(id)?.set_comment(comment)
    }

    /// Returns the whitespace runs of the node's own line.
    #[must_use]
    pub fn spaces(&self, id: NodeId) -> &[String] {
        self.line(id).map(WsvLine::spaces).unwrap_or(&[])
    }

    /// Replaces the whitespace runs of the node's own line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWhitespace`] for a bad run and [`Error::WrongKind`]
    /// for the root.
    pub fn set_spaces(&mut self, id: NodeId, spaces: Vec<String>) -> Result<()> {
        self.line_mut(id)?.set_spaces(spaces)
    }

    /// Returns the whitespace runs of an element's end line.
    #[must_use]
    pub fn end_spaces(&self, id: NodeId) -> &[String] {
        self.end_line(id).map(WsvLine::spaces).unwrap_or(&[])
    }

    /// Replaces the whitespace runs of an element's end line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWhitespace`] for a bad run and [`Error::WrongKind`]
    /// if `id` is not an element.
    pub fn set_end_spaces(&mut self, id: NodeId, spaces: Vec<String>) -> Result<()> {
        self.end_line_mut(id)?.set_spaces(spaces)
    }

    fn attach(&mut self, parent: NodeId, node: SmlNode) -> Result<NodeId> {
        let id = NodeId(self.nodes.len());
        match self.node_mut(parent)? {
            SmlNode::Root { children } | SmlNode::Element { children, .. } => children.push(id),
            other => {
                return Err(Error::NotAContainer {
                    kind: other.kind().to_string(),
                })
            }
        }
        self.nodes.push(node);
        Ok(id)
    }

    /// Appends a new element to `parent` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedName`] for the name `end` (any case) and
    /// [`Error::NotAContainer`] if `parent` is an attribute or empty node.
    pub fn add_element(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        let name = name.into();
        if names_match(&name, END_KEYWORD) {
            return Err(Error::ReservedName { name });
        }
        self.attach(
            parent,
            SmlNode::Element {
                start: WsvLine::from_values([name]),
                end: default_end_line(),
                children: Vec::new(),
            },
        )
    }

    /// Appends a new attribute to `parent` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAttribute`] if `values` is empty and
    /// [`Error::NotAContainer`] if `parent` is an attribute or empty node.
    pub fn add_attribute<I, S>(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        values: I,
    ) -> Result<NodeId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(Error::InvalidAttribute { name });
        }
        let line = WsvLine::from_values(std::iter::once(name).chain(values));
        self.attach(parent, SmlNode::Attribute { line })
    }

    /// Appends an empty node to `parent` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAContainer`] if `parent` is an attribute or empty node.
    pub fn add_empty(&mut self, parent: NodeId) -> Result<NodeId> {
        self.attach(
            parent,
            SmlNode::Empty {
                line: WsvLine::new(),
            },
        )
    }

    /// Builds a tree from a sequence of decoded lines.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wsv_sml::{Error, ParseOptions, SmlDocument};
    ///
    /// let failure = SmlDocument::from_str("A\nB\nend", &ParseOptions::new()).unwrap_err();
    /// assert_eq!(failure.error, Error::MissingEndTag { names: vec!["A".to_string()] });
    /// assert_eq!(failure.partial.to_string(), "A\nB\nend\nend");
    ///
    /// let failure = SmlDocument::from_str("A\nend\nend", &ParseOptions::new()).unwrap_err();
    /// assert_eq!(failure.error, Error::UnmatchedEndTag { line: 3 });
    /// ```
    ///
    /// # Errors
    ///
    /// Stops at the first decoding, tokenizer or nesting error and returns the
    /// tree built so far together with the error. Elements still open in the
    /// partial tree carry a default `end` line.
    pub fn parse<I, S>(lines: I, options: &ParseOptions) -> ParseResult<Self>
    where
        I: IntoIterator<Item = Result<S>>,
        S: AsRef<str>,
    {
        debug!(
            start_line = options.start_line,
            preserve_layout = options.preserve_layout,
            "parsing SML document"
        );
        let mut doc = SmlDocument::new();
        let mut open = vec![ROOT];
        let result = parse_lines(lines, options, |line, number| {
            doc.push_line(&mut open, line, number)
        })
        .and_then(|_| doc.check_closed(&open));
        match result {
            Ok(()) => {
                debug!(nodes = doc.node_count(), "parsed SML document");
                Ok(doc)
            }
            Err(error) => {
                debug!(%error, nodes = doc.node_count(), "SML document parse stopped");
                Err(PartialParse::new(doc, error))
            }
        }
    }

    fn push_line(&mut self, open: &mut Vec<NodeId>, line: WsvLine, number: usize) -> Result<()> {
        let parent = open.last().copied().unwrap_or(ROOT);
        match line.len() {
            0 => {
                self.attach(parent, SmlNode::Empty { line })?;
            }
            1 if line.value(0).is_some_and(|v| names_match(v, END_KEYWORD)) => {
                if open.len() < 2 {
                    return Err(Error::UnmatchedEndTag { line: number });
                }
                if let Some(closed) = open.pop() {
                    *self.end_line_mut(closed)? = line;
                }
            }
            1 => {
                let id = self.attach(
                    parent,
                    SmlNode::Element {
                        start: line,
                        end: default_end_line(),
                        children: Vec::new(),
                    },
                )?;
                open.push(id);
            }
            _ => {
                self.attach(parent, SmlNode::Attribute { line })?;
            }
        }
        Ok(())
    }

    fn check_closed(&self, open: &[NodeId]) -> Result<()> {
        if open.len() < 2 {
            return Ok(());
        }
        let names = open[1..]
            .iter()
            .map(|&id| self.name(id).unwrap_or("-").to_string())
            .collect();
        Err(Error::MissingEndTag { names })
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

    /// Returns the lines `id` serializes to, in order.
    #[must_use]
    pub fn node_lines(&self, id: NodeId) -> Vec<&WsvLine> {
        let mut out = Vec::new();
        self.collect_lines(id, &mut out);
        out
    }

    fn collect_lines<'a>(&'a self, id: NodeId, out: &mut Vec<&'a WsvLine>) {
        let mut stack = vec![Visit::Node(id)];
        while let Some(visit) = stack.pop() {
            let id = match visit {
                Visit::End(line) => {
                    out.push(line);
                    continue;
                }
                Visit::Node(id) => id,
            };
            match self.nodes.get(id.0) {
                Some(SmlNode::Root { children }) => {
                    stack.extend(children.iter().rev().map(|&child| Visit::Node(child)));
                }
                Some(SmlNode::Element {
                    start,
                    end,
                    children,
                }) => {
                    out.push(start);
                    stack.push(Visit::End(end));
                    stack.extend(children.iter().rev().map(|&child| Visit::Node(child)));
                }
                Some(SmlNode::Attribute { line } | SmlNode::Empty { line }) => out.push(line),
                None => {}
            }
        }
    }

    /// Renders the subtree at `id`, one line per row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchNode`] if `id` does not belong to this document.
    pub fn node_to_string(&self, id: NodeId) -> Result<String> {
        self.node(id)?;
        let lines: Vec<String> = self
            .node_lines(id)
            .into_iter()
            .map(ToString::to_string)
            .collect();
        Ok(rtxt::join(&lines))
    }

    /// Returns the exact rendering of every line of the document.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        self.node_lines(ROOT)
            .into_iter()
            .map(ToString::to_string)
            .collect()
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
}

/// Pending work while flattening a subtree into lines.
enum Visit<'a> {
    Node(NodeId),
    End(&'a WsvLine),
}

/// Maps a data value index to its position on the attribute line, after the name.
fn data_slot(index: usize) -> Result<usize> {
    index
        .checked_add(1)
        .ok_or_else(|| Error::Custom(format!("data value index {} is out of range", index)))
}

/// Rejects a line position that cannot be grown to.
fn grown_slot(slot: usize) -> Result<usize> {
    if slot == usize::MAX {
        return Err(Error::Custom(format!("data value index {} is out of range", slot - 1)));
    }
    Ok(slot)
}

fn matches_named(node: &SmlNode, kind: SmlKind, name: &str) -> bool {
    node.kind() == kind && node.name().is_some_and(|n| names_match(n, name))
}

impl fmt::Display for SmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for (index, line) in self.node_lines(ROOT).into_iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            crate::ser::write_line(&mut out, line);
        }
        f.write_str(&out)
    }
}

impl std::str::FromStr for SmlDocument {
    type Err = Error;

    /// Parses with default options, discarding the partial result on error.
    fn from_str(s: &str) -> Result<Self> {
        Ok(SmlDocument::from_str(s, &ParseOptions::new())?)
    }
}

/// Depth-first iterator over the nodes below a starting node.
pub struct Descendants<'a> {
    doc: &'a SmlDocument,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> SmlDocument {
        SmlDocument::from_str(text, &ParseOptions::new()).unwrap()
    }

    #[test]
    fn test_dispatch_by_value_count() {
        let doc = parse("Root\n\n  Attr 1 2\n  # note\n  Child\n  END\nEnd");
        let root = doc.children(doc.root());
        assert_eq!(root.len(), 1);
        let kinds: Vec<SmlKind> = doc
            .each(root[0])
            .map(|(_, node)| node.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                SmlKind::Empty,
                SmlKind::Attribute,
                SmlKind::Empty,
                SmlKind::Element
            ]
        );
        assert_eq!(doc.comment(doc.children(root[0])[2]), Some(" note"));
        assert_eq!(doc.end_line(root[0]).map(|l| l.to_string()), Some("End".to_string()));
    }

    #[test]
    fn test_exact_round_trip() {
        let corpus = [
            "",
            "Root\nend",
            "\tRoot  # start\n\t\tName \"My Doc\"  -\n\t\t\n\tEnd # stop",
            "# header only",
            "A\n  B\n    C\n      x 1\n    end\n  end\nend\n",
            "Top\n  Value \"\" \"-\" \"a\"/\"b\"\nEND",
        ];
        for text in corpus {
            assert_eq!(parse(text).to_string(), text, "{:?}", text);
        }
    }

    #[test]
    fn test_filters_are_shallow_and_case_insensitive() {
        let doc = parse("Root\n  Item 1\n  item 2\n  Item\n    Item 3\n  end\n  Other 4\nend");
        let root = doc.children(doc.root())[0];
        let attributes = doc.filter_attributes(root, "ITEM");
        assert_eq!(attributes.len(), 2);
        assert_eq!(doc.values(attributes[1]), vec![Some("2")]);
        let elements = doc.filter_elements(root, "item");
        assert_eq!(elements.len(), 1);
        assert_eq!(doc.filter_attributes(elements[0], "item").len(), 1);
        assert!(doc.filter_elements(root, "Other").is_empty());

        let all = doc.filter(root, |_, node| node.kind() == SmlKind::Attribute);
        assert_eq!(all.len(), 3);
        assert_eq!(doc.descendants(doc.root()).count(), doc.node_count() - 1);
    }

    #[test]
    fn test_nesting_errors() {
        let failure = SmlDocument::from_str("end", &ParseOptions::new()).unwrap_err();
        assert_eq!(failure.error, Error::UnmatchedEndTag { line: 1 });
        assert_eq!(failure.partial.node_count(), 1);

        let failure =
            SmlDocument::from_str("Outer\n  Inner\n    a b", &ParseOptions::new()).unwrap_err();
        assert_eq!(
            failure.error,
            Error::MissingEndTag {
                names: vec!["Outer".to_string(), "Inner".to_string()]
            }
        );
        assert_eq!(failure.partial.depth(failure.partial.root()), 2);

        let options = ParseOptions::new().with_start_line(1);
        let failure = SmlDocument::from_str("skipped\nA\nend\nend", &options).unwrap_err();
        assert_eq!(failure.error, Error::UnmatchedEndTag { line: 4 });

        let failure = SmlDocument::from_str("A\n  b \"c", &ParseOptions::new()).unwrap_err();
        assert_eq!(failure.error, Error::UnterminatedQuote { line: 2, col: 5 });
        assert_eq!(failure.partial.filter_elements(failure.partial.root(), "a").len(), 1);
    }

    #[test]
    fn test_builder_validation() {
        let mut doc = SmlDocument::new();
        let root = doc.root();
        assert!(matches!(
            doc.add_element(root, "End"),
            Err(Error::ReservedName { .. })
        ));
        assert!(matches!(
            doc.add_attribute(root, "name", Vec::<String>::new()),
            Err(Error::InvalidAttribute { .. })
        ));
        let attribute = doc.add_attribute(root, "name", ["v"]).unwrap();
        assert_eq!(
            doc.add_empty(attribute),
            Err(Error::NotAContainer {
                kind: "attribute".to_string()
            })
        );
        let empty = doc.add_empty(root).unwrap();
        assert!(doc.add_element(empty, "x").is_err());
        assert_eq!(doc.add_empty(NodeId(99)), Err(Error::NoSuchNode(99)));
        // Failed adds leave no orphan nodes behind.
        assert_eq!(doc.node_count(), 3);
    }

    #[test]
    fn test_accessors_and_setters() {
        let mut doc = parse("Item # c\n  Size 1 2\nend");
        let item = doc.children(doc.root())[0];
        let size = doc.children(item)[0];

        doc.set_name(item, "Thing").unwrap();
        assert!(doc.set_name(item, "END").is_err());
        doc.set_values(size, ["3", "4", "5"]).unwrap();
        doc.set_null(size, 1).unwrap();
        assert!(doc.is_null(size, 1));
        assert!(doc.set_values(size, Vec::<String>::new()).is_err());
        assert!(doc.set_null(item, 0).is_err());

        doc.set_end_comment(item, " done").unwrap();
        doc.set_end_spaces(item, vec!["".to_string(), " ".to_string()]).unwrap();
        assert!(doc.set_comment(doc.root(), "x").is_err());
        assert!(doc.set_spaces(size, vec!["x".to_string()]).is_err());

        assert_eq!(doc.to_string(), "Thing # c\n  Size 3 - 5\nend # done");
        assert_eq!(doc.spaces(size), &["  ", " ", " ", " "]);
        assert_eq!(doc.end_comment(item), Some(" done"));

        doc.unset_null(size, 1).unwrap();
        assert_eq!(doc.values(size), vec![Some("3"), Some("4"), Some("5")]);
    }

    #[test]
    fn test_set_values_keeps_gap_before_comment() {
        let mut doc = parse("Item\n  Size 1 2   # c\nend");
        let item = doc.children(doc.root())[0];
        let size = doc.children(item)[0];
        doc.set_values(size, ["9"]).unwrap();
        assert_eq!(doc.spaces(size), &["  ", " ", "   "]);
        assert_eq!(doc.to_string(), "Item\n  Size 9   # c\nend");

        doc.set_values(size, ["9", "8", "7"]).unwrap();
        assert_eq!(doc.to_string(), "Item\n  Size 9 8 7   # c\nend");
        assert!(doc
            .set_spaces(size, vec!["  ".to_string(), " ".to_string()])
            .is_err());
    }

    #[test]
    fn test_null_index_at_limit_is_an_error() {
        let mut doc = parse("Size 1 2");
        let size = doc.children(doc.root())[0];
        assert!(!doc.is_null(size, usize::MAX));
        assert!(matches!(doc.set_null(size, usize::MAX), Err(Error::Custom(_))));
        assert!(matches!(doc.set_null(size, usize::MAX - 1), Err(Error::Custom(_))));
        assert!(matches!(doc.unset_null(size, usize::MAX), Err(Error::Custom(_))));
        assert_eq!(doc.values(size), vec![Some("1"), Some("2")]);
    }

    #[test]
    fn test_minimal_parse_drops_layout() {
        let doc =
            SmlDocument::from_str("  A  # x\n    b   1\n  end", &ParseOptions::minimal()).unwrap();
        assert_eq!(doc.to_string(), "A#\nb 1\nend");
    }

    #[test]
    fn test_node_to_string() {
        let doc = parse("A\n  B\n    c 1\n  end\nend");
        let b = doc.children(doc.children(doc.root())[0])[0];
        assert_eq!(doc.node_to_string(b).unwrap(), "  B\n    c 1\n  end");
        assert_eq!(doc.node_to_string(NodeId(42)), Err(Error::NoSuchNode(42)));
    }
}
