//! Generic attribute/element tree for the roster feeds.
//!
//! The feeds are read into a loose tree instead of typed structs because
//! their shape depends on cardinality: a child tag that occurs once is a
//! single node, the same tag occurring several times becomes a list. Every
//! consumer of a repeatable child goes through [`one_or_many`] (or
//! [`elements`]) so that both shapes read the same way.

use crate::error::{Result, RosterError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

/// One node of the parsed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Element without attributes or child elements; empty elements are `Text("")`.
    Text(String),
    /// Element with attributes and/or child elements.
    Element(XmlElement),
    /// A tag that occurred more than once under the same parent, in document order.
    List(Vec<XmlNode>),
}

impl XmlNode {
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Scalar text of the node. Elements yield their own text content,
    /// lists the text of their first entry.
    pub fn text(&self) -> &str {
        match self {
            XmlNode::Text(s) => s,
            XmlNode::Element(el) => el.text(),
            XmlNode::List(items) => items.first().map(XmlNode::text).unwrap_or(""),
        }
    }

    fn absorb(&mut self, node: XmlNode) {
        match self {
            XmlNode::List(items) => items.push(node),
            other => {
                let first = std::mem::replace(other, XmlNode::List(Vec::with_capacity(2)));
                *other = XmlNode::List(vec![first, node]);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    attributes: Vec<(String, String)>,
    children: Vec<(String, XmlNode)>,
    text: Option<String>,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value, with an empty value treated the same as an absent one.
    pub fn optional_attr(&self, name: &str) -> Option<String> {
        self.attr(name)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub fn require_attr(&self, name: &str) -> Result<String> {
        self.attr(name)
            .map(str::to_string)
            .ok_or_else(|| RosterError::MissingField(format!("@{name}")))
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Child that must be an element. For a repeated tag the first element wins.
    pub fn require_element(&self, name: &str) -> Result<&XmlElement> {
        one_or_many(self.child(name))
            .find_map(XmlNode::as_element)
            .ok_or_else(|| RosterError::MissingField(name.to_string()))
    }

    /// Text of a child that must be present; empty elements give `""`.
    pub fn require_text(&self, name: &str) -> Result<String> {
        self.child(name)
            .map(|node| node.text().to_string())
            .ok_or_else(|| RosterError::MissingField(name.to_string()))
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &XmlNode)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn push_child(&mut self, name: String, node: XmlNode) {
        match self.children.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => existing.absorb(node),
            None => self.children.push((name, node)),
        }
    }

    fn push_text(&mut self, text: &str) {
        self.text.get_or_insert_with(String::new).push_str(text);
    }

    fn into_node(self) -> XmlNode {
        if self.attributes.is_empty() && self.children.is_empty() {
            XmlNode::Text(self.text.unwrap_or_default())
        } else {
            XmlNode::Element(self)
        }
    }
}

/// A parsed feed: the root tag and its node.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    root_name: String,
    root: XmlNode,
}

impl XmlDocument {
    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// The root element, checked against the tag the feed is expected to use.
    pub fn root_element(&self, expected: &str) -> Result<&XmlElement> {
        if self.root_name != expected {
            return Err(RosterError::Document {
                message: format!("expected root <{}>, found <{}>", expected, self.root_name),
            });
        }
        self.root
            .as_element()
            .ok_or_else(|| RosterError::Document {
                message: format!("root <{expected}> has no content"),
            })
    }
}

/// Normalize a repeatable child to a sequence of nodes.
///
/// Absent yields nothing, a single node yields itself, a list yields its
/// entries in document order.
pub fn one_or_many(node: Option<&XmlNode>) -> std::slice::Iter<'_, XmlNode> {
    let entries: &[XmlNode] = match node {
        Some(XmlNode::List(items)) => items,
        Some(single) => std::slice::from_ref(single),
        None => &[],
    };
    entries.iter()
}

/// [`one_or_many`] restricted to element entries. Text-only entries
/// (placeholders such as `<subcommittee/>`) are skipped.
pub fn elements<'a>(
    node: Option<&'a XmlNode>,
    tag: &'a str,
) -> impl Iterator<Item = &'a XmlElement> + 'a {
    one_or_many(node).filter_map(move |entry| {
        let el = entry.as_element();
        if el.is_none() {
            debug!(tag, "skipping non-element entry");
        }
        el
    })
}

/// Parse raw feed bytes into a tree.
pub fn parse_document(bytes: &[u8]) -> Result<XmlDocument> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<(String, XmlElement)> = Vec::new();
    let mut root: Option<(String, XmlNode)> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let (name, element) = open_element(&start)?;
                close_element(&mut stack, &mut root, name, element)?;
            }
            Event::End(_) => {
                let (name, element) = stack.pop().ok_or_else(|| RosterError::Document {
                    message: "unbalanced closing tag".into(),
                })?;
                close_element(&mut stack, &mut root, name, element)?;
            }
            Event::Text(text) => {
                if let Some((_, element)) = stack.last_mut() {
                    element.push_text(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some((_, element)) = stack.last_mut() {
                    element.push_text(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype
            _ => {}
        }
        buf.clear();
    }

    if let Some((name, _)) = stack.last() {
        return Err(RosterError::Document {
            message: format!("unclosed element <{name}>"),
        });
    }

    let (root_name, root) = root.ok_or_else(|| RosterError::Document {
        message: "document has no root element".into(),
    })?;
    Ok(XmlDocument { root_name, root })
}

fn open_element(start: &BytesStart<'_>) -> Result<(String, XmlElement)> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = XmlElement::default();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok((name, element))
}

fn close_element(
    stack: &mut [(String, XmlElement)],
    root: &mut Option<(String, XmlNode)>,
    name: String,
    element: XmlElement,
) -> Result<()> {
    let node = element.into_node();
    match stack.last_mut() {
        Some((_, parent)) => parent.push_child(name, node),
        None if root.is_none() => *root = Some((name, node)),
        None => {
            return Err(RosterError::Document {
                message: format!("second root element <{name}>"),
            })
        }
    }
    Ok(())
}
