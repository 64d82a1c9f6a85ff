//! XML/XHTML element tree and the default tag walker.
//!
//! Documents are read once with `quick-xml` into a small owned tree. The
//! extractors never look at bytes; they ask a [`TagWalker`] for the elements
//! of one fact kind and read attributes and text from the tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Child of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its qualified name, attributes and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Qualified name as written, e.g. `ix:nonNumeric`.
    pub name: String,
    /// Attributes in document order, qualified names as written.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Name of the synthetic root returned by [`parse`].
pub const DOCUMENT_ROOT: &str = "#document";

fn local(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

impl Element {
    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local(&self.name)
    }

    /// Attribute by qualified name (`xlink:href`).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute by local name, ignoring any prefix.
    pub fn attr_local(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| local(k) == name)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Direct element children.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// All descendant elements in document order (pre-order), excluding `self`.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack: Vec<&Element> = self.child_elements().collect();
        stack.reverse();
        while let Some(e) = stack.pop() {
            out.push(e);
            let mut children: Vec<&Element> = e.child_elements().collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Descendants with the given local name, in document order.
    pub fn find_all(&self, local_name: &str) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter(|e| e.local_name() == local_name)
            .collect()
    }
}

fn element_from(start: &BytesStart<'_>) -> Element {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let attributes = start
        .attributes()
        .with_checks(false)
        .filter_map(Result::ok)
        .map(|a| {
            let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
            let value = a
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&a.value).into_owned());
            (key, value)
        })
        .collect();
    Element {
        name,
        attributes,
        children: Vec::new(),
    }
}

fn attach(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Parse a document into a tree under a synthetic [`DOCUMENT_ROOT`] element.
///
/// End tags are not required to match, so mildly malformed XHTML still
/// yields a tree. Undecodable entities are kept verbatim.
pub fn parse(xml: &str) -> Result<Element, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = false;

    let mut stack = vec![Element {
        name: DOCUMENT_ROOT.to_string(),
        ..Default::default()
    }];

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(element_from(&start)),
            Event::Empty(start) => attach(&mut stack, Node::Element(element_from(&start))),
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(done) = stack.pop() {
                        attach(&mut stack, Node::Element(done));
                    }
                }
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map(|t| t.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned());
                if !value.is_empty() {
                    attach(&mut stack, Node::Text(value));
                }
            }
            Event::CData(data) => {
                attach(&mut stack, Node::Text(String::from_utf8_lossy(&data).into_owned()))
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // Close anything left open at end of input.
    while stack.len() > 1 {
        if let Some(open) = stack.pop() {
            attach(&mut stack, Node::Element(open));
        }
    }
    Ok(stack.pop().unwrap_or_default())
}

/// Kinds of tagged content a walker can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactKind {
    NonNumeric,
    NonFraction,
    Context,
}

impl FactKind {
    pub fn local_name(&self) -> &'static str {
        match self {
            Self::NonNumeric => "nonNumeric",
            Self::NonFraction => "nonFraction",
            Self::Context => "context",
        }
    }
}

/// Yields the raw tag occurrences of one fact kind, in document order.
pub trait TagWalker: Send + Sync {
    fn walk<'a>(&self, document: &'a Element, kind: FactKind) -> Vec<&'a Element>;
}

/// Walker matching elements by local name, whatever their prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlTagWalker;

impl TagWalker for XmlTagWalker {
    fn walk<'a>(&self, document: &'a Element, kind: FactKind) -> Vec<&'a Element> {
        document.find_all(kind.local_name())
    }
}
