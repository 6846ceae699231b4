//! This module defines the read-only tree of a parsed BPEL process document
//! and the generic node accessors that every query in this crate is built on.

mod parse;

pub use parse::parse_bpel;

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Error;

/// An ID for a node in the document tree
/// This is a newtype around `usize` to ensure that node IDs can't accidentally be mixed up with other indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

/// A single node of the tree: an element or a run of character data
#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        parent: Option<NodeId>,
        children: Vec<NodeId>,
    },
    Text {
        content: String,
        parent: NodeId,
    },
}

/// A parsed BPEL process document.
/// All nodes live in one flat arena, appended in document order; the tree
/// structure is expressed through parent and child IDs. The document is
/// never mutated after parsing, so queries may run concurrently against it.
#[derive(Debug, Clone)]
pub struct BpelDocument {
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: NodeId,
}

impl BpelDocument {
    /// The root element of the document
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            doc: self,
            id: self.root,
        }
    }

    /// Look up a node by its ID. The ID must have been handed out by this
    /// document; IDs from other documents index into the wrong arena.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { doc: self, id }
    }
}

/// Parse a document from a string of BPEL XML
impl FromStr for BpelDocument {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_bpel(s.as_bytes())
    }
}

/// Display a document as XML
impl Display for BpelDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut writer = Writer::new(Vec::new());
        self.write_node(self.root, &mut writer)?;
        f.write_str(&String::from_utf8_lossy(&writer.into_inner()))
    }
}

impl BpelDocument {
    /// Write a node and its subtree as XML events
    fn write_node(&self, id: NodeId, writer: &mut Writer<Vec<u8>>) -> FmtResult {
        match &self.nodes[id.0] {
            NodeData::Text { content, .. } => writer
                .write_event(Event::Text(BytesText::new(content)))
                .map_err(|_| std::fmt::Error),
            NodeData::Element {
                name,
                attributes,
                children,
                ..
            } => {
                let start = BytesStart::new(name.as_str())
                    .with_attributes(attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                if children.is_empty() {
                    writer
                        .write_event(Event::Empty(start))
                        .map_err(|_| std::fmt::Error)
                } else {
                    writer
                        .write_event(Event::Start(start))
                        .map_err(|_| std::fmt::Error)?;
                    for child in children {
                        self.write_node(*child, writer)?;
                    }
                    writer
                        .write_event(Event::End(BytesEnd::new(name.as_str())))
                        .map_err(|_| std::fmt::Error)
                }
            }
        }
    }
}

/// A borrowed handle to a single node of a document.
/// Handles are cheap to copy and only valid as long as the document they
/// point into.
#[derive(Clone, Copy)]
pub struct NodeRef<'doc> {
    doc: &'doc BpelDocument,
    id: NodeId,
}

impl<'doc> NodeRef<'doc> {
    fn data(&self) -> &'doc NodeData {
        &self.doc.nodes[self.id.0]
    }

    /// The ID of this node within its document
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The document this node belongs to
    pub fn document(&self) -> &'doc BpelDocument {
        self.doc
    }

    /// The tag name of this node, or None for text nodes
    pub fn element_name(&self) -> Option<&'doc str> {
        match self.data() {
            NodeData::Element { name, .. } => Some(name),
            NodeData::Text { .. } => None,
        }
    }

    /// Whether this node is a run of character data rather than an element
    pub fn is_text(&self) -> bool {
        matches!(self.data(), NodeData::Text { .. })
    }

    /// The parent of this node, or None for the document root
    pub fn parent(&self) -> Option<NodeRef<'doc>> {
        let parent = match self.data() {
            NodeData::Element { parent, .. } => *parent,
            NodeData::Text { parent, .. } => Some(*parent),
        };
        parent.map(|id| NodeRef { doc: self.doc, id })
    }

    /// The direct children of this node in document order.
    /// Text nodes have no children.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'doc>> {
        let children: &'doc [NodeId] = match self.data() {
            NodeData::Element { children, .. } => children,
            NodeData::Text { .. } => &[],
        };
        let doc = self.doc;
        children.iter().map(move |&id| NodeRef { doc, id })
    }

    /// Get the value of an attribute, or None if it is not present.
    /// Attribute names are matched case-insensitively.
    pub fn attribute(&self, name: &str) -> Option<&'doc str> {
        match self.data() {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            NodeData::Text { .. } => None,
        }
    }

    /// True iff the attribute is present and its value equals `true_value`,
    /// ignoring case. An absent attribute and any other value are false.
    pub fn boolean_attribute(&self, name: &str, true_value: &str) -> bool {
        self.attribute(name)
            .is_some_and(|value| value.eq_ignore_ascii_case(true_value))
    }

    /// The name a reader would know this node by: the `name` attribute if it
    /// is set, otherwise the tag name.
    pub fn real_name(&self) -> &'doc str {
        self.attribute("name")
            .or_else(|| self.element_name())
            .unwrap_or_default()
    }

    /// The text content of this node: every run of character data beneath
    /// it, concatenated in document order.
    pub fn text_content(&self) -> String {
        fn collect(node: NodeRef<'_>, out: &mut String) {
            match node.data() {
                NodeData::Text { content, .. } => out.push_str(content),
                NodeData::Element { .. } => {
                    for child in node.children() {
                        collect(child, out);
                    }
                }
            }
        }
        let mut out = String::new();
        collect(*self, &mut out);
        out
    }

    /// Find a direct child element by name, ignoring case.
    /// Every child is scanned and the last match is kept, so a later sibling
    /// wins over an earlier one with the same name.
    // TODO: Switch to first-match once callers are audited for duplicate-named siblings
    pub fn specific_child(&self, name: &str) -> Option<NodeRef<'doc>> {
        self.children()
            .filter(|child| {
                child
                    .element_name()
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .last()
    }

    /// Find all direct child elements with the given name, ignoring case,
    /// in document order.
    pub fn specific_children(&self, name: &str) -> Vec<NodeRef<'doc>> {
        self.children()
            .filter(|child| {
                child
                    .element_name()
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .collect()
    }
}

/// Two node references are equal when they point at the same node of the same document
impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.data() {
            NodeData::Element { name, .. } => write!(f, "NodeRef({} <{}>)", self.id.0, name),
            NodeData::Text { .. } => write!(f, "NodeRef({} #text)", self.id.0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn doc(xml: &str) -> BpelDocument {
        xml.parse().expect("test document should parse")
    }

    #[test]
    fn attribute_lookup_ignores_case() {
        let doc = doc(r#"<receive createInstance="yes"/>"#);
        let node = doc.root();
        assert_eq!(node.attribute("createinstance"), Some("yes"));
        assert_eq!(node.attribute("CREATEINSTANCE"), Some("yes"));
        assert_eq!(node.attribute("partnerLink"), None);
    }

    #[test]
    fn real_name_prefers_name_attribute() {
        let doc = doc(r#"<flow name="mainFlow"><invoke/></flow>"#);
        let flow = doc.root();
        assert_eq!(flow.real_name(), "mainFlow");
        let invoke = flow.specific_child("invoke").unwrap();
        assert_eq!(invoke.real_name(), "invoke");
    }

    #[test]
    fn boolean_attribute_matches_value_ignoring_case() {
        let doc = doc(r#"<receive a="Yes" b="no" c="yes "/>"#);
        let node = doc.root();
        assert!(node.boolean_attribute("a", "yes"));
        assert!(!node.boolean_attribute("b", "yes"));
        assert!(!node.boolean_attribute("c", "yes")); // trailing whitespace is not trimmed
        assert!(!node.boolean_attribute("d", "yes"));
    }

    #[test]
    fn specific_child_keeps_the_last_match() {
        let doc = doc(r#"<scope><invoke name="one"/><invoke name="two"/></scope>"#);
        let last = doc.root().specific_child("invoke").unwrap();
        assert_eq!(last.real_name(), "two");
    }

    #[test]
    fn specific_children_preserve_document_order() {
        let doc = doc(r#"<targets><target linkName="L1"/><other/><target linkName="L2"/></targets>"#);
        let targets = doc.root().specific_children("target");
        let names: Vec<_> = targets
            .iter()
            .filter_map(|t| t.attribute("linkName"))
            .collect();
        assert_eq!(names, ["L1", "L2"]);
    }

    #[test]
    fn text_content_concatenates_nested_text() {
        let doc = doc("<joincondition>$a and <b>$c</b> or $d</joincondition>");
        assert_eq!(doc.root().text_content(), "$a and $c or $d");
    }

    #[test]
    fn parent_links_run_up_to_the_root() {
        let doc = doc("<process><sequence><invoke/></sequence></process>");
        let invoke = doc
            .root()
            .specific_child("sequence")
            .unwrap()
            .specific_child("invoke")
            .unwrap();
        assert_eq!(invoke.parent().unwrap().element_name(), Some("sequence"));
        assert_eq!(doc.root().parent(), None);
    }

    #[test]
    fn displays_as_xml() {
        let xml = r#"<flow name="f"><invoke partnerLink="shipper"/>text</flow>"#;
        let doc = doc(xml);
        assert_eq!(doc.to_string(), xml);
    }
}
