//! This module is responsible for parsing BPEL 2.0 XML into the document tree.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::document::{BpelDocument, NodeData, NodeId};
use crate::error::Error;

/// Parse a BPEL process document into a navigable tree.
///
/// Elements and character data (including whitespace runs and CDATA) become
/// nodes; the XML declaration, comments, processing instructions and
/// doctypes carry nothing the queries care about and are dropped. The first
/// top-level element becomes the document root.
pub fn parse_bpel<R: BufRead>(reader: R) -> Result<BpelDocument, Error> {
    let mut reader = Reader::from_reader(reader);
    let mut nodes: Vec<NodeData> = Vec::new();
    let mut root: Option<NodeId> = None;
    // Stack of currently open elements; the top is the parent of whatever comes next
    let mut open: Vec<NodeId> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                let id = push_element(&mut nodes, &start, open.last().copied())?;
                if root.is_none() && open.is_empty() {
                    root = Some(id);
                }
                open.push(id);
            }
            Event::Empty(start) => {
                let id = push_element(&mut nodes, &start, open.last().copied())?;
                if root.is_none() && open.is_empty() {
                    root = Some(id);
                }
            }
            Event::End(_) => {
                open.pop();
            }
            Event::Text(text) => {
                // Character data outside of any element cannot be part of the tree
                if let Some(&parent) = open.last() {
                    let content = text.unescape()?.into_owned();
                    push_text(&mut nodes, content, parent);
                }
            }
            Event::CData(cdata) => {
                if let Some(&parent) = open.last() {
                    // CDATA is already literal text and needs no unescaping
                    let content = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                    push_text(&mut nodes, content, parent);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let root = root.ok_or(Error::EmptyDocument)?;
    debug!(nodes = nodes.len(), "parsed BPEL document");
    Ok(BpelDocument { nodes, root })
}

/// Append an element node to the arena and link it to its parent
fn push_element(
    nodes: &mut Vec<NodeData>,
    start: &BytesStart<'_>,
    parent: Option<NodeId>,
) -> Result<NodeId, Error> {
    // Store local names so prefixed documents resolve like default-namespace ones
    // TODO: Decode names via the declared document encoding instead of assuming UTF-8
    let name = String::from_utf8_lossy(start.local_name().into_inner()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = String::from_utf8_lossy(attribute.key.into_inner()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    let id = NodeId(nodes.len());
    nodes.push(NodeData::Element {
        name,
        attributes,
        parent,
        children: Vec::new(),
    });
    if let Some(parent) = parent {
        if let NodeData::Element { children, .. } = &mut nodes[parent.0] {
            children.push(id);
        }
    }
    Ok(id)
}

/// Append a run of character data under the given parent
fn push_text(nodes: &mut Vec<NodeData>, content: String, parent: NodeId) {
    let id = NodeId(nodes.len());
    nodes.push(NodeData::Text { content, parent });
    if let NodeData::Element { children, .. } = &mut nodes[parent.0] {
        children.push(id);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PROCESS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <process name="purchaseOrder" suppressJoinFailure="yes">
            <!-- the main body of the process -->
            <sequence name="main">
                <receive name="receiveOrder" createInstance="yes"/>
                <invoke name="callShipper" outputVariable="shipReply"/>
            </sequence>
        </process>"#;

    #[test]
    fn parses_elements_attributes_and_text() -> Result<(), Error> {
        let doc: BpelDocument = PROCESS.parse()?;
        let root = doc.root();
        assert_eq!(root.element_name(), Some("process"));
        assert_eq!(root.attribute("name"), Some("purchaseOrder"));

        let sequence = root.specific_child("sequence").unwrap();
        assert_eq!(sequence.parent(), Some(root));
        // Two element children, plus the whitespace runs between them
        assert_eq!(sequence.children().filter(|c| !c.is_text()).count(), 2);
        assert!(sequence.children().any(|c| c.is_text()));

        let receive = sequence.specific_child("receive").unwrap();
        assert_eq!(receive.attribute("createInstance"), Some("yes"));
        Ok(())
    }

    #[test]
    fn comments_are_dropped() -> Result<(), Error> {
        let doc: BpelDocument = PROCESS.parse()?;
        let texts: Vec<String> = doc
            .root()
            .children()
            .filter(|c| c.is_text())
            .map(|c| c.text_content())
            .collect();
        assert!(texts.iter().all(|t| !t.contains("main body")));
        Ok(())
    }

    #[test]
    fn namespace_prefixes_are_stripped_from_element_names() -> Result<(), Error> {
        let doc: BpelDocument = r#"
            <bpel:process xmlns:bpel="http://docs.oasis-open.org/wsbpel/2.0/process/executable">
                <bpel:flow/>
            </bpel:process>"#
            .parse()?;
        assert_eq!(doc.root().element_name(), Some("process"));
        assert!(doc.root().specific_child("flow").is_some());
        Ok(())
    }

    #[test]
    fn attribute_values_are_unescaped() -> Result<(), Error> {
        let doc: BpelDocument = r#"<invoke name="a &amp; b"/>"#.parse()?;
        assert_eq!(doc.root().attribute("name"), Some("a & b"));
        Ok(())
    }

    #[test]
    fn document_without_elements_is_rejected() {
        let result = "<!-- nothing here -->".parse::<BpelDocument>();
        assert!(matches!(result, Err(Error::EmptyDocument)));
    }

    #[test]
    fn mismatched_tags_are_rejected() {
        let result = "<process><flow></process>".parse::<BpelDocument>();
        assert!(matches!(result, Err(Error::Xml(_))));
    }
}
