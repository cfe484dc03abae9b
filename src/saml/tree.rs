//! Minimal element tree for read-only queries.
//!
//! Attacks never go through this tree, they work on raw text. The tree only
//! backs information extraction and validation, where namespace prefixes are
//! ignored and elements are matched by local name.

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::saml::XmlError;

/// Index of an element inside an [`XmlTree`]
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Element(NodeId),
    Text(String),
}

/// One element of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written, prefix included
    pub name: String,
    pub local_name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    pub parent: Option<NodeId>,
    content: Vec<Content>,
}

impl Element {
    fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.content.iter().filter_map(|c| match c {
            Content::Element(id) => Some(*id),
            Content::Text(_) => None,
        })
    }
}

/// Arena of elements in document order, the root element at index 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlTree {
    nodes: Vec<Element>,
}

impl XmlTree {
    /// Parses a complete document with exactly one root element.
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        if xml.trim().is_empty() {
            return Err(XmlError::Empty);
        }

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut nodes: Vec<Element> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();

        loop {
            let position = reader.buffer_position() as usize;
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let id = open_element(&mut nodes, &stack, &e, xml, position)?;
                    stack.push(id);
                }
                Ok(Event::Empty(e)) => {
                    open_element(&mut nodes, &stack, &e, xml, position)?;
                }
                Ok(Event::End(_)) => {
                    stack.pop();
                }
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .map(|s| s.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                    push_text(&mut nodes, &stack, text, xml, position)?;
                }
                Ok(Event::CData(c)) => {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    push_text(&mut nodes, &stack, text, xml, position)?;
                }
                Ok(Event::Eof) => break,
                // declaration, comments, processing instructions and DOCTYPE
                Ok(_) => {}
                Err(e) => {
                    return Err(XmlError::at(
                        xml,
                        reader.error_position() as usize,
                        e.to_string(),
                    ));
                }
            }
        }

        if let Some(&open) = stack.last() {
            return Err(XmlError::at(
                xml,
                xml.len(),
                format!("Unclosed element <{}>", nodes[open].name),
            ));
        }
        if nodes.is_empty() {
            return Err(XmlError::at(xml, 0, "No root element found"));
        }
        Ok(Self { nodes })
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn element(&self, node: NodeId) -> &Element {
        &self.nodes[node]
    }

    /// All elements named `local_name` below `node`, in document order.
    pub fn descendants(&self, node: NodeId, local_name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect(node, local_name, &mut found);
        found
    }

    pub fn first_descendant(&self, node: NodeId, local_name: &str) -> Option<NodeId> {
        self.descendants(node, local_name).into_iter().next()
    }

    /// All elements named `local_name` in the document, root included.
    pub fn find_all(&self, local_name: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, e)| e.local_name == local_name)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn find_first(&self, local_name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|e| e.local_name == local_name)
    }

    /// First direct child named `local_name`.
    pub fn child(&self, node: NodeId, local_name: &str) -> Option<NodeId> {
        self.nodes[node]
            .children()
            .find(|&id| self.nodes[id].local_name == local_name)
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node]
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text of `node` and all of its descendants.
    pub fn text(&self, node: NodeId) -> String {
        let mut text = String::new();
        self.append_text(node, &mut text);
        text
    }

    fn collect(&self, node: NodeId, local_name: &str, found: &mut Vec<NodeId>) {
        for child in self.nodes[node].children() {
            if self.nodes[child].local_name == local_name {
                found.push(child);
            }
            self.collect(child, local_name, found);
        }
    }

    fn append_text(&self, node: NodeId, text: &mut String) {
        for content in &self.nodes[node].content {
            match content {
                Content::Text(t) => text.push_str(t),
                Content::Element(child) => self.append_text(*child, text),
            }
        }
    }
}

fn open_element(
    nodes: &mut Vec<Element>,
    stack: &[NodeId],
    start: &BytesStart<'_>,
    xml: &str,
    position: usize,
) -> Result<NodeId, XmlError> {
    let parent = stack.last().copied();
    if parent.is_none() && !nodes.is_empty() {
        return Err(XmlError::at(
            xml,
            position,
            "Unexpected content after the root element",
        ));
    }

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::at(xml, position, format!("Invalid attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        attributes.push((key, value));
    }

    let id = nodes.len();
    nodes.push(Element {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        local_name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        parent,
        content: Vec::new(),
    });
    if let Some(parent) = parent {
        nodes[parent].content.push(Content::Element(id));
    }
    Ok(id)
}

fn push_text(
    nodes: &mut [Element],
    stack: &[NodeId],
    text: String,
    xml: &str,
    position: usize,
) -> Result<(), XmlError> {
    match stack.last() {
        Some(&parent) => {
            nodes[parent].content.push(Content::Text(text));
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => {
            let offset = position + (text.len() - text.trim_start().len());
            let message = if nodes.is_empty() {
                "Text before the root element"
            } else {
                "Unexpected content after the root element"
            };
            Err(XmlError::at(xml, offset, message))
        }
    }
}
