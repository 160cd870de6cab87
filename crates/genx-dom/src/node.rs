//! DOM Node
//!
//! Nodes link to each other through `NodeId` indices instead of pointers,
//! so the tree is a flat arena.

use crate::{NamedNodeMap, NodeId};

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if detached or root)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_data(NodeData::Text(content.into()))
    }

    /// Create a comment node
    pub fn comment(content: impl Into<String>) -> Self {
        Self::with_data(NodeData::Comment(content.into()))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Character data of text and comment nodes
    #[inline]
    pub fn character_data(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) | NodeData::Comment(t) => Some(t),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Lowercase tag name
    tag: Box<str>,
    /// Attributes in declaration order
    pub attrs: NamedNodeMap,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase().into(),
            attrs: NamedNodeMap::new(),
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id").filter(|id| !id.is_empty())
    }

    /// Raw `class` attribute
    pub fn class_name(&self) -> Option<&str> {
        self.attrs.get("class")
    }

    /// Class tokens in declaration order
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class_name().unwrap_or_default().split_ascii_whitespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_classes() {
        let mut node = Node::element("DIV");
        let elem = node.as_element_mut().unwrap();
        elem.attrs.set("class", "  card fmt-currency-USD\tactive ");

        let elem = node.as_element().unwrap();
        assert_eq!(elem.tag_name(), "div");
        let classes: Vec<_> = elem.classes().collect();
        assert_eq!(classes, vec!["card", "fmt-currency-USD", "active"]);
    }

    #[test]
    fn test_empty_id_is_none() {
        let mut node = Node::element("span");
        node.as_element_mut().unwrap().attrs.set("id", "");
        assert_eq!(node.as_element().unwrap().id(), None);
    }

    #[test]
    fn test_character_data() {
        assert_eq!(Node::text("hi").character_data(), Some("hi"));
        assert_eq!(Node::element("p").character_data(), None);
    }
}
