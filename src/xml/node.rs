//! Owned element tree.

use std::collections::BTreeSet;

/// A single element in a parsed metadata document.
///
/// Trees are plain values: moving a node into another tree moves (or clones)
/// it, nodes are never shared between documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementNode {
    /// Local name, without namespace.
    pub tag: String,
    /// Namespace URI the element was parsed in, if any.
    pub namespace: Option<String>,
    /// Direct text content. `None` when the element had no text at all.
    pub text: Option<String>,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: ElementNode) {
        self.children.push(child);
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// True when the text is missing or consists only of whitespace.
    pub fn text_is_blank(&self) -> bool {
        self.text.as_deref().is_none_or(|t| t.trim().is_empty())
    }

    /// Text content, or the empty string.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Depth-first, pre-order iterator over all descendants (not `self`).
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// First descendant with the given tag in document order.
    pub fn find_descendant(&self, tag: &str) -> Option<&ElementNode> {
        self.descendants().find(|node| node.tag == tag)
    }

    /// Drop the namespace from this element and every descendant.
    pub fn strip_namespaces(&mut self) {
        self.namespace = None;
        for child in &mut self.children {
            child.strip_namespaces();
        }
    }

    /// Prefixed namespace declarations (`xmlns:p`) carried on this element.
    pub fn namespace_declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .filter(|(name, _)| name.starts_with("xmlns:"))
            .map(|(name, uri)| (name.as_str(), uri.as_str()))
    }

    /// Add a namespace declaration unless one with the same name exists.
    ///
    /// Declarations are kept ahead of regular attributes.
    pub fn declare(&mut self, name: &str, uri: &str) {
        if self.attribute(name).is_some() {
            return;
        }
        let position = self
            .attributes
            .iter()
            .take_while(|(n, _)| n.starts_with("xmlns:"))
            .count();
        self.attributes
            .insert(position, (name.to_string(), uri.to_string()));
    }

    /// Attribute prefixes used by this element or any descendant.
    pub fn used_prefixes(&self) -> BTreeSet<&str> {
        std::iter::once(self)
            .chain(self.descendants())
            .flat_map(|node| node.attributes.iter())
            .filter(|(name, _)| !name.starts_with("xmlns"))
            .filter_map(|(name, _)| name.split_once(':').map(|(prefix, _)| prefix))
            .collect()
    }

    /// Tags of the direct children, in order, without duplicates.
    pub fn child_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for child in &self.children {
            if !tags.contains(&child.tag.as_str()) {
                tags.push(&child.tag);
            }
        }
        tags
    }
}

/// Iterator returned by [`ElementNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a ElementNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a ElementNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ElementNode {
        ElementNode::new("root")
            .with_child(
                ElementNode::new("a")
                    .with_child(ElementNode::new("a1").with_text("x"))
                    .with_child(ElementNode::new("a2")),
            )
            .with_child(ElementNode::new("b").with_text("y"))
    }

    #[test]
    fn test_descendants_are_depth_first() {
        let root = sample();
        let tags: Vec<&str> = root.descendants().map(|n| n.tag.as_str()).collect();
        assert_eq!(tags, vec!["a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_find_descendant_searches_nested() {
        let root = sample();
        assert_eq!(root.find_descendant("a1").unwrap().text.as_deref(), Some("x"));
        assert!(root.find_descendant("root").is_none());
        assert!(root.find_descendant("missing").is_none());
    }

    #[test]
    fn test_text_is_blank() {
        assert!(ElementNode::new("a").text_is_blank());
        assert!(ElementNode::new("a").with_text("\n    ").text_is_blank());
        assert!(!ElementNode::new("a").with_text(" v ").text_is_blank());
    }

    #[test]
    fn test_strip_namespaces_is_recursive() {
        let mut root = ElementNode::new("r")
            .with_namespace("urn:x")
            .with_child(ElementNode::new("c").with_namespace("urn:x"));
        root.strip_namespaces();
        assert!(root.namespace.is_none());
        assert!(root.children[0].namespace.is_none());
    }

    #[test]
    fn test_declare_keeps_declarations_first() {
        let mut node = ElementNode::new("r");
        node.attributes.push(("type".to_string(), "x".to_string()));
        node.declare("xmlns:xsi", "urn:xsi");
        node.declare("xmlns:xsi", "urn:other");
        assert_eq!(node.attributes[0], ("xmlns:xsi".to_string(), "urn:xsi".to_string()));
        assert_eq!(node.namespace_declarations().count(), 1);
    }

    #[test]
    fn test_used_prefixes() {
        let mut child = ElementNode::new("description");
        child
            .attributes
            .push(("xsi:nil".to_string(), "true".to_string()));
        let mut root = ElementNode::new("r").with_child(child);
        root.declare("xmlns:xsi", "urn:xsi");
        assert_eq!(root.used_prefixes().into_iter().collect::<Vec<_>>(), vec!["xsi"]);
    }

    #[test]
    fn test_child_tags_dedup_in_order() {
        let root = ElementNode::new("r")
            .with_child(ElementNode::new("b"))
            .with_child(ElementNode::new("a"))
            .with_child(ElementNode::new("b"));
        assert_eq!(root.child_tags(), vec!["b", "a"]);
    }
}
