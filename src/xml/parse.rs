//! Parsing metadata XML into [`ElementNode`] trees.

use super::node::ElementNode;
use crate::error::{Error, Result};
use roxmltree::{Document, Node};
use std::path::Path;

/// Parse an XML string into an owned tree rooted at the document element.
pub fn parse_str(xml: &str) -> std::result::Result<ElementNode, roxmltree::Error> {
    let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    let mut element = convert(root);

    // Prefixed declarations are only kept on the root, where they are in scope
    // for every attribute that refers to them.
    let declarations: Vec<(String, String)> = root
        .namespaces()
        .filter_map(|ns| {
            ns.name()
                .filter(|prefix| *prefix != "xml")
                .map(|prefix| (format!("xmlns:{prefix}"), ns.uri().to_string()))
        })
        .collect();
    element.attributes.splice(0..0, declarations);

    Ok(element)
}

/// Read and parse a file.
pub fn parse_file(path: &Path) -> Result<ElementNode> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    parse_str(&content).map_err(|source| Error::ParseFailure {
        path: path.to_path_buf(),
        source,
    })
}

fn convert(node: Node<'_, '_>) -> ElementNode {
    let tag_name = node.tag_name();

    let attributes = node
        .attributes()
        .map(|attr| {
            let name = match attr.namespace().and_then(|uri| node.lookup_prefix(uri)) {
                Some(prefix) => format!("{prefix}:{}", attr.name()),
                None => attr.name().to_string(),
            };
            (name, attr.value().to_string())
        })
        .collect();

    let mut text: Option<String> = None;
    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(convert(child));
        } else if child.is_text()
            && let Some(t) = child.text()
        {
            text.get_or_insert_with(String::new).push_str(t);
        }
    }

    ElementNode {
        tag: tag_name.name().to_string(),
        namespace: tag_name.namespace().map(str::to_string),
        text,
        attributes,
        children,
    }
}
