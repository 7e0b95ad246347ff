//! Child element classification and record key extraction.

use crate::xml::ElementNode;

/// How a direct child of a metadata document is decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification<'a> {
    /// A single scalar value, collected into the simple-fields document.
    Simple { tag: &'a str, text: &'a str },
    /// A structured record that gets its own fragment file.
    Composite { tag: &'a str, node: &'a ElementNode },
}

/// Classify a direct child of a metadata document.
///
/// Any element child makes a node composite, whatever its text. A node with
/// no element children is simple; whitespace-only formatting text counts as
/// empty. A childless node whose text is missing or blank is an empty scalar
/// (`<description/>`) and is also simple.
pub fn classify(node: &ElementNode) -> Classification<'_> {
    if node.has_children() {
        Classification::Composite {
            tag: &node.tag,
            node,
        }
    } else {
        let text = if node.text_is_blank() {
            ""
        } else {
            node.text_or_empty()
        };
        Classification::Simple {
            tag: &node.tag,
            text,
        }
    }
}

/// Extract the key naming a composite record.
///
/// For each field in priority order, the record's descendants are searched
/// depth-first; the first field with any match decides the key. A matching
/// field whose text is blank, or a key that cannot be used as a file name,
/// makes the record unkeyable.
pub fn extract_key<'a>(node: &'a ElementNode, key_fields: &[String]) -> Option<&'a str> {
    let field = key_fields
        .iter()
        .find_map(|name| node.find_descendant(name))?;
    let key = field.text.as_deref()?.trim();
    is_usable_key(key).then_some(key)
}

fn is_usable_key(key: &str) -> bool {
    !key.is_empty() && key != "." && key != ".." && !key.contains(['/', '\\'])
}
