//! Canonical serialization.
//!
//! Every emitted document has the same shape: one fixed declaration line,
//! four-space indentation, one element per line, no blank lines, and no
//! trailing newline after the closing root tag. Output is a pure function of
//! the tree, which is what makes composed files hashable.

use super::node::ElementNode;

/// Declaration line written at the top of every document.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// One indentation level.
pub const INDENT: &str = "    ";

/// Serialize a tree into canonical document text.
///
/// The root's namespace, if any, is emitted as its default `xmlns`. Namespaces
/// of descendants are never written; they inherit the root's.
pub fn to_canonical_string(root: &ElementNode) -> String {
    let mut out = String::from(XML_DECLARATION);
    out.push('\n');
    write_element(&mut out, root, 0, true);
    out
}

fn write_element(out: &mut String, node: &ElementNode, depth: usize, is_root: bool) {
    if depth > 0 {
        out.push('\n');
    }
    push_indent(out, depth);
    out.push('<');
    out.push_str(&node.tag);
    if is_root && let Some(ns) = &node.namespace {
        push_attribute(out, "xmlns", ns);
    }
    for (name, value) in &node.attributes {
        if is_root && name == "xmlns" && node.namespace.is_some() {
            continue;
        }
        push_attribute(out, name, value);
    }

    if node.children.is_empty() {
        match node.text.as_deref() {
            Some(text) if !text.is_empty() => {
                out.push('>');
                out.push_str(&escape(text));
                push_close(out, &node.tag);
            }
            _ => out.push_str("/>"),
        }
        return;
    }

    out.push('>');
    if !node.text_is_blank() {
        out.push('\n');
        push_indent(out, depth + 1);
        out.push_str(&escape(node.text_or_empty().trim()));
    }
    for child in &node.children {
        write_element(out, child, depth + 1, false);
    }
    out.push('\n');
    push_indent(out, depth);
    push_close(out, &node.tag);
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

fn push_close(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Escape character data for text and attribute values.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
