//! Minimal XML document model for metadata files.
//!
//! Metadata documents are parsed with `roxmltree` into an owned
//! [`ElementNode`] tree and written back through a canonical serializer, so
//! that the same tree always produces the same bytes.

mod node;
mod parse;
mod write;

pub use node::{Descendants, ElementNode};
pub use parse::{parse_file, parse_str};
pub use write::{INDENT, XML_DECLARATION, escape, to_canonical_string};
