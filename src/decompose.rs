//! Splitting canonical metadata documents into per-record files.
//!
//! Each direct child of a document is classified. Composite records are keyed
//! and written to their own fragment file right away; simple scalar children
//! are collected and written once, sorted, as the family's simple-fields file.
//! A document that fails to parse is skipped; a record that cannot be keyed
//! or written is skipped without affecting its siblings.

use crate::classify::{Classification, classify, extract_key};
use crate::descriptor::{DescriptorRegistry, TypeDescriptor};
use crate::error::{Error, Result};
use crate::layout::{Layout, file_name, sorted_entries, write_artifact};
use crate::xml::{ElementNode, parse_file, to_canonical_string};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counters for one decompose run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecomposeReport {
    pub documents: usize,
    pub parse_failures: usize,
    pub fragments_written: usize,
    pub simple_files_written: usize,
    pub unkeyable_skipped: usize,
    pub duplicate_keys: usize,
    pub write_failures: usize,
}

impl DecomposeReport {
    fn absorb(&mut self, other: &DecomposeReport) {
        self.documents += other.documents;
        self.parse_failures += other.parse_failures;
        self.fragments_written += other.fragments_written;
        self.simple_files_written += other.simple_files_written;
        self.unkeyable_skipped += other.unkeyable_skipped;
        self.duplicate_keys += other.duplicate_keys;
        self.write_failures += other.write_failures;
    }
}

/// A canonical document found on disk, with the family it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub family: String,
    pub group: Option<String>,
}

/// Decomposer for one metadata type under one output root.
pub struct Decomposer<'a> {
    layout: Layout<'a>,
}

impl<'a> Decomposer<'a> {
    pub fn new(output_root: &Path, descriptor: &'a TypeDescriptor) -> Self {
        Self {
            layout: Layout::new(output_root, descriptor),
        }
    }

    fn descriptor(&self) -> &'a TypeDescriptor {
        self.layout.descriptor()
    }

    /// Decompose every canonical document of this type.
    pub fn run(&self) -> Result<DecomposeReport> {
        let mut report = DecomposeReport::default();
        for source in self.source_documents()? {
            self.decompose_file(&source, &mut report);
        }
        info!(
            metadata_type = %self.descriptor().id,
            documents = report.documents,
            fragments = report.fragments_written,
            skipped = report.unkeyable_skipped,
            "Decomposed metadata type"
        );
        Ok(report)
    }

    /// Canonical documents of this type, sorted by path.
    ///
    /// Documents sit directly in the type directory, or one level down in a
    /// group folder for grouped types.
    pub fn source_documents(&self) -> Result<Vec<SourceDocument>> {
        let type_dir = self.layout.type_dir();
        if !type_dir.is_dir() {
            warn!(dir = %type_dir.display(), "Metadata directory not found, nothing to decompose");
            return Ok(Vec::new());
        }

        let mut sources = Vec::new();
        if self.descriptor().grouped {
            for group_dir in sorted_entries(type_dir)?.into_iter().filter(|p| p.is_dir()) {
                let group = file_name(&group_dir);
                for path in sorted_entries(&group_dir)? {
                    if let Some(source) = self.source_for(&path, Some(&group)) {
                        sources.push(source);
                    }
                }
            }
        } else {
            for path in sorted_entries(type_dir)? {
                if let Some(source) = self.source_for(&path, None) {
                    sources.push(source);
                }
            }
        }
        Ok(sources)
    }

    fn source_for(&self, path: &Path, group: Option<&str>) -> Option<SourceDocument> {
        let name = file_name(path);
        if !path.is_file() || !self.descriptor().is_document_file(&name) {
            return None;
        }
        Some(SourceDocument {
            path: path.to_path_buf(),
            family: self.descriptor().family_for_file(&name),
            group: group.map(str::to_string),
        })
    }

    /// Decompose one file. Parse failures are logged and counted.
    pub fn decompose_file(&self, source: &SourceDocument, report: &mut DecomposeReport) {
        let root = match parse_file(&source.path) {
            Ok(root) => root,
            Err(e) => {
                warn!("{e}");
                report.parse_failures += 1;
                return;
            }
        };
        debug!(path = %source.path.display(), family = %source.family, "Decomposing document");
        self.decompose_document(&root, &source.family, source.group.as_deref(), report);
    }

    /// Decompose a parsed document into fragment files and a simple-fields file.
    pub fn decompose_document(
        &self,
        root: &ElementNode,
        family: &str,
        group: Option<&str>,
        report: &mut DecomposeReport,
    ) {
        let descriptor = self.descriptor();
        let mut simple_fields: Option<ElementNode> = None;
        let mut seen: HashSet<PathBuf> = HashSet::new();
        // Fragment files on disk, counted once however often they are overwritten.
        let mut written: HashSet<PathBuf> = HashSet::new();
        report.documents += 1;

        for child in &root.children {
            match classify(child) {
                Classification::Simple { text, .. } => {
                    let mut field = child.clone();
                    field.strip_namespaces();
                    field.text = Some(text.to_string());
                    simple_fields
                        .get_or_insert_with(|| ElementNode::new(&descriptor.root_tag))
                        .push(field);
                }
                Classification::Composite { tag, node } => {
                    let Some(key) = extract_key(node, &descriptor.key_fields) else {
                        warn!("{}", Error::unkeyable(tag, &descriptor.key_fields));
                        report.unkeyable_skipped += 1;
                        continue;
                    };

                    let path = self.layout.fragment_path(family, group, tag, key);
                    if !seen.insert(path.clone()) {
                        warn!(path = %path.display(), "Duplicate {tag} key '{key}', later record wins");
                        report.duplicate_keys += 1;
                    }

                    let mut fragment = node.clone();
                    fragment.strip_namespaces();
                    carry_declarations(root, &mut fragment);
                    match write_artifact(&path, &to_canonical_string(&fragment)) {
                        Ok(()) => {
                            info!("Saved {tag} element content to {}", path.display());
                            if written.insert(path) {
                                report.fragments_written += 1;
                            }
                        }
                        Err(e) => {
                            warn!("{e}");
                            report.write_failures += 1;
                        }
                    }
                }
            }
        }

        let Some(mut simple_fields) = simple_fields else {
            return;
        };
        simple_fields.children.sort_by(|a, b| {
            (a.tag.as_str(), a.text_or_empty()).cmp(&(b.tag.as_str(), b.text_or_empty()))
        });
        carry_declarations(root, &mut simple_fields);

        let path = self.layout.simple_fields_path(family, group);
        match write_artifact(&path, &to_canonical_string(&simple_fields)) {
            Ok(()) => {
                info!("Saved meta content to {}", path.display());
                report.simple_files_written += 1;
            }
            Err(e) => {
                warn!("{e}");
                report.write_failures += 1;
            }
        }
    }
}

/// Copy the source root's prefix declarations that `target` needs.
fn carry_declarations(source_root: &ElementNode, target: &mut ElementNode) {
    let used: Vec<String> = target.used_prefixes().into_iter().map(str::to_string).collect();
    for (name, uri) in source_root.namespace_declarations() {
        let prefix = name.trim_start_matches("xmlns:");
        if used.iter().any(|p| p == prefix) {
            target.declare(name, uri);
        }
    }
}

/// Decompose one metadata type. Unknown type ids are fatal.
pub fn decompose(
    registry: &DescriptorRegistry,
    type_id: &str,
    output_root: &Path,
) -> Result<DecomposeReport> {
    let descriptor = registry.get(type_id)?;
    Decomposer::new(output_root, descriptor).run()
}

/// Decompose every configured metadata type.
pub fn decompose_all(registry: &DescriptorRegistry, output_root: &Path) -> Result<DecomposeReport> {
    let mut total = DecomposeReport::default();
    for descriptor in registry.iter() {
        total.absorb(&Decomposer::new(output_root, descriptor).run()?);
    }
    Ok(total)
}
