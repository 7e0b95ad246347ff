//! Reassembling decomposed record files into canonical documents.
//!
//! Fragments are discovered under the type directory and grouped by family
//! (and group, for grouped types). Each family is merged in tag order into a
//! fresh document, reconciled against the family's simple-fields file and
//! then its previously composed document, and written in canonical form. Discovery order is sorted by
//! path and the tag sort is stable, so unchanged inputs always compose to
//! identical bytes.

use crate::descriptor::{DescriptorRegistry, TypeDescriptor};
use crate::error::Result;
use crate::layout::{Layout, collect_files, file_name, write_artifact};
use crate::xml::{ElementNode, parse_file, to_canonical_string};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counters for one compose run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeReport {
    pub families_written: usize,
    pub fragments_merged: usize,
    pub baseline_fields: usize,
    pub read_failures: usize,
    pub write_failures: usize,
    /// Canonical documents written, in family order.
    pub written: Vec<PathBuf>,
}

impl ComposeReport {
    fn absorb(&mut self, other: ComposeReport) {
        self.families_written += other.families_written;
        self.fragments_merged += other.fragments_merged;
        self.baseline_fields += other.baseline_fields;
        self.read_failures += other.read_failures;
        self.write_failures += other.write_failures;
        self.written.extend(other.written);
    }
}

/// Identity of one composed document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FamilyKey {
    pub group: Option<String>,
    pub family: String,
}

/// A fragment file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentFile {
    pub path: PathBuf,
    /// Tag of the directory the fragment sits in, if any.
    pub tag: Option<String>,
}

/// Composer for one metadata type under one output root.
pub struct Composer<'a> {
    layout: Layout<'a>,
    namespace: &'a str,
}

impl<'a> Composer<'a> {
    pub fn new(output_root: &Path, descriptor: &'a TypeDescriptor, namespace: &'a str) -> Self {
        Self {
            layout: Layout::new(output_root, descriptor),
            namespace,
        }
    }

    fn descriptor(&self) -> &'a TypeDescriptor {
        self.layout.descriptor()
    }

    /// Compose every family of this type.
    pub fn run(&self) -> Result<ComposeReport> {
        let mut report = ComposeReport::default();
        for (key, fragments) in self.discover()? {
            self.compose_family(&key, &fragments, &mut report);
        }
        info!(
            "The metadata type `{}` has been compiled for deployments.",
            self.descriptor().id
        );
        Ok(report)
    }

    /// Fragment files per family, in path order.
    ///
    /// Files carrying the type's own document suffix are not fragments. A
    /// family's simple-fields file still registers the family, so families
    /// without any composite record are composed too.
    pub fn discover(&self) -> Result<BTreeMap<FamilyKey, Vec<FragmentFile>>> {
        let mut families: BTreeMap<FamilyKey, Vec<FragmentFile>> = BTreeMap::new();
        let type_dir = self.layout.type_dir();
        if !type_dir.is_dir() {
            warn!(dir = %type_dir.display(), "Metadata directory not found, nothing to compose");
            return Ok(families);
        }

        let mut files = Vec::new();
        collect_files(type_dir, &mut files)?;

        for path in files {
            let name = file_name(&path);
            if !name.ends_with("-meta.xml") {
                continue;
            }
            let Some(class) = self.layout.classify(&path) else {
                debug!(path = %path.display(), "Not part of any family, skipping");
                continue;
            };
            let key = FamilyKey {
                group: class.group,
                family: class.family,
            };

            if self.descriptor().is_document_file(&name) {
                if path == self.layout.simple_fields_path(&key.family, key.group.as_deref()) {
                    families.entry(key).or_default();
                }
                continue;
            }

            families.entry(key).or_default().push(FragmentFile {
                path,
                tag: class.tag,
            });
        }
        Ok(families)
    }

    /// Merge fragments into a new document, without baseline reconciliation.
    pub fn merge_fragments(
        &self,
        fragments: &[FragmentFile],
        report: &mut ComposeReport,
    ) -> ElementNode {
        let mut loaded: Vec<(String, ElementNode)> = Vec::new();
        for fragment in fragments {
            match parse_file(&fragment.path) {
                Ok(root) => {
                    let tag = fragment.tag.clone().unwrap_or_else(|| root.tag.clone());
                    loaded.push((tag, root));
                }
                Err(e) => {
                    warn!("{e}");
                    report.read_failures += 1;
                }
            }
        }

        // Stable: fragments sharing a tag keep discovery (path) order.
        loaded.sort_by(|a, b| a.0.cmp(&b.0));

        let mut merged =
            ElementNode::new(&self.descriptor().root_tag).with_namespace(self.namespace);
        for (tag, fragment) in loaded {
            hoist_declarations(&fragment, &mut merged);
            if fragment.has_children() {
                let mut record = ElementNode::new(tag);
                record.attributes = fragment
                    .attributes
                    .into_iter()
                    .filter(|(name, _)| !name.starts_with("xmlns:"))
                    .collect();
                record.children = fragment.children;
                merged.push(record);
            } else if !fragment.text_is_blank() {
                merged.push(ElementNode::new(tag).with_text(fragment.text_or_empty()));
            } else {
                debug!(tag = %tag, "Skipping empty fragment");
                continue;
            }
            report.fragments_merged += 1;
        }
        merged
    }

    /// Documents reconciled against, in order: the simple-fields file, then
    /// a previously composed canonical document. Only existing files are
    /// returned.
    pub fn baseline_paths(&self, key: &FamilyKey) -> Vec<PathBuf> {
        let group = key.group.as_deref();
        [
            self.layout.simple_fields_path(&key.family, group),
            self.layout.canonical_path(&key.family, group),
        ]
        .into_iter()
        .filter(|path| path.is_file())
        .collect()
    }

    /// Compose and write one family. Failures are logged and counted.
    pub fn compose_family(
        &self,
        key: &FamilyKey,
        fragments: &[FragmentFile],
        report: &mut ComposeReport,
    ) {
        let mut merged = self.merge_fragments(fragments, report);

        // Each pass only adds tags that earlier passes left unseen.
        for baseline_path in self.baseline_paths(key) {
            match parse_file(&baseline_path) {
                Ok(baseline) => {
                    report.baseline_fields += reconcile(&mut merged, baseline);
                }
                Err(e) => {
                    // A family with an unreadable baseline is left unwritten.
                    warn!("{e}");
                    report.read_failures += 1;
                    return;
                }
            }
        }

        let output = self.layout.canonical_path(&key.family, key.group.as_deref());
        match write_artifact(&output, &to_canonical_string(&merged)) {
            Ok(()) => {
                debug!(path = %output.display(), "Composed document");
                report.families_written += 1;
                report.written.push(output);
            }
            Err(e) => {
                warn!("{e}");
                report.write_failures += 1;
            }
        }
    }
}

/// Append baseline children whose tag none of the fresh children carry.
///
/// Returns the number of children appended.
pub fn reconcile(merged: &mut ElementNode, baseline: ElementNode) -> usize {
    let fresh: HashSet<String> = merged.children.iter().map(|c| c.tag.clone()).collect();
    hoist_declarations(&baseline, merged);

    let mut appended = 0;
    for mut child in baseline.children {
        if fresh.contains(&child.tag) {
            continue;
        }
        child.strip_namespaces();
        merged.push(child);
        appended += 1;
    }
    appended
}

fn hoist_declarations(from: &ElementNode, to: &mut ElementNode) {
    for (name, uri) in from.namespace_declarations() {
        to.declare(name, uri);
    }
}

/// Compose one metadata type. Unknown type ids are fatal.
pub fn compose(
    registry: &DescriptorRegistry,
    type_id: &str,
    output_root: &Path,
    namespace: &str,
) -> Result<ComposeReport> {
    let descriptor = registry.get(type_id)?;
    Composer::new(output_root, descriptor, namespace).run()
}

/// Compose every configured metadata type.
pub fn compose_all(
    registry: &DescriptorRegistry,
    output_root: &Path,
    namespace: &str,
) -> Result<ComposeReport> {
    let mut total = ComposeReport::default();
    for descriptor in registry.iter() {
        total.absorb(Composer::new(output_root, descriptor, namespace).run()?);
    }
    Ok(total)
}
