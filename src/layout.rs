//! File layout of decomposed and composed metadata.
//!
//! ```text
//! <root>/<dir>/[<group>/]<family>/<tag>/<key>.<tagSuffix>-meta.xml   fragment
//! <root>/<dir>/[<group>/]<family>/<family>.<id>-meta.xml             simple fields
//! <root>/<dir>/[<group>/]<family>.<id>-meta.xml                      canonical
//! <root>/<dir>/<key>.<tagSuffix>-meta.xml                            fragment of a fixed-family type
//! ```
//!
//! Both directions resolve paths here so that decompose and compose agree.

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// File suffix used for fragments of `tag`.
///
/// `labels` becomes `label` so that label fragments never collide with the
/// `.labels-meta.xml` suffix of the parent document.
pub fn suffix_for_tag(tag: &str) -> &str {
    if tag == "labels" { "label" } else { tag }
}

/// Family and group recovered from a path relative to the type directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathClass {
    pub family: String,
    pub group: Option<String>,
    /// Record tag, when the file sits in a tag directory.
    pub tag: Option<String>,
}

/// Classify a path relative to the type directory.
///
/// Returns `None` for files that sit outside any family folder, such as the
/// canonical documents themselves.
pub fn classify_path(relative: &Path, descriptor: &TypeDescriptor) -> Option<PathClass> {
    let parts: Vec<&str> = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    let parent_tag = |min_len: usize| {
        (parts.len() >= min_len)
            .then(|| parts.get(parts.len() - 2).map(|t| t.to_string()))
            .flatten()
    };

    if let Some(family) = &descriptor.family {
        if parts.is_empty() {
            return None;
        }
        return Some(PathClass {
            family: family.clone(),
            group: None,
            tag: parent_tag(2),
        });
    }

    if descriptor.grouped {
        if parts.len() < 3 {
            return None;
        }
        Some(PathClass {
            family: parts[1].to_string(),
            group: Some(parts[0].to_string()),
            tag: parent_tag(4),
        })
    } else {
        if parts.len() < 2 {
            return None;
        }
        Some(PathClass {
            family: parts[0].to_string(),
            group: None,
            tag: parent_tag(3),
        })
    }
}

/// Path resolver for one metadata type under one output root.
#[derive(Debug, Clone)]
pub struct Layout<'a> {
    descriptor: &'a TypeDescriptor,
    type_dir: PathBuf,
}

impl<'a> Layout<'a> {
    pub fn new(output_root: &Path, descriptor: &'a TypeDescriptor) -> Self {
        Self {
            descriptor,
            type_dir: output_root.join(&descriptor.directory_name),
        }
    }

    pub fn descriptor(&self) -> &'a TypeDescriptor {
        self.descriptor
    }

    /// `<root>/<dir>`
    pub fn type_dir(&self) -> &Path {
        &self.type_dir
    }

    fn family_base(&self, group: Option<&str>) -> PathBuf {
        match group {
            Some(group) if self.descriptor.grouped => self.type_dir.join(group),
            _ => self.type_dir.clone(),
        }
    }

    /// Path of one decomposed record.
    pub fn fragment_path(&self, family: &str, group: Option<&str>, tag: &str, key: &str) -> PathBuf {
        let file_name = format!("{key}.{}-meta.xml", suffix_for_tag(tag));
        if self.descriptor.family.is_some() {
            return self.type_dir.join(file_name);
        }
        self.family_base(group).join(family).join(tag).join(file_name)
    }

    /// Path of the simple-fields document of a family.
    pub fn simple_fields_path(&self, family: &str, group: Option<&str>) -> PathBuf {
        self.family_base(group)
            .join(family)
            .join(format!("{family}{}", self.descriptor.extension()))
    }

    /// Path of the composed canonical document of a family.
    pub fn canonical_path(&self, family: &str, group: Option<&str>) -> PathBuf {
        self.family_base(group)
            .join(format!("{family}{}", self.descriptor.extension()))
    }

    /// Classify a path under [`Self::type_dir`].
    pub fn classify(&self, path: &Path) -> Option<PathClass> {
        let relative = path.strip_prefix(&self.type_dir).ok()?;
        classify_path(relative, self.descriptor)
    }
}

/// Write a complete artifact.
///
/// The contents go to a temporary sibling first and are renamed into place,
/// so a failed write never leaves a truncated file at `path`. Parent
/// directories are created as needed.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| Error::write(path, e))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{file_name}.tmp"));

    let result = fs::File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(contents.as_bytes())?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, path));

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::write(path, e));
    }
    Ok(())
}

/// Directory entries sorted by path, so discovery order is stable.
pub(crate) fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| Error::read(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::read(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// All files below `dir`, depth-first in path order.
pub(crate) fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}
