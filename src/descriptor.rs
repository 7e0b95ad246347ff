//! Metadata type descriptors.
//!
//! A [`DescriptorRegistry`] is built once from the merged configuration and
//! passed by reference to the decomposer and composer. Lookups are a single
//! map read per metadata type.

use crate::config::Config;
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Layout rules for one supported metadata type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type id, also the file suffix token (`profile` in `Admin.profile-meta.xml`).
    pub id: String,
    /// Directory under the output root.
    pub directory_name: String,
    /// Root element of the canonical document.
    pub root_tag: String,
    /// Key fields in priority order; the first one found names a record.
    pub key_fields: Vec<String>,
    /// Records live under `<group>/<family>/` instead of `<family>/`.
    pub grouped: bool,
    /// Fixed family for single-document types; their fragments are flat.
    pub family: Option<String>,
}

impl TypeDescriptor {
    /// File extension of canonical and simple-fields documents, e.g. `.profile-meta.xml`.
    pub fn extension(&self) -> String {
        format!(".{}-meta.xml", self.id)
    }

    /// Whether `file_name` is a document of this type.
    pub fn is_document_file(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.extension())
    }

    /// Family of a canonical document, from its file name.
    ///
    /// Fixed-family types always return their fixed family; otherwise the
    /// family is the file name up to the first `.`.
    pub fn family_for_file(&self, file_name: &str) -> String {
        match &self.family {
            Some(family) => family.clone(),
            None => file_name
                .split('.')
                .next()
                .unwrap_or(file_name)
                .to_string(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.directory_name.trim().is_empty() {
            return Err(Error::invalid_descriptor(&self.id, "directory_name is empty"));
        }
        if self.root_tag.trim().is_empty() {
            return Err(Error::invalid_descriptor(&self.id, "root_tag is empty"));
        }
        if self.key_fields.is_empty() {
            return Err(Error::invalid_descriptor(&self.id, "key_fields is empty"));
        }
        if self.grouped && self.family.is_some() {
            return Err(Error::invalid_descriptor(
                &self.id,
                "a fixed family cannot be combined with grouped layout",
            ));
        }
        Ok(())
    }
}

/// Immutable table of supported metadata types, keyed by type id.
#[derive(Debug, Clone, Default)]
pub struct DescriptorRegistry {
    descriptors: BTreeMap<String, TypeDescriptor>,
}

impl DescriptorRegistry {
    /// Build and validate the registry from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut descriptors = BTreeMap::new();
        for (id, type_config) in &config.metadata {
            let descriptor = TypeDescriptor {
                id: id.clone(),
                directory_name: type_config.directory_name.clone(),
                root_tag: type_config.root_tag.clone(),
                key_fields: type_config
                    .key_fields
                    .clone()
                    .unwrap_or_else(|| config.key_fields.clone()),
                grouped: type_config.grouped,
                family: type_config.family.clone(),
            };
            descriptor.validate()?;
            descriptors.insert(id.clone(), descriptor);
        }
        Ok(Self { descriptors })
    }

    /// Look up a descriptor, failing with `DescriptorNotFound`.
    pub fn get(&self, type_id: &str) -> Result<&TypeDescriptor> {
        self.descriptors
            .get(type_id)
            .ok_or_else(|| Error::descriptor_not_found(type_id, self.ids()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.descriptors.values()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
