//! Configuration types and structures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Namespace of Salesforce metadata documents.
pub const METADATA_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";

/// Default project directory the metadata types live under.
pub const DEFAULT_OUTPUT_DIR: &str = "force-app/main/default";

/// Key fields searched, in priority order, to name a decomposed record.
///
/// `fullName` must stay first: workflow records carry both `fullName` and
/// nested `name` fields. The rest cover profile and permission set records.
pub const DEFAULT_KEY_FIELDS: &[&str] = &[
    "fullName",
    "application",
    "apexClass",
    "name",
    "externalDataSource",
    "flow",
    "object",
    "apexPage",
    "recordType",
    "tab",
    "field",
    "startAddress",
    "dataCategoryGroup",
    "layout",
    "weekdayStart",
    "friendlyname",
];

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory containing the metadata type directories.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Namespace written on the root of composed documents.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Default key priority for types that do not override it.
    #[serde(default = "default_key_fields")]
    pub key_fields: Vec<String>,

    /// Supported metadata types, keyed by type id (the file suffix token).
    #[serde(default = "default_metadata")]
    pub metadata: BTreeMap<String, MetadataTypeConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            namespace: default_namespace(),
            key_fields: default_key_fields(),
            metadata: default_metadata(),
        }
    }
}

/// Layout rules for one metadata type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataTypeConfig {
    /// Directory under the output root (e.g. `profiles`).
    pub directory_name: String,

    /// Root element of the composed document (e.g. `Profile`).
    pub root_tag: String,

    /// Key priority override. Falls back to [`Config::key_fields`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_fields: Option<Vec<String>>,

    /// Records live two levels deep under a group folder.
    #[serde(default)]
    pub grouped: bool,

    /// Fixed family name for types with a single document per directory
    /// (e.g. `CustomLabels`). Fragments of such types are written flat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

impl MetadataTypeConfig {
    pub fn new(directory_name: &str, root_tag: &str) -> Self {
        Self {
            directory_name: directory_name.to_string(),
            root_tag: root_tag.to_string(),
            key_fields: None,
            grouped: false,
            family: None,
        }
    }

    pub fn with_family(mut self, family: &str) -> Self {
        self.family = Some(family.to_string());
        self
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_namespace() -> String {
    METADATA_NAMESPACE.to_string()
}

fn default_key_fields() -> Vec<String> {
    DEFAULT_KEY_FIELDS.iter().map(|s| s.to_string()).collect()
}

fn default_metadata() -> BTreeMap<String, MetadataTypeConfig> {
    let mut metadata = BTreeMap::new();
    metadata.insert(
        "labels".to_string(),
        MetadataTypeConfig::new("labels", "CustomLabels").with_family("CustomLabels"),
    );
    metadata.insert(
        "workflow".to_string(),
        MetadataTypeConfig::new("workflows", "Workflow"),
    );
    metadata.insert(
        "profile".to_string(),
        MetadataTypeConfig::new("profiles", "Profile"),
    );
    metadata.insert(
        "permissionset".to_string(),
        MetadataTypeConfig::new("permissionsets", "PermissionSet"),
    );
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_types() {
        let config = Config::default();
        let ids: Vec<&str> = config.metadata.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["labels", "permissionset", "profile", "workflow"]);
        assert_eq!(
            config.metadata["labels"].family.as_deref(),
            Some("CustomLabels")
        );
        assert_eq!(config.key_fields.first().map(String::as_str), Some("fullName"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("output_dir: src\n").unwrap();
        assert_eq!(config.output_dir, PathBuf::from("src"));
        assert_eq!(config.namespace, METADATA_NAMESPACE);
        assert_eq!(config.metadata.len(), 4);
    }

    #[test]
    fn test_type_config_defaults() {
        let yaml = "directory_name: bots\nroot_tag: Bot\n";
        let parsed: MetadataTypeConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(!parsed.grouped);
        assert!(parsed.key_fields.is_none());
        assert!(parsed.family.is_none());
    }
}
