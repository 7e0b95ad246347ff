//! Integration tests for decompose followed by compose.
//!
//! Covers record equivalence, byte-level determinism, the grouped and
//! fixed-family layouts, and deletion of records between runs.

use sfdx_decomposer::compose::{compose, compose_all};
use sfdx_decomposer::config::{Config, METADATA_NAMESPACE};
use sfdx_decomposer::decompose::{decompose, decompose_all};
use sfdx_decomposer::descriptor::DescriptorRegistry;
use sfdx_decomposer::xml::{ElementNode, parse_file, to_canonical_string};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PROFILE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Profile xmlns="http://soap.sforce.com/2006/04/metadata">
    <userLicense>Salesforce</userLicense>
    <fieldPermissions>
        <editable>true</editable>
        <field>Account.Rating</field>
        <readable>true</readable>
    </fieldPermissions>
    <custom>false</custom>
    <fieldPermissions>
        <editable>false</editable>
        <field>Account.Industry</field>
        <readable>true</readable>
    </fieldPermissions>
    <tabVisibilities>
        <tab>standard-Account</tab>
        <visibility>DefaultOn</visibility>
    </tabVisibilities>
    <loginIpRanges>
        <endAddress>10.0.0.255</endAddress>
        <startAddress>10.0.0.0</startAddress>
    </loginIpRanges>
</Profile>
"#;

const LABELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomLabels xmlns="http://soap.sforce.com/2006/04/metadata">
    <labels>
        <fullName>Greeting</fullName>
        <language>en_US</language>
        <protected>false</protected>
        <shortDescription>Greeting</shortDescription>
        <value>Hi</value>
    </labels>
    <labels>
        <fullName>Farewell</fullName>
        <language>en_US</language>
        <protected>false</protected>
        <shortDescription>Farewell</shortDescription>
        <value>Bye</value>
    </labels>
</CustomLabels>
"#;

fn registry(config: &Config) -> DescriptorRegistry {
    DescriptorRegistry::from_config(config).expect("default descriptors are valid")
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Top-level children as sorted canonical strings, for order-insensitive comparison.
fn record_set(root: &ElementNode) -> Vec<String> {
    let mut records: Vec<String> = root
        .children
        .iter()
        .map(|child| {
            let mut child = child.clone();
            child.strip_namespaces();
            to_canonical_string(&child)
        })
        .collect();
    records.sort();
    records
}

#[test]
fn test_profile_roundtrip_preserves_records() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("profiles/Admin.profile-meta.xml");
    write(&source, PROFILE);
    let original = parse_file(&source).unwrap();

    let config = Config::default();
    let registry = registry(&config);
    let report = decompose(&registry, "profile", temp.path()).unwrap();
    assert_eq!(report.fragments_written, 4);
    assert_eq!(report.unkeyable_skipped, 0);

    let composed = compose(&registry, "profile", temp.path(), &config.namespace).unwrap();
    assert_eq!(composed.families_written, 1);
    assert_eq!(composed.fragments_merged, 4);
    assert_eq!(composed.baseline_fields, 2);

    let result = parse_file(&source).unwrap();
    assert_eq!(result.tag, "Profile");
    assert_eq!(result.namespace.as_deref(), Some(METADATA_NAMESPACE));
    assert_eq!(record_set(&result), record_set(&original));
}

#[test]
fn test_composed_records_are_grouped_by_tag() {
    let temp = TempDir::new().unwrap();
    write(&temp.path().join("profiles/Admin.profile-meta.xml"), PROFILE);

    let config = Config::default();
    let registry = registry(&config);
    decompose(&registry, "profile", temp.path()).unwrap();
    compose(&registry, "profile", temp.path(), &config.namespace).unwrap();

    let result = parse_file(&temp.path().join("profiles/Admin.profile-meta.xml")).unwrap();
    let tags: Vec<&str> = result.children.iter().map(|c| c.tag.as_str()).collect();
    assert_eq!(
        tags,
        vec![
            "fieldPermissions",
            "fieldPermissions",
            "loginIpRanges",
            "tabVisibilities",
            "custom",
            "userLicense",
        ]
    );
    // Same-tag records follow fragment path order.
    assert_eq!(
        result.children[0].find_descendant("field").unwrap().text.as_deref(),
        Some("Account.Industry")
    );
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let temp = TempDir::new().unwrap();
    let composed_path = temp.path().join("profiles/Admin.profile-meta.xml");
    write(&composed_path, PROFILE);

    let config = Config::default();
    let registry = registry(&config);
    decompose(&registry, "profile", temp.path()).unwrap();
    compose(&registry, "profile", temp.path(), &config.namespace).unwrap();
    let first = fs::read(&composed_path).unwrap();

    decompose(&registry, "profile", temp.path()).unwrap();
    compose(&registry, "profile", temp.path(), &config.namespace).unwrap();
    let second = fs::read(&composed_path).unwrap();

    assert_eq!(first, second);
    assert!(!first.ends_with(b"\n"));
}

#[test]
fn test_labels_compose_exact_output() {
    let temp = TempDir::new().unwrap();
    let canonical = temp.path().join("labels/CustomLabels.labels-meta.xml");
    write(&canonical, LABELS);

    let config = Config::default();
    let registry = registry(&config);
    let report = decompose(&registry, "labels", temp.path()).unwrap();
    assert_eq!(report.fragments_written, 2);
    assert!(temp.path().join("labels/Greeting.label-meta.xml").is_file());
    assert!(temp.path().join("labels/Farewell.label-meta.xml").is_file());

    compose(&registry, "labels", temp.path(), &config.namespace).unwrap();
    let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<CustomLabels xmlns=\"http://soap.sforce.com/2006/04/metadata\">
    <labels>
        <fullName>Farewell</fullName>
        <language>en_US</language>
        <protected>false</protected>
        <shortDescription>Farewell</shortDescription>
        <value>Bye</value>
    </labels>
    <labels>
        <fullName>Greeting</fullName>
        <language>en_US</language>
        <protected>false</protected>
        <shortDescription>Greeting</shortDescription>
        <value>Hi</value>
    </labels>
</CustomLabels>";
    assert_eq!(fs::read_to_string(&canonical).unwrap(), expected);
}

#[test]
fn test_deleted_fragment_stays_deleted() {
    let temp = TempDir::new().unwrap();
    let canonical = temp.path().join("labels/CustomLabels.labels-meta.xml");
    write(&canonical, LABELS);

    let config = Config::default();
    let registry = registry(&config);
    decompose(&registry, "labels", temp.path()).unwrap();
    fs::remove_file(temp.path().join("labels/Farewell.label-meta.xml")).unwrap();

    compose(&registry, "labels", temp.path(), &config.namespace).unwrap();
    let result = parse_file(&canonical).unwrap();
    assert_eq!(result.children.len(), 1);
    assert_eq!(
        result.children[0].find_descendant("fullName").unwrap().text.as_deref(),
        Some("Greeting")
    );
}

#[test]
fn test_grouped_layout() {
    let temp = TempDir::new().unwrap();
    write(&temp.path().join("profiles/Sales/Admin.profile-meta.xml"), PROFILE);

    let mut config = Config::default();
    config.metadata.get_mut("profile").unwrap().grouped = true;
    let registry = registry(&config);

    decompose(&registry, "profile", temp.path()).unwrap();
    assert!(
        temp.path()
            .join("profiles/Sales/Admin/tabVisibilities/standard-Account.tabVisibilities-meta.xml")
            .is_file()
    );
    assert!(temp.path().join("profiles/Sales/Admin/Admin.profile-meta.xml").is_file());

    let report = compose(&registry, "profile", temp.path(), &config.namespace).unwrap();
    assert_eq!(
        report.written,
        vec![temp.path().join("profiles/Sales/Admin.profile-meta.xml")]
    );
}

#[test]
fn test_all_types_in_one_pass() {
    let temp = TempDir::new().unwrap();
    write(&temp.path().join("profiles/Admin.profile-meta.xml"), PROFILE);
    write(&temp.path().join("labels/CustomLabels.labels-meta.xml"), LABELS);
    write(
        &temp.path().join("workflows/Case.workflow-meta.xml"),
        r#"<Workflow xmlns="http://soap.sforce.com/2006/04/metadata">
    <rules>
        <fullName>Escalate</fullName>
        <active>true</active>
        <criteriaItems>
            <field>Case.Priority</field>
            <operation>equals</operation>
            <value>High</value>
        </criteriaItems>
    </rules>
</Workflow>"#,
    );

    let config = Config::default();
    let registry = registry(&config);
    let decomposed = decompose_all(&registry, temp.path()).unwrap();
    assert_eq!(decomposed.documents, 3);

    // Nested `field` must not win over the record's own fullName.
    assert!(
        temp.path()
            .join("workflows/Case/rules/Escalate.rules-meta.xml")
            .is_file()
    );

    let composed = compose_all(&registry, temp.path(), &config.namespace).unwrap();
    assert_eq!(composed.families_written, 3);
}

#[test]
fn test_unkeyable_records_are_not_written() {
    let temp = TempDir::new().unwrap();
    write(
        &temp.path().join("profiles/Admin.profile-meta.xml"),
        r#"<Profile xmlns="http://soap.sforce.com/2006/04/metadata">
    <loginHours>
        <mondayEnd>1020</mondayEnd>
        <mondayStart>480</mondayStart>
    </loginHours>
    <custom>true</custom>
</Profile>"#,
    );

    let config = Config::default();
    let registry = registry(&config);
    let report = decompose(&registry, "profile", temp.path()).unwrap();
    assert_eq!(report.unkeyable_skipped, 1);
    assert_eq!(report.fragments_written, 0);
    assert!(!temp.path().join("profiles/Admin/loginHours").exists());
}

#[test]
fn test_canonical_baseline_field_kept_once() {
    let temp = TempDir::new().unwrap();
    write(
        &temp
            .path()
            .join("permissionsets/Ops/tabSettings/Home.tabSettings-meta.xml"),
        "<tabSettings><tab>Home</tab><visibility>Visible</visibility></tabSettings>",
    );
    let canonical = temp.path().join("permissionsets/Ops.permissionset-meta.xml");
    write(
        &canonical,
        r#"<PermissionSet xmlns="http://soap.sforce.com/2006/04/metadata">
    <customSetting>on</customSetting>
</PermissionSet>"#,
    );

    let config = Config::default();
    let registry = registry(&config);
    for _ in 0..2 {
        compose(&registry, "permissionset", temp.path(), &config.namespace).unwrap();
        let composed = fs::read_to_string(&canonical).unwrap();
        assert_eq!(composed.matches("<customSetting>on</customSetting>").count(), 1);
        assert!(composed.contains("<tab>Home</tab>"));
    }
}

#[test]
fn test_unkeyable_record_survives_compose_with_or_without_scalars() {
    for scalar in ["", "<custom>false</custom>"] {
        let temp = TempDir::new().unwrap();
        let canonical = temp.path().join("profiles/Admin.profile-meta.xml");
        write(
            &canonical,
            &format!(
                r#"<Profile xmlns="http://soap.sforce.com/2006/04/metadata">
    {scalar}
    <loginHours>
        <mondayEnd>1020</mondayEnd>
    </loginHours>
    <tabVisibilities>
        <tab>Home</tab>
        <visibility>DefaultOn</visibility>
    </tabVisibilities>
</Profile>"#
            ),
        );

        let config = Config::default();
        let registry = registry(&config);
        decompose(&registry, "profile", temp.path()).unwrap();
        compose(&registry, "profile", temp.path(), &config.namespace).unwrap();

        let result = parse_file(&canonical).unwrap();
        let login_hours = result.children.iter().filter(|c| c.tag == "loginHours").count();
        assert_eq!(login_hours, 1, "scalar fields: {scalar:?}");
    }
}

#[test]
fn test_removing_every_record_of_a_tag_restores_it_for_any_shape() {
    let cases = [
        (
            "workflows/Case.workflow-meta.xml",
            "workflow",
            r#"<Workflow xmlns="http://soap.sforce.com/2006/04/metadata">
    <alerts>
        <fullName>Notify</fullName>
        <protected>false</protected>
    </alerts>
    <rules>
        <fullName>Escalate</fullName>
        <active>true</active>
    </rules>
</Workflow>"#,
            "workflows/Case/alerts/Notify.alerts-meta.xml",
        ),
        (
            "profiles/Admin.profile-meta.xml",
            "profile",
            r#"<Profile xmlns="http://soap.sforce.com/2006/04/metadata">
    <custom>false</custom>
    <alerts>
        <fullName>Notify</fullName>
        <protected>false</protected>
    </alerts>
    <tabVisibilities>
        <tab>Home</tab>
        <visibility>DefaultOn</visibility>
    </tabVisibilities>
</Profile>"#,
            "profiles/Admin/alerts/Notify.alerts-meta.xml",
        ),
    ];

    for (document, type_id, content, fragment) in cases {
        let temp = TempDir::new().unwrap();
        let canonical = temp.path().join(document);
        write(&canonical, content);

        let config = Config::default();
        let registry = registry(&config);
        decompose(&registry, type_id, temp.path()).unwrap();
        fs::remove_file(temp.path().join(fragment)).unwrap();
        compose(&registry, type_id, temp.path(), &config.namespace).unwrap();

        let composed = fs::read_to_string(&canonical).unwrap();
        assert_eq!(
            composed.matches("<fullName>Notify</fullName>").count(),
            1,
            "type {type_id}"
        );
    }
}
