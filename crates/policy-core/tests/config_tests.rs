//! Tests for loading reconciler configuration from disk

use std::fs;

use policy_core::{Error, ReconcilerConfig};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_load_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("reconciler.toml");
    fs::write(
        &path,
        r#"
domain_id = "infra"
verify_after_delete = false

[routing]
default_org_id = "acme"
page_size = 100
"#,
    )
    .unwrap();

    let config = ReconcilerConfig::load(&path).unwrap();
    assert_eq!(config.domain_id, "infra");
    assert!(config.splice_before_delete);
    assert!(!config.verify_after_delete);
    assert_eq!(config.routing.default_org_id, "acme");
    assert_eq!(config.routing.page_size, 100);
}

#[test]
fn test_load_missing_file() {
    let temp = TempDir::new().unwrap();
    let err = ReconcilerConfig::load(&temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::ConfigNotFound { .. }));
}

#[test]
fn test_load_rejects_wrong_types() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("reconciler.toml");
    fs::write(&path, "splice_before_delete = \"yes\"").unwrap();

    let err = ReconcilerConfig::load(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}
