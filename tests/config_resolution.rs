//! Config Resolution Integration Tests
//!
//! Drives `ConfigResolver` against real home and working directories and
//! checks the merged result feeds the coordinator.

use std::fs;
use std::path::Path;

use params2env::commands::{run_read, ReadArgs};
use params2env::config::{ConfigOrigin, CONFIG_FILE_NAME};
use params2env::store::MemoryFactory;
use params2env::{ConfigError, ConfigResolver, ParameterOperationCoordinator};

// =============================================================================
// Test Helpers
// =============================================================================

fn write_config(dir: &Path, content: &str) {
    fs::write(dir.join(CONFIG_FILE_NAME), content).unwrap();
}

// =============================================================================
// Precedence
// =============================================================================

#[test]
fn test_local_overrides_home_field_by_field() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_config(home.path(), "region: eu-west-1\nrole: arn:aws:iam::123456789012:role/reader\n");
    write_config(work.path(), "region: us-east-1\n");

    let config = ConfigResolver::new(Some(home.path().to_path_buf()), work.path())
        .resolve()
        .unwrap();

    assert_eq!(config.region(), Some("us-east-1"));
    assert_eq!(config.role(), Some("arn:aws:iam::123456789012:role/reader"));
}

#[test]
fn test_sources_report_both_files_in_order() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_config(home.path(), "region: eu-west-1\n");
    write_config(work.path(), "replica: us-west-2\n");

    let resolved = ConfigResolver::new(Some(home.path().to_path_buf()), work.path())
        .resolve_with_sources()
        .unwrap();

    let origins: Vec<_> = resolved.sources.iter().map(|s| s.origin).collect();
    assert_eq!(origins, vec![ConfigOrigin::Home, ConfigOrigin::Local]);
    assert_eq!(resolved.sources[1].path, work.path().join(CONFIG_FILE_NAME));
}

#[test]
fn test_broken_local_config_is_fatal() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    write_config(home.path(), "region: eu-west-1\n");
    write_config(work.path(), "region: [unterminated\n");

    let err = ConfigResolver::new(Some(home.path().to_path_buf()), work.path())
        .resolve()
        .unwrap_err();

    assert!(matches!(err, ConfigError::Unparseable { .. }));
    assert!(err.to_string().contains(CONFIG_FILE_NAME));
}

#[test]
fn test_config_params_drive_read() {
    let work = tempfile::tempdir().unwrap();
    write_config(
        work.path(),
        "region: us-east-1\nparams:\n  - name: /a/b\n    env: X\n",
    );
    let config = ConfigResolver::new(None, work.path()).resolve().unwrap();
    let factory = MemoryFactory::new().with_parameter("us-east-1", "/a/b", "hello");
    let coordinator = ParameterOperationCoordinator::new(factory, config);

    let mut out: Vec<u8> = Vec::new();
    run_read(&ReadArgs::default(), &coordinator, &mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "export X=\"hello\"\n");
}
