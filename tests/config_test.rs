//! Integration tests for layered Settings loading.
//!
//! These tests only use temp directories for the local layer; they assume no
//! global config file and no QTREE_* variables in the test environment.

use std::fs;

use tempfile::TempDir;

use qtree::application::ApplicationError;
use qtree::config::{local_config_path, Settings};
use qtree::domain::DegeneratePolicy;

#[test]
fn given_no_local_config_when_loading_then_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings, Settings::default());
}

#[test]
fn given_local_config_when_loading_then_overrides_named_values() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
threshold = 5
degenerate = "reject"

[guard]
max_depth = 12

[random]
seed = 1234

[render]
output = "out/tree.svg"
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(dir.path())).expect("load settings");

    // Assert
    assert_eq!(settings.threshold, 5);
    assert_eq!(settings.degenerate, DegeneratePolicy::Reject);
    assert_eq!(settings.guard.max_depth, 12);
    assert_eq!(settings.random.seed, Some(1234));
    assert_eq!(settings.render.output.to_string_lossy(), "out/tree.svg");
    // untouched values keep their defaults
    assert_eq!(settings.guard.min_extent, 1e-9);
    assert_eq!(settings.random.count, 1000);

    let options = settings.build_options();
    assert_eq!(options.threshold, 5);
    assert_eq!(options.max_depth, 12);
}

#[test]
fn given_invalid_toml_when_loading_then_config_error() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "threshold = [not toml").unwrap();

    // Act
    let result = Settings::load(Some(dir.path()));

    // Assert
    match result {
        Err(ApplicationError::Config { message }) => assert!(message.contains(".qtree.toml")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn given_wrong_value_type_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "threshold = \"many\"\n").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_template_written_as_local_config_when_loading_then_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), Settings::template()).unwrap();

    let settings = Settings::load(Some(dir.path())).unwrap();

    assert_eq!(settings, Settings::default());
}
