mod common;

use uisync::codec::MissingReferencePolicy;
use uisync::config::{Config, ConfigError, ConfigStore};

/// Test that Config::default() produces the documented values.
#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.session.default_poll_interval_ms, 500);
    assert_eq!(config.session.character_encoding, "UTF-8");
    assert_eq!(config.session.servlet_uri, "/app");
    assert_eq!(config.codec.missing_reference, MissingReferencePolicy::Null);
    assert!(!config.codec.accept_unknown_components);
    assert_eq!(config.codec.max_depth, 256);
    assert_eq!(config.codec.max_property_index, 4096);
    assert_eq!(config.logging.filter, "info");
    assert!(config.logging.file.is_none());
}

#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("uisync/config.toml"));
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

/// Partial files fill the gaps from defaults.
#[test]
fn test_partial_file_is_merged_with_defaults() {
    let (_dir, path) = common::temp_config(
        r#"
[session]
default_poll_interval_ms = 250

[codec]
missing_reference = "fail"
"#,
    );

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.session.default_poll_interval_ms, 250);
    assert_eq!(config.session.servlet_uri, "/app");
    assert_eq!(config.codec.missing_reference, MissingReferencePolicy::Fail);
    assert_eq!(config.logging.filter, "info");
}

#[test]
fn test_validation_fails_for_zero_poll_interval() {
    let (_dir, path) = common::temp_config("[session]\ndefault_poll_interval_ms = 0\n");

    match Config::load_from(&path).unwrap_err() {
        ConfigError::ValidationError { message } => {
            assert!(message.contains("default_poll_interval_ms"));
        }
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

#[test]
fn test_validation_fails_for_zero_max_depth() {
    let (_dir, path) = common::temp_config("[codec]\nmax_depth = 0\n");

    match Config::load_from(&path).unwrap_err() {
        ConfigError::ValidationError { message } => {
            assert!(message.contains("codec.max_depth"));
        }
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let (_dir, path) = common::temp_config("[session\nbroken");
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_store_reload_picks_up_changes() {
    let (_dir, path) = common::temp_config("[session]\nservlet_uri = \"/one\"\n");
    let store = ConfigStore::new(Config::load_from(&path).unwrap(), path.clone());
    assert_eq!(store.get().session.servlet_uri, "/one");

    std::fs::write(&path, "[session]\nservlet_uri = \"/two\"\n").unwrap();
    store.reload().unwrap();
    assert_eq!(store.get().session.servlet_uri, "/two");
    assert_eq!(store.path(), path.as_path());
}
