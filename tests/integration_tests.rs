//! Integration tests for configuration loading and device lifecycle.

use maj1428::config::{AppConfig, DEFAULT_USAGE, DEFAULT_USAGE_PAGE};
use maj1428::device::{DeviceBinding, DeviceId, DeviceRegistry};
use maj1428::sink::RecordingSink;
use maj1428::translator::ReportTranslator;
use std::fs;
use std::path::PathBuf;

/// Returns a unique temporary file path for test isolation.
fn get_test_file_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "maj1428_integration_test_{}_{}.toml",
        name,
        std::process::id()
    ));
    path
}

/// Removes a test file if it exists.
fn cleanup_test_file(path: &PathBuf) {
    let _ = fs::remove_file(path);
}

/// Tests configuration save and load cycle preserves data.
#[test]
fn test_config_round_trip() {
    let path = get_test_file_path("round_trip");

    let config = AppConfig {
        device_id: DeviceId::new(0x0430, 0x00A1),
        usage_page: 0x0C,
        usage: 0x01,
        log_level: "debug".to_string(),
    };

    config.save_to_file(&path).expect("Failed to save config");
    let loaded = AppConfig::load_from_file(&path).expect("Failed to load config");

    assert_eq!(config, loaded);

    cleanup_test_file(&path);
}

/// Tests that a missing file is created with defaults.
#[test]
fn test_config_load_or_create() {
    let path = get_test_file_path("load_or_create");
    cleanup_test_file(&path);

    let config = AppConfig::load_or_create(&path).expect("Failed to create config");
    assert!(path.exists());
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.device_id, DeviceId::MAJ1428_SPECIAL_KEYS);

    let content = fs::read_to_string(&path).expect("Failed to read config");
    assert!(content.contains("device_id = \"0430:009B\""));

    // Second call must load the existing file
    let reloaded = AppConfig::load_or_create(&path).expect("Failed to reload config");
    assert_eq!(config, reloaded);

    cleanup_test_file(&path);
}

/// Tests that out-of-range values are corrected on load.
#[test]
fn test_config_validation() {
    let path = get_test_file_path("validation");
    fs::write(
        &path,
        "device_id = \"0430:009b\"\nusage_page = 0\nusage = 0\nlog_level = \"  \"\n",
    )
    .expect("Failed to write config");

    let config = AppConfig::load_from_file(&path).expect("Failed to load config");
    assert_eq!(config.usage_page, DEFAULT_USAGE_PAGE);
    assert_eq!(config.usage, DEFAULT_USAGE);
    assert_eq!(config.log_level, "info");

    cleanup_test_file(&path);
}

/// Tests that malformed files surface as errors.
#[test]
fn test_config_invalid_file() {
    let path = get_test_file_path("invalid");
    fs::write(&path, "device_id = \"0430\"\n").expect("Failed to write config");
    assert!(AppConfig::load_from_file(&path).is_err());

    fs::write(&path, "usage = \"keyboard\"\n").expect("Failed to write config");
    assert!(AppConfig::load_from_file(&path).is_err());

    cleanup_test_file(&path);
}

/// Tests attach/detach of the special keys interface and its sibling devices.
#[test]
fn test_registry_lifecycle() {
    let registry = DeviceRegistry::default();
    let pointer = DeviceId::new(0x0430, 0x0100);

    assert_eq!(
        registry.attach(1, DeviceId::MAJ1428_SPECIAL_KEYS),
        DeviceBinding::Bound(DeviceId::MAJ1428_SPECIAL_KEYS)
    );
    assert_eq!(registry.attach(2, pointer), DeviceBinding::Foreign(pointer));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.bound_count(), 1);

    assert_eq!(
        registry.detach(1),
        Some(DeviceBinding::Bound(DeviceId::MAJ1428_SPECIAL_KEYS))
    );
    assert_eq!(registry.detach(1), None);
    assert_eq!(registry.bound_count(), 0);
    assert_eq!(registry.binding(2), Some(DeviceBinding::Foreign(pointer)));

    registry.clear();
    assert!(registry.is_empty());
}

/// Tests that re-attaching a handle keeps the first classification.
#[test]
fn test_registry_attach_is_idempotent() {
    let registry = DeviceRegistry::new(DeviceId::MAJ1428_SPECIAL_KEYS);
    registry.attach(7, DeviceId::MAJ1428_SPECIAL_KEYS);
    let again = registry.attach(7, DeviceId::new(0x1234, 0x5678));
    assert!(again.is_bound());
    assert_eq!(registry.len(), 1);
}

/// Tests that independent device instances translate independently.
#[test]
fn test_multiple_instances_translate_independently() {
    let registry = DeviceRegistry::default();
    registry.attach(10, DeviceId::MAJ1428_SPECIAL_KEYS);
    registry.attach(11, DeviceId::MAJ1428_SPECIAL_KEYS);
    assert_eq!(registry.bound_count(), 2);

    let translator = ReportTranslator::default();
    let mut first = RecordingSink::new();
    let mut second = RecordingSink::new();

    for (handle, sink) in [(10, &mut first), (11, &mut second)] {
        if registry.binding(handle).is_some_and(|b| b.is_bound()) {
            translator
                .dispatch(&[0, 0, 0xA7, 0, 0, 0, 0, 0], sink)
                .expect("Failed to dispatch");
        }
    }

    assert_eq!(first.events(), second.events());
    assert_eq!(first.events().len(), 2);
}
