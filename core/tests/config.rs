use schoolhouse_core::core::session::credentials::password_hash_hex;
use schoolhouse_core::types::{AppConfig, AssetConfig, MAX_LOCKOUT_SECS, SessionConfig};
use schoolhouse_core::{SchoolCore, SchoolError};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

mod common;
use common::*;

#[test]
fn test_missing_file_loads_defaults() {
    let tmp = TempDir::new().unwrap();

    let config = AppConfig::load(&AppConfig::path(tmp.path())).unwrap();

    assert!(config.validate().is_empty());
    assert_eq!(config.session.max_failed_attempts, 5);
    assert_eq!(config.assets.max_width, 1920);
    assert_eq!(config.assets.max_height, 1080);
}

#[test]
fn test_save_then_load_keeps_values() {
    let tmp = TempDir::new().unwrap();
    let path = AppConfig::path(tmp.path());

    let mut config = AppConfig::default();
    config.session.lockout_secs = 60;
    config.assets.capacity_mb = 25;
    config.save(&path).unwrap();

    let loaded = AppConfig::load(&path).unwrap();
    assert_eq!(loaded.session.lockout_secs, 60);
    assert_eq!(loaded.assets.capacity_mb, 25);
    assert_eq!(loaded.assets.file_max_mb, 10);
}

#[test]
fn test_partial_file_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = AppConfig::path(tmp.path());
    std::fs::write(&path, "[assets]\nmax_width = 800\n").unwrap();

    let loaded = AppConfig::load(&path).unwrap();

    assert_eq!(loaded.assets.max_width, 800);
    assert_eq!(loaded.assets.max_height, 1080);
    assert_eq!(loaded.session.admin_username, "admin");
}

#[test]
fn test_malformed_file_is_a_parse_error() {
    let tmp = TempDir::new().unwrap();
    let path = AppConfig::path(tmp.path());
    std::fs::write(&path, "[session\nlockout_secs = ").unwrap();

    let result = SchoolCore::open_with_settings(config_for(&tmp), SystemTime::now());

    assert!(matches!(result, Err(SchoolError::Config(_))));
}

#[test]
fn test_runtime_configs_follow_settings() {
    let mut config = AppConfig::default();
    config.session.lockout_secs = 90;
    config.assets.image_max_mb = 4;

    let session = SessionConfig::from(&config.session);
    let assets = AssetConfig::from(&config.assets);

    assert_eq!(session.lockout_duration, Duration::from_secs(90));
    assert_eq!(assets.image_max_bytes, 4 * 1024 * 1024);
    assert_eq!(assets.quality, 0.8);
}

#[test]
fn test_configured_lockout_applies_on_open() {
    let tmp = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.session.max_failed_attempts = 2;
    config.session.lockout_secs = 60;
    config.session.admin_password_blake3 = Some(password_hash_hex(&secret(PASSWORD)));
    config.save(&config_for(&tmp).app_config_path()).unwrap();

    let now = SystemTime::now();
    let mut core = SchoolCore::open_with_settings(config_for(&tmp), now).unwrap();
    core.session_mut().login(ADMIN, &secret("x"), now).unwrap();
    core.session_mut().login(ADMIN, &secret("y"), now).unwrap();

    assert_eq!(core.session().remaining_lockout_secs(now), Some(60));
}

#[test]
fn test_oversized_lockout_is_invalid_and_replaced() {
    let mut config = AppConfig::default();
    config.session.lockout_secs = u64::MAX;

    let problems = config.validate();
    assert_eq!(problems.len(), 1);
    assert!(problems[0].contains("session.lockout_secs"));

    let fixed = config.with_defaults_for_invalid();
    assert_eq!(fixed.session.lockout_secs, 20);
    assert!(fixed.validate().is_empty());

    config.session.lockout_secs = MAX_LOCKOUT_SECS;
    assert!(config.validate().is_empty());
}

#[test]
fn test_huge_megabyte_limits_saturate() {
    let mut config = AppConfig::default();
    config.assets.image_max_mb = u64::MAX;
    config.assets.file_max_mb = u64::MAX / 2;
    config.assets.capacity_mb = u64::MAX;

    let assets = AssetConfig::from(&config.assets);

    assert_eq!(assets.image_max_bytes, u64::MAX);
    assert_eq!(assets.file_max_bytes, u64::MAX);
    assert_eq!(assets.capacity_bytes, u64::MAX);
}

#[test]
fn test_oversized_lockout_in_file_falls_back_on_open() {
    let tmp = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.session.max_failed_attempts = 1;
    // largest value a TOML integer can hold
    config.session.lockout_secs = i64::MAX as u64;
    config.session.admin_password_blake3 = Some(password_hash_hex(&secret(PASSWORD)));
    config.save(&config_for(&tmp).app_config_path()).unwrap();

    let now = SystemTime::now();
    let mut core = SchoolCore::open_with_settings(config_for(&tmp), now).unwrap();

    assert!(!core.session_mut().login(ADMIN, &secret("x"), now).unwrap());
    assert_eq!(core.session().remaining_lockout_secs(now), Some(20));
}
