//! Configuration resolution and graceful degradation tests
//!
//! Tests that touch AGRIX_CONFIG / AGRIX_STORE_URL are marked #[serial] so
//! they never race on the process environment.

use agrix_common::config::{
    load_toml_config, ConfigResolver, ConfigSource, TomlConfig, CONFIG_ENV_VAR, STORE_URL_ENV_VAR,
};
use agrix_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
#[serial]
fn test_cli_path_beats_environment() {
    let dir = TempDir::new().unwrap();
    let cli = write_config(&dir, "cli.toml", "[query]\npage_size = 25\n");
    let from_env = write_config(&dir, "env.toml", "[query]\npage_size = 50\n");
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let (config, source) = ConfigResolver::new(Some(cli.clone())).resolve().unwrap();

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(source, ConfigSource::CommandLine(cli));
    assert_eq!(config.query.page_size, 25);
}

#[test]
#[serial]
fn test_environment_path_used_without_cli() {
    let dir = TempDir::new().unwrap();
    let from_env = write_config(
        &dir,
        "env.toml",
        "[store]\nbase_url = \"http://farm-records:9000/api\"\nbulk_page_size = 100\n",
    );
    env::set_var(CONFIG_ENV_VAR, &from_env);

    let (config, source) = ConfigResolver::new(None).resolve().unwrap();

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(source, ConfigSource::Environment(from_env));
    assert_eq!(config.store.base_url, "http://farm-records:9000/api");
    assert_eq!(config.store.bulk_page_size, 100);
    // Untouched sections keep their defaults
    assert_eq!(config.query.search_debounce_ms, 500);
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let (config, source) = ConfigResolver::new(Some(missing.clone())).resolve().unwrap();

    assert_eq!(source, ConfigSource::CommandLine(missing));
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bad.toml", "[store\nbase_url = ");

    let result = load_toml_config(&path);
    assert!(matches!(result, Err(Error::Toml(_))));
}

#[test]
fn test_invalid_values_rejected_on_resolve() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "zero.toml", "[query]\npage_size = 0\n");

    let result = ConfigResolver::new(Some(path)).resolve();
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_store_url_env_override() {
    env::set_var(STORE_URL_ENV_VAR, "http://env-store/api");

    let mut config = TomlConfig::default();
    config.apply_store_url_override(None);

    env::remove_var(STORE_URL_ENV_VAR);
    assert_eq!(config.store.base_url, "http://env-store/api");
}
