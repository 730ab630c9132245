use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use fileinventory::config::{Config, ConfigError};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.scan.folder_columns, 3);
    assert!(config.cache.enabled);
    assert!(config.duplicates.use_quick_hash);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[scan]
folder_columns = 5
title_case = false
extensions = "pdf, docx"

[cache]
max_entries = 20

[duplicates]
io_threads = 8
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.scan.folder_columns, 5);
    assert!(!config.scan.title_case);
    assert!(config.scan.include_dates);
    assert_eq!(config.scan_options().extension_filter, vec![".pdf", ".docx"]);
    assert_eq!(config.cache.max_entries, 20);
    assert_eq!(config.cache.max_age_seconds, 604_800);
    assert_eq!(config.detector_config().io_threads, 8);
}

#[test]
fn test_env_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[cache]\nmax_entries = 20\nmax_age_seconds = 60\n").unwrap();

    std::env::set_var("FILEINVENTORY_TEST_CACHE__MAX_ENTRIES", "3");
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("FILEINVENTORY_TEST_").split("__"))
        .extract()
        .unwrap();
    std::env::remove_var("FILEINVENTORY_TEST_CACHE__MAX_ENTRIES");

    assert_eq!(config.cache.max_entries, 3);
    assert_eq!(config.cache.max_age_seconds, 60);
}

#[test]
fn test_load_with_explicit_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[duplicates]\nuse_quick_hash = false\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert!(!config.duplicates.use_quick_hash);
}

#[test]
fn test_invalid_toml_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[scan]\nfolder_columns = \"many\"\n").unwrap();

    let result = Config::load(Some(&config_path));
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn test_save_and_reload() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.scan.extensions = ".pdf".to_string();
    config.cache.max_entries = 4;
    config.save(&config_path).unwrap();

    let reloaded: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();
    assert_eq!(reloaded, config);
}
