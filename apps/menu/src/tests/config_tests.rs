use super::*;

use std::collections::HashMap;

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn keeps_memory_and_full_urls() {
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(
        normalize_database_url("sqlite://./data/menu.db"),
        "sqlite://./data/menu.db"
    );
    assert_eq!(
        normalize_database_url("  "),
        Settings::default().database_url
    );
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
database_url = "sqlite://./tmp/other.db"
base_url = "https://cdn.example.test/"
catalog_path = "fixtures/catalog.json"
"#,
    )
    .expect("parse");

    assert_eq!(settings.database_url, "sqlite://./tmp/other.db");
    assert_eq!(settings.base_url, "https://cdn.example.test/");
    assert_eq!(settings.log_filter, "info");
    assert_eq!(
        settings.catalog_path,
        Some(PathBuf::from("fixtures/catalog.json"))
    );
}

#[test]
fn malformed_file_is_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file_overrides(&mut settings, "database_url = [").is_err());
    assert_eq!(settings, Settings::default());
}

#[test]
fn prefixed_env_wins_over_plain_env() {
    let env: HashMap<&str, &str> = [
        ("DATABASE_URL", "sqlite://plain.db"),
        ("APP__DATABASE_URL", "sqlite://prefixed.db"),
        ("APP__LOG_FILTER", "debug,sqlx=warn"),
    ]
    .into_iter()
    .collect();

    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.database_url, "sqlite://prefixed.db");
    assert_eq!(settings.log_filter, "debug,sqlx=warn");
    assert_eq!(settings.base_url, Settings::default().base_url);
}

#[test]
fn explicit_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("absent.toml");
    let err = load_settings(Some(&missing)).expect_err("missing file");
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("menu.toml");
    std::fs::write(&path, "base_url = \"http://files.test/\"\n").expect("write");

    let settings = load_settings(Some(&path)).expect("settings");
    // Environment may override base_url on a developer machine.
    if std::env::var("MENU_BASE_URL").is_err() && std::env::var("APP__BASE_URL").is_err() {
        assert_eq!(settings.base_url, "http://files.test/");
    }
}
