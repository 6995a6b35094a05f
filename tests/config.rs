use todosync::config::Config;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.server.bind_address, "127.0.0.1:3000");
    assert_eq!(config.client.server_url, "http://127.0.0.1:3000");
    assert_eq!(config.sync.project_poll_interval_ms, 5000);
    assert_eq!(config.sync.todo_poll_interval_ms, 2000);
    assert!(config.logging.enabled);
    assert_eq!(config.logging.level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();

    config.sync.todo_poll_interval_ms = 10;
    assert!(config.validate().is_err());

    config = Config::default();
    config.ui.sidebar_width = 10;
    assert!(config.validate().is_err());

    config = Config::default();
    config.server.bind_address = "not an address".to_string();
    assert!(config.validate().is_err());

    config = Config::default();
    config.client.server_url = "ftp://example.com".to_string();
    assert!(config.validate().is_err());

    config = Config::default();
    config.logging.level = "chatty".to_string();
    assert!(config.validate().is_err());

    // an invalid level does not matter once logging is off
    config.logging.enabled = false;
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_config_deserialization() {
    let partial_toml = r#"
[sync]
todo_poll_interval_ms = 500

[logging]
level = "debug"
"#;

    let config: Config = toml::from_str(partial_toml).unwrap();

    // Check that specified values are used
    assert_eq!(config.sync.todo_poll_interval_ms, 500);
    assert_eq!(config.logging.level, "debug");

    // Check that unspecified values use defaults
    assert_eq!(config.sync.project_poll_interval_ms, 5000);
    assert_eq!(config.server.database_url, "sqlite://todosync.db?mode=rwc");
    assert!(config.logging.file.is_none());
}

#[test]
fn test_generated_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    Config::generate_default_config(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# todosync Configuration File"));

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded, Config::default());
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[sync]\nproject_poll_interval_ms = 1\n").unwrap();

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("project_poll_interval_ms"));
}
