use super::*;
use tempfile::{tempdir, TempDir};
use std::fs::File;
use std::io::Write;

/// Helper function to create a test configuration file
fn create_test_config_file(dir: &TempDir, content: &str) -> PathBuf {
    let config_path = dir.path().join("config.toml");
    let mut file = File::create(&config_path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    config_path
}

fn sample_config() -> Config {
    Config {
        database_url: "original.db".to_string(),
        bind_address: "127.0.0.1:4000".to_string(),
        default_queue_limit: 10,
        max_queue_limit: 50,
        session_ttl_minutes: 15,
        log_json: false,
        log_dir: None,
    }
}

fn empty_args() -> CliArgs {
    CliArgs {
        database_url: None,
        bind_address: None,
        default_queue_limit: None,
        max_queue_limit: None,
        session_ttl_minutes: None,
        log_dir: None,
        log_json: false,
        debug: false,
    }
}

/// Tests for Config::apply_update
#[test]
fn test_apply_update_with_all_values() {
    let update = ConfigUpdate {
        database_url: Some("updated.db".to_string()),
        bind_address: Some("0.0.0.0:8080".to_string()),
        default_queue_limit: Some(25),
        max_queue_limit: Some(200),
        session_ttl_minutes: Some(90),
        log_json: Some(true),
        log_dir: Some("/var/log/recall".to_string()),
        server_url: Some("http://ignored".to_string()),
    };

    let updated = sample_config().apply_update(update);

    assert_eq!(updated.database_url, "updated.db");
    assert_eq!(updated.bind_address, "0.0.0.0:8080");
    assert_eq!(updated.default_queue_limit, 25);
    assert_eq!(updated.max_queue_limit, 200);
    assert_eq!(updated.session_ttl_minutes, 90);
    assert!(updated.log_json);
    assert_eq!(updated.log_dir, Some("/var/log/recall".to_string()));
}


#[test]
fn test_apply_update_with_partial_values() {
    let update = ConfigUpdate {
        database_url: Some("updated.db".to_string()),
        max_queue_limit: Some(75),
        ..Default::default()
    };

    let updated = sample_config().apply_update(update);

    assert_eq!(updated.database_url, "updated.db");
    assert_eq!(updated.max_queue_limit, 75);
    assert_eq!(updated.default_queue_limit, 10); // Unchanged
    assert_eq!(updated.bind_address, "127.0.0.1:4000"); // Unchanged
}


#[test]
fn test_apply_update_with_no_values() {
    let updated = sample_config().apply_update(ConfigUpdate::default());

    assert_eq!(updated, sample_config());
}


#[test]
fn test_session_ttl_conversion() {
    let config = sample_config();

    assert_eq!(config.session_ttl(), chrono::Duration::minutes(15));
}


#[test]
fn test_zero_session_ttl_never_expires() {
    let config = Config { session_ttl_minutes: 0, ..sample_config() };

    assert_eq!(config.session_ttl(), chrono::Duration::MAX);
}


#[test]
fn test_session_ttl_saturates() {
    let config = Config { session_ttl_minutes: u64::MAX, ..sample_config() };

    assert!(config.session_ttl() > chrono::Duration::days(365));
}


/// Tests for base_config
#[test]
fn test_base_config_defaults() {
    let config = base_config(None);

    assert_eq!(config.database_url, "recall.db");
    assert_eq!(config.bind_address, "0.0.0.0:3000");
    assert_eq!(config.default_queue_limit, 20);
    assert_eq!(config.max_queue_limit, 100);
    assert_eq!(config.session_ttl_minutes, 60);
    assert!(!config.log_json);
    assert!(config.log_dir.is_none());
}


#[test]
fn test_base_config_with_path() {
    let temp_dir = tempdir().unwrap();
    let config = base_config(Some(temp_dir.path().to_path_buf()));

    let expected_db_path = temp_dir.path().join("recall.db").to_string_lossy().to_string();
    let expected_log_dir = temp_dir.path().join("logs").to_string_lossy().to_string();
    assert_eq!(config.database_url, expected_db_path);
    assert_eq!(config.log_dir, Some(expected_log_dir));
    assert_eq!(config.default_queue_limit, 20);
}


/// Tests for config_from_args
#[test]
fn test_config_from_args_with_all_values() {
    let args = CliArgs {
        database_url: Some("args.db".to_string()),
        bind_address: Some("127.0.0.1:9000".to_string()),
        default_queue_limit: Some(5),
        max_queue_limit: Some(10),
        session_ttl_minutes: Some(30),
        log_dir: Some("logs".to_string()),
        log_json: true,
        debug: true,
    };

    let update = config_from_args(args);

    assert_eq!(update.database_url, Some("args.db".to_string()));
    assert_eq!(update.bind_address, Some("127.0.0.1:9000".to_string()));
    assert_eq!(update.default_queue_limit, Some(5));
    assert_eq!(update.max_queue_limit, Some(10));
    assert_eq!(update.session_ttl_minutes, Some(30));
    assert_eq!(update.log_dir, Some("logs".to_string()));
    assert_eq!(update.log_json, Some(true));
    assert_eq!(update.server_url, None);
}


#[test]
fn test_config_from_args_with_no_values() {
    let update = config_from_args(empty_args());

    // an unset --log-json flag must not override a file setting
    assert_eq!(update, ConfigUpdate::default());
}


/// Tests for config_from_file - successful cases
#[test]
fn test_config_from_file_with_no_path() {
    let update = config_from_file(None).unwrap();

    assert_eq!(update, ConfigUpdate::default());
}


#[test]
fn test_config_from_file_with_valid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_content = r#"
        database_url = "file.db"
        default_queue_limit = 30
        max_queue_limit = 60
        log_json = true
        server_url = "http://localhost:4000"
    "#;

    let config_path = create_test_config_file(&temp_dir, config_content);

    let result = config_from_file(Some(config_path));

    assert!(result.is_ok(), "Failed to parse config file: {}", result.err().unwrap());
    let update = result.unwrap();
    assert_eq!(update.database_url, Some("file.db".to_string()));
    assert_eq!(update.default_queue_limit, Some(30));
    assert_eq!(update.max_queue_limit, Some(60));
    assert_eq!(update.log_json, Some(true));
    assert_eq!(update.server_url, Some("http://localhost:4000".to_string()));
    assert_eq!(update.bind_address, None);
}


/// Tests for config_from_file - failure cases
#[test]
fn test_config_from_file_with_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_content = r#"
        database_url = "file.db"
        default_queue_limit = "not a number" # Type error
    "#;

    let config_path = create_test_config_file(&temp_dir, config_content);

    let result = config_from_file(Some(config_path));

    assert!(result.is_err());
}


#[test]
fn test_config_from_file_with_nonexistent_file() {
    let temp_dir = tempdir().unwrap();
    let nonexistent_path = temp_dir.path().join("nonexistent_config.toml");

    let update = config_from_file(Some(nonexistent_path)).unwrap();

    assert_eq!(update, ConfigUpdate::default());
}


/// Tests for the full precedence chain
#[test]
fn test_get_config_precedence() {
    let args = CliArgs {
        database_url: Some("args.db".to_string()),
        ..empty_args()
    };

    let file_config = ConfigUpdate {
        database_url: Some("file.db".to_string()),
        max_queue_limit: Some(40),
        ..Default::default()
    };

    let config = base_config(None)
        .apply_update(file_config)
        .apply_update(config_from_args(args));

    assert_eq!(config.database_url, "args.db"); // From args
    assert_eq!(config.max_queue_limit, 40); // From file
    assert_eq!(config.default_queue_limit, 20); // From base
}
