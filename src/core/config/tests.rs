use super::data::{parse_byte_size, path_display, Config};
use super::defaults::{DEFAULT_MAX_DOWNLOAD_SIZE, DEFAULT_SCROLL_THRESHOLD};
use super::io::ConfigError;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.max_download_size(), DEFAULT_MAX_DOWNLOAD_SIZE);
    assert_eq!(config.scroll_threshold(), DEFAULT_SCROLL_THRESHOLD);
}

#[test]
fn test_config_persistence_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        max_download_size: Some(2048),
        editor: Some("nano".to_string()),
        voice_dir: Some(PathBuf::from("/tmp/voice")),
        ..Default::default()
    };
    config.save_to_path(&config_path).expect("save failed");

    let loaded = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(loaded, config);
    assert_eq!(loaded.editor(), "nano");
    assert_eq!(loaded.long_msg_cmd(), "nano {file_path}");
}

#[test]
fn test_human_readable_download_size() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "max_download_size = \"5MB\"\nscroll_threshold = 4\n")
        .expect("write config");

    let config = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(config.max_download_size(), 5 * 1024 * 1024);
    assert_eq!(config.scroll_threshold(), 4);
}

#[test]
fn test_invalid_size_is_a_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "max_download_size = \"lots\"\n").expect("write config");

    let err = Config::load_from_path(&config_path).expect_err("size should not parse");
    assert!(err.to_string().contains("Failed to parse config"));
}

#[test]
fn test_save_reports_unwritable_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").expect("write blocker");

    let err = Config::default()
        .save_to_path(&blocker.join("config.toml"))
        .expect_err("parent is a file");
    assert!(matches!(err, ConfigError::Write { .. }));
    assert!(err.to_string().contains("Failed to write config"));
}

#[test]
fn test_save_overwrites_existing_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "scroll_threshold = 9\n").expect("write config");

    let config = Config {
        scroll_threshold: Some(3),
        ..Default::default()
    };
    config.save_to_path(&config_path).expect("save failed");
    assert_eq!(
        Config::load_from_path(&config_path).expect("load failed").scroll_threshold(),
        3
    );
}

#[test]
fn test_parse_byte_size_units() {
    assert_eq!(parse_byte_size("512"), Some(512));
    assert_eq!(parse_byte_size("300KB"), Some(300 * 1024));
    assert_eq!(parse_byte_size(" 1 gb "), Some(1 << 30));
    assert_eq!(parse_byte_size("10TB"), None);
    assert_eq!(parse_byte_size("MB"), None);
}

#[test]
fn test_long_msg_cmd_override_wins() {
    let config = Config {
        editor: Some("nano".to_string()),
        long_msg_cmd: Some("hx {file_path}".to_string()),
        ..Default::default()
    };
    assert_eq!(config.long_msg_cmd(), "hx {file_path}");
    assert_eq!(config.edit_cmd(), "nano {file_path}");
}

#[cfg(unix)]
#[test]
fn test_path_display_abbreviates_home() {
    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config/termgram/config.toml");
        assert_eq!(path_display(&path), "~/.config/termgram/config.toml");
    }
}
