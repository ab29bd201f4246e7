use dedoopsie::config::{Config, ConfigError};
use dedoopsie::duplicates::KeeperStrategy;
use dedoopsie::scanner::HashAlgorithm;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config = Config::from_figment(&figment).unwrap();

    assert_eq!(config.keeper, KeeperStrategy::First);
    assert_eq!(config.algorithm, HashAlgorithm::Md5);
    assert_eq!(config.chunk_size, 8192);
    assert!(!config.strict);
    assert_eq!(config.quarantine_root, PathBuf::from(".dedoopsie_quarantine"));
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
keeper = "oldest"
algorithm = "blake3"
chunk_size = 65536
strict = true
skip_hidden = true
quarantine_root = "/srv/quarantine"
"#,
    )
    .unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config = Config::from_figment(&figment).unwrap();

    assert_eq!(config.keeper, KeeperStrategy::Oldest);
    assert_eq!(config.algorithm, HashAlgorithm::Blake3);
    assert_eq!(config.chunk_size, 65536);
    assert!(config.strict);
    assert!(config.skip_hidden);
    assert!(!config.follow_symlinks);
    assert_eq!(config.quarantine_root, PathBuf::from("/srv/quarantine"));
}

#[test]
fn test_config_explicit_file_through_load() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(&config_path, "algorithm = \"sha1\"\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(config.algorithm, HashAlgorithm::Sha1);
    assert_eq!(config.keeper, KeeperStrategy::First);
}

#[test]
fn test_config_env_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "keeper = \"oldest\"\nchunk_size = 1024\n").unwrap();

    std::env::set_var("DEDOOPSIE_KEEPER", "newest");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("DEDOOPSIE_").only(&["keeper"]));
    let config = Config::from_figment(&figment);

    std::env::remove_var("DEDOOPSIE_KEEPER");

    let config = config.unwrap();
    assert_eq!(config.keeper, KeeperStrategy::Newest);
    assert_eq!(config.chunk_size, 1024);
}

#[test]
fn test_config_invalid_value_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "keeper = \"biggest\"\n").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));

    assert!(matches!(
        Config::from_figment(&figment),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_config_missing_explicit_file() {
    let temp_dir = tempdir().unwrap();
    let result = Config::load(Some(&temp_dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_config_serializes_to_toml() {
    let config = Config {
        keeper: KeeperStrategy::Longest,
        algorithm: HashAlgorithm::Sha1,
        ..Config::default()
    };

    let content = toml::to_string_pretty(&config).unwrap();

    assert!(content.contains("keeper = \"longest\""));
    assert!(content.contains("algorithm = \"sha1\""));
    assert!(!content.contains("confirm"));
}
