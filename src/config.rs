//! Layered application configuration.
//!
//! Settings are merged from, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. A TOML file: `--config FILE`, or `config.toml` in the platform config
//!    directory (e.g. `~/.config/dedoopsie/config.toml`) when it exists
//! 3. Environment variables prefixed with `DEDOOPSIE_` (e.g. `DEDOOPSIE_KEEPER=oldest`)
//! 4. Command-line flags
//!
//! ```toml
//! keeper = "oldest"
//! algorithm = "sha256"
//! chunk_size = 65536
//! strict = true
//! quarantine_root = "/mnt/spare/quarantine"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::duplicates::KeeperStrategy;
use crate::scanner::{HashAlgorithm, DEFAULT_CHUNK_SIZE};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DEDOOPSIE_";

/// Errors raised while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// A provider held a value of the wrong shape.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// A merged value is out of range.
    #[error("invalid configuration: {0}")]
    OutOfRange(String),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keeper selection strategy.
    pub keeper: KeeperStrategy,
    /// Digest algorithm for grouping and verification.
    pub algorithm: HashAlgorithm,
    /// Read chunk size for hashing, in bytes.
    pub chunk_size: usize,
    /// Verify digests before removing a moved file's source.
    pub strict: bool,
    /// Descend into symlinked directories.
    pub follow_symlinks: bool,
    /// Skip dot-files and dot-directories.
    pub skip_hidden: bool,
    /// Parent of the timestamped default move directory.
    pub quarantine_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keeper: KeeperStrategy::First,
            algorithm: HashAlgorithm::Md5,
            chunk_size: DEFAULT_CHUNK_SIZE,
            strict: false,
            follow_symlinks: false,
            skip_hidden: false,
            quarantine_root: PathBuf::from(".dedoopsie_quarantine"),
        }
    }
}

impl Config {
    /// Build the figment for defaults, the config file and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `config_file` is given but missing.
    pub fn figment(config_file: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                log::debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path().filter(|p| p.is_file()) {
                    log::debug!("Loading config from {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extract and validate a configuration from `figment`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed or is out of range.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Config = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults, the config file and `DEDOOPSIE_*` overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or a value is invalid.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment(config_file)?)
    }

    /// Apply command-line flags on top of this configuration.
    #[must_use]
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if let Some(keeper) = cli.keeper {
            self.keeper = keeper;
        }
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(chunk_size) = cli.chunk_size {
            self.chunk_size = chunk_size;
        }
        self.strict |= cli.strict;
        self.follow_symlinks |= cli.follow_symlinks;
        self.skip_hidden |= cli.skip_hidden;
        self
    }

    /// Platform-specific location of `config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dedoopsie").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::OutOfRange(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_extract() {
        let figment = Figment::from(Serialized::defaults(Config::default()));
        let config = Config::from_figment(&figment).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Serialized::default("chunk_size", 0));
        assert!(matches!(
            Config::from_figment(&figment),
            Err(ConfigError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = Config::figment(Some(Path::new("/nonexistent/dedoopsie.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "dedoopsie",
            "/data",
            "--keeper",
            "longest",
            "--algorithm",
            "blake3",
            "--strict",
        ])
        .unwrap();

        let config = Config::default().with_cli_overrides(&cli);
        assert_eq!(config.keeper, KeeperStrategy::Longest);
        assert_eq!(config.algorithm, HashAlgorithm::Blake3);
        assert!(config.strict);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_absent_flags_keep_file_values() {
        let cli = Cli::try_parse_from(["dedoopsie", "/data"]).unwrap();
        let base = Config {
            keeper: KeeperStrategy::Oldest,
            strict: true,
            ..Config::default()
        };
        assert_eq!(base.clone().with_cli_overrides(&cli), base);
    }
}
