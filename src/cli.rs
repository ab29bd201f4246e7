//! Command-line interface definitions for dedoopsie.
//!
//! This module defines all CLI arguments using the clap derive API. Options
//! that also exist in the configuration file are `Option`s (or flags that
//! can only switch a setting on) so an absent flag never masks a value from
//! the file or the environment.
//!
//! # Example
//!
//! ```bash
//! # Dry run: propose moves and write dupes-<timestamp>.csv
//! dedoopsie ~/Downloads
//!
//! # Keep the oldest copy and verify every move
//! DUDE_ARE_YOU_SURE=YES dedoopsie ~/Downloads --wet --yes-really --keeper oldest --strict
//!
//! # Verbose mode for debugging
//! dedoopsie -v ~/Downloads
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::duplicates::KeeperStrategy;
use crate::scanner::HashAlgorithm;

/// Find duplicate files and move the extra copies somewhere safe.
///
/// Runs are dry by default: nothing is touched and every proposed move is
/// written to a CSV log. Wet mode needs `--wet --yes-really` and the
/// environment variable `DUDE_ARE_YOU_SURE=YES`.
#[derive(Debug, Parser)]
#[command(name = "dedoopsie")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source directory to scan for duplicates
    #[arg(value_name = "SRC")]
    pub src: PathBuf,

    /// Directory to move duplicates into
    ///
    /// Defaults to .dedoopsie_quarantine/<YYYYmmdd-HHMMSS>.
    #[arg(long, value_name = "DIR")]
    pub move_dir: Option<PathBuf>,

    /// Enable destructive mode (moves files)
    #[arg(long)]
    pub wet: bool,

    /// Confirm wet mode (the confirmation variable must also be set)
    #[arg(long)]
    pub yes_really: bool,

    /// Path to the CSV audit log
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Which member of each group stays in place
    #[arg(long, value_enum, value_name = "STRATEGY")]
    pub keeper: Option<KeeperStrategy>,

    /// Verify hash match before removing a moved file's source
    #[arg(long)]
    pub strict: bool,

    /// Increase verbosity level (-v for debug and per-file hashes, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Digest algorithm for content comparison
    #[arg(long, value_enum, value_name = "NAME")]
    pub algorithm: Option<HashAlgorithm>,

    /// Read chunk size for hashing (e.g., 8KiB, 1MiB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB
    #[arg(long, value_name = "SIZE", value_parser = parse_chunk_size)]
    pub chunk_size: Option<usize>,

    /// Descend into symlinked directories
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE", env = "DEDOOPSIE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dedoopsie::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("8KiB").unwrap(), 8192);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number
/// or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// Parse a hashing chunk size; zero is rejected.
fn parse_chunk_size(s: &str) -> Result<usize, String> {
    let bytes = parse_size(s)?;
    if bytes == 0 {
        return Err("Chunk size must be at least 1 byte".to_string());
    }
    usize::try_from(bytes).map_err(|_| format!("Chunk size too large: '{s}'"))
}
