//! Keeper selection for duplicate groups.
//!
//! Exactly one member of every [`DuplicateGroup`] is retained in place. The
//! [`KeeperStrategy`] decides which one; every other member is a candidate
//! for relocation. Selection never fails for a non-empty group.
//!
//! # Example
//!
//! ```
//! use dedoopsie::duplicates::{select_keeper_index, KeeperStrategy};
//! use std::path::PathBuf;
//!
//! let files = vec![PathBuf::from("/a/x.txt"), PathBuf::from("/a/deeper/x.txt")];
//! assert_eq!(select_keeper_index(&files, KeeperStrategy::First), 0);
//! assert_eq!(select_keeper_index(&files, KeeperStrategy::Longest), 1);
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::groups::DuplicateGroup;

/// Strategy for choosing which member of a group stays in place.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum KeeperStrategy {
    /// First member in encounter order
    #[default]
    First,
    /// Member with the earliest modification time
    Oldest,
    /// Member with the latest modification time
    Newest,
    /// Member with the longest path
    Longest,
}

impl KeeperStrategy {
    /// Lowercase name as accepted on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Oldest => "oldest",
            Self::Newest => "newest",
            Self::Longest => "longest",
        }
    }
}

impl fmt::Display for KeeperStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown keeper strategy '{0}' (expected first, oldest, newest or longest)")]
pub struct UnknownStrategy(pub String);

impl FromStr for KeeperStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "oldest" => Ok(Self::Oldest),
            "newest" => Ok(Self::Newest),
            "longest" => Ok(Self::Longest),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// Pick an index from optional timestamps.
///
/// Missing timestamps never win against a present one. Ties keep the first
/// candidate; if no timestamp is present the result is `0`. `First` and
/// `Longest` do not look at timestamps and always yield `0` here.
#[must_use]
pub fn select_by_timestamps(times: &[Option<SystemTime>], strategy: KeeperStrategy) -> usize {
    let mut best: Option<(usize, SystemTime)> = None;

    for (i, time) in times.iter().enumerate() {
        let Some(time) = *time else { continue };
        let better = match (strategy, best) {
            (_, None) => true,
            (KeeperStrategy::Oldest, Some((_, current))) => time < current,
            (KeeperStrategy::Newest, Some((_, current))) => time > current,
            (KeeperStrategy::First | KeeperStrategy::Longest, Some(_)) => false,
        };
        if better {
            best = Some((i, time));
        }
    }

    best.map_or(0, |(i, _)| i)
}

/// Index of the member to keep.
///
/// # Panics
///
/// Debug builds assert that `files` is non-empty. Release builds return `0`.
#[must_use]
pub fn select_keeper_index(files: &[PathBuf], strategy: KeeperStrategy) -> usize {
    debug_assert!(!files.is_empty(), "keeper selection on an empty group");

    match strategy {
        KeeperStrategy::First => 0,
        KeeperStrategy::Longest => {
            let mut best = 0;
            let mut best_len = 0;
            for (i, path) in files.iter().enumerate() {
                let len = path.as_os_str().len();
                if i == 0 || len > best_len {
                    best = i;
                    best_len = len;
                }
            }
            best
        }
        KeeperStrategy::Oldest | KeeperStrategy::Newest => {
            let times: Vec<Option<SystemTime>> = files.iter().map(|p| modified(p)).collect();
            select_by_timestamps(&times, strategy)
        }
    }
}

/// The member of `group` to keep in place.
#[must_use]
pub fn select_keeper(group: &DuplicateGroup, strategy: KeeperStrategy) -> &Path {
    &group.files[select_keeper_index(&group.files, strategy)]
}

fn modified(path: &Path) -> Option<SystemTime> {
    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(time) => Some(time),
        Err(e) => {
            log::debug!("No modification time for {}: {}", path.display(), e);
            None
        }
    }
}
