//! Directory walker implementation using walkdir for sequential traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting every regular file beneath it. Traversal is strictly
//! sequential; entries within a directory are visited in file-name order so
//! repeated runs over an unchanged tree produce the same sequence.
//!
//! # Features
//!
//! - Symlinks that resolve to regular files are reported as files
//! - Optional descent into symlinked directories
//! - Hidden file filtering
//! - Per-entry failures are yielded as [`ScanError`] values, never abort the walk
//!
//! # Example
//!
//! ```no_run
//! use dedoopsie::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::{ScanError, WalkerConfig};

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dedoopsie::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// ```
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Walk the directory tree, yielding regular file paths.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Directories and special files are skipped.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        let skip_hidden = self.config.skip_hidden;

        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !(skip_hidden && is_hidden(entry)))
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => self.process_entry(&entry),
                Err(e) => Some(Err(self.handle_walkdir_error(e))),
            })
    }

    /// Decide whether a walked entry is a regular file.
    fn process_entry(&self, entry: &DirEntry) -> Option<Result<PathBuf, ScanError>> {
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return None;
        }

        if file_type.is_file() {
            return Some(Ok(entry.path().to_path_buf()));
        }

        if file_type.is_symlink() {
            // A link counts as a file when its target is one.
            return match fs::metadata(entry.path()) {
                Ok(metadata) if metadata.is_file() => Some(Ok(entry.path().to_path_buf())),
                Ok(_) => {
                    log::trace!("Skipping symlink to non-file: {}", entry.path().display());
                    None
                }
                Err(e) => {
                    log::debug!("Skipping dangling symlink {}: {}", entry.path().display(), e);
                    None
                }
            };
        }

        log::trace!("Skipping special file: {}", entry.path().display());
        None
    }

    /// Convert a walkdir error into a [`ScanError`] warning.
    fn handle_walkdir_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if error.loop_ancestor().is_some() {
            log::warn!("Symlink loop detected at {}", path.display());
            return ScanError::Io {
                path,
                source: std::io::Error::other(error.to_string()),
            };
        }

        let scan_error = match error.into_io_error() {
            Some(io_error) => ScanError::from_io(&path, io_error),
            None => ScanError::Io {
                path: path.clone(),
                source: std::io::Error::other("unknown walk error"),
            },
        };
        log::warn!("Skipping inaccessible entry: {}", scan_error);
        scan_error
    }
}

/// Hidden entries are dot-files below the root.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Files discovered by [`scan`], plus the entries that had to be skipped.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Regular files in traversal order
    pub files: Vec<PathBuf>,
    /// Entries that became inaccessible during the walk
    pub warnings: Vec<ScanError>,
}

impl ScanReport {
    /// Whether any entry was skipped.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Recursively collect every regular file under `root`.
///
/// # Errors
///
/// Returns [`ScanError::NotFound`] if `root` does not exist and
/// [`ScanError::NotADirectory`] if it is not a directory. Inaccessible
/// entries below the root are collected into [`ScanReport::warnings`].
pub fn scan(root: &Path, config: &WalkerConfig) -> Result<ScanReport, ScanError> {
    let metadata = fs::metadata(root).map_err(|e| ScanError::from_io(root, e))?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    log::info!("Scanning {}", root.display());
    let walker = Walker::new(root, config.clone());
    let mut report = ScanReport::default();

    for entry in walker.walk() {
        match entry {
            Ok(path) => report.files.push(path),
            Err(e) => report.warnings.push(e),
        }
    }

    log::info!(
        "Found {} files ({} skipped)",
        report.files.len(),
        report.warnings.len()
    );
    Ok(report)
}
