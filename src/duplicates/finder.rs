//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Phase 1 - Size grouping**: `stat` every file and bucket by exact size
//! 2. **Phase 2 - Full hash**: hash every member of a bucket holding two or
//!    more files and re-partition by `(size, digest)`
//!
//! Only partitions with at least two members are emitted. A file that cannot
//! be stat'ed or hashed is reported as a warning and left out; it never
//! aborts the run. Everything runs sequentially on the calling thread.
//!
//! Digest equality is treated as content equality: there is no byte-by-byte
//! confirmation step. Choose a stronger [`HashAlgorithm`] to make collisions
//! impractical rather than relying on size or timestamp heuristics.
//!
//! # Example
//!
//! ```no_run
//! use dedoopsie::duplicates::{DuplicateFinder, FinderConfig};
//! use dedoopsie::scanner::{scan, WalkerConfig};
//! use std::path::Path;
//!
//! let report = scan(Path::new("."), &WalkerConfig::default()).unwrap();
//! let finder = DuplicateFinder::new(FinderConfig::default().with_verbose(true));
//! let (groups, summary) = finder.find_duplicates(report.files);
//!
//! println!("{} groups, {} bytes reclaimable", groups.len(), summary.reclaimable_space);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::groups::{group_by_size, DuplicateGroup, GroupKey, OrderedBuckets, SizeBuckets};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_SCANNING, PHASE_SIZING};
use crate::scanner::{self, HashAlgorithm, Hasher, ScanError, WalkerConfig, DEFAULT_CHUNK_SIZE};

/// How often the sizing phase logs a progress line.
const SIZING_LOG_INTERVAL: usize = 500;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Digest algorithm used in Phase 2.
    pub algorithm: HashAlgorithm,
    /// Read chunk size for hashing.
    pub chunk_size: usize,
    /// Emit a notification for every successfully hashed file.
    pub verbose: bool,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("algorithm", &self.algorithm)
            .field("chunk_size", &self.chunk_size)
            .field("verbose", &self.verbose)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            verbose: false,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Select the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the read chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Enable per-file hash notifications.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a duplicate search.
#[derive(Debug, Default)]
pub struct FinderSummary {
    /// Number of files handed to the finder
    pub total_files: usize,
    /// Total size of all files that could be stat'ed
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of files hashed successfully
    pub hashed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Number of redundant copies (excluding one keeper per group)
    pub duplicate_files: usize,
    /// Bytes freed if every redundant copy were relocated
    pub reclaimable_space: u64,
    /// Duration of the search
    pub duration: Duration,
    /// Files skipped because they could not be stat'ed or hashed
    pub warnings: Vec<ScanError>,
}

impl FinderSummary {
    /// Whether any file was skipped.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Errors that abort a duplicate search entirely.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Any other failure on the scan root.
    #[error(transparent)]
    ScanError(ScanError),
}

impl From<ScanError> for FinderError {
    fn from(error: ScanError) -> Self {
        match error {
            ScanError::NotFound(path) => Self::PathNotFound(path),
            ScanError::NotADirectory(path) => Self::NotADirectory(path),
            other => Self::ScanError(other),
        }
    }
}

/// Duplicate finder that runs the two-phase detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dedoopsie::duplicates::DuplicateFinder;
/// use dedoopsie::scanner::WalkerConfig;
/// use std::path::Path;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates_in(Path::new("."), &WalkerConfig::default()) {
///     Ok((groups, summary)) => {
///         println!("Found {} duplicate groups", groups.len());
///         println!("Can reclaim {} bytes", summary.reclaimable_space);
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::new()
            .with_algorithm(config.algorithm)
            .with_chunk_size(config.chunk_size);
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Scan `root` and group the files found beneath it.
    ///
    /// Entries skipped during the walk are merged into the summary warnings.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::PathNotFound`] or [`FinderError::NotADirectory`]
    /// if the root cannot be scanned.
    pub fn find_duplicates_in(
        &self,
        root: &Path,
        walker_config: &WalkerConfig,
    ) -> Result<(Vec<DuplicateGroup>, FinderSummary), FinderError> {
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_start(PHASE_SCANNING, 0);
        }
        let report = scanner::scan(root, walker_config);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_end(PHASE_SCANNING);
        }
        let report = report?;

        let (groups, mut summary) = self.find_duplicates(report.files);
        let mut warnings = report.warnings;
        warnings.append(&mut summary.warnings);
        summary.warnings = warnings;
        Ok((groups, summary))
    }

    /// Group `files` into confirmed duplicate sets.
    ///
    /// Groups appear in the order their `(size, digest)` key was first
    /// produced, and members keep their encounter order.
    pub fn find_duplicates(&self, files: Vec<PathBuf>) -> (Vec<DuplicateGroup>, FinderSummary) {
        let start_time = Instant::now();
        let mut summary = FinderSummary {
            total_files: files.len(),
            ..Default::default()
        };

        let buckets = self.phase1_size(files, &mut summary);
        summary.eliminated_by_size = buckets.singleton_count();
        log::debug!(
            "Phase 1 complete: {} sizes, {} files eliminated",
            buckets.len(),
            summary.eliminated_by_size
        );

        let groups = self.phase2_hash(buckets, &mut summary);

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::reclaimable_space).sum();
        summary.duration = start_time.elapsed();

        log::info!(
            "Found {} duplicate groups ({} redundant files, {} bytes reclaimable)",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_space
        );

        (groups, summary)
    }

    /// Phase 1: bucket files by exact size.
    fn phase1_size(&self, files: Vec<PathBuf>, summary: &mut FinderSummary) -> SizeBuckets {
        let total = files.len();
        log::info!("Reading sizes of {} files...", total);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_start(PHASE_SIZING, total);
        }

        let mut sized = Vec::with_capacity(total);
        for (i, path) in files.into_iter().enumerate() {
            let current = i + 1;
            match fs::metadata(&path) {
                Ok(metadata) => {
                    summary.total_size += metadata.len();
                    if let Some(ref cb) = self.config.progress_callback {
                        cb.on_progress(current, &path.to_string_lossy());
                    }
                    sized.push((metadata.len(), path));
                }
                Err(e) => {
                    log::warn!("Could not stat {}: {}", path.display(), e);
                    summary.warnings.push(ScanError::from_io(&path, e));
                }
            }
            if current % SIZING_LOG_INTERVAL == 0 {
                log::debug!("Processed {} files...", current);
            }
        }

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_end(PHASE_SIZING);
        }
        group_by_size(sized)
    }

    /// Phase 2: hash same-size candidates and keep `(size, digest)` matches.
    fn phase2_hash(&self, buckets: SizeBuckets, summary: &mut FinderSummary) -> Vec<DuplicateGroup> {
        let total: usize = buckets.candidates().map(|(_, files)| files.len()).sum();
        log::info!(
            "Computing {} hashes with {}...",
            total,
            self.hasher.algorithm()
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_start(PHASE_HASHING, total);
        }

        let mut by_content: OrderedBuckets<GroupKey> = OrderedBuckets::default();
        let mut current = 0;

        for (size, files) in buckets.into_buckets() {
            if files.len() < 2 {
                continue;
            }
            for path in files {
                current += 1;
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_progress(current, &path.to_string_lossy());
                }

                match self.hasher.hash_file(&path) {
                    Ok(digest) => {
                        summary.hashed_files += 1;
                        if self.config.verbose {
                            log::info!("Hashed {}", path.display());
                        }
                        by_content.insert(GroupKey { size, digest }, path);
                    }
                    Err(e) => {
                        log::warn!("Could not hash {}: {}", path.display(), e);
                        summary.warnings.push(ScanError::HashError(e));
                    }
                }
            }
        }

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_end(PHASE_HASHING);
        }

        by_content
            .into_inner()
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|(key, files)| DuplicateGroup::new(key.size, key.digest, files))
            .collect()
    }
}

/// Group `files` with the default algorithm.
///
/// Files that cannot be stat'ed or hashed are logged and excluded.
/// `verbose` only controls per-file hash notifications.
#[must_use]
pub fn find_duplicates(files: Vec<PathBuf>, verbose: bool) -> Vec<DuplicateGroup> {
    DuplicateFinder::new(FinderConfig::default().with_verbose(verbose))
        .find_duplicates(files)
        .0
}
