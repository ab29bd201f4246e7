//! Copy-verify-delete relocation of duplicate files.
//!
//! # Overview
//!
//! A relocation moves one duplicate into a destination directory without
//! ever risking its only copy:
//! 1. Pick a free destination name with [`generate_safe_path`]
//! 2. Create the destination exclusively and stream the bytes across
//! 3. Force the data to stable storage
//! 4. Copy permissions and timestamps (best effort)
//! 5. Optionally hash both sides and compare
//! 6. Remove the source
//!
//! The source is removed only after every earlier step succeeded. A failure
//! after the destination was created may leave a partial or unverified copy
//! behind; the source is always intact in that case.
//!
//! Failures never escape as `Err`: [`Relocator::relocate`] returns a
//! [`RelocationResult`] whose outcome carries the attempted destination and
//! a cause, so callers can log every attempt the same way.
//!
//! # Example
//!
//! ```no_run
//! use dedoopsie::actions::safe_move;
//! use std::path::Path;
//!
//! let result = safe_move(Path::new("photos/copy.jpg"), Path::new("quarantine"), true);
//! if result.is_success() {
//!     println!("Moved to {}", result.destination().display());
//! } else {
//!     eprintln!("Kept {}: {}", result.source.display(), result.cause().unwrap_or(""));
//! }
//! ```

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use thiserror::Error;

use crate::scanner::{HashAlgorithm, HashDigest, HashError, Hasher, DEFAULT_CHUNK_SIZE};

/// Width of the zero-padded collision counter.
pub const SAFE_SUFFIX_PADDING: usize = 5;

/// Step of the relocation that hit an I/O failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocateStage {
    /// Opening the source for reading
    OpenSource,
    /// Exclusive creation of the destination
    CreateDestination,
    /// Streaming bytes from source to destination
    Copy,
    /// Flushing the destination to stable storage
    Sync,
    /// Removing the source after a good copy
    RemoveSource,
}

impl fmt::Display for RelocateStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenSource => "open source",
            Self::CreateDestination => "create destination",
            Self::Copy => "copy",
            Self::Sync => "sync",
            Self::RemoveSource => "remove source",
        })
    }
}

/// Error type for relocation steps.
#[derive(Debug, Error)]
pub enum RelocateError {
    /// Source and destination digests differ after the copy.
    #[error("hash mismatch after copy")]
    HashMismatch {
        source_digest: HashDigest,
        destination_digest: HashDigest,
    },

    /// The destination appeared between naming and creation.
    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// An I/O step failed.
    #[error("{stage} failed for {path}: {source}")]
    Io {
        stage: RelocateStage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Verification could not hash one side.
    #[error("verification failed: {0}")]
    Hash(#[from] HashError),

    /// The source path has no final component.
    #[error("source has no file name: {0}")]
    NoFileName(PathBuf),
}

impl RelocateError {
    fn io(stage: RelocateStage, path: &Path, source: io::Error) -> Self {
        Self::Io {
            stage,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// How a relocation attempt ended.
///
/// Both cases carry the destination that was attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationOutcome {
    /// The file now lives at `destination` and the source is gone.
    Success { destination: PathBuf },
    /// The source is still in place.
    Failure { destination: PathBuf, cause: String },
}

/// Result of relocating one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationResult {
    /// File that was asked to move.
    pub source: PathBuf,
    /// Outcome of the attempt.
    pub outcome: RelocationOutcome,
}

impl RelocationResult {
    /// Whether the file was moved.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RelocationOutcome::Success { .. })
    }

    /// Attempted destination, whatever the outcome.
    #[must_use]
    pub fn destination(&self) -> &Path {
        match &self.outcome {
            RelocationOutcome::Success { destination }
            | RelocationOutcome::Failure { destination, .. } => destination,
        }
    }

    /// Failure description, if the move failed.
    #[must_use]
    pub fn cause(&self) -> Option<&str> {
        match &self.outcome {
            RelocationOutcome::Success { .. } => None,
            RelocationOutcome::Failure { cause, .. } => Some(cause),
        }
    }
}

/// Hooks into a relocation. Every method defaults to doing nothing.
pub trait RelocateProgressCallback: Send + Sync {
    /// Called once the destination name is chosen.
    fn on_before_move(&self, _source: &Path, _destination: &Path) {}

    /// Called after the durable copy and metadata step, before verification.
    fn on_copied(&self, _source: &Path, _destination: &Path) {}

    /// Called after the source was removed.
    fn on_move_success(&self, _source: &Path, _destination: &Path) {}

    /// Called when the attempt failed.
    fn on_move_failure(&self, _source: &Path, _destination: &Path, _error: &str) {}
}

/// Callback that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRelocateCallback;

impl RelocateProgressCallback for NoopRelocateCallback {}

/// Pick a destination for `original_name` inside `dest_dir`.
///
/// Returns `dest_dir/original_name` if nothing occupies it, otherwise the
/// first free `dest_dir/{stem}-{N:05}{ext}` for `N = 1, 2, ...`. The
/// extension is the part after the last dot; leading dots belong to the
/// stem. This only checks the filesystem and reserves nothing.
#[must_use]
pub fn generate_safe_path(dest_dir: &Path, original_name: &OsStr) -> PathBuf {
    let candidate = dest_dir.join(original_name);
    if !is_occupied(&candidate) {
        return candidate;
    }

    let name = Path::new(original_name);
    let stem = name.file_stem().unwrap_or(original_name);
    let extension = name.extension();

    let mut counter: u64 = 1;
    loop {
        let mut file_name = OsString::from(stem);
        file_name.push(format!("-{:0width$}", counter, width = SAFE_SUFFIX_PADDING));
        if let Some(ext) = extension {
            file_name.push(".");
            file_name.push(ext);
        }

        let candidate = dest_dir.join(file_name);
        if !is_occupied(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Dangling symlinks count as occupied since exclusive creation would fail.
fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Relocation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocator {
    /// Digest used for verification.
    pub algorithm: HashAlgorithm,
    /// Read chunk size for verification hashing.
    pub chunk_size: usize,
    /// Hash both sides before removing the source.
    pub verify: bool,
}

impl Default for Relocator {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            verify: false,
        }
    }
}

impl Relocator {
    /// Create a relocator with the default algorithm.
    #[must_use]
    pub fn new(verify: bool) -> Self {
        Self {
            verify,
            ..Self::default()
        }
    }

    /// Select the verification algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the verification read chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Move `source` into `dest_dir`.
    pub fn relocate(&self, source: &Path, dest_dir: &Path) -> RelocationResult {
        self.relocate_with::<NoopRelocateCallback>(source, dest_dir, None)
    }

    /// Move `source` into `dest_dir`, reporting each step to `callback`.
    pub fn relocate_with<C: RelocateProgressCallback + ?Sized>(
        &self,
        source: &Path,
        dest_dir: &Path,
        callback: Option<&C>,
    ) -> RelocationResult {
        let destination = match source.file_name() {
            Some(name) => generate_safe_path(dest_dir, name),
            None => dest_dir.to_path_buf(),
        };

        if let Some(cb) = callback {
            cb.on_before_move(source, &destination);
        }

        let outcome = match self.transfer(source, &destination, callback) {
            Ok(()) => {
                log::info!("Moved {} -> {}", source.display(), destination.display());
                if let Some(cb) = callback {
                    cb.on_move_success(source, &destination);
                }
                RelocationOutcome::Success { destination }
            }
            Err(e) => {
                let cause = e.to_string();
                log::warn!("Could not move {}: {}", source.display(), cause);
                if let Some(cb) = callback {
                    cb.on_move_failure(source, &destination, &cause);
                }
                RelocationOutcome::Failure { destination, cause }
            }
        };

        RelocationResult {
            source: source.to_path_buf(),
            outcome,
        }
    }

    fn transfer<C: RelocateProgressCallback + ?Sized>(
        &self,
        source: &Path,
        destination: &Path,
        callback: Option<&C>,
    ) -> Result<(), RelocateError> {
        if source.file_name().is_none() {
            return Err(RelocateError::NoFileName(source.to_path_buf()));
        }

        // Stat before any read so the source access time is still original
        let metadata = fs::metadata(source)
            .map_err(|e| RelocateError::io(RelocateStage::OpenSource, source, e))?;
        let mut reader = File::open(source)
            .map_err(|e| RelocateError::io(RelocateStage::OpenSource, source, e))?;

        let mut writer = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    RelocateError::DestinationExists(destination.to_path_buf())
                } else {
                    RelocateError::io(RelocateStage::CreateDestination, destination, e)
                }
            })?;

        let copied = io::copy(&mut reader, &mut writer)
            .map_err(|e| RelocateError::io(RelocateStage::Copy, destination, e))?;
        writer
            .sync_all()
            .map_err(|e| RelocateError::io(RelocateStage::Sync, destination, e))?;
        drop(writer);
        drop(reader);
        log::debug!("Copied {} bytes to {}", copied, destination.display());

        copy_metadata(&metadata, destination);

        if let Some(cb) = callback {
            cb.on_copied(source, destination);
        }

        if self.verify {
            let hasher = Hasher::new()
                .with_algorithm(self.algorithm)
                .with_chunk_size(self.chunk_size);
            let source_digest = hasher.hash_file(source)?;
            let destination_digest = hash_preserving_times(&hasher, destination)?;
            if source_digest != destination_digest {
                return Err(RelocateError::HashMismatch {
                    source_digest,
                    destination_digest,
                });
            }
        }

        fs::remove_file(source)
            .map_err(|e| RelocateError::io(RelocateStage::RemoveSource, source, e))
    }
}

/// Copy permission bits and access/modification times onto `destination`.
fn copy_metadata(metadata: &fs::Metadata, destination: &Path) {
    if let Err(e) = fs::set_permissions(destination, metadata.permissions()) {
        log::warn!("Could not copy permissions to {}: {}", destination.display(), e);
    }

    let atime = FileTime::from_last_access_time(metadata);
    let mtime = FileTime::from_last_modification_time(metadata);
    if let Err(e) = filetime::set_file_times(destination, atime, mtime) {
        log::warn!("Could not copy timestamps to {}: {}", destination.display(), e);
    }
}

/// Hash `path`, then put back the access and modification times the read
/// may have bumped.
///
/// # Errors
///
/// Returns [`HashError`] if the file cannot be read. Failing to restore the
/// timestamps only logs a warning.
pub fn hash_preserving_times(hasher: &Hasher, path: &Path) -> Result<HashDigest, HashError> {
    let times = fs::metadata(path).ok().map(|m| {
        (
            FileTime::from_last_access_time(&m),
            FileTime::from_last_modification_time(&m),
        )
    });

    let digest = hasher.hash_file(path)?;

    if let Some((atime, mtime)) = times {
        if let Err(e) = filetime::set_file_times(path, atime, mtime) {
            log::warn!("Could not restore timestamps of {}: {}", path.display(), e);
        }
    }
    Ok(digest)
}

/// Move `source` into `dest_dir` with the default [`Relocator`].
pub fn safe_move(source: &Path, dest_dir: &Path, verify: bool) -> RelocationResult {
    Relocator::new(verify).relocate(source, dest_dir)
}
