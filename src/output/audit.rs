//! CSV audit log of every action taken on a duplicate group.
//!
//! One row is written per file per group: a `KEEPER` row for the member
//! that stays, then one `DRYRUN`, `MOVED` or `ERROR` row for every other
//! member. Rows are flushed as they are written so an interrupted run still
//! leaves a usable record.
//!
//! # Columns
//!
//! - `GROUP_ID`: 1-based group number
//! - `ACTION`: `KEEPER`, `DRYRUN`, `MOVED` or `ERROR`
//! - `ORIGINAL_PATH`: where the file was found
//! - `DEST_PATH`: proposed or actual destination (empty for the keeper)
//! - `KEEPER_PATH`: the member kept in place
//! - `GROUP_SIZE`: total bytes of all members
//! - `RECLAIMABLE`: bytes freed by relocating every non-keeper
//! - `HASH`: content digest (hex)
//! - `ERROR`: failure cause, empty otherwise
//!
//! # Example
//!
//! ```
//! use dedoopsie::output::audit::{AuditLog, AuditRecord, GroupContext};
//! use std::path::Path;
//!
//! let ctx = GroupContext::new(1, Path::new("/keep/a.txt"), 24, 12);
//! let mut log = AuditLog::from_writer(Vec::new()).unwrap();
//! log.record(&AuditRecord::keeper(&ctx, "abc123")).unwrap();
//! let csv = String::from_utf8(log.into_inner().unwrap()).unwrap();
//! assert!(csv.starts_with("GROUP_ID,ACTION"));
//! ```

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Header row, in column order.
pub const AUDIT_HEADERS: [&str; 9] = [
    "GROUP_ID",
    "ACTION",
    "ORIGINAL_PATH",
    "DEST_PATH",
    "KEEPER_PATH",
    "GROUP_SIZE",
    "RECLAIMABLE",
    "HASH",
    "ERROR",
];

/// Errors that can occur while writing the audit log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The log file could not be created.
    #[error("cannot open audit log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Kind of action recorded for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    /// The member kept in place
    Keeper,
    /// A move that would happen in wet mode
    #[serde(rename = "DRYRUN")]
    DryRun,
    /// A completed move
    Moved,
    /// A failed move or post-move hash
    Error,
}

/// Per-group values repeated on every row of that group.
#[derive(Debug, Clone)]
pub struct GroupContext {
    group_id: usize,
    keeper_path: String,
    group_size: u64,
    reclaimable: u64,
}

impl GroupContext {
    /// Describe group `group_id` kept at `keeper`.
    #[must_use]
    pub fn new(group_id: usize, keeper: &Path, group_size: u64, reclaimable: u64) -> Self {
        Self {
            group_id,
            keeper_path: keeper.to_string_lossy().into_owned(),
            group_size,
            reclaimable,
        }
    }
}

/// A single row in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    #[serde(rename = "GROUP_ID")]
    pub group_id: usize,
    #[serde(rename = "ACTION")]
    pub action: AuditAction,
    #[serde(rename = "ORIGINAL_PATH")]
    pub original_path: String,
    #[serde(rename = "DEST_PATH")]
    pub dest_path: String,
    #[serde(rename = "KEEPER_PATH")]
    pub keeper_path: String,
    #[serde(rename = "GROUP_SIZE")]
    pub group_size: u64,
    #[serde(rename = "RECLAIMABLE")]
    pub reclaimable: u64,
    #[serde(rename = "HASH")]
    pub hash: String,
    #[serde(rename = "ERROR")]
    pub error: String,
}

impl AuditRecord {
    fn base(ctx: &GroupContext, action: AuditAction, original: &str) -> Self {
        Self {
            group_id: ctx.group_id,
            action,
            original_path: original.to_string(),
            dest_path: String::new(),
            keeper_path: ctx.keeper_path.clone(),
            group_size: ctx.group_size,
            reclaimable: ctx.reclaimable,
            hash: String::new(),
            error: String::new(),
        }
    }

    /// Row for the member that stays in place.
    #[must_use]
    pub fn keeper(ctx: &GroupContext, hash: &str) -> Self {
        let keeper = ctx.keeper_path.clone();
        Self {
            hash: hash.to_string(),
            ..Self::base(ctx, AuditAction::Keeper, &keeper)
        }
    }

    /// Row for a move that was only planned.
    #[must_use]
    pub fn dry_run(ctx: &GroupContext, original: &Path, destination: &Path, hash: &str) -> Self {
        Self {
            dest_path: destination.to_string_lossy().into_owned(),
            hash: hash.to_string(),
            ..Self::base(ctx, AuditAction::DryRun, &original.to_string_lossy())
        }
    }

    /// Row for a completed move.
    #[must_use]
    pub fn moved(ctx: &GroupContext, original: &Path, destination: &Path, hash: &str) -> Self {
        Self {
            dest_path: destination.to_string_lossy().into_owned(),
            hash: hash.to_string(),
            ..Self::base(ctx, AuditAction::Moved, &original.to_string_lossy())
        }
    }

    /// Row for a failed move.
    #[must_use]
    pub fn error(
        ctx: &GroupContext,
        original: &Path,
        destination: &Path,
        hash: &str,
        error: &str,
    ) -> Self {
        Self {
            dest_path: destination.to_string_lossy().into_owned(),
            hash: hash.to_string(),
            error: error.to_string(),
            ..Self::base(ctx, AuditAction::Error, &original.to_string_lossy())
        }
    }
}

/// Append-only CSV audit writer.
pub struct AuditLog<W: io::Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl AuditLog<File> {
    /// Create (or truncate) the log file at `path` and write the header.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Open`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, AuditError> {
        let file = File::create(path).map_err(|source| AuditError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Writing audit log to {}", path.display());
        Self::from_writer(file)
    }
}

impl<W: io::Write> AuditLog<W> {
    /// Wrap `writer` and write the header row.
    ///
    /// # Errors
    ///
    /// Returns `AuditError` if the header cannot be written.
    pub fn from_writer(writer: W) -> Result<Self, AuditError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(AUDIT_HEADERS)?;
        writer.flush()?;
        Ok(Self { writer, rows: 0 })
    }

    /// Append one row and flush it.
    ///
    /// # Errors
    ///
    /// Returns `AuditError` if serialization or writing fails.
    pub fn record(&mut self, record: &AuditRecord) -> Result<(), AuditError> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Number of rows written, excluding the header.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns `AuditError` if the final flush fails.
    pub fn into_inner(self) -> Result<W, AuditError> {
        self.writer
            .into_inner()
            .map_err(|e| AuditError::Io(e.into_error()))
    }
}
