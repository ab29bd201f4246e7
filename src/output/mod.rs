//! Output formatters for deduplication runs.
//!
//! This module provides the persisted record of a run:
//! - CSV audit log with one row per action taken on each file
//!
//! # Example
//!
//! ```no_run
//! use dedoopsie::output::{AuditLog, AuditRecord, GroupContext};
//! use std::path::Path;
//!
//! let mut log = AuditLog::create(Path::new("dupes.csv")).unwrap();
//! let ctx = GroupContext::new(1, Path::new("keep.txt"), 20, 10);
//! log.record(&AuditRecord::keeper(&ctx, "d41d8cd98f00b204e9800998ecf8427e")).unwrap();
//! ```

pub mod audit;

// Re-export main types
pub use audit::{AuditAction, AuditError, AuditLog, AuditRecord, GroupContext, AUDIT_HEADERS};
