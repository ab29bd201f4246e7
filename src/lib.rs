//! dedoopsie - Safe Duplicate File Relocator
//!
//! Finds files with identical content by size bucketing followed by a full
//! content digest, keeps one member of every group in place, and moves the
//! rest into a quarantine directory with a copy-verify-delete transaction.
//! Every decision is written to a CSV audit log.

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

pub use app::run_app;
