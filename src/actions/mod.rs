//! File actions module.
//!
//! This module provides the relocation transaction applied to every
//! duplicate that is not kept in place:
//! - Collision-safe destination naming
//! - Exclusive-create copy forced to stable storage
//! - Best-effort permission and timestamp preservation
//! - Optional hash verification before the source is removed
//!
//! ```no_run
//! use dedoopsie::actions::{generate_safe_path, Relocator};
//! use std::ffi::OsStr;
//! use std::path::Path;
//!
//! let quarantine = Path::new("quarantine");
//! println!("{}", generate_safe_path(quarantine, OsStr::new("copy.txt")).display());
//!
//! let result = Relocator::new(true).relocate(Path::new("copy.txt"), quarantine);
//! println!("{:?}", result.outcome);
//! ```

pub mod relocate;

// Re-export commonly used types
pub use relocate::{
    generate_safe_path, hash_preserving_times, safe_move, NoopRelocateCallback, RelocateError, RelocateProgressCallback,
    RelocateStage, RelocationOutcome, RelocationResult, Relocator, SAFE_SUFFIX_PADDING,
};
