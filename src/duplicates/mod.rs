//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Full hash comparison (Phase 2)
//! - Duplicate group management
//! - Keeper selection within a confirmed group

pub mod finder;
pub mod groups;
pub mod keeper;

pub use finder::{find_duplicates, DuplicateFinder, FinderConfig, FinderError, FinderSummary};
pub use groups::{group_by_size, DuplicateGroup, GroupKey, SizeBuckets};
pub use keeper::{
    select_by_timestamps, select_keeper, select_keeper_index, KeeperStrategy, UnknownStrategy,
};
