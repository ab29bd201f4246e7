//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module provides structures for grouping files by size (Phase 1 of
//! duplicate detection) and the [`DuplicateGroup`] type produced once
//! content digests confirm a match (Phase 2).
//!
//! ## Size Grouping (Phase 1)
//!
//! Files with different sizes cannot be duplicates, so bucketing by exact
//! size decides most files without reading a single byte of content.
//! Buckets keep the order in which each size was first seen, and files keep
//! their encounter order inside a bucket.
//!
//! # Example
//!
//! ```
//! use dedoopsie::duplicates::SizeBuckets;
//! use std::path::PathBuf;
//!
//! let mut buckets = SizeBuckets::default();
//! buckets.insert(1024, PathBuf::from("/file1.txt"));
//! buckets.insert(1024, PathBuf::from("/file2.txt"));
//! buckets.insert(2048, PathBuf::from("/file3.txt"));
//!
//! assert_eq!(buckets.len(), 2);
//! assert_eq!(buckets.candidates().count(), 1);
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::HashDigest;

/// Insertion-ordered map from a key to an owned list of files.
///
/// Built once per run and consumed when groups are emitted.
#[derive(Debug, Clone)]
pub(crate) struct OrderedBuckets<K> {
    index: HashMap<K, usize>,
    buckets: Vec<(K, Vec<PathBuf>)>,
}

impl<K> Default for OrderedBuckets<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            buckets: Vec::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> OrderedBuckets<K> {
    pub(crate) fn insert(&mut self, key: K, path: PathBuf) {
        match self.index.get(&key) {
            Some(&slot) => self.buckets[slot].1.push(path),
            None => {
                self.index.insert(key.clone(), self.buckets.len());
                self.buckets.push((key, vec![path]));
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, &[PathBuf])> {
        self.buckets.iter().map(|(k, files)| (k, files.as_slice()))
    }

    pub(crate) fn into_inner(self) -> Vec<(K, Vec<PathBuf>)> {
        self.buckets
    }
}

/// Files partitioned by exact byte size.
#[derive(Debug, Clone, Default)]
pub struct SizeBuckets {
    inner: OrderedBuckets<u64>,
}

impl SizeBuckets {
    /// Add a file of the given size.
    pub fn insert(&mut self, size: u64, path: PathBuf) {
        self.inner.insert(size, path);
    }

    /// Number of distinct sizes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if no file has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// All buckets in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[PathBuf])> {
        self.inner.iter().map(|(size, files)| (*size, files))
    }

    /// Buckets with two or more files (the only ones worth hashing).
    pub fn candidates(&self) -> impl Iterator<Item = (u64, &[PathBuf])> {
        self.iter().filter(|(_, files)| files.len() > 1)
    }

    /// Number of files sitting in singleton buckets.
    #[must_use]
    pub fn singleton_count(&self) -> usize {
        self.iter().filter(|(_, files)| files.len() == 1).count()
    }

    /// Consume the buckets, yielding `(size, files)` in first-seen order.
    #[must_use]
    pub fn into_buckets(self) -> Vec<(u64, Vec<PathBuf>)> {
        self.inner.into_inner()
    }
}

/// Bucket `(size, path)` pairs by size, preserving encounter order.
///
/// # Example
///
/// ```
/// use dedoopsie::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let buckets = group_by_size(vec![
///     (10, PathBuf::from("/a")),
///     (20, PathBuf::from("/b")),
///     (10, PathBuf::from("/c")),
/// ]);
/// assert_eq!(buckets.singleton_count(), 1);
/// ```
pub fn group_by_size<I>(entries: I) -> SizeBuckets
where
    I: IntoIterator<Item = (u64, PathBuf)>,
{
    let mut buckets = SizeBuckets::default();
    for (size, path) in entries {
        buckets.insert(size, path);
    }
    buckets
}

/// Composite grouping key: files co-group only when both parts match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    /// Exact size in bytes
    pub size: u64,
    /// Full-content digest
    pub digest: HashDigest,
}

/// Confirmed duplicate group of files.
///
/// Every member had the same size and the same full-content digest when
/// the group was built. A group always has at least two members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Size of each member in bytes
    pub size: u64,
    /// Content digest shared by all members
    pub digest: HashDigest,
    /// Members in encounter order
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(size: u64, digest: HashDigest, files: Vec<PathBuf>) -> Self {
        debug_assert!(files.len() > 1, "duplicate group needs two members");
        Self {
            size,
            digest,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Bytes freed by relocating every member but one.
    #[must_use]
    pub fn reclaimable_space(&self) -> u64 {
        self.total_size().saturating_sub(self.size)
    }

    /// Number of redundant copies (total - 1 keeper).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Borrow the member paths.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }

    /// Check whether `path` is a member.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }
}
