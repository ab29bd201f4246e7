//! Streaming file hasher with selectable digest algorithms.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing content digests
//! of files using fixed-size chunk streaming. Files are never loaded into
//! memory as a whole, so arbitrarily large files can be hashed.
//!
//! The default algorithm is MD5 (128 bits). It is fast and digest equality is
//! treated as content equality by the rest of the crate; pick a stronger
//! algorithm (`sha256`, `blake3`) when adversarial inputs are a concern.
//!
//! # Example
//!
//! ```no_run
//! use dedoopsie::scanner::{HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new().with_algorithm(HashAlgorithm::Sha256);
//! let digest = hasher.hash_file(Path::new("report.pdf")).unwrap();
//! println!("{digest}");
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::Digest;

use super::HashError;

/// Default read chunk size (8 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Digest algorithm used for content comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5, 128-bit digest
    #[default]
    Md5,
    /// SHA-1, 160-bit digest
    Sha1,
    /// SHA-256, 256-bit digest
    Sha256,
    /// BLAKE3, 256-bit digest
    Blake3,
}

impl HashAlgorithm {
    /// Canonical lowercase name of the algorithm.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }

    /// Length of the hex digest produced by this algorithm.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha256 | Self::Blake3 => 64,
        }
    }

    fn accumulator(self) -> Accumulator {
        match self {
            Self::Md5 => Accumulator::Md5(md5::Md5::new()),
            Self::Sha1 => Accumulator::Sha1(sha1::Sha1::new()),
            Self::Sha256 => Accumulator::Sha256(sha2::Sha256::new()),
            Self::Blake3 => Accumulator::Blake3(Box::new(blake3::Hasher::new())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when an algorithm name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown hash algorithm '{0}' (expected one of: md5, sha1, sha256, blake3)")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for HashAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Running digest state for one file.
enum Accumulator {
    Md5(md5::Md5),
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl Accumulator {
    fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Md5(h) => h.update(bytes),
            Self::Sha1(h) => h.update(bytes),
            Self::Sha256(h) => h.update(bytes),
            Self::Blake3(h) => {
                h.update(bytes);
            }
        }
    }

    fn finalize(self) -> HashDigest {
        let hex = match self {
            Self::Md5(h) => format!("{:x}", h.finalize()),
            Self::Sha1(h) => format!("{:x}", h.finalize()),
            Self::Sha256(h) => format!("{:x}", h.finalize()),
            Self::Blake3(h) => h.finalize().to_hex().to_string(),
        };
        HashDigest(hex)
    }
}

/// Lowercase hexadecimal content digest.
///
/// Only ever used as a grouping or verification key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HashDigest(String);

impl HashDigest {
    /// Borrow the hex representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HashDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Streaming file hasher.
///
/// Holds no per-file state, so one instance can hash any number of files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    chunk_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default algorithm and chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Select the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the read chunk size in bytes (minimum 1).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The configured chunk size.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Hash the full content of a file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails
    /// partway through. No partial digest is ever returned.
    pub fn hash_file(&self, path: &Path) -> Result<HashDigest, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.hash_reader(file)
            .map_err(|e| HashError::from_io(path, e))
    }

    /// Hash everything readable from `reader` until EOF.
    ///
    /// # Errors
    ///
    /// Propagates any read error other than `Interrupted`.
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<HashDigest> {
        let mut state = self.algorithm.accumulator();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            state.update(&buffer[..n]);
        }

        Ok(state.finalize())
    }
}

/// Hash a file with the given algorithm and the default chunk size.
///
/// # Errors
///
/// See [`Hasher::hash_file`].
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> Result<HashDigest, HashError> {
    Hasher::new().with_algorithm(algorithm).hash_file(path)
}
