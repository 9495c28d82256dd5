// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Content-addressed preimage store.
//!
//! `replay-cas` provides a [`BlobStore`] trait for storage keyed by the content
//! hash of each blob. Three tiers ship here:
//!
//! - [`MemoryTier`]: flat storage, one key to one value.
//! - [`RadixTier`]: blobs longer than [`StoreLayout::leaf_size`] are split into
//!   a fixed-radix tree of chunks so no single stored value exceeds the leaf size.
//! - [`StagedTier`]: buffers writes over another store until they are committed.
//!
//! # Hash Domain Policy
//!
//! The key of a preimage is `digest(bytes)` with no domain prefix, for every
//! tier and every blob length. A chunked blob is addressed by the digest of its
//! full contents, never by the digest of its tree node, so two tiers holding the
//! same bytes agree on the key.
//!
//! # Lifecycle
//!
//! Preimages are immutable and are never deleted or evicted. Re-adding identical
//! bytes is a no-op that returns the same key.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod memory;
mod radix;
mod staged;

pub use memory::MemoryTier;
pub use radix::{ChunkRef, RadixTier, StoreLayout};
pub use staged::StagedTier;

use std::sync::Arc;

/// A 32-byte content hash.
///
/// The inner bytes are public for zero-cost access; the `Display` impl renders
/// lowercase hex for logging and error messages.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct PreimageHash(pub [u8; 32]);

impl PreimageHash {
    /// View the hash as a byte array.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First eight bytes as hex, for log lines.
    pub fn short(&self) -> String {
        use std::fmt::Write as _;
        let mut out = String::with_capacity(16);
        for byte in &self.0[..8] {
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl From<[u8; 32]> for PreimageHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for PreimageHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Digest used to derive preimage keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum HashAlgorithm {
    /// Keccak-256, the digest the host ledger keys preimages by.
    #[default]
    Keccak256,
    /// BLAKE3.
    Blake3,
}

impl HashAlgorithm {
    /// Compute the content hash of `bytes`.
    pub fn digest(self, bytes: &[u8]) -> PreimageHash {
        match self {
            Self::Keccak256 => keccak256(bytes),
            Self::Blake3 => PreimageHash(*blake3::hash(bytes).as_bytes()),
        }
    }
}

/// Keccak-256 of `bytes`.
pub fn keccak256(bytes: &[u8]) -> PreimageHash {
    PreimageHash(keccak_hash::keccak(bytes).0)
}

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CasError {
    /// No blob is stored under this hash, or its chunk tree is missing a
    /// descendant or no longer reproduces the hashed bytes.
    #[error("[CAS_NOT_FOUND] no preimage for {0}")]
    NotFound(PreimageHash),
    /// Blob bytes did not match the declared hash.
    #[error("[CAS_HASH_MISMATCH] expected {expected}, computed {computed}")]
    HashMismatch {
        /// The hash that was declared/expected.
        expected: PreimageHash,
        /// The hash actually computed from the bytes.
        computed: PreimageHash,
    },
    /// Chunking parameters are out of range.
    #[error("[CAS_INVALID_LAYOUT] leaf_size {leaf_size} / radix {radix} out of range")]
    InvalidLayout {
        /// Requested leaf size in bytes.
        leaf_size: usize,
        /// Requested branching factor.
        radix: usize,
    },
}

/// Content-addressed blob store.
///
/// Implementations store immutable byte blobs keyed by [`HashAlgorithm::digest`]
/// of their full contents. The trait is synchronous: the host ledger behind it
/// is immediately consistent within one call.
pub trait BlobStore {
    /// Digest this store keys blobs by.
    fn algorithm(&self) -> HashAlgorithm;

    /// Compute hash and store if absent. Returns the content hash.
    fn add(&mut self, bytes: &[u8]) -> PreimageHash;

    /// Store with a pre-computed hash. Rejects if `digest(bytes) != expected`.
    ///
    /// On mismatch the store is unchanged.
    fn add_verified(&mut self, expected: PreimageHash, bytes: &[u8]) -> Result<(), CasError> {
        let computed = self.algorithm().digest(bytes);
        if computed != expected {
            return Err(CasError::HashMismatch { expected, computed });
        }
        self.add(bytes);
        Ok(())
    }

    /// Retrieve the full original bytes.
    fn get(&self, hash: &PreimageHash) -> Result<Arc<[u8]>, CasError>;

    /// Exact byte length, without materializing the blob.
    fn size(&self, hash: &PreimageHash) -> Result<u64, CasError>;

    /// Check existence without retrieving.
    fn has(&self, hash: &PreimageHash) -> bool;
}

impl<S: BlobStore + ?Sized> BlobStore for &mut S {
    fn algorithm(&self) -> HashAlgorithm {
        (**self).algorithm()
    }

    fn add(&mut self, bytes: &[u8]) -> PreimageHash {
        (**self).add(bytes)
    }

    fn get(&self, hash: &PreimageHash) -> Result<Arc<[u8]>, CasError> {
        (**self).get(hash)
    }

    fn size(&self, hash: &PreimageHash) -> Result<u64, CasError> {
        (**self).size(hash)
    }

    fn has(&self, hash: &PreimageHash) -> bool {
        (**self).has(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_matches_known_vector() {
        // keccak256("") = c5d2...a470
        assert_eq!(
            keccak256(b"").to_string(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn algorithms_disagree() {
        let k = HashAlgorithm::Keccak256.digest(b"hello world");
        let b = HashAlgorithm::Blake3.digest(b"hello world");
        assert_ne!(k, b);
        assert_eq!(b, PreimageHash(*blake3::hash(b"hello world").as_bytes()));
    }

    #[test]
    fn short_is_first_eight_bytes() {
        let hash = PreimageHash([0xAB; 32]);
        assert_eq!(hash.short(), "abababababababab");
        assert_eq!(hash.to_string().len(), 64);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn algorithm_serializes_lowercase() {
        let json = serde_json::to_string(&HashAlgorithm::Blake3).unwrap_or_default();
        assert_eq!(json, "\"blake3\"");
    }
}
