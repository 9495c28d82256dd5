// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Flat in-memory preimage store.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{BlobStore, CasError, HashAlgorithm, PreimageHash};

/// Flat content-addressed store: one key, one value.
///
/// Stores blobs in a `HashMap<PreimageHash, Arc<[u8]>>`. Sizes are answered
/// from the stored slice length, so `size` is O(1).
#[derive(Debug, Clone)]
pub struct MemoryTier {
    blobs: HashMap<PreimageHash, Arc<[u8]>>,
    byte_count: usize,
    algorithm: HashAlgorithm,
}

impl MemoryTier {
    /// Create an empty Keccak-256 keyed store.
    pub fn new() -> Self {
        Self::with_algorithm(HashAlgorithm::default())
    }

    /// Create an empty store keyed by `algorithm`.
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            blobs: HashMap::new(),
            byte_count: 0,
            algorithm,
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Returns `true` if no blobs are stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Total bytes stored across all blobs.
    pub fn byte_count(&self) -> usize {
        self.byte_count
    }
}

impl Default for MemoryTier {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for MemoryTier {
    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn add(&mut self, bytes: &[u8]) -> PreimageHash {
        let hash = self.algorithm.digest(bytes);
        if self.blobs.contains_key(&hash) {
            return hash;
        }
        self.byte_count += bytes.len();
        self.blobs.insert(hash, Arc::from(bytes));
        hash
    }

    fn get(&self, hash: &PreimageHash) -> Result<Arc<[u8]>, CasError> {
        self.blobs.get(hash).cloned().ok_or(CasError::NotFound(*hash))
    }

    fn size(&self, hash: &PreimageHash) -> Result<u64, CasError> {
        self.blobs
            .get(hash)
            .map(|blob| blob.len() as u64)
            .ok_or(CasError::NotFound(*hash))
    }

    fn has(&self, hash: &PreimageHash) -> bool {
        self.blobs.contains_key(hash)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::keccak256;

    #[test]
    fn add_get_round_trip() {
        let mut store = MemoryTier::new();
        let data = b"hello world";
        let hash = store.add(data);
        assert_eq!(&*store.get(&hash).unwrap(), data);
        assert_eq!(store.size(&hash).unwrap(), 11);
    }

    #[test]
    fn add_returns_keccak_of_content() {
        let mut store = MemoryTier::new();
        assert_eq!(store.add(b"hello world"), keccak256(b"hello world"));
    }

    #[test]
    fn add_idempotence() {
        let mut store = MemoryTier::new();
        let h1 = store.add(b"duplicate");
        let h2 = store.add(b"duplicate");
        assert_eq!(h1, h2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.byte_count(), 9);
    }

    #[test]
    fn has_missing_and_present() {
        let mut store = MemoryTier::new();
        let hash = keccak256(b"test");
        assert!(!store.has(&hash));
        store.add(b"test");
        assert!(store.has(&hash));
    }

    #[test]
    fn missing_hash_is_not_found() {
        let store = MemoryTier::new();
        let hash = PreimageHash([0xBB; 32]);
        assert_eq!(store.get(&hash).unwrap_err(), CasError::NotFound(hash));
        assert_eq!(store.size(&hash).unwrap_err(), CasError::NotFound(hash));
    }

    #[test]
    fn add_verified_rejects_mismatch_without_mutation() {
        let mut store = MemoryTier::new();
        let bad_hash = PreimageHash([0xFF; 32]);
        let err = store.add_verified(bad_hash, b"some bytes").unwrap_err();
        assert!(matches!(err, CasError::HashMismatch { expected, .. } if expected == bad_hash));
        assert!(store.is_empty());
        assert_eq!(store.byte_count(), 0);
    }

    #[test]
    fn add_verified_accepts_matching_hash() {
        let mut store = MemoryTier::new();
        let hash = keccak256(b"verified");
        store.add_verified(hash, b"verified").unwrap();
        assert!(store.has(&hash));
    }

    #[test]
    fn empty_blob_is_storable() {
        let mut store = MemoryTier::new();
        let hash = store.add(b"");
        assert!(store.has(&hash));
        assert_eq!(store.size(&hash).unwrap(), 0);
    }

    #[test]
    fn blake3_store_keys_by_blake3() {
        let mut store = MemoryTier::with_algorithm(HashAlgorithm::Blake3);
        let hash = store.add(b"abc");
        assert_eq!(hash, HashAlgorithm::Blake3.digest(b"abc"));
        assert!(!store.has(&keccak256(b"abc")));
    }
}
