// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Radix-chunked preimage store.
//!
//! A blob of `n` bytes with `n <= leaf_size` is stored as a single leaf. Larger
//! blobs become an internal node whose children each cover
//! `leaf_size * radix^(h-1)` bytes, where `h` is the smallest height with
//! `n <= leaf_size * radix^h`. Only the last child may be shorter. Children are
//! stored the same way, recursively, so the tree shape depends only on the
//! content length and the layout parameters.
//!
//! Every chunk (leaf or node) is keyed by the digest of the bytes it covers.
//! Two blobs sharing an aligned subrange share the chunks for it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{BlobStore, CasError, HashAlgorithm, PreimageHash};

/// Chunking parameters for [`RadixTier`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreLayout {
    /// Maximum byte length of a leaf chunk (`L`).
    pub leaf_size: usize,
    /// Maximum number of children per internal node (`R`).
    pub radix: usize,
}

impl StoreLayout {
    /// Default leaf size in bytes.
    pub const DEFAULT_LEAF_SIZE: usize = 4096;
    /// Default branching factor.
    pub const DEFAULT_RADIX: usize = 32;
    /// Smallest accepted leaf size.
    pub const MIN_LEAF_SIZE: usize = 64;

    /// Build a validated layout.
    pub fn new(leaf_size: usize, radix: usize) -> Result<Self, CasError> {
        let layout = Self { leaf_size, radix };
        layout.validate()?;
        Ok(layout)
    }

    /// Reject layouts that cannot make progress when splitting.
    pub fn validate(&self) -> Result<(), CasError> {
        if self.leaf_size < Self::MIN_LEAF_SIZE || self.radix < 2 {
            return Err(CasError::InvalidLayout {
                leaf_size: self.leaf_size,
                radix: self.radix,
            });
        }
        Ok(())
    }

    /// Byte span of each child of a node covering `len` bytes.
    ///
    /// Only meaningful for `len > leaf_size`.
    pub fn child_span(&self, len: usize) -> usize {
        let mut span = self.leaf_size;
        while let Some(capacity) = span.checked_mul(self.radix) {
            if len <= capacity {
                break;
            }
            span = capacity;
        }
        span
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            leaf_size: Self::DEFAULT_LEAF_SIZE,
            radix: Self::DEFAULT_RADIX,
        }
    }
}

#[derive(Debug, Clone)]
enum Chunk {
    Leaf(Arc<[u8]>),
    Node { len: u64, children: Vec<PreimageHash> },
}

/// Borrowed view of one stored chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkRef<'a> {
    /// Raw leaf bytes (at most `leaf_size`).
    Leaf(&'a [u8]),
    /// Internal node.
    Node {
        /// Total byte length covered by this node.
        len: u64,
        /// Child keys, in content order.
        children: &'a [PreimageHash],
    },
}

/// Content-addressed store that splits large blobs into a radix tree of chunks.
#[derive(Debug, Clone)]
pub struct RadixTier {
    chunks: HashMap<PreimageHash, Chunk>,
    layout: StoreLayout,
    algorithm: HashAlgorithm,
    leaf_bytes: usize,
}

impl RadixTier {
    /// Create an empty store with the given layout and the default digest.
    pub fn new(layout: StoreLayout) -> Result<Self, CasError> {
        Self::with_algorithm(layout, HashAlgorithm::default())
    }

    /// Create an empty store with the given layout and digest.
    pub fn with_algorithm(layout: StoreLayout, algorithm: HashAlgorithm) -> Result<Self, CasError> {
        layout.validate()?;
        Ok(Self {
            chunks: HashMap::new(),
            layout,
            algorithm,
            leaf_bytes: 0,
        })
    }

    /// Chunking parameters in use.
    pub fn layout(&self) -> StoreLayout {
        self.layout
    }

    /// Number of distinct chunks (leaves and nodes).
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total bytes held in leaf chunks.
    pub fn leaf_bytes(&self) -> usize {
        self.leaf_bytes
    }

    /// Inspect a single stored chunk.
    pub fn chunk(&self, hash: &PreimageHash) -> Option<ChunkRef<'_>> {
        self.chunks.get(hash).map(|chunk| match chunk {
            Chunk::Leaf(bytes) => ChunkRef::Leaf(bytes),
            Chunk::Node { len, children } => ChunkRef::Node {
                len: *len,
                children,
            },
        })
    }

    fn insert(&mut self, bytes: &[u8]) -> PreimageHash {
        let hash = self.algorithm.digest(bytes);
        if self.chunks.contains_key(&hash) {
            return hash;
        }
        let chunk = if bytes.len() <= self.layout.leaf_size {
            self.leaf_bytes += bytes.len();
            Chunk::Leaf(Arc::from(bytes))
        } else {
            let span = self.layout.child_span(bytes.len());
            let children = bytes.chunks(span).map(|part| self.insert(part)).collect();
            Chunk::Node {
                len: bytes.len() as u64,
                children,
            }
        };
        self.chunks.insert(hash, chunk);
        hash
    }

    fn assemble(&self, hash: &PreimageHash, out: &mut Vec<u8>) -> Result<(), CasError> {
        match self.chunks.get(hash) {
            None => Err(CasError::NotFound(*hash)),
            Some(Chunk::Leaf(bytes)) => {
                out.extend_from_slice(bytes);
                Ok(())
            }
            Some(Chunk::Node { children, .. }) => {
                for child in children {
                    self.assemble(child, out)?;
                }
                Ok(())
            }
        }
    }

    /// Drop one chunk, leaving any parent pointing at it.
    #[cfg(any(test, feature = "fault_injection"))]
    pub fn forget_chunk(&mut self, hash: &PreimageHash) {
        self.chunks.remove(hash);
    }

    /// Replace the chunk under `hash` with a leaf holding `bytes`.
    #[cfg(any(test, feature = "fault_injection"))]
    pub fn overwrite_leaf(&mut self, hash: PreimageHash, bytes: &[u8]) {
        self.chunks.insert(hash, Chunk::Leaf(Arc::from(bytes)));
    }
}

impl BlobStore for RadixTier {
    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn add(&mut self, bytes: &[u8]) -> PreimageHash {
        self.insert(bytes)
    }

    fn get(&self, hash: &PreimageHash) -> Result<Arc<[u8]>, CasError> {
        match self.chunks.get(hash) {
            None => Err(CasError::NotFound(*hash)),
            Some(Chunk::Leaf(bytes)) => Ok(Arc::clone(bytes)),
            Some(Chunk::Node { len, .. }) => {
                // A tree that does not reproduce its key has no valid preimage.
                let capacity = usize::try_from(*len).map_err(|_| CasError::NotFound(*hash))?;
                let mut out = Vec::with_capacity(capacity);
                self.assemble(hash, &mut out)?;
                if out.len() != capacity || self.algorithm.digest(&out) != *hash {
                    return Err(CasError::NotFound(*hash));
                }
                Ok(Arc::from(out))
            }
        }
    }

    fn size(&self, hash: &PreimageHash) -> Result<u64, CasError> {
        match self.chunks.get(hash) {
            None => Err(CasError::NotFound(*hash)),
            Some(Chunk::Leaf(bytes)) => Ok(bytes.len() as u64),
            Some(Chunk::Node { len, .. }) => Ok(*len),
        }
    }

    fn has(&self, hash: &PreimageHash) -> bool {
        self.chunks.contains_key(hash)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const L: usize = 64;
    const R: usize = 4;

    fn tier() -> RadixTier {
        RadixTier::new(StoreLayout::new(L, R).unwrap()).unwrap()
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    #[test]
    fn layout_rejects_degenerate_parameters() {
        assert!(StoreLayout::new(8, 4).is_err());
        assert!(StoreLayout::new(64, 1).is_err());
        assert!(StoreLayout::new(64, 2).is_ok());
    }

    #[test]
    fn child_span_grows_by_radix() {
        let layout = StoreLayout::new(L, R).unwrap();
        assert_eq!(layout.child_span(L + 1), L);
        assert_eq!(layout.child_span(R * L), L);
        assert_eq!(layout.child_span(R * L + 1), R * L);
        assert_eq!(layout.child_span(R * R * L), R * L);
        assert_eq!(layout.child_span(R * R * L + 1), R * R * L);
    }

    #[test]
    fn small_blob_is_single_leaf() {
        let mut store = tier();
        let data = pattern(L);
        let hash = store.add(&data);
        assert_eq!(store.chunk_count(), 1);
        assert!(matches!(store.chunk(&hash), Some(ChunkRef::Leaf(bytes)) if bytes == data.as_slice()));
    }

    #[test]
    fn key_is_content_hash_for_large_blobs() {
        let mut store = tier();
        let data = pattern(R * L + 1);
        let hash = store.add(&data);
        assert_eq!(hash, HashAlgorithm::Keccak256.digest(&data));
        assert_eq!(store.size(&hash).unwrap(), (R * L + 1) as u64);
        assert_eq!(&*store.get(&hash).unwrap(), data.as_slice());
    }

    #[test]
    fn node_never_exceeds_radix_children() {
        let mut store = tier();
        let hash = store.add(&pattern(R * R * L + 3));
        let Some(ChunkRef::Node { children, len }) = store.chunk(&hash) else {
            unreachable!("large blob must be stored as a node");
        };
        assert_eq!(len, (R * R * L + 3) as u64);
        assert_eq!(children.len(), 2);
        assert!(children.len() <= R);
    }

    #[test]
    fn shared_prefix_shares_chunks() {
        let mut store = tier();
        let mut a = pattern(4 * L);
        store.add(&a);
        let before = store.chunk_count();
        a[4 * L - 1] ^= 0xFF;
        store.add(&a);
        // One new leaf + one new node; the first three leaves are reused.
        assert_eq!(store.chunk_count(), before + 2);
    }

    #[test]
    fn missing_descendant_is_not_found() {
        let mut store = tier();
        let data = pattern(3 * L);
        let root = store.add(&data);
        let leaf = HashAlgorithm::Keccak256.digest(&data[L..2 * L]);
        store.forget_chunk(&leaf);
        assert!(store.has(&root));
        assert_eq!(store.get(&root).unwrap_err(), CasError::NotFound(leaf));
        // Size is cached at the root and still answers.
        assert_eq!(store.size(&root).unwrap(), (3 * L) as u64);
    }

    #[test]
    fn tampered_leaf_is_not_found() {
        let mut store = tier();
        let data = pattern(2 * L);
        let root = store.add(&data);
        let leaf = HashAlgorithm::Keccak256.digest(&data[..L]);
        store.overwrite_leaf(leaf, &[0u8; L]);
        assert_eq!(store.get(&root).unwrap_err(), CasError::NotFound(root));
        assert!(store.has(&root));
    }

    #[test]
    fn re_adding_is_idempotent() {
        let mut store = tier();
        let data = pattern(5 * L);
        let h1 = store.add(&data);
        let count = store.chunk_count();
        let bytes = store.leaf_bytes();
        let h2 = store.add(&data);
        assert_eq!(h1, h2);
        assert_eq!(store.chunk_count(), count);
        assert_eq!(store.leaf_bytes(), bytes);
    }
}
