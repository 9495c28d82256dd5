// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Write-buffering overlay over another store.
//!
//! Reads fall through to the base store after checking the buffer. Writes land
//! in the buffer only. [`StagedTier::commit`] replays buffered writes into the
//! base in insertion order; dropping the tier discards them.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{BlobStore, CasError, HashAlgorithm, PreimageHash};

/// Overlay that holds new preimages back from its base store until committed.
#[derive(Debug)]
pub struct StagedTier<S> {
    base: S,
    pending: HashMap<PreimageHash, Arc<[u8]>>,
    order: Vec<PreimageHash>,
}

impl<S: BlobStore> StagedTier<S> {
    /// Wrap `base`. Pass `&mut store` to stage over a borrowed store.
    pub fn new(base: S) -> Self {
        Self {
            base,
            pending: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Borrow the base store.
    pub fn base(&self) -> &S {
        &self.base
    }

    /// Number of buffered preimages not yet in the base.
    pub fn pending_len(&self) -> usize {
        self.order.len()
    }

    /// Flush buffered writes into the base and return it.
    pub fn commit(mut self) -> S {
        for hash in &self.order {
            if let Some(bytes) = self.pending.get(hash) {
                self.base.add(bytes);
            }
        }
        self.base
    }

    /// Drop buffered writes and return the untouched base.
    pub fn discard(self) -> S {
        self.base
    }
}

impl<S: BlobStore> BlobStore for StagedTier<S> {
    fn algorithm(&self) -> HashAlgorithm {
        self.base.algorithm()
    }

    fn add(&mut self, bytes: &[u8]) -> PreimageHash {
        let hash = self.base.algorithm().digest(bytes);
        if self.base.has(&hash) || self.pending.contains_key(&hash) {
            return hash;
        }
        self.pending.insert(hash, Arc::from(bytes));
        self.order.push(hash);
        hash
    }

    fn get(&self, hash: &PreimageHash) -> Result<Arc<[u8]>, CasError> {
        match self.pending.get(hash) {
            Some(bytes) => Ok(Arc::clone(bytes)),
            None => self.base.get(hash),
        }
    }

    fn size(&self, hash: &PreimageHash) -> Result<u64, CasError> {
        match self.pending.get(hash) {
            Some(bytes) => Ok(bytes.len() as u64),
            None => self.base.size(hash),
        }
    }

    fn has(&self, hash: &PreimageHash) -> bool {
        self.pending.contains_key(hash) || self.base.has(hash)
    }
}
