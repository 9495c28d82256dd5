// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Store-level properties shared by every tier.
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use replay_cas::{BlobStore, ChunkRef, HashAlgorithm, MemoryTier, PreimageHash, RadixTier, StoreLayout};

const L: usize = 64;
const R: usize = 4;

fn radix() -> RadixTier {
    RadixTier::new(StoreLayout::new(L, R).unwrap()).unwrap()
}

/// Walk the chunk tree by hand, independent of `BlobStore::get`.
fn resolve(store: &RadixTier, hash: &PreimageHash, out: &mut Vec<u8>) {
    match store.chunk(hash).unwrap() {
        ChunkRef::Leaf(bytes) => {
            assert!(bytes.len() <= L);
            out.extend_from_slice(bytes);
        }
        ChunkRef::Node { children, .. } => {
            assert!(children.len() <= R);
            for child in children {
                resolve(store, child, out);
            }
        }
    }
}

#[test]
fn chunk_reconstruction_at_boundaries() {
    for len in [L, L + 1, R * L, R * L + 1, R * R * L, R * R * L + 1] {
        let data: Vec<u8> = (0..len).map(|i| (i % 253) as u8).collect();
        let mut store = radix();
        let root = store.add(&data);
        let mut out = Vec::new();
        resolve(&store, &root, &mut out);
        assert_eq!(out, data, "len {len}");
        assert_eq!(store.size(&root).unwrap(), len as u64);
    }
}

#[test]
fn tiers_agree_on_keys() {
    let data = vec![0x5Au8; 3 * R * L + 17];
    let mut flat = MemoryTier::new();
    let mut chunked = radix();
    assert_eq!(flat.add(&data), chunked.add(&data));
}

proptest! {
    #[test]
    fn flat_store_round_trip_and_idempotence(bytes in prop::collection::vec(any::<u8>(), 0..2048)) {
        let mut store = MemoryTier::new();
        let h1 = store.add(&bytes);
        let h2 = store.add(&bytes);
        prop_assert_eq!(h1, h2);
        prop_assert_eq!(store.len(), 1);
        prop_assert!(store.has(&HashAlgorithm::Keccak256.digest(&bytes)));
        prop_assert_eq!(&*store.get(&h1).unwrap(), bytes.as_slice());
        prop_assert_eq!(store.size(&h1).unwrap(), bytes.len() as u64);
    }

    #[test]
    fn radix_store_round_trip_and_idempotence(bytes in prop::collection::vec(any::<u8>(), 0..4096)) {
        let mut store = radix();
        let h1 = store.add(&bytes);
        let chunks = store.chunk_count();
        let h2 = store.add(&bytes);
        prop_assert_eq!(h1, h2);
        prop_assert_eq!(store.chunk_count(), chunks);
        prop_assert_eq!(h1, HashAlgorithm::Keccak256.digest(&bytes));
        prop_assert_eq!(&*store.get(&h1).unwrap(), bytes.as_slice());
        prop_assert_eq!(store.size(&h1).unwrap(), bytes.len() as u64);
    }

    #[test]
    fn chunking_is_independent_of_history(
        first in prop::collection::vec(any::<u8>(), 0..1024),
        second in prop::collection::vec(any::<u8>(), 0..1024),
    ) {
        // The same content lands on the same root whatever was stored before it.
        let mut fresh = radix();
        let expected = fresh.add(&second);
        let mut used = radix();
        used.add(&first);
        prop_assert_eq!(used.add(&second), expected);
    }
}
