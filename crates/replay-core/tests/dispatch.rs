// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Router behavior over the four built-in methods.
#![allow(clippy::unwrap_used)]

use replay_abi::{Interface, MethodDescriptor, Param, ParamType, StateMutability};
use replay_cas::{BlobStore, MemoryTier, PreimageHash, RadixTier, StoreLayout};
use replay_core::methods::{decode_output, GetPreimage, GetPreimageSize, STANDARD_ABI};
use replay_core::{EngineConfig, MethodRouter, PrecompileError, RouterError};
use replay_dry_tests::{add_preimage_call, get_preimage_call, get_preimage_size_call, TickFactory};

fn router() -> MethodRouter<TickFactory> {
    MethodRouter::standard(&EngineConfig::default(), TickFactory).unwrap()
}

// ── hello world ─────────────────────────────────────────────────────

#[test]
fn add_then_get_preimage() {
    let router = router();
    let mut store = MemoryTier::new();

    let out = router.execute(&mut store, &add_preimage_call(b"hello world").unwrap()).unwrap();
    let hash = PreimageHash(out[..32].try_into().unwrap());
    assert_eq!(hash, replay_cas::keccak256(b"hello world"));

    let out = router.execute(&mut store, &get_preimage_call(11, hash).unwrap()).unwrap();
    let (bytes,) = decode_output::<GetPreimage>(&out).unwrap();
    assert_eq!(bytes.0, b"hello world");

    let err = router.execute(&mut store, &get_preimage_call(10, hash).unwrap()).unwrap_err();
    assert_eq!(err, PrecompileError::SizeMismatch { expected: 10, actual: 11 });
}

#[test]
fn add_preimage_is_idempotent() {
    let router = router();
    let mut store = MemoryTier::new();
    let call = add_preimage_call(b"twice").unwrap();
    let first = router.execute(&mut store, &call).unwrap();
    let second = router.execute(&mut store, &call).unwrap();
    assert_eq!(first, second);
    assert_eq!(store.len(), 1);
}

#[test]
fn size_query_and_missing_preimages() {
    let router = router();
    let mut store = MemoryTier::new();
    let hash = store.add(&[0u8; 300]);
    let out = router.execute(&mut store, &get_preimage_size_call(hash).unwrap()).unwrap();
    let (size,) = decode_output::<GetPreimageSize>(&out).unwrap();
    assert_eq!(size.0, 300);

    let missing = PreimageHash([0xEE; 32]);
    assert_eq!(
        router.execute(&mut store, &get_preimage_size_call(missing).unwrap()),
        Err(PrecompileError::NotFound(missing))
    );
    assert_eq!(
        router.execute(&mut store, &get_preimage_call(0, missing).unwrap()),
        Err(PrecompileError::NotFound(missing))
    );
}

#[test]
fn tampered_radix_leaf_is_not_found() {
    let router = router();
    let mut store = RadixTier::new(StoreLayout::new(64, 4).unwrap()).unwrap();
    let data: Vec<u8> = (0..128u8).collect();
    let root = store.add(&data);
    let leaf = store.algorithm().digest(&data[..64]);
    store.overwrite_leaf(leaf, &[0u8; 64]);

    assert_eq!(
        router.execute(&mut store, &get_preimage_call(128, root).unwrap()),
        Err(PrecompileError::NotFound(root))
    );
    // The root node still caches its length.
    let out = router.execute(&mut store, &get_preimage_size_call(root).unwrap()).unwrap();
    assert_eq!(decode_output::<GetPreimageSize>(&out).unwrap().0 .0, 128);
}

// ── selector handling ───────────────────────────────────────────────

#[test]
fn unknown_selector_queries_default_and_execute_fails() {
    let router = router();
    let mut store = MemoryTier::new();
    let payload = [0xde, 0xad, 0xbe, 0xef, 0, 0, 0, 1];
    assert!(!router.mutates_state(&payload));
    assert_eq!(router.required_cost(&payload), 0);
    assert_eq!(
        router.execute(&mut store, &payload),
        Err(PrecompileError::InvalidSelector {
            selector: Some([0xde, 0xad, 0xbe, 0xef])
        })
    );
}

#[test]
fn short_payload_is_unroutable() {
    let router = router();
    let mut store = MemoryTier::new();
    assert!(!router.mutates_state(&[0x01]));
    assert_eq!(router.required_cost(&[]), 0);
    assert_eq!(
        router.execute(&mut store, &[0x01, 0x02]),
        Err(PrecompileError::InvalidSelector { selector: None })
    );
}

#[test]
fn mutability_and_cost_queries() {
    let router = router();
    let add = add_preimage_call(b"hello world").unwrap();
    let get = get_preimage_call(11, PreimageHash::default()).unwrap();
    let size = get_preimage_size_call(PreimageHash::default()).unwrap();
    assert!(router.mutates_state(&add));
    assert!(!router.mutates_state(&get));
    assert!(!router.mutates_state(&size));
    assert_eq!(router.required_cost(&add), 1_100);
    assert_eq!(router.required_cost(&get), 1_100);
    assert_eq!(router.required_cost(&size), 100);
}

#[test]
fn truncated_arguments_cost_zero_and_fail_decode() {
    let router = router();
    let mut store = MemoryTier::new();
    let mut payload = get_preimage_call(11, PreimageHash::default()).unwrap();
    payload.truncate(4 + 40);
    assert_eq!(router.required_cost(&payload), 0);
    let Err(PrecompileError::Decode(err)) = router.execute(&mut store, &payload) else {
        unreachable!("truncated payload must fail to decode");
    };
    assert_eq!(err.slot, 1);
}

// ── construction ────────────────────────────────────────────────────

#[test]
fn router_from_embedded_abi() {
    let iface = Interface::from_json(STANDARD_ABI).unwrap();
    let router = MethodRouter::new(&iface, &EngineConfig::default(), TickFactory).unwrap();
    assert_eq!(router.routes().count(), 4);
}

#[test]
fn subset_interface_routes_only_its_methods() {
    let iface = Interface::from_json(STANDARD_ABI).unwrap();
    let subset = Interface::new(vec![iface.method("getPreimageSize").unwrap().clone()]).unwrap();
    let router = MethodRouter::new(&subset, &EngineConfig::default(), TickFactory).unwrap();
    let mut store = MemoryTier::new();
    assert!(matches!(
        router.execute(&mut store, &add_preimage_call(b"x").unwrap()),
        Err(PrecompileError::InvalidSelector { .. })
    ));
}

#[test]
fn method_without_handler_is_a_configuration_error() {
    let iface = Interface::new(vec![MethodDescriptor {
        name: "reset".into(),
        inputs: vec![],
        outputs: vec![],
        mutability: StateMutability::Nonpayable,
    }])
    .unwrap();
    assert!(matches!(
        MethodRouter::new(&iface, &EngineConfig::default(), TickFactory),
        Err(RouterError::MissingHandler(name)) if name == "reset"
    ));
}

#[test]
fn schema_and_mutability_mismatches_are_rejected() {
    let wrong_types = Interface::new(vec![MethodDescriptor {
        name: "getPreimageSize".into(),
        inputs: vec![Param::new("hash", ParamType::Uint(256))],
        outputs: vec![Param::new("size", ParamType::Uint(256))],
        mutability: StateMutability::View,
    }])
    .unwrap();
    assert!(matches!(
        MethodRouter::new(&wrong_types, &EngineConfig::default(), TickFactory),
        Err(RouterError::SchemaMismatch { method, .. }) if method == "getPreimageSize"
    ));

    let wrong_mutability = Interface::new(vec![MethodDescriptor {
        mutability: StateMutability::View,
        ..replay_core::Handler::AddPreimage.descriptor()
    }])
    .unwrap();
    assert!(matches!(
        MethodRouter::new(&wrong_mutability, &EngineConfig::default(), TickFactory),
        Err(RouterError::MutabilityMismatch { declared: false, .. })
    ));
}
