// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fuzz coverage for the ABI wire codec.
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use replay_abi::codec::word_u64;
use replay_abi::{decode_tokens, AbiParams, Bytes, CodecError, ParamType, Uint256, WORD};

type RunArgs = ([u8; 32], [u8; 32], Vec<(u8, bool, u32)>);

proptest! {
    #[test]
    fn fuzz_typed_decode_no_panics(bytes in prop::collection::vec(any::<u8>(), 0..1024)) {
        // The goal is simply to ensure this does not panic.
        let _ = RunArgs::decode_params(&bytes);
        let _ = <(Bytes,)>::decode_params(&bytes);
        let _ = <(Uint256, [u8; 32])>::decode_params(&bytes);
    }

    #[test]
    fn fuzz_token_decode_no_panics(bytes in prop::collection::vec(any::<u8>(), 0..1024)) {
        let types = RunArgs::param_types();
        let _ = decode_tokens(&types, &bytes);
    }

    #[test]
    fn declared_length_must_be_backed_by_input(
        declared in 0u64..10_000,
        payload in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let mut data = word_u64(WORD as u64).to_vec();
        data.extend_from_slice(&word_u64(declared));
        data.extend_from_slice(&payload);
        data.resize(data.len() + (WORD - payload.len() % WORD) % WORD, 0);

        let res = <(Bytes,)>::decode_params(&data);
        let backed = data.len() - 2 * WORD;
        if (declared as usize) <= backed {
            // Only fails if the declared range has dirty padding.
            if let Ok((Bytes(out),)) = res {
                prop_assert_eq!(out.as_slice(), &data[2 * WORD..2 * WORD + declared as usize]);
            }
        } else {
            prop_assert!(res.is_err());
        }
    }

    #[test]
    fn activity_round_trip(
        events in prop::collection::vec((0u8..=255, any::<bool>(), any::<u32>()), 0..32)
    ) {
        let args: RunArgs = ([9; 32], [8; 32], events);
        let encoded = args.encode_params().unwrap();
        prop_assert_eq!(RunArgs::decode_params(&encoded).unwrap(), args);
    }
}

#[test]
fn activity_length_larger_than_payload_is_rejected() {
    let mut data = Vec::new();
    data.extend_from_slice(&[0u8; 64]);
    data.extend_from_slice(&word_u64(3 * WORD as u64));
    data.extend_from_slice(&word_u64(1_000_000));
    let err = RunArgs::decode_params(&data).unwrap_err();
    assert_eq!(err.slot, 2);
    assert_eq!(err.source, CodecError::LengthTooLarge);
}

#[test]
fn signature_of_run_args() {
    let types = RunArgs::param_types();
    let names: Vec<String> = types.iter().map(ParamType::canonical).collect();
    assert_eq!(names, ["bytes32", "bytes32", "(uint8,bool,uint32)[]"]);
}
