// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Call payload builders.
//!
//! Thin wrappers over [`encode_call`] so tests can write
//! `run_call(s, d, &activity)` instead of assembling argument records.

use replay_abi::EncodeError;
use replay_cas::{BlobStore, PreimageHash};
use replay_core::methods::{
    encode_call, AddPreimage, AddPreimageArgs, GetPreimage, GetPreimageArgs, GetPreimageSize,
    GetPreimageSizeArgs, Run, RunArgs,
};
use replay_core::{Action, StateCodec};

use crate::machine::TickMachine;

/// Payload for `run(static_root, dynamic_root, activity)`.
pub fn run_call(
    static_root: PreimageHash,
    dynamic_root: PreimageHash,
    activity: &[Action],
) -> Result<Vec<u8>, EncodeError> {
    encode_call::<Run>(&RunArgs {
        static_root,
        dynamic_root,
        activity: activity.to_vec(),
    })
}

/// Payload for `addPreimage(preimage)`.
pub fn add_preimage_call(preimage: &[u8]) -> Result<Vec<u8>, EncodeError> {
    encode_call::<AddPreimage>(&AddPreimageArgs {
        preimage: preimage.to_vec(),
    })
}

/// Payload for `getPreimageSize(hash)`.
pub fn get_preimage_size_call(hash: PreimageHash) -> Result<Vec<u8>, EncodeError> {
    encode_call::<GetPreimageSize>(&GetPreimageSizeArgs { hash })
}

/// Payload for `getPreimage(expected_size, hash)`.
pub fn get_preimage_call(expected_size: u64, hash: PreimageHash) -> Result<Vec<u8>, EncodeError> {
    encode_call::<GetPreimage>(&GetPreimageArgs { expected_size, hash })
}

/// Store a [`TickMachine`] running `program` from power-on.
///
/// Returns `(static_root, dynamic_root)`.
pub fn seed_machine<S: BlobStore + ?Sized>(store: &mut S, program: &[u8]) -> (PreimageHash, PreimageHash) {
    let static_root = store.add(&TickMachine::program(program));
    let dynamic_root = store.add(&TickMachine::power_on_state());
    (static_root, dynamic_root)
}

/// [`seed_machine`] with both blobs stored in `codec`'s at-rest form.
pub fn seed_encoded_machine<S: BlobStore + ?Sized>(
    store: &mut S,
    program: &[u8],
    codec: StateCodec,
) -> std::io::Result<(PreimageHash, PreimageHash)> {
    let static_root = store.add(&codec.encode(&TickMachine::program(program))?);
    let dynamic_root = store.add(&codec.encode(&TickMachine::power_on_state())?);
    Ok((static_root, dynamic_root))
}
