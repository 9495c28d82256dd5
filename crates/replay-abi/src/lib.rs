// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Positional argument codec for replay precompile call payloads.
//!
//! Payloads follow the standard contract-ABI layout: a 4-byte selector, then
//! one frame of 32-byte big-endian words. Static values sit in the head;
//! dynamic values (`bytes`, arrays, tuples containing either) sit in the tail
//! behind an offset word.
//!
//! Two decoding paths share the same word-level [`codec`]:
//!
//! - [`AbiValue`] / [`AbiParams`]: each method declares Rust types for its
//!   inputs and outputs and decodes straight into them.
//! - [`Token`] / [`ParamType`]: schema-driven encoding for tooling that only
//!   has a descriptor at hand.
//!
//! Decoding is total: every length and offset is checked against the bytes
//! that remain before anything is allocated, and errors name the positional
//! slot that failed.
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
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

pub mod codec;
pub mod interface;
pub mod types;
pub mod value;

pub use codec::{CodecError, DecodeError, EncodeError, Reader, TupleEncoder, WORD};
pub use interface::{
    selector, selector_hex, Interface, InterfaceError, MethodDescriptor, Param, Selector,
    StateMutability,
};
pub use types::{decode_tokens, encode_tokens, ParamType, Token};
pub use value::{AbiParams, AbiValue, Bytes, Uint256};

/// Width of a method selector in bytes.
pub const SELECTOR_LEN: usize = 4;

/// Split a call payload into its selector and argument frame.
///
/// Returns `None` when the payload is shorter than a selector.
pub fn split_selector(payload: &[u8]) -> Option<(Selector, &[u8])> {
    if payload.len() < SELECTOR_LEN {
        return None;
    }
    let (head, rest) = payload.split_at(SELECTOR_LEN);
    let mut selector = [0u8; SELECTOR_LEN];
    selector.copy_from_slice(head);
    Some((selector, rest))
}

/// Prefix `args` with `selector`.
pub fn with_selector(selector: Selector, args: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(SELECTOR_LEN + args.len());
    out.extend_from_slice(&selector);
    out.extend_from_slice(args);
    out
}
