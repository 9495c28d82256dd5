// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for replay crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`calls`] - Call payload builders for the precompile methods
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`machine`] - Deterministic reference machine and its factory

pub mod calls;
pub mod config;
pub mod machine;

pub use calls::{
    add_preimage_call, get_preimage_call, get_preimage_size_call, run_call, seed_encoded_machine,
    seed_machine,
};
pub use config::InMemoryConfigStore;
pub use machine::{TickFactory, TickMachine};
