// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Selector-routed replay precompile.
//!
//! A call payload is `selector || arguments`. [`MethodRouter`] resolves the
//! selector against a fixed table of typed handlers and offers three entry
//! points over the same payload:
//!
//! - [`MethodRouter::mutates_state`] and [`MethodRouter::required_cost`] are
//!   speculative queries. An unroutable payload yields `false` / `0`.
//! - [`MethodRouter::execute`] runs the call against a [`BlobStore`] and
//!   fails with [`PrecompileError::InvalidSelector`] when nothing matches.
//!
//! The `run` method hands its arguments to [`ReplayEngine`], which rebuilds a
//! machine from two stored preimages through a host-supplied
//! [`MachineFactory`], replays an activity log and stores the new dynamic
//! state. The result is a pure function of the inputs and the store contents.
//!
//! [`BlobStore`]: replay_cas::BlobStore
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
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod activity;
pub mod config;
mod cost;
mod error;
mod machine;
pub mod methods;
mod replay;
mod router;
mod state_codec;

pub use activity::{Action, ChannelPolicy};
pub use config::EngineConfig;
pub use cost::GasSchedule;
pub use error::{PrecompileError, RouterError};
pub use machine::{ChannelStates, Machine, MachineError, MachineFactory, CHANNELS};
pub use methods::{standard_interface, Handler};
pub use replay::ReplayEngine;
pub use router::MethodRouter;
pub use state_codec::StateCodec;
