// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Contract between the replay engine and the machine being replayed.

use thiserror::Error;

/// Number of input channels a machine exposes.
pub const CHANNELS: usize = 8;

/// Press state of every input channel, indexed by channel.
pub type ChannelStates = [bool; CHANNELS];

/// Failures raised by a machine implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// Static blob is not a valid program image for this machine.
    #[error("invalid static state: {0}")]
    InvalidStatic(String),
    /// Dynamic blob is not a valid serialized runtime state.
    #[error("invalid dynamic state: {0}")]
    InvalidDynamic(String),
    /// Runtime state could not be written back out.
    #[error("serialize failed: {0}")]
    Serialize(String),
}

/// A live machine instance.
///
/// Stepping is infallible: once reconstructed, a machine must accept any
/// number of steps under any input state.
pub trait Machine {
    /// Apply the full input state; it holds until the next call.
    fn set_input_state(&mut self, channels: ChannelStates);

    /// Execute exactly one discrete step.
    fn step_once(&mut self);

    /// Serialize the mutable runtime state.
    ///
    /// Must be lossless: reconstructing from the same static blob and this
    /// output yields a machine that behaves identically.
    fn serialize_dynamic_state(&self) -> Result<Vec<u8>, MachineError>;
}

/// Builds machine instances from a `(static, dynamic)` state pair.
pub trait MachineFactory {
    /// Machine type produced.
    type Machine: Machine;

    /// Reconstruct a machine from stored state blobs.
    fn reconstruct(&self, static_state: &[u8], dynamic_state: &[u8]) -> Result<Self::Machine, MachineError>;
}

impl<M, F> MachineFactory for F
where
    M: Machine,
    F: Fn(&[u8], &[u8]) -> Result<M, MachineError>,
{
    type Machine = M;

    fn reconstruct(&self, static_state: &[u8], dynamic_state: &[u8]) -> Result<M, MachineError> {
        self(static_state, dynamic_state)
    }
}
