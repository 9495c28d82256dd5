// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! One state transition: validate, reconstruct, replay, commit.

use std::sync::Arc;

use replay_cas::{BlobStore, PreimageHash};
use tracing::{debug, info, instrument};

use crate::activity::{total_steps, Action, ChannelPolicy};
use crate::config::EngineConfig;
use crate::error::PrecompileError;
use crate::machine::{ChannelStates, Machine, MachineError, MachineFactory, CHANNELS};
use crate::state_codec::StateCodec;

/// Drives a machine from a stored state pair through an activity log.
///
/// Holds no machine between calls: each [`run`](Self::run) builds one from
/// the store and drops it after serializing the new dynamic state. Nothing is
/// written until the replay has completed.
#[derive(Debug, Clone)]
pub struct ReplayEngine<F> {
    factory: F,
    channel_policy: ChannelPolicy,
    reject_empty_roots: bool,
    state_codec: StateCodec,
}

impl<F: MachineFactory> ReplayEngine<F> {
    /// Engine with the policies from `config`.
    pub fn new(factory: F, config: &EngineConfig) -> Self {
        Self {
            factory,
            channel_policy: config.channel_policy,
            reject_empty_roots: config.reject_empty_roots,
            state_codec: config.state_codec,
        }
    }

    /// Replay `activity` from `(static_root, dynamic_root)` and store the result.
    ///
    /// Returns the content hash of the new dynamic state.
    #[instrument(skip_all, fields(
        static_root = %static_root.short(),
        dynamic_root = %dynamic_root.short(),
        events = activity.len(),
    ))]
    pub fn run<S: BlobStore + ?Sized>(
        &self,
        store: &mut S,
        static_root: PreimageHash,
        dynamic_root: PreimageHash,
        activity: &[Action],
    ) -> Result<PreimageHash, PrecompileError> {
        let static_blob = self
            .resolve(store, &static_root)?
            .ok_or(PrecompileError::InvalidStaticRoot(static_root))?;
        let dynamic_blob = self
            .resolve(store, &dynamic_root)?
            .ok_or(PrecompileError::InvalidDynamicRoot(dynamic_root))?;
        self.check_channels(activity)?;

        let static_state = self.state_codec.decode(&static_blob).map_err(|err| {
            PrecompileError::MachineInit(MachineError::InvalidStatic(err.to_string()))
        })?;
        let dynamic_state = self.state_codec.decode(&dynamic_blob).map_err(|err| {
            PrecompileError::MachineInit(MachineError::InvalidDynamic(err.to_string()))
        })?;
        let mut machine = self
            .factory
            .reconstruct(&static_state, &dynamic_state)
            .map_err(PrecompileError::MachineInit)?;

        let steps = replay(&mut machine, activity);
        debug_assert_eq!(steps, total_steps(activity));

        let next = machine
            .serialize_dynamic_state()
            .map_err(PrecompileError::MachineState)?;
        let stored = self
            .state_codec
            .encode(&next)
            .map_err(|err| PrecompileError::MachineState(MachineError::Serialize(err.to_string())))?;
        let root = store.add(&stored);
        info!(steps, new_root = %root.short(), bytes = stored.len(), "state committed");
        Ok(root)
    }

    /// Bytes under `hash`, or `None` when the root counts as absent.
    fn resolve<S: BlobStore + ?Sized>(
        &self,
        store: &S,
        hash: &PreimageHash,
    ) -> Result<Option<Arc<[u8]>>, PrecompileError> {
        if !store.has(hash) {
            return Ok(None);
        }
        if self.reject_empty_roots && store.size(hash)? == 0 {
            debug!(root = %hash.short(), "empty root treated as absent");
            return Ok(None);
        }
        Ok(Some(store.get(hash)?))
    }

    fn check_channels(&self, activity: &[Action]) -> Result<(), PrecompileError> {
        if self.channel_policy == ChannelPolicy::Ignore {
            return Ok(());
        }
        match activity.iter().position(|action| !action.in_range()) {
            Some(index) => Err(PrecompileError::InvalidChannel {
                index,
                channel: activity[index].channel,
            }),
            None => Ok(()),
        }
    }
}

/// Apply each event then step it out. Returns the number of steps executed.
fn replay<M: Machine>(machine: &mut M, activity: &[Action]) -> u64 {
    let mut channels: ChannelStates = [false; CHANNELS];
    let mut steps = 0u64;
    for action in activity {
        if let Some(slot) = channels.get_mut(usize::from(action.channel)) {
            *slot = action.press;
        }
        machine.set_input_state(channels);
        for _ in 0..action.duration {
            machine.step_once();
        }
        steps += u64::from(action.duration);
    }
    steps
}
