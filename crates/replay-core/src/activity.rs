// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Activity log records.

use replay_abi::codec::{CodecError, Reader, TupleEncoder};
use replay_abi::{AbiValue, ParamType};
use serde::{Deserialize, Serialize};

use crate::machine::CHANNELS;

/// One input event: hold `channel` at `press` for `duration` steps.
///
/// Encoded as the static record `(uint8,bool,uint32)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Action {
    /// Input channel index. Only `0..CHANNELS` reach the machine.
    pub channel: u8,
    /// Pressed (`true`) or released.
    pub press: bool,
    /// Steps to execute after applying the input state.
    pub duration: u32,
}

impl Action {
    /// Build an action.
    pub const fn new(channel: u8, press: bool, duration: u32) -> Self {
        Self {
            channel,
            press,
            duration,
        }
    }

    /// Whether the channel addresses a real machine input.
    pub fn in_range(&self) -> bool {
        usize::from(self.channel) < CHANNELS
    }
}

type Record = (u8, bool, u32);

impl AbiValue for Action {
    const DYNAMIC: bool = false;
    const HEAD_WORDS: usize = 3;

    fn param_type() -> ParamType {
        Record::param_type()
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let (channel, press, duration) = Record::decode(reader)?;
        Ok(Self::new(channel, press, duration))
    }

    fn encode(&self, enc: &mut TupleEncoder) -> Result<(), CodecError> {
        (self.channel, self.press, self.duration).encode(enc)
    }
}

/// Total steps an activity log requests.
pub fn total_steps(activity: &[Action]) -> u64 {
    activity.iter().map(|a| u64::from(a.duration)).sum()
}

/// Treatment of events whose channel is outside `0..CHANNELS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelPolicy {
    /// Skip the input change but still execute and charge the steps.
    #[default]
    Ignore,
    /// Fail the whole call before any machine is built.
    Reject,
}
