// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pre-flight cost schedule.
//!
//! Every price is a pure function of decoded arguments, computed before the
//! call runs. All arithmetic saturates at `u64::MAX`.

use serde::{Deserialize, Serialize};

use crate::activity::{total_steps, Action};

/// Cost constants for every method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GasSchedule {
    /// Flat charge for every `run`.
    pub run_base: u64,
    /// Charge per activity event.
    pub run_per_event: u64,
    /// Charge per requested machine step.
    pub run_per_step: u64,
    /// Charge per stored byte in `addPreimage`.
    pub add_preimage_per_byte: u64,
    /// Flat charge for `getPreimageSize`.
    pub get_preimage_size: u64,
    /// Charge per declared byte in `getPreimage`.
    pub get_preimage_per_byte: u64,
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self {
            run_base: 1_000_000,
            run_per_event: 100,
            run_per_step: 2,
            add_preimage_per_byte: 100,
            get_preimage_size: 100,
            get_preimage_per_byte: 100,
        }
    }
}

impl GasSchedule {
    /// `base + per_event * events + per_step * sum(durations)`.
    pub fn run(&self, activity: &[Action]) -> u64 {
        let events = u64::try_from(activity.len()).unwrap_or(u64::MAX);
        self.run_base
            .saturating_add(self.run_per_event.saturating_mul(events))
            .saturating_add(self.run_per_step.saturating_mul(total_steps(activity)))
    }

    /// Price of storing `len` bytes.
    pub fn add_preimage(&self, len: usize) -> u64 {
        let len = u64::try_from(len).unwrap_or(u64::MAX);
        self.add_preimage_per_byte.saturating_mul(len)
    }

    /// Price of a size query.
    pub fn get_preimage_size(&self) -> u64 {
        self.get_preimage_size
    }

    /// Price of reading a preimage declared to be `expected_size` bytes.
    pub fn get_preimage(&self, expected_size: u64) -> u64 {
        self.get_preimage_per_byte.saturating_mul(expected_size)
    }
}
