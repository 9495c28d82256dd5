// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deterministic reference machine.
//!
//! `TickMachine` walks a byte program, folding each opcode, the cycle counter
//! and the current input mask into an accumulator and a small RAM. It is not
//! meant to compute anything useful; it exists so replay results can be
//! checked bit-for-bit against an independent step loop.
//!
//! Static blob: `b"TICK" || program` (program non-empty).
//!
//! Dynamic blob, little-endian:
//!
//! | offset | len | field   |
//! |--------|-----|---------|
//! | 0      | 4   | `b"TKS1"` |
//! | 4      | 8   | cycle   |
//! | 12     | 4   | pc      |
//! | 16     | 4   | acc     |
//! | 20     | 1   | input mask |
//! | 21     | 64  | ram     |

use replay_core::{ChannelStates, Machine, MachineError, MachineFactory};

/// Static blob prefix.
pub const STATIC_MAGIC: [u8; 4] = *b"TICK";
/// Dynamic blob prefix.
pub const STATE_MAGIC: [u8; 4] = *b"TKS1";
/// RAM bytes carried in the dynamic state.
pub const RAM_SIZE: usize = 64;
/// Exact length of a serialized dynamic state.
pub const STATE_LEN: usize = 4 + 8 + 4 + 4 + 1 + RAM_SIZE;

/// Deterministic toy machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickMachine {
    program: Vec<u8>,
    program_len: u32,
    cycle: u64,
    pc: u32,
    acc: u32,
    input: u8,
    ram: [u8; RAM_SIZE],
}

fn field<const N: usize>(state: &[u8], at: usize) -> Result<[u8; N], MachineError> {
    state
        .get(at..at + N)
        .and_then(|bytes| <[u8; N]>::try_from(bytes).ok())
        .ok_or_else(|| MachineError::InvalidDynamic(format!("truncated at offset {at}")))
}

impl TickMachine {
    /// Static blob for `program`.
    pub fn program(program: &[u8]) -> Vec<u8> {
        let mut out = STATIC_MAGIC.to_vec();
        out.extend_from_slice(program);
        out
    }

    /// Dynamic blob of a freshly powered-on machine.
    pub fn power_on_state() -> Vec<u8> {
        let mut out = Vec::with_capacity(STATE_LEN);
        out.extend_from_slice(&STATE_MAGIC);
        out.resize(STATE_LEN, 0);
        out
    }

    /// Rebuild a machine from its static and dynamic blobs.
    pub fn reconstruct(static_state: &[u8], dynamic_state: &[u8]) -> Result<Self, MachineError> {
        let program = static_state
            .strip_prefix(&STATIC_MAGIC)
            .ok_or_else(|| MachineError::InvalidStatic("missing TICK header".into()))?;
        if program.is_empty() {
            return Err(MachineError::InvalidStatic("empty program".into()));
        }
        let program_len = u32::try_from(program.len())
            .map_err(|_| MachineError::InvalidStatic("program too large".into()))?;

        if dynamic_state.len() != STATE_LEN {
            return Err(MachineError::InvalidDynamic(format!(
                "expected {STATE_LEN} bytes, got {}",
                dynamic_state.len()
            )));
        }
        if field::<4>(dynamic_state, 0)? != STATE_MAGIC {
            return Err(MachineError::InvalidDynamic("missing TKS1 header".into()));
        }
        let pc = u32::from_le_bytes(field(dynamic_state, 12)?);
        if pc >= program_len {
            return Err(MachineError::InvalidDynamic(format!("pc {pc} outside program")));
        }
        Ok(Self {
            program: program.to_vec(),
            program_len,
            cycle: u64::from_le_bytes(field(dynamic_state, 4)?),
            pc,
            acc: u32::from_le_bytes(field(dynamic_state, 16)?),
            input: field::<1>(dynamic_state, 20)?[0],
            ram: field(dynamic_state, 21)?,
        })
    }

    /// Steps executed since power-on.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Current input mask, bit `i` set when channel `i` is pressed.
    pub fn input(&self) -> u8 {
        self.input
    }

    /// Accumulator.
    pub fn acc(&self) -> u32 {
        self.acc
    }
}

impl Machine for TickMachine {
    fn set_input_state(&mut self, channels: ChannelStates) {
        self.input = channels
            .iter()
            .enumerate()
            .filter(|(_, pressed)| **pressed)
            .fold(0u8, |mask, (bit, _)| mask | (1 << bit));
    }

    fn step_once(&mut self) {
        let op = self.program[self.pc as usize];
        let tick = self.cycle.to_le_bytes()[0];
        self.acc = self.acc.rotate_left(5) ^ u32::from(op) ^ (u32::from(self.input) << 8);
        self.acc = self.acc.wrapping_add(u32::from(tick));
        let slot = usize::from(self.acc.to_le_bytes()[0]) % RAM_SIZE;
        self.ram[slot] = self.ram[slot].wrapping_add(op) ^ self.input;
        self.pc = self.pc.wrapping_add(1 + (self.acc & 3)) % self.program_len;
        self.cycle = self.cycle.wrapping_add(1);
    }

    fn serialize_dynamic_state(&self) -> Result<Vec<u8>, MachineError> {
        let mut out = Vec::with_capacity(STATE_LEN);
        out.extend_from_slice(&STATE_MAGIC);
        out.extend_from_slice(&self.cycle.to_le_bytes());
        out.extend_from_slice(&self.pc.to_le_bytes());
        out.extend_from_slice(&self.acc.to_le_bytes());
        out.push(self.input);
        out.extend_from_slice(&self.ram);
        Ok(out)
    }
}

/// Factory handing out [`TickMachine`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickFactory;

impl MachineFactory for TickFactory {
    type Machine = TickMachine;

    fn reconstruct(&self, static_state: &[u8], dynamic_state: &[u8]) -> Result<TickMachine, MachineError> {
        TickMachine::reconstruct(static_state, dynamic_state)
    }
}
