// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for routing and execution.

use replay_abi::{selector_hex, DecodeError, EncodeError, InterfaceError, Selector};
use replay_cas::{CasError, PreimageHash};
use thiserror::Error;

use crate::machine::MachineError;

fn describe(selector: Option<&Selector>) -> String {
    selector.map_or_else(|| "<short payload>".to_owned(), selector_hex)
}

/// Failure of one `execute` call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrecompileError {
    /// No method is registered for the payload's selector.
    #[error("[INVALID_SELECTOR] no method for {}", describe(.selector.as_ref()))]
    InvalidSelector {
        /// Leading four bytes, or `None` when the payload is shorter.
        selector: Option<Selector>,
    },
    /// Arguments did not decode against the method's input schema.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Result did not encode against the method's output schema.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// Static root is absent (or empty) in the store.
    #[error("[INVALID_STATIC_ROOT] {0}")]
    InvalidStaticRoot(PreimageHash),
    /// Dynamic root is absent (or empty) in the store.
    #[error("[INVALID_DYNAMIC_ROOT] {0}")]
    InvalidDynamicRoot(PreimageHash),
    /// Caller-declared size disagrees with the stored size.
    #[error("[SIZE_MISMATCH] expected {expected} bytes, stored {actual}")]
    SizeMismatch {
        /// Size the caller declared.
        expected: u64,
        /// Size actually stored.
        actual: u64,
    },
    /// Stored state blobs were rejected by the machine factory.
    #[error("[MACHINE_INIT] {0}")]
    MachineInit(MachineError),
    /// Machine could not serialize its state after replay.
    #[error("[MACHINE_STATE] {0}")]
    MachineState(MachineError),
    /// Event channel outside the machine's inputs (reject policy only).
    #[error("[INVALID_CHANNEL] event {index} uses channel {channel}")]
    InvalidChannel {
        /// Position in the activity log.
        index: usize,
        /// Offending channel.
        channel: u8,
    },
    /// A required preimage is missing.
    #[error("[NOT_FOUND] no preimage for {0}")]
    NotFound(PreimageHash),
    /// Store failure other than a plain miss.
    #[error(transparent)]
    Store(CasError),
}

impl From<CasError> for PrecompileError {
    fn from(err: CasError) -> Self {
        match err {
            CasError::NotFound(hash) => Self::NotFound(hash),
            other => Self::Store(other),
        }
    }
}

/// Configuration fault detected while building a router.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A descriptor names a method with no handler.
    #[error("[ROUTER_MISSING_HANDLER] no handler for method `{0}`")]
    MissingHandler(String),
    /// Two descriptors derive the same selector.
    #[error("[ROUTER_SELECTOR_COLLISION] {} shared by `{first}` and `{second}`", selector_hex(.selector))]
    SelectorCollision {
        /// Colliding selector.
        selector: Selector,
        /// Method registered first.
        first: String,
        /// Method that collided.
        second: String,
    },
    /// Descriptor types disagree with the handler's typed schema.
    #[error("[ROUTER_SCHEMA_MISMATCH] `{method}` declares {declared}, handler expects {expected}")]
    SchemaMismatch {
        /// Method name.
        method: String,
        /// Signature the descriptor declares.
        declared: String,
        /// Signature the handler decodes.
        expected: String,
    },
    /// Descriptor mutability disagrees with the handler.
    #[error("[ROUTER_MUTABILITY_MISMATCH] `{method}` declared mutates_state={declared}")]
    MutabilityMismatch {
        /// Method name.
        method: String,
        /// Whether the descriptor claims the method writes state.
        declared: bool,
    },
    /// Built-in interface failed to assemble.
    #[error(transparent)]
    Interface(#[from] InterfaceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_rendering() {
        let err = PrecompileError::InvalidSelector {
            selector: Some([0xde, 0xad, 0xbe, 0xef]),
        };
        assert_eq!(err.to_string(), "[INVALID_SELECTOR] no method for 0xdeadbeef");
        let short = PrecompileError::InvalidSelector { selector: None };
        assert!(short.to_string().contains("short payload"));
    }

    #[test]
    fn store_miss_maps_to_not_found() {
        let hash = PreimageHash([7; 32]);
        assert_eq!(
            PrecompileError::from(CasError::NotFound(hash)),
            PrecompileError::NotFound(hash)
        );
        let computed = PreimageHash([8; 32]);
        assert!(matches!(
            PrecompileError::from(CasError::HashMismatch { expected: hash, computed }),
            PrecompileError::Store(CasError::HashMismatch { .. })
        ));
    }
}
