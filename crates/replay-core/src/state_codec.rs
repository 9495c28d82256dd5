// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! At-rest encoding of machine state blobs.
//!
//! The engine decodes both state preimages before reconstructing a machine
//! and encodes the new dynamic state before storing it. Hashes always cover
//! the stored (encoded) bytes.

use std::borrow::Cow;
use std::io::{self, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

/// How state blobs are held in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateCodec {
    /// Bytes exactly as the machine serialized them.
    #[default]
    Identity,
    /// gzip stream (RFC 1952) with a zeroed header timestamp.
    Gzip,
}

impl StateCodec {
    /// Stored form of a serialized state.
    pub fn encode(self, state: &[u8]) -> io::Result<Cow<'_, [u8]>> {
        match self {
            Self::Identity => Ok(Cow::Borrowed(state)),
            Self::Gzip => {
                let mut gz = GzEncoder::new(Vec::new(), Compression::default());
                gz.write_all(state)?;
                gz.finish().map(Cow::Owned)
            }
        }
    }

    /// Serialized state held in a stored blob.
    pub fn decode(self, stored: &[u8]) -> io::Result<Cow<'_, [u8]>> {
        match self {
            Self::Identity => Ok(Cow::Borrowed(stored)),
            Self::Gzip => {
                let mut out = Vec::new();
                GzDecoder::new(stored).read_to_end(&mut out)?;
                Ok(Cow::Owned(out))
            }
        }
    }
}
