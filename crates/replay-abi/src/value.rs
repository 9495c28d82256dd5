// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Statically typed ABI values.
//!
//! Each method declares its argument and result shapes as Rust types. Decoding
//! produces that type directly, so a handler never inspects a generic value
//! list at runtime.

use crate::codec::{word_u64, CodecError, DecodeError, EncodeError, Reader, TupleEncoder, WORD};
use crate::types::ParamType;

/// A Rust type with a fixed ABI shape.
pub trait AbiValue: Sized {
    /// Whether the value is encoded in the tail of its frame.
    const DYNAMIC: bool;
    /// Words occupied in the head of the enclosing frame.
    const HEAD_WORDS: usize;

    /// Declared ABI type.
    fn param_type() -> ParamType;

    /// Decode from the reader's current head position.
    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError>;

    /// Append to an enclosing frame.
    fn encode(&self, enc: &mut TupleEncoder) -> Result<(), CodecError>;
}

macro_rules! uint_value {
    ($($ty:ty => $bits:expr),* $(,)?) => {$(
        impl AbiValue for $ty {
            const DYNAMIC: bool = false;
            const HEAD_WORDS: usize = 1;

            fn param_type() -> ParamType {
                ParamType::Uint($bits)
            }

            fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
                let value = reader.read_uint($bits)?;
                <$ty>::try_from(value).map_err(|_| CodecError::NonCanonical)
            }

            fn encode(&self, enc: &mut TupleEncoder) -> Result<(), CodecError> {
                enc.push_uint(u64::from(*self));
                Ok(())
            }
        }
    )*};
}

uint_value!(u8 => 8, u16 => 16, u32 => 32, u64 => 64);

/// `uint256` restricted to the `u64` range.
///
/// Sizes and counts are declared `uint256` on the wire; values that do not
/// fit 64 bits are rejected with [`CodecError::IntegerOverflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Uint256(pub u64);

impl AbiValue for Uint256 {
    const DYNAMIC: bool = false;
    const HEAD_WORDS: usize = 1;

    fn param_type() -> ParamType {
        ParamType::Uint(256)
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        reader.read_uint(256).map(Self)
    }

    fn encode(&self, enc: &mut TupleEncoder) -> Result<(), CodecError> {
        enc.push_uint(self.0);
        Ok(())
    }
}

impl AbiValue for bool {
    const DYNAMIC: bool = false;
    const HEAD_WORDS: usize = 1;

    fn param_type() -> ParamType {
        ParamType::Bool
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        reader.read_bool()
    }

    fn encode(&self, enc: &mut TupleEncoder) -> Result<(), CodecError> {
        enc.push_bool(*self);
        Ok(())
    }
}

impl AbiValue for [u8; 32] {
    const DYNAMIC: bool = false;
    const HEAD_WORDS: usize = 1;

    fn param_type() -> ParamType {
        ParamType::FixedBytes(32)
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(*reader.read_word()?)
    }

    fn encode(&self, enc: &mut TupleEncoder) -> Result<(), CodecError> {
        enc.push_word(*self);
        Ok(())
    }
}

/// Dynamic `bytes`.
///
/// Separate from `Vec<u8>`, which encodes as `uint8[]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bytes(pub Vec<u8>);

impl AbiValue for Bytes {
    const DYNAMIC: bool = true;
    const HEAD_WORDS: usize = 1;

    fn param_type() -> ParamType {
        ParamType::Bytes
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let mut tail = reader.read_tail()?;
        tail.read_dynamic_bytes().map(|bytes| Self(bytes.to_vec()))
    }

    fn encode(&self, enc: &mut TupleEncoder) -> Result<(), CodecError> {
        enc.push_dynamic_bytes(&self.0);
        Ok(())
    }
}

impl<T: AbiValue> AbiValue for Vec<T> {
    const DYNAMIC: bool = true;
    const HEAD_WORDS: usize = 1;

    fn param_type() -> ParamType {
        ParamType::Array(Box::new(T::param_type()))
    }

    fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let mut tail = reader.read_tail()?;
        let len = tail.read_length(T::HEAD_WORDS * WORD)?;
        let mut items = Reader::new(tail.rest());
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(T::decode(&mut items)?);
        }
        Ok(out)
    }

    fn encode(&self, enc: &mut TupleEncoder) -> Result<(), CodecError> {
        let mut items = TupleEncoder::new(self.len() * T::HEAD_WORDS);
        for item in self {
            item.encode(&mut items)?;
        }
        let mut body = word_u64(self.len() as u64).to_vec();
        body.extend_from_slice(&items.finish());
        enc.push_dynamic(&body);
        Ok(())
    }
}

/// A positional argument or result list.
///
/// Implemented for tuples of [`AbiValue`]s; errors name the failing slot.
pub trait AbiParams: Sized {
    /// Declared slot types, in order.
    fn param_types() -> Vec<ParamType>;

    /// Decode a full frame.
    fn decode_params(data: &[u8]) -> Result<Self, DecodeError>;

    /// Encode a full frame.
    fn encode_params(&self) -> Result<Vec<u8>, EncodeError>;
}

macro_rules! tuple_impls {
    ($( ($($name:ident $idx:tt),+) )+) => {$(
        impl<$($name: AbiValue),+> AbiValue for ($($name,)+) {
            const DYNAMIC: bool = false $(|| $name::DYNAMIC)+;
            const HEAD_WORDS: usize = if Self::DYNAMIC { 1 } else { 0 $(+ $name::HEAD_WORDS)+ };

            fn param_type() -> ParamType {
                ParamType::Tuple(vec![$($name::param_type()),+])
            }

            fn decode(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
                if Self::DYNAMIC {
                    let mut tail = reader.read_tail()?;
                    Ok(($($name::decode(&mut tail)?,)+))
                } else {
                    Ok(($($name::decode(reader)?,)+))
                }
            }

            fn encode(&self, enc: &mut TupleEncoder) -> Result<(), CodecError> {
                if Self::DYNAMIC {
                    let mut inner = TupleEncoder::new(0 $(+ $name::HEAD_WORDS)+);
                    $(self.$idx.encode(&mut inner)?;)+
                    enc.push_dynamic(&inner.finish());
                } else {
                    $(self.$idx.encode(enc)?;)+
                }
                Ok(())
            }
        }

        impl<$($name: AbiValue),+> AbiParams for ($($name,)+) {
            fn param_types() -> Vec<ParamType> {
                vec![$($name::param_type()),+]
            }

            fn decode_params(data: &[u8]) -> Result<Self, DecodeError> {
                let mut reader = Reader::new(data);
                Ok(($(
                    $name::decode(&mut reader)
                        .map_err(|source| DecodeError { slot: $idx, source })?,
                )+))
            }

            fn encode_params(&self) -> Result<Vec<u8>, EncodeError> {
                let mut enc = TupleEncoder::new(0 $(+ $name::HEAD_WORDS)+);
                $(
                    self.$idx
                        .encode(&mut enc)
                        .map_err(|source| EncodeError { slot: $idx, source })?;
                )+
                Ok(enc.finish())
            }
        }
    )+};
}

tuple_impls! {
    (A 0)
    (A 0, B 1)
    (A 0, B 1, C 2)
    (A 0, B 1, C 2, D 3)
}
