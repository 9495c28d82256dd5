// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Parameter schemas and schema-driven token encoding.

use crate::codec::{CodecError, DecodeError, EncodeError, Reader, TupleEncoder, WORD};

/// Declared type of one positional parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// `uintN`, with `N` a multiple of 8 in `8..=256`.
    Uint(u16),
    /// `bool`.
    Bool,
    /// `bytesN`, with `N` in `1..=32`.
    FixedBytes(usize),
    /// `bytes`.
    Bytes,
    /// `T[]`.
    Array(Box<ParamType>),
    /// `(T1,T2,...)`.
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Canonical type name as it appears in a method signature.
    pub fn canonical(&self) -> String {
        match self {
            Self::Uint(bits) => format!("uint{bits}"),
            Self::Bool => "bool".to_owned(),
            Self::FixedBytes(width) => format!("bytes{width}"),
            Self::Bytes => "bytes".to_owned(),
            Self::Array(inner) => format!("{}[]", inner.canonical()),
            Self::Tuple(fields) => {
                let inner: Vec<String> = fields.iter().map(Self::canonical).collect();
                format!("({})", inner.join(","))
            }
        }
    }

    /// Whether values of this type live in the tail of their frame.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::Uint(_) | Self::Bool | Self::FixedBytes(_) => false,
            Self::Bytes | Self::Array(_) => true,
            Self::Tuple(fields) => fields.iter().any(Self::is_dynamic),
        }
    }

    /// Words this type occupies in the head of its enclosing frame.
    pub fn head_words(&self) -> usize {
        match self {
            Self::Tuple(fields) if !self.is_dynamic() => fields.iter().map(Self::head_words).sum(),
            _ => 1,
        }
    }
}

/// Dynamically shaped ABI value, checked against a [`ParamType`] at use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Unsigned integer (64-bit range).
    Uint(u64),
    /// Boolean.
    Bool(bool),
    /// Fixed-size byte value; length must equal the declared width.
    FixedBytes(Vec<u8>),
    /// Dynamic byte string.
    Bytes(Vec<u8>),
    /// Homogeneous sequence.
    Array(Vec<Token>),
    /// Record.
    Tuple(Vec<Token>),
}

fn mismatch(ty: &ParamType) -> CodecError {
    CodecError::TypeMismatch {
        expected: ty.canonical(),
    }
}

fn encode_frame(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, CodecError> {
    if types.len() != tokens.len() {
        return Err(CodecError::Arity {
            expected: types.len(),
            actual: tokens.len(),
        });
    }
    let head_words = types.iter().map(ParamType::head_words).sum();
    let mut enc = TupleEncoder::new(head_words);
    for (ty, token) in types.iter().zip(tokens) {
        encode_token(ty, token, &mut enc)?;
    }
    Ok(enc.finish())
}

fn encode_token(ty: &ParamType, token: &Token, enc: &mut TupleEncoder) -> Result<(), CodecError> {
    match (ty, token) {
        (ParamType::Uint(bits), Token::Uint(value)) => {
            if *bits < 64 && value >> bits != 0 {
                return Err(CodecError::IntegerOverflow);
            }
            enc.push_uint(*value);
        }
        (ParamType::Bool, Token::Bool(value)) => enc.push_bool(*value),
        (ParamType::FixedBytes(width), Token::FixedBytes(bytes)) => {
            enc.push_fixed_bytes(bytes, *width)?;
        }
        (ParamType::Bytes, Token::Bytes(bytes)) => enc.push_dynamic_bytes(bytes),
        (ParamType::Array(inner), Token::Array(items)) => {
            let types = vec![(**inner).clone(); items.len()];
            let mut body = crate::codec::word_u64(items.len() as u64).to_vec();
            body.extend_from_slice(&encode_frame(&types, items)?);
            enc.push_dynamic(&body);
        }
        (ParamType::Tuple(fields), Token::Tuple(items)) => {
            if ty.is_dynamic() {
                enc.push_dynamic(&encode_frame(fields, items)?);
            } else {
                if fields.len() != items.len() {
                    return Err(CodecError::Arity {
                        expected: fields.len(),
                        actual: items.len(),
                    });
                }
                for (field, item) in fields.iter().zip(items) {
                    encode_token(field, item, enc)?;
                }
            }
        }
        _ => return Err(mismatch(ty)),
    }
    Ok(())
}

fn decode_token(ty: &ParamType, reader: &mut Reader<'_>) -> Result<Token, CodecError> {
    match ty {
        ParamType::Uint(bits) => reader.read_uint(*bits).map(Token::Uint),
        ParamType::Bool => reader.read_bool().map(Token::Bool),
        ParamType::FixedBytes(width) => reader
            .read_fixed_bytes(*width)
            .map(|bytes| Token::FixedBytes(bytes.to_vec())),
        ParamType::Bytes => {
            let mut tail = reader.read_tail()?;
            tail.read_dynamic_bytes().map(|bytes| Token::Bytes(bytes.to_vec()))
        }
        ParamType::Array(inner) => {
            let mut tail = reader.read_tail()?;
            let len = tail.read_length(inner.head_words() * WORD)?;
            let mut items = Reader::new(tail.rest());
            let mut out = Vec::with_capacity(len);
            for _ in 0..len {
                out.push(decode_token(inner, &mut items)?);
            }
            Ok(Token::Array(out))
        }
        ParamType::Tuple(fields) => {
            if ty.is_dynamic() {
                let mut tail = reader.read_tail()?;
                fields
                    .iter()
                    .map(|field| decode_token(field, &mut tail))
                    .collect::<Result<_, _>>()
                    .map(Token::Tuple)
            } else {
                fields
                    .iter()
                    .map(|field| decode_token(field, reader))
                    .collect::<Result<_, _>>()
                    .map(Token::Tuple)
            }
        }
    }
}

/// Encode `tokens` as one argument/result frame declared by `types`.
pub fn encode_tokens(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, EncodeError> {
    if types.len() != tokens.len() {
        return Err(EncodeError {
            slot: types.len().min(tokens.len()),
            source: CodecError::Arity {
                expected: types.len(),
                actual: tokens.len(),
            },
        });
    }
    let head_words = types.iter().map(ParamType::head_words).sum();
    let mut enc = TupleEncoder::new(head_words);
    for (slot, (ty, token)) in types.iter().zip(tokens).enumerate() {
        encode_token(ty, token, &mut enc).map_err(|source| EncodeError { slot, source })?;
    }
    Ok(enc.finish())
}

/// Decode one argument/result frame declared by `types`.
pub fn decode_tokens(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, DecodeError> {
    let mut reader = Reader::new(data);
    types
        .iter()
        .enumerate()
        .map(|(slot, ty)| decode_token(ty, &mut reader).map_err(|source| DecodeError { slot, source }))
        .collect()
}
