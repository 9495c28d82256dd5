// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Word-level codec helpers (32-byte big-endian words, head/tail layout).

use thiserror::Error;

/// Width of one ABI word in bytes.
pub const WORD: usize = 32;

/// Errors produced by codec readers and encoders.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Attempted to read beyond the end of the buffer.
    #[error("buffer too short")]
    OutOfBounds,
    /// High-order or padding bytes that a canonical encoder leaves zero were set.
    #[error("non-canonical encoding")]
    NonCanonical,
    /// Integer does not fit the supported 64-bit range.
    #[error("integer out of range")]
    IntegerOverflow,
    /// Boolean word was neither 0 nor 1.
    #[error("invalid bool")]
    InvalidBool,
    /// Offset to a dynamic value points outside its enclosing frame.
    #[error("invalid offset")]
    InvalidOffset,
    /// Length prefix exceeds the input that could back it.
    #[error("length too large")]
    LengthTooLarge,
    /// Fixed-size byte value has the wrong width.
    #[error("fixed bytes width: expected {expected}, got {actual}")]
    FixedBytesWidth {
        /// Declared width.
        expected: usize,
        /// Supplied width.
        actual: usize,
    },
    /// Value shape does not match the declared type.
    #[error("type mismatch: expected {expected}")]
    TypeMismatch {
        /// Canonical name of the declared type.
        expected: String,
    },
    /// Number of values does not match the number of declared slots.
    #[error("arity mismatch: expected {expected}, got {actual}")]
    Arity {
        /// Declared slot count.
        expected: usize,
        /// Supplied value count.
        actual: usize,
    },
}

/// Failure decoding one positional argument.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("[ABI_DECODE] slot {slot}: {source}")]
pub struct DecodeError {
    /// Zero-based positional slot that failed.
    pub slot: usize,
    /// Underlying codec failure.
    #[source]
    pub source: CodecError,
}

/// Failure encoding one positional result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("[ABI_ENCODE] slot {slot}: {source}")]
pub struct EncodeError {
    /// Zero-based positional slot that failed.
    pub slot: usize,
    /// Underlying codec failure.
    #[source]
    pub source: CodecError,
}

/// Encode `value` as a big-endian word.
#[must_use]
pub fn word_u64(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Number of bytes `len` occupies once right-padded to a word boundary.
#[must_use]
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// Bounded reader over one ABI frame.
///
/// A frame is the encoding of one tuple (or array body). Offsets of dynamic
/// values are relative to the start of their frame; [`Reader::read_tail`]
/// resolves them into a fresh reader.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    frame: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader positioned at the start of `frame`.
    #[must_use]
    pub fn new(frame: &'a [u8]) -> Self {
        Self { frame, cursor: 0 }
    }

    /// Bytes left after the cursor.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frame.len() - self.cursor
    }

    /// Bytes of this frame after the cursor, without advancing.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.frame[self.cursor..]
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        let end = self
            .cursor
            .checked_add(len)
            .ok_or(CodecError::OutOfBounds)?;
        if end > self.frame.len() {
            return Err(CodecError::OutOfBounds);
        }
        let out = &self.frame[self.cursor..end];
        self.cursor = end;
        Ok(out)
    }

    /// Read one raw word.
    pub fn read_word(&mut self) -> Result<&'a [u8; WORD], CodecError> {
        self.take(WORD)?
            .try_into()
            .map_err(|_| CodecError::OutOfBounds)
    }

    /// Read an unsigned integer declared `bits` wide.
    ///
    /// Bits above the declared width must be zero. Declared widths above 64
    /// are accepted but the value itself must fit in a `u64`.
    pub fn read_uint(&mut self, bits: u16) -> Result<u64, CodecError> {
        let word = self.read_word()?;
        if word[..WORD - 8].iter().any(|b| *b != 0) {
            return Err(if bits > 64 {
                CodecError::IntegerOverflow
            } else {
                CodecError::NonCanonical
            });
        }
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&word[WORD - 8..]);
        let value = u64::from_be_bytes(raw);
        if bits < 64 && value >> bits != 0 {
            return Err(CodecError::NonCanonical);
        }
        Ok(value)
    }

    /// Read a boolean (word value 0 or 1).
    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        let word = self.read_word()?;
        if word[..WORD - 1].iter().any(|b| *b != 0) {
            return Err(CodecError::InvalidBool);
        }
        match word[WORD - 1] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(CodecError::InvalidBool),
        }
    }

    /// Read a left-aligned fixed-size byte value of `width` bytes.
    pub fn read_fixed_bytes(&mut self, width: usize) -> Result<&'a [u8], CodecError> {
        if width == 0 || width > WORD {
            return Err(CodecError::FixedBytesWidth {
                expected: WORD,
                actual: width,
            });
        }
        let word = self.read_word()?;
        if word[width..].iter().any(|b| *b != 0) {
            return Err(CodecError::NonCanonical);
        }
        Ok(&word[..width])
    }

    /// Read a length word and bound it by `element_size * len <= remaining`.
    ///
    /// This is the only way lengths enter the decoder, so no caller can
    /// allocate from an attacker-controlled length that the input cannot back.
    pub fn read_length(&mut self, element_size: usize) -> Result<usize, CodecError> {
        let len = self.read_uint(256)?;
        let len = usize::try_from(len).map_err(|_| CodecError::LengthTooLarge)?;
        let needed = len
            .checked_mul(element_size)
            .ok_or(CodecError::LengthTooLarge)?;
        if needed > self.remaining() {
            return Err(CodecError::LengthTooLarge);
        }
        Ok(len)
    }

    /// Read an offset word and return a reader over the dynamic value it points at.
    pub fn read_tail(&mut self) -> Result<Reader<'a>, CodecError> {
        let offset = self.read_uint(256).map_err(|_| CodecError::InvalidOffset)?;
        let offset = usize::try_from(offset).map_err(|_| CodecError::InvalidOffset)?;
        if offset > self.frame.len() {
            return Err(CodecError::InvalidOffset);
        }
        Ok(Reader::new(&self.frame[offset..]))
    }

    /// Read a length-prefixed, zero-padded byte string at the cursor.
    pub fn read_dynamic_bytes(&mut self) -> Result<&'a [u8], CodecError> {
        let len = self.read_length(1)?;
        let data = self.take(len)?;
        let padding = self.take(padded_len(len) - len)?;
        if padding.iter().any(|b| *b != 0) {
            return Err(CodecError::NonCanonical);
        }
        Ok(data)
    }
}

/// Head/tail builder for one ABI frame.
///
/// The head size must be known up front (sum of the slots' head words) so
/// offsets to dynamic values can be written as they are pushed.
#[derive(Debug)]
pub struct TupleEncoder {
    head: Vec<u8>,
    tail: Vec<u8>,
    head_len: usize,
}

impl TupleEncoder {
    /// Create an encoder for a frame whose head spans `head_words` words.
    #[must_use]
    pub fn new(head_words: usize) -> Self {
        let head_len = head_words * WORD;
        Self {
            head: Vec::with_capacity(head_len),
            tail: Vec::new(),
            head_len,
        }
    }

    /// Append one word to the head.
    pub fn push_word(&mut self, word: [u8; WORD]) {
        self.head.extend_from_slice(&word);
    }

    /// Append an unsigned integer word.
    pub fn push_uint(&mut self, value: u64) {
        self.push_word(word_u64(value));
    }

    /// Append a boolean word.
    pub fn push_bool(&mut self, value: bool) {
        self.push_uint(u64::from(value));
    }

    /// Append a left-aligned fixed-size byte value.
    pub fn push_fixed_bytes(&mut self, bytes: &[u8], width: usize) -> Result<(), CodecError> {
        if width == 0 || width > WORD || bytes.len() != width {
            return Err(CodecError::FixedBytesWidth {
                expected: width,
                actual: bytes.len(),
            });
        }
        let mut word = [0u8; WORD];
        word[..width].copy_from_slice(bytes);
        self.push_word(word);
        Ok(())
    }

    /// Append a dynamic value: an offset word in the head, `body` in the tail.
    pub fn push_dynamic(&mut self, body: &[u8]) {
        let offset = (self.head_len + self.tail.len()) as u64;
        self.push_uint(offset);
        self.tail.extend_from_slice(body);
    }

    /// Append a dynamic byte string (length word, data, zero padding).
    pub fn push_dynamic_bytes(&mut self, bytes: &[u8]) {
        let mut body = Vec::with_capacity(WORD + padded_len(bytes.len()));
        body.extend_from_slice(&word_u64(bytes.len() as u64));
        body.extend_from_slice(bytes);
        body.resize(WORD + padded_len(bytes.len()), 0);
        self.push_dynamic(&body);
    }

    /// Concatenate head and tail.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        let mut out = self.head;
        out.extend_from_slice(&self.tail);
        out
    }
}
