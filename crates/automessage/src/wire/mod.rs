// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive reader/writer abstractions for the binary message format.
//!
//! Every value is little-endian with no alignment and no padding. Sequence
//! and string lengths are prefixed with a signed 32-bit count.
//!
//! Two backends are provided: bounds-checked cursors over byte slices
//! ([`Cursor`], [`CursorMut`]) and adapters over `std::io` streams
//! ([`StreamReader`], [`StreamWriter`]). Compiled codecs only see the
//! object-safe [`WireWrite`] / [`WireRead`] traits.

mod cursor;
mod stream;

pub use cursor::{Cursor, CursorMut};
pub use stream::{StreamReader, StreamWriter};

use std::fmt;
use std::io;

/// Low-level I/O error raised by a reader or writer.
#[derive(Debug)]
pub enum WireError {
    WriteFailed { offset: usize, reason: String },
    ReadFailed { offset: usize, reason: String },
    InvalidData { reason: String },
    Io(io::Error),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::WriteFailed { offset, reason } => {
                write!(f, "write failed at offset {}: {}", offset, reason)
            }
            WireError::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            WireError::InvalidData { reason } => write!(f, "invalid data: {}", reason),
            WireError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WireError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for WireError {
    fn from(err: io::Error) -> Self {
        WireError::Io(err)
    }
}

pub type WireResult<T> = core::result::Result<T, WireError>;

/// Generate a little-endian scalar write on top of `write_bytes`.
macro_rules! provided_write_le {
    ($name:ident, $type:ty) => {
        fn $name(&mut self, value: $type) -> WireResult<()> {
            self.write_bytes(&value.to_le_bytes())
        }
    };
}

/// Generate a bulk slice write: one `write_bytes` call for the whole run.
macro_rules! provided_write_slice_le {
    ($name:ident, $type:ty, $size:expr) => {
        fn $name(&mut self, values: &[$type]) -> WireResult<()> {
            let mut bytes = Vec::with_capacity(values.len() * $size);
            for value in values {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
            self.write_bytes(&bytes)
        }
    };
}

/// Generate a little-endian scalar read on top of `read_into`.
macro_rules! provided_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        fn $name(&mut self) -> WireResult<$type> {
            let mut bytes = [0u8; $size];
            self.read_into(&mut bytes)?;
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Generate a bulk read of `count` elements: one `read_into` call for the whole run.
macro_rules! provided_read_vec_le {
    ($name:ident, $type:ty, $size:expr) => {
        fn $name(&mut self, count: usize) -> WireResult<Vec<$type>> {
            let bytes = self.read_run(count, $size)?;
            Ok(bytes
                .chunks_exact($size)
                .map(|chunk| {
                    let mut raw = [0u8; $size];
                    raw.copy_from_slice(chunk);
                    <$type>::from_le_bytes(raw)
                })
                .collect())
        }
    };
}

/// Sink for encoded bytes.
///
/// Implementors provide `write_bytes` and `position`; every typed write is
/// derived from them.
pub trait WireWrite {
    /// Append raw bytes.
    fn write_bytes(&mut self, data: &[u8]) -> WireResult<()>;

    /// Number of bytes written so far.
    fn position(&self) -> usize;

    fn write_u8(&mut self, value: u8) -> WireResult<()> {
        self.write_bytes(&[value])
    }

    fn write_bool(&mut self, value: bool) -> WireResult<()> {
        self.write_u8(u8::from(value))
    }

    /// Characters travel as their 32-bit Unicode scalar value.
    fn write_char(&mut self, value: char) -> WireResult<()> {
        self.write_u32(value as u32)
    }

    provided_write_le!(write_i8, i8);
    provided_write_le!(write_i16, i16);
    provided_write_le!(write_i32, i32);
    provided_write_le!(write_i64, i64);
    provided_write_le!(write_u16, u16);
    provided_write_le!(write_u32, u32);
    provided_write_le!(write_u64, u64);
    provided_write_le!(write_f32, f32);
    provided_write_le!(write_f64, f64);

    fn write_bool_slice(&mut self, values: &[bool]) -> WireResult<()> {
        let bytes: Vec<u8> = values.iter().map(|&v| u8::from(v)).collect();
        self.write_bytes(&bytes)
    }

    fn write_char_slice(&mut self, values: &[char]) -> WireResult<()> {
        let mut bytes = Vec::with_capacity(values.len() * 4);
        for &value in values {
            bytes.extend_from_slice(&(value as u32).to_le_bytes());
        }
        self.write_bytes(&bytes)
    }

    provided_write_slice_le!(write_i8_slice, i8, 1);
    provided_write_slice_le!(write_i16_slice, i16, 2);
    provided_write_slice_le!(write_i32_slice, i32, 4);
    provided_write_slice_le!(write_i64_slice, i64, 8);
    provided_write_slice_le!(write_u16_slice, u16, 2);
    provided_write_slice_le!(write_u32_slice, u32, 4);
    provided_write_slice_le!(write_u64_slice, u64, 8);
    provided_write_slice_le!(write_f32_slice, f32, 4);
    provided_write_slice_le!(write_f64_slice, f64, 8);
}

/// Source of encoded bytes.
pub trait WireRead {
    /// Fill `buf` completely or fail.
    fn read_into(&mut self, buf: &mut [u8]) -> WireResult<()>;

    /// Number of bytes consumed so far.
    fn position(&self) -> usize;

    /// Bytes known to be left, when the source can tell.
    ///
    /// Slice-backed readers return `Some` so that corrupt element counts
    /// fail before a large allocation is attempted.
    fn remaining_hint(&self) -> Option<usize> {
        None
    }

    /// Read `count * width` bytes in one call.
    fn read_run(&mut self, count: usize, width: usize) -> WireResult<Vec<u8>> {
        let len = count.checked_mul(width).ok_or_else(|| WireError::InvalidData {
            reason: format!("element count {} overflows", count),
        })?;
        if let Some(remaining) = self.remaining_hint() {
            if len > remaining {
                return Err(WireError::ReadFailed {
                    offset: self.position(),
                    reason: "unexpected end of buffer".into(),
                });
            }
        }
        let mut bytes = vec![0u8; len];
        self.read_into(&mut bytes)?;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> WireResult<u8> {
        let mut byte = [0u8; 1];
        self.read_into(&mut byte)?;
        Ok(byte[0])
    }

    /// Any non-zero byte decodes as `true`.
    fn read_bool(&mut self) -> WireResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    fn read_char(&mut self) -> WireResult<char> {
        let raw = self.read_u32()?;
        char_from_scalar(raw)
    }

    provided_read_le!(read_i8, i8, 1);
    provided_read_le!(read_i16, i16, 2);
    provided_read_le!(read_i32, i32, 4);
    provided_read_le!(read_i64, i64, 8);
    provided_read_le!(read_u16, u16, 2);
    provided_read_le!(read_u32, u32, 4);
    provided_read_le!(read_u64, u64, 8);
    provided_read_le!(read_f32, f32, 4);
    provided_read_le!(read_f64, f64, 8);

    fn read_bool_vec(&mut self, count: usize) -> WireResult<Vec<bool>> {
        Ok(self.read_run(count, 1)?.into_iter().map(|b| b != 0).collect())
    }

    fn read_u8_vec(&mut self, count: usize) -> WireResult<Vec<u8>> {
        self.read_run(count, 1)
    }

    fn read_char_vec(&mut self, count: usize) -> WireResult<Vec<char>> {
        let bytes = self.read_run(count, 4)?;
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(chunk);
                char_from_scalar(u32::from_le_bytes(raw))
            })
            .collect()
    }

    provided_read_vec_le!(read_i8_vec, i8, 1);
    provided_read_vec_le!(read_i16_vec, i16, 2);
    provided_read_vec_le!(read_i32_vec, i32, 4);
    provided_read_vec_le!(read_i64_vec, i64, 8);
    provided_read_vec_le!(read_u16_vec, u16, 2);
    provided_read_vec_le!(read_u32_vec, u32, 4);
    provided_read_vec_le!(read_u64_vec, u64, 8);
    provided_read_vec_le!(read_f32_vec, f32, 4);
    provided_read_vec_le!(read_f64_vec, f64, 8);
}

fn char_from_scalar(raw: u32) -> WireResult<char> {
    char::from_u32(raw).ok_or_else(|| WireError::InvalidData {
        reason: format!("0x{:08X} is not a Unicode scalar value", raw),
    })
}
