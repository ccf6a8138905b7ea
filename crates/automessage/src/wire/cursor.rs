// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked cursors over byte slices.

use super::{WireError, WireRead, WireResult, WireWrite};

/// Generate the accessors shared by both cursor flavours.
macro_rules! impl_cursor_common {
    () => {
        pub fn offset(&self) -> usize {
            self.offset
        }

        pub fn remaining(&self) -> usize {
            self.buffer.len().saturating_sub(self.offset)
        }
    };
}

/// Mutable cursor for writing into a caller-provided buffer.
pub struct CursorMut<'a> {
    buffer: &'a mut [u8],
    offset: usize,
}

impl<'a> CursorMut<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_cursor_common!();
}

impl WireWrite for CursorMut<'_> {
    fn write_bytes(&mut self, data: &[u8]) -> WireResult<()> {
        if data.len() > self.remaining() {
            return Err(WireError::WriteFailed {
                offset: self.offset,
                reason: "buffer too small".into(),
            });
        }
        self.buffer[self.offset..self.offset + data.len()].copy_from_slice(data);
        self.offset += data.len();
        Ok(())
    }

    fn position(&self) -> usize {
        self.offset
    }
}

/// Immutable cursor for reading.
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_cursor_common!();

    /// Borrow the next `len` bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> WireResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(WireError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer".into(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}

impl WireRead for Cursor<'_> {
    fn read_into(&mut self, buf: &mut [u8]) -> WireResult<()> {
        let bytes = self.read_bytes(buf.len())?;
        buf.copy_from_slice(bytes);
        Ok(())
    }

    fn position(&self) -> usize {
        self.offset
    }

    fn remaining_hint(&self) -> Option<usize> {
        Some(self.remaining())
    }
}
