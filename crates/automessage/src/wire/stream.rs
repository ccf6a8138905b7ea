// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Adapters from `std::io` streams to the wire traits.

use std::io::{self, Read, Write};

use super::{WireError, WireRead, WireResult, WireWrite};

/// Writes encoded bytes straight into any [`Write`] implementation.
pub struct StreamWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> WireWrite for StreamWriter<W> {
    fn write_bytes(&mut self, data: &[u8]) -> WireResult<()> {
        self.inner.write_all(data)?;
        self.written += data.len();
        Ok(())
    }

    fn position(&self) -> usize {
        self.written
    }
}

/// Pulls encoded bytes from any [`Read`] implementation.
pub struct StreamReader<R: Read> {
    inner: R,
    consumed: usize,
}

impl<R: Read> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, consumed: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> WireRead for StreamReader<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> WireResult<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.consumed += buf.len();
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Err(WireError::ReadFailed {
                offset: self.consumed,
                reason: "unexpected end of stream".into(),
            }),
            Err(err) => Err(WireError::Io(err)),
        }
    }

    fn position(&self) -> usize {
        self.consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_writer_tracks_position() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write_i32(1234).expect("write i32");
        writer.write_u16_slice(&[1, 2]).expect("write slice");
        assert_eq!(writer.position(), 8);
        assert_eq!(writer.into_inner(), vec![0xD2, 0x04, 0, 0, 1, 0, 2, 0]);
    }

    #[test]
    fn test_stream_reader_reports_eof_offset() {
        let data = [1u8, 0, 0, 0, 9];
        let mut reader = StreamReader::new(&data[..]);
        assert_eq!(reader.read_i32().expect("read i32"), 1);
        let err = reader.read_u16().unwrap_err();
        match err {
            WireError::ReadFailed { offset, reason } => {
                assert_eq!(offset, 4);
                assert_eq!(reason, "unexpected end of stream");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_stream_reader_has_no_length_hint() {
        let reader = StreamReader::new(io::empty());
        assert_eq!(reader.remaining_hint(), None);
    }
}
