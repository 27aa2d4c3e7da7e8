//! The logical frame shared by both transports.
//!
//! ```text
//! T hhhh llll S <body> X cccc Z
//! ```
//!
//! `hhhh llll` is the window timestamp, `<body>` is rendered by the window's
//! [`Accumulator`], and `cccc` is the CRC16 of the binary timestamp and body
//! values. Everything is upper-case ASCII hex so the frame survives a text
//! terminal.
//!
//! The transports differ only in where the bytes go: the wired link writes
//! them as they are produced, the radio link collects them in a
//! [`FrameBuffer`] and ships it every time it fills.

use heapless::Vec;

use crate::acquisition::{Accumulator, SampleWindow};
use crate::consts::{FRAME_END, FRAME_MARKER, FRAME_SAMPLES, FRAME_TIMESTAMP};
use crate::crc::Crc16;
use crate::encoding::encode_u16;
use crate::error::{Error, Result};

/// Destination for the bytes of a logical frame.
pub trait FrameSink {
    /// Appends one byte.
    fn put(&mut self, byte: u8) -> Result<()>;

    /// Appends every byte of `bytes` in order.
    fn put_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            self.put(b)?;
        }
        Ok(())
    }
}

/// Writes `window` to `sink` as one logical frame and returns its checksum.
pub fn write_frame<A, S>(window: &SampleWindow<A>, sink: &mut S) -> Result<u16>
where
    A: Accumulator,
    S: FrameSink,
{
    let mut crc = Crc16::new();
    let ts = window.started_at;

    sink.put(FRAME_TIMESTAMP)?;
    sink.put_all(&encode_u16(ts.high))?;
    sink.put_all(&encode_u16(ts.low))?;
    crc.update_u16(ts.high);
    crc.update_u16(ts.low);

    sink.put(FRAME_SAMPLES)?;
    window.data.write_body(&mut crc, sink)?;

    let checksum = crc.finish();
    sink.put(FRAME_MARKER)?;
    sink.put_all(&encode_u16(checksum))?;
    sink.put(FRAME_END)?;
    Ok(checksum)
}

/// Fixed-capacity byte buffer that is emptied each time it fills.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer<const N: usize> {
    bytes: Vec<u8, N>,
}

impl<const N: usize> FrameBuffer<N> {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Appends one byte, failing with [`Error::BufferFull`] at capacity.
    pub fn push(&mut self, byte: u8) -> Result<()> {
        self.bytes.push(byte).map_err(|_| Error::BufferFull)
    }

    /// Hands the contents to `emit` and clears the buffer if it is full.
    ///
    /// Returns whether a flush happened. On error the contents are kept.
    pub fn flush_when_full<F>(&mut self, emit: F) -> Result<bool>
    where
        F: FnOnce(&[u8]) -> Result<()>,
    {
        if !self.is_full() {
            return Ok(false);
        }
        emit(&self.bytes)?;
        self.bytes.clear();
        Ok(true)
    }

    /// Hands any remaining contents to `emit` and clears the buffer.
    ///
    /// An empty buffer is never emitted.
    pub fn flush<F>(&mut self, emit: F) -> Result<bool>
    where
        F: FnOnce(&[u8]) -> Result<()>,
    {
        if self.is_empty() {
            return Ok(false);
        }
        emit(&self.bytes)?;
        self.bytes.clear();
        Ok(true)
    }

    /// Buffered bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the buffer is at capacity.
    pub fn is_full(&self) -> bool {
        self.bytes.is_full()
    }

    /// Drops the buffered bytes.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}
