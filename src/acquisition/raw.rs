use heapless::Vec;

use super::{Accumulator, Channel};
use crate::config::{Profile, SequenceMode};
use crate::consts::{FRAME_SEPARATOR, MAX_WINDOW_LEN, RADIO_WINDOW_LEN, TRANSPARENT_WINDOW_LEN};
use crate::crc::Crc16;
use crate::encoding::encode_sample;
use crate::error::Result;
use crate::frame::FrameSink;

/// Keeps every reading of the window, alternating current and voltage.
///
/// Readings past the capacity `N` are rejected and counted in
/// [`RawBuffer::rejected`] rather than overwriting earlier samples.
#[derive(Debug, Clone)]
pub struct RawBuffer<const N: usize = MAX_WINDOW_LEN> {
    samples: Vec<u16, N>,
    /// Readings dropped because the buffer was already full.
    pub rejected: u16,
}

impl<const N: usize> RawBuffer<N> {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
            rejected: 0,
        }
    }

    /// Samples collected so far, in acquisition order.
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// Number of samples collected.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples have been collected.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl<const N: usize> Default for RawBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Accumulator for RawBuffer<N> {
    const PROFILE: Profile = Profile {
        transparent_window_len: TRANSPARENT_WINDOW_LEN,
        radio_window_len: RADIO_WINDOW_LEN,
        radio_holdoff_ms: 500,
        sequence: SequenceMode::PerPacket,
        transparent_trailer: None,
    };

    fn reset(&mut self) {
        self.samples.clear();
        self.rejected = 0;
    }

    fn on_conversion(&mut self, _channel: Channel, value: u16) {
        if self.samples.push(value).is_err() {
            self.rejected = self.rejected.saturating_add(1);
        }
    }

    fn write_body<S: FrameSink>(&self, crc: &mut Crc16, sink: &mut S) -> Result<()> {
        for &sample in &self.samples {
            crc.update_u16(sample);
            sink.put_all(&encode_sample(sample))?;
            sink.put(FRAME_SEPARATOR)?;
        }
        Ok(())
    }
}
