use super::{Accumulator, Channel};
use crate::config::{Profile, SequenceMode};
use crate::consts::{CURRENT_MIDPOINT, TRANSPARENT_WINDOW_LEN};
use crate::crc::Crc16;
use crate::encoding::encode_u16;
use crate::error::Result;
use crate::frame::FrameSink;

/// Integrates instantaneous power over the window.
///
/// Each current reading is rectified around mid-scale and held; the next
/// voltage reading is multiplied by it and added to a 32-bit running sum. The
/// sum wraps on overflow, which a 405-sample window of 10-bit readings never
/// reaches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerIntegral {
    sum: u32,
    last_current: u16,
    last_voltage: u16,
}

impl PowerIntegral {
    /// Creates an empty integrator.
    pub const fn new() -> Self {
        Self {
            sum: 0,
            last_current: 0,
            last_voltage: 0,
        }
    }

    /// Running sum of `voltage * |current|` products.
    pub fn sum(&self) -> u32 {
        self.sum
    }

    /// Most recent rectified current reading.
    pub fn last_current(&self) -> u16 {
        self.last_current
    }

    /// Most recent voltage reading.
    pub fn last_voltage(&self) -> u16 {
        self.last_voltage
    }

    /// Renders the integrator state as a human-readable diagnostic block.
    ///
    /// ```text
    /// Last calcTempV: 0x01F4
    /// Last calcTempI: 0x0010
    /// Power Calc Sum: 0x00001F40
    /// ```
    pub fn write_diagnostics<S: FrameSink>(&self, sink: &mut S) -> Result<()> {
        sink.put_all(b"Last calcTempV: 0x")?;
        sink.put_all(&encode_u16(self.last_voltage))?;
        sink.put_all(b"\nLast calcTempI: 0x")?;
        sink.put_all(&encode_u16(self.last_current))?;
        sink.put_all(b"\nPower Calc Sum: 0x")?;
        sink.put_all(&encode_u16((self.sum >> 16) as u16))?;
        sink.put_all(&encode_u16(self.sum as u16))?;
        sink.put_all(b"\n\n")
    }
}

impl Accumulator for PowerIntegral {
    const PROFILE: Profile = Profile {
        transparent_window_len: TRANSPARENT_WINDOW_LEN,
        radio_window_len: TRANSPARENT_WINDOW_LEN,
        radio_holdoff_ms: 1500,
        sequence: SequenceMode::Fixed(0),
        transparent_trailer: Some(b'\n'),
    };

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn on_conversion(&mut self, channel: Channel, value: u16) {
        match channel {
            Channel::Voltage => {
                self.last_voltage = value;
                let product = u32::from(value) * u32::from(self.last_current);
                self.sum = self.sum.wrapping_add(product);
            }
            Channel::Current => {
                self.last_current = value.abs_diff(CURRENT_MIDPOINT);
            }
        }
    }

    fn write_body<S: FrameSink>(&self, crc: &mut Crc16, sink: &mut S) -> Result<()> {
        crc.update_u32(self.sum);
        sink.put_all(&encode_u16((self.sum >> 16) as u16))?;
        sink.put_all(&encode_u16(self.sum as u16))
    }
}
