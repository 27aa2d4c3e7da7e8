//! Interrupt-driven acquisition of voltage and current samples.
//!
//! The converter alternates between the current and voltage inputs, firing
//! one interrupt per finished conversion. The [`AcquisitionEngine`] runs
//! inside that interrupt: it advances the millisecond clock, hands each
//! reading to an [`Accumulator`], flips the multiplexer, and publishes the
//! window to the main loop through a [`WindowCell`] once it is full.
//!
//! Two accumulators are provided:
//!
//! - [`RawBuffer`]: keeps every reading for the host to post-process.
//! - [`PowerIntegral`]: folds each voltage/current pair into a running
//!   instantaneous-power sum, so only one 32-bit value leaves the node.
//!
//! ## Handoff
//!
//! While a window is marked ready the engine does not touch it; conversions
//! arriving in that interval are counted and discarded. The main loop clears
//! the flag once the window has been transmitted. See [`handoff`] for the
//! ownership rules.

mod engine;
pub mod handoff;
mod power;
mod raw;

pub use engine::AcquisitionEngine;
pub use handoff::{Consumer, Producer, ReadHandle, SampleWindow, WindowCell, WriteHandle};
pub use power::PowerIntegral;
pub use raw::RawBuffer;

#[cfg(test)]
pub(crate) use engine::mock;

use crate::config::Profile;
use crate::crc::Crc16;
use crate::error::Result;
use crate::frame::FrameSink;

/// One of the two analog inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Channel {
    /// Current transducer input.
    Current,
    /// Voltage divider input. The multiplexer rests here between windows.
    #[default]
    Voltage,
}

impl Channel {
    /// The other channel.
    pub fn toggled(self) -> Self {
        match self {
            Channel::Current => Channel::Voltage,
            Channel::Voltage => Channel::Current,
        }
    }
}

/// Source of conversion results.
///
/// Implemented by the platform glue over its ADC. The engine reads the
/// finished result and selects the input for a following conversion; it never
/// configures the converter itself.
pub trait ConversionSource {
    /// Latest completed reading, in `0..=1023`.
    fn latest(&mut self) -> u16;

    /// Routes the multiplexer to `channel`.
    fn select(&mut self, channel: Channel);
}

/// Per-window accumulation strategy.
///
/// The engine owns the clock, multiplexer, and handoff logic; an accumulator
/// only decides what to keep from each reading and how it is rendered in the
/// logical frame.
pub trait Accumulator {
    /// Build-time defaults for this firmware variant.
    const PROFILE: Profile;

    /// Clears all accumulated state for a new window.
    fn reset(&mut self);

    /// Takes one reading from `channel`.
    fn on_conversion(&mut self, channel: Channel, value: u16);

    /// Called once when the window reaches its configured length.
    fn finalize(&mut self) {}

    /// Writes the frame body (everything between `S` and the marker) and
    /// feeds the binary values into `crc`.
    fn write_body<S: FrameSink>(&self, crc: &mut Crc16, sink: &mut S) -> Result<()>;
}
