//! Run-time configuration for one firmware variant.
//!
//! Each [`Accumulator`] carries a [`Profile`] with the defaults its firmware
//! variant ships with. [`Config::new`] resolves that profile against the
//! [`LinkMode`] picked at boot; the `with_*` methods override single values.

use crate::acquisition::Accumulator;
use crate::consts::{ACK_TIMEOUT_MS, API_FRAME_ID, MAX_SEND_ATTEMPTS, PACKET_DELAY_MS};

/// Which link the logical frames leave through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum LinkMode {
    /// Frames are written straight to the wired serial port.
    Transparent,
    /// Frames are split into acknowledged XBee API packets.
    Radio,
}

impl LinkMode {
    /// Maps the level of the mode-select input: high selects the radio.
    pub fn from_detect_pin(high: bool) -> Self {
        if high { LinkMode::Radio } else { LinkMode::Transparent }
    }
}

/// How the sequence byte at the front of each radio packet is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum SequenceMode {
    /// Restarts at 0 every window and counts packets.
    PerPacket,
    /// The same byte on every packet.
    Fixed(u8),
}

impl SequenceMode {
    /// Sequence byte for the `packet`-th packet of a window.
    pub fn byte_for(self, packet: u8) -> u8 {
        match self {
            SequenceMode::PerPacket => packet,
            SequenceMode::Fixed(byte) => byte,
        }
    }
}

/// Build-time defaults of a firmware variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    /// Samples per window on the wired link.
    pub transparent_window_len: u16,
    /// Samples per window on the radio link.
    pub radio_window_len: u16,
    /// Pause after a window has gone out over the radio.
    pub radio_holdoff_ms: u32,
    /// Radio sequence byte policy.
    pub sequence: SequenceMode,
    /// Byte written after the frame terminator on the wired link, if any.
    pub transparent_trailer: Option<u8>,
}

impl Profile {
    /// Window length for `mode`.
    pub const fn window_len(&self, mode: LinkMode) -> u16 {
        match mode {
            LinkMode::Transparent => self.transparent_window_len,
            LinkMode::Radio => self.radio_window_len,
        }
    }
}

/// Resolved settings used by the engine, the transports, and the dispatch
/// loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Link selected at boot.
    pub mode: LinkMode,
    /// Samples per window.
    pub window_len: u16,
    /// Frame ID placed in every transmit request.
    pub api_frame_id: u8,
    /// Frame ID the acknowledgment matcher expects back.
    pub ack_frame_id: u8,
    /// Transmissions per radio packet before it is abandoned.
    pub max_attempts: u8,
    /// Pause after every radio packet attempt.
    pub packet_delay_ms: u32,
    /// Longest wait for an acknowledgment to start arriving.
    pub ack_timeout_ms: u32,
    /// Pause after each dispatched window before the next is accepted.
    pub window_holdoff_ms: u32,
    /// Radio sequence byte policy.
    pub sequence: SequenceMode,
    /// Byte written after each wired frame, if any.
    pub trailer: Option<u8>,
}

impl Config {
    /// Defaults of accumulator `A` for `mode`.
    pub fn new<A: Accumulator>(mode: LinkMode) -> Self {
        Self::from_profile(&A::PROFILE, mode)
    }

    /// Defaults of `profile` for `mode`.
    pub fn from_profile(profile: &Profile, mode: LinkMode) -> Self {
        let window_holdoff_ms = match mode {
            LinkMode::Transparent => 0,
            LinkMode::Radio => profile.radio_holdoff_ms,
        };
        Self {
            mode,
            window_len: profile.window_len(mode),
            api_frame_id: API_FRAME_ID,
            ack_frame_id: API_FRAME_ID,
            max_attempts: MAX_SEND_ATTEMPTS,
            packet_delay_ms: PACKET_DELAY_MS,
            ack_timeout_ms: ACK_TIMEOUT_MS,
            window_holdoff_ms,
            sequence: profile.sequence,
            trailer: profile.transparent_trailer,
        }
    }

    /// Overrides the window length. Zero is raised to one.
    pub fn with_window_len(mut self, window_len: u16) -> Self {
        self.window_len = window_len.max(1);
        self
    }

    /// Overrides the outgoing and expected acknowledgment frame IDs.
    pub fn with_frame_ids(mut self, api_frame_id: u8, ack_frame_id: u8) -> Self {
        self.api_frame_id = api_frame_id;
        self.ack_frame_id = ack_frame_id;
        self
    }

    /// Overrides the per-packet attempt budget. Zero is raised to one.
    pub fn with_max_attempts(mut self, max_attempts: u8) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Overrides the pause after every packet attempt.
    pub fn with_packet_delay_ms(mut self, ms: u32) -> Self {
        self.packet_delay_ms = ms;
        self
    }

    /// Overrides the acknowledgment timeout.
    pub fn with_ack_timeout_ms(mut self, ms: u32) -> Self {
        self.ack_timeout_ms = ms;
        self
    }

    /// Overrides the pause after each dispatched window.
    pub fn with_window_holdoff_ms(mut self, ms: u32) -> Self {
        self.window_holdoff_ms = ms;
        self
    }
}
