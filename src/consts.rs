//! Constants used across the acquisition and telemetry pipeline.
//!
//! This module collects the sampling cadence, window sizing, wire-format
//! markers, and XBee API framing values shared by the engine and both
//! transports.
//!
//! ## Key Concepts
//!
//! - **Cadence**: one conversion roughly every 83 µs; the millisecond clock
//!   advances by [`SAMPLE_TIME_MS`] every [`TICKS_PER_CLOCK_STEP`] conversions.
//! - **Windows**: sized so one 60 Hz mains cycle (16.8 ms) is captured.
//! - **Radio budget**: an XBee transmit request carries at most
//!   [`RADIO_PAYLOAD_MAX`] bytes of application data.
//!
//! Timing values are expressed in milliseconds unless the name says otherwise.

/// Milliseconds added to the clock per clock step.
///
/// A step is [`TICKS_PER_CLOCK_STEP`] conversions of ~83 µs each.
pub const SAMPLE_TIME_MS: u16 = 83;

/// Number of conversion ticks that make up one clock step.
pub const TICKS_PER_CLOCK_STEP: u16 = 1000;

/// Mid-scale reading of the 10-bit converter, used as the zero point of the
/// current channel.
pub const CURRENT_MIDPOINT: u16 = 512;

/// Largest value a 10-bit conversion can produce.
pub const ADC_MAX: u16 = 1023;

/// Window length (in samples) for the wired, high-resolution link.
///
/// 203 current + 202 voltage samples.
pub const TRANSPARENT_WINDOW_LEN: u16 = 404 + 1;

/// Window length (in samples) for the radio link.
///
/// Short enough to fit the radio transmission budget while still spanning
/// one mains cycle.
pub const RADIO_WINDOW_LEN: u16 = 202 + 1;

/// Capacity of the raw sample buffer; the longest window either link uses.
pub const MAX_WINDOW_LEN: usize = TRANSPARENT_WINDOW_LEN as usize;

/// Timestamp marker opening a logical frame.
pub const FRAME_TIMESTAMP: u8 = b'T';
/// Marker opening the sample (or power sum) section.
pub const FRAME_SAMPLES: u8 = b'S';
/// Separator written after every raw sample.
pub const FRAME_SEPARATOR: u8 = b',';
/// Marker written before the checksum.
pub const FRAME_MARKER: u8 = b'X';
/// Marker terminating a logical frame.
pub const FRAME_END: u8 = b'Z';

/// Maximum application payload of one radio packet.
pub const RADIO_PAYLOAD_MAX: usize = 83;

/// XBee API start delimiter.
pub const API_START: u8 = 0x7E;
/// XBee API frame type: ZigBee transmit request.
pub const API_TRANSMIT_REQUEST: u8 = 0x10;
/// XBee API frame type: ZigBee transmit status.
pub const API_TRANSMIT_STATUS: u8 = 0x8B;
/// Default XBee API frame ID put on every transmit request.
///
/// The radio echoes this in its transmit status, so it is also the default
/// byte the acknowledgment matcher expects.
pub const API_FRAME_ID: u8 = 0x01;
/// 16-bit destination network address meaning "unknown".
pub const API_NETWORK_UNKNOWN: [u8; 2] = [0xFF, 0xFE];
/// Broadcast radius meaning "maximum hops".
pub const API_RADIUS_MAX_HOPS: u8 = 0x00;
/// Transmit options: none.
pub const API_OPTIONS_NONE: u8 = 0x00;
/// Bytes of frame data before the payload: type, frame ID, 64-bit address,
/// 16-bit address, radius, options, and the sequence byte.
pub const API_HEADER_LEN: u8 = 15;
/// Delivery status reported by the radio for a successful transmission.
pub const API_DELIVERY_SUCCESS: u8 = 0x00;

/// Attempts made per radio packet before it is abandoned.
pub const MAX_SEND_ATTEMPTS: u8 = 5;
/// Pause after every radio packet attempt, for the radio duty cycle.
pub const PACKET_DELAY_MS: u32 = 150;
/// Default time spent waiting for an acknowledgment to start arriving.
pub const ACK_TIMEOUT_MS: u32 = 1000;

/// Settling time before the mode input is read at boot.
pub const BOOT_SETTLE_MS: u32 = 200;
/// Pause between mode selection and the start of acquisition.
pub const BOOT_MODE_DELAY_MS: u32 = 500;
