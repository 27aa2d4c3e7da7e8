//! The two ways a finished window leaves the node.
//!
//! - [`TransparentTransport`]: the logical frame is written byte by byte to
//!   the wired serial port.
//! - [`RadioTransport`]: the logical frame is cut into XBee API transmit
//!   requests, each retried until the radio reports delivery or the attempt
//!   budget runs out. Transmit status frames are recognised by the
//!   [`AckMatcher`].

mod ack;
mod radio;
mod transparent;

pub use ack::{AckMatcher, AckStatus};
pub use radio::{Delivery, PACKET_MAX, RadioTransport, encode_packet};
pub use transparent::TransparentTransport;
