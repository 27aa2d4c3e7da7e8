use crate::consts::{API_DELIVERY_SUCCESS, API_FRAME_ID, API_START, API_TRANSMIT_STATUS};
use crate::error::Error;
use crate::link::SerialLink;

/// Length field of a transmit status frame.
const STATUS_FRAME_LEN: u8 = 0x07;

/// Outcome reported by a transmit status frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum AckStatus {
    /// The radio delivered the packet.
    Delivered,
    /// The radio gave up; carries the delivery status code.
    Failed(u8),
}

/// Byte-wise matcher for XBee transmit status frames.
///
/// | state | byte                     | read         |
/// |-------|--------------------------|--------------|
/// | 0..=4 | `7E 00 07 8B <frame id>` | non-blocking |
/// | 5..=7 | address and retry count  | blocking     |
/// | 8     | delivery status          | blocking     |
///
/// Any mismatch in the prefix drops back to state 0, including a mismatch on a
/// start delimiter. The discovery status and
/// checksum that follow the delivery status are left in the stream; the next
/// match skips them while hunting for a start delimiter.
#[derive(Debug, Clone)]
pub struct AckMatcher {
    expected: [u8; 5],
    state: u8,
}

impl AckMatcher {
    /// Creates a matcher expecting `frame_id` in the status frame.
    pub const fn new(frame_id: u8) -> Self {
        Self {
            expected: [API_START, 0x00, STATUS_FRAME_LEN, API_TRANSMIT_STATUS, frame_id],
            state: 0,
        }
    }

    /// Returns to state 0.
    pub fn reset(&mut self) {
        self.state = 0;
    }

    /// Current position in the status frame.
    pub fn state(&self) -> u8 {
        self.state
    }

    /// Advances the matcher by one byte.
    pub fn feed(&mut self, byte: u8) -> Option<AckStatus> {
        match self.state {
            0..=4 => {
                if byte == self.expected[usize::from(self.state)] {
                    self.state += 1;
                } else {
                    self.state = 0;
                }
                None
            }
            5..=7 => {
                self.state += 1;
                None
            }
            _ => {
                self.state = 0;
                if byte == API_DELIVERY_SUCCESS {
                    Some(AckStatus::Delivered)
                } else {
                    Some(AckStatus::Failed(byte))
                }
            }
        }
    }

    /// Consumes bytes from `link` until a status frame completes.
    ///
    /// Returns `WouldBlock` when the prefix is incomplete and nothing is
    /// pending; the position is kept for the next call. Once the prefix has
    /// matched, the rest of the frame is read with blocking receives.
    pub fn poll<L: SerialLink>(&mut self, link: &mut L) -> nb::Result<AckStatus, Error> {
        loop {
            let byte = if self.state < 5 {
                match link.receive_nonblocking()? {
                    Some(byte) => byte,
                    None => return Err(nb::Error::WouldBlock),
                }
            } else {
                link.receive_blocking()?
            };
            if let Some(status) = self.feed(byte) {
                return Ok(status);
            }
        }
    }
}

impl Default for AckMatcher {
    fn default() -> Self {
        Self::new(API_FRAME_ID)
    }
}
