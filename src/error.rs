//! Error type shared by the transports and the dispatch loop.
//!
//! None of these conditions is fatal: the dispatch loop logs them and moves on
//! to the next window.

use embedded_hal_nb::serial::ErrorKind;
use thiserror::Error;

/// Errors raised while encoding or delivering a window.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The serial primitive reported a fault.
    #[error("serial link fault: {0:?}")]
    Link(ErrorKind),
    /// A write went past the capacity of a bounded buffer.
    #[error("frame buffer full")]
    BufferFull,
    /// No acknowledgment started arriving before the timeout.
    #[error("no acknowledgment within {timeout_ms} ms")]
    AckTimeout {
        /// Time waited.
        timeout_ms: u32,
    },
    /// A radio packet was not acknowledged within its attempt budget.
    #[error("packet not acknowledged after {attempts} attempts")]
    Unacknowledged {
        /// Number of transmissions made.
        attempts: u8,
    },
}

/// Result alias for fallible telemetry operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;
