//! Byte-level serial primitive consumed by both transports.
//!
//! The transports only ever need three operations: a blocking send, a
//! blocking receive, and a receive that returns immediately when nothing is
//! pending. [`SerialLink`] captures exactly that and is implemented for every
//! `embedded-hal-nb` serial port, so a HAL UART can be handed to the
//! transports directly.

use embedded_hal_nb::serial::{self, Read, Write};
use nb::block;

use crate::error::{Error, Result};

/// Blocking/non-blocking byte I/O on the serial or radio link.
pub trait SerialLink {
    /// Sends one byte, blocking until the transmitter accepts it.
    fn send(&mut self, byte: u8) -> Result<()>;

    /// Receives one byte, blocking until one arrives.
    fn receive_blocking(&mut self) -> Result<u8>;

    /// Receives one byte if one is pending.
    fn receive_nonblocking(&mut self) -> Result<Option<u8>>;

    /// Sends every byte of `bytes` in order.
    fn send_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            self.send(b)?;
        }
        Ok(())
    }
}

fn link_error<E: serial::Error>(e: E) -> Error {
    Error::Link(e.kind())
}

impl<T> SerialLink for T
where
    T: Read<u8> + Write<u8>,
{
    fn send(&mut self, byte: u8) -> Result<()> {
        block!(self.write(byte)).map_err(link_error)
    }

    fn receive_blocking(&mut self) -> Result<u8> {
        block!(self.read()).map_err(link_error)
    }

    fn receive_nonblocking(&mut self) -> Result<Option<u8>> {
        match self.read() {
            Ok(byte) => Ok(Some(byte)),
            Err(nb::Error::WouldBlock) => Ok(None),
            Err(nb::Error::Other(e)) => Err(link_error(e)),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_nb::serial::{ErrorKind, ErrorType};
    use std::collections::VecDeque;

    /// Port that is busy every other call, like a UART with a one-byte FIFO.
    #[derive(Default)]
    struct FlakyPort {
        busy: bool,
        written: Vec<u8>,
        rx: VecDeque<u8>,
        fault: bool,
    }

    impl ErrorType for FlakyPort {
        type Error = ErrorKind;
    }

    impl Read<u8> for FlakyPort {
        fn read(&mut self) -> nb::Result<u8, Self::Error> {
            if self.fault {
                return Err(nb::Error::Other(ErrorKind::Overrun));
            }
            self.rx.pop_front().ok_or(nb::Error::WouldBlock)
        }
    }

    impl Write<u8> for FlakyPort {
        fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
            self.busy = !self.busy;
            if self.busy {
                return Err(nb::Error::WouldBlock);
            }
            self.written.push(word);
            Ok(())
        }

        fn flush(&mut self) -> nb::Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_send_blocks_through_would_block() {
        let mut port = FlakyPort::default();
        port.send_all(b"T0").unwrap();
        assert_eq!(port.written, b"T0");
    }

    #[test]
    fn test_nonblocking_receive_reports_empty() {
        let mut port = FlakyPort::default();
        assert_eq!(port.receive_nonblocking(), Ok(None));
        port.rx.push_back(0x7E);
        assert_eq!(port.receive_nonblocking(), Ok(Some(0x7E)));
    }

    #[test]
    fn test_faults_map_to_link_error() {
        let mut port = FlakyPort {
            fault: true,
            ..Default::default()
        };
        assert_eq!(
            port.receive_nonblocking(),
            Err(Error::Link(ErrorKind::Overrun))
        );
        assert_eq!(port.receive_blocking(), Err(Error::Link(ErrorKind::Overrun)));
    }
}
