use crate::acquisition::{Accumulator, PowerIntegral, SampleWindow};
use crate::config::Config;
use crate::error::Result;
use crate::frame::{FrameSink, write_frame};
use crate::link::SerialLink;

/// Writes logical frames straight to the wired serial port.
///
/// Fire and forget: nothing is read back.
#[derive(Debug, Clone)]
pub struct TransparentTransport {
    trailer: Option<u8>,
    /// Frames written so far.
    pub frames_sent: u32,
}

impl TransparentTransport {
    /// Creates a transport appending the trailer of `config`, if any.
    pub fn new(config: &Config) -> Self {
        Self {
            trailer: config.trailer,
            frames_sent: 0,
        }
    }

    /// Writes `window` as one logical frame and returns its checksum.
    pub fn send<A, L>(&mut self, link: &mut L, window: &SampleWindow<A>) -> Result<u16>
    where
        A: Accumulator,
        L: SerialLink,
    {
        let mut sink = DirectSink(link);
        let checksum = write_frame(window, &mut sink)?;
        if let Some(trailer) = self.trailer {
            sink.put(trailer)?;
        }
        self.frames_sent = self.frames_sent.wrapping_add(1);
        Ok(checksum)
    }

    /// Writes the human-readable state dump of a power integrator.
    pub fn send_diagnostics<L: SerialLink>(&mut self, link: &mut L, power: &PowerIntegral) -> Result<()> {
        power.write_diagnostics(&mut DirectSink(link))
    }
}

struct DirectSink<'l, L>(&'l mut L);

impl<L: SerialLink> FrameSink for DirectSink<'_, L> {
    fn put(&mut self, byte: u8) -> Result<()> {
        self.0.send(byte)
    }

    fn put_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.0.send_all(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{Channel, RawBuffer};
    use crate::clock::Timestamp;
    use crate::config::LinkMode;
    use crate::encoding::encode_u16;
    use crate::link::mock::MockLink;

    #[test]
    fn test_raw_frame_goes_out_unchanged() {
        let mut data: RawBuffer = RawBuffer::new();
        for v in [0x0055, 0x03AA, 0x0200] {
            data.on_conversion(Channel::Current, v);
        }
        let window = SampleWindow {
            started_at: Timestamp::new(0x0001, 0x0002),
            data,
        };
        let mut link = MockLink::default();
        let mut transport = TransparentTransport::new(&Config::new::<RawBuffer>(LinkMode::Transparent));
        let checksum = transport.send(&mut link, &window).unwrap();

        let mut expected = b"T00010002S055,3AA,200,X".to_vec();
        expected.extend_from_slice(&encode_u16(checksum));
        expected.push(b'Z');
        assert_eq!(link.sent, expected);
        assert_eq!(transport.frames_sent, 1);
        assert!(link.incoming.is_empty());
    }

    #[test]
    fn test_power_frame_ends_with_newline() {
        let window = SampleWindow {
            started_at: Timestamp::new(0, 0),
            data: PowerIntegral::new(),
        };
        let mut link = MockLink::default();
        let mut transport =
            TransparentTransport::new(&Config::new::<PowerIntegral>(LinkMode::Transparent));
        let _ = transport.send(&mut link, &window).unwrap();
        assert_eq!(link.sent, b"T00000000S00000000X0000Z\n");
    }

    #[test]
    fn test_diagnostics_go_to_the_link() {
        let mut power = PowerIntegral::new();
        power.on_conversion(Channel::Current, 0);
        let mut link = MockLink::default();
        let mut transport =
            TransparentTransport::new(&Config::new::<PowerIntegral>(LinkMode::Transparent));
        transport.send_diagnostics(&mut link, &power).unwrap();
        assert!(link.sent.starts_with(b"Last calcTempV: 0x0000\nLast calcTempI: 0x0200\n"));
        assert_eq!(transport.frames_sent, 0);
    }
}
