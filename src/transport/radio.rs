use embedded_hal::delay::DelayNs;
use heapless::Vec;

use super::ack::{AckMatcher, AckStatus};
use crate::acquisition::{Accumulator, SampleWindow};
use crate::config::{Config, SequenceMode};
use crate::consts::{
    API_HEADER_LEN, API_NETWORK_UNKNOWN, API_OPTIONS_NONE, API_RADIUS_MAX_HOPS, API_START,
    API_TRANSMIT_REQUEST, RADIO_PAYLOAD_MAX,
};
use crate::error::{Error, Result};
use crate::frame::{FrameBuffer, FrameSink, write_frame};
use crate::link::SerialLink;

/// Largest encoded transmit request: delimiter, length, header, payload and
/// checksum.
pub const PACKET_MAX: usize = 3 + API_HEADER_LEN as usize + RADIO_PAYLOAD_MAX + 1;

/// Wraps `chunk` in an XBee transmit request addressed to the coordinator.
///
/// `sequence` is the first byte of the RF data, ahead of `chunk`.
pub fn encode_packet(api_frame_id: u8, sequence: u8, chunk: &[u8]) -> Result<Vec<u8, PACKET_MAX>> {
    if chunk.len() > RADIO_PAYLOAD_MAX {
        return Err(Error::BufferFull);
    }
    let len = API_HEADER_LEN + chunk.len() as u8;

    let mut packet: Vec<u8, PACKET_MAX> = Vec::new();
    let header = [
        API_START,
        0x00,
        len,
        API_TRANSMIT_REQUEST,
        api_frame_id,
        0,
        0,
        0,
        0,
        0,
        0,
        0,
        0,
        API_NETWORK_UNKNOWN[0],
        API_NETWORK_UNKNOWN[1],
        API_RADIUS_MAX_HOPS,
        API_OPTIONS_NONE,
        sequence,
    ];
    packet
        .extend_from_slice(&header)
        .map_err(|_| Error::BufferFull)?;
    packet
        .extend_from_slice(chunk)
        .map_err(|_| Error::BufferFull)?;

    let sum = packet[3..].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    packet.push(0xFF - sum).map_err(|_| Error::BufferFull)?;
    Ok(packet)
}

/// Per-window delivery summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Packets the logical frame was split into.
    pub packets: u8,
    /// Packets abandoned after exhausting their attempts.
    pub unacknowledged: u8,
}

/// Sends logical frames as acknowledged XBee API packets.
///
/// The frame is cut into chunks of at most [`RADIO_PAYLOAD_MAX`] bytes. Each
/// chunk is sent and its transmit status awaited, up to `max_attempts` times
/// with the same sequence byte and payload. A packet that is never
/// acknowledged is dropped and the frame continues with the next one.
#[derive(Debug)]
pub struct RadioTransport {
    api_frame_id: u8,
    sequence: SequenceMode,
    max_attempts: u8,
    packet_delay_ms: u32,
    ack_timeout_ms: u32,
    matcher: AckMatcher,
    /// Transmissions made, retries included.
    pub attempts: u32,
    /// Packets acknowledged by the radio.
    pub packets_acked: u32,
    /// Packets abandoned after their last attempt.
    pub packets_dropped: u32,
}

impl RadioTransport {
    /// Creates a transport using the radio settings of `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            api_frame_id: config.api_frame_id,
            sequence: config.sequence,
            max_attempts: config.max_attempts.max(1),
            packet_delay_ms: config.packet_delay_ms,
            ack_timeout_ms: config.ack_timeout_ms,
            matcher: AckMatcher::new(config.ack_frame_id),
            attempts: 0,
            packets_acked: 0,
            packets_dropped: 0,
        }
    }

    /// Sends `window` as one logical frame.
    ///
    /// Unacknowledged packets are counted in the returned [`Delivery`]; only
    /// a failure to write to `link` aborts the frame.
    pub fn send_window<A, L, D>(
        &mut self,
        link: &mut L,
        delay: &mut D,
        window: &SampleWindow<A>,
    ) -> Result<Delivery>
    where
        A: Accumulator,
        L: SerialLink,
        D: DelayNs,
    {
        let mut sink = PacketSink {
            radio: self,
            link,
            delay,
            buffer: FrameBuffer::new(),
            delivery: Delivery::default(),
        };
        let _ = write_frame(window, &mut sink)?;
        sink.finish()
    }

    /// Sends one packet, retrying until it is acknowledged or the attempt
    /// budget runs out.
    pub fn deliver<L, D>(&mut self, link: &mut L, delay: &mut D, sequence: u8, chunk: &[u8]) -> Result<()>
    where
        L: SerialLink,
        D: DelayNs,
    {
        let packet = encode_packet(self.api_frame_id, sequence, chunk)?;
        for attempt in 1..=self.max_attempts {
            self.attempts = self.attempts.wrapping_add(1);
            link.send_all(&packet)?;
            let outcome = self.await_ack(link, delay);
            delay.delay_ms(self.packet_delay_ms);

            match outcome {
                Ok(AckStatus::Delivered) => {
                    self.packets_acked = self.packets_acked.wrapping_add(1);
                    return Ok(());
                }
                Ok(AckStatus::Failed(status)) => {
                    warn!("packet {} attempt {}: delivery status {}", sequence, attempt, status);
                }
                Err(Error::AckTimeout { timeout_ms }) => {
                    warn!("packet {} attempt {}: no status in {} ms", sequence, attempt, timeout_ms);
                }
                Err(_) => {
                    warn!("packet {} attempt {}: status read failed", sequence, attempt);
                }
            }
        }
        self.packets_dropped = self.packets_dropped.wrapping_add(1);
        warn!("packet {} dropped after {} attempts", sequence, self.max_attempts);
        Err(Error::Unacknowledged {
            attempts: self.max_attempts,
        })
    }

    fn await_ack<L, D>(&mut self, link: &mut L, delay: &mut D) -> Result<AckStatus>
    where
        L: SerialLink,
        D: DelayNs,
    {
        self.matcher.reset();
        let mut waited_ms = 0;
        loop {
            match self.matcher.poll(link) {
                Ok(status) => return Ok(status),
                Err(nb::Error::Other(e)) => return Err(e),
                Err(nb::Error::WouldBlock) if waited_ms >= self.ack_timeout_ms => {
                    return Err(Error::AckTimeout {
                        timeout_ms: self.ack_timeout_ms,
                    });
                }
                Err(nb::Error::WouldBlock) => {
                    delay.delay_ms(1);
                    waited_ms += 1;
                }
            }
        }
    }
}

/// Collects frame bytes and ships every full chunk as a packet.
struct PacketSink<'r, L, D> {
    radio: &'r mut RadioTransport,
    link: &'r mut L,
    delay: &'r mut D,
    buffer: FrameBuffer<RADIO_PAYLOAD_MAX>,
    delivery: Delivery,
}

impl<L: SerialLink, D: DelayNs> PacketSink<'_, L, D> {
    fn emit(&mut self, full_only: bool) -> Result<()> {
        let sequence = self.radio.sequence.byte_for(self.delivery.packets);
        let Self {
            radio,
            link,
            delay,
            buffer,
            delivery,
        } = self;

        let mut unacknowledged = false;
        let send = |chunk: &[u8]| match radio.deliver(&mut **link, &mut **delay, sequence, chunk) {
            Err(Error::Unacknowledged { .. }) => {
                unacknowledged = true;
                Ok(())
            }
            other => other,
        };
        let sent = if full_only {
            buffer.flush_when_full(send)?
        } else {
            buffer.flush(send)?
        };

        if sent {
            delivery.packets = delivery.packets.wrapping_add(1);
            if unacknowledged {
                delivery.unacknowledged = delivery.unacknowledged.wrapping_add(1);
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Delivery> {
        self.emit(false)?;
        Ok(self.delivery)
    }
}

impl<L: SerialLink, D: DelayNs> FrameSink for PacketSink<'_, L, D> {
    fn put(&mut self, byte: u8) -> Result<()> {
        self.buffer.push(byte)?;
        self.emit(true)
    }
}
