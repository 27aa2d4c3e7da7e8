//! Bit-serial CRC16 used to checksum every logical frame.
//!
//! The register is shifted MSB-first, one input bit at a time. Whenever the
//! input bit differs from the register's top bit, taps at bits 4 and 11 are
//! inverted before the shift and a one is fed into bit 0:
//!
//! ```text
//!    ------------------------------------------------------------X-- input
//!    |                  |                               |        |
//!   [0]->...->[4]->X->[5]->...->[11]->X->[12]->...->[15]
//! ```
//!
//! The seed is zero at the start of every frame and the checksum covers the
//! binary values (timestamp, samples or power sum), never their ASCII-hex
//! rendering.

/// Feeds one byte into the CRC register, most significant bit first.
pub fn crc16_update(seed: u16, byte: u8) -> u16 {
    let mut seed = seed;
    let mut data = byte;
    for _ in 0..8 {
        let feedback = ((data >> 7) ^ (seed >> 15) as u8) & 0x1;
        if feedback == 0 {
            seed <<= 1;
        } else {
            seed ^= 0x10 | 0x800;
            seed <<= 1;
            seed |= 0x01;
        }
        data <<= 1;
    }
    seed
}

/// Running CRC16 over a frame's binary contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc16 {
    seed: u16,
}

impl Crc16 {
    /// Creates a digest with a zero seed.
    pub const fn new() -> Self {
        Self { seed: 0 }
    }

    /// Feeds a single byte.
    pub fn update(&mut self, byte: u8) {
        self.seed = crc16_update(self.seed, byte);
    }

    /// Feeds every byte of `bytes` in order.
    pub fn update_slice(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.update(b);
        }
    }

    /// Feeds a 16-bit value, high byte first.
    pub fn update_u16(&mut self, value: u16) {
        self.update_slice(&value.to_be_bytes());
    }

    /// Feeds a 32-bit value, high byte first.
    pub fn update_u32(&mut self, value: u32) {
        self.update_slice(&value.to_be_bytes());
    }

    /// Current register value.
    pub fn finish(&self) -> u16 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crc::{CRC_16_XMODEM, Crc};

    #[test]
    fn test_zero_byte_keeps_zero_seed() {
        assert_eq!(crc16_update(0, 0x00), 0x0000);
    }

    #[test]
    fn test_single_bit_feeds_polynomial() {
        // The only set bit arrives last, so feedback fires once on an empty register.
        assert_eq!(crc16_update(0, 0x01), 0x1021);
    }

    #[test]
    fn test_matches_xmodem_reference() {
        let reference = Crc::<u16>::new(&CRC_16_XMODEM);
        let corpus: [&[u8]; 4] = [
            b"123456789",
            &[0x00, 0x01, 0x00, 0x02, 0x00, 0x55, 0x03, 0xAA, 0x02, 0x00],
            &[0xFF; 32],
            b"T00010002S",
        ];
        for bytes in corpus {
            let mut digest = Crc16::new();
            digest.update_slice(bytes);
            assert_eq!(digest.finish(), reference.checksum(bytes));
        }
    }

    #[test]
    fn test_check_value() {
        let mut digest = Crc16::new();
        digest.update_slice(b"123456789");
        assert_eq!(digest.finish(), 0x31C3);
    }

    #[test]
    fn test_is_deterministic() {
        let bytes = [0x12, 0x34, 0x56, 0x78, 0x9A];
        let mut a = Crc16::new();
        let mut b = Crc16::new();
        a.update_slice(&bytes);
        b.update_slice(&bytes);
        assert_eq!(a.finish(), b.finish());
    }

    #[test]
    fn test_single_bit_flip_changes_checksum() {
        let bytes = [0x00u8, 0x01, 0x00, 0x02, 0x00, 0x55, 0x03, 0xAA, 0x02, 0x00];
        let mut base = Crc16::new();
        base.update_slice(&bytes);
        for i in 0..bytes.len() {
            for bit in 0..8 {
                let mut flipped = bytes;
                flipped[i] ^= 1 << bit;
                let mut digest = Crc16::new();
                digest.update_slice(&flipped);
                assert_ne!(digest.finish(), base.finish(), "byte {i} bit {bit}");
            }
        }
    }

    #[test]
    fn test_wide_updates_are_big_endian() {
        let mut wide = Crc16::new();
        wide.update_u16(0x0001);
        wide.update_u32(0x0002_0055);
        let mut bytes = Crc16::new();
        bytes.update_slice(&[0x00, 0x01, 0x00, 0x02, 0x00, 0x55]);
        assert_eq!(wide.finish(), bytes.finish());
    }
}
