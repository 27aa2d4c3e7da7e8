//! ASCII-hex encoding for the telemetry wire format.
//!
//! Every value on the wire is rendered as upper-case hexadecimal ASCII so the
//! host can read frames with a plain serial terminal. Nibbles `0..=9` map to
//! `'0'..='9'` and `10..=15` map to `'A'..='F'`.
//!
//! ## Functions
//!
//! - [`nibble_to_ascii`] / [`ascii_to_nibble`]: single hex digit
//! - [`encode_byte`]: two digits, high nibble first
//! - [`encode_low_nibble`]: one digit for the low nibble only
//! - [`encode_sample`]: three digits for a 10-bit conversion
//! - [`encode_u16`]: four digits, high byte first
//!
//! ## Reduced sample encoding
//!
//! Conversions are 10 bits wide, so the high byte of a sample only ever uses
//! its two lowest bits. [`encode_sample`] therefore sends only the low nibble
//! of the high byte followed by the full low byte, saving one character per
//! sample.

/// Maps the low nibble of `nibble` to its upper-case hex digit.
///
/// Upper bits are ignored.
pub fn nibble_to_ascii(nibble: u8) -> u8 {
    let mut ascii = (nibble & 0x0F) + b'0';
    if ascii > b'9' {
        ascii += 7;
    }
    ascii
}

/// Maps a hex digit back to its nibble value.
///
/// Accepts `0-9`, `A-F` and `a-f`; returns `None` for anything else.
pub fn ascii_to_nibble(ascii: u8) -> Option<u8> {
    match ascii {
        b'0'..=b'9' => Some(ascii - b'0'),
        b'A'..=b'F' => Some(ascii - b'A' + 10),
        b'a'..=b'f' => Some(ascii - b'a' + 10),
        _ => None,
    }
}

/// Encodes a byte as two hex digits, high nibble first.
pub fn encode_byte(byte: u8) -> [u8; 2] {
    [nibble_to_ascii(byte >> 4), nibble_to_ascii(byte)]
}

/// Encodes only the low nibble of `byte`.
pub fn encode_low_nibble(byte: u8) -> u8 {
    nibble_to_ascii(byte)
}

/// Encodes a 10-bit sample as three hex digits.
///
/// The first digit is the low nibble of the high byte; bits above bit 11 are
/// dropped.
pub fn encode_sample(sample: u16) -> [u8; 3] {
    let [hi, lo] = sample.to_be_bytes();
    let [lo_hi, lo_lo] = encode_byte(lo);
    [encode_low_nibble(hi), lo_hi, lo_lo]
}

/// Encodes a 16-bit value as four hex digits, high byte first.
pub fn encode_u16(value: u16) -> [u8; 4] {
    let [hi, lo] = value.to_be_bytes();
    let [a, b] = encode_byte(hi);
    let [c, d] = encode_byte(lo);
    [a, b, c, d]
}
