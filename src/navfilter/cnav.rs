//! Civil navigation message (CNAV) helpers, as broadcast on L2C and L5.
//!
//! A message is 300 bits. It is stored the way LNAV subframes are:
//! 10 words of 30 bits right aligned in a `u32`, message bit 1 being
//! bit 29 of the first storage unit. Bits 277-300 hold the CRC-24Q
//! of bits 1-276.
use std::ops::RangeInclusive;

/// Number of 30 bit storage words in a message
pub const WORDS: usize = 10;

/// Message length, in bits
pub const MESSAGE_BITS: usize = 300;

/// Message preamble (bits 1-8)
pub const PREAMBLE: u32 = 0x8B;

/// Number of 6 s epochs in one GPS week: message TOW count upper bound
pub const TOW_COUNT_MAX: u32 = 100_800;

/// Message types in use: ephemeris and clock (10-15), clock and other (30-39).
pub const MESSAGE_TYPES: [RangeInclusive<u32>; 2] = [10..=15, 30..=39];

/// First bit of the payload, right after the alert flag
pub const PAYLOAD_START: usize = 39;

/// First bit of the CRC
pub const CRC_START: usize = 277;

/// CRC-24Q generator polynomial (x^24 implicit)
const CRC24Q_POLY: u32 = 0x86_4CFB;

const CRC24Q_MASK: u32 = 0xFF_FFFF;

/// Bit `index` (0-based) of a message
fn bit(words: &[u32; WORDS], index: usize) -> u32 {
    (words[index / 30] >> (29 - index % 30)) & 0x1
}

/// Extracts a field of `len` bits (1 to 32), starting at 1-based message bit `start`.
/// Fields may cross storage word boundaries.
pub(crate) fn bits(words: &[u32; WORDS], start: usize, len: usize) -> u32 {
    debug_assert!(
        start >= 1 && (1..=32).contains(&len) && start + len - 1 <= MESSAGE_BITS,
        "{} bit field at #{} out of message",
        len,
        start
    );
    (start - 1..start - 1 + len).fold(0, |acc, index| (acc << 1) | bit(words, index))
}

/// CRC-24Q of the first `CRC_START - 1` message bits:
/// bitwise, MSB first, zero initial value.
pub fn crc24q(words: &[u32; WORDS]) -> u32 {
    (0..CRC_START - 1).fold(0, |crc, index| {
        let feedback = ((crc >> 23) & 0x1) ^ bit(words, index);
        let crc = (crc << 1) & CRC24Q_MASK;
        if feedback != 0 {
            crc ^ CRC24Q_POLY
        } else {
            crc
        }
    })
}

/// True if the transmitted CRC matches the message content.
pub fn check_crc(words: &[u32; WORDS]) -> bool {
    crc24q(words) == bits(words, CRC_START, 24)
}

pub fn preamble(words: &[u32; WORDS]) -> u32 {
    bits(words, 1, 8)
}

/// Transmitting PRN
pub fn prn(words: &[u32; WORDS]) -> u32 {
    bits(words, 9, 6)
}

pub fn message_type(words: &[u32; WORDS]) -> u32 {
    bits(words, 15, 6)
}

/// TOW count (units of 6 s) of the leading edge of the next message
pub fn tow_count(words: &[u32; WORDS]) -> u32 {
    bits(words, 21, 17)
}

pub fn alert(words: &[u32; WORDS]) -> bool {
    bits(words, 38, 1) != 0
}

/// True if bits 39-276 carry no information: all zeros,
/// or alternating ones and zeros (either phase).
pub fn is_empty_payload(words: &[u32; WORDS]) -> bool {
    let payload = PAYLOAD_START - 1..CRC_START - 1;

    let zeros = payload.clone().all(|index| bit(words, index) == 0);

    let alternating = payload
        .clone()
        .skip(1)
        .all(|index| bit(words, index) != bit(words, index - 1));

    zeros || alternating
}

/// Repacks a message received as 32 bit words, MSB first
/// (the 12 last bits left justified in the 10th word),
/// into its 30 bit word storage.
pub fn from_packed(packed: &[u32; 10]) -> [u32; WORDS] {
    let mut words = [0; WORDS];
    for index in 0..MESSAGE_BITS {
        let value = (packed[index / 32] >> (31 - index % 32)) & 0x1;
        words[index / 30] |= value << (29 - index % 30);
    }
    words
}
