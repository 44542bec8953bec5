//! Civil navigation message fixtures and encoder.
use crate::navfilter::cnav;

/// L2C messages recorded from PRN 1, week 1877: types 10, 11, 30 and 33
/// starting at 345600 (then every 12 s), as 32 bit words MSB first.
pub const CNAV_PRN01: [[u32; 10]; 4] = [
    [
        0x8B04A708, 0x10EAA60A, 0x6A49007A, 0x2E3FFDAE, 0x42EEB000, 0x81B983C7, 0x9A881433,
        0x89C04F25, 0xB9F60DD4, 0xED600000,
    ],
    [
        0x8B04B708, 0x22490999, 0x6E1AC9D0, 0xF0CB205F, 0xFFEE3FFA, 0xBFFC9FF7, 0x94201BB3,
        0x6022E5FF, 0x8B9802D4, 0xA5600000,
    ],
    [
        0x8B05E708, 0x320A6A79, 0x240214AC, 0x80084000, 0x0B0FFB7E, 0x5019E0D4, 0x0DFFFF02,
        0x39F1FF11, 0x5500081A, 0x33500000,
    ],
    [
        0x8B061708, 0x420A6A79, 0x240214AC, 0x80084001, 0xFFCE0000, 0x02298EE7, 0x5539D988,
        0x80000000, 0x00000486, 0xBF400000,
    ],
];

/// Same epochs, from PRN 5
pub const CNAV_PRN05: [[u32; 10]; 4] = [
    [
        0x8B14A708, 0x10EAA605, 0xEA4900F8, 0x87BFFFCF, 0xE33EE000, 0x0DD1110C, 0x796012CA,
        0x8EB84F34, 0xC1F0049B, 0x24900000,
    ],
    [
        0x8B14B708, 0x22491E9A, 0xBFDBC9A2, 0xACF8E007, 0xC0DE000E, 0xC002C003, 0x510016F7,
        0x4028AB00, 0x2FF00D9E, 0x66400000,
    ],
    [
        0x8B15E708, 0x3205E5F9, 0x25D6111F, 0x801FB001, 0xE90FFC83, 0x1E001000, 0x0DFFFF02,
        0x39F1FF11, 0x55000952, 0x83B00000,
    ],
    [
        0x8B161708, 0x4205E5F9, 0x25D6111F, 0x801FB001, 0xFFCE0000, 0x022979C7, 0x5539D988,
        0x80000000, 0x00000F0F, 0x80A00000,
    ],
];

/// CNAV message under construction, in 30 bit word storage
#[derive(Debug, Default, Clone, Copy)]
pub struct CnavMessage {
    words: [u32; cnav::WORDS],
}

impl CnavMessage {
    /// New message with a valid header and a non trivial payload
    pub fn new(prn: u32, message_type: u32, tow_count: u32) -> Self {
        let mut s = Self::default();
        s.set(1, 8, cnav::PREAMBLE)
            .set(9, 6, prn)
            .set(15, 6, message_type)
            .set(21, 17, tow_count)
            .payload(0x1234_5678);
        s
    }

    /// Writes the `len` LSB of `value` starting at 1-based message bit `start`.
    pub fn set(&mut self, start: usize, len: usize, value: u32) -> &mut Self {
        for k in 0..len {
            let bit = (value >> (len - 1 - k)) & 0x1;
            let index = start - 1 + k;
            let (word, shift) = (index / 30, 29 - index % 30);
            self.words[word] &= !(1 << shift);
            self.words[word] |= bit << shift;
        }
        self
    }

    /// Repeats a 32 bit pattern over bits 39 to 276.
    pub fn payload(&mut self, pattern: u32) -> &mut Self {
        for start in (cnav::PAYLOAD_START..cnav::CRC_START).step_by(32) {
            let len = (cnav::CRC_START - start).min(32);
            self.set(start, len, pattern >> (32 - len));
        }
        self
    }

    /// Message words with a valid CRC
    pub fn encode(&self) -> [u32; cnav::WORDS] {
        let mut sealed = *self;
        sealed.set(cnav::CRC_START, 24, cnav::crc24q(&self.words));
        sealed.words
    }
}
