//! Legacy navigation message encoder, written after the ICD parity equations.
use crate::{
    constants::SEMI_CIRCLE_RAD,
    prelude::{Epoch, TimeScale},
};

/// Data bits involved in each parity bit (1-based)
const D25: &[usize] = &[1, 2, 3, 5, 6, 10, 11, 12, 13, 14, 17, 18, 20, 23];
const D26: &[usize] = &[2, 3, 4, 6, 7, 11, 12, 13, 14, 15, 18, 19, 21, 24];
const D27: &[usize] = &[1, 3, 4, 5, 7, 8, 12, 13, 14, 15, 16, 19, 20, 22];
const D28: &[usize] = &[2, 4, 5, 6, 8, 9, 13, 14, 15, 16, 17, 20, 21, 23];
const D29: &[usize] = &[1, 3, 5, 6, 7, 9, 10, 14, 15, 16, 17, 18, 21, 22, 24];
const D30: &[usize] = &[3, 5, 6, 8, 9, 10, 11, 13, 15, 19, 22, 23, 24];

fn xor_bits(data: u32, bits: &[usize]) -> u32 {
    bits.iter()
        .fold(0, |acc, bit| acc ^ ((data >> (24 - bit)) & 0x1))
}

/// Encodes 24 upright data bits into a transmitted word,
/// given the previously transmitted word.
pub fn encode_word(data: u32, prev: u32) -> u32 {
    let d29_star = (prev >> 1) & 0x1;
    let d30_star = prev & 0x1;

    let parity = [
        d29_star ^ xor_bits(data, D25),
        d30_star ^ xor_bits(data, D26),
        d29_star ^ xor_bits(data, D27),
        d30_star ^ xor_bits(data, D28),
        d30_star ^ xor_bits(data, D29),
        d29_star ^ xor_bits(data, D30),
    ]
    .iter()
    .fold(0, |acc, bit| (acc << 1) | bit);

    let transmitted = if d30_star == 1 {
        data ^ 0xFF_FFFF
    } else {
        data
    };

    (transmitted << 6) | parity
}

/// Subframe under construction: 10 words of 24 upright data bits
#[derive(Debug, Default, Clone, Copy)]
pub struct Subframe {
    data: [u32; 10],
}

impl Subframe {
    /// New subframe with valid TLM and HOW
    pub fn new(id: u8, tow_count: u32) -> Self {
        let mut s = Self::default();
        s.set(1, 8, 0x8B);
        s.set(31, 17, tow_count);
        s.set(50, 3, id as u32);
        s
    }

    /// Writes the `len` LSB of `value` starting at 1-based subframe bit `start`.
    pub fn set(&mut self, start: usize, len: usize, value: u32) -> &mut Self {
        for k in 0..len {
            let bit = (value >> (len - 1 - k)) & 0x1;
            let position = start + k - 1;
            let (word, offset) = (position / 30, position % 30);
            assert!(offset < 24, "bit #{} is a parity bit", position + 1);
            self.data[word] &= !(1 << (23 - offset));
            self.data[word] |= bit << (23 - offset);
        }
        self
    }

    /// Writes a value split in two fields (MSB first).
    pub fn set2(&mut self, msb: (usize, usize), lsb: (usize, usize), value: u32) -> &mut Self {
        self.set(msb.0, msb.1, value >> lsb.1);
        self.set(lsb.0, lsb.1, value & ((1u64 << lsb.1) - 1) as u32);
        self
    }

    /// Overwrites the 24 data bits of words 3 to 10.
    pub fn fill(&mut self, pattern: u32) -> &mut Self {
        for word in self.data[2..].iter_mut() {
            *word = pattern & 0xFF_FFFF;
        }
        self
    }

    /// Encodes this subframe. The last two data bits of the HOW and
    /// of word 10 are solved so that their D29 and D30 are zero.
    pub fn encode(&self) -> [u32; 10] {
        let mut words = [0; 10];
        let mut prev = 0;

        for (i, data) in self.data.iter().enumerate() {
            let word = if i == 1 || i == 9 {
                (0..4)
                    .map(|t| encode_word((data & !0x3) | t, prev))
                    .find(|word| word & 0x3 == 0)
                    .unwrap()
            } else {
                encode_word(*data, prev)
            };
            words[i] = word;
            prev = word;
        }

        words
    }
}

/// Raw (quantized) content of subframes 1, 2 and 3
#[derive(Debug, Clone, Copy)]
pub struct LnavEphemeris {
    pub week: u32,
    pub ura: u32,
    pub health: u32,
    pub iodc: u32,
    pub iode: u32,
    pub tgd: i32,
    pub toc: u32,
    pub af2: i32,
    pub af1: i32,
    pub af0: i32,
    pub crs: i32,
    pub dn: i32,
    pub m0: i32,
    pub cuc: i32,
    pub e: u32,
    pub cus: i32,
    pub sqrt_a: u32,
    pub toe: u32,
    pub fit_flag: u32,
    pub cic: i32,
    pub omega0: i32,
    pub cis: i32,
    pub i0: i32,
    pub crc: i32,
    pub omega: i32,
    pub omega_dot: i32,
    pub idot: i32,
}

/// Engineering values, in the units of [Kepler](crate::prelude::Kepler)
#[derive(Debug, Clone, Copy)]
pub struct KeplerValues {
    pub sqrt_a: f64,
    pub e: f64,
    pub m0: f64,
    pub dn: f64,
    pub i0: f64,
    pub idot: f64,
    pub omega0: f64,
    pub omega: f64,
    pub omega_dot: f64,
    pub cuc: f64,
    pub cus: f64,
    pub crc: f64,
    pub crs: f64,
    pub cic: f64,
    pub cis: f64,
    pub toe_sow: f64,
    pub af0: f64,
    pub af1: f64,
    pub af2: f64,
}

fn twos(value: i32, len: usize) -> u32 {
    (value as u32) & ((1u64 << len) - 1) as u32
}

impl Default for LnavEphemeris {
    fn default() -> Self {
        Self {
            week: 2100,
            ura: 0,
            health: 0,
            iodc: 42,
            iode: 42,
            tgd: -11,
            toc: 18_900,
            af2: 0,
            af1: -1234,
            af0: 123_456,
            crs: -1280,
            dn: 10_000,
            m0: 0x2666_6666,
            cuc: 2000,
            e: 85_899_346,
            cus: 4000,
            sqrt_a: 2_701_966_131,
            toe: 18_900,
            fit_flag: 0,
            cic: 100,
            omega0: -0x4000_0000,
            cis: -50,
            i0: 0x2800_0000,
            crc: 8000,
            omega: 0x1000_0000,
            omega_dot: -22_000,
            idot: 100,
        }
    }
}

impl LnavEphemeris {
    /// ToE as an [Epoch]
    pub fn toe_epoch(&self) -> Epoch {
        gps_epoch(self.week, self.toe as f64 * 16.0)
    }

    /// Encodes subframes 1, 2 and 3 of a frame starting at `frame_sow`.
    pub fn subframes(&self, frame_sow: u32) -> [[u32; 10]; 3] {
        let tow = |id: u32| (frame_sow + 6 * id) / 6;

        let mut sf1 = Subframe::new(1, tow(1));
        sf1.set(61, 10, self.week & 0x3FF)
            .set(73, 4, self.ura)
            .set(77, 6, self.health)
            .set2((83, 2), (211, 8), self.iodc)
            .set(197, 8, twos(self.tgd, 8))
            .set(219, 16, self.toc)
            .set(241, 8, twos(self.af2, 8))
            .set(249, 16, twos(self.af1, 16))
            .set(271, 22, twos(self.af0, 22));

        let mut sf2 = Subframe::new(2, tow(2));
        sf2.set(61, 8, self.iode)
            .set(69, 16, twos(self.crs, 16))
            .set(91, 16, twos(self.dn, 16))
            .set2((107, 8), (121, 24), self.m0 as u32)
            .set(151, 16, twos(self.cuc, 16))
            .set2((167, 8), (181, 24), self.e)
            .set(211, 16, twos(self.cus, 16))
            .set2((227, 8), (241, 24), self.sqrt_a)
            .set(271, 16, self.toe)
            .set(287, 1, self.fit_flag);

        let mut sf3 = Subframe::new(3, tow(3));
        sf3.set(61, 16, twos(self.cic, 16))
            .set2((77, 8), (91, 24), self.omega0 as u32)
            .set(121, 16, twos(self.cis, 16))
            .set2((137, 8), (151, 24), self.i0 as u32)
            .set(181, 16, twos(self.crc, 16))
            .set2((197, 8), (211, 24), self.omega as u32)
            .set(241, 24, twos(self.omega_dot, 24))
            .set(271, 8, self.iode)
            .set(279, 14, twos(self.idot, 14));

        [sf1.encode(), sf2.encode(), sf3.encode()]
    }

    /// Scaled values
    pub fn values(&self) -> KeplerValues {
        let pi = SEMI_CIRCLE_RAD;
        KeplerValues {
            sqrt_a: self.sqrt_a as f64 * 2.0_f64.powi(-19),
            e: self.e as f64 * 2.0_f64.powi(-33),
            m0: self.m0 as f64 * 2.0_f64.powi(-31) * pi,
            dn: self.dn as f64 * 2.0_f64.powi(-43) * pi,
            i0: self.i0 as f64 * 2.0_f64.powi(-31) * pi,
            idot: self.idot as f64 * 2.0_f64.powi(-43) * pi,
            omega0: self.omega0 as f64 * 2.0_f64.powi(-31) * pi,
            omega: self.omega as f64 * 2.0_f64.powi(-31) * pi,
            omega_dot: self.omega_dot as f64 * 2.0_f64.powi(-43) * pi,
            cuc: self.cuc as f64 * 2.0_f64.powi(-29),
            cus: self.cus as f64 * 2.0_f64.powi(-29),
            crc: self.crc as f64 * 2.0_f64.powi(-5),
            crs: self.crs as f64 * 2.0_f64.powi(-5),
            cic: self.cic as f64 * 2.0_f64.powi(-29),
            cis: self.cis as f64 * 2.0_f64.powi(-29),
            toe_sow: self.toe as f64 * 16.0,
            af0: self.af0 as f64 * 2.0_f64.powi(-31),
            af1: self.af1 as f64 * 2.0_f64.powi(-43),
            af2: self.af2 as f64 * 2.0_f64.powi(-55),
        }
    }
}

/// GPST [Epoch] from week number and seconds of week
pub fn gps_epoch(week: u32, sow: f64) -> Epoch {
    Epoch::from_time_of_week(week, (sow * 1.0E9) as u64, TimeScale::GPST)
}
