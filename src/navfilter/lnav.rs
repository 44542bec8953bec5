//! Legacy navigation message (LNAV) word helpers.
//!
//! A subframe is 10 words of 30 bits, right aligned in a `u32`:
//! transmitted bit 1 of a word is bit 29 of the storage unit,
//! bits 25-30 (storage bits 5..0) are the parity bits D25..D30.
//! When D30 of the previous word is set, the 24 data bits of
//! the current word are transmitted inverted.

/// Number of words in a subframe
pub const WORDS: usize = 10;

/// TLM preamble
pub const PREAMBLE: u32 = 0x8B;

/// Number of 1.5s epochs in one GPS week: HOW TOW count upper bound
pub const TOW_COUNT_MAX: u32 = 100_800;

/// 24 data bits of a word
pub const DATA_MASK: u32 = 0x3FFF_FFC0;

const PARITY_MASK: u32 = 0x3F;

/// Data bits involved in D25..D30
const BMASK: [u32; 6] = [
    0x3B1F_3480,
    0x1D8F_9A40,
    0x2EC7_CD00,
    0x1763_E680,
    0x2BB1_F340,
    0x0B7A_89C0,
];

/// Previous D29* (0x2) or D30* (0x1) involved in D25..D30
const PMASK: [u32; 6] = [0x2, 0x1, 0x2, 0x1, 0x1, 0x2];

/// Computes D25..D30 of a received `word`, given the received previous word
/// (0 for the first word of a subframe).
pub fn parity_bits(word: u32, prev: u32) -> u32 {
    let data = if prev & 0x1 != 0 {
        word ^ DATA_MASK
    } else {
        word
    };

    BMASK
        .iter()
        .zip(PMASK.iter())
        .fold(0, |parity, (bmask, pmask)| {
            let ones = (data & bmask).count_ones() + (prev & pmask).count_ones();
            (parity << 1) | (ones & 0x1)
        })
}

/// True if this received word passes its parity check.
pub fn check_word_parity(word: u32, prev: u32) -> bool {
    parity_bits(word, prev) == word & PARITY_MASK
}

/// True if all 10 words of this subframe pass their parity check.
/// The first word is checked against D29* = D30* = 0.
pub fn check_parity(words: &[u32; WORDS]) -> bool {
    let mut prev = 0;
    for word in words.iter() {
        if !check_word_parity(*word, prev) {
            return false;
        }
        prev = *word;
    }
    true
}

/// Returns a copy of this subframe with the data bits restored
/// to their upright polarity. Parity bits are left untouched.
pub fn cook(words: &[u32; WORDS]) -> [u32; WORDS] {
    let mut cooked = *words;
    for i in 1..WORDS {
        if words[i - 1] & 0x1 != 0 {
            cooked[i] ^= DATA_MASK;
        }
    }
    cooked
}

/// 24 data bits of this word
pub fn data_bits(word: u32) -> u32 {
    (word >> 6) & 0xFF_FFFF
}

/// Extracts an unsigned field from a (cooked) subframe.
/// `start` is the 1-based subframe bit number, fields do not cross word boundaries.
///
/// # Panics
/// Layout errors (`start` out of the subframe, empty field or field
/// crossing a word boundary) panic in debug builds.
pub(crate) fn field(words: &[u32; WORDS], start: usize, len: usize) -> u32 {
    debug_assert!(
        (1..=WORDS * 30).contains(&start),
        "bit #{} out of subframe",
        start
    );
    debug_assert!(
        len >= 1 && (start - 1) % 30 + len <= 30,
        "{} bit field at #{} crosses a word boundary",
        len,
        start
    );
    let index = (start - 1) / 30;
    let shift = 29 - (start - 1) % 30 - (len - 1);
    (words[index] >> shift) & ((1u64 << len) - 1) as u32
}

/// Extracts an unsigned field split in two parts (MSB first).
pub(crate) fn field2(words: &[u32; WORDS], msb: (usize, usize), lsb: (usize, usize)) -> u32 {
    (field(words, msb.0, msb.1) << lsb.1) | field(words, lsb.0, lsb.1)
}

/// Sign extends a two's complement field of `len` bits (1 to 32).
pub(crate) fn signed(value: u32, len: usize) -> i32 {
    debug_assert!((1..=32).contains(&len), "invalid field length {}", len);
    let shift = 32 - len as u32;
    ((value << shift) as i32) >> shift
}

/// Extracts a signed field from a (cooked) subframe.
pub(crate) fn signed_field(words: &[u32; WORDS], start: usize, len: usize) -> i32 {
    signed(field(words, start, len), len)
}

/// Extracts a signed field split in two parts (MSB first).
pub(crate) fn signed_field2(
    words: &[u32; WORDS],
    msb: (usize, usize),
    lsb: (usize, usize),
) -> i32 {
    signed(field2(words, msb, lsb), msb.1 + lsb.1)
}

/// True if the (cooked) TLM word starts with the preamble.
pub fn has_preamble(cooked: &[u32; WORDS]) -> bool {
    field(cooked, 1, 8) == PREAMBLE
}

/// Subframe ID, from the (cooked) HOW word
pub fn subframe_id(cooked: &[u32; WORDS]) -> u8 {
    ((cooked[1] >> 8) & 0x7) as u8
}

/// Truncated TOW count (units of 6 s), from the (cooked) HOW word.
/// This is the time of the leading edge of the next subframe.
pub fn tow_count(cooked: &[u32; WORDS]) -> u32 {
    (cooked[1] >> 13) & 0x1_FFFF
}
