use log::debug;

use super::{lnav, NavFilter, NavFilterKey, NavMsgList};
use crate::prelude::Error;

/// Default data patterns transmitted in place of real content
const FILL_PATTERNS: [u32; 3] = [0x00_0000, 0xAA_AAAA, 0x55_5555];

/// [EmptyFilter] rejects LNAV subframes that carry no information:
/// words 3 to 10 all hold the same filler pattern
/// (all zeros or alternating ones and zeros).
/// The last two data bits of word 10 are only there to solve
/// its parity and are not compared.
#[derive(Debug, Default)]
pub struct EmptyFilter<'a> {
    rejected: NavMsgList<'a>,
}

impl<'a> EmptyFilter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_empty(words: &[u32; lnav::WORDS]) -> bool {
        let cooked = lnav::cook(words);
        FILL_PATTERNS.iter().any(|pattern| {
            cooked[2..lnav::WORDS - 1]
                .iter()
                .all(|word| lnav::data_bits(*word) == *pattern)
                && lnav::data_bits(cooked[lnav::WORDS - 1]) >> 2 == pattern >> 2
        })
    }
}

impl<'a> NavFilter<'a> for EmptyFilter<'a> {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn validate(
        &mut self,
        input: NavMsgList<'a>,
        output: &mut NavMsgList<'a>,
    ) -> Result<(), Error> {
        for msg in input {
            if Self::is_empty(msg.lnav_words()?) {
                debug!("{} - empty subframe", msg);
                self.rejected.push(msg);
            } else {
                output.push(msg);
            }
        }
        Ok(())
    }

    fn rejected(&self) -> &[NavFilterKey<'a>] {
        &self.rejected
    }

    fn clear_rejected(&mut self) {
        self.rejected.clear();
    }
}
