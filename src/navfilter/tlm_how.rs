use log::debug;

use super::{lnav, NavFilter, NavFilterKey, NavMsgList};
use crate::prelude::Error;

/// [TlmHowFilter] checks the structure of the first two words of
/// LNAV subframes: TLM preamble, HOW D29/D30 forced to zero,
/// TOW count within the week and a legal subframe ID.
#[derive(Debug, Default)]
pub struct TlmHowFilter<'a> {
    rejected: NavMsgList<'a>,
}

impl<'a> TlmHowFilter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_valid(words: &[u32; lnav::WORDS]) -> bool {
        let cooked = lnav::cook(words);
        lnav::has_preamble(&cooked)
            && cooked[1] & 0x3 == 0
            && lnav::tow_count(&cooked) < lnav::TOW_COUNT_MAX
            && (1..=5).contains(&lnav::subframe_id(&cooked))
    }
}

impl<'a> NavFilter<'a> for TlmHowFilter<'a> {
    fn name(&self) -> &'static str {
        "tlm-how"
    }

    fn validate(
        &mut self,
        input: NavMsgList<'a>,
        output: &mut NavMsgList<'a>,
    ) -> Result<(), Error> {
        for msg in input {
            if Self::is_valid(msg.lnav_words()?) {
                output.push(msg);
            } else {
                debug!("{} - invalid TLM/HOW", msg);
                self.rejected.push(msg);
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
