use log::debug;

use super::{cnav, NavFilter, NavFilterKey, NavMsgList};
use crate::prelude::Error;

/// [CNavTowFilter] checks the CNAV message header:
/// preamble, TOW count within the week and a message type in use.
#[derive(Debug, Default)]
pub struct CNavTowFilter<'a> {
    rejected: NavMsgList<'a>,
}

impl<'a> CNavTowFilter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_valid(words: &[u32; cnav::WORDS]) -> bool {
        let message_type = cnav::message_type(words);
        cnav::preamble(words) == cnav::PREAMBLE
            && cnav::tow_count(words) < cnav::TOW_COUNT_MAX
            && cnav::MESSAGE_TYPES
                .iter()
                .any(|types| types.contains(&message_type))
    }
}

impl<'a> NavFilter<'a> for CNavTowFilter<'a> {
    fn name(&self) -> &'static str {
        "cnav-tow"
    }

    fn validate(
        &mut self,
        input: NavMsgList<'a>,
        output: &mut NavMsgList<'a>,
    ) -> Result<(), Error> {
        for msg in input {
            if Self::is_valid(msg.cnav_words()?) {
                output.push(msg);
            } else {
                debug!("{} - invalid CNAV header", msg);
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
