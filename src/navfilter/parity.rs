use log::debug;

use super::{lnav, NavFilter, NavFilterKey, NavMsgList};
use crate::prelude::Error;

/// [ParityFilter] rejects LNAV subframes where any of the 10 words
/// fails its parity check. Stateless: decisions are immediate.
#[derive(Debug, Default)]
pub struct ParityFilter<'a> {
    rejected: NavMsgList<'a>,
}

impl<'a> ParityFilter<'a> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> NavFilter<'a> for ParityFilter<'a> {
    fn name(&self) -> &'static str {
        "parity"
    }

    fn validate(
        &mut self,
        input: NavMsgList<'a>,
        output: &mut NavMsgList<'a>,
    ) -> Result<(), Error> {
        for msg in input {
            let words = msg.lnav_words()?;
            if lnav::check_parity(words) {
                output.push(msg);
            } else {
                debug!("{} - parity failure", msg);
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
