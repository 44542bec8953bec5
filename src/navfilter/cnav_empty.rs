use log::debug;

use super::{cnav, NavFilter, NavFilterKey, NavMsgList};
use crate::prelude::Error;

/// [CNavEmptyFilter] rejects CNAV messages with a filler payload
/// (bits 39 to 276 all zeros, or alternating ones and zeros).
#[derive(Debug, Default)]
pub struct CNavEmptyFilter<'a> {
    rejected: NavMsgList<'a>,
}

impl<'a> CNavEmptyFilter<'a> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> NavFilter<'a> for CNavEmptyFilter<'a> {
    fn name(&self) -> &'static str {
        "cnav-empty"
    }

    fn validate(
        &mut self,
        input: NavMsgList<'a>,
        output: &mut NavMsgList<'a>,
    ) -> Result<(), Error> {
        for msg in input {
            if cnav::is_empty_payload(msg.cnav_words()?) {
                debug!("{} - empty message", msg);
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
