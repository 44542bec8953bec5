use log::debug;

use super::{cnav, NavFilter, NavFilterKey, NavMsgList};
use crate::prelude::Error;

/// [CNavParityFilter] rejects CNAV messages whose CRC-24Q does not
/// match their content. Stateless: decisions are immediate.
#[derive(Debug, Default)]
pub struct CNavParityFilter<'a> {
    rejected: NavMsgList<'a>,
}

impl<'a> CNavParityFilter<'a> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> NavFilter<'a> for CNavParityFilter<'a> {
    fn name(&self) -> &'static str {
        "cnav-parity"
    }

    fn validate(
        &mut self,
        input: NavMsgList<'a>,
        output: &mut NavMsgList<'a>,
    ) -> Result<(), Error> {
        for msg in input {
            if cnav::check_crc(msg.cnav_words()?) {
                output.push(msg);
            } else {
                debug!("{} - CRC failure", msg);
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
