//! Navigation message filtering: raw subframe (LNAV) or message (CNAV)
//! words in, validated and de-duplicated messages out.
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::prelude::{Epoch, Error, OrbElem, SV};

pub mod cnav;
pub mod lnav;

mod cnav_empty;
mod cnav_parity;
mod cnav_tow;
mod cross_source;
mod empty;
mod eph_maker;
mod mgr;
mod parity;
mod pending;
mod tlm_how;

pub use cnav_empty::CNavEmptyFilter;
pub use cnav_parity::CNavParityFilter;
pub use cnav_tow::CNavTowFilter;
pub use cross_source::CrossSourceFilter;
pub use empty::EmptyFilter;
pub use eph_maker::EphMaker;
pub use mgr::NavFilterMgr;
pub use parity::ParityFilter;
pub use tlm_how::TlmHowFilter;

pub(crate) use pending::{PendingQueue, Verdict};

/// [NavFilterKey] is a time stamped, satellite tagged handle on
/// raw navigation message words. The words are borrowed:
/// the caller keeps them alive for as long as the filter pipeline
/// may hold the message (at least until [NavFilterMgr::finalize]).
///
/// Words are right aligned in their storage unit and ordered
/// the way they were transmitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavFilterKey<'a> {
    /// Transmitting [SV]
    pub sv: SV,
    /// Time of transmission (or best estimate)
    pub epoch: Epoch,
    /// Source identifier (receiver, antenna, tracking channel..).
    /// Time tags must be monotonic within one source stream.
    pub source: u16,
    /// Arrival sequence number, assigned by [NavFilterMgr]
    pub seq: u64,
    /// Raw message words
    pub words: &'a [u32],
}

impl<'a> NavFilterKey<'a> {
    /// Builds a new [NavFilterKey] for a message transmitted by [SV] around [Epoch].
    pub fn new(sv: SV, epoch: Epoch, source: u16, words: &'a [u32]) -> Self {
        Self {
            sv,
            epoch,
            source,
            seq: 0,
            words,
        }
    }

    /// Copies and returns [NavFilterKey] with updated sequence number.
    pub fn with_seq(&self, seq: u64) -> Self {
        let mut s = *self;
        s.seq = seq;
        s
    }

    fn fixed_words<const N: usize>(&self) -> Result<&'a [u32; N], Error> {
        <&[u32; N]>::try_from(self.words).map_err(|_| Error::WordCount {
            expected: N,
            found: self.words.len(),
        })
    }

    /// Returns the 10 words of a legacy (LNAV) subframe.
    pub(crate) fn lnav_words(&self) -> Result<&'a [u32; lnav::WORDS], Error> {
        self.fixed_words()
    }

    /// Returns the 300 bit CNAV message, as 10 words of 30 bits.
    pub(crate) fn cnav_words(&self) -> Result<&'a [u32; cnav::WORDS], Error> {
        self.fixed_words()
    }
}

impl Display for NavFilterKey<'_> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{} {} src#{} seq#{} [", self.sv, self.epoch, self.source, self.seq)?;
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:08X}", word)?;
        }
        write!(f, "]")
    }
}

/// Ordered list of messages, in arrival order.
/// Insertion order is the filtering order.
pub type NavMsgList<'a> = Vec<NavFilterKey<'a>>;

/// A [NavFilter] is one pluggable validation (or transformation) stage.
///
/// Accepted messages are appended to the output in their original relative order.
/// Rejected messages are not errors: they are kept in [NavFilter::rejected]
/// for diagnostics. Only precondition violations (malformed messages)
/// cause a stage to return an [Error].
pub trait NavFilter<'a> {
    /// Stage name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Filters `input`, appending every finalized and accepted message to `output`.
    fn validate(
        &mut self,
        input: NavMsgList<'a>,
        output: &mut NavMsgList<'a>,
    ) -> Result<(), Error>;

    /// Flushes any message still buffered by this stage. Called at end of stream.
    fn finalize(&mut self, output: &mut NavMsgList<'a>) -> Result<(), Error> {
        let _ = output;
        Ok(())
    }

    /// Number of additional messages this stage may need to see
    /// before it can take a final decision on the current one.
    fn wait_length(&self) -> usize {
        0
    }

    /// Messages rejected since the last [NavFilter::clear_rejected].
    fn rejected(&self) -> &[NavFilterKey<'a>];

    fn clear_rejected(&mut self);

    /// Number of messages discarded because they belonged to
    /// a group that could never be completed.
    fn incomplete(&self) -> usize {
        0
    }

    /// Drains the [OrbElem]s this stage assembled so far.
    fn take_assembled(&mut self) -> Vec<OrbElem> {
        Vec::new()
    }
}

#[cfg(test)]
mod test {
    use super::NavFilterKey;
    use crate::prelude::{Constellation, Epoch, Error, SV};
    use std::str::FromStr;

    #[test]
    fn lnav_word_count() {
        let t = Epoch::from_str("2020-04-05T00:00:00 GPST").unwrap();
        let sv = SV::new(Constellation::GPS, 1);

        let words = [0u32; 10];
        let key = NavFilterKey::new(sv, t, 0, &words);
        assert!(key.lnav_words().is_ok());

        let words = [0u32; 9];
        let key = NavFilterKey::new(sv, t, 0, &words);
        assert_eq!(
            key.lnav_words(),
            Err(Error::WordCount {
                expected: 10,
                found: 9
            })
        );
    }

    #[test]
    fn key_display() {
        let t = Epoch::from_str("2020-04-05T00:00:00 GPST").unwrap();
        let sv = SV::new(Constellation::GPS, 1);
        let words = [0x22C0_0000, 0x1];
        let key = NavFilterKey::new(sv, t, 2, &words).with_seq(5);
        let s = key.to_string();
        assert!(s.contains("src#2 seq#5"));
        assert!(s.ends_with("[22C00000 00000001]"));
    }
}
