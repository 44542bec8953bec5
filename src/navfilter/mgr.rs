use std::collections::HashMap;
use std::fmt::Write;

use log::{debug, trace, warn};

use super::{
    CNavEmptyFilter, CNavParityFilter, CNavTowFilter, CrossSourceFilter, EmptyFilter, EphMaker,
    NavFilter, NavFilterKey, NavMsgList, ParityFilter, TlmHowFilter,
};
use crate::prelude::{Epoch, Error, FilterConfig, OrbElem, SV};

/// [NavFilterMgr] chains [NavFilter] stages in registration order.
///
/// Every message is fed to the first stage, whatever that stage
/// lets through is fed to the next one, and so on. Messages that
/// survive all the stages are returned in their arrival order.
/// Because some stages need to look ahead, a message may only come
/// out several calls later, or at [NavFilterMgr::finalize].
///
/// When a stage reports an error, whatever it released still goes
/// through the rest of the chain. Those messages are held and returned
/// ahead of anything else by the next successful call.
pub struct NavFilterMgr<'a> {
    filters: Vec<Box<dyn NavFilter<'a> + 'a>>,
    /// Latest time tag, per source stream
    last_epochs: HashMap<(u16, SV), Epoch>,
    /// Arrival counter
    arrivals: u64,
    /// Output of a failed call
    held: NavMsgList<'a>,
}

impl<'a> Default for NavFilterMgr<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> NavFilterMgr<'a> {
    /// Builds a [NavFilterMgr] with no stage: everything goes through.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            last_epochs: HashMap::new(),
            arrivals: 0,
            held: NavMsgList::new(),
        }
    }

    /// Builds the standard LNAV chain:
    /// parity, empty subframes, TLM/HOW, cross source (when several sources
    /// are expected) and finally ephemeris assembly.
    pub fn lnav(cfg: &FilterConfig) -> Self {
        let mut s = Self::new()
            .with_filter(ParityFilter::new())
            .with_filter(EmptyFilter::new())
            .with_filter(TlmHowFilter::new());

        if cfg.expected_sources > 1 {
            s.add_filter(CrossSourceFilter::new(cfg));
        }

        s.with_filter(EphMaker::new())
    }

    /// Builds the standard CNAV chain: CRC, empty messages, header
    /// and cross source (when several sources are expected).
    pub fn cnav(cfg: &FilterConfig) -> Self {
        let mut s = Self::new()
            .with_filter(CNavParityFilter::new())
            .with_filter(CNavEmptyFilter::new())
            .with_filter(CNavTowFilter::new());

        if cfg.expected_sources > 1 {
            s.add_filter(CrossSourceFilter::new(cfg));
        }

        s
    }

    /// Appends a stage to the chain.
    pub fn add_filter<F: NavFilter<'a> + 'a>(&mut self, filter: F) {
        debug!("navfilter: new stage \"{}\"", filter.name());
        self.filters.push(Box::new(filter));
    }

    /// Copies and returns [NavFilterMgr] with one more stage.
    pub fn with_filter<F: NavFilter<'a> + 'a>(mut self, filter: F) -> Self {
        self.add_filter(filter);
        self
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Stage names, in chain order
    pub fn stages(&self) -> Vec<&'static str> {
        self.filters.iter().map(|filter| filter.name()).collect()
    }

    /// Maximal number of messages that may be held back by the chain.
    pub fn wait_length(&self) -> usize {
        self.filters.iter().map(|filter| filter.wait_length()).sum()
    }

    /// Filters a new message. Returns the messages that went through
    /// every stage during this call (possibly none, possibly older ones).
    ///
    /// Time tags must be monotonic within a (source, satellite) stream:
    /// [Error::NonMonotonicTime] otherwise. A malformed message does not
    /// count as the latest of its stream.
    /// Rejections recorded by the stages are reset on each call.
    pub fn validate(&mut self, msg: NavFilterKey<'a>) -> Result<NavMsgList<'a>, Error> {
        let stream = (msg.source, msg.sv);

        if let Some(previous) = self.last_epochs.get(&stream) {
            if msg.epoch < *previous {
                return Err(Error::NonMonotonicTime {
                    sv: msg.sv,
                    source_id: msg.source,
                    epoch: msg.epoch,
                    previous: *previous,
                });
            }
        }

        let msg = msg.with_seq(self.arrivals);
        self.arrivals += 1;

        trace!("navfilter: {}", msg);

        let (list, failure) = self.run_chain(vec![msg], false);

        if !matches!(failure, Some(Error::WordCount { .. })) {
            self.last_epochs.insert(stream, msg.epoch);
        }

        self.release(list, failure)
    }

    /// Flushes every stage, in chain order. What a stage releases on
    /// finalization still goes through all downstream stages.
    /// The [NavFilterMgr] may be reused afterwards.
    pub fn finalize(&mut self) -> Result<NavMsgList<'a>, Error> {
        let (list, failure) = self.run_chain(NavMsgList::new(), true);
        self.last_epochs.clear();
        self.release(list, failure)
    }

    /// Feeds `list` to every stage. A failing stage does not stop the chain:
    /// its output still goes downstream and the first error is reported.
    fn run_chain(
        &mut self,
        mut list: NavMsgList<'a>,
        flush: bool,
    ) -> (NavMsgList<'a>, Option<Error>) {
        let mut failure = None;

        for filter in self.filters.iter_mut() {
            filter.clear_rejected();

            let mut output = NavMsgList::with_capacity(list.len());

            if !list.is_empty() {
                if let Err(e) = filter.validate(list, &mut output) {
                    warn!("navfilter: {} - {}", filter.name(), e);
                    failure.get_or_insert(e);
                }
            }

            if flush {
                if let Err(e) = filter.finalize(&mut output) {
                    warn!("navfilter: {} - {}", filter.name(), e);
                    failure.get_or_insert(e);
                }
            }

            list = output;
        }

        (list, failure)
    }

    fn release(
        &mut self,
        list: NavMsgList<'a>,
        failure: Option<Error>,
    ) -> Result<NavMsgList<'a>, Error> {
        match failure {
            Some(e) => {
                self.held.extend(list);
                Err(e)
            },
            None => {
                let mut released = std::mem::take(&mut self.held);
                released.extend(list);
                Ok(released)
            },
        }
    }

    /// Messages rejected during the latest call, tagged with the rejecting stage.
    pub fn rejected(&self) -> Vec<(&'static str, NavFilterKey<'a>)> {
        self.filters
            .iter()
            .flat_map(|filter| {
                let name = filter.name();
                filter.rejected().iter().map(move |msg| (name, *msg))
            })
            .collect()
    }

    /// Total number of messages discarded because their group never completed.
    pub fn incomplete(&self) -> usize {
        self.filters.iter().map(|filter| filter.incomplete()).sum()
    }

    /// Drains the [OrbElem]s assembled by the chain so far.
    pub fn take_assembled(&mut self) -> Vec<OrbElem> {
        self.filters
            .iter_mut()
            .flat_map(|filter| filter.take_assembled())
            .collect()
    }

    /// Reports the rejections of the latest call, one message per line.
    pub fn dump_rejected(&self) -> String {
        let mut s = String::new();
        for filter in self.filters.iter() {
            for msg in filter.rejected() {
                let _ = writeln!(s, "{:>12} rejected {}", filter.name(), msg);
            }
        }
        s
    }
}
