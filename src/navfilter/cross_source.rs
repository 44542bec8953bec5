use itertools::Itertools;
use log::{debug, warn};

use super::{NavFilter, NavFilterKey, NavMsgList, PendingQueue, Verdict};
use crate::prelude::{Epoch, Error, FilterConfig, SV};

/// Copies of one message, received from different sources.
#[derive(Debug)]
struct Group {
    sv: SV,
    epoch: Epoch,
    /// Arrival count after which this group is decided anyway
    deadline: u64,
    /// [PendingQueue] handles
    members: Vec<u64>,
}

/// [CrossSourceFilter] compares copies of the same message (same [SV],
/// same time tag) collected from several sources, and only lets through
/// the copies that agree with the most common bit pattern.
///
/// Messages are buffered until `expected_sources` copies were collected,
/// or until `expected_sources` further messages went through without
/// completing the group. Output order is the arrival order.
#[derive(Debug)]
pub struct CrossSourceFilter<'a> {
    expected_sources: usize,
    max_bit_mismatch: u32,
    min_agreeing: usize,
    strict: bool,
    arrivals: u64,
    groups: Vec<Group>,
    queue: PendingQueue<'a>,
    rejected: NavMsgList<'a>,
    /// Disagreements found during the current call
    disagreements: Vec<(SV, Epoch)>,
}

impl<'a> Default for CrossSourceFilter<'a> {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}

impl<'a> CrossSourceFilter<'a> {
    pub fn new(cfg: &FilterConfig) -> Self {
        Self {
            expected_sources: cfg.expected_sources.max(1),
            max_bit_mismatch: cfg.max_bit_mismatch,
            min_agreeing: cfg.min_agreeing.max(1),
            strict: cfg.strict_cross_source,
            arrivals: 0,
            groups: Vec::new(),
            queue: PendingQueue::default(),
            rejected: NavMsgList::new(),
            disagreements: Vec::new(),
        }
    }

    /// Number of differing bits between two messages.
    /// Messages with different lengths never match.
    fn mismatch(lhs: &[u32], rhs: &[u32]) -> Option<u32> {
        if lhs.len() != rhs.len() {
            return None;
        }
        Some(
            lhs.iter()
                .zip(rhs.iter())
                .map(|(a, b)| (a ^ b).count_ones())
                .sum(),
        )
    }

    fn decide(&mut self, group: Group) {
        let copies = group
            .members
            .iter()
            .filter_map(|handle| self.queue.get(*handle).map(|msg| (*handle, msg.words)))
            .collect::<Vec<_>>();

        // most common pattern, earliest arrival first on equal counts
        let counts = copies.iter().map(|(_, words)| *words).counts();
        let mut ranking = copies
            .iter()
            .map(|(_, words)| *words)
            .unique()
            .map(|words| (words, counts.get(words).copied().unwrap_or(0)))
            .collect::<Vec<_>>();
        ranking.sort_by(|a, b| b.1.cmp(&a.1));

        let (reference, count) = match ranking.first() {
            Some(top) => *top,
            None => return,
        };

        let tied = ranking.get(1).is_some_and(|second| second.1 == count);

        let verdicts = copies
            .iter()
            .map(|(handle, words)| {
                let agrees = Self::mismatch(reference, words)
                    .is_some_and(|bits| bits <= self.max_bit_mismatch);
                (*handle, agrees)
            })
            .collect::<Vec<_>>();

        let unanimous = verdicts.iter().all(|(_, agrees)| *agrees);

        // without a clear majority, only an agreement within tolerance is acceptable
        let reference_ok = count >= self.min_agreeing && (!tied || unanimous);

        if !reference_ok || !unanimous {
            warn!(
                "{}({}) - sources disagree: {} copies, reference gathered {}",
                group.sv,
                group.epoch,
                copies.len(),
                count
            );
            self.disagreements.push((group.sv, group.epoch));
        } else {
            debug!(
                "{}({}) - {} copies in agreement",
                group.sv,
                group.epoch,
                copies.len()
            );
        }

        for (handle, agrees) in verdicts {
            let verdict = if reference_ok && agrees {
                Verdict::Accepted
            } else {
                Verdict::Rejected
            };
            self.queue.decide(handle, verdict);
        }
    }

    fn decide_expired(&mut self, flush: bool) {
        let arrivals = self.arrivals;
        let expected = self.expected_sources;

        let (ready, open): (Vec<_>, Vec<_>) = self.groups.drain(..).partition(|group| {
            flush || group.members.len() >= expected || arrivals >= group.deadline
        });

        self.groups = open;

        for group in ready {
            self.decide(group);
        }
    }

    fn strict_outcome(&mut self) -> Result<(), Error> {
        let disagreements = std::mem::take(&mut self.disagreements);
        match disagreements.first() {
            Some((sv, epoch)) if self.strict => Err(Error::SourceDisagreement {
                sv: *sv,
                epoch: *epoch,
            }),
            _ => Ok(()),
        }
    }
}

impl<'a> NavFilter<'a> for CrossSourceFilter<'a> {
    fn name(&self) -> &'static str {
        "cross-source"
    }

    fn validate(
        &mut self,
        input: NavMsgList<'a>,
        output: &mut NavMsgList<'a>,
    ) -> Result<(), Error> {
        for msg in input {
            self.arrivals += 1;
            let handle = self.queue.push(msg, Verdict::Pending);

            match self
                .groups
                .iter_mut()
                .find(|group| group.sv == msg.sv && group.epoch == msg.epoch)
            {
                Some(group) => group.members.push(handle),
                None => self.groups.push(Group {
                    sv: msg.sv,
                    epoch: msg.epoch,
                    deadline: self.arrivals + self.expected_sources as u64,
                    members: vec![handle],
                }),
            }

            self.decide_expired(false);
        }

        self.queue.release(output, &mut self.rejected);
        self.strict_outcome()
    }

    fn finalize(&mut self, output: &mut NavMsgList<'a>) -> Result<(), Error> {
        self.decide_expired(true);
        self.queue.release(output, &mut self.rejected);
        self.strict_outcome()
    }

    fn wait_length(&self) -> usize {
        self.expected_sources
    }

    fn rejected(&self) -> &[NavFilterKey<'a>] {
        &self.rejected
    }

    fn clear_rejected(&mut self) {
        self.rejected.clear();
    }
}
