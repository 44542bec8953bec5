use std::collections::HashMap;

use log::{debug, error, warn};

use super::{lnav, NavFilter, NavFilterKey, NavMsgList, PendingQueue, Verdict};
use crate::prelude::{Duration, Epoch, Error, OrbElem, SV};

/// Whatever the subframe it starts with, a set is complete within 24 s.
/// A set still partial one frame after its first subframe is dropped.
const SET_TIMEOUT_S: f64 = 30.0;

/// Subframes 1, 2 and 3 collected for one satellite (and one source)
#[derive(Debug, Default)]
struct PartialSet<'a> {
    slots: [Option<(u64, NavFilterKey<'a>)>; 3],
}

impl<'a> PartialSet<'a> {
    fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    fn handles(&self) -> Vec<u64> {
        self.slots
            .iter()
            .flatten()
            .map(|(handle, _)| *handle)
            .collect()
    }

    /// Time tag of the earliest subframe
    fn first_epoch(&self) -> Option<Epoch> {
        self.slots.iter().flatten().map(|(_, msg)| msg.epoch).min()
    }

    fn complete(&self) -> Option<[(u64, NavFilterKey<'a>); 3]> {
        match self.slots {
            [Some(sf1), Some(sf2), Some(sf3)] => Some([sf1, sf2, sf3]),
            _ => None,
        }
    }
}

/// Issue of data carried by each subframe:
/// IODC (8 LSB) in subframe 1, IODE in subframes 2 and 3.
fn issue_of_data(subframe: u8, cooked: &[u32; lnav::WORDS]) -> u32 {
    match subframe {
        1 => lnav::field(cooked, 211, 8),
        2 => lnav::field(cooked, 61, 8),
        _ => lnav::field(cooked, 271, 8),
    }
}

/// [EphMaker] assembles subframes 1, 2 and 3 into [OrbElem]s.
///
/// Subframes are grouped per satellite and per source. Ephemeris subframes
/// are held back until their set is complete and consistent (same issue
/// of data in all three), then released together.
/// Subframes that do not contribute to the ephemeris go through.
/// A partial set is dropped as soon as it is superseded by a newer subframe
/// of the same kind, or by a newer issue of data, or when any message
/// (whatever the satellite) is tagged one frame past its first subframe.
/// Stalled satellites therefore never hold back the others for long.
#[derive(Debug, Default)]
pub struct EphMaker<'a> {
    queue: PendingQueue<'a>,
    partials: HashMap<(SV, u16), PartialSet<'a>>,
    assembled: Vec<OrbElem>,
    incomplete: usize,
    rejected: NavMsgList<'a>,
}

impl<'a> EphMaker<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    fn drop_partial(&mut self, key: (SV, u16)) {
        if let Some(partial) = self.partials.remove(&key) {
            let handles = partial.handles();
            debug!(
                "{}(src#{}) - dropping {} unmatched subframe(s)",
                key.0,
                key.1,
                handles.len()
            );
            self.incomplete += handles.len();
            for handle in handles {
                self.queue.decide(handle, Verdict::Rejected);
            }
        }
    }

    /// Drops every partial set that can no longer complete by `now`.
    fn expire(&mut self, now: Epoch) {
        let timeout = Duration::from_seconds(SET_TIMEOUT_S);

        let expired = self
            .partials
            .iter()
            .filter(|(_, partial)| {
                partial
                    .first_epoch()
                    .is_some_and(|first| first + timeout < now)
            })
            .map(|(key, _)| *key)
            .collect::<Vec<_>>();

        for key in expired {
            debug!("{}(src#{}) - partial set timed out", key.0, key.1);
            self.drop_partial(key);
        }
    }

    fn assemble(&mut self, key: (SV, u16)) {
        let set = match self.partials.get(&key).and_then(|partial| partial.complete()) {
            Some(set) => set,
            None => return,
        };

        let [(h1, sf1), (h2, sf2), (h3, sf3)] = set;

        let (w1, w2, w3) = match (sf1.lnav_words(), sf2.lnav_words(), sf3.lnav_words()) {
            (Ok(w1), Ok(w2), Ok(w3)) => (w1, w2, w3),
            _ => {
                // word count was verified on arrival
                self.drop_partial(key);
                return;
            },
        };

        let (c1, c2, c3) = (lnav::cook(w1), lnav::cook(w2), lnav::cook(w3));
        let iods = [
            issue_of_data(1, &c1),
            issue_of_data(2, &c2),
            issue_of_data(3, &c3),
        ];

        if iods[0] != iods[1] || iods[1] != iods[2] {
            // keep the most recent subframe, it may start a new set
            let newest = [(h1, sf1, 0), (h2, sf2, 1), (h3, sf3, 2)]
                .into_iter()
                .max_by_key(|(handle, _, _)| *handle);

            warn!(
                "{}(src#{}) - issue of data mismatch {:?}",
                key.0, key.1, iods
            );

            self.drop_partial(key);

            if let Some((handle, msg, slot)) = newest {
                self.incomplete -= 1;
                self.queue.decide(handle, Verdict::Pending);
                let partial = self.partials.entry(key).or_default();
                partial.slots[slot] = Some((handle, msg));
            }
            return;
        }

        self.partials.remove(&key);

        let decision = match OrbElem::from_lnav(sf1.sv, [w1, w2, w3], sf1.epoch) {
            Ok(orb) => {
                debug!("{}(src#{}) - new ephemeris toe={}", key.0, key.1, orb.toe);
                self.assembled.push(orb);
                Verdict::Accepted
            },
            Err(e) => {
                error!("{}(src#{}) - ephemeris decoding: {}", key.0, key.1, e);
                self.incomplete += 3;
                Verdict::Rejected
            },
        };

        for handle in [h1, h2, h3] {
            self.queue.decide(handle, decision);
        }
    }
}

impl<'a> NavFilter<'a> for EphMaker<'a> {
    fn name(&self) -> &'static str {
        "eph-maker"
    }

    fn validate(
        &mut self,
        input: NavMsgList<'a>,
        output: &mut NavMsgList<'a>,
    ) -> Result<(), Error> {
        for msg in input {
            let cooked = lnav::cook(msg.lnav_words()?);
            let subframe = lnav::subframe_id(&cooked);

            self.expire(msg.epoch);

            if !(1..=3).contains(&subframe) {
                self.queue.push(msg, Verdict::Accepted);
                continue;
            }

            let key = (msg.sv, msg.source);
            let slot = (subframe - 1) as usize;

            if self
                .partials
                .get(&key)
                .is_some_and(|partial| partial.slots[slot].is_some())
            {
                self.drop_partial(key);
            }

            let handle = self.queue.push(msg, Verdict::Pending);
            let partial = self.partials.entry(key).or_default();
            partial.slots[slot] = Some((handle, msg));

            if partial.len() == 3 {
                self.assemble(key);
            }
        }

        self.queue.release(output, &mut self.rejected);
        Ok(())
    }

    fn finalize(&mut self, output: &mut NavMsgList<'a>) -> Result<(), Error> {
        let keys = self.partials.keys().copied().collect::<Vec<_>>();
        for key in keys {
            self.drop_partial(key);
        }
        self.queue.release(output, &mut self.rejected);
        Ok(())
    }

    fn wait_length(&self) -> usize {
        2
    }

    fn rejected(&self) -> &[NavFilterKey<'a>] {
        &self.rejected
    }

    fn clear_rejected(&mut self) {
        self.rejected.clear();
    }

    fn incomplete(&self) -> usize {
        self.incomplete
    }

    fn take_assembled(&mut self) -> Vec<OrbElem> {
        std::mem::take(&mut self.assembled)
    }
}
