//! Time indexed broadcast ephemeris storage
use std::{
    collections::BTreeMap,
    fmt::Write,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use log::{debug, warn};

use crate::prelude::{Epoch, Error, OrbElem, StoreConfig, Xvt, SV};

/// Records of one satellite, indexed by transmission time
type Timeline = BTreeMap<Epoch, OrbElem>;

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, Error> {
    lock.read().map_err(|_| Error::StorePoisoned)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, Error> {
    lock.write().map_err(|_| Error::StorePoisoned)
}

/// [OrbElemStore] holds decoded broadcast ephemerides ([OrbElem]) and
/// selects the right one to evaluate a satellite state at any instant.
///
/// Selection rule: among the records whose validity window contains the
/// requested instant, the most recently transmitted one wins.
///
/// The store may be shared between threads: insertions for one
/// satellite only lock that satellite's timeline for writing.
/// Locks are always taken satellite map first, timeline second.
#[derive(Debug, Default)]
pub struct OrbElemStore {
    cfg: StoreConfig,
    satellites: RwLock<BTreeMap<SV, Arc<RwLock<Timeline>>>>,
}

impl OrbElemStore {
    /// Builds a new empty [OrbElemStore]
    pub fn new(cfg: StoreConfig) -> Self {
        Self {
            cfg,
            satellites: Default::default(),
        }
    }

    pub fn cfg(&self) -> &StoreConfig {
        &self.cfg
    }

    fn timeline(&self, sv: SV) -> Result<Arc<RwLock<Timeline>>, Error> {
        read(&self.satellites)?
            .get(&sv)
            .cloned()
            .ok_or(Error::UnknownSatellite(sv))
    }

    /// Stores a new [OrbElem].
    /// Returns false if this exact record was already present.
    ///
    /// Errors:
    /// - [Error::UnsupportedSystem] when the store is restricted to other systems
    /// - [Error::InvalidValidity] when the validity window is empty
    /// - [Error::InconsistentEphemeris] when a different record was transmitted
    ///   by the same satellite at the same time
    pub fn add_ephemeris(&self, orb: OrbElem) -> Result<bool, Error> {
        let sv = orb.sv;

        if !self.cfg.accepts(sv.constellation) {
            return Err(Error::UnsupportedSystem(sv.constellation));
        }

        if orb.begin_valid >= orb.end_valid {
            return Err(Error::InvalidValidity(sv));
        }

        // the map stays locked until the record is in,
        // so that edit() and clear() never miss it
        {
            let satellites = read(&self.satellites)?;
            if let Some(timeline) = satellites.get(&sv) {
                let mut timeline = write(timeline)?;
                return Self::insert(&mut timeline, orb);
            }
        }

        let mut satellites = write(&self.satellites)?;
        let timeline = Arc::clone(satellites.entry(sv).or_default());
        let mut timeline = write(&timeline)?;
        Self::insert(&mut timeline, orb)
    }

    fn insert(timeline: &mut Timeline, orb: OrbElem) -> Result<bool, Error> {
        let sv = orb.sv;

        match timeline.get(&orb.transmit) {
            Some(existing) if *existing == orb => Ok(false),
            Some(_) => {
                warn!("{}({}) - inconsistent ephemeris", orb.transmit, sv);
                Err(Error::InconsistentEphemeris {
                    sv,
                    transmit: orb.transmit,
                })
            },
            None => {
                debug!(
                    "{}({}) - new ephemeris valid [{}, {})",
                    orb.transmit, sv, orb.begin_valid, orb.end_valid
                );
                timeline.insert(orb.transmit, orb);
                Ok(true)
            },
        }
    }

    /// Stores all [OrbElem]s, returns how many were new.
    pub fn load<I: IntoIterator<Item = OrbElem>>(&self, iter: I) -> Result<usize, Error> {
        let mut added = 0;
        for orb in iter {
            if self.add_ephemeris(orb)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Selects the [OrbElem] to be used for this [SV] at this [Epoch]:
    /// latest transmission among the records that are valid at `t`.
    pub fn find_ephemeris(&self, sv: SV, t: Epoch) -> Result<OrbElem, Error> {
        let timeline = self.timeline(sv)?;
        let timeline = read(&timeline)?;

        if timeline.is_empty() {
            return Err(Error::UnknownSatellite(sv));
        }

        timeline
            .values()
            .rev()
            .find(|orb| orb.is_valid(t))
            .cloned()
            .ok_or(Error::NoEphemeris(sv, t))
    }

    /// Selects a valid [OrbElem] like [Self::find_ephemeris], otherwise
    /// falls back to the record whose validity window is the closest to `t`.
    /// Useful to evaluate satellites just outside of the data coverage.
    pub fn find_near_ephemeris(&self, sv: SV, t: Epoch) -> Result<OrbElem, Error> {
        match self.find_ephemeris(sv, t) {
            Err(Error::NoEphemeris(..)) => {},
            other => return other,
        }

        let timeline = self.timeline(sv)?;
        let timeline = read(&timeline)?;

        // latest transmission wins on equal distance
        timeline
            .values()
            .rev()
            .min_by_key(|orb| {
                if t < orb.begin_valid {
                    orb.begin_valid - t
                } else {
                    t - orb.end_valid
                }
            })
            .cloned()
            .ok_or(Error::NoEphemeris(sv, t))
    }

    /// Returns the [OrbElem] published with this exact ToE
    /// (latest transmission if several were).
    pub fn find_toe(&self, sv: SV, toe: Epoch) -> Result<OrbElem, Error> {
        let timeline = self.timeline(sv)?;
        let timeline = read(&timeline)?;

        timeline
            .values()
            .rev()
            .find(|orb| orb.toe == toe)
            .cloned()
            .ok_or(Error::NoMatchingToe(sv, toe))
    }

    /// Evaluates position, velocity and clock of this [SV] at this [Epoch].
    pub fn get_xvt(&self, sv: SV, t: Epoch) -> Result<Xvt, Error> {
        let orb = self.find_ephemeris(sv, t)?;

        if self.cfg.only_healthy && !orb.is_healthy() {
            return Err(Error::UnhealthySatellite(sv, t));
        }

        orb.compute_xvt(t)
    }

    /// Health status of this [SV] at this [Epoch], as broadcast.
    pub fn is_healthy(&self, sv: SV, t: Epoch) -> Result<bool, Error> {
        Ok(self.find_ephemeris(sv, t)?.is_healthy())
    }

    fn bounds<F: Fn(&OrbElem) -> Epoch>(
        &self,
        sv: Option<SV>,
        pick: F,
        earliest: bool,
    ) -> Result<Epoch, Error> {
        let satellites = read(&self.satellites)?;

        let mut bound = Option::<Epoch>::None;

        for (key, timeline) in satellites.iter() {
            if sv.is_some_and(|sv| sv != *key) {
                continue;
            }

            for orb in read(timeline)?.values() {
                let t = pick(orb);
                bound = match bound {
                    Some(b) if earliest => Some(b.min(t)),
                    Some(b) => Some(b.max(t)),
                    None => Some(t),
                };
            }
        }

        match (bound, sv) {
            (Some(bound), _) => Ok(bound),
            (None, Some(sv)) => Err(Error::UnknownSatellite(sv)),
            (None, None) => Err(Error::EmptyStore),
        }
    }

    /// Start of the earliest validity window.
    pub fn initial_time(&self) -> Result<Epoch, Error> {
        self.bounds(None, |orb| orb.begin_valid, true)
    }

    /// End of the latest validity window.
    pub fn final_time(&self) -> Result<Epoch, Error> {
        self.bounds(None, |orb| orb.end_valid, false)
    }

    pub fn sv_initial_time(&self, sv: SV) -> Result<Epoch, Error> {
        self.bounds(Some(sv), |orb| orb.begin_valid, true)
    }

    pub fn sv_final_time(&self, sv: SV) -> Result<Epoch, Error> {
        self.bounds(Some(sv), |orb| orb.end_valid, false)
    }

    /// Discards every record that is not valid at some point in `[begin, end)`.
    pub fn edit(&self, begin: Epoch, end: Epoch) -> Result<(), Error> {
        let mut satellites = write(&self.satellites)?;

        for timeline in satellites.values() {
            write(timeline)?.retain(|_, orb| orb.end_valid > begin && orb.begin_valid < end);
        }

        let mut emptied = Vec::new();
        for (sv, timeline) in satellites.iter() {
            if read(timeline)?.is_empty() {
                emptied.push(*sv);
            }
        }

        for sv in emptied {
            debug!("{} - no ephemeris left in [{}, {})", sv, begin, end);
            satellites.remove(&sv);
        }

        Ok(())
    }

    /// Discards all records.
    pub fn clear(&self) -> Result<(), Error> {
        write(&self.satellites)?.clear();
        Ok(())
    }

    /// Total number of records
    pub fn len(&self) -> Result<usize, Error> {
        let satellites = read(&self.satellites)?;
        let mut len = 0;
        for timeline in satellites.values() {
            len += read(timeline)?.len();
        }
        Ok(len)
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }

    pub fn contains(&self, sv: SV) -> Result<bool, Error> {
        Ok(read(&self.satellites)?.contains_key(&sv))
    }

    /// Satellites known to this store, in ascending order
    pub fn satellites(&self) -> Result<Vec<SV>, Error> {
        Ok(read(&self.satellites)?.keys().copied().collect())
    }

    /// Records of this [SV], by transmission time
    pub fn ephemerides(&self, sv: SV) -> Result<Vec<OrbElem>, Error> {
        let timeline = self.timeline(sv)?;
        let records = read(&timeline)?.values().cloned().collect();
        Ok(records)
    }

    /// All records, per satellite then by transmission time
    pub fn all_ephemerides(&self) -> Result<Vec<OrbElem>, Error> {
        let satellites = read(&self.satellites)?;
        let mut records = Vec::new();
        for timeline in satellites.values() {
            records.extend(read(timeline)?.values().cloned());
        }
        Ok(records)
    }

    /// Human readable summary. `detailed` lists every record.
    pub fn dump(&self, detailed: bool) -> Result<String, Error> {
        let satellites = read(&self.satellites)?;
        let mut s = String::new();

        let _ = writeln!(s, "OrbElemStore: {} satellite(s)", satellites.len());

        for (sv, timeline) in satellites.iter() {
            let timeline = read(timeline)?;

            match (timeline.values().next(), timeline.values().next_back()) {
                (Some(first), Some(last)) => {
                    let _ = writeln!(
                        s,
                        "  {} - {} record(s) [{}, {})",
                        sv,
                        timeline.len(),
                        first.begin_valid,
                        last.end_valid
                    );
                },
                _ => {
                    let _ = writeln!(s, "  {} - no record", sv);
                },
            }

            if detailed {
                for orb in timeline.values() {
                    let _ = writeln!(
                        s,
                        "    transmit={} toe={} valid=[{}, {}) iod={} health={} accuracy={}m",
                        orb.transmit,
                        orb.toe,
                        orb.begin_valid,
                        orb.end_valid,
                        orb.iod,
                        orb.health,
                        orb.accuracy_m
                    );
                }
            }
        }

        Ok(s)
    }
}
