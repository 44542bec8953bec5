use thiserror::Error;

use crate::prelude::{Constellation, Epoch, SV};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Raw navigation message does not have the word count its format requires.
    /// Precondition error: the message never reaches a filter predicate.
    #[error("invalid message: expecting {expected} words, got {found}")]
    WordCount { expected: usize, found: usize },

    /// Time tags of a single source stream must never go backwards.
    #[error("{sv} (source #{source_id}): non monotonic time {epoch} (previous {previous})")]
    NonMonotonicTime {
        sv: SV,
        source_id: u16,
        epoch: Epoch,
        previous: Epoch,
    },

    /// Validity window is empty or reversed.
    #[error("{0}: invalid validity window (begin must precede end)")]
    InvalidValidity(SV),

    /// Subframe fed to a decoder does not carry the expected subframe ID.
    #[error("invalid subframe: expecting #{expected}, got #{found}")]
    InvalidSubframe { expected: u8, found: u8 },

    /// 10 bit week counter could not be aligned to the approximate time of the message.
    #[error("failed to resolve week number rollover")]
    WeekRollover,

    /// Same [SV] and transmission time, different content:
    /// broadcast corruption or mis-assembly.
    #[error("{sv}: inconsistent ephemeris transmitted at {transmit}")]
    InconsistentEphemeris { sv: SV, transmit: Epoch },

    /// Cross source comparison could not find an agreeing reference.
    #[error("{sv}: sources disagree at {epoch}")]
    SourceDisagreement { sv: SV, epoch: Epoch },

    /// Store is restricted to a set of systems that does not include this one.
    #[error("{0} is not supported by this store")]
    UnsupportedSystem(Constellation),

    /// No data at all for this [SV].
    #[error("{0}: unknown satellite")]
    UnknownSatellite(SV),

    /// Records exist for this [SV], but none of them is valid at this [Epoch].
    #[error("{0}: no valid ephemeris at {1}")]
    NoEphemeris(SV, Epoch),

    /// Evaluation requested outside of the record validity window.
    #[error("{sv}: {epoch} is outside of validity window [{begin}, {end})")]
    OutsideValidity {
        sv: SV,
        epoch: Epoch,
        begin: Epoch,
        end: Epoch,
    },

    /// Selected record flags the satellite as unhealthy and the store
    /// is configured to only serve healthy data.
    #[error("{0}: unhealthy at {1}")]
    UnhealthySatellite(SV, Epoch),

    /// No record published with this exact ToE.
    #[error("{0}: no ephemeris with toe={1}")]
    NoMatchingToe(SV, Epoch),

    #[error("empty store")]
    EmptyStore,

    /// Eccentric anomaly iteration did not converge.
    #[error("{0}: kepler solver is diverging")]
    KeplerDivergence(SV),

    #[error("unknown SV timescale: cannot proceed")]
    UnknownTimescale,

    /// A writer panicked while holding one of the store locks.
    #[error("internal error: store lock poisoned")]
    StorePoisoned,
}
