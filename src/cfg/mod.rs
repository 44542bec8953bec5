#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::prelude::Constellation;

fn default_expected_sources() -> usize {
    1
}

fn default_max_bit_mismatch() -> u32 {
    0
}

fn default_min_agreeing() -> usize {
    1
}

fn default_strict_cross_source() -> bool {
    false
}

fn default_only_healthy() -> bool {
    false
}

/// Navigation message filtering options
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct FilterConfig {
    /// Number of sources (receivers, antennas, tracking channels) expected
    /// to deliver a copy of each message. The cross source comparison waits
    /// for that many copies (or that many subsequent messages) before deciding.
    #[cfg_attr(feature = "serde", serde(default = "default_expected_sources"))]
    pub expected_sources: usize,

    /// Maximal number of differing bits tolerated between a copy and the
    /// reference (most common) pattern. 0 means bit exact.
    #[cfg_attr(feature = "serde", serde(default = "default_max_bit_mismatch"))]
    pub max_bit_mismatch: u32,

    /// Minimal number of copies the reference pattern must gather.
    #[cfg_attr(feature = "serde", serde(default = "default_min_agreeing"))]
    pub min_agreeing: usize,

    /// Surface cross source disagreement as [Error::SourceDisagreement](crate::prelude::Error)
    /// on top of recording the rejection.
    #[cfg_attr(feature = "serde", serde(default = "default_strict_cross_source"))]
    pub strict_cross_source: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expected_sources: default_expected_sources(),
            max_bit_mismatch: default_max_bit_mismatch(),
            min_agreeing: default_min_agreeing(),
            strict_cross_source: default_strict_cross_source(),
        }
    }
}

/// [OrbElemStore](crate::prelude::OrbElemStore) options
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct StoreConfig {
    /// Refuse to evaluate records that flag the satellite as unhealthy.
    #[cfg_attr(feature = "serde", serde(default = "default_only_healthy"))]
    pub only_healthy: bool,

    /// Restrict the store to these systems. Empty: any system is accepted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub systems: Vec<Constellation>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            only_healthy: default_only_healthy(),
            systems: Vec::new(),
        }
    }
}

impl StoreConfig {
    /// Returns true if this [Constellation] may be stored.
    pub fn accepts(&self, constellation: Constellation) -> bool {
        self.systems.is_empty() || self.systems.contains(&constellation)
    }

    /// Copies and returns [StoreConfig] restricted to this [Constellation] (cumulative).
    pub fn with_system(&self, constellation: Constellation) -> Self {
        let mut s = self.clone();
        if !s.systems.contains(&constellation) {
            s.systems.push(constellation);
        }
        s
    }

    /// Copies and returns [StoreConfig] that only serves healthy data.
    pub fn with_only_healthy(&self, only_healthy: bool) -> Self {
        let mut s = self.clone();
        s.only_healthy = only_healthy;
        s
    }
}

/// Complete configuration
#[derive(Default, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct Config {
    #[cfg_attr(feature = "serde", serde(default))]
    pub filter: FilterConfig,
    #[cfg_attr(feature = "serde", serde(default))]
    pub store: StoreConfig,
}
