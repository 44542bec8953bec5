use crate::prelude::{Duration, Epoch, Error, Vector3, SV};

mod glonass;
mod kepler;
mod lnav;

pub use glonass::GlonassState;
pub use kepler::Kepler;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Satellite clock offset polynomial, referenced to ToC
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockModel {
    /// Offset (in seconds)
    pub bias_s: f64,
    /// Drift (in s.s⁻¹)
    pub drift_s_s: f64,
    /// Drift rate (in s.s⁻²)
    pub drift_rate_s_s2: f64,
}

impl ClockModel {
    /// Clock offset (in seconds), `dt` seconds after ToC
    pub fn offset_s(&self, dt: f64) -> f64 {
        self.bias_s + self.drift_s_s * dt + self.drift_rate_s_s2 * dt * dt
    }

    /// Clock drift (in s.s⁻¹), `dt` seconds after ToC
    pub fn drift_s_s(&self, dt: f64) -> f64 {
        self.drift_s_s + 2.0 * self.drift_rate_s_s2 * dt
    }
}

/// Orbital model carried by an [OrbElem]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrbitModel {
    /// Keplerian elements (GPS, QZSS, Galileo, BeiDou..)
    Kepler(Kepler),
    /// State vector to be integrated (GLONASS)
    Glonass(GlonassState),
}

/// Satellite state at a given instant
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Xvt {
    /// ECEF position (in meters)
    pub position_m: Vector3<f64>,
    /// ECEF velocity (in m.s⁻¹)
    pub velocity_m_s: Vector3<f64>,
    /// Clock offset (in seconds), relativistic correction not included
    pub clock_bias_s: f64,
    /// Clock drift (in s.s⁻¹)
    pub clock_drift_s_s: f64,
    /// Relativistic clock correction (in seconds)
    pub relativistic_s: f64,
}

impl Xvt {
    /// Clock offset (in seconds) including the relativistic correction
    pub fn corrected_clock_bias_s(&self) -> f64 {
        self.clock_bias_s + self.relativistic_s
    }
}

/// [OrbElem] is a decoded broadcast ephemeris: orbit and clock
/// of one satellite, valid over a bounded time window.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbElem {
    /// [SV]
    pub sv: SV,

    /// Earliest transmission time of this data set
    pub transmit: Epoch,

    /// Time of Ephemeris, expressed in the [SV] timescale
    pub toe: Epoch,

    /// Time of Clock, expressed in the [SV] timescale
    pub toc: Epoch,

    /// Start of validity (inclusive)
    pub begin_valid: Epoch,

    /// End of validity (exclusive)
    pub end_valid: Epoch,

    /// Health flags, 0 means healthy
    pub health: u8,

    /// Issue of data (IODC for GPS)
    pub iod: u16,

    /// User range accuracy index, when broadcast
    pub ura_index: Option<u8>,

    /// User range accuracy (in meters)
    pub accuracy_m: f64,

    /// Group delay (in seconds), when broadcast
    pub tgd_s: Option<f64>,

    pub clock: ClockModel,

    pub orbit: OrbitModel,
}

impl OrbElem {
    /// True if [OrbElem] may be evaluated at this [Epoch]
    pub fn is_valid(&self, t: Epoch) -> bool {
        let t = t.to_time_scale(self.begin_valid.time_scale);
        self.begin_valid <= t && t < self.end_valid
    }

    pub fn is_healthy(&self) -> bool {
        self.health == 0
    }

    /// Duration of the validity window
    pub fn fit_interval(&self) -> Duration {
        self.end_valid - self.begin_valid
    }

    /// Clock offset (in seconds) at this [Epoch], no relativistic correction
    pub fn clock_bias(&self, t: Epoch) -> f64 {
        self.clock.offset_s(self.seconds_since_toc(t))
    }

    /// Clock drift (in s.s⁻¹) at this [Epoch]
    pub fn clock_drift(&self, t: Epoch) -> f64 {
        self.clock.drift_s_s(self.seconds_since_toc(t))
    }

    fn seconds_since_toc(&self, t: Epoch) -> f64 {
        (t.to_time_scale(self.toc.time_scale) - self.toc).to_seconds()
    }

    /// Evaluates satellite position, velocity and clock at this [Epoch].
    /// [Error::OutsideValidity] if [Epoch] is not within the validity window.
    pub fn compute_xvt(&self, t: Epoch) -> Result<Xvt, Error> {
        if !self.is_valid(t) {
            return Err(Error::OutsideValidity {
                sv: self.sv,
                epoch: t,
                begin: self.begin_valid,
                end: self.end_valid,
            });
        }

        let (position_m, velocity_m_s, relativistic_s, relativistic_drift) = match &self.orbit {
            OrbitModel::Kepler(kepler) => {
                let state = kepler.propagate(self.sv, self.toe, t)?;
                (
                    state.position_m,
                    state.velocity_m_s,
                    state.relativistic_s,
                    state.relativistic_drift_s_s,
                )
            },
            OrbitModel::Glonass(glonass) => {
                let (position_m, velocity_m_s) = glonass.propagate(self.toe, t);
                (position_m, velocity_m_s, 0.0, 0.0)
            },
        };

        Ok(Xvt {
            position_m,
            velocity_m_s,
            clock_bias_s: self.clock_bias(t),
            clock_drift_s_s: self.clock_drift(t) + relativistic_drift,
            relativistic_s,
        })
    }
}

#[cfg(test)]
mod test {
    use super::ClockModel;

    #[test]
    fn clock_polynomial() {
        let clock = ClockModel {
            bias_s: 1.0E-4,
            drift_s_s: 1.0E-11,
            drift_rate_s_s2: 1.0E-18,
        };

        assert_eq!(clock.offset_s(0.0), 1.0E-4);
        assert!((clock.offset_s(100.0) - (1.0E-4 + 1.0E-9 + 1.0E-14)).abs() < 1E-20);
        assert!((clock.drift_s_s(100.0) - (1.0E-11 + 2.0E-16)).abs() < 1E-24);
    }
}
