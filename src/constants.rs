use crate::prelude::{Constellation, SV};

/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// GPS semi-circles to radians
pub const SEMI_CIRCLE_RAD: f64 = std::f64::consts::PI;

/// Maximal number of Newton iterations when solving Kepler's equation
pub const MAX_KEPLER_ITER: usize = 30;

/// Eccentric anomaly convergence criterion (radians)
pub const KEPLER_TOLERANCE_RAD: f64 = 1.0E-12;

/// Earth gravitational constant (m^3 s-2), per ICD
pub(crate) struct GM;

impl GM {
    pub const GPS: f64 = 3.986005E14;
    pub const BDS: f64 = 3.986004418E14;
    pub const GLO: f64 = 3.9860044E14;
    pub const GAL: f64 = 3.986004418E14;
}

/// Earth angular velocity (rad/s), per ICD
pub(crate) struct Omega;

impl Omega {
    pub const GPS: f64 = 7.2921151467E-5;
    pub const BDS: f64 = 7.292115E-5;
    pub const GLO: f64 = 7.292115E-5;
    pub const GAL: f64 = 7.2921151467E-5;
}

/// Relativistic clock correction constant: -2 * sqrt(gm) / c / c
pub(crate) struct DtrF;

impl DtrF {
    pub const GPS: f64 = -4.442807633E-10;
    pub const BDS: f64 = -4.44280730904E-10;
    pub const GAL: f64 = -4.442807309E-10;
}

/// PZ-90 Earth model used by GLONASS
pub(crate) struct Pz90;

impl Pz90 {
    /// Equatorial radius (m)
    pub const AE_M: f64 = 6_378_136.0;
    /// Second zonal harmonic
    pub const J2: f64 = 1.0826257E-3;
}

pub(crate) struct Constants;

impl Constants {
    pub const fn gm(sv: SV) -> f64 {
        match sv.constellation {
            Constellation::BeiDou => GM::BDS,
            Constellation::Galileo => GM::GAL,
            Constellation::Glonass => GM::GLO,
            _ => GM::GPS,
        }
    }

    /// Earth rotation rate
    pub const fn omega(sv: SV) -> f64 {
        match sv.constellation {
            Constellation::BeiDou => Omega::BDS,
            Constellation::Galileo => Omega::GAL,
            Constellation::Glonass => Omega::GLO,
            _ => Omega::GPS,
        }
    }

    pub const fn dtr_f(sv: SV) -> f64 {
        match sv.constellation {
            Constellation::BeiDou => DtrF::BDS,
            Constellation::Galileo => DtrF::GAL,
            _ => DtrF::GPS,
        }
    }
}
