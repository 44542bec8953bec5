mod cnav;
mod lnav;
pub use cnav::{CnavMessage, CNAV_PRN01, CNAV_PRN05};
pub use lnav::{encode_word, gps_epoch, KeplerValues, LnavEphemeris, Subframe};

use crate::prelude::{ClockModel, Constellation, Duration, Epoch, Kepler, OrbElem, OrbitModel, SV};

pub fn g01() -> SV {
    SV::new(Constellation::GPS, 1)
}

pub fn g02() -> SV {
    SV::new(Constellation::GPS, 2)
}

pub fn r01() -> SV {
    SV::new(Constellation::Glonass, 1)
}

/// Frame start (seconds of week) of the reference message, 2h before ToE
pub const FRAME_SOW: u32 = 295_200;

/// Reference ephemeris, transmitted at `transmit`, published for `toe`
/// and valid ±2h around it.
pub fn test_orb_elem(sv: SV, transmit: Epoch, toe: Epoch) -> OrbElem {
    let values = LnavEphemeris::default().values();
    let half_fit = Duration::from_hours(2.0);

    OrbElem {
        sv,
        transmit,
        toe,
        toc: toe,
        begin_valid: toe - half_fit,
        end_valid: toe + half_fit,
        health: 0,
        iod: 42,
        ura_index: Some(0),
        accuracy_m: 2.4,
        tgd_s: None,
        clock: ClockModel {
            bias_s: values.af0,
            drift_s_s: values.af1,
            drift_rate_s_s2: values.af2,
        },
        orbit: OrbitModel::Kepler(Kepler {
            semi_major_axis_m: values.sqrt_a.powi(2),
            a_dot_m_s: 0.0,
            eccentricity: values.e,
            m0_rad: values.m0,
            dn_rad_s: values.dn,
            i0_rad: values.i0,
            idot_rad_s: values.idot,
            omega0_rad: values.omega0,
            omega_rad: values.omega,
            omega_dot_rad_s: values.omega_dot,
            cus_cuc_rad: (values.cus, values.cuc),
            cis_cic_rad: (values.cis, values.cic),
            crs_crc_m: (values.crs, values.crc),
        }),
    }
}
