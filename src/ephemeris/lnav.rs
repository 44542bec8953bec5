use log::debug;

use super::{ClockModel, Kepler, OrbElem, OrbitModel};

use crate::{
    constants::SEMI_CIRCLE_RAD,
    navfilter::lnav::{self, field, field2, signed_field, signed_field2, WORDS},
    prelude::{Duration, Epoch, Error, TimeScale, SV},
};

/// Seconds in a week
const WEEK_S: i64 = 604_800;

/// User range accuracy (in meters), indexed by URA index.
/// Index 15 means no accuracy prediction is available.
const URA_M: [f64; 16] = [
    2.4,
    3.4,
    4.85,
    6.85,
    9.65,
    13.65,
    24.0,
    48.0,
    96.0,
    192.0,
    384.0,
    768.0,
    1536.0,
    3072.0,
    6144.0,
    f64::INFINITY,
];

fn pow2(exp: i32) -> f64 {
    2.0_f64.powi(exp)
}

/// Aligns a 10 bit week counter to the full week nearest to `approx_week`.
pub(crate) fn resolve_week(week10: u32, approx_week: u32) -> Result<u32, Error> {
    let base = (approx_week & !0x3FF) as i64;
    let candidates = [base - 1024, base, base + 1024];

    candidates
        .iter()
        .map(|base| base + week10 as i64)
        .filter(|week| *week >= 0)
        .min_by_key(|week| (week - approx_week as i64).abs())
        .filter(|week| (week - approx_week as i64).abs() <= 512)
        .map(|week| week as u32)
        .ok_or(Error::WeekRollover)
}

/// Curve fit interval, from the fit interval flag and IODC.
pub(crate) fn fit_interval_hours(fit_flag: u32, iodc: u16) -> i64 {
    if fit_flag == 0 {
        return 4;
    }
    match iodc {
        240..=247 => 8,
        248..=255 | 496 => 14,
        497..=503 | 1021..=1023 => 26,
        504..=510 => 50,
        511 | 752..=756 => 74,
        757..=763 => 98,
        764..=767 | 1008..=1020 => 122,
        _ => 6,
    }
}

/// Builds an [Epoch] from a week number and seconds of week that may
/// slightly overflow (or underflow) the week.
fn week_epoch(week: u32, sow: i64, timescale: TimeScale) -> Epoch {
    Epoch::from_time_of_week(week, 0, timescale) + Duration::from_seconds(sow as f64)
}

/// Places a reference time of week close to the transmission time,
/// which may sit in the previous or following week.
fn nearest_sow(sow: i64, transmit_sow: i64) -> i64 {
    if sow - transmit_sow < -WEEK_S / 2 {
        sow + WEEK_S
    } else if sow - transmit_sow > WEEK_S / 2 {
        sow - WEEK_S
    } else {
        sow
    }
}

impl OrbElem {
    /// Decodes subframes 1, 2 and 3 of a legacy (LNAV) navigation message.
    /// The subframes are given as received (data bits may be inverted).
    /// `approx` is the reception time, used to resolve the week number.
    pub fn from_lnav(sv: SV, subframes: [&[u32; WORDS]; 3], approx: Epoch) -> Result<Self, Error> {
        let [sf1, sf2, sf3] = subframes.map(lnav::cook);

        for (expected, cooked) in [(1, &sf1), (2, &sf2), (3, &sf3)] {
            let found = lnav::subframe_id(cooked);
            if found != expected {
                return Err(Error::InvalidSubframe { expected, found });
            }
        }

        let timescale = sv.constellation.timescale().ok_or(Error::UnknownTimescale)?;

        let (approx_week, _) = approx.to_time_scale(timescale).to_time_of_week();
        let week = resolve_week(field(&sf1, 61, 10), approx_week)?;

        // HOW TOW count is the start of the next subframe
        let transmit_sow = [&sf1, &sf2, &sf3]
            .iter()
            .map(|cooked| lnav::tow_count(cooked) as i64 * 6 - 6)
            .min()
            .unwrap_or_default();

        let transmit = week_epoch(week, transmit_sow, timescale);

        // subframe 1: clock
        let ura_index = field(&sf1, 73, 4) as u8;
        let health = field(&sf1, 77, 6) as u8;
        let iodc = field2(&sf1, (83, 2), (211, 8)) as u16;
        let tgd_s = signed_field(&sf1, 197, 8) as f64 * pow2(-31);
        let toc_sow = field(&sf1, 219, 16) as i64 * 16;
        let af2 = signed_field(&sf1, 241, 8) as f64 * pow2(-55);
        let af1 = signed_field(&sf1, 249, 16) as f64 * pow2(-43);
        let af0 = signed_field(&sf1, 271, 22) as f64 * pow2(-31);

        // subframe 2
        let crs = signed_field(&sf2, 69, 16) as f64 * pow2(-5);
        let dn = signed_field(&sf2, 91, 16) as f64 * pow2(-43) * SEMI_CIRCLE_RAD;
        let m0 = signed_field2(&sf2, (107, 8), (121, 24)) as f64 * pow2(-31) * SEMI_CIRCLE_RAD;
        let cuc = signed_field(&sf2, 151, 16) as f64 * pow2(-29);
        let e = field2(&sf2, (167, 8), (181, 24)) as f64 * pow2(-33);
        let cus = signed_field(&sf2, 211, 16) as f64 * pow2(-29);
        let sqrt_a = field2(&sf2, (227, 8), (241, 24)) as f64 * pow2(-19);
        let toe_sow = field(&sf2, 271, 16) as i64 * 16;
        let fit_flag = field(&sf2, 287, 1);

        // subframe 3
        let cic = signed_field(&sf3, 61, 16) as f64 * pow2(-29);
        let omega0 = signed_field2(&sf3, (77, 8), (91, 24)) as f64 * pow2(-31) * SEMI_CIRCLE_RAD;
        let cis = signed_field(&sf3, 121, 16) as f64 * pow2(-29);
        let i0 = signed_field2(&sf3, (137, 8), (151, 24)) as f64 * pow2(-31) * SEMI_CIRCLE_RAD;
        let crc = signed_field(&sf3, 181, 16) as f64 * pow2(-5);
        let omega = signed_field2(&sf3, (197, 8), (211, 24)) as f64 * pow2(-31) * SEMI_CIRCLE_RAD;
        let omega_dot = signed_field(&sf3, 241, 24) as f64 * pow2(-43) * SEMI_CIRCLE_RAD;
        let idot = signed_field(&sf3, 279, 14) as f64 * pow2(-43) * SEMI_CIRCLE_RAD;

        let toe = week_epoch(week, nearest_sow(toe_sow, transmit_sow), timescale);
        let toc = week_epoch(week, nearest_sow(toc_sow, transmit_sow), timescale);

        let half_fit = Duration::from_seconds((fit_interval_hours(fit_flag, iodc) * 1800) as f64);

        debug!(
            "{}({}) - lnav decoding: iodc={} toe={} health={}",
            transmit, sv, iodc, toe, health
        );

        Ok(Self {
            sv,
            transmit,
            toe,
            toc,
            begin_valid: toe - half_fit,
            end_valid: toe + half_fit,
            health,
            iod: iodc,
            ura_index: Some(ura_index),
            accuracy_m: URA_M[(ura_index & 0xF) as usize],
            tgd_s: Some(tgd_s),
            clock: ClockModel {
                bias_s: af0,
                drift_s_s: af1,
                drift_rate_s_s2: af2,
            },
            orbit: OrbitModel::Kepler(Kepler {
                semi_major_axis_m: sqrt_a.powi(2),
                a_dot_m_s: 0.0,
                eccentricity: e,
                m0_rad: m0,
                dn_rad_s: dn,
                i0_rad: i0,
                idot_rad_s: idot,
                omega0_rad: omega0,
                omega_rad: omega,
                omega_dot_rad_s: omega_dot,
                cus_cuc_rad: (cus, cuc),
                cis_cic_rad: (cis, cic),
                crs_crc_m: (crs, crc),
            }),
        })
    }
}
