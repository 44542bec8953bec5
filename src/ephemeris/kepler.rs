use log::{debug, error};
use nalgebra::{Matrix3, Rotation3};

use crate::{
    constants::{Constants, KEPLER_TOLERANCE_RAD, MAX_KEPLER_ITER},
    prelude::{Epoch, Error, Vector3, SV},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// BeiDou GEO orbital plane is referenced to an inclined frame
const BDS_GEO_INCLINATION_RAD: f64 = 5.0 * std::f64::consts::PI / 180.0;

/// Keplerian orbital elements, referenced to the ToE of the [OrbElem](crate::prelude::OrbElem)
/// that carries them.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Kepler {
    /// Semi-major axis (in meters)
    pub semi_major_axis_m: f64,

    /// Semi-major axis rate (in m.s⁻¹), 0 for legacy messages
    pub a_dot_m_s: f64,

    /// Eccentricity
    pub eccentricity: f64,

    /// Mean anomaly at reference time (in radians)
    pub m0_rad: f64,

    /// Mean motion difference (in radians/s)
    pub dn_rad_s: f64,

    /// Inclination at reference time (in radians)
    pub i0_rad: f64,

    /// (in radians/s)
    pub idot_rad_s: f64,

    /// Longitude of ascending node at weekly epoch (in radians)
    pub omega0_rad: f64,

    /// Argument of perigee (in radians)
    pub omega_rad: f64,

    /// Rate of right ascension (in radians/s)
    pub omega_dot_rad_s: f64,

    /// Sine / Cosine (in radians)
    pub cus_cuc_rad: (f64, f64),

    /// Sine / Cosine (in radians)
    pub cis_cic_rad: (f64, f64),

    /// Sine / Cosine (in meters)
    pub crs_crc_m: (f64, f64),
}

/// Propagated Keplerian state
#[derive(Debug, Copy, Clone)]
pub(crate) struct KeplerState {
    pub position_m: Vector3<f64>,
    pub velocity_m_s: Vector3<f64>,
    pub relativistic_s: f64,
    pub relativistic_drift_s_s: f64,
}

/// True for BeiDou satellites on geostationary orbits
pub(crate) fn is_beidou_geo(sv: SV) -> bool {
    sv.constellation == crate::prelude::Constellation::BeiDou
        && (sv.prn <= 5 || (59..=63).contains(&sv.prn))
}

impl Kepler {
    /// Solves Kepler's equation `E - e sin(E) = M` with Newton iterations.
    pub(crate) fn eccentric_anomaly(&self, sv: SV, m_k: f64) -> Result<f64, Error> {
        let e = self.eccentricity;
        let mut e_k = m_k;

        for _ in 0..MAX_KEPLER_ITER {
            let delta = (e_k - e * e_k.sin() - m_k) / (1.0 - e * e_k.cos());
            e_k -= delta;
            if delta.abs() < KEPLER_TOLERANCE_RAD {
                return Ok(e_k);
            }
        }

        error!("{} - kepler solver in failure (e={}, M={})", sv, e, m_k);
        Err(Error::KeplerDivergence(sv))
    }

    /// Resolves position and velocity at `epoch`, from these elements
    /// referenced to `toe`.
    pub(crate) fn propagate(&self, sv: SV, toe: Epoch, epoch: Epoch) -> Result<KeplerState, Error> {
        let gm = Constants::gm(sv);
        let omega_earth = Constants::omega(sv);

        let e = self.eccentricity;
        let e_2 = e.powi(2);

        let (cus, cuc) = self.cus_cuc_rad;
        let (cis, cic) = self.cis_cic_rad;
        let (crs, crc) = self.crs_crc_m;
        let (i0, idot) = (self.i0_rad, self.idot_rad_s);
        let (omega0, omega, omega_dot) = (self.omega0_rad, self.omega_rad, self.omega_dot_rad_s);

        let epoch = epoch.to_time_scale(toe.time_scale);
        let t_k = (epoch - toe).to_seconds();
        let toe_sow = (toe.to_time_of_week().1 as f64) / 1.0E9;

        let a0 = self.semi_major_axis_m;
        let a = a0 + self.a_dot_m_s * t_k;

        let n0 = (gm / a0.powi(3)).sqrt();
        let n = n0 + self.dn_rad_s;
        let m_k = self.m0_rad + n * t_k;

        let e_k = self.eccentric_anomaly(sv, m_k)?;
        let (sin_e_k, cos_e_k) = e_k.sin_cos();
        let one_minus_ecos = 1.0 - e * cos_e_k;

        let v_k = ((1.0 - e_2).sqrt() * sin_e_k).atan2(cos_e_k - e);

        let phi = v_k + omega;
        let (sin_2phi, cos_2phi) = (2.0 * phi).sin_cos();

        let u_k = phi + cuc * cos_2phi + cus * sin_2phi;
        let r_k = a * one_minus_ecos + crc * cos_2phi + crs * sin_2phi;
        let i_k = i0 + idot * t_k + cic * cos_2phi + cis * sin_2phi;

        // time derivatives
        let e_k_dot = n / one_minus_ecos;
        let phi_dot = (1.0 - e_2).sqrt() * e_k_dot / one_minus_ecos;
        let u_k_dot = phi_dot * (1.0 + 2.0 * (cus * cos_2phi - cuc * sin_2phi));
        let r_k_dot = a * e * sin_e_k * e_k_dot
            + self.a_dot_m_s * one_minus_ecos
            + 2.0 * (crs * cos_2phi - crc * sin_2phi) * phi_dot;
        let i_k_dot = idot + 2.0 * (cis * cos_2phi - cic * sin_2phi) * phi_dot;

        let (sin_u_k, cos_u_k) = u_k.sin_cos();
        let (x, y) = (r_k * cos_u_k, r_k * sin_u_k);
        let (x_dot, y_dot) = (
            r_k_dot * cos_u_k - r_k * u_k_dot * sin_u_k,
            r_k_dot * sin_u_k + r_k * u_k_dot * cos_u_k,
        );

        let beidou_geo = is_beidou_geo(sv);

        let (omega_k, omega_k_dot) = if beidou_geo {
            (
                omega0 + omega_dot * t_k - omega_earth * toe_sow,
                omega_dot,
            )
        } else {
            (
                omega0 + (omega_dot - omega_earth) * t_k - omega_earth * toe_sow,
                omega_dot - omega_earth,
            )
        };

        let (position, velocity) =
            orbital_plane_to_ecef((x, y), (x_dot, y_dot), (i_k, i_k_dot), (omega_k, omega_k_dot));

        let (position_m, velocity_m_s) = if beidou_geo {
            let rot_x = Rotation3::from_axis_angle(&Vector3::x_axis(), BDS_GEO_INCLINATION_RAD);
            let rot_z = Rotation3::from_axis_angle(&Vector3::z_axis(), -omega_earth * t_k);

            let (sin_z, cos_z) = (omega_earth * t_k).sin_cos();
            let rot_z_dot = Matrix3::new(
                -sin_z, cos_z, 0.0,
                -cos_z, -sin_z, 0.0,
                0.0, 0.0, 0.0,
            ) * omega_earth;

            let rot3 = rot_z * rot_x;
            (
                rot3 * position,
                rot_z_dot * (rot_x * position) + rot3 * velocity,
            )
        } else {
            (position, velocity)
        };

        let dtr_f = Constants::dtr_f(sv);
        let sqrt_a = a0.sqrt();
        let relativistic_s = dtr_f * e * sqrt_a * sin_e_k;
        let relativistic_drift_s_s = dtr_f * e * sqrt_a * cos_e_k * e_k_dot;

        debug!(
            "{}({}) - kepler solving x={:.3}m y={:.3}m z={:.3}m t_k={}",
            epoch, sv, position_m[0], position_m[1], position_m[2], t_k
        );

        Ok(KeplerState {
            position_m,
            velocity_m_s,
            relativistic_s,
            relativistic_drift_s_s,
        })
    }
}

/// Projects orbital plane coordinates to the ECEF frame.
fn orbital_plane_to_ecef(
    (x, y): (f64, f64),
    (x_dot, y_dot): (f64, f64),
    (i_k, i_k_dot): (f64, f64),
    (omega_k, omega_k_dot): (f64, f64),
) -> (Vector3<f64>, Vector3<f64>) {
    let rot_x3 = Rotation3::from_axis_angle(&Vector3::x_axis(), i_k);
    let rot_z3 = Rotation3::from_axis_angle(&Vector3::z_axis(), omega_k);
    let rot3 = rot_z3 * rot_x3;

    let position = rot3 * Vector3::new(x, y, 0.0);

    let (sin_i, cos_i) = i_k.sin_cos();
    let (sin_o, cos_o) = omega_k.sin_cos();

    let velocity = Vector3::new(
        x_dot * cos_o - y_dot * cos_i * sin_o + y * sin_i * sin_o * i_k_dot
            - position[1] * omega_k_dot,
        x_dot * sin_o + y_dot * cos_i * cos_o - y * sin_i * cos_o * i_k_dot
            + position[0] * omega_k_dot,
        y_dot * sin_i + y * cos_i * i_k_dot,
    );

    (position, velocity)
}
