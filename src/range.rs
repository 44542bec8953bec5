use log::debug;
use nalgebra::Matrix3;

use crate::{
    constants::{Constants, SPEED_OF_LIGHT_M_S},
    prelude::{Duration, Epoch, Error, OrbElemStore, Vector3, Xvt, SV},
};

/// Maximal number of light time iterations
const MAX_ITER: usize = 10;

/// Light time convergence criterion (in seconds)
const TOLERANCE_S: f64 = 1.0E-12;

/// Initial signal propagation guess (in seconds)
const INITIAL_TOF_S: f64 = 0.075;

/// [EphemerisRange] is the expected range between a receiver and a satellite
/// evaluated from broadcast ephemerides.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EphemerisRange {
    /// [SV]
    pub sv: SV,
    /// Reception time
    pub t_rx: Epoch,
    /// Transmission time
    pub t_tx: Epoch,
    /// Satellite state at transmission time, position expressed
    /// in the ECEF frame at reception time.
    pub xvt: Xvt,
    /// Geometric range (in meters)
    pub geometric_range_m: f64,
    /// Geometric range minus satellite clock offset (in meters):
    /// what a pseudo range should read, receiver errors aside.
    pub corrected_range_m: f64,
    /// Unit vector from receiver to satellite
    pub line_of_sight: Vector3<f64>,
}

/// Rotates a position by the Earth rotation during signal propagation.
fn earth_rotation(sv: SV, position_m: Vector3<f64>, tof_s: f64) -> Vector3<f64> {
    let we = Constants::omega(sv) * tof_s;
    let (we_sin, we_cos) = we.sin_cos();
    let rot = Matrix3::<f64>::new(we_cos, we_sin, 0.0, -we_sin, we_cos, 0.0, 0.0, 0.0, 1.0);
    rot * position_m
}

impl EphemerisRange {
    /// Solves the light time equation between this receiver position (ECEF, meters)
    /// and this [SV] at reception time `t_rx`.
    pub fn compute(
        store: &OrbElemStore,
        sv: SV,
        t_rx: Epoch,
        rx_position_m: Vector3<f64>,
    ) -> Result<Self, Error> {
        let mut tof = INITIAL_TOF_S;

        let mut t_tx = t_rx - Duration::from_seconds(tof);
        let mut xvt = store.get_xvt(sv, t_tx)?;
        let mut position = earth_rotation(sv, xvt.position_m, tof);

        for iter in 0..MAX_ITER {
            let rho = (position - rx_position_m).norm();
            let new_tof = rho / SPEED_OF_LIGHT_M_S;

            if (new_tof - tof).abs() < TOLERANCE_S {
                debug!(
                    "{}({}) - light time converged after {} iteration(s)",
                    t_rx,
                    sv,
                    iter + 1
                );
                break;
            }

            tof = new_tof;
            t_tx = t_rx - Duration::from_seconds(tof);
            xvt = store.get_xvt(sv, t_tx)?;
            position = earth_rotation(sv, xvt.position_m, tof);
        }

        let vector = position - rx_position_m;
        let geometric_range_m = vector.norm();

        xvt.position_m = position;
        xvt.velocity_m_s = earth_rotation(sv, xvt.velocity_m_s, tof);

        Ok(Self {
            sv,
            t_rx,
            t_tx,
            xvt,
            geometric_range_m,
            corrected_range_m: geometric_range_m
                - SPEED_OF_LIGHT_M_S * xvt.corrected_clock_bias_s(),
            line_of_sight: vector / geometric_range_m,
        })
    }
}
