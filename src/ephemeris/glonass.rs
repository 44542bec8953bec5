use crate::{
    constants::{Omega, Pz90, GM},
    prelude::{Epoch, Vector3},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integration step (in seconds)
const STEP_S: f64 = 60.0;

/// GLONASS broadcast state vector, at ToE, in the PZ-90 frame
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlonassState {
    /// Position (in meters)
    pub position_m: Vector3<f64>,
    /// Velocity (in m.s⁻¹)
    pub velocity_m_s: Vector3<f64>,
    /// Luni-solar acceleration (in m.s⁻²)
    pub acceleration_m_s2: Vector3<f64>,
    /// Frequency channel number
    pub channel: i8,
}

impl GlonassState {
    /// State derivative: (velocity, acceleration)
    fn derivative(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> (Vector3<f64>, Vector3<f64>) {
        let r = position.norm();
        let r_2 = r * r;
        let (x, y, z) = (position[0], position[1], position[2]);

        let gm_r3 = GM::GLO / (r_2 * r);
        let j2_term = 1.5 * Pz90::J2 * GM::GLO * Pz90::AE_M.powi(2) / r_2.powi(2) / r;
        let z2_r2 = 5.0 * z * z / r_2;
        let omega_2 = Omega::GLO.powi(2);

        let acceleration = Vector3::new(
            -gm_r3 * x - j2_term * x * (1.0 - z2_r2)
                + omega_2 * x
                + 2.0 * Omega::GLO * velocity[1]
                + self.acceleration_m_s2[0],
            -gm_r3 * y - j2_term * y * (1.0 - z2_r2) + omega_2 * y
                - 2.0 * Omega::GLO * velocity[0]
                + self.acceleration_m_s2[1],
            -gm_r3 * z - j2_term * z * (3.0 - z2_r2) + self.acceleration_m_s2[2],
        );

        (*velocity, acceleration)
    }

    /// Runge-Kutta (4th order) integration of the state vector, from `toe` to `epoch`.
    pub(crate) fn propagate(&self, toe: Epoch, epoch: Epoch) -> (Vector3<f64>, Vector3<f64>) {
        let dt = (epoch.to_time_scale(toe.time_scale) - toe).to_seconds();

        let mut position = self.position_m;
        let mut velocity = self.velocity_m_s;
        let mut remaining = dt;

        while remaining.abs() > 1.0E-9 {
            let h = if remaining.abs() > STEP_S {
                STEP_S.copysign(remaining)
            } else {
                remaining
            };

            let (k1_p, k1_v) = self.derivative(&position, &velocity);
            let (k2_p, k2_v) =
                self.derivative(&(position + k1_p * h / 2.0), &(velocity + k1_v * h / 2.0));
            let (k3_p, k3_v) =
                self.derivative(&(position + k2_p * h / 2.0), &(velocity + k2_v * h / 2.0));
            let (k4_p, k4_v) = self.derivative(&(position + k3_p * h), &(velocity + k3_v * h));

            position += (k1_p + k2_p * 2.0 + k3_p * 2.0 + k4_p) * h / 6.0;
            velocity += (k1_v + k2_v * 2.0 + k3_v * 2.0 + k4_v) * h / 6.0;
            remaining -= h;
        }

        (position, velocity)
    }
}
