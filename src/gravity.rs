//! Gravity estimation and removal
//!
//! Gravity is read straight off the attitude quaternion as the third row of
//! its rotation matrix, i.e. the earth vertical expressed in the sensor frame.
//! Whatever part of the measured acceleration this vector does not explain is
//! treated as hand motion. Sustained linear acceleration will bias the
//! attitude, and therefore this estimate; that is not corrected here.

use nalgebra::{UnitQuaternion, Vector3};

use crate::types::AccelUnit;

/// Unit gravity direction in the sensor frame implied by `quaternion`
pub fn gravity_direction(quaternion: &UnitQuaternion<f64>) -> Vector3<f64> {
    let q = quaternion.as_ref();
    let (qw, qx, qy, qz) = (q.w, q.i, q.j, q.k);

    Vector3::new(
        2.0 * (qx * qz - qw * qy),
        2.0 * (qw * qx + qy * qz),
        qw * qw - qx * qx - qy * qy + qz * qz,
    )
}

/// Removes the gravity component from raw accelerometer readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityCompensator {
    /// Gravity magnitude in the accelerometer's unit
    magnitude: f64,
}

impl GravityCompensator {
    pub fn new(unit: AccelUnit) -> Self {
        Self {
            magnitude: unit.gravity_magnitude(),
        }
    }

    /// Gravity vector in the sensor frame, in the accelerometer's unit
    pub fn gravity(&self, quaternion: &UnitQuaternion<f64>) -> Vector3<f64> {
        gravity_direction(quaternion) * self.magnitude
    }

    /// Linear ("gravity compensated") acceleration
    pub fn linear_acceleration(&self, quaternion: &UnitQuaternion<f64>, raw: Vector3<f64>) -> Vector3<f64> {
        raw - self.gravity(quaternion)
    }
}

impl Default for GravityCompensator {
    fn default() -> Self {
        Self::new(AccelUnit::default())
    }
}
