//! Madgwick gradient descent orientation filter
//!
//! Fuses gyroscope and accelerometer readings into an attitude quaternion.
//! The gyroscope rate drives the quaternion derivative; when an acceleration
//! reading is available the derivative is pulled along the normalized
//! gradient of the gravity alignment error, scaled by the gain beta. The
//! result is integrated with one explicit Euler step and renormalized.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::gravity::GravityCompensator;
use crate::math::Vector3Ext;
use crate::types::{FilterSettings, SensorUnits};

/// Applies one filter step to `quaternion`
///
/// `gyroscope` is in radians per second, `accelerometer` in any unit (only its
/// direction is used). An all-zero accelerometer reading skips the gradient
/// correction and integrates the gyroscope alone.
pub fn madgwick_update(
    quaternion: &UnitQuaternion<f64>,
    gyroscope: Vector3<f64>,
    accelerometer: Vector3<f64>,
    beta: f64,
    delta_time: f64,
) -> UnitQuaternion<f64> {
    let q = quaternion.as_ref();
    let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);
    let (gx, gy, gz) = (gyroscope.x, gyroscope.y, gyroscope.z);

    // Rate of change from the gyroscope: 0.5 * q ⊗ (0, ω)
    let mut q_dot = Quaternion::new(
        0.5 * (-q1 * gx - q2 * gy - q3 * gz),
        0.5 * (q0 * gx + q2 * gz - q3 * gy),
        0.5 * (q0 * gy - q1 * gz + q3 * gx),
        0.5 * (q0 * gz + q1 * gy - q2 * gx),
    );

    if accelerometer != Vector3::zeros() {
        let a = accelerometer.safe_normalize();
        let (ax, ay, az) = (a.x, a.y, a.z);

        let (q0q0, q1q1, q2q2, q3q3) = (q0 * q0, q1 * q1, q2 * q2, q3 * q3);

        // Gradient of the objective function, J^T f, in closed form
        let gradient = Quaternion::new(
            4.0 * q0 * q2q2 + 2.0 * q2 * ax + 4.0 * q0 * q1q1 - 2.0 * q1 * ay,
            4.0 * q1 * q3q3 - 2.0 * q3 * ax + 4.0 * q0q0 * q1 - 2.0 * q0 * ay - 4.0 * q1
                + 8.0 * q1 * q1q1
                + 8.0 * q1 * q2q2
                + 4.0 * q1 * az,
            4.0 * q0q0 * q2 + 2.0 * q0 * ax + 4.0 * q2 * q3q3 - 2.0 * q3 * ay - 4.0 * q2
                + 8.0 * q2 * q1q1
                + 8.0 * q2 * q2q2
                + 4.0 * q2 * az,
            4.0 * q1q1 * q3 - 2.0 * q1 * ax + 4.0 * q2q2 * q3 - 2.0 * q2 * ay,
        );

        // Zero gradient means the estimate already agrees with the measurement
        let norm = gradient.norm();
        if norm > 0.0 {
            q_dot -= gradient * (beta / norm);
        }
    }

    let integrated = q + q_dot * delta_time;
    UnitQuaternion::try_new(integrated, 0.0).unwrap_or(*quaternion)
}

/// Per-sample attitude estimator
///
/// Holds the current quaternion and the last accelerometer reading, and
/// derives gravity and linear acceleration from them.
///
/// # Example
/// ```
/// use imu_pin::OrientationEstimator;
/// use nalgebra::Vector3;
///
/// let mut estimator = OrientationEstimator::new();
/// estimator.update(Vector3::zeros(), Vector3::new(0.0, 0.0, 1.0));
///
/// let linear = estimator.linear_acceleration();
/// assert!(linear.norm() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct OrientationEstimator {
    settings: FilterSettings,
    units: SensorUnits,
    compensator: GravityCompensator,
    quaternion: UnitQuaternion<f64>,
    accelerometer: Vector3<f64>,
}

impl OrientationEstimator {
    /// Create an estimator with default settings (g, rad/s, beta 0.1, 100 Hz)
    pub fn new() -> Self {
        Self::with_settings(FilterSettings::default(), SensorUnits::default())
    }

    pub fn with_settings(settings: FilterSettings, units: SensorUnits) -> Self {
        Self {
            settings,
            units,
            compensator: GravityCompensator::new(units.accel),
            quaternion: UnitQuaternion::identity(),
            accelerometer: Vector3::zeros(),
        }
    }

    /// Return to the identity attitude
    pub fn reset(&mut self) {
        self.quaternion = UnitQuaternion::identity();
        self.accelerometer = Vector3::zeros();
    }

    /// Feed one sample, gyroscope in the configured unit
    pub fn update(&mut self, gyroscope: Vector3<f64>, accelerometer: Vector3<f64>) -> UnitQuaternion<f64> {
        let gyroscope = self.units.gyro.to_radians_per_second(gyroscope);
        self.accelerometer = accelerometer;
        self.quaternion = madgwick_update(
            &self.quaternion,
            gyroscope,
            accelerometer,
            self.settings.beta,
            self.settings.sample_period(),
        );
        self.quaternion
    }

    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        self.quaternion
    }

    pub fn set_quaternion(&mut self, quaternion: UnitQuaternion<f64>) {
        self.quaternion = quaternion;
    }

    /// Gravity in the sensor frame, in the accelerometer unit
    pub fn gravity(&self) -> Vector3<f64> {
        self.compensator.gravity(&self.quaternion)
    }

    /// Last accelerometer reading minus gravity
    pub fn linear_acceleration(&self) -> Vector3<f64> {
        self.compensator.linear_acceleration(&self.quaternion, self.accelerometer)
    }

    pub fn settings(&self) -> FilterSettings {
        self.settings
    }

    pub fn units(&self) -> SensorUnits {
        self.units
    }
}

impl Default for OrientationEstimator {
    fn default() -> Self {
        Self::new()
    }
}
