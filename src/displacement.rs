//! Double integration of linear acceleration
//!
//! Velocity and displacement are accumulated one tick at a time, the
//! displacement step using the velocity already updated for that tick.
//! Without any drift correction the result is only meaningful over short
//! windows.

use nalgebra::Vector3;

/// Velocity and displacement after each sample, index-aligned with the input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    pub velocity: Vec<Vector3<f64>>,
    pub displacement: Vec<Vector3<f64>>,
}

impl Trajectory {
    /// Displacement after the last sample, zero for an empty trajectory
    pub fn final_displacement(&self) -> Vector3<f64> {
        self.displacement.last().copied().unwrap_or_else(Vector3::zeros)
    }
}

/// Integrate an acceleration series sampled at `sample_rate` Hz
///
/// Units follow the input: acceleration in m/s² yields m/s and m.
///
/// # Example
/// ```
/// use imu_pin::integrate_displacement;
/// use nalgebra::Vector3;
///
/// let accel = vec![Vector3::new(1.0, 0.0, 0.0); 100];
/// let trajectory = integrate_displacement(&accel, 100.0);
///
/// assert!((trajectory.velocity[99].x - 1.0).abs() < 1e-9);
/// ```
pub fn integrate_displacement(series: &[Vector3<f64>], sample_rate: f64) -> Trajectory {
    let dt = 1.0 / sample_rate;
    let mut velocity = Vector3::<f64>::zeros();
    let mut displacement = Vector3::<f64>::zeros();

    let mut trajectory = Trajectory {
        velocity: Vec::with_capacity(series.len()),
        displacement: Vec::with_capacity(series.len()),
    };
    for accel in series {
        velocity += accel * dt;
        displacement += velocity * dt;
        trajectory.velocity.push(velocity);
        trajectory.displacement.push(displacement);
    }
    trajectory
}
