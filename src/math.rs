//! Mathematical utilities and nalgebra extensions

use nalgebra::{UnitQuaternion, Vector3};

/// Mathematical constants
pub const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;
pub const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Normalize the vector, returning zero vector if magnitude is zero
    fn safe_normalize(&self) -> Vector3<f64>;
}

impl Vector3Ext for Vector3<f64> {
    fn safe_normalize(&self) -> Vector3<f64> {
        let mag = self.norm();
        if mag > 0.0 {
            *self / mag
        } else {
            Vector3::zeros()
        }
    }
}

/// Extension trait for UnitQuaternion operations
pub trait QuaternionExt {
    /// Convert quaternion to Euler angles (roll, pitch, yaw) in degrees
    fn to_euler_degrees(&self) -> Vector3<f64>;

    /// Norm of the underlying quaternion
    fn raw_norm(&self) -> f64;
}

impl QuaternionExt for UnitQuaternion<f64> {
    fn to_euler_degrees(&self) -> Vector3<f64> {
        let (roll, pitch, yaw) = self.euler_angles();
        Vector3::new(roll, pitch, yaw) * RAD_TO_DEG
    }

    fn raw_norm(&self) -> f64 {
        self.as_ref().norm()
    }
}

/// True when every pair of vectors differs by at most `tolerance` on each axis
///
/// Pairwise agreement on an axis is the same as the axis span (max - min)
/// staying within tolerance, which is what is evaluated here.
pub fn within_range(values: &[Vector3<f64>], tolerance: f64) -> bool {
    (0..3).all(|axis| {
        let (min, max) = values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v[axis]), max.max(v[axis]))
        });
        values.is_empty() || max - min <= tolerance
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_extensions() {
        let v = Vector3::new(3.0, 4.0, 0.0);
        let normalized = v.safe_normalize();
        assert!((normalized.norm() - 1.0).abs() < 1e-12);
        assert_eq!(Vector3::<f64>::zeros().safe_normalize(), Vector3::zeros());
    }

    #[test]
    fn test_quaternion_euler_conversion() {
        let quat = UnitQuaternion::from_euler_angles(30.0 * DEG_TO_RAD, 45.0 * DEG_TO_RAD, 60.0 * DEG_TO_RAD);
        let recovered = quat.to_euler_degrees();

        assert!((Vector3::new(30.0, 45.0, 60.0) - recovered).norm() < 1e-9);
        assert!((quat.raw_norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_within_range() {
        let close = [
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.01, -0.01, 0.99),
            Vector3::new(0.02, 0.0, 1.0),
        ];
        assert!(within_range(&close, 0.04));
        assert!(!within_range(&close, 0.015));

        // exactly at tolerance counts as within
        let edge = [Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.5, 0.0, 0.0)];
        assert!(within_range(&edge, 0.5));
        assert!(within_range(&[], 0.0));
    }
}
