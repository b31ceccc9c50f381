//! Core types and settings for the PIN inference pipeline
//!
//! Every tunable used by a pipeline stage lives in one of the settings structs
//! below and is passed explicitly into that stage. [`PipelineSettings`]
//! aggregates them and can be loaded from JSON.

use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::{DEG_TO_RAD, STANDARD_GRAVITY};

/// One accelerometer/gyroscope reading taken at a fixed tick
///
/// Units are those selected by [`SensorUnits`]; malformed frames are expected
/// to be filtered out before a sample is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Raw acceleration
    pub accel: Vector3<f64>,
    /// Angular velocity
    pub gyro: Vector3<f64>,
}

impl Sample {
    pub fn new(accel: Vector3<f64>, gyro: Vector3<f64>) -> Self {
        Self { accel, gyro }
    }

    /// Builds a sample from the `(ax, ay, az, gx, gy, gz)` tuple delivered by
    /// the sensor collaborator.
    pub fn from_values(values: [f64; 6]) -> Self {
        let [ax, ay, az, gx, gy, gz] = values;
        Self {
            accel: Vector3::new(ax, ay, az),
            gyro: Vector3::new(gx, gy, gz),
        }
    }
}

/// Accelerometer unit system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccelUnit {
    /// Standard gravities
    #[default]
    G,
    /// Metres per second squared
    MetresPerSecondSquared,
}

impl AccelUnit {
    /// Magnitude of gravity expressed in this unit
    pub fn gravity_magnitude(self) -> f64 {
        match self {
            AccelUnit::G => 1.0,
            AccelUnit::MetresPerSecondSquared => STANDARD_GRAVITY,
        }
    }

    /// Converts a value in m/s² into this unit
    pub fn convert_si(self, value: f64) -> f64 {
        value / STANDARD_GRAVITY * self.gravity_magnitude()
    }
}

/// Gyroscope unit system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GyroUnit {
    DegreesPerSecond,
    #[default]
    RadiansPerSecond,
}

impl GyroUnit {
    /// Converts an angular velocity in this unit to radians per second
    pub fn to_radians_per_second(self, gyro: Vector3<f64>) -> Vector3<f64> {
        match self {
            GyroUnit::DegreesPerSecond => gyro * DEG_TO_RAD,
            GyroUnit::RadiansPerSecond => gyro,
        }
    }
}

/// Unit system of incoming samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorUnits {
    pub accel: AccelUnit,
    pub gyro: GyroUnit,
}

/// Orientation filter settings
///
/// # Example
/// ```
/// use imu_pin::FilterSettings;
///
/// let settings = FilterSettings {
///     beta: 0.05,          // slower accelerometer correction
///     ..Default::default()
/// };
/// assert_eq!(settings.sample_rate, 100.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Gradient descent gain
    pub beta: f64,
    /// Sensor sample rate in Hz; the integration step is its reciprocal
    pub sample_rate: f64,
}

impl FilterSettings {
    /// Integration period in seconds
    pub fn sample_period(&self) -> f64 {
        1.0 / self.sample_rate
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            beta: 0.1,
            sample_rate: 100.0,
        }
    }
}

/// Stopping policy for the calibration stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationPolicy {
    /// Run the filter over exactly this many samples
    FixedCount { samples: usize },
    /// Run until the recent gravity estimates agree within tolerance
    #[default]
    ConvergenceBased,
}

/// Calibration settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    pub policy: CalibrationPolicy,
    /// Number of most recent gravity estimates compared for convergence
    pub window: usize,
    /// Per-axis agreement tolerance in m/s²
    pub tolerance: f64,
}

impl CalibrationSettings {
    /// Tolerance expressed in the given accelerometer unit
    pub fn tolerance_in(&self, unit: AccelUnit) -> f64 {
        unit.convert_si(self.tolerance)
    }
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            policy: CalibrationPolicy::default(),
            window: 10,
            tolerance: 0.04,
        }
    }
}

/// Temporal compression settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizerSettings {
    /// Samples averaged per output value
    pub window: usize,
    /// Input samples between consecutive outputs
    pub slide: usize,
}

impl Default for QuantizerSettings {
    fn default() -> Self {
        Self {
            window: 5,
            slide: 3,
        }
    }
}

/// Peak detection settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakSettings {
    /// Axis searched for key presses (0 = x, 1 = y, 2 = z)
    pub axis: usize,
    /// Threshold as a fraction of the series range above its minimum
    pub threshold: f64,
    /// Minimum index separation between accepted peaks
    pub min_distance: usize,
}

impl Default for PeakSettings {
    fn default() -> Self {
        Self {
            axis: 2,
            threshold: 0.25,
            min_distance: 10,
        }
    }
}

/// PIN-entry timing test applied to every window of four peaks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationSettings {
    /// Accepted band for `(p1 - p0) / (p3 - p0)`
    pub first_ratio: (f64, f64),
    /// Accepted band for `(p2 - p0) / (p3 - p0)`
    pub second_ratio: (f64, f64),
    /// Samples kept before the first peak
    pub lead_padding: usize,
    /// Exclusive end offset past the last peak
    pub trail_padding: usize,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self {
            first_ratio: (0.19, 0.47),
            second_ratio: (0.52, 0.80),
            lead_padding: 2,
            trail_padding: 3,
        }
    }
}

/// Feature resampling settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSettings {
    /// Samples per axis in every feature
    pub feature_size: usize,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self { feature_size: 20 }
    }
}

/// Direction classifier settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Neighbourhood size
    pub k: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self { k: 5 }
    }
}

/// Settings for the whole pipeline
///
/// # Example
/// ```
/// use imu_pin::{CalibrationPolicy, PipelineSettings};
///
/// let json = r#"{
///     "units": { "accel": "metres_per_second_squared", "gyro": "degrees_per_second" },
///     "calibration": { "policy": { "kind": "fixed_count", "samples": 500 } },
///     "classifier": { "k": 1 }
/// }"#;
/// let settings = PipelineSettings::from_json_str(json).unwrap();
///
/// assert_eq!(settings.calibration.policy, CalibrationPolicy::FixedCount { samples: 500 });
/// assert_eq!(settings.quantizer.window, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub units: SensorUnits,
    pub filter: FilterSettings,
    pub calibration: CalibrationSettings,
    pub quantizer: QuantizerSettings,
    pub peaks: PeakSettings,
    pub segmentation: SegmentationSettings,
    pub features: FeatureSettings,
    pub classifier: ClassifierSettings,
}

impl PipelineSettings {
    /// Parses and validates settings from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates settings from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks that every stage is well defined under these settings
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| Err(Error::InvalidSettings(message.to_string()));

        if !(self.filter.sample_rate > 0.0) {
            return invalid("filter.sample_rate must be positive");
        }
        if !(self.filter.beta > 0.0) {
            return invalid("filter.beta must be positive");
        }
        if let CalibrationPolicy::FixedCount { samples: 0 } = self.calibration.policy {
            return invalid("calibration.policy fixed count must be at least one sample");
        }
        if self.calibration.window == 0 {
            return invalid("calibration.window must be at least 1");
        }
        if !(self.calibration.tolerance >= 0.0) {
            return invalid("calibration.tolerance must not be negative");
        }
        if self.quantizer.window == 0 || self.quantizer.slide == 0 {
            return invalid("quantizer.window and quantizer.slide must be at least 1");
        }
        if self.peaks.axis > 2 {
            return invalid("peaks.axis must be 0, 1 or 2");
        }
        if self.peaks.min_distance == 0 {
            return invalid("peaks.min_distance must be at least 1");
        }
        let (low, high) = self.segmentation.first_ratio;
        if !(low <= high) {
            return invalid("segmentation.first_ratio band is inverted");
        }
        let (low, high) = self.segmentation.second_ratio;
        if !(low <= high) {
            return invalid("segmentation.second_ratio band is inverted");
        }
        if self.features.feature_size == 0 {
            return invalid("features.feature_size must be at least 1");
        }
        if self.classifier.k == 0 {
            return invalid("classifier.k must be at least 1");
        }
        Ok(())
    }
}
