//! Key-to-key transition features
//!
//! The samples strictly between two consecutive key-press peaks describe the
//! hand moving from one key to the next. Those stretches vary in length, so
//! each is linearly resampled to a fixed number of points per axis before it
//! is compared against training data.

use log::warn;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::segment::Segment;

/// Fixed-length three-axis movement snippet
///
/// Serialized as a flat list of `3 * len` numbers, axis-major: every x value,
/// then every y value, then every z value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<f64>", try_from = "Vec<f64>")]
pub struct Feature {
    samples: Vec<Vector3<f64>>,
}

impl Feature {
    pub fn new(samples: Vec<Vector3<f64>>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[Vector3<f64>] {
        &self.samples
    }

    /// Samples per axis
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the flattened vector
    pub fn dimension(&self) -> usize {
        3 * self.samples.len()
    }

    /// Axis-major flattening used for distances and persistence
    pub fn flatten(&self) -> Vec<f64> {
        (0..3)
            .flat_map(|axis| self.samples.iter().map(move |v| v[axis]))
            .collect()
    }

    /// Inverse of [`flatten`](Self::flatten)
    pub fn from_flat(values: &[f64]) -> Result<Self> {
        if values.len() % 3 != 0 {
            return Err(Error::FeatureSizeMismatch {
                expected: values.len().div_ceil(3) * 3,
                found: values.len(),
            });
        }
        let n = values.len() / 3;
        let samples = (0..n)
            .map(|i| Vector3::new(values[i], values[n + i], values[2 * n + i]))
            .collect();
        Ok(Self { samples })
    }
}

impl From<Feature> for Vec<f64> {
    fn from(feature: Feature) -> Self {
        feature.flatten()
    }
}

impl TryFrom<Vec<f64>> for Feature {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Feature::from_flat(&values)
    }
}

/// Linear resampling of a series to `n` evenly spaced points
///
/// Each axis is interpolated over the index domain `[0, len - 1]` and sampled
/// at `t_j = j / (n - 1) * (len - 1)`, so the first and last samples are kept
/// exactly. A single requested point samples index 0.
///
/// Returns `None` for series shorter than two samples, which have no
/// interpolant.
///
/// # Example
/// ```
/// use imu_pin::resample;
/// use nalgebra::Vector3;
///
/// let series = [Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 4.0, -2.0)];
/// let resampled = resample(&series, 3).unwrap();
///
/// assert_eq!(resampled[1], Vector3::new(1.0, 2.0, -1.0));
/// assert!(resample(&series[..1], 3).is_none());
/// ```
pub fn resample(series: &[Vector3<f64>], n: usize) -> Option<Vec<Vector3<f64>>> {
    if series.len() < 2 {
        return None;
    }
    if n == 1 {
        return Some(vec![series[0]]);
    }

    let last = series.len() - 1;
    let step = last as f64 / (n.max(2) - 1) as f64;
    let resampled = (0..n)
        .map(|j| {
            let t = j as f64 * step;
            let i = (t.floor() as usize).min(last - 1);
            let frac = t - i as f64;
            series[i] + (series[i + 1] - series[i]) * frac
        })
        .collect();
    Some(resampled)
}

/// Feature for the movement between two peaks of `series`
///
/// Uses the samples strictly between `from` and `to`; `None` when fewer than
/// two remain.
pub fn transition_feature(series: &[Vector3<f64>], from: usize, to: usize, feature_size: usize) -> Option<Feature> {
    let start = (from + 1).min(series.len());
    let end = to.min(series.len()).max(start);
    match resample(&series[start..end], feature_size) {
        Some(samples) => Some(Feature::new(samples)),
        None => {
            warn!(
                "interval between peaks {} and {} holds {} samples, too short to resample",
                from,
                to,
                end - start
            );
            None
        }
    }
}

/// The three transition features of a segment
///
/// `None` when any of the three intervals is degenerate; a partial feature set
/// cannot be classified.
pub fn extract_features(segment: &Segment, feature_size: usize) -> Option<[Feature; 3]> {
    let [p0, p1, p2, p3] = segment.peaks;
    let first = transition_feature(&segment.values, p0, p1, feature_size)?;
    let second = transition_feature(&segment.values, p1, p2, feature_size)?;
    let third = transition_feature(&segment.values, p2, p3, feature_size)?;
    Some([first, second, third])
}
