//! Temporal compression and level discretization of acceleration series

use nalgebra::Vector3;

/// Largest discrete level; values beyond ±2 saturate here
pub const MAX_LEVEL: i32 = 16;

/// Sliding-window mean over a series
///
/// For every index `i` with `i % slide == 0` the per-axis sum of
/// `series[i..i + window]` divided by `window` is emitted, so the output holds
/// `ceil(len / slide)` values. Windows running past the end of the series are
/// still divided by the full window length, which tapers the tail towards zero.
///
/// # Example
/// ```
/// use imu_pin::compress;
/// use nalgebra::Vector3;
///
/// let series: Vec<_> = (0..6).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect();
/// let compressed = compress(&series, 2, 3);
///
/// assert_eq!(compressed, vec![Vector3::new(0.5, 0.0, 0.0), Vector3::new(3.5, 0.0, 0.0)]);
/// ```
pub fn compress(series: &[Vector3<f64>], window: usize, slide: usize) -> Vec<Vector3<f64>> {
    let window = window.max(1);
    (0..series.len())
        .step_by(slide.max(1))
        .map(|start| {
            let chunk = &series[start..(start + window).min(series.len())];
            chunk.iter().sum::<Vector3<f64>>() / window as f64
        })
        .collect()
}

/// Maps one value onto the 33 integer levels in `[-16, 16]`
///
/// Piecewise-linear compander, symmetric around zero:
/// * `|x| > 2` saturates at ±16
/// * `1 < |x| <= 2` maps to `±(10 + round((|x| - 1) * 5))`
/// * `|x| <= 1` maps to `round(x * 10)`
///
/// Rounding is half away from zero, so `1.5` maps to 13 and `-0.05` to -1.
pub fn discretize_value(value: f64) -> i32 {
    let magnitude = value.abs();
    let level = if magnitude > 2.0 {
        MAX_LEVEL
    } else if magnitude > 1.0 {
        10 + ((magnitude - 1.0) * 5.0).round() as i32
    } else {
        (magnitude * 10.0).round() as i32
    };

    if value < 0.0 { -level } else { level }
}

/// Applies [`discretize_value`] to every component of a series
pub fn discretize(series: &[Vector3<f64>]) -> Vec<Vector3<i32>> {
    series.iter().map(|v| v.map(discretize_value)).collect()
}
