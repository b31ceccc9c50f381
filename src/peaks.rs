//! Local maximum detection
//!
//! Peaks are strict sign changes of the first difference that rise above a
//! threshold placed at a fraction of the series range. Plateaus are resolved
//! by borrowing the slope of their neighbours so that a flat top still yields
//! exactly one peak. A minimum separation is then enforced greedily, keeping
//! the highest peaks.

use nalgebra::Vector3;

use crate::types::PeakSettings;

/// Indices of the peaks of `values`, in ascending order
///
/// # Arguments
/// * `values` - Series to search
/// * `threshold` - Fraction of `max - min`, measured from `min`, that a peak must exceed
/// * `min_distance` - Minimum index separation between reported peaks
///
/// # Example
/// ```
/// use imu_pin::find_peaks;
///
/// let values = [0.0, 1.0, 0.0, 0.2, 0.0, 3.0, 0.0];
/// assert_eq!(find_peaks(&values, 0.25, 1), vec![1, 5]);
/// assert_eq!(find_peaks(&values, 0.25, 10), vec![5]);
/// ```
pub fn find_peaks(values: &[f64], threshold: f64, min_distance: usize) -> Vec<usize> {
    let n = values.len();
    if n < 3 {
        return Vec::new();
    }

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| (min.min(v), max.max(v)));
    let level = min + threshold * (max - min);

    let mut slopes: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    if slopes.iter().all(|&d| d == 0.0) {
        return Vec::new();
    }
    fill_plateaus(&mut slopes);

    let candidates: Vec<usize> = (1..n - 1)
        .filter(|&i| slopes[i - 1] > 0.0 && slopes[i] < 0.0 && values[i] > level)
        .collect();

    if candidates.len() > 1 && min_distance > 1 {
        enforce_min_distance(values, &candidates, min_distance)
    } else {
        candidates
    }
}

/// Peaks on one axis of a vector series, using the configured axis,
/// threshold and separation
pub fn find_axis_peaks(series: &[Vector3<f64>], settings: &PeakSettings) -> Vec<usize> {
    let axis = settings.axis.min(2);
    let values: Vec<f64> = series.iter().map(|v| v[axis]).collect();
    find_peaks(&values, settings.threshold, settings.min_distance)
}

/// Replaces zero slopes by the slope of a neighbouring run
///
/// A run touching the start takes the slope after it, a run touching the end
/// takes the slope before it. Interior runs split at their median: the left
/// half takes the slope before, the middle and right half the slope after.
fn fill_plateaus(slopes: &mut [f64]) {
    let last = slopes.len() - 1;
    let mut start = 0;

    while start < slopes.len() {
        if slopes[start] != 0.0 {
            start += 1;
            continue;
        }

        let mut end = start;
        while end < last && slopes[end + 1] == 0.0 {
            end += 1;
        }

        // The all-zero case is rejected by the caller, so one side exists
        if start == 0 {
            let after = slopes[end + 1];
            slopes[start..=end].fill(after);
        } else if end == last {
            let before = slopes[start - 1];
            slopes[start..=end].fill(before);
        } else {
            let (before, after) = (slopes[start - 1], slopes[end + 1]);
            for i in start..=end {
                // i < median(start..=end)
                slopes[i] = if 2 * i < start + end { before } else { after };
            }
        }

        start = end + 1;
    }
}

/// Keeps the highest candidates and drops every other candidate closer than
/// `min_distance` to one already kept
fn enforce_min_distance(values: &[f64], candidates: &[usize], min_distance: usize) -> Vec<usize> {
    let n = values.len();

    // Highest first; on equal height the later index wins
    let mut highest = candidates.to_vec();
    highest.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(b.cmp(&a)));

    let mut suppressed = vec![true; n];
    for &peak in candidates {
        suppressed[peak] = false;
    }

    for peak in highest {
        if suppressed[peak] {
            continue;
        }
        let low = peak.saturating_sub(min_distance);
        let high = (peak + min_distance).min(n - 1);
        suppressed[low..=high].fill(true);
        suppressed[peak] = false;
    }

    (0..n).filter(|&i| !suppressed[i]).collect()
}
