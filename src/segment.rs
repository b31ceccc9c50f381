//! Grouping of key-press peaks into PIN-entry segments
//!
//! Four key presses typed at a steady pace produce four peaks whose inner
//! two fall roughly a third and two thirds of the way between the outer two.
//! Every run of four consecutive peaks is tested against that timing.

use log::debug;
use nalgebra::Vector3;

use crate::types::SegmentationSettings;

/// A stretch of the series believed to hold one four-key gesture
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Index of the first sample of the segment in the source series
    pub start: usize,
    /// The samples `series[start..start + values.len()]`
    pub values: Vec<Vector3<f64>>,
    /// The four peaks, relative to `start`
    pub peaks: [usize; 4],
}

impl Segment {
    /// Peak indices in the source series
    pub fn absolute_peaks(&self) -> [usize; 4] {
        self.peaks.map(|p| p + self.start)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Relative positions of the two inner peaks, `(p1 - p0) / (p3 - p0)` and
/// `(p2 - p0) / (p3 - p0)`
///
/// Returns `None` when the outer peaks coincide or are out of order.
pub fn timing_ratios(peaks: [usize; 4]) -> Option<(f64, f64)> {
    let [p0, p1, p2, p3] = peaks;
    if p3 <= p0 {
        return None;
    }
    let span = (p3 - p0) as f64;
    let offset = |p: usize| (p as f64 - p0 as f64) / span;
    Some((offset(p1), offset(p2)))
}

/// True when both ratios fall inside their (inclusive) bands
pub fn matches_pin_timing(peaks: [usize; 4], settings: &SegmentationSettings) -> bool {
    let within = |value: f64, (low, high): (f64, f64)| value >= low && value <= high;
    timing_ratios(peaks)
        .is_some_and(|(first, second)| within(first, settings.first_ratio) && within(second, settings.second_ratio))
}

/// Every window of four consecutive peaks that passes the timing test
///
/// Accepted windows yield `series[p0 - lead : p3 + trail]`, clamped to the
/// series. Overlapping windows are all returned, in peak order.
///
/// # Example
/// ```
/// use imu_pin::{SegmentationSettings, segment};
/// use nalgebra::Vector3;
///
/// let series = vec![Vector3::zeros(); 20];
/// let segments = segment(&series, &[4, 7, 11, 14], &SegmentationSettings::default());
///
/// assert_eq!(segments.len(), 1);
/// assert_eq!(segments[0].start, 2);
/// assert_eq!(segments[0].len(), 15);
/// assert_eq!(segments[0].peaks, [2, 5, 9, 12]);
/// ```
pub fn segment(series: &[Vector3<f64>], peaks: &[usize], settings: &SegmentationSettings) -> Vec<Segment> {
    peaks
        .windows(4)
        .filter_map(|window| {
            let window = [window[0], window[1], window[2], window[3]];
            let accepted = matches_pin_timing(window, settings);
            debug!("peak window {:?} ratios {:?} accepted {}", window, timing_ratios(window), accepted);
            if !accepted {
                return None;
            }

            let start = window[0].saturating_sub(settings.lead_padding);
            let end = (window[3] + settings.trail_padding).min(series.len());
            if start >= end || window[3] >= series.len() {
                return None;
            }

            Some(Segment {
                start,
                values: series[start..end].to_vec(),
                peaks: window.map(|p| p - start),
            })
        })
        .collect()
}
