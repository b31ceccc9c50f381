//! End-to-end PIN inference
//!
//! [`PinPipeline`] owns the orientation estimator and the settings of every
//! stage. A session calibrates once, then turns each captured sample stream
//! into either a training feature or a ranked list of candidate PINs.

use log::{debug, info};
use nalgebra::Vector3;

use crate::calibration::{CalibrationController, CalibrationOutcome};
use crate::classifier::DistanceClassifier;
use crate::direction::DirectionClass;
use crate::error::Result;
use crate::features::{Feature, extract_features, transition_feature};
use crate::madgwick::OrientationEstimator;
use crate::peaks::find_axis_peaks;
use crate::pins::PinDatabase;
use crate::quantize::{compress, discretize};
use crate::segment::{Segment, segment};
use crate::types::{PipelineSettings, Sample};

/// Index-aligned series recorded from one sample stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capture {
    /// Raw accelerometer readings
    pub raw: Vec<Vector3<f64>>,
    /// Gyroscope readings as delivered
    pub angular_velocity: Vec<Vector3<f64>>,
    /// Gravity estimate after each sample
    pub gravity: Vec<Vector3<f64>>,
    /// Raw minus gravity
    pub linear: Vec<Vector3<f64>>,
    /// Sliding-window means of `linear`
    pub compressed: Vec<Vector3<f64>>,
    /// Discrete levels of `compressed`
    pub discretized: Vec<Vector3<i32>>,
}

impl Capture {
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Outcome of recognising one PIN gesture
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    /// The segment the features came from
    pub segment: Segment,
    pub features: [Feature; 3],
    pub directions: [DirectionClass; 3],
    /// Matching PINs, most frequent first
    pub candidates: Vec<String>,
}

/// Configured capture, training and recognition pipeline
///
/// # Example
/// ```
/// use imu_pin::{PinPipeline, PipelineSettings, Sample};
///
/// let mut pipeline = PinPipeline::new(PipelineSettings::default()).unwrap();
///
/// let resting = Sample::from_values([0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
/// let outcome = pipeline.calibrate(std::iter::repeat(resting).take(500));
/// assert!(outcome.quaternion().is_some());
///
/// let capture = pipeline.capture(std::iter::repeat(resting).take(300));
/// assert_eq!(capture.compressed.len(), 100);
/// assert!(pipeline.segments(&capture.compressed).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct PinPipeline {
    settings: PipelineSettings,
    estimator: OrientationEstimator,
}

impl PinPipeline {
    /// Validates `settings` and starts from the identity attitude
    pub fn new(settings: PipelineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            estimator: OrientationEstimator::with_settings(settings.filter, settings.units),
        })
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn estimator(&self) -> &OrientationEstimator {
        &self.estimator
    }

    pub fn estimator_mut(&mut self) -> &mut OrientationEstimator {
        &mut self.estimator
    }

    /// Calibrate with a controller built from the configured policy
    pub fn calibrate<I>(&mut self, samples: I) -> CalibrationOutcome
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut controller = CalibrationController::new(self.settings.calibration, self.settings.units.accel);
        self.calibrate_with(&mut controller, samples)
    }

    /// Calibrate with a caller-provided controller, e.g. one with a listener
    pub fn calibrate_with<I>(&mut self, controller: &mut CalibrationController, samples: I) -> CalibrationOutcome
    where
        I: IntoIterator<Item = Sample>,
    {
        controller.calibrate(&mut self.estimator, samples)
    }

    /// Run the estimator over `samples` and derive every series
    ///
    /// The estimator keeps its attitude across captures.
    pub fn capture<I>(&mut self, samples: I) -> Capture
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut capture = Capture::default();
        for sample in samples {
            self.estimator.update(sample.gyro, sample.accel);
            capture.raw.push(sample.accel);
            capture.angular_velocity.push(sample.gyro);
            capture.gravity.push(self.estimator.gravity());
            capture.linear.push(self.estimator.linear_acceleration());
        }

        let quantizer = self.settings.quantizer;
        capture.compressed = compress(&capture.linear, quantizer.window, quantizer.slide);
        capture.discretized = discretize(&capture.compressed);
        debug!("captured {} samples, {} compressed", capture.len(), capture.compressed.len());
        capture
    }

    /// Key-press peaks of a compressed series
    pub fn peaks(&self, compressed: &[Vector3<f64>]) -> Vec<usize> {
        find_axis_peaks(compressed, &self.settings.peaks)
    }

    /// Candidate PIN-entry segments of a compressed series
    pub fn segments(&self, compressed: &[Vector3<f64>]) -> Vec<Segment> {
        let peaks = self.peaks(compressed);
        debug!("peaks {:?}", peaks);
        segment(compressed, &peaks, &self.settings.segmentation)
    }

    /// Transition features of a segment
    pub fn extract(&self, segment: &Segment) -> Option<[Feature; 3]> {
        extract_features(segment, self.settings.features.feature_size)
    }

    /// The first key-to-key transition of a training recording
    ///
    /// Peaks are searched over the whole series, with no PIN timing test, so a
    /// recording of a single two-key movement is enough.
    pub fn training_feature(&self, compressed: &[Vector3<f64>]) -> Option<Feature> {
        let peaks = self.peaks(compressed);
        match peaks.as_slice() {
            [from, to, ..] => transition_feature(compressed, *from, *to, self.settings.features.feature_size),
            _ => {
                debug!("training recording has {} peaks, need at least 2", peaks.len());
                None
            }
        }
    }

    /// Classify the first PIN-entry segment and match it against `database`
    ///
    /// `Ok(None)` when no segment is found or its intervals are too short.
    pub fn recognise(
        &self,
        compressed: &[Vector3<f64>],
        classifier: &impl DistanceClassifier,
        database: &PinDatabase,
    ) -> Result<Option<Recognition>> {
        let Some(segment) = self.segments(compressed).into_iter().next() else {
            info!("no PIN-entry segment recognised");
            return Ok(None);
        };
        let Some(features) = self.extract(&segment) else {
            return Ok(None);
        };

        let directions = classifier.classify(&features, self.settings.classifier.k)?;
        let candidates = database.get_matching_pins(&directions);
        info!(
            "recognised transitions {} {} {}, {} candidate PINs",
            directions[0],
            directions[1],
            directions[2],
            candidates.len()
        );

        Ok(Some(Recognition {
            segment,
            features,
            directions,
            candidates,
        }))
    }
}
