//! Calibration of the initial attitude
//!
//! Before a capture is processed the orientation filter is run over a stretch
//! of samples so that its quaternion settles on the device's resting attitude.
//! The controller decides when that stretch ends, following the configured
//! [`CalibrationPolicy`].

use std::collections::VecDeque;
use std::fmt;

use log::{debug, info, warn};
use nalgebra::{UnitQuaternion, Vector3};

use crate::madgwick::OrientationEstimator;
use crate::math::within_range;
use crate::types::{AccelUnit, CalibrationPolicy, CalibrationSettings, Sample};

/// Receives the "calibrated" notification
///
/// Implemented for any `FnMut(&UnitQuaternion<f64>)`, so a closure can be
/// passed directly.
pub trait CalibrationListener {
    fn on_calibrated(&mut self, quaternion: &UnitQuaternion<f64>);
}

impl<F> CalibrationListener for F
where
    F: FnMut(&UnitQuaternion<f64>),
{
    fn on_calibrated(&mut self, quaternion: &UnitQuaternion<f64>) {
        self(quaternion)
    }
}

/// Calibration progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationState {
    /// Still feeding samples into the filter
    Collecting,
    /// Recent gravity estimates agree within tolerance (terminal)
    Stable,
    /// The fixed sample count has been consumed (terminal)
    CountReached,
}

impl CalibrationState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, CalibrationState::Collecting)
    }
}

/// Result of running calibration over a sample stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationOutcome {
    /// A terminal state was reached; `quaternion` is the settled attitude
    Calibrated {
        quaternion: UnitQuaternion<f64>,
        samples_used: usize,
    },
    /// The stream ran dry before the policy was satisfied
    Exhausted { samples_used: usize },
}

impl CalibrationOutcome {
    pub fn quaternion(&self) -> Option<UnitQuaternion<f64>> {
        match self {
            CalibrationOutcome::Calibrated { quaternion, .. } => Some(*quaternion),
            CalibrationOutcome::Exhausted { .. } => None,
        }
    }

    pub fn samples_used(&self) -> usize {
        match self {
            CalibrationOutcome::Calibrated { samples_used, .. } | CalibrationOutcome::Exhausted { samples_used } => {
                *samples_used
            }
        }
    }
}

/// Drives an [`OrientationEstimator`] until the calibration policy is met
///
/// The convergence policy has no timeout of its own. Callers that cannot
/// block indefinitely should bound the sample stream they pass to
/// [`calibrate`](Self::calibrate), e.g. with `Iterator::take`.
///
/// # Example
/// ```
/// use imu_pin::{CalibrationController, CalibrationSettings, OrientationEstimator, Sample};
/// use imu_pin::types::AccelUnit;
///
/// let mut estimator = OrientationEstimator::new();
/// let mut controller = CalibrationController::new(CalibrationSettings::default(), AccelUnit::G);
///
/// let resting = Sample::from_values([0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
/// let outcome = controller.calibrate(&mut estimator, std::iter::repeat(resting).take(1000));
///
/// assert!(outcome.quaternion().is_some());
/// ```
pub struct CalibrationController {
    policy: CalibrationPolicy,
    window: usize,
    /// Tolerance in the accelerometer unit
    tolerance: f64,
    recent: VecDeque<Vector3<f64>>,
    samples_seen: usize,
    state: CalibrationState,
    listener: Option<Box<dyn CalibrationListener>>,
}

impl CalibrationController {
    pub fn new(settings: CalibrationSettings, unit: AccelUnit) -> Self {
        Self {
            policy: settings.policy,
            window: settings.window.max(1),
            tolerance: settings.tolerance_in(unit),
            recent: VecDeque::with_capacity(settings.window),
            samples_seen: 0,
            state: CalibrationState::Collecting,
            listener: None,
        }
    }

    /// Attach the listener notified once calibration completes
    pub fn with_listener(mut self, listener: impl CalibrationListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Feed one sample through the estimator and advance the state machine
    ///
    /// Once a terminal state is reached further samples are ignored and the
    /// estimator is left untouched.
    pub fn update(&mut self, estimator: &mut OrientationEstimator, sample: &Sample) -> CalibrationState {
        if self.state.is_terminal() {
            return self.state;
        }

        estimator.update(sample.gyro, sample.accel);
        self.samples_seen += 1;

        self.state = match self.policy {
            CalibrationPolicy::FixedCount { samples } if self.samples_seen >= samples => CalibrationState::CountReached,
            CalibrationPolicy::FixedCount { .. } => CalibrationState::Collecting,
            CalibrationPolicy::ConvergenceBased => {
                if self.recent.len() == self.window {
                    self.recent.pop_front();
                }
                self.recent.push_back(estimator.gravity());

                let full = self.recent.len() == self.window;
                if full && within_range(self.recent.make_contiguous(), self.tolerance) {
                    CalibrationState::Stable
                } else {
                    CalibrationState::Collecting
                }
            }
        };

        if self.state.is_terminal() {
            let quaternion = estimator.quaternion();
            info!(
                "calibration finished ({:?}) after {} samples, gravity {:?}",
                self.state,
                self.samples_seen,
                estimator.gravity()
            );
            if let Some(listener) = self.listener.as_mut() {
                listener.on_calibrated(&quaternion);
            }
        }

        self.state
    }

    /// Run calibration over `samples` until a terminal state or the end of input
    pub fn calibrate<I>(&mut self, estimator: &mut OrientationEstimator, samples: I) -> CalibrationOutcome
    where
        I: IntoIterator<Item = Sample>,
    {
        for sample in samples {
            if self.update(estimator, &sample).is_terminal() {
                break;
            }
        }

        if self.state.is_terminal() {
            CalibrationOutcome::Calibrated {
                quaternion: estimator.quaternion(),
                samples_used: self.samples_seen,
            }
        } else {
            warn!(
                "calibration input exhausted after {} samples without reaching {:?}",
                self.samples_seen, self.policy
            );
            CalibrationOutcome::Exhausted {
                samples_used: self.samples_seen,
            }
        }
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn samples_seen(&self) -> usize {
        self.samples_seen
    }

    /// Forget all progress; the listener stays attached
    pub fn reset(&mut self) {
        debug!("calibration reset after {} samples", self.samples_seen);
        self.recent.clear();
        self.samples_seen = 0;
        self.state = CalibrationState::Collecting;
    }
}

impl fmt::Debug for CalibrationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalibrationController")
            .field("policy", &self.policy)
            .field("window", &self.window)
            .field("tolerance", &self.tolerance)
            .field("samples_seen", &self.samples_seen)
            .field("state", &self.state)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}
