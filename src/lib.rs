//! IMU PIN - keypad PIN inference from wrist-worn inertial sensors
//!
//! Typing a PIN moves the wrist from key to key. This library turns the
//! accelerometer and gyroscope stream recorded during that movement into a
//! ranked list of candidate PINs.
//!
//! # Pipeline
//!
//! 1. A Madgwick filter ([`OrientationEstimator`]) tracks the sensor attitude,
//!    after a [`CalibrationController`] has let it settle.
//! 2. Gravity is derived from the attitude and removed ([`GravityCompensator`]).
//! 3. The linear acceleration is compressed with a sliding-window mean
//!    ([`compress`]) and optionally discretized ([`discretize`]).
//! 4. Key presses show up as z-axis peaks ([`find_peaks`]); runs of four peaks
//!    with PIN-like timing become [`Segment`]s ([`segment`]).
//! 5. The movement between consecutive presses is resampled to a fixed length
//!    ([`extract_features`]) and classified into one of nine directions by
//!    k-nearest neighbours ([`KnnClassifier`]).
//! 6. The three directions select PINs from a frequency-ranked table
//!    ([`PinDatabase::get_matching_pins`]).
//!
//! # Quick Start
//!
//! ```rust
//! use imu_pin::{
//!     DirectionClass, KnnClassifier, MemoryTrainingStore, PinDatabase, PinPipeline,
//!     PipelineSettings, Sample, TrainingStore,
//! };
//!
//! let mut pipeline = PinPipeline::new(PipelineSettings::default())?;
//!
//! // Let the attitude settle on a resting device
//! let resting = Sample::from_values([0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
//! pipeline.calibrate(std::iter::repeat(resting).take(1000));
//!
//! // Record a gesture (here: nothing happens)
//! let capture = pipeline.capture(std::iter::repeat(resting).take(500));
//!
//! let store = MemoryTrainingStore::new();
//! let classifier = KnnClassifier::from_store(&store)?;
//! let database = PinDatabase::build(&|_pin: &str| 1u64)?;
//!
//! let recognition = pipeline.recognise(&capture.compressed, &classifier, &database)?;
//! assert!(recognition.is_none());
//! # Ok::<(), imu_pin::Error>(())
//! ```

pub mod calibration;
pub mod classifier;
pub mod direction;
pub mod displacement;
pub mod error;
pub mod features;
pub mod gravity;
pub mod madgwick;
mod math;
pub mod peaks;
pub mod pins;
pub mod pipeline;
pub mod quantize;
pub mod segment;
pub mod training;
pub mod types;

// Re-export the public API
pub use calibration::{CalibrationController, CalibrationListener, CalibrationOutcome, CalibrationState};
pub use classifier::{DistanceClassifier, KnnClassifier, Neighbour};
pub use direction::DirectionClass;
pub use displacement::{Trajectory, integrate_displacement};
pub use error::{Error, Result};
pub use features::{Feature, extract_features, resample};
pub use gravity::{GravityCompensator, gravity_direction};
pub use madgwick::{OrientationEstimator, madgwick_update};
pub use math::{DEG_TO_RAD, QuaternionExt, RAD_TO_DEG, STANDARD_GRAVITY, Vector3Ext};
pub use peaks::{find_axis_peaks, find_peaks};
pub use pins::{FrequencySource, FrequencyTable, PinDatabase, PinRecord, generate_pin_directions};
pub use pipeline::{Capture, PinPipeline, Recognition};
pub use quantize::{compress, discretize, discretize_value};
pub use segment::{Segment, segment};
pub use training::{DirTrainingStore, MemoryTrainingStore, TrainingStore};
pub use types::*;
