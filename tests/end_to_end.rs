//! Full pipeline over synthetic wrist motion
//!
//! Key presses are z-axis bumps; the hand moves between presses with an
//! accelerate-then-brake pulse along the keypad direction (x right, y up).

use std::f64::consts::PI;

use imu_pin::{
    DirectionClass, KnnClassifier, MemoryTrainingStore, PinDatabase, PinPipeline, PipelineSettings, Sample,
    TrainingStore,
};

const MOVE_SAMPLES: usize = 60;
const PRESS_SAMPLES: usize = 12;

fn rest(n: usize) -> Vec<Sample> {
    vec![Sample::from_values([0.0, 0.0, 1.0, 0.0, 0.0, 0.0]); n]
}

fn press() -> Vec<Sample> {
    (0..PRESS_SAMPLES)
        .map(|i| {
            let bump = (PI * (i as f64 + 0.5) / PRESS_SAMPLES as f64).sin();
            Sample::from_values([0.0, 0.0, 1.0 + bump, 0.0, 0.0, 0.0])
        })
        .collect()
}

fn movement(direction: DirectionClass, amplitude: f64) -> Vec<Sample> {
    let (dx, dy) = match direction {
        DirectionClass::Left => (-1.0, 0.0),
        DirectionClass::Right => (1.0, 0.0),
        DirectionClass::Down => (0.0, -1.0),
        DirectionClass::Up => (0.0, 1.0),
        DirectionClass::LeftDown => (-1.0, -1.0),
        DirectionClass::LeftUp => (-1.0, 1.0),
        DirectionClass::RightDown => (1.0, -1.0),
        DirectionClass::RightUp => (1.0, 1.0),
        DirectionClass::Same => (0.0, 0.0),
    };
    (0..MOVE_SAMPLES)
        .map(|i| {
            let pulse = amplitude * (2.0 * PI * (i as f64 + 0.5) / MOVE_SAMPLES as f64).sin();
            Sample::from_values([dx * pulse, dy * pulse, 1.0, 0.0, 0.0, 0.0])
        })
        .collect()
}

/// Presses separated by the given movements, framed by rest
fn gesture(directions: &[DirectionClass], amplitude: f64) -> Vec<Sample> {
    let mut samples = rest(60);
    for &direction in directions {
        samples.extend(press());
        samples.extend(rest(9));
        samples.extend(movement(direction, amplitude));
        samples.extend(rest(9));
    }
    samples.extend(press());
    samples.extend(rest(60));
    samples
}

fn calibrated_pipeline() -> PinPipeline {
    let mut pipeline = PinPipeline::new(PipelineSettings::default()).unwrap();
    let outcome = pipeline.calibrate(rest(200));
    assert_eq!(outcome.samples_used(), 10);
    pipeline
}

fn trained_store() -> MemoryTrainingStore {
    let mut store = MemoryTrainingStore::new();
    for class in DirectionClass::ALL {
        for amplitude in [0.4, 0.5, 0.6] {
            let mut pipeline = calibrated_pipeline();
            let capture = pipeline.capture(gesture(&[class], amplitude));
            let feature = pipeline.training_feature(&capture.compressed).unwrap();
            store.add_training_feature(feature, class).unwrap();
        }
    }
    store
}

fn frequency(pin: &str) -> u64 {
    match pin {
        "1254" => 1_000,
        "2365" => 500,
        _ => 1,
    }
}

#[test]
fn test_training_recordings_yield_one_feature_each() {
    let store = trained_store();
    for class in DirectionClass::ALL {
        let features = store.load_class(class).unwrap();
        assert_eq!(features.len(), 3);
        assert!(features.iter().all(|f| f.len() == 20));
    }
}

#[test]
fn test_pin_gesture_is_recognised() {
    let _ = env_logger::builder().is_test(true).try_init();

    let store = trained_store();
    let classifier = KnnClassifier::from_store(&store).unwrap();
    let database = PinDatabase::build(&frequency).unwrap();

    let directions = [DirectionClass::Right, DirectionClass::Down, DirectionClass::Left];
    let mut pipeline = calibrated_pipeline();
    let capture = pipeline.capture(gesture(&directions, 0.5));

    let segments = pipeline.segments(&capture.compressed);
    assert_eq!(segments.len(), 1);

    let features = pipeline.extract(&segments[0]).unwrap();
    assert_eq!(features.len(), 3);

    let recognition = pipeline
        .recognise(&capture.compressed, &classifier, &database)
        .unwrap()
        .unwrap();
    assert_eq!(recognition.directions, directions);
    assert_eq!(recognition.candidates[0], "1254");
    assert_eq!(recognition.candidates[1], "2365");
    assert!(recognition.candidates.contains(&"4587".to_string()));
}

#[test]
fn test_capture_peaks_match_presses() {
    let mut pipeline = calibrated_pipeline();
    let directions = [DirectionClass::Right, DirectionClass::Down, DirectionClass::Left];
    let capture = pipeline.capture(gesture(&directions, 0.5));

    // Presses every 90 raw samples, i.e. every 30 compressed samples
    let peaks = pipeline.peaks(&capture.compressed);
    assert_eq!(peaks.len(), 4);
    assert!(peaks.windows(2).all(|w| w[1] - w[0] == 30));
}

#[test]
fn test_still_hand_is_not_a_pin() {
    let store = trained_store();
    let classifier = KnnClassifier::from_store(&store).unwrap();
    let database = PinDatabase::build(&frequency).unwrap();

    let mut pipeline = calibrated_pipeline();
    let capture = pipeline.capture(rest(400));
    assert!(
        pipeline
            .recognise(&capture.compressed, &classifier, &database)
            .unwrap()
            .is_none()
    );
}
