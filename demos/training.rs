//! Recording a training corpus
//!
//! Simulates one training recording per direction class and stores the
//! resulting features in a directory of JSON files, then undoes a recording
//! the way an operator would after a bad take.
//!
//! Run with: `cargo run --example training -- [store-directory]`

use std::error::Error;
use std::f64::consts::PI;
use std::path::PathBuf;

use imu_pin::{DirTrainingStore, DirectionClass, PinPipeline, PipelineSettings, Sample, TrainingStore};

fn rest(n: usize) -> Vec<Sample> {
    vec![Sample::from_values([0.0, 0.0, 1.0, 0.0, 0.0, 0.0]); n]
}

// Key press: a short bump along z
fn press() -> Vec<Sample> {
    (0..12)
        .map(|i| {
            let bump = (PI * (i as f64 + 0.5) / 12.0).sin();
            Sample::from_values([0.0, 0.0, 1.0 + bump, 0.0, 0.0, 0.0])
        })
        .collect()
}

// One key-to-key movement: accelerate then brake along the keypad direction
fn recording(class: DirectionClass, amplitude: f64) -> Vec<Sample> {
    let (dx, dy) = match class {
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

    let mut samples = rest(60);
    samples.extend(press());
    samples.extend(rest(9));
    samples.extend((0..60).map(|i| {
        let pulse = amplitude * (2.0 * PI * (i as f64 + 0.5) / 60.0).sin();
        Sample::from_values([dx * pulse, dy * pulse, 1.0, 0.0, 0.0, 0.0])
    }));
    samples.extend(rest(9));
    samples.extend(press());
    samples.extend(rest(60));
    samples
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("imu-pin-training"));
    let mut store = DirTrainingStore::open(&root)?;
    println!("Training store at {}", store.root().display());

    let settings = PipelineSettings::default();
    for class in DirectionClass::ALL {
        for amplitude in [0.4, 0.5, 0.6] {
            // Each recording is its own session with a fresh calibration
            let mut pipeline = PinPipeline::new(settings)?;
            pipeline.calibrate(rest(200));

            let capture = pipeline.capture(recording(class, amplitude));
            match pipeline.training_feature(&capture.compressed) {
                Some(feature) => store.add_training_feature(feature, class)?,
                None => println!("{class}: recording at amplitude {amplitude} had no transition"),
            }
        }
    }

    // A mistaken take is removed again
    let removed = store.delete_last_training_feature(DirectionClass::Same)?;
    println!("Removed last {} feature ({} samples per axis)", DirectionClass::Same, removed.len());

    for class in DirectionClass::ALL {
        println!("{:>2}: {} features", class.label(), store.load_class(class)?.len());
    }

    Ok(())
}
