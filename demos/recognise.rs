//! PIN recognition from a simulated wrist recording
//!
//! Trains a classifier on synthetic key-to-key movements, builds the PIN
//! database, then feeds a recording of the PIN 1254 (right, down, left)
//! through the pipeline and prints the candidate PINs.
//!
//! Run with: `cargo run --example recognise -- [pin-frequencies.csv]`

use std::error::Error;
use std::f64::consts::PI;

use imu_pin::{
    DirectionClass, FrequencyTable, KnnClassifier, MemoryTrainingStore, PinDatabase, PinPipeline,
    PipelineSettings, Sample, TrainingStore, integrate_displacement,
};

fn rest(n: usize) -> Vec<Sample> {
    vec![Sample::from_values([0.0, 0.0, 1.0, 0.0, 0.0, 0.0]); n]
}

fn press() -> Vec<Sample> {
    (0..12)
        .map(|i| {
            let bump = (PI * (i as f64 + 0.5) / 12.0).sin();
            Sample::from_values([0.0, 0.0, 1.0 + bump, 0.0, 0.0, 0.0])
        })
        .collect()
}

fn movement(class: DirectionClass, amplitude: f64) -> impl Iterator<Item = Sample> {
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
    (0..60).map(move |i| {
        let pulse = amplitude * (2.0 * PI * (i as f64 + 0.5) / 60.0).sin();
        Sample::from_values([dx * pulse, dy * pulse, 1.0, 0.0, 0.0, 0.0])
    })
}

/// Key presses separated by the given movements
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

fn calibrated(settings: PipelineSettings) -> Result<PinPipeline, Box<dyn Error>> {
    let mut pipeline = PinPipeline::new(settings)?;
    let outcome = pipeline.calibrate(rest(200));
    if let Some(quaternion) = outcome.quaternion() {
        let (roll, pitch, yaw) = quaternion.euler_angles();
        println!(
            "Calibrated after {} samples: roll {:.2}, pitch {:.2}, yaw {:.2}",
            outcome.samples_used(),
            roll.to_degrees(),
            pitch.to_degrees(),
            yaw.to_degrees()
        );
    }
    Ok(pipeline)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let settings = PipelineSettings::default();

    // Training corpus: three recordings per class
    let mut store = MemoryTrainingStore::new();
    for class in DirectionClass::ALL {
        for amplitude in [0.4, 0.5, 0.6] {
            let mut pipeline = PinPipeline::new(settings)?;
            pipeline.calibrate(rest(200));
            let capture = pipeline.capture(gesture(&[class], amplitude));
            if let Some(feature) = pipeline.training_feature(&capture.compressed) {
                store.add_training_feature(feature, class)?;
            }
        }
    }
    let classifier = KnnClassifier::from_store(&store)?;
    println!("Trained on {} features", classifier.len());

    let database = match std::env::args().nth(1) {
        Some(path) => PinDatabase::build(&FrequencyTable::read_csv(path)?)?,
        None => PinDatabase::build(&|pin: &str| -> u64 {
            match pin {
                "1254" => 1_000,
                "2365" => 500,
                _ => 1,
            }
        })?,
    };

    let mut pipeline = calibrated(settings)?;
    let capture = pipeline.capture(gesture(
        &[DirectionClass::Right, DirectionClass::Down, DirectionClass::Left],
        0.5,
    ));
    println!(
        "Captured {} samples, {} after compression, peaks at {:?}",
        capture.len(),
        capture.compressed.len(),
        pipeline.peaks(&capture.compressed)
    );

    let Some(recognition) = pipeline.recognise(&capture.compressed, &classifier, &database)? else {
        println!("No PIN entry found");
        return Ok(());
    };

    let [first, second, third] = recognition.directions;
    println!("Transitions: {first} {second} {third}");

    // Rough hand travel over the segment, for orientation only
    let compressed_rate = settings.filter.sample_rate / settings.quantizer.slide as f64;
    let trajectory = integrate_displacement(&recognition.segment.values, compressed_rate);
    let travel = trajectory.final_displacement();
    println!("Net displacement: ({:.3}, {:.3}, {:.3})", travel.x, travel.y, travel.z);

    println!("Top candidates:");
    for pin in recognition.candidates.iter().take(10) {
        println!("  {pin}");
    }

    let mut rng = rand::rng();
    if let Some(pin) = database.generate_frequency_pin(&mut rng) {
        println!("A PIN drawn by popularity: {pin}");
    }

    Ok(())
}
