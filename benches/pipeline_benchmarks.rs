use criterion::{Criterion, black_box, criterion_group, criterion_main};
use imu_pin::{
    DirectionClass, DistanceClassifier, Feature, KnnClassifier, OrientationEstimator, PinDatabase, compress,
    discretize, find_peaks, madgwick_update, resample,
};
use nalgebra::{UnitQuaternion, Vector3};
use rand::prelude::*;
use rand_pcg::Pcg64;
use std::f64::consts::PI;

// Pre-generated wrist motion so RNG cost stays out of the measurements
fn generate_motion(count: usize, seed: u64) -> Vec<(Vector3<f64>, Vector3<f64>)> {
    let mut rng = Pcg64::seed_from_u64(seed);

    (0..count)
        .map(|i| {
            let phase = i as f64 * 0.01 * 2.0 * PI;

            let gyroscope = Vector3::new(
                0.2 * phase.sin() + rng.random_range(-0.01..0.01),
                0.2 * (phase * 1.3).cos() + rng.random_range(-0.01..0.01),
                0.2 * (phase * 0.7).sin() + rng.random_range(-0.01..0.01),
            );
            let accelerometer = Vector3::new(
                -0.1 * phase.sin() + rng.random_range(-0.002..0.002),
                0.1 * phase.cos() + rng.random_range(-0.002..0.002),
                1.0 + rng.random_range(-0.002..0.002),
            );
            (gyroscope, accelerometer)
        })
        .collect()
}

fn random_series(count: usize, seed: u64) -> Vec<Vector3<f64>> {
    let mut rng = Pcg64::seed_from_u64(seed);
    (0..count)
        .map(|_| Vector3::from_fn(|_, _| rng.random_range(-1.0..1.0)))
        .collect()
}

fn random_feature(rng: &mut Pcg64) -> Feature {
    Feature::new((0..20).map(|_| Vector3::from_fn(|_, _| rng.random_range(-1.0..1.0))).collect())
}

fn bench_madgwick_update(c: &mut Criterion) {
    let quaternion = UnitQuaternion::identity();
    let gyroscope = Vector3::new(0.1, -0.2, 0.05);
    let accelerometer = Vector3::new(0.01, -0.02, 1.0);

    c.bench_function("madgwick_update", |b| {
        b.iter(|| {
            madgwick_update(
                black_box(&quaternion),
                black_box(gyroscope),
                black_box(accelerometer),
                black_box(0.1),
                black_box(0.01),
            )
        })
    });
}

fn bench_estimator_batch(c: &mut Criterion) {
    let motion = generate_motion(1_000, 42);

    c.bench_function("estimator_1000_updates", |b| {
        b.iter(|| {
            let mut estimator = OrientationEstimator::new();
            for &(gyroscope, accelerometer) in &motion {
                estimator.update(black_box(gyroscope), black_box(accelerometer));
            }
            black_box(estimator.linear_acceleration())
        })
    });
}

fn bench_compress(c: &mut Criterion) {
    let series = random_series(3_000, 1);

    c.bench_function("compress_3000", |b| {
        b.iter(|| black_box(compress(black_box(&series), 5, 3)))
    });

    let compressed = compress(&series, 5, 3);
    c.bench_function("discretize_1000", |b| {
        b.iter(|| black_box(discretize(black_box(&compressed))))
    });
}

fn bench_find_peaks(c: &mut Criterion) {
    let mut rng = Pcg64::seed_from_u64(2);
    let values: Vec<f64> = (0..1_000)
        .map(|i| (i as f64 * 0.2).sin() + rng.random_range(-0.1..0.1))
        .collect();

    c.bench_function("find_peaks_1000", |b| {
        b.iter(|| black_box(find_peaks(black_box(&values), 0.25, 10)))
    });
}

fn bench_resample(c: &mut Criterion) {
    let series = random_series(37, 3);

    c.bench_function("resample_37_to_20", |b| {
        b.iter(|| black_box(resample(black_box(&series), 20)))
    });
}

fn bench_knn_classify(c: &mut Criterion) {
    let mut rng = Pcg64::seed_from_u64(4);
    let corpus: Vec<_> = DirectionClass::ALL
        .iter()
        .flat_map(|&class| (0..20).map(move |_| class))
        .map(|class| (class, random_feature(&mut rng)))
        .collect();
    let classifier = KnnClassifier::new(corpus).unwrap();
    let query = random_feature(&mut rng);

    c.bench_function("knn_classify_180", |b| {
        b.iter(|| black_box(classifier.classify_one(black_box(&query), 5)))
    });
}

fn bench_database(c: &mut Criterion) {
    let frequency = |pin: &str| -> u64 { pin.bytes().map(|b| u64::from(b - b'0')).sum() };

    c.bench_function("pin_database_build", |b| {
        b.iter(|| black_box(PinDatabase::build(&frequency)))
    });

    let database = PinDatabase::build(&frequency).unwrap();
    let directions = [DirectionClass::Right, DirectionClass::Down, DirectionClass::Left];
    c.bench_function("pin_database_match", |b| {
        b.iter(|| black_box(database.get_matching_pins(black_box(&directions))))
    });
}

criterion_group!(
    benches,
    bench_madgwick_update,
    bench_estimator_batch,
    bench_compress,
    bench_find_peaks,
    bench_resample,
    bench_knn_classify,
    bench_database
);

criterion_main!(benches);
