use approx::assert_relative_eq;
use imu_pin::{
    DirectionClass, Error, Feature, KnnClassifier, OrientationEstimator, PinDatabase, PinRecord, QuaternionExt,
    SegmentationSettings, discretize_value, find_peaks, resample, segment,
};
use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// The attitude stays a unit quaternion whatever the input
#[test]
fn test_quaternion_norm_after_every_update() {
    let mut rng = Pcg64::seed_from_u64(0x5eed);
    let mut estimator = OrientationEstimator::new();

    for _ in 0..5_000 {
        let gyro = Vector3::from_fn(|_, _| rng.random_range(-10.0..10.0));
        // Occasionally drop the accelerometer entirely
        let accel = if rng.random_bool(0.05) {
            Vector3::zeros()
        } else {
            Vector3::from_fn(|_, _| rng.random_range(-4.0..4.0))
        };

        let q = estimator.update(gyro, accel);
        assert!((q.raw_norm() - 1.0).abs() < 1e-9, "norm drifted to {}", q.raw_norm());
    }
}

/// Upsampling then downsampling a smooth monotonic series recovers it
#[test]
fn test_resample_round_trip() {
    let series: Vec<_> = (0..25)
        .map(|i| {
            let t = i as f64 / 24.0;
            Vector3::new(t, 1.0 - 0.5 * t * t, (0.8 * t).sin())
        })
        .collect();

    for n in [20, 50, 100] {
        let resampled = resample(&series, n).unwrap();
        let recovered = resample(&resampled, series.len()).unwrap();
        for (original, back) in series.iter().zip(&recovered) {
            assert_relative_eq!(*original, *back, epsilon = 1e-3);
        }
    }
}

#[test]
fn test_segment_ratio_acceptance() {
    let series = vec![Vector3::zeros(); 16];
    let settings = SegmentationSettings::default();

    assert_eq!(segment(&series, &[0, 3, 7, 10], &settings).len(), 1);
    assert!(segment(&series, &[0, 1, 2, 10], &settings).is_empty());
}

#[test]
fn test_discretization_levels() {
    assert_eq!(discretize_value(2.5), 16);
    assert_eq!(discretize_value(-2.5), -16);
    assert_eq!(discretize_value(0.0), 0);
    assert_eq!(discretize_value(1.5), 13);
    assert_eq!(discretize_value(-1.5), -13);

    // Every level in [-16, 16] is reachable and nothing falls outside it
    let mut seen = std::collections::BTreeSet::new();
    for i in -3000..=3000 {
        let level = discretize_value(i as f64 / 1000.0);
        assert!((-16..=16).contains(&level));
        seen.insert(level);
    }
    assert_eq!(seen.len(), 33);
}

#[test]
fn test_discretization_is_monotonic_and_symmetric() {
    let mut previous = discretize_value(-3.0);
    for i in -300..=300 {
        let x = i as f64 / 100.0;
        let level = discretize_value(x);
        assert!(level >= previous);
        assert_eq!(discretize_value(-x), -level);
        previous = level;
    }
}

#[test]
fn test_matching_pins_keep_frequency_order() {
    // Same transitions (R, D, L), frequencies 50, 30, 10
    let database = PinDatabase::from_records(vec![
        PinRecord::new("1254", 50).unwrap(),
        PinRecord::new("2365", 30).unwrap(),
        PinRecord::new("4587", 10).unwrap(),
    ])
    .unwrap();
    let directions = [DirectionClass::Right, DirectionClass::Down, DirectionClass::Left];
    assert_eq!(database.get_matching_pins(&directions), vec!["1254", "2365", "4587"]);
}

#[test]
fn test_every_pin_in_database() {
    let database = PinDatabase::build(&|pin: &str| pin.bytes().map(|b| u64::from(b - b'0')).sum::<u64>()).unwrap();
    assert_eq!(database.len(), 10_000);
    assert!(database.records().windows(2).all(|w| w[0].frequency >= w[1].frequency));
    assert_eq!(database.records()[0].pin, "9999");
    assert_eq!(database.total_frequency(), 180_000);

    // Each direction triple maps back to PINs that really have it
    let directions = [DirectionClass::Same; 3];
    let same = database.get_matching_pins(&directions);
    assert_eq!(same.len(), 10);
    assert!(same.iter().all(|pin| pin.chars().all(|c| Some(c) == pin.chars().next())));
}

#[test]
fn test_peaks_on_noisy_series() {
    let mut rng = Pcg64::seed_from_u64(42);
    let mut values: Vec<f64> = (0..200).map(|_| rng.random_range(-0.05..0.05)).collect();
    for &p in &[20, 60, 100, 140] {
        values[p] = 1.0;
    }
    assert_eq!(find_peaks(&values, 0.25, 10), vec![20, 60, 100, 140]);
}

#[test]
fn test_classifier_reports_missing_data() {
    let classifier = KnnClassifier::default();
    let query = Feature::new(vec![Vector3::zeros(); 20]);
    assert!(matches!(
        imu_pin::DistanceClassifier::classify(&classifier, &[query.clone(), query.clone(), query], 5),
        Err(Error::NoTrainingData)
    ));
}
