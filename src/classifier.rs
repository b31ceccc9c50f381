//! Direction classification by nearest neighbours
//!
//! Any classifier that picks a direction for a feature from labeled training
//! data can sit behind [`DistanceClassifier`]. [`KnnClassifier`] is the
//! brute-force k-nearest-neighbour implementation over flattened features.

use std::collections::BTreeMap;

use log::debug;

use crate::direction::DirectionClass;
use crate::error::{Error, Result};
use crate::features::Feature;
use crate::training::TrainingStore;

/// Classifier mapping transition features to direction classes
pub trait DistanceClassifier {
    /// Class of a single feature, decided by its `k` nearest training features
    fn classify_one(&self, feature: &Feature, k: usize) -> Result<DirectionClass>;

    /// Classes of the three transitions of a PIN gesture
    ///
    /// The queries are independent of each other.
    fn classify(&self, features: &[Feature; 3], k: usize) -> Result<[DirectionClass; 3]> {
        let [first, second, third] = features;
        Ok([
            self.classify_one(first, k)?,
            self.classify_one(second, k)?,
            self.classify_one(third, k)?,
        ])
    }
}

/// One training feature ranked against a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbour {
    pub class: DirectionClass,
    pub distance: f64,
    /// Position of the feature in the training corpus
    pub index: usize,
}

/// Brute-force k-nearest-neighbour classifier
///
/// Neighbours are ranked by Euclidean distance, ties by corpus position. The
/// majority class among the `k` nearest wins; when classes tie on votes the
/// one whose closest member ranks first wins.
///
/// # Example
/// ```
/// use imu_pin::{DirectionClass, DistanceClassifier, Feature, KnnClassifier};
/// use nalgebra::Vector3;
///
/// let left = Feature::new(vec![Vector3::new(-1.0, 0.0, 0.0); 4]);
/// let right = Feature::new(vec![Vector3::new(1.0, 0.0, 0.0); 4]);
/// let classifier = KnnClassifier::new(vec![
///     (DirectionClass::Left, left),
///     (DirectionClass::Right, right),
/// ])
/// .unwrap();
///
/// let query = Feature::new(vec![Vector3::new(0.8, 0.1, 0.0); 4]);
/// assert_eq!(classifier.classify_one(&query, 1).unwrap(), DirectionClass::Right);
/// ```
#[derive(Debug, Clone, Default)]
pub struct KnnClassifier {
    labels: Vec<DirectionClass>,
    vectors: Vec<Vec<f64>>,
}

impl KnnClassifier {
    /// Build from labeled features, which must all share one dimension
    pub fn new(corpus: Vec<(DirectionClass, Feature)>) -> Result<Self> {
        let mut labels = Vec::with_capacity(corpus.len());
        let mut vectors: Vec<Vec<f64>> = Vec::with_capacity(corpus.len());

        for (class, feature) in corpus {
            let vector = feature.flatten();
            if let Some(first) = vectors.first() {
                if first.len() != vector.len() {
                    return Err(Error::FeatureSizeMismatch {
                        expected: first.len(),
                        found: vector.len(),
                    });
                }
            }
            labels.push(class);
            vectors.push(vector);
        }

        Ok(Self { labels, vectors })
    }

    /// Snapshot of everything in `store`
    pub fn from_store(store: &impl TrainingStore) -> Result<Self> {
        Self::new(store.load_all()?)
    }

    /// Number of training features
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The `k` training features closest to `feature`, nearest first
    pub fn nearest(&self, feature: &Feature, k: usize) -> Result<Vec<Neighbour>> {
        if k == 0 {
            return Err(Error::InvalidSettings("k must be at least 1".to_string()));
        }
        if self.vectors.is_empty() {
            return Err(Error::NoTrainingData);
        }
        if k > self.vectors.len() {
            return Err(Error::InsufficientTrainingData {
                required: k,
                available: self.vectors.len(),
            });
        }

        let query = feature.flatten();
        let expected = self.vectors[0].len();
        if query.len() != expected {
            return Err(Error::FeatureSizeMismatch {
                expected,
                found: query.len(),
            });
        }

        let mut ranked: Vec<Neighbour> = self
            .vectors
            .iter()
            .zip(&self.labels)
            .enumerate()
            .map(|(index, (vector, &class))| Neighbour {
                class,
                distance: euclidean_distance(&query, vector),
                index,
            })
            .collect();

        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.index.cmp(&b.index)));
        ranked.truncate(k);
        Ok(ranked)
    }
}

impl DistanceClassifier for KnnClassifier {
    fn classify_one(&self, feature: &Feature, k: usize) -> Result<DirectionClass> {
        let neighbours = self.nearest(feature, k)?;

        let mut votes: BTreeMap<DirectionClass, usize> = BTreeMap::new();
        for neighbour in &neighbours {
            *votes.entry(neighbour.class).or_default() += 1;
        }
        let most = votes.values().copied().max().unwrap_or(0);

        // Walking neighbours nearest first resolves vote ties by rank
        let winner = neighbours
            .iter()
            .map(|neighbour| neighbour.class)
            .find(|class| votes.get(class) == Some(&most))
            .ok_or(Error::NoTrainingData)?;

        debug!("votes {:?} -> {}", votes, winner);
        Ok(winner)
    }
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::MemoryTrainingStore;
    use nalgebra::Vector3;

    fn feature(x: f64, y: f64) -> Feature {
        Feature::new(vec![Vector3::new(x, y, 0.0); 3])
    }

    fn clusters() -> KnnClassifier {
        KnnClassifier::new(vec![
            (DirectionClass::Left, feature(-1.0, 0.0)),
            (DirectionClass::Left, feature(-1.1, 0.1)),
            (DirectionClass::Left, feature(-0.9, -0.1)),
            (DirectionClass::Up, feature(0.0, 1.0)),
            (DirectionClass::Up, feature(0.1, 1.1)),
            (DirectionClass::Up, feature(-0.1, 0.9)),
        ])
        .unwrap()
    }

    #[test]
    fn test_majority_vote() {
        let classifier = clusters();
        assert_eq!(classifier.classify_one(&feature(-0.8, 0.2), 3).unwrap(), DirectionClass::Left);
        assert_eq!(classifier.classify_one(&feature(0.2, 0.8), 5).unwrap(), DirectionClass::Up);
    }

    #[test]
    fn test_classify_three_transitions() {
        let classifier = clusters();
        let query = [feature(-1.0, 0.0), feature(0.0, 1.0), feature(-1.0, 0.05)];
        assert_eq!(
            classifier.classify(&query, 3).unwrap(),
            [DirectionClass::Left, DirectionClass::Up, DirectionClass::Left]
        );
    }

    #[test]
    fn test_vote_tie_goes_to_nearest() {
        let classifier = KnnClassifier::new(vec![
            (DirectionClass::Left, feature(-1.0, 0.0)),
            (DirectionClass::Right, feature(1.0, 0.0)),
        ])
        .unwrap();

        assert_eq!(classifier.classify_one(&feature(0.3, 0.0), 2).unwrap(), DirectionClass::Right);
        assert_eq!(classifier.classify_one(&feature(-0.3, 0.0), 2).unwrap(), DirectionClass::Left);
        // Equidistant: corpus order decides
        assert_eq!(classifier.classify_one(&feature(0.0, 0.0), 2).unwrap(), DirectionClass::Left);
    }

    #[test]
    fn test_neighbours_sorted() {
        let neighbours = clusters().nearest(&feature(-1.0, 0.0), 6).unwrap();
        assert_eq!(neighbours.len(), 6);
        assert_eq!(neighbours[0].index, 0);
        assert_eq!(neighbours[0].distance, 0.0);
        assert!(neighbours.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_error_conditions() {
        let empty = KnnClassifier::default();
        assert!(matches!(empty.classify_one(&feature(0.0, 0.0), 5), Err(Error::NoTrainingData)));

        let classifier = clusters();
        assert!(matches!(
            classifier.classify_one(&feature(0.0, 0.0), 7),
            Err(Error::InsufficientTrainingData { required: 7, available: 6 })
        ));
        assert!(matches!(
            classifier.classify_one(&feature(0.0, 0.0), 0),
            Err(Error::InvalidSettings(_))
        ));

        let wrong = Feature::new(vec![Vector3::zeros(); 4]);
        assert!(matches!(
            classifier.classify_one(&wrong, 1),
            Err(Error::FeatureSizeMismatch { expected: 9, found: 12 })
        ));
    }

    #[test]
    fn test_from_store() {
        let mut store = MemoryTrainingStore::new();
        store.add_training_feature(feature(1.0, 0.0), DirectionClass::Right).unwrap();
        store.add_training_feature(feature(0.0, -1.0), DirectionClass::Down).unwrap();

        let classifier = KnnClassifier::from_store(&store).unwrap();
        assert_eq!(classifier.len(), 2);
        assert_eq!(classifier.classify_one(&feature(0.1, -0.8), 1).unwrap(), DirectionClass::Down);
    }
}
