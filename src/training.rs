//! Labeled training features
//!
//! Each direction class owns an append-only list of features. The only
//! mutations are appending a feature and removing the most recent one, which
//! is how a mistaken recording is undone.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::direction::DirectionClass;
use crate::error::{Error, Result};
use crate::features::Feature;

/// Persisted labeled features, keyed by direction class
pub trait TrainingStore {
    /// Every feature stored for `class`, oldest first
    fn load_class(&self, class: DirectionClass) -> Result<Vec<Feature>>;

    /// Append a feature to the list of `class`
    ///
    /// Fails with [`Error::FeatureSizeMismatch`] when the feature does not have
    /// the dimension of the features already stored.
    fn add_training_feature(&mut self, feature: Feature, class: DirectionClass) -> Result<()>;

    /// Remove and return the most recent feature of `class`
    ///
    /// Fails with [`Error::EmptyStore`] when the class holds nothing.
    fn delete_last_training_feature(&mut self, class: DirectionClass) -> Result<Feature>;

    /// The whole corpus, class by class in [`DirectionClass::ALL`] order
    fn load_all(&self) -> Result<Vec<(DirectionClass, Feature)>> {
        let mut corpus = Vec::new();
        for class in DirectionClass::ALL {
            corpus.extend(self.load_class(class)?.into_iter().map(|feature| (class, feature)));
        }
        Ok(corpus)
    }

    /// Dimension of the stored features, `None` while the store is empty
    fn dimension(&self) -> Result<Option<usize>> {
        for class in DirectionClass::ALL {
            if let Some(feature) = self.load_class(class)?.first() {
                return Ok(Some(feature.dimension()));
            }
        }
        Ok(None)
    }
}

fn check_dimension(expected: Option<usize>, feature: &Feature) -> Result<()> {
    match expected {
        Some(expected) if expected != feature.dimension() => Err(Error::FeatureSizeMismatch {
            expected,
            found: feature.dimension(),
        }),
        _ => Ok(()),
    }
}

/// Training store held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTrainingStore {
    classes: BTreeMap<DirectionClass, Vec<Feature>>,
}

impl MemoryTrainingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of features across all classes
    pub fn len(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TrainingStore for MemoryTrainingStore {
    fn load_class(&self, class: DirectionClass) -> Result<Vec<Feature>> {
        Ok(self.classes.get(&class).cloned().unwrap_or_default())
    }

    fn add_training_feature(&mut self, feature: Feature, class: DirectionClass) -> Result<()> {
        check_dimension(self.dimension()?, &feature)?;
        self.classes.entry(class).or_default().push(feature);
        Ok(())
    }

    fn delete_last_training_feature(&mut self, class: DirectionClass) -> Result<Feature> {
        self.classes
            .get_mut(&class)
            .and_then(Vec::pop)
            .ok_or(Error::EmptyStore { class })
    }
}

/// Training store backed by a directory of JSON files
///
/// Class `RD` lives in `<root>/RD.json` as a JSON array of flattened
/// features. A missing file is an empty class. Every mutation rewrites the
/// class file through a temporary file and a rename, so a crash leaves either
/// the old or the new list on disk.
#[derive(Debug, Clone)]
pub struct DirTrainingStore {
    root: PathBuf,
}

impl DirTrainingStore {
    /// Open (creating if needed) the store rooted at `root`
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        info!("training store opened at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn class_path(&self, class: DirectionClass) -> PathBuf {
        self.root.join(format!("{}.json", class.label()))
    }

    fn write_class(&self, class: DirectionClass, features: &[Feature]) -> Result<()> {
        let path = self.class_path(class);
        let tmp = self.root.join(format!(".{}.json.tmp", class.label()));

        fs::write(&tmp, serde_json::to_vec(features)?)?;
        fs::rename(&tmp, &path)?;

        info!("wrote {} features for class {} to {}", features.len(), class, path.display());
        Ok(())
    }
}

impl TrainingStore for DirTrainingStore {
    fn load_class(&self, class: DirectionClass) -> Result<Vec<Feature>> {
        let path = self.class_path(class);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let features: Vec<Feature> = serde_json::from_slice(&bytes)?;
        debug!("loaded {} features for class {}", features.len(), class);
        Ok(features)
    }

    fn add_training_feature(&mut self, feature: Feature, class: DirectionClass) -> Result<()> {
        check_dimension(self.dimension()?, &feature)?;
        let mut features = self.load_class(class)?;
        features.push(feature);
        self.write_class(class, &features)
    }

    fn delete_last_training_feature(&mut self, class: DirectionClass) -> Result<Feature> {
        let mut features = self.load_class(class)?;
        let removed = features.pop().ok_or(Error::EmptyStore { class })?;
        self.write_class(class, &features)?;
        Ok(removed)
    }
}
