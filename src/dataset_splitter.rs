/// Train/holdout split for evaluating a training run
///
/// - Train set: fit the vectorizer and forest
/// - Holdout set: measure accuracy on unseen mail
///
/// Supports stratified splitting so both classes keep their proportions
use crate::traits::{CanonicalRecord, Label};
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: Vec<CanonicalRecord>,
    pub holdout: Vec<CanonicalRecord>,
}

impl DatasetSplit {
    /// Get statistics about the split
    pub fn stats(&self) -> SplitStats {
        let count = |records: &[CanonicalRecord], label: Label| {
            records.iter().filter(|r| r.label == label).count()
        };

        SplitStats {
            train_size: self.train.len(),
            holdout_size: self.holdout.len(),
            train_phishing: count(&self.train, Label::Phishing),
            holdout_phishing: count(&self.holdout, Label::Phishing),
        }
    }
}

#[derive(Debug)]
pub struct SplitStats {
    pub train_size: usize,
    pub holdout_size: usize,
    pub train_phishing: usize,
    pub holdout_phishing: usize,
}

impl SplitStats {
    pub fn total_size(&self) -> usize {
        self.train_size + self.holdout_size
    }

    pub fn holdout_ratio(&self) -> f64 {
        self.holdout_size as f64 / self.total_size().max(1) as f64
    }
}

/// Configuration for dataset splitting
#[derive(Debug, Clone)]
pub struct SplitConfig {
    /// Fraction of records held out for evaluation (0.0 to 1.0)
    pub holdout_ratio: f64,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Keep the class balance identical in both sets
    pub stratified: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            holdout_ratio: 0.2,
            seed: 42,
            stratified: true,
        }
    }
}

/// Split a corpus into train and holdout sets
pub fn split_dataset(records: Vec<CanonicalRecord>, config: &SplitConfig) -> DatasetSplit {
    let ratio = config.holdout_ratio.clamp(0.0, 1.0);
    let mut rng = rand::rngs::StdRng::seed_from_u64(config.seed);

    let groups: Vec<Vec<CanonicalRecord>> = if config.stratified {
        let (phishing, legitimate): (Vec<_>, Vec<_>) = records
            .into_iter()
            .partition(|r| r.label == Label::Phishing);
        vec![legitimate, phishing]
    } else {
        vec![records]
    };

    let mut train = Vec::new();
    let mut holdout = Vec::new();

    for mut group in groups {
        group.shuffle(&mut rng);
        let holdout_size = (group.len() as f64 * ratio).round() as usize;
        // Keep at least one record of every class for training
        let holdout_size = holdout_size.min(group.len().saturating_sub(1));
        let train_part = group.split_off(holdout_size);
        holdout.extend(group);
        train.extend(train_part);
    }

    // Mix classes back together
    train.shuffle(&mut rng);
    holdout.shuffle(&mut rng);

    DatasetSplit { train, holdout }
}
