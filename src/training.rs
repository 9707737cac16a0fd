/// End-to-end training run: corpus → vectorizer → forest → artifacts
use crate::dataset_splitter::{split_dataset, SplitConfig};
use crate::detector::PhishingDetector;
use crate::error::Result;
use crate::model_store::{self, ModelPaths};
use crate::random_forest::{RandomForest, RandomForestConfig};
use crate::traits::{CanonicalRecord, DatasetLoader, Label};
use crate::vectorizer::{TfidfVectorizer, VectorizerConfig};
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub vectorizer: VectorizerConfig,
    pub forest: RandomForestConfig,
    /// Fraction of the corpus held out for evaluation; 0.0 trains on all of it
    pub holdout_ratio: f64,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            vectorizer: VectorizerConfig::default(),
            forest: RandomForestConfig::default(),
            holdout_ratio: 0.0,
        }
    }
}

/// Confusion counts with Phishing as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl Evaluation {
    pub fn record(&mut self, expected: Label, predicted: Label) {
        match (expected, predicted) {
            (Label::Phishing, Label::Phishing) => self.true_positives += 1,
            (Label::Legitimate, Label::Phishing) => self.false_positives += 1,
            (Label::Legitimate, Label::Legitimate) => self.true_negatives += 1,
            (Label::Phishing, Label::Legitimate) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    pub fn print(&self) {
        println!("\n{}", "=".repeat(50));
        println!("🎯 Holdout Evaluation ({} emails)", self.total());
        println!("{}", "=".repeat(50));
        println!("   Accuracy:   {:>8.2}%", self.accuracy() * 100.0);
        println!("   Precision:  {:>8.2}%", self.precision() * 100.0);
        println!("   Recall:     {:>8.2}%", self.recall() * 100.0);
        println!("   F1 score:   {:>8.4}", self.f1());
        println!();
        println!("   True positives:  {:>8}", self.true_positives);
        println!("   False positives: {:>8}", self.false_positives);
        println!("   True negatives:  {:>8}", self.true_negatives);
        println!("   False negatives: {:>8}", self.false_negatives);
        println!("{}", "=".repeat(50));
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

pub fn evaluate(detector: &PhishingDetector, records: &[CanonicalRecord]) -> Result<Evaluation> {
    let mut evaluation = Evaluation::default();
    for record in records {
        let prediction = detector.predict(&record.text)?;
        evaluation.record(record.label, prediction.label);
    }
    Ok(evaluation)
}

#[derive(Debug)]
pub struct TrainingReport {
    pub records: usize,
    pub train_records: usize,
    pub vocabulary_size: usize,
    pub trees: usize,
    pub evaluation: Option<Evaluation>,
    pub elapsed_secs: f64,
}

/// Fit a detector on an in-memory corpus
pub fn fit_detector(
    records: &[CanonicalRecord],
    options: &TrainingOptions,
) -> Result<PhishingDetector> {
    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
    let labels: Vec<Label> = records.iter().map(|r| r.label).collect();

    let start = Instant::now();
    let vectorizer = TfidfVectorizer::fit(&texts, options.vectorizer.clone())?;
    let vectors = vectorizer.transform_batch(&texts);
    info!(
        "Vectorized {} emails into {} features in {:?}",
        vectors.len(),
        vectorizer.vocabulary_size(),
        start.elapsed()
    );

    let start = Instant::now();
    let forest = RandomForest::fit(&vectors, &labels, vectorizer.vocabulary_size(), &options.forest)?;
    info!("Trained {} trees in {:?}", forest.tree_count(), start.elapsed());

    PhishingDetector::new(vectorizer, forest)
}

/// Load, fit, optionally evaluate, and save. Nothing is fit or written when
/// loading fails.
pub fn train(
    dataset: &impl DatasetLoader,
    options: &TrainingOptions,
    paths: &ModelPaths,
) -> Result<TrainingReport> {
    let start = Instant::now();

    info!("📝 Loading dataset {}...", dataset.name());
    let records = dataset.load_records()?;
    let total = records.len();
    let phishing = records.iter().filter(|r| r.label == Label::Phishing).count();
    info!(
        "   ✓ {} emails ({} phishing, {} legitimate)",
        total,
        phishing,
        total - phishing
    );

    let (train_set, holdout) = if options.holdout_ratio > 0.0 {
        let split = split_dataset(
            records,
            &SplitConfig {
                holdout_ratio: options.holdout_ratio,
                seed: options.forest.seed,
                stratified: true,
            },
        );
        let stats = split.stats();
        info!(
            "   ✓ Holding out {} emails for evaluation ({:.1}% of {})",
            stats.holdout_size,
            stats.holdout_ratio() * 100.0,
            stats.total_size()
        );
        (split.train, split.holdout)
    } else {
        (records, Vec::new())
    };

    let detector = fit_detector(&train_set, options)?;

    let evaluation = if holdout.is_empty() {
        None
    } else {
        Some(evaluate(&detector, &holdout)?)
    };

    model_store::save(&detector, paths)?;

    Ok(TrainingReport {
        records: total,
        train_records: train_set.len(),
        vocabulary_size: detector.vectorizer().vocabulary_size(),
        trees: detector.forest().tree_count(),
        evaluation,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}
