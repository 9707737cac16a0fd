/// A fitted vectorizer and forest, always used together
use crate::error::{DetectorError, Result};
use crate::random_forest::RandomForest;
use crate::traits::Label;
use crate::vectorizer::TfidfVectorizer;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    /// `[p(Legitimate), p(Phishing)]`
    pub probabilities: [f64; 2],
}

/// Round a probability to a percentage with two decimals
pub fn to_percent(probability: f64) -> f64 {
    (probability * 10_000.0).round() / 100.0
}

impl Prediction {
    pub fn is_phishing(&self) -> bool {
        self.label == Label::Phishing
    }

    /// Probability of the predicted class, as a percentage
    pub fn confidence(&self) -> f64 {
        to_percent(self.probabilities[self.label.index()])
    }

    /// Probability of phishing regardless of the verdict, as a percentage
    pub fn phishing_probability(&self) -> f64 {
        to_percent(self.probabilities[Label::Phishing.index()])
    }
}

#[derive(Debug, Clone)]
pub struct PhishingDetector {
    vectorizer: TfidfVectorizer,
    forest: RandomForest,
}

impl PhishingDetector {
    /// Pair a vectorizer with a forest, checking each is well formed and
    /// that their dimensions agree
    pub fn new(vectorizer: TfidfVectorizer, forest: RandomForest) -> Result<Self> {
        vectorizer.validate()?;
        forest.validate()?;
        if vectorizer.vocabulary_size() != forest.n_features() {
            return Err(DetectorError::ArtifactMismatch {
                classifier_features: forest.n_features(),
                vectorizer_features: vectorizer.vocabulary_size(),
            });
        }
        Ok(Self { vectorizer, forest })
    }

    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let features = self.vectorizer.transform(text);
        let probabilities = self.forest.predict_proba(&features)?;
        Ok(Prediction {
            label: RandomForest::vote(probabilities),
            probabilities,
        })
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }
}
