/// TF-IDF text vectorizer
///
/// Fit once on the training corpus, then reused verbatim at inference time.
/// Output vectors are sparse `(column, weight)` pairs sorted by column and
/// L2-normalized.
use crate::error::{DetectorError, Result};
use crate::stop_words::is_stop_word;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Sparse feature vector: `(column, weight)` sorted by column
pub type SparseVector = Vec<(usize, f64)>;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Upper bound on vocabulary size
    pub max_features: usize,
    pub remove_stop_words: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 5_000,
            remove_stop_words: true,
        }
    }
}

impl VectorizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features.max(1);
        self
    }

    pub fn with_stop_words(mut self, enabled: bool) -> Self {
        self.remove_stop_words = enabled;
        self
    }
}

/// Lower-case the text and split it into vocabulary candidates
pub fn tokenize(text: &str, config: &VectorizerConfig) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| !config.remove_stop_words || !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocabulary: FxHashMap<String, usize>,
    idf: Vec<f64>,
}

/// Corpus-wide (term frequency, document frequency) per token
type TermStats = FxHashMap<String, (usize, usize)>;

fn merge_stats(mut into: TermStats, from: TermStats) -> TermStats {
    for (term, (tf, df)) in from {
        let entry = into.entry(term).or_insert((0, 0));
        entry.0 += tf;
        entry.1 += df;
    }
    into
}

impl TfidfVectorizer {
    /// Build the vocabulary and IDF weights from a corpus
    pub fn fit<S: AsRef<str> + Sync>(texts: &[S], config: VectorizerConfig) -> Result<Self> {
        if texts.is_empty() {
            return Err(DetectorError::configuration(
                "Cannot fit vectorizer on an empty corpus",
            ));
        }

        let stats = texts
            .par_iter()
            .fold(TermStats::default, |mut acc, text| {
                let mut doc_counts: FxHashMap<String, usize> = FxHashMap::default();
                for token in tokenize(text.as_ref(), &config) {
                    *doc_counts.entry(token).or_insert(0) += 1;
                }
                for (term, count) in doc_counts {
                    let entry = acc.entry(term).or_insert((0, 0));
                    entry.0 += count;
                    entry.1 += 1;
                }
                acc
            })
            .reduce(TermStats::default, merge_stats);

        if stats.is_empty() {
            return Err(DetectorError::configuration(
                "Corpus produced an empty vocabulary (only stop words or single characters)",
            ));
        }

        // Most frequent terms first, ties alphabetical
        let mut ranked: Vec<(String, usize, usize)> =
            stats.into_iter().map(|(t, (tf, df))| (t, tf, df)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(config.max_features);

        // Columns are assigned alphabetically
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let n_docs = texts.len() as f64;
        let mut vocabulary = FxHashMap::default();
        let mut idf = Vec::with_capacity(ranked.len());
        for (column, (term, _, df)) in ranked.into_iter().enumerate() {
            idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, column);
        }

        tracing::debug!("Fitted TF-IDF vocabulary with {} terms", idf.len());

        Ok(Self {
            config,
            vocabulary,
            idf,
        })
    }

    /// Vectorize one text. Out-of-vocabulary terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: FxHashMap<usize, usize> = FxHashMap::default();
        for token in tokenize(text, &self.config) {
            if let Some(&column) = self.vocabulary.get(&token) {
                *counts.entry(column).or_insert(0) += 1;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(column, count)| (column, count as f64 * self.idf[column]))
            .collect();
        vector.sort_unstable_by_key(|&(column, _)| column);

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in vector.iter_mut() {
                *w /= norm;
            }
        }
        vector
    }

    pub fn transform_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<SparseVector> {
        texts.par_iter().map(|t| self.transform(t.as_ref())).collect()
    }

    /// Number of columns produced by `transform`
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn column_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, column: usize) -> Option<f64> {
        self.idf.get(column).copied()
    }

    /// Reject deserialized vectorizers whose vocabulary does not map one to
    /// one onto the IDF columns
    pub fn validate(&self) -> Result<()> {
        if self.vocabulary.len() != self.idf.len() {
            return Err(DetectorError::invalid_model(format!(
                "vectorizer has {} terms but {} IDF weights",
                self.vocabulary.len(),
                self.idf.len()
            )));
        }
        let mut seen = vec![false; self.idf.len()];
        for (term, &column) in &self.vocabulary {
            match seen.get_mut(column) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(DetectorError::invalid_model(format!(
                        "vectorizer column {} is assigned to more than one term",
                        column
                    )))
                }
                None => {
                    return Err(DetectorError::invalid_model(format!(
                        "term {:?} maps to column {} but only {} IDF weights exist",
                        term,
                        column,
                        self.idf.len()
                    )))
                }
            }
        }
        if let Some(column) = self.idf.iter().position(|w| !w.is_finite() || *w <= 0.0) {
            return Err(DetectorError::invalid_model(format!(
                "IDF weight for column {} is not a positive finite number",
                column
            )));
        }
        Ok(())
    }
}
