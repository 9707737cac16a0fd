/// Random Forest classifier: bootstrap-aggregated CART trees
///
/// Trees are trained in parallel with rayon. Each tree draws its bootstrap
/// sample and feature subsets from its own `StdRng`, seeded from the forest
/// seed and the tree's position, so a fit is reproducible regardless of
/// thread scheduling.
use crate::decision_tree::{DecisionTree, DecisionTreeConfig};
use crate::error::{DetectorError, Result};
use crate::traits::Label;
use crate::vectorizer::SparseVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    Sqrt,
    Log2,
    All,
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestConfig {
    pub n_trees: usize,
    pub max_features: MaxFeatures,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

impl RandomForestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Per-tree RNG seed. The index is spread across the word so that
/// neighbouring forest seeds do not share trees.
fn tree_seed(seed: u64, tree_index: usize) -> u64 {
    seed ^ (tree_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(
        vectors: &[SparseVector],
        labels: &[Label],
        n_features: usize,
        config: &RandomForestConfig,
    ) -> Result<Self> {
        if vectors.is_empty() {
            return Err(DetectorError::configuration(
                "Cannot fit a forest on zero samples",
            ));
        }
        if vectors.len() != labels.len() {
            return Err(DetectorError::configuration(format!(
                "Feature/label count mismatch: {} vs {}",
                vectors.len(),
                labels.len()
            )));
        }
        if let Some(v) = vectors
            .iter()
            .find(|v| v.iter().any(|&(column, _)| column >= n_features))
        {
            return Err(DetectorError::configuration(format!(
                "Training vector references a column outside 0..{}: {:?}",
                n_features,
                v.last()
            )));
        }

        let tree_config = DecisionTreeConfig {
            max_features: config.max_features.resolve(n_features),
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
        };
        let n_samples = vectors.len();

        let trees: Vec<DecisionTree> = (0..config.n_trees.max(1))
            .into_par_iter()
            .map(|tree_index| {
                let mut rng = StdRng::seed_from_u64(tree_seed(config.seed, tree_index));
                let bootstrap: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                DecisionTree::fit(vectors, labels, bootstrap, &tree_config, &mut rng)
            })
            .collect();

        tracing::debug!(
            "Trained {} trees on {} samples ({} candidate features per split)",
            trees.len(),
            n_samples,
            tree_config.max_features
        );

        Ok(Self { n_features, trees })
    }

    fn check_vector(&self, vector: &[(usize, f64)]) -> Result<()> {
        match vector.iter().find(|&&(column, _)| column >= self.n_features) {
            Some(&(column, _)) => Err(DetectorError::inference(format!(
                "feature index {} out of range for a model with {} features",
                column, self.n_features
            ))),
            None => Ok(()),
        }
    }

    /// Fraction of trees voting for each class, indexed by `Label::index`
    pub fn predict_proba(&self, vector: &[(usize, f64)]) -> Result<[f64; 2]> {
        self.check_vector(vector)?;

        let mut votes = [0usize; 2];
        for tree in &self.trees {
            votes[tree.predict(vector).index()] += 1;
        }
        let total = self.trees.len() as f64;
        let p1 = votes[1] as f64 / total;
        Ok([1.0 - p1, p1])
    }

    /// Majority vote; an even split goes to Legitimate
    pub fn predict(&self, vector: &[(usize, f64)]) -> Result<Label> {
        Ok(Self::vote(self.predict_proba(vector)?))
    }

    /// Label implied by `predict_proba` output
    pub fn vote(probabilities: [f64; 2]) -> Label {
        if probabilities[1] > probabilities[0] {
            Label::Phishing
        } else {
            Label::Legitimate
        }
    }

    /// Reject deserialized forests that `fit` could not have produced
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(DetectorError::invalid_model("forest has no trees"));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|msg| DetectorError::invalid_model(format!("tree {}: {}", index, msg)))?;
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (Vec<SparseVector>, Vec<Label>) {
        let mut vectors = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let w = 0.5 + (i as f64) / 100.0;
            vectors.push(vec![(0, w), (3, 0.1)]);
            labels.push(Label::Phishing);
            vectors.push(vec![(1, w), (2, 0.2)]);
            labels.push(Label::Legitimate);
        }
        (vectors, labels)
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(5000), 70);
        assert_eq!(MaxFeatures::Log2.resolve(1024), 10);
        assert_eq!(MaxFeatures::All.resolve(12), 12);
        assert_eq!(MaxFeatures::Fixed(50).resolve(12), 12);
        assert_eq!(MaxFeatures::Sqrt.resolve(0), 1);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (vectors, labels) = data();
        let config = RandomForestConfig::new().with_trees(15);
        let forest = RandomForest::fit(&vectors, &labels, 4, &config).unwrap();

        for v in vectors.iter().chain([vec![], vec![(3, 1.0)]].iter()) {
            let [p0, p1] = forest.predict_proba(v).unwrap();
            assert!((p0 + p1 - 1.0).abs() < 1e-12);
            assert!((0.0..=1.0).contains(&p1));
        }
    }

    #[test]
    fn test_separable_predictions() {
        let (vectors, labels) = data();
        let forest =
            RandomForest::fit(&vectors, &labels, 4, &RandomForestConfig::new().with_trees(25))
                .unwrap();
        assert_eq!(forest.predict(&[(0, 0.6), (3, 0.1)]).unwrap(), Label::Phishing);
        assert_eq!(forest.predict(&[(1, 0.6), (2, 0.2)]).unwrap(), Label::Legitimate);
        assert_eq!(forest.tree_count(), 25);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (vectors, labels) = data();
        let config = RandomForestConfig::new().with_trees(10).with_seed(7);
        let a = RandomForest::fit(&vectors, &labels, 4, &config).unwrap();
        let b = RandomForest::fit(&vectors, &labels, 4, &config).unwrap();
        let sample = vec![(0, 0.3), (1, 0.3), (2, 0.1)];
        assert_eq!(a.predict_proba(&sample).unwrap(), b.predict_proba(&sample).unwrap());
        assert_eq!(
            bincode::serialize(&a).unwrap(),
            bincode::serialize(&b).unwrap()
        );
    }

    #[test]
    fn test_tree_seeds_do_not_overlap_across_forest_seeds() {
        assert_eq!(tree_seed(42, 0), 42);
        assert_ne!(tree_seed(42, 1), tree_seed(43, 0));
        assert_ne!(tree_seed(42, 2), tree_seed(44, 0));
    }

    #[test]
    fn test_vote_ties_go_to_legitimate() {
        assert_eq!(RandomForest::vote([0.5, 0.5]), Label::Legitimate);
        assert_eq!(RandomForest::vote([0.4, 0.6]), Label::Phishing);
        assert_eq!(RandomForest::vote([0.9, 0.1]), Label::Legitimate);
    }

    #[test]
    fn test_validate() {
        let (vectors, labels) = data();
        let forest =
            RandomForest::fit(&vectors, &labels, 4, &RandomForestConfig::new().with_trees(5))
                .unwrap();
        assert!(forest.validate().is_ok());

        let empty = RandomForest {
            n_features: 4,
            trees: Vec::new(),
        };
        assert!(matches!(empty.validate(), Err(DetectorError::InvalidModel(_))));

        let narrowed = RandomForest {
            n_features: 0,
            trees: forest.trees.clone(),
        };
        assert!(matches!(narrowed.validate(), Err(DetectorError::InvalidModel(_))));
    }

    #[test]
    fn test_rejects_bad_input() {
        let (vectors, labels) = data();
        assert!(RandomForest::fit(&[], &[], 4, &RandomForestConfig::default()).is_err());
        assert!(RandomForest::fit(&vectors, &labels[..3], 4, &RandomForestConfig::default())
            .is_err());
        assert!(RandomForest::fit(&vectors, &labels, 2, &RandomForestConfig::default()).is_err());

        let forest =
            RandomForest::fit(&vectors, &labels, 4, &RandomForestConfig::new().with_trees(3))
                .unwrap();
        assert!(matches!(
            forest.predict(&[(9, 1.0)]),
            Err(DetectorError::Inference(_))
        ));
    }
}
