/// CART decision tree over sparse TF-IDF vectors
///
/// Binary classification with Gini impurity. Nodes live in a flat arena and
/// are built with an explicit work stack, so deep trees cannot overflow the
/// call stack.
use crate::traits::Label;
use crate::vectorizer::SparseVector;
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

pub type NodeIndex = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        /// Training samples per class that reached this leaf
        counts: [usize; 2],
    },
    Split {
        feature: usize,
        threshold: f64,
        left: NodeIndex,
        right: NodeIndex,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeConfig {
    /// Candidate features examined per split
    pub max_features: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self {
            max_features: usize::MAX,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

/// Value of `feature` in a sparse vector (zero when absent)
pub fn feature_value(vector: &[(usize, f64)], feature: usize) -> f64 {
    match vector.binary_search_by_key(&feature, |&(column, _)| column) {
        Ok(pos) => vector[pos].1,
        Err(_) => 0.0,
    }
}

fn gini(counts: [usize; 2]) -> f64 {
    let total = (counts[0] + counts[1]) as f64;
    if total == 0.0 {
        return 0.0;
    }
    let p0 = counts[0] as f64 / total;
    let p1 = counts[1] as f64 / total;
    1.0 - p0 * p0 - p1 * p1
}

fn majority(counts: [usize; 2]) -> Label {
    if counts[1] > counts[0] {
        Label::Phishing
    } else {
        Label::Legitimate
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    /// Sum of size-weighted child impurities
    score: f64,
}

struct WorkItem {
    node: NodeIndex,
    samples: Vec<usize>,
    depth: usize,
}

impl DecisionTree {
    /// Fit a tree on the rows of `vectors` named by `sample_indices`.
    ///
    /// Indices may repeat (bootstrap samples); a repeated index counts once
    /// per occurrence.
    pub fn fit<R: Rng>(
        vectors: &[SparseVector],
        labels: &[Label],
        sample_indices: Vec<usize>,
        config: &DecisionTreeConfig,
        rng: &mut R,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { counts: [0, 0] }];
        let mut stack = vec![WorkItem {
            node: 0,
            samples: sample_indices,
            depth: 0,
        }];

        while let Some(item) = stack.pop() {
            let counts = class_counts(labels, &item.samples);
            let total = item.samples.len();

            let is_pure = counts[0] == 0 || counts[1] == 0;
            let too_small = total < config.min_samples_split.max(2);
            let too_deep = config.max_depth.map_or(false, |d| item.depth >= d);
            if is_pure || too_small || too_deep {
                nodes[item.node] = Node::Leaf { counts };
                continue;
            }

            let parent_score = gini(counts) * total as f64;
            let best = best_split(vectors, labels, &item.samples, config.max_features, rng)
                .filter(|split| split.score < parent_score - 1e-12);

            let Some(best) = best else {
                nodes[item.node] = Node::Leaf { counts };
                continue;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = item
                .samples
                .into_iter()
                .partition(|&i| feature_value(&vectors[i], best.feature) <= best.threshold);

            let left = nodes.len();
            nodes.push(Node::Leaf { counts: [0, 0] });
            let right = nodes.len();
            nodes.push(Node::Leaf { counts: [0, 0] });

            nodes[item.node] = Node::Split {
                feature: best.feature,
                threshold: best.threshold,
                left,
                right,
            };

            stack.push(WorkItem {
                node: right,
                samples: right_samples,
                depth: item.depth + 1,
            });
            stack.push(WorkItem {
                node: left,
                samples: left_samples,
                depth: item.depth + 1,
            });
        }

        Self { nodes }
    }

    /// The class this tree votes for
    pub fn predict(&self, vector: &[(usize, f64)]) -> Label {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { counts } => return majority(*counts),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if feature_value(vector, *feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Node::Split { left, right, .. } = &self.nodes[index] {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        max_depth
    }

    /// Check the layout `fit` produces: children are stored after their
    /// parent and inside the arena, and splits only use known features.
    /// A tree passing this check cannot index out of bounds or cycle in
    /// `predict`.
    pub fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= n_features {
                    return Err(format!(
                        "node {} splits on feature {} but the model has {} features",
                        index, feature, n_features
                    ));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {} has a non-finite threshold", index));
                }
                for child in [*left, *right] {
                    if child <= index || child >= self.nodes.len() {
                        return Err(format!(
                            "node {} points to child {} outside {}..{}",
                            index,
                            child,
                            index + 1,
                            self.nodes.len()
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

fn class_counts(labels: &[Label], samples: &[usize]) -> [usize; 2] {
    let mut counts = [0, 0];
    for &i in samples {
        counts[labels[i].index()] += 1;
    }
    counts
}

/// Search a random subset of the features that are non-zero somewhere in
/// the node. Features that are zero for every sample are constant here and
/// can never split.
fn best_split<R: Rng>(
    vectors: &[SparseVector],
    labels: &[Label],
    samples: &[usize],
    max_features: usize,
    rng: &mut R,
) -> Option<BestSplit> {
    let mut present: Vec<usize> = samples
        .iter()
        .flat_map(|&i| vectors[i].iter().map(|&(column, _)| column))
        .collect::<FxHashSet<_>>()
        .into_iter()
        .collect();
    // Hash order is not stable; sort before shuffling for reproducibility
    present.sort_unstable();
    present.shuffle(rng);
    present.truncate(max_features.max(1));

    let total_counts = class_counts(labels, samples);
    let mut best: Option<BestSplit> = None;
    let mut values: Vec<(f64, Label)> = Vec::with_capacity(samples.len());

    for feature in present {
        values.clear();
        values.extend(
            samples
                .iter()
                .map(|&i| (feature_value(&vectors[i], feature), labels[i])),
        );
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left = [0usize, 0usize];
        for pos in 0..values.len() - 1 {
            left[values[pos].1.index()] += 1;
            let (current, next) = (values[pos].0, values[pos + 1].0);
            if current == next {
                continue;
            }

            let right = [total_counts[0] - left[0], total_counts[1] - left[1]];
            let n_left = (pos + 1) as f64;
            let n_right = (values.len() - pos - 1) as f64;
            let score = n_left * gini(left) + n_right * gini(right);

            if best.as_ref().map_or(true, |b| score < b.score) {
                best = Some(BestSplit {
                    feature,
                    threshold: current + (next - current) / 2.0,
                    score,
                });
            }
        }
    }

    best
}
