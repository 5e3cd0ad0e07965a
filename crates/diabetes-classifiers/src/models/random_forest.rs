//! Bagged CART forest with Gini splits.
//!
//! Each tree draws a bootstrap sample and considers a random subset of
//! ⌊√n_features⌋ features at every split. Tree `i` owns an RNG seeded with
//! `seed + i`, so the forest is identical whether trees are grown on one
//! thread or on the rayon pool.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::math::Array2;
use crate::models::classifier_trait::{validate_training_data, ClassifierModel, ModelState};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        proba: f32,
    },
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

/// A single fitted tree, nodes stored in an arena with the root at 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Class-1 fraction of the leaf `row` falls into. `NaN` values fail every
    /// `<=` comparison and follow the right branch.
    pub fn predict_row(&self, row: &[f32]) -> f32 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { proba } => return *proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

#[derive(Clone, Copy)]
struct TreeParams {
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    max_features: usize,
}

struct BestSplit {
    feature: usize,
    threshold: f32,
    impurity: f64,
}

struct TreeBuilder<'a> {
    x: &'a Array2<f32>,
    y: &'a [u8],
    params: TreeParams,
    rng: StdRng,
    nodes: Vec<Node>,
}

fn gini(p: f64) -> f64 {
    2.0 * p * (1.0 - p)
}

impl<'a> TreeBuilder<'a> {
    fn grow(mut self, sample: Vec<usize>) -> DecisionTree {
        self.build(sample, 0);
        DecisionTree { nodes: self.nodes }
    }

    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let n = indices.len();
        let positives = indices.iter().filter(|&&i| self.y[i] == 1).count();
        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf {
            proba: positives as f32 / n as f32,
        });

        let depth_reached = self.params.max_depth.map_or(false, |d| depth >= d);
        if depth_reached || n < self.params.min_samples_split || positives == 0 || positives == n
        {
            return node_id;
        }

        let Some(split) = self.best_split(&indices, positives) else {
            return node_id;
        };

        let x = self.x;
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| x[(i, split.feature)] <= split.threshold);

        let left = self.build(left, depth + 1);
        let right = self.build(right, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    fn best_split(&mut self, indices: &[usize], positives: usize) -> Option<BestSplit> {
        let n = indices.len();
        let n_features = self.x.ncols();
        let candidates = index::sample(&mut self.rng, n_features, self.params.max_features);
        let min_leaf = self.params.min_samples_leaf.max(1);

        let mut best: Option<BestSplit> = None;
        let mut sorted: Vec<(f32, u8)> = Vec::with_capacity(n);
        for feature in candidates.iter() {
            sorted.clear();
            sorted.extend(indices.iter().map(|&i| (self.x[(i, feature)], self.y[i])));
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_pos = 0usize;
            for split_at in 1..n {
                left_pos += sorted[split_at - 1].1 as usize;
                let (prev, next) = (sorted[split_at - 1].0, sorted[split_at].0);
                // equal or NaN neighbours cannot be separated by a threshold
                if !(prev < next) || split_at < min_leaf || n - split_at < min_leaf {
                    continue;
                }
                let n_left = split_at as f64;
                let n_right = (n - split_at) as f64;
                let p_left = left_pos as f64 / n_left;
                let p_right = (positives - left_pos) as f64 / n_right;
                let impurity = (n_left * gini(p_left) + n_right * gini(p_right)) / n as f64;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    let mut threshold = prev + (next - prev) / 2.0;
                    if threshold >= next {
                        threshold = prev;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

/// Random forest classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        RandomForestClassifier {
            n_estimators: n_estimators.max(1),
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split.max(2);
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf.max(1);
        self
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    fn max_features(n_features: usize) -> usize {
        ((n_features as f64).sqrt().floor() as usize).clamp(1, n_features.max(1))
    }
}

impl ClassifierModel for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[u8]) -> Result<()> {
        validate_training_data(x, y)?;

        let n_samples = x.nrows();
        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: Self::max_features(x.ncols()),
        };
        log::debug!(
            "Growing {} trees on {} rows ({} features per split)",
            self.n_estimators,
            n_samples,
            params.max_features
        );

        let seed = self.seed;
        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(tree_idx as u64));
                let sample: Vec<usize> =
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                TreeBuilder {
                    x,
                    y,
                    params,
                    rng,
                    nodes: Vec::new(),
                }
                .grow(sample)
            })
            .collect();
        self.n_features = x.ncols();

        log::trace!(
            "Forest nodes: {}",
            self.trees.iter().map(DecisionTree::n_nodes).sum::<usize>()
        );
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f32>) -> Result<Vec<f32>> {
        if self.trees.is_empty() {
            return Err(PipelineError::ModelNotFitted.into());
        }
        if x.ncols() != self.n_features {
            return Err(PipelineError::ShapeMismatch {
                expected: self.n_features,
                found: x.ncols(),
            }
            .into());
        }
        let n_trees = self.trees.len() as f32;
        Ok(x.rows()
            .map(|row| {
                let total: f32 = self.trees.iter().map(|t| t.predict_row(row)).sum();
                (total / n_trees).clamp(0.0, 1.0)
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn state(&self) -> Result<ModelState> {
        Ok(ModelState::RandomForest(self.clone()))
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}
