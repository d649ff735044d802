use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{
    ForestError,
    node::{Node, NodeIndex},
    projection::ProjectionSampler,
    split::{SplitCriterion, find_best_split},
};

/// Configuration for a single projection decision tree.
///
/// Built by the forest trainer, one per tree. Construct via
/// [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default             |
/// |---------------------|---------------------|
/// | `criterion`         | `Gini`              |
/// | `max_depth`         | `None` (unlimited)  |
/// | `min_samples_split` | 2                   |
/// | `min_samples_leaf`  | 1                   |
/// | `n_candidates`      | 1                   |
/// | `seed`              | 42                  |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) n_candidates: usize,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            n_candidates: 1,
            seed: 42,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the maximum tree depth.
    ///
    /// `None` means grow until all leaves are pure or stopping conditions
    /// are met. `Some(d)` limits depth to `d` levels (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf after a split.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the number of candidate projections drawn at each node.
    #[must_use]
    pub fn with_n_candidates(mut self, n_candidates: usize) -> Self {
        self.n_candidates = n_candidates;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Train a decision tree on the provided row-major dataset.
    ///
    /// `features[sample_idx][feature_idx]` — flattened samples.
    /// `labels[sample_idx]` — class labels (zero-based).
    /// `sampler` — the per-variant projection sampler built by the forest.
    ///
    /// # Errors
    ///
    /// | Variant                             | When                            |
    /// |-------------------------------------|---------------------------------|
    /// | [`ForestError::EmptyDataset`]       | `features` is empty             |
    /// | [`ForestError::ZeroFeatures`]       | rows have zero feature columns  |
    /// | [`ForestError::FeatureCountMismatch`] | rows have inconsistent lengths |
    /// | [`ForestError::LabelCountMismatch`] | label count != sample count     |
    /// | [`ForestError::NonFiniteValue`]     | any value is NaN or infinite    |
    /// | [`ForestError::InvalidMaxDepth`]    | `max_depth` is `Some(0)`        |
    /// | [`ForestError::InvalidMinSamplesSplit`] | `min_samples_split` < 2     |
    /// | [`ForestError::InvalidMinSamplesLeaf`]  | `min_samples_leaf` < 1      |
    pub(crate) fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        sampler: &ProjectionSampler,
    ) -> Result<DecisionTree, ForestError> {
        // --- Validate inputs ---
        if features.is_empty() {
            return Err(ForestError::EmptyDataset);
        }

        let n_samples = features.len();
        let n_features = features[0].len();

        if n_features == 0 {
            return Err(ForestError::ZeroFeatures);
        }
        if labels.len() != n_samples {
            return Err(ForestError::LabelCountMismatch {
                n_samples,
                n_labels: labels.len(),
            });
        }

        for (sample_index, row) in features.iter().enumerate() {
            if row.len() != n_features {
                return Err(ForestError::FeatureCountMismatch {
                    expected: n_features,
                    got: row.len(),
                    sample_index,
                });
            }
            for (feature_index, &val) in row.iter().enumerate() {
                if !val.is_finite() {
                    return Err(ForestError::NonFiniteValue {
                        sample_index,
                        feature_index,
                    });
                }
            }
        }

        // --- Validate config ---
        if let Some(d) = self.max_depth
            && d == 0
        {
            return Err(ForestError::InvalidMaxDepth { max_depth: 0 });
        }

        if self.min_samples_split < 2 {
            return Err(ForestError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }

        if self.min_samples_leaf < 1 {
            return Err(ForestError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }

        let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;

        debug!(
            n_samples,
            n_features,
            n_classes,
            n_candidates = self.n_candidates,
            "fitting projection tree"
        );

        let sample_indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut arena: Vec<Node> = Vec::new();

        let root = build_tree(
            features,
            labels,
            &sample_indices,
            n_classes,
            self,
            0,
            sampler,
            &mut rng,
            &mut arena,
        );

        debug!(
            root_index = root.index(),
            n_nodes = arena.len(),
            "projection tree built"
        );

        Ok(DecisionTree {
            nodes: arena,
            n_features,
            n_classes,
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively build the arena-based decision tree.
///
/// Returns the [`NodeIndex`] of the node just created in `arena`.
#[allow(clippy::too_many_arguments)]
fn build_tree(
    features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    config: &DecisionTreeConfig,
    depth: usize,
    sampler: &ProjectionSampler,
    rng: &mut ChaCha8Rng,
    arena: &mut Vec<Node>,
) -> NodeIndex {
    let n_samples = sample_indices.len();

    // Accumulate class counts.
    let mut class_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        class_counts[labels[si]] += 1;
    }

    let impurity = config.criterion.impurity(&class_counts, n_samples);

    let make_leaf = |arena: &mut Vec<Node>| -> NodeIndex {
        let total = n_samples as f64;
        let distribution: Vec<f64> = class_counts.iter().map(|&c| c as f64 / total).collect();
        let prediction = class_counts
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        let idx = arena.len();
        arena.push(Node::Leaf {
            prediction,
            distribution,
            impurity,
            n_samples,
        });
        NodeIndex::new(idx)
    };

    // Stopping conditions → leaf.
    let depth_exceeded = config.max_depth.is_some_and(|max_d| depth >= max_d);
    let too_few = n_samples < config.min_samples_split;
    let pure = impurity.value() == 0.0;

    if too_few || pure || depth_exceeded {
        return make_leaf(arena);
    }

    let split_result = find_best_split(
        features,
        labels,
        sample_indices,
        n_classes,
        &config.criterion,
        sampler,
        config.n_candidates,
        config.min_samples_leaf,
        rng,
    );

    let split = match split_result {
        Some(s) => s,
        None => return make_leaf(arena),
    };

    // Arena pattern: reserve index, recurse, then overwrite with the split.
    let node_idx = arena.len();
    arena.push(Node::Leaf {
        prediction: 0,
        distribution: vec![0.0; n_classes],
        impurity,
        n_samples,
    });

    let left_idx = build_tree(
        features,
        labels,
        &split.left_indices,
        n_classes,
        config,
        depth + 1,
        sampler,
        rng,
        arena,
    );

    let right_idx = build_tree(
        features,
        labels,
        &split.right_indices,
        n_classes,
        config,
        depth + 1,
        sampler,
        rng,
        arena,
    );

    arena[node_idx] = Node::Split {
        projection: split.projection,
        threshold: split.threshold,
        left: left_idx,
        right: right_idx,
        impurity,
        n_samples,
        impurity_decrease: split.impurity_decrease,
    };

    NodeIndex::new(node_idx)
}

/// A fitted projection decision tree.
///
/// Stored as an arena-based `Vec<Node>` with index references for
/// cache-friendly traversal.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Predict the class label for a single flattened sample.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let leaf = self.traverse(sample);
        match &self.nodes[leaf] {
            Node::Leaf { prediction, .. } => Ok(*prediction),
            Node::Split { .. } => unreachable!("traverse always ends at a leaf"),
        }
    }

    /// Return the class probability distribution for a single sample.
    ///
    /// The returned `Vec` has length `n_classes`, summing to 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when
    /// `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let leaf = self.traverse(sample);
        match &self.nodes[leaf] {
            Node::Leaf { distribution, .. } => Ok(distribution.clone()),
            Node::Split { .. } => unreachable!("traverse always ends at a leaf"),
        }
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }

        // BFS: (node_index, current_depth)
        let mut max_depth = 0usize;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((0usize, 0usize));

        while let Some((node_idx, d)) = queue.pop_front() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => {
                    if d > max_depth {
                        max_depth = d;
                    }
                }
                Node::Split { left, right, .. } => {
                    queue.push_back((left.index(), d + 1));
                    queue.push_back((right.index(), d + 1));
                }
            }
        }

        max_depth
    }

    /// Traverse the tree from the root and return the arena index of the leaf.
    fn traverse(&self, sample: &[f64]) -> usize {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { .. } => return idx,
                Node::Split {
                    projection,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if projection.evaluate(sample) <= *threshold {
                        idx = left.index();
                    } else {
                        idx = right.index();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{ImageGeometry, PatchBounds, ProjectionMatrix, ProjectionSampler};

    fn oblique_sampler(n_features: usize) -> ProjectionSampler {
        ProjectionSampler::new(
            ProjectionMatrix::Oblique,
            n_features,
            1.0 / n_features as f64,
            ImageGeometry::new(1, n_features),
            PatchBounds::default(),
        )
    }

    #[test]
    fn empty_dataset_error() {
        let features: Vec<Vec<f64>> = vec![];
        let labels: Vec<usize> = vec![];
        let err = DecisionTreeConfig::new()
            .fit(&features, &labels, &oblique_sampler(1))
            .unwrap_err();
        assert!(matches!(err, ForestError::EmptyDataset));
    }

    #[test]
    fn pure_dataset_single_leaf() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let labels = vec![0, 0, 0];
        let tree = DecisionTreeConfig::new()
            .fit(&features, &labels, &oblique_sampler(2))
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.predict(&[2.0, 3.0]).unwrap(), 0);
    }

    #[test]
    fn linearly_separable_correct_split() {
        let features = vec![
            vec![1.0],
            vec![2.0],
            vec![3.0],
            vec![10.0],
            vec![11.0],
            vec![12.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let tree = DecisionTreeConfig::new()
            .with_n_candidates(4)
            .with_seed(42)
            .fit(&features, &labels, &oblique_sampler(1))
            .unwrap();
        assert_eq!(tree.predict(&[2.0]).unwrap(), 0);
        assert_eq!(tree.predict(&[11.0]).unwrap(), 1);
    }

    #[test]
    fn predict_proba_sums_to_one() {
        let features = vec![
            vec![1.0],
            vec![2.0],
            vec![3.0],
            vec![10.0],
            vec![11.0],
            vec![12.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let tree = DecisionTreeConfig::new()
            .with_n_candidates(4)
            .fit(&features, &labels, &oblique_sampler(1))
            .unwrap();
        let proba = tree.predict_proba(&[5.0]).unwrap();
        let sum: f64 = proba.iter().sum();
        assert!((sum - 1.0).abs() < 1e-10);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let features = vec![
            vec![1.0, 5.0],
            vec![2.0, 6.0],
            vec![3.0, 7.0],
            vec![10.0, 15.0],
            vec![11.0, 16.0],
            vec![12.0, 17.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let sampler = oblique_sampler(2);
        let tree1 = DecisionTreeConfig::new()
            .with_n_candidates(3)
            .with_seed(123)
            .fit(&features, &labels, &sampler)
            .unwrap();
        let tree2 = DecisionTreeConfig::new()
            .with_n_candidates(3)
            .with_seed(123)
            .fit(&features, &labels, &sampler)
            .unwrap();
        for sample in &features {
            assert_eq!(
                tree1.predict(sample).unwrap(),
                tree2.predict(sample).unwrap()
            );
        }
    }

    #[test]
    fn prediction_feature_mismatch() {
        let features = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let labels = vec![0, 1];
        let tree = DecisionTreeConfig::new()
            .fit(&features, &labels, &oblique_sampler(2))
            .unwrap();
        let err = tree.predict(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            ForestError::PredictionFeatureMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn max_depth_limits_tree() {
        let features = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let labels = vec![0, 1, 1, 0];
        let tree = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .with_n_candidates(4)
            .with_seed(42)
            .fit(&features, &labels, &oblique_sampler(2))
            .unwrap();
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn label_count_mismatch_error() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![0];
        let err = DecisionTreeConfig::new()
            .fit(&features, &labels, &oblique_sampler(1))
            .unwrap_err();
        assert!(matches!(
            err,
            ForestError::LabelCountMismatch {
                n_samples: 2,
                n_labels: 1
            }
        ));
    }

    #[test]
    fn feature_count_mismatch_error() {
        let features = vec![vec![1.0, 2.0], vec![3.0]];
        let labels = vec![0, 1];
        let err = DecisionTreeConfig::new()
            .fit(&features, &labels, &oblique_sampler(2))
            .unwrap_err();
        assert!(matches!(err, ForestError::FeatureCountMismatch { .. }));
    }

    #[test]
    fn non_finite_value_error() {
        let features = vec![vec![1.0, f64::NAN], vec![3.0, 4.0]];
        let labels = vec![0, 1];
        let err = DecisionTreeConfig::new()
            .fit(&features, &labels, &oblique_sampler(2))
            .unwrap_err();
        assert!(matches!(err, ForestError::NonFiniteValue { .. }));
    }

    #[test]
    fn patch_tree_separates_block_structure() {
        // 3x3 "images": class 0 bright top-left block, class 1 bright
        // bottom-right block. Patch projections sum contiguous regions, so a
        // single patch split separates the classes.
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..6 {
            let mut img = vec![0.0; 9];
            let bump = 0.1 * i as f64;
            if i % 2 == 0 {
                img[0] = 5.0 + bump;
                img[1] = 5.0 + bump;
                img[3] = 5.0 + bump;
                labels.push(0);
            } else {
                img[5] = 5.0 + bump;
                img[7] = 5.0 + bump;
                img[8] = 5.0 + bump;
                labels.push(1);
            }
            features.push(img);
        }
        let sampler = ProjectionSampler::new(
            ProjectionMatrix::ImagePatch,
            9,
            0.1,
            ImageGeometry::new(3, 3),
            PatchBounds::new(1, 2).unwrap(),
        );
        let tree = DecisionTreeConfig::new()
            .with_n_candidates(16)
            .with_seed(42)
            .fit(&features, &labels, &sampler)
            .unwrap();

        let correct = features
            .iter()
            .zip(&labels)
            .filter(|&(img, &label)| tree.predict(img).unwrap() == label)
            .count();
        assert!(correct >= 5, "patch tree got {correct}/6 on training data");
    }
}
