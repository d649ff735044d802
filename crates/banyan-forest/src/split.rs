use rand::Rng;

use crate::node::Impurity;
use crate::projection::{Projection, ProjectionSampler};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// Returns zero impurity when `n_samples` is zero (pure node).
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        let n = n_samples as f64;
        let value = match self {
            SplitCriterion::Gini => {
                let sum_sq: f64 = class_counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p
                    })
                    .sum();
                1.0 - sum_sq
            }
            SplitCriterion::Entropy => {
                -class_counts
                    .iter()
                    .filter(|&&c| c > 0)
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p.ln()
                    })
                    .sum::<f64>()
            }
        };
        Impurity::new(value)
    }
}

/// Result of finding the best projection split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Projection used for the split.
    pub(crate) projection: Projection,
    /// Threshold over the projected value.
    pub(crate) threshold: f64,
    /// Weighted impurity decrease from this split (MDI formula).
    pub(crate) impurity_decrease: f64,
    /// Sample indices going to the left child.
    pub(crate) left_indices: Vec<usize>,
    /// Sample indices going to the right child.
    pub(crate) right_indices: Vec<usize>,
}

/// Find the best split among `n_candidates` sampled projections.
///
/// For each candidate projection, projects the node's samples, sorts the
/// `(value, sample)` pairs, scans left-to-right with incremental class
/// count updates, and tracks the globally best split by weighted impurity
/// decrease.
///
/// Returns `None` when no valid split exists (all projected values
/// identical for every candidate, or every boundary would violate
/// `min_samples_leaf`).
///
/// `features` is row-major: `features[sample_idx][feature_idx]`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn find_best_split(
    features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    criterion: &SplitCriterion,
    sampler: &ProjectionSampler,
    n_candidates: usize,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    let n_samples = sample_indices.len();
    if n_samples < 2 {
        return None;
    }

    // Build parent class counts.
    let mut parent_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        parent_counts[labels[si]] += 1;
    }
    let parent_impurity = criterion.impurity(&parent_counts, n_samples);

    let mut best_decrease = f64::NEG_INFINITY;
    let mut best: Option<(Projection, f64)> = None;

    for _ in 0..n_candidates {
        let projection = sampler.sample(rng);

        // Project and sort this node's samples along the candidate direction.
        let mut sorted: Vec<(f64, usize)> = sample_indices
            .iter()
            .map(|&si| (projection.evaluate(&features[si]), si))
            .collect();
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        // Incremental scan: left grows from empty, right shrinks from full.
        let mut left_counts = vec![0usize; n_classes];
        let mut right_counts = parent_counts.clone();

        for i in 0..(n_samples - 1) {
            let (val_i, si) = sorted[i];
            let class_i = labels[si];

            left_counts[class_i] += 1;
            right_counts[class_i] -= 1;

            let n_left = i + 1;
            let n_right = n_samples - n_left;

            // Skip if next value is identical (no valid boundary here).
            let val_next = sorted[i + 1].0;
            if val_i == val_next {
                continue;
            }

            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }

            let left_impurity = criterion.impurity(&left_counts, n_left);
            let right_impurity = criterion.impurity(&right_counts, n_right);

            // MDI formula (matches scikit-learn).
            let decrease = (n_samples as f64) * parent_impurity.value()
                - (n_left as f64) * left_impurity.value()
                - (n_right as f64) * right_impurity.value();

            if decrease > best_decrease {
                best_decrease = decrease;
                let threshold = (val_i + val_next) / 2.0;
                best = Some((projection.clone(), threshold));
            }
        }
    }

    let (projection, threshold) = best?;

    // Partition sample_indices into left/right along the winning projection.
    let mut left_indices = Vec::with_capacity(n_samples / 2);
    let mut right_indices = Vec::with_capacity(n_samples / 2);
    for &si in sample_indices {
        if projection.evaluate(&features[si]) <= threshold {
            left_indices.push(si);
        } else {
            right_indices.push(si);
        }
    }

    Some(SplitResult {
        projection,
        threshold,
        impurity_decrease: best_decrease,
        left_indices,
        right_indices,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{SplitCriterion, find_best_split};
    use crate::projection::{ImageGeometry, PatchBounds, ProjectionMatrix, ProjectionSampler};

    fn oblique_sampler(n_features: usize) -> ProjectionSampler {
        ProjectionSampler::new(
            ProjectionMatrix::Oblique,
            n_features,
            1.0 / n_features as f64,
            ImageGeometry::new(1, n_features),
            PatchBounds::new(1, 1).unwrap(),
        )
    }

    #[test]
    fn gini_pure() {
        let imp = SplitCriterion::Gini.impurity(&[10, 0, 0], 10);
        assert!((imp.value() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gini_binary_balanced() {
        let imp = SplitCriterion::Gini.impurity(&[5, 5], 10);
        assert!((imp.value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn gini_three_class_uniform() {
        let imp = SplitCriterion::Gini.impurity(&[100, 100, 100], 300);
        assert!((imp.value() - (1.0 - 3.0 * (1.0 / 3.0_f64).powi(2))).abs() < 1e-10);
    }

    #[test]
    fn entropy_pure() {
        let imp = SplitCriterion::Entropy.impurity(&[10, 0, 0], 10);
        assert!((imp.value() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn entropy_binary_balanced() {
        let imp = SplitCriterion::Entropy.impurity(&[5, 5], 10);
        assert!((imp.value() - 2.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn separable_data_finds_correct_split() {
        // Single feature: [1, 2, 3, 10, 11, 12], labels [0, 0, 0, 1, 1, 1].
        // With one feature every oblique projection is ±that feature, so the
        // split must land between 3 and 10 (up to sign).
        let features: Vec<Vec<f64>> = [1.0, 2.0, 3.0, 10.0, 11.0, 12.0]
            .iter()
            .map(|&v| vec![v])
            .collect();
        let labels = vec![0, 0, 0, 1, 1, 1];
        let sample_indices: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let split = find_best_split(
            &features,
            &labels,
            &sample_indices,
            2,
            &SplitCriterion::Gini,
            &oblique_sampler(1),
            4,
            1,
            &mut rng,
        )
        .expect("should find a split");

        assert_eq!(split.left_indices.len(), 3);
        assert_eq!(split.right_indices.len(), 3);
        assert!(split.impurity_decrease > 0.0);
        let left_classes: Vec<usize> = split.left_indices.iter().map(|&i| labels[i]).collect();
        assert!(
            left_classes.iter().all(|&c| c == left_classes[0]),
            "left side mixes classes: {left_classes:?}"
        );
    }

    #[test]
    fn constant_feature_returns_none() {
        let features: Vec<Vec<f64>> = (0..4).map(|_| vec![5.0]).collect();
        let labels = vec![0, 0, 1, 1];
        let sample_indices: Vec<usize> = (0..4).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = find_best_split(
            &features,
            &labels,
            &sample_indices,
            2,
            &SplitCriterion::Gini,
            &oblique_sampler(1),
            4,
            1,
            &mut rng,
        );

        assert!(result.is_none());
    }

    #[test]
    fn min_samples_leaf_enforced() {
        // 2 samples, min_samples_leaf = 2: each child would have 1 sample.
        let features = vec![vec![1.0], vec![10.0]];
        let labels = vec![0, 1];
        let sample_indices: Vec<usize> = (0..2).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = find_best_split(
            &features,
            &labels,
            &sample_indices,
            2,
            &SplitCriterion::Gini,
            &oblique_sampler(1),
            4,
            2,
            &mut rng,
        );

        assert!(result.is_none());
    }

    #[test]
    fn single_sample_returns_none() {
        let features = vec![vec![1.0]];
        let labels = vec![0];
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = find_best_split(
            &features,
            &labels,
            &[0],
            1,
            &SplitCriterion::Gini,
            &oblique_sampler(1),
            4,
            1,
            &mut rng,
        );

        assert!(result.is_none());
    }
}
