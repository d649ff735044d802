//! Stratified k-fold generation.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::error::EvalError;

/// One train/test partition of the sample index range.
///
/// Both sides are sorted ascending and disjoint; across the folds of one
/// [`StratifiedKFold::split`] call, every index appears in exactly one
/// test set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSplit {
    /// Indices of the training samples.
    pub train: Vec<usize>,
    /// Indices of the held-out test samples.
    pub test: Vec<usize>,
}

/// Stratified k-fold splitter.
///
/// Construct via [`StratifiedKFold::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    n_folds: usize,
    seed: u64,
}

impl StratifiedKFold {
    /// Create a splitter with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, EvalError> {
        if n_folds < 2 {
            return Err(EvalError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds, seed: 42 })
    }

    /// Set the random seed for within-class shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the fold count.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Generate the fold partitions for the given labels.
    ///
    /// Groups sample indices by class, shuffles within each class with a
    /// seeded RNG, then deals indices round-robin across folds so every
    /// fold's class proportions stay within one sample of the global
    /// proportions.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::EmptyDataset`] | zero labels |
    /// | [`EvalError::TooFewSamplesForFolds`] | a class has fewer samples than folds |
    pub fn split(&self, labels: &[usize]) -> Result<Vec<FoldSplit>, EvalError> {
        if labels.is_empty() {
            return Err(EvalError::EmptyDataset);
        }

        let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        // Group indices by class.
        let mut class_indices: Vec<Vec<usize>> = vec![vec![]; n_classes];
        for (i, &label) in labels.iter().enumerate() {
            class_indices[label].push(i);
        }

        // Validate: each non-empty class needs at least n_folds samples.
        for (class, indices) in class_indices.iter().enumerate() {
            if !indices.is_empty() && indices.len() < self.n_folds {
                return Err(EvalError::TooFewSamplesForFolds {
                    class,
                    count: indices.len(),
                    n_folds: self.n_folds,
                });
            }
        }

        // Shuffle within each class and assign folds round-robin.
        let mut fold_assignments = vec![0usize; labels.len()];
        for indices in &mut class_indices {
            indices.shuffle(&mut rng);
            for (j, &idx) in indices.iter().enumerate() {
                fold_assignments[idx] = j % self.n_folds;
            }
        }

        // Materialize the partitions; iterating 0..n keeps both sides sorted.
        let folds = (0..self.n_folds)
            .map(|fold| {
                let mut train = Vec::new();
                let mut test = Vec::new();
                for (i, &assigned) in fold_assignments.iter().enumerate() {
                    if assigned == fold {
                        test.push(i);
                    } else {
                        train.push(i);
                    }
                }
                FoldSplit { train, test }
            })
            .collect();

        Ok(folds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced_labels(per_class: usize, n_classes: usize) -> Vec<usize> {
        (0..per_class * n_classes).map(|i| i % n_classes).collect()
    }

    #[test]
    fn invalid_fold_count() {
        assert!(StratifiedKFold::new(0).is_err());
        assert!(StratifiedKFold::new(1).is_err());
        assert!(StratifiedKFold::new(2).is_ok());
    }

    #[test]
    fn empty_labels_rejected() {
        let err = StratifiedKFold::new(2).unwrap().split(&[]).unwrap_err();
        assert!(matches!(err, EvalError::EmptyDataset));
    }

    #[test]
    fn every_index_in_exactly_one_test_set() {
        let labels = balanced_labels(10, 3);
        let folds = StratifiedKFold::new(5).unwrap().split(&labels).unwrap();
        assert_eq!(folds.len(), 5);

        let mut seen = vec![0usize; labels.len()];
        for fold in &folds {
            for &i in &fold.test {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1), "test sets do not partition");
    }

    #[test]
    fn train_and_test_are_disjoint_and_complete() {
        let labels = balanced_labels(8, 2);
        let folds = StratifiedKFold::new(4).unwrap().split(&labels).unwrap();
        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), labels.len());
            let mut all: Vec<usize> = fold.train.iter().chain(&fold.test).copied().collect();
            all.sort_unstable();
            all.dedup();
            assert_eq!(all.len(), labels.len());
        }
    }

    #[test]
    fn balanced_hundred_samples_stay_balanced() {
        // 100 samples, 2 classes balanced 50/50, 5 folds: each test fold must
        // hold 10 of each class.
        let labels = balanced_labels(50, 2);
        let folds = StratifiedKFold::new(5).unwrap().split(&labels).unwrap();
        for fold in &folds {
            assert_eq!(fold.test.len(), 20);
            let class0 = fold.test.iter().filter(|&&i| labels[i] == 0).count();
            assert_eq!(class0, 10);
        }
    }

    #[test]
    fn uneven_class_stays_within_one_sample() {
        // 7 + 11 samples over 3 folds: per-fold class counts differ by at
        // most one from the even share.
        let mut labels = vec![0; 7];
        labels.extend(vec![1; 11]);
        let folds = StratifiedKFold::new(3).unwrap().split(&labels).unwrap();
        for fold in &folds {
            let class0 = fold.test.iter().filter(|&&i| labels[i] == 0).count();
            let class1 = fold.test.len() - class0;
            assert!((2..=3).contains(&class0), "class0 = {class0}");
            assert!((3..=4).contains(&class1), "class1 = {class1}");
        }
    }

    #[test]
    fn too_few_samples_for_folds() {
        let labels = vec![0, 0, 1, 1, 1, 1, 1];
        let err = StratifiedKFold::new(5).unwrap().split(&labels).unwrap_err();
        assert!(matches!(
            err,
            EvalError::TooFewSamplesForFolds {
                class: 0,
                count: 2,
                n_folds: 5
            }
        ));
    }

    #[test]
    fn deterministic_with_same_seed() {
        let labels = balanced_labels(20, 2);
        let a = StratifiedKFold::new(4).unwrap().with_seed(7).split(&labels).unwrap();
        let b = StratifiedKFold::new(4).unwrap().with_seed(7).split(&labels).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_shuffle_differently() {
        let labels = balanced_labels(20, 2);
        let a = StratifiedKFold::new(4).unwrap().with_seed(1).split(&labels).unwrap();
        let b = StratifiedKFold::new(4).unwrap().with_seed(2).split(&labels).unwrap();
        assert_ne!(a, b);
    }
}
