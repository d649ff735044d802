//! Brute-force k-nearest-neighbor classification (Euclidean).
//!
//! The embedding baseline only ever asks for a single neighbor over a few
//! hundred low-dimensional vectors, so a brute-force scan is the right
//! tool; no spatial index is warranted at this scale.

use crate::EmbedError;

/// Configuration for a k-nearest-neighbor classifier.
#[derive(Debug, Clone)]
pub struct NearestNeighbors {
    k: usize,
}

impl NearestNeighbors {
    /// Create a classifier with the given neighbor count.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::InvalidNeighborCount`] if `k` is zero.
    pub fn new(k: usize) -> Result<Self, EmbedError> {
        if k == 0 {
            return Err(EmbedError::InvalidNeighborCount { k, n_train: 0 });
        }
        Ok(Self { k })
    }

    /// Return the configured neighbor count.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Memorize the training vectors and labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::EmptyTrainingSet`] | zero training vectors |
    /// | [`EmbedError::LabelCountMismatch`] | label count differs from vector count |
    /// | [`EmbedError::DimensionMismatch`] | vectors disagree on dimension |
    /// | [`EmbedError::InvalidNeighborCount`] | `k` exceeds the training count |
    pub fn fit(
        &self,
        train: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<FittedNeighbors, EmbedError> {
        if train.is_empty() {
            return Err(EmbedError::EmptyTrainingSet);
        }
        if labels.len() != train.len() {
            return Err(EmbedError::LabelCountMismatch {
                n_samples: train.len(),
                n_labels: labels.len(),
            });
        }
        let dimension = train[0].len();
        for vector in train {
            if vector.len() != dimension {
                return Err(EmbedError::DimensionMismatch {
                    expected: dimension,
                    got: vector.len(),
                });
            }
        }
        if self.k > train.len() {
            return Err(EmbedError::InvalidNeighborCount {
                k: self.k,
                n_train: train.len(),
            });
        }

        Ok(FittedNeighbors {
            train: train.to_vec(),
            labels: labels.to_vec(),
            dimension,
            k: self.k,
        })
    }
}

/// A fitted k-NN classifier holding the training vectors.
#[derive(Debug, Clone)]
pub struct FittedNeighbors {
    train: Vec<Vec<f64>>,
    labels: Vec<usize>,
    dimension: usize,
    k: usize,
}

impl FittedNeighbors {
    /// Predict a label for every query vector, in input order.
    ///
    /// Majority vote among the k nearest training vectors by Euclidean
    /// distance; vote ties go to the lowest class index.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::DimensionMismatch`] if a query's dimension
    /// differs from the fitted data.
    pub fn predict(&self, queries: &[Vec<f64>]) -> Result<Vec<usize>, EmbedError> {
        queries.iter().map(|q| self.predict_one(q)).collect()
    }

    fn predict_one(&self, query: &[f64]) -> Result<usize, EmbedError> {
        if query.len() != self.dimension {
            return Err(EmbedError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }

        let mut distances: Vec<(f64, usize)> = self
            .train
            .iter()
            .zip(&self.labels)
            .map(|(vector, &label)| {
                let dist: f64 = vector
                    .iter()
                    .zip(query)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                (dist, label)
            })
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n_classes = self.labels.iter().max().copied().unwrap_or(0) + 1;
        let mut votes = vec![0usize; n_classes];
        for &(_, label) in distances.iter().take(self.k) {
            votes[label] += 1;
        }

        // Strictly-greater comparison keeps the lowest class on vote ties.
        let mut best_class = 0;
        let mut best_votes = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > best_votes {
                best_votes = count;
                best_class = class;
            }
        }
        Ok(best_class)
    }

    /// Return the number of memorized training vectors.
    #[must_use]
    pub fn n_train(&self) -> usize {
        self.train.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        (
            vec![
                vec![0.0, 0.0],
                vec![0.1, 0.1],
                vec![5.0, 5.0],
                vec![5.1, 4.9],
            ],
            vec![0, 0, 1, 1],
        )
    }

    #[test]
    fn one_nn_recovers_nearest_label() {
        let (train, labels) = train_data();
        let fitted = NearestNeighbors::new(1).unwrap().fit(&train, &labels).unwrap();
        let preds = fitted
            .predict(&[vec![0.2, 0.0], vec![4.8, 5.2]])
            .unwrap();
        assert_eq!(preds, vec![0, 1]);
    }

    #[test]
    fn exact_training_point_maps_to_its_label() {
        let (train, labels) = train_data();
        let fitted = NearestNeighbors::new(1).unwrap().fit(&train, &labels).unwrap();
        let preds = fitted.predict(&train).unwrap();
        assert_eq!(preds, labels);
    }

    #[test]
    fn majority_vote_with_three_neighbors() {
        let train = vec![
            vec![0.0],
            vec![0.2],
            vec![0.4],
            vec![10.0],
        ];
        let labels = vec![0, 0, 1, 1];
        let fitted = NearestNeighbors::new(3).unwrap().fit(&train, &labels).unwrap();
        // Neighbors of 0.1: {0.0, 0.2, 0.4} -> labels {0, 0, 1} -> class 0.
        assert_eq!(fitted.predict(&[vec![0.1]]).unwrap(), vec![0]);
    }

    #[test]
    fn zero_k_rejected() {
        assert!(matches!(
            NearestNeighbors::new(0),
            Err(EmbedError::InvalidNeighborCount { k: 0, .. })
        ));
    }

    #[test]
    fn k_larger_than_training_set_rejected() {
        let (train, labels) = train_data();
        let err = NearestNeighbors::new(5).unwrap().fit(&train, &labels).unwrap_err();
        assert!(matches!(
            err,
            EmbedError::InvalidNeighborCount { k: 5, n_train: 4 }
        ));
    }

    #[test]
    fn empty_training_set_rejected() {
        let err = NearestNeighbors::new(1).unwrap().fit(&[], &[]).unwrap_err();
        assert!(matches!(err, EmbedError::EmptyTrainingSet));
    }

    #[test]
    fn label_count_mismatch_rejected() {
        let (train, _) = train_data();
        let err = NearestNeighbors::new(1)
            .unwrap()
            .fit(&train, &[0, 1])
            .unwrap_err();
        assert!(matches!(
            err,
            EmbedError::LabelCountMismatch {
                n_samples: 4,
                n_labels: 2
            }
        ));
    }

    #[test]
    fn query_dimension_mismatch_rejected() {
        let (train, labels) = train_data();
        let fitted = NearestNeighbors::new(1).unwrap().fit(&train, &labels).unwrap();
        let err = fitted.predict(&[vec![1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(
            err,
            EmbedError::DimensionMismatch { expected: 2, got: 3 }
        ));
    }
}
