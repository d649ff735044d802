//! Embedding-baseline evaluation for one fold.

use banyan_embed::{JointEmbeddingConfig, NearestNeighbors, Sample};
use tracing::debug;

use crate::error::EvalError;
use crate::fold::FoldSplit;

/// Joint-embedding + 1-NN baseline evaluator.
///
/// Embeds the fold's train and test samples together into a shared score
/// space (automatic dimension, scaled), fits a 1-NN classifier on the train
/// block, and scores the test block. The train-block-first concatenation
/// order is the invariant the score split depends on.
#[derive(Debug, Clone)]
pub struct EmbeddingBaseline {
    embedding: JointEmbeddingConfig,
}

impl EmbeddingBaseline {
    /// Create a baseline with automatic dimension selection and scaling.
    #[must_use]
    pub fn new() -> Self {
        Self {
            embedding: JointEmbeddingConfig::new(),
        }
    }

    /// Override the embedding configuration.
    #[must_use]
    pub fn with_embedding(mut self, embedding: JointEmbeddingConfig) -> Self {
        self.embedding = embedding;
        self
    }

    /// Evaluate one fold and return the misclassification rate.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::EmptyDataset`] | zero samples |
    /// | [`EvalError::LabelCountMismatch`] | label count differs from sample count |
    /// | [`EvalError::EmptyPartition`] | either side of the fold is empty |
    /// | [`EvalError::IndexOutOfRange`] | a partition index exceeds the dataset |
    /// | [`EvalError::Embed`] | embedding or 1-NN failure, propagated unchanged |
    pub fn evaluate(
        &self,
        samples: &[Sample],
        labels: &[usize],
        split: &FoldSplit,
    ) -> Result<f64, EvalError> {
        if samples.is_empty() {
            return Err(EvalError::EmptyDataset);
        }
        if labels.len() != samples.len() {
            return Err(EvalError::LabelCountMismatch {
                n_samples: samples.len(),
                n_labels: labels.len(),
            });
        }
        if split.train.is_empty() || split.test.is_empty() {
            return Err(EvalError::EmptyPartition {
                n_train: split.train.len(),
                n_test: split.test.len(),
            });
        }
        for &index in split.train.iter().chain(&split.test) {
            if index >= samples.len() {
                return Err(EvalError::IndexOutOfRange {
                    index,
                    n_samples: samples.len(),
                });
            }
        }

        let n_train = split.train.len();

        // Train block first, test block second; the score split below cuts
        // at the same boundary.
        let combined: Vec<Sample> = split
            .train
            .iter()
            .chain(&split.test)
            .map(|&i| samples[i].clone())
            .collect();

        let embedding = self.embedding.fit(&combined)?;
        let scores = embedding.scores();
        let (train_scores, test_scores) = scores.split_at(n_train);

        let train_labels: Vec<usize> = split.train.iter().map(|&i| labels[i]).collect();
        let test_labels: Vec<usize> = split.test.iter().map(|&i| labels[i]).collect();

        let fitted = NearestNeighbors::new(1)?.fit(train_scores, &train_labels)?;
        let predictions = fitted.predict(test_scores)?;

        let mismatches = predictions
            .iter()
            .zip(&test_labels)
            .filter(|&(&p, &l)| p != l)
            .count();
        let error = mismatches as f64 / test_labels.len() as f64;

        debug!(
            n_components = embedding.n_components(),
            error, "embedding baseline evaluated"
        );
        Ok(error)
    }
}

impl Default for EmbeddingBaseline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use banyan_embed::Sample;

    use super::EmbeddingBaseline;
    use crate::error::EvalError;
    use crate::fold::FoldSplit;

    /// Two well-separated graph classes on 4 vertices: a strong (0,1) edge
    /// versus a strong (2,3) edge.
    fn block_dataset() -> (Vec<Sample>, Vec<usize>) {
        let mut samples = Vec::new();
        let mut labels = Vec::new();
        for i in 0..12 {
            let class = i % 2;
            let (a, b) = if class == 0 { (0, 1) } else { (2, 3) };
            let mut adj = vec![0.0; 16];
            let weight = 2.0 + 0.01 * (i / 2) as f64;
            adj[a * 4 + b] = weight;
            adj[b * 4 + a] = weight;
            samples.push(Sample::square(adj, 4).unwrap());
            labels.push(class);
        }
        (samples, labels)
    }

    fn even_split(n: usize) -> FoldSplit {
        FoldSplit {
            train: (0..n).filter(|i| i % 3 != 0).collect(),
            test: (0..n).step_by(3).collect(),
        }
    }

    #[test]
    fn separable_classes_classify_well() {
        let (samples, labels) = block_dataset();
        let error = EmbeddingBaseline::new()
            .evaluate(&samples, &labels, &even_split(12))
            .unwrap();
        assert!((0.0..=0.5).contains(&error), "error = {error}");
    }

    #[test]
    fn error_is_a_rate() {
        let (samples, labels) = block_dataset();
        let error = EmbeddingBaseline::new()
            .evaluate(&samples, &labels, &even_split(12))
            .unwrap();
        assert!((0.0..=1.0).contains(&error));
    }

    #[test]
    fn deterministic_across_runs() {
        let (samples, labels) = block_dataset();
        let split = even_split(12);
        let baseline = EmbeddingBaseline::new();
        let a = baseline.evaluate(&samples, &labels, &split).unwrap();
        let b = baseline.evaluate(&samples, &labels, &split).unwrap();
        assert!((a - b).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_train_partition_rejected() {
        let (samples, labels) = block_dataset();
        let split = FoldSplit {
            train: vec![],
            test: (0..12).collect(),
        };
        let err = EmbeddingBaseline::new()
            .evaluate(&samples, &labels, &split)
            .unwrap_err();
        assert!(matches!(err, EvalError::EmptyPartition { n_train: 0, .. }));
    }

    #[test]
    fn empty_test_partition_rejected() {
        let (samples, labels) = block_dataset();
        let split = FoldSplit {
            train: (0..12).collect(),
            test: vec![],
        };
        let err = EmbeddingBaseline::new()
            .evaluate(&samples, &labels, &split)
            .unwrap_err();
        assert!(matches!(err, EvalError::EmptyPartition { n_test: 0, .. }));
    }

    #[test]
    fn label_count_mismatch_rejected() {
        let (samples, _) = block_dataset();
        let err = EmbeddingBaseline::new()
            .evaluate(&samples, &[0, 1], &even_split(12))
            .unwrap_err();
        assert!(matches!(err, EvalError::LabelCountMismatch { .. }));
    }

    #[test]
    fn non_square_samples_propagate_embed_error() {
        let samples = vec![
            Sample::new(vec![0.0; 6], 2, 3).unwrap(),
            Sample::new(vec![0.0; 6], 2, 3).unwrap(),
        ];
        let labels = vec![0, 1];
        let split = FoldSplit {
            train: vec![0],
            test: vec![1],
        };
        let err = EmbeddingBaseline::new()
            .evaluate(&samples, &labels, &split)
            .unwrap_err();
        assert!(matches!(err, EvalError::Embed(_)));
    }
}
