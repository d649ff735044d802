use banyan_embed::EmbedError;
use banyan_forest::ForestError;

/// Errors from cross-validated evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Returned when n_folds is less than 2.
    #[error("n_folds must be at least 2, got {n_folds}")]
    InvalidFoldCount {
        /// The invalid n_folds value provided.
        n_folds: usize,
    },

    /// Returned when a class has fewer samples than the number of folds.
    #[error("class {class} has only {count} samples, need at least {n_folds} for stratified CV")]
    TooFewSamplesForFolds {
        /// The class label with insufficient samples.
        class: usize,
        /// The number of samples belonging to that class.
        count: usize,
        /// The requested number of folds.
        n_folds: usize,
    },

    /// Returned when the dataset has zero samples.
    #[error("dataset has zero samples")]
    EmptyDataset,

    /// Returned when the label count differs from the sample count.
    #[error("got {n_labels} labels for {n_samples} samples")]
    LabelCountMismatch {
        /// Number of samples provided.
        n_samples: usize,
        /// Number of labels provided.
        n_labels: usize,
    },

    /// Returned when the variant list is empty.
    #[error("variant list is empty, nothing to evaluate")]
    EmptyVariantList,

    /// Returned when a fold partition leaves either side empty.
    #[error("fold partition has {n_train} train and {n_test} test samples; both must be non-empty")]
    EmptyPartition {
        /// Number of train indices in the partition.
        n_train: usize,
        /// Number of test indices in the partition.
        n_test: usize,
    },

    /// Returned when a partition index falls outside the dataset.
    #[error("partition index {index} is out of range for {n_samples} samples")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of samples in the dataset.
        n_samples: usize,
    },

    /// Returned when samples disagree on shape.
    #[error(
        "sample {index} is {got_height}x{got_width}, expected {expected_height}x{expected_width}"
    )]
    SampleShapeMismatch {
        /// Zero-based index of the offending sample.
        index: usize,
        /// Height of the first sample.
        expected_height: usize,
        /// Width of the first sample.
        expected_width: usize,
        /// Height of the offending sample.
        got_height: usize,
        /// Width of the offending sample.
        got_width: usize,
    },

    /// A forest-training or prediction failure, propagated unchanged.
    #[error(transparent)]
    Forest(#[from] ForestError),

    /// An embedding or 1-NN failure, propagated unchanged.
    #[error(transparent)]
    Embed(#[from] EmbedError),
}
