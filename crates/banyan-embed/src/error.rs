/// Errors from sample construction, spectral embedding, and 1-NN classification.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// Returned when a sample's value count does not match its shape.
    #[error("sample shape {height}x{width} does not match {n_values} values")]
    InvalidShape {
        /// Declared sample height.
        height: usize,
        /// Declared sample width.
        width: usize,
        /// Number of values provided.
        n_values: usize,
    },

    /// Returned when a sample value is NaN or infinite.
    #[error("non-finite value at row {row}, column {col}")]
    NonFiniteValue {
        /// Zero-based row of the offending value.
        row: usize,
        /// Zero-based column of the offending value.
        col: usize,
    },

    /// Returned when the embedding is given zero samples.
    #[error("cannot embed an empty sample stack")]
    EmptyStack,

    /// Returned when a sample in the stack is not square.
    #[error("sample {index} is {height}x{width}, but joint embedding requires square samples")]
    NotSquare {
        /// Zero-based index of the offending sample.
        index: usize,
        /// The sample's height.
        height: usize,
        /// The sample's width.
        width: usize,
    },

    /// Returned when samples in the stack disagree on size.
    #[error("sample {index} has {got} vertices, expected {expected}")]
    SizeMismatch {
        /// Zero-based index of the offending sample.
        index: usize,
        /// Vertex count of the first sample.
        expected: usize,
        /// Vertex count of the offending sample.
        got: usize,
    },

    /// Returned when fitting a classifier on zero training vectors.
    #[error("training set has zero vectors")]
    EmptyTrainingSet,

    /// Returned when the label count differs from the training vector count.
    #[error("got {n_labels} labels for {n_samples} training vectors")]
    LabelCountMismatch {
        /// Number of training vectors provided.
        n_samples: usize,
        /// Number of labels provided.
        n_labels: usize,
    },

    /// Returned when a vector has a different dimension than the fitted data.
    #[error("vector has dimension {got}, expected {expected}")]
    DimensionMismatch {
        /// The fitted dimension.
        expected: usize,
        /// The offending vector's dimension.
        got: usize,
    },

    /// Returned when the neighbor count is zero or exceeds the training set.
    #[error("n_neighbors must be in [1, {n_train}], got {k}")]
    InvalidNeighborCount {
        /// The invalid neighbor count.
        k: usize,
        /// Number of training vectors available.
        n_train: usize,
    },
}
