/// Errors from projection-forest operations.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth {
        /// The invalid max_depth value provided.
        max_depth: usize,
    },

    /// Returned when min_samples_split is less than 2.
    #[error("min_samples_split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit {
        /// The invalid min_samples_split value provided.
        min_samples_split: usize,
    },

    /// Returned when min_samples_leaf is zero.
    #[error("min_samples_leaf must be at least 1, got {min_samples_leaf}")]
    InvalidMinSamplesLeaf {
        /// The invalid min_samples_leaf value provided.
        min_samples_leaf: usize,
    },

    /// Returned when max_features resolves to 0 or exceeds n_features.
    #[error("max_features resolved to {max_features}, but must be in [1, {n_features}]")]
    InvalidMaxFeatures {
        /// The resolved max_features value.
        max_features: usize,
        /// The number of features in the dataset.
        n_features: usize,
    },

    /// Returned when bootstrap_fraction is not in (0.0, 1.0].
    #[error("bootstrap_fraction must be in (0.0, 1.0], got {fraction}")]
    InvalidBootstrapFraction {
        /// The invalid bootstrap_fraction value provided.
        fraction: f64,
    },

    /// Returned when the oblique projection density is not in (0.0, 1.0].
    #[error("projection density must be in (0.0, 1.0], got {density}")]
    InvalidDensity {
        /// The invalid density value provided.
        density: f64,
    },

    /// Returned when a projection-matrix name is not one of the known set.
    #[error(
        "unknown projection matrix \"{name}\" (expected RerF, S-RerF, Graph-Node-RerF, or Graph-Edge-RerF)"
    )]
    UnknownProjectionMatrix {
        /// The unrecognized name.
        name: String,
    },

    /// Returned when a structured projection matrix is configured without image geometry.
    #[error("projection matrix {name} requires image geometry, but none was configured")]
    MissingGeometry {
        /// Display name of the projection matrix.
        name: &'static str,
    },

    /// Returned when the configured geometry does not match the feature count,
    /// or a graph projection is given a non-square geometry.
    #[error("geometry {height}x{width} is incompatible with {n_features} features")]
    InvalidGeometry {
        /// Configured image height.
        height: usize,
        /// Configured image width.
        width: usize,
        /// Number of feature columns in the dataset.
        n_features: usize,
    },

    /// Returned when patch bounds are out of order or zero.
    #[error("patch bounds must satisfy 1 <= min <= max, got [{min}, {max}]")]
    InvalidPatchBounds {
        /// The lower patch-size bound provided.
        min: usize,
        /// The upper patch-size bound provided.
        max: usize,
    },

    /// Returned when the maximum patch size exceeds the image geometry.
    #[error("patch size {max} exceeds the {height}x{width} image")]
    PatchExceedsImage {
        /// The upper patch-size bound provided.
        max: usize,
        /// Configured image height.
        height: usize,
        /// Configured image width.
        width: usize,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when the label count differs from the sample count.
    #[error("got {n_labels} labels for {n_samples} samples")]
    LabelCountMismatch {
        /// Number of samples provided.
        n_samples: usize,
        /// Number of labels provided.
        n_labels: usize,
    },

    /// Returned when a sample has a different number of features at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when OOB evaluation fails (no sample has any OOB tree).
    #[error("OOB evaluation failed: {reason}")]
    OobEvaluationFailed {
        /// Human-readable description of why OOB evaluation failed.
        reason: String,
    },
}
