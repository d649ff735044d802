//! Configuration builder for projection-forest training.

use crate::error::ForestError;
use crate::projection::{ImageGeometry, PatchBounds, ProjectionMatrix};
use crate::result::ForestFitResult;
use crate::split::SplitCriterion;

/// Strategy for determining the number of candidate projections per split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// Square root of total features.
    Sqrt,
    /// Log base 2 of total features.
    Log2,
    /// A fraction of total features (must be in (0.0, 1.0]).
    Fraction(f64),
    /// A fixed count.
    Fixed(usize),
    /// One candidate per feature.
    All,
}

/// Whether to compute out-of-bag evaluation during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OobMode {
    /// Compute OOB accuracy.
    Enabled,
    /// Skip OOB evaluation.
    Disabled,
}

/// Configuration for projection-forest training.
///
/// Construct via [`ProjectionForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter            | Default                   |
/// |----------------------|---------------------------|
/// | `projection_matrix`  | `Oblique`                 |
/// | `max_features`       | `Sqrt`                    |
/// | `density`            | `None` (1 / n_features)   |
/// | `geometry`           | `None`                    |
/// | `patch_bounds`       | `[1, 3]`                  |
/// | `max_depth`          | `None`                    |
/// | `min_samples_split`  | 2                         |
/// | `min_samples_leaf`   | 1                         |
/// | `criterion`          | `Gini`                    |
/// | `seed`               | 42                        |
/// | `oob_mode`           | `Disabled`                |
/// | `bootstrap_fraction` | 1.0                       |
#[derive(Debug, Clone)]
pub struct ProjectionForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) projection_matrix: ProjectionMatrix,
    pub(crate) max_features: MaxFeatures,
    pub(crate) density: Option<f64>,
    pub(crate) geometry: Option<ImageGeometry>,
    pub(crate) patch_bounds: PatchBounds,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) seed: u64,
    pub(crate) oob_mode: OobMode,
    pub(crate) bootstrap_fraction: f64,
}

impl ProjectionForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, ForestError> {
        if n_trees == 0 {
            return Err(ForestError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            projection_matrix: ProjectionMatrix::Oblique,
            max_features: MaxFeatures::Sqrt,
            density: None,
            geometry: None,
            patch_bounds: PatchBounds::default(),
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: SplitCriterion::Gini,
            seed: 42,
            oob_mode: OobMode::Disabled,
            bootstrap_fraction: 1.0,
        })
    }

    // --- Setters ---

    /// Set the projection-matrix variant.
    #[must_use]
    pub fn with_projection_matrix(mut self, projection_matrix: ProjectionMatrix) -> Self {
        self.projection_matrix = projection_matrix;
        self
    }

    /// Set the candidate-projection count strategy.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the oblique sampling density. `None` resolves to `1 / n_features`.
    #[must_use]
    pub fn with_density(mut self, density: Option<f64>) -> Self {
        self.density = density;
        self
    }

    /// Set the spatial layout of the flattened samples.
    ///
    /// Required by structured projection matrices; ignored by `Oblique`.
    #[must_use]
    pub fn with_geometry(mut self, geometry: ImageGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Set the patch-size bounds used by structured projection matrices.
    #[must_use]
    pub fn with_patch_bounds(mut self, patch_bounds: PatchBounds) -> Self {
        self.patch_bounds = patch_bounds;
        self
    }

    /// Set the maximum tree depth. `None` means unlimited.
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

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the OOB evaluation mode.
    #[must_use]
    pub fn with_oob_mode(mut self, oob_mode: OobMode) -> Self {
        self.oob_mode = oob_mode;
        self
    }

    /// Set the bootstrap fraction (proportion of samples drawn per tree).
    #[must_use]
    pub fn with_bootstrap_fraction(mut self, bootstrap_fraction: f64) -> Self {
        self.bootstrap_fraction = bootstrap_fraction;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the projection-matrix variant.
    #[must_use]
    pub fn projection_matrix(&self) -> ProjectionMatrix {
        self.projection_matrix
    }

    /// Return the candidate-count strategy.
    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    /// Return the configured geometry, if any.
    #[must_use]
    pub fn geometry(&self) -> Option<ImageGeometry> {
        self.geometry
    }

    /// Return the patch-size bounds.
    #[must_use]
    pub fn patch_bounds(&self) -> PatchBounds {
        self.patch_bounds
    }

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the split criterion.
    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the OOB evaluation mode.
    #[must_use]
    pub fn oob_mode(&self) -> OobMode {
        self.oob_mode
    }

    /// Return the bootstrap fraction.
    #[must_use]
    pub fn bootstrap_fraction(&self) -> f64 {
        self.bootstrap_fraction
    }

    /// Train a projection forest on the provided dataset.
    ///
    /// `features[sample_idx][feature_idx]` — flattened samples, row-major.
    /// `labels[sample_idx]` — class labels (zero-based).
    ///
    /// # Errors
    ///
    /// | Variant                                   | When                                             |
    /// |-------------------------------------------|--------------------------------------------------|
    /// | [`ForestError::EmptyDataset`]             | `features` is empty                              |
    /// | [`ForestError::ZeroFeatures`]             | rows have zero feature columns                   |
    /// | [`ForestError::FeatureCountMismatch`]     | rows have inconsistent lengths                   |
    /// | [`ForestError::LabelCountMismatch`]       | label count differs from sample count            |
    /// | [`ForestError::NonFiniteValue`]           | any value is NaN or infinite                     |
    /// | [`ForestError::InvalidMaxFeatures`]       | resolved max_features is outside [1, n_features] |
    /// | [`ForestError::InvalidDensity`]           | density is outside (0.0, 1.0]                    |
    /// | [`ForestError::InvalidBootstrapFraction`] | bootstrap_fraction is outside (0.0, 1.0]         |
    /// | [`ForestError::MissingGeometry`]          | structured variant without geometry              |
    /// | [`ForestError::InvalidGeometry`]          | geometry incompatible with the feature count     |
    /// | [`ForestError::PatchExceedsImage`]        | patch upper bound exceeds the image              |
    /// | [`ForestError::OobEvaluationFailed`]      | OOB enabled but no sample has any OOB tree       |
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<ForestFitResult, ForestError> {
        crate::forest::train(self, features, labels)
    }
}
