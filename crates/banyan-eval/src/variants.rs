//! Multi-variant forest evaluation for one fold.

use banyan_embed::Sample;
use banyan_forest::{
    ForestFitResult, ImageGeometry, MaxFeatures, PatchBounds, ProjectionForestConfig,
    ProjectionMatrix,
};
use tracing::debug;

use crate::error::EvalError;
use crate::fold::FoldSplit;

/// Shared configuration for evaluating a list of projection-matrix variants.
///
/// Construct via [`VariantConfig::new`], then chain `with_*` methods. The
/// default variant list is [`ProjectionMatrix::ALL`], an immutable constant;
/// callers narrow it explicitly.
///
/// # Defaults
///
/// | Parameter      | Default                  |
/// |----------------|--------------------------|
/// | `variants`     | `ProjectionMatrix::ALL`  |
/// | `sporf_mtry`   | `Sqrt`                   |
/// | `morf_mtry`    | `Sqrt`                   |
/// | `patch_bounds` | `[1, 3]`                 |
/// | `seed`         | 42                       |
#[derive(Debug, Clone)]
pub struct VariantConfig {
    variants: Vec<ProjectionMatrix>,
    n_trees: usize,
    sporf_mtry: MaxFeatures,
    morf_mtry: MaxFeatures,
    patch_bounds: PatchBounds,
    seed: u64,
}

impl VariantConfig {
    /// Create a config with the given forest size per variant.
    ///
    /// # Errors
    ///
    /// Returns [`banyan_forest::ForestError::InvalidTreeCount`] if `n_trees`
    /// is zero.
    pub fn new(n_trees: usize) -> Result<Self, EvalError> {
        // Probe the forest config so the tree count fails here, not per fold.
        ProjectionForestConfig::new(n_trees)?;
        Ok(Self {
            variants: ProjectionMatrix::ALL.to_vec(),
            n_trees,
            sporf_mtry: MaxFeatures::Sqrt,
            morf_mtry: MaxFeatures::Sqrt,
            patch_bounds: PatchBounds::default(),
            seed: 42,
        })
    }

    /// Set the variant list, evaluated in the given order.
    #[must_use]
    pub fn with_variants(mut self, variants: Vec<ProjectionMatrix>) -> Self {
        self.variants = variants;
        self
    }

    /// Set the candidate-count strategy for the unstructured variant.
    #[must_use]
    pub fn with_sporf_mtry(mut self, sporf_mtry: MaxFeatures) -> Self {
        self.sporf_mtry = sporf_mtry;
        self
    }

    /// Set the candidate-count strategy shared by the structured variants.
    #[must_use]
    pub fn with_morf_mtry(mut self, morf_mtry: MaxFeatures) -> Self {
        self.morf_mtry = morf_mtry;
        self
    }

    /// Set the patch-size bounds shared by the structured variants.
    #[must_use]
    pub fn with_patch_bounds(mut self, patch_bounds: PatchBounds) -> Self {
        self.patch_bounds = patch_bounds;
        self
    }

    /// Set the random seed handed to every forest fit.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the variant list.
    #[must_use]
    pub fn variants(&self) -> &[ProjectionMatrix] {
        &self.variants
    }

    /// Return the forest size per variant.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the patch-size bounds.
    #[must_use]
    pub fn patch_bounds(&self) -> PatchBounds {
        self.patch_bounds
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Evaluate every variant on one fold and return its misclassification
    /// rate, in variant-list order.
    ///
    /// # Errors
    ///
    /// Configuration errors (shape or count mismatches, empty partitions)
    /// surface before any fitting; forest failures propagate unchanged.
    pub fn errors(
        &self,
        samples: &[Sample],
        labels: &[usize],
        split: &FoldSplit,
    ) -> Result<Vec<f64>, EvalError> {
        let prepared = self.prepare(samples, labels, split)?;
        let mut errors = Vec::with_capacity(self.variants.len());
        for &variant in &self.variants {
            let fitted = self.fit_variant(variant, &prepared)?;
            let predictions = fitted.forest().predict_batch(&prepared.test_x)?;
            let mismatches = predictions
                .iter()
                .zip(&prepared.test_y)
                .filter(|&(&p, &l)| p != l)
                .count();
            let error = mismatches as f64 / prepared.test_y.len() as f64;
            debug!(variant = %variant, error, "variant evaluated");
            errors.push(error);
        }
        Ok(errors)
    }

    /// Evaluate every variant on one fold and return its class-probability
    /// matrix over the test samples, in variant-list order.
    ///
    /// # Errors
    ///
    /// Same as [`VariantConfig::errors`].
    pub fn probabilities(
        &self,
        samples: &[Sample],
        labels: &[usize],
        split: &FoldSplit,
    ) -> Result<Vec<ProbabilityMatrix>, EvalError> {
        let prepared = self.prepare(samples, labels, split)?;
        let mut matrices = Vec::with_capacity(self.variants.len());
        for &variant in &self.variants {
            let fitted = self.fit_variant(variant, &prepared)?;
            let distributions = fitted.forest().predict_proba_batch(&prepared.test_x)?;
            let rows: Vec<Vec<f64>> = distributions
                .into_iter()
                .map(|d| d.into_vec())
                .collect();
            debug!(variant = %variant, n_rows = rows.len(), "variant probabilities computed");
            matrices.push(ProbabilityMatrix {
                rows,
                n_classes: fitted.forest().n_classes(),
            });
        }
        Ok(matrices)
    }

    /// Validate the fold and materialize flattened train/test subsets.
    fn prepare(
        &self,
        samples: &[Sample],
        labels: &[usize],
        split: &FoldSplit,
    ) -> Result<Prepared, EvalError> {
        if samples.is_empty() {
            return Err(EvalError::EmptyDataset);
        }
        if labels.len() != samples.len() {
            return Err(EvalError::LabelCountMismatch {
                n_samples: samples.len(),
                n_labels: labels.len(),
            });
        }
        if self.variants.is_empty() {
            return Err(EvalError::EmptyVariantList);
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

        let (height, width) = (samples[0].height(), samples[0].width());
        for (index, sample) in samples.iter().enumerate() {
            if sample.height() != height || sample.width() != width {
                return Err(EvalError::SampleShapeMismatch {
                    index,
                    expected_height: height,
                    expected_width: width,
                    got_height: sample.height(),
                    got_width: sample.width(),
                });
            }
        }

        let flatten = |indices: &[usize]| -> Vec<Vec<f64>> {
            indices
                .iter()
                .map(|&i| samples[i].as_slice().to_vec())
                .collect()
        };
        let gather = |indices: &[usize]| -> Vec<usize> {
            indices.iter().map(|&i| labels[i]).collect()
        };

        Ok(Prepared {
            train_x: flatten(&split.train),
            train_y: gather(&split.train),
            test_x: flatten(&split.test),
            test_y: gather(&split.test),
            height,
        })
    }

    /// Fit one variant's forest on the prepared training subset.
    ///
    /// Both spatial dimensions are inferred as the sample height, matching
    /// how the flattened layout is produced.
    fn fit_variant(
        &self,
        variant: ProjectionMatrix,
        prepared: &Prepared,
    ) -> Result<ForestFitResult, EvalError> {
        let mtry = if variant.is_structured() {
            self.morf_mtry
        } else {
            self.sporf_mtry
        };
        let config = ProjectionForestConfig::new(self.n_trees)?
            .with_projection_matrix(variant)
            .with_max_features(mtry)
            .with_geometry(ImageGeometry::new(prepared.height, prepared.height))
            .with_patch_bounds(self.patch_bounds)
            .with_seed(self.seed);
        Ok(config.fit(&prepared.train_x, &prepared.train_y)?)
    }
}

/// Materialized per-fold train/test subsets, flattened row-major.
struct Prepared {
    train_x: Vec<Vec<f64>>,
    train_y: Vec<usize>,
    test_x: Vec<Vec<f64>>,
    test_y: Vec<usize>,
    height: usize,
}

/// Class-probability predictions for one variant over one fold's test set.
#[derive(Debug, Clone)]
pub struct ProbabilityMatrix {
    rows: Vec<Vec<f64>>,
    n_classes: usize,
}

impl ProbabilityMatrix {
    /// Per-test-sample probability rows, in test-index order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Return the number of test samples.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return the number of class columns.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}
