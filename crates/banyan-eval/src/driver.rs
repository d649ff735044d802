//! Cross-validation driver: error-table and probability-sweep modes.

use banyan_embed::Sample;
use tracing::{info, instrument};

use crate::baseline::EmbeddingBaseline;
use crate::error::EvalError;
use crate::fold::StratifiedKFold;
use crate::table::ErrorTable;
use crate::variants::{ProbabilityMatrix, VariantConfig};

/// Column label for the embedding baseline in the error table.
pub const BASELINE_LABEL: &str = "MASE-1NN";

/// Cross-validation driver.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed`. Folds
/// are generated once per entry-point call; iteration is strictly
/// sequential and fail-fast — any fold failure aborts the whole run.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
}

impl CrossValidation {
    /// Create a driver with the given fold count.
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

    /// Set the random seed used for fold shuffling.
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

    /// Run every variant plus the embedding baseline over stratified folds.
    ///
    /// Returns a table with one row per fold (in generation order) and one
    /// column per variant (in config order) plus [`BASELINE_LABEL`].
    ///
    /// # Errors
    ///
    /// Configuration errors surface before any fitting; collaborator
    /// failures propagate unchanged from the fold that hit them.
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = samples.len()))]
    pub fn error_table(
        &self,
        samples: &[Sample],
        labels: &[usize],
        config: &VariantConfig,
    ) -> Result<ErrorTable, EvalError> {
        let folds = StratifiedKFold::new(self.n_folds)?
            .with_seed(self.seed)
            .split(labels)?;
        let baseline = EmbeddingBaseline::new();

        let mut columns: Vec<String> =
            config.variants().iter().map(|v| v.name().to_string()).collect();
        columns.push(BASELINE_LABEL.to_string());
        let mut table = ErrorTable::new(columns);

        for (fold_idx, fold) in folds.iter().enumerate() {
            let mut row = config.errors(samples, labels, fold)?;
            row.push(baseline.evaluate(samples, labels, fold)?);
            info!(fold = fold_idx, errors = ?row, "fold complete");
            table.push_row(row);
        }

        info!(means = ?table.column_means(), "cross-validation complete");
        Ok(table)
    }

    /// Run every variant in probability mode over stratified folds.
    ///
    /// No baseline and no tabular assembly: returns, per fold, the list of
    /// per-variant probability matrices in config order.
    ///
    /// # Errors
    ///
    /// Same as [`CrossValidation::error_table`].
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = samples.len()))]
    pub fn probability_sweep(
        &self,
        samples: &[Sample],
        labels: &[usize],
        config: &VariantConfig,
    ) -> Result<Vec<Vec<ProbabilityMatrix>>, EvalError> {
        let folds = StratifiedKFold::new(self.n_folds)?
            .with_seed(self.seed)
            .split(labels)?;

        let mut per_fold = Vec::with_capacity(folds.len());
        for (fold_idx, fold) in folds.iter().enumerate() {
            let matrices = config.probabilities(samples, labels, fold)?;
            info!(
                fold = fold_idx,
                n_variants = matrices.len(),
                n_test = fold.test.len(),
                "fold complete"
            );
            per_fold.push(matrices);
        }

        Ok(per_fold)
    }
}
