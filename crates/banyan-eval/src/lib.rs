//! Cross-validated evaluation of projection forests against a joint
//! spectral-embedding baseline.
//!
//! Three cooperating pieces, no persistent state: a stratified k-fold
//! splitter, per-fold evaluators (one fitting a projection forest per
//! named variant, one running the embedding + 1-NN baseline), and a
//! driver that assembles per-fold results into an error table or a
//! probability sweep. Fold iteration is sequential and fail-fast; any
//! internal parallelism belongs to the forest crate.

mod baseline;
mod driver;
mod error;
mod fold;
mod table;
mod variants;

pub use baseline::EmbeddingBaseline;
pub use driver::{BASELINE_LABEL, CrossValidation};
pub use error::EvalError;
pub use fold::{FoldSplit, StratifiedKFold};
pub use table::ErrorTable;
pub use variants::{ProbabilityMatrix, VariantConfig};
