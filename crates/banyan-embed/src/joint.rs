//! Joint spectral embedding of a stack of square samples.
//!
//! Embeds all samples into one shared latent space: each sample is
//! spectrally embedded on its own, the per-sample embeddings are
//! concatenated and reduced to a shared orthonormal basis, and every
//! sample is then represented by its score matrix against that basis.
//! Samples with similar structure land near each other in score space,
//! which is what the 1-NN baseline classifier consumes.

use tracing::{debug, instrument};

use crate::EmbedError;
use crate::dimension::select_dimension;
use crate::eigen::{MAX_SWEEPS, symmetric_eigen};
use crate::sample::Sample;

const EIGEN_TOL: f64 = 1e-12;

/// Configuration for the joint spectral embedding.
///
/// # Defaults
///
/// | Parameter      | Default                     |
/// |----------------|-----------------------------|
/// | `n_components` | `None` (automatic elbow)    |
/// | `scaled`       | `true`                      |
#[derive(Debug, Clone)]
pub struct JointEmbeddingConfig {
    n_components: Option<usize>,
    scaled: bool,
}

impl JointEmbeddingConfig {
    /// Create a config with automatic dimension selection and scaling enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            n_components: None,
            scaled: true,
        }
    }

    /// Fix the embedding dimension instead of selecting it automatically.
    ///
    /// The dimension is clamped to `[1, n_vertices]` at fit time.
    #[must_use]
    pub fn with_n_components(mut self, n_components: Option<usize>) -> Self {
        self.n_components = n_components;
        self
    }

    /// Toggle scaling of eigenvectors by the square root of their
    /// eigenvalue magnitudes.
    #[must_use]
    pub fn with_scaled(mut self, scaled: bool) -> Self {
        self.scaled = scaled;
        self
    }

    /// Return the fixed component count, if any.
    #[must_use]
    pub fn n_components(&self) -> Option<usize> {
        self.n_components
    }

    /// Return whether eigenvector scaling is enabled.
    #[must_use]
    pub fn scaled(&self) -> bool {
        self.scaled
    }

    /// Embed a stack of square samples into a shared latent space.
    ///
    /// Sample order is preserved: `scores()[i]` is the embedding vector of
    /// `samples[i]`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::EmptyStack`] | `samples` is empty |
    /// | [`EmbedError::NotSquare`] | a sample has height != width |
    /// | [`EmbedError::SizeMismatch`] | samples disagree on vertex count |
    #[instrument(skip_all, fields(n_samples = samples.len()))]
    pub fn fit(&self, samples: &[Sample]) -> Result<JointEmbedding, EmbedError> {
        if samples.is_empty() {
            return Err(EmbedError::EmptyStack);
        }
        for (index, sample) in samples.iter().enumerate() {
            if !sample.is_square() {
                return Err(EmbedError::NotSquare {
                    index,
                    height: sample.height(),
                    width: sample.width(),
                });
            }
        }
        let n = samples[0].height();
        for (index, sample) in samples.iter().enumerate() {
            if sample.height() != n {
                return Err(EmbedError::SizeMismatch {
                    index,
                    expected: n,
                    got: sample.height(),
                });
            }
        }

        // Stage 1: per-sample spectral embedding, concatenated column-wise.
        let mut joint_columns: Vec<Vec<f64>> = Vec::new();
        for sample in samples {
            let eig = symmetric_eigen(&symmetrize(sample), MAX_SWEEPS, EIGEN_TOL);
            let magnitudes: Vec<f64> = eig.values.iter().map(|v| v.abs()).collect();
            let d_i = self.resolve_components(&magnitudes, n);
            for k in 0..d_i {
                let factor = if self.scaled {
                    magnitudes[k].sqrt()
                } else {
                    1.0
                };
                joint_columns.push(eig.vectors[k].iter().map(|&x| x * factor).collect());
            }
        }

        // Stage 2: shared basis from the leading left singular directions of
        // the concatenation, via its n x n Gram matrix.
        let mut gram = vec![vec![0.0; n]; n];
        for col in &joint_columns {
            for i in 0..n {
                for j in 0..n {
                    gram[i][j] += col[i] * col[j];
                }
            }
        }
        let gram_eig = symmetric_eigen(&gram, MAX_SWEEPS, EIGEN_TOL);
        let singular_values: Vec<f64> = gram_eig
            .values
            .iter()
            .map(|&v| v.max(0.0).sqrt())
            .collect();
        let d = self.resolve_components(&singular_values, n);
        let basis: Vec<Vec<f64>> = gram_eig.vectors[..d].to_vec();

        debug!(
            n_vertices = n,
            joint_columns = joint_columns.len(),
            n_components = d,
            "joint embedding basis computed"
        );

        // Stage 3: per-sample score matrices against the shared basis.
        let scores = samples
            .iter()
            .map(|sample| score_matrix(sample, &basis))
            .collect();

        Ok(JointEmbedding {
            scores,
            n_components: d,
            basis,
        })
    }

    fn resolve_components(&self, spectrum: &[f64], n: usize) -> usize {
        self.n_components
            .unwrap_or_else(|| select_dimension(spectrum))
            .max(1)
            .min(n)
    }
}

impl Default for JointEmbeddingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A fitted joint embedding: one score vector per input sample.
#[derive(Debug, Clone)]
pub struct JointEmbedding {
    scores: Vec<Vec<f64>>,
    n_components: usize,
    basis: Vec<Vec<f64>>,
}

impl JointEmbedding {
    /// Per-sample embedding vectors (flattened score matrices of length
    /// `n_components²`), in input order.
    #[must_use]
    pub fn scores(&self) -> &[Vec<f64>] {
        &self.scores
    }

    /// Return the selected embedding dimension.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Return the shared basis; `basis()[k]` is the k-th direction.
    #[must_use]
    pub fn basis(&self) -> &[Vec<f64>] {
        &self.basis
    }
}

/// `(A + Aᵀ) / 2` as a dense matrix.
fn symmetrize(sample: &Sample) -> Vec<Vec<f64>> {
    let n = sample.height();
    (0..n)
        .map(|i| {
            (0..n)
                .map(|j| (sample.get(i, j) + sample.get(j, i)) / 2.0)
                .collect()
        })
        .collect()
}

/// Flattened `Vᵀ A V` score matrix for one sample.
fn score_matrix(sample: &Sample, basis: &[Vec<f64>]) -> Vec<f64> {
    let n = sample.height();
    let d = basis.len();

    // tmp[r][j] = Σ_i basis[r][i] * A[i][j]
    let mut tmp = vec![vec![0.0; n]; d];
    for (r, direction) in basis.iter().enumerate() {
        for j in 0..n {
            let mut acc = 0.0;
            for (i, &b) in direction.iter().enumerate() {
                acc += b * sample.get(i, j);
            }
            tmp[r][j] = acc;
        }
    }

    let mut scores = Vec::with_capacity(d * d);
    for r in 0..d {
        for c in 0..d {
            let mut acc = 0.0;
            for j in 0..n {
                acc += tmp[r][j] * basis[c][j];
            }
            scores.push(acc);
        }
    }
    scores
}
