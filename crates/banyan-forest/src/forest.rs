//! Projection-forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{MaxFeatures, OobMode, ProjectionForestConfig};
use crate::error::ForestError;
use crate::oob::compute_oob;
use crate::projection::{ImageGeometry, ProjectionMatrix, ProjectionSampler};
use crate::result::{ForestFitResult, TrainingMetadata};
use crate::tree::{DecisionTree, DecisionTreeConfig};

/// A fitted projection-forest ensemble.
#[derive(Debug, Clone)]
pub struct ProjectionForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) projection_matrix: ProjectionMatrix,
}

/// Resolve `MaxFeatures` to a concrete candidate count.
pub(crate) fn resolve_max_features(
    max_features: MaxFeatures,
    n_features: usize,
) -> Result<usize, ForestError> {
    let resolved = match max_features {
        MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
        MaxFeatures::Log2 => (n_features as f64).log2().ceil().max(1.0) as usize,
        MaxFeatures::Fraction(f) => (n_features as f64 * f).ceil() as usize,
        MaxFeatures::Fixed(n) => n,
        MaxFeatures::All => n_features,
    };
    if resolved == 0 || resolved > n_features {
        return Err(ForestError::InvalidMaxFeatures {
            max_features: resolved,
            n_features,
        });
    }
    Ok(resolved)
}

/// Build the projection sampler for this fit, validating geometry and
/// patch bounds against the dataset.
fn build_sampler(
    config: &ProjectionForestConfig,
    n_features: usize,
) -> Result<ProjectionSampler, ForestError> {
    let density = config.density.unwrap_or(1.0 / n_features as f64);
    if density <= 0.0 || density > 1.0 {
        return Err(ForestError::InvalidDensity { density });
    }

    let matrix = config.projection_matrix;

    // Oblique sampling never consults the geometry; a 1-row layout stands in
    // when none was configured.
    let geometry = match (matrix.is_structured(), config.geometry) {
        (false, g) => g.unwrap_or(ImageGeometry::new(1, n_features)),
        (true, Some(g)) => g,
        (true, None) => {
            return Err(ForestError::MissingGeometry {
                name: matrix.name(),
            });
        }
    };

    if matrix.is_structured() {
        if geometry.n_features() != n_features {
            return Err(ForestError::InvalidGeometry {
                height: geometry.height(),
                width: geometry.width(),
                n_features,
            });
        }
        // Graph variants index vertices into both rows and columns.
        let needs_square = matches!(
            matrix,
            ProjectionMatrix::GraphNode | ProjectionMatrix::GraphEdge
        );
        if needs_square && geometry.height() != geometry.width() {
            return Err(ForestError::InvalidGeometry {
                height: geometry.height(),
                width: geometry.width(),
                n_features,
            });
        }
        if config.patch_bounds.max() > geometry.height().min(geometry.width()) {
            return Err(ForestError::PatchExceedsImage {
                max: config.patch_bounds.max(),
                height: geometry.height(),
                width: geometry.width(),
            });
        }
    }

    Ok(ProjectionSampler::new(
        matrix,
        n_features,
        density,
        geometry,
        config.patch_bounds,
    ))
}

/// Generate a bootstrap sample and the out-of-bag indices.
fn bootstrap_sample(
    n_samples: usize,
    draw_count: usize,
    rng: &mut impl Rng,
) -> (Vec<usize>, Vec<usize>) {
    let mut in_bag = vec![false; n_samples];
    let mut bootstrap_indices = Vec::with_capacity(draw_count);
    for _ in 0..draw_count {
        let idx = rng.gen_range(0..n_samples);
        bootstrap_indices.push(idx);
        in_bag[idx] = true;
    }
    let oob_indices: Vec<usize> = (0..n_samples).filter(|&i| !in_bag[i]).collect();
    (bootstrap_indices, oob_indices)
}

/// Train the projection-forest ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len(), projection = %config.projection_matrix))]
pub(crate) fn train(
    config: &ProjectionForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<ForestFitResult, ForestError> {
    // --- Validate inputs ---
    if features.is_empty() {
        return Err(ForestError::EmptyDataset);
    }
    let n_samples = features.len();
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(ForestError::ZeroFeatures);
    }
    if labels.len() != n_samples {
        return Err(ForestError::LabelCountMismatch {
            n_samples,
            n_labels: labels.len(),
        });
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(ForestError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &val) in row.iter().enumerate() {
            if !val.is_finite() {
                return Err(ForestError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
        }
    }

    // --- Validate config ---
    let max_features_resolved = resolve_max_features(config.max_features, n_features)?;

    if config.bootstrap_fraction <= 0.0 || config.bootstrap_fraction > 1.0 {
        return Err(ForestError::InvalidBootstrapFraction {
            fraction: config.bootstrap_fraction,
        });
    }

    let sampler = build_sampler(config, n_features)?;

    let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
    let draw_count = ((n_samples as f64) * config.bootstrap_fraction).ceil() as usize;

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_classes,
        n_candidates = max_features_resolved,
        draw_count,
        "training projection forest"
    );

    // Generate per-tree seeds from master RNG.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    // Capture config fields needed in closure (avoids borrowing config across thread boundary).
    let criterion = config.criterion;
    let max_depth = config.max_depth;
    let min_samples_split = config.min_samples_split;
    let min_samples_leaf = config.min_samples_leaf;
    let sampler_ref = &sampler;

    // Parallel tree training.
    let tree_results: Result<Vec<(DecisionTree, Vec<usize>)>, ForestError> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (bootstrap_indices, oob_indices) =
                bootstrap_sample(n_samples, draw_count, &mut rng);

            // Build bootstrap dataset: row-major features.
            let boot_features: Vec<Vec<f64>> = bootstrap_indices
                .iter()
                .map(|&i| features[i].clone())
                .collect();
            let boot_labels: Vec<usize> = bootstrap_indices.iter().map(|&i| labels[i]).collect();

            let tree_config = DecisionTreeConfig::new()
                .with_criterion(criterion)
                .with_max_depth(max_depth)
                .with_min_samples_split(min_samples_split)
                .with_min_samples_leaf(min_samples_leaf)
                .with_n_candidates(max_features_resolved)
                .with_seed(rng.r#gen());

            let tree = tree_config.fit(&boot_features, &boot_labels, sampler_ref)?;

            Ok((tree, oob_indices))
        })
        .collect();
    let tree_results = tree_results?;

    let mut trees = Vec::with_capacity(config.n_trees);
    let mut oob_indices_per_tree = Vec::with_capacity(config.n_trees);
    for (tree, oob) in tree_results {
        trees.push(tree);
        oob_indices_per_tree.push(oob);
    }

    debug!(n_trees_trained = trees.len(), "tree training complete");

    // OOB evaluation.
    let oob_score = if config.oob_mode == OobMode::Enabled {
        Some(compute_oob(
            &trees,
            features,
            labels,
            n_classes,
            &oob_indices_per_tree,
        )?)
    } else {
        None
    };

    let forest = ProjectionForest {
        trees,
        n_features,
        n_classes,
        projection_matrix: config.projection_matrix,
    };

    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_features,
        n_classes,
        n_samples,
        max_features_resolved,
    };

    info!(
        oob_accuracy = oob_score.as_ref().map(|s| s.accuracy),
        "projection forest training complete"
    );

    Ok(ForestFitResult::new(forest, oob_score, metadata))
}
