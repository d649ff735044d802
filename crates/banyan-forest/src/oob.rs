//! Out-of-bag (OOB) evaluation for the projection forest.

use crate::error::ForestError;
use crate::tree::DecisionTree;

/// Out-of-bag evaluation result.
#[derive(Debug, Clone)]
pub struct OobScore {
    /// OOB accuracy (fraction of correctly predicted OOB samples).
    pub accuracy: f64,
    /// Number of samples that had at least one OOB tree.
    pub n_oob_samples: usize,
}

/// Compute out-of-bag predictions and accuracy.
///
/// For each sample, only trees where the sample was NOT in the bootstrap
/// are used for prediction (majority vote). Samples with no OOB trees
/// are skipped.
pub(crate) fn compute_oob(
    trees: &[DecisionTree],
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
    oob_indices_per_tree: &[Vec<usize>],
) -> Result<OobScore, ForestError> {
    let n_samples = features.len();

    // For each sample, accumulate class votes from OOB trees.
    let mut oob_votes: Vec<Vec<usize>> = vec![vec![0; n_classes]; n_samples];
    let mut has_oob = vec![false; n_samples];

    for (tree_idx, oob_indices) in oob_indices_per_tree.iter().enumerate() {
        for &sample_idx in oob_indices {
            let pred = trees[tree_idx].predict(&features[sample_idx])?;
            oob_votes[sample_idx][pred] += 1;
            has_oob[sample_idx] = true;
        }
    }

    let n_oob_samples = has_oob.iter().filter(|&&h| h).count();
    if n_oob_samples == 0 {
        return Err(ForestError::OobEvaluationFailed {
            reason: "no sample has any OOB tree".to_string(),
        });
    }

    let mut correct = 0usize;
    for (i, votes) in oob_votes.iter().enumerate() {
        if !has_oob[i] {
            continue;
        }
        let predicted = votes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        if predicted == labels[i] {
            correct += 1;
        }
    }

    let accuracy = correct as f64 / n_oob_samples as f64;

    Ok(OobScore {
        accuracy,
        n_oob_samples,
    })
}
