//! Jacobi eigendecomposition for dense symmetric matrices.
//!
//! The matrices here are small (one per graph, sized by the vertex count),
//! so the classic cyclic Jacobi method is a good fit: deterministic, no
//! external linear-algebra dependency, and accurate to machine precision
//! for symmetric inputs.

/// Eigendecomposition of a symmetric matrix.
#[derive(Debug, Clone)]
pub(crate) struct Eigen {
    /// Eigenvalues ordered by descending magnitude.
    pub(crate) values: Vec<f64>,
    /// `vectors[k]` is the unit eigenvector paired with `values[k]`.
    pub(crate) vectors: Vec<Vec<f64>>,
}

/// Default sweep limit; Jacobi converges quadratically, so this is generous.
pub(crate) const MAX_SWEEPS: usize = 64;

/// Compute all eigenpairs of a symmetric matrix by cyclic Jacobi rotations.
///
/// `matrix` must be square and symmetric; callers symmetrize first. Sweeps
/// stop once the off-diagonal Frobenius norm drops below `tol` relative to
/// the matrix scale, or after `max_sweeps` full sweeps.
pub(crate) fn symmetric_eigen(matrix: &[Vec<f64>], max_sweeps: usize, tol: f64) -> Eigen {
    let n = matrix.len();
    if n == 0 {
        return Eigen {
            values: Vec::new(),
            vectors: Vec::new(),
        };
    }

    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    // v accumulates the rotations; its columns are the eigenvectors.
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let scale: f64 = a
        .iter()
        .flat_map(|row| row.iter())
        .map(|&x| x * x)
        .sum::<f64>()
        .sqrt()
        .max(1.0);

    for _ in 0..max_sweeps {
        if off_diagonal_norm(&a) <= tol * scale {
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p][q];
                if apq == 0.0 {
                    continue;
                }

                let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                // A <- Jᵀ A J, zeroing a[p][q].
                for k in 0..n {
                    let akp = a[k][p];
                    let akq = a[k][q];
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[p][k];
                    let aqk = a[q][k];
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                // V <- V J.
                for k in 0..n {
                    let vkp = v[k][p];
                    let vkq = v[k][q];
                    v[k][p] = c * vkp - s * vkq;
                    v[k][q] = s * vkp + c * vkq;
                }
            }
        }
    }

    // Extract eigenpairs and order by descending magnitude.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[j][j].abs().total_cmp(&a[i][i].abs()));

    let values: Vec<f64> = order.iter().map(|&i| a[i][i]).collect();
    let vectors: Vec<Vec<f64>> = order
        .iter()
        .map(|&col| (0..n).map(|row| v[row][col]).collect())
        .collect();

    Eigen { values, vectors }
}

/// Frobenius norm of the off-diagonal part.
fn off_diagonal_norm(a: &[Vec<f64>]) -> f64 {
    let n = a.len();
    let mut sum = 0.0;
    for i in 0..n {
        for j in 0..n {
            if i != j {
                sum += a[i][j] * a[i][j];
            }
        }
    }
    sum.sqrt()
}
