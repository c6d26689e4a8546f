//! Property detection: the convergence-relevant tag attached to a matrix
//! independent of its storage variant.

use nalgebra::{DMatrix, RealField};

/// Convergence-relevant property of a square matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Property {
    Normal,
    DiagonallyDominant,
    SymmetricPositiveDefinite,
}

impl Property {
    /// Detects the property tag for `m`.
    ///
    /// Diagonal dominance is checked first and wins ties; otherwise a
    /// symmetric matrix whose Cholesky factorization completes with strictly
    /// positive pivots is tagged SPD; everything else is normal. Pure and
    /// deterministic.
    pub fn detect<T: RealField + Copy>(m: &DMatrix<T>) -> Self {
        if is_diagonally_dominant(m) {
            Property::DiagonallyDominant
        } else if is_symmetric(m) && cholesky(m).is_some() {
            Property::SymmetricPositiveDefinite
        } else {
            Property::Normal
        }
    }

    /// True when Gauss-Seidel iteration is guaranteed to converge for a
    /// matrix carrying this tag. Advisory only; a `Normal` matrix may still
    /// converge.
    pub fn guarantees_convergence(self) -> bool {
        matches!(
            self,
            Property::DiagonallyDominant | Property::SymmetricPositiveDefinite
        )
    }
}

/// Every row's diagonal magnitude covers the magnitude sum of the rest of
/// its row.
fn is_diagonally_dominant<T: RealField + Copy>(m: &DMatrix<T>) -> bool {
    let n = m.nrows();
    for i in 0..n {
        let mut sum = T::zero();
        for j in 0..n {
            if j != i {
                sum += m[(i, j)].abs();
            }
        }
        if m[(i, i)].abs() < sum {
            return false;
        }
    }
    true
}

fn is_symmetric<T: RealField + Copy>(m: &DMatrix<T>) -> bool {
    let n = m.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            if m[(i, j)] != m[(j, i)] {
                return false;
            }
        }
    }
    true
}

/// Cholesky factorization `A = L·Lᵀ` of a symmetric matrix.
///
/// Returns the lower-triangular factor, or `None` as soon as a pivot fails
/// to be strictly positive, which doubles as the positive-definiteness test.
fn cholesky<T: RealField + Copy>(m: &DMatrix<T>) -> Option<DMatrix<T>> {
    let n = m.nrows();
    let mut l = DMatrix::zeros(n, n);

    for i in 0..n {
        for j in 0..=i {
            let mut sum = T::zero();
            for k in 0..j {
                sum += l[(i, k)] * l[(j, k)];
            }
            if i == j {
                let pivot = m[(i, i)] - sum;
                if pivot <= T::zero() {
                    return None;
                }
                l[(i, j)] = pivot.sqrt();
            } else {
                l[(i, j)] = (m[(i, j)] - sum) / l[(j, j)];
            }
        }
    }
    Some(l)
}
