//! Classification of a dense matrix into its compact storage variant.

use nalgebra::{DMatrix, RealField};

use crate::{Error, MatrixStorage, Property, StoredMatrix};

impl<T: RealField + Copy> StoredMatrix<T> {
    /// Inspects `m`, detects its property tag, and packs it into the most
    /// compact of the six storage variants.
    ///
    /// The variant precedence is strict, first match wins: diagonal, then
    /// triangular (lower before upper), then band (bandwidth < n−1), then
    /// sparse (strictly more than half of all entries zero), then dense.
    /// Classification is pure and deterministic, and cannot fail for a
    /// square matrix; dense is always a valid fallback.
    ///
    /// # Errors
    ///
    /// [`Error::NotSquare`] if the matrix is empty or not n×n.
    pub fn from_dense(m: &DMatrix<T>) -> Result<Self, Error> {
        let n = m.nrows();
        if n == 0 || m.ncols() != n {
            return Err(Error::NotSquare {
                nrows: n,
                ncols: m.ncols(),
            });
        }

        Ok(StoredMatrix {
            n,
            storage: encode(m),
            property: Property::detect(m),
        })
    }
}

fn encode<T: RealField + Copy>(m: &DMatrix<T>) -> MatrixStorage<T> {
    let n = m.nrows();

    if is_diagonal(m) {
        return MatrixStorage::Diagonal { diag: m.diagonal() };
    }

    match triangular_kind(m) {
        Some(Triangle::Lower) => {
            return MatrixStorage::LowerTriangular { data: pack_lower(m) }
        }
        Some(Triangle::Upper) => {
            return MatrixStorage::UpperTriangular { data: pack_upper(m) }
        }
        None => {}
    }

    let w = bandwidth(m);
    if w < n - 1 {
        return MatrixStorage::Band {
            bandwidth: w,
            rows: pack_band(m, w),
        };
    }

    if is_sparse(m) {
        let (values, col_indices, row_offsets) = pack_csr(m);
        return MatrixStorage::Sparse {
            values,
            col_indices,
            row_offsets,
        };
    }

    MatrixStorage::Dense { data: m.clone() }
}

fn is_diagonal<T: RealField + Copy>(m: &DMatrix<T>) -> bool {
    let n = m.nrows();
    for i in 0..n {
        for j in 0..n {
            if i != j && m[(i, j)] != T::zero() {
                return false;
            }
        }
    }
    true
}

enum Triangle {
    Lower,
    Upper,
}

fn triangular_kind<T: RealField + Copy>(m: &DMatrix<T>) -> Option<Triangle> {
    let n = m.nrows();
    let mut lower = true;
    let mut upper = true;
    for i in 0..n {
        for j in 0..n {
            if m[(i, j)] != T::zero() {
                if i > j {
                    upper = false;
                }
                if i < j {
                    lower = false;
                }
            }
        }
    }
    // lower is checked first; a matrix satisfying both is diagonal and was
    // already encoded as such
    if lower {
        Some(Triangle::Lower)
    } else if upper {
        Some(Triangle::Upper)
    } else {
        None
    }
}

/// Largest `|i − j|` over the nonzero entries.
fn bandwidth<T: RealField + Copy>(m: &DMatrix<T>) -> usize {
    let n = m.nrows();
    let mut w = 0;
    for i in 0..n {
        for j in 0..n {
            if m[(i, j)] != T::zero() {
                w = w.max(i.abs_diff(j));
            }
        }
    }
    w
}

fn is_sparse<T: RealField + Copy>(m: &DMatrix<T>) -> bool {
    let zeros = m.iter().filter(|value| **value == T::zero()).count();
    2 * zeros > m.len()
}

fn pack_lower<T: RealField + Copy>(m: &DMatrix<T>) -> Vec<T> {
    let n = m.nrows();
    let mut data = Vec::with_capacity(n * (n + 1) / 2);
    for i in 0..n {
        for j in 0..=i {
            data.push(m[(i, j)]);
        }
    }
    data
}

fn pack_upper<T: RealField + Copy>(m: &DMatrix<T>) -> Vec<T> {
    let n = m.nrows();
    let mut data = Vec::with_capacity(n * (n + 1) / 2);
    for i in 0..n {
        for j in i..n {
            data.push(m[(i, j)]);
        }
    }
    data
}

fn pack_band<T: RealField + Copy>(m: &DMatrix<T>, w: usize) -> Vec<Vec<T>> {
    let n = m.nrows();
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(w);
            let hi = (i + w).min(n - 1);
            (lo..=hi).map(|j| m[(i, j)]).collect()
        })
        .collect()
}

fn pack_csr<T: RealField + Copy>(m: &DMatrix<T>) -> (Vec<T>, Vec<usize>, Vec<usize>) {
    let n = m.nrows();
    let mut values = Vec::new();
    let mut col_indices = Vec::new();
    let mut row_offsets = Vec::with_capacity(n + 1);

    row_offsets.push(0);
    for i in 0..n {
        for j in 0..n {
            let value = m[(i, j)];
            if value != T::zero() {
                values.push(value);
                col_indices.push(j);
            }
        }
        row_offsets.push(values.len());
    }
    (values, col_indices, row_offsets)
}
