//! Compact storage variants and the uniform row accessor.

use nalgebra::{DMatrix, DVector, RealField};

use crate::Property;

/// Physical representation of a classified matrix.
///
/// Exactly one variant is chosen per matrix. Entries outside the declared
/// structural pattern are implicitly zero and are never stored, so every
/// variant round-trips losslessly through [`StoredMatrix::to_dense`].
#[derive(Clone, Debug, PartialEq)]
pub enum MatrixStorage<T> {
    /// The full n×n matrix.
    Dense { data: DMatrix<T> },
    /// Only the main diagonal.
    Diagonal { diag: DVector<T> },
    /// Row slices clipped to the band `|i − j| <= bandwidth`, up to
    /// `2·bandwidth + 1` entries per row.
    Band { bandwidth: usize, rows: Vec<Vec<T>> },
    /// Packed rows of the lower triangle, `n(n+1)/2` entries.
    LowerTriangular { data: Vec<T> },
    /// Packed rows of the upper triangle, `n(n+1)/2` entries.
    UpperTriangular { data: Vec<T> },
    /// Compressed sparse row: nonzero values, their column indices, and
    /// cumulative per-row offsets (`n + 1` entries).
    Sparse {
        values: Vec<T>,
        col_indices: Vec<usize>,
        row_offsets: Vec<usize>,
    },
}

/// Fieldless tag mirroring the [`MatrixStorage`] variants, exposed for
/// inspection and testing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Dense,
    Diagonal,
    Band,
    LowerTriangular,
    UpperTriangular,
    Sparse,
}

/// A classified square matrix: one storage variant plus the property tag,
/// immutable after classification.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredMatrix<T> {
    pub(crate) n: usize,
    pub(crate) storage: MatrixStorage<T>,
    pub(crate) property: Property,
}

/// Index of the first packed entry of row `i` in an upper-triangular array.
fn upper_row_start(n: usize, i: usize) -> usize {
    n * (n + 1) / 2 - (n - i) * (n - i + 1) / 2
}

impl<T: RealField + Copy> StoredMatrix<T> {
    /// Dimension of the (square) matrix.
    pub fn n(&self) -> usize {
        self.n
    }

    /// The storage variant chosen at classification.
    pub fn kind(&self) -> StorageKind {
        match self.storage {
            MatrixStorage::Dense { .. } => StorageKind::Dense,
            MatrixStorage::Diagonal { .. } => StorageKind::Diagonal,
            MatrixStorage::Band { .. } => StorageKind::Band,
            MatrixStorage::LowerTriangular { .. } => StorageKind::LowerTriangular,
            MatrixStorage::UpperTriangular { .. } => StorageKind::UpperTriangular,
            MatrixStorage::Sparse { .. } => StorageKind::Sparse,
        }
    }

    /// The convergence-relevant property tag.
    pub fn property(&self) -> Property {
        self.property
    }

    /// Reconstructs row `i` in full, zero-filled outside the stored entries.
    pub fn row(&self, i: usize) -> DVector<T> {
        assert!(i < self.n, "row index {} out of bounds (n = {})", i, self.n);

        let mut row = DVector::zeros(self.n);
        match &self.storage {
            MatrixStorage::Dense { data } => row.tr_copy_from(&data.row(i)),
            MatrixStorage::Diagonal { diag } => row[i] = diag[i],
            MatrixStorage::Band { bandwidth, rows } => {
                let start = i.saturating_sub(*bandwidth);
                for (offset, &value) in rows[i].iter().enumerate() {
                    row[start + offset] = value;
                }
            }
            MatrixStorage::LowerTriangular { data } => {
                let mut idx = i * (i + 1) / 2;
                for j in 0..=i {
                    row[j] = data[idx];
                    idx += 1;
                }
            }
            MatrixStorage::UpperTriangular { data } => {
                let mut idx = upper_row_start(self.n, i);
                for j in i..self.n {
                    row[j] = data[idx];
                    idx += 1;
                }
            }
            MatrixStorage::Sparse {
                values,
                col_indices,
                row_offsets,
            } => {
                for idx in row_offsets[i]..row_offsets[i + 1] {
                    row[col_indices[idx]] = values[idx];
                }
            }
        }
        row
    }

    /// Diagonal element of row `i`.
    ///
    /// Constant-time index arithmetic for every variant except sparse, which
    /// scans the row; a structurally absent diagonal reads as zero.
    pub fn diagonal(&self, i: usize) -> T {
        assert!(i < self.n, "row index {} out of bounds (n = {})", i, self.n);

        match &self.storage {
            MatrixStorage::Dense { data } => data[(i, i)],
            MatrixStorage::Diagonal { diag } => diag[i],
            MatrixStorage::Band { bandwidth, rows } => {
                rows[i][i - i.saturating_sub(*bandwidth)]
            }
            MatrixStorage::LowerTriangular { data } => data[i * (i + 1) / 2 + i],
            MatrixStorage::UpperTriangular { data } => data[upper_row_start(self.n, i)],
            MatrixStorage::Sparse {
                values,
                col_indices,
                row_offsets,
            } => {
                for idx in row_offsets[i]..row_offsets[i + 1] {
                    if col_indices[idx] == i {
                        return values[idx];
                    }
                }
                T::zero()
            }
        }
    }

    /// Off-diagonal nonzero entries of row `i` as `(column, value)` pairs in
    /// ascending column order.
    ///
    /// The solver's inner loop reads rows only through this method, so
    /// structurally absent entries are never visited.
    pub fn off_diagonal(&self, i: usize) -> Vec<(usize, T)> {
        assert!(i < self.n, "row index {} out of bounds (n = {})", i, self.n);

        let mut entries = Vec::new();
        match &self.storage {
            MatrixStorage::Dense { data } => {
                for j in 0..self.n {
                    let value = data[(i, j)];
                    if j != i && value != T::zero() {
                        entries.push((j, value));
                    }
                }
            }
            // a diagonal matrix has no off-diagonal entries at all
            MatrixStorage::Diagonal { .. } => {}
            MatrixStorage::Band { bandwidth, rows } => {
                let start = i.saturating_sub(*bandwidth);
                for (offset, &value) in rows[i].iter().enumerate() {
                    let j = start + offset;
                    if j != i && value != T::zero() {
                        entries.push((j, value));
                    }
                }
            }
            MatrixStorage::LowerTriangular { data } => {
                let mut idx = i * (i + 1) / 2;
                for j in 0..i {
                    let value = data[idx];
                    idx += 1;
                    if value != T::zero() {
                        entries.push((j, value));
                    }
                }
            }
            MatrixStorage::UpperTriangular { data } => {
                // the first packed entry of the row is the diagonal
                let mut idx = upper_row_start(self.n, i) + 1;
                for j in (i + 1)..self.n {
                    let value = data[idx];
                    idx += 1;
                    if value != T::zero() {
                        entries.push((j, value));
                    }
                }
            }
            MatrixStorage::Sparse {
                values,
                col_indices,
                row_offsets,
            } => {
                for idx in row_offsets[i]..row_offsets[i + 1] {
                    let j = col_indices[idx];
                    if j != i {
                        entries.push((j, values[idx]));
                    }
                }
            }
        }
        entries
    }

    /// Reconstructs the full dense matrix from the packed storage.
    pub fn to_dense(&self) -> DMatrix<T> {
        let mut full = DMatrix::zeros(self.n, self.n);
        for i in 0..self.n {
            full.row_mut(i).tr_copy_from(&self.row(i));
        }
        full
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{dmatrix, dvector};

    use super::*;

    #[test]
    fn band_rows_are_clipped_at_the_edges() {
        let m = dmatrix![
            2.0, 1.0, 0.0, 0.0;
            1.0, 2.0, 1.0, 0.0;
            0.0, 1.0, 2.0, 1.0;
            0.0, 0.0, 1.0, 2.0;
        ];
        let stored = StoredMatrix::from_dense(&m).unwrap();
        assert_eq!(stored.kind(), StorageKind::Band);

        assert_eq!(stored.row(0), dvector![2.0, 1.0, 0.0, 0.0]);
        assert_eq!(stored.row(2), dvector![0.0, 1.0, 2.0, 1.0]);
        assert_eq!(stored.diagonal(0), 2.0);
        assert_eq!(stored.diagonal(3), 2.0);
        assert_eq!(stored.off_diagonal(1), vec![(0, 1.0), (2, 1.0)]);
    }

    #[test]
    fn triangular_accessors_use_packed_indices() {
        let lower = dmatrix![
            1.0, 0.0, 0.0;
            2.0, 3.0, 0.0;
            4.0, 0.0, 5.0;
        ];
        let stored = StoredMatrix::from_dense(&lower).unwrap();
        assert_eq!(stored.kind(), StorageKind::LowerTriangular);
        assert_eq!(stored.diagonal(1), 3.0);
        assert_eq!(stored.row(2), dvector![4.0, 0.0, 5.0]);
        // the stored zero at (2, 1) is skipped
        assert_eq!(stored.off_diagonal(2), vec![(0, 4.0)]);

        let upper = lower.transpose();
        let stored = StoredMatrix::from_dense(&upper).unwrap();
        assert_eq!(stored.kind(), StorageKind::UpperTriangular);
        assert_eq!(stored.diagonal(0), 1.0);
        assert_eq!(stored.row(0), dvector![1.0, 2.0, 4.0]);
        assert_eq!(stored.off_diagonal(0), vec![(1, 2.0), (2, 4.0)]);
        assert_eq!(stored.off_diagonal(2), vec![]);
    }

    #[test]
    fn sparse_diagonal_lookup_scans_the_row() {
        // 6 of 9 entries are zero, and the zero at (0, 0) is structurally
        // absent from the CSR arrays
        let m = dmatrix![
            0.0, 0.0, 1.0;
            0.0, 1.0, 0.0;
            1.0, 0.0, 0.0;
        ];
        let stored = StoredMatrix::from_dense(&m).unwrap();
        assert_eq!(stored.kind(), StorageKind::Sparse);
        assert_eq!(stored.diagonal(0), 0.0);
        assert_eq!(stored.diagonal(1), 1.0);
        assert_eq!(stored.off_diagonal(0), vec![(2, 1.0)]);
        assert_eq!(stored.off_diagonal(1), vec![]);
    }

    #[test]
    fn every_variant_round_trips_to_dense() {
        let cases = [
            dmatrix![3.0, 0.0; 0.0, 4.0],
            dmatrix![1.0, 0.0; 2.0, 3.0],
            dmatrix![1.0, 2.0; 0.0, 3.0],
            dmatrix![
                2.0, 1.0, 0.0, 0.0;
                1.0, 2.0, 1.0, 0.0;
                0.0, 1.0, 2.0, 1.0;
                0.0, 0.0, 1.0, 2.0;
            ],
            dmatrix![
                0.0, 0.0, 1.0;
                0.0, 1.0, 0.0;
                1.0, 0.0, 0.0;
            ],
            dmatrix![1.0, 2.0; 3.0, 4.0],
        ];
        for m in cases {
            let stored = StoredMatrix::from_dense(&m).unwrap();
            assert_eq!(stored.to_dense(), m, "{:?} failed round-trip", stored.kind());
        }
    }
}
