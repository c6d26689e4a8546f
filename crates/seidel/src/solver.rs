//! The Gauss-Seidel iteration engine.

use log::warn;
use nalgebra::{DMatrix, DVector, RealField};
use num_traits::NumCast;

use storage::{Property, StorageKind, StoredMatrix};

use crate::Error;

/// Snapshot of one completed sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationRecord<T> {
    /// Solution at the start of the sweep.
    pub previous: DVector<T>,
    /// Solution after the sweep.
    pub current: DVector<T>,
    /// Infinity norm of the step `current − previous`.
    pub error: T,
}

/// Progress of a solver instance.
///
/// Transitions are `NotYet → Solved` (tolerance met) or
/// `NotYet → DidNotConverge` (sweep budget exhausted); re-solving never
/// returns an instance to `NotYet`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolverState {
    NotYet,
    Solved,
    DidNotConverge,
}

/// Gauss-Seidel solver for a square system `Ax = b`.
///
/// The matrix is classified and packed once at construction; sweeps then
/// read it only through the storage crate's row accessor, so structurally
/// absent entries are never visited. A solver exclusively owns its matrix,
/// right-hand side, iteration archive, and state; independent instances
/// share nothing and can be driven from separate threads without locking.
#[derive(Clone, Debug)]
pub struct Solver<T: RealField + Copy> {
    matrix: StoredMatrix<T>,
    vector: DVector<T>,
    archive: Option<Vec<IterationRecord<T>>>,
    state: SolverState,
}

impl<T: RealField + Copy> Solver<T> {
    /// Convergence tolerance used by [`Solver::solve_default`].
    pub const DEFAULT_TOLERANCE: f64 = 1e-8;
    /// Sweep limit used by [`Solver::solve_default`].
    pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

    /// Creates a solver with iteration archiving enabled.
    ///
    /// # Errors
    ///
    /// [`Error::IncompatibleSizes`] if the vector length differs from the
    /// matrix row count, or the storage crate's `NotSquare` for an empty or
    /// non-square matrix.
    pub fn new(matrix: DMatrix<T>, vector: DVector<T>) -> Result<Self, Error> {
        Self::build(matrix, vector, true)
    }

    /// Creates a solver that keeps no per-sweep history.
    pub fn without_archive(matrix: DMatrix<T>, vector: DVector<T>) -> Result<Self, Error> {
        Self::build(matrix, vector, false)
    }

    fn build(matrix: DMatrix<T>, vector: DVector<T>, archive: bool) -> Result<Self, Error> {
        if vector.len() != matrix.nrows() {
            return Err(Error::IncompatibleSizes {
                rows: matrix.nrows(),
                len: vector.len(),
            });
        }
        let matrix = StoredMatrix::from_dense(&matrix)?;

        Ok(Solver {
            matrix,
            vector,
            archive: archive.then(Vec::new),
            state: SolverState::NotYet,
        })
    }

    /// Runs Gauss-Seidel sweeps until the infinity norm of the step drops
    /// below `tolerance` or `max_iterations` sweeps have been performed.
    ///
    /// Each sweep updates `x[i]` in place from the already-updated
    /// components of the same sweep, which is what distinguishes
    /// Gauss-Seidel from Jacobi iteration. On convergence the state becomes
    /// [`SolverState::Solved`] and iteration stops early; an exhausted sweep
    /// budget leaves [`SolverState::DidNotConverge`], and the last iterate
    /// is still returned as a best-effort approximation. Callers must
    /// inspect [`Solver::state`] to tell the two outcomes apart.
    ///
    /// If the matrix is neither diagonally dominant nor symmetric positive
    /// definite, a warning is logged and iteration proceeds regardless.
    ///
    /// # Errors
    ///
    /// * [`Error::ZeroDiagonal`] if any diagonal element is zero; every row
    ///   is checked before the first sweep, so no partial solution is ever
    ///   produced.
    /// * [`Error::IncompatibleSizes`] if `initial_guess` has the wrong
    ///   length.
    pub fn solve(
        &mut self,
        tolerance: T,
        max_iterations: usize,
        initial_guess: Option<&DVector<T>>,
    ) -> Result<DVector<T>, Error> {
        let n = self.vector.len();

        let mut x = match initial_guess {
            Some(guess) if guess.len() != n => {
                return Err(Error::IncompatibleSizes {
                    rows: n,
                    len: guess.len(),
                });
            }
            Some(guess) => guess.clone(),
            None => DVector::zeros(n),
        };

        // every sweep divides by the diagonal; fetch it once and fail before
        // the first sweep if any row is unusable
        let mut diag = Vec::with_capacity(n);
        for i in 0..n {
            let d = self.matrix.diagonal(i);
            if d == T::zero() {
                return Err(Error::ZeroDiagonal { row: i });
            }
            diag.push(d);
        }

        if !self.matrix.property().guarantees_convergence() {
            warn!(
                "matrix is neither diagonally dominant nor symmetric positive definite; \
                 convergence is not guaranteed"
            );
        }

        for _ in 0..max_iterations {
            let x_old = x.clone();

            for i in 0..n {
                let mut sum = T::zero();
                for (j, value) in self.matrix.off_diagonal(i) {
                    sum += value * x[j];
                }
                x[i] = (self.vector[i] - sum) / diag[i];
            }

            let mut error = T::zero();
            for (new, old) in x.iter().zip(x_old.iter()) {
                let step = (*new - *old).abs();
                if step > error {
                    error = step;
                }
            }

            if let Some(archive) = &mut self.archive {
                archive.push(IterationRecord {
                    previous: x_old,
                    current: x.clone(),
                    error,
                });
            }

            if error < tolerance {
                self.state = SolverState::Solved;
                return Ok(x);
            }
        }

        warn!("did not converge within {} sweeps", max_iterations);
        self.state = SolverState::DidNotConverge;
        Ok(x)
    }

    /// [`Solver::solve`] with the documented defaults and a zero initial
    /// guess.
    pub fn solve_default(&mut self) -> Result<DVector<T>, Error>
    where
        T: NumCast,
    {
        let tolerance = T::from(Self::DEFAULT_TOLERANCE).unwrap();
        self.solve(tolerance, Self::DEFAULT_MAX_ITERATIONS, None)
    }

    /// The storage variant chosen at construction, exposed for inspection.
    pub fn storage_kind(&self) -> StorageKind {
        self.matrix.kind()
    }

    /// The convergence-relevant property tag of the matrix.
    pub fn property(&self) -> Property {
        self.matrix.property()
    }

    /// Progress of this instance.
    pub fn state(&self) -> SolverState {
        self.state
    }

    /// Per-sweep records, oldest first; `None` when archiving is disabled.
    pub fn history(&self) -> Option<&[IterationRecord<T>]> {
        self.archive.as_deref()
    }

    /// Whether per-sweep records are being kept.
    pub fn is_archiving(&self) -> bool {
        self.archive.is_some()
    }

    /// The right-hand side `b`.
    pub fn vector(&self) -> &DVector<T> {
        &self.vector
    }

    /// Reconstructs the full dense matrix from the packed storage.
    pub fn full_matrix(&self) -> DMatrix<T> {
        self.matrix.to_dense()
    }

    /// Infinity norm of the residual `Ax − b`.
    ///
    /// A diagnostic only: the convergence test in [`Solver::solve`] uses the
    /// step difference, never the residual.
    pub fn residual_norm(&self, x: &DVector<T>) -> T {
        let residual = self.full_matrix() * x - &self.vector;
        let mut norm = T::zero();
        for value in residual.iter() {
            if value.abs() > norm {
                norm = value.abs();
            }
        }
        norm
    }

    /// Tries to reorder the equations so that every row is diagonally
    /// dominant.
    ///
    /// Greedy search: for each position, pick a still-unused row whose
    /// diagonal magnitude covers the rest of the row. On success the matrix
    /// is re-classified, the right-hand side is permuted alike, and `true`
    /// is returned; otherwise the solver is left untouched. Never called by
    /// [`Solver::solve`].
    pub fn try_make_diagonally_dominant(&mut self) -> bool {
        let n = self.vector.len();
        let m = self.full_matrix();

        let mut used = vec![false; n];
        let mut order = Vec::with_capacity(n);

        for i in 0..n {
            let mut found = false;
            for j in 0..n {
                if used[j] {
                    continue;
                }
                let mut sum = T::zero();
                for k in 0..n {
                    if k != i {
                        sum += m[(j, k)].abs();
                    }
                }
                if m[(j, i)].abs() >= sum {
                    used[j] = true;
                    order.push(j);
                    found = true;
                    break;
                }
            }
            if !found {
                return false;
            }
        }

        let permuted = DMatrix::from_fn(n, n, |i, j| m[(order[i], j)]);
        self.matrix =
            StoredMatrix::from_dense(&permuted).expect("row permutation preserves the shape");
        self.vector = DVector::from_fn(n, |i, _| self.vector[order[i]]);
        true
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{dmatrix, dvector};

    use super::*;

    #[test]
    fn construction_rejects_mismatched_sizes() {
        let err = Solver::new(dmatrix![1.0, 2.0; 3.0, 4.0], dvector![1.0]).unwrap_err();
        assert!(matches!(err, Error::IncompatibleSizes { rows: 2, len: 1 }));

        let err = Solver::new(DMatrix::<f64>::zeros(0, 0), DVector::zeros(0)).unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(storage::Error::NotSquare { nrows: 0, ncols: 0 })
        ));
    }

    #[test]
    fn solve_uses_already_updated_components_within_a_sweep() {
        // one sweep from zeros: x0 = 1/4, then x1 = (2 − 1·x0)/3 uses the
        // fresh x0, which is the Gauss-Seidel update rather than Jacobi's
        let mut solver = Solver::new(dmatrix![4.0, 1.0; 1.0, 3.0], dvector![1.0, 2.0]).unwrap();
        let x = solver.solve(1e-12, 1, None).unwrap();

        assert_relative_eq!(x[0], 0.25, epsilon = 1e-15);
        assert_relative_eq!(x[1], (2.0 - 0.25) / 3.0, epsilon = 1e-15);
        assert_eq!(solver.state(), SolverState::DidNotConverge);
    }

    #[test]
    fn zero_diagonal_fails_before_any_sweep() {
        let mut solver = Solver::new(dmatrix![0.0, 1.0; 1.0, 0.0], dvector![1.0, 1.0]).unwrap();
        let err = solver.solve(1e-8, 100, None).unwrap_err();

        assert!(matches!(err, Error::ZeroDiagonal { row: 0 }));
        assert_eq!(solver.state(), SolverState::NotYet);
        assert_eq!(solver.history(), Some(&[][..]));
    }

    #[test]
    fn bad_initial_guess_is_rejected() {
        let mut solver = Solver::new(dmatrix![4.0, 1.0; 1.0, 3.0], dvector![1.0, 2.0]).unwrap();
        let err = solver
            .solve(1e-8, 100, Some(&dvector![0.0, 0.0, 0.0]))
            .unwrap_err();
        assert!(matches!(err, Error::IncompatibleSizes { rows: 2, len: 3 }));
    }

    #[test]
    fn initial_guess_at_the_solution_converges_immediately() {
        let mut solver = Solver::new(dmatrix![2.0, 0.0; 0.0, 2.0], dvector![2.0, 4.0]).unwrap();
        let x = solver.solve(1e-8, 100, Some(&dvector![1.0, 2.0])).unwrap();

        assert_eq!(x, dvector![1.0, 2.0]);
        assert_eq!(solver.state(), SolverState::Solved);
        assert_eq!(solver.history().unwrap().len(), 1);
    }

    #[test]
    fn archive_records_every_executed_sweep_in_order() {
        let mut solver = Solver::new(dmatrix![4.0, 1.0; 1.0, 3.0], dvector![1.0, 2.0]).unwrap();
        let x = solver.solve(1e-10, 100, None).unwrap();
        assert_eq!(solver.state(), SolverState::Solved);

        let history = solver.history().unwrap();
        assert!(!history.is_empty());
        assert!(history.len() <= 100);
        for pair in history.windows(2) {
            assert_eq!(pair[0].current, pair[1].previous);
        }
        assert_eq!(history.last().unwrap().current, x);
        assert!(history.last().unwrap().error < 1e-10);
    }

    #[test]
    fn disabled_archive_stays_absent() {
        let mut solver =
            Solver::without_archive(dmatrix![4.0, 1.0; 1.0, 3.0], dvector![1.0, 2.0]).unwrap();
        assert!(!solver.is_archiving());
        solver.solve(1e-10, 100, None).unwrap();
        assert_eq!(solver.history(), None);
    }

    #[test]
    fn resolving_never_returns_to_not_yet() {
        let mut solver = Solver::new(dmatrix![4.0, 1.0; 1.0, 3.0], dvector![1.0, 2.0]).unwrap();
        solver.solve(1e-10, 1, None).unwrap();
        assert_eq!(solver.state(), SolverState::DidNotConverge);

        // a second call with a workable budget upgrades the terminal state
        solver.solve(1e-10, 100, None).unwrap();
        assert_eq!(solver.state(), SolverState::Solved);
    }

    #[test]
    fn solve_default_uses_the_documented_defaults() {
        let mut solver = Solver::new(dmatrix![4.0, 1.0; 1.0, 3.0], dvector![1.0, 2.0]).unwrap();
        let x = solver.solve_default().unwrap();
        assert_eq!(solver.state(), SolverState::Solved);
        assert!(solver.residual_norm(&x) < 1e-6);
    }

    #[test]
    fn permutation_search_restores_dominance() {
        // swapped rows of a diagonally dominant system
        let mut solver = Solver::new(
            dmatrix![1.0, 3.0; 4.0, 1.0],
            dvector![2.0, 1.0],
        )
        .unwrap();
        assert_eq!(solver.property(), Property::Normal);

        assert!(solver.try_make_diagonally_dominant());
        assert_eq!(solver.property(), Property::DiagonallyDominant);
        assert_eq!(solver.full_matrix(), dmatrix![4.0, 1.0; 1.0, 3.0]);
        assert_eq!(solver.vector(), &dvector![1.0, 2.0]);

        let x = solver.solve(1e-10, 100, None).unwrap();
        assert!(solver.residual_norm(&x) < 1e-8);
    }

    #[test]
    fn permutation_search_reports_failure_and_leaves_state() {
        // neither row is dominant in column 0, so no ordering works
        let mut solver = Solver::new(
            dmatrix![1.0, 2.0; 1.0, 2.0],
            dvector![1.0, 1.0],
        )
        .unwrap();
        let before = solver.full_matrix();
        assert!(!solver.try_make_diagonally_dominant());
        assert_eq!(solver.full_matrix(), before);
    }
}
