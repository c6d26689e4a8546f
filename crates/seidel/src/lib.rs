//! Gauss-Seidel iterative solver for square linear systems.
//!
//! A [`Solver`] owns one system `Ax = b`. At construction the matrix is
//! classified and packed into a compact storage variant by the `storage`
//! crate; [`Solver::solve`] then runs Gauss-Seidel sweeps over the packed
//! rows, recording per-sweep history and a terminal state that separates a
//! converged result from an exhausted sweep budget.
//!
//! ```
//! use nalgebra::{dmatrix, dvector};
//! use seidel::{Solver, SolverState};
//!
//! let mut solver = Solver::new(dmatrix![4.0, 1.0; 1.0, 3.0], dvector![1.0, 2.0]).unwrap();
//! let x = solver.solve(1e-6, 100, None).unwrap();
//!
//! assert_eq!(solver.state(), SolverState::Solved);
//! assert!(solver.residual_norm(&x) < 1e-5);
//! ```

mod error;
pub mod generate;
mod input;
mod solver;

pub use error::Error;
pub use solver::{IterationRecord, Solver, SolverState};

pub use storage::{MatrixStorage, Property, StorageKind, StoredMatrix};
