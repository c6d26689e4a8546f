//! Generates a random diagonally dominant system, solves it, and prints the
//! per-sweep convergence history.
//!
//! Run with `RUST_LOG=warn` to see the solver's advisory warnings.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use seidel::{generate, Property, Solver};

fn main() {
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(7);
    let n = 8;

    let a: DMatrix<f64> = generate::random_matrix(&mut rng, n, 10, Property::DiagonallyDominant);
    let b: DVector<f64> = generate::random_vector(&mut rng, n, 10);

    let mut solver = Solver::new(a, b).expect("generated system is square");
    let x = solver
        .solve(1e-10, 100, None)
        .expect("dominant diagonal is nonzero by construction");

    println!("storage: {:?}, property: {:?}", solver.storage_kind(), solver.property());
    if let Some(history) = solver.history() {
        for (sweep, record) in history.iter().enumerate() {
            println!("sweep {:2}: error = {:.3e}", sweep + 1, record.error);
        }
    }
    println!("state: {:?}", solver.state());
    println!("x = {}", x.transpose());
    println!("residual = {:.3e}", solver.residual_norm(&x));
}
