//! Random system generators for demos and tests.
//!
//! These produce inputs for the solver and are not part of the solving
//! contract. The caller supplies the [`Rng`] so runs can be seeded.

use nalgebra::{DMatrix, DVector, RealField};
use num_traits::NumCast;
use rand::Rng;

use storage::Property;

/// Generates a random n×n matrix with integer-valued entries in
/// `[0, max_magnitude)`, adjusted to carry `desired_property`:
///
/// * [`Property::DiagonallyDominant`] — each diagonal entry is raised above
///   the magnitude sum of the rest of its row.
/// * [`Property::SymmetricPositiveDefinite`] — built as `A·Aᵀ` from a random
///   `A`, with the diagonal shifted up by `n · max_magnitude`.
/// * [`Property::Normal`] — the raw random entries, with no guarantee the
///   detected property is actually `Normal`.
pub fn random_matrix<T, R>(
    rng: &mut R,
    n: usize,
    max_magnitude: u32,
    desired_property: Property,
) -> DMatrix<T>
where
    T: RealField + NumCast + Copy,
    R: Rng,
{
    assert!(max_magnitude > 0, "max_magnitude must be positive");

    let mut matrix = DMatrix::from_fn(n, n, |_, _| {
        T::from(rng.gen_range(0..max_magnitude)).unwrap()
    });

    match desired_property {
        Property::DiagonallyDominant => {
            for i in 0..n {
                let mut sum = T::zero();
                for j in 0..n {
                    if j != i {
                        sum += matrix[(i, j)].abs();
                    }
                }
                let bump = T::from(rng.gen_range(1..=max_magnitude)).unwrap();
                matrix[(i, i)] = sum + bump;
            }
        }
        Property::SymmetricPositiveDefinite => {
            let a = DMatrix::<T>::from_fn(n, n, |_, _| {
                T::from(rng.gen::<f64>() * <f64 as From<u32>>::from(max_magnitude)).unwrap()
            });
            matrix = &a * a.transpose();
            let shift = T::from(n as u32 * max_magnitude).unwrap();
            for i in 0..n {
                matrix[(i, i)] += shift;
            }
        }
        Property::Normal => {}
    }

    matrix
}

/// Generates a random vector with integer-valued entries in
/// `[0, max_magnitude)`.
pub fn random_vector<T, R>(rng: &mut R, n: usize, max_magnitude: u32) -> DVector<T>
where
    T: RealField + NumCast + Copy,
    R: Rng,
{
    assert!(max_magnitude > 0, "max_magnitude must be positive");

    DVector::from_fn(n, |_, _| T::from(rng.gen_range(0..max_magnitude)).unwrap())
}
