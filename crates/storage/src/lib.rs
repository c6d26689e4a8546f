//! Structure-aware storage for square numeric matrices.
//!
//! A dense matrix is inspected once, classified into the most compact of six
//! storage variants, and tagged with the convergence-relevant property the
//! iterative solver consults. All later reads go through the uniform row
//! accessor on [`StoredMatrix`], so a consumer never needs to know which
//! variant was chosen.

mod classify;
mod property;
mod stored;

pub use property::Property;
pub use stored::{MatrixStorage, StorageKind, StoredMatrix};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("matrix is empty or not square ({nrows}x{ncols})")]
    NotSquare { nrows: usize, ncols: usize },
}
