//! Loading a system from structured (JSON) input.
//!
//! The expected shape is an object with `matrix` (array of equal-length
//! number arrays) and `vector` (number array) fields:
//!
//! ```json
//! { "matrix": [[4.0, 1.0], [1.0, 3.0]], "vector": [1.0, 2.0] }
//! ```

use std::io;

use nalgebra::{DMatrix, DVector, RealField};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{Error, Solver};

#[derive(Debug, Deserialize)]
struct SystemInput<T> {
    matrix: Vec<Vec<T>>,
    vector: Vec<T>,
}

impl<T: RealField + Copy + DeserializeOwned> Solver<T> {
    /// Builds a solver (archiving enabled) from a JSON string.
    ///
    /// # Errors
    ///
    /// [`Error::MissingFields`] when the value is not an object carrying
    /// both `matrix` and `vector`; [`Error::MalformedInput`] when the input
    /// is not valid JSON or the fields have the wrong shape; and the usual
    /// construction errors for non-square or mismatched systems.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        Self::from_json_value(value)
    }

    /// Builds a solver from any JSON reader, e.g. an uploaded file.
    pub fn from_json_reader(reader: impl io::Read) -> Result<Self, Error> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        Self::from_json_value(value)
    }

    /// Builds a solver from an already-parsed JSON value.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, Error> {
        if value.get("matrix").is_none() || value.get("vector").is_none() {
            return Err(Error::MissingFields);
        }
        let input: SystemInput<T> = serde_json::from_value(value)?;

        let n = input.matrix.len();
        for row in &input.matrix {
            if row.len() != n {
                return Err(Error::Storage(storage::Error::NotSquare {
                    nrows: n,
                    ncols: row.len(),
                }));
            }
        }

        let matrix = DMatrix::from_fn(n, n, |i, j| input.matrix[i][j]);
        let vector = DVector::from_vec(input.vector);
        Solver::new(matrix, vector)
    }
}
