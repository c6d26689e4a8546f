use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Matrix and right-hand side (or initial guess) disagree on the system
    /// size. Fatal at construction; no solver is produced.
    #[error("incompatible sizes: matrix has {rows} rows, vector has {len} entries")]
    IncompatibleSizes { rows: usize, len: usize },

    /// The matrix was empty or not square.
    #[error(transparent)]
    Storage(#[from] storage::Error),

    /// A zero diagonal element makes the row update undefined. Raised before
    /// the first sweep; no partial solution is returned.
    #[error("zero diagonal element at row {row}")]
    ZeroDiagonal { row: usize },

    /// Structured input without the required fields.
    #[error("structured input must contain \"matrix\" and \"vector\" fields")]
    MissingFields,

    /// Structured input that could not be parsed into a system.
    #[error("malformed structured input")]
    MalformedInput {
        #[from]
        source: serde_json::Error,
    },
}
