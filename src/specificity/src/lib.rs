pub mod matrix;
pub use matrix::{BinaryStats, GeneMatrix, Mode};

mod error;
pub use error::MatrixError;
