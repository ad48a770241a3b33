use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("Duplicate gene name '{0}' in the expression matrix")]
    DuplicateRowName(String),

    #[error("Column count mismatch between header and values ({names} names, {columns} columns)")]
    ColumnCountMismatch { names: usize, columns: usize },

    #[error("Column {index} holds {found} value(s), expected {expected}")]
    RaggedColumn { index: usize, expected: usize, found: usize },

    #[error("Conditioning column '{0}' was not found among the matrix conditions")]
    MissingCondition(String),
}
