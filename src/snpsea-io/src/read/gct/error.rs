use thiserror::Error;

#[derive(Error, Debug)]
pub enum GctError {
    #[error("Missing '#1.2' version tag on the first line (found '{0}')")]
    MissingMagic(String),

    #[error("Invalid dimensions line '{0}'. Expected '<rows>\t<columns>'")]
    BadDimensions(String),

    #[error("Invalid header line. Expected 'Name\tDescription\t<condition>...'")]
    BadHeader,

    #[error("Expected {expected} condition column(s) in the header, found {found}")]
    HeaderColumnCount { expected: usize, found: usize },

    #[error("Row '{name}' carries {found} value(s), expected {expected}")]
    RowValueCount { name: String, expected: usize, found: usize },

    #[error("Expected {expected} data row(s), found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("Row '{name}': could not parse value '{value}'")]
    ParseValue { name: String, value: String },

    #[error("Truncated file: missing {0} line")]
    Truncated(&'static str),
}
