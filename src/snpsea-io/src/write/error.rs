use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Failed to create output directory '{path}'")]
    CreateDirectory { path: PathBuf, #[source] source: std::io::Error },

    #[error("Failed to open output file '{path}'")]
    OpenFile { path: PathBuf, #[source] source: std::io::Error },

    #[error("Failed to write to file: inner writer returned an io error")]
    IOError(#[from] std::io::Error),
}
