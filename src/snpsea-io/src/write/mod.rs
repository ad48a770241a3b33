use std::{
    fmt::Display,
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::Result;

mod error;
pub use error::WriterError;

/// THE field separator used for every output table.
pub const WRITER_SEPARATOR: &str = "\t";

/// Attempt to create an output directory (and its parents) if needed.
pub fn create_output_dir(path: &Path) -> Result<(), WriterError> {
    fs::create_dir_all(path)
        .map_err(|source| WriterError::CreateDirectory { path: path.to_path_buf(), source })
}

/// A line-oriented TSV writer.
///
/// Every row is flushed as soon as it is written, so files remain usable up
/// to the last completed row if the process is killed mid-run.
pub struct TsvWriter {
    source: BufWriter<File>,
}

impl TsvWriter {
    /// Instantiate a new `TsvWriter`, truncating any previous file.
    ///
    /// # Errors
    /// if `path` is an invalid file, or the user does not have the proper
    /// UNIX permissions to write at this location.
    pub fn create(path: &Path) -> Result<Self, WriterError> {
        let file = File::create(path)
            .map_err(|source| WriterError::OpenFile { path: path.to_path_buf(), source })?;
        Ok(Self { source: BufWriter::new(file) })
    }

    /// Instantiate a new `TsvWriter` appending to any previous file.
    pub fn append(path: &Path) -> Result<Self, WriterError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| WriterError::OpenFile { path: path.to_path_buf(), source })?;
        Ok(Self { source: BufWriter::new(file) })
    }

    /// Write one tab-joined row and flush it.
    ///
    /// # Errors
    /// - If any of the fields fails to get written to the file.
    pub fn write_row<T, I>(&mut self, fields: T) -> Result<(), WriterError>
    where
        T: IntoIterator<Item = I>,
        I: Display,
    {
        let mut first = true;
        for field in fields {
            if !first {
                self.source.write_all(WRITER_SEPARATOR.as_bytes())?;
            }
            write!(self.source, "{field}")?;
            first = false;
        }
        self.source.write_all(b"\n")?;
        self.source.flush()?;
        Ok(())
    }
}
