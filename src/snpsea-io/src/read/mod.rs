use std::{fs::File, io::{BufRead, BufReader}, path::Path};

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

pub mod gct;
pub use gct::GctTable;

pub mod bed;
pub use bed::BedRecord;

pub mod list;
pub use list::{read_item_list, read_item_list_path, read_conditions};

/// Open a text file for buffered reading, transparently decoding gzip when
/// the path carries a `.gz` extension.
///
/// # Errors
/// - when the file cannot be opened.
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file '{}'", path.display()))?;
    let is_gzip = path.extension().and_then(|ext| ext.to_str()) == Some("gz");
    Ok(match is_gzip {
        true  => Box::new(BufReader::new(MultiGzDecoder::new(file))),
        false => Box::new(BufReader::new(file)),
    })
}
