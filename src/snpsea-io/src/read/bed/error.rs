use thiserror::Error;

#[derive(Error, Debug)]
pub enum BedError {
    #[error("Line {0}: expected at least 4 tab-separated fields (chrom, start, end, name)")]
    MissingFields(usize),

    #[error("Line {line}: could not parse coordinate '{value}'")]
    ParseCoordinate { line: usize, value: String },

    #[error("Line {line}: interval end {end} lies before start {start}")]
    InvertedInterval { line: usize, start: u64, end: u64 },
}
