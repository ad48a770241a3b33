use std::{io::BufRead, path::Path};

use anyhow::{Context, Result};
use genome::GenomicRange;
use log::info;

mod error;
pub use error::BedError;

/// One BED4+ record: a named genomic interval. Columns past the fourth are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedRecord {
    pub range: GenomicRange,
    pub name : String,
}

impl BedRecord {
    /// Parse a BED4+ stream. Lines starting with `#` are skipped.
    ///
    /// # Errors
    /// See [`BedError`]: short lines, unparseable coordinates and inverted
    /// intervals are fatal.
    pub fn from_reader(reader: impl BufRead) -> Result<Vec<Self>> {
        let mut records = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line   = line?;
            let lineno = index + 1;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 4 {
                return Err(BedError::MissingFields(lineno).into());
            }
            let parse = |value: &str| -> Result<u64, BedError> {
                value.trim().parse().map_err(|_| BedError::ParseCoordinate {
                    line : lineno,
                    value: value.to_string(),
                })
            };
            let (start, end) = (parse(fields[1])?, parse(fields[2])?);
            if end < start {
                return Err(BedError::InvertedInterval { line: lineno, start, end }.into());
            }
            records.push(BedRecord {
                range: GenomicRange::new(fields[0], start, end),
                name : fields[3].trim().to_string(),
            });
        }
        Ok(records)
    }

    /// Parse a BED4+ file, transparently decoding gzip.
    pub fn from_path(path: &Path) -> Result<Vec<Self>> {
        let records = Self::from_reader(super::open_text(path)?)
            .with_context(|| format!("While parsing BED file '{}'", path.display()))?;
        info!("Loaded {} interval(s) from '{}'", records.len(), path.display());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_bed4_with_extra_columns() -> Result<()> {
        let text    = "# a comment\n1\t100\t200\trs1\textra\tcolumns\n2\t5\t5\trs2\n";
        let records = BedRecord::from_reader(Cursor::new(text))?;
        assert_eq!(records, vec![
            BedRecord { range: GenomicRange::new("1", 100, 200), name: "rs1".to_string() },
            BedRecord { range: GenomicRange::new("2", 5, 5),     name: "rs2".to_string() },
        ]);
        Ok(())
    }

    #[test]
    fn short_line_is_fatal() {
        let result = BedRecord::from_reader(Cursor::new("1\t100\t200\n"));
        let error  = result.err().expect("parsing must fail");
        assert!(matches!(error.downcast_ref::<BedError>(), Some(BedError::MissingFields(1))));
    }

    #[test]
    fn inverted_interval_is_fatal() {
        let result = BedRecord::from_reader(Cursor::new("1\t200\t100\trs1\n"));
        let error  = result.err().expect("parsing must fail");
        assert!(matches!(
            error.downcast_ref::<BedError>(),
            Some(BedError::InvertedInterval { line: 1, start: 200, end: 100 })
        ));
    }

    #[test]
    fn unparseable_coordinate_is_fatal() {
        let result = BedRecord::from_reader(Cursor::new("1\tone\t100\trs1\n"));
        let error  = result.err().expect("parsing must fail");
        assert!(matches!(error.downcast_ref::<BedError>(), Some(BedError::ParseCoordinate { line: 1, .. })));
    }
}
