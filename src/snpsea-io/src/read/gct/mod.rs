use std::{io::BufRead, path::Path};

use anyhow::{Context, Result};
use log::info;

mod error;
pub use error::GctError;

/// Raw contents of a GCT expression file: an `R x C` table of real values,
/// stored column-major, along with ordered row (gene) and column (condition)
/// names. The per-row `Description` field is dropped at parse time.
#[derive(Debug, Clone)]
pub struct GctTable {
    pub row_names: Vec<String>,
    pub col_names: Vec<String>,
    /// `columns[c][r]` is the value of gene `r` under condition `c`.
    pub columns  : Vec<Vec<f64>>,
}

impl GctTable {
    /// Parse a GCT stream.
    ///
    /// Expected layout:
    /// ```text
    /// #1.2
    /// R\tC
    /// Name\tDescription\tcol1...colC
    /// <R data rows: name, description, C tab-separated values>
    /// ```
    ///
    /// # Errors
    /// See [`GctError`]: every deviation from the layout above is fatal.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut lines = reader.lines();

        // ---- #1.2 version tag.
        let magic = lines.next().ok_or(GctError::Truncated("version"))??;
        if magic.trim_end() != "#1.2" {
            return Err(GctError::MissingMagic(magic).into());
        }

        // ---- Dimensions.
        let dims = lines.next().ok_or(GctError::Truncated("dimensions"))??;
        let (n_rows, n_cols) = Self::parse_dimensions(&dims)?;

        // ---- Header.
        let header = lines.next().ok_or(GctError::Truncated("header"))??;
        let mut fields = header.split('\t');
        match (fields.next(), fields.next()) {
            (Some(_name), Some(_description)) => (),
            _ => return Err(GctError::BadHeader.into()),
        }
        let col_names: Vec<String> = fields.map(str::to_string).collect();
        if col_names.len() != n_cols {
            return Err(GctError::HeaderColumnCount { expected: n_cols, found: col_names.len() }.into());
        }

        // ---- Data rows.
        let mut row_names = Vec::with_capacity(n_rows);
        let mut columns   = vec![Vec::with_capacity(n_rows); n_cols];
        for line in lines {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split('\t');
            let name = fields.next().unwrap_or_default().to_string();
            let _description = fields.next();

            let values: Vec<&str> = fields.collect();
            if values.len() != n_cols {
                return Err(GctError::RowValueCount { name, expected: n_cols, found: values.len() }.into());
            }
            for (column, value) in columns.iter_mut().zip(values) {
                let parsed: f64 = value.trim().parse().map_err(|_| GctError::ParseValue {
                    name : name.clone(),
                    value: value.to_string(),
                })?;
                column.push(parsed);
            }
            row_names.push(name);
        }

        if row_names.len() != n_rows {
            return Err(GctError::RowCount { expected: n_rows, found: row_names.len() }.into());
        }
        Ok(Self { row_names, col_names, columns })
    }

    /// Parse a GCT file, transparently decoding gzip (`.gct.gz`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let table = Self::from_reader(super::open_text(path)?)
            .with_context(|| format!("While parsing GCT file '{}'", path.display()))?;
        info!(
            "Loaded expression matrix: {} gene(s) x {} condition(s)",
            table.row_names.len(),
            table.col_names.len()
        );
        Ok(table)
    }

    fn parse_dimensions(line: &str) -> Result<(usize, usize), GctError> {
        let bad = || GctError::BadDimensions(line.to_string());
        let mut fields = line.split_whitespace();
        let n_rows = fields.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
        let n_cols = fields.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
        if n_rows == 0 || n_cols == 0 {
            return Err(bad());
        }
        Ok((n_rows, n_cols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TINY_GCT: &str = "#1.2\n\
        3\t2\n\
        Name\tDescription\tliver\tspleen\n\
        GENE0\tna\t0.5\t1.5\n\
        GENE1\tna\t1.0\t2.0\n\
        GENE2\tna\t0.0\t4.0\n";

    #[test]
    fn parse_tiny_gct() -> Result<()> {
        let table = GctTable::from_reader(Cursor::new(TINY_GCT))?;
        assert_eq!(table.row_names, vec!["GENE0", "GENE1", "GENE2"]);
        assert_eq!(table.col_names, vec!["liver", "spleen"]);
        assert_eq!(table.columns, vec![vec![0.5, 1.0, 0.0], vec![1.5, 2.0, 4.0]]);
        Ok(())
    }

    #[test]
    fn missing_magic_is_fatal() {
        let result = GctTable::from_reader(Cursor::new("1.2\n1\t1\nName\tDescription\tx\nA\tna\t0\n"));
        let error  = result.err().expect("parsing must fail");
        assert!(matches!(error.downcast_ref::<GctError>(), Some(GctError::MissingMagic(_))));
    }

    #[test]
    fn row_count_mismatch_is_fatal() {
        let text   = "#1.2\n5\t2\nName\tDescription\tliver\tspleen\nGENE0\tna\t0.5\t1.5\n";
        let result = GctTable::from_reader(Cursor::new(text));
        let error  = result.err().expect("parsing must fail");
        assert!(matches!(
            error.downcast_ref::<GctError>(),
            Some(GctError::RowCount { expected: 5, found: 1 })
        ));
    }

    #[test]
    fn value_count_mismatch_is_fatal() {
        let text   = "#1.2\n1\t2\nName\tDescription\tliver\tspleen\nGENE0\tna\t0.5\n";
        let result = GctTable::from_reader(Cursor::new(text));
        let error  = result.err().expect("parsing must fail");
        assert!(matches!(
            error.downcast_ref::<GctError>(),
            Some(GctError::RowValueCount { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn unparseable_value_is_fatal() {
        let text   = "#1.2\n1\t1\nName\tDescription\tliver\nGENE0\tna\tNaN?\n";
        let result = GctTable::from_reader(Cursor::new(text));
        let error  = result.err().expect("parsing must fail");
        assert!(matches!(error.downcast_ref::<GctError>(), Some(GctError::ParseValue { .. })));
    }

    #[test]
    fn bad_dimension_line_is_fatal() {
        let result = GctTable::from_reader(Cursor::new("#1.2\nthree\ttwo\n"));
        let error  = result.err().expect("parsing must fail");
        assert!(matches!(error.downcast_ref::<GctError>(), Some(GctError::BadDimensions(_))));
    }
}
