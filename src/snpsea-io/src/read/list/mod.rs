use std::{io::BufRead, path::Path};

use anyhow::{Context, Result};
use log::debug;

/// Tokens whose presence on the first data line flags it as a header.
const HEADER_TOKENS: [&str; 4] = ["SNP", "snp", "name", "marker"];

/// Read a SNP identifier list: one identifier per line, taken from the first
/// tab-delimited column. Lines starting with `#` are comments. The first
/// non-comment line is treated as a header and skipped iff it contains one
/// of the tokens `SNP`, `snp`, `name` or `marker`; otherwise it is data.
pub fn read_item_list(reader: impl BufRead) -> Result<Vec<String>> {
    let mut items = Vec::new();
    let mut first_data_line = true;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if first_data_line {
            first_data_line = false;
            if HEADER_TOKENS.iter().any(|token| line.contains(token)) {
                debug!("Skipping detected header line: '{line}'");
                continue;
            }
        }
        let first_column = line.split('\t').next().unwrap_or_default().trim();
        if !first_column.is_empty() {
            items.push(first_column.to_string());
        }
    }
    Ok(items)
}

/// File-path wrapper around [`read_item_list`].
pub fn read_item_list_path(path: &Path) -> Result<Vec<String>> {
    read_item_list(super::open_text(path)?)
        .with_context(|| format!("While parsing identifier list '{}'", path.display()))
}

/// Read a conditions list: one column name per line, `#` comments skipped.
pub fn read_conditions(path: &Path) -> Result<Vec<String>> {
    let mut conditions = Vec::new();
    for line in super::open_text(path)?.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        conditions.push(line.to_string());
    }
    Ok(conditions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_is_skipped_when_a_token_matches() -> Result<()> {
        let text  = "# comment\nSNP\tpvalue\nrs1\t0.5\nrs2\t0.1\n";
        let items = read_item_list(Cursor::new(text))?;
        assert_eq!(items, vec!["rs1", "rs2"]);
        Ok(())
    }

    #[test]
    fn first_line_without_token_is_data() -> Result<()> {
        let items = read_item_list(Cursor::new("rs1\nrs2\n"))?;
        assert_eq!(items, vec!["rs1", "rs2"]);
        Ok(())
    }

    #[test]
    fn only_first_column_is_read() -> Result<()> {
        let items = read_item_list(Cursor::new("rs1\t1:100\t0.2\nrs2\t2:200\t0.4\n"))?;
        assert_eq!(items, vec!["rs1", "rs2"]);
        Ok(())
    }

    #[test]
    fn comments_do_not_count_as_first_data_line() -> Result<()> {
        let items = read_item_list(Cursor::new("# marker file\nrs1\n"))?;
        assert_eq!(items, vec!["rs1"]);
        Ok(())
    }
}
