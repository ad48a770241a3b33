use std::path::Path;

use anyhow::Result;
use genome::GenomicRange;
use snpsea_io::write::TsvWriter;
use specificity::GeneMatrix;

use crate::locus::Locus;

pub const ARGS_FILE                : &str = "args.txt";
pub const CONDITION_PVALUES_FILE   : &str = "condition_pvalues.txt";
pub const NULL_PVALUES_FILE        : &str = "null_pvalues.txt";
pub const SNP_GENES_FILE           : &str = "snp_genes.txt";
pub const SNP_CONDITION_SCORES_FILE: &str = "snp_condition_scores.txt";
pub const LOG_FILE                 : &str = "log.txt";

/// The reported fate of each input SNP, in input iteration order. Merged
/// SNPs collapse into a single [`Locus`] row.
pub enum SnpFate<'a> {
    /// Not present in the SNP-interval map.
    Absent(&'a str),
    /// Present, but overlapping no gene even after slop extension.
    NoGenes { name: &'a str, range: &'a GenomicRange },
    /// Scored as (part of) this locus.
    Merged(&'a Locus),
}

/// Write `snp_genes.txt`: one row per locus, NA rows for absent SNPs, and
/// zero-gene rows for SNPs overlapping nothing.
pub fn write_snp_genes(path: &Path, fates: &[SnpFate], matrix: &GeneMatrix) -> Result<()> {
    let mut writer = TsvWriter::create(path)?;
    writer.write_row(["chrom", "start", "end", "snp", "n_genes", "genes"])?;
    for fate in fates {
        let row: [String; 6] = match fate {
            SnpFate::Absent(name) => [
                "NA".to_string(),
                "NA".to_string(),
                "NA".to_string(),
                (*name).to_string(),
                "NA".to_string(),
                "NA".to_string(),
            ],
            SnpFate::NoGenes { name, range } => [
                range.chrom.clone(),
                range.start.to_string(),
                range.end.to_string(),
                (*name).to_string(),
                "0".to_string(),
                String::new(),
            ],
            SnpFate::Merged(locus) => {
                let genes = locus.rows.iter()
                    .map(|&row| matrix.row_names()[row].as_str())
                    .collect::<Vec<&str>>()
                    .join(",");
                [
                    locus.range.chrom.clone(),
                    locus.range.start.to_string(),
                    locus.range.end.to_string(),
                    locus.label.clone(),
                    locus.rows.len().to_string(),
                    genes,
                ]
            }
        };
        writer.write_row(row)?;
    }
    Ok(())
}
