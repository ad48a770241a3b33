use genome::{GeneIndex, GenomicRange, SnpMap};

/// Outcome of resolving one SNP identifier to matrix row indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The identifier is absent from the SNP-interval map.
    Absent,
    /// The interval overlaps no gene, even after slop extension.
    NoGenes(GenomicRange),
    /// Matrix row indices of the overlapping genes, exactly as produced by
    /// the interval index: a gene annotated by several overlapping
    /// intervals contributes one index per interval.
    Genes { range: GenomicRange, rows: Vec<usize> },
}

/// Maps SNP identifiers to the gene sets of their intervals.
///
/// The exact interval is queried first; iff it overlaps nothing, the query
/// is widened by `slop` on each side (clamped at genome coordinate 1) and
/// run once more.
pub struct GenesetResolver<'a> {
    index: &'a GeneIndex,
    snps : &'a SnpMap,
    slop : u64,
}

impl<'a> GenesetResolver<'a> {
    pub fn new(index: &'a GeneIndex, snps: &'a SnpMap, slop: u64) -> Self {
        Self { index, snps, slop }
    }

    pub fn resolve(&self, name: &str) -> Resolution {
        let Some(range) = self.snps.get(name) else {
            return Resolution::Absent;
        };
        let mut rows = self.index.overlapping(range);
        if rows.is_empty() {
            rows = self.index.overlapping_slop(range, self.slop);
        }
        match rows.is_empty() {
            true  => Resolution::NoGenes(range.clone()),
            false => Resolution::Genes { range: range.clone(), rows },
        }
    }
}
