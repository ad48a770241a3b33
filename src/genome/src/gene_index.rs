use ahash::{AHashMap, AHashSet};
use log::{debug, warn};
use rust_lapper::{Interval, Lapper};

use crate::GenomicRange;

/// Per-chromosome interval index mapping gene intervals to matrix row
/// indices.
///
/// Only genes present in the matrix row-name set are indexed. Overlap
/// queries are inclusive of both endpoints as drawn from the BED file:
/// the underlying half-open lapper intervals are widened by one on
/// insertion and on query.
///
/// # Fields
/// - `trees`            : per-chromosome interval tree. Values are matrix row indices.
/// - `n_rows`           : total number of matrix rows.
/// - `n_unindexed_rows` : matrix rows never seen in the gene-interval stream.
/// - `n_foreign_records`: gene-interval records whose name is absent from the matrix.
pub struct GeneIndex {
    trees            : AHashMap<String, Lapper<u64, usize>>,
    n_rows           : usize,
    n_unindexed_rows : usize,
    n_foreign_records: usize,
}

impl GeneIndex {
    /// Build the index from a gene-interval stream.
    ///
    /// # Arguments
    /// - `records`    : `(interval, gene name)` pairs, as read from a BED file.
    /// - `row_indices`: gene name -> matrix row index, for all matrix rows.
    pub fn build(
        records    : impl IntoIterator<Item = (GenomicRange, String)>,
        row_indices: &AHashMap<String, usize>,
    ) -> Self {
        let mut intervals: AHashMap<String, Vec<Interval<u64, usize>>> = AHashMap::new();
        let mut indexed_rows = AHashSet::new();
        let mut n_foreign_records = 0usize;

        for (range, name) in records {
            let Some(&row) = row_indices.get(&name) else {
                n_foreign_records += 1;
                continue;
            };
            indexed_rows.insert(row);
            intervals
                .entry(range.chrom)
                .or_default()
                .push(Interval { start: range.start, stop: range.end + 1, val: row });
        }

        let trees = intervals
            .into_iter()
            .map(|(chrom, intervals)| (chrom, Lapper::new(intervals)))
            .collect::<AHashMap<String, Lapper<u64, usize>>>();

        let n_rows           = row_indices.len();
        let n_unindexed_rows = n_rows - indexed_rows.len();
        if n_foreign_records > 0 {
            warn!("{n_foreign_records} gene-interval record(s) name genes absent from the expression matrix. Skipping them.");
        }
        if n_unindexed_rows > 0 {
            warn!("{n_unindexed_rows} matrix gene(s) have no interval in the gene-interval file.");
        }
        debug!("Indexed {} gene(s) across {} chromosome(s)", indexed_rows.len(), trees.len());

        Self { trees, n_rows, n_unindexed_rows, n_foreign_records }
    }

    /// Row indices of every indexed gene whose interval intersects `range`
    /// (endpoints included). Duplicated intervals of a gene yield duplicated
    /// indices.
    pub fn overlapping(&self, range: &GenomicRange) -> Vec<usize> {
        match self.trees.get(&range.chrom) {
            Some(tree) => tree.find(range.start, range.end + 1).map(|iv| iv.val).collect(),
            None       => Vec::new(),
        }
    }

    /// Rerun `overlapping` on a slop-widened copy of `range`.
    pub fn overlapping_slop(&self, range: &GenomicRange, slop: u64) -> Vec<usize> {
        self.overlapping(&range.with_slop(slop))
    }

    /// Number of matrix rows usable as a hypergeometric population: rows in
    /// the matrix, minus matrix genes missing from the gene-interval file.
    pub fn r_effective(&self) -> usize {
        self.n_rows - self.n_unindexed_rows
    }

    pub fn n_unindexed_rows(&self) -> usize {
        self.n_unindexed_rows
    }

    pub fn n_foreign_records(&self) -> usize {
        self.n_foreign_records
    }
}
