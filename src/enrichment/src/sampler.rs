use log::{debug, info};

use crate::{
    error::EnrichmentError,
    resolver::{GenesetResolver, Resolution},
};

/// Upper bound on the bin key used for size-matched sampling. Gene sets
/// larger than this bucket into the last bin, but keep their full row set
/// for scoring.
pub const MAX_GENES: usize = 10;

/// Clamp a gene-set cardinality to its bin key.
pub fn effective_size(cardinality: usize) -> usize {
    cardinality.min(MAX_GENES)
}

/// Null-pool gene sets, binned by effective size for size-matched draws.
///
/// Built once from the null SNP pool; read-only afterwards, so worker
/// threads can draw from it concurrently through forked RNG streams.
pub struct BinTable {
    /// `bins[k]` holds every null gene set of effective size `k`; slot 0 is
    /// never populated.
    bins: Vec<Vec<Vec<usize>>>,
}

impl BinTable {
    /// Resolve every null-pool SNP and bin the non-empty gene sets.
    ///
    /// # Errors
    /// - [`EnrichmentError::EmptyNullPool`] when no SNP resolves to a gene.
    pub fn build(pool: &[String], resolver: &GenesetResolver) -> Result<Self, EnrichmentError> {
        let mut bins = vec![Vec::new(); MAX_GENES + 1];
        let mut unresolved = 0usize;
        for name in pool {
            match resolver.resolve(name) {
                Resolution::Genes { rows, .. } => bins[effective_size(rows.len())].push(rows),
                Resolution::Absent | Resolution::NoGenes(_) => unresolved += 1,
            }
        }
        if bins.iter().all(Vec::is_empty) {
            return Err(EnrichmentError::EmptyNullPool);
        }
        info!(
            "Binned {} null gene set(s) from {} null SNP(s). {unresolved} SNP(s) resolved to no gene.",
            pool.len() - unresolved,
            pool.len()
        );
        for (size, bin) in bins.iter().enumerate().skip(1) {
            debug!("Null bin {size}: {} gene set(s)", bin.len());
        }
        Ok(Self { bins })
    }

    pub fn len(&self, size: usize) -> usize {
        self.bins[size].len()
    }

    /// Ensure a matched draw is possible for every requested locus size.
    ///
    /// # Errors
    /// - [`EnrichmentError::EmptyBin`] for the first size with no gene set.
    pub fn require_nonempty(&self, sizes: &[usize]) -> Result<(), EnrichmentError> {
        match sizes.iter().find(|&&size| self.bins[size].is_empty()) {
            Some(&size) => Err(EnrichmentError::EmptyBin { size }),
            None        => Ok(()),
        }
    }

    /// Draw one size-matched gene set per requested size, uniformly and
    /// with replacement.
    ///
    /// Sizes must have passed [`BinTable::require_nonempty`] beforehand.
    pub fn matched_draw<'t>(&'t self, sizes: &[usize], rng: &mut fastrand::Rng) -> Vec<&'t [usize]> {
        sizes.iter()
            .map(|&size| {
                let bin = &self.bins[size];
                bin[rng.usize(..bin.len())].as_slice()
            })
            .collect()
    }
}

/// Uniformly pick `count` distinct SNP names from the null pool, skipping
/// SNPs that resolve to no gene. Serves the `randomN` input source.
///
/// # Errors
/// - [`EnrichmentError::NullPoolTooSmall`] when fewer than `count` pool
///   SNPs resolve to genes.
pub fn random_snp_draw(
    pool    : &[String],
    resolver: &GenesetResolver,
    count   : usize,
    rng     : &mut fastrand::Rng,
) -> Result<Vec<String>, EnrichmentError> {
    let mut order: Vec<usize> = (0..pool.len()).collect();
    rng.shuffle(&mut order);

    let mut picked = Vec::with_capacity(count);
    for index in order {
        if picked.len() == count {
            break;
        }
        if matches!(resolver.resolve(&pool[index]), Resolution::Genes { .. }) {
            picked.push(pool[index].clone());
        }
    }
    match picked.len() < count {
        true  => Err(EnrichmentError::NullPoolTooSmall { requested: count, found: picked.len() }),
        false => Ok(picked),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;
    use genome::{GeneIndex, GenomicRange, SnpMap};

    /// One SNP per gene at slot `i`, plus one SNP spanning `span` genes and
    /// one SNP overlapping nothing.
    fn fixture(n_genes: usize, span: usize) -> (GeneIndex, SnpMap) {
        let rows: AHashMap<String, usize> =
            (0..n_genes).map(|i| (format!("GENE{i}"), i)).collect();
        let genes = (0..n_genes)
            .map(|i| {
                let start = (i as u64 + 1) * 10_000;
                (GenomicRange::new("1", start, start + 5_000), format!("GENE{i}"))
            })
            .collect::<Vec<_>>();
        let index = GeneIndex::build(genes, &rows);

        let mut snps: Vec<(String, GenomicRange)> = (0..n_genes)
            .map(|i| {
                let start = (i as u64 + 1) * 10_000 + 100;
                (format!("rs{i}"), GenomicRange::new("1", start, start + 1))
            })
            .collect();
        snps.push(("rs_span".to_string(), GenomicRange::new("1", 10_000, (span as u64) * 10_000 + 100)));
        snps.push(("rs_empty".to_string(), GenomicRange::new("2", 1, 2)));
        (index, SnpMap::from_records(snps))
    }

    #[test]
    fn genesets_are_binned_by_effective_size() -> Result<(), EnrichmentError> {
        let (index, snps) = fixture(4, 3);
        let resolver = GenesetResolver::new(&index, &snps, 0);
        let pool: Vec<String> = (0..4).map(|i| format!("rs{i}"))
            .chain(["rs_span".to_string(), "rs_empty".to_string()])
            .collect();

        let bins = BinTable::build(&pool, &resolver)?;
        assert_eq!(bins.len(1), 4);
        assert_eq!(bins.len(3), 1);
        assert_eq!(bins.len(2), 0);
        Ok(())
    }

    #[test]
    fn oversized_genesets_bucket_into_the_last_bin() -> Result<(), EnrichmentError> {
        let (index, snps) = fixture(15, 15);
        let resolver = GenesetResolver::new(&index, &snps, 0);
        let pool = vec!["rs_span".to_string()];

        let bins = BinTable::build(&pool, &resolver)?;
        assert_eq!(bins.len(MAX_GENES), 1);

        // The stored gene set keeps its full row set.
        let mut rng  = fastrand::Rng::with_seed(1);
        let draw = bins.matched_draw(&[MAX_GENES], &mut rng);
        assert_eq!(draw[0].len(), 15);
        Ok(())
    }

    #[test]
    fn empty_pool_is_fatal() {
        let (index, snps) = fixture(2, 2);
        let resolver = GenesetResolver::new(&index, &snps, 0);
        let result = BinTable::build(&["rs_empty".to_string()], &resolver);
        assert!(matches!(result, Err(EnrichmentError::EmptyNullPool)));
    }

    #[test]
    fn missing_bin_is_reported_by_size() -> Result<(), EnrichmentError> {
        let (index, snps) = fixture(2, 2);
        let resolver = GenesetResolver::new(&index, &snps, 0);
        let bins = BinTable::build(&["rs0".to_string(), "rs1".to_string()], &resolver)?;

        assert!(bins.require_nonempty(&[1, 1]).is_ok());
        assert!(matches!(bins.require_nonempty(&[1, 4]), Err(EnrichmentError::EmptyBin { size: 4 })));
        Ok(())
    }

    #[test]
    fn matched_draw_returns_one_set_per_size() -> Result<(), EnrichmentError> {
        let (index, snps) = fixture(4, 3);
        let resolver = GenesetResolver::new(&index, &snps, 0);
        let pool: Vec<String> = (0..4).map(|i| format!("rs{i}")).chain(["rs_span".to_string()]).collect();
        let bins = BinTable::build(&pool, &resolver)?;

        let mut rng  = fastrand::Rng::with_seed(7);
        let draw = bins.matched_draw(&[1, 3, 1], &mut rng);
        assert_eq!(draw.len(), 3);
        assert_eq!(draw[0].len(), 1);
        assert_eq!(draw[1].len(), 3);
        assert_eq!(draw[2].len(), 1);
        Ok(())
    }

    #[test]
    fn random_draw_rejects_empty_resolutions_and_duplicates() -> Result<(), EnrichmentError> {
        let (index, snps) = fixture(4, 2);
        let resolver = GenesetResolver::new(&index, &snps, 0);
        let pool: Vec<String> = (0..4).map(|i| format!("rs{i}")).chain(["rs_empty".to_string()]).collect();

        let mut rng = fastrand::Rng::with_seed(13);
        let mut picked = random_snp_draw(&pool, &resolver, 4, &mut rng)?;
        picked.sort();
        assert_eq!(picked, vec!["rs0", "rs1", "rs2", "rs3"]);

        let result = random_snp_draw(&pool, &resolver, 5, &mut rng);
        assert!(matches!(result, Err(EnrichmentError::NullPoolTooSmall { requested: 5, found: 4 })));
        Ok(())
    }
}
