use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("No SNP of the null pool overlaps any gene of the expression matrix")]
    EmptyNullPool,

    #[error("The input SNP set is empty, or no input SNP overlaps any gene")]
    EmptySnpSet,

    #[error("No null-pool gene set has effective size {size}: cannot size-match a locus of that size")]
    EmptyBin { size: usize },

    #[error("Requested {requested} random SNP(s), but only {found} null-pool SNP(s) resolve to genes")]
    NullPoolTooSmall { requested: usize, found: usize },
}
