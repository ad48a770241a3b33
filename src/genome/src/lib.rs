pub mod range;
pub use range::GenomicRange;

pub mod snp_map;
pub use snp_map::SnpMap;

pub mod gene_index;
pub use gene_index::GeneIndex;
