use std::ops::Deref;

use ahash::AHashMap;
use log::warn;

use crate::GenomicRange;

/// Immutable mapping from SNP identifier to its genomic interval.
///
/// Populated once from the SNP-interval BED stream. Duplicate identifiers
/// keep the first interval seen; subsequent occurrences are dropped with a
/// warning.
#[derive(Debug, Default)]
pub struct SnpMap(AHashMap<String, GenomicRange>);

impl Deref for SnpMap {
    type Target = AHashMap<String, GenomicRange>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl SnpMap {
    pub fn from_records(records: impl IntoIterator<Item = (String, GenomicRange)>) -> Self {
        let mut map = AHashMap::new();
        let mut duplicates = 0usize;
        for (name, range) in records {
            if map.contains_key(&name) {
                duplicates += 1;
                continue;
            }
            map.insert(name, range);
        }
        if duplicates > 0 {
            warn!("{duplicates} duplicate SNP identifier(s) in the SNP-interval file. Keeping first occurrences.");
        }
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_record_wins_on_duplicates() {
        let map = SnpMap::from_records(vec![
            ("rs1".to_string(), GenomicRange::new("1", 10, 11)),
            ("rs2".to_string(), GenomicRange::new("1", 20, 21)),
            ("rs1".to_string(), GenomicRange::new("2", 99, 100)),
        ]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("rs1"), Some(&GenomicRange::new("1", 10, 11)));
    }
}
