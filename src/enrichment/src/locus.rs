use ahash::AHashMap;
use genome::GenomicRange;

/// One scored unit: a single SNP, or a cluster of SNPs coalesced because
/// their gene sets overlap.
///
/// # Fields
/// - `snps` : member SNP identifiers, in input iteration order.
/// - `label`: comma-join of `snps`.
/// - `range`: bounding interval `(chrom, min(start), max(end))` of the members.
/// - `rows` : union of the members' matrix row indices, sorted and distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locus {
    pub snps : Vec<String>,
    pub label: String,
    pub range: GenomicRange,
    pub rows : Vec<usize>,
}

/// Disjoint-set forest over SNP slots, used to coalesce SNPs sharing genes.
struct UnionFind {
    parents: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self { parents: (0..size).collect() }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parents[node] != node {
            self.parents[node] = self.parents[self.parents[node]];
            node = self.parents[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a != root_b {
            // Lower slot wins, keeping input iteration order stable.
            let (low, high) = (root_a.min(root_b), root_a.max(root_b));
            self.parents[high] = low;
        }
    }
}

/// Coalesce resolved SNPs into loci: two SNPs merge whenever their gene
/// sets share at least one row index, transitively.
///
/// Implemented with union-find over the shared-gene relation, so the result
/// is a fixed point independent of input iteration order: no two output
/// loci share a row index.
pub fn merge_loci(resolved: &[(String, GenomicRange, Vec<usize>)]) -> Vec<Locus> {
    let mut forest = UnionFind::new(resolved.len());
    let mut first_owner: AHashMap<usize, usize> = AHashMap::new();
    for (slot, (_, _, rows)) in resolved.iter().enumerate() {
        for &row in rows {
            match first_owner.get(&row) {
                Some(&owner) => forest.union(owner, slot),
                None         => { first_owner.insert(row, slot); }
            }
        }
    }

    // ---- Group member slots under their root, preserving input order.
    let mut groups: AHashMap<usize, Vec<usize>> = AHashMap::new();
    for slot in 0..resolved.len() {
        groups.entry(forest.find(slot)).or_default().push(slot);
    }
    let mut ordered: Vec<Vec<usize>> = groups.into_values().collect();
    ordered.sort_unstable_by_key(|members| members[0]);

    ordered.into_iter()
        .map(|members| {
            let snps: Vec<String> = members.iter().map(|&slot| resolved[slot].0.clone()).collect();
            let range = members.iter()
                .map(|&slot| &resolved[slot].1)
                .skip(1)
                .fold(resolved[members[0]].1.clone(), |acc, next| acc.envelope(next));
            let mut rows: Vec<usize> = members.iter()
                .flat_map(|&slot| resolved[slot].2.iter().copied())
                .collect();
            rows.sort_unstable();
            rows.dedup();
            Locus { label: snps.join(","), snps, range, rows }
        })
        .collect()
}
