use parser::Method;
use specificity::{BinaryStats, GeneMatrix, Mode};
use statrs::distribution::{ContinuousCDF, Discrete, DiscreteCDF, Gamma, Hypergeometric};

/// The four column-scoring kernels, chosen once from (matrix mode, method).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    BinarySingle,
    BinaryTotal,
    QuantitativeSingle,
    QuantitativeTotal,
}

impl Kernel {
    pub fn select(mode: Mode, method: Method) -> Self {
        match (mode, method) {
            (Mode::Binary, Method::Single)       => Self::BinarySingle,
            (Mode::Binary, Method::Total)        => Self::BinaryTotal,
            (Mode::Quantitative, Method::Single) => Self::QuantitativeSingle,
            (Mode::Quantitative, Method::Total)  => Self::QuantitativeTotal,
        }
    }
}

/// Per-locus scoring outcome.
/// # Fields
/// - `score`   : non-negative contribution of the gene set to the column score.
/// - `top_gene`: row index of the most specific gene of the set (quantitative
///               kernels only).
#[derive(Debug, Clone, Copy)]
pub struct Contribution {
    pub score   : f64,
    pub top_gene: Option<usize>,
}

/// Column-scoring engine over a prepared matrix.
///
/// Read-only after construction: the permutation workers call
/// [`Scorer::column_score`] concurrently.
pub struct Scorer<'a> {
    matrix     : &'a GeneMatrix,
    stats      : Option<BinaryStats>,
    r_effective: u64,
    kernel     : Kernel,
}

impl<'a> Scorer<'a> {
    /// # Arguments
    /// - `matrix`     : conditioned/ranked (quantitative) or raw (binary) matrix.
    /// - `mode`       : run mode decided by `GeneMatrix::detect_mode`.
    /// - `method`     : user-requested scoring method.
    /// - `r_effective`: hypergeometric population size (matrix rows with a
    ///                  gene interval).
    pub fn new(matrix: &'a GeneMatrix, mode: Mode, method: Method, r_effective: u64) -> Self {
        let stats = match mode {
            Mode::Binary       => Some(matrix.binary_stats()),
            Mode::Quantitative => None,
        };
        Self { matrix, stats, r_effective, kernel: Kernel::select(mode, method) }
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Score a single gene set against column `col`. Non-finite values are
    /// clamped to 0.
    pub fn contribution(&self, col: usize, geneset: &[usize]) -> Contribution {
        let contribution = match self.kernel {
            Kernel::BinarySingle       => self.binary(col, geneset, Method::Single),
            Kernel::BinaryTotal        => self.binary(col, geneset, Method::Total),
            Kernel::QuantitativeSingle => self.quantitative_single(col, geneset),
            Kernel::QuantitativeTotal  => self.quantitative_total(col, geneset),
        };
        Contribution { score: clamp_finite(contribution.score), ..contribution }
    }

    /// Score a whole set of gene sets: the sum of per-set contributions.
    pub fn column_score(&self, col: usize, genesets: &[&[usize]]) -> f64 {
        let total = genesets.iter()
            .map(|geneset| self.contribution(col, geneset).score)
            .sum();
        clamp_finite(total)
    }

    fn binary(&self, col: usize, geneset: &[usize], method: Method) -> Contribution {
        let absent = Contribution { score: 0.0, top_gene: None };
        let hits = geneset.iter()
            .filter(|&&row| self.matrix.value(row, col) > 0.0)
            .count() as u64;
        if hits == 0 {
            return absent;
        }
        let n1 = self.stats.as_ref().map_or(0, |stats| stats.sums[col]);
        let Ok(hypergeometric) = Hypergeometric::new(self.r_effective, n1, geneset.len() as u64) else {
            return absent;
        };
        let tail = match method {
            // P(X >= 1): at least one annotated gene in a same-size draw.
            Method::Single => 1.0 - hypergeometric.pmf(0),
            // P(X >= hits): upper tail at the observed hit count.
            Method::Total  => hypergeometric.sf(hits - 1),
        };
        Contribution { score: -tail.ln(), top_gene: None }
    }

    fn quantitative_single(&self, col: usize, geneset: &[usize]) -> Contribution {
        let (top_gene, p) = self.most_specific(col, geneset);
        let score = match p < 1.0 {
            // P(min percentile <= p) among |set| uniform draws.
            true  => -(1.0 - (1.0 - p).powi(geneset.len() as i32)).ln(),
            false => 0.0,
        };
        Contribution { score, top_gene: Some(top_gene) }
    }

    fn quantitative_total(&self, col: usize, geneset: &[usize]) -> Contribution {
        let (top_gene, _) = self.most_specific(col, geneset);
        let total: f64 = geneset.iter()
            .map(|&row| -self.matrix.value(row, col).ln())
            .sum();
        let Ok(gamma) = Gamma::new(geneset.len() as f64, 1.0) else {
            return Contribution { score: 0.0, top_gene: Some(top_gene) };
        };
        // Upper tail of the sum of |set| standard-exponential deviates.
        Contribution { score: -gamma.sf(total).ln(), top_gene: Some(top_gene) }
    }

    /// Row of the smallest percentile within the set, with its value.
    fn most_specific(&self, col: usize, geneset: &[usize]) -> (usize, f64) {
        geneset.iter()
            .map(|&row| (row, self.matrix.value(row, col)))
            .reduce(|best, next| if next.1 < best.1 { next } else { best })
            .unwrap_or((0, 1.0))
    }
}

fn clamp_finite(score: f64) -> f64 {
    match score.is_finite() {
        true  => score,
        false => 0.0,
    }
}
