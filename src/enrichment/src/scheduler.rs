use anyhow::{Context, Result};
use log::debug;
use rayon::prelude::*;

use crate::{sampler::BinTable, score::Scorer};

/// First batch size of the geometric doubling sequence.
const INITIAL_BATCH: u64 = 100;

/// Outcome of the adaptive permutation loop for one condition column.
/// # Fields
/// - `pvalue`        : exact Monte-Carlo p-value `(observed + 1) / (tested + 1)`.
/// - `nulls_observed`: null draws scoring at least the user score.
/// - `nulls_tested`  : total null draws evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnOutcome {
    pub pvalue        : f64,
    pub nulls_observed: u64,
    pub nulls_tested  : u64,
}

/// Adaptive exceedance-counting permutation loop.
///
/// Columns are scored sequentially; the parallelism lives inside each
/// column, where every batch of null draws is statically partitioned among
/// the worker threads. Workloads vary wildly per column because of the
/// early termination on `min_observations`.
pub struct PermutationScheduler<'a> {
    scorer          : &'a Scorer<'a>,
    bins            : &'a BinTable,
    pool            : rayon::ThreadPool,
    workers         : usize,
    min_observations: u64,
    max_iterations  : u64,
}

impl<'a> PermutationScheduler<'a> {
    /// Build the scheduler and its worker pool.
    ///
    /// The requested thread count is clamped to `[1, available cores]`.
    pub fn new(
        scorer          : &'a Scorer<'a>,
        bins            : &'a BinTable,
        threads         : usize,
        min_observations: u64,
        max_iterations  : u64,
    ) -> Result<Self> {
        let workers = threads.clamp(1, num_cpus::get());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .context("Failed to build the permutation thread pool")?;
        Ok(Self { scorer, bins, pool, workers, min_observations, max_iterations })
    }

    /// Estimate the p-value of `user_score` on column `col` against
    /// size-matched null draws.
    ///
    /// Batch sizes follow a geometric doubling sequence starting at
    /// [`INITIAL_BATCH`], summing to at most `max_iterations` (last batch
    /// trimmed). The loop stops early once `min_observations` null scores
    /// reached `user_score`. A non-positive user score short-circuits to
    /// `pvalue = 1.0` without testing any null.
    ///
    /// Each worker forks its own RNG stream off `rng` in deterministic
    /// order, so results only depend on the seed, never on thread timing.
    pub fn column_pvalue(
        &self,
        col       : usize,
        user_score: f64,
        sizes     : &[usize],
        rng       : &mut fastrand::Rng,
    ) -> ColumnOutcome {
        if user_score <= 0.0 {
            return ColumnOutcome { pvalue: 1.0, nulls_observed: 0, nulls_tested: 0 };
        }

        let mut observed = 0u64;
        let mut tested   = 0u64;
        let mut nominal  = INITIAL_BATCH;
        while tested < self.max_iterations {
            let batch = nominal.min(self.max_iterations - tested);
            let jobs: Vec<(fastrand::Rng, u64)> = partition(batch, self.workers)
                .into_iter()
                .filter(|&share| share > 0)
                .map(|share| (rng.fork(), share))
                .collect();

            let exceeded: u64 = self.pool.install(|| {
                jobs.into_par_iter()
                    .map(|(mut rng, share)| {
                        let mut local = 0u64;
                        for _ in 0..share {
                            let draw = self.bins.matched_draw(sizes, &mut rng);
                            if self.scorer.column_score(col, &draw) >= user_score {
                                local += 1;
                            }
                        }
                        local
                    })
                    .sum()
            });

            observed += exceeded;
            tested   += batch;
            if observed >= self.min_observations {
                break;
            }
            nominal *= 2;
        }

        debug!("column {col}: {observed}/{tested} null exceedance(s)");
        ColumnOutcome {
            pvalue        : (observed + 1) as f64 / (tested + 1) as f64,
            nulls_observed: observed,
            nulls_tested  : tested,
        }
    }
}

/// Statically split `count` draws across `workers` shares.
fn partition(count: u64, workers: usize) -> Vec<u64> {
    let workers   = workers as u64;
    let base      = count / workers;
    let remainder = count % workers;
    (0..workers)
        .map(|worker| base + u64::from(worker < remainder))
        .collect()
}
