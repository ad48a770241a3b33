use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use clap::{ArgEnum, Parser};
use log::info;
use serde::{Deserialize, Serialize};

mod error;
pub use error::CliError;

/// Per-locus scoring method: aggregate each gene set into its column score
/// using either the single most specific gene, or the whole set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ArgEnum, Serialize, Deserialize)]
pub enum Method {
    Single,
    Total,
}

/// Where the user SNP identifiers come from: a plain file, or `randomN`,
/// requesting `N` SNPs drawn from the null pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnpSource {
    File(PathBuf),
    Random(usize),
}

#[derive(Parser, Debug, Serialize, Deserialize, PartialEq)]
#[clap(name = "snpsea-rs", version, about = "Enrichment of GWAS SNP sets for condition-specific gene expression")]
pub struct Cli {
    /// User SNP identifiers: a one-per-line file, or 'randomN' to draw N
    /// SNPs from the null pool.
    #[clap(long)]
    pub snps: String,

    /// Gene x condition expression matrix (GCT, optionally gzipped).
    #[clap(long, parse(from_os_str))]
    pub gene_matrix: PathBuf,

    /// Gene intervals (BED4+): chrom, start, end, gene name.
    ///
    /// Only genes named in the expression matrix are indexed.
    #[clap(long, parse(from_os_str))]
    pub gene_intervals: PathBuf,

    /// SNP intervals (BED4+): chrom, start, end, SNP identifier.
    ///
    /// Typically linkage intervals, built upstream of this program.
    #[clap(long, parse(from_os_str))]
    pub snp_intervals: PathBuf,

    /// Null-pool SNP identifiers used for size-matched null sampling.
    #[clap(long, parse(from_os_str))]
    pub null_snps: PathBuf,

    /// Output directory where results will be written.
    #[clap(long, parse(from_os_str))]
    pub out: PathBuf,

    /// Column names to project out of the matrix before ranking, one per
    /// line. Quantitative matrices only.
    #[clap(long, parse(from_os_str))]
    pub condition: Option<PathBuf>,

    /// Symmetric base-pair extension applied to a SNP interval when it
    /// overlaps no gene.
    #[clap(long, default_value("250000"))]
    pub slop: u64,

    /// Number of parallel worker threads. Clamped to the machine's
    /// available parallelism.
    #[clap(long, default_value("1"))]
    pub threads: usize,

    /// Number of matched null SNP-set replicates to score after the user
    /// set. 0 skips the replicate phase.
    #[clap(long, default_value("10"))]
    pub null_snpsets: usize,

    /// Stop drawing nulls for a condition once this many null scores reached
    /// the user score.
    #[clap(long, default_value("25"))]
    pub min_observations: u64,

    /// Upper bound on the number of null draws per condition.
    #[clap(long, default_value("1000"))]
    pub max_iterations: u64,

    /// Scoring method.
    #[clap(long, arg_enum, default_value("single"))]
    pub score: Method,

    /// Seed for the random number generator.
    #[clap(long, default_value_t = fastrand::u64(u64::MIN..=u64::MAX))]
    pub seed: u64,

    /// Set the verbosity level (-v -vv -vvv -vvvv)
    ///
    /// Set the verbosity level of this program. With multiple levels
    ///    -v : Info  |  -vv : Debug  | -vvv : Trace
    /// By default, the program will still output Warnings. Use --quiet/-q to disable them
    #[clap(short = 'v', long, parse(from_occurrences))]
    pub verbose: u8,

    /// Disable warnings.
    ///
    /// By default, warnings are emitted and redirected to the console, even
    /// without verbose mode on. Use this argument to disable this. Only
    /// errors will be displayed.
    #[clap(short = 'q', long)]
    pub quiet: bool,
}

impl Cli {
    /// Check parameter consistency before any input file is touched.
    ///
    /// # Errors
    /// - [`CliError::ObservationsExceedIterations`] when
    ///   `--min-observations >= --max-iterations`.
    /// - [`CliError::NonPositiveParameter`] when `--max-iterations` is 0.
    /// - [`CliError::MalformedRandomCount`] when `--snps randomN` carries an
    ///   unparseable or zero count.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.max_iterations == 0 {
            return Err(CliError::NonPositiveParameter("max-iterations"));
        }
        if self.min_observations >= self.max_iterations {
            return Err(CliError::ObservationsExceedIterations {
                min_observations: self.min_observations,
                max_iterations  : self.max_iterations,
            });
        }
        let _ = self.snp_source()?;
        Ok(())
    }

    /// Interpret `--snps` as either a file path or the `randomN`
    /// pseudo-source.
    pub fn snp_source(&self) -> Result<SnpSource, CliError> {
        match self.snps.strip_prefix("random") {
            None => Ok(SnpSource::File(PathBuf::from(&self.snps))),
            Some(count) => {
                let count: usize = count.parse()
                    .map_err(|_| CliError::MalformedRandomCount(self.snps.clone()))?;
                if count == 0 {
                    return Err(CliError::MalformedRandomCount(self.snps.clone()));
                }
                Ok(SnpSource::Random(count))
            }
        }
    }

    /// Log the parsed arguments.
    pub fn serialize(&self) -> Result<String> {
        let serialized = serde_yaml::to_string(self).context("Failed to serialize arguments")?;
        info!("\n---- Command line args ----\n{serialized}\n---");
        Ok(serialized)
    }

    /// Dump the parameters used to `path` as YAML.
    pub fn write_args(&self, path: &Path) -> Result<()> {
        let serialized = serde_yaml::to_string(self).context("Failed to serialize arguments")?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write arguments to '{}'", path.display()))
    }

    /// Load a parameter set previously written by [`Cli::write_args`].
    pub fn from_args_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read arguments from '{}'", path.display()))?;
        serde_yaml::from_str(&contents).context("Failed to deserialize arguments")
    }
}
