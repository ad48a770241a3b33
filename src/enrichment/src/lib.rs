use anyhow::{Context, Result};
use itertools::Itertools;
use log::{info, warn};

use genome::{GeneIndex, SnpMap};
use parser::{Cli, SnpSource};
use snpsea_io::{
    read::{read_conditions, read_item_list_path, BedRecord, GctTable},
    write::{create_output_dir, TsvWriter},
};
use specificity::{GeneMatrix, Mode};

pub mod resolver;
use resolver::{GenesetResolver, Resolution};

pub mod locus;
use locus::Locus;

pub mod sampler;
use sampler::{effective_size, random_snp_draw, BinTable};

pub mod score;
use score::{Contribution, Scorer};

pub mod scheduler;
use scheduler::PermutationScheduler;

pub mod report;
use report::SnpFate;

mod error;
pub use error::EnrichmentError;

/// Main runner.
pub fn run(cli: &Cli) -> Result<()> {
    // ----------------------------- Sanity checks.
    cli.validate().context("Invalid command line arguments")?;

    // ----------------------------- Prepare the output directory.
    create_output_dir(&cli.out)?;
    cli.write_args(&cli.out.join(report::ARGS_FILE))?;

    // ----------------------------- Load the expression matrix.
    info!("Loading expression matrix '{}'...", cli.gene_matrix.display());
    let table      = GctTable::from_path(&cli.gene_matrix)?;
    let mut matrix = GeneMatrix::from_table(table)?;
    let mode       = matrix.detect_mode();
    info!("Expression matrix detected as {mode:?}");

    // ----------------------------- Index gene and SNP intervals.
    info!("Indexing gene intervals '{}'...", cli.gene_intervals.display());
    let gene_records = BedRecord::from_path(&cli.gene_intervals)?;
    let index = GeneIndex::build(
        gene_records.into_iter().map(|record| (record.range, record.name)),
        matrix.row_indices(),
    );
    info!("Hypergeometric population: {} gene(s) with both expression and intervals", index.r_effective());

    info!("Loading SNP intervals '{}'...", cli.snp_intervals.display());
    let snp_records = BedRecord::from_path(&cli.snp_intervals)?;
    let snp_map = SnpMap::from_records(snp_records.into_iter().map(|record| (record.name, record.range)));

    let resolver = GenesetResolver::new(&index, &snp_map, cli.slop);

    // ----------------------------- Bin the null pool by gene-set size.
    info!("Resolving the null pool '{}'...", cli.null_snps.display());
    let null_pool: Vec<String> = read_item_list_path(&cli.null_snps)?.into_iter().unique().collect();
    let bins = BinTable::build(&null_pool, &resolver)?;

    // ----------------------------- Initialize the RNG.
    let mut rng = fastrand::Rng::with_seed(cli.seed);
    info!("Seeded the random number generator with {}", cli.seed);

    // ----------------------------- Gather the user SNP identifiers.
    let user_snps: Vec<String> = match cli.snp_source()? {
        SnpSource::File(path) => {
            info!("Reading user SNPs from '{}'...", path.display());
            read_item_list_path(&path)?.into_iter().unique().collect()
        }
        SnpSource::Random(count) => {
            info!("Drawing {count} random SNP(s) from the null pool...");
            random_snp_draw(&null_pool, &resolver, count, &mut rng)?
        }
    };
    if user_snps.is_empty() {
        return Err(EnrichmentError::EmptySnpSet.into());
    }

    // ----------------------------- Resolve user SNPs and merge overlapping loci.
    let mut resolved = Vec::new();
    let mut absent   = Vec::new();
    let mut no_genes = Vec::new();
    for name in &user_snps {
        match resolver.resolve(name) {
            Resolution::Genes { range, rows } => resolved.push((name.clone(), range, rows)),
            Resolution::NoGenes(range)        => no_genes.push((name.clone(), range)),
            Resolution::Absent                => absent.push(name.clone()),
        }
    }
    if !absent.is_empty() {
        warn!("{} user SNP(s) absent from the SNP-interval file: {}", absent.len(), absent.iter().join(", "));
    }
    if !no_genes.is_empty() {
        warn!("{} user SNP(s) overlap no gene, even after {}bp of slop", no_genes.len(), cli.slop);
    }
    if resolved.is_empty() {
        return Err(EnrichmentError::EmptySnpSet.into());
    }

    let loci = locus::merge_loci(&resolved);
    info!("{} locus/loci after merging {} resolved SNP(s)", loci.len(), resolved.len());

    // ----------------------------- Report per-SNP gene sets.
    let fates = snp_fates(&user_snps, &absent, &no_genes, &loci);
    report::write_snp_genes(&cli.out.join(report::SNP_GENES_FILE), &fates, &matrix)?;

    // ----------------------------- Condition, normalize and rank the matrix.
    match mode {
        Mode::Quantitative => {
            if let Some(condition_path) = &cli.condition {
                let conditions = read_conditions(condition_path)?;
                info!("Conditioning the matrix on {} column(s)...", conditions.len());
                matrix.condition(&conditions)?;
            }
            matrix.normalize_rows();
            matrix.rank_columns();
            info!("Ranked the matrix into specificity percentiles");
        }
        Mode::Binary => {
            if cli.condition.is_some() {
                warn!("--condition is ignored for binary matrices");
            }
        }
    }

    // ----------------------------- Prepare the scoring engine.
    let scorer = Scorer::new(&matrix, mode, cli.score, index.r_effective() as u64);
    let sizes: Vec<usize> = loci.iter().map(|locus| effective_size(locus.rows.len())).collect();
    bins.require_nonempty(&sizes)?;
    let scheduler = PermutationScheduler::new(&scorer, &bins, cli.threads, cli.min_observations, cli.max_iterations)?;

    // ----------------------------- Score the user SNP set, column by column.
    info!("Scoring {} condition(s) against the user SNP set...", matrix.n_cols());
    let mut pvalue_writer = TsvWriter::create(&cli.out.join(report::CONDITION_PVALUES_FILE))?;
    pvalue_writer.write_row(["condition", "pvalue", "nulls_observed", "nulls_tested"])?;
    let mut score_writer = TsvWriter::create(&cli.out.join(report::SNP_CONDITION_SCORES_FILE))?;
    score_writer.write_row(["snp", "condition", "gene", "score"])?;

    for col in 0..matrix.n_cols() {
        let condition = &matrix.col_names()[col];
        let contributions: Vec<Contribution> =
            loci.iter().map(|locus| scorer.contribution(col, &locus.rows)).collect();
        for (locus, contribution) in loci.iter().zip(&contributions) {
            let gene = contribution.top_gene
                .map_or("", |row| matrix.row_names()[row].as_str());
            score_writer.write_row([
                locus.label.clone(),
                condition.clone(),
                gene.to_string(),
                contribution.score.to_string(),
            ])?;
        }

        let user_score: f64 = contributions.iter().map(|contribution| contribution.score).sum();
        let outcome = scheduler.column_pvalue(col, user_score, &sizes, &mut rng);
        pvalue_writer.write_row([
            condition.clone(),
            outcome.pvalue.to_string(),
            outcome.nulls_observed.to_string(),
            outcome.nulls_tested.to_string(),
        ])?;
        info!(
            "{condition}: pvalue {:.6} ({}/{} null exceedances)",
            outcome.pvalue, outcome.nulls_observed, outcome.nulls_tested
        );
    }

    // ----------------------------- Score matched null replicates.
    if cli.null_snpsets > 0 {
        info!("Scoring {} matched null SNP-set replicate(s)...", cli.null_snpsets);
        // Truncate any previous file: rows are appended across replicates.
        TsvWriter::create(&cli.out.join(report::NULL_PVALUES_FILE))?;
        for replicate in 1..=cli.null_snpsets {
            let mut null_writer = TsvWriter::append(&cli.out.join(report::NULL_PVALUES_FILE))?;
            let replicate_sets = bins.matched_draw(&sizes, &mut rng);
            for col in 0..matrix.n_cols() {
                let user_score = scorer.column_score(col, &replicate_sets);
                let outcome    = scheduler.column_pvalue(col, user_score, &sizes, &mut rng);
                null_writer.write_row([
                    matrix.col_names()[col].clone(),
                    outcome.pvalue.to_string(),
                    outcome.nulls_observed.to_string(),
                    outcome.nulls_tested.to_string(),
                    replicate.to_string(),
                ])?;
            }
            info!("Scored null replicate {replicate}/{}", cli.null_snpsets);
        }
    }

    info!("Done. Results written to '{}'", cli.out.display());
    Ok(())
}

/// Order the per-SNP report rows by input iteration order, collapsing each
/// merged locus onto its first member.
fn snp_fates<'a>(
    user_snps: &'a [String],
    absent   : &'a [String],
    no_genes : &'a [(String, genome::GenomicRange)],
    loci     : &'a [Locus],
) -> Vec<SnpFate<'a>> {
    let mut fates = Vec::with_capacity(user_snps.len());
    for name in user_snps {
        if absent.contains(name) {
            fates.push(SnpFate::Absent(name.as_str()));
        } else if let Some((name, range)) = no_genes.iter().find(|(no_gene, _)| no_gene == name) {
            fates.push(SnpFate::NoGenes { name: name.as_str(), range });
        } else if let Some(locus) = loci.iter().find(|locus| locus.snps.first() == Some(name)) {
            fates.push(SnpFate::Merged(locus));
        }
        // Non-first members of a merged locus are already covered by its row.
    }
    fates
}
