use std::{fs, path::{Path, PathBuf}};

use anyhow::Result;
use clap::Parser;
use parser::Cli;
use tempfile::TempDir;

/// Self-contained input fixture for end-to-end runs: every input file is
/// written into a temporary directory.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Result<Self> {
        Ok(Self { dir: TempDir::new()? })
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.path().join(file)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.path("out")
    }

    pub fn write(&self, file: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path(file);
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_output(&self, file: &str) -> Result<String> {
        Ok(fs::read_to_string(self.out_dir().join(file))?)
    }

    /// Binary 4x1 fixture. Gene row order: GENE0..GENE3, annotation column
    /// `[0, 1, 1, 0]`. The user SNP tags GENE1; the null pool only ever
    /// resolves to the unannotated GENE0 and GENE3.
    pub fn binary() -> Result<Self> {
        let workspace = Self::new()?;
        workspace.write("matrix.gct", "#1.2\n\
            4\t1\n\
            Name\tDescription\tannotated\n\
            GENE0\tna\t0\n\
            GENE1\tna\t1\n\
            GENE2\tna\t1\n\
            GENE3\tna\t0\n",
        )?;
        workspace.write("genes.bed", "1\t1000\t1500\tGENE0\n\
            1\t11000\t11500\tGENE1\n\
            1\t21000\t21500\tGENE2\n\
            1\t31000\t31500\tGENE3\n",
        )?;
        workspace.write("snps.bed", "1\t11100\t11101\trs_user\n\
            1\t1100\t1101\tnull0\n\
            1\t31100\t31101\tnull3\n",
        )?;
        workspace.write("user.txt", "SNP\nrs_user\n")?;
        workspace.write("null.txt", "null0\nnull3\n")?;
        Ok(workspace)
    }

    /// Quantitative 4x2 fixture. rsA and rsB both tag GENE1 (they must
    /// merge); rsC tags GENE2 only through slop; rs_absent has no interval.
    pub fn quantitative() -> Result<Self> {
        let workspace = Self::new()?;
        workspace.write("matrix.gct", "#1.2\n\
            4\t2\n\
            Name\tDescription\tliver\tspleen\n\
            GENE0\tna\t0.1\t8.0\n\
            GENE1\tna\t7.5\t0.2\n\
            GENE2\tna\t2.0\t2.0\n\
            GENE3\tna\t0.5\t4.0\n",
        )?;
        workspace.write("genes.bed", "1\t1000\t1500\tGENE0\n\
            1\t11000\t11500\tGENE1\n\
            1\t21000\t21500\tGENE2\n\
            1\t31000\t31500\tGENE3\n",
        )?;
        workspace.write("snps.bed", "1\t11100\t11101\trsA\n\
            1\t11400\t11401\trsB\n\
            1\t25000\t25001\trsC\n\
            1\t1100\t1101\tnull0\n\
            1\t11100\t11101\tnull1\n\
            1\t21100\t21101\tnull2\n\
            1\t31100\t31101\tnull3\n",
        )?;
        workspace.write("user.txt", "rsA\nrsB\nrsC\nrs_absent\n")?;
        workspace.write("null.txt", "null0\nnull1\nnull2\nnull3\n")?;
        Ok(workspace)
    }

    /// Assemble a `Cli` over this workspace's fixture files, reading the
    /// user SNPs from `user.txt`.
    pub fn cli(&self, extra_args: &[&str]) -> Cli {
        let snps = display(&self.path("user.txt"));
        self.cli_with_snps(&snps, extra_args)
    }

    /// Same as [`Workspace::cli`], with an explicit `--snps` source (e.g.
    /// `randomN`).
    pub fn cli_with_snps(&self, snps: &str, extra_args: &[&str]) -> Cli {
        let paths: Vec<String> = [
            self.path("matrix.gct"),
            self.path("genes.bed"),
            self.path("snps.bed"),
            self.path("null.txt"),
            self.out_dir(),
        ].iter().map(|path| display(path)).collect();

        let mut args = vec![
            "snpsea-rs",
            "--gene-matrix", paths[0].as_str(),
            "--gene-intervals", paths[1].as_str(),
            "--snp-intervals", paths[2].as_str(),
            "--null-snps", paths[3].as_str(),
            "--out", paths[4].as_str(),
            "--snps", snps,
            "--seed", "42",
        ];
        args.extend_from_slice(extra_args);
        Cli::parse_from(args)
    }
}

fn display(path: &Path) -> String {
    path.to_str().expect("fixture paths are valid UTF-8").to_string()
}
