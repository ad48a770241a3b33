use std::cmp::Ordering;

use ahash::{AHashMap, AHashSet};
use log::info;
use snpsea_io::read::GctTable;

use crate::MatrixError;

/// How matrix values are interpreted throughout a run. Decided once, by
/// inspecting column 0 of the loaded matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every value of column 0 is exactly 0 or 1: values are annotation
    /// memberships and stay as loaded.
    Binary,
    /// Values are continuous: rows get L2-normalized and columns replaced by
    /// specificity percentiles.
    Quantitative,
}

/// Per-column statistics backing the binary-mode scoring kernels.
/// # Fields
/// - `sums` : per-column count of nonzero rows.
/// - `probs`: `sums[c] / R`.
#[derive(Debug, Clone)]
pub struct BinaryStats {
    pub sums : Vec<u64>,
    pub probs: Vec<f64>,
}

/// A dense gene x condition matrix with ordered, unique row (gene) names and
/// ordered column (condition) names. Values are stored column-major.
pub struct GeneMatrix {
    row_names  : Vec<String>,
    col_names  : Vec<String>,
    columns    : Vec<Vec<f64>>,
    row_indices: AHashMap<String, usize>,
}

impl GeneMatrix {
    /// # Errors
    /// - [`MatrixError::DuplicateRowName`] when two rows share a gene name.
    /// - [`MatrixError::ColumnCountMismatch`] / [`MatrixError::RaggedColumn`]
    ///   on inconsistent shapes.
    pub fn new(row_names: Vec<String>, col_names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        if col_names.len() != columns.len() {
            return Err(MatrixError::ColumnCountMismatch { names: col_names.len(), columns: columns.len() });
        }
        for (index, column) in columns.iter().enumerate() {
            if column.len() != row_names.len() {
                return Err(MatrixError::RaggedColumn { index, expected: row_names.len(), found: column.len() });
            }
        }
        let mut row_indices = AHashMap::with_capacity(row_names.len());
        for (index, name) in row_names.iter().enumerate() {
            if row_indices.insert(name.clone(), index).is_some() {
                return Err(MatrixError::DuplicateRowName(name.clone()));
            }
        }
        Ok(Self { row_names, col_names, columns, row_indices })
    }

    pub fn from_table(table: GctTable) -> Result<Self, MatrixError> {
        Self::new(table.row_names, table.col_names, table.columns)
    }

    pub fn n_rows(&self) -> usize {
        self.row_names.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_names.len()
    }

    pub fn row_names(&self) -> &[String] {
        &self.row_names
    }

    pub fn col_names(&self) -> &[String] {
        &self.col_names
    }

    pub fn row_index(&self, name: &str) -> Option<usize> {
        self.row_indices.get(name).copied()
    }

    /// Gene name -> row index, for every row.
    pub fn row_indices(&self) -> &AHashMap<String, usize> {
        &self.row_indices
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.columns[col][row]
    }

    pub fn column(&self, col: usize) -> &[f64] {
        &self.columns[col]
    }

    /// Decide the run mode: binary iff every entry of column 0 is exactly
    /// 0 or 1.
    pub fn detect_mode(&self) -> Mode {
        let binary = self.columns[0].iter().all(|&value| value == 0.0 || value == 1.0);
        match binary {
            true  => Mode::Binary,
            false => Mode::Quantitative,
        }
    }

    /// Per-column nonzero counts and membership probabilities (binary mode).
    pub fn binary_stats(&self) -> BinaryStats {
        let n_rows = self.n_rows() as f64;
        let sums: Vec<u64> = self.columns.iter()
            .map(|column| column.iter().filter(|&&value| value != 0.0).count() as u64)
            .collect();
        let probs = sums.iter().map(|&sum| sum as f64 / n_rows).collect();
        BinaryStats { sums, probs }
    }

    /// Remove from every other column its scalar projection onto each of the
    /// named condition columns, in input order, then drop the condition
    /// columns from the matrix.
    ///
    /// Each projection reads the current (already-conditioned) matrix state,
    /// so later condition columns are themselves orthogonalized against
    /// earlier ones before being projected out.
    ///
    /// # Errors
    /// - [`MatrixError::MissingCondition`] when a name is absent from the
    ///   column names.
    pub fn condition(&mut self, names: &[String]) -> Result<(), MatrixError> {
        if names.is_empty() {
            return Ok(());
        }
        // ---- Fail before mutating anything.
        for name in names {
            if !self.col_names.contains(name) {
                return Err(MatrixError::MissingCondition(name.clone()));
            }
        }

        for name in names {
            let b_index = self.col_names.iter().position(|n| n == name)
                .ok_or_else(|| MatrixError::MissingCondition(name.clone()))?;
            let b  = self.columns[b_index].clone();
            let bb = dot(&b, &b);
            if bb == 0.0 {
                continue;
            }
            for a_index in 0..self.columns.len() {
                if a_index == b_index {
                    continue;
                }
                let coef = dot(&self.columns[a_index], &b) / bb;
                for (a_value, b_value) in self.columns[a_index].iter_mut().zip(&b) {
                    *a_value -= coef * b_value;
                }
            }
        }

        // ---- Drop the condition columns, highest index first.
        let mut dropped: Vec<usize> = names.iter()
            .filter_map(|name| self.col_names.iter().position(|n| n == name))
            .collect::<AHashSet<usize>>()
            .into_iter()
            .collect();
        dropped.sort_unstable_by(|a, b| b.cmp(a));
        for index in dropped {
            self.columns.remove(index);
            self.col_names.remove(index);
        }
        info!("Conditioned the matrix on {} column(s). {} column(s) remain.", names.len(), self.n_cols());
        Ok(())
    }

    /// Divide each row vector by its L2 norm. Rows with norm 0 remain zero.
    pub fn normalize_rows(&mut self) {
        for row in 0..self.n_rows() {
            let norm = self.columns.iter()
                .map(|column| column[row] * column[row])
                .sum::<f64>()
                .sqrt();
            if norm > 0.0 {
                for column in &mut self.columns {
                    column[row] /= norm;
                }
            }
        }
    }

    /// Replace each column by its specificity percentiles: descending-sort
    /// ranks (average ranks on ties) divided by the row count, so that small
    /// values denote high specificity. Every entry ends up in `(0, 1]`.
    pub fn rank_columns(&mut self) {
        let n_rows = self.n_rows();
        for column in &mut self.columns {
            let mut order: Vec<usize> = (0..n_rows).collect();
            order.sort_by(|&a, &b| column[b].partial_cmp(&column[a]).unwrap_or(Ordering::Equal));

            let mut percentiles = vec![0.0; n_rows];
            let mut begin = 0;
            while begin < n_rows {
                let mut end = begin;
                while end + 1 < n_rows && column[order[end + 1]] == column[order[begin]] {
                    end += 1;
                }
                // Mean of the 1-based ranks begin+1 ..= end+1.
                let rank = (begin + end) as f64 / 2.0 + 1.0;
                for &row in &order[begin..=end] {
                    percentiles[row] = rank / n_rows as f64;
                }
                begin = end + 1;
            }
            *column = percentiles;
        }
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
