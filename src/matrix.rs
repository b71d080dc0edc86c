//! Dense square matrix used for distances, heuristic values and pheromone.
//!
//! Storage is a single row-major `Vec<f64>` so a whole matrix can be
//! shared read-only across worker threads and replaced in one move.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Square `n x n` matrix of `f64` values in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    size: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a matrix with every cell set to `value`
    pub fn filled(size: usize, value: f64) -> Self {
        Matrix {
            size,
            data: vec![value; size * size],
        }
    }

    /// Create a zero matrix
    pub fn zeros(size: usize) -> Self {
        Self::filled(size, 0.0)
    }

    /// Build a matrix from nested rows. Returns `None` if the rows are not square.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }

        Some(Matrix {
            size,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of rows (and columns)
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.size + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.size + j] = value;
    }

    /// Borrow one row as a slice
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    /// Iterate over all cells in row-major order
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    /// Copy into nested rows (for display and JSON export)
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.size).map(|i| self.row(i).to_vec()).collect()
    }

    /// Largest absolute cell-wise difference between two matrices of the same size
    pub fn max_abs_diff(&self, other: &Matrix) -> f64 {
        assert_eq!(self.size, other.size, "matrix sizes differ");
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.size + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.size + j]
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.size {
            let cells: Vec<String> = self.row(i).iter().map(|v| format!("{:>10.4}", v)).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}
