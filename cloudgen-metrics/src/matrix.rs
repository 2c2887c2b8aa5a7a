//! Dense distance matrix.

use crate::{MetricsError, Result};

/// Row-major `rows x cols` matrix of distances.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl DistanceMatrix {
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(MetricsError::ShapeMismatch {
                expected: (rows, cols),
                actual: (data.len(), 1),
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(MetricsError::ShapeMismatch {
                expected: (rows.len(), cols),
                actual: (rows.len(), bad.len()),
            });
        }
        let n = rows.len();
        Self::new(n, cols, rows.into_iter().flatten().collect())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for col in 0..self.cols {
            data.extend((0..self.rows).map(|row| self.get(row, col)));
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    pub(crate) fn expect_shape(&self, expected: (usize, usize)) -> Result<()> {
        if self.shape() != expected {
            return Err(MetricsError::ShapeMismatch {
                expected,
                actual: self.shape(),
            });
        }
        Ok(())
    }
}
