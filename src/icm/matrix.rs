//! Dense square matrices for the absorbing chain.

use rayon::prelude::*;
use std::ops::{Index, IndexMut};

/// Row-major dense square matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// An `n × n` matrix of zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// The `n × n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    /// One row.
    #[inline]
    pub fn row(&self, r: usize) -> &[f64] {
        &self.data[r * self.n..(r + 1) * self.n]
    }

    /// Sum of every column.
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n];
        for r in 0..self.n {
            for (sum, &x) in sums.iter_mut().zip(self.row(r)) {
                *sum += x;
            }
        }
        sums
    }

    /// `self · self`, rows computed in parallel.
    pub fn square(&self) -> Matrix {
        self.multiply(self)
    }

    /// `self · other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.n, other.n, "matrix sizes differ");
        let n = self.n;
        let mut out = Matrix::zeros(n);
        if n == 0 {
            return out;
        }
        out.data.par_chunks_mut(n).enumerate().for_each(|(i, out_row)| {
            for (k, &a) in self.row(i).iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                for (o, &b) in out_row.iter_mut().zip(other.row(k)) {
                    *o += a * b;
                }
            }
        });
        out
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        &self.data[r * self.n + c]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
        &mut self.data[r * self.n + c]
    }
}
