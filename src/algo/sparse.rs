//! Sparse matrices and a direct sparse LU solver.
//!
//! [`CsrMatrix`] is assembled from `(row, col, value)` triplets. [`SparseLu`]
//! factors a square CSR matrix with row partial pivoting and solves any number
//! of right-hand sides. It works on general (non-symmetric) matrices, such as
//! a Laplacian whose boundary rows were replaced by identity rows.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};

use crate::error::{MeshError, Result};

/// Compressed Sparse Row (CSR) matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Row pointers: row_ptr[i] is the index in col_idx/values where row i starts.
    /// Length is rows + 1, with row_ptr[rows] = nnz.
    row_ptr: Vec<usize>,
    /// Column indices for each stored value, ascending within a row.
    col_idx: Vec<usize>,
    /// Stored values.
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Create a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries at the same (row, col) are summed.
    ///
    /// # Panics
    /// Panics if a triplet lies outside the matrix.
    pub fn from_triplets(rows: usize, cols: usize, mut triplets: Vec<(usize, usize, f64)>) -> Self {
        triplets.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut row_ptr = vec![0usize; rows + 1];
        let mut col_idx: Vec<usize> = Vec::with_capacity(triplets.len());
        let mut values: Vec<f64> = Vec::with_capacity(triplets.len());
        let mut last: Option<(usize, usize)> = None;

        for (row, col, val) in triplets {
            assert!(row < rows && col < cols, "triplet ({}, {}) out of bounds", row, col);
            match (last, values.last_mut()) {
                (Some(prev), Some(acc)) if prev == (row, col) => *acc += val,
                _ => {
                    col_idx.push(col);
                    values.push(val);
                    row_ptr[row + 1] += 1;
                    last = Some((row, col));
                }
            }
        }

        for r in 0..rows {
            row_ptr[r + 1] += row_ptr[r];
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Get the number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Get the number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored entries of row `i` as `(col, value)` pairs.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Value at `(i, j)`; zero when not stored.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        match self.col_idx[range.clone()].binary_search(&j) {
            Ok(k) => self.values[range.start + k],
            Err(_) => 0.0,
        }
    }

    /// Largest absolute stored value.
    pub fn max_abs(&self) -> f64 {
        self.values.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    /// Multiply matrix by vector: y = A * x.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        assert_eq!(x.len(), self.cols, "Vector dimension mismatch");

        let mut y = DVector::zeros(self.rows);
        for i in 0..self.rows {
            y[i] = self.row(i).map(|(j, v)| v * x[j]).sum();
        }
        y
    }

    /// Expand to a dense matrix. Meant for small systems and debugging.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut m = DMatrix::zeros(self.rows, self.cols);
        for i in 0..self.rows {
            for (j, v) in self.row(i) {
                m[(i, j)] += v;
            }
        }
        m
    }
}

/// LU factorization of a square sparse matrix.
///
/// Gaussian elimination one column at a time. Row singletons (rows with a
/// single stored entry, such as identity rows) pivot first, so the unknowns
/// they pin are reproduced exactly. The remaining columns are taken in order,
/// pivoting on the active row with the largest magnitude in the column. Row
/// operations are recorded so [`solve`](Self::solve) can replay them on any
/// right-hand side.
#[derive(Debug, Clone)]
pub struct SparseLu {
    n: usize,
    /// Pivot steps in elimination order.
    steps: Vec<PivotStep>,
    /// Elimination steps `(target_row, pivot_row, factor)` in execution order.
    eliminations: Vec<(usize, usize, f64)>,
}

#[derive(Debug, Clone)]
struct PivotStep {
    column: usize,
    row: usize,
    diag: f64,
    /// Off-diagonal entries of the pivot row, all in later-pivoted columns.
    upper: Vec<(usize, f64)>,
}

impl SparseLu {
    /// Factor `a` with the default relative pivot tolerance (`1e-12`).
    pub fn factorize(a: &CsrMatrix) -> Result<Self> {
        Self::factorize_with_tolerance(a, 1e-12)
    }

    /// Factor `a`, treating a pivot below `tolerance * max|a_ij|` as zero.
    ///
    /// # Errors
    ///
    /// - [`MeshError::InvalidParameter`] for a non-square matrix
    /// - [`MeshError::SingularMatrix`] when a column has no usable pivot
    pub fn factorize_with_tolerance(a: &CsrMatrix, tolerance: f64) -> Result<Self> {
        if a.nrows() != a.ncols() {
            return Err(MeshError::invalid_param(
                "matrix",
                format!("{}x{}", a.nrows(), a.ncols()),
                "must be square",
            ));
        }
        let n = a.nrows();
        let threshold = tolerance * a.max_abs();

        // Working rows keyed by column, plus the rows touching each column.
        let mut rows: Vec<BTreeMap<usize, f64>> = (0..n)
            .map(|i| a.row(i).filter(|&(_, v)| v != 0.0).collect())
            .collect();
        let mut col_rows: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, row) in rows.iter().enumerate() {
            for &j in row.keys() {
                col_rows[j].push(i);
            }
        }

        // Singleton columns first, then the rest in natural order.
        let mut singleton_row: Vec<Option<usize>> = vec![None; n];
        let mut order = Vec::with_capacity(n);
        for (i, row) in rows.iter().enumerate() {
            if let (1, Some(&j)) = (row.len(), row.keys().next()) {
                if singleton_row[j].is_none() {
                    singleton_row[j] = Some(i);
                    order.push(j);
                }
            }
        }
        let num_singletons = order.len();
        order.extend((0..n).filter(|&j| singleton_row[j].is_none()));

        let mut active = vec![true; n];
        let mut steps = Vec::with_capacity(n);
        let mut eliminations = Vec::new();

        for &k in &order {
            // Active rows still holding a non-zero in column k
            let mut candidates = std::mem::take(&mut col_rows[k]);
            candidates.sort_unstable();
            candidates.dedup();
            candidates.retain(|&i| active[i] && rows[i].get(&k).is_some_and(|v| *v != 0.0));

            let pivot = singleton_row[k]
                .filter(|r| candidates.contains(r))
                .or_else(|| {
                    candidates
                        .iter()
                        .copied()
                        .max_by(|&x, &y| rows[x][&k].abs().total_cmp(&rows[y][&k].abs()))
                });
            let p = match pivot {
                Some(p) if rows[p][&k].abs() > threshold && rows[p][&k].is_finite() => p,
                _ => return Err(MeshError::SingularMatrix { column: k }),
            };

            active[p] = false;
            let diag = rows[p][&k];
            let upper: Vec<(usize, f64)> = rows[p]
                .iter()
                .filter(|&(&c, _)| c != k)
                .map(|(&c, &v)| (c, v))
                .collect();

            for &r in candidates.iter().filter(|&&r| r != p) {
                let factor = rows[r][&k] / diag;
                eliminations.push((r, p, factor));

                let target = &mut rows[r];
                target.remove(&k);
                for &(c, v) in &upper {
                    let entry = target.entry(c).or_insert_with(|| {
                        col_rows[c].push(r);
                        0.0
                    });
                    *entry -= factor * v;
                }
            }

            steps.push(PivotStep {
                column: k,
                row: p,
                diag,
                upper,
            });
        }

        tracing::debug!(
            n,
            singletons = num_singletons,
            input_nnz = a.nnz(),
            lu_nnz = steps.iter().map(|s| s.upper.len() + 1).sum::<usize>() + eliminations.len(),
            "sparse LU factorized"
        );

        Ok(Self {
            n,
            steps,
            eliminations,
        })
    }

    /// Dimension of the factored matrix.
    #[inline]
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Solve `A x = b`.
    ///
    /// # Errors
    ///
    /// [`MeshError::SolveFailed`] if `b` has the wrong length or the solution
    /// is not finite (an ill-conditioned system).
    pub fn solve(&self, b: &DVector<f64>) -> Result<DVector<f64>> {
        if b.len() != self.n {
            return Err(MeshError::SolveFailed {
                reason: format!("right-hand side has {} entries, expected {}", b.len(), self.n),
            });
        }

        // Forward: replay the row operations.
        let mut y = b.clone();
        for &(target, source, factor) in &self.eliminations {
            y[target] -= factor * y[source];
        }

        // Backward: later pivots are known by the time a step is revisited.
        let mut x = DVector::zeros(self.n);
        for step in self.steps.iter().rev() {
            let sum: f64 = step.upper.iter().map(|&(c, v)| v * x[c]).sum();
            x[step.column] = (y[step.row] - sum) / step.diag;
        }

        if let Some(bad) = x.iter().position(|v| !v.is_finite()) {
            return Err(MeshError::SolveFailed {
                reason: format!("non-finite solution at index {}", bad),
            });
        }
        Ok(x)
    }
}
