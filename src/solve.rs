//! Dense LU factorization with partial pivoting.
//!
//! The augmented spline system is symmetric but indefinite (the bordered
//! constraint row rules out Cholesky), so it is factored once with a
//! partially pivoted LU and solved per sample column. The factorization is
//! also where degenerate montages surface: a pivot below tolerance fails
//! with [`CsdError::SingularSystem`] instead of producing a plausible but
//! wrong solution.
use ndarray::Array2;

use crate::error::{CsdError, Result};

/// LU factors of a square matrix, `P·A = L·U` with unit-diagonal L stored
/// below the diagonal of `lu` and U on and above it.
#[derive(Debug, Clone)]
pub struct Lu {
    lu: Array2<f64>,
    perm: Vec<usize>,
}

impl Lu {
    /// Factor `a` in place. Pivot tolerance is `n · ε · max|a|`.
    pub fn factor(mut a: Array2<f64>) -> Result<Lu> {
        let n = a.nrows();
        assert_eq!(n, a.ncols(), "LU needs a square matrix");

        let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let tol = n as f64 * f64::EPSILON * scale;

        let mut perm: Vec<usize> = (0..n).collect();
        for k in 0..n {
            // Largest remaining entry in column k becomes the pivot.
            let mut p = k;
            let mut max = a[[k, k]].abs();
            for r in k + 1..n {
                let v = a[[r, k]].abs();
                if v > max {
                    max = v;
                    p = r;
                }
            }
            if max <= tol {
                return Err(CsdError::SingularSystem { row: k, pivot: max });
            }
            if p != k {
                for c in 0..n {
                    a.swap([p, c], [k, c]);
                }
                perm.swap(p, k);
            }

            let row_k = a.row(k).to_vec();
            for r in k + 1..n {
                let f = a[[r, k]] / row_k[k];
                a[[r, k]] = f;
                for (c, &pivot_c) in row_k.iter().enumerate().skip(k + 1) {
                    let delta = f * pivot_c;
                    a[[r, c]] -= delta;
                }
            }
        }

        Ok(Lu { lu: a, perm })
    }

    /// Solve `A·x = b` from the stored factors.
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = self.perm.len();
        debug_assert_eq!(b.len(), n);

        // Permute, then forward- and back-substitute.
        let mut x: Vec<f64> = self.perm.iter().map(|&p| b[p]).collect();
        for i in 1..n {
            let mut s = x[i];
            for j in 0..i {
                s -= self.lu[[i, j]] * x[j];
            }
            x[i] = s;
        }
        for i in (0..n).rev() {
            let mut s = x[i];
            for j in i + 1..n {
                s -= self.lu[[i, j]] * x[j];
            }
            x[i] = s / self.lu[[i, i]];
        }
        x
    }
}
