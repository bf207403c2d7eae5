//! Ridge regression on standardized features.
//!
//! Solves `(XzᵀXz + λI) w = Xzᵀy` for `w` without an intercept term. The
//! 6×6 system is assembled directly and solved with Gauss-Jordan elimination
//! and partial pivoting. [`fit_centered`] subtracts the target mean first so
//! zero-mean standardized features need no intercept column; the mean is
//! added back at prediction time.
//!
//! Numerics: a pivot whose magnitude falls below [`PIVOT_FLOOR`] is replaced
//! by the floor. That keeps degenerate columns from dividing by zero but
//! does not make ill-conditioned inputs well behaved; wildly large
//! coefficients mean the model should be retrained on more varied data.

use crate::feature_builder::{FeatureVector, FEATURE_COUNT};

pub const PIVOT_FLOOR: f64 = 1e-8;
pub const DEFAULT_LAMBDA: f64 = 0.25;

/// Normal-equations matrix `XᵀX + λI` and right-hand side `Xᵀy`.
pub fn normal_equations(
    xz: &[FeatureVector],
    y: &[f64],
    lambda: f64,
) -> ([[f64; FEATURE_COUNT]; FEATURE_COUNT], FeatureVector) {
    let mut xtx = [[0.0; FEATURE_COUNT]; FEATURE_COUNT];
    let mut xty = [0.0; FEATURE_COUNT];

    for (row, &target) in xz.iter().zip(y.iter()) {
        for a in 0..FEATURE_COUNT {
            xty[a] += row[a] * target;
            for b in 0..FEATURE_COUNT {
                xtx[a][b] += row[a] * row[b];
            }
        }
    }
    for (k, r) in xtx.iter_mut().enumerate() {
        r[k] += lambda;
    }

    (xtx, xty)
}

/// Solve `A x = b` for a square `A`. Inputs are copied; nothing is mutated.
///
/// Rows of `a` shorter than `b.len()` are treated as zero-padded.
pub fn solve(a: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let p = b.len();
    let mut aug: Vec<Vec<f64>> = (0..p)
        .map(|i| {
            let mut row = vec![0.0; p + 1];
            if let Some(src) = a.get(i) {
                for (j, v) in src.iter().take(p).enumerate() {
                    row[j] = *v;
                }
            }
            row[p] = b[i];
            row
        })
        .collect();

    for i in 0..p {
        let mut max_row = i;
        for r in (i + 1)..p {
            if aug[r][i].abs() > aug[max_row][i].abs() {
                max_row = r;
            }
        }
        aug.swap(i, max_row);

        let mut pivot = aug[i][i];
        if pivot.abs() < PIVOT_FLOOR {
            pivot = if pivot.is_sign_negative() {
                -PIVOT_FLOOR
            } else {
                PIVOT_FLOOR
            };
        }
        for j in i..=p {
            aug[i][j] /= pivot;
        }

        for r in 0..p {
            if r == i {
                continue;
            }
            let f = aug[r][i];
            if f == 0.0 {
                continue;
            }
            for j in i..=p {
                aug[r][j] -= f * aug[i][j];
            }
        }
    }

    aug.into_iter().map(|row| row[p]).collect()
}

/// Fit ridge weights on an already standardized matrix.
pub fn fit_ridge(xz: &[FeatureVector], y: &[f64], lambda: f64) -> FeatureVector {
    let (xtx, xty) = normal_equations(xz, y, lambda);
    let a: Vec<Vec<f64>> = xtx.iter().map(|r| r.to_vec()).collect();
    let solved = solve(&a, &xty);

    let mut w = [0.0; FEATURE_COUNT];
    for (slot, v) in w.iter_mut().zip(solved) {
        *slot = v;
    }
    w
}

/// Weights fitted against mean-centered targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RidgeFit {
    pub weights: FeatureVector,
    pub target_mean: f64,
}

impl RidgeFit {
    pub fn predict_z(&self, z: &FeatureVector) -> f64 {
        self.target_mean + dot(z, &self.weights)
    }
}

pub fn fit_centered(xz: &[FeatureVector], y: &[f64], lambda: f64) -> RidgeFit {
    let target_mean = if y.is_empty() {
        0.0
    } else {
        y.iter().sum::<f64>() / y.len() as f64
    };
    let centered: Vec<f64> = y.iter().map(|v| v - target_mean).collect();
    RidgeFit {
        weights: fit_ridge(xz, &centered, lambda),
        target_mean,
    }
}

pub fn dot(x: &FeatureVector, w: &FeatureVector) -> f64 {
    x.iter().zip(w.iter()).map(|(a, b)| a * b).sum()
}
