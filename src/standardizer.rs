// standardizer.rs
// Purpose: Per-feature z-score statistics fitted on the training matrix

use serde::{Deserialize, Serialize};

use crate::feature_builder::{FeatureVector, FEATURE_COUNT};

/// Variance floor applied before the square root so constant columns
/// standardize to 0 instead of dividing by zero.
pub const VARIANCE_EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub means: FeatureVector,
    pub std_devs: FeatureVector,
}

impl Standardizer {
    pub fn new(means: FeatureVector, std_devs: FeatureVector) -> Self {
        Self { means, std_devs }
    }

    /// Population mean and standard deviation of each column.
    ///
    /// An empty matrix yields means of 0 and the epsilon-floored deviation.
    pub fn fit(rows: &[FeatureVector]) -> Self {
        let n = rows.len().max(1) as f64;
        let mut means = [0.0; FEATURE_COUNT];
        let mut std_devs = [0.0; FEATURE_COUNT];

        for j in 0..FEATURE_COUNT {
            means[j] = rows.iter().map(|r| r[j]).sum::<f64>() / n;
        }
        for j in 0..FEATURE_COUNT {
            let m = means[j];
            let var = rows.iter().map(|r| (r[j] - m) * (r[j] - m)).sum::<f64>() / n;
            std_devs[j] = var.max(VARIANCE_EPSILON).sqrt();
        }

        Self { means, std_devs }
    }

    pub fn transform_row(&self, row: &FeatureVector) -> FeatureVector {
        let mut z = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            z[j] = zscore(row[j], self.means[j], self.std_devs[j]);
        }
        z
    }

    pub fn transform(&self, rows: &[FeatureVector]) -> Vec<FeatureVector> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }
}

/// `(x - mean) / std`, with a zero std (e.g. a hand-edited blob) floored.
pub fn zscore(x: f64, mean: f64, std_dev: f64) -> f64 {
    let s = if std_dev == 0.0 || !std_dev.is_finite() {
        VARIANCE_EPSILON
    } else {
        std_dev
    };
    (x - mean) / s
}
