//! Fit-quality metrics for the fuel model.
//!
//! [`FitQuality`] produced by training is always in-sample: it scores the
//! model against the very rows it was fitted on, so it is optimistic.
//! [`k_fold`] is an additive out-of-fold estimate and does not replace it.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::errors::{FuelError, FuelResult};
use crate::feature_builder::FeatureVector;
use crate::ridge::{fit_centered, RidgeFit};
use crate::sample_extractor::TrainingSample;
use crate::standardizer::Standardizer;

/// Coefficient of determination. Defined as 0 when the targets are constant.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }
    let mean = y_true.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean) * (y - mean)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(y, p)| (y - p) * (y - p))
        .sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    }
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let n = y_true.len().max(1) as f64;
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(y, p)| (y - p).abs())
        .sum::<f64>()
        / n
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_r2(r2: f64) -> Self {
        if r2 >= 0.7 {
            Confidence::High
        } else if r2 >= 0.4 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitQuality {
    pub r2: f64,
    pub mae: f64,
    pub in_sample: bool,
}

impl FitQuality {
    pub fn in_sample(y_true: &[f64], y_pred: &[f64]) -> Self {
        Self {
            r2: r2_score(y_true, y_pred),
            mae: mean_absolute_error(y_true, y_pred),
            in_sample: true,
        }
    }

    pub fn confidence(&self) -> Confidence {
        Confidence::from_r2(self.r2)
    }

    pub fn describe(&self) -> String {
        let scope = if self.in_sample { "in-sample" } else { "out-of-fold" };
        format!(
            "R² {:.2} ({scope}), MAE {:.0} L/h, confidence {}",
            self.r2,
            self.mae,
            self.confidence().as_str()
        )
    }
}

/// Raw, unclamped model output on a standardized matrix.
pub fn predict_rows(xz: &[FeatureVector], fit: &RidgeFit) -> Vec<f64> {
    xz.iter().map(|r| fit.predict_z(r)).collect()
}

/// K-fold cross-validation with a seeded shuffle.
///
/// Each fold refits the standardizer on its own training rows. Out-of-fold
/// predictions from every fold are pooled before scoring.
pub fn k_fold(samples: &[TrainingSample], k: usize, lambda: f64, seed: u64) -> FuelResult<FitQuality> {
    if k < 2 {
        return Err(FuelError::validation("k", "k-fold needs at least 2 folds"));
    }
    if samples.len() < k {
        return Err(FuelError::insufficient_data(format!(
            "{} samples cannot fill {k} folds",
            samples.len()
        )));
    }

    let mut order: Vec<usize> = (0..samples.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let mut y_true = Vec::with_capacity(samples.len());
    let mut y_pred = Vec::with_capacity(samples.len());

    for fold in 0..k {
        let (test, train): (Vec<usize>, Vec<usize>) =
            order.iter().enumerate().fold((Vec::new(), Vec::new()), |mut acc, (pos, &idx)| {
                if pos % k == fold {
                    acc.0.push(idx);
                } else {
                    acc.1.push(idx);
                }
                acc
            });

        let x_train: Vec<FeatureVector> = train.iter().map(|&i| samples[i].features).collect();
        let y_train: Vec<f64> = train.iter().map(|&i| samples[i].target).collect();
        let standardizer = Standardizer::fit(&x_train);
        let fit = fit_centered(&standardizer.transform(&x_train), &y_train, lambda);

        for &i in &test {
            let z = standardizer.transform_row(&samples[i].features);
            y_true.push(samples[i].target);
            y_pred.push(fit.predict_z(&z).max(0.0));
        }
    }

    Ok(FitQuality {
        r2: r2_score(&y_true, &y_pred),
        mae: mean_absolute_error(&y_true, &y_pred),
        in_sample: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction_scores_one() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(r2_score(&y, &y), 1.0);
        assert_eq!(mean_absolute_error(&y, &y), 0.0);
    }

    #[test]
    fn constant_targets_score_zero_not_nan() {
        let y = [4.0, 4.0, 4.0];
        let r2 = r2_score(&y, &[1.0, 2.0, 3.0]);
        assert_eq!(r2, 0.0);
    }

    #[test]
    fn r2_never_exceeds_one() {
        let y = [1.0, 5.0, 2.0, 8.0];
        for pred in [[0.0; 4], [1.0, 5.0, 2.0, 8.0], [100.0, -3.0, 2.0, 1.0]] {
            assert!(r2_score(&y, &pred) <= 1.0);
        }
    }

    #[test]
    fn mae_is_mean_of_absolute_errors() {
        let mae = mean_absolute_error(&[10.0, 20.0], &[12.0, 17.0]);
        assert!((mae - 2.5).abs() < 1e-12);
    }

    #[test]
    fn empty_input_is_defined() {
        assert_eq!(r2_score(&[], &[]), 0.0);
        assert_eq!(mean_absolute_error(&[], &[]), 0.0);
    }

    #[test]
    fn confidence_bands() {
        assert_eq!(Confidence::from_r2(0.85), Confidence::High);
        assert_eq!(Confidence::from_r2(0.7), Confidence::High);
        assert_eq!(Confidence::from_r2(0.5), Confidence::Medium);
        assert_eq!(Confidence::from_r2(0.1), Confidence::Low);
        assert_eq!(Confidence::from_r2(-2.0), Confidence::Low);
    }

    #[test]
    fn describe_labels_in_sample_metrics() {
        let q = FitQuality::in_sample(&[1.0, 2.0], &[1.0, 2.0]);
        assert!(q.describe().contains("in-sample"));
    }

    #[test]
    fn k_fold_rejects_too_few_folds() {
        assert!(k_fold(&[], 1, 0.25, 7).is_err());
    }
}
