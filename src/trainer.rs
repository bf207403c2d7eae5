// trainer.rs
// Purpose: Assemble a training set (real + synthetic when thin) and fit the ridge model

use rand::Rng;
use tracing::{info, warn};

use crate::config_loader::TrainingConfig;
use crate::errors::{FuelError, FuelResult};
use crate::evaluator::{predict_rows, FitQuality};
use crate::feature_builder::{FeatureVector, FEATURE_COUNT};
use crate::fitted_model::{FittedModel, TrainingMeta};
use crate::ridge::fit_centered;
use crate::sample_extractor::TrainingSample;
use crate::standardizer::Standardizer;
use crate::synthetic::SyntheticSampleGenerator;

/// Real samples below this count trigger augmentation.
pub const MIN_REAL_SAMPLES: usize = FEATURE_COUNT + 3;

/// Standardize, solve, score. Shared by real, augmented and demo training.
pub fn fit_from_samples(samples: &[TrainingSample], lambda: f64, meta: TrainingMeta) -> FuelResult<FittedModel> {
    if samples.is_empty() {
        return Err(FuelError::insufficient_data(
            "no usable fuel-log samples and augmentation produced none",
        ));
    }

    let x: Vec<FeatureVector> = samples.iter().map(|s| s.features).collect();
    let y: Vec<f64> = samples.iter().map(|s| s.target).collect();

    let standardizer = Standardizer::fit(&x);
    let xz = standardizer.transform(&x);
    let fit = fit_centered(&xz, &y, lambda);
    let y_hat = predict_rows(&xz, &fit);
    let quality = FitQuality::in_sample(&y, &y_hat);

    if fit.weights.iter().any(|w| !w.is_finite()) {
        warn!(weights = ?fit.weights, "ridge solve produced non-finite weights; retrain with more varied data");
    }

    Ok(FittedModel::new(
        fit,
        &standardizer,
        quality,
        samples.len(),
        lambda,
        meta,
    ))
}

pub struct FuelModelTrainer<R: Rng> {
    config: TrainingConfig,
    generator: SyntheticSampleGenerator<R>,
}

impl<R: Rng> FuelModelTrainer<R> {
    pub fn new(config: TrainingConfig, generator: SyntheticSampleGenerator<R>) -> Self {
        Self { config, generator }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Number of synthetic voyages added when real data is thin.
    pub fn augmentation_size(&self) -> usize {
        self.config
            .min_augment_samples
            .max(MIN_REAL_SAMPLES * self.config.augment_multiplier)
    }

    /// Fit on `real`, padding with synthetic voyages when fewer than
    /// [`MIN_REAL_SAMPLES`] are available and augmentation is enabled.
    pub fn train(&mut self, real: &[TrainingSample]) -> FuelResult<FittedModel> {
        let mut used: Vec<TrainingSample> = real.to_vec();
        let mut augmented = false;

        if used.len() < MIN_REAL_SAMPLES {
            if self.config.augment {
                let extra = self.augmentation_size();
                used.extend(self.generator.samples(extra));
                augmented = true;
                info!(real = real.len(), synthetic = extra, "augmenting thin training data");
            } else {
                warn!(real = real.len(), min = MIN_REAL_SAMPLES, "training on thin data with augmentation disabled");
            }
        }

        let model = fit_from_samples(
            &used,
            self.config.lambda,
            TrainingMeta {
                augmented,
                real_sample_count: real.len(),
                demo: false,
            },
        )?;
        info!(samples = model.sample_count, r2 = model.r2, mae = model.mae, "trained fuel model");
        Ok(model)
    }

    /// Fully synthetic demo model.
    pub fn seed_demo(&mut self) -> FuelResult<FittedModel> {
        let samples = self.generator.samples(self.config.demo_samples);
        let model = fit_from_samples(
            &samples,
            self.config.lambda,
            TrainingMeta {
                augmented: true,
                real_sample_count: 0,
                demo: true,
            },
        )?;
        info!(samples = model.sample_count, r2 = model.r2, "seeded demo fuel model");
        Ok(model)
    }
}
