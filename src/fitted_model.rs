// fitted_model.rs
// Purpose: The persisted ridge model and its standardized prediction path

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluator::{Confidence, FitQuality};
use crate::feature_builder::{build_features, FeatureName, FeatureVector, ScenarioInput, FEATURE_COUNT};
use crate::ridge::{dot, RidgeFit};
use crate::standardizer::{zscore, Standardizer};

/// Bump when feature count or order changes. Blobs with another version
/// load as "no model".
pub const MODEL_SCHEMA_VERSION: u32 = 1;
pub const MODEL_TARGET: &str = "LPH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FittedModel {
    pub schema_version: u32,
    pub weights: FeatureVector,
    /// Mean training target; the weights were fitted against `y - target_mean`.
    #[serde(default)]
    pub target_mean: f64,
    pub feature_means: FeatureVector,
    pub feature_std_devs: FeatureVector,
    pub feature_names: Vec<String>,
    pub target: String,
    /// In-sample coefficient of determination.
    pub r2: f64,
    /// In-sample mean absolute error, L/h.
    pub mae: f64,
    pub sample_count: usize,
    pub regularization_lambda: f64,
    pub augmented: bool,
    pub real_sample_count: usize,
    #[serde(default)]
    pub demo: bool,
    pub trained_at: DateTime<Utc>,
}

/// How a training set was assembled; copied onto the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingMeta {
    pub augmented: bool,
    pub real_sample_count: usize,
    pub demo: bool,
}

impl FittedModel {
    pub fn new(
        fit: RidgeFit,
        standardizer: &Standardizer,
        quality: FitQuality,
        sample_count: usize,
        lambda: f64,
        meta: TrainingMeta,
    ) -> Self {
        Self {
            schema_version: MODEL_SCHEMA_VERSION,
            weights: fit.weights,
            target_mean: fit.target_mean,
            feature_means: standardizer.means,
            feature_std_devs: standardizer.std_devs,
            feature_names: FeatureName::keys(),
            target: MODEL_TARGET.to_string(),
            r2: quality.r2,
            mae: quality.mae,
            sample_count,
            regularization_lambda: lambda,
            augmented: meta.augmented,
            real_sample_count: meta.real_sample_count,
            demo: meta.demo,
            trained_at: Utc::now(),
        }
    }

    pub fn standardizer(&self) -> Standardizer {
        Standardizer::new(self.feature_means, self.feature_std_devs)
    }

    pub fn quality(&self) -> FitQuality {
        FitQuality {
            r2: self.r2,
            mae: self.mae,
            in_sample: true,
        }
    }

    pub fn confidence(&self) -> Confidence {
        Confidence::from_r2(self.r2)
    }

    /// Schema and feature layout match what this build predicts with.
    pub fn is_compatible(&self) -> bool {
        self.schema_version == MODEL_SCHEMA_VERSION
            && self.feature_names.len() == FEATURE_COUNT
            && self
                .feature_names
                .iter()
                .zip(FeatureName::ALL.iter())
                .all(|(stored, expected)| stored == expected.key())
    }

    /// `max(0, ȳ + Σ zᵢ·wᵢ)` using the stored training statistics.
    pub fn predict(&self, scenario: &ScenarioInput) -> f64 {
        let x = build_features(scenario);
        let mut z = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            z[j] = zscore(x[j], self.feature_means[j], self.feature_std_devs[j]);
        }
        let out = self.target_mean + dot(&z, &self.weights);
        if out.is_finite() {
            out.max(0.0)
        } else {
            0.0
        }
    }

    /// One-line summary for status output.
    pub fn summary(&self) -> String {
        let tag = if self.demo {
            " [demo model]".to_string()
        } else if self.augmented {
            format!(" [augmented, real {}]", self.real_sample_count)
        } else {
            String::new()
        };
        format!(
            "Samples: {} | {}{}",
            self.sample_count,
            self.quality().describe(),
            tag
        )
    }
}
