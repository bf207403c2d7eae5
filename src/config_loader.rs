// config_loader.rs
// Purpose: Layered runtime configuration (defaults -> TOML file -> FUEL_ env)

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{FuelError, FuelResult};

pub const DEFAULT_CONFIG_FILE: &str = "opsmarine_fuel.toml";
pub const ENV_PREFIX: &str = "FUEL_";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingConfig {
    /// Ridge penalty applied to the standardized normal equations.
    pub lambda: f64,
    /// When false, thin real data is fitted as-is.
    pub augment: bool,
    pub min_augment_samples: usize,
    pub augment_multiplier: usize,
    pub demo_samples: usize,
    /// Fixed seed for synthetic draws. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            lambda: 0.25,
            augment: true,
            min_augment_samples: 40,
            augment_multiplier: 5,
            demo_samples: 140,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaselineConfig {
    pub base_speed_knots: f64,
    pub base_daily_liters: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            base_speed_knots: 14.0,
            base_daily_liters: 1800.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sled,
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sled,
            path: default_data_dir().join("model_store"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedConfig {
    pub base_url: Option<String>,
    pub logs_path: Option<PathBuf>,
    pub vessels_path: Option<PathBuf>,
    pub inspections_path: Option<PathBuf>,
    /// Train on one tank's logs only
    pub tank_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FuelConfig {
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub baseline: BaselineConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub feeds: FeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FuelConfig {
    pub fn validate(&self) -> FuelResult<()> {
        let lambda = self.training.lambda;
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(FuelError::validation(
                "training.lambda",
                format!("must be a finite value >= 0, got {lambda}"),
            ));
        }
        let speed = self.baseline.base_speed_knots;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(FuelError::validation(
                "baseline.base_speed_knots",
                format!("must be > 0, got {speed}"),
            ));
        }
        if !self.baseline.base_daily_liters.is_finite() || self.baseline.base_daily_liters < 0.0 {
            return Err(FuelError::validation(
                "baseline.base_daily_liters",
                "must be a finite value >= 0",
            ));
        }
        Ok(())
    }
}

/// `<data_dir>/opsmarine_fuel`, or `./data` when the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("opsmarine_fuel"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn figment_for(path: &Path) -> Figment {
    Figment::from(Serialized::defaults(FuelConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load configuration from `path` (or `opsmarine_fuel.toml` in the working
/// directory). A missing file is not an error; defaults apply.
pub fn load_config(path: Option<&Path>) -> FuelResult<FuelConfig> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let config: FuelConfig = figment_for(path).extract()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_calibration_points() {
        let cfg = FuelConfig::default();
        assert_eq!(cfg.training.lambda, 0.25);
        assert!(cfg.training.augment);
        assert_eq!(cfg.baseline.base_speed_knots, 14.0);
        assert_eq!(cfg.baseline.base_daily_liters, 1800.0);
        assert_eq!(cfg.store.backend, StoreBackend::Sled);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn negative_lambda_is_rejected() {
        let mut cfg = FuelConfig::default();
        cfg.training.lambda = -1.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("training.lambda"));
    }

    #[test]
    fn zero_base_speed_is_rejected() {
        let mut cfg = FuelConfig::default();
        cfg.baseline.base_speed_knots = 0.0;
        assert!(cfg.validate().is_err());
    }
}
