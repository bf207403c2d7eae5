//! Library root for the `opsmarine_fuel` crate
//! Fuel-burn prediction for a vessel fleet: ridge regression over voyage
//! features with a cube-law physics fallback.

// Core error handling
pub mod errors;

// Configuration & logging
pub mod config_loader;
pub mod log_sink;

// Boundary: feeds and normalization
pub mod feed_client;
pub mod fleet_records;
pub mod geo;

// Features & samples
pub mod feature_builder;
pub mod sample_extractor;
pub mod synthetic;

// Numerics
pub mod evaluator;
pub mod ridge;
pub mod standardizer;

// Model lifecycle
pub mod fitted_model;
pub mod model_store;
pub mod trainer;

// Prediction & explanation
pub mod explainer;
pub mod physics_baseline;
pub mod predictor;

// Orchestration & CLI
pub mod cli;
pub mod fuel_service;


pub use errors::{FuelError, FuelResult};
pub use feature_builder::{FeatureName, ScenarioInput};
pub use fitted_model::FittedModel;
pub use fuel_service::FuelModelService;
pub use model_store::{
    FileModelRepository, MemoryModelRepository, ModelRepository, SledModelRepository,
};
pub use predictor::{PredictionReport, PredictionSource};
