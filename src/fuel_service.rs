// fuel_service.rs
// Purpose: Wire extraction, training, persistence and prediction around one
// injected model repository

use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::config_loader::FuelConfig;
use crate::errors::FuelResult;
use crate::evaluator::{k_fold, FitQuality};
use crate::explainer::{explain, headline, Explanation};
use crate::feature_builder::ScenarioInput;
use crate::feed_client::FleetFeeds;
use crate::fitted_model::FittedModel;
use crate::model_store::ModelRepository;
use crate::physics_baseline::PhysicsBaseline;
use crate::predictor::{build_report, predict_lph, PredictionReport};
use crate::sample_extractor::{extract_samples, TrainingSample};
use crate::synthetic::SyntheticSampleGenerator;
use crate::trainer::FuelModelTrainer;

pub struct FuelModelService<R: ModelRepository> {
    repository: R,
    trainer: FuelModelTrainer<StdRng>,
    baseline: PhysicsBaseline,
}

impl<R: ModelRepository> FuelModelService<R> {
    pub fn new(config: &FuelConfig, repository: R) -> Self {
        let baseline = PhysicsBaseline::from(&config.baseline);
        let generator = match config.training.seed {
            Some(seed) => SyntheticSampleGenerator::seeded(seed, baseline),
            None => SyntheticSampleGenerator::from_entropy(baseline),
        };
        Self {
            repository,
            trainer: FuelModelTrainer::new(config.training.clone(), generator),
            baseline,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn baseline(&self) -> &PhysicsBaseline {
        &self.baseline
    }

    pub fn samples(&self, feeds: &FleetFeeds) -> Vec<TrainingSample> {
        extract_samples(&feeds.logs, &feeds.vessels, &feeds.inspections)
    }

    /// Extract, fit and store. The stored model is replaced only on success.
    pub fn train(&mut self, feeds: &FleetFeeds) -> FuelResult<FittedModel> {
        let samples = self.samples(feeds);
        self.train_on(&samples)
    }

    pub fn train_on(&mut self, samples: &[TrainingSample]) -> FuelResult<FittedModel> {
        let model = self.trainer.train(samples)?;
        self.repository.save(&model)?;
        Ok(model)
    }

    pub fn seed_demo(&mut self) -> FuelResult<FittedModel> {
        let model = self.trainer.seed_demo()?;
        self.repository.save(&model)?;
        Ok(model)
    }

    pub fn reset(&self) -> FuelResult<()> {
        self.repository.clear()?;
        info!("cleared stored fuel model");
        Ok(())
    }

    pub fn current_model(&self) -> Option<FittedModel> {
        self.repository.load()
    }

    pub fn predict(&self, scenario: &ScenarioInput) -> f64 {
        predict_lph(self.current_model().as_ref(), &self.baseline, scenario)
    }

    pub fn report(&self, scenario: &ScenarioInput, distance_nm: f64) -> PredictionReport {
        build_report(self.current_model().as_ref(), &self.baseline, scenario, distance_nm)
    }

    /// `None` when no model is stored.
    pub fn explain(&self) -> Option<Explanation> {
        self.current_model().as_ref().map(explain)
    }

    pub fn headline(&self) -> String {
        headline(self.current_model().as_ref())
    }

    /// Out-of-fold estimate on the real samples in `feeds`.
    pub fn evaluate(&self, feeds: &FleetFeeds, k: usize, seed: u64) -> FuelResult<FitQuality> {
        let samples = self.samples(feeds);
        let lambda = self.trainer.config().lambda;
        k_fold(&samples, k, lambda, seed)
    }
}

/// One status line for a training attempt, as shown to operators.
pub fn status_line(result: &FuelResult<FittedModel>) -> String {
    match result {
        Ok(model) => model.summary(),
        Err(e) => {
            warn!(error = %e, "fuel model training failed");
            e.status_message()
        }
    }
}
