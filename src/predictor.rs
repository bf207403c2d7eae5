// predictor.rs
// Purpose: Liters-per-hour estimates from the stored model, or the physics
// baseline when no usable model is stored. Never an error.

use serde::{Deserialize, Serialize};

use crate::feature_builder::ScenarioInput;
use crate::fitted_model::FittedModel;
use crate::physics_baseline::PhysicsBaseline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionSource {
    Model,
    PhysicsBaseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    pub liters_per_hour: f64,
    pub liters_per_day: f64,
    /// Burn over `distance_nm` at the scenario speed (speed floored at 1 kn).
    pub trip_liters: f64,
    /// Extra L/h for one more knot.
    pub delta_per_knot: f64,
    pub source: PredictionSource,
}

/// Model output when a model is given, baseline otherwise.
pub fn predict_lph(model: Option<&FittedModel>, baseline: &PhysicsBaseline, scenario: &ScenarioInput) -> f64 {
    match model {
        Some(m) => m.predict(scenario),
        None => baseline.liters_per_hour(scenario),
    }
}

pub fn build_report(
    model: Option<&FittedModel>,
    baseline: &PhysicsBaseline,
    scenario: &ScenarioInput,
    distance_nm: f64,
) -> PredictionReport {
    let scenario = scenario.clamped();
    let lph = predict_lph(model, baseline, &scenario);
    let faster = predict_lph(model, baseline, &scenario.with_speed(scenario.speed + 1.0));
    let distance = if distance_nm.is_finite() { distance_nm.max(0.0) } else { 0.0 };

    PredictionReport {
        liters_per_hour: lph,
        liters_per_day: lph * 24.0,
        trip_liters: lph * (distance / scenario.speed.max(1.0)),
        delta_per_knot: (faster - lph).max(0.0),
        source: if model.is_some() {
            PredictionSource::Model
        } else {
            PredictionSource::PhysicsBaseline
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_store::{MemoryModelRepository, ModelRepository};

    #[test]
    fn corrupt_blob_falls_back_to_baseline() {
        let repo = MemoryModelRepository::new();
        repo.write_blob(b"{not json").unwrap();
        let model = repo.load();
        assert!(model.is_none());
        assert_eq!(
            predict_lph(model.as_ref(), &PhysicsBaseline::default(), &ScenarioInput::at_speed(14.0)),
            75.0
        );
    }

    #[test]
    fn baseline_report_figures() {
        let report = build_report(None, &PhysicsBaseline::default(), &ScenarioInput::at_speed(14.0), 140.0);
        assert_eq!(report.source, PredictionSource::PhysicsBaseline);
        assert_eq!(report.liters_per_hour, 75.0);
        assert_eq!(report.liters_per_day, 1800.0);
        assert!((report.trip_liters - 750.0).abs() < 1e-9);
        assert!(report.delta_per_knot > 0.0);
    }

    #[test]
    fn zero_speed_trip_uses_one_knot_floor() {
        let report = build_report(None, &PhysicsBaseline::default(), &ScenarioInput::at_speed(0.0), 100.0);
        assert_eq!(report.liters_per_hour, 0.0);
        assert_eq!(report.trip_liters, 0.0);
    }
}
