// explainer.rs
// Purpose: Rank features by absolute standardized weight and turn the top
// drivers into operator advice

use serde::{Deserialize, Serialize};

use crate::feature_builder::FeatureName;
use crate::fitted_model::FittedModel;

pub const ADVICE_DRIVERS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureImportance {
    pub feature: FeatureName,
    pub label: String,
    /// Share of total absolute weight, 0..100.
    pub percent: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub ranking: Vec<FeatureImportance>,
    pub headline: String,
    pub advice: Vec<String>,
}

/// `|wᵢ| / Σ|wⱼ|` as a percentage, descending. All-zero weights give 0%.
pub fn importance(model: &FittedModel) -> Vec<FeatureImportance> {
    let mags: Vec<f64> = model
        .weights
        .iter()
        .map(|w| if w.is_finite() { w.abs() } else { 0.0 })
        .collect();
    let sum: f64 = mags.iter().sum();
    let denom = if sum > 0.0 { sum } else { 1.0 };

    let mut ranked: Vec<FeatureImportance> = FeatureName::ALL
        .iter()
        .zip(mags.iter().zip(model.weights.iter()))
        .map(|(name, (mag, w))| FeatureImportance {
            feature: *name,
            label: name.label().to_string(),
            percent: 100.0 * mag / denom,
            weight: *w,
        })
        .collect();

    // Stable: ties keep feature order.
    ranked.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    ranked
}

pub fn top_drivers(model: &FittedModel, n: usize) -> Vec<FeatureImportance> {
    importance(model).into_iter().take(n).collect()
}

fn advice_for(feature: FeatureName) -> Option<&'static str> {
    match feature {
        FeatureName::Speed | FeatureName::Speed2 => {
            Some("Try slow steaming; speed dominates burn (non-linear).")
        }
        FeatureName::RouteDev => Some("Optimize voyage plan to reduce detours vs great-circle."),
        FeatureName::Weather => Some("Shift ETD/ETA to avoid heavy weather windows."),
        FeatureName::Load => Some("Manage cargo/ballast to reduce displacement where possible."),
        FeatureName::Equip => Some("Schedule hull/prop/engine maintenance to cut drag."),
    }
}

/// Canned tips for features among the top three drivers, one per topic.
pub fn advice(model: &FittedModel) -> Vec<String> {
    let top: Vec<FeatureName> = top_drivers(model, ADVICE_DRIVERS)
        .into_iter()
        .map(|f| f.feature)
        .collect();

    let topics = [
        &[FeatureName::Speed, FeatureName::Speed2][..],
        &[FeatureName::RouteDev][..],
        &[FeatureName::Weather][..],
        &[FeatureName::Load][..],
        &[FeatureName::Equip][..],
    ];

    topics
        .iter()
        .filter_map(|group| group.iter().find(|f| top.contains(*f)))
        .filter_map(|f| advice_for(*f))
        .map(str::to_string)
        .collect()
}

pub fn headline(model: Option<&FittedModel>) -> String {
    let ranked = model.map(importance).unwrap_or_default();
    let label = |i: usize| ranked.get(i).map(|f| f.label.as_str()).unwrap_or("—");
    format!("Top driver: {} • Secondary: {}", label(0), label(1))
}

pub fn explain(model: &FittedModel) -> Explanation {
    Explanation {
        ranking: importance(model),
        headline: headline(Some(model)),
        advice: advice(model),
    }
}

/// `label: +0.123` per feature, in feature order (z-scored coefficients).
pub fn coefficient_table(model: &FittedModel) -> Vec<String> {
    FeatureName::ALL
        .iter()
        .zip(model.weights.iter())
        .map(|(name, w)| format!("{}: {:+.3}", name.label(), w))
        .collect()
}
