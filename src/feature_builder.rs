// feature_builder.rs
// Purpose: Map a voyage scenario into the fixed 6-dimensional feature vector
//
// The same builder is used for training samples and for prediction; the
// order of FeatureName::ALL is the order of every weight/mean/std vector.

use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 6;

pub type FeatureVector = [f64; FEATURE_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureName {
    Speed,
    Speed2,
    RouteDev,
    Weather,
    Load,
    Equip,
}

impl FeatureName {
    pub const ALL: [FeatureName; FEATURE_COUNT] = [
        FeatureName::Speed,
        FeatureName::Speed2,
        FeatureName::RouteDev,
        FeatureName::Weather,
        FeatureName::Load,
        FeatureName::Equip,
    ];

    /// Stable key persisted in the model blob.
    pub fn key(&self) -> &'static str {
        match self {
            FeatureName::Speed => "speed",
            FeatureName::Speed2 => "speed2",
            FeatureName::RouteDev => "routeDev",
            FeatureName::Weather => "weather",
            FeatureName::Load => "load",
            FeatureName::Equip => "equip",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeatureName::Speed => "Speed (linear)",
            FeatureName::Speed2 => "Speed² (nonlinear)",
            FeatureName::RouteDev => "Route deviation",
            FeatureName::Weather => "Weather severity",
            FeatureName::Load => "Load factor",
            FeatureName::Equip => "Equipment condition",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn keys() -> Vec<String> {
        Self::ALL.iter().map(|f| f.key().to_string()).collect()
    }
}

/// A single prediction request. Values outside their ranges are clamped by
/// [`ScenarioInput::to_features`], never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInput {
    pub speed: f64,
    #[serde(alias = "routeDev")]
    pub route_deviation: f64,
    pub weather: f64,
    pub load: f64,
    #[serde(alias = "equip")]
    pub equipment: f64,
}

impl ScenarioInput {
    pub fn new(speed: f64, route_deviation: f64, weather: f64, load: f64, equipment: f64) -> Self {
        Self {
            speed,
            route_deviation,
            weather,
            load,
            equipment,
        }
    }

    /// Calm water, no load, clean hull.
    pub fn at_speed(speed: f64) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    pub fn with_speed(&self, speed: f64) -> Self {
        Self { speed, ..*self }
    }

    /// Copy with every field clamped into its valid range. NaN maps to 0.
    pub fn clamped(&self) -> Self {
        Self {
            speed: non_negative(self.speed),
            route_deviation: non_negative(self.route_deviation),
            weather: clamp_finite(self.weather, 0.0, 5.0),
            load: clamp_finite(self.load, 0.0, 1.0),
            equipment: clamp_finite(self.equipment, 0.0, 1.0),
        }
    }

    pub fn to_features(&self) -> FeatureVector {
        build_features(self)
    }
}

/// `[speed, speed², routeDeviation, weather, load, equipment]`, clamped.
pub fn build_features(scenario: &ScenarioInput) -> FeatureVector {
    let s = scenario.clamped();
    [
        s.speed,
        s.speed * s.speed,
        s.route_deviation,
        s.weather,
        s.load,
        s.equipment,
    ]
}

pub(crate) fn clamp_finite(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.clamp(lo, hi)
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}
