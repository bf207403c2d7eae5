// physics_baseline.rs
// Purpose: Cube-law burn estimate used when no fitted model exists

use serde::{Deserialize, Serialize};

use crate::config_loader::BaselineConfig;
use crate::feature_builder::ScenarioInput;

/// `burn = k · speed³ · (1 + 0.05·weather + 0.30·load + 0.30·equipment) · (1 + routeDev)`
/// with `k` calibrated so that `base_speed_knots` burns `base_daily_liters / 24` per hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBaseline {
    pub base_speed_knots: f64,
    pub base_daily_liters: f64,
}

impl Default for PhysicsBaseline {
    fn default() -> Self {
        Self {
            base_speed_knots: 14.0,
            base_daily_liters: 1800.0,
        }
    }
}

impl From<&BaselineConfig> for PhysicsBaseline {
    fn from(cfg: &BaselineConfig) -> Self {
        Self {
            base_speed_knots: cfg.base_speed_knots,
            base_daily_liters: cfg.base_daily_liters,
        }
    }
}

impl PhysicsBaseline {
    /// Liters per hour. Inputs are clamped first; never negative.
    pub fn liters_per_hour(&self, scenario: &ScenarioInput) -> f64 {
        let s = scenario.clamped();
        // k·speed³ expressed as a ratio so the calibration point is exact.
        let burn = (self.base_daily_liters / 24.0) * (s.speed / self.base_speed_knots).powi(3);
        let multiplier =
            (1.0 + 0.05 * s.weather + 0.30 * s.load + 0.30 * s.equipment) * (1.0 + s.route_deviation);
        (burn * multiplier).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_point_is_exact() {
        let lph = PhysicsBaseline::default().liters_per_hour(&ScenarioInput::at_speed(14.0));
        assert_eq!(lph, 75.0);
    }

    #[test]
    fn burn_is_cubic_in_speed() {
        let b = PhysicsBaseline::default();
        let slow = b.liters_per_hour(&ScenarioInput::at_speed(7.0));
        assert!((slow - 75.0 / 8.0).abs() < 1e-9);
    }

    #[test]
    fn adjustments_multiply() {
        let b = PhysicsBaseline::default();
        let s = ScenarioInput::new(14.0, 0.1, 2.0, 0.5, 0.5);
        let expected = 75.0 * (1.0 + 0.1 + 0.15 + 0.15) * 1.1;
        assert!((b.liters_per_hour(&s) - expected).abs() < 1e-9);
    }

    #[test]
    fn weather_above_range_is_clamped() {
        let b = PhysicsBaseline::default();
        let hi = b.liters_per_hour(&ScenarioInput::new(12.0, 0.0, 10.0, 0.3, 0.1));
        let top = b.liters_per_hour(&ScenarioInput::new(12.0, 0.0, 5.0, 0.3, 0.1));
        assert_eq!(hi, top);
    }
}
