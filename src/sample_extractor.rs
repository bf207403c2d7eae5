// sample_extractor.rs
// Purpose: Derive (features, LPH) training pairs from consecutive fuel-log readings
//
// Pure over its inputs. Missing registry or inspection data falls back to
// feature value 0 instead of failing the extraction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::feature_builder::{build_features, FeatureVector, ScenarioInput};
use crate::fleet_records::{InspectionRecord, VesselRecord, VoyageLogPoint};
use crate::geo::distance_between;

/// Shortest segment duration considered, in hours.
pub const MIN_SEGMENT_HOURS: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub features: FeatureVector,
    /// Observed liters per hour.
    pub target: f64,
}

impl TrainingSample {
    pub fn new(features: FeatureVector, target: f64) -> Self {
        Self { features, target }
    }

    pub fn from_scenario(scenario: &ScenarioInput, lph: f64) -> Self {
        Self::new(build_features(scenario), lph)
    }
}

/// Lookup tables over the optional vessel registry and inspection feed.
#[derive(Debug, Default)]
pub struct SampleExtractor<'a> {
    vessels: &'a [VesselRecord],
    inspections: &'a [InspectionRecord],
}

impl<'a> SampleExtractor<'a> {
    pub fn new(vessels: &'a [VesselRecord], inspections: &'a [InspectionRecord]) -> Self {
        Self { vessels, inspections }
    }

    /// Resolve the vessel for a reading: by id first, then exact name, then
    /// the first registry name containing the logged name.
    fn vessel_for(&self, point: &VoyageLogPoint) -> Option<&'a VesselRecord> {
        if let Some(id) = &point.vessel_id {
            return self.vessels.iter().find(|v| &v.id == id);
        }
        let wanted = point.vessel_name.as_ref()?.to_lowercase();
        let name_of = |v: &VesselRecord| v.name.clone().unwrap_or_default().to_lowercase();

        self.vessels
            .iter()
            .find(|v| name_of(v) == wanted)
            .or_else(|| self.vessels.iter().find(|v| name_of(v).contains(&wanted)))
    }

    /// Most recent inspection for the vessel, matched by id or by name.
    fn inspection_for(&self, vessel: &VesselRecord) -> Option<&'a InspectionRecord> {
        let name = vessel.name.as_ref().map(|n| n.to_lowercase());
        self.inspections
            .iter()
            .enumerate()
            .filter(|(_, i)| {
                i.vessel_id.as_deref() == Some(vessel.id.as_str())
                    || (i.vessel_id.is_none()
                        && name.is_some()
                        && i.vessel_name.as_ref().map(|n| n.to_lowercase()) == name)
            })
            .max_by_key(|(idx, i)| (i.created_at, *idx))
            .map(|(_, i)| i)
    }

    pub fn equipment_score(&self, vessel: Option<&VesselRecord>) -> f64 {
        vessel
            .and_then(|v| self.inspection_for(v))
            .map(InspectionRecord::equipment_score)
            .unwrap_or(0.0)
    }

    pub fn load_factor(&self, vessel: Option<&VesselRecord>) -> f64 {
        vessel.and_then(VesselRecord::load_factor).unwrap_or(0.0)
    }

    /// One sample per consecutive pair within each tank's time-sorted readings.
    pub fn extract(&self, logs: &[VoyageLogPoint]) -> Vec<TrainingSample> {
        let mut by_tank: BTreeMap<&str, Vec<&VoyageLogPoint>> = BTreeMap::new();
        for point in logs {
            by_tank.entry(point.tank_id.as_str()).or_default().push(point);
        }

        let mut samples = Vec::new();
        let mut discarded = 0usize;
        for points in by_tank.values_mut() {
            points.sort_by_key(|p| p.time);
            for pair in points.windows(2) {
                match self.sample_for(pair[0], pair[1]) {
                    Some(s) => samples.push(s),
                    None => discarded += 1,
                }
            }
        }

        debug!(
            tanks = by_tank.len(),
            samples = samples.len(),
            discarded,
            "extracted training samples from fuel logs"
        );
        samples
    }

    /// `None` when the segment has no consumption or no usable speed.
    pub fn sample_for(&self, a: &VoyageLogPoint, b: &VoyageLogPoint) -> Option<TrainingSample> {
        let elapsed_ms = (b.time - a.time).num_milliseconds() as f64;
        let hours = (elapsed_ms / 3_600_000.0).max(MIN_SEGMENT_HOURS);
        let consumed = (a.liters - b.liters).max(0.0);
        if !hours.is_finite() || hours <= 0.0 || !consumed.is_finite() {
            return None;
        }

        let distance_nm = match b.distance_nm {
            Some(d) if d.is_finite() => d,
            Some(_) => 0.0,
            None => distance_between(a.position(), b.position()),
        };

        let lph = consumed / hours;
        if !lph.is_finite() || lph <= 0.0 {
            return None;
        }

        let speed = if distance_nm > 0.0 {
            distance_nm / hours
        } else {
            b.speed_knots.or(a.speed_knots).unwrap_or(f64::NAN)
        };
        if !speed.is_finite() || speed <= 0.0 {
            return None;
        }

        let vessel = self.vessel_for(b);
        let scenario = ScenarioInput {
            speed,
            // No long-route context at single-segment granularity.
            route_deviation: 0.0,
            weather: b.weather.or(a.weather).unwrap_or(0.0),
            load: self.load_factor(vessel),
            equipment: self.equipment_score(vessel),
        };

        Some(TrainingSample::from_scenario(&scenario, lph))
    }
}

/// Convenience wrapper over [`SampleExtractor::extract`].
pub fn extract_samples(
    logs: &[VoyageLogPoint],
    vessels: &[VesselRecord],
    inspections: &[InspectionRecord],
) -> Vec<TrainingSample> {
    SampleExtractor::new(vessels, inspections).extract(logs)
}
