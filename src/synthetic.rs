// synthetic.rs
// Purpose: Physically plausible synthetic voyages for augmentation and demos
//
// The random source is injected so tests (and `training.seed`) get
// reproducible draws.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::feature_builder::ScenarioInput;
use crate::fleet_records::VoyageLogPoint;
use crate::geo::distance_between;
use crate::physics_baseline::PhysicsBaseline;
use crate::sample_extractor::TrainingSample;

pub const SYNTHETIC_LOG_POINTS: usize = 12;

pub struct SyntheticSampleGenerator<R: Rng> {
    rng: R,
    baseline: PhysicsBaseline,
}

impl SyntheticSampleGenerator<StdRng> {
    pub fn seeded(seed: u64, baseline: PhysicsBaseline) -> Self {
        Self::new(StdRng::seed_from_u64(seed), baseline)
    }

    pub fn from_entropy(baseline: PhysicsBaseline) -> Self {
        Self::new(StdRng::from_os_rng(), baseline)
    }
}

impl<R: Rng> SyntheticSampleGenerator<R> {
    pub fn new(rng: R, baseline: PhysicsBaseline) -> Self {
        Self { rng, baseline }
    }

    /// One voyage scenario: 9-17 kn, route deviation skewed toward 0 (≤ 0.35),
    /// integer weather 0-4, load 0.3-0.9, equipment badness 0-0.6.
    pub fn scenario(&mut self) -> ScenarioInput {
        let speed = 9.0 + self.rng.random::<f64>() * 8.0;
        let u: f64 = self.rng.random();
        let route_deviation = (u * u * 0.35).max(0.0);
        let weather = (self.rng.random::<f64>() * 4.0).round();
        let load = 0.3 + self.rng.random::<f64>() * 0.6;
        let equipment = self.rng.random::<f64>() * 0.6;

        ScenarioInput {
            speed,
            route_deviation,
            weather,
            load,
            equipment,
        }
    }

    /// Baseline burn for a fresh scenario with ±10% multiplicative noise.
    pub fn sample(&mut self) -> TrainingSample {
        let scenario = self.scenario();
        let base = self.baseline.liters_per_hour(&scenario);
        let noisy = base * (0.9 + self.rng.random::<f64>() * 0.2);
        TrainingSample::from_scenario(&scenario, noisy)
    }

    pub fn samples(&mut self, n: usize) -> Vec<TrainingSample> {
        (0..n).map(|_| self.sample()).collect()
    }

    /// Two-hourly readings along an open-ocean corridor ending at `now`.
    pub fn voyage_logs(&mut self, tank_id: &str, now: DateTime<Utc>) -> Vec<VoyageLogPoint> {
        let mut lat = -10.0 + self.rng.random::<f64>() * 30.0;
        let mut lon = -50.0 + self.rng.random::<f64>() * 25.0;
        let mut level = 18_000.0 - self.rng.random::<f64>() * 2_500.0;

        let mut out: Vec<VoyageLogPoint> = Vec::with_capacity(SYNTHETIC_LOG_POINTS);
        for i in (0..SYNTHETIC_LOG_POINTS as i64).rev() {
            lat = (lat + (-0.2 + self.rng.random::<f64>() * 0.4)).clamp(-20.0, 35.0);
            lon = (lon + (0.6 + self.rng.random::<f64>() * 0.6)).clamp(-60.0, -5.0);
            let burn = (self.rng.random::<f64>() * 480.0 - 100.0).max(0.0);
            level = (level - burn).max(0.0);

            let mut point = VoyageLogPoint::new(tank_id, now - Duration::hours(i * 2), level.round());
            point.lat = Some(round_to(lat, 3));
            point.lon = Some(round_to(lon, 3));
            point.distance_nm = Some(8.0 + self.rng.random::<f64>() * 18.0);
            point.location = Some("at sea".to_string());
            out.push(point);
        }

        for i in 1..out.len() {
            let d = distance_between(out[i - 1].position(), out[i].position());
            if d > 1.0 {
                out[i].distance_nm = Some(d);
            }
        }
        out
    }
}

fn round_to(v: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (v * f).round() / f
}
