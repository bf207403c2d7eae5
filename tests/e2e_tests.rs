//! End-to-end: feed files -> training -> persisted model -> predictions

use std::fs;
use std::path::Path;

use opsmarine_fuel::{
    config_loader::{load_config, FuelConfig, StoreBackend},
    feed_client::FleetFeeds,
    fuel_service::{status_line, FuelModelService},
    model_store::open_repository,
    FileModelRepository, MemoryModelRepository, PredictionSource, ScenarioInput,
};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("write fixture");
    path
}

/// Two tanks, mixed field spellings, one refuel and one unusable row.
const LOGS: &str = r#"[
  {"tankId": "A1", "time": "2024-05-01T00:00:00Z", "liters": 20000, "vesselId": "V1"},
  {"tankId": "A1", "time": "2024-05-01T02:00:00Z", "liters": 19860, "distance": 24, "vesselId": "V1", "weather": 1},
  {"tankId": "A1", "time": "2024-05-01T04:00:00Z", "liters": 19640, "distance": 28, "vesselId": "V1", "seaState": 3},
  {"tankId": "A1", "time": "2024-05-01T06:00:00Z", "liters": 22000, "distance": 26, "vesselId": "V1"},
  {"tankId": "A1", "time": "2024-05-01T08:00:00Z", "liters": 21850, "distance": 26, "vesselId": "V1", "severity": 2},
  {"tankID": "B7", "createdAt": "2024-05-02T10:00:00", "liters": "9000", "vessel": "Harbor Queen"},
  {"tankID": "B7", "createdAt": "2024-05-02T11:00:00", "liters": "8950", "distanceNm": 10, "vessel": "Harbor Queen"},
  {"tankID": "B7", "createdAt": "2024-05-02T12:30:00", "liters": "8860", "distanceNm": 16, "vessel": "Harbor Queen"},
  {"tankID": "B7", "liters": 8800}
]"#;

const VESSELS: &str = r#"[
  {"id": "V1", "name": "Northern Star", "cargoTons": 42000, "dwtTons": 60000},
  {"id": 2, "name": "MV Harbor Queen", "cargo": 5000, "dwt": 20000}
]"#;

const INSPECTIONS: &str = r#"[
  {"vesselId": "V1", "hullFouling": 2, "propeller": 1, "engine": 0, "createdAt": "2024-04-20T00:00:00Z"}
]"#;

fn seeded_config(dir: &Path) -> FuelConfig {
    let mut cfg = FuelConfig::default();
    cfg.training.seed = Some(17);
    cfg.store.backend = StoreBackend::File;
    cfg.store.path = dir.join("store");
    cfg
}

#[test]
fn files_to_model_to_prediction() {
    let tmp = TempDir::new().expect("tmp dir");
    let logs = write(tmp.path(), "logs.json", LOGS);
    let vessels = write(tmp.path(), "vessels.json", VESSELS);
    let inspections = write(tmp.path(), "inspections.json", INSPECTIONS);

    let feeds = FleetFeeds::from_files(&logs, Some(&vessels), Some(&inspections)).expect("feeds");
    assert_eq!(feeds.logs.len(), 8, "row without a time is dropped");
    assert_eq!(feeds.vessels.len(), 2);

    let cfg = seeded_config(tmp.path());
    let mut service = FuelModelService::new(&cfg, open_repository(&cfg.store).expect("store"));

    let samples = service.samples(&feeds);
    // A1: three usable segments (one refuel skipped); B7: two.
    assert_eq!(samples.len(), 5);
    assert!(samples.iter().all(|s| s.target > 0.0));

    let result = service.train(&feeds);
    assert!(status_line(&result).starts_with("Samples: "));
    let model = result.expect("trained");
    assert!(model.augmented);
    assert_eq!(model.real_sample_count, 5);

    // The model is durable: a fresh repository over the same directory sees it.
    let reopened = FileModelRepository::in_dir(&cfg.store.path);
    let other = FuelModelService::new(&cfg, reopened);
    assert_eq!(other.current_model(), Some(model));

    let report = other.report(&ScenarioInput::new(14.0, 0.0, 2.0, 0.6, 0.1), 280.0);
    assert_eq!(report.source, PredictionSource::Model);
    assert!(report.liters_per_hour.is_finite() && report.liters_per_hour >= 0.0);
    assert!((report.liters_per_day - report.liters_per_hour * 24.0).abs() < 1e-9);
    assert!((report.trip_liters - report.liters_per_hour * 20.0).abs() < 1e-9);
    assert!(report.delta_per_knot >= 0.0);
}

#[test]
fn same_seed_trains_identical_weights() {
    let tmp = TempDir::new().expect("tmp dir");
    let logs = write(tmp.path(), "logs.json", LOGS);
    let feeds = FleetFeeds::from_files(&logs, None, None).expect("feeds");
    let cfg = seeded_config(tmp.path());

    let a = FuelModelService::new(&cfg, MemoryModelRepository::new())
        .train(&feeds)
        .expect("train a");
    let b = FuelModelService::new(&cfg, MemoryModelRepository::new())
        .train(&feeds)
        .expect("train b");
    assert_eq!(a.weights, b.weights);
    assert_eq!(a.feature_means, b.feature_means);
    assert_eq!(a.feature_std_devs, b.feature_std_devs);
}

#[test]
fn no_model_means_physics_baseline() {
    let cfg = FuelConfig::default();
    let service = FuelModelService::new(&cfg, MemoryModelRepository::new());

    let calm = ScenarioInput::new(14.0, 0.0, 0.0, 0.0, 0.0);
    assert_eq!(service.predict(&calm), 75.0);

    let report = service.report(&calm, 0.0);
    assert_eq!(report.source, PredictionSource::PhysicsBaseline);
    assert_eq!(report.liters_per_day, 1800.0);
}

#[test]
fn speed_raises_burn_and_weather_is_capped() {
    let mut cfg = FuelConfig::default();
    cfg.training.seed = Some(5);
    let mut service = FuelModelService::new(&cfg, MemoryModelRepository::new());

    for trained in [false, true] {
        if trained {
            service.seed_demo().expect("demo");
        }
        let base = ScenarioInput::new(10.0, 0.02, 2.0, 0.6, 0.3);
        assert!(service.predict(&base.with_speed(20.0)) > service.predict(&base));

        let stormy = ScenarioInput { weather: 10.0, ..base };
        let capped = ScenarioInput { weather: 5.0, ..base };
        assert_eq!(service.predict(&stormy), service.predict(&capped));
    }
}

#[test]
fn config_file_and_defaults_layer() {
    let tmp = TempDir::new().expect("tmp dir");
    let path = write(
        tmp.path(),
        "opsmarine_fuel.toml",
        r#"
[training]
lambda = 0.5
seed = 42

[store]
backend = "memory"
path = "/tmp/unused"

[logging]
level = "debug"
"#,
    );

    let cfg = load_config(Some(&path)).expect("config");
    assert_eq!(cfg.training.lambda, 0.5);
    assert_eq!(cfg.training.seed, Some(42));
    assert_eq!(cfg.training.demo_samples, 140, "unset keys keep defaults");
    assert_eq!(cfg.store.backend, StoreBackend::Memory);
    assert_eq!(cfg.baseline.base_speed_knots, 14.0);
    assert_eq!(cfg.logging.level, "debug");
}

#[test]
fn missing_config_file_uses_defaults() {
    let tmp = TempDir::new().expect("tmp dir");
    let cfg = load_config(Some(&tmp.path().join("absent.toml"))).expect("config");
    assert_eq!(cfg.training.lambda, 0.25);
}

#[test]
fn invalid_config_is_rejected() {
    let tmp = TempDir::new().expect("tmp dir");
    let path = write(tmp.path(), "bad.toml", "[training]\nlambda = -2.0\n");
    let err = load_config(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("training.lambda"));

    let path = write(tmp.path(), "bad_backend.toml", "[store]\nbackend = \"postgres\"\n");
    assert!(load_config(Some(&path)).is_err());
}
