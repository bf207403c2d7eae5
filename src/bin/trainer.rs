use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use opsmarine_fuel::config_loader::load_config;
use opsmarine_fuel::feed_client::FleetFeeds;
use opsmarine_fuel::fuel_service::{status_line, FuelModelService};
use opsmarine_fuel::log_sink::init_logging;
use opsmarine_fuel::model_store::{export_model, open_repository, MemoryModelRepository, ModelRepository};

/// Offline trainer: fit a fuel model from feed files and export it with a
/// deployment manifest.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Fuel-log JSON array file
    #[clap(short, long)]
    logs: Option<PathBuf>,

    #[clap(long)]
    vessels: Option<PathBuf>,

    #[clap(long)]
    inspections: Option<PathBuf>,

    /// Exported model path; `model_manifest.json` is written beside it
    #[clap(short, long, default_value = "fuel_model.json")]
    output: PathBuf,

    #[clap(long)]
    lambda: Option<f64>,

    #[clap(long)]
    seed: Option<u64>,

    /// Fit a fully synthetic demo model instead of reading logs
    #[clap(long)]
    demo: bool,

    /// Also replace the model in the configured store
    #[clap(long)]
    save_to_store: bool,

    #[clap(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref()).context("loading config")?;
    init_logging(&config.logging.level);

    if let Some(lambda) = args.lambda {
        config.training.lambda = lambda;
        config.validate()?;
    }
    if args.seed.is_some() {
        config.training.seed = args.seed;
    }
    if let Some(logs) = &args.logs {
        config.feeds.logs_path = Some(logs.clone());
        config.feeds.vessels_path = args.vessels.clone();
        config.feeds.inspections_path = args.inspections.clone();
    }

    let repository: Box<dyn ModelRepository> = if args.save_to_store {
        open_repository(&config.store)?
    } else {
        Box::new(MemoryModelRepository::new())
    };
    let mut service = FuelModelService::new(&config, repository);

    let result = if args.demo {
        service.seed_demo()
    } else {
        let feeds = FleetFeeds::from_config(&config.feeds).context("loading fleet feeds")?;
        service.train(&feeds)
    };
    let line = status_line(&result);
    let model = result.map_err(|_| anyhow::anyhow!(line.clone()))?;
    println!("{line}");

    let manifest = export_model(&model, &args.output)?;
    info!(path = %args.output.display(), sha256 = %manifest.sha256, "exported fuel model");
    println!("✅ Model exported to: {}", args.output.display());
    println!("✅ Manifest created: model_manifest.json");
    println!("   SHA256: {}", manifest.sha256);
    if args.save_to_store {
        println!("✅ Model saved to store: {}", config.store.path.display());
    }

    Ok(())
}
