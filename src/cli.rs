use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::config_loader::{FeedConfig, FuelConfig};
use crate::explainer::coefficient_table;
use crate::feature_builder::ScenarioInput;
use crate::feed_client::FleetFeeds;
use crate::fuel_service::{status_line, FuelModelService};
use crate::model_store::open_repository;
use crate::physics_baseline::PhysicsBaseline;
use crate::predictor::PredictionSource;
use crate::synthetic::SyntheticSampleGenerator;

/// Top-level CLI interface for the fleet fuel predictor
#[derive(Parser)]
#[command(
    name = "opsmarine_fuel",
    version,
    about = "Fleet fuel-burn prediction (ridge regression + cube-law baseline)"
)]
pub struct Cli {
    /// Config file (defaults to ./opsmarine_fuel.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Fixed RNG seed for synthetic data
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where fuel logs, vessels and inspections come from. Overrides `[feeds]`.
#[derive(Args, Debug, Default, Clone)]
pub struct FeedArgs {
    /// Fuel-log JSON array file
    #[arg(long)]
    pub logs: Option<PathBuf>,
    /// Vessel registry JSON array file
    #[arg(long)]
    pub vessels: Option<PathBuf>,
    /// Inspection JSON array file
    #[arg(long)]
    pub inspections: Option<PathBuf>,
    /// Dashboard API base URL, used when no log file is given
    #[arg(long)]
    pub base_url: Option<String>,
    /// Only use logs from this tank
    #[arg(long)]
    pub tank: Option<String>,
}

impl FeedArgs {
    pub fn apply(&self, feeds: &mut FeedConfig) {
        if self.logs.is_some() {
            feeds.logs_path = self.logs.clone();
            feeds.vessels_path = self.vessels.clone();
            feeds.inspections_path = self.inspections.clone();
        }
        if self.base_url.is_some() {
            feeds.base_url = self.base_url.clone();
        }
        if self.tank.is_some() {
            feeds.tank_id = self.tank.clone();
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// Speed over ground, knots
    #[arg(long)]
    pub speed: f64,
    /// Extra distance over great-circle, as a ratio
    #[arg(long, default_value_t = 0.0)]
    pub route_dev: f64,
    /// Sea state 0-5
    #[arg(long, default_value_t = 0.0)]
    pub weather: f64,
    /// Load factor 0-1
    #[arg(long, default_value_t = 0.0)]
    pub load: f64,
    /// Equipment badness 0-1
    #[arg(long, default_value_t = 0.0)]
    pub equip: f64,
}

impl From<&ScenarioArgs> for ScenarioInput {
    fn from(a: &ScenarioArgs) -> Self {
        ScenarioInput::new(a.speed, a.route_dev, a.weather, a.load, a.equip)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train on real fuel logs, augmenting with synthetic voyages when thin
    Train {
        #[command(flatten)]
        feeds: FeedArgs,
    },

    /// Replace the stored model with a fully synthetic demo model
    Demo,

    /// Estimate burn for a scenario
    Predict {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Trip distance in nautical miles
        #[arg(long, default_value_t = 0.0)]
        distance: f64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rank drivers of the stored model and print advice
    Explain {
        #[arg(long)]
        json: bool,
    },

    /// Show the stored model's summary and coefficients
    Show,

    /// Delete the stored model
    Reset,

    /// K-fold cross-validation on real samples (does not touch the store)
    Evaluate {
        #[command(flatten)]
        feeds: FeedArgs,
        #[arg(short, long, default_value_t = 5)]
        k: usize,
    },

    /// Print a synthetic voyage log for a tank as JSON
    SynthLogs {
        #[arg(long, default_value = "demo-tank")]
        tank_id: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn dispatch(cli: Cli, mut config: FuelConfig) -> anyhow::Result<()> {
    if cli.seed.is_some() {
        config.training.seed = cli.seed;
    }

    match &cli.command {
        Commands::SynthLogs { tank_id, output } => return synth_logs(&config, tank_id, output.as_ref()),
        Commands::Train { feeds } | Commands::Evaluate { feeds, .. } => feeds.apply(&mut config.feeds),
        _ => {}
    }

    let repository = open_repository(&config.store).context("opening model store")?;
    let mut service = FuelModelService::new(&config, repository);
    debug!(command = command_name(&cli.command), "dispatching");

    match cli.command {
        Commands::Train { .. } => {
            let feeds = FleetFeeds::from_config(&config.feeds).context("loading fleet feeds")?;
            let result = service.train(&feeds);
            let line = status_line(&result);
            if result.is_err() {
                bail!(line);
            }
            println!("{line}");
        }
        Commands::Demo => {
            let result = service.seed_demo();
            let line = status_line(&result);
            if result.is_err() {
                bail!(line);
            }
            println!("{line}");
        }
        Commands::Predict {
            scenario,
            distance,
            json,
        } => {
            let report = service.report(&ScenarioInput::from(&scenario), distance);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let source = match report.source {
                    PredictionSource::Model => "model",
                    PredictionSource::PhysicsBaseline => "physics baseline",
                };
                println!("Source: {source}");
                println!("LPH: {:.1}", report.liters_per_hour);
                println!("Daily: {:.0} L", report.liters_per_day);
                if distance > 0.0 {
                    println!("Trip ({distance:.0} nm): {:.0} L", report.trip_liters);
                }
                println!("+1 kn: +{:.1} L/h", report.delta_per_knot);
            }
        }
        Commands::Explain { json } => match service.explain() {
            Some(explanation) if json => println!("{}", serde_json::to_string_pretty(&explanation)?),
            Some(explanation) => {
                println!("{}", explanation.headline);
                for f in &explanation.ranking {
                    println!("  {:<22} {:>5.1}%", f.label, f.percent);
                }
                for tip in &explanation.advice {
                    println!("• {tip}");
                }
            }
            None => println!("{}", service.headline()),
        },
        Commands::Show => match service.current_model() {
            Some(model) => {
                println!("{}", model.summary());
                println!("Trained: {}", model.trained_at.to_rfc3339());
                for line in coefficient_table(&model) {
                    println!("  {line}");
                }
            }
            None => println!("No model stored; predictions use the physics baseline."),
        },
        Commands::Reset => {
            service.reset()?;
            println!("Model cleared.");
        }
        Commands::Evaluate { k, .. } => {
            let feeds = FleetFeeds::from_config(&config.feeds).context("loading fleet feeds")?;
            let seed = config.training.seed.unwrap_or(0);
            let quality = service.evaluate(&feeds, k, seed)?;
            println!("{k}-fold: {}", quality.describe());
        }
        Commands::SynthLogs { .. } => {}
    }
    Ok(())
}

fn synth_logs(config: &FuelConfig, tank_id: &str, output: Option<&PathBuf>) -> anyhow::Result<()> {
    let baseline = PhysicsBaseline::from(&config.baseline);
    let points = match config.training.seed {
        Some(seed) => SyntheticSampleGenerator::seeded(seed, baseline).voyage_logs(tank_id, Utc::now()),
        None => SyntheticSampleGenerator::from_entropy(baseline).voyage_logs(tank_id, Utc::now()),
    };
    let json = serde_json::to_string_pretty(&points)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {} points to {}", points.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn command_name(cmd: &Commands) -> &'static str {
    match cmd {
        Commands::Train { .. } => "train",
        Commands::Demo => "demo",
        Commands::Predict { .. } => "predict",
        Commands::Explain { .. } => "explain",
        Commands::Show => "show",
        Commands::Reset => "reset",
        Commands::Evaluate { .. } => "evaluate",
        Commands::SynthLogs { .. } => "synth-logs",
    }
}
