//! Headless Runner
//!
//! Seeds a city, runs it for a fixed number of ticks, and prints the
//! resulting census. Useful for sweeping tolerances from scripts.

use std::path::PathBuf;

use clap::Parser;
use schelling_city::core::config::{RelocationPolicy, SimulationConfig};
use schelling_city::detection::{DetectionFeed, DetectionPayload};
use schelling_city::simulation::{Census, SegregationEngine};
use schelling_city::spatial::SparseHashGrid;
use schelling_city::world::Layout;
use serde::Serialize;

/// Headless Runner - batch Schelling runs with machine-readable output
#[derive(Parser, Debug)]
#[command(name = "headless")]
#[command(about = "Run the segregation model without interaction and report the census")]
struct Args {
    /// Grid columns when no layout file is given
    #[arg(long, default_value_t = 20)]
    cols: u32,

    /// Grid rows when no layout file is given
    #[arg(long, default_value_t = 20)]
    rows: u32,

    /// Grid spacing in world units
    #[arg(long, default_value_t = 1.0)]
    spacing: f32,

    /// Ticks to run
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Tolerance threshold, overriding the config file
    #[arg(long)]
    tolerance: Option<f32>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Layout file (.json or .toml)
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Detection payloads, one JSON object per line; line N is published before tick N
    #[arg(long)]
    detections: Option<PathBuf>,

    /// Relocation policy: legacy or vacant_only
    #[arg(long)]
    policy: Option<String>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct RunResult {
    ticks: u64,
    seed: u64,
    tolerance: f32,
    policy: RelocationPolicy,
    cells: usize,
    relocations: usize,
    initial: Census,
    last: Census,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schelling_city=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> schelling_city::core::error::Result<()> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };

    let seed = args.seed.or(config.seed).unwrap_or_else(rand::random);
    config.seed = Some(seed);
    if let Some(tolerance) = args.tolerance {
        config.tolerance_threshold = tolerance;
    }
    if let Some(policy) = &args.policy {
        config.relocation = match policy.as_str() {
            "legacy" => RelocationPolicy::Legacy,
            "vacant_only" => RelocationPolicy::VacantOnly,
            other => {
                return Err(schelling_city::core::error::SegregationError::InvalidConfig(format!(
                    "unknown relocation policy: {}",
                    other
                )))
            }
        };
    }

    let layout = match &args.layout {
        Some(path) => Layout::load(path)?,
        None => Layout::grid(args.cols, args.rows, args.spacing),
    };

    let payloads = match &args.detections {
        Some(path) => load_payloads(path)?,
        None => Vec::new(),
    };

    let bucket = config.neighbour_radius.max(f32::EPSILON);
    let mut engine = SegregationEngine::try_new(config, &layout, SparseHashGrid::new(bucket))?;
    engine.seed_random_cells();
    engine.set_running(true);

    let initial = engine.census();
    let (feed, slot) = DetectionFeed::channel();
    let mut relocations = 0;

    for tick in 0..args.ticks {
        if let Some(payload) = payloads.get(tick as usize) {
            feed.publish(payload.clone());
        }
        let report = engine.tick(&slot);
        relocations += report.step.map(|s| s.relocations).unwrap_or(0);
    }

    let result = RunResult {
        ticks: args.ticks,
        seed,
        tolerance: engine.config().tolerance_threshold,
        policy: engine.config().relocation,
        cells: engine.static_cells().len(),
        relocations,
        initial,
        last: engine.census(),
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Seed: {}  Tolerance: {:.2}  Policy: {:?}", result.seed, result.tolerance, result.policy);
        println!("Cells: {}  Ticks: {}  Relocations: {}", result.cells, result.ticks, result.relocations);
        println!("Start: {}", result.initial.summary());
        println!("End:   {}", result.last.summary());
    }
    Ok(())
}

fn load_payloads(path: &std::path::Path) -> schelling_city::core::error::Result<Vec<DetectionPayload>> {
    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(DetectionPayload::from_json)
        .collect()
}
