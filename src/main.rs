//! Schelling City - Entry Point
//!
//! Builds the city from a layout (or a demo grid), optionally replays a
//! recorded detection stream in the background, and provides a command
//! loop for stepping the model.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use schelling_city::core::config::SimulationConfig;
use schelling_city::core::error::Result;
use schelling_city::detection::{DetectionFeed, DetectionSlot, DetectionSource};
use schelling_city::simulation::SegregationEngine;
use schelling_city::world::Layout;
use tokio::io::AsyncBufReadExt;
use tokio::runtime::Runtime;

/// Interactive Schelling City session
#[derive(Parser, Debug)]
#[command(name = "schelling-city")]
struct Args {
    /// Layout file (.json or .toml); a demo grid is used when omitted
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Simulation config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Detection payloads, one JSON object per line, replayed in order
    #[arg(long)]
    detections: Option<PathBuf>,

    /// Delay between replayed payloads in milliseconds
    #[arg(long, default_value_t = 500)]
    replay_interval_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schelling_city=info".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let layout = match &args.layout {
        Some(path) => Layout::load(path)?,
        None => Layout::grid(20, 20, 1.0),
    };

    tracing::info!("Schelling City starting with {} plots", layout.len());

    let rt = Runtime::new()?;
    let (feed, slot) = DetectionFeed::channel();

    if let Some(path) = args.detections.clone() {
        let interval = Duration::from_millis(args.replay_interval_ms);
        rt.spawn(replay_detections(path, feed, interval));
    }

    let mut engine = SegregationEngine::new(config, &layout);
    engine.seed_random_cells();

    println!("\n=== SCHELLING CITY ===");
    println!();
    println!("Commands:");
    println!("  tick / t        - Advance by one tick");
    println!("  run <n>         - Run n ticks");
    println!("  seed            - Reseed every residency at random");
    println!("  toggle / space  - Start or pause relocation");
    println!("  reset           - Empty every residency");
    println!("  tolerance <x>   - Set the tolerance threshold (0..1)");
    println!("  reseed <n>      - Restart the random generator from seed n");
    println!("  status / s      - Show population census");
    println!("  quit / q        - Exit");
    println!();

    loop {
        print!("[tick {} | {}] > ", engine.current_tick(), run_state(&engine));
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        // A lone space toggles, so only strip the line ending
        let raw = input.trim_end_matches(['\r', '\n']);
        let input = raw.trim();

        match input {
            "quit" | "q" => break,
            "tick" | "t" => {
                let report = engine.tick(&slot);
                println!(
                    "Tick {} complete: {} schools, {}",
                    report.tick,
                    report.schools_placed,
                    describe_step(report.step)
                );
            }
            "seed" => {
                engine.seed_random_cells();
                println!("Seeded. {}", engine.census().summary());
            }
            "toggle" => toggle(&mut engine),
            "" if raw.contains(' ') => toggle(&mut engine),
            "reset" => {
                engine.init_buildings();
                println!("All residencies vacant.");
            }
            "status" | "s" => display_status(&engine, &slot),
            "" => continue,
            _ => {
                if let Some(value) = input.strip_prefix("tolerance ") {
                    match value.trim().parse::<f32>() {
                        Ok(t) => match engine.set_tolerance(t) {
                            Ok(()) => println!("Tolerance set to {:.2}", engine.config().tolerance_threshold),
                            Err(e) => println!("{}", e),
                        },
                        Err(_) => println!("Usage: tolerance <number>"),
                    }
                } else if let Some(value) = input.strip_prefix("reseed ") {
                    match value.trim().parse::<u64>() {
                        Ok(seed) => {
                            engine.reseed(seed);
                            println!("Random generator reseeded with {}", seed);
                        }
                        Err(_) => println!("Usage: reseed <number>"),
                    }
                } else if let Some(count) = input.strip_prefix("run ") {
                    match count.trim().parse::<u32>() {
                        Ok(n) => {
                            println!("Running {} ticks...", n);
                            for _ in 0..n {
                                engine.tick(&slot);
                            }
                            println!("Now at tick {}. {}", engine.current_tick(), engine.census().summary());
                        }
                        Err(_) => println!("Usage: run <number>"),
                    }
                } else {
                    println!("Unknown command: {}", input);
                }
            }
        }
    }

    tracing::info!("Schelling City shutting down");
    Ok(())
}

fn run_state<S: schelling_city::spatial::SpatialIndex>(engine: &SegregationEngine<S>) -> &'static str {
    if engine.is_running() {
        "running"
    } else {
        "paused"
    }
}

fn toggle(engine: &mut SegregationEngine) {
    if engine.toggle_running() {
        println!("Relocation running.");
    } else {
        println!("Relocation paused.");
    }
}

fn describe_step(step: Option<schelling_city::simulation::StepOutcome>) -> String {
    match step {
        Some(outcome) => format!(
            "{} dissatisfied, {} relocated",
            outcome.dissatisfied, outcome.relocations
        ),
        None => "paused".into(),
    }
}

fn display_status(engine: &SegregationEngine, slot: &DetectionSlot) {
    let census = engine.census();
    println!();
    println!("=== Tick {} ===", engine.current_tick());
    println!("Tolerance: {:.2}", engine.config().tolerance_threshold);
    println!("{}", census.summary());
    println!("Schools standing: {}", engine.instantiated_cells().len());
    match slot.latest_detections() {
        Some(frame) => println!(
            "Latest frame: {} detections on {}x{}",
            frame.len(),
            frame.image_width,
            frame.image_height
        ),
        None => println!("Latest frame: none"),
    }
    println!();
}

/// Publish each line of a JSONL file into the feed, newest wins
async fn replay_detections(path: PathBuf, feed: DetectionFeed, interval: Duration) {
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("Cannot open detection replay {}: {}", path.display(), e);
            return;
        }
    };

    let mut lines = tokio::io::BufReader::new(file).lines();
    let mut published = 0usize;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => {
                match feed.publish_json(&line) {
                    Ok(()) => published += 1,
                    Err(e) => tracing::warn!("Skipping malformed detection payload: {}", e),
                }
                tokio::time::sleep(interval).await;
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Detection replay read failed: {}", e);
                break;
            }
        }
    }

    tracing::info!("Detection replay finished after {} payloads", published);
}
