//! Headless Settlement Runner
//!
//! Advances one or more settlements for a number of ticks and prints the
//! final snapshot (JSON) or a short text summary.

use std::path::PathBuf;
use std::time::Instant;

use arc_settlement::city::{
    game_data, set_game_data, start_construction, GameData, ProductionRates, Settlement,
    SettlementEvent,
};
use arc_settlement::core::config::{config, set_config};
use arc_settlement::core::{BuildingKind, Result, SettlementError, SimulationConfig};
use arc_settlement::simulation::{tick_all, TickContext};
use clap::Parser;
use serde::Serialize;

/// Headless Settlement Runner - deterministic economy simulation
#[derive(Parser, Debug)]
#[command(name = "settlement_sim")]
#[command(about = "Advance settlements through the tick engine and print the result")]
struct Args {
    /// Balance overrides (TOML, any subset of fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Producer table (TOML), defaults to the built-in catalog
    #[arg(long)]
    production: Option<PathBuf>,

    /// Start from a saved snapshot instead of a fresh settlement
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Name of a fresh settlement
    #[arg(long, default_value = "Ashford")]
    name: String,

    /// Number of ticks to run
    #[arg(long, default_value_t = 60)]
    ticks: u64,

    /// Seconds simulated per tick
    #[arg(long, default_value_t = 60.0)]
    seconds: f64,

    /// Number of copies advanced in parallel
    #[arg(long, default_value_t = 1)]
    copies: usize,

    /// Buildings to queue before the first tick (e.g. --build house --build mill)
    #[arg(long)]
    build: Vec<String>,

    /// Disallow storing gold
    #[arg(long)]
    no_gold_storage: bool,

    /// Disallow storing ore
    #[arg(long)]
    no_ore_storage: bool,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Write the final snapshot to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    ticks: u64,
    seconds_per_tick: f64,
    elapsed_ms: f64,
    constructions_completed: usize,
    starvation_deaths: u32,
    settlement: &'a Settlement,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("arc_settlement=info")),
        )
        .init();

    let args = Args::parse();

    if let Some(path) = &args.config {
        let loaded = SimulationConfig::load_from_toml(path)?;
        if set_config(loaded).is_err() {
            tracing::warn!("Simulation config already installed, ignoring {}", path.display());
        }
    }
    if let Some(path) = &args.production {
        let rates = ProductionRates::load_from_toml(path)?;
        tracing::info!("Loaded {} producers from {}", rates.all().len(), path.display());
        if set_game_data(GameData::with_defaults().with_production(rates)).is_err() {
            tracing::warn!("Game data already installed, ignoring {}", path.display());
        }
    }
    let config = config();
    let data = game_data();

    let mut base = match &args.snapshot {
        Some(path) => Settlement::from_json(&std::fs::read_to_string(path)?)?,
        None => Settlement::new(args.name.clone(), data),
    };

    for name in &args.build {
        let building: BuildingKind = name.parse()?;
        let result = start_construction(&mut base, building, data)?;
        if !result.success {
            tracing::warn!("{}", result.message);
        }
    }

    if args.copies == 0 {
        return Err(SettlementError::InvalidConfig("--copies must be at least 1".into()));
    }
    let mut settlements = vec![base; args.copies];
    let ctx = TickContext {
        allow_gold_storage: !args.no_gold_storage,
        allow_ore_storage: !args.no_ore_storage,
        ..TickContext::default()
    };

    tracing::info!(
        "Running {} settlement(s) for {} ticks of {}s",
        settlements.len(),
        args.ticks,
        args.seconds
    );

    let start = Instant::now();
    let mut constructions_completed = 0;
    let mut starvation_deaths = 0;
    for _ in 0..args.ticks {
        let batch = tick_all(&mut settlements, args.seconds, &ctx, data, config);
        // Copies are identical, so the first one's events stand for all
        if let Some(events) = batch.first() {
            for event in events {
                match event {
                    SettlementEvent::ConstructionComplete { .. } => constructions_completed += 1,
                    SettlementEvent::Starvation { deaths } => starvation_deaths += deaths,
                    _ => {}
                }
            }
        }
    }
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let Some(settlement) = settlements.first() else {
        return Ok(());
    };

    if let Some(path) = &args.output {
        std::fs::write(path, settlement.to_json()?)?;
        tracing::info!("Snapshot written to {}", path.display());
    }

    if args.format == "text" {
        println!("Settlement: {}", settlement.name);
        println!("Ticks: {} ({:.2}ms)", settlement.tick_count, elapsed_ms);
        println!(
            "Population: {} / {} (approval {})",
            settlement.population, settlement.housing_capacity, settlement.approval
        );
        println!("Constructions completed: {}", constructions_completed);
        println!("Starvation deaths: {}", starvation_deaths);
        println!("--- Resources ---");
        for (resource, amount) in settlement.resources.iter() {
            println!("{:?}: {:.1}", resource, amount);
        }
    } else {
        let summary = RunSummary {
            ticks: args.ticks,
            seconds_per_tick: args.seconds,
            elapsed_ms,
            constructions_completed,
            starvation_deaths,
            settlement,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
