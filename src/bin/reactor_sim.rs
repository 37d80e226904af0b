//! Headless Reactor Runner
//!
//! Loads a layout, ticks it and prints what happened each tick.

use std::path::PathBuf;

use clap::Parser;
use reactor_core::core::error::Result;
use reactor_core::core::types::{GridCoord, GridDimensions};
use reactor_core::layout::{ComponentSpec, ReactorLayout};
use reactor_core::simulation::{SimulationEvent, TickReport};
use reactor_core::{Reactor, SimulationConfig};
use serde::Serialize;

/// Headless reactor runner
#[derive(Parser, Debug)]
#[command(name = "reactor_sim")]
#[command(about = "Tick a reactor layout and report temperatures and events")]
struct Args {
    /// Layout file (TOML, or JSON by extension); a single cooled rod if omitted
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Simulation config file (TOML); defaults if omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,

    /// Stop at the first meltdown
    #[arg(long)]
    stop_on_meltdown: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    ticks_run: u64,
    components: usize,
    peak_temperature: f64,
    meltdowns: usize,
    exhausted_rods: usize,
    faulted: bool,
    reports: Vec<TickReport>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let layout = match &args.layout {
        Some(path) => ReactorLayout::load(path)?,
        None => demo_layout(),
    };

    let mut reactor = Reactor::from_layout(&layout, config)?;
    tracing::info!(
        "Loaded reactor {:?} with {} components",
        reactor.id(),
        reactor.grid().len()
    );

    let json = args.format == "json";
    let mut reports = Vec::new();
    let mut peak_temperature = reactor.config().ambient_temperature;

    for _ in 0..args.ticks {
        let report = reactor.tick();
        if let Some(hottest) = report.hottest(1).first() {
            peak_temperature = peak_temperature.max(hottest.after);
        }
        if !json {
            print_tick(&report);
        }
        let stop = report.faulted || (args.stop_on_meltdown && report.has_meltdown());
        reports.push(report);
        if stop {
            break;
        }
    }

    let summary = RunSummary {
        ticks_run: reports.len() as u64,
        components: reactor.grid().len(),
        peak_temperature,
        meltdowns: reports.iter().map(|r| r.meltdowns().count()).sum(),
        exhausted_rods: reports.iter().map(|r| r.exhausted_rods().count()).sum(),
        faulted: reactor.is_faulted(),
        reports,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("\n=== SUMMARY ===");
        println!("Ticks run:        {}", summary.ticks_run);
        println!("Components:       {}", summary.components);
        println!("Peak temperature: {:.1} K", summary.peak_temperature);
        println!("Meltdowns:        {}", summary.meltdowns);
        println!("Exhausted rods:   {}", summary.exhausted_rods);
        println!("Faulted:          {}", summary.faulted);
    }
    Ok(())
}

fn print_tick(report: &TickReport) {
    let hottest = report
        .hottest(1)
        .first()
        .map(|d| format!("{:.1} K at {}", d.after, d.coord))
        .unwrap_or_else(|| "-".into());
    println!(
        "tick {:>5}  heat +{:>8.2} -{:>8.2}  emission {:>7.2}  hottest {}",
        report.tick, report.heat_generated, report.heat_removed, report.total_emission, hottest
    );
    for event in &report.events {
        match event {
            SimulationEvent::Meltdown { coord, temperature, .. } => {
                println!("    MELTDOWN at {} ({:.1} K)", coord, temperature)
            }
            SimulationEvent::FailureTransition { coord, from, to, .. } => {
                println!("    {} {:?} -> {:?}", coord, from, to)
            }
            SimulationEvent::FuelExhausted { coord, fuel, .. } => {
                println!("    fuel '{}' exhausted at {}", fuel, coord)
            }
            other => println!("    {:?}", other),
        }
    }
}

fn demo_layout() -> ReactorLayout {
    ReactorLayout::new(GridDimensions::cube(3))
        .with_fuel("uranium", [0.8, 0.6, 0.1, 0.1])
        .with_component(ComponentSpec::fuel_rod(GridCoord::new(1, 1, 1), "uranium", 2.0))
        .with_component(ComponentSpec::coolant_channel(GridCoord::new(1, 1, 2)))
}
