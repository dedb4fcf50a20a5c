use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cdslink::config::BridgeConfig;
use cdslink::gateway::{self, BridgeEvent};
use cdslink::registry::{AircraftRegistry, FlightPlan};

/// Replay a recorded event stream against a set of flight plans.
///
/// Stands in for the wire transport: reads one JSON event per line, runs
/// it through the gateway, and prints the resulting acks (and requested
/// snapshots) as JSON lines on stdout.
#[derive(Parser, Debug)]
#[command(name = "cdslink", version, about = "Controller display bridge replay")]
struct Args {
    /// Path to the bridge configuration file
    #[arg(long, default_value = "cdslink.toml")]
    config: PathBuf,

    /// JSON array of flight plans to seed the registry with
    #[arg(long)]
    flights: PathBuf,

    /// JSON-lines file of events to replay, in order
    #[arg(long)]
    events: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = BridgeConfig::load(&args.config)?;
    info!(
        controller = %config.controller_id,
        facility = config.facility,
        "starting replay"
    );

    let registry = AircraftRegistry::new();
    let flights_file = File::open(&args.flights)
        .with_context(|| format!("opening flights file {}", args.flights.display()))?;
    let flights: Vec<FlightPlan> =
        serde_json::from_reader(BufReader::new(flights_file)).context("parsing flights file")?;
    let seeded = flights.len();
    for plan in flights {
        registry.insert(plan);
    }
    info!(flights = seeded, "registry seeded");

    let events_file = File::open(&args.events)
        .with_context(|| format!("opening events file {}", args.events.display()))?;
    let mut stdout = std::io::stdout().lock();

    for (line_no, line) in BufReader::new(events_file).lines().enumerate() {
        let line = line.context("reading events file")?;
        if line.trim().is_empty() {
            continue;
        }

        let event: BridgeEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(err) => {
                warn!(line = line_no + 1, %err, "skipping unparseable event");
                continue;
            }
        };

        let outcome = gateway::handle_event(&registry, &config, event);
        serde_json::to_writer(&mut stdout, &outcome.ack)?;
        writeln!(stdout)?;
        if let Some(snapshot) = outcome.snapshot {
            serde_json::to_writer(&mut stdout, &snapshot)?;
            writeln!(stdout)?;
        }
    }

    info!("replay complete");
    Ok(())
}
