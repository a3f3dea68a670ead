//! Headless autopilot host.
//!
//! Flies the pilot through a seeded rock field for a fixed number of ticks
//! and prints a JSON summary on stdout. Logs go to stderr.
//!
//! ```bash
//! RUST_LOG=pilot_runtime=debug PILOT_SIM_TICKS=1800 cargo run -p pilot-cli
//! ```
mod sandbox;

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use pilot_core::Arena;
use pilot_runtime::{
    DecisionEvent, Event, MetricsSnapshot, PilotRuntime, RuntimeConfig, Topic,
};
use sandbox::{RunSummary, Sandbox};

/// Host loop settings.
///
/// Environment variables:
/// - `PILOT_SIM_TICKS` - Ticks to simulate (default: 3600)
/// - `PILOT_SIM_SEED` - World seed (default: 1)
/// - `PILOT_SIM_TICK_MS` - Wall-clock pacing per tick, 0 for flat out (default: 0)
struct HostConfig {
    ticks: u64,
    seed: u64,
    tick_interval: Option<Duration>,
}

impl HostConfig {
    fn from_env() -> Result<Self> {
        let ticks = read_env("PILOT_SIM_TICKS")?.unwrap_or(3600);
        let seed = read_env("PILOT_SIM_SEED")?.unwrap_or(1);
        let pace = read_env::<u64>("PILOT_SIM_TICK_MS")?.unwrap_or(0);
        Ok(Self {
            ticks,
            seed,
            tick_interval: (pace > 0).then(|| Duration::from_millis(pace)),
        })
    }
}

fn read_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(key)
        .ok()
        .map(|raw| raw.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("invalid value for {key}"))
}

#[derive(Serialize)]
struct Report {
    run: RunSummary,
    planner: MetricsSnapshot,
    behavior_changes: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    setup_logging();

    let host = HostConfig::from_env()?;
    let config = RuntimeConfig::from_env().context("loading pilot configuration")?;
    let ship = config.pilot.ship;

    info!(
        ticks = host.ticks,
        seed = host.seed,
        planner = config.enable_planner,
        "starting headless pilot run"
    );

    let mut runtime = PilotRuntime::builder().config(config).build().await?;
    let mut decisions = runtime.subscribe(Topic::Decision);
    let mut world = Sandbox::new(Arena::new(1600.0, 1200.0), ship, host.seed);
    let mut pacing = host.tick_interval.map(tokio::time::interval);

    while world.tick() < host.ticks {
        if let Some(interval) = pacing.as_mut() {
            interval.tick().await;
        } else {
            // Let the planner worker's completion reach the channel.
            tokio::task::yield_now().await;
        }

        let output = runtime.tick(&world.snapshot());
        let report = world.step(output.intent);

        if report.died {
            info!(tick = world.tick(), "craft destroyed; respawning");
            runtime.reset();
        }

        while let Ok(event) = decisions.try_recv() {
            if let Event::Decision(DecisionEvent::BehaviorChanged { tick, from, to, .. }) = event {
                debug!(tick, ?from, %to, "behavior");
            }
        }
    }

    let report = Report {
        run: world.summary(),
        planner: runtime.metrics(),
        behavior_changes: runtime.session().autopilot().arbiter().change_count(),
    };
    runtime.shutdown().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
