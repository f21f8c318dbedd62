//! snode-rebalance binary
//!
//! Runs one deterministic rebalancing pass over a JSON snapshot of swarm
//! membership, or profiles a snapshot without changing it.
//!
//! Usage:
//!   snode-rebalance rebalance --input swarms.json --seed 42 [--config policy.json] [--report]
//!   snode-rebalance profile --input swarms.json
//!
//! Policy comes from `--config` when given, otherwise from `SNODE_*`
//! environment variables with network defaults.

mod snapshot;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use snode_swarm::{
    calc_excess, calc_robin_hood_round, calc_threshold, rebalance, split_unassigned, swarm_sizes,
    SwarmSize,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::snapshot::{load_config, RebalanceOutput, Snapshot};

#[derive(Parser)]
#[command(
    name = "snode-rebalance",
    about = "Deterministic service node swarm rebalancing",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one rebalancing pass and print the resulting snapshot
    Rebalance {
        /// Snapshot to rebalance
        #[arg(short, long)]
        input: PathBuf,
        /// Shared seed, identical on every participant
        #[arg(short, long)]
        seed: u64,
        /// Policy file (JSON); defaults come from the environment
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the snapshot here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include the run report in the output
        #[arg(long)]
        report: bool,
    },
    /// Print swarm sizes, excess and threshold for a snapshot
    Profile {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct Profile {
    swarms: Vec<SwarmSize>,
    unassigned: usize,
    excess: usize,
    threshold: usize,
    poor: usize,
    deficit: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snode_swarm=info,snode_rebalance=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Rebalance {
            input,
            seed,
            config,
            output,
            report,
        } => {
            let config = load_config(config.as_deref())?;
            let snapshot = Snapshot::load(&input)?;
            let out = rebalance(snapshot.into_input(), seed, &config)?;

            info!(
                swarms = out.swarms.len(),
                spawned = out.report.spawned.len(),
                decommissioned = out.report.decommissioned.len(),
                transfers = out.report.transfers.len(),
                "rebalanced"
            );

            let result = RebalanceOutput {
                snapshot: Snapshot::from_swarms(&out.swarms),
                report: report.then_some(out.report),
            };
            write_json(&result, output)
        }
        Commands::Profile { input, config } => {
            let config = load_config(config.as_deref())?;
            let (swarms, unassigned) = split_unassigned(Snapshot::load(&input)?.into_input());
            let round = calc_robin_hood_round(&swarms, &config);

            let profile = Profile {
                swarms: swarm_sizes(&swarms),
                unassigned: unassigned.len(),
                excess: calc_excess(&swarms, &config),
                threshold: calc_threshold(&swarms, &config),
                poor: round.poor.len(),
                deficit: round.deficit,
            };
            write_json(&profile, None)
        }
    }
}

fn write_json<T: Serialize>(value: &T, path: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => std::fs::write(&path, json + "\n")?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}
