//! The top-level rebalancing pass.
//!
//! Phases run in a fixed order on one map with one generator:
//!
//! 1. Strip the unassigned entry and make sure a swarm exists
//! 2. Assign registered workers (spawning after each one)
//! 3. Robin Hood transfers into swarms below the floor
//! 4. Spawn from the remaining excess
//! 5. Decommission undersized swarms and re-assign their members

use tracing::debug;

use crate::assign::assign_workers;
use crate::config::SwarmConfig;
use crate::decommission::decommission;
use crate::error::Result;
use crate::rng::SwarmRng;
use crate::robin_hood::{robin_hood, Transfer};
use crate::spawn::{ensure_initial_swarm, spawn_from_excess};
use crate::types::{split_unassigned, SwarmId, SwarmInput, SwarmMap};

/// What a rebalancing pass did to the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebalanceReport {
    /// Workers taken from the unassigned entry.
    pub registered: usize,
    /// Swarm created because the map held none.
    pub initial_swarm: Option<SwarmId>,
    /// Robin Hood transfers, in order.
    pub transfers: Vec<Transfer>,
    /// Swarms created from excess, in order.
    pub spawned: Vec<SwarmId>,
    /// Swarms dissolved for being below the floor.
    pub decommissioned: Vec<SwarmId>,
    /// Members of dissolved swarms that were placed again.
    pub orphans: usize,
    /// Raw generator outputs consumed.
    pub draws: u64,
}

/// Result of a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebalanced {
    pub swarms: SwarmMap,
    pub report: RebalanceReport,
}

/// Recompute swarm membership.
///
/// Pure in `(input, seed, config)`: every caller supplying the same values
/// gets the same map back. The input is consumed; on error nothing partial is
/// returned, so callers needing the prior state must keep a copy.
///
/// An empty input comes back empty without touching the generator.
pub fn rebalance(input: SwarmInput, seed: u64, config: &SwarmConfig) -> Result<Rebalanced> {
    config.validate()?;

    let (mut swarms, unassigned) = split_unassigned(input);
    let mut report = RebalanceReport {
        registered: unassigned.len(),
        ..Default::default()
    };
    if swarms.is_empty() && unassigned.is_empty() {
        return Ok(Rebalanced { swarms, report });
    }

    let mut rng = SwarmRng::new(seed);
    debug!(
        swarms = swarms.len(),
        registrations = unassigned.len(),
        "rebalancing swarms"
    );

    report.initial_swarm = ensure_initial_swarm(&mut swarms, &mut rng);

    report.spawned = assign_workers(&unassigned, &mut swarms, &mut rng, config)?;
    log_sizes("after assignment", &swarms);

    report.transfers = robin_hood(&mut swarms, &mut rng, config);

    report
        .spawned
        .extend(spawn_from_excess(&mut swarms, &mut rng, config)?);

    let decommissioned = decommission(&mut swarms, &mut rng, config)?;
    report.decommissioned = decommissioned.swarms;
    report.orphans = decommissioned.orphans.len();
    report.spawned.extend(decommissioned.created);

    log_sizes("swarm outputs", &swarms);
    report.draws = rng.draws();

    Ok(Rebalanced { swarms, report })
}

fn log_sizes(stage: &str, swarms: &SwarmMap) {
    for (id, members) in swarms {
        debug!(stage, swarm = %id, size = members.len(), "swarm size");
    }
}
