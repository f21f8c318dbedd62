//! Dissolution of swarms that stay below the viability floor.

use tracing::warn;

use crate::assign::assign_workers;
use crate::config::SwarmConfig;
use crate::error::Result;
use crate::rng::SwarmRng;
use crate::types::{SwarmId, SwarmMap, WorkerId};

/// Outcome of a decommission pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decommissioned {
    /// Dissolved swarms, ascending by id.
    pub swarms: Vec<SwarmId>,
    /// Members of the dissolved swarms, in re-assignment order.
    pub orphans: Vec<WorkerId>,
    /// Swarms created while re-assigning the orphans.
    pub created: Vec<SwarmId>,
}

/// Remove every swarm below the floor and return its members.
///
/// Each dissolved swarm's members go to the front of the list, so swarms
/// with higher ids are re-assigned first.
pub fn dissolve_poor_swarms(
    swarms: &mut SwarmMap,
    config: &SwarmConfig,
) -> (Vec<SwarmId>, Vec<WorkerId>) {
    let mut dissolved = Vec::new();
    let mut orphans = Vec::new();
    swarms.retain(|&id, members| {
        if members.len() >= config.min_swarm_size {
            return true;
        }
        warn!(swarm = %id, size = members.len(), "swarm is DECOMMISSIONED");
        let mut freed = std::mem::take(members);
        freed.append(&mut orphans);
        orphans = freed;
        dissolved.push(id);
        false
    });
    (dissolved, orphans)
}

/// Dissolve undersized swarms, then place their members again.
///
/// Skipped when at most one swarm exists. All dissolutions happen before any
/// orphan is placed, so no orphan lands in a swarm that is about to go.
pub fn decommission(
    swarms: &mut SwarmMap,
    rng: &mut SwarmRng,
    config: &SwarmConfig,
) -> Result<Decommissioned> {
    if swarms.len() <= 1 {
        return Ok(Decommissioned::default());
    }

    let (dissolved, orphans) = dissolve_poor_swarms(swarms, config);
    let created = if orphans.is_empty() {
        Vec::new()
    } else {
        assign_workers(&orphans, swarms, rng, config)?
    };

    Ok(Decommissioned {
        swarms: dissolved,
        orphans,
        created,
    })
}
