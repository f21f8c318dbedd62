//! New swarm creation from accumulated surplus.

use tracing::{debug, error};

use crate::config::SwarmConfig;
use crate::error::{Error, Result};
use crate::excess::{calc_excess, calc_threshold, remove_from_swarm, ExcessPool};
use crate::rng::SwarmRng;
use crate::types::{SwarmId, SwarmMap};

/// Draw an id that no existing swarm uses.
///
/// Ids come from `[0, u64::MAX)`, so the legacy unassigned sentinel is never
/// produced.
pub fn new_swarm_id(rng: &mut SwarmRng, swarms: &SwarmMap) -> SwarmId {
    loop {
        let id = SwarmId(rng.uniform(u64::MAX));
        if !swarms.contains_key(&id) {
            return id;
        }
    }
}

/// Create an empty swarm if none exist. Returns its id when one was created.
pub fn ensure_initial_swarm(swarms: &mut SwarmMap, rng: &mut SwarmRng) -> Option<SwarmId> {
    if !swarms.is_empty() {
        return None;
    }
    let id = new_swarm_id(rng, swarms);
    swarms.insert(id, Vec::new());
    debug!(swarm = %id, "created initial swarm");
    Some(id)
}

/// Spawn swarms for as long as the excess reaches the threshold.
///
/// Each new swarm is filled one member at a time from the pool of swarms
/// above the baseline, recomputing the pool after every removal. Returns the
/// ids of the new swarms in creation order.
///
/// On error the members drained for the unfinished swarm are gone from
/// `swarms`, which must be discarded.
pub fn spawn_from_excess(
    swarms: &mut SwarmMap,
    rng: &mut SwarmRng,
    config: &SwarmConfig,
) -> Result<Vec<SwarmId>> {
    let mut spawned = Vec::new();

    while calc_excess(swarms, config) >= calc_threshold(swarms, config) {
        let mut members = Vec::with_capacity(config.new_swarm_size);

        while members.len() < config.new_swarm_size {
            let pool = ExcessPool::collect(swarms, config.excess_base, config);
            let Some(&entry) = rng.pick(&pool.entries) else {
                error!(
                    collected = members.len(),
                    needed = config.new_swarm_size,
                    "excess pool exhausted during swarm creation"
                );
                return Err(Error::ExcessPoolExhausted {
                    collected: members.len(),
                    needed: config.new_swarm_size,
                });
            };
            remove_from_swarm(&entry, swarms);
            members.push(entry.worker);
        }

        let id = new_swarm_id(rng, swarms);
        swarms.insert(id, members);
        debug!(swarm = %id, "created new swarm from excess");
        spawned.push(id);
    }

    Ok(spawned)
}
