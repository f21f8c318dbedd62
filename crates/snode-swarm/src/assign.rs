//! Placement of unassigned workers.

use tracing::trace;

use crate::config::SwarmConfig;
use crate::error::Result;
use crate::profile::{percentile_index, swarm_sizes, SwarmSize};
use crate::rng::SwarmRng;
use crate::spawn::{ensure_initial_swarm, spawn_from_excess};
use crate::types::{SwarmId, SwarmMap, WorkerId};

/// Last index of the band of smallest swarms eligible for a new worker.
///
/// The band runs from index 0 through the last swarm whose size equals the
/// size at the lower percentile.
pub fn fill_band_end(sorted: &[SwarmSize], lower_percentile: usize) -> usize {
    let p = percentile_index(lower_percentile, sorted.len());
    let Some(pivot) = sorted.get(p) else {
        return 0;
    };
    sorted[p..]
        .iter()
        .position(|s| s.size > pivot.size)
        .map(|offset| p + offset - 1)
        .unwrap_or(sorted.len() - 1)
}

/// Assign each worker to one of the smaller swarms, in order.
///
/// The spawn check runs after every single assignment. Returns the ids of
/// every swarm created along the way.
pub fn assign_workers(
    workers: &[WorkerId],
    swarms: &mut SwarmMap,
    rng: &mut SwarmRng,
    config: &SwarmConfig,
) -> Result<Vec<SwarmId>> {
    let mut created = Vec::new();

    for &worker in workers {
        if let Some(id) = ensure_initial_swarm(swarms, rng) {
            created.push(id);
        }

        let sorted = swarm_sizes(swarms);
        let band_end = fill_band_end(&sorted, config.fill_lower_percentile);
        let idx = rng.uniform(band_end as u64 + 1) as usize;
        let swarm_id = sorted[idx].swarm_id;

        swarms.entry(swarm_id).or_default().push(worker);
        trace!(worker = %worker, swarm = %swarm_id, "assigned worker");

        created.extend(spawn_from_excess(swarms, rng, config)?);
    }

    Ok(created)
}
