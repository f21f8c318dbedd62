//! Surplus accounting and the weighted pools drawn from it.
//!
//! A pool lists every member of every qualifying swarm, so a swarm's chance
//! of being drawn from grows with its size.

use tracing::debug;

use crate::config::SwarmConfig;
use crate::types::{SwarmId, SwarmMap, WorkerId};

/// Total number of members above the baseline, summed over all swarms.
pub fn calc_excess(swarms: &SwarmMap, config: &SwarmConfig) -> usize {
    let excess = swarms
        .values()
        .map(|members| members.len().saturating_sub(config.excess_base))
        .sum();
    debug!(excess, "calculated excess");
    excess
}

/// Excess required before a new swarm may be spawned.
///
/// Enough to fill a new swarm while leaving `ideal_swarm_margin` behind in
/// each existing one. Saturates at `usize::MAX`, which no excess can reach.
pub fn calc_threshold(swarms: &SwarmMap, config: &SwarmConfig) -> usize {
    let threshold = swarms
        .len()
        .saturating_mul(config.ideal_swarm_margin)
        .saturating_add(config.new_swarm_size);
    debug!(threshold, "calculated threshold");
    threshold
}

/// A drawable member together with the swarm it currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolEntry {
    pub worker: WorkerId,
    pub swarm_id: SwarmId,
}

/// Members of every swarm larger than some floor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcessPool {
    /// One entry per member, in map order then member order.
    pub entries: Vec<PoolEntry>,
    /// Members above the viability floor across the pooled swarms.
    pub excess: usize,
}

impl ExcessPool {
    /// Pool every member of every swarm whose size exceeds `floor`.
    ///
    /// Empty when `floor` is below the viability floor.
    pub fn collect(swarms: &SwarmMap, floor: usize, config: &SwarmConfig) -> Self {
        let mut pool = Self::default();
        if floor < config.min_swarm_size {
            return pool;
        }
        for (&swarm_id, members) in swarms {
            if members.len() > floor {
                pool.excess += members.len() - config.min_swarm_size;
                pool.entries
                    .extend(members.iter().map(|&worker| PoolEntry { worker, swarm_id }));
            }
        }
        pool
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Remove a pooled member from its swarm. Returns whether it was present.
pub fn remove_from_swarm(entry: &PoolEntry, swarms: &mut SwarmMap) -> bool {
    let Some(members) = swarms.get_mut(&entry.swarm_id) else {
        return false;
    };
    match members.iter().position(|w| *w == entry.worker) {
        Some(pos) => {
            members.remove(pos);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_worker(seed: u8) -> WorkerId {
        let mut id = [0u8; 32];
        id[0] = seed;
        WorkerId(id)
    }

    fn swarm_of(size: u8, offset: u8) -> Vec<WorkerId> {
        (0..size).map(|i| make_worker(offset + i)).collect()
    }

    fn sample_map() -> SwarmMap {
        let mut swarms = SwarmMap::new();
        swarms.insert(SwarmId(1), swarm_of(3, 0));
        swarms.insert(SwarmId(2), swarm_of(8, 10));
        swarms.insert(SwarmId(3), swarm_of(6, 30));
        swarms
    }

    #[test]
    fn excess_counts_only_above_baseline() {
        let config = SwarmConfig::default();
        // 0 + 3 + 1
        assert_eq!(calc_excess(&sample_map(), &config), 4);
        assert_eq!(calc_excess(&SwarmMap::new(), &config), 0);
    }

    #[test]
    fn threshold_grows_with_swarm_count() {
        let config = SwarmConfig::default();
        assert_eq!(calc_threshold(&SwarmMap::new(), &config), 7);
        assert_eq!(calc_threshold(&sample_map(), &config), 7 + 3 * 2);
    }

    #[test]
    fn threshold_saturates_on_huge_policy() {
        let config = SwarmConfig {
            ideal_swarm_margin: usize::MAX,
            ..Default::default()
        };
        assert_eq!(calc_threshold(&sample_map(), &config), usize::MAX);

        let config = SwarmConfig {
            new_swarm_size: usize::MAX,
            ..Default::default()
        };
        assert_eq!(calc_threshold(&sample_map(), &config), usize::MAX);
        assert_eq!(calc_threshold(&SwarmMap::new(), &config), usize::MAX);
    }

    #[test]
    fn pool_lists_members_in_map_order() {
        let config = SwarmConfig::default();
        let pool = ExcessPool::collect(&sample_map(), 5, &config);

        assert_eq!(pool.len(), 14);
        assert_eq!(pool.excess, 3 + 1);
        assert_eq!(
            pool.entries[0],
            PoolEntry {
                worker: make_worker(10),
                swarm_id: SwarmId(2),
            }
        );
        assert_eq!(
            pool.entries[8],
            PoolEntry {
                worker: make_worker(30),
                swarm_id: SwarmId(3),
            }
        );
    }

    #[test]
    fn pool_respects_floor() {
        let config = SwarmConfig::default();
        let pool = ExcessPool::collect(&sample_map(), 6, &config);
        assert_eq!(pool.len(), 8);
        assert!(pool.entries.iter().all(|e| e.swarm_id == SwarmId(2)));

        let pool = ExcessPool::collect(&sample_map(), 8, &config);
        assert!(pool.is_empty());
        assert_eq!(pool.excess, 0);
    }

    #[test]
    fn pool_empty_below_viability_floor() {
        let config = SwarmConfig::default();
        let pool = ExcessPool::collect(&sample_map(), 2, &config);
        assert!(pool.is_empty());
    }

    #[test]
    fn remove_reports_presence() {
        let mut swarms = sample_map();
        let entry = PoolEntry {
            worker: make_worker(11),
            swarm_id: SwarmId(2),
        };

        assert!(remove_from_swarm(&entry, &mut swarms));
        assert_eq!(swarms[&SwarmId(2)].len(), 7);
        assert!(!swarms[&SwarmId(2)].contains(&make_worker(11)));
        assert!(!remove_from_swarm(&entry, &mut swarms));

        let missing = PoolEntry {
            worker: make_worker(11),
            swarm_id: SwarmId(99),
        };
        assert!(!remove_from_swarm(&missing, &mut swarms));
    }
}
