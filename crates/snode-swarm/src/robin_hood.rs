//! Robin Hood rounds: members move one at a time from rich swarms to poor ones.
//!
//! A swarm is poor while it sits below the viability floor. A swarm is rich
//! when it is larger than both the floor and the size found at the stealing
//! percentile. Every transfer changes both sets, so they are recomputed after
//! each one. Taking a member from a rich swarm never pushes it below the
//! floor, and every transfer shrinks the total deficit, so the loop ends.

use tracing::{debug, trace};

use crate::config::SwarmConfig;
use crate::excess::{remove_from_swarm, ExcessPool};
use crate::profile::{percentile_index, swarm_sizes};
use crate::rng::SwarmRng;
use crate::types::{SwarmId, SwarmMap, WorkerId};

/// One member moved from a rich swarm to a poor one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transfer {
    pub worker: WorkerId,
    pub from: SwarmId,
    pub to: SwarmId,
}

/// The poor and rich sides of the map at one point in time.
#[derive(Debug, Clone, Default)]
pub struct RobinHoodRound {
    /// Members of the rich swarms.
    pub rich: ExcessPool,
    /// Swarms below the viability floor, smallest first, ties by id.
    pub poor: Vec<SwarmId>,
    /// Members the poor swarms are short of, in total.
    pub deficit: usize,
}

impl RobinHoodRound {
    /// Whether a transfer can happen without starving a rich swarm.
    pub fn can_transfer(&self) -> bool {
        !self.poor.is_empty() && !self.rich.is_empty() && self.rich.excess > 0
    }
}

/// Compute the current poor swarms and rich pool.
pub fn calc_robin_hood_round(swarms: &SwarmMap, config: &SwarmConfig) -> RobinHoodRound {
    let sorted = swarm_sizes(swarms);
    let p = percentile_index(config.steal_upper_percentile, sorted.len());
    let Some(pivot) = sorted.get(p) else {
        return RobinHoodRound::default();
    };
    let rich_floor = pivot.size.max(config.min_swarm_size);

    let mut round = RobinHoodRound {
        rich: ExcessPool::collect(swarms, rich_floor, config),
        ..Default::default()
    };
    for swarm in sorted.iter().take_while(|s| s.size < config.min_swarm_size) {
        round.deficit += config.min_swarm_size - swarm.size;
        round.poor.push(swarm.swarm_id);
    }
    round
}

/// Move members from rich to poor swarms until no transfer is possible.
///
/// Each step draws the member from the rich pool first, then the receiving
/// poor swarm. Poor swarms that cannot be fully relieved stay short.
pub fn robin_hood(
    swarms: &mut SwarmMap,
    rng: &mut SwarmRng,
    config: &SwarmConfig,
) -> Vec<Transfer> {
    let mut transfers = Vec::new();

    loop {
        let round = calc_robin_hood_round(swarms, config);
        if !round.can_transfer() {
            if round.deficit > 0 {
                debug!(
                    poor = round.poor.len(),
                    deficit = round.deficit,
                    "insufficient excess to relieve poor swarms"
                );
            }
            break;
        }
        let Some(&entry) = rng.pick(&round.rich.entries) else {
            break;
        };
        let Some(&to) = rng.pick(&round.poor) else {
            break;
        };

        remove_from_swarm(&entry, swarms);
        swarms.entry(to).or_default().push(entry.worker);
        trace!(worker = %entry.worker, from = %entry.swarm_id, to = %to, "stole member");
        transfers.push(Transfer {
            worker: entry.worker,
            from: entry.swarm_id,
            to,
        });
    }

    transfers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_worker(seed: u16) -> WorkerId {
        let mut id = [0u8; 32];
        id[..2].copy_from_slice(&seed.to_be_bytes());
        WorkerId(id)
    }

    fn swarm_of(size: u16, offset: u16) -> Vec<WorkerId> {
        (0..size).map(|i| make_worker(offset + i)).collect()
    }

    #[test]
    fn round_classifies_poor_and_rich() {
        let config = SwarmConfig::default();
        let mut swarms = SwarmMap::new();
        swarms.insert(SwarmId(1), swarm_of(3, 0));
        swarms.insert(SwarmId(2), swarm_of(12, 100));

        let round = calc_robin_hood_round(&swarms, &config);
        assert_eq!(round.poor, vec![SwarmId(1)]);
        assert_eq!(round.deficit, 2);
        assert_eq!(round.rich.len(), 12);
        assert_eq!(round.rich.excess, 7);
        assert!(round.can_transfer());
    }

    #[test]
    fn rich_floor_follows_upper_percentile() {
        let config = SwarmConfig::default();
        let mut swarms = SwarmMap::new();
        swarms.insert(SwarmId(1), swarm_of(2, 0));
        swarms.insert(SwarmId(2), swarm_of(6, 100));
        swarms.insert(SwarmId(3), swarm_of(7, 200));
        swarms.insert(SwarmId(4), swarm_of(9, 300));
        swarms.insert(SwarmId(5), swarm_of(8, 400));

        // p = 75 * 4 / 100 = 3, sizes [2, 6, 7, 8, 9] -> floor 8
        let round = calc_robin_hood_round(&swarms, &config);
        assert!(round.rich.entries.iter().all(|e| e.swarm_id == SwarmId(4)));
        assert_eq!(round.rich.len(), 9);
    }

    #[test]
    fn no_poor_swarms_no_transfers() {
        let config = SwarmConfig::default();
        let mut swarms = SwarmMap::new();
        swarms.insert(SwarmId(1), swarm_of(5, 0));
        swarms.insert(SwarmId(2), swarm_of(12, 100));
        let mut rng = SwarmRng::new(1);

        assert!(robin_hood(&mut swarms, &mut rng, &config).is_empty());
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn relieves_deficit_of_two() {
        let config = SwarmConfig::default();
        let mut swarms = SwarmMap::new();
        swarms.insert(SwarmId(1), swarm_of(3, 0));
        swarms.insert(SwarmId(2), swarm_of(12, 100));
        let mut rng = SwarmRng::new(1);

        let transfers = robin_hood(&mut swarms, &mut rng, &config);
        assert_eq!(transfers.len(), 2);
        assert!(transfers.iter().all(|t| t.from == SwarmId(2) && t.to == SwarmId(1)));
        // the second draw comes from the pool as it stood after the first
        assert_eq!(transfers[0].worker, make_worker(101));
        assert_eq!(transfers[1].worker, make_worker(105));
        assert_eq!(swarms[&SwarmId(1)].len(), 5);
        assert_eq!(swarms[&SwarmId(2)].len(), 10);
        assert_eq!(&swarms[&SwarmId(1)][3..], &[transfers[0].worker, transfers[1].worker]);
        // one draw for the rich member, one for the poor swarm, per transfer
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn insufficient_excess_leaves_swarm_short() {
        let config = SwarmConfig::default();
        let mut swarms = SwarmMap::new();
        swarms.insert(SwarmId(1), swarm_of(1, 0));
        swarms.insert(SwarmId(2), swarm_of(7, 100));
        let mut rng = SwarmRng::new(9);

        let transfers = robin_hood(&mut swarms, &mut rng, &config);
        assert_eq!(transfers.len(), 2);
        assert_eq!(swarms[&SwarmId(1)].len(), 3);
        assert_eq!(swarms[&SwarmId(2)].len(), config.min_swarm_size);
    }

    #[test]
    fn spreads_over_several_poor_swarms() {
        let config = SwarmConfig::default();
        let mut swarms = SwarmMap::new();
        swarms.insert(SwarmId(1), swarm_of(4, 0));
        swarms.insert(SwarmId(2), swarm_of(3, 100));
        swarms.insert(SwarmId(3), swarm_of(20, 200));
        let mut rng = SwarmRng::new(3);

        let transfers = robin_hood(&mut swarms, &mut rng, &config);
        assert_eq!(transfers.len(), 3);
        assert_eq!(swarms[&SwarmId(1)].len(), 5);
        assert_eq!(swarms[&SwarmId(2)].len(), 5);
        assert_eq!(swarms[&SwarmId(3)].len(), 17);
    }

    #[test]
    fn poor_swarms_listed_smallest_first() {
        let config = SwarmConfig::default();
        let mut swarms = SwarmMap::new();
        swarms.insert(SwarmId(1), swarm_of(4, 0));
        swarms.insert(SwarmId(2), swarm_of(3, 100));
        swarms.insert(SwarmId(3), swarm_of(20, 200));

        let round = calc_robin_hood_round(&swarms, &config);
        assert_eq!(round.poor, vec![SwarmId(2), SwarmId(1)]);
        assert_eq!(round.deficit, 3);

        // equal sizes fall back to id order
        swarms.get_mut(&SwarmId(2)).unwrap().push(make_worker(103));
        let round = calc_robin_hood_round(&swarms, &config);
        assert_eq!(round.poor, vec![SwarmId(1), SwarmId(2)]);
    }

    #[test]
    fn recipient_drawn_in_size_order() {
        let config = SwarmConfig::default();
        let mut swarms = SwarmMap::new();
        swarms.insert(SwarmId(1), swarm_of(4, 0));
        swarms.insert(SwarmId(2), swarm_of(3, 100));
        swarms.insert(SwarmId(3), swarm_of(20, 200));
        let mut rng = SwarmRng::new(1);

        let transfers = robin_hood(&mut swarms, &mut rng, &config);
        let moved: Vec<(WorkerId, SwarmId)> =
            transfers.iter().map(|t| (t.worker, t.to)).collect();
        assert_eq!(
            moved,
            vec![
                (make_worker(202), SwarmId(2)),
                (make_worker(209), SwarmId(1)),
                (make_worker(207), SwarmId(2)),
            ]
        );
        assert!(transfers.iter().all(|t| t.from == SwarmId(3)));
        assert_eq!(rng.draws(), 6);
    }
}
