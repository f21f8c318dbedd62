//! Relative swarm sizes.

use crate::types::{SwarmId, SwarmMap};

/// A swarm and its member count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwarmSize {
    pub swarm_id: SwarmId,
    pub size: usize,
}

/// Swarm sizes ascending by size.
///
/// Ties keep map order (ascending id); percentile indices depend on it.
pub fn swarm_sizes(swarms: &SwarmMap) -> Vec<SwarmSize> {
    let mut sizes: Vec<SwarmSize> = swarms
        .iter()
        .map(|(&swarm_id, members)| SwarmSize {
            swarm_id,
            size: members.len(),
        })
        .collect();
    // sort_by_key is stable
    sizes.sort_by_key(|s| s.size);
    sizes
}

/// Index of `percentile` within a sorted sequence of `count` entries.
///
/// `floor(percentile * (count - 1) / 100)`, or 0 for an empty sequence.
///
/// Only a percentile of at most 100 is guaranteed to land inside the
/// sequence; callers index with `get`. The product saturates.
pub const fn percentile_index(percentile: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    percentile.saturating_mul(count - 1) / 100
}
