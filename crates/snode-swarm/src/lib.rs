//! Service Node Swarm Rebalancing
//!
//! Service nodes replicate a sharded workload in fixed-size groups called
//! swarms. Every participant recomputes swarm membership on its own, so the
//! computation here is a pure function of the current membership, the newly
//! registered nodes and a shared seed. Two implementations that disagree on a
//! single draw split the network.
//!
//! # Phases
//!
//! 1. **Assignment** - each new node joins one of the smallest swarms (the band
//!    up to the lower fill percentile), followed by a spawn check
//! 2. **Robin Hood** - swarms below the viability floor receive members, one at
//!    a time, from swarms above the upper stealing percentile
//! 3. **Spawn** - while the excess above the baseline reaches the threshold, a
//!    new swarm is drained out of the surplus
//! 4. **Decommission** - swarms still below the floor are dissolved and their
//!    members go back through assignment
//!
//! # Determinism
//!
//! All randomness comes from one MT19937-64 stream seeded by the caller,
//! sampled through a pinned rejection scheme (see [`SwarmRng`]). Swarms are
//! visited in ascending id order and members in insertion order; both orders
//! decide which pool index a draw selects.
//!
//! ```
//! use snode_swarm::{rebalance, SwarmConfig, SwarmInput, SwarmKey, WorkerId};
//!
//! let mut input = SwarmInput::new();
//! input.insert(SwarmKey::Unassigned, vec![WorkerId([1; 32])]);
//!
//! let out = rebalance(input, 42, &SwarmConfig::default()).unwrap();
//! assert_eq!(out.swarms.len(), 1);
//! ```

mod assign;
mod config;
mod decommission;
mod error;
mod excess;
mod profile;
mod rebalance;
mod rng;
mod robin_hood;
mod spawn;
mod types;

pub use assign::{assign_workers, fill_band_end};
pub use config::SwarmConfig;
pub use decommission::{decommission, dissolve_poor_swarms, Decommissioned};
pub use error::{Error, Result};
pub use excess::{calc_excess, calc_threshold, remove_from_swarm, ExcessPool, PoolEntry};
pub use profile::{percentile_index, swarm_sizes, SwarmSize};
pub use rebalance::{rebalance, RebalanceReport, Rebalanced};
pub use rng::SwarmRng;
pub use robin_hood::{calc_robin_hood_round, robin_hood, RobinHoodRound, Transfer};
pub use spawn::{ensure_initial_swarm, new_swarm_id, spawn_from_excess};
pub use types::{
    input_from_raw, split_unassigned, SwarmId, SwarmInput, SwarmKey, SwarmMap, WorkerId,
    UNASSIGNED_SWARM_ID,
};
