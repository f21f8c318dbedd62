//! JSON snapshots of swarm membership.
//!
//! ```json
//! {
//!   "swarms": { "17": ["<64 hex chars>", "..."] },
//!   "unassigned": ["<64 hex chars>"]
//! }
//! ```
//!
//! Legacy snapshots that store pending workers under swarm id
//! `18446744073709551615` are accepted and normalised.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use snode_swarm::{
    input_from_raw, RebalanceReport, SwarmConfig, SwarmInput, SwarmKey, SwarmMap, WorkerId,
};

/// Swarm membership as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Swarms keyed by raw id.
    #[serde(default)]
    pub swarms: BTreeMap<u64, Vec<WorkerId>>,
    /// Registered workers not yet placed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unassigned: Vec<WorkerId>,
}

impl Snapshot {
    /// Read a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("parsing snapshot {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Convert to rebalancer input, folding any legacy sentinel entry into
    /// the unassigned list.
    pub fn into_input(self) -> SwarmInput {
        let mut input = input_from_raw(self.swarms);
        if !self.unassigned.is_empty() {
            input
                .entry(SwarmKey::Unassigned)
                .or_default()
                .extend(self.unassigned);
        }
        input
    }

    pub fn from_swarms(swarms: &SwarmMap) -> Self {
        Self {
            swarms: swarms
                .iter()
                .map(|(id, members)| (id.value(), members.clone()))
                .collect(),
            unassigned: Vec::new(),
        }
    }
}

/// Output of the `rebalance` command.
#[derive(Debug, Serialize)]
pub struct RebalanceOutput {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RebalanceReport>,
}

/// Load policy from a JSON file, or from the environment when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<SwarmConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<SwarmConfig>(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SwarmConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}
