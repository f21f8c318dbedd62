//! Swarm sizing policy.
//!
//! These knobs are network-wide policy: every participant must run with the
//! same values or membership diverges.

use crate::error::{Error, Result};

/// Policy parameters for rebalancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SwarmConfig {
    /// Viability floor. Swarms below it are relieved or dissolved.
    pub min_swarm_size: usize,
    /// Size above which a swarm counts towards the excess.
    pub excess_base: usize,
    /// Size of a freshly spawned swarm.
    pub new_swarm_size: usize,
    /// Surplus each existing swarm keeps before a spawn is allowed.
    pub ideal_swarm_margin: usize,
    /// Percentile bounding the swarms eligible for new workers.
    pub fill_lower_percentile: usize,
    /// Percentile above which swarms give members to poor swarms.
    pub steal_upper_percentile: usize,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            min_swarm_size: 5,
            excess_base: 5,
            new_swarm_size: 7,
            ideal_swarm_margin: 2,
            fill_lower_percentile: 25,
            steal_upper_percentile: 75,
        }
    }
}

impl SwarmConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            min_swarm_size: env_or("SNODE_MIN_SWARM_SIZE", defaults.min_swarm_size)?,
            excess_base: env_or("SNODE_EXCESS_BASE", defaults.excess_base)?,
            new_swarm_size: env_or("SNODE_NEW_SWARM_SIZE", defaults.new_swarm_size)?,
            ideal_swarm_margin: env_or("SNODE_IDEAL_SWARM_MARGIN", defaults.ideal_swarm_margin)?,
            fill_lower_percentile: env_or(
                "SNODE_FILL_LOWER_PERCENTILE",
                defaults.fill_lower_percentile,
            )?,
            steal_upper_percentile: env_or(
                "SNODE_STEAL_UPPER_PERCENTILE",
                defaults.steal_upper_percentile,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the surplus accounting can hold under these values.
    ///
    /// Spawning relies on every unit of excess being backed by a member of a
    /// swarm that sits above the viability floor, so the baseline may not be
    /// lower than the floor.
    pub fn validate(&self) -> Result<()> {
        if self.min_swarm_size == 0 {
            return Err(Error::InvalidConfig("min_swarm_size must be positive".into()));
        }
        if self.new_swarm_size == 0 {
            return Err(Error::InvalidConfig("new_swarm_size must be positive".into()));
        }
        if self.new_swarm_size < self.min_swarm_size {
            return Err(Error::InvalidConfig(format!(
                "new_swarm_size ({}) is below min_swarm_size ({})",
                self.new_swarm_size, self.min_swarm_size
            )));
        }
        if self.excess_base < self.min_swarm_size {
            return Err(Error::InvalidConfig(format!(
                "excess_base ({}) is below min_swarm_size ({})",
                self.excess_base, self.min_swarm_size
            )));
        }
        for (name, value) in [
            ("fill_lower_percentile", self.fill_lower_percentile),
            ("steal_upper_percentile", self.steal_upper_percentile),
        ] {
            if value > 100 {
                return Err(Error::InvalidConfig(format!("{name} ({value}) exceeds 100")));
            }
        }
        Ok(())
    }
}

fn env_or(key: &str, default: usize) -> Result<usize> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::InvalidConfig(format!("{key}={raw:?}: {e}"))),
        Err(_) => Ok(default),
    }
}
