//! Error types for snode-swarm.

use thiserror::Error;

/// Result type for rebalancing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rebalancing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The surplus accounting promised more spawn candidates than exist.
    #[error("excess pool exhausted: collected {collected} of {needed} members for a new swarm")]
    ExcessPoolExhausted { collected: usize, needed: usize },

    /// Policy parameters violate the accounting guarantees.
    #[error("invalid swarm configuration: {0}")]
    InvalidConfig(String),
}
