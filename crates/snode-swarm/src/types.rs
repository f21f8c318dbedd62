//! Swarm identifiers, worker identities and the maps built from them.

use std::collections::BTreeMap;

/// Raw id that legacy snapshots use for the pseudo-swarm of unplaced workers.
pub const UNASSIGNED_SWARM_ID: u64 = u64::MAX;

/// Identifier of a real swarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SwarmId(pub u64);

impl SwarmId {
    /// Create from raw id.
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value.
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SwarmId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SwarmId> for u64 {
    fn from(value: SwarmId) -> Self {
        value.0
    }
}

impl std::fmt::Display for SwarmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A service node's public identity.
///
/// Opaque to the rebalancer: only equality and ordering are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub [u8; 32]);

impl WorkerId {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s, &mut arr)?;
        Ok(Self(arr))
    }
}

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show first 8 hex chars
        write!(f, "{}...", &self.to_hex()[..8])
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for WorkerId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for WorkerId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        WorkerId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Key of a caller-supplied membership entry.
///
/// Pending workers live under `Unassigned` instead of a magic swarm id.
/// `Unassigned` orders after every real swarm, like the raw sentinel does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SwarmKey {
    /// A real swarm.
    Swarm(SwarmId),
    /// Newly registered workers awaiting placement.
    Unassigned,
}

impl SwarmKey {
    /// Decode the legacy numeric encoding.
    pub const fn from_raw(raw: u64) -> Self {
        if raw == UNASSIGNED_SWARM_ID {
            Self::Unassigned
        } else {
            Self::Swarm(SwarmId(raw))
        }
    }

    /// Encode to the legacy numeric form.
    pub const fn to_raw(&self) -> u64 {
        match self {
            Self::Swarm(id) => id.0,
            Self::Unassigned => UNASSIGNED_SWARM_ID,
        }
    }
}

impl From<SwarmId> for SwarmKey {
    fn from(id: SwarmId) -> Self {
        Self::Swarm(id)
    }
}

/// Real swarms, ascending by id. Member order is insertion order.
pub type SwarmMap = BTreeMap<SwarmId, Vec<WorkerId>>;

/// Membership as handed in by the caller, possibly holding pending workers.
pub type SwarmInput = BTreeMap<SwarmKey, Vec<WorkerId>>;

/// Split pending workers out of a caller-supplied map.
pub fn split_unassigned(input: SwarmInput) -> (SwarmMap, Vec<WorkerId>) {
    let mut swarms = SwarmMap::new();
    let mut unassigned = Vec::new();
    for (key, members) in input {
        match key {
            SwarmKey::Swarm(id) => {
                swarms.insert(id, members);
            }
            SwarmKey::Unassigned => unassigned = members,
        }
    }
    (swarms, unassigned)
}

/// Build a caller map from the legacy numeric encoding.
pub fn input_from_raw<I>(raw: I) -> SwarmInput
where
    I: IntoIterator<Item = (u64, Vec<WorkerId>)>,
{
    raw.into_iter()
        .map(|(id, members)| (SwarmKey::from_raw(id), members))
        .collect()
}
