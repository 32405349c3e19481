//! Outpost kinds, their static metadata, and placed outpost records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::map::Position;

// ============================================================================
// OUTPOST KINDS
// ============================================================================

/// The five buildable outpost kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum OutpostKind {
    /// Mission control. Every network is rooted here.
    Command = 0,
    /// Solar array. Output follows the occupied cell's sunlight.
    Power = 1,
    /// Regolith extraction.
    Mining = 2,
    /// Science lab.
    Research = 3,
    /// Relay antenna. Extends comm range of any link it takes part in.
    Comm = 4,
}

/// Static per-kind configuration. Read by the engine, never written.
#[derive(Debug, Clone, PartialEq)]
pub struct OutpostMetadata {
    pub name: &'static str,
    pub description: &'static str,
    /// Base construction cost, before the terrain multiplier.
    pub cost: f64,
    /// Flat draw in kW, independent of terrain.
    pub power_consumption: f64,
    /// Non-zero marks a generator; actual output comes from the cell.
    pub power_generation: f64,
}

impl OutpostKind {
    pub fn all() -> [OutpostKind; 5] {
        [
            Self::Command,
            Self::Power,
            Self::Mining,
            Self::Research,
            Self::Comm,
        ]
    }

    pub fn metadata(&self) -> OutpostMetadata {
        match self {
            Self::Command => OutpostMetadata {
                name: "Command Outpost",
                description: "Coordinates the whole base",
                cost: 100.0,
                power_consumption: 50.0,
                power_generation: 0.0,
            },
            Self::Power => OutpostMetadata {
                name: "Power Outpost",
                description: "Supplies power from solar arrays",
                cost: 80.0,
                power_consumption: 5.0,
                power_generation: 100.0,
            },
            Self::Mining => OutpostMetadata {
                name: "Mining Outpost",
                description: "Extracts local resources",
                cost: 60.0,
                power_consumption: 30.0,
                power_generation: 0.0,
            },
            Self::Research => OutpostMetadata {
                name: "Research Outpost",
                description: "Runs scientific experiments",
                cost: 90.0,
                power_consumption: 40.0,
                power_generation: 0.0,
            },
            Self::Comm => OutpostMetadata {
                name: "Comm Outpost",
                description: "Relays communication between outposts",
                cost: 70.0,
                power_consumption: 20.0,
                power_generation: 0.0,
            },
        }
    }

    pub fn generates_power(&self) -> bool {
        self.metadata().power_generation > 0.0
    }

    /// Relays stretch the comm range of links they participate in.
    pub fn is_relay(&self) -> bool {
        matches!(self, Self::Comm)
    }

    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0 => Some(Self::Command),
            1 => Some(Self::Power),
            2 => Some(Self::Mining),
            3 => Some(Self::Research),
            4 => Some(Self::Comm),
            _ => None,
        }
    }
}

impl fmt::Display for OutpostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.metadata().name)
    }
}

// ============================================================================
// PLACED OUTPOSTS
// ============================================================================

/// Session-unique outpost identifier. Never reissued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutpostId(pub u32);

impl fmt::Display for OutpostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "outpost-{}", self.0)
    }
}

/// Lifecycle stage within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutpostStatus {
    /// Still movable; light evaluation checks these.
    Provisional,
    /// Locked in at turn confirmation.
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outpost {
    pub id: OutpostId,
    pub kind: OutpostKind,
    pub position: Position,
    pub status: OutpostStatus,
}

impl Outpost {
    pub fn metadata(&self) -> OutpostMetadata {
        self.kind.metadata()
    }
}
