//! Mechs: chassis classes, combat stats, and the starting mech a pilot
//! receives at creation.
//!
//! The combat core never mutates a mech. Level and stat growth belong to
//! acquisition and upgrade flows that live outside this crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::{MechId, PilotId};

// ============================================================================
// CLASSES
// ============================================================================

/// Chassis class. Each origin story starts the pilot in one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MechClass {
    /// Front-line brawler.
    Assault,
    /// Repair and utility platform.
    Support,
    /// Long-range precision frame.
    Sniper,
    /// Heavy armor, slow.
    Tank,
}

impl MechClass {
    pub const ALL: [MechClass; 4] = [
        MechClass::Assault,
        MechClass::Support,
        MechClass::Sniper,
        MechClass::Tank,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assault => "assault",
            Self::Support => "support",
            Self::Sniper => "sniper",
            Self::Tank => "tank",
        }
    }
}

impl fmt::Display for MechClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MechClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MechClass::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown mech class '{}'", s))
    }
}

// ============================================================================
// STATS
// ============================================================================

/// Combat stats of a mech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MechStats {
    pub health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

impl MechStats {
    /// Default baseline for a fresh chassis of the given class.
    pub fn baseline(class: MechClass) -> Self {
        match class {
            MechClass::Assault => MechStats {
                health: 100,
                attack: 55,
                defense: 35,
                speed: 40,
            },
            MechClass::Support => MechStats {
                health: 110,
                attack: 35,
                defense: 45,
                speed: 40,
            },
            MechClass::Sniper => MechStats {
                health: 80,
                attack: 60,
                defense: 25,
                speed: 50,
            },
            MechClass::Tank => MechStats {
                health: 150,
                attack: 40,
                defense: 60,
                speed: 25,
            },
        }
    }
}

// ============================================================================
// MECH
// ============================================================================

/// A mech owned by exactly one pilot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mech {
    pub id: MechId,
    pub pilot_id: PilotId,
    pub name: String,
    pub class: MechClass,
    pub level: u32,
    #[serde(flatten)]
    pub stats: MechStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_round_trips_through_str() {
        for class in MechClass::ALL {
            assert_eq!(class.as_str().parse::<MechClass>(), Ok(class));
        }
        assert!("walker".parse::<MechClass>().is_err());
    }

    #[test]
    fn test_tank_is_toughest_and_slowest() {
        let tank = MechStats::baseline(MechClass::Tank);
        for class in MechClass::ALL {
            let stats = MechStats::baseline(class);
            assert!(tank.health >= stats.health);
            assert!(tank.speed <= stats.speed);
        }
    }

    #[test]
    fn test_mech_serializes_flat_stats() {
        let mech = Mech {
            id: MechId::new("mech_1"),
            pilot_id: PilotId::new("pilot_1"),
            name: "MILITARY MK-I".into(),
            class: MechClass::Assault,
            level: 1,
            stats: MechStats::baseline(MechClass::Assault),
        };
        let value = serde_json::to_value(&mech).unwrap();
        assert_eq!(value["class"], "assault");
        assert_eq!(value["pilotId"], "pilot_1");
        assert_eq!(value["attack"], 55);
    }
}
