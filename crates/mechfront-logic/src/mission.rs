//! Missions: difficulty tiers, reward descriptors, the starter set every
//! pilot is seeded with, and the available/completed split.
//!
//! A mission moves from available to completed exactly once. The
//! completion time only exists inside [`MissionStatus::Completed`], so a
//! completed mission without a timestamp cannot be represented.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::{MissionId, PilotId, Timestamp};
use crate::rewards;

// ============================================================================
// DIFFICULTY & REWARDS
// ============================================================================

/// Difficulty tier, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown difficulty '{}'", s))
    }
}

/// Bonus loot advertised on harder missions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Material {
    Materials,
    RareEquipment,
    LegendaryMech,
}

impl Material {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Materials => "Materials",
            Self::RareEquipment => "Rare Equipment",
            Self::LegendaryMech => "Legendary Mech",
        }
    }
}

/// What a mission advertises. Credits and XP always match the tier table
/// the reward resolver pays out from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDescriptor {
    pub credits: u64,
    pub xp: u64,
    #[serde(default)]
    pub material: Option<Material>,
}

impl RewardDescriptor {
    pub fn for_tier(difficulty: Difficulty, material: Option<Material>) -> Self {
        let credits = rewards::credit_reward(difficulty);
        Self {
            credits,
            xp: rewards::xp_reward(credits),
            material,
        }
    }
}

impl fmt::Display for RewardDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Credits, {} XP", self.credits, self.xp)?;
        if let Some(material) = self.material {
            write!(f, ", {}", material.label())?;
        }
        Ok(())
    }
}

// ============================================================================
// MISSION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum MissionStatus {
    Available,
    Completed { at: Timestamp },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: MissionId,
    pub pilot_id: PilotId,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub rewards: RewardDescriptor,
    pub created_at: Timestamp,
    pub status: MissionStatus,
}

impl Mission {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, MissionStatus::Completed { .. })
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        match self.status {
            MissionStatus::Completed { at } => Some(at),
            MissionStatus::Available => None,
        }
    }
}

/// Objectives shown in every mission briefing.
pub const OBJECTIVES: [&str; 3] = [
    "Eliminate all hostile targets",
    "Secure mission area",
    "Return to base safely",
];

// ============================================================================
// STARTER SET
// ============================================================================

/// Blueprint for a seeded mission.
#[derive(Debug, Clone, Copy)]
pub struct MissionTemplate {
    /// Stable key; the seeded id is `<key>_<creation millis>`.
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub difficulty: Difficulty,
    pub material: Option<Material>,
}

impl MissionTemplate {
    pub fn mission_id(&self, created_at: Timestamp) -> MissionId {
        MissionId(format!("{}_{}", self.key, created_at.millis()))
    }

    /// Instantiate for `pilot_id`, available and created at `created_at`.
    pub fn instantiate(&self, pilot_id: &PilotId, created_at: Timestamp) -> Mission {
        Mission {
            id: self.mission_id(created_at),
            pilot_id: pilot_id.clone(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            difficulty: self.difficulty,
            rewards: RewardDescriptor::for_tier(self.difficulty, self.material),
            created_at,
            status: MissionStatus::Available,
        }
    }
}

/// One mission per difficulty tier, in tier order.
pub const STARTER_MISSIONS: [MissionTemplate; 4] = [
    MissionTemplate {
        key: "mission_1",
        title: "Wasteland Patrol",
        description: "Clear hostile mechs from the northern sector",
        difficulty: Difficulty::Easy,
        material: None,
    },
    MissionTemplate {
        key: "mission_2",
        title: "Supply Convoy Escort",
        description: "Protect supply convoy through dangerous territory",
        difficulty: Difficulty::Medium,
        material: Some(Material::Materials),
    },
    MissionTemplate {
        key: "mission_3",
        title: "Faction Stronghold Assault",
        description: "Infiltrate and destroy enemy command center",
        difficulty: Difficulty::Hard,
        material: Some(Material::RareEquipment),
    },
    MissionTemplate {
        key: "mission_4",
        title: "Ancient Titan Awakening",
        description: "Face the legendary mech from the old world",
        difficulty: Difficulty::Extreme,
        material: Some(Material::LegendaryMech),
    },
];

/// Starter missions for `pilot_id`. Each gets a distinct creation time one
/// millisecond apart so listing by creation time keeps tier order.
pub fn starter_set(pilot_id: &PilotId, now: Timestamp) -> Vec<Mission> {
    STARTER_MISSIONS
        .iter()
        .enumerate()
        .map(|(i, template)| template.instantiate(pilot_id, now.offset(i as u64)))
        .collect()
}

// ============================================================================
// BOARD
// ============================================================================

/// Missions split into available and completed, preserving list order.
#[derive(Debug, Clone, Default)]
pub struct MissionBoard<'a> {
    pub available: Vec<&'a Mission>,
    pub completed: Vec<&'a Mission>,
}

impl<'a> MissionBoard<'a> {
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }
}

/// Partition a mission list. Every mission lands in exactly one side.
///
/// ```
/// use mechfront_logic::common::{PilotId, Timestamp};
/// use mechfront_logic::mission::{partition, starter_set};
///
/// let missions = starter_set(&PilotId::new("pilot_1"), Timestamp(0));
/// let board = partition(&missions);
/// assert_eq!(board.available_count(), 4);
/// assert_eq!(board.completed_count(), 0);
/// ```
pub fn partition(missions: &[Mission]) -> MissionBoard<'_> {
    let (completed, available): (Vec<&Mission>, Vec<&Mission>) =
        missions.iter().partition(|m| m.is_completed());
    MissionBoard {
        available,
        completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pilot() -> PilotId {
        PilotId::new("pilot_1")
    }

    #[test]
    fn test_difficulty_ordered_by_severity() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Medium < Difficulty::Hard);
        assert!(Difficulty::Hard < Difficulty::Extreme);
    }

    #[test]
    fn test_starter_set_one_per_tier_in_order() {
        let missions = starter_set(&pilot(), Timestamp(1_000));
        let tiers: Vec<Difficulty> = missions.iter().map(|m| m.difficulty).collect();
        assert_eq!(tiers, Difficulty::ALL.to_vec());

        let credits: Vec<u64> = missions.iter().map(|m| m.rewards.credits).collect();
        assert_eq!(credits, vec![100, 250, 500, 1000]);

        for pair in missions.windows(2) {
            assert!(pair[0].created_at < pair[1].created_at);
        }
        assert!(missions.iter().all(|m| !m.is_completed()));
    }

    #[test]
    fn test_starter_ids_combine_key_and_time() {
        let missions = starter_set(&pilot(), Timestamp(1_700_000_000_000));
        assert_eq!(missions[0].id.as_str(), "mission_1_1700000000000");
        assert_eq!(missions[3].id.as_str(), "mission_4_1700000000003");
    }

    #[test]
    fn test_reward_descriptor_display() {
        let missions = starter_set(&pilot(), Timestamp(0));
        assert_eq!(missions[0].rewards.to_string(), "100 Credits, 50 XP");
        assert_eq!(
            missions[2].rewards.to_string(),
            "500 Credits, 250 XP, Rare Equipment"
        );
    }

    #[test]
    fn test_partition_covers_every_mission_once() {
        let mut missions = starter_set(&pilot(), Timestamp(0));
        missions[1].status = MissionStatus::Completed { at: Timestamp(50) };
        missions[3].status = MissionStatus::Completed { at: Timestamp(60) };

        let board = partition(&missions);
        assert_eq!(board.available_count() + board.completed_count(), missions.len());
        for mission in &missions {
            let in_available = board.available.iter().any(|m| m.id == mission.id);
            let in_completed = board.completed.iter().any(|m| m.id == mission.id);
            assert!(in_available != in_completed);
            assert_eq!(in_completed, mission.is_completed());
        }
        // List order is preserved on both sides.
        assert_eq!(board.available[0].difficulty, Difficulty::Easy);
        assert_eq!(board.available[1].difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_completed_at_only_when_completed() {
        let mut mission = STARTER_MISSIONS[0].instantiate(&pilot(), Timestamp(5));
        assert_eq!(mission.completed_at(), None);
        mission.status = MissionStatus::Completed { at: Timestamp(9) };
        assert_eq!(mission.completed_at(), Some(Timestamp(9)));
    }
}
