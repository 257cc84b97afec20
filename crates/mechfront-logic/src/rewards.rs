//! Mission-completion rewards.
//!
//! Credits come from a fixed per-tier table and experience is always half
//! the credit reward. Rewards are pilot-scoped: whether a mech is equipped
//! makes no difference.
//!
//! | Difficulty | Credits | XP |
//! |------------|---------|------|
//! | easy       | 100     | 50   |
//! | medium     | 250     | 125  |
//! | hard       | 500     | 250  |
//! | extreme    | 1000    | 500  |
//!
//! ```
//! use mechfront_logic::mission::Difficulty;
//! use mechfront_logic::rewards::{credit_reward, xp_reward};
//!
//! assert_eq!(credit_reward(Difficulty::Hard), 500);
//! assert_eq!(xp_reward(500), 250);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::{MissionId, PilotId, Timestamp};
use crate::mission::{Difficulty, Mission, MissionStatus};
use crate::pilot::Pilot;

pub fn credit_reward(difficulty: Difficulty) -> u64 {
    match difficulty {
        Difficulty::Easy => 100,
        Difficulty::Medium => 250,
        Difficulty::Hard => 500,
        Difficulty::Extreme => 1000,
    }
}

/// Experience for a credit reward. Integer halving; every tier is even.
pub fn xp_reward(credits: u64) -> u64 {
    credits / 2
}

/// The mission was already completed; nothing may be granted again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mission {mission_id} was already completed at {completed_at}")]
pub struct DoubleCompletion {
    pub mission_id: MissionId,
    pub completed_at: Timestamp,
}

/// Credits and experience owed to a pilot for one completed mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGrant {
    pub pilot_id: PilotId,
    pub mission_id: MissionId,
    pub credits: u64,
    pub experience: u64,
}

impl RewardGrant {
    pub fn for_mission(mission: &Mission, pilot_id: &PilotId) -> Self {
        let credits = credit_reward(mission.difficulty);
        Self {
            pilot_id: pilot_id.clone(),
            mission_id: mission.id.clone(),
            credits,
            experience: xp_reward(credits),
        }
    }

    /// Pilot with this grant added.
    pub fn applied_to(&self, pilot: &Pilot) -> Pilot {
        let mut updated = pilot.clone();
        updated.credit(self.credits, self.experience);
        updated
    }
}

/// Outcome of resolving a completion in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub mission: Mission,
    pub pilot: Pilot,
    pub grant: RewardGrant,
}

/// Mark `mission` completed at `at`. Fails if it already is.
pub fn mark_completed(mission: &Mission, at: Timestamp) -> Result<Mission, DoubleCompletion> {
    if let MissionStatus::Completed { at: completed_at } = mission.status {
        return Err(DoubleCompletion {
            mission_id: mission.id.clone(),
            completed_at,
        });
    }
    let mut updated = mission.clone();
    updated.status = MissionStatus::Completed { at };
    Ok(updated)
}

/// Complete `mission` and pay `pilot`. The completion check runs first,
/// so an already-completed mission never produces a grant.
pub fn resolve_completion(
    mission: &Mission,
    pilot: &Pilot,
    at: Timestamp,
) -> Result<Resolution, DoubleCompletion> {
    let mission = mark_completed(mission, at)?;
    let grant = RewardGrant::for_mission(&mission, &pilot.id);
    let pilot = grant.applied_to(pilot);
    Ok(Resolution {
        mission,
        pilot,
        grant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;
    use crate::mission::starter_set;
    use crate::origin::OriginId;
    use crate::pilot::{Gender, PilotAttributes};

    fn pilot() -> Pilot {
        Pilot {
            id: PilotId::new("pilot_1"),
            user_id: UserId::new("user_1"),
            name: "NOVA".into(),
            level: 1,
            experience: 0,
            credits: 0,
            gender: Gender::Female,
            origin_story: OriginId::Military,
            attributes: PilotAttributes::default(),
            equipped_mech_id: None,
        }
    }

    #[test]
    fn test_tier_table() {
        let credits: Vec<u64> = Difficulty::ALL.iter().map(|d| credit_reward(*d)).collect();
        assert_eq!(credits, vec![100, 250, 500, 1000]);
        for c in credits {
            assert_eq!(xp_reward(c) * 2, c);
        }
    }

    #[test]
    fn test_hard_mission_pays_500_and_250() {
        let missions = starter_set(&PilotId::new("pilot_1"), Timestamp(0));
        let hard = &missions[2];
        let resolution = resolve_completion(hard, &pilot(), Timestamp(42)).unwrap();
        assert_eq!(resolution.pilot.credits, 500);
        assert_eq!(resolution.pilot.experience, 250);
        assert_eq!(resolution.mission.completed_at(), Some(Timestamp(42)));
        assert_eq!(resolution.grant.credits, 500);
    }

    #[test]
    fn test_second_completion_grants_nothing() {
        let missions = starter_set(&PilotId::new("pilot_1"), Timestamp(0));
        let first = resolve_completion(&missions[2], &pilot(), Timestamp(42)).unwrap();
        let err = resolve_completion(&first.mission, &first.pilot, Timestamp(99)).unwrap_err();
        assert_eq!(err.completed_at, Timestamp(42));
        assert_eq!(err.mission_id, missions[2].id);
    }

    #[test]
    fn test_rewards_ignore_equipped_mech() {
        let missions = starter_set(&PilotId::new("pilot_1"), Timestamp(0));
        let mut equipped = pilot();
        equipped.equipped_mech_id = Some(crate::common::MechId::new("mech_1"));
        let a = resolve_completion(&missions[0], &pilot(), Timestamp(1)).unwrap();
        let b = resolve_completion(&missions[0], &equipped, Timestamp(1)).unwrap();
        assert_eq!(a.grant, b.grant);
    }
}
