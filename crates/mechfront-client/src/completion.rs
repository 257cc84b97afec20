//! Mission completion against the store.
//!
//! Completion is two writes with no transaction around them:
//!
//! 1. Re-read the mission. If the stored copy is already completed, stop
//!    with [`DoubleCompletion`]; otherwise write `isCompleted`/`completedAt`.
//!    The stored flag is the guard: whoever flips it owns the reward.
//! 2. Re-read the pilot, add the tier reward to the stored copy and write
//!    credits/experience. The session's cached pilot is never the base.
//!
//! If step 2 fails, step 1 is not rolled back. The caller gets
//! [`RewardNotGranted`] holding the pending grant and can hand it to
//! [`retry_grant`] without replaying combat.

use mechfront_logic::common::{PilotId, Timestamp};
use mechfront_logic::mission::Mission;
use mechfront_logic::pilot::Pilot;
use mechfront_logic::rewards::{self, DoubleCompletion, Resolution, RewardGrant};

use crate::error::{Error, Result, RewardNotGranted};
use crate::records;
use crate::store::{Collection, DataStore, Query, StoreError};

pub fn apply_completion<S: DataStore + ?Sized>(
    store: &mut S,
    mission: &Mission,
    pilot: &Pilot,
    now: Timestamp,
) -> Result<Resolution> {
    if let Some(completed_at) = mission.completed_at() {
        log::warn!("mission {} already completed at {}; nothing granted", mission.id, completed_at);
        return Err(DoubleCompletion {
            mission_id: mission.id.clone(),
            completed_at,
        }
        .into());
    }

    let stored = reload(store, mission)?;
    let completed = match rewards::mark_completed(&stored, now) {
        Ok(completed) => completed,
        Err(double) => {
            log::warn!("{}; nothing granted", double);
            return Err(double.into());
        }
    };

    if let Err(e) = store.update(
        Collection::Missions,
        completed.id.as_str(),
        records::completion_patch(now),
    ) {
        log::error!("could not mark mission {} completed: {}", completed.id, e);
        return Err(e.into());
    }

    let grant = RewardGrant::for_mission(&completed, &pilot.id);
    match grant_reward(store, &grant) {
        Ok(pilot) => {
            log::info!(
                "mission {} completed; pilot {} +{} credits +{} xp",
                completed.id,
                pilot.id,
                grant.credits,
                grant.experience
            );
            Ok(Resolution {
                mission: completed,
                pilot,
                grant,
            })
        }
        Err(source) => {
            log::error!(
                "mission {} completed but pilot {} was not credited: {}",
                completed.id,
                pilot.id,
                source
            );
            Err(RewardNotGranted {
                mission: completed,
                grant,
                source,
            }
            .into())
        }
    }
}

/// Re-attempt only the pilot credit from a failed completion.
pub fn retry_grant<S: DataStore + ?Sized>(store: &mut S, pending: &RewardNotGranted) -> Result<Pilot> {
    let updated = grant_reward(store, &pending.grant)?;
    log::info!(
        "granted pending reward for mission {} to pilot {}",
        pending.grant.mission_id,
        updated.id
    );
    Ok(updated)
}

fn grant_reward<S: DataStore + ?Sized>(
    store: &mut S,
    grant: &RewardGrant,
) -> std::result::Result<Pilot, StoreError> {
    let stored = reload_pilot(store, &grant.pilot_id)?;
    let updated = grant.applied_to(&stored);
    store.update(
        Collection::Pilots,
        updated.id.as_str(),
        records::wallet_patch(&updated),
    )?;
    Ok(updated)
}

fn reload<S: DataStore + ?Sized>(store: &S, mission: &Mission) -> Result<Mission> {
    let query = Query::new().eq("id", mission.id.as_str()).limit(1);
    let row = store
        .list(Collection::Missions, &query)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            Error::Store(StoreError::NotFound {
                collection: Collection::Missions,
                id: mission.id.to_string(),
            })
        })?;
    Ok(records::mission_from_record(row)?)
}

fn reload_pilot<S: DataStore + ?Sized>(
    store: &S,
    pilot_id: &PilotId,
) -> std::result::Result<Pilot, StoreError> {
    let query = Query::new().eq("id", pilot_id.as_str()).limit(1);
    let row = store
        .list(Collection::Pilots, &query)?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::NotFound {
            collection: Collection::Pilots,
            id: pilot_id.to_string(),
        })?;
    records::pilot_from_record(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ensure_seeded, list_missions};
    use crate::creation::load_pilot;
    use crate::memory::{MemoryStore, StoreOp};
    use mechfront_logic::common::UserId;
    use serde_json::json;
    use mechfront_logic::mission::Difficulty;
    use mechfront_logic::origin::OriginId;
    use mechfront_logic::pilot::{Gender, PilotAttributes};

    fn setup() -> (MemoryStore, Pilot, Vec<Mission>) {
        let pilot = Pilot {
            id: PilotId::new("pilot_1"),
            user_id: UserId::new("user_1"),
            name: "NOVA".into(),
            level: 1,
            experience: 0,
            credits: 0,
            gender: Gender::Female,
            origin_story: OriginId::Engineer,
            attributes: PilotAttributes::default(),
            equipped_mech_id: None,
        };
        let mut store = MemoryStore::new();
        store
            .create(Collection::Pilots, records::pilot_to_record(&pilot).unwrap())
            .unwrap();
        ensure_seeded(&mut store, &pilot.id, Timestamp(100)).unwrap();
        let missions = list_missions(&store, &pilot.id).unwrap();
        (store, pilot, missions)
    }

    fn hard(missions: &[Mission]) -> &Mission {
        missions
            .iter()
            .find(|m| m.difficulty == Difficulty::Hard)
            .unwrap()
    }

    #[test]
    fn test_completion_commits_both_writes() {
        let (mut store, pilot, missions) = setup();
        let resolution = apply_completion(&mut store, hard(&missions), &pilot, Timestamp(500)).unwrap();
        assert_eq!(resolution.pilot.credits, 500);
        assert_eq!(resolution.pilot.experience, 250);

        let stored = load_pilot(&store, &pilot.user_id).unwrap().unwrap();
        assert_eq!((stored.credits, stored.experience), (500, 250));
        let listed = list_missions(&store, &pilot.id).unwrap();
        assert_eq!(hard(&listed).completed_at(), Some(Timestamp(500)));
        assert_eq!(listed.iter().filter(|m| !m.is_completed()).count(), 3);
    }

    #[test]
    fn test_stale_copy_cannot_complete_twice() {
        let (mut store, pilot, missions) = setup();
        let first = apply_completion(&mut store, hard(&missions), &pilot, Timestamp(500)).unwrap();

        // The caller still holds the pre-completion copy of the mission.
        let err = apply_completion(&mut store, hard(&missions), &first.pilot, Timestamp(600))
            .unwrap_err();
        assert!(matches!(err, Error::DoubleCompletion(_)));
        let stored = load_pilot(&store, &pilot.user_id).unwrap().unwrap();
        assert_eq!((stored.credits, stored.experience), (500, 250));
    }

    #[test]
    fn test_failed_mission_write_changes_nothing() {
        let (mut store, pilot, missions) = setup();
        store.fail_next(Collection::Missions, StoreOp::Update);
        let err = apply_completion(&mut store, hard(&missions), &pilot, Timestamp(500)).unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert!(list_missions(&store, &pilot.id)
            .unwrap()
            .iter()
            .all(|m| !m.is_completed()));
    }

    #[test]
    fn test_failed_grant_can_be_retried_alone() {
        let (mut store, pilot, missions) = setup();
        store.fail_next(Collection::Pilots, StoreOp::Update);
        let pending = match apply_completion(&mut store, hard(&missions), &pilot, Timestamp(500)) {
            Err(Error::RewardNotGranted(pending)) => pending,
            other => panic!("expected RewardNotGranted, got {:?}", other),
        };
        assert!(pending.mission.is_completed());
        assert_eq!(pending.grant.credits, 500);
        assert_eq!(load_pilot(&store, &pilot.user_id).unwrap().unwrap().credits, 0);

        let updated = retry_grant(&mut store, &pending).unwrap();
        assert_eq!((updated.credits, updated.experience), (500, 250));
        assert_eq!(load_pilot(&store, &pilot.user_id).unwrap().unwrap().credits, 500);
    }

    #[test]
    fn test_grant_adds_to_the_stored_pilot() {
        let (mut store, pilot, missions) = setup();
        let patch = json!({ "credits": 5000 }).as_object().cloned().unwrap();
        store.update(Collection::Pilots, pilot.id.as_str(), patch).unwrap();

        // `pilot` is the pre-update copy with 0 credits.
        let resolution = apply_completion(&mut store, hard(&missions), &pilot, Timestamp(500)).unwrap();
        assert_eq!(resolution.pilot.credits, 5500);
        let stored = load_pilot(&store, &pilot.user_id).unwrap().unwrap();
        assert_eq!((stored.credits, stored.experience), (5500, 250));
    }

    #[test]
    fn test_retry_adds_to_the_stored_pilot() {
        let (mut store, pilot, missions) = setup();
        store.fail_next(Collection::Pilots, StoreOp::Update);
        let pending = match apply_completion(&mut store, hard(&missions), &pilot, Timestamp(500)) {
            Err(Error::RewardNotGranted(pending)) => pending,
            other => panic!("expected RewardNotGranted, got {:?}", other),
        };
        let patch = json!({ "credits": 40, "experience": 7 }).as_object().cloned().unwrap();
        store.update(Collection::Pilots, pilot.id.as_str(), patch).unwrap();

        let updated = retry_grant(&mut store, &pending).unwrap();
        assert_eq!((updated.credits, updated.experience), (540, 257));
    }

    #[test]
    fn test_missing_pilot_leaves_grant_pending() {
        let (mut store, mut pilot, missions) = setup();
        pilot.id = PilotId::new("pilot_gone");
        let err = apply_completion(&mut store, hard(&missions), &pilot, Timestamp(500)).unwrap_err();
        match err {
            Error::RewardNotGranted(pending) => {
                assert!(matches!(pending.source, StoreError::NotFound { .. }));
                assert_eq!(pending.grant.pilot_id, pilot.id);
            }
            other => panic!("expected RewardNotGranted, got {:?}", other),
        }
    }
}
