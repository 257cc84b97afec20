//! Mission catalog: seeding and listing a pilot's missions.

use mechfront_logic::common::{PilotId, Timestamp};
use mechfront_logic::mission::{starter_set, Mission};

use crate::error::Result;
use crate::records;
use crate::store::{Collection, DataStore, Query};

/// A pilot's missions, oldest first. The order does not change when a
/// mission is completed.
pub fn list_missions<S: DataStore + ?Sized>(store: &S, pilot_id: &PilotId) -> Result<Vec<Mission>> {
    let query = Query::new()
        .eq("pilotId", pilot_id.as_str())
        .order_asc("createdAt");
    let rows = store.list(Collection::Missions, &query)?;
    let mut missions = Vec::with_capacity(rows.len());
    for row in rows {
        missions.push(records::mission_from_record(row)?);
    }
    Ok(missions)
}

/// Give the pilot the starter set if they have no missions at all.
///
/// Returns the number of missions created, which is zero when the pilot
/// already had any. Safe to call again after a failure.
pub fn ensure_seeded<S: DataStore + ?Sized>(
    store: &mut S,
    pilot_id: &PilotId,
    now: Timestamp,
) -> Result<usize> {
    let probe = Query::new().eq("pilotId", pilot_id.as_str()).limit(1);
    if !store.list(Collection::Missions, &probe)?.is_empty() {
        log::debug!("pilot {} already has missions; not seeding", pilot_id);
        return Ok(0);
    }

    let missions = starter_set(pilot_id, now);
    for (created, mission) in missions.iter().enumerate() {
        let record = records::mission_to_record(mission)?;
        if let Err(e) = store.create(Collection::Missions, record) {
            log::error!(
                "seeding pilot {} stopped after {} of {} missions: {}",
                pilot_id,
                created,
                missions.len(),
                e
            );
            return Err(e.into());
        }
    }
    log::info!("seeded {} starter missions for pilot {}", missions.len(), pilot_id);
    Ok(missions.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{BoolEncoding, MemoryStore, StoreOp};
    use mechfront_logic::mission::{partition, Difficulty};

    fn pilot() -> PilotId {
        PilotId::new("pilot_1")
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let mut store = MemoryStore::new();
        assert_eq!(ensure_seeded(&mut store, &pilot(), Timestamp(100)).unwrap(), 4);
        assert_eq!(ensure_seeded(&mut store, &pilot(), Timestamp(200)).unwrap(), 0);
        assert_eq!(list_missions(&store, &pilot()).unwrap().len(), 4);
    }

    #[test]
    fn test_listing_is_tier_ordered_and_pilot_scoped() {
        let mut store = MemoryStore::new();
        ensure_seeded(&mut store, &PilotId::new("pilot_2"), Timestamp(50)).unwrap();
        ensure_seeded(&mut store, &pilot(), Timestamp(100)).unwrap();

        let missions = list_missions(&store, &pilot()).unwrap();
        let tiers: Vec<Difficulty> = missions.iter().map(|m| m.difficulty).collect();
        assert_eq!(tiers, Difficulty::ALL.to_vec());
        assert!(missions.iter().all(|m| m.pilot_id == pilot()));
    }

    #[test]
    fn test_integer_flags_partition_like_booleans() {
        let mut native = MemoryStore::new();
        let mut integer = MemoryStore::with_encoding(BoolEncoding::Integer);
        ensure_seeded(&mut native, &pilot(), Timestamp(100)).unwrap();
        ensure_seeded(&mut integer, &pilot(), Timestamp(100)).unwrap();

        let a = list_missions(&native, &pilot()).unwrap();
        let b = list_missions(&integer, &pilot()).unwrap();
        assert_eq!(a, b);
        assert_eq!(partition(&b).available_count(), 4);
    }

    #[test]
    fn test_failed_seed_can_be_retried() {
        let mut store = MemoryStore::new();
        store.fail_next(Collection::Missions, StoreOp::List);
        assert!(ensure_seeded(&mut store, &pilot(), Timestamp(100)).is_err());
        assert!(store.is_empty(Collection::Missions));

        store.fail_next(Collection::Missions, StoreOp::Create);
        assert!(ensure_seeded(&mut store, &pilot(), Timestamp(100)).is_err());
        assert!(store.is_empty(Collection::Missions));

        assert_eq!(ensure_seeded(&mut store, &pilot(), Timestamp(100)).unwrap(), 4);
    }
}
