//! Pilot creation against the store.
//!
//! The flow must already be in [`CreationStep::Creating`] (or on the origin
//! step with an origin chosen, in which case it is advanced). The starting
//! mech is written first, then the pilot that references it. On any store
//! failure the flow drops back to the origin step so the player can retry.

use mechfront_logic::common::{MechId, Timestamp, UserId};
use mechfront_logic::config::GameConfig;
use mechfront_logic::creation::{CreationFlow, CreationStep};
use mechfront_logic::error::ValidationError;
use mechfront_logic::mech::Mech;
use mechfront_logic::origin::{self, NewIds, StartingLoadout};
use mechfront_logic::pilot::Pilot;

use crate::error::Result;
use crate::identity::User;
use crate::ids;
use crate::records;
use crate::store::{Collection, DataStore, Query};

pub fn create_pilot<S: DataStore + ?Sized>(
    store: &mut S,
    flow: &mut CreationFlow,
    user: &User,
    config: &GameConfig,
    now: Timestamp,
) -> Result<StartingLoadout> {
    if flow.step() == CreationStep::SelectOrigin {
        flow.advance()?;
    }
    if flow.step() != CreationStep::Creating {
        return Err(ValidationError::WrongStep {
            action: "create pilot",
            step: flow.step(),
        }
        .into());
    }
    let request = match flow.request() {
        Ok(request) => request,
        Err(e) => {
            flow.fail()?;
            return Err(e.into());
        }
    };

    let loadout = origin::resolve(
        &request,
        NewIds {
            user_id: user.id.clone(),
            pilot_id: ids::pilot_id(now),
            mech_id: ids::mech_id(now),
        },
        config,
    );

    if let Err(e) = persist(store, &loadout) {
        log::error!("pilot creation for {} failed: {}", user.id, e);
        flow.fail()?;
        return Err(e);
    }
    flow.finish()?;

    log::info!(
        "created pilot {} ({}) for {} with {} {}",
        loadout.pilot.name,
        loadout.pilot.id,
        user.id,
        loadout.mech.class,
        loadout.mech.id
    );
    Ok(loadout)
}

fn persist<S: DataStore + ?Sized>(store: &mut S, loadout: &StartingLoadout) -> Result<()> {
    store.create(Collection::Mechs, records::mech_to_record(&loadout.mech)?)?;
    // A failure here leaves the mech behind without an owner record; it is
    // never listed since lookups go through the pilot.
    store.create(Collection::Pilots, records::pilot_to_record(&loadout.pilot)?)?;
    Ok(())
}

/// The pilot owned by `user_id`, if one exists.
pub fn load_pilot<S: DataStore + ?Sized>(store: &S, user_id: &UserId) -> Result<Option<Pilot>> {
    let query = Query::new().eq("userId", user_id.as_str()).limit(1);
    let rows = store.list(Collection::Pilots, &query)?;
    match rows.into_iter().next() {
        Some(record) => Ok(Some(records::pilot_from_record(record)?)),
        None => Ok(None),
    }
}

pub fn load_mech<S: DataStore + ?Sized>(store: &S, mech_id: &MechId) -> Result<Option<Mech>> {
    let query = Query::new().eq("id", mech_id.as_str()).limit(1);
    let rows = store.list(Collection::Mechs, &query)?;
    match rows.into_iter().next() {
        Some(record) => Ok(Some(records::mech_from_record(record)?)),
        None => Ok(None),
    }
}
