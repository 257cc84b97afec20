//! Conversion between domain types and store records.
//!
//! Pilots and mechs map one-to-one onto their serde representation. Missions
//! need a row type: the store keeps a flat `isCompleted` flag plus an
//! optional `completedAt`, while the domain type folds both into
//! [`MissionStatus`]. The flag arrives in whatever shape the backend chose
//! (bool, `0`/`1`, or their string forms) and is normalized here so nothing
//! past this module ever sees a non-boolean.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use mechfront_logic::common::{MissionId, PilotId, Timestamp};
use mechfront_logic::mech::Mech;
use mechfront_logic::mission::{Difficulty, Mission, MissionStatus, RewardDescriptor};
use mechfront_logic::pilot::Pilot;

use crate::store::{record_id, Collection, Record, StoreError};

/// Stored shape of a mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionRow {
    pub id: MissionId,
    pub pilot_id: PilotId,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub rewards: RewardDescriptor,
    #[serde(default, deserialize_with = "flag")]
    pub is_completed: bool,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

/// Accept `true`/`false`, any number (non-zero is true), and the strings
/// `"0"`, `"1"`, `"true"`, `"false"`. Null reads as false.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Null => Ok(false),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|x| x != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            other => Err(D::Error::custom(format!("not a flag: '{}'", other))),
        },
        other => Err(D::Error::custom(format!("not a flag: {}", other))),
    }
}

impl From<&Mission> for MissionRow {
    fn from(mission: &Mission) -> Self {
        Self {
            id: mission.id.clone(),
            pilot_id: mission.pilot_id.clone(),
            title: mission.title.clone(),
            description: mission.description.clone(),
            difficulty: mission.difficulty,
            rewards: mission.rewards,
            is_completed: mission.is_completed(),
            created_at: mission.created_at,
            completed_at: mission.completed_at(),
        }
    }
}

impl MissionRow {
    pub fn into_mission(self) -> Result<Mission, StoreError> {
        let status = match (self.is_completed, self.completed_at) {
            (true, Some(at)) => MissionStatus::Completed { at },
            (true, None) => {
                return Err(StoreError::Malformed {
                    collection: Collection::Missions,
                    id: self.id.to_string(),
                    reason: "completed without completedAt".to_string(),
                })
            }
            (false, Some(at)) => {
                log::warn!(
                    "mission {} is not completed but carries completedAt {}; ignoring it",
                    self.id,
                    at
                );
                MissionStatus::Available
            }
            (false, None) => MissionStatus::Available,
        };
        Ok(Mission {
            id: self.id,
            pilot_id: self.pilot_id,
            title: self.title,
            description: self.description,
            difficulty: self.difficulty,
            rewards: self.rewards,
            created_at: self.created_at,
            status,
        })
    }
}

// ============================================================================
// ENCODE / DECODE
// ============================================================================

fn to_record<T: Serialize>(collection: Collection, id: &str, value: &T) -> Result<Record, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::Malformed {
            collection,
            id: id.to_string(),
            reason: "did not serialize to an object".to_string(),
        }),
        Err(e) => Err(StoreError::Malformed {
            collection,
            id: id.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn from_record<T: DeserializeOwned>(collection: Collection, record: Record) -> Result<T, StoreError> {
    let id = record_id(&record).unwrap_or("<no id>").to_string();
    serde_json::from_value(Value::Object(record)).map_err(|e| StoreError::Malformed {
        collection,
        id,
        reason: e.to_string(),
    })
}

pub fn pilot_to_record(pilot: &Pilot) -> Result<Record, StoreError> {
    to_record(Collection::Pilots, pilot.id.as_str(), pilot)
}

pub fn pilot_from_record(record: Record) -> Result<Pilot, StoreError> {
    from_record(Collection::Pilots, record)
}

pub fn mech_to_record(mech: &Mech) -> Result<Record, StoreError> {
    to_record(Collection::Mechs, mech.id.as_str(), mech)
}

pub fn mech_from_record(record: Record) -> Result<Mech, StoreError> {
    from_record(Collection::Mechs, record)
}

pub fn mission_to_record(mission: &Mission) -> Result<Record, StoreError> {
    to_record(Collection::Missions, mission.id.as_str(), &MissionRow::from(mission))
}

pub fn mission_from_record(record: Record) -> Result<Mission, StoreError> {
    from_record::<MissionRow>(Collection::Missions, record)?.into_mission()
}

/// Patch that marks a mission completed at `at`.
pub fn completion_patch(at: Timestamp) -> Record {
    let mut patch = Record::new();
    patch.insert("isCompleted".to_string(), Value::Bool(true));
    patch.insert("completedAt".to_string(), Value::from(at.millis()));
    patch
}

/// Patch carrying a pilot's new credit and experience totals.
pub fn wallet_patch(pilot: &Pilot) -> Record {
    let mut patch = Record::new();
    patch.insert("credits".to_string(), Value::from(pilot.credits));
    patch.insert("experience".to_string(), Value::from(pilot.experience));
    patch
}
