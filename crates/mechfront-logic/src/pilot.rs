//! Pilots: the player's persistent character.
//!
//! A pilot is created once when the creation flow finishes and is
//! afterwards only touched by reward grants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::{MechId, PilotId, UserId};

/// Longest accepted callsign, counted in characters after trimming.
pub const MAX_NAME_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

/// Non-combat pilot attributes granted by the origin story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PilotAttributes {
    pub tech: u32,
    pub repair: u32,
    pub luck: u32,
    pub charisma: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pilot {
    pub id: PilotId,
    /// Identity-provider user that owns this pilot.
    pub user_id: UserId,
    /// Uppercase callsign.
    pub name: String,
    pub level: u32,
    pub experience: u64,
    pub credits: u64,
    pub gender: Gender,
    pub origin_story: crate::origin::OriginId,
    #[serde(default)]
    pub attributes: PilotAttributes,
    #[serde(default)]
    pub equipped_mech_id: Option<MechId>,
}

impl Pilot {
    /// Add a reward to the running totals. Experience never decreases.
    pub fn credit(&mut self, credits: u64, experience: u64) {
        self.credits = self.credits.saturating_add(credits);
        self.experience = self.experience.saturating_add(experience);
    }
}

/// Why a callsign was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameProblem {
    Empty,
    TooLong(usize),
}

/// Trim and uppercase a callsign, rejecting empty or over-long input.
///
/// ```
/// use mechfront_logic::pilot::normalize_name;
///
/// assert_eq!(normalize_name("  nova ").unwrap(), "NOVA");
/// assert!(normalize_name("   ").is_err());
/// ```
pub fn normalize_name(raw: &str) -> Result<String, NameProblem> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(NameProblem::Empty);
    }
    if len > MAX_NAME_LEN {
        return Err(NameProblem::TooLong(len));
    }
    Ok(trimmed.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_uppercases_and_trims() {
        assert_eq!(normalize_name("commander nova").unwrap(), "COMMANDER NOVA");
        assert_eq!(normalize_name("\tace\n").unwrap(), "ACE");
    }

    #[test]
    fn test_normalize_name_limits() {
        assert_eq!(normalize_name(""), Err(NameProblem::Empty));
        assert!(normalize_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
        assert_eq!(
            normalize_name(&"x".repeat(MAX_NAME_LEN + 1)),
            Err(NameProblem::TooLong(MAX_NAME_LEN + 1))
        );
        // Padding does not count toward the limit.
        let padded = format!("  {}  ", "y".repeat(MAX_NAME_LEN));
        assert!(normalize_name(&padded).is_ok());
    }

    #[test]
    fn test_credit_accumulates() {
        let mut pilot = Pilot {
            id: PilotId::new("p"),
            user_id: UserId::new("u"),
            name: "ACE".into(),
            level: 1,
            experience: 10,
            credits: 20,
            gender: Gender::Female,
            origin_story: crate::origin::OriginId::Scavenger,
            attributes: PilotAttributes::default(),
            equipped_mech_id: None,
        };
        pilot.credit(500, 250);
        assert_eq!(pilot.credits, 520);
        assert_eq!(pilot.experience, 260);
    }
}
