//! Origin stories and the starting loadout they grant.
//!
//! The catalog is static. Picking an origin decides the starting mech
//! class, a handful of stat bonuses, and (for the corporate heir) a
//! credit endowment.
//!
//! ```
//! use mechfront_logic::origin::{origin, OriginId};
//! use mechfront_logic::mech::MechClass;
//!
//! assert_eq!(origin(OriginId::Noble).bonus.mech_class, MechClass::Tank);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::{MechId, PilotId, UserId};
use crate::config::GameConfig;
use crate::mech::{Mech, MechClass, MechStats};
use crate::pilot::{Gender, Pilot, PilotAttributes};

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginId {
    Military,
    Engineer,
    Scavenger,
    Noble,
}

impl OriginId {
    pub const ALL: [OriginId; 4] = [
        OriginId::Military,
        OriginId::Engineer,
        OriginId::Scavenger,
        OriginId::Noble,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Military => "military",
            Self::Engineer => "engineer",
            Self::Scavenger => "scavenger",
            Self::Noble => "noble",
        }
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OriginId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OriginId::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| format!("unknown origin '{}'", s))
    }
}

/// Attribute an origin bonus applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stat {
    // Mech stats
    Attack,
    Defense,
    Speed,
    // Pilot attributes
    Tech,
    Repair,
    Luck,
    Charisma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDelta {
    pub stat: Stat,
    pub amount: u32,
}

/// Everything an origin grants at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginBonus {
    pub stats: &'static [StatDelta],
    /// Credits on top of the configured starting credits.
    pub credits: u64,
    pub mech_class: MechClass,
}

#[derive(Debug, Clone, Serialize)]
pub struct OriginStory {
    pub id: OriginId,
    pub title: &'static str,
    pub description: &'static str,
    pub bonus: OriginBonus,
    /// Presentation only.
    pub color: &'static str,
}

static ORIGINS: [OriginStory; 4] = [
    OriginStory {
        id: OriginId::Military,
        title: "MILITARY VETERAN",
        description: "Former elite soldier with extensive combat training and tactical expertise.",
        bonus: OriginBonus {
            stats: &[
                StatDelta { stat: Stat::Attack, amount: 10 },
                StatDelta { stat: Stat::Defense, amount: 5 },
            ],
            credits: 0,
            mech_class: MechClass::Assault,
        },
        color: "#FF6B35",
    },
    OriginStory {
        id: OriginId::Engineer,
        title: "TECH ENGINEER",
        description: "Brilliant mechanic who understands mech systems better than anyone.",
        bonus: OriginBonus {
            stats: &[
                StatDelta { stat: Stat::Tech, amount: 15 },
                StatDelta { stat: Stat::Repair, amount: 10 },
            ],
            credits: 0,
            mech_class: MechClass::Support,
        },
        color: "#00D4FF",
    },
    OriginStory {
        id: OriginId::Scavenger,
        title: "WASTELAND SCAVENGER",
        description: "Survivor who learned to adapt and overcome in the harsh post-apocalyptic world.",
        bonus: OriginBonus {
            stats: &[
                StatDelta { stat: Stat::Speed, amount: 10 },
                StatDelta { stat: Stat::Luck, amount: 5 },
            ],
            credits: 0,
            mech_class: MechClass::Sniper,
        },
        color: "#9D4EDD",
    },
    OriginStory {
        id: OriginId::Noble,
        title: "CORPORATE HEIR",
        description: "Born into wealth and privilege, trained in the finest mech academies.",
        bonus: OriginBonus {
            stats: &[StatDelta { stat: Stat::Charisma, amount: 10 }],
            credits: 1000,
            mech_class: MechClass::Tank,
        },
        color: "#FFD700",
    },
];

/// All origin stories in display order.
pub fn origins() -> &'static [OriginStory] {
    &ORIGINS
}

pub fn origin(id: OriginId) -> &'static OriginStory {
    match id {
        OriginId::Military => &ORIGINS[0],
        OriginId::Engineer => &ORIGINS[1],
        OriginId::Scavenger => &ORIGINS[2],
        OriginId::Noble => &ORIGINS[3],
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Validated creation input. Built by [`crate::creation::CreationFlow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    pub gender: Gender,
    /// Already trimmed and uppercased.
    pub name: String,
    pub origin: OriginId,
}

/// A new pilot together with the mech it starts in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartingLoadout {
    pub pilot: Pilot,
    pub mech: Mech,
}

/// Ids the caller minted for the new records.
#[derive(Debug, Clone)]
pub struct NewIds {
    pub user_id: UserId,
    pub pilot_id: PilotId,
    pub mech_id: MechId,
}

/// Build the starting pilot and mech for a creation request.
pub fn resolve(request: &CreationRequest, ids: NewIds, config: &GameConfig) -> StartingLoadout {
    let story = origin(request.origin);

    let mut attributes = PilotAttributes::default();
    let mut stats: MechStats = config.baseline(story.bonus.mech_class);
    for delta in story.bonus.stats {
        let slot = match delta.stat {
            Stat::Attack => &mut stats.attack,
            Stat::Defense => &mut stats.defense,
            Stat::Speed => &mut stats.speed,
            Stat::Tech => &mut attributes.tech,
            Stat::Repair => &mut attributes.repair,
            Stat::Luck => &mut attributes.luck,
            Stat::Charisma => &mut attributes.charisma,
        };
        *slot = slot.saturating_add(delta.amount);
    }

    let mech = Mech {
        id: ids.mech_id.clone(),
        pilot_id: ids.pilot_id.clone(),
        name: format!("{} MK-I", request.origin.as_str().to_uppercase()),
        class: story.bonus.mech_class,
        level: 1,
        stats,
    };

    let pilot = Pilot {
        id: ids.pilot_id,
        user_id: ids.user_id,
        name: request.name.clone(),
        level: 1,
        experience: 0,
        credits: config.starting_credits.saturating_add(story.bonus.credits),
        gender: request.gender,
        origin_story: request.origin,
        attributes,
        equipped_mech_id: Some(ids.mech_id),
    };

    StartingLoadout { pilot, mech }
}
