//! Pure game logic for MechFront.
//!
//! This crate contains the rules of the mission lifecycle independent of
//! any data store, identity service, clock, or UI. Functions take plain
//! data and return results, which keeps them unit-testable and lets the
//! client crate wire them to whatever backend it runs against.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`common`] | Opaque ids and millisecond timestamps |
//! | [`config`] | Game tunables, builtin JSON, file overrides, validation |
//! | [`creation`] | Character creation wizard gating |
//! | [`error`] | Validation failures |
//! | [`mech`] | Mech classes, stats, baselines |
//! | [`mission`] | Difficulty tiers, starter set, available/completed board |
//! | [`origin`] | Origin catalog and starting loadout resolution |
//! | [`pilot`] | Pilot record and callsign rules |
//! | [`rewards`] | Tier table and completion resolution |
//! | [`sequencer`] | Timed combat narrative with stale-callback invalidation |

pub mod common;
pub mod config;
pub mod creation;
pub mod error;
pub mod mech;
pub mod mission;
pub mod origin;
pub mod pilot;
pub mod rewards;
pub mod sequencer;
