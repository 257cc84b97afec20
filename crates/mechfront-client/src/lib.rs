//! MechFront client services.
//!
//! Wires the pure rules in `mechfront_logic` to a document store, an
//! identity provider, and a clock. Everything that talks to the outside
//! world goes through a trait so the same services run against the
//! in-memory implementations in tests and the simtest harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`store`] | `DataStore` trait, queries, store errors |
//! | [`memory`] | In-memory store with integer-flag emulation and failure injection |
//! | [`identity`] | `IdentityProvider` trait, auth events, in-memory provider |
//! | [`clock`] | `Clock` trait, system and manual clocks |
//! | [`records`] | Domain ↔ record conversion and flag normalization |
//! | [`ids`] | Record id minting |
//! | [`creation`] | Persisting a new pilot and its starting mech |
//! | [`catalog`] | Seeding and listing missions |
//! | [`completion`] | Two-step completion saga and grant retry |
//! | [`session`] | Route-signalling orchestrator |
//! | [`error`] | Client-level error type |

pub mod catalog;
pub mod clock;
pub mod completion;
pub mod creation;
pub mod error;
pub mod identity;
pub mod ids;
pub mod memory;
pub mod records;
pub mod session;
pub mod store;

pub use error::{Error, Result};
pub use session::{Route, Session};
