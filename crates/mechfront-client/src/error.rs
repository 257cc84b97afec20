//! Client-level error type.

use thiserror::Error;

use mechfront_logic::error::ValidationError;
use mechfront_logic::mission::Mission;
use mechfront_logic::rewards::{DoubleCompletion, RewardGrant};

use crate::store::StoreError;

/// The mission was committed as completed but the pilot was not credited.
/// Carries everything needed to retry the grant alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mission {} completed but reward for pilot {} not granted: {source}", .mission.id, .grant.pilot_id)]
pub struct RewardNotGranted {
    pub mission: Mission,
    pub grant: RewardGrant,
    pub source: StoreError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    DoubleCompletion(#[from] DoubleCompletion),
    #[error(transparent)]
    RewardNotGranted(#[from] RewardNotGranted),
    #[error("no user is signed in")]
    NotSignedIn,
    #[error("no pilot is loaded")]
    NoPilot,
}

pub type Result<T> = std::result::Result<T, Error>;
