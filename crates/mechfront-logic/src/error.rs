//! Validation failures shared by the creation flow and mission selection.
//!
//! A validation failure is always detected before anything is written, so
//! it is recoverable by the player changing the selection.

use thiserror::Error;

use crate::creation::CreationStep;
use crate::pilot::{NameProblem, MAX_NAME_LEN};

/// A missing or invalid user selection. Never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no gender selected")]
    NoGender,
    #[error("callsign is empty")]
    EmptyName,
    #[error("callsign is {0} characters, limit is {}", MAX_NAME_LEN)]
    NameTooLong(usize),
    #[error("no origin selected")]
    NoOrigin,
    #[error("unknown origin '{0}'")]
    UnknownOrigin(String),
    #[error("cannot {action} while {step:?}")]
    WrongStep {
        action: &'static str,
        step: CreationStep,
    },
    #[error("no mission selected")]
    NoMissionSelected,
    #[error("mission {0} is already completed")]
    MissionAlreadyCompleted(String),
    #[error("mission {0} not found")]
    UnknownMission(String),
}

impl From<NameProblem> for ValidationError {
    fn from(problem: NameProblem) -> Self {
        match problem {
            NameProblem::Empty => ValidationError::EmptyName,
            NameProblem::TooLong(len) => ValidationError::NameTooLong(len),
        }
    }
}
