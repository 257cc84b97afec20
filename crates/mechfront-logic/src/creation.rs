//! Character creation gating.
//!
//! The creation wizard walks through three interactive steps and then a
//! persistence step:
//!
//! 1. Select gender
//! 2. Enter callsign
//! 3. Select origin
//! 4. Creating (records are being written)
//! 5. Done
//!
//! Each interactive step may only be left forward once its selection is
//! present. The UI renders the steps; this module owns the rules.
//!
//! ```
//! use mechfront_logic::creation::{CreationFlow, CreationStep};
//! use mechfront_logic::pilot::Gender;
//!
//! let mut flow = CreationFlow::new();
//! assert!(!flow.can_proceed());
//! flow.select_gender(Gender::Male);
//! assert_eq!(flow.advance().unwrap(), CreationStep::EnterName);
//! ```

use crate::error::ValidationError;
use crate::origin::{CreationRequest, OriginId};
use crate::pilot::{normalize_name, Gender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreationStep {
    SelectGender,
    EnterName,
    SelectOrigin,
    Creating,
    Done,
}

impl CreationStep {
    /// 1-based position for the wizard's progress dots; `None` past the
    /// interactive steps.
    pub fn ordinal(&self) -> Option<u8> {
        match self {
            Self::SelectGender => Some(1),
            Self::EnterName => Some(2),
            Self::SelectOrigin => Some(3),
            Self::Creating | Self::Done => None,
        }
    }
}

/// Wizard state: current step plus the selections made so far.
#[derive(Debug, Clone)]
pub struct CreationFlow {
    step: CreationStep,
    gender: Option<Gender>,
    name: String,
    origin: Option<OriginId>,
}

impl Default for CreationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CreationFlow {
    pub fn new() -> Self {
        Self {
            step: CreationStep::SelectGender,
            gender: None,
            name: String::new(),
            origin: None,
        }
    }

    pub fn step(&self) -> CreationStep {
        self.step
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    /// Raw callsign as typed.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> Option<OriginId> {
        self.origin
    }

    pub fn select_gender(&mut self, gender: Gender) {
        self.gender = Some(gender);
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn select_origin(&mut self, origin: OriginId) {
        self.origin = Some(origin);
    }

    /// Select an origin by catalog id string.
    pub fn select_origin_id(&mut self, id: &str) -> Result<(), ValidationError> {
        let origin = id
            .parse::<OriginId>()
            .map_err(|_| ValidationError::UnknownOrigin(id.to_string()))?;
        self.origin = Some(origin);
        Ok(())
    }

    /// Whether the current step's required selection is present.
    pub fn can_proceed(&self) -> bool {
        self.check_step().is_ok()
    }

    fn check_step(&self) -> Result<(), ValidationError> {
        match self.step {
            CreationStep::SelectGender => self.gender.map(|_| ()).ok_or(ValidationError::NoGender),
            CreationStep::EnterName => {
                if self.name.trim().is_empty() {
                    Err(ValidationError::EmptyName)
                } else {
                    Ok(())
                }
            }
            CreationStep::SelectOrigin => self.origin.map(|_| ()).ok_or(ValidationError::NoOrigin),
            step => Err(ValidationError::WrongStep {
                action: "advance",
                step,
            }),
        }
    }

    /// Move to the next step. Leaving `SelectOrigin` enters `Creating`.
    pub fn advance(&mut self) -> Result<CreationStep, ValidationError> {
        self.check_step()?;
        self.step = match self.step {
            CreationStep::SelectGender => CreationStep::EnterName,
            CreationStep::EnterName => {
                // Length is only enforced once the player commits the name.
                normalize_name(&self.name)?;
                CreationStep::SelectOrigin
            }
            CreationStep::SelectOrigin => CreationStep::Creating,
            step => {
                return Err(ValidationError::WrongStep {
                    action: "advance",
                    step,
                })
            }
        };
        Ok(self.step)
    }

    /// Return to the previous interactive step. No-op on the first step.
    pub fn back(&mut self) -> Result<CreationStep, ValidationError> {
        self.step = match self.step {
            CreationStep::SelectGender | CreationStep::EnterName => CreationStep::SelectGender,
            CreationStep::SelectOrigin => CreationStep::EnterName,
            step => {
                return Err(ValidationError::WrongStep {
                    action: "go back",
                    step,
                })
            }
        };
        Ok(self.step)
    }

    /// The validated request for the persistence step.
    pub fn request(&self) -> Result<CreationRequest, ValidationError> {
        let gender = self.gender.ok_or(ValidationError::NoGender)?;
        let name = normalize_name(&self.name)?;
        let origin = self.origin.ok_or(ValidationError::NoOrigin)?;
        Ok(CreationRequest {
            gender,
            name,
            origin,
        })
    }

    /// Persistence succeeded.
    pub fn finish(&mut self) -> Result<(), ValidationError> {
        self.expect_creating("finish")?;
        self.step = CreationStep::Done;
        Ok(())
    }

    /// Persistence failed; return to the last interactive step.
    pub fn fail(&mut self) -> Result<(), ValidationError> {
        self.expect_creating("fail")?;
        self.step = CreationStep::SelectOrigin;
        Ok(())
    }

    fn expect_creating(&self, action: &'static str) -> Result<(), ValidationError> {
        if self.step == CreationStep::Creating {
            Ok(())
        } else {
            Err(ValidationError::WrongStep {
                action,
                step: self.step,
            })
        }
    }
}
