//! Combat sequencer: the scripted narrative of a deployed mission.
//!
//! Every deployment plays the same ten events, one step interval apart,
//! followed one more interval later by a completion signal. There is no
//! random outcome: a sequence that is allowed to finish always succeeds.
//!
//! # Scheduling
//!
//! The sequencer never sleeps. [`CombatSequencer::start`] queues one
//! deferred callback per event plus one for completion, each stamped with
//! its due time and the token of the invocation that queued it. The owner
//! calls [`CombatSequencer::advance`] with the current time; due callbacks
//! fire in due order and come back as [`SequenceSignal`]s.
//!
//! Starting a new sequence or cancelling replaces the active token. Queued
//! callbacks from older invocations are dropped when they come due, so a
//! torn-down sequence can never emit or complete.
//!
//! ```
//! use mechfront_logic::common::{PilotId, Timestamp};
//! use mechfront_logic::mission::starter_set;
//! use mechfront_logic::sequencer::{CombatSequencer, SequenceSignal, COMBAT_SEQUENCE};
//!
//! let mission = starter_set(&PilotId::new("pilot_1"), Timestamp(0)).remove(0);
//! let mut sequencer = CombatSequencer::new(1000);
//! sequencer.start(&mission, Timestamp(0)).unwrap();
//!
//! let signals = sequencer.advance(Timestamp(10_000));
//! assert_eq!(signals.len(), COMBAT_SEQUENCE.len() + 1);
//! assert!(matches!(signals.last(), Some(SequenceSignal::Complete { .. })));
//! ```

use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::common::{MissionId, Timestamp};
use crate::config::GameConfig;
use crate::error::ValidationError;
use crate::mission::Mission;

/// The fixed narrative, in emission order.
pub const COMBAT_SEQUENCE: [&str; 10] = [
    "NEURAL LINK ESTABLISHED",
    "MECH SYSTEMS ONLINE",
    "ENEMY CONTACTS DETECTED",
    "ENGAGING HOSTILE TARGETS",
    "WEAPONS SYSTEMS ACTIVATED",
    "TAKING DAMAGE - SHIELDS AT 75%",
    "COUNTER-ATTACK SUCCESSFUL",
    "ENEMY MECH DESTROYED",
    "MISSION OBJECTIVES COMPLETE",
    "RETURNING TO BASE",
];

/// Identifies one `start` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SequenceToken(u64);

impl SequenceToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Returned by [`CombatSequencer::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceHandle {
    pub token: SequenceToken,
    pub mission_id: MissionId,
    pub started_at: Timestamp,
    /// When the completion callback is due.
    pub completes_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceSignal {
    /// Narrative event `index` of `COMBAT_SEQUENCE`.
    Event {
        token: SequenceToken,
        index: usize,
        message: &'static str,
        at: Timestamp,
    },
    /// All events were emitted; the mission travels with the signal so
    /// the completion handler never consults ambient selection state.
    Complete {
        token: SequenceToken,
        mission: Mission,
        at: Timestamp,
    },
}

impl SequenceSignal {
    pub fn token(&self) -> SequenceToken {
        match self {
            Self::Event { token, .. } | Self::Complete { token, .. } => *token,
        }
    }
}

/// Snapshot for the combat overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceProgress {
    pub token: SequenceToken,
    pub mission_id: MissionId,
    pub emitted: usize,
    pub total: usize,
    pub log: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Action {
    Emit(usize),
    Complete,
}

/// A queued callback. Ordered by due time, then by queue order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Deferred {
    due: Timestamp,
    seq: u64,
    token: SequenceToken,
    action: Action,
}

#[derive(Debug, Clone)]
struct ActiveSequence {
    token: SequenceToken,
    mission: Mission,
    log: Vec<&'static str>,
}

/// Runs combat sequences for one pilot. At most one sequence is live.
#[derive(Debug, Clone)]
pub struct CombatSequencer {
    interval_ms: u64,
    next_generation: u64,
    next_seq: u64,
    pending: BinaryHeap<Reverse<Deferred>>,
    active: Option<ActiveSequence>,
    discarded: u64,
}

impl CombatSequencer {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            next_generation: 0,
            next_seq: 0,
            pending: BinaryHeap::new(),
            active: None,
            discarded: 0,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.step_interval_ms)
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Begin a sequence for `mission` at `now`, superseding any live one.
    pub fn start(&mut self, mission: &Mission, now: Timestamp) -> Result<SequenceHandle, ValidationError> {
        if mission.is_completed() {
            return Err(ValidationError::MissionAlreadyCompleted(
                mission.id.to_string(),
            ));
        }

        self.next_generation += 1;
        let token = SequenceToken(self.next_generation);

        for index in 0..COMBAT_SEQUENCE.len() {
            let due = now.offset(self.interval_ms.saturating_mul(index as u64));
            self.schedule(due, token, Action::Emit(index));
        }
        let completes_at = now.offset(
            self.interval_ms
                .saturating_mul(COMBAT_SEQUENCE.len() as u64),
        );
        self.schedule(completes_at, token, Action::Complete);

        self.active = Some(ActiveSequence {
            token,
            mission: mission.clone(),
            log: Vec::with_capacity(COMBAT_SEQUENCE.len()),
        });

        Ok(SequenceHandle {
            token,
            mission_id: mission.id.clone(),
            started_at: now,
            completes_at,
        })
    }

    fn schedule(&mut self, due: Timestamp, token: SequenceToken, action: Action) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Reverse(Deferred {
            due,
            seq,
            token,
            action,
        }));
    }

    /// Tear down the live sequence. Its queued callbacks become stale.
    pub fn cancel(&mut self) -> Option<SequenceToken> {
        self.active.take().map(|a| a.token)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_token(&self) -> Option<SequenceToken> {
        self.active.as_ref().map(|a| a.token)
    }

    pub fn progress(&self) -> Option<SequenceProgress> {
        self.active.as_ref().map(|a| SequenceProgress {
            token: a.token,
            mission_id: a.mission.id.clone(),
            emitted: a.log.len(),
            total: COMBAT_SEQUENCE.len(),
            log: a.log.clone(),
        })
    }

    /// Due time of the next callback that would actually fire.
    pub fn next_due(&mut self) -> Option<Timestamp> {
        self.drop_stale_head();
        self.pending.peek().map(|Reverse(d)| d.due)
    }

    /// Number of stale callbacks dropped so far.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    fn is_live(&self, token: SequenceToken) -> bool {
        self.active.as_ref().is_some_and(|a| a.token == token)
    }

    fn drop_stale_head(&mut self) {
        while let Some(Reverse(head)) = self.pending.peek() {
            if self.is_live(head.token) {
                break;
            }
            self.pending.pop();
            self.discarded += 1;
        }
    }

    /// Fire every callback due at or before `now`, in due order.
    pub fn advance(&mut self, now: Timestamp) -> Vec<SequenceSignal> {
        let mut signals = Vec::new();

        loop {
            self.drop_stale_head();
            let due = match self.pending.peek() {
                Some(Reverse(head)) if head.due <= now => head.due,
                _ => break,
            };
            let Some(Reverse(deferred)) = self.pending.pop() else {
                break;
            };

            match deferred.action {
                Action::Emit(index) => {
                    let message = COMBAT_SEQUENCE[index];
                    if let Some(active) = self.active.as_mut() {
                        active.log.push(message);
                    }
                    signals.push(SequenceSignal::Event {
                        token: deferred.token,
                        index,
                        message,
                        at: due,
                    });
                }
                Action::Complete => {
                    if let Some(active) = self.active.take() {
                        signals.push(SequenceSignal::Complete {
                            token: active.token,
                            mission: active.mission,
                            at: due,
                        });
                    }
                }
            }
        }

        signals
    }
}
