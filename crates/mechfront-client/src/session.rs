//! Session orchestrator.
//!
//! A [`Session`] owns the collaborators (store, identity, clock) and the
//! player-facing state, and tells the UI which screen to show.
//!
//! # Flow
//!
//! 1. `boot` → `Welcome` (signed out), `CharacterCreation` (no pilot) or `Hub`
//! 2. `create_pilot` → `Hub`
//! 3. `open_mission_control` seeds and lists missions → `MissionControl`
//! 4. `select_mission` + `deploy` start the combat sequence
//! 5. `tick` advances the sequence; its completion signal runs the reward
//!    saga and refreshes the mission list
//!
//! Failures never move the route. The caller shows the error and lets the
//! player retry from where they were. Grants that fail after their mission
//! was committed queue up until `retry_pending_grants` pays them.

use serde::Serialize;
use std::sync::mpsc::Receiver;

use mechfront_logic::common::{MissionId, Timestamp};
use mechfront_logic::config::GameConfig;
use mechfront_logic::creation::CreationFlow;
use mechfront_logic::error::ValidationError;
use mechfront_logic::mech::Mech;
use mechfront_logic::mission::{partition, Mission, MissionBoard};
use mechfront_logic::pilot::Pilot;
use mechfront_logic::rewards::Resolution;
use mechfront_logic::sequencer::{CombatSequencer, SequenceHandle, SequenceProgress, SequenceSignal};

use crate::catalog;
use crate::clock::Clock;
use crate::completion;
use crate::creation;
use crate::error::{Error, Result, RewardNotGranted};
use crate::identity::{AuthEvent, IdentityProvider, User};
use crate::store::DataStore;

/// Screen the UI should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Route {
    Welcome,
    CharacterCreation,
    Hub,
    MissionControl,
}

/// What the hub screen displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubStatus {
    pub pilot: Pilot,
    pub mech: Option<Mech>,
}

/// Result of one `tick`.
#[derive(Debug, Default)]
pub struct Tick {
    /// Every callback delivered, including those before a failed completion.
    pub signals: Vec<SequenceSignal>,
    /// Set when a sequence completed and its reward was granted.
    pub completed: Option<Resolution>,
    /// Set when a sequence completed but the completion saga failed.
    pub completion_error: Option<Error>,
}

pub struct Session<S, I, C> {
    store: S,
    identity: I,
    clock: C,
    config: GameConfig,
    auth: Receiver<AuthEvent>,
    route: Route,
    user: Option<User>,
    pilot: Option<Pilot>,
    mech: Option<Mech>,
    missions: Vec<Mission>,
    selected: Option<MissionId>,
    sequencer: CombatSequencer,
    pending_grants: Vec<RewardNotGranted>,
}

impl<S: DataStore, I: IdentityProvider, C: Clock> Session<S, I, C> {
    pub fn new(store: S, mut identity: I, clock: C, config: GameConfig) -> Self {
        let auth = identity.watch();
        let sequencer = CombatSequencer::from_config(&config);
        Self {
            store,
            identity,
            clock,
            config,
            auth,
            route: Route::Welcome,
            user: None,
            pilot: None,
            mech: None,
            missions: Vec::new(),
            selected: None,
            sequencer,
            pending_grants: Vec::new(),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn pilot(&self) -> Option<&Pilot> {
        self.pilot.as_ref()
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn board(&self) -> MissionBoard<'_> {
        partition(&self.missions)
    }

    pub fn selected_mission(&self) -> Option<&Mission> {
        let id = self.selected.as_ref()?;
        self.missions.iter().find(|m| &m.id == id)
    }

    pub fn progress(&self) -> Option<SequenceProgress> {
        self.sequencer.progress()
    }

    /// When the live sequence next has something to deliver.
    pub fn next_due(&mut self) -> Option<Timestamp> {
        self.sequencer.next_due()
    }

    /// Grants whose mission is committed but whose pilot credit failed,
    /// oldest first.
    pub fn pending_grants(&self) -> &[RewardNotGranted] {
        &self.pending_grants
    }

    pub fn hub_status(&self) -> Option<HubStatus> {
        self.pilot.as_ref().map(|pilot| HubStatus {
            pilot: pilot.clone(),
            mech: self.mech.clone(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn identity_mut(&mut self) -> &mut I {
        &mut self.identity
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    /// Decide the first screen from the signed-in user and their pilot.
    pub fn boot(&mut self) -> Result<Route> {
        let Some(user) = self.identity.current_user() else {
            self.reset();
            self.route = Route::Welcome;
            return Ok(self.route);
        };

        let pilot = creation::load_pilot(&self.store, &user.id)?;
        let mech = match pilot.as_ref().and_then(|p| p.equipped_mech_id.as_ref()) {
            Some(mech_id) => creation::load_mech(&self.store, mech_id)?,
            None => None,
        };

        self.route = if pilot.is_some() {
            Route::Hub
        } else {
            Route::CharacterCreation
        };
        log::info!("session for {} starts at {:?}", user.id, self.route);
        self.user = Some(user);
        self.pilot = pilot;
        self.mech = mech;
        Ok(self.route)
    }

    pub fn create_pilot(&mut self, flow: &mut CreationFlow) -> Result<Route> {
        let user = self.user.clone().ok_or(Error::NotSignedIn)?;
        let now = self.clock.now();
        let loadout = creation::create_pilot(&mut self.store, flow, &user, &self.config, now)?;
        self.pilot = Some(loadout.pilot);
        self.mech = Some(loadout.mech);
        self.route = Route::Hub;
        Ok(self.route)
    }

    /// Seed if needed, load the mission list, and show mission control.
    pub fn open_mission_control(&mut self) -> Result<Route> {
        let pilot_id = self.pilot.as_ref().ok_or(Error::NoPilot)?.id.clone();
        catalog::ensure_seeded(&mut self.store, &pilot_id, self.clock.now())?;
        self.missions = catalog::list_missions(&self.store, &pilot_id)?;
        self.selected = None;
        self.route = Route::MissionControl;
        Ok(self.route)
    }

    /// Re-read the mission list without changing the route.
    pub fn refresh_missions(&mut self) -> Result<&[Mission]> {
        let pilot_id = self.pilot.as_ref().ok_or(Error::NoPilot)?.id.clone();
        self.missions = catalog::list_missions(&self.store, &pilot_id)?;
        Ok(&self.missions)
    }

    /// Tear down any live sequence and go back to the hub.
    pub fn leave_mission_control(&mut self) -> Route {
        if let Some(token) = self.sequencer.cancel() {
            log::debug!("combat sequence {} torn down on leaving", token.generation());
        }
        self.selected = None;
        if self.pilot.is_some() {
            self.route = Route::Hub;
        }
        self.route
    }

    // ========================================================================
    // MISSIONS & COMBAT
    // ========================================================================

    /// Select an available mission. A live sequence for a different
    /// mission is torn down.
    pub fn select_mission(&mut self, id: &MissionId) -> Result<&Mission> {
        let mission = self
            .missions
            .iter()
            .find(|m| &m.id == id)
            .ok_or_else(|| ValidationError::UnknownMission(id.to_string()))?;
        if mission.is_completed() {
            return Err(ValidationError::MissionAlreadyCompleted(id.to_string()).into());
        }

        if self.selected.as_ref() != Some(id) {
            if let Some(token) = self.sequencer.cancel() {
                log::debug!("combat sequence {} torn down on reselect", token.generation());
            }
        }
        self.selected = Some(id.clone());
        Ok(mission)
    }

    /// Start the combat sequence for the selected mission.
    pub fn deploy(&mut self) -> Result<SequenceHandle> {
        let mission = self
            .selected_mission()
            .ok_or(ValidationError::NoMissionSelected)?
            .clone();
        let handle = self.sequencer.start(&mission, self.clock.now())?;
        log::info!(
            "deploying on {} ({}), sequence {} completes at {}",
            mission.title,
            mission.difficulty,
            handle.token.generation(),
            handle.completes_at
        );
        Ok(handle)
    }

    /// Handle auth changes, then deliver every sequence callback that is
    /// due. A completion signal runs the reward saga for the mission it
    /// carries; a saga failure lands in [`Tick::completion_error`] next to
    /// the signals. Only auth handling fails the whole tick.
    pub fn tick(&mut self) -> Result<Tick> {
        self.drain_auth()?;

        let now = self.clock.now();
        let signals = self.sequencer.advance(now);
        let mut tick = Tick::default();

        for signal in &signals {
            match signal {
                SequenceSignal::Event { index, message, .. } => {
                    log::debug!("combat [{}] {}", index + 1, message);
                }
                SequenceSignal::Complete { mission, at, .. } => match self.complete(mission, *at) {
                    Ok(resolution) => tick.completed = Some(resolution),
                    Err(e) => tick.completion_error = Some(e),
                },
            }
        }
        tick.signals = signals;
        Ok(tick)
    }

    fn complete(&mut self, mission: &Mission, at: Timestamp) -> Result<Resolution> {
        let pilot = self.pilot.clone().ok_or(Error::NoPilot)?;
        let outcome = completion::apply_completion(&mut self.store, mission, &pilot, at);
        self.selected = None;

        match outcome {
            Ok(resolution) => {
                self.pilot = Some(resolution.pilot.clone());
                self.sync_missions(&resolution.mission);
                Ok(resolution)
            }
            Err(Error::RewardNotGranted(pending)) => {
                self.sync_missions(&pending.mission);
                self.pending_grants.push(pending.clone());
                Err(Error::RewardNotGranted(pending))
            }
            Err(e) => Err(e),
        }
    }

    /// Re-read the mission list after a committed completion. If the read
    /// fails, the committed copy replaces the cached one instead.
    fn sync_missions(&mut self, completed: &Mission) {
        let refreshed = self.refresh_missions().map(|_| ());
        if let Err(e) = refreshed {
            log::warn!("mission list not refreshed after completing {}: {}", completed.id, e);
            if let Some(cached) = self.missions.iter_mut().find(|m| m.id == completed.id) {
                *cached = completed.clone();
            }
        }
    }

    /// Retry every pending pilot credit, oldest first. Paid grants leave the
    /// queue; the first failure stops the run and keeps itself and the rest
    /// queued. Returns the pilot after the last successful credit, or `None`
    /// when nothing was pending.
    pub fn retry_pending_grants(&mut self) -> Result<Option<Pilot>> {
        let mut latest = None;
        while let Some(pending) = self.pending_grants.first() {
            let updated = completion::retry_grant(&mut self.store, pending)?;
            self.pending_grants.remove(0);
            if self.pilot.as_ref().map(|p| &p.id) == Some(&updated.id) {
                self.pilot = Some(updated.clone());
            }
            latest = Some(updated);
        }
        Ok(latest)
    }

    // ========================================================================
    // AUTH
    // ========================================================================

    fn drain_auth(&mut self) -> Result<()> {
        let events: Vec<AuthEvent> = self.auth.try_iter().collect();
        for event in events {
            match event {
                AuthEvent::SignedOut => {
                    log::info!("signed out; returning to welcome");
                    self.reset();
                    self.route = Route::Welcome;
                }
                AuthEvent::SignedIn(user) => {
                    if self.user.as_ref() != Some(&user) {
                        self.reset();
                        self.boot()?;
                    }
                }
            }
        }
        Ok(())
    }

    fn reset(&mut self) {
        if let Some(token) = self.sequencer.cancel() {
            log::debug!("combat sequence {} torn down on reset", token.generation());
        }
        self.user = None;
        self.pilot = None;
        self.mech = None;
        self.missions.clear();
        self.selected = None;
        if !self.pending_grants.is_empty() {
            log::warn!("dropping {} pending grant(s) on reset", self.pending_grants.len());
            self.pending_grants.clear();
        }
    }
}
