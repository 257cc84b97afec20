//! Integration tests for the full mission lifecycle.
//!
//! Exercises: sign-in → CharacterCreation → Hub → MissionControl
//! → deploy → combat sequence → completion → rewards
//!
//! Everything runs against the in-memory store and a manual clock.

use mechfront_client::clock::{Clock, ManualClock};
use mechfront_client::identity::MemoryIdentity;
use mechfront_client::memory::{BoolEncoding, MemoryStore, StoreOp};
use mechfront_client::store::{Collection, DataStore};
use mechfront_client::{Error, Route, Session};
use mechfront_logic::common::{MissionId, Timestamp};
use mechfront_logic::config::GameConfig;
use mechfront_logic::creation::CreationFlow;
use mechfront_logic::mission::Difficulty;
use mechfront_logic::origin::OriginId;
use mechfront_logic::pilot::Gender;
use mechfront_logic::rewards::Resolution;
use mechfront_logic::sequencer::{SequenceSignal, COMBAT_SEQUENCE};
use serde_json::json;

// ── Helpers ────────────────────────────────────────────────────────────

type TestSession<'c> = Session<MemoryStore, MemoryIdentity, &'c ManualClock>;

fn engineer_flow() -> CreationFlow {
    let mut flow = CreationFlow::new();
    flow.select_gender(Gender::Female);
    flow.advance().unwrap();
    flow.set_name("Vega");
    flow.advance().unwrap();
    flow.select_origin(OriginId::Engineer);
    flow
}

/// Signed-in session with a fresh pilot, sitting in mission control.
fn in_mission_control(store: MemoryStore, clock: &ManualClock) -> TestSession<'_> {
    let mut session = Session::new(
        store,
        MemoryIdentity::signed_in("user_1"),
        clock,
        GameConfig::builtin(),
    );
    assert_eq!(session.boot().unwrap(), Route::CharacterCreation);
    assert_eq!(session.create_pilot(&mut engineer_flow()).unwrap(), Route::Hub);
    assert_eq!(session.open_mission_control().unwrap(), Route::MissionControl);
    session
}

fn mission_id(session: &TestSession<'_>, difficulty: Difficulty) -> MissionId {
    session
        .missions()
        .iter()
        .find(|m| m.difficulty == difficulty)
        .map(|m| m.id.clone())
        .unwrap()
}

/// Jump the clock from one due callback to the next until nothing is due.
/// Returns every signal delivered and the completion, if one happened.
fn run_to_idle(
    session: &mut TestSession<'_>,
    clock: &ManualClock,
) -> (Vec<SequenceSignal>, Option<Resolution>) {
    let mut signals = Vec::new();
    let mut completed = None;
    while let Some(due) = session.next_due() {
        clock.set(due);
        let tick = session.tick().unwrap();
        assert!(tick.completion_error.is_none(), "{:?}", tick.completion_error);
        signals.extend(tick.signals);
        if tick.completed.is_some() {
            completed = tick.completed;
        }
    }
    (signals, completed)
}

fn event_messages(signals: &[SequenceSignal]) -> Vec<&'static str> {
    signals
        .iter()
        .filter_map(|s| match s {
            SequenceSignal::Event { message, .. } => Some(*message),
            SequenceSignal::Complete { .. } => None,
        })
        .collect()
}

// ── Catalog ────────────────────────────────────────────────────────────

#[test]
fn seeding_twice_leaves_four_missions() {
    let clock = ManualClock::new(Timestamp(1_700_000_000_000));
    let mut session = in_mission_control(MemoryStore::new(), &clock);
    clock.advance(5_000);
    session.open_mission_control().unwrap();

    assert_eq!(session.missions().len(), 4);
    assert_eq!(session.store().len(Collection::Missions), 4);

    let credits: Vec<u64> = session.missions().iter().map(|m| m.rewards.credits).collect();
    assert_eq!(credits, vec![100, 250, 500, 1000]);
    assert_eq!(session.board().available_count(), 4);
}

// ── Scenario ───────────────────────────────────────────────────────────

#[test]
fn completing_hard_mission_pays_500_and_250() {
    let clock = ManualClock::new(Timestamp(1_700_000_000_000));
    let mut session = in_mission_control(MemoryStore::new(), &clock);
    let before = session.pilot().unwrap().clone();
    assert_eq!((before.credits, before.experience), (0, 0));

    let hard = mission_id(&session, Difficulty::Hard);
    session.select_mission(&hard).unwrap();
    let handle = session.deploy().unwrap();

    let (signals, completed) = run_to_idle(&mut session, &clock);
    assert_eq!(event_messages(&signals), COMBAT_SEQUENCE.to_vec());
    assert!(matches!(signals.last(), Some(SequenceSignal::Complete { .. })));
    assert_eq!(clock.now(), handle.completes_at);

    let resolution = completed.unwrap();
    assert_eq!(resolution.mission.id, hard);
    let pilot = session.pilot().unwrap();
    assert_eq!((pilot.credits, pilot.experience), (500, 250));

    let board = session.board();
    assert_eq!(board.completed_count(), 1);
    assert_eq!(board.completed[0].id, hard);
    assert_eq!(board.available_count(), 3);
    assert!(board.available.iter().all(|m| m.difficulty != Difficulty::Hard));
}

#[test]
fn completed_mission_cannot_be_redeployed() {
    let clock = ManualClock::new(Timestamp(10_000));
    let mut session = in_mission_control(MemoryStore::new(), &clock);
    let easy = mission_id(&session, Difficulty::Easy);
    session.select_mission(&easy).unwrap();
    session.deploy().unwrap();
    run_to_idle(&mut session, &clock);

    let err = session.select_mission(&easy).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(session.pilot().unwrap().credits, 100);
}

#[test]
fn integer_flags_behave_like_booleans() {
    let clock = ManualClock::new(Timestamp(10_000));
    let mut session = in_mission_control(MemoryStore::with_encoding(BoolEncoding::Integer), &clock);
    let medium = mission_id(&session, Difficulty::Medium);
    session.select_mission(&medium).unwrap();
    session.deploy().unwrap();
    run_to_idle(&mut session, &clock);

    let raw = session.store().get(Collection::Missions, medium.as_str()).unwrap();
    assert_eq!(raw["isCompleted"], 1);

    let board = session.board();
    assert_eq!(board.completed_count(), 1);
    assert_eq!(board.available_count(), 3);
    assert_eq!(session.pilot().unwrap().experience, 125);
}

// ── Sequencer supersession ─────────────────────────────────────────────

#[test]
fn reselecting_mid_combat_drops_the_old_sequence() {
    let clock = ManualClock::new(Timestamp(10_000));
    let mut session = in_mission_control(MemoryStore::new(), &clock);
    let easy = mission_id(&session, Difficulty::Easy);
    let extreme = mission_id(&session, Difficulty::Extreme);

    session.select_mission(&easy).unwrap();
    let first = session.deploy().unwrap();
    clock.advance(2_500);
    let partial = session.tick().unwrap();
    assert_eq!(event_messages(&partial.signals).len(), 3);

    session.select_mission(&extreme).unwrap();
    let second = session.deploy().unwrap();
    assert_ne!(first.token, second.token);

    let (signals, completed) = run_to_idle(&mut session, &clock);
    assert!(signals.iter().all(|s| s.token() == second.token));
    assert_eq!(event_messages(&signals), COMBAT_SEQUENCE.to_vec());

    assert_eq!(completed.unwrap().mission.id, extreme);
    let pilot = session.pilot().unwrap();
    assert_eq!((pilot.credits, pilot.experience), (1000, 500));
    assert!(!session
        .missions()
        .iter()
        .find(|m| m.id == easy)
        .unwrap()
        .is_completed());
}

// ── Partial failure ────────────────────────────────────────────────────

#[test]
fn failed_grant_is_retried_without_replaying_combat() {
    let clock = ManualClock::new(Timestamp(10_000));
    let mut session = in_mission_control(MemoryStore::new(), &clock);
    let hard = mission_id(&session, Difficulty::Hard);
    session.select_mission(&hard).unwrap();
    session.deploy().unwrap();

    // Deliver everything but the completion.
    for _ in 0..COMBAT_SEQUENCE.len() {
        let due = session.next_due().unwrap();
        clock.set(due);
        session.tick().unwrap();
    }
    session.store_mut().fail_next(Collection::Pilots, StoreOp::Update);
    let due = session.next_due().unwrap();
    clock.set(due);
    let tick = session.tick().unwrap();
    assert!(matches!(tick.completion_error, Some(Error::RewardNotGranted(_))));
    assert!(matches!(tick.signals.last(), Some(SequenceSignal::Complete { .. })));

    // Mission is committed, pilot is not yet paid.
    assert_eq!(session.board().completed_count(), 1);
    assert_eq!(session.pilot().unwrap().credits, 0);
    assert_eq!(session.pending_grants().len(), 1);
    assert!(session.next_due().is_none());

    let pilot = session.retry_pending_grants().unwrap().unwrap();
    assert_eq!((pilot.credits, pilot.experience), (500, 250));
    assert!(session.pending_grants().is_empty());
    assert_eq!(session.retry_pending_grants().unwrap(), None);
}

#[test]
fn two_failed_grants_are_both_paid_on_retry() {
    let clock = ManualClock::new(Timestamp(10_000));
    let mut session = in_mission_control(MemoryStore::new(), &clock);

    for difficulty in [Difficulty::Easy, Difficulty::Medium] {
        let id = mission_id(&session, difficulty);
        session.select_mission(&id).unwrap();
        session.deploy().unwrap();
        session.store_mut().fail_next(Collection::Pilots, StoreOp::Update);
        clock.advance(60_000);
        let tick = session.tick().unwrap();
        assert!(matches!(tick.completion_error, Some(Error::RewardNotGranted(_))));
    }
    assert_eq!(session.pending_grants().len(), 2);
    assert_eq!(session.board().completed_count(), 2);

    let pilot = session.retry_pending_grants().unwrap().unwrap();
    assert_eq!((pilot.credits, pilot.experience), (350, 175));
    assert!(session.pending_grants().is_empty());

    let stored = session
        .store()
        .get(Collection::Pilots, pilot.id.as_str())
        .unwrap();
    assert_eq!(stored["credits"], 350);
    assert_eq!(stored["experience"], 175);
}

// ── External writes ────────────────────────────────────────────────────

#[test]
fn reward_adds_to_credits_changed_outside_the_session() {
    let clock = ManualClock::new(Timestamp(10_000));
    let mut session = in_mission_control(MemoryStore::new(), &clock);
    let pilot_id = session.pilot().unwrap().id.clone();

    // Another device credits the pilot; this session's copy still says 0.
    let patch = json!({ "credits": 5000 }).as_object().cloned().unwrap();
    session
        .store_mut()
        .update(Collection::Pilots, pilot_id.as_str(), patch)
        .unwrap();
    assert_eq!(session.pilot().unwrap().credits, 0);

    let hard = mission_id(&session, Difficulty::Hard);
    session.select_mission(&hard).unwrap();
    session.deploy().unwrap();
    run_to_idle(&mut session, &clock);

    let stored = session.store().get(Collection::Pilots, pilot_id.as_str()).unwrap();
    assert_eq!(stored["credits"], 5500);
    assert_eq!(session.pilot().unwrap().credits, 5500);
}
