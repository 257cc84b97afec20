//! MechFront Headless Lifecycle Harness
//!
//! Validates game rules and client services against the in-memory store.
//! Runs entirely in-process with a manual clock: no backend, no UI.
//!
//! Usage:
//!   cargo run -p mechfront-simtest
//!   cargo run -p mechfront-simtest -- --verbose
//!   cargo run -p mechfront-simtest -- --config path/to/game_config.json

use std::path::PathBuf;

use mechfront_client::clock::ManualClock;
use mechfront_client::identity::MemoryIdentity;
use mechfront_client::memory::{BoolEncoding, MemoryStore, StoreOp};
use mechfront_client::store::Collection;
use mechfront_client::{Error, Route, Session};
use mechfront_logic::common::{MechId, MissionId, PilotId, Timestamp, UserId};
use mechfront_logic::config::{validate_config, GameConfig};
use mechfront_logic::creation::{CreationFlow, CreationStep};
use mechfront_logic::error::ValidationError;
use mechfront_logic::mech::MechClass;
use mechfront_logic::mission::Difficulty;
use mechfront_logic::origin::{self, NewIds, OriginId};
use mechfront_logic::pilot::Gender;
use mechfront_logic::rewards::credit_reward;
use mechfront_logic::sequencer::{CombatSequencer, SequenceSignal, COMBAT_SEQUENCE};

type SimSession<'c> = Session<MemoryStore, MemoryIdentity, &'c ManualClock>;

const START: Timestamp = Timestamp(1_700_000_000_000);

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

struct Args {
    verbose: bool,
    config: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args {
        verbose: false,
        config: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" => args.verbose = true,
            "--config" => args.config = iter.next().map(PathBuf::from),
            other => eprintln!("ignoring unknown argument '{}'", other),
        }
    }
    args
}

fn main() {
    let args = parse_args();
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    println!("=== MechFront Lifecycle Harness ===\n");

    let mut results = Vec::new();

    // 1. Config
    let config = match load_config(&args, &mut results) {
        Some(config) => config,
        None => GameConfig::builtin(),
    };

    // 2. Origin catalog
    results.extend(validate_origins(&config));

    // 3. Creation gating
    results.extend(validate_creation_flow());

    // 4. Combat sequencer
    results.extend(validate_sequencer(&config));

    // 5. Full scenario
    results.extend(validate_scenario(&config, BoolEncoding::Native, args.verbose));

    // 6. Integer-encoded flags
    results.extend(validate_scenario(&config, BoolEncoding::Integer, false));

    // 7. Superseded sequences
    results.extend(validate_supersession(&config));

    // 8. Partial failure
    results.extend(validate_grant_retry(&config));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Shared setup ────────────────────────────────────────────────────────

fn flow_for(origin: OriginId) -> Result<CreationFlow, ValidationError> {
    let mut flow = CreationFlow::new();
    flow.select_gender(Gender::Female);
    flow.advance()?;
    flow.set_name("  harness ");
    flow.advance()?;
    flow.select_origin(origin);
    Ok(flow)
}

/// Signed-in session with a fresh engineer pilot in mission control.
fn fresh_session<'c>(
    config: &GameConfig,
    encoding: BoolEncoding,
    clock: &'c ManualClock,
) -> Result<SimSession<'c>, Error> {
    let mut session = Session::new(
        MemoryStore::with_encoding(encoding),
        MemoryIdentity::signed_in("sim_user"),
        clock,
        config.clone(),
    );
    session.boot()?;
    session.create_pilot(&mut flow_for(OriginId::Engineer)?)?;
    session.open_mission_control()?;
    Ok(session)
}

fn mission_of(session: &SimSession<'_>, difficulty: Difficulty) -> Option<MissionId> {
    session
        .missions()
        .iter()
        .find(|m| m.difficulty == difficulty)
        .map(|m| m.id.clone())
}

/// Deliver due callbacks until the sequencer is idle. Returns the events
/// delivered and whether a completion was applied. A failed completion
/// fails the run.
fn run_to_idle(
    session: &mut SimSession<'_>,
    clock: &ManualClock,
) -> Result<(Vec<SequenceSignal>, bool), Error> {
    let mut signals = Vec::new();
    let mut completed = false;
    while let Some(due) = session.next_due() {
        clock.set(due);
        let tick = session.tick()?;
        if let Some(e) = tick.completion_error {
            return Err(e);
        }
        signals.extend(tick.signals);
        completed |= tick.completed.is_some();
    }
    Ok((signals, completed))
}

fn event_count(signals: &[SequenceSignal]) -> usize {
    signals
        .iter()
        .filter(|s| matches!(s, SequenceSignal::Event { .. }))
        .count()
}

// ── 1. Config ───────────────────────────────────────────────────────────

fn load_config(args: &Args, results: &mut Vec<TestResult>) -> Option<GameConfig> {
    println!("--- Config ---");
    let config = match &args.config {
        Some(path) => match GameConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                results.push(check("config_load", false, e.to_string()));
                return None;
            }
        },
        None => GameConfig::builtin(),
    };
    let source = args
        .config
        .as_ref()
        .map_or("builtin".to_string(), |p| p.display().to_string());

    let issues = validate_config(&config);
    results.push(check(
        "config_valid",
        issues.is_empty(),
        if issues.is_empty() {
            format!("{} config has no issues", source)
        } else {
            issues
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    ));
    if issues.is_empty() {
        Some(config)
    } else {
        None
    }
}

// ── 2. Origins ──────────────────────────────────────────────────────────

fn validate_origins(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Origins ---");
    let mut results = Vec::new();

    let catalog = origin::origins();
    results.push(check(
        "origin_catalog_complete",
        catalog.len() == OriginId::ALL.len(),
        format!("{} origins", catalog.len()),
    ));

    let expected = [
        (OriginId::Military, MechClass::Assault),
        (OriginId::Engineer, MechClass::Support),
        (OriginId::Scavenger, MechClass::Sniper),
        (OriginId::Noble, MechClass::Tank),
    ];
    for (id, class) in expected {
        let request = match flow_for(id).and_then(|flow| flow.request()) {
            Ok(request) => request,
            Err(e) => {
                results.push(check(&format!("origin_{}", id), false, format!("flow setup: {}", e)));
                continue;
            }
        };
        let loadout = origin::resolve(
            &request,
            NewIds {
                user_id: UserId::new("u"),
                pilot_id: PilotId::new("p"),
                mech_id: MechId::new("m"),
            },
            config,
        );
        let pilot = &loadout.pilot;
        let ok = loadout.mech.class == class
            && pilot.level == 1
            && pilot.experience == 0
            && pilot.name == "HARNESS"
            && pilot.equipped_mech_id.as_ref() == Some(&loadout.mech.id);
        results.push(check(
            &format!("origin_{}", id),
            ok,
            format!(
                "{} pilot with {} credits in a {} ({})",
                pilot.name, pilot.credits, loadout.mech.class, loadout.mech.name
            ),
        ));
    }

    results
}

// ── 3. Creation flow ────────────────────────────────────────────────────

fn validate_creation_flow() -> Vec<TestResult> {
    println!("--- Creation Flow ---");
    let mut results = Vec::new();

    let mut flow = CreationFlow::new();
    let blocked = !flow.can_proceed() && flow.advance().is_err();
    results.push(check(
        "creation_blocks_without_gender",
        blocked && flow.step() == CreationStep::SelectGender,
        format!("step {:?}", flow.step()),
    ));

    flow.select_gender(Gender::Male);
    let at_name = flow.advance().is_ok() && flow.step() == CreationStep::EnterName;
    flow.set_name("   ");
    results.push(check(
        "creation_blocks_blank_name",
        at_name && !flow.can_proceed(),
        "whitespace-only callsign rejected",
    ));

    flow.set_name("A".repeat(21));
    results.push(check(
        "creation_blocks_long_name",
        flow.advance().is_err() && flow.step() == CreationStep::EnterName,
        "21-character callsign rejected",
    ));

    flow.set_name("ghost");
    let at_origin = flow.advance().is_ok() && flow.step() == CreationStep::SelectOrigin;
    let unknown = flow.select_origin_id("pirate").is_err();
    results.push(check(
        "creation_rejects_unknown_origin",
        at_origin && unknown && !flow.can_proceed(),
        "unknown origin id reported",
    ));

    results
}

// ── 4. Sequencer ────────────────────────────────────────────────────────

fn validate_sequencer(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Combat Sequencer ---");
    let mut results = Vec::new();

    let mission = mechfront_logic::mission::STARTER_MISSIONS[0].instantiate(&PilotId::new("p"), START);
    let mut sequencer = CombatSequencer::from_config(config);
    let handle = match sequencer.start(&mission, START) {
        Ok(handle) => handle,
        Err(e) => {
            results.push(check("sequencer_start", false, e.to_string()));
            return results;
        }
    };

    let mut messages = Vec::new();
    let mut completions = 0;
    while let Some(due) = sequencer.next_due() {
        for signal in sequencer.advance(due) {
            match signal {
                SequenceSignal::Event { message, .. } => messages.push(message),
                SequenceSignal::Complete { .. } => completions += 1,
            }
        }
    }

    results.push(check(
        "sequencer_declared_order",
        messages == COMBAT_SEQUENCE.to_vec(),
        format!("{} events", messages.len()),
    ));
    results.push(check(
        "sequencer_single_completion",
        completions == 1,
        format!("{} completions, due at {}", completions, handle.completes_at),
    ));
    let expected_end = START.offset(
        config
            .step_interval_ms
            .saturating_mul(COMBAT_SEQUENCE.len() as u64),
    );
    results.push(check(
        "sequencer_completion_time",
        handle.completes_at == expected_end,
        format!("start {} end {}", START, handle.completes_at),
    ));

    results
}

// ── 5/6. Scenario ───────────────────────────────────────────────────────

fn validate_scenario(config: &GameConfig, encoding: BoolEncoding, dump: bool) -> Vec<TestResult> {
    println!("--- Scenario ({:?} flags) ---", encoding);
    let mut results = Vec::new();
    let prefix = match encoding {
        BoolEncoding::Native => "scenario",
        BoolEncoding::Integer => "int_flags",
    };
    let name = |suffix: &str| format!("{}_{}", prefix, suffix);

    let clock = ManualClock::new(START);
    let mut session = match fresh_session(config, encoding, &clock) {
        Ok(session) => session,
        Err(e) => {
            results.push(check(&name("setup"), false, e.to_string()));
            return results;
        }
    };

    // Re-entering mission control must not seed again.
    clock.advance(1);
    let reseed = session.open_mission_control();
    let credits: Vec<u64> = session.missions().iter().map(|m| m.rewards.credits).collect();
    let tiers_ok = credits == Difficulty::ALL.map(credit_reward).to_vec();
    results.push(check(
        &name("seeded_once"),
        reseed.is_ok() && session.store().len(Collection::Missions) == 4 && tiers_ok,
        format!("rewards {:?}", credits),
    ));

    let Some(hard) = mission_of(&session, Difficulty::Hard) else {
        results.push(check(&name("hard_present"), false, "no hard mission"));
        return results;
    };
    let before = session.pilot().map(|p| (p.credits, p.experience)).unwrap_or_default();

    let outcome = session
        .select_mission(&hard)
        .map(|_| ())
        .and_then(|_| session.deploy().map(|_| ()))
        .and_then(|_| run_to_idle(&mut session, &clock));
    match outcome {
        Ok((signals, completed)) => {
            results.push(check(
                &name("full_sequence"),
                event_count(&signals) == COMBAT_SEQUENCE.len() && completed,
                format!("{} events, completed {}", event_count(&signals), completed),
            ));
        }
        Err(e) => {
            results.push(check(&name("full_sequence"), false, e.to_string()));
            return results;
        }
    }

    let after = session.pilot().map(|p| (p.credits, p.experience)).unwrap_or_default();
    results.push(check(
        &name("hard_rewards"),
        after.0 == before.0 + 500 && after.1 == before.1 + 250,
        format!("credits {} -> {}, xp {} -> {}", before.0, after.0, before.1, after.1),
    ));

    let board = session.board();
    let partition_ok = board.completed_count() == 1
        && board.available_count() == 3
        && board.completed.iter().all(|m| m.id == hard);
    results.push(check(
        &name("partition"),
        partition_ok,
        format!(
            "{} available, {} completed",
            board.available_count(),
            board.completed_count()
        ),
    ));

    let redeploy_rejected = session.select_mission(&hard).is_err();
    let unchanged = session.pilot().map(|p| (p.credits, p.experience)).unwrap_or_default() == after;
    results.push(check(
        &name("no_double_completion"),
        redeploy_rejected && unchanged,
        "completed mission cannot be selected again",
    ));

    if dump {
        match serde_json::to_string_pretty(&session.store().dump()) {
            Ok(json) => println!("{}", json),
            Err(e) => log::warn!("state dump failed: {}", e),
        }
    }

    results
}

// ── 7. Supersession ─────────────────────────────────────────────────────

fn validate_supersession(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Superseded Sequences ---");
    let mut results = Vec::new();

    let clock = ManualClock::new(START);
    let mut session = match fresh_session(config, BoolEncoding::Native, &clock) {
        Ok(session) => session,
        Err(e) => {
            results.push(check("supersede_setup", false, e.to_string()));
            return results;
        }
    };
    let (Some(easy), Some(medium)) = (
        mission_of(&session, Difficulty::Easy),
        mission_of(&session, Difficulty::Medium),
    ) else {
        results.push(check("supersede_missions", false, "starter set incomplete"));
        return results;
    };

    let first = session.select_mission(&easy).map(|_| ()).and_then(|_| session.deploy());
    clock.advance(config.step_interval_ms.saturating_mul(3));
    if let Err(e) = session.tick() {
        results.push(check("supersede_partial_tick", false, e.to_string()));
        return results;
    }
    let second = session.select_mission(&medium).map(|_| ()).and_then(|_| session.deploy());

    let (Ok(first), Ok(second)) = (first, second) else {
        results.push(check("supersede_deploy", false, "deploy failed"));
        return results;
    };

    match run_to_idle(&mut session, &clock) {
        Ok((signals, completed)) => {
            let stale = signals.iter().filter(|s| s.token() == first.token).count();
            results.push(check(
                "supersede_no_stale_delivery",
                stale == 0 && signals.iter().all(|s| s.token() == second.token),
                format!("{} stale signals delivered", stale),
            ));
            results.push(check(
                "supersede_full_restart",
                event_count(&signals) == COMBAT_SEQUENCE.len() && completed,
                format!("{} events after restart", event_count(&signals)),
            ));
        }
        Err(e) => results.push(check("supersede_run", false, e.to_string())),
    }

    let easy_done = session
        .missions()
        .iter()
        .any(|m| m.id == easy && m.is_completed());
    results.push(check(
        "supersede_only_new_mission_completed",
        !easy_done && session.board().completed_count() == 1,
        "abandoned mission still available",
    ));

    results
}

// ── 8. Grant retry ──────────────────────────────────────────────────────

fn validate_grant_retry(config: &GameConfig) -> Vec<TestResult> {
    println!("--- Partial Failure ---");
    let mut results = Vec::new();

    let clock = ManualClock::new(START);
    let mut session = match fresh_session(config, BoolEncoding::Native, &clock) {
        Ok(session) => session,
        Err(e) => {
            results.push(check("retry_setup", false, e.to_string()));
            return results;
        }
    };
    let before = session.pilot().map(|p| p.credits).unwrap_or_default();

    // Two completions in a row whose pilot write fails.
    let full_run = config
        .step_interval_ms
        .saturating_mul(COMBAT_SEQUENCE.len() as u64 + 1);
    for difficulty in [Difficulty::Extreme, Difficulty::Hard] {
        let Some(id) = mission_of(&session, difficulty) else {
            results.push(check("retry_missions", false, format!("no {} mission", difficulty)));
            return results;
        };
        let deployed = session
            .select_mission(&id)
            .map(|_| ())
            .and_then(|_| session.deploy().map(|_| ()));
        if let Err(e) = deployed {
            results.push(check("retry_deploy", false, e.to_string()));
            return results;
        }

        session.store_mut().fail_next(Collection::Pilots, StoreOp::Update);
        clock.advance(full_run);
        let reported = match session.tick() {
            Ok(tick) => {
                event_count(&tick.signals) == COMBAT_SEQUENCE.len()
                    && matches!(tick.completion_error, Some(Error::RewardNotGranted(_)))
            }
            Err(_) => false,
        };
        results.push(check(
            &format!("retry_grant_failure_reported_{}", difficulty),
            reported,
            "pilot update failure surfaces next to the combat log",
        ));
    }
    results.push(check(
        "retry_grants_queued",
        session.pending_grants().len() == 2,
        format!("{} pending grants", session.pending_grants().len()),
    ));
    results.push(check(
        "retry_missions_committed",
        session.board().completed_count() == 2 && session.next_due().is_none(),
        "missions marked completed, no combat to replay",
    ));

    match session.retry_pending_grants() {
        Ok(Some(pilot)) => results.push(check(
            "retry_grants_applied",
            pilot.credits == before + 1500 && pilot.experience == 750,
            format!("credits {} -> {}", before, pilot.credits),
        )),
        Ok(None) => results.push(check("retry_grants_applied", false, "nothing pending")),
        Err(e) => results.push(check("retry_grants_applied", false, e.to_string())),
    }
    results.push(check(
        "retry_queue_drained",
        session.pending_grants().is_empty(),
        format!("{} still pending", session.pending_grants().len()),
    ));

    let route_kept = session.route() == Route::MissionControl;
    results.push(check(
        "retry_route_unchanged",
        route_kept,
        format!("route {:?}", session.route()),
    ));

    results
}
