//! Lunar Outpost Headless Simulation Harness
//!
//! Validates the pure planner engine and plays a scripted mission end to
//! end. Runs entirely in-process: no rendering, no networking.
//!
//! Usage:
//!   cargo run -p lunar-simtest
//!   cargo run -p lunar-simtest -- --verbose --seed 7
//!   cargo run -p lunar-simtest -- --mission path/to/mission.json --json

use std::path::PathBuf;

use clap::Parser;
use lunar_logic::constants::{comm, map as map_consts, solar, thresholds};
use lunar_logic::constraints::{self, WarningCode};
use lunar_logic::map::{self, LunarMap, Position};
use lunar_logic::mission::{Mission, MissionError};
use lunar_logic::network;
use lunar_logic::outpost::{Outpost, OutpostId, OutpostKind, OutpostStatus};
use lunar_logic::scoring::{self, Scores};
use lunar_logic::session::Session;
use lunar_logic::state::{self, GameState};
use lunar_logic::terrain::TerrainSeed;
use serde::Serialize;

// ── Reference mission (same JSON the engine tests load) ─────────────────
const MISSION_JSON: &str = include_str!("../../../data/reference_mission.json");

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print every check, not just failures
    #[arg(short, long)]
    verbose: bool,

    /// Terrain seed for the generated map
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Mission descriptor to play instead of the bundled reference
    #[arg(short, long)]
    mission: Option<PathBuf>,

    /// Stop the scripted playthrough after this many days
    #[arg(short, long)]
    days: Option<u32>,

    /// Emit the final summary as JSON
    #[arg(long)]
    json: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
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

#[derive(Debug, Serialize)]
struct Summary {
    mission: String,
    seed: u64,
    days_played: u32,
    outposts: usize,
    final_scores: Option<Scores>,
    passed: usize,
    failed: usize,
    failures: Vec<TestResult>,
}

fn main() {
    let args = Args::parse();
    env_logger::init();

    if !args.json {
        println!("=== Lunar Outpost Simulation Harness ===\n");
    }

    // JSON mode keeps stdout parseable
    let verbose = args.verbose && !args.json;
    let section = |title: &str| {
        if !args.json {
            println!("--- {} ---", title);
        }
    };

    let mut results = Vec::new();

    // 1. Mission descriptor
    section("Mission Descriptor");
    let (mission, mission_results) = load_mission(args.mission.as_ref(), verbose);
    results.extend(mission_results);

    // 2. Map generation
    section("Map Generation");
    results.extend(validate_map(args.seed, verbose));

    // 3. Comm network
    section("Comm Network");
    results.extend(validate_network(verbose));

    // 4. Constraint evaluation
    section("Constraint Evaluation");
    results.extend(validate_constraints(args.seed, verbose));

    // 5. State transitions
    section("State Transitions");
    results.extend(validate_transitions(verbose));

    // 6. Outpost kind table
    section("Outpost Kinds");
    results.extend(validate_outpost_kinds(verbose));

    // 7. Scripted playthrough
    section("Scripted Playthrough");
    let playthrough = run_playthrough(mission.clone(), args.seed, args.days, verbose);
    results.extend(playthrough.results);

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if args.json {
        let summary = Summary {
            mission: mission.id.clone(),
            seed: args.seed,
            days_played: playthrough.days_played,
            outposts: playthrough.outposts,
            final_scores: playthrough.final_scores,
            passed,
            failed,
            failures: results.into_iter().filter(|r| !r.passed).collect(),
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("failed to serialize summary: {}", e),
        }
    } else {
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed,
            results.len(),
            failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Mission Descriptor ───────────────────────────────────────────────

fn load_mission(path: Option<&PathBuf>, verbose: bool) -> (Mission, Vec<TestResult>) {
    let mut results = Vec::new();

    let bundled = Mission::from_json(MISSION_JSON);
    results.push(check(
        "mission_bundled_matches_reference",
        bundled.as_ref().ok() == Some(&Mission::reference()),
        match &bundled {
            Ok(m) => format!("'{}' budget {:.0}, {} days", m.name, m.budget, m.duration),
            Err(e) => format!("bundled descriptor rejected: {}", e),
        },
    ));

    let broken = r#"{"id":"x","name":"x","description":"","budget":0.0,"target_science":0.0,
        "duration":0,"constraints":{"max_outposts":1,"required_types":["command","power"]}}"#;
    let errors = serde_json::from_str::<Mission>(broken)
        .map(|m| m.validate())
        .unwrap_or_default();
    results.push(check(
        "mission_validation_reports_all",
        errors.len() == 3
            && errors.iter().any(|e| matches!(e, MissionError::ZeroDuration))
            && errors.iter().any(|e| matches!(e, MissionError::NonPositiveBudget(_))),
        format!("{} errors for a broken descriptor", errors.len()),
    ));

    let mission = match path {
        None => Mission::reference(),
        Some(path) => {
            let loaded = std::fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|text| Mission::from_json(&text).map_err(|e| e.to_string()));
            match loaded {
                Ok(m) => {
                    results.push(check(
                        "mission_file_loaded",
                        true,
                        format!("{} from {}", m.id, path.display()),
                    ));
                    m
                }
                Err(e) => {
                    results.push(check(
                        "mission_file_loaded",
                        false,
                        format!("{}: {}", path.display(), e),
                    ));
                    Mission::reference()
                }
            }
        }
    };

    if verbose {
        println!(
            "  Playing '{}' ({}): budget {:.0}, {} days, max {} outposts",
            mission.name,
            mission.id,
            mission.budget,
            mission.duration,
            mission.constraints.max_outposts
        );
    }
    (mission, results)
}

// ── 2. Map Generation ───────────────────────────────────────────────────

fn validate_map(seed: u64, verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let terrain = TerrainSeed::new(seed);
    let day0 = LunarMap::generate(0, &terrain);

    results.push(check(
        "map_dimensions",
        day0.width == map_consts::WIDTH && day0.height == map_consts::HEIGHT,
        format!("{}x{}, {} craters", day0.width, day0.height, terrain.craters.len()),
    ));

    let out_of_range = day0
        .cells()
        .filter(|c| {
            !(0.0..=1.0).contains(&c.terrain.roughness)
                || !(0.0..=1.0).contains(&c.terrain.slope)
                || !(0.0..=1.0).contains(&c.solar.visibility)
                || !(0.0..=1.0).contains(&c.resource.uncertainty)
        })
        .count();
    results.push(check(
        "map_value_ranges",
        out_of_range == 0,
        format!("{} cells outside [0, 1]", out_of_range),
    ));

    let corners = [
        Position::new(-1, 0),
        Position::new(0, -1),
        Position::new(day0.width as i32, 0),
        Position::new(0, day0.height as i32),
    ];
    results.push(check(
        "map_out_of_bounds_absent",
        corners.iter().all(|p| map::get_cell(&day0, *p).is_none()),
        "edges reject lookups",
    ));

    let mut periodic = true;
    for day in 0..solar::CYCLE_DAYS {
        let a = LunarMap::generate(day, &terrain);
        let b = LunarMap::generate(day + solar::CYCLE_DAYS, &terrain);
        periodic &= map::is_daytime(day) == map::is_daytime(day + solar::CYCLE_DAYS);
        periodic &= a
            .cells()
            .zip(b.cells())
            .all(|(x, y)| x.solar.current_power == y.solar.current_power);
    }
    results.push(check(
        "map_solar_period",
        periodic,
        format!("solar output repeats every {} days", solar::CYCLE_DAYS),
    ));

    results.push(check(
        "map_deterministic",
        LunarMap::generate(0, &TerrainSeed::new(seed)) == day0,
        format!("seed {} reproduces the same map", seed),
    ));

    if verbose {
        let mean_vis: f64 =
            day0.cells().map(|c| c.solar.visibility).sum::<f64>() / day0.cells().count() as f64;
        println!("  Mean visibility on day 0: {:.3}", mean_vis);
    }
    results
}

// ── 3. Comm Network ─────────────────────────────────────────────────────

fn outpost(id: u32, kind: OutpostKind, x: i32, y: i32) -> Outpost {
    Outpost {
        id: OutpostId(id),
        kind,
        position: Position::new(x, y),
        status: OutpostStatus::Confirmed,
    }
}

fn validate_network(_verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();

    let empty = network::check_connectivity(&[]);
    results.push(check(
        "network_empty_is_connected",
        empty.is_connected && empty.links.is_empty(),
        "no outposts, nothing to reach",
    ));

    let no_command = network::check_connectivity(&[outpost(0, OutpostKind::Power, 0, 0)]);
    results.push(check(
        "network_requires_command",
        !no_command.is_connected,
        "power alone is disconnected",
    ));

    let far = (comm::MAX_DISTANCE * 1.2) as i32;
    let plain = network::check_connectivity(&[
        outpost(0, OutpostKind::Command, 0, 0),
        outpost(1, OutpostKind::Mining, far, 0),
    ]);
    let relayed = network::check_connectivity(&[
        outpost(0, OutpostKind::Command, 0, 0),
        outpost(1, OutpostKind::Comm, far, 0),
    ]);
    results.push(check(
        "network_relay_extends_range",
        !plain.is_connected && relayed.is_connected,
        format!(
            "{} km out of plain range, inside relay range {:.0}",
            far,
            network::link_range(OutpostKind::Command, OutpostKind::Comm)
        ),
    ));

    let chain = network::check_connectivity(&[
        outpost(0, OutpostKind::Command, 0, 0),
        outpost(1, OutpostKind::Power, 100, 0),
        outpost(2, OutpostKind::Research, 200, 0),
    ]);
    results.push(check(
        "network_multi_hop",
        chain.is_connected && chain.links.len() == 2,
        format!("{} links over two hops", chain.links.len()),
    ));

    results
}

// ── 4. Constraint Evaluation ────────────────────────────────────────────

fn validate_constraints(seed: u64, verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let map = LunarMap::generate(0, &TerrainSeed::new(seed));

    let command_at = Position::new(10, 30);
    let power_at = Position::new(20, 30);
    let mut state = GameState::new(Mission::reference());
    state = state::place(&state, OutpostKind::Command, command_at);
    state = state::place(&state, OutpostKind::Power, power_at);

    let full = constraints::evaluate_full(&state, &map);
    let generated = map::get_cell(&map, power_at).map_or(0.0, |c| c.solar.current_power);
    let expected = generated
        - OutpostKind::Command.metadata().power_consumption
        - OutpostKind::Power.metadata().power_consumption;
    results.push(check(
        "constraints_power_balance",
        (full.power_balance - expected).abs() < 1e-9,
        format!("{:.1} kW generated, balance {:.1} kW", generated, full.power_balance),
    ));
    results.push(check(
        "constraints_command_power_stable",
        full.comm_connectivity
            && full.warnings.iter().all(|w| w.code != WarningCode::UnstableLink),
        format!("link distance {:.1} km", map::distance(command_at, power_at)),
    ));

    let again = constraints::evaluate_full(&state, &map);
    let scores_a = scoring::calculate_scores(&state, &map, &full);
    let scores_b = scoring::calculate_scores(&state, &map, &again);
    results.push(check(
        "constraints_idempotent",
        full == again && scores_a == scores_b,
        format!("overall {:.2} on both passes", scores_a.overall),
    ));

    let stray = state::place(&state::confirm_all(&state), OutpostKind::Mining, Position::new(-5, 0));
    let light = constraints::evaluate_light(&stray, &map);
    results.push(check(
        "constraints_light_checks_provisional",
        light.warnings.len() == 1 && light.warnings[0].code == WarningCode::OutOfBounds,
        format!("stability {:.2}", light.stability),
    ));

    if verbose {
        for w in &full.warnings {
            println!("  warning: {}", w.detail);
        }
    }
    results
}

// ── 5. State Transitions ────────────────────────────────────────────────

fn validate_transitions(_verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();
    let start = GameState::new(Mission::reference());

    let bad_refund: Vec<_> = OutpostKind::all()
        .into_iter()
        .filter(|kind| {
            let placed = state::place(&start, *kind, Position::new(1, 1));
            let removed = state::remove(&placed, placed.outposts[0].id);
            removed.budget - start.budget != -0.5 * kind.metadata().cost
        })
        .collect();
    results.push(check(
        "transitions_half_refund",
        bad_refund.is_empty(),
        format!("{} kinds with a wrong refund", bad_refund.len()),
    ));

    results.push(check(
        "transitions_undo_empty",
        state::undo(&start).is_none(),
        "fresh state has no history",
    ));

    let placed = state::place(&start, OutpostKind::Command, Position::new(4, 4));
    let advanced = state::advance_turn(&state::confirm_all(&placed));
    let restored = state::undo(&advanced);
    results.push(check(
        "transitions_undo_restores",
        restored.as_ref().is_some_and(|s| s.day == 0 && s.outposts.len() == 1),
        format!("day {} back to day 0", advanced.day),
    ));

    let once = state::confirm_all(&placed);
    results.push(check(
        "transitions_confirm_all_idempotent",
        state::confirm_all(&once) == once,
        "second confirmation is a no-op",
    ));

    // Ids issued after the snapshot stay burned once it is restored
    let extra = state::place(&advanced, OutpostKind::Mining, Position::new(6, 4));
    let reissued = state::undo(&extra)
        .map(|s| state::place(&s, OutpostKind::Power, Position::new(5, 4)))
        .and_then(|s| s.outposts.last().map(|o| o.id));
    results.push(check(
        "transitions_ids_survive_undo",
        reissued == Some(OutpostId(2)),
        format!("post-undo placement got {:?}", reissued),
    ));

    results
}

// ── 6. Outpost Kinds ────────────────────────────────────────────────────

fn validate_outpost_kinds(verbose: bool) -> Vec<TestResult> {
    let mut results = Vec::new();

    let roundtrip = OutpostKind::all()
        .into_iter()
        .all(|k| OutpostKind::from_u8(k as u8) == Some(k));
    results.push(check(
        "kinds_from_u8",
        roundtrip && OutpostKind::from_u8(5).is_none(),
        "discriminants map back to kinds",
    ));

    let generators: Vec<_> = OutpostKind::all()
        .into_iter()
        .filter(|k| k.generates_power())
        .collect();
    results.push(check(
        "kinds_single_generator",
        generators == [OutpostKind::Power],
        format!("generators: {:?}", generators),
    ));

    if verbose {
        for kind in OutpostKind::all() {
            let meta = kind.metadata();
            println!(
                "  {:<12} cost {:>4.0}  draw {:>3.0} kW  gen {:>3.0} kW",
                meta.name, meta.cost, meta.power_consumption, meta.power_generation
            );
        }
    }
    results
}

// ── 7. Scripted Playthrough ─────────────────────────────────────────────

struct Playthrough {
    results: Vec<TestResult>,
    days_played: u32,
    outposts: usize,
    final_scores: Option<Scores>,
}

/// Build order for the scripted base.
const BUILD_ORDER: [OutpostKind; 5] = [
    OutpostKind::Command,
    OutpostKind::Power,
    OutpostKind::Research,
    OutpostKind::Mining,
    OutpostKind::Comm,
];

/// Best unoccupied buildable cell within `radius` of `around`.
fn pick_site(
    map: &LunarMap,
    around: Position,
    radius: f64,
    taken: &[Position],
    score: impl Fn(&map::Cell) -> f64,
) -> Option<Position> {
    map.cells()
        .filter(|c| map::distance(c.position, around) <= radius)
        .filter(|c| !taken.contains(&c.position))
        .filter(|c| {
            c.terrain.roughness <= thresholds::MAX_BUILDABLE_ROUGHNESS
                && c.terrain.slope <= thresholds::MAX_BUILDABLE_SLOPE
        })
        .max_by(|a, b| score(a).total_cmp(&score(b)))
        .map(|c| c.position)
}

fn run_playthrough(mission: Mission, seed: u64, days: Option<u32>, verbose: bool) -> Playthrough {
    let mut results = Vec::new();
    let mut session = match Session::new(mission, TerrainSeed::new(seed)) {
        Ok(session) => session,
        Err(e) => {
            results.push(check("playthrough_session_started", false, e.to_string()));
            return Playthrough {
                results,
                days_played: 0,
                outposts: 0,
                final_scores: None,
            };
        }
    };
    let center = Position::new(session.map().width as i32 / 2, session.map().height as i32 / 2);

    let mut taken = Vec::new();
    let max = session.state().mission.constraints.max_outposts;
    for kind in BUILD_ORDER.into_iter().take(max) {
        let site = match kind {
            OutpostKind::Power => {
                pick_site(session.map(), center, 10.0, &taken, |c| c.solar.visibility)
            }
            OutpostKind::Mining => {
                pick_site(session.map(), center, 12.0, &taken, |c| c.resource.expected_value)
            }
            _ => pick_site(session.map(), center, 8.0, &taken, |c| -c.terrain.build_cost),
        };
        let Some(site) = site else {
            log::warn!("No buildable site for {} near {:?}", kind, center);
            continue;
        };
        match session.place(kind, site) {
            Ok(id) => {
                taken.push(site);
                if verbose {
                    println!("  placed {} ({}) at ({}, {})", id, kind, site.x, site.y);
                }
            }
            Err(e) => log::warn!("Skipped {}: {}", kind, e),
        }
    }

    results.push(check(
        "playthrough_required_types",
        session.mission_violations().is_empty(),
        format!("{} outposts placed", session.state().outposts.len()),
    ));

    let limit = days.unwrap_or(session.state().mission.duration);
    let mut all_connected = true;
    let mut bounded = true;
    while session.state().day < limit && !session.is_complete() {
        let eval = match session.confirm_turn() {
            Ok(eval) => eval.clone(),
            Err(e) => {
                results.push(check("playthrough_confirm", false, e.to_string()));
                break;
            }
        };
        all_connected &= eval.constraints.comm_connectivity;
        bounded &= (0.0..=1.0).contains(&eval.constraints.stability)
            && eval.scores.overall.is_finite();
        if verbose {
            println!(
                "  day {:>2}: balance {:>7.1} kW  stability {:.2}  overall {:>6.2}",
                session.state().day,
                eval.constraints.power_balance,
                eval.constraints.stability,
                eval.scores.overall
            );
        }
    }

    results.push(check(
        "playthrough_connected",
        all_connected,
        "every outpost reached command on every day",
    ));
    results.push(check(
        "playthrough_bounded",
        bounded,
        "stability in [0, 1], finite scores",
    ));
    results.push(check(
        "playthrough_budget_non_negative",
        session.state().budget >= 0.0,
        format!("{:.0} left", session.state().budget),
    ));

    let days_played = session.state().day;
    let outposts = session.state().outposts.len();
    let final_scores = Some(session.evaluation().scores);

    if days_played > 0 {
        let before = session.state().day;
        let undone = session.undo();
        results.push(check(
            "playthrough_undo_last_day",
            undone && session.state().day + 1 == before && session.map().day == session.state().day,
            format!("day {} back to day {}", before, session.state().day),
        ));
    }

    log::info!(
        "Playthrough finished after {} days with {} outposts",
        days_played,
        outposts
    );
    Playthrough {
        results,
        days_played,
        outposts,
        final_scores,
    }
}
