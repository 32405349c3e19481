//! Constraint evaluation: power balance, buildability, comm connectivity,
//! and the aggregate stability value the scores are built from.
//!
//! Two modes share the same inputs:
//!
//! | Mode | When | Checks |
//! |------|------|--------|
//! | [`evaluate_light`] | while dragging | buildability of provisional outposts (incl. budget) |
//! | [`evaluate_full`] | at turn confirmation | power, connectivity, buildability of all outposts |
//!
//! Nothing here fails: every problem becomes a [`Warning`] and a stability
//! deduction, so the game always stays in a renderable state.

use serde::{Deserialize, Serialize};

use crate::constants::thresholds;
use crate::map::LunarMap;
use crate::network::{check_connectivity, CommLink, NetworkAnalysis};
use crate::outpost::{Outpost, OutpostId, OutpostStatus};
use crate::state::GameState;

// ============================================================================
// WARNINGS
// ============================================================================

/// Category of a reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningCode {
    OutOfBounds,
    InsufficientBudget,
    TerrainTooHarsh,
    PowerDeficit,
    LowPowerMargin,
    DisconnectedNetwork,
    UnstableLink,
}

/// A structured warning. `outpost` is set when the problem belongs to one
/// outpost. Link warnings in a [`ConstraintResult`] carry `None`; each
/// endpoint's [`OutpostReport`] gets its own tagged copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub code: WarningCode,
    pub outpost: Option<OutpostId>,
    pub detail: String,
}

/// Why an outpost cannot be built where it stands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BuildIssue {
    OutOfBounds,
    InsufficientBudget { required: f64, available: f64 },
    TerrainTooHarsh { roughness: f64, slope: f64 },
}

impl BuildIssue {
    pub fn code(&self) -> WarningCode {
        match self {
            Self::OutOfBounds => WarningCode::OutOfBounds,
            Self::InsufficientBudget { .. } => WarningCode::InsufficientBudget,
            Self::TerrainTooHarsh { .. } => WarningCode::TerrainTooHarsh,
        }
    }

    fn describe(&self, outpost: &Outpost) -> String {
        let name = outpost.kind.metadata().name;
        match self {
            Self::OutOfBounds => format!("{}: outside the surveyed map", name),
            Self::InsufficientBudget {
                required,
                available,
            } => format!(
                "{}: insufficient budget ({:.0} needed, {:.0} available)",
                name, required, available
            ),
            Self::TerrainTooHarsh { roughness, slope } => format!(
                "{}: terrain too harsh (roughness {:.2}, slope {:.2})",
                name, roughness, slope
            ),
        }
    }

    fn warning(&self, outpost: &Outpost) -> Warning {
        Warning {
            code: self.code(),
            outpost: Some(outpost.id),
            detail: self.describe(outpost),
        }
    }
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintResult {
    /// Power is non-negative and the network is connected.
    pub is_valid: bool,
    /// Generation minus consumption (kW). Always 0 in light mode.
    pub power_balance: f64,
    /// Always true in light mode.
    pub comm_connectivity: bool,
    pub buildability: bool,
    pub warnings: Vec<Warning>,
    /// Aggregate health in `[0, 1]`.
    pub stability: f64,
}

/// Derived per-outpost flags for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutpostReport {
    pub id: OutpostId,
    pub is_unstable: bool,
    pub warnings: Vec<Warning>,
}

// ============================================================================
// CHECKS
// ============================================================================

/// Total solar output of generator outposts minus the flat draw of every
/// outpost on the map. Off-map outposts count for neither side.
pub fn calculate_power_balance(state: &GameState, map: &LunarMap) -> f64 {
    let mut generation = 0.0;
    let mut consumption = 0.0;

    for outpost in &state.outposts {
        let Some(cell) = map.cell(outpost.position) else {
            continue;
        };
        let meta = outpost.kind.metadata();
        if meta.power_generation > 0.0 {
            generation += cell.solar.current_power;
        }
        consumption += meta.power_consumption;
    }

    generation - consumption
}

/// Can `outpost` be built at its position with `budget` available?
///
/// Checks, in order: on the map, terrain-adjusted cost within budget,
/// terrain not too rough or steep.
pub fn check_buildability(outpost: &Outpost, map: &LunarMap, budget: f64) -> Result<(), BuildIssue> {
    let cell = map.cell(outpost.position).ok_or(BuildIssue::OutOfBounds)?;

    let required = outpost.kind.metadata().cost * cell.terrain.build_cost;
    if required > budget {
        return Err(BuildIssue::InsufficientBudget {
            required,
            available: budget,
        });
    }

    if cell.terrain.roughness > thresholds::MAX_BUILDABLE_ROUGHNESS
        || cell.terrain.slope > thresholds::MAX_BUILDABLE_SLOPE
    {
        return Err(BuildIssue::TerrainTooHarsh {
            roughness: cell.terrain.roughness,
            slope: cell.terrain.slope,
        });
    }

    Ok(())
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Cheap pass for pointer-move feedback: buildability of provisional
/// outposts only, budget included.
pub fn evaluate_light(state: &GameState, map: &LunarMap) -> ConstraintResult {
    let mut warnings = Vec::new();
    let mut stability = 1.0;

    for outpost in state
        .outposts
        .iter()
        .filter(|o| o.status == OutpostStatus::Provisional)
    {
        if let Err(issue) = check_buildability(outpost, map, state.budget) {
            warnings.push(issue.warning(outpost));
            stability -= thresholds::PENALTY_UNBUILDABLE;
        }
    }

    let ok = warnings.is_empty();
    ConstraintResult {
        is_valid: ok,
        power_balance: 0.0,
        comm_connectivity: true,
        buildability: ok,
        warnings,
        stability: f64::max(0.0, stability),
    }
}

/// Full pass run at turn confirmation.
pub fn evaluate_full(state: &GameState, map: &LunarMap) -> ConstraintResult {
    evaluate_full_with_network(state, map).0
}

/// [`evaluate_full`] that also hands back the network it analysed, so
/// callers needing the links don't run the BFS twice.
pub fn evaluate_full_with_network(
    state: &GameState,
    map: &LunarMap,
) -> (ConstraintResult, NetworkAnalysis) {
    let mut warnings = Vec::new();
    let mut stability = 1.0;

    let power_balance = calculate_power_balance(state, map);
    if power_balance < 0.0 {
        warnings.push(Warning {
            code: WarningCode::PowerDeficit,
            outpost: None,
            detail: format!("Power deficit: {:.0} kW", power_balance.abs()),
        });
        stability -= thresholds::PENALTY_POWER_DEFICIT;
    } else if power_balance < thresholds::POWER_MARGIN {
        warnings.push(Warning {
            code: WarningCode::LowPowerMargin,
            outpost: None,
            detail: format!("Power margin is thin: {:.0} kW spare", power_balance),
        });
        stability -= thresholds::PENALTY_LOW_MARGIN;
    }

    let network = check_connectivity(&state.outposts);
    if !network.is_connected && state.outposts.len() > 1 {
        let unreached = state
            .outposts
            .iter()
            .filter(|o| !network.reachable.contains(&o.id))
            .count();
        warnings.push(Warning {
            code: WarningCode::DisconnectedNetwork,
            outpost: None,
            detail: format!("{} outposts cannot reach command", unreached),
        });
        stability -= thresholds::PENALTY_DISCONNECTED;
    }

    for link in network.unstable_links() {
        warnings.push(unstable_link_warning(link, None));
        stability -= thresholds::PENALTY_UNSTABLE_LINK;
    }

    // Budget was checked at placement; only terrain and bounds matter here.
    for outpost in &state.outposts {
        match check_buildability(outpost, map, f64::INFINITY) {
            Ok(()) | Err(BuildIssue::InsufficientBudget { .. }) => {}
            Err(issue) => {
                warnings.push(issue.warning(outpost));
                stability -= thresholds::PENALTY_UNBUILDABLE;
            }
        }
    }

    log::debug!(
        "Full evaluation day {}: balance {:.1} kW, connected {}, {} links, {} warnings",
        state.day,
        power_balance,
        network.is_connected,
        network.links.len(),
        warnings.len()
    );

    let result = ConstraintResult {
        is_valid: power_balance >= 0.0 && network.is_connected,
        power_balance,
        comm_connectivity: network.is_connected,
        buildability: true,
        warnings,
        stability: f64::clamp(stability, 0.0, 1.0),
    };
    (result, network)
}

/// Per-outpost flags: an outpost is unstable if it carries a warning, sits
/// on an unstable link, or cannot reach command.
pub fn outpost_reports(
    outposts: &[Outpost],
    result: &ConstraintResult,
    network: &NetworkAnalysis,
) -> Vec<OutpostReport> {
    outposts
        .iter()
        .map(|o| {
            let mut warnings: Vec<Warning> = result
                .warnings
                .iter()
                .filter(|w| w.outpost == Some(o.id))
                .cloned()
                .collect();
            warnings.extend(
                network
                    .unstable_links()
                    .filter(|l| l.touches(o.id))
                    .map(|l| unstable_link_warning(l, Some(o.id))),
            );
            let on_unstable_link = network.unstable_links().any(|l| l.touches(o.id));
            let unreachable = !network.is_connected && !network.reachable.contains(&o.id);
            OutpostReport {
                id: o.id,
                is_unstable: !warnings.is_empty() || on_unstable_link || unreachable,
                warnings,
            }
        })
        .collect()
}

fn unstable_link_warning(link: &CommLink, outpost: Option<OutpostId>) -> Warning {
    Warning {
        code: WarningCode::UnstableLink,
        outpost,
        detail: format!(
            "Unstable link {} ↔ {} (quality {:.2})",
            link.from, link.to, link.quality
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{distance, Position};
    use crate::mission::Mission;
    use crate::outpost::OutpostKind;
    use crate::state::{place, GameState};
    use crate::terrain::TerrainSeed;

    fn flat_map(day: u32) -> LunarMap {
        LunarMap::generate(day, &TerrainSeed::flat(80, 60))
    }

    /// First cell that is buildable (roughness and slope ≤ 0.9).
    fn buildable(map: &LunarMap, skip: usize) -> Position {
        map.cells()
            .filter(|c| c.terrain.roughness <= 0.9 && c.terrain.slope <= 0.9)
            .nth(skip)
            .map(|c| c.position)
            .unwrap()
    }

    #[test]
    fn test_light_ignores_confirmed() {
        let map = flat_map(0);
        let mut state = place(
            &GameState::new(Mission::reference()),
            OutpostKind::Command,
            Position::new(-5, -5),
        );
        state.outposts[0].status = OutpostStatus::Confirmed;
        let result = evaluate_light(&state, &map);
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_light_flags_out_of_bounds() {
        let map = flat_map(0);
        let state = place(
            &GameState::new(Mission::reference()),
            OutpostKind::Mining,
            Position::new(200, 5),
        );
        let result = evaluate_light(&state, &map);
        assert!(!result.is_valid);
        assert!(!result.buildability);
        assert_eq!(result.warnings[0].code, WarningCode::OutOfBounds);
        assert!((result.stability - 0.7).abs() < 1e-12);
        assert_eq!(result.power_balance, 0.0);
        assert!(result.comm_connectivity);
    }

    #[test]
    fn test_light_checks_budget() {
        let map = flat_map(0);
        let mut state = GameState::new(Mission::reference());
        state.budget = 10.0;
        let pos = buildable(&map, 0);
        let state = place(&state, OutpostKind::Research, pos);
        let result = evaluate_light(&state, &map);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WarningCode::InsufficientBudget);
        assert_eq!(result.warnings[0].outpost, Some(state.outposts[0].id));
    }

    #[test]
    fn test_light_stability_floor() {
        let map = flat_map(0);
        let mut state = GameState::new(Mission::reference());
        for i in 0..5 {
            state = place(&state, OutpostKind::Comm, Position::new(-1 - i, 0));
        }
        let result = evaluate_light(&state, &map);
        assert_eq!(result.warnings.len(), 5);
        assert_eq!(result.stability, 0.0);
    }

    #[test]
    fn test_full_ignores_budget() {
        let map = flat_map(0);
        let mut state = GameState::new(Mission::reference());
        state.budget = -1000.0;
        let pos = buildable(&map, 0);
        let state = place(&state, OutpostKind::Command, pos);
        let result = evaluate_full(&state, &map);
        assert!(result
            .warnings
            .iter()
            .all(|w| w.code != WarningCode::InsufficientBudget));
        assert!(result.buildability);
    }

    #[test]
    fn test_check_buildability_order() {
        let map = flat_map(0);
        let pos = buildable(&map, 3);
        let outpost = Outpost {
            id: OutpostId(0),
            kind: OutpostKind::Power,
            position: pos,
            status: OutpostStatus::Provisional,
        };
        assert!(check_buildability(&outpost, &map, f64::INFINITY).is_ok());
        assert!(matches!(
            check_buildability(&outpost, &map, 0.0),
            Err(BuildIssue::InsufficientBudget { .. })
        ));
        let off = Outpost {
            position: Position::new(80, 0),
            ..outpost
        };
        assert_eq!(
            check_buildability(&off, &map, 0.0),
            Err(BuildIssue::OutOfBounds)
        );
    }

    #[test]
    fn test_power_deficit_penalty() {
        let map = flat_map(0);
        // A lone command outpost draws 50 kW with nothing generating.
        let state = place(
            &GameState::new(Mission::reference()),
            OutpostKind::Command,
            buildable(&map, 0),
        );
        let result = evaluate_full(&state, &map);
        assert_eq!(result.power_balance, -50.0);
        assert!(!result.is_valid);
        assert!(result.comm_connectivity);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::PowerDeficit));
        assert!((result.stability - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_empty_state_has_thin_margin() {
        let map = flat_map(0);
        let state = GameState::new(Mission::reference());
        let result = evaluate_full(&state, &map);
        assert_eq!(result.power_balance, 0.0);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WarningCode::LowPowerMargin);
        assert!((result.stability - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_disconnected_penalty() {
        let map = flat_map(0);
        let mut state = GameState::new(Mission::reference());
        state = place(&state, OutpostKind::Mining, Position::new(1, 1));
        state = place(&state, OutpostKind::Mining, Position::new(2, 1));
        let (result, network) = evaluate_full_with_network(&state, &map);
        assert!(!result.comm_connectivity);
        assert!(!network.is_connected);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::DisconnectedNetwork));
    }

    #[test]
    fn test_reports_mark_unreachable() {
        let map = flat_map(0);
        let mut state = GameState::new(Mission::reference());
        state = place(&state, OutpostKind::Command, Position::new(0, 0));
        // Off-map and out of range of command
        state = place(&state, OutpostKind::Research, Position::new(500, 500));
        let (result, network) = evaluate_full_with_network(&state, &map);
        let reports = outpost_reports(&state.outposts, &result, &network);
        assert_eq!(reports.len(), 2);
        assert!(reports[1].is_unstable);
        assert_eq!(reports[1].warnings[0].code, WarningCode::OutOfBounds);
    }

    #[test]
    fn test_full_is_idempotent() {
        let map = LunarMap::generate(0, &TerrainSeed::new(9));
        let mut state = GameState::new(Mission::reference());
        state = place(&state, OutpostKind::Command, Position::new(10, 10));
        state = place(&state, OutpostKind::Power, Position::new(70, 50));
        state = place(&state, OutpostKind::Comm, Position::new(40, 30));
        assert_eq!(evaluate_full(&state, &map), evaluate_full(&state, &map));
    }

    #[test]
    fn test_harsh_terrain_penalty() {
        let map = LunarMap::generate(0, &TerrainSeed::new(42));
        let harsh = map
            .cells()
            .find(|c| c.terrain.roughness > 0.9)
            .map(|c| c.position)
            .unwrap();
        let start = GameState::new(Mission::reference());
        let on_harsh = place(&start, OutpostKind::Command, harsh);
        let on_good = place(&start, OutpostKind::Command, buildable(&map, 0));

        assert!(matches!(
            check_buildability(&on_harsh.outposts[0], &map, f64::INFINITY),
            Err(BuildIssue::TerrainTooHarsh { .. })
        ));

        let harsh_result = evaluate_full(&on_harsh, &map);
        let good_result = evaluate_full(&on_good, &map);
        let warning = harsh_result
            .warnings
            .iter()
            .find(|w| w.code == WarningCode::TerrainTooHarsh)
            .unwrap();
        assert_eq!(warning.outpost, Some(on_harsh.outposts[0].id));
        assert!(harsh_result.buildability);
        // Power deficit (-0.4) on both, harsh terrain (-0.3) on one
        assert!((good_result.stability - 0.6).abs() < 1e-12);
        assert!((harsh_result.stability - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_unstable_link_penalty() {
        // Night keeps generation under the 55 kW draw
        let map = flat_map(7);
        let command_at = buildable(&map, 0);
        let power_at = map
            .cells()
            .filter(|c| c.terrain.roughness <= 0.9 && c.terrain.slope <= 0.9)
            .map(|c| c.position)
            .find(|p| (80.0..140.0).contains(&distance(command_at, *p)))
            .unwrap();

        let mut state = GameState::new(Mission::reference());
        state = place(&state, OutpostKind::Command, command_at);
        state = place(&state, OutpostKind::Power, power_at);
        let (result, network) = evaluate_full_with_network(&state, &map);

        assert!(result.comm_connectivity);
        assert!(result.power_balance < 0.0);
        let codes: Vec<_> = result.warnings.iter().map(|w| w.code).collect();
        assert_eq!(codes, [WarningCode::PowerDeficit, WarningCode::UnstableLink]);
        assert!((result.stability - (1.0 - 0.4 - 0.1)).abs() < 1e-12);

        // The link warning is listed for both endpoints
        assert_eq!(result.warnings[1].outpost, None);
        let reports = outpost_reports(&state.outposts, &result, &network);
        for (report, outpost) in reports.iter().zip(&state.outposts) {
            assert!(report.is_unstable);
            assert_eq!(report.warnings.len(), 1);
            assert_eq!(report.warnings[0].code, WarningCode::UnstableLink);
            assert_eq!(report.warnings[0].outpost, Some(outpost.id));
        }
    }
}
