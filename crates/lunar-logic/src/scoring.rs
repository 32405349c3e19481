//! Mission scoring: cost efficiency, survival, science, stability, overall.

use serde::{Deserialize, Serialize};

use crate::constants::weights;
use crate::constraints::ConstraintResult;
use crate::map::LunarMap;
use crate::outpost::OutpostKind;
use crate::state::{count_by_kind, GameState};

/// Sub-scores and their weighted blend. Only `stability` and `survival`
/// are bounded (`[0, 100]`); the rest are open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub cost: f64,
    pub survival: f64,
    pub science: f64,
    pub stability: f64,
    pub overall: f64,
}

impl Scores {
    /// Scores shown before the first evaluation: full budget, nothing else.
    pub fn initial() -> Self {
        Self {
            cost: 100.0,
            survival: 0.0,
            science: 0.0,
            stability: 0.0,
            overall: 0.0,
        }
    }
}

impl Default for Scores {
    fn default() -> Self {
        Self::initial()
    }
}

/// Score `state` against the result of a constraint pass.
///
/// The map is accepted for parity with the other evaluation stages; no
/// current rule reads it.
pub fn calculate_scores(state: &GameState, _map: &LunarMap, constraints: &ConstraintResult) -> Scores {
    let cost = state.budget / state.mission.budget * 100.0;
    let survival = constraints.stability * 100.0;

    let research = count_by_kind(state, OutpostKind::Research) as f64;
    let mining = count_by_kind(state, OutpostKind::Mining) as f64;
    let science = research * weights::SCIENCE_PER_RESEARCH + mining * weights::SCIENCE_PER_MINING;

    let stability = constraints.stability * 100.0;

    let overall = cost * weights::COST
        + survival * weights::SURVIVAL
        + science * weights::SCIENCE
        + stability * weights::STABILITY;

    Scores {
        cost,
        survival,
        science,
        stability,
        overall,
    }
}
