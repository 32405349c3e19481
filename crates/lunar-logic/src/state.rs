//! Turn state and the pure transitions that produce new snapshots.
//!
//! Every transition takes `&GameState` and returns a fresh `GameState`;
//! the input is never touched. Evaluation results (links, scores, per-outpost
//! flags) are not stored here: see [`crate::session::Evaluation`].

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::constants::{HISTORY_CAPACITY, REMOVAL_REFUND};
use crate::map::Position;
use crate::mission::{Mission, MissionViolation};
use crate::outpost::{Outpost, OutpostId, OutpostKind, OutpostStatus};

/// Everything the player can change in a turn, frozen for undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub day: u32,
    pub budget: f64,
    pub outposts: Vec<Outpost>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub mission: Mission,
    pub day: u32,
    /// Remaining budget. Can go negative through [`place`].
    pub budget: f64,
    pub outposts: Vec<Outpost>,
    /// Next id to issue. Only ever increases, undo included.
    pub next_outpost_id: u32,
    /// Earlier turns, oldest first. Capped at `HISTORY_CAPACITY`.
    pub history: VecDeque<TurnSnapshot>,
}

impl GameState {
    /// Day 0, full budget, no outposts.
    pub fn new(mission: Mission) -> Self {
        let budget = mission.budget;
        Self {
            mission,
            day: 0,
            budget,
            outposts: Vec::new(),
            next_outpost_id: 0,
            history: VecDeque::new(),
        }
    }

    fn snapshot(&self) -> TurnSnapshot {
        TurnSnapshot {
            day: self.day,
            budget: self.budget,
            outposts: self.outposts.clone(),
        }
    }
}

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Add a provisional outpost and charge its full base cost.
///
/// No affordability check: callers that care use [`can_afford`] first.
pub fn place(state: &GameState, kind: OutpostKind, position: Position) -> GameState {
    let mut next = state.clone();
    let id = OutpostId(next.next_outpost_id);
    next.next_outpost_id += 1;
    next.outposts.push(Outpost {
        id,
        kind,
        position,
        status: OutpostStatus::Provisional,
    });
    next.budget -= kind.metadata().cost;

    if next.budget < 0.0 {
        log::warn!(
            "Placing {} drove budget negative ({:.0})",
            kind,
            next.budget
        );
    }
    next
}

/// Move an outpost. A move always returns it to provisional.
pub fn move_outpost(state: &GameState, id: OutpostId, position: Position) -> GameState {
    let mut next = state.clone();
    if let Some(outpost) = next.outposts.iter_mut().find(|o| o.id == id) {
        outpost.position = position;
        outpost.status = OutpostStatus::Provisional;
    }
    next
}

/// Demolish an outpost, refunding half its base cost (not the
/// terrain-adjusted cost). Unknown ids leave the state unchanged.
pub fn remove(state: &GameState, id: OutpostId) -> GameState {
    let mut next = state.clone();
    if let Some(index) = next.outposts.iter().position(|o| o.id == id) {
        let outpost = next.outposts.remove(index);
        next.budget += outpost.kind.metadata().cost * REMOVAL_REFUND;
    }
    next
}

/// Lock a single outpost in.
pub fn confirm(state: &GameState, id: OutpostId) -> GameState {
    let mut next = state.clone();
    if let Some(outpost) = next.outposts.iter_mut().find(|o| o.id == id) {
        outpost.status = OutpostStatus::Confirmed;
    }
    next
}

/// Lock every outpost in. Idempotent.
pub fn confirm_all(state: &GameState) -> GameState {
    let mut next = state.clone();
    for outpost in &mut next.outposts {
        outpost.status = OutpostStatus::Confirmed;
    }
    next
}

/// Push the current turn onto history and move to the next day.
///
/// Does not regenerate the map or re-evaluate; the session does that.
pub fn advance_turn(state: &GameState) -> GameState {
    let mut next = state.clone();
    if next.history.len() >= HISTORY_CAPACITY {
        next.history.pop_front();
    }
    next.history.push_back(state.snapshot());
    next.day += 1;

    log::info!("Advanced to day {} (budget {:.0})", next.day, next.budget);
    next
}

/// Restore the most recent snapshot, or `None` when history is empty.
pub fn undo(state: &GameState) -> Option<GameState> {
    let mut history = state.history.clone();
    let previous = history.pop_back()?;

    log::info!("Undo: day {} -> day {}", state.day, previous.day);
    Some(GameState {
        mission: state.mission.clone(),
        day: previous.day,
        budget: previous.budget,
        outposts: previous.outposts,
        next_outpost_id: state.next_outpost_id,
        history,
    })
}

// ============================================================================
// QUERIES
// ============================================================================

pub fn outpost(state: &GameState, id: OutpostId) -> Option<&Outpost> {
    state.outposts.iter().find(|o| o.id == id)
}

pub fn count_by_kind(state: &GameState, kind: OutpostKind) -> usize {
    state.outposts.iter().filter(|o| o.kind == kind).count()
}

/// Base cost fits in the remaining budget.
pub fn can_afford(state: &GameState, kind: OutpostKind) -> bool {
    state.budget >= kind.metadata().cost
}

pub fn is_mission_complete(state: &GameState) -> bool {
    state.day >= state.mission.duration
}

/// Informational mission rule check; never blocks an action.
pub fn check_mission_constraints(state: &GameState) -> Vec<MissionViolation> {
    state.mission.check_constraints(&state.outposts)
}
