//! Orchestration layer: sequences transitions, map regeneration, and
//! evaluation for a single game.
//!
//! A `Session` owns the terrain seed, the live state, the map for the
//! current day, and the last full evaluation. Every mutation re-runs the
//! full evaluation so derived values can never drift out of sync.
//!
//! ```
//! use lunar_logic::map::Position;
//! use lunar_logic::mission::Mission;
//! use lunar_logic::outpost::OutpostKind;
//! use lunar_logic::session::Session;
//! use lunar_logic::terrain::TerrainSeed;
//!
//! let mut session = Session::new(Mission::reference(), TerrainSeed::new(42)).unwrap();
//! session.place(OutpostKind::Command, Position::new(40, 30)).unwrap();
//! session.place(OutpostKind::Power, Position::new(45, 30)).unwrap();
//! session.confirm_turn().unwrap();
//! assert_eq!(session.state().day, 1);
//! assert!(session.evaluation().constraints.comm_connectivity);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constraints::{
    evaluate_full_with_network, evaluate_light, outpost_reports, ConstraintResult, OutpostReport,
};
use crate::map::{LunarMap, Position};
use crate::mission::{Mission, MissionError, MissionViolation};
use crate::network::CommLink;
use crate::outpost::{OutpostId, OutpostKind};
use crate::scoring::{calculate_scores, Scores};
use crate::state::{self, GameState};
use crate::terrain::TerrainSeed;

/// Everything derived from `(state, map)` in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub constraints: ConstraintResult,
    pub links: Vec<CommLink>,
    pub scores: Scores,
    pub reports: Vec<OutpostReport>,
}

impl Evaluation {
    /// Full constraint pass, network, scores, and per-outpost flags.
    pub fn compute(state: &GameState, map: &LunarMap) -> Self {
        let (constraints, network) = evaluate_full_with_network(state, map);
        let scores = calculate_scores(state, map, &constraints);
        let reports = outpost_reports(&state.outposts, &constraints, &network);
        Self {
            constraints,
            links: network.links,
            scores,
            reports,
        }
    }

    pub fn report(&self, id: OutpostId) -> Option<&OutpostReport> {
        self.reports.iter().find(|r| r.id == id)
    }
}

/// A session-level action that was refused. The state is unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActionError {
    #[error("cannot afford {kind}: costs {cost:.0}, budget {budget:.0}")]
    InsufficientBudget {
        kind: OutpostKind,
        cost: f64,
        budget: f64,
    },
    #[error("no outpost with id {0}")]
    UnknownOutpost(OutpostId),
    #[error("mission is complete")]
    MissionComplete,
}

#[derive(Debug, Clone)]
pub struct Session {
    terrain: TerrainSeed,
    state: GameState,
    map: LunarMap,
    evaluation: Evaluation,
}

impl Session {
    /// Day 0 of `mission` on terrain generated from `terrain`.
    ///
    /// The mission is validated first; scores are relative to its budget,
    /// so a non-positive budget is refused here.
    pub fn new(mission: Mission, terrain: TerrainSeed) -> Result<Self, MissionError> {
        if let Some(err) = mission.validate().into_iter().next() {
            log::warn!("Rejected mission '{}': {}", mission.id, err);
            return Err(err);
        }

        let state = GameState::new(mission);
        let map = LunarMap::generate(state.day, &terrain);
        let evaluation = Evaluation::compute(&state, &map);
        log::info!(
            "Session started: mission '{}', budget {:.0}, {} days, terrain seed {}",
            state.mission.name,
            state.budget,
            state.mission.duration,
            terrain.seed
        );
        Ok(Self {
            terrain,
            state,
            map,
            evaluation,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn map(&self) -> &LunarMap {
        &self.map
    }

    pub fn terrain(&self) -> &TerrainSeed {
        &self.terrain
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn is_complete(&self) -> bool {
        state::is_mission_complete(&self.state)
    }

    pub fn mission_violations(&self) -> Vec<MissionViolation> {
        state::check_mission_constraints(&self.state)
    }

    /// Place a new provisional outpost. Refused when its base cost exceeds
    /// the remaining budget. Returns the new outpost's id.
    pub fn place(&mut self, kind: OutpostKind, position: Position) -> Result<OutpostId, ActionError> {
        self.ensure_running()?;
        if !state::can_afford(&self.state, kind) {
            let err = ActionError::InsufficientBudget {
                kind,
                cost: kind.metadata().cost,
                budget: self.state.budget,
            };
            log::warn!("Rejected placement: {}", err);
            return Err(err);
        }

        let next = state::place(&self.state, kind, position);
        let id = OutpostId(self.state.next_outpost_id);
        self.commit(next);
        Ok(id)
    }

    pub fn move_outpost(&mut self, id: OutpostId, position: Position) -> Result<&Evaluation, ActionError> {
        self.ensure_running()?;
        self.ensure_known(id)?;
        let next = state::move_outpost(&self.state, id, position);
        self.commit(next);
        Ok(&self.evaluation)
    }

    pub fn remove(&mut self, id: OutpostId) -> Result<&Evaluation, ActionError> {
        self.ensure_running()?;
        self.ensure_known(id)?;
        let next = state::remove(&self.state, id);
        self.commit(next);
        Ok(&self.evaluation)
    }

    /// Light evaluation of a hypothetical move, for drag feedback. The
    /// session itself is not changed.
    pub fn preview_move(&self, id: OutpostId, position: Position) -> Result<ConstraintResult, ActionError> {
        self.ensure_known(id)?;
        let candidate = state::move_outpost(&self.state, id, position);
        Ok(evaluate_light(&candidate, &self.map))
    }

    /// Confirm every outpost, advance one day, regenerate the map for the
    /// new day, and re-evaluate. An empty base still advances.
    pub fn confirm_turn(&mut self) -> Result<&Evaluation, ActionError> {
        self.ensure_running()?;

        let confirmed = state::confirm_all(&self.state);
        let advanced = state::advance_turn(&confirmed);
        self.map = LunarMap::generate(advanced.day, &self.terrain);
        self.commit(advanced);

        if self.is_complete() {
            log::info!(
                "Mission complete on day {}: overall score {:.1}",
                self.state.day,
                self.evaluation.scores.overall
            );
        }
        Ok(&self.evaluation)
    }

    /// Step back one turn. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = state::undo(&self.state) else {
            return false;
        };
        self.map = LunarMap::generate(previous.day, &self.terrain);
        self.commit(previous);
        true
    }

    fn commit(&mut self, next: GameState) {
        self.state = next;
        self.evaluation = Evaluation::compute(&self.state, &self.map);
    }

    fn ensure_running(&self) -> Result<(), ActionError> {
        if self.is_complete() {
            return Err(ActionError::MissionComplete);
        }
        Ok(())
    }

    fn ensure_known(&self, id: OutpostId) -> Result<(), ActionError> {
        match state::outpost(&self.state, id) {
            Some(_) => Ok(()),
            None => Err(ActionError::UnknownOutpost(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::WarningCode;

    fn session() -> Session {
        Session::new(Mission::reference(), TerrainSeed::new(42)).unwrap()
    }

    #[test]
    fn test_new_session() {
        let s = session();
        assert_eq!(s.state().day, 0);
        assert_eq!(s.map().day, 0);
        assert!(s.evaluation().links.is_empty());
        assert_eq!(s.mission_violations().len(), 2);
    }

    #[test]
    fn test_place_returns_id() {
        let mut s = session();
        let a = s.place(OutpostKind::Command, Position::new(10, 10)).unwrap();
        let b = s.place(OutpostKind::Power, Position::new(12, 10)).unwrap();
        assert_ne!(a, b);
        assert_eq!(s.state().outposts[1].id, b);
        assert_eq!(s.evaluation().links.len(), 1);
        assert_eq!(s.evaluation().reports.len(), 2);
    }

    #[test]
    fn test_place_rejects_unaffordable() {
        let mut s = session();
        for i in 0..5 {
            s.place(OutpostKind::Research, Position::new(i, 0)).unwrap();
        }
        // 500 - 450 = 50 left
        let err = s.place(OutpostKind::Mining, Position::new(9, 9)).unwrap_err();
        assert!(matches!(err, ActionError::InsufficientBudget { .. }));
        assert_eq!(s.state().outposts.len(), 5);
        assert_eq!(s.state().budget, 50.0);
    }

    #[test]
    fn test_unknown_outpost() {
        let mut s = session();
        assert_eq!(
            s.remove(OutpostId(3)).unwrap_err(),
            ActionError::UnknownOutpost(OutpostId(3))
        );
        assert!(s.move_outpost(OutpostId(3), Position::new(0, 0)).is_err());
        assert!(s.preview_move(OutpostId(3), Position::new(0, 0)).is_err());
    }

    #[test]
    fn test_remove_purges_links() {
        let mut s = session();
        s.place(OutpostKind::Command, Position::new(10, 10)).unwrap();
        let power = s.place(OutpostKind::Power, Position::new(12, 10)).unwrap();
        assert_eq!(s.evaluation().links.len(), 1);
        s.remove(power).unwrap();
        assert!(s.evaluation().links.is_empty());
        assert!(s.evaluation().links.iter().all(|l| !l.touches(power)));
    }

    #[test]
    fn test_preview_does_not_mutate() {
        let mut s = session();
        let id = s.place(OutpostKind::Command, Position::new(10, 10)).unwrap();
        let before = s.state().clone();
        let preview = s.preview_move(id, Position::new(-3, 0)).unwrap();
        assert_eq!(preview.warnings[0].code, WarningCode::OutOfBounds);
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn test_confirm_with_empty_base() {
        let mut s = session();
        let eval = s.confirm_turn().unwrap();
        assert!(eval.links.is_empty());
        assert_eq!(s.state().day, 1);
        assert_eq!(s.map().day, 1);

        // Clearing the base does not block the next turn either
        let id = s.place(OutpostKind::Command, Position::new(10, 10)).unwrap();
        s.remove(id).unwrap();
        s.confirm_turn().unwrap();
        assert_eq!(s.state().day, 2);
        assert!(s.state().outposts.is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_mission() {
        let mut mission = Mission::reference();
        mission.budget = 0.0;
        let err = Session::new(mission, TerrainSeed::new(42)).unwrap_err();
        assert!(matches!(err, MissionError::NonPositiveBudget(_)));

        let mut mission = Mission::reference();
        mission.duration = 0;
        assert!(matches!(
            Session::new(mission, TerrainSeed::new(42)),
            Err(MissionError::ZeroDuration)
        ));
    }

    #[test]
    fn test_confirm_and_undo() {
        let mut s = session();
        s.place(OutpostKind::Command, Position::new(10, 10)).unwrap();
        s.confirm_turn().unwrap();
        assert_eq!(s.state().day, 1);
        assert_eq!(s.map().day, 1);
        assert!(s.undo());
        assert_eq!(s.state().day, 0);
        assert_eq!(s.map().day, 0);
        assert!(!s.undo());
    }

    #[test]
    fn test_mission_ends() {
        let mut mission = Mission::reference();
        mission.duration = 2;
        let mut s = Session::new(mission, TerrainSeed::new(1)).unwrap();
        s.place(OutpostKind::Command, Position::new(5, 5)).unwrap();
        s.confirm_turn().unwrap();
        s.confirm_turn().unwrap();
        assert!(s.is_complete());
        assert_eq!(s.confirm_turn().unwrap_err(), ActionError::MissionComplete);
        assert!(s.place(OutpostKind::Power, Position::new(6, 5)).is_err());
        // Undo is still allowed after the final day
        assert!(s.undo());
        assert!(!s.is_complete());
    }

    #[test]
    fn test_terrain_stable_across_turns() {
        let mut s = session();
        s.place(OutpostKind::Command, Position::new(10, 10)).unwrap();
        let before: Vec<_> = s.map().cells().map(|c| c.terrain).collect();
        s.confirm_turn().unwrap();
        let after: Vec<_> = s.map().cells().map(|c| c.terrain).collect();
        assert_eq!(before, after);
    }
}
