//! Mission descriptor: budget, duration, and placement rules.
//!
//! Supplied once at game start and never modified afterwards. The
//! reference mission ships as `data/reference_mission.json` and is also
//! available in code via [`Mission::reference`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::outpost::{Outpost, OutpostKind};

/// Placement rules checked (informationally) against the outpost set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionConstraints {
    pub max_outposts: usize,
    pub required_types: Vec<OutpostKind>,
}

/// Immutable mission configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Starting budget; cost scores are relative to this.
    pub budget: f64,
    /// Science score the mission briefing aims for.
    pub target_science: f64,
    /// Mission length in days. The game ends once `day >= duration`.
    pub duration: u32,
    pub constraints: MissionConstraints,
}

impl Mission {
    /// The default first mission: 500 budget, 28 days, up to 8 outposts,
    /// command and power required.
    pub fn reference() -> Self {
        Self {
            id: "mvp-mission-01".to_string(),
            name: "First Forward Base".to_string(),
            description: "Build the first sustainable forward base on the lunar surface".to_string(),
            budget: 500.0,
            target_science: 100.0,
            duration: 28,
            constraints: MissionConstraints {
                max_outposts: 8,
                required_types: vec![OutpostKind::Command, OutpostKind::Power],
            },
        }
    }

    /// Parse and validate a mission descriptor.
    pub fn from_json(json: &str) -> Result<Self, MissionError> {
        let mission: Mission = serde_json::from_str(json)?;
        if let Some(err) = mission.validate().into_iter().next() {
            return Err(err);
        }
        Ok(mission)
    }

    /// Return every problem with the descriptor's values.
    pub fn validate(&self) -> Vec<MissionError> {
        let mut errors = Vec::new();

        if !(self.budget.is_finite() && self.budget > 0.0) {
            errors.push(MissionError::NonPositiveBudget(self.budget));
        }
        if self.duration == 0 {
            errors.push(MissionError::ZeroDuration);
        }
        if self.constraints.max_outposts == 0 {
            errors.push(MissionError::ZeroMaxOutposts);
        }
        if self.constraints.required_types.len() > self.constraints.max_outposts {
            errors.push(MissionError::RequirementsExceedCap {
                required: self.constraints.required_types.len(),
                max: self.constraints.max_outposts,
            });
        }

        let mut seen = HashSet::new();
        for kind in &self.constraints.required_types {
            if !seen.insert(*kind) {
                errors.push(MissionError::DuplicateRequiredType(*kind));
            }
        }

        errors
    }

    /// Compare an outpost set against the placement rules.
    ///
    /// Informational only: violations never block an action.
    pub fn check_constraints(&self, outposts: &[Outpost]) -> Vec<MissionViolation> {
        let mut violations = Vec::new();

        if outposts.len() > self.constraints.max_outposts {
            violations.push(MissionViolation::TooManyOutposts {
                count: outposts.len(),
                max: self.constraints.max_outposts,
            });
        }

        for required in &self.constraints.required_types {
            if !outposts.iter().any(|o| o.kind == *required) {
                violations.push(MissionViolation::MissingRequiredType(*required));
            }
        }

        violations
    }
}

impl Default for Mission {
    fn default() -> Self {
        Self::reference()
    }
}

/// Problems loading a mission descriptor.
#[derive(Debug, Error)]
pub enum MissionError {
    #[error("mission descriptor is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("mission budget must be positive, got {0}")]
    NonPositiveBudget(f64),
    #[error("mission duration must be at least one day")]
    ZeroDuration,
    #[error("mission must allow at least one outpost")]
    ZeroMaxOutposts,
    #[error("{required} required outpost types cannot fit under a cap of {max}")]
    RequirementsExceedCap { required: usize, max: usize },
    #[error("required outpost type listed twice: {0}")]
    DuplicateRequiredType(OutpostKind),
}

/// A placement rule the current outpost set breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionViolation {
    TooManyOutposts { count: usize, max: usize },
    MissingRequiredType(OutpostKind),
}

impl fmt::Display for MissionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyOutposts { count, max } => {
                write!(f, "{} outposts placed, mission allows {}", count, max)
            }
            Self::MissingRequiredType(kind) => write!(f, "{} is required", kind),
        }
    }
}
