//! Routing predicates evaluated after the critique and judge steps.

use serde::{Deserialize, Serialize};

use super::critique::Severity;
use super::state::PlanStatus;

/// Where the debate goes after a critique round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CritiqueRoute {
    /// FATAL: stop and hand the plan to a human.
    Terminate,
    /// MAJOR: the proponent answers before judgment.
    Defend,
    /// MINOR or NONE: straight to the judge.
    Judge,
}

/// Where the debate goes after the judge step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JudgeRoute {
    Terminate,
    /// Loop back for another critique round.
    Critique,
}

/// Route after a critique round.
///
/// NONE goes to the judge alongside MINOR without a defense round.
pub fn route_after_critique(severity: Severity) -> CritiqueRoute {
    match severity {
        Severity::Fatal => CritiqueRoute::Terminate,
        Severity::Major => CritiqueRoute::Defend,
        Severity::Minor | Severity::None => CritiqueRoute::Judge,
    }
}

/// Route after the judge step.
pub fn route_after_judge(status: PlanStatus) -> JudgeRoute {
    if status.is_terminal() {
        JudgeRoute::Terminate
    } else {
        JudgeRoute::Critique
    }
}

impl std::fmt::Display for CritiqueRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminate => write!(f, "terminate"),
            Self::Defend => write!(f, "defend"),
            Self::Judge => write!(f, "judge"),
        }
    }
}

impl std::fmt::Display for JudgeRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminate => write!(f, "terminate"),
            Self::Critique => write!(f, "critique"),
        }
    }
}
