//! Hard gates in front of the judge and the step budget bounding a run.

use serde::{Deserialize, Serialize};

use super::critique::Severity;
use super::state::DebateState;

/// Steps granted per allowed revision.
pub const STEPS_PER_REVISION: u32 = 5;
/// Flat step allowance on top of the per-revision budget.
pub const BASE_STEPS: u32 = 20;

/// Outcome of the pre-judge gates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateOutcome {
    /// No gate fired; the judge may rule.
    Proceed,
    /// The revision cap has been reached.
    RevisionCapExceeded { max_revisions: u32 },
    /// A FATAL finding is on record; only a human may rule.
    FatalSeverity,
}

impl GateOutcome {
    /// Whether the judge must be bypassed.
    pub fn should_stop(&self) -> bool {
        !matches!(self, Self::Proceed)
    }
}

impl std::fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proceed => write!(f, "proceed"),
            Self::RevisionCapExceeded { max_revisions } => {
                write!(f, "revision_cap_exceeded ({})", max_revisions)
            }
            Self::FatalSeverity => write!(f, "fatal_severity"),
        }
    }
}

/// Gates evaluated, in order, before the judge is consulted.
pub struct JudgeGate;

impl JudgeGate {
    /// Evaluate the revision cap, then the fatal gate.
    ///
    /// The cap fires even when no FATAL critique is present.
    pub fn evaluate(state: &DebateState) -> GateOutcome {
        if state.revision_count >= state.max_revisions {
            return GateOutcome::RevisionCapExceeded {
                max_revisions: state.max_revisions,
            };
        }
        if state.severity == Severity::Fatal {
            return GateOutcome::FatalSeverity;
        }
        GateOutcome::Proceed
    }
}

/// Error raised once a run has used up its step budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepBudgetExceeded {
    pub limit: u32,
}

impl std::fmt::Display for StepBudgetExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step budget of {} exhausted", self.limit)
    }
}

impl std::error::Error for StepBudgetExceeded {}

/// Counts the steps of one run against `max_revisions * 5 + 20`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepBudget {
    limit: u32,
    used: u32,
}

impl StepBudget {
    pub fn for_revisions(max_revisions: u32) -> Self {
        Self::with_limit(
            max_revisions
                .saturating_mul(STEPS_PER_REVISION)
                .saturating_add(BASE_STEPS),
        )
    }

    pub fn with_limit(limit: u32) -> Self {
        Self { limit, used: 0 }
    }

    /// Spend one step.
    pub fn tick(&mut self) -> Result<(), StepBudgetExceeded> {
        if self.used >= self.limit {
            return Err(StepBudgetExceeded { limit: self.limit });
        }
        self.used += 1;
        Ok(())
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.limit - self.used
    }
}
