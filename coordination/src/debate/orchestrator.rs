//! Debate orchestrator — drives extract → retrieve → critique → defend →
//! judge, looping until the plan is validated or broken.
//!
//! The orchestrator performs no I/O. A driver asks [`DebateOrchestrator::next_action`]
//! what is needed, produces it (oracle, fallback, or retrieval), and submits
//! it back. Every submission spends one step of the run's [`StepBudget`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::assumption::Assumption;
use super::critique::{Critique, Defense};
use super::guardrails::{GateOutcome, JudgeGate, StepBudget, StepBudgetExceeded};
use super::persistence::StressTestResult;
use super::routing::{route_after_critique, route_after_judge, CritiqueRoute, JudgeRoute};
use super::state::{revision_cap_note, DebateState, TransitionError, FATAL_ESCALATION_NOTE};
use super::verdict::JudgeRuling;

/// Step the debate is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebatePhase {
    Extract,
    Retrieve,
    Critique,
    Defend,
    Judge,
    Complete,
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extract => write!(f, "extract"),
            Self::Retrieve => write!(f, "retrieve"),
            Self::Critique => write!(f, "critique"),
            Self::Defend => write!(f, "defend"),
            Self::Judge => write!(f, "judge"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// What the orchestrator expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextAction {
    /// Extract assumptions from the document.
    AwaitAssumptions,
    /// Retrieve ground-truth facts for the document.
    AwaitReality,
    /// Critique the current assumptions.
    AwaitCritique,
    /// Defend against the latest critique round.
    AwaitDefense,
    /// Rule on the debate so far.
    AwaitVerdict,
    /// Debate is complete — call `outcome()`.
    Complete,
}

impl std::fmt::Display for NextAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitAssumptions => write!(f, "await_assumptions"),
            Self::AwaitReality => write!(f, "await_reality"),
            Self::AwaitCritique => write!(f, "await_critique"),
            Self::AwaitDefense => write!(f, "await_defense"),
            Self::AwaitVerdict => write!(f, "await_verdict"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Error from the debate orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebateError {
    /// Status transition failed.
    TransitionFailed(String),
    /// Debate was already completed.
    AlreadyComplete,
    /// Invalid operation for current phase.
    InvalidPhase { expected: String, actual: String },
    /// The run used up its step budget.
    BudgetExhausted(StepBudgetExceeded),
}

impl std::fmt::Display for DebateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TransitionFailed(msg) => write!(f, "transition failed: {}", msg),
            Self::AlreadyComplete => write!(f, "debate already complete"),
            Self::InvalidPhase { expected, actual } => {
                write!(f, "expected phase {}, got {}", expected, actual)
            }
            Self::BudgetExhausted(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DebateError {}

impl From<TransitionError> for DebateError {
    fn from(e: TransitionError) -> Self {
        Self::TransitionFailed(e.to_string())
    }
}

impl From<StepBudgetExceeded> for DebateError {
    fn from(e: StepBudgetExceeded) -> Self {
        Self::BudgetExhausted(e)
    }
}

/// The debate state machine for one run.
pub struct DebateOrchestrator {
    state: DebateState,
    phase: DebatePhase,
    budget: StepBudget,
}

impl DebateOrchestrator {
    /// Create an orchestrator over a fresh `Draft` state.
    pub fn new(run_id: &str, document: &str, max_revisions: u32) -> Self {
        Self::with_budget(
            run_id,
            document,
            max_revisions,
            StepBudget::for_revisions(max_revisions),
        )
    }

    /// Create an orchestrator with an explicit step budget.
    pub fn with_budget(
        run_id: &str,
        document: &str,
        max_revisions: u32,
        budget: StepBudget,
    ) -> Self {
        Self {
            state: DebateState::new(run_id, document, max_revisions),
            phase: DebatePhase::Extract,
            budget,
        }
    }

    /// What action is expected next.
    pub fn next_action(&self) -> NextAction {
        match self.phase {
            DebatePhase::Extract => NextAction::AwaitAssumptions,
            DebatePhase::Retrieve => NextAction::AwaitReality,
            DebatePhase::Critique => NextAction::AwaitCritique,
            DebatePhase::Defend => NextAction::AwaitDefense,
            DebatePhase::Judge => NextAction::AwaitVerdict,
            DebatePhase::Complete => NextAction::Complete,
        }
    }

    /// Submit extracted assumptions.
    pub fn submit_assumptions(
        &mut self,
        assumptions: Vec<Assumption>,
    ) -> Result<NextAction, DebateError> {
        self.begin_step(DebatePhase::Extract)?;
        info!(
            run = %self.state.id,
            count = assumptions.len(),
            "assumptions extracted"
        );
        self.state.record_assumptions(assumptions)?;
        self.phase = DebatePhase::Retrieve;
        Ok(self.next_action())
    }

    /// Submit the rendered ground-truth context and its citations.
    pub fn submit_reality(
        &mut self,
        context: String,
        citations: Vec<String>,
    ) -> Result<NextAction, DebateError> {
        self.begin_step(DebatePhase::Retrieve)?;
        debug!(run = %self.state.id, citations = citations.len(), "reality retrieved");
        self.state.record_reality(context, citations);
        self.phase = DebatePhase::Critique;
        Ok(self.next_action())
    }

    /// Submit a critique round and route on its severity.
    pub fn submit_critiques(
        &mut self,
        critiques: Vec<Critique>,
    ) -> Result<NextAction, DebateError> {
        self.begin_step(DebatePhase::Critique)?;
        let round = self.state.append_critique_round(critiques)?;
        let route = route_after_critique(self.state.severity);
        info!(
            run = %self.state.id,
            round,
            severity = %self.state.severity,
            route = %route,
            "critique round recorded"
        );

        match route {
            CritiqueRoute::Terminate => self.complete(),
            CritiqueRoute::Defend => self.phase = DebatePhase::Defend,
            CritiqueRoute::Judge => self.enter_judge()?,
        }
        Ok(self.next_action())
    }

    /// Submit the defense of the latest critique round.
    pub fn submit_defenses(&mut self, defenses: Vec<Defense>) -> Result<NextAction, DebateError> {
        self.begin_step(DebatePhase::Defend)?;
        let round = self.state.append_defense_round(defenses);
        debug!(run = %self.state.id, round, "defense round recorded");
        self.enter_judge()?;
        Ok(self.next_action())
    }

    /// Submit the judge's ruling and route on the resulting status.
    pub fn submit_verdict(&mut self, ruling: JudgeRuling) -> Result<NextAction, DebateError> {
        self.begin_step(DebatePhase::Judge)?;
        self.state.apply_verdict(ruling.verdict, &ruling.note())?;
        info!(
            run = %self.state.id,
            verdict = %ruling.verdict,
            revision = self.state.revision_count,
            "judge ruled"
        );

        match route_after_judge(self.state.status) {
            JudgeRoute::Terminate => self.complete(),
            JudgeRoute::Critique => self.phase = DebatePhase::Critique,
        }
        Ok(self.next_action())
    }

    /// Whether the debate has completed.
    pub fn is_complete(&self) -> bool {
        self.phase == DebatePhase::Complete
    }

    /// Snapshot of the outcome (only valid after completion).
    pub fn outcome(&self) -> Option<StressTestResult> {
        if !self.is_complete() {
            return None;
        }
        Some(self.state.snapshot())
    }

    pub fn state(&self) -> &DebateState {
        &self.state
    }

    pub fn into_state(self) -> DebateState {
        self.state
    }

    pub fn phase(&self) -> DebatePhase {
        self.phase
    }

    pub fn budget(&self) -> &StepBudget {
        &self.budget
    }

    fn begin_step(&mut self, expected: DebatePhase) -> Result<(), DebateError> {
        if self.phase == DebatePhase::Complete {
            return Err(DebateError::AlreadyComplete);
        }
        if self.phase != expected {
            return Err(DebateError::InvalidPhase {
                expected: expected.to_string(),
                actual: self.phase.to_string(),
            });
        }
        self.budget.tick()?;
        Ok(())
    }

    /// Evaluate the hard gates; only reach the judge phase if none fires.
    fn enter_judge(&mut self) -> Result<(), DebateError> {
        match JudgeGate::evaluate(&self.state) {
            GateOutcome::Proceed => {
                self.phase = DebatePhase::Judge;
            }
            GateOutcome::RevisionCapExceeded { max_revisions } => {
                info!(run = %self.state.id, max_revisions, "revision cap reached");
                self.state.escalate(&revision_cap_note(max_revisions))?;
                self.complete();
            }
            GateOutcome::FatalSeverity => {
                info!(run = %self.state.id, "fatal severity — judge bypassed");
                self.state.escalate(FATAL_ESCALATION_NOTE)?;
                self.complete();
            }
        }
        Ok(())
    }

    fn complete(&mut self) {
        self.phase = DebatePhase::Complete;
        info!(run = %self.state.id, status = %self.state.status_line(), "debate complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::assumption::AssumptionCategory;
    use crate::debate::critique::Severity;
    use crate::debate::state::PlanStatus;
    use crate::debate::verdict::Verdict;

    fn assumptions() -> Vec<Assumption> {
        vec![Assumption::new(
            AssumptionCategory::Operational,
            "Fuel costs stay flat",
        )]
    }

    fn critiques(severity: Severity) -> Vec<Critique> {
        vec![Critique::new("Fuel costs stay flat", severity)]
    }

    fn defenses() -> Vec<Defense> {
        vec![Defense {
            response_to: "Fuel costs stay flat".to_string(),
            defense: "Partially accepted".to_string(),
            revision: "Budget for volatility".to_string(),
            mitigation: "Contingency buffer".to_string(),
        }]
    }

    fn started(max_revisions: u32) -> DebateOrchestrator {
        let mut orch = DebateOrchestrator::new("run-1", "diesel transport plan", max_revisions);
        orch.submit_assumptions(assumptions()).unwrap();
        orch.submit_reality("[1] context".to_string(), vec!["[1] src".to_string()])
            .unwrap();
        orch
    }

    #[test]
    fn test_initial_action() {
        let orch = DebateOrchestrator::new("run-1", "plan", 3);
        assert_eq!(orch.next_action(), NextAction::AwaitAssumptions);
        assert!(orch.outcome().is_none());
    }

    #[test]
    fn test_extract_then_retrieve_then_critique() {
        let mut orch = DebateOrchestrator::new("run-1", "plan", 3);
        let next = orch.submit_assumptions(assumptions()).unwrap();
        assert_eq!(next, NextAction::AwaitReality);
        assert_eq!(orch.state().status, PlanStatus::UnderReview);
        let next = orch
            .submit_reality("ctx".to_string(), vec!["c".to_string()])
            .unwrap();
        assert_eq!(next, NextAction::AwaitCritique);
    }

    #[test]
    fn test_minor_goes_straight_to_judge() {
        let mut orch = started(3);
        let next = orch.submit_critiques(critiques(Severity::Minor)).unwrap();
        assert_eq!(next, NextAction::AwaitVerdict);
        assert!(orch.state().defense_rounds.is_empty());
    }

    #[test]
    fn test_major_requires_defense() {
        let mut orch = started(3);
        let next = orch.submit_critiques(critiques(Severity::Major)).unwrap();
        assert_eq!(next, NextAction::AwaitDefense);
        let next = orch.submit_defenses(defenses()).unwrap();
        assert_eq!(next, NextAction::AwaitVerdict);
        assert_eq!(orch.state().defense_rounds[0].round, 1);
    }

    #[test]
    fn test_fatal_terminates_without_judge() {
        let mut orch = started(3);
        let next = orch.submit_critiques(critiques(Severity::Fatal)).unwrap();
        assert_eq!(next, NextAction::Complete);
        let outcome = orch.outcome().unwrap();
        assert_eq!(outcome.status, PlanStatus::Broken);
        assert!(outcome.awaiting_human);
        assert_eq!(outcome.human_note, FATAL_ESCALATION_NOTE);
    }

    #[test]
    fn test_validated_after_minor() {
        let mut orch = started(3);
        orch.submit_critiques(critiques(Severity::Minor)).unwrap();
        let next = orch
            .submit_verdict(JudgeRuling::new(Verdict::Validated))
            .unwrap();
        assert_eq!(next, NextAction::Complete);
        let outcome = orch.outcome().unwrap();
        assert!(outcome.is_validated());
        assert!(!outcome.awaiting_human);
    }

    #[test]
    fn test_needs_revision_loops_to_critique() {
        let mut orch = started(3);
        orch.submit_critiques(critiques(Severity::Major)).unwrap();
        orch.submit_defenses(defenses()).unwrap();
        let next = orch
            .submit_verdict(JudgeRuling::new(Verdict::NeedsRevision))
            .unwrap();
        assert_eq!(next, NextAction::AwaitCritique);
        assert_eq!(orch.state().revision_count, 1);
        assert_eq!(orch.state().next_round_index(), 2);
    }

    #[test]
    fn test_revision_cap_breaks_plan() {
        let mut orch = started(1);
        orch.submit_critiques(critiques(Severity::Major)).unwrap();
        orch.submit_defenses(defenses()).unwrap();
        orch.submit_verdict(JudgeRuling::new(Verdict::NeedsRevision))
            .unwrap();
        orch.submit_critiques(critiques(Severity::Major)).unwrap();
        let next = orch.submit_defenses(defenses()).unwrap();
        assert_eq!(next, NextAction::Complete);

        let outcome = orch.outcome().unwrap();
        assert_eq!(outcome.status, PlanStatus::Broken);
        assert_eq!(outcome.revision_count, 1);
        assert!(outcome.awaiting_human);
        assert!(outcome.human_note.contains("Max revisions (1)"));
    }

    #[test]
    fn test_zero_revisions_never_reaches_judge() {
        let mut orch = started(0);
        let next = orch.submit_critiques(critiques(Severity::Minor)).unwrap();
        assert_eq!(next, NextAction::Complete);
        assert_eq!(orch.state().status, PlanStatus::Broken);
    }

    #[test]
    fn test_judge_broken_awaits_human() {
        let mut orch = started(3);
        orch.submit_critiques(critiques(Severity::Minor)).unwrap();
        orch.submit_verdict(
            JudgeRuling::new(Verdict::Broken).with_reasoning("tax regime is wrong"),
        )
        .unwrap();
        let outcome = orch.outcome().unwrap();
        assert_eq!(outcome.status, PlanStatus::Broken);
        assert!(outcome.awaiting_human);
        assert!(outcome.human_note.contains("tax regime is wrong"));
    }

    #[test]
    fn test_wrong_phase_rejected() {
        let mut orch = started(3);
        let err = orch.submit_defenses(defenses()).unwrap_err();
        assert!(matches!(err, DebateError::InvalidPhase { .. }));
    }

    #[test]
    fn test_submit_after_complete_fails() {
        let mut orch = started(3);
        orch.submit_critiques(critiques(Severity::Fatal)).unwrap();
        let err = orch.submit_critiques(critiques(Severity::Minor)).unwrap_err();
        assert_eq!(err, DebateError::AlreadyComplete);
    }

    #[test]
    fn test_budget_exhaustion_surfaces() {
        let mut orch =
            DebateOrchestrator::with_budget("run-1", "plan", 3, StepBudget::with_limit(2));
        orch.submit_assumptions(assumptions()).unwrap();
        orch.submit_reality(String::new(), vec![]).unwrap();
        let err = orch.submit_critiques(critiques(Severity::Minor)).unwrap_err();
        assert!(matches!(err, DebateError::BudgetExhausted(_)));
    }

    #[test]
    fn test_error_display() {
        assert!(DebateError::AlreadyComplete
            .to_string()
            .contains("already complete"));
        let err = DebateError::InvalidPhase {
            expected: "judge".to_string(),
            actual: "critique".to_string(),
        };
        assert!(err.to_string().contains("judge"));
        let err = DebateError::BudgetExhausted(StepBudgetExceeded { limit: 7 });
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_next_action_display() {
        assert_eq!(NextAction::AwaitCritique.to_string(), "await_critique");
        assert_eq!(NextAction::Complete.to_string(), "complete");
    }
}
