//! Debate state — plan status, transitions, and the record threaded through
//! every step of a stress-test run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::assumption::Assumption;
use super::critique::{Critique, CritiqueRound, Defense, DefenseRound, Severity};
use super::persistence::StressTestResult;
use super::verdict::Verdict;

/// Status of the plan under test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    /// Run created, nothing extracted yet.
    #[default]
    Draft,
    /// Assumptions extracted; critique in progress.
    UnderReview,
    /// Judge asked for another critique round.
    NeedsRevision,
    /// Plan survived the debate.
    Validated,
    /// Plan failed, or needs a human decision.
    Broken,
}

impl PlanStatus {
    /// Whether this is a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Validated | Self::Broken)
    }

    /// Valid transitions from this status.
    pub fn valid_transitions(self) -> &'static [PlanStatus] {
        match self {
            Self::Draft => &[Self::UnderReview],
            Self::UnderReview => &[
                Self::UnderReview,
                Self::NeedsRevision,
                Self::Validated,
                Self::Broken,
            ],
            Self::NeedsRevision => &[Self::UnderReview, Self::Broken],
            Self::Validated | Self::Broken => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::UnderReview => "UNDER_REVIEW",
            Self::NeedsRevision => "NEEDS_REVISION",
            Self::Validated => "VALIDATED",
            Self::Broken => "BROKEN",
        }
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A status transition record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: PlanStatus,
    pub to: PlanStatus,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

/// Error for invalid status transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: PlanStatus,
    pub to: PlanStatus,
    pub reason: String,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid transition {} → {}: {}",
            self.from, self.to, self.reason
        )
    }
}

impl std::error::Error for TransitionError {}

/// Note recorded when a FATAL critique forces human review.
pub const FATAL_ESCALATION_NOTE: &str =
    "FATAL critique detected — human review required before proceeding.";

/// Note recorded when the revision cap forces a terminal status.
pub fn revision_cap_note(max_revisions: u32) -> String {
    format!(
        "Max revisions ({}) reached. Plan needs external review.",
        max_revisions
    )
}

/// The mutable record of one stress-test run.
///
/// Created fresh per run and mutated only through the methods below, which
/// keep the round histories append-only and the status transitions legal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateState {
    /// Run identifier.
    pub id: String,
    /// The document under test.
    pub document: String,
    /// Extracted assumptions, in extraction order.
    pub assumptions: Vec<Assumption>,
    /// Rendered ground-truth context.
    pub fact_context: String,
    /// Short citations parallel to `fact_context`.
    pub fact_citations: Vec<String>,
    pub critique_rounds: Vec<CritiqueRound>,
    pub defense_rounds: Vec<DefenseRound>,
    pub status: PlanStatus,
    /// Max severity of the latest critique round.
    pub severity: Severity,
    pub revision_count: u32,
    pub max_revisions: u32,
    pub awaiting_human: bool,
    pub human_note: String,
    /// Status transition history.
    pub transitions: Vec<StatusTransition>,
}

impl DebateState {
    /// Create a fresh `Draft` state.
    pub fn new(id: &str, document: &str, max_revisions: u32) -> Self {
        Self {
            id: id.to_string(),
            document: document.to_string(),
            assumptions: Vec::new(),
            fact_context: String::new(),
            fact_citations: Vec::new(),
            critique_rounds: Vec::new(),
            defense_rounds: Vec::new(),
            status: PlanStatus::Draft,
            severity: Severity::None,
            revision_count: 0,
            max_revisions,
            awaiting_human: false,
            human_note: String::new(),
            transitions: Vec::new(),
        }
    }

    /// Transition to a new status with a reason.
    pub fn transition(&mut self, to: PlanStatus, reason: &str) -> Result<(), TransitionError> {
        if !self.status.valid_transitions().contains(&to) {
            return Err(TransitionError {
                from: self.status,
                to,
                reason: format!(
                    "not a valid transition (allowed: {:?})",
                    self.status.valid_transitions()
                ),
            });
        }

        self.transitions.push(StatusTransition {
            from: self.status,
            to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.status = to;
        Ok(())
    }

    /// Store extracted assumptions and move the plan under review.
    pub fn record_assumptions(
        &mut self,
        assumptions: Vec<Assumption>,
    ) -> Result<(), TransitionError> {
        self.assumptions = assumptions;
        self.transition(PlanStatus::UnderReview, "assumptions extracted")
    }

    /// Store the retrieved ground-truth context.
    pub fn record_reality(&mut self, context: String, citations: Vec<String>) {
        self.fact_context = context;
        self.fact_citations = citations;
    }

    /// Append a critique round and recompute severity from it.
    ///
    /// A FATAL round breaks the plan and raises `awaiting_human` in the same
    /// step. Returns the index of the new round.
    pub fn append_critique_round(
        &mut self,
        critiques: Vec<Critique>,
    ) -> Result<u32, TransitionError> {
        let round = self.next_round_index();
        let record = CritiqueRound { round, critiques };
        let severity = record.max_severity();

        if severity == Severity::Fatal {
            self.transition(PlanStatus::Broken, "fatal critique")?;
            self.awaiting_human = true;
            self.human_note = FATAL_ESCALATION_NOTE.to_string();
        } else {
            self.transition(
                PlanStatus::UnderReview,
                &format!("critique round {} ({})", round, severity),
            )?;
        }
        self.critique_rounds.push(record);
        self.severity = severity;
        Ok(round)
    }

    /// Append a defense round answering the latest critique round.
    pub fn append_defense_round(&mut self, defenses: Vec<Defense>) -> u32 {
        let round = self.latest_critique_round().map(|r| r.round).unwrap_or(0);
        self.defense_rounds.push(DefenseRound { round, defenses });
        round
    }

    /// Force `Broken` and flag the plan for a human.
    ///
    /// Idempotent on a plan that is already broken; the note is replaced.
    pub fn escalate(&mut self, note: &str) -> Result<(), TransitionError> {
        if self.status != PlanStatus::Broken {
            self.transition(PlanStatus::Broken, note)?;
        }
        self.awaiting_human = true;
        self.human_note = note.to_string();
        Ok(())
    }

    /// Apply a judge verdict.
    pub fn apply_verdict(&mut self, verdict: Verdict, note: &str) -> Result<(), TransitionError> {
        match verdict {
            Verdict::Validated => {
                self.transition(PlanStatus::Validated, "judge validated")?;
                self.awaiting_human = false;
            }
            Verdict::Broken => {
                self.transition(PlanStatus::Broken, "judge broke the plan")?;
                self.awaiting_human = true;
                self.human_note = note.to_string();
            }
            Verdict::NeedsRevision => {
                self.transition(PlanStatus::NeedsRevision, "judge requested revision")?;
                self.awaiting_human = false;
                self.revision_count += 1;
            }
        }
        Ok(())
    }

    pub fn latest_critique_round(&self) -> Option<&CritiqueRound> {
        self.critique_rounds.last()
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_terminal()
    }

    /// Index the next critique round will carry.
    pub fn next_round_index(&self) -> u32 {
        self.critique_rounds.len() as u32 + 1
    }

    /// Plain serializable snapshot for reporting and export.
    pub fn snapshot(&self) -> StressTestResult {
        StressTestResult {
            status: self.status,
            severity: self.severity,
            assumptions: self.assumptions.clone(),
            critique_rounds: self.critique_rounds.clone(),
            defense_rounds: self.defense_rounds.clone(),
            fact_citations: self.fact_citations.clone(),
            revision_count: self.revision_count,
            awaiting_human: self.awaiting_human,
            human_note: self.human_note.clone(),
        }
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] severity={} | revision {}/{} | {} critique rounds | run={}",
            self.status,
            self.severity,
            self.revision_count,
            self.max_revisions,
            self.critique_rounds.len(),
            self.id
        )
    }
}
