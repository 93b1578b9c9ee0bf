//! Debate Orchestration — Adversarial Assumption Stress Test
//!
//! State machine for a structured debate between an adversary attacking a
//! document's assumptions and a proponent defending them, with a judge
//! ruling on each non-fatal round.
//!
//! # Debate Flow
//!
//! ```text
//! Draft → extract → retrieve → critique ─┬─ FATAL ────────────────→ Broken (human)
//!                                ▲       ├─ MAJOR → defend ─┐
//!                                │       └─ MINOR/NONE ─────┤
//!                                │                          ▼
//!                                │                   [cap reached?] ─ yes → Broken (human)
//!                                │                          │ no
//!                                │                          ▼
//!                                └──── NEEDS_REVISION ─── judge ─┬─ VALIDATED → Validated
//!                                                                └─ BROKEN ───→ Broken (human)
//! ```

pub mod assumption;
pub mod critique;
pub mod guardrails;
pub mod orchestrator;
pub mod persistence;
pub mod routing;
pub mod state;
pub mod verdict;

pub use assumption::{Assumption, AssumptionCategory};
pub use critique::{Critique, CritiqueRound, Defense, DefenseRound, Severity};
pub use guardrails::{GateOutcome, JudgeGate, StepBudget, StepBudgetExceeded};
pub use orchestrator::{DebateError, DebateOrchestrator, DebatePhase, NextAction};
pub use persistence::{validate_result, IntegrityStatus, PersistenceError, StressTestResult};
pub use routing::{route_after_critique, route_after_judge, CritiqueRoute, JudgeRoute};
pub use state::{
    revision_cap_note, DebateState, PlanStatus, StatusTransition, TransitionError,
    FATAL_ESCALATION_NOTE,
};
pub use verdict::{JudgeRuling, Verdict};
