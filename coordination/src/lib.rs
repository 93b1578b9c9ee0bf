//! Deterministic core of the ASSUME-BREAK stress tester.
//!
//! This library provides:
//! - The debate data model and synchronous state machine
//!   (extract → retrieve → critique → defend → judge)
//! - The relevance retrieval engine and its bundled fact corpus
//! - The structured reply grammar shared by every oracle-backed capability
//! - Retry schedules and the primary/fallback degraded-response wrapper
//!
//! Nothing here performs network I/O or needs an async runtime; the
//! `assume-break` crate drives these pieces against an oracle.
//!
//! # Usage
//!
//! ```rust,ignore
//! use coordination::debate::{DebateOrchestrator, NextAction};
//! use coordination::reality::RelevanceEngine;
//!
//! let engine = RelevanceEngine::bundled();
//! let mut orch = DebateOrchestrator::new("run-1", plan, 3);
//! while orch.next_action() != NextAction::Complete {
//!     // produce what next_action() asks for and submit it
//! }
//! let result = orch.outcome();
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod debate;
pub mod reality;
pub mod reply;
pub mod resilience;
pub mod retry;

// Re-export key debate types
pub use debate::{
    Assumption, AssumptionCategory, Critique, CritiqueRound, DebateError, DebateOrchestrator,
    DebatePhase, DebateState, Defense, DefenseRound, JudgeRuling, NextAction, PlanStatus,
    Severity, StressTestResult, Verdict,
};

// Re-export retrieval types
pub use reality::{Fact, FactCorpus, RealityContext, RelevanceEngine, ScoredFact};

// Re-export reply grammar
pub use reply::{parse_blocks, ReplyBlock};

// Re-export resilience types
pub use resilience::{
    select_strategy, DegradedResponse, PrimaryAttempt, ServedBy, StrategySelection,
};

// Re-export retry policy
pub use retry::RetryPolicy;
