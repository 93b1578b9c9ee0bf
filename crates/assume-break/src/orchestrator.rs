//! Run driver: walks the debate state machine, serving each step from a
//! capability or the retrieval engine.
//!
//! ```text
//! Extract ─▶ Retrieve ─▶ Critique ─┬─ FATAL ────────────▶ Broken (human)
//!                          ▲       ├─ MAJOR ─▶ Defend ─┐
//!                          │       └─ MINOR/NONE ──────┤
//!                          │                           ▼
//!                          └──── NEEDS_REVISION ◀── Judge ─▶ Validated / Broken
//! ```
//!
//! A run never fails. A state machine error or a panic inside an oracle
//! restarts the run with every capability on its fallback; if that fails
//! too, the plan is escalated to a human with an internal-fault note.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use coordination::{DebateError, DebateOrchestrator, DebateState, NextAction, PlanStatus};
use coordination::{RelevanceEngine, StressTestResult};
use futures::FutureExt;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::agents::{execute, Adversary, Extractor, Judge, Proponent, Strategy};
use crate::config::Settings;
use crate::oracle::{AnthropicOracle, RetryingOracle};
use crate::prompts::PROMPT_VERSION;

/// Why a run attempt did not reach a terminal status.
#[derive(Debug, Error)]
pub enum RunFault {
    #[error("debate state machine error: {0}")]
    Debate(#[from] DebateError),

    #[error("capability panicked: {0}")]
    Panicked(String),

    #[error("debate ended without an outcome")]
    NoOutcome,
}

/// Note recorded on a plan whose run could not complete.
pub fn internal_fault_note(fault: &RunFault) -> String {
    format!(
        "Internal fault during stress test ({}). Plan needs external review.",
        fault
    )
}

struct FailedRun {
    fault: RunFault,
    state: DebateState,
}

/// Stress-tests documents. Cheap to share; runs are independent.
#[derive(Clone)]
pub struct StressTester {
    engine: Arc<RelevanceEngine>,
    strategy: Strategy,
    default_max_revisions: u32,
}

impl StressTester {
    pub fn new(engine: Arc<RelevanceEngine>, strategy: Strategy, default_max_revisions: u32) -> Self {
        Self {
            engine,
            strategy,
            default_max_revisions,
        }
    }

    /// Bundled corpus, every capability on its fallback.
    pub fn fallback_only(default_max_revisions: u32) -> Self {
        Self::new(
            Arc::new(RelevanceEngine::bundled()),
            Strategy::FallbackOnly,
            default_max_revisions,
        )
    }

    /// Bundled corpus with the Anthropic oracle behind the retry policy.
    ///
    /// Without an API key the oracle reports absent credentials on every
    /// call and capabilities fall back silently.
    pub fn from_settings(settings: &Settings) -> Self {
        let strategy = match AnthropicOracle::new(settings) {
            Ok(oracle) => {
                Strategy::Primary(Arc::new(RetryingOracle::new(oracle, settings.retry.clone())))
            }
            Err(e) => {
                warn!(error = %e, "oracle unavailable; using fallback strategies only");
                Strategy::FallbackOnly
            }
        };
        Self::new(
            Arc::new(RelevanceEngine::bundled()),
            strategy,
            settings.max_revisions,
        )
    }

    pub fn engine(&self) -> &Arc<RelevanceEngine> {
        &self.engine
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn default_max_revisions(&self) -> u32 {
        self.default_max_revisions
    }

    /// Stress-test `document`. `max_revisions` overrides the default cap.
    pub async fn run(&self, document: &str, max_revisions: Option<u32>) -> StressTestResult {
        let max_revisions = max_revisions.unwrap_or(self.default_max_revisions);
        let run_id = Uuid::new_v4().to_string();
        info!(
            run = %run_id,
            max_revisions,
            strategy = ?self.strategy,
            prompt_version = %PROMPT_VERSION,
            "stress test started"
        );

        let first = match self.attempt(&run_id, document, max_revisions, &self.strategy).await {
            Ok(result) => return finish(&run_id, result),
            Err(failed) => failed,
        };
        if self.strategy.is_fallback_only() {
            return escalate_fault(&run_id, first);
        }

        warn!(run = %run_id, fault = %first.fault, "run faulted; re-running on fallback strategies");
        match self
            .attempt(&run_id, document, max_revisions, &Strategy::FallbackOnly)
            .await
        {
            Ok(result) => finish(&run_id, result),
            Err(second) => escalate_fault(&run_id, second),
        }
    }

    async fn attempt(
        &self,
        run_id: &str,
        document: &str,
        max_revisions: u32,
        strategy: &Strategy,
    ) -> Result<StressTestResult, FailedRun> {
        let mut orchestrator = DebateOrchestrator::new(run_id, document, max_revisions);
        let driven = AssertUnwindSafe(self.drive(&mut orchestrator, document, strategy))
            .catch_unwind()
            .await;

        let fault = match driven {
            Ok(Ok(())) => match orchestrator.outcome() {
                Some(result) => return Ok(result),
                None => RunFault::NoOutcome,
            },
            Ok(Err(e)) => RunFault::Debate(e),
            Err(payload) => RunFault::Panicked(panic_message(payload.as_ref())),
        };
        Err(FailedRun {
            fault,
            state: orchestrator.into_state(),
        })
    }

    async fn drive(
        &self,
        orchestrator: &mut DebateOrchestrator,
        document: &str,
        strategy: &Strategy,
    ) -> Result<(), DebateError> {
        loop {
            match orchestrator.next_action() {
                NextAction::AwaitAssumptions => {
                    let response = execute(&Extractor, strategy, document).await;
                    orchestrator.submit_assumptions(response.into_payload())?;
                }
                NextAction::AwaitReality => {
                    let reality = self.engine.reality_context(document);
                    orchestrator.submit_reality(reality.context, reality.citations)?;
                }
                NextAction::AwaitCritique => {
                    let response = execute(&Adversary, strategy, orchestrator.state()).await;
                    orchestrator.submit_critiques(response.into_payload())?;
                }
                NextAction::AwaitDefense => {
                    let response = execute(&Proponent, strategy, orchestrator.state()).await;
                    orchestrator.submit_defenses(response.into_payload())?;
                }
                NextAction::AwaitVerdict => {
                    let response = execute(&Judge, strategy, orchestrator.state()).await;
                    orchestrator.submit_verdict(response.into_payload())?;
                }
                NextAction::Complete => return Ok(()),
            }
        }
    }
}

fn finish(run_id: &str, result: StressTestResult) -> StressTestResult {
    info!(run = %run_id, "{}", result.summary_line());
    result
}

/// Last resort: break the plan and hand it to a human.
fn escalate_fault(run_id: &str, failed: FailedRun) -> StressTestResult {
    let FailedRun { fault, mut state } = failed;
    error!(run = %run_id, fault = %fault, "stress test could not complete");

    let note = internal_fault_note(&fault);
    if state.status == PlanStatus::Draft {
        if let Err(e) = state.transition(PlanStatus::UnderReview, "internal fault") {
            error!(run = %run_id, error = %e, "could not open review for escalation");
        }
    }
    if let Err(e) = state.escalate(&note) {
        error!(run = %run_id, error = %e, "could not escalate faulted run");
    }
    state.snapshot()
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
