//! Mocked debate integration test — exercises the full debate loop
//! with deterministic scripted rounds (no oracle calls).
//!
//! Covers: orchestrator ↔ state ↔ routing ↔ guardrails ↔ persistence
//! running together in a single pass.

use coordination::debate::{
    Assumption, AssumptionCategory, Critique, DebateError, DebateOrchestrator, DebatePhase,
    Defense, IntegrityStatus, JudgeRuling, NextAction, PlanStatus, Severity, StepBudget,
    StressTestResult, Verdict, FATAL_ESCALATION_NOTE,
};
use coordination::reality::RelevanceEngine;

const PLAN: &str = "We plan to start a diesel transport business in Lusaka.";

/// Helper: scripted extraction.
fn mock_assumptions() -> Vec<Assumption> {
    vec![
        Assumption::new(
            AssumptionCategory::Operational,
            "Fuel costs will remain stable at the assumed price level.",
        ),
        Assumption::new(
            AssumptionCategory::Financial,
            "Projected profit margins are achievable.",
        ),
    ]
}

/// Helper: scripted critique round at a single severity.
fn mock_round(severity: Severity) -> Vec<Critique> {
    vec![
        Critique::new("Fuel costs will remain stable", severity)
            .with_reality("Diesel is K25.11/litre")
            .with_citation("ERB Q1 2025"),
        Critique::new("Projected profit margins are achievable.", Severity::Minor),
    ]
}

/// Helper: scripted defense answering every critique.
fn mock_defenses(critiques: &[Critique]) -> Vec<Defense> {
    critiques
        .iter()
        .map(|c| Defense {
            response_to: c.fracture.clone(),
            defense: "Partially accepted".to_string(),
            revision: "Budget for volatility".to_string(),
            mitigation: "Fuel hedging".to_string(),
        })
        .collect()
}

/// Drive a run with one scripted severity per round and a judge that
/// always returns `verdict`. Returns the outcome and the number of verdicts
/// requested.
fn drive(
    max_revisions: u32,
    severities: &[Severity],
    verdict: Verdict,
) -> (StressTestResult, usize) {
    let engine = RelevanceEngine::bundled();
    let mut orch = DebateOrchestrator::new("int-run", PLAN, max_revisions);
    let mut rounds = severities.iter();
    let mut last_round: Vec<Critique> = Vec::new();
    let mut verdicts = 0;

    loop {
        match orch.next_action() {
            NextAction::AwaitAssumptions => {
                orch.submit_assumptions(mock_assumptions()).unwrap();
            }
            NextAction::AwaitReality => {
                let ctx = engine.reality_context(PLAN);
                orch.submit_reality(ctx.context, ctx.citations).unwrap();
            }
            NextAction::AwaitCritique => {
                let severity = *rounds.next().expect("script ran out of rounds");
                last_round = mock_round(severity);
                orch.submit_critiques(last_round.clone()).unwrap();
            }
            NextAction::AwaitDefense => {
                orch.submit_defenses(mock_defenses(&last_round)).unwrap();
            }
            NextAction::AwaitVerdict => {
                verdicts += 1;
                orch.submit_verdict(JudgeRuling::new(verdict)).unwrap();
            }
            NextAction::Complete => break,
        }
    }

    (orch.outcome().unwrap(), verdicts)
}

// ── Happy path ─────────────────────────────────────────────────────

#[test]
fn test_minor_round_validates() {
    let (outcome, verdicts) = drive(3, &[Severity::Minor], Verdict::Validated);
    assert_eq!(outcome.status, PlanStatus::Validated);
    assert!(!outcome.awaiting_human);
    assert_eq!(outcome.revision_count, 0);
    assert_eq!(outcome.critique_rounds.len(), 1);
    assert!(outcome.defense_rounds.is_empty());
    assert_eq!(verdicts, 1);
}

#[test]
fn test_retrieval_feeds_citations() {
    let (outcome, _) = drive(3, &[Severity::Minor], Verdict::Validated);
    assert_eq!(outcome.fact_citations.len(), 10);
    assert!(outcome.fact_citations[0].starts_with("[1] "));
}

// ── Revision loop ──────────────────────────────────────────────────

#[test]
fn test_major_then_minor_converges() {
    let engine = RelevanceEngine::bundled();
    let mut orch = DebateOrchestrator::new("int-loop", PLAN, 3);
    orch.submit_assumptions(mock_assumptions()).unwrap();
    let ctx = engine.reality_context(PLAN);
    orch.submit_reality(ctx.context, ctx.citations).unwrap();

    let round = mock_round(Severity::Major);
    assert_eq!(
        orch.submit_critiques(round.clone()).unwrap(),
        NextAction::AwaitDefense
    );
    assert_eq!(
        orch.submit_defenses(mock_defenses(&round)).unwrap(),
        NextAction::AwaitVerdict
    );
    assert_eq!(
        orch.submit_verdict(JudgeRuling::new(Verdict::NeedsRevision))
            .unwrap(),
        NextAction::AwaitCritique
    );
    assert_eq!(orch.state().status, PlanStatus::NeedsRevision);

    orch.submit_critiques(mock_round(Severity::Minor)).unwrap();
    orch.submit_verdict(JudgeRuling::new(Verdict::Validated))
        .unwrap();

    let outcome = orch.outcome().unwrap();
    assert_eq!(outcome.status, PlanStatus::Validated);
    assert_eq!(outcome.revision_count, 1);
    assert_eq!(outcome.critique_rounds.len(), 2);
    assert_eq!(outcome.critique_rounds[1].round, 2);
    assert_eq!(outcome.defense_rounds.len(), 1);
    assert_eq!(outcome.defense_rounds[0].round, 1);
    assert_eq!(outcome.severity, Severity::Minor);
}

// ── Termination gates ──────────────────────────────────────────────

#[test]
fn test_major_major_with_one_revision_hits_cap() {
    let (outcome, verdicts) = drive(
        1,
        &[Severity::Major, Severity::Major],
        Verdict::NeedsRevision,
    );
    assert_eq!(outcome.status, PlanStatus::Broken);
    assert_eq!(outcome.revision_count, 1);
    assert!(outcome.awaiting_human);
    assert!(outcome.human_note.contains("Max revisions (1)"));
    // The judge ruled once; the cap gate stopped the second ruling.
    assert_eq!(verdicts, 1);
}

#[test]
fn test_fatal_never_reaches_judge() {
    let (outcome, verdicts) = drive(3, &[Severity::Fatal], Verdict::Validated);
    assert_eq!(outcome.status, PlanStatus::Broken);
    assert!(outcome.awaiting_human);
    assert_eq!(outcome.human_note, FATAL_ESCALATION_NOTE);
    assert_eq!(verdicts, 0);
}

#[test]
fn test_fatal_in_later_round_still_escalates() {
    let (outcome, verdicts) = drive(
        3,
        &[Severity::Major, Severity::Fatal],
        Verdict::NeedsRevision,
    );
    assert_eq!(outcome.status, PlanStatus::Broken);
    assert!(outcome.awaiting_human);
    assert_eq!(outcome.severity, Severity::Fatal);
    assert_eq!(verdicts, 1);
}

#[test]
fn test_revision_count_never_exceeds_cap() {
    for max in 0..4 {
        let severities = vec![Severity::Major; max as usize + 1];
        let (outcome, _) = drive(max, &severities, Verdict::NeedsRevision);
        assert!(outcome.status.is_terminal());
        assert!(outcome.revision_count <= max);
    }
}

#[test]
fn test_none_severity_goes_to_judge_without_defense() {
    let (outcome, verdicts) = drive(3, &[Severity::None], Verdict::Validated);
    assert_eq!(outcome.status, PlanStatus::Validated);
    assert!(outcome.defense_rounds.is_empty());
    assert_eq!(verdicts, 1);
}

// ── Budget ─────────────────────────────────────────────────────────

#[test]
fn test_step_budget_aborts_runaway_loop() {
    let mut orch = DebateOrchestrator::with_budget("int-budget", PLAN, 50, StepBudget::with_limit(6));
    orch.submit_assumptions(mock_assumptions()).unwrap();
    orch.submit_reality(String::new(), vec![]).unwrap();

    let mut error = None;
    for _ in 0..10 {
        let result = match orch.next_action() {
            NextAction::AwaitCritique => orch.submit_critiques(mock_round(Severity::Minor)),
            NextAction::AwaitVerdict => {
                orch.submit_verdict(JudgeRuling::new(Verdict::NeedsRevision))
            }
            other => panic!("unexpected action {other}"),
        };
        if let Err(e) = result {
            error = Some(e);
            break;
        }
    }
    assert!(matches!(error, Some(DebateError::BudgetExhausted(_))));
    assert_eq!(orch.budget().used(), 6);
    assert_eq!(orch.phase(), DebatePhase::Critique);
}

// ── Persistence ────────────────────────────────────────────────────

#[test]
fn test_outcome_round_trips_through_export() {
    let (outcome, _) = drive(
        1,
        &[Severity::Major, Severity::Major],
        Verdict::NeedsRevision,
    );
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("result.json");
    outcome.write_to(&path).unwrap();

    let (restored, integrity) = StressTestResult::restore(&path).unwrap();
    assert_eq!(restored, outcome);
    assert_eq!(integrity, IntegrityStatus::Valid);
}
