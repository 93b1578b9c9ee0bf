//! Plain-text rendering of a stress-test result.

use coordination::{FactCorpus, StressTestResult};

const RULE: &str = "════════════════════════════════════════════════════════════";

/// Full report: status banner, assumptions, debate timeline, citations,
/// and the escalation note when a human is needed.
pub fn render(result: &StressTestResult) -> String {
    let mut out = String::new();
    render_banner(&mut out, result);
    render_assumptions(&mut out, result);
    render_timeline(&mut out, result);
    render_citations(&mut out, result);
    render_escalation(&mut out, result);
    out
}

fn render_banner(out: &mut String, result: &StressTestResult) {
    out.push_str(&format!("{}\n", RULE));
    out.push_str("  ASSUME-BREAK Stress Test Result\n");
    out.push_str(&format!("  PLAN STATUS:       {}\n", result.status));
    out.push_str(&format!("  Critique Severity: {}\n", result.severity));
    out.push_str(&format!("  Revision Rounds:   {}\n", result.revision_count));
    out.push_str(&format!("{}\n", RULE));
}

fn render_assumptions(out: &mut String, result: &StressTestResult) {
    if result.assumptions.is_empty() {
        return;
    }
    out.push_str("\nExtracted Assumptions\n");
    for (i, assumption) in result.assumptions.iter().enumerate() {
        out.push_str(&format!("  {:>2}. {}\n", i + 1, assumption));
    }
}

fn render_timeline(out: &mut String, result: &StressTestResult) {
    if result.critique_rounds.is_empty() {
        return;
    }
    out.push_str("\nAdversarial Debate Timeline\n");
    for round in &result.critique_rounds {
        out.push_str(&format!("  Round {}\n", round.round));
        for c in &round.critiques {
            out.push_str(&format!("    [{}] {}\n", c.severity, c.fracture));
            out.push_str(&format!("      Reality:  {}\n", or_na(&c.reality)));
            out.push_str(&format!("      Impact:   {}\n", or_na(&c.impact)));
            out.push_str(&format!("      Citation: {}\n", or_na(&c.citation)));
        }

        for defense_round in result.defense_rounds.iter().filter(|d| d.round == round.round) {
            out.push_str(&format!("  Defense Round {}\n", defense_round.round));
            for d in &defense_round.defenses {
                out.push_str(&format!("    RE: {}\n", or_na(&d.response_to)));
                for (label, value) in [
                    ("Defense", &d.defense),
                    ("Revision", &d.revision),
                    ("Mitigation", &d.mitigation),
                ] {
                    if !value.is_empty() {
                        out.push_str(&format!("      {}: {}\n", label, value));
                    }
                }
            }
        }
    }
}

fn render_citations(out: &mut String, result: &StressTestResult) {
    if result.fact_citations.is_empty() {
        return;
    }
    out.push_str("\nReality Citations\n");
    for citation in &result.fact_citations {
        out.push_str(&format!("  {}\n", citation));
    }
}

fn render_escalation(out: &mut String, result: &StressTestResult) {
    if !result.awaiting_human {
        return;
    }
    out.push_str("\nHUMAN REVIEW REQUIRED\n");
    for line in result.human_note.lines() {
        out.push_str(&format!("  {}\n", line));
    }
}

fn or_na(value: &str) -> &str {
    if value.is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Corpus listing for the `facts` command. `None` when the category filter
/// matches nothing.
pub fn render_facts(corpus: &FactCorpus, category: Option<&str>) -> Option<String> {
    let facts: Vec<_> = match category {
        Some(category) => corpus.by_category(category).collect(),
        None => corpus.iter().collect(),
    };
    if facts.is_empty() {
        return None;
    }

    let mut out = String::new();
    let mut current = "";
    for fact in &facts {
        if fact.category != current {
            current = &fact.category;
            out.push_str(&format!("\n[{}]\n", current));
        }
        out.push_str(&format!("  - {}\n", fact.statement));
        out.push_str(&format!(
            "    Source: {} ({})\n",
            fact.source, fact.effective_date
        ));
    }
    out.push_str(&format!("\nTotal: {} facts\n", facts.len()));
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordination::{
        Assumption, AssumptionCategory, Critique, CritiqueRound, Defense, DefenseRound,
        PlanStatus, Severity,
    };

    fn sample() -> StressTestResult {
        StressTestResult {
            status: PlanStatus::Broken,
            severity: Severity::Major,
            assumptions: vec![Assumption::new(
                AssumptionCategory::Operational,
                "Fuel costs will remain stable.",
            )],
            critique_rounds: vec![CritiqueRound {
                round: 1,
                critiques: vec![Critique::new("Fuel costs will remain stable.", Severity::Major)
                    .with_reality("Diesel is K25.11/litre")
                    .with_citation("ERB Q1 2025 Price Schedule")],
            }],
            defense_rounds: vec![DefenseRound {
                round: 1,
                defenses: vec![Defense {
                    response_to: "Fuel costs will remain stable.".to_string(),
                    defense: "Partially accepted".to_string(),
                    revision: String::new(),
                    mitigation: "Fuel hedging".to_string(),
                }],
            }],
            fact_citations: vec!["[1] Energy Regulation Board (2025-01)".to_string()],
            revision_count: 1,
            awaiting_human: true,
            human_note: "Max revisions (1) reached. Plan needs external review.".to_string(),
        }
    }

    #[test]
    fn test_report_sections() {
        let report = render(&sample());
        assert!(report.contains("PLAN STATUS:       BROKEN"));
        assert!(report.contains("Critique Severity: MAJOR"));
        assert!(report.contains("   1. [Operational] ASSUMPTION: Fuel costs will remain stable."));
        assert!(report.contains("    [MAJOR] Fuel costs will remain stable."));
        assert!(report.contains("      Impact:   N/A"));
        assert!(report.contains("  Defense Round 1\n    RE: Fuel costs will remain stable."));
        assert!(report.contains("      Mitigation: Fuel hedging"));
        assert!(!report.contains("Revision: "));
        assert!(report.contains("  [1] Energy Regulation Board (2025-01)"));
        assert!(report.contains("HUMAN REVIEW REQUIRED\n  Max revisions (1)"));
    }

    #[test]
    fn test_validated_report_has_no_escalation() {
        let mut result = sample();
        result.status = PlanStatus::Validated;
        result.awaiting_human = false;
        assert!(!render(&result).contains("HUMAN REVIEW REQUIRED"));
    }

    #[test]
    fn test_render_facts() {
        let corpus = FactCorpus::bundled();
        let all = render_facts(&corpus, None).unwrap();
        assert!(all.starts_with("\n[TAX]\n"));
        assert!(all.ends_with("Total: 42 facts\n"));

        let energy = render_facts(&corpus, Some("energy")).unwrap();
        assert!(energy.contains("[ENERGY]"));
        assert!(energy.ends_with("Total: 4 facts\n"));

        assert!(render_facts(&corpus, Some("ASTROLOGY")).is_none());
    }
}
