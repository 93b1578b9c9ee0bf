//! Defense of the plan against the latest critique round.

use coordination::{parse_blocks, Critique, DebateState, Defense, Severity};

use super::Capability;
use crate::prompts::PROPONENT_PREAMBLE;

/// Reply fields, primary first.
pub const DEFENSE_FIELDS: &[&str] = &["RESPONSE TO", "DEFENSE", "REVISION", "MITIGATION"];

/// Answers every critique of the latest round, defending or conceding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Proponent;

impl Proponent {
    fn latest_critiques(state: &DebateState) -> &[Critique] {
        state
            .latest_critique_round()
            .map(|round| round.critiques.as_slice())
            .unwrap_or(&[])
    }
}

impl Capability for Proponent {
    const NAME: &'static str = "proponent";
    type Context = DebateState;
    type Output = Vec<Defense>;

    fn role_instruction(&self) -> &'static str {
        PROPONENT_PREAMBLE
    }

    fn transcript(&self, state: &DebateState) -> String {
        let mut parts = vec![
            "ORIGINAL BUSINESS PLAN:".to_string(),
            state.document.clone(),
            "\nLATEST ADVERSARIAL CRITIQUES:".to_string(),
        ];
        for c in Self::latest_critiques(state) {
            parts.push(format!("\nFRACTURE: {}", c.fracture));
            parts.push(format!("REALITY: {}", c.reality));
            parts.push(format!("CITATION: {}", c.citation));
            parts.push(format!("VERDICT: {}", c.severity));
            parts.push(format!("IMPACT: {}", c.impact));
        }
        parts.push("\nZAMBIAN REALITY CONTEXT:".to_string());
        parts.push(state.fact_context.clone());
        parts.push(
            "\nRespond to each critique. Defend where you can, accept and revise where you must."
                .to_string(),
        );
        parts.join("\n")
    }

    fn parse(&self, reply: &str, _state: &DebateState) -> Option<Vec<Defense>> {
        let defenses: Vec<Defense> = parse_blocks(reply, DEFENSE_FIELDS)
            .iter()
            .map(|block| Defense {
                response_to: block.get_or("response_to", "").to_string(),
                defense: block.get_or("defense", "").to_string(),
                revision: block.get_or("revision", "").to_string(),
                mitigation: block.get_or("mitigation", "").to_string(),
            })
            .collect();
        (!defenses.is_empty()).then_some(defenses)
    }

    fn fallback(&self, state: &DebateState) -> Vec<Defense> {
        let critiques = Self::latest_critiques(state);
        if critiques.is_empty() {
            return vec![stance_for(Severity::Minor).defend("The plan as a whole")];
        }
        critiques
            .iter()
            .map(|c| stance_for(c.severity).defend(&c.fracture))
            .collect()
    }
}

/// Canned answer to a critique of a given severity.
struct Stance {
    defense: &'static str,
    revision: &'static str,
    mitigation: &'static str,
}

impl Stance {
    fn defend(&self, fracture: &str) -> Defense {
        Defense {
            response_to: fracture.to_string(),
            defense: self.defense.to_string(),
            revision: self.revision.to_string(),
            mitigation: self.mitigation.to_string(),
        }
    }
}

fn stance_for(severity: Severity) -> Stance {
    match severity {
        Severity::Fatal => Stance {
            defense: "ACCEPTED — this is a critical flaw requiring fundamental plan restructuring.",
            revision: "Conduct detailed feasibility study addressing this specific risk before proceeding.",
            mitigation: "Engage local consultants with sector-specific expertise to redesign this component.",
        },
        Severity::Major => Stance {
            defense: "Partially accepted — the critique identifies a real risk but the impact may be mitigable.",
            revision: "Revise financial model to incorporate realistic cost assumptions from the cited sources.",
            mitigation: "Build contingency buffer of 20-30% on affected cost lines and develop alternative supply chains.",
        },
        Severity::Minor | Severity::None => Stance {
            defense: "Noted — this is a minor optimization opportunity rather than a fundamental flaw.",
            revision: "No major revision needed; will incorporate into detailed planning phase.",
            mitigation: "Monitor this factor and adjust operations as needed.",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_round(critiques: Vec<Critique>) -> DebateState {
        let mut state = DebateState::new("pro-test", "Fresh produce delivery from Mongu.", 3);
        state.fact_context = "[1] [LOGISTICS] Rural roads impassable.".to_string();
        state.transition(coordination::PlanStatus::UnderReview, "test").unwrap();
        state.append_critique_round(critiques).unwrap();
        state
    }

    fn major_and_minor() -> Vec<Critique> {
        vec![
            Critique::new("Fuel stays at K20", Severity::Major)
                .with_reality("Diesel is K25.11/litre")
                .with_citation("ERB Q1 2025"),
            Critique::new("Staff costs", Severity::Minor),
        ]
    }

    #[test]
    fn test_fallback_answers_every_critique_by_severity() {
        let state = state_with_round(major_and_minor());
        let defenses = Proponent.fallback(&state);
        assert_eq!(defenses.len(), 2);
        assert_eq!(defenses[0].response_to, "Fuel stays at K20");
        assert!(defenses[0].defense.starts_with("Partially accepted"));
        assert!(defenses[0].mitigation.contains("20-30%"));
        assert!(defenses[1].defense.starts_with("Noted"));
    }

    #[test]
    fn test_fatal_stance_accepts() {
        let state = state_with_round(vec![Critique::new("Roads", Severity::Fatal)]);
        let defenses = Proponent.fallback(&state);
        assert!(defenses[0].defense.starts_with("ACCEPTED"));
    }

    #[test]
    fn test_fallback_without_critiques_is_never_empty() {
        let state = DebateState::new("pro-empty", "plan", 3);
        assert_eq!(Proponent.fallback(&state).len(), 1);
    }

    #[test]
    fn test_parse_blocks() {
        let reply = "\
RESPONSE TO: Fuel stays at K20
DEFENSE: ACCEPTED: revision needed
REVISION: Budget K26/litre
MITIGATION: Forward contract with a supplier

RESPONSE TO: Staff costs
DEFENSE: NAPSA contributions already included
";
        let state = state_with_round(major_and_minor());
        let defenses = Proponent.parse(reply, &state).unwrap();
        assert_eq!(defenses.len(), 2);
        assert_eq!(defenses[0].revision, "Budget K26/litre");
        assert_eq!(defenses[1].response_to, "Staff costs");
        assert_eq!(defenses[1].mitigation, "");
    }

    #[test]
    fn test_parse_without_blocks_is_empty() {
        let state = state_with_round(major_and_minor());
        assert!(Proponent.parse("The plan is fine.", &state).is_none());
    }

    #[test]
    fn test_transcript_lists_latest_critiques() {
        let state = state_with_round(major_and_minor());
        let transcript = Proponent.transcript(&state);
        assert!(transcript.starts_with("ORIGINAL BUSINESS PLAN:\nFresh produce"));
        assert!(transcript.contains("\nFRACTURE: Fuel stays at K20\nREALITY: Diesel is K25.11/litre"));
        assert!(transcript.contains("VERDICT: MAJOR"));
        assert!(transcript.contains("\nZAMBIAN REALITY CONTEXT:\n[1] [LOGISTICS]"));
        assert!(transcript.ends_with("accept and revise where you must."));
    }
}
