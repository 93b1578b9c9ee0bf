//! Adversarial critique against the retrieved reality context.

use coordination::{parse_blocks, Critique, DebateState, Severity};

use super::Capability;
use crate::prompts::ADVERSARY_PREAMBLE;

/// Reply fields, primary first.
pub const CRITIQUE_FIELDS: &[&str] = &["FRACTURE", "REALITY", "CITATION", "VERDICT", "IMPACT"];

/// Fracture recorded when a block carries no `FRACTURE` value.
pub const UNKNOWN_FRACTURE: &str = "Unknown assumption";

/// Attacks each assumption and grades the fractures it finds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Adversary;

impl Capability for Adversary {
    const NAME: &'static str = "adversary";
    type Context = DebateState;
    type Output = Vec<Critique>;

    fn role_instruction(&self) -> &'static str {
        ADVERSARY_PREAMBLE
    }

    fn transcript(&self, state: &DebateState) -> String {
        let mut parts = vec![
            "BUSINESS PLAN:".to_string(),
            state.document.clone(),
            "\nEXTRACTED ASSUMPTIONS:".to_string(),
        ];
        for (i, assumption) in state.assumptions.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, assumption));
        }
        parts.push("\nZAMBIAN REALITY CONTEXT:".to_string());
        parts.push(state.fact_context.clone());

        if !state.defense_rounds.is_empty() {
            parts.push("\nPRIOR DEFENSE HISTORY:".to_string());
            for round in &state.defense_rounds {
                parts.push(format!("Round {}:", round.round));
                for defense in &round.defenses {
                    parts.push(format!("  {}", defense));
                    if !defense.revision.is_empty() {
                        parts.push(format!("    REVISION: {}", defense.revision));
                    }
                }
            }
            parts.push(
                "\nCritique the plan again, accounting for any defenses offered. \
                 Find NEW weaknesses or show why defenses are insufficient."
                    .to_string(),
            );
        }
        parts.join("\n")
    }

    fn parse(&self, reply: &str, _state: &DebateState) -> Option<Vec<Critique>> {
        let critiques: Vec<Critique> = parse_blocks(reply, CRITIQUE_FIELDS)
            .iter()
            .map(|block| {
                Critique::new(
                    block.get_or("fracture", UNKNOWN_FRACTURE),
                    Severity::from_verdict_text(block.get_or("verdict", "MINOR")),
                )
                .with_reality(block.get_or("reality", ""))
                .with_citation(block.get_or("citation", ""))
                .with_impact(block.get_or("impact", ""))
            })
            .collect();
        (!critiques.is_empty()).then_some(critiques)
    }

    fn fallback(&self, state: &DebateState) -> Vec<Critique> {
        let reality = state.fact_context.to_lowercase();
        if state.assumptions.is_empty() {
            return vec![whole_document_critique()];
        }
        state
            .assumptions
            .iter()
            .map(|assumption| {
                let fracture = assumption.to_string();
                rule_for(&assumption.to_lowercase(), &reality).critique(&fracture)
            })
            .collect()
    }
}

/// One canned finding of the fallback.
struct Finding {
    severity: Severity,
    reality: &'static str,
    citation: &'static str,
    impact: &'static str,
}

impl Finding {
    fn critique(&self, fracture: &str) -> Critique {
        Critique::new(fracture, self.severity)
            .with_reality(self.reality)
            .with_citation(self.citation)
            .with_impact(self.impact)
    }
}

static FUEL_VOLATILITY: Finding = Finding {
    severity: Severity::Major,
    reality: "Diesel is K25.11/litre with 5-8% monthly volatility. Fixed fuel cost assumptions are unreliable.",
    citation: "ERB Q1 2025 Price Schedule",
    impact: "Fuel cost variance could erode margins by 5-15% annually.",
};

static TURNOVER_TAX: Finding = Finding {
    severity: Severity::Major,
    reality: "Turnover Tax is 5% on gross revenue with NO deductions. If revenue exceeds ZMW 5M, CIT at 30% applies.",
    citation: "ZRA 2025 Tax Guide",
    impact: "Tax miscalculation could increase tax burden by 200-500%.",
};

static IMPASSABLE_ROADS: Finding = Finding {
    severity: Severity::Fatal,
    reality: "40-60% of rural roads are impassable during rainy season (Nov-Apr). La Niña flooding confirmed for 2025.",
    citation: "Road Development Agency 2025",
    impact: "Complete supply chain disruption for 2-6 weeks per flood event.",
};

static SME_LENDING: Finding = Finding {
    severity: Severity::Major,
    reality: "SME lending rates are 24-32%, not typical plan assumptions of 10-15%. Collateral requirement is 150-200% of loan value.",
    citation: "Bankers Association Survey 2025",
    impact: "Debt servicing costs likely 2-3x higher than projected.",
};

static FRAGILE_MARGINS: Finding = Finding {
    severity: Severity::Major,
    reality: "With inflation at 11%, fuel volatility of 5-8%, and lending rates of 24-32%, single-digit margins are extremely fragile.",
    citation: "ZamStats CPI Report + BoZ Policy Rate 2025",
    impact: "Projected margins may turn negative within 6 months under stress conditions.",
};

static UNVERIFIED: Finding = Finding {
    severity: Severity::Minor,
    reality: "This assumption requires further verification against current Zambian regulatory and economic conditions.",
    citation: "General regulatory framework",
    impact: "Potential unquantified risk to business operations.",
};

/// First matching rule for a lowercased assumption line.
fn rule_for(assumption: &str, reality: &str) -> &'static Finding {
    if assumption.contains("fuel") && reality.contains("k25") {
        &FUEL_VOLATILITY
    } else if assumption.contains("tax") && reality.contains("turnover") {
        &TURNOVER_TAX
    } else if mentions(assumption, &["transport", "logistics", "road"]) {
        &IMPASSABLE_ROADS
    } else if mentions(assumption, &["financ", "loan", "bank"]) {
        &SME_LENDING
    } else if mentions(assumption, &["margin", "profit"]) {
        &FRAGILE_MARGINS
    } else {
        &UNVERIFIED
    }
}

fn mentions(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Critique of the document as a whole, used when there is nothing more
/// specific to attack.
fn whole_document_critique() -> Critique {
    UNVERIFIED.critique("The plan as a whole")
}
