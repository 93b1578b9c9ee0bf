//! Verdict on a debate round.
//!
//! The judge only rules; the revision cap and the FATAL gate are enforced by
//! the debate orchestrator before a ruling is ever requested.

use coordination::{parse_blocks, DebateState, JudgeRuling, Verdict};

use super::Capability;
use crate::prompts::JUDGE_PREAMBLE;

/// Reply fields, primary first.
pub const RULING_FIELDS: &[&str] = &["VERDICT", "REASONING", "KEY_RISKS", "RECOMMENDATION"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Judge;

impl Capability for Judge {
    const NAME: &'static str = "judge";
    type Context = DebateState;
    type Output = JudgeRuling;

    fn role_instruction(&self) -> &'static str {
        JUDGE_PREAMBLE
    }

    fn transcript(&self, state: &DebateState) -> String {
        let mut parts = vec![
            format!("BUSINESS PLAN:\n{}", state.document),
            format!("\nCRITIQUE SEVERITY: {}", state.severity),
            format!(
                "\nREVISION ROUND: {} of {}",
                state.revision_count + 1,
                state.max_revisions
            ),
            "\nCRITIQUE HISTORY:".to_string(),
        ];
        for round in &state.critique_rounds {
            for c in &round.critiques {
                parts.push(format!("  - {}", c));
            }
        }
        parts.push("\nDEFENSE HISTORY:".to_string());
        for round in &state.defense_rounds {
            for d in &round.defenses {
                parts.push(format!("  - {}", d));
            }
        }
        parts.push(format!("\nREALITY CONTEXT:\n{}", state.fact_context));
        parts.push("\nProvide your verdict.".to_string());
        parts.join("\n")
    }

    /// The first block whose verdict names a known ruling.
    fn parse(&self, reply: &str, _state: &DebateState) -> Option<JudgeRuling> {
        parse_blocks(reply, RULING_FIELDS).iter().find_map(|block| {
            let verdict = Verdict::parse(block.get("verdict")?)?;
            Some(JudgeRuling {
                verdict,
                reasoning: block.get_or("reasoning", "").to_string(),
                key_risks: block.get_or("key_risks", "").to_string(),
                recommendation: block.get_or("recommendation", "").to_string(),
            })
        })
    }

    fn fallback(&self, state: &DebateState) -> JudgeRuling {
        JudgeRuling::new(Verdict::from_severity(state.severity)).with_reasoning(&format!(
            "Ruled from the highest critique severity ({}) without a judge reply.",
            state.severity
        ))
    }
}
