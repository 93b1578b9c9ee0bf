//! Judge verdicts — the three ways a non-fatal debate round can resolve.

use serde::{Deserialize, Serialize};

use super::critique::Severity;

/// Terminal or looping verdict issued by the judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Core assumptions hold.
    Validated,
    /// Fixable issues; run another critique round.
    NeedsRevision,
    /// Fatal flaws that cannot reasonably be mitigated.
    Broken,
}

impl Verdict {
    /// Parse the leading verdict keyword of a free-text value.
    ///
    /// Accepts `NEEDS_REVISION`, `NEEDS REVISION`, and any casing; trailing
    /// prose after the keyword is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = text.trim().to_uppercase().replace(' ', "_");
        if normalized.starts_with("VALIDATED") {
            Some(Self::Validated)
        } else if normalized.starts_with("NEEDS_REVISION") {
            Some(Self::NeedsRevision)
        } else if normalized.starts_with("BROKEN") {
            Some(Self::Broken)
        } else {
            None
        }
    }

    /// Deterministic verdict used when no judge reply is available.
    ///
    /// MINOR findings validate; anything else reachable at the judge
    /// (MAJOR, or no critique at all) asks for another round.
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Minor => Self::Validated,
            _ => Self::NeedsRevision,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validated => "VALIDATED",
            Self::NeedsRevision => "NEEDS_REVISION",
            Self::Broken => "BROKEN",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured judge output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeRuling {
    pub verdict: Verdict,
    pub reasoning: String,
    pub key_risks: String,
    pub recommendation: String,
}

impl JudgeRuling {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            reasoning: String::new(),
            key_risks: String::new(),
            recommendation: String::new(),
        }
    }

    pub fn with_reasoning(mut self, reasoning: &str) -> Self {
        self.reasoning = reasoning.to_string();
        self
    }

    /// Note carried into the state when the ruling breaks the plan.
    pub fn note(&self) -> String {
        let mut parts = vec![format!("VERDICT: {}", self.verdict)];
        for (label, value) in [
            ("REASONING", &self.reasoning),
            ("KEY_RISKS", &self.key_risks),
            ("RECOMMENDATION", &self.recommendation),
        ] {
            if !value.is_empty() {
                parts.push(format!("{}: {}", label, value));
            }
        }
        parts.join("\n")
    }
}
