//! Critique and defense records — the per-round payloads of the debate.
//!
//! The adversary produces [`Critique`]s graded by [`Severity`]; the proponent
//! answers the latest round with [`Defense`]s. Rounds are append-only.

use serde::{Deserialize, Serialize};

/// Ordinal rank of a critique. `None < Minor < Major < Fatal`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// No critique recorded yet.
    #[default]
    None,
    /// Suboptimal but survivable.
    Minor,
    /// Requires plan revision.
    Major,
    /// Would likely cause failure; always escalated to a human.
    Fatal,
}

impl Severity {
    /// Map a free-text verdict to a severity.
    ///
    /// Anything that mentions neither FATAL nor MAJOR is treated as MINOR,
    /// so a critique always carries a real grade.
    pub fn from_verdict_text(text: &str) -> Self {
        let upper = text.trim().to_uppercase();
        if upper.contains("FATAL") {
            Self::Fatal
        } else if upper.contains("MAJOR") {
            Self::Major
        } else {
            Self::Minor
        }
    }

    /// Highest severity in a sequence, `None` when empty.
    pub fn max_of<'a>(severities: impl IntoIterator<Item = &'a Severity>) -> Self {
        severities.into_iter().copied().max().unwrap_or(Self::None)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Minor => "MINOR",
            Self::Major => "MAJOR",
            Self::Fatal => "FATAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single hostile finding against one assumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Critique {
    /// The flawed assumption.
    pub fracture: String,
    /// What the ground truth actually says.
    pub reality: String,
    /// Source backing the reality claim.
    pub citation: String,
    /// Grade of the finding.
    pub severity: Severity,
    /// Concrete consequence for the plan.
    pub impact: String,
}

impl Critique {
    pub fn new(fracture: &str, severity: Severity) -> Self {
        Self {
            fracture: fracture.to_string(),
            reality: String::new(),
            citation: String::new(),
            severity,
            impact: String::new(),
        }
    }

    pub fn with_reality(mut self, reality: &str) -> Self {
        self.reality = reality.to_string();
        self
    }

    pub fn with_citation(mut self, citation: &str) -> Self {
        self.citation = citation.to_string();
        self
    }

    pub fn with_impact(mut self, impact: &str) -> Self {
        self.impact = impact.to_string();
        self
    }
}

impl std::fmt::Display for Critique {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.fracture, self.reality)
    }
}

/// The proponent's answer to one critique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defense {
    /// The fracture being addressed.
    pub response_to: String,
    /// Defense argument, or an acceptance.
    pub defense: String,
    /// Proposed change to the plan.
    pub revision: String,
    /// Risk mitigation strategy.
    pub mitigation: String,
}

impl std::fmt::Display for Defense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RE: {}: {}", self.response_to, self.defense)
    }
}

/// One iteration's batch of critiques.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritiqueRound {
    /// Round number (1-indexed).
    pub round: u32,
    pub critiques: Vec<Critique>,
}

impl CritiqueRound {
    /// Highest severity observed in this round.
    pub fn max_severity(&self) -> Severity {
        Severity::max_of(self.critiques.iter().map(|c| &c.severity))
    }

    /// Number of critiques at exactly `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.critiques
            .iter()
            .filter(|c| c.severity == severity)
            .count()
    }
}

/// One iteration's batch of defenses, answering the critique round with the
/// same index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseRound {
    /// Index of the critique round being answered.
    pub round: u32,
    pub defenses: Vec<Defense>,
}
