//! Result snapshots — the plain record handed to reporting and export.
//!
//! Snapshots serialize to versioned JSON and can be restored with an
//! integrity check on the round histories.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::assumption::Assumption;
use super::critique::{CritiqueRound, DefenseRound, Severity};
use super::state::PlanStatus;

/// Final (or intermediate) outcome of a stress-test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressTestResult {
    pub status: PlanStatus,
    pub severity: Severity,
    pub assumptions: Vec<Assumption>,
    pub critique_rounds: Vec<CritiqueRound>,
    pub defense_rounds: Vec<DefenseRound>,
    pub fact_citations: Vec<String>,
    pub revision_count: u32,
    #[serde(default)]
    pub awaiting_human: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub human_note: String,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    #[serde(flatten)]
    result: &'a StressTestResult,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    #[serde(flatten)]
    result: StressTestResult,
}

impl StressTestResult {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Whether the plan survived.
    pub fn is_validated(&self) -> bool {
        self.status == PlanStatus::Validated
    }

    /// Total critiques across all rounds.
    pub fn critique_count(&self) -> usize {
        self.critique_rounds.iter().map(|r| r.critiques.len()).sum()
    }

    /// Compact summary line.
    pub fn summary_line(&self) -> String {
        let human = if self.awaiting_human {
            " | awaiting human"
        } else {
            ""
        };
        format!(
            "[{}] severity={} | {} critique rounds | {} revisions{}",
            self.status,
            self.severity,
            self.critique_rounds.len(),
            self.revision_count,
            human
        )
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        let envelope = EnvelopeRef {
            version: Self::CURRENT_VERSION,
            result: self,
        };
        serde_json::to_string_pretty(&envelope).map_err(|e| PersistenceError::SerializeFailed {
            reason: e.to_string(),
        })
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let envelope: Envelope =
            serde_json::from_str(json).map_err(|e| PersistenceError::DeserializeFailed {
                reason: e.to_string(),
            })?;

        if envelope.version > Self::CURRENT_VERSION {
            return Err(PersistenceError::VersionMismatch {
                expected: Self::CURRENT_VERSION,
                found: envelope.version,
            });
        }

        Ok(envelope.result)
    }

    /// Write the JSON snapshot to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| PersistenceError::Io {
            reason: format!("{}: {}", path.display(), e),
        })
    }

    /// Read a snapshot from `path` and check its integrity.
    pub fn restore(path: &Path) -> Result<(Self, IntegrityStatus), PersistenceError> {
        let json = std::fs::read_to_string(path).map_err(|e| PersistenceError::Io {
            reason: format!("{}: {}", path.display(), e),
        })?;
        let result = Self::from_json(&json)?;
        let status = validate_result(&result);
        if let IntegrityStatus::Corrupted { ref errors } = status {
            return Err(PersistenceError::IntegrityCheckFailed {
                reason: errors.join("; "),
            });
        }
        Ok((result, status))
    }
}

/// Error during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Serialization failed.
    SerializeFailed { reason: String },
    /// Deserialization failed.
    DeserializeFailed { reason: String },
    /// Schema version mismatch.
    VersionMismatch { expected: u32, found: u32 },
    /// Integrity check failed on restore.
    IntegrityCheckFailed { reason: String },
    /// Reading or writing the file failed.
    Io { reason: String },
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SerializeFailed { reason } => write!(f, "serialize failed: {}", reason),
            Self::DeserializeFailed { reason } => write!(f, "deserialize failed: {}", reason),
            Self::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            Self::IntegrityCheckFailed { reason } => {
                write!(f, "integrity check failed: {}", reason)
            }
            Self::Io { reason } => write!(f, "io error: {}", reason),
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Integrity check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityStatus {
    /// Snapshot is consistent.
    Valid,
    /// Snapshot is usable but looks unfinished.
    Recoverable { warnings: Vec<String> },
    /// Round histories contradict each other.
    Corrupted { errors: Vec<String> },
}

impl IntegrityStatus {
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Valid | Self::Recoverable { .. })
    }
}

/// Check the round histories of a snapshot.
pub fn validate_result(result: &StressTestResult) -> IntegrityStatus {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    for (i, round) in result.critique_rounds.iter().enumerate() {
        let expected = i as u32 + 1;
        if round.round != expected {
            errors.push(format!(
                "critique round {} found at position {}",
                round.round, expected
            ));
        }
    }

    let mut last_defended = 0;
    for round in &result.defense_rounds {
        if round.round == 0 || round.round as usize > result.critique_rounds.len() {
            errors.push(format!(
                "defense round {} has no matching critique round",
                round.round
            ));
        }
        if round.round <= last_defended {
            errors.push(format!("defense round {} is out of order", round.round));
        }
        last_defended = round.round;
    }

    if let Some(latest) = result.critique_rounds.last() {
        if latest.max_severity() != result.severity {
            warnings.push(format!(
                "severity {} differs from latest round max {}",
                result.severity,
                latest.max_severity()
            ));
        }
    }

    if !result.status.is_terminal() {
        warnings.push(format!("status {} is not terminal", result.status));
    }

    if result.severity == Severity::Fatal && !result.awaiting_human {
        errors.push("FATAL severity without human escalation".to_string());
    }

    if !errors.is_empty() {
        IntegrityStatus::Corrupted { errors }
    } else if !warnings.is_empty() {
        IntegrityStatus::Recoverable { warnings }
    } else {
        IntegrityStatus::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::assumption::AssumptionCategory;
    use crate::debate::critique::{Critique, Defense};

    fn sample() -> StressTestResult {
        StressTestResult {
            status: PlanStatus::Broken,
            severity: Severity::Major,
            assumptions: vec![Assumption::new(
                AssumptionCategory::Operational,
                "Fuel costs stay flat",
            )],
            critique_rounds: vec![CritiqueRound {
                round: 1,
                critiques: vec![Critique::new("Fuel costs stay flat", Severity::Major)
                    .with_reality("Diesel is K25.11/litre")
                    .with_citation("ERB Q1 2025")
                    .with_impact("Margins erode")],
            }],
            defense_rounds: vec![DefenseRound {
                round: 1,
                defenses: vec![Defense {
                    response_to: "Fuel costs stay flat".to_string(),
                    defense: "Partially accepted".to_string(),
                    revision: "Budget K26/litre".to_string(),
                    mitigation: "Bulk purchase".to_string(),
                }],
            }],
            fact_citations: vec!["[1] ERB (2025-01-15)".to_string()],
            revision_count: 1,
            awaiting_human: true,
            human_note: "Max revisions (1) reached.".to_string(),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let result = sample();
        let json = result.to_json().unwrap();
        assert!(json.contains("\"version\": 1"));
        assert!(json.contains("\"status\": \"BROKEN\""));
        let back = StressTestResult::from_json(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_future_version_rejected() {
        let json = sample().to_json().unwrap().replace(
            "\"version\": 1",
            "\"version\": 99",
        );
        let err = StressTestResult::from_json(&json).unwrap_err();
        assert_eq!(
            err,
            PersistenceError::VersionMismatch {
                expected: 1,
                found: 99
            }
        );
    }

    #[test]
    fn test_garbage_rejected() {
        let err = StressTestResult::from_json("{not json").unwrap_err();
        assert!(matches!(err, PersistenceError::DeserializeFailed { .. }));
    }

    #[test]
    fn test_write_and_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        let result = sample();
        result.write_to(&path).unwrap();
        let (back, status) = StressTestResult::restore(&path).unwrap();
        assert_eq!(back, result);
        assert_eq!(status, IntegrityStatus::Valid);
    }

    #[test]
    fn test_validate_detects_orphan_defense() {
        let mut result = sample();
        result.defense_rounds[0].round = 2;
        assert!(matches!(
            validate_result(&result),
            IntegrityStatus::Corrupted { .. }
        ));
    }

    #[test]
    fn test_validate_detects_unescalated_fatal() {
        let mut result = sample();
        result.severity = Severity::Fatal;
        result.critique_rounds[0].critiques[0].severity = Severity::Fatal;
        result.awaiting_human = false;
        assert!(!validate_result(&result).is_usable());
    }

    #[test]
    fn test_validate_warns_on_non_terminal() {
        let mut result = sample();
        result.status = PlanStatus::UnderReview;
        assert!(matches!(
            validate_result(&result),
            IntegrityStatus::Recoverable { .. }
        ));
    }

    #[test]
    fn test_summary_line() {
        let line = sample().summary_line();
        assert!(line.contains("[BROKEN]"));
        assert!(line.contains("awaiting human"));
        assert_eq!(sample().critique_count(), 1);
    }
}
