//! Testable assumptions extracted from the input document.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static ASSUMPTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\[(financial|operational|market|regulatory|environmental)\]\s*ASSUMPTION:\s*(.*)$",
    )
    .unwrap()
});

/// Category tag of an assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssumptionCategory {
    Financial,
    Operational,
    Market,
    Regulatory,
    Environmental,
}

impl AssumptionCategory {
    pub const ALL: [AssumptionCategory; 5] = [
        Self::Financial,
        Self::Operational,
        Self::Market,
        Self::Regulatory,
        Self::Environmental,
    ];

    /// Case-insensitive lookup by tag name.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(tag.trim()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Financial => "Financial",
            Self::Operational => "Operational",
            Self::Market => "Market",
            Self::Regulatory => "Regulatory",
            Self::Environmental => "Environmental",
        }
    }
}

impl std::fmt::Display for AssumptionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tagged, testable claim the document relies on.
///
/// Order of extraction is preserved and duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assumption {
    pub category: AssumptionCategory,
    pub statement: String,
}

impl Assumption {
    pub fn new(category: AssumptionCategory, statement: &str) -> Self {
        Self {
            category,
            statement: statement.to_string(),
        }
    }

    /// Parse a `[Category] ASSUMPTION: statement` line.
    ///
    /// Returns `None` for any other shape. A tagged line with no statement
    /// still parses, with an empty statement.
    pub fn parse_line(line: &str) -> Option<Self> {
        let caps = ASSUMPTION_LINE.captures(line.trim())?;
        let category = AssumptionCategory::from_tag(&caps[1])?;
        Some(Self::new(category, caps[2].trim()))
    }

    /// Lowercased tagged line, used by keyword heuristics.
    pub fn to_lowercase(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl std::fmt::Display for Assumption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] ASSUMPTION: {}", self.category, self.statement)
    }
}
