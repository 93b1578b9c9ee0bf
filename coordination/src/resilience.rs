//! Resilience — Primary/Fallback Degraded Mode
//!
//! Every capability has a primary strategy (an oracle) and a deterministic
//! fallback. Instead of hard errors, a capability returns a
//! [`DegradedResponse`] recording which strategy served it and any warnings
//! the operator should see.
//!
//! # Design
//!
//! ```text
//! Capability call
//!   ├─ Primary produced ≥ 1 block    → DegradedResponse { served_by: Primary }
//!   ├─ Credentials absent            → DegradedResponse { served_by: Fallback }           (silent)
//!   └─ Primary failed / zero blocks  → DegradedResponse { served_by: Fallback, warnings } (surfaced)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use coordination::resilience::{select_strategy, PrimaryAttempt};
//!
//! let attempt = match parse(reply) {
//!     Some(out) => PrimaryAttempt::Produced(out),
//!     None => PrimaryAttempt::Empty,
//! };
//! let response = select_strategy(attempt).resolve("critique", || fallback(ctx));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which strategy produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServedBy {
    /// The oracle answered with at least one well-formed block.
    Primary,
    /// The deterministic heuristic.
    Fallback,
}

impl std::fmt::Display for ServedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// A capability output wrapped with degradation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradedResponse<T> {
    /// The actual response payload.
    pub payload: T,
    pub served_by: ServedBy,
    /// Warning messages for the operator.
    pub warnings: Vec<String>,
    /// When this response was produced.
    pub timestamp: DateTime<Utc>,
}

impl<T> DegradedResponse<T> {
    /// Response served by the primary strategy.
    pub fn primary(payload: T) -> Self {
        Self {
            payload,
            served_by: ServedBy::Primary,
            warnings: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Response served by the fallback, with an optional warning.
    pub fn fallback(payload: T, warning: Option<String>) -> Self {
        Self {
            payload,
            served_by: ServedBy::Fallback,
            warnings: warning.into_iter().collect(),
            timestamp: Utc::now(),
        }
    }

    /// Whether the fallback served this response.
    pub fn is_degraded(&self) -> bool {
        self.served_by == ServedBy::Fallback
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Transform the payload, keeping the metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DegradedResponse<U> {
        DegradedResponse {
            payload: f(self.payload),
            served_by: self.served_by,
            warnings: self.warnings,
            timestamp: self.timestamp,
        }
    }
}

/// What happened when the primary strategy was tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryAttempt<T> {
    /// At least one well-formed block was parsed.
    Produced(T),
    /// No credentials are configured; the oracle was never reachable.
    CredentialsAbsent,
    /// The oracle call failed.
    Failed(String),
    /// The oracle answered but no well-formed block was found.
    Empty,
}

/// Which strategy serves the capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategySelection<T> {
    UsePrimary(T),
    /// Fall back without telling the operator.
    SilentFallback,
    /// Fall back and surface the reason.
    WarnedFallback { reason: String },
}

/// Pick the strategy that serves a capability from the primary's outcome.
///
/// Credential absence is an expected configuration and stays silent; every
/// other primary failure is surfaced.
pub fn select_strategy<T>(attempt: PrimaryAttempt<T>) -> StrategySelection<T> {
    match attempt {
        PrimaryAttempt::Produced(payload) => StrategySelection::UsePrimary(payload),
        PrimaryAttempt::CredentialsAbsent => StrategySelection::SilentFallback,
        PrimaryAttempt::Failed(reason) => StrategySelection::WarnedFallback { reason },
        PrimaryAttempt::Empty => StrategySelection::WarnedFallback {
            reason: "reply contained no well-formed blocks".to_string(),
        },
    }
}

impl<T> StrategySelection<T> {
    /// Produce the response, invoking `fallback` only when needed.
    pub fn resolve(self, capability: &str, fallback: impl FnOnce() -> T) -> DegradedResponse<T> {
        match self {
            Self::UsePrimary(payload) => DegradedResponse::primary(payload),
            Self::SilentFallback => DegradedResponse::fallback(fallback(), None),
            Self::WarnedFallback { reason } => DegradedResponse::fallback(
                fallback(),
                Some(format!(
                    "{}: primary strategy failed ({}); using fallback",
                    capability, reason
                )),
            ),
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, Self::UsePrimary(_))
    }
}
