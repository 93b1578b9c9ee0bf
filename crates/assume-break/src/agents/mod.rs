//! Debate capabilities.
//!
//! Each capability has a primary strategy (an oracle call whose reply is
//! parsed into structured output) and a deterministic fallback. The
//! fallback serves whenever the primary cannot: no credentials, a failed
//! call, or a reply with no well-formed blocks. A capability therefore
//! always produces output.

pub mod adversary;
pub mod extractor;
pub mod judge;
pub mod proponent;

pub use adversary::Adversary;
pub use extractor::Extractor;
pub use judge::Judge;
pub use proponent::Proponent;

use std::sync::Arc;

use coordination::{select_strategy, DegradedResponse, PrimaryAttempt};
use tracing::{debug, warn};

use crate::oracle::Oracle;

/// One debate role: how to ask the oracle, how to read its reply, and what
/// to produce without it.
pub trait Capability {
    /// Name used in logs and degradation warnings.
    const NAME: &'static str;

    /// What the capability reads.
    type Context: ?Sized;
    type Output;

    fn role_instruction(&self) -> &'static str;

    /// The user turn sent to the oracle.
    fn transcript(&self, ctx: &Self::Context) -> String;

    /// Structured output from a reply, `None` when nothing well-formed was
    /// found.
    fn parse(&self, reply: &str, ctx: &Self::Context) -> Option<Self::Output>;

    /// Deterministic output that needs nothing but the context.
    fn fallback(&self, ctx: &Self::Context) -> Self::Output;
}

/// How capabilities are served for a run.
#[derive(Clone)]
pub enum Strategy {
    /// Ask the oracle first; fall back on any failure.
    Primary(Arc<dyn Oracle>),
    /// Serve every capability from its fallback.
    FallbackOnly,
}

impl Strategy {
    pub fn is_fallback_only(&self) -> bool {
        matches!(self, Self::FallbackOnly)
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary(_) => write!(f, "Primary"),
            Self::FallbackOnly => write!(f, "FallbackOnly"),
        }
    }
}

/// Run `capability` under `strategy`.
///
/// Credential absence falls back silently; any other primary failure is
/// logged at warn level and carried in the response's warnings.
pub async fn execute<C: Capability>(
    capability: &C,
    strategy: &Strategy,
    ctx: &C::Context,
) -> DegradedResponse<C::Output> {
    let oracle = match strategy {
        Strategy::Primary(oracle) => oracle,
        Strategy::FallbackOnly => {
            return DegradedResponse::fallback(capability.fallback(ctx), None);
        }
    };

    let transcript = capability.transcript(ctx);
    let attempt = match oracle.invoke(capability.role_instruction(), &transcript).await {
        Ok(reply) => match capability.parse(&reply, ctx) {
            Some(output) => PrimaryAttempt::Produced(output),
            None => PrimaryAttempt::Empty,
        },
        Err(e) if e.is_credentials_absent() => PrimaryAttempt::CredentialsAbsent,
        Err(e) => PrimaryAttempt::Failed(e.to_string()),
    };

    let response = select_strategy(attempt).resolve(C::NAME, || capability.fallback(ctx));
    if response.warnings.is_empty() {
        debug!(
            capability = C::NAME,
            served_by = ?response.served_by,
            "capability served"
        );
    }
    for warning in &response.warnings {
        warn!(capability = C::NAME, "{}", warning);
    }
    response
}
