//! Reality Retrieval
//!
//! Ranks a static fact corpus against free text so the adversary can argue
//! from ground truth rather than opinion.
//!
//! ```text
//! document ─→ tokenize ─┬─→ keyword scoring (exact / fuzzy / token-fuzzy)
//!                       └─→ category detection ─→ +boost
//!                                   │
//!                                   ▼
//!                     stable sort ─→ top-K ─→ RealityContext
//! ```

pub mod corpus;
pub mod engine;
pub mod similarity;

pub use corpus::{Fact, FactCorpus};
pub use engine::{
    tokenize, CategoryIndicators, RealityContext, RelevanceEngine, ScoredFact, DEFAULT_TOP_K,
    NO_MATCH_CITATION, NO_MATCH_CONTEXT,
};
pub use similarity::SequenceMatcher;
