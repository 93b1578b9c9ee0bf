//! Relevance engine — ranks the fact corpus against free text.
//!
//! # Scoring
//!
//! ```text
//! per keyword:  exact token match             +3.00
//!               else whole-text ratio ≥ 0.65  +1.50
//!               else any token ratio ≥ 0.75   +0.75   (tokens and keyword ≥ 4 chars, once)
//! per fact:     category detected in text     +2.00
//! ```
//!
//! Facts scoring zero are dropped; the rest are stably sorted by descending
//! score and truncated to `top_k`.

use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::corpus::{Fact, FactCorpus};
use super::similarity::SequenceMatcher;

pub const EXACT_KEYWORD_WEIGHT: f64 = 3.0;
pub const FUZZY_KEYWORD_WEIGHT: f64 = 1.5;
pub const TOKEN_FUZZY_WEIGHT: f64 = FUZZY_KEYWORD_WEIGHT * 0.5;
pub const CATEGORY_BOOST_WEIGHT: f64 = 2.0;
pub const FUZZY_THRESHOLD: f64 = 0.65;
pub const TOKEN_FUZZY_THRESHOLD: f64 = 0.75;
pub const MIN_FUZZY_TOKEN_LEN: usize = 4;
pub const DEFAULT_TOP_K: usize = 10;

pub const NO_MATCH_CONTEXT: &str = "No specific Zambian regulatory or economic data matched this business plan. General business regulations still apply.";
pub const NO_MATCH_CITATION: &str = "No specific matches found";

static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z0-9]+(?:'[a-z]+)?").unwrap());

/// Lowercase alphanumeric tokens; an inner apostrophe suffix is kept.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Ordered category → indicator phrases table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryIndicators {
    entries: Vec<(String, Vec<String>)>,
}

impl CategoryIndicators {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    /// Categories with at least one indicator phrase occurring in `text`.
    pub fn detect(&self, text: &str) -> BTreeSet<String> {
        let lower = text.to_lowercase();
        self.entries
            .iter()
            .filter(|(_, phrases)| phrases.iter().any(|p| lower.contains(p.as_str())))
            .map(|(category, _)| category.clone())
            .collect()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }
}

impl Default for CategoryIndicators {
    fn default() -> Self {
        let table: [(&str, &[&str]); 10] = [
            (
                "TAX",
                &["tax", "revenue", "turnover", "vat", "income tax", "withholding"],
            ),
            (
                "ENERGY",
                &[
                    "fuel",
                    "diesel",
                    "petrol",
                    "electricity",
                    "power",
                    "solar",
                    "energy",
                    "generator",
                ],
            ),
            (
                "FINANCE",
                &[
                    "loan",
                    "bank",
                    "interest",
                    "financing",
                    "credit",
                    "lending",
                    "inflation",
                    "exchange rate",
                    "forex",
                    "kwacha",
                ],
            ),
            (
                "LOGISTICS",
                &[
                    "transport",
                    "road",
                    "delivery",
                    "logistics",
                    "fleet",
                    "shipping",
                    "cold chain",
                    "warehouse",
                ],
            ),
            (
                "MINING",
                &[
                    "mining", "mine", "copper", "cobalt", "mineral", "smelting", "ore", "drill",
                ],
            ),
            (
                "AGRICULTURE",
                &[
                    "farm",
                    "agriculture",
                    "maize",
                    "crop",
                    "harvest",
                    "fertilizer",
                    "seed",
                    "livestock",
                    "land",
                ],
            ),
            (
                "LABOR",
                &[
                    "employee", "worker", "salary", "wage", "staff", "hire", "payroll", "labour",
                    "labor", "napsa",
                ],
            ),
            (
                "IMPORT_EXPORT",
                &[
                    "import", "export", "customs", "tariff", "comesa", "trade", "shipping",
                ],
            ),
            (
                "DIGITAL",
                &[
                    "digital",
                    "mobile",
                    "app",
                    "software",
                    "internet",
                    "telecom",
                    "fintech",
                    "data",
                    "online",
                    "e-commerce",
                ],
            ),
            (
                "REGISTRATION",
                &[
                    "register",
                    "license",
                    "permit",
                    "pacra",
                    "zema",
                    "certification",
                    "compliance",
                ],
            ),
        ];

        Self::new(
            table
                .iter()
                .map(|(category, phrases)| {
                    (
                        category.to_string(),
                        phrases.iter().map(|p| p.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }
}

/// A fact with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFact {
    /// Position in the corpus.
    pub index: usize,
    pub fact: Fact,
    pub score: f64,
}

/// Rendered retrieval output handed to the debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealityContext {
    /// Citation-numbered fact lines joined by blank lines.
    pub context: String,
    /// `[i] source (date)`, parallel to the context lines.
    pub citations: Vec<String>,
    /// Number of ranked facts (0 for the no-match sentinel).
    pub matched: usize,
}

impl RealityContext {
    fn no_match() -> Self {
        Self {
            context: NO_MATCH_CONTEXT.to_string(),
            citations: vec![NO_MATCH_CITATION.to_string()],
            matched: 0,
        }
    }
}

/// Tokenized input, indexed once for all facts.
struct Query {
    tokens: Vec<String>,
    joined: SequenceMatcher,
    /// One matcher per token long enough for token-level fuzzing.
    token_matchers: Vec<Option<SequenceMatcher>>,
    categories: BTreeSet<String>,
}

/// Scores a fixed corpus against free text.
#[derive(Debug, Clone)]
pub struct RelevanceEngine {
    corpus: Arc<FactCorpus>,
    indicators: CategoryIndicators,
    top_k: usize,
}

impl RelevanceEngine {
    pub fn new(corpus: Arc<FactCorpus>, indicators: CategoryIndicators, top_k: usize) -> Self {
        Self {
            corpus,
            indicators,
            top_k,
        }
    }

    /// Engine over the bundled corpus with the default indicator table.
    pub fn bundled() -> Self {
        Self::new(
            FactCorpus::bundled(),
            CategoryIndicators::default(),
            DEFAULT_TOP_K,
        )
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn corpus(&self) -> &FactCorpus {
        &self.corpus
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn detect_categories(&self, text: &str) -> BTreeSet<String> {
        self.indicators.detect(text)
    }

    /// Score one fact against pre-tokenized input.
    pub fn score_fact(&self, fact: &Fact, tokens: &[String], categories: &BTreeSet<String>) -> f64 {
        let query = Query::from_tokens(tokens.to_vec(), categories.clone());
        score(fact, &query)
    }

    /// Top-K facts with score > 0, by descending score then corpus order.
    pub fn retrieve(&self, text: &str) -> Vec<ScoredFact> {
        let query = Query::from_tokens(tokenize(text), self.detect_categories(text));

        let mut scored: Vec<ScoredFact> = self
            .corpus
            .iter()
            .enumerate()
            .filter_map(|(index, fact)| {
                let score = score(fact, &query);
                (score > 0.0).then(|| ScoredFact {
                    index,
                    fact: fact.clone(),
                    score,
                })
            })
            .collect();

        // `sort_by` is stable, so equal scores keep corpus order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.top_k);

        debug!(
            tokens = query.tokens.len(),
            categories = ?query.categories,
            matched = scored.len(),
            top_score = scored.first().map(|s| s.score).unwrap_or(0.0),
            "facts scored"
        );
        scored
    }

    /// Retrieve and render, falling back to the no-match sentinel.
    pub fn reality_context(&self, text: &str) -> RealityContext {
        let ranked = self.retrieve(text);
        if ranked.is_empty() {
            return RealityContext::no_match();
        }

        let mut lines = Vec::with_capacity(ranked.len());
        let mut citations = Vec::with_capacity(ranked.len());
        for (i, scored) in ranked.iter().enumerate() {
            let n = i + 1;
            let fact = &scored.fact;
            lines.push(format!(
                "[{}] [{}] {} (Source: {}, Effective: {}, Relevance: {})",
                n,
                fact.category,
                fact.statement,
                fact.source,
                fact.effective_date,
                format_score(scored.score)
            ));
            citations.push(format!("[{}] {} ({})", n, fact.source, fact.effective_date));
        }

        RealityContext {
            context: lines.join("\n\n"),
            citations,
            matched: ranked.len(),
        }
    }
}

impl Query {
    fn from_tokens(tokens: Vec<String>, categories: BTreeSet<String>) -> Self {
        let joined = SequenceMatcher::new(&tokens.join(" "));
        let token_matchers = tokens
            .iter()
            .map(|t| (t.chars().count() >= MIN_FUZZY_TOKEN_LEN).then(|| SequenceMatcher::new(t)))
            .collect();
        Self {
            tokens,
            joined,
            token_matchers,
            categories,
        }
    }
}

fn score(fact: &Fact, query: &Query) -> f64 {
    let mut total = 0.0;

    for keyword in &fact.keywords {
        let keyword = keyword.to_lowercase();
        if query.tokens.iter().any(|t| *t == keyword) {
            total += EXACT_KEYWORD_WEIGHT;
            continue;
        }
        if query.joined.ratio(&keyword) >= FUZZY_THRESHOLD {
            total += FUZZY_KEYWORD_WEIGHT;
            continue;
        }
        if keyword.chars().count() < MIN_FUZZY_TOKEN_LEN {
            continue;
        }
        let near = query
            .token_matchers
            .iter()
            .flatten()
            .any(|m| m.ratio(&keyword) >= TOKEN_FUZZY_THRESHOLD);
        if near {
            total += TOKEN_FUZZY_WEIGHT;
        }
    }

    if query.categories.contains(&fact.category) {
        total += CATEGORY_BOOST_WEIGHT;
    }
    total
}

/// One decimal place, ties to even.
fn format_score(score: f64) -> String {
    let tenths = (score * 10.0).round_ties_even() as i64;
    format!("{}.{}", tenths / 10, (tenths % 10).abs())
}
