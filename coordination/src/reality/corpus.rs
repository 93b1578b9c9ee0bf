//! Fact corpus — the immutable ground truth the retrieval engine ranks.

use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

static BUNDLED: LazyLock<Arc<FactCorpus>> = LazyLock::new(|| {
    Arc::new(
        FactCorpus::from_json(include_str!("../../data/zambia_facts.json"))
            .expect("bundled fact corpus is valid JSON"),
    )
});

/// A single ground-truth record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// Sector tag, e.g. `ENERGY`.
    pub category: String,
    pub statement: String,
    pub source: String,
    /// Date the fact took effect, as published.
    pub effective_date: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Ordered, read-only list of facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactCorpus {
    facts: Vec<Fact>,
}

impl FactCorpus {
    pub fn new(facts: Vec<Fact>) -> Self {
        Self { facts }
    }

    /// Parse a JSON array of facts.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The Zambian 2025 corpus shipped with the crate, parsed once per process.
    pub fn bundled() -> Arc<FactCorpus> {
        Arc::clone(&BUNDLED)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fact> {
        self.facts.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Fact> {
        self.facts.get(index)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Facts tagged `category` (case-insensitive), in corpus order.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.facts
            .iter()
            .filter(move |f| f.category.eq_ignore_ascii_case(category))
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for fact in &self.facts {
            if !seen.contains(&fact.category.as_str()) {
                seen.push(&fact.category);
            }
        }
        seen
    }
}

impl<'a> IntoIterator for &'a FactCorpus {
    type Item = &'a Fact;
    type IntoIter = std::slice::Iter<'a, Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}
