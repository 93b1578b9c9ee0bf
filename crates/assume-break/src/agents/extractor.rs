//! Assumption extraction.

use coordination::{Assumption, AssumptionCategory};

use super::Capability;
use crate::prompts::EXTRACTOR_PREAMBLE;

/// Keyword rules for the fallback, checked in order. Each rule that matches
/// anywhere in the lowercased document contributes one assumption.
const KEYWORD_RULES: &[(&[&str], AssumptionCategory, &str)] = &[
    (
        &["revenue", "income", "turnover", "sales", "zmw"],
        AssumptionCategory::Financial,
        "Revenue projections are achievable given current market conditions and tax obligations.",
    ),
    (
        &["loan", "bank", "financing", "credit", "borrow"],
        AssumptionCategory::Financial,
        "Bank financing is available at the assumed interest rate and terms.",
    ),
    (
        &["diesel", "fuel", "petrol", "energy"],
        AssumptionCategory::Operational,
        "Fuel costs will remain stable at the assumed price level.",
    ),
    (
        &["transport", "delivery", "logistics", "fleet", "road"],
        AssumptionCategory::Operational,
        "Transport routes will remain passable year-round without significant disruption.",
    ),
    (
        &["tax", "vat", "turnover tax"],
        AssumptionCategory::Regulatory,
        "The business qualifies for the assumed tax regime and rates.",
    ),
    (
        &["farm", "agriculture", "crop", "harvest", "maize"],
        AssumptionCategory::Market,
        "Agricultural commodity prices will meet the projected levels.",
    ),
    (
        &["mine", "mining", "copper", "mineral"],
        AssumptionCategory::Regulatory,
        "Mining licenses and permits can be obtained within the projected timeline.",
    ),
    (
        &["employee", "staff", "worker", "hire", "salary"],
        AssumptionCategory::Operational,
        "Labor costs align with the assumed wage levels and statutory contributions are accounted for.",
    ),
    (
        &["import", "export", "customs"],
        AssumptionCategory::Regulatory,
        "Import/export duties and fees are correctly estimated in the financial model.",
    ),
    (
        &["app", "digital", "online", "mobile", "software"],
        AssumptionCategory::Regulatory,
        "All digital/telecom licensing and data protection requirements are met.",
    ),
    (
        &["property", "land", "building", "premises"],
        AssumptionCategory::Financial,
        "Property costs (rent/purchase/transfer) match the assumed levels.",
    ),
    (
        &["western", "northern", "rural", "province"],
        AssumptionCategory::Environmental,
        "Geographic and seasonal conditions will not materially impact operations.",
    ),
    (
        &["margin", "profit", "net"],
        AssumptionCategory::Financial,
        "Projected profit margins are achievable after accounting for all costs and regulatory burdens.",
    ),
];

/// Emitted when no keyword rule fires.
const DEFAULT_ASSUMPTIONS: &[(AssumptionCategory, &str)] = &[
    (
        AssumptionCategory::Financial,
        "The business plan's financial projections are realistic given Zambian market conditions.",
    ),
    (
        AssumptionCategory::Regulatory,
        "All necessary licenses, permits, and regulatory requirements have been identified.",
    ),
];

/// Decomposes the input document into tagged, testable assumptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor;

impl Capability for Extractor {
    const NAME: &'static str = "extractor";
    type Context = str;
    type Output = Vec<Assumption>;

    fn role_instruction(&self) -> &'static str {
        EXTRACTOR_PREAMBLE
    }

    fn transcript(&self, document: &str) -> String {
        format!(
            "Extract the key testable assumptions from this Zambian business plan:\n\n{}",
            document
        )
    }

    fn parse(&self, reply: &str, _document: &str) -> Option<Vec<Assumption>> {
        let assumptions: Vec<Assumption> = reply.lines().filter_map(Assumption::parse_line).collect();
        (!assumptions.is_empty()).then_some(assumptions)
    }

    fn fallback(&self, document: &str) -> Vec<Assumption> {
        let lower = document.to_lowercase();
        let mut assumptions: Vec<Assumption> = KEYWORD_RULES
            .iter()
            .filter(|(keywords, _, _)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(_, category, statement)| Assumption::new(*category, statement))
            .collect();

        if assumptions.is_empty() {
            assumptions = DEFAULT_ASSUMPTIONS
                .iter()
                .map(|(category, statement)| Assumption::new(*category, statement))
                .collect();
        }
        assumptions
    }
}
