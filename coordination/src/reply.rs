//! Structured reply grammar shared by every oracle-backed capability.
//!
//! A reply is a sequence of blocks. A block starts at a line beginning with
//! the primary field (`FRACTURE:`, `RESPONSE TO:`, ...) and each declared
//! field's value runs until the next line that starts with any declared
//! field, or the end of the reply. Matching is case-insensitive.
//!
//! ```text
//! FRACTURE: Fuel costs stay flat
//! REALITY: Diesel is K25.11/litre
//! VERDICT: MAJOR
//!
//! FRACTURE: ...
//! ```
//!
//! A field whose label is present but whose value is blank parses as `""`.
//! Malformed replies produce zero blocks, never an error.

use std::collections::BTreeMap;

use regex::Regex;

/// One parsed block: normalized field name → trimmed value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyBlock {
    fields: BTreeMap<String, String>,
}

impl ReplyBlock {
    /// Value of `field`, looked up by its normalized name.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(&normalize_field(field)).map(String::as_str)
    }

    /// Value of `field`, or `default` when absent.
    pub fn get_or<'a>(&'a self, field: &str, default: &'a str) -> &'a str {
        self.get(field).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// `RESPONSE TO` → `response_to`.
pub fn normalize_field(field: &str) -> String {
    field.trim().to_lowercase().replace(' ', "_")
}

/// Parse `reply` into blocks keyed by `fields`; `fields[0]` is the primary
/// field that opens a block.
pub fn parse_blocks(reply: &str, fields: &[&str]) -> Vec<ReplyBlock> {
    let Some(primary) = fields.first() else {
        return Vec::new();
    };
    let Some(grammar) = Grammar::new(primary, fields) else {
        return Vec::new();
    };

    grammar
        .split(reply)
        .into_iter()
        .filter_map(|part| {
            let text = format!("{}: {}", primary, part);
            let block = grammar.extract(&text, fields);
            (!block.is_empty()).then_some(block)
        })
        .collect()
}

struct Grammar {
    opener: Regex,
    boundary: Regex,
}

impl Grammar {
    fn new(primary: &str, fields: &[&str]) -> Option<Self> {
        let alternation = fields
            .iter()
            .map(|f| regex::escape(f))
            .collect::<Vec<_>>()
            .join("|");
        let opener = Regex::new(&format!(r"(?i)(?:\A|\n)\s*{}\s*:", regex::escape(primary))).ok()?;
        let boundary = Regex::new(&format!(r"(?i)\n\s*(?:{})\s*:", alternation)).ok()?;
        Some(Self { opener, boundary })
    }

    /// Text following each opener, up to the next opener. Text before the
    /// first opener is discarded.
    fn split<'a>(&self, reply: &'a str) -> Vec<&'a str> {
        let matches: Vec<_> = self.opener.find_iter(reply).collect();
        matches
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let end = matches.get(i + 1).map(|next| next.start()).unwrap_or(reply.len());
                &reply[m.end()..end]
            })
            .collect()
    }

    fn extract(&self, text: &str, fields: &[&str]) -> ReplyBlock {
        let mut block = ReplyBlock::default();
        for field in fields {
            if let Some(value) = self.field_value(text, field) {
                block.fields.insert(normalize_field(field), value);
            }
        }
        block
    }

    /// First value of `field` in `text`. A label followed only by
    /// whitespace at the end of the block yields `""`.
    fn field_value(&self, text: &str, field: &str) -> Option<String> {
        let label = Regex::new(&format!(r"(?i){}\s*:\s*", regex::escape(field))).ok()?;
        for m in label.find_iter(text) {
            let start = m.end();
            let Some(first) = text[start..].chars().next() else {
                if m.as_str().ends_with(char::is_whitespace) {
                    return Some(String::new());
                }
                continue;
            };
            let search_from = start + first.len_utf8();
            let end = self
                .boundary
                .find_at(text, search_from)
                .map(|b| b.start())
                .unwrap_or(text.len());
            return Some(text[start..end].trim().to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRITIQUE_FIELDS: [&str; 5] = ["FRACTURE", "REALITY", "CITATION", "VERDICT", "IMPACT"];

    #[test]
    fn test_two_blocks() {
        let reply = "Here is my analysis.\n\n\
            FRACTURE: Fuel costs stay flat\n\
            REALITY: Diesel is K25.11/litre\n\
            CITATION: ERB Q1 2025\n\
            VERDICT: MAJOR\n\
            IMPACT: Margins erode\n\n\
            FRACTURE: Roads are passable\n\
            REALITY: 40-60% impassable in rains\n\
            VERDICT: FATAL\n";
        let blocks = parse_blocks(reply, &CRITIQUE_FIELDS);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].get("FRACTURE"), Some("Fuel costs stay flat"));
        assert_eq!(blocks[0].get("verdict"), Some("MAJOR"));
        assert_eq!(blocks[0].get("impact"), Some("Margins erode"));
        assert_eq!(blocks[1].get("verdict"), Some("FATAL"));
        assert_eq!(blocks[1].get("citation"), None);
    }

    #[test]
    fn test_multiline_value_runs_to_next_field() {
        let reply = "FRACTURE: first line\ncontinued here\nREALITY: fact";
        let blocks = parse_blocks(reply, &CRITIQUE_FIELDS);
        assert_eq!(blocks[0].get("fracture"), Some("first line\ncontinued here"));
        assert_eq!(blocks[0].get("reality"), Some("fact"));
    }

    #[test]
    fn test_case_insensitive_fields() {
        let reply = "fracture: lower\nVerdict: minor";
        let blocks = parse_blocks(reply, &CRITIQUE_FIELDS);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].get("VERDICT"), Some("minor"));
    }

    #[test]
    fn test_no_primary_field_yields_nothing() {
        assert!(parse_blocks("I refuse to answer.", &CRITIQUE_FIELDS).is_empty());
        assert!(parse_blocks("", &CRITIQUE_FIELDS).is_empty());
        assert!(parse_blocks("REALITY: orphan", &CRITIQUE_FIELDS).is_empty());
    }

    #[test]
    fn test_multiword_field_normalized() {
        let fields = ["RESPONSE TO", "DEFENSE", "REVISION", "MITIGATION"];
        let reply = "RESPONSE TO: Fuel costs\nDEFENSE: Accepted\nMITIGATION: Hedge";
        let blocks = parse_blocks(reply, &fields);
        assert_eq!(blocks[0].get("response_to"), Some("Fuel costs"));
        assert_eq!(blocks[0].get("RESPONSE TO"), Some("Fuel costs"));
        assert_eq!(blocks[0].get_or("revision", "none"), "none");
    }

    #[test]
    fn test_indented_opener() {
        let reply = "intro\n   VERDICT: VALIDATED\n   REASONING: holds up";
        let fields = ["VERDICT", "REASONING", "KEY_RISKS", "RECOMMENDATION"];
        let blocks = parse_blocks(reply, &fields);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].get("verdict"), Some("VALIDATED"));
        assert_eq!(blocks[0].get("reasoning"), Some("holds up"));
    }

    #[test]
    fn test_blank_primary_at_end_keeps_block() {
        let blocks = parse_blocks("FRACTURE:  ", &CRITIQUE_FIELDS);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].get("fracture"), Some(""));
        assert_eq!(blocks[0].get("verdict"), None);

        let reply = "FRACTURE: Roads are passable\nVERDICT: MAJOR\nFRACTURE:   ";
        let blocks = parse_blocks(reply, &CRITIQUE_FIELDS);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].get("fracture"), Some(""));
    }

    #[test]
    fn test_blank_trailing_field_is_recorded() {
        let reply = "FRACTURE: Fuel costs stay flat\nVERDICT: MAJOR\nREALITY: ";
        let blocks = parse_blocks(reply, &CRITIQUE_FIELDS);
        assert_eq!(blocks[0].get("reality"), Some(""));
        assert_eq!(blocks[0].get("citation"), None);
    }

    #[test]
    fn test_blank_value_runs_into_next_line() {
        // Whitespace after the label spans the newline, so the value is the
        // following line rather than empty.
        let fields = ["VERDICT", "REASONING", "KEY_RISKS", "RECOMMENDATION"];
        let blocks = parse_blocks("VERDICT: \nREASONING: x", &fields);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].get("verdict"), Some("REASONING: x"));
        assert_eq!(blocks[0].get("reasoning"), Some("x"));
    }

    #[test]
    fn test_repeated_blank_openers() {
        let fields = ["RESPONSE TO", "DEFENSE", "REVISION", "MITIGATION"];
        let reply = "RESPONSE TO :   \n  RESPONSE TO: \nÜ café";
        let blocks = parse_blocks(reply, &fields);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].get("response_to"), Some(""));
        assert_eq!(blocks[1].get("response_to"), Some("Ü café"));
    }

    #[test]
    fn test_empty_field_list() {
        assert!(parse_blocks("FRACTURE: x", &[]).is_empty());
    }
}
