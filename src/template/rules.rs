// src/template/rules.rs

use crate::error::{FormError, FormResult};
use regex::Regex;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub enum FieldRule {
    /// Invalid when the value contains no match of the pattern.
    Pattern(Regex),
    /// Invalid when the value is empty.
    NonEmpty,
}

impl FieldRule {
    pub fn pattern(pat: &str) -> FormResult<Self> {
        let re = Regex::new(pat).map_err(|e| FormError::RuleCompile(format!("{pat}: {e}")))?;
        Ok(FieldRule::Pattern(re))
    }

    pub fn is_invalid(&self, value: &str) -> bool {
        match self {
            FieldRule::Pattern(re) => !re.is_match(value),
            FieldRule::NonEmpty => value.is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuleEntry {
    pub field_id: String,
    pub rule: FieldRule,
}

/// Ordered, immutable table of per-field rules. Fields not listed here are
/// never validated.
#[derive(Debug, Clone)]
pub struct RuleTable {
    entries: Vec<RuleEntry>,
}

// Patterns are unanchored at the end on purpose: a value is valid as soon as
// it contains one match. ASCII classes are spelled out because `\d` in the
// regex crate also matches non-ASCII digits.
const BIRTHDAY_PATTERN: &str =
    r"^([0][1-9]|[1-2][0-9]|30|31)/([0][1-9]|10|11|12)/(19[0-9][0-9]|20[0-1][0-9]|2020)";
const ZIPCODE_PATTERN: &str = r"[0-9]{5}";
const RELEASE_DATE_PATTERN: &str = r"[0-9]{4}-[0-9]{2}-[0-9]{2}";
const RELEASE_TIME_PATTERN: &str = r"[0-9]{2}:[0-9]{2}";

impl RuleTable {
    pub fn new(entries: Vec<RuleEntry>) -> FormResult<Self> {
        {
            let mut seen = BTreeSet::new();
            for e in entries.iter() {
                if !seen.insert(e.field_id.as_str()) {
                    return Err(FormError::DefinitionProblem(format!(
                        "duplicate rule for '{}'",
                        e.field_id
                    )));
                }
            }
        }
        Ok(Self { entries })
    }

    /// The rule set of the attestation form.
    pub fn standard() -> FormResult<Self> {
        let entry = |id: &str, rule: FieldRule| RuleEntry {
            field_id: id.to_string(),
            rule,
        };

        Self::new(vec![
            entry("field-firstname", FieldRule::NonEmpty),
            entry("field-lastname", FieldRule::NonEmpty),
            entry("field-birthday", FieldRule::pattern(BIRTHDAY_PATTERN)?),
            entry("field-placeofbirth", FieldRule::NonEmpty),
            entry("field-address", FieldRule::NonEmpty),
            entry("field-city", FieldRule::NonEmpty),
            entry("field-zipcode", FieldRule::pattern(ZIPCODE_PATTERN)?),
            entry("field-datesortie", FieldRule::pattern(RELEASE_DATE_PATTERN)?),
            entry("field-heuresortie", FieldRule::pattern(RELEASE_TIME_PATTERN)?),
        ])
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.field_id.as_str())
    }

    pub fn get(&self, field_id: &str) -> Option<&FieldRule> {
        self.entries
            .iter()
            .find(|e| e.field_id == field_id)
            .map(|e| &e.rule)
    }
}

// ======================================================
// Unit Tests
// ======================================================
