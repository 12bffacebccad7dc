// src/template/mod.rs

pub mod form_data;
pub mod rules;

use crate::error::{FormError, FormResult};
use crate::types::field_id;
use form_data::FieldDefinitions;
use rules::RuleTable;

/// Immutable configuration handed to the engine: the rule table and the
/// field-definition table. Built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct FormConfig {
    pub rules: RuleTable,
    pub definitions: FieldDefinitions,
}

impl FormConfig {
    /// Every rule must point at a declared field, hidden or not.
    pub fn new(rules: RuleTable, definitions: FieldDefinitions) -> FormResult<Self> {
        for id in rules.field_ids() {
            if definitions.by_field_id(id).is_none() {
                return Err(FormError::DefinitionProblem(format!(
                    "rule for '{id}' has no matching field definition"
                )));
            }
        }
        Ok(Self { rules, definitions })
    }

    /// Standard rules plus the built-in definition table.
    pub fn standard() -> FormResult<Self> {
        Self::new(RuleTable::standard()?, form_data::default_form_data()?)
    }

    /// Rule-table fields whose value is mirrored into the URL fragment:
    /// validated, declared and not hidden. Yields `(field_id, param_name)`.
    pub fn tracked_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.field_ids().filter_map(move |id| {
            self.definitions
                .visible_fields()
                .find(|d| field_id(&d.key) == id)
                .map(|d| (id, d.param_name()))
        })
    }
}

// ======================================================
// Unit Tests
// ======================================================
