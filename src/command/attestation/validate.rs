// src/command/attestation/validate.rs

use crate::command::attestation::surface::FieldAccess;
use crate::template::rules::RuleTable;

/// Evaluate every rule in table order and reflect the result on the surface.
///
/// Each field gets `aria-invalid` set to its own outcome. Every invalid field
/// is focused in turn, so the last invalid one in table order ends up holding
/// focus. Returns the ids of the invalid fields.
pub fn validate_fields_report(rules: &RuleTable, form: &mut impl FieldAccess) -> Vec<String> {
    let mut invalid = Vec::new();

    for entry in rules.entries() {
        let id = entry.field_id.as_str();
        let value = form
            .field_value(id)
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let is_invalid = entry.rule.is_invalid(value);

        form.set_invalid(id, is_invalid);
        if is_invalid {
            form.focus(id);
            invalid.push(id.to_string());
        }
    }

    invalid
}

/// True when at least one field failed its rule.
pub fn validate_fields(rules: &RuleTable, form: &mut impl FieldAccess) -> bool {
    !validate_fields_report(rules, form).is_empty()
}

// ======================================================
// Unit Tests
// ======================================================
