// src/template/form_data.rs

use crate::error::{FormError, FormResult};
use crate::types::{checkbox_id, field_id, REASON_KEY, REASON_PARAM_FALLBACK};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

const DEFAULT_FORM_DATA: &str = include_str!("../../assets/form-data.json5");

/// One entry of the JSON5 definition file, before it is split into ordinary
/// fields and the reason group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDefinition {
    key: String,
    alias: Option<String>,
    #[serde(default)]
    is_hidden: bool,
    label: Option<String>,
    placeholder: Option<String>,
    items: Option<Vec<ReasonItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub key: String,
    pub alias: Option<String>,
    pub is_hidden: bool,
    pub label: String,
    pub placeholder: Option<String>,
}

impl FieldDefinition {
    /// Fragment parameter name: `alias ?? key`.
    pub fn param_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.key)
    }

    pub fn field_id(&self) -> String {
        field_id(&self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReasonItem {
    pub code: String,
    pub alias: Option<String>,
    pub label: Option<String>,
}

impl ReasonItem {
    /// Token used inside the reasons parameter: `alias ?? code`.
    pub fn param_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.code)
    }

    pub fn checkbox_id(&self) -> String {
        checkbox_id(&self.code)
    }

    /// Value carried by the checkbox; this is what ends up in the reasons string.
    pub fn value(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonGroup {
    pub alias: Option<String>,
    pub label: String,
    pub items: Vec<ReasonItem>,
}

impl ReasonGroup {
    /// Fragment parameter holding the comma-separated reason tokens.
    ///
    /// The group key is never consulted: without an alias the historical
    /// `raisons` name is used, so links shared before aliases existed keep working.
    pub fn param_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(REASON_PARAM_FALLBACK)
    }

    pub fn item(&self, code: &str) -> Option<&ReasonItem> {
        self.items.iter().find(|i| i.code == code)
    }
}

/// The externally supplied field table, flattened and checked.
#[derive(Debug, Clone)]
pub struct FieldDefinitions {
    fields: Vec<FieldDefinition>,
    reasons: ReasonGroup,
}

impl FieldDefinitions {
    /// Ordinary (non-reason) definitions in file order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn reasons(&self) -> &ReasonGroup {
        &self.reasons
    }

    pub fn by_key(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn by_field_id(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.field_id() == id)
    }

    /// Definitions that take part in fragment synchronization.
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| !f.is_hidden)
    }
}

/// Parse a JSON5 definition file: a list of groups, each a list of definitions.
pub fn parse_form_data_str(s: &str) -> FormResult<FieldDefinitions> {
    let groups: Vec<Vec<RawDefinition>> = json5::from_str(s)?;
    build_definitions(groups.into_iter().flatten())
}

pub fn load_form_data_path(path: impl AsRef<Path>) -> FormResult<FieldDefinitions> {
    let s = fs::read_to_string(path)?;
    parse_form_data_str(&s)
}

/// The definition table shipped with the application.
pub fn default_form_data() -> FormResult<FieldDefinitions> {
    parse_form_data_str(DEFAULT_FORM_DATA)
}

fn build_definitions(
    raw: impl Iterator<Item = RawDefinition>,
) -> FormResult<FieldDefinitions> {
    let mut fields = Vec::new();
    let mut reasons: Option<ReasonGroup> = None;
    let mut seen_keys = BTreeSet::new();

    for (i, def) in raw.enumerate() {
        let key = def.key.trim().to_string();
        if key.is_empty() {
            return Err(FormError::DefinitionProblem(format!(
                "definition[{i}] has empty key"
            )));
        }
        if !seen_keys.insert(key.clone()) {
            return Err(FormError::DefinitionProblem(format!(
                "duplicate definition key '{key}'"
            )));
        }

        if key == REASON_KEY {
            let items = def.items.unwrap_or_default();
            if items.is_empty() {
                return Err(FormError::DefinitionProblem(
                    "reason group has no items".to_string(),
                ));
            }
            check_reason_items(&items)?;
            reasons = Some(ReasonGroup {
                alias: def.alias,
                label: def.label.unwrap_or_else(|| key.clone()),
                items,
            });
            continue;
        }

        if def.items.is_some() {
            return Err(FormError::DefinitionProblem(format!(
                "only the '{REASON_KEY}' definition may declare items (found on '{key}')"
            )));
        }

        fields.push(FieldDefinition {
            label: def.label.unwrap_or_else(|| key.clone()),
            key,
            alias: def.alias,
            is_hidden: def.is_hidden,
            placeholder: def.placeholder,
        });
    }

    let reasons = reasons.ok_or_else(|| {
        FormError::DefinitionProblem(format!("no '{REASON_KEY}' definition found"))
    })?;

    Ok(FieldDefinitions { fields, reasons })
}

fn check_reason_items(items: &[ReasonItem]) -> FormResult<()> {
    let mut codes = BTreeSet::new();
    for item in items {
        if item.code.trim().is_empty() {
            return Err(FormError::DefinitionProblem(
                "reason item has empty code".to_string(),
            ));
        }
        if !codes.insert(item.code.as_str()) {
            return Err(FormError::DefinitionProblem(format!(
                "duplicate reason code '{}'",
                item.code
            )));
        }
    }
    Ok(())
}

// ======================================================
// Unit Tests
// ======================================================
