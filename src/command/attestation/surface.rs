// src/command/attestation/surface.rs

//! In-memory form surface: the state a page would keep in its elements
//! (values, `aria-invalid`, hint text, checkbox state, focus). Hosts render
//! from it; the engine only talks to it through [`FieldAccess`] and the
//! accessors below.

use crate::error::{FormError, FormResult};
use crate::template::form_data::FieldDefinitions;
use serde_json::Value as JsonValue;

/// What the validation engine needs from a field collection.
pub trait FieldAccess {
    fn field_value(&self, field_id: &str) -> Option<&JsonValue>;
    fn set_invalid(&mut self, field_id: &str, invalid: bool);
    fn focus(&mut self, field_id: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    pub id: String,
    pub label: String,
    pub value: JsonValue,
    pub placeholder: Option<String>,
    pub is_hidden: bool,

    /// `None` until the field has been validated once.
    pub aria_invalid: Option<bool>,

    /// Example text shown next to the field while it has content.
    pub hint: String,
    pub validity_visible: bool,
}

impl FieldState {
    pub fn text(&self) -> &str {
        self.value.as_str().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonControl {
    pub id: String,
    pub code: String,
    pub value: String,
    pub checked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReasonFieldset {
    pub label: String,
    pub errored: bool,
    pub alert_visible: bool,
    scroll_requested: bool,
}

#[derive(Debug, Clone)]
pub struct FormModel {
    fields: Vec<FieldState>,
    reasons: Vec<ReasonControl>,
    fieldset: ReasonFieldset,
    focused: Option<String>,
    focus_pending: bool,
    cursor_end: Option<String>,
}

impl FormModel {
    pub fn from_definitions(defs: &FieldDefinitions) -> Self {
        let fields = defs
            .fields()
            .iter()
            .map(|d| FieldState {
                id: d.field_id(),
                label: d.label.clone(),
                value: JsonValue::String(String::new()),
                placeholder: d.placeholder.clone(),
                is_hidden: d.is_hidden,
                aria_invalid: None,
                hint: String::new(),
                validity_visible: false,
            })
            .collect();

        let group = defs.reasons();
        let reasons = group
            .items
            .iter()
            .map(|i| ReasonControl {
                id: i.checkbox_id(),
                code: i.code.clone(),
                value: i.value().to_string(),
                checked: false,
            })
            .collect();

        Self {
            fields,
            reasons,
            fieldset: ReasonFieldset {
                label: group.label.clone(),
                ..ReasonFieldset::default()
            },
            focused: None,
            focus_pending: false,
            cursor_end: None,
        }
    }

    pub fn fields(&self) -> &[FieldState] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&FieldState> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: &str) -> FormResult<&mut FieldState> {
        self.fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| FormError::UnknownField(id.to_string()))
    }

    /// Current text of a field; empty for unknown or non-text values.
    pub fn text(&self, id: &str) -> &str {
        self.field(id).map(FieldState::text).unwrap_or("")
    }

    pub fn set_value(&mut self, id: &str, value: JsonValue) -> FormResult<()> {
        self.field_mut(id)?.value = value;
        Ok(())
    }

    pub fn set_text(&mut self, id: &str, value: impl Into<String>) -> FormResult<()> {
        self.set_value(id, JsonValue::String(value.into()))
    }

    pub fn reasons(&self) -> &[ReasonControl] {
        &self.reasons
    }

    pub fn reason(&self, code: &str) -> Option<&ReasonControl> {
        self.reasons.iter().find(|r| r.code == code)
    }

    pub fn set_checked(&mut self, code: &str, checked: bool) -> FormResult<()> {
        let r = self
            .reasons
            .iter_mut()
            .find(|r| r.code == code)
            .ok_or_else(|| FormError::UnknownReason(code.to_string()))?;
        r.checked = checked;
        Ok(())
    }

    pub fn fieldset(&self) -> &ReasonFieldset {
        &self.fieldset
    }

    pub fn set_fieldset_error(&mut self, errored: bool) {
        self.fieldset.errored = errored;
        self.fieldset.alert_visible = errored;
    }

    pub fn request_fieldset_scroll(&mut self) {
        self.fieldset.scroll_requested = true;
    }

    /// Returns true once per scroll request.
    pub fn take_fieldset_scroll(&mut self) -> bool {
        std::mem::take(&mut self.fieldset.scroll_requested)
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// The field a host should move keyboard focus to, once.
    pub fn take_focus_request(&mut self) -> Option<String> {
        if std::mem::take(&mut self.focus_pending) {
            self.focused.clone()
        } else {
            None
        }
    }

    /// Ask the host to put the text cursor after the last character, for
    /// values rewritten while the user is typing.
    pub fn request_cursor_end(&mut self, field_id: &str) {
        self.cursor_end = Some(field_id.to_string());
    }

    pub fn take_cursor_end_request(&mut self) -> Option<String> {
        self.cursor_end.take()
    }
}

impl FieldAccess for FormModel {
    fn field_value(&self, field_id: &str) -> Option<&JsonValue> {
        self.field(field_id).map(|f| &f.value)
    }

    fn set_invalid(&mut self, field_id: &str, invalid: bool) {
        if let Ok(f) = self.field_mut(field_id) {
            f.aria_invalid = Some(invalid);
        }
    }

    fn focus(&mut self, field_id: &str) {
        self.focused = Some(field_id.to_string());
        self.focus_pending = true;
    }
}

// ======================================================
// Unit Tests
// ======================================================
