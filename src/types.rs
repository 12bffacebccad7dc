// src/types.rs

use std::sync::Mutex;

use crate::event_log::EventLog;

/// Every form field element id is `field-<key>`.
pub const FIELD_PREFIX: &str = "field-";
/// Every reason checkbox id is `checkbox-<code>`.
pub const CHECKBOX_PREFIX: &str = "checkbox-";

/// Definition key of the reason group.
pub const REASON_KEY: &str = "reason";
/// Fragment parameter used for reasons when the group has no alias.
pub const REASON_PARAM_FALLBACK: &str = "raisons";
/// Fragment parameter that triggers an automatic submit after prefill.
pub const AUTO_PARAM: &str = "auto";

pub const BIRTHDAY_FIELD_ID: &str = "field-birthday";
pub const RELEASE_DATE_FIELD_ID: &str = "field-datesortie";
pub const RELEASE_TIME_FIELD_ID: &str = "field-heuresortie";

/// Prefix of the hint shown next to a field while it has content.
pub const HINT_PREFIX: &str = "ex.\u{a0}: ";

pub fn field_id(key: &str) -> String {
    format!("{FIELD_PREFIX}{key}")
}

pub fn checkbox_id(code: &str) -> String {
    format!("{CHECKBOX_PREFIX}{code}")
}

pub struct AppState {
    // persistent + in-memory form event log
    pub event_log: Mutex<EventLog>,
}
