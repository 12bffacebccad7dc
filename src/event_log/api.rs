// src/event_log/api.rs

use crate::types::AppState;

use super::model::{EventClass, FormLogEvent};

/// Lock poisoning drops the event rather than failing the caller.
pub fn record_form_event(state: &AppState, class: EventClass, context: &str, msg: &str) {
    let mut log = match state.event_log.lock() {
        Ok(g) => g,
        Err(_) => return,
    };

    log.record(class, context, msg);
}

pub fn recent_form_events(state: &AppState) -> Vec<FormLogEvent> {
    match state.event_log.lock() {
        Ok(log) => log.recent(),
        Err(_) => Vec::new(),
    }
}
