// src/event_log/mod.rs

mod api;
mod model;
mod store;

pub use api::{record_form_event, recent_form_events};

pub use model::{EventClass, FormLogEvent, LOG_FILE_NAME, MAX_LOG_EVENTS};

pub use store::EventLog;
