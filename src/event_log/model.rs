// src/event_log/model.rs

use serde::{Deserialize, Serialize};

pub const LOG_FILE_NAME: &str = "form-events.log.jsonl";
pub const LOG_BACKUP_NAME: &str = "form-events.log.jsonl.1";

pub const MAX_LOG_BYTES: u64 = 2 * 1024 * 1024;
pub const MAX_LOG_EVENTS: usize = 50;
pub const LOAD_TAIL_LINES: usize = 400;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventClass {
    ParamsApplied,
    SubmitRejected,
    GenerationSucceeded,
    GenerationFailed,
    DownloadFailed,
}

/// One persisted line. Never carries field values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormLogEvent {
    pub id: u64,
    pub ts_ms: u64,
    pub class: EventClass,
    pub context: String,
    pub msg: String,
}
