// src/lib.rs

pub mod command;
pub mod context;
pub mod download;
pub mod error;
pub mod event_log;
pub mod normalize;
pub mod pdf;
pub mod template;
pub mod types;

use crate::error::FormResult;
use crate::event_log::EventLog;
use crate::types::AppState;
use std::path::Path;
use std::sync::Mutex;

pub fn init_state(app_data_dir: &Path) -> FormResult<AppState> {
    std::fs::create_dir_all(app_data_dir)?;

    let event_log = EventLog::init(app_data_dir)?;

    Ok(AppState {
        event_log: Mutex::new(event_log),
    })
}

impl AppState {
    pub fn new_for_tests(app_data_dir: &Path) -> FormResult<Self> {
        crate::init_state(app_data_dir)
    }
}
