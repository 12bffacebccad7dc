// src/event_log/store.rs

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::FormResult;

use super::model::{
    EventClass, FormLogEvent, LOAD_TAIL_LINES, LOG_BACKUP_NAME, LOG_FILE_NAME, MAX_LOG_BYTES,
    MAX_LOG_EVENTS,
};

/// Bounded in-memory ring mirrored to a JSONL file under the data dir.
/// Disk failures never reach the caller once the log exists.
pub struct EventLog {
    path: PathBuf,
    buf: VecDeque<FormLogEvent>,
    next_id: u64,
}

impl EventLog {
    pub fn init(app_data_dir: &Path) -> FormResult<Self> {
        fs::create_dir_all(app_data_dir)?;

        let mut log = Self {
            path: app_data_dir.join(LOG_FILE_NAME),
            buf: VecDeque::with_capacity(MAX_LOG_EVENTS),
            next_id: 1,
        };

        log.load_tail_best_effort();
        log.next_id = log.compute_next_id();

        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&mut self, class: EventClass, context: &str, msg: &str) {
        let ev = FormLogEvent {
            id: self.alloc_id(),
            ts_ms: now_ms(),
            class,
            context: context.to_string(),
            msg: msg.to_string(),
        };

        if self.buf.len() >= MAX_LOG_EVENTS {
            self.buf.pop_front();
        }
        self.buf.push_back(ev.clone());

        let _ = self.rotate_if_needed_best_effort();
        let _ = self.append_jsonl_best_effort(&ev);
        let _ = self.trim_to_n_events(MAX_LOG_EVENTS);
    }

    pub fn recent(&self) -> Vec<FormLogEvent> {
        self.buf.iter().cloned().collect()
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn compute_next_id(&self) -> u64 {
        self.buf
            .iter()
            .map(|e| e.id)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }

    fn rotate_if_needed_best_effort(&self) -> Result<(), String> {
        let meta = match fs::metadata(&self.path) {
            Ok(m) => m,
            Err(_) => return Ok(()),
        };

        if meta.len() <= MAX_LOG_BYTES {
            return Ok(());
        }

        let backup = self.path.with_file_name(LOG_BACKUP_NAME);
        let _ = fs::remove_file(&backup);
        fs::rename(&self.path, &backup).map_err(|e| format!("event log rotate: {e}"))?;
        Ok(())
    }

    fn append_jsonl_best_effort(&self, ev: &FormLogEvent) -> Result<(), String> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| format!("event log open: {e}"))?;

        let line = serde_json::to_string(ev).map_err(|e| format!("event log json: {e}"))?;
        f.write_all(line.as_bytes())
            .and_then(|_| f.write_all(b"\n"))
            .map_err(|e| format!("event log write: {e}"))?;

        let _ = f.flush();
        Ok(())
    }

    fn trim_to_n_events(&self, n: usize) -> Result<(), String> {
        if n == 0 {
            return Ok(());
        }

        let Ok(file) = File::open(&self.path) else {
            return Ok(());
        };

        let mut tail: VecDeque<String> = VecDeque::with_capacity(n);
        let mut exceeded = false;

        for line in BufReader::new(file).lines().map_while(Result::ok) {
            if tail.len() >= n {
                tail.pop_front();
                exceeded = true;
            }
            tail.push_back(line);
        }

        if !exceeded {
            return Ok(());
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        {
            let mut out = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&tmp)
                .map_err(|e| format!("event log trim open tmp: {e}"))?;

            for line in tail {
                out.write_all(line.as_bytes())
                    .and_then(|_| out.write_all(b"\n"))
                    .map_err(|e| format!("event log trim write tmp: {e}"))?;
            }

            let _ = out.flush();
        }

        fs::rename(&tmp, &self.path).map_err(|e| format!("event log trim rename: {e}"))?;
        Ok(())
    }

    fn load_tail_best_effort(&mut self) {
        let Ok(file) = File::open(&self.path) else {
            return;
        };

        let mut tail: VecDeque<String> = VecDeque::with_capacity(LOAD_TAIL_LINES);
        for line in BufReader::new(file).lines().map_while(Result::ok) {
            if tail.len() >= LOAD_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        }

        // unparseable lines are skipped
        for line in tail {
            if let Ok(ev) = serde_json::from_str::<FormLogEvent>(&line) {
                if self.buf.len() >= MAX_LOG_EVENTS {
                    self.buf.pop_front();
                }
                self.buf.push_back(ev);
            }
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ======================================================
// Unit Tests
// ======================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn records_and_reloads_tail() {
        let dir = tempdir().unwrap();

        let mut log = EventLog::init(dir.path()).unwrap();
        log.record(EventClass::SubmitRejected, "submit", "no reason selected");
        log.record(EventClass::GenerationFailed, "submit", "boom");
        drop(log);

        let mut log = EventLog::init(dir.path()).unwrap();
        let recent = log.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].class, EventClass::GenerationFailed);

        log.record(EventClass::ParamsApplied, "startup", "3 params");
        assert_eq!(log.recent().last().map(|e| e.id), Some(3));
    }

    #[test]
    fn keeps_at_most_max_events() {
        let dir = tempdir().unwrap();
        let mut log = EventLog::init(dir.path()).unwrap();
        for i in 0..(MAX_LOG_EVENTS + 7) {
            log.record(EventClass::SubmitRejected, "submit", &format!("n{i}"));
        }
        assert_eq!(log.recent().len(), MAX_LOG_EVENTS);

        let text = fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.lines().count(), MAX_LOG_EVENTS);
        assert!(text.lines().last().unwrap().contains("n56"));
    }

    #[test]
    fn skips_garbage_lines_on_load() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(LOG_FILE_NAME),
            "not json\n{\"id\":4,\"ts_ms\":1,\"class\":\"ParamsApplied\",\"context\":\"c\",\"msg\":\"m\"}\n",
        )
        .unwrap();

        let mut log = EventLog::init(dir.path()).unwrap();
        assert_eq!(log.recent().len(), 1);
        log.record(EventClass::ParamsApplied, "c", "m");
        assert_eq!(log.recent().last().map(|e| e.id), Some(5));
    }
}
