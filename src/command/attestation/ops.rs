// src/command/attestation/ops.rs

use crate::command::attestation::types::{Rejection, SubmitReport};
use crate::error::FormError;
use crate::event_log::{record_form_event, EventClass};
use crate::types::AppState;
use chrono::{Duration as ChronoDuration, NaiveDateTime};
use sha2::{Digest, Sha256};

/// Offset applied to the clock when pre-filling the release time.
pub const RELEASE_TIME_OFFSET_MINUTES: i64 = 5;

/// `attestation-YYYY-MM-DD_HH-MM.pdf` for the given local time.
pub fn attestation_filename(now: NaiveDateTime) -> String {
    format!(
        "attestation-{}_{}.pdf",
        now.format("%Y-%m-%d"),
        now.format("%H-%M")
    )
}

/// Release date (`YYYY-MM-DD`) and time (`HH:MM`, now + 5 min) defaults.
pub fn release_defaults(now: NaiveDateTime) -> (String, String) {
    let date = now.format("%Y-%m-%d").to_string();
    let later = now + ChronoDuration::minutes(RELEASE_TIME_OFFSET_MINUTES);
    let time = later.format("%H:%M").to_string();
    (date, time)
}

/// Insert `/` separators while a date is typed: `01` -> `01/`,
/// `01/02` -> `01/02/`; doubled slashes collapse.
pub fn add_slash(s: &str) -> String {
    let two_digits = |t: &str| t.len() == 2 && t.bytes().all(|b| b.is_ascii_digit());

    let mut out = if two_digits(s) {
        format!("{s}/")
    } else {
        s.to_string()
    };

    if let Some((day, month)) = out.split_once('/') {
        if two_digits(day) && two_digits(month) {
            out = format!("{day}/{month}/");
        }
    }

    out.replace("//", "/")
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Log a finished submit attempt. Field values are never written.
pub fn record_submit_report(state: &AppState, report: &SubmitReport) {
    match report {
        SubmitReport::Rejected(Rejection::NoReason) => {
            record_form_event(state, EventClass::SubmitRejected, "submit", "no reason selected")
        }
        SubmitReport::Rejected(Rejection::InvalidFields(ids)) => record_form_event(
            state,
            EventClass::SubmitRejected,
            "submit",
            &format!("invalid fields: {}", ids.join(",")),
        ),
        SubmitReport::Busy => {
            record_form_event(state, EventClass::SubmitRejected, "submit", "busy")
        }
        SubmitReport::Delivered(d) => record_form_event(
            state,
            EventClass::GenerationSucceeded,
            "submit",
            &format!("{} sha256={}", d.filename, d.sha256_hex),
        ),
    }
}

pub fn record_submit_error(state: &AppState, err: &FormError) {
    let class = match err {
        FormError::DownloadFailed(_) => EventClass::DownloadFailed,
        _ => EventClass::GenerationFailed,
    };
    record_form_event(state, class, "submit", &err.to_string());
}

// ======================================================
// Unit Tests
// ======================================================
