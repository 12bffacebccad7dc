// src/command/attestation/types.rs

use crate::error::FormResult;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Normalized `key -> value` snapshot of the form, built per attempt.
pub type Profile = BTreeMap<String, String>;

/// Host-side key classification for key-up events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCode {
    Backspace,
    Delete,
    Other,
}

/// The closed set of UI events the orchestrator reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormEvent {
    SubmitClicked,
    FieldChanged { field_id: String, value: String },
    ReasonToggled { code: String, checked: bool },
    KeyReleased { field_id: String, key: KeyCode },
}

/// Generation attempt lifecycle.
///
/// `ReasonCheck` and `FieldValidation` only exist for the duration of a
/// submit call; hosts observe `Idle`, `Generating` and `Notifying`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkflowPhase {
    Idle,
    ReasonCheck,
    FieldValidation,
    Generating,
    Downloaded,
    Notifying,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// No reason checked; the fieldset is flagged and scrolled into view.
    NoReason,
    /// Field ids that failed their rule, in rule-table order.
    InvalidFields(Vec<String>),
}

/// Everything the document generator needs for one attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub profile: Profile,
    pub reasons: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(Rejection),
    /// Submit ignored: a generation is already in flight.
    Busy,
    /// Validation passed; the host must run the generator and report back.
    Generate(GenerationRequest),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivered {
    pub filename: String,
    pub location: PathBuf,
    pub sha256_hex: String,
}

/// Outcome of a full synchronous submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitReport {
    Rejected(Rejection),
    Busy,
    Delivered(Delivered),
}

/// Turns a profile, the reasons line and a template into a document.
pub trait DocumentGenerator {
    fn generate(&self, profile: &Profile, reasons: &str, template: &[u8]) -> FormResult<Vec<u8>>;
}

/// Hands a finished document to the user.
pub trait Downloader {
    fn deliver(&self, artifact: &[u8], filename: &str) -> FormResult<PathBuf>;
}
