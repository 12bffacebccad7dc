// src/command/attestation/flow.rs

//! Workflow orchestration for the attestation form.
//!
//! Hosts feed [`FormEvent`]s in and render from [`FormModel`]. Submitting is
//! split in two around the only suspension point: [`AttestationForm::submit`]
//! validates and returns a [`GenerationRequest`]; the host runs the generator
//! however it likes and hands the result to
//! [`AttestationForm::finish_generation`].

use crate::command::attestation::extract::{extract_profile, extract_reasons};
use crate::command::attestation::notify::Notification;
use crate::command::attestation::ops::{
    add_slash, attestation_filename, release_defaults, sha256_hex,
};
use crate::command::attestation::params::{
    field_values_from_params, reason_codes_from_params, reason_param_value, wants_auto_submit,
    FragmentParams,
};
use crate::command::attestation::surface::FormModel;
use crate::command::attestation::types::{
    Delivered, DocumentGenerator, Downloader, FormEvent, GenerationRequest, KeyCode, Rejection,
    SubmitOutcome, SubmitReport, WorkflowPhase,
};
use crate::command::attestation::validate::validate_fields_report;
use crate::error::{FormError, FormResult};
use crate::template::FormConfig;
use crate::types::{BIRTHDAY_FIELD_ID, HINT_PREFIX, RELEASE_DATE_FIELD_ID, RELEASE_TIME_FIELD_ID};
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::Instant;

pub struct AttestationForm {
    config: Arc<FormConfig>,
    model: FormModel,
    params: FragmentParams,
    phase: WorkflowPhase,
    notification: Notification,

    /// Visible error from the last failed generation, cleared on the next submit.
    last_error: Option<String>,
}

impl AttestationForm {
    pub fn new(config: Arc<FormConfig>) -> Self {
        let model = FormModel::from_definitions(&config.definitions);
        Self {
            config,
            model,
            params: FragmentParams::default(),
            phase: WorkflowPhase::Idle,
            notification: Notification::default(),
            last_error: None,
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn model(&self) -> &FormModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut FormModel {
        &mut self.model
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Current shareable fragment (`#k=v&...`).
    pub fn share_fragment(&self) -> String {
        self.params.to_fragment()
    }

    /// Submit is offered only while no generation is in flight.
    pub fn can_submit(&self) -> bool {
        self.phase != WorkflowPhase::Generating
    }

    /// Fill the release date with today and the release time with now + 5 min.
    /// Values are written directly; no change event is raised.
    pub fn prefill_release(&mut self, now: NaiveDateTime) -> FormResult<()> {
        let (date, time) = release_defaults(now);
        if self.model.field(RELEASE_DATE_FIELD_ID).is_some() {
            self.model.set_text(RELEASE_DATE_FIELD_ID, date)?;
        }
        if self.model.field(RELEASE_TIME_FIELD_ID).is_some() {
            self.model.set_text(RELEASE_TIME_FIELD_ID, time)?;
        }
        Ok(())
    }

    /// Apply fragment parameters loaded with the page.
    ///
    /// Field values are written without validation. Listed reasons that are
    /// not yet checked are toggled through the normal event path so their
    /// handlers run. An `auto` parameter submits at the end; its outcome is
    /// returned.
    pub fn follow_params(&mut self, params: FragmentParams) -> FormResult<Option<SubmitOutcome>> {
        let values = field_values_from_params(&self.config.definitions, &params);
        let codes = reason_codes_from_params(&self.config.definitions, &params);
        let auto = wants_auto_submit(&params);
        self.params = params;

        for (id, value) in values {
            self.model.set_text(&id, value)?;
        }

        for code in codes {
            let already = self.model.reason(&code).map(|r| r.checked).unwrap_or(false);
            if !already {
                self.dispatch(FormEvent::ReasonToggled {
                    code,
                    checked: true,
                })?;
            }
        }

        if auto {
            return self.dispatch(FormEvent::SubmitClicked);
        }
        Ok(None)
    }

    /// Handle one UI event. Only `SubmitClicked` yields an outcome.
    pub fn dispatch(&mut self, event: FormEvent) -> FormResult<Option<SubmitOutcome>> {
        match event {
            FormEvent::SubmitClicked => return self.submit().map(Some),
            FormEvent::FieldChanged { field_id, value } => {
                self.on_field_changed(&field_id, value)?;
            }
            FormEvent::ReasonToggled { code, checked } => {
                self.on_reason_toggled(&code, checked)?;
            }
            FormEvent::KeyReleased { field_id, key } => {
                self.on_key_released(&field_id, key)?;
            }
        }
        Ok(None)
    }

    fn on_field_changed(&mut self, field_id: &str, value: String) -> FormResult<()> {
        let field = self.model.field_mut(field_id)?;

        if let Some(placeholder) = field.placeholder.as_deref() {
            if value.is_empty() {
                field.hint.clear();
            } else {
                field.hint = format!("{HINT_PREFIX}{placeholder}");
                field.validity_visible = true;
            }
        }

        self.set_tracked_value(field_id, value)
    }

    fn on_key_released(&mut self, field_id: &str, key: KeyCode) -> FormResult<()> {
        if field_id != BIRTHDAY_FIELD_ID || matches!(key, KeyCode::Backspace | KeyCode::Delete) {
            return Ok(());
        }
        let current = self.model.text(field_id).to_string();
        let formatted = add_slash(&current);
        if formatted != current {
            self.set_tracked_value(field_id, formatted)?;
            self.model.request_cursor_end(field_id);
        }
        Ok(())
    }

    fn on_reason_toggled(&mut self, code: &str, checked: bool) -> FormResult<()> {
        self.model.set_checked(code, checked)?;

        let none_checked = self.model.reasons().iter().all(|r| !r.checked);
        self.model.set_fieldset_error(none_checked);

        let name = self.config.definitions.reasons().param_name().to_string();
        let value = reason_param_value(&self.config.definitions, &self.model);
        if value.is_empty() {
            self.params.remove(&name);
        } else {
            self.params.set(&name, &value);
        }
        Ok(())
    }

    /// Write the value and mirror it into the fragment when the field is tracked.
    fn set_tracked_value(&mut self, field_id: &str, value: String) -> FormResult<()> {
        let name = self
            .config
            .tracked_fields()
            .find(|(id, _)| *id == field_id)
            .map(|(_, name)| name.to_string());

        if let Some(name) = name {
            self.params.set(&name, &value);
        }
        self.model.set_text(field_id, value)
    }

    /// Reason check, then field validation; on success the form is
    /// `Generating` until [`finish_generation`](Self::finish_generation).
    pub fn submit(&mut self) -> FormResult<SubmitOutcome> {
        if !self.can_submit() {
            return Ok(SubmitOutcome::Busy);
        }
        self.last_error = None;

        self.phase = WorkflowPhase::ReasonCheck;
        let reasons = extract_reasons(self.model.reasons());
        if reasons.is_empty() {
            self.model.set_fieldset_error(true);
            self.model.request_fieldset_scroll();
            self.settle_phase();
            return Ok(SubmitOutcome::Rejected(Rejection::NoReason));
        }

        self.phase = WorkflowPhase::FieldValidation;
        let invalid = validate_fields_report(&self.config.rules, &mut self.model);
        if !invalid.is_empty() {
            self.settle_phase();
            return Ok(SubmitOutcome::Rejected(Rejection::InvalidFields(invalid)));
        }

        let profile = match extract_profile(self.model.fields()) {
            Ok(p) => p,
            Err(e) => {
                self.settle_phase();
                return Err(e);
            }
        };

        self.phase = WorkflowPhase::Generating;
        Ok(SubmitOutcome::Generate(GenerationRequest { profile, reasons }))
    }

    /// Resume after the generator returns: deliver the artifact and start the
    /// notification, or go back to `Idle` with a visible error.
    pub fn finish_generation(
        &mut self,
        result: FormResult<Vec<u8>>,
        downloader: &dyn Downloader,
        local_now: NaiveDateTime,
        now: Instant,
    ) -> FormResult<Delivered> {
        if self.phase != WorkflowPhase::Generating {
            return Err(FormError::GenerationFailure(
                "no generation in progress".to_string(),
            ));
        }

        let artifact = match result {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail(e)),
        };

        let filename = attestation_filename(local_now);
        let location = match downloader.deliver(&artifact, &filename) {
            Ok(p) => p,
            Err(e) => return Err(self.fail(e)),
        };
        self.phase = WorkflowPhase::Downloaded;

        self.notification.start(now);
        self.phase = WorkflowPhase::Notifying;

        Ok(Delivered {
            filename,
            location,
            sha256_hex: sha256_hex(&artifact),
        })
    }

    fn fail(&mut self, err: FormError) -> FormError {
        self.settle_phase();
        let err = match err {
            e @ (FormError::GenerationFailure(_) | FormError::DownloadFailed(_)) => e,
            other => FormError::GenerationFailure(other.to_string()),
        };
        self.last_error = Some(err.user_msg().short.to_string());
        err
    }

    /// Leave an aborted submit: back to `Notifying` while a previous
    /// notification is still in the tree, else `Idle`.
    fn settle_phase(&mut self) {
        self.phase = if self.notification.in_accessible_tree() {
            WorkflowPhase::Notifying
        } else {
            WorkflowPhase::Idle
        };
    }

    /// Advance timers; the form returns to `Idle` once the notification is gone.
    pub fn tick(&mut self, now: Instant) {
        self.notification.tick(now);
        if self.phase == WorkflowPhase::Notifying && !self.notification.in_accessible_tree() {
            self.phase = WorkflowPhase::Idle;
        }
    }

    /// Submit and run the generator inline.
    pub fn submit_and_generate(
        &mut self,
        generator: &dyn DocumentGenerator,
        downloader: &dyn Downloader,
        template: &[u8],
        local_now: NaiveDateTime,
        now: Instant,
    ) -> FormResult<SubmitReport> {
        let outcome = self.submit()?;
        self.run_outcome(outcome, generator, downloader, template, local_now, now)
    }

    /// Carry a submit outcome through generation and delivery.
    pub fn run_outcome(
        &mut self,
        outcome: SubmitOutcome,
        generator: &dyn DocumentGenerator,
        downloader: &dyn Downloader,
        template: &[u8],
        local_now: NaiveDateTime,
        now: Instant,
    ) -> FormResult<SubmitReport> {
        match outcome {
            SubmitOutcome::Rejected(r) => Ok(SubmitReport::Rejected(r)),
            SubmitOutcome::Busy => Ok(SubmitReport::Busy),
            SubmitOutcome::Generate(req) => {
                let result = generator.generate(&req.profile, &req.reasons, template);
                self.finish_generation(result, downloader, local_now, now)
                    .map(SubmitReport::Delivered)
            }
        }
    }
}

// ======================================================
// Unit Tests
// ======================================================
