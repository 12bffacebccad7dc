// tests/common/mod.rs

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use attestation_form_lib::{
    command::attestation::{
        AttestationForm, DocumentGenerator, Downloader, FormEvent, Profile,
    },
    context::AppCtx,
    error::{FormError, FormResult},
    template::FormConfig,
    types::AppState,
};
use chrono::{NaiveDate, NaiveDateTime};

pub struct TestEnv {
    // Keep tempdirs alive for the duration of the test.
    _td_state: tempfile::TempDir,

    pub state: AppState,
    ctx: AppCtx,
}

impl TestEnv {
    pub fn ctx(&self) -> &AppCtx {
        &self.ctx
    }
}

/// Fresh state dir with the event log initialised; downloads land in
/// `<state>/downloads`.
pub fn setup_env() -> TestEnv {
    let td_state = tempfile::tempdir().expect("tempdir state");
    let state = AppState::new_for_tests(td_state.path()).expect("init_state");

    let ctx = AppCtx {
        app_data_dir: td_state.path().to_path_buf(),
        download_dir: td_state.path().join("downloads"),
        template_path: None,
        form_data_path: None,
        debug_ui: false,
    };

    TestEnv {
        _td_state: td_state,
        state,
        ctx,
    }
}

/// 2020-11-02 09:05 local.
pub fn local_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 11, 2)
        .expect("date")
        .and_hms_opt(9, 5, 0)
        .expect("time")
}

pub fn new_form() -> AttestationForm {
    let cfg = FormConfig::standard().expect("standard config");
    AttestationForm::new(Arc::new(cfg))
}

pub fn type_into(form: &mut AttestationForm, field_id: &str, value: &str) {
    form.dispatch(FormEvent::FieldChanged {
        field_id: field_id.to_string(),
        value: value.to_string(),
    })
    .expect("field change");
}

pub fn toggle(form: &mut AttestationForm, code: &str, checked: bool) {
    form.dispatch(FormEvent::ReasonToggled {
        code: code.to_string(),
        checked,
    })
    .expect("reason toggle");
}

/// Every validated field holds a valid value; no reason checked.
pub fn filled_form() -> AttestationForm {
    let mut form = new_form();
    form.prefill_release(local_now()).expect("prefill");
    type_into(&mut form, "field-firstname", "Jérôme");
    type_into(&mut form, "field-lastname", "Lefèvre");
    type_into(&mut form, "field-birthday", "01/01/1970");
    type_into(&mut form, "field-placeofbirth", "Lyon");
    type_into(&mut form, "field-address", "999 avenue de France");
    type_into(&mut form, "field-city", "Saint-Étienne");
    type_into(&mut form, "field-zipcode", "42000");
    form
}

/// Records calls; optionally fails every time.
pub struct MockGenerator {
    pub calls: RefCell<Vec<(Profile, String)>>,
    fail: bool,
}

impl MockGenerator {
    pub fn ok() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl DocumentGenerator for MockGenerator {
    fn generate(&self, profile: &Profile, reasons: &str, _template: &[u8]) -> FormResult<Vec<u8>> {
        self.calls
            .borrow_mut()
            .push((profile.clone(), reasons.to_string()));
        if self.fail {
            Err(FormError::GenerationFailure("mock failure".to_string()))
        } else {
            Ok(b"%PDF-mock".to_vec())
        }
    }
}

#[derive(Default)]
pub struct MockDownloader {
    pub names: RefCell<Vec<String>>,
}

impl MockDownloader {
    pub fn call_count(&self) -> usize {
        self.names.borrow().len()
    }
}

impl Downloader for MockDownloader {
    fn deliver(&self, _artifact: &[u8], filename: &str) -> FormResult<PathBuf> {
        self.names.borrow_mut().push(filename.to_string());
        Ok(PathBuf::from(filename))
    }
}
