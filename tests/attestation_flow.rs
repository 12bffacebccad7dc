// tests/attestation_flow.rs

mod common;

use std::time::{Duration, Instant};

use attestation_form_lib::{
    command::attestation::{
        record_submit_error, record_submit_report, NotificationPhase, Rejection, SubmitReport,
        WorkflowPhase,
    },
    download::DirDownloader,
    error::FormError,
    event_log::{recent_form_events, EventClass},
    pdf::PdfStamper,
};

use common::{filled_form, local_now, new_form, setup_env, toggle, MockDownloader, MockGenerator};

fn is_attestation_filename(name: &str) -> bool {
    // attestation-YYYY-MM-DD_HH-MM.pdf
    let Some(stamp) = name
        .strip_prefix("attestation-")
        .and_then(|s| s.strip_suffix(".pdf"))
    else {
        return false;
    };
    stamp.len() == 16
        && stamp.char_indices().all(|(i, c)| match i {
            4 | 7 | 13 => c == '-',
            10 => c == '_',
            _ => c.is_ascii_digit(),
        })
}

#[test]
fn valid_form_generates_one_download_and_notifies() {
    let mut form = filled_form();
    toggle(&mut form, "travail", true);
    toggle(&mut form, "sante", true);

    let gen = MockGenerator::ok();
    let dl = MockDownloader::default();
    let t0 = Instant::now();

    let report = form
        .submit_and_generate(&gen, &dl, b"", local_now(), t0)
        .expect("submit");

    assert_eq!(gen.call_count(), 1);
    assert_eq!(dl.call_count(), 1);
    assert!(is_attestation_filename(&dl.names.borrow()[0]));

    let (profile, reasons) = gen.calls.borrow()[0].clone();
    assert_eq!(reasons, "Travail, Santé");
    assert_eq!(profile.get("firstname").map(String::as_str), Some("Jerome"));
    assert_eq!(profile.get("lastname").map(String::as_str), Some("Lefevre"));
    assert_eq!(profile.get("city").map(String::as_str), Some("Saint-Etienne"));
    assert_eq!(profile.get("datesortie").map(String::as_str), Some("02/11/2020"));
    assert!(profile.keys().all(|k| !k.starts_with("field-")));

    assert!(matches!(report, SubmitReport::Delivered(_)));

    // shown at 100 ms, hiding at 6000 ms, gone 500 ms later
    assert_eq!(form.notification().phase(), NotificationPhase::Revealed);
    form.tick(t0 + Duration::from_millis(100));
    assert!(form.notification().is_shown());
    form.tick(t0 + Duration::from_millis(5999));
    assert!(form.notification().is_shown());
    form.tick(t0 + Duration::from_millis(6000));
    assert_eq!(form.notification().phase(), NotificationPhase::Hiding);
    form.tick(t0 + Duration::from_millis(6500));
    assert!(!form.notification().in_accessible_tree());
    assert_eq!(form.phase(), WorkflowPhase::Idle);
}

#[test]
fn no_reason_never_calls_generator() {
    let mut form = filled_form();
    let gen = MockGenerator::ok();
    let dl = MockDownloader::default();

    let report = form
        .submit_and_generate(&gen, &dl, b"", local_now(), Instant::now())
        .expect("submit");

    assert_eq!(report, SubmitReport::Rejected(Rejection::NoReason));
    assert_eq!(gen.call_count(), 0);
    assert_eq!(dl.call_count(), 0);
    assert!(form.model().fieldset().alert_visible);
}

#[test]
fn invalid_zipcode_blocks_generation_and_takes_focus() {
    let mut form = filled_form();
    toggle(&mut form, "achats", true);
    common::type_into(&mut form, "field-zipcode", "42");

    let gen = MockGenerator::ok();
    let dl = MockDownloader::default();
    let report = form
        .submit_and_generate(&gen, &dl, b"", local_now(), Instant::now())
        .expect("submit");

    assert_eq!(
        report,
        SubmitReport::Rejected(Rejection::InvalidFields(vec!["field-zipcode".to_string()]))
    );
    assert_eq!(gen.call_count(), 0);
    assert_eq!(form.model_mut().take_focus_request().as_deref(), Some("field-zipcode"));

    let zip = form.model().field("field-zipcode").expect("zip");
    assert_eq!(zip.aria_invalid, Some(true));
    let city = form.model().field("field-city").expect("city");
    assert_eq!(city.aria_invalid, Some(false));
}

#[test]
fn generation_failure_goes_back_to_idle_and_is_logged() {
    let env = setup_env();
    let mut form = filled_form();
    toggle(&mut form, "famille", true);

    let gen = MockGenerator::failing();
    let dl = MockDownloader::default();
    let err = form
        .submit_and_generate(&gen, &dl, b"", local_now(), Instant::now())
        .expect_err("generation should fail");
    record_submit_error(&env.state, &err);

    assert!(matches!(err, FormError::GenerationFailure(_)));
    assert_eq!(form.phase(), WorkflowPhase::Idle);
    assert!(form.last_error().is_some());
    assert_eq!(dl.call_count(), 0);

    let events = recent_form_events(&env.state);
    assert_eq!(events.last().map(|e| e.class), Some(EventClass::GenerationFailed));

    // retry succeeds once the generator recovers
    let gen = MockGenerator::ok();
    form.submit_and_generate(&gen, &dl, b"", local_now(), Instant::now())
        .expect("retry");
    assert_eq!(dl.call_count(), 1);
    assert!(form.last_error().is_none());
}

#[test]
fn real_stamper_writes_pdf_to_download_dir() {
    let env = setup_env();
    let mut form = filled_form();
    toggle(&mut form, "sport_animaux", true);

    let downloader = DirDownloader::new(env.ctx().download_dir.clone());
    let report = form
        .submit_and_generate(&PdfStamper::new(), &downloader, b"", local_now(), Instant::now())
        .expect("submit");
    record_submit_report(&env.state, &report);

    let SubmitReport::Delivered(d) = report else {
        panic!("expected a delivered document");
    };
    assert_eq!(d.filename, "attestation-2020-11-02_09-05.pdf");
    let bytes = std::fs::read(&d.location).expect("read pdf");
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(d.sha256_hex.len(), 64);

    let events = recent_form_events(&env.state);
    let last = events.last().expect("event");
    assert_eq!(last.class, EventClass::GenerationSucceeded);
    assert!(last.msg.contains(&d.sha256_hex));
    // field values stay out of the log
    assert!(!last.msg.contains("Jerome"));
}

#[test]
fn load_time_prefill_does_not_validate() {
    let mut form = new_form();
    form.follow_params(attestation_form_lib::command::FragmentParams::parse(
        "#prenom=Jean&cp=abc",
    ))
    .expect("follow");
    assert_eq!(form.model().text("field-zipcode"), "abc");
    assert!(form
        .model()
        .fields()
        .iter()
        .all(|f| f.aria_invalid.is_none()));
}
