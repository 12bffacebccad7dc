// src/ui/mod.rs

pub mod message;
pub mod panel_form;

use eframe::egui;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use attestation_form_lib::command::attestation::{
    record_submit_error, record_submit_report, AttestationForm, DocumentGenerator, FormEvent,
    FragmentParams, NotificationPhase, SubmitOutcome, SubmitReport,
};
use attestation_form_lib::context::AppCtx;
use attestation_form_lib::download::DirDownloader;
use attestation_form_lib::error::{FormError, FormResult};
use attestation_form_lib::event_log::{record_form_event, EventClass};
use attestation_form_lib::pdf::PdfStamper;
use attestation_form_lib::template::FormConfig;
use attestation_form_lib::types::AppState;

use panel_form::FormPanel;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct UiApp {
    state: Arc<AppState>,
    ctx: Arc<AppCtx>,
    template: Arc<Vec<u8>>,

    form: AttestationForm,
    panel: FormPanel,

    /// Result channel of the generation worker, while one is running.
    pending: Option<Receiver<FormResult<Vec<u8>>>>,
}

impl UiApp {
    pub fn new(
        state: Arc<AppState>,
        ctx: Arc<AppCtx>,
        config: Arc<FormConfig>,
        template: Vec<u8>,
        fragment: Option<String>,
    ) -> Self {
        let mut app = Self {
            state,
            ctx,
            template: Arc::new(template),
            form: AttestationForm::new(config),
            panel: FormPanel::new(),
            pending: None,
        };

        if let Err(e) = app.form.prefill_release(chrono::Local::now().naive_local()) {
            app.panel.msg.from_form_error(&e);
        }

        if let Some(raw) = fragment {
            let params = FragmentParams::from_url_or_fragment(&raw);
            if !params.is_empty() {
                record_form_event(
                    app.state.as_ref(),
                    EventClass::ParamsApplied,
                    "startup",
                    &format!("{} params", params.len()),
                );
            }
            match app.form.follow_params(params) {
                Ok(Some(outcome)) => app.handle_outcome(outcome),
                Ok(None) => {}
                Err(e) => app.panel.msg.from_form_error(&e),
            }
        }

        app
    }

    fn handle_events(&mut self, events: Vec<FormEvent>) {
        for ev in events {
            match self.form.dispatch(ev) {
                Ok(Some(outcome)) => self.handle_outcome(outcome),
                Ok(None) => {}
                Err(e) => self.panel.msg.from_form_error(&e),
            }
        }
    }

    fn handle_outcome(&mut self, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Rejected(r) => {
                self.panel.clear_messages();
                record_submit_report(self.state.as_ref(), &SubmitReport::Rejected(r));
            }
            SubmitOutcome::Busy => {
                self.panel.msg.from_form_error(&FormError::Busy);
                record_submit_report(self.state.as_ref(), &SubmitReport::Busy);
            }
            SubmitOutcome::Generate(req) => {
                self.panel.clear_messages();
                let template = Arc::clone(&self.template);
                let (tx, rx) = mpsc::channel();
                thread::spawn(move || {
                    let result = PdfStamper::new().generate(&req.profile, &req.reasons, &template);
                    let _ = tx.send(result);
                });
                self.pending = Some(rx);
            }
        }
    }

    /// Resume the workflow once the worker has answered.
    fn poll_generation(&mut self) {
        let Some(rx) = self.pending.as_ref() else {
            return;
        };

        let result = match rx.try_recv() {
            Ok(r) => r,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(FormError::GenerationFailure(
                "generation worker stopped".to_string(),
            )),
        };
        self.pending = None;

        let downloader = DirDownloader::new(self.ctx.download_dir.clone());
        match self.form.finish_generation(
            result,
            &downloader,
            chrono::Local::now().naive_local(),
            Instant::now(),
        ) {
            Ok(delivered) => {
                record_submit_report(
                    self.state.as_ref(),
                    &SubmitReport::Delivered(delivered.clone()),
                );
                if self.ctx.debug_ui {
                    self.panel
                        .msg
                        .set_success(format!("{}", delivered.location.display()));
                }
            }
            Err(e) => {
                record_submit_error(self.state.as_ref(), &e);
                self.panel.msg.from_form_error(&e);
            }
        }
    }

    fn show_notification(&self, ctx: &egui::Context) {
        let n = self.form.notification();
        if !n.in_accessible_tree() {
            return;
        }

        let alpha = match n.phase() {
            NotificationPhase::Shown => 1.0,
            _ => 0.35,
        };

        egui::TopBottomPanel::bottom("download_notification").show(ctx, |ui| {
            ui.set_opacity(alpha);
            ui.horizontal(|ui| {
                ui.label("Le document a été téléchargé.");
                ui.weak(self.ctx.download_dir.display().to_string());
            });
        });
    }
}

impl eframe::App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let debug_ui = self.ctx.debug_ui || cfg!(debug_assertions);

        self.poll_generation();

        let now = Instant::now();
        self.form.tick(now);

        self.show_notification(ctx);

        let events = egui::CentralPanel::default()
            .show(ctx, |ui| self.panel.ui(ui, &mut self.form, debug_ui))
            .inner;
        self.handle_events(events);

        if self.pending.is_some() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
        if let Some(deadline) = self.form.notification().next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }
}
