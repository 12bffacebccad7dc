// src/ui/panel_form.rs

use eframe::egui;
use attestation_form_lib::command::attestation::{
    AttestationForm, FieldState, FormEvent, KeyCode, WorkflowPhase,
};

use super::message::PanelMsgState;

const INVALID_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 60, 60);
const VALID_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 220, 90);

pub struct FormPanel {
    pub msg: PanelMsgState,
}

impl FormPanel {
    pub fn new() -> Self {
        Self {
            msg: PanelMsgState::default(),
        }
    }

    pub fn clear_messages(&mut self) {
        self.msg.clear();
    }

    /// Draw the form and return the events raised this frame, in order.
    pub fn ui(&mut self, ui: &mut egui::Ui, form: &mut AttestationForm, debug_ui: bool) -> Vec<FormEvent> {
        let mut events = Vec::new();

        ui.heading("Attestation de déplacement");
        ui.separator();

        self.msg.show(ui, debug_ui);
        if let Some(err) = form.last_error() {
            ui.colored_label(INVALID_COLOR, err);
        }
        ui.add_space(6.0);

        let focus = form.model_mut().take_focus_request();
        let cursor_end = form.model_mut().take_cursor_end_request();
        let scroll_reasons = form.model_mut().take_fieldset_scroll();
        let released = released_keys(ui);

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for field in form.model().fields().iter().filter(|f| !f.is_hidden) {
                    let row = FieldRow {
                        focus: focus.as_deref() == Some(field.id.as_str()),
                        cursor_end: cursor_end.as_deref() == Some(field.id.as_str()),
                    };
                    field_row(ui, field, row, &released, &mut events);
                }

                ui.add_space(10.0);
                reasons_group(ui, form, scroll_reasons, &mut events);

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    let busy = form.phase() == WorkflowPhase::Generating;
                    let label = if busy {
                        "Génération…"
                    } else {
                        "Générer mon attestation"
                    };
                    if ui
                        .add_enabled(form.can_submit(), egui::Button::new(label))
                        .clicked()
                    {
                        events.push(FormEvent::SubmitClicked);
                    }
                    if busy {
                        ui.spinner();
                    }

                    let fragment = form.share_fragment();
                    if ui
                        .add_enabled(!fragment.is_empty(), egui::Button::new("Copier le lien"))
                        .clicked()
                    {
                        ui.ctx().copy_text(fragment);
                        self.msg.set_info("Lien copié.");
                    }
                });

                if debug_ui {
                    ui.add_space(6.0);
                    ui.monospace(form.share_fragment());
                    for field in form.model().fields().iter().filter(|f| f.is_hidden) {
                        ui.monospace(format!("{} = {}", field.id, field.text()));
                    }
                }
            });

        events
    }
}

/// One-shot requests the model raised for a field this frame.
#[derive(Clone, Copy)]
struct FieldRow {
    focus: bool,
    cursor_end: bool,
}

fn field_row(
    ui: &mut egui::Ui,
    field: &FieldState,
    row: FieldRow,
    released: &[egui::Key],
    events: &mut Vec<FormEvent>,
) {
    ui.label(&field.label);

    let id = egui::Id::new(&field.id);
    let mut text = field.text().to_string();
    if row.cursor_end {
        move_cursor_to_end(ui.ctx(), id, text.chars().count());
    }

    let mut edit = egui::TextEdit::singleline(&mut text).id(id);
    if let Some(p) = field.placeholder.as_deref() {
        edit = edit.hint_text(p);
    }

    let resp = ui.horizontal(|ui| {
        let resp = ui.add(edit);
        if field.validity_visible {
            match field.aria_invalid {
                Some(true) => ui.colored_label(INVALID_COLOR, "✗"),
                _ => ui.colored_label(VALID_COLOR, "✓"),
            };
        }
        resp
    });
    let resp = resp.inner;

    if resp.changed() {
        events.push(FormEvent::FieldChanged {
            field_id: field.id.clone(),
            value: text,
        });
    }

    if resp.has_focus() {
        for key in released {
            events.push(FormEvent::KeyReleased {
                field_id: field.id.clone(),
                key: key_code(*key),
            });
        }
    }

    if row.focus {
        resp.request_focus();
        resp.scroll_to_me(Some(egui::Align::Center));
    }

    if field.aria_invalid == Some(true) {
        ui.colored_label(INVALID_COLOR, "Champ invalide");
    } else if !field.hint.is_empty() {
        ui.weak(&field.hint);
    }
    ui.add_space(4.0);
}

/// The value was rewritten under the user's cursor; put the caret after it.
fn move_cursor_to_end(ctx: &egui::Context, id: egui::Id, len: usize) {
    let Some(mut state) = egui::TextEdit::load_state(ctx, id) else {
        return;
    };
    let end = egui::text::CCursor::new(len);
    state
        .cursor
        .set_char_range(Some(egui::text::CCursorRange::one(end)));
    state.store(ctx, id);
}

fn reasons_group(
    ui: &mut egui::Ui,
    form: &AttestationForm,
    scroll: bool,
    events: &mut Vec<FormEvent>,
) {
    let fieldset = form.model().fieldset();
    let stroke = if fieldset.errored {
        egui::Stroke::new(1.0, INVALID_COLOR)
    } else {
        ui.visuals().widgets.noninteractive.bg_stroke
    };

    let resp = egui::Frame::NONE
        .stroke(stroke)
        .corner_radius(egui::CornerRadius::same(6u8))
        .inner_margin(egui::Margin::same(8))
        .show(ui, |ui| {
            ui.strong(&fieldset.label);
            if fieldset.alert_visible {
                ui.colored_label(INVALID_COLOR, "Veuillez choisir au moins un motif.");
            }
            for reason in form.model().reasons() {
                let mut checked = reason.checked;
                if ui.checkbox(&mut checked, &reason.value).changed() {
                    events.push(FormEvent::ReasonToggled {
                        code: reason.code.clone(),
                        checked,
                    });
                }
            }
        });

    if scroll {
        resp.response.scroll_to_me(Some(egui::Align::Center));
    }
}

fn released_keys(ui: &egui::Ui) -> Vec<egui::Key> {
    ui.input(|i| {
        i.events
            .iter()
            .filter_map(|e| match e {
                egui::Event::Key {
                    key, pressed: false, ..
                } => Some(*key),
                _ => None,
            })
            .collect()
    })
}

fn key_code(key: egui::Key) -> KeyCode {
    match key {
        egui::Key::Backspace => KeyCode::Backspace,
        egui::Key::Delete => KeyCode::Delete,
        _ => KeyCode::Other,
    }
}
