//! GUI rendering functions.
//!
//! Contains UI layout and component rendering logic.

use eframe::egui::{self, Color32, RichText};

use super::state::{GifStatus, GuiState, SessionStatus};

/// Buttons clicked during one frame.
#[derive(Default)]
pub struct Clicks {
    pub start: bool,
    pub stop: bool,
    pub generate_gif: bool,
    pub open_folder: bool,
}

/// Sessions folder and interval fields.
pub fn render_settings(ui: &mut egui::Ui, state: &mut GuiState) {
    let is_active = state.status.is_active();

    ui.label(RichText::new("Sessions Folder:").strong());
    ui.add_enabled(
        !is_active,
        egui::TextEdit::singleline(&mut state.sessions_folder_text).desired_width(f32::INFINITY),
    );

    ui.add_space(8.0);

    // Editable while running; the session picks it up before its next sleep
    ui.horizontal(|ui| {
        ui.label("Screenshot Interval (seconds):");
        ui.add(egui::TextEdit::singleline(&mut state.interval_text).desired_width(60.0));
    });

    ui.add_space(4.0);
    ui.checkbox(&mut state.remember_settings, "Remember settings");
}

/// Start/stop buttons.
pub fn render_controls(ui: &mut egui::Ui, state: &GuiState, clicks: &mut Clicks) {
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        let is_active = state.status.is_active();

        ui.add_enabled_ui(!is_active, |ui| {
            if ui.button(RichText::new("▶ Start Session").size(16.0)).clicked() {
                clicks.start = true;
            }
        });

        ui.add_space(20.0);

        ui.add_enabled_ui(state.status == SessionStatus::Running, |ui| {
            if ui.button(RichText::new("◼ Stop Session").size(16.0)).clicked() {
                clicks.stop = true;
            }
        });
    });

    if let Some(message) = &state.message {
        ui.add_space(4.0);
        ui.label(RichText::new(message).color(Color32::from_rgb(200, 0, 0)));
    }
}

/// Status line and counters.
pub fn render_progress(ui: &mut egui::Ui, state: &GuiState) {
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.label("Status:");

        let status_color = match &state.status {
            SessionStatus::Idle => Color32::GRAY,
            SessionStatus::Running | SessionStatus::Stopping => Color32::from_rgb(0, 120, 200),
            SessionStatus::Stopped { .. } => Color32::from_rgb(0, 150, 0),
            SessionStatus::Error(_) => Color32::from_rgb(200, 0, 0),
        };

        ui.label(RichText::new(state.status.status_text()).color(status_color));
    });

    ui.add_space(4.0);
    ui.label(state.count_text());
    ui.label(state.elapsed_text());
}

/// GIF generation, export options and folder button.
pub fn render_actions(ui: &mut egui::Ui, state: &mut GuiState, clicks: &mut Clicks) {
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    ui.checkbox(&mut state.gif_export, "Export GIF copy");
    ui.add_enabled_ui(state.gif_export, |ui| {
        ui.horizontal(|ui| {
            ui.label("Export Folder:");
            ui.add(
                egui::TextEdit::singleline(&mut state.gif_export_folder_text)
                    .desired_width(f32::INFINITY),
            );
        });
    });

    ui.add_space(8.0);

    ui.horizontal(|ui| {
        let has_session = state.last_session_folder.is_some();

        ui.add_enabled_ui(has_session && !state.gif_status.is_working(), |ui| {
            if ui.button("🎞 Generate GIF").clicked() {
                clicks.generate_gif = true;
            }
        });

        ui.add_space(20.0);

        ui.add_enabled_ui(has_session, |ui| {
            if ui.button("📁 Open Last Screenshot Folder").clicked() {
                clicks.open_folder = true;
            }
        });
    });

    match &state.gif_status {
        GifStatus::Idle => {}
        GifStatus::Working => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Creating GIF...");
            });
        }
        GifStatus::Done(msg) => {
            ui.label(RichText::new(msg).color(Color32::from_rgb(0, 150, 0)));
        }
        GifStatus::Failed(msg) => {
            ui.label(RichText::new(msg).color(Color32::from_rgb(200, 0, 0)));
        }
    }
}
