//! GUI module for the application.
//!
//! Provides the control panel using egui/eframe. Capture and GIF work run on
//! background threads; the panel only polls their state.

pub mod render;
pub mod state;

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use eframe::egui::{self, Vec2};

use crate::config::{save_config, AppConfig};
use crate::gif::{create_session_gif, GifOptions, GifOutcome};
use crate::session::{start_session, CaptureDevices, SessionHandle};

use render::Clicks;
use state::{GifStatus, GuiState, SessionStatus};

/// Main GUI application struct.
pub struct GuiApp {
    state: GuiState,
    config: AppConfig,
    session: Option<SessionHandle>,
    gif_job: Option<Receiver<Result<GifOutcome>>>,
}

impl GuiApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: GuiState::from_config(&config),
            config,
            session: None,
            gif_job: None,
        }
    }

    /// Applies the panel fields to the config. Shows the problem and returns
    /// false on invalid input.
    fn sync_config(&mut self) -> bool {
        match self.state.to_config(&self.config) {
            Ok(config) => {
                self.config = config;
                self.state.message = None;
                true
            }
            Err(e) => {
                self.state.message = Some(e.to_string());
                false
            }
        }
    }

    fn persist_settings(&self) {
        if !self.state.remember_settings {
            return;
        }
        if let Err(e) = save_config(&self.config, &crate::paths::get_config_path()) {
            log::error!("GUI: Failed to save settings: {:#}", e);
        }
    }

    /// Update session status by polling the running session.
    fn update_session_status(&mut self) {
        let Some(session) = &self.session else {
            return;
        };

        self.state.frames = session.frame_count();
        self.state.elapsed = session.elapsed();

        if session.is_finished() {
            let frames = session.frame_count();
            if let Some(session) = self.session.take() {
                session.join();
            }
            self.state.status = SessionStatus::Stopped { frames };
            log::info!("GUI: Session finished with {} screenshots", frames);
            return;
        }

        if self.state.status == SessionStatus::Running {
            let interval = self.state.live_interval();
            if interval != session.control().interval_secs() {
                log::info!("GUI: Interval changed to {}s", interval);
                session.control().set_interval_secs(interval);
            }
        }
    }

    fn update_gif_status(&mut self) {
        let Some(rx) = &self.gif_job else {
            return;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                Err(anyhow::anyhow!("GIF worker exited unexpectedly"))
            }
        };
        self.gif_job = None;

        self.state.gif_status = match result {
            Ok(GifOutcome::Created { path, frames, exported }) => {
                let mut msg = format!("GIF saved as {} ({} frames)", path.display(), frames);
                if let Some(copy) = exported {
                    msg.push_str(&format!("\nExported to {}", copy.display()));
                }
                GifStatus::Done(msg)
            }
            Ok(GifOutcome::MissingFolder) => {
                GifStatus::Failed("No session folder found to generate GIF.".to_string())
            }
            Ok(GifOutcome::NoImages) => {
                GifStatus::Failed("No valid images found to create GIF.".to_string())
            }
            Err(e) => {
                log::error!("GUI: Failed to create GIF: {:#}", e);
                GifStatus::Failed(format!("Failed to create GIF: {:#}", e))
            }
        };
    }

    /// Handle start button click.
    fn handle_start(&mut self) {
        if !self.sync_config() {
            return;
        }
        self.persist_settings();

        let started =
            CaptureDevices::system().and_then(|devices| start_session(&self.config, devices));

        match started {
            Ok(session) => {
                log::info!("GUI: Started session in {}", session.folder().display());
                self.state.last_session_folder = Some(session.folder().to_path_buf());
                self.state.frames = 0;
                self.state.elapsed = Duration::ZERO;
                self.state.status = SessionStatus::Running;
                self.session = Some(session);
            }
            Err(e) => {
                log::error!("GUI: Failed to start session: {:#}", e);
                self.state.status = SessionStatus::Error(format!("{:#}", e));
            }
        }
    }

    /// Handle stop button click.
    fn handle_stop(&mut self) {
        if let Some(session) = &self.session {
            session.stop();
            self.state.status = SessionStatus::Stopping;
            log::info!("GUI: Requested session stop");
        }
        self.sync_config();
        self.persist_settings();
    }

    /// Handle generate GIF button click.
    fn handle_generate_gif(&mut self) {
        let Some(folder) = self.state.last_session_folder.clone() else {
            self.state.gif_status =
                GifStatus::Failed("No session folder found to generate GIF.".to_string());
            return;
        };

        if !self.sync_config() {
            return;
        }

        let options = GifOptions::from_config(&self.config);
        let (tx, rx) = mpsc::channel();

        log::info!("GUI: Generating GIF for {}", folder.display());
        thread::spawn(move || {
            let _ = tx.send(create_session_gif(&folder, &options));
        });

        self.gif_job = Some(rx);
        self.state.gif_status = GifStatus::Working;
    }

    /// Handle open folder button click.
    fn handle_open_folder(&mut self) {
        let Some(path) = &self.state.last_session_folder else {
            return;
        };

        if !path.exists() {
            self.state.message = Some("No screenshots have been taken yet.".to_string());
            return;
        }

        if let Err(e) = crate::paths::open_in_file_manager(path) {
            log::error!("GUI: Failed to open folder: {:#}", e);
            self.state.message = Some(format!("Failed to open folder: {:#}", e));
        }
    }
}

impl eframe::App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_session_status();
        self.update_gif_status();

        // Repaint while background work is in flight (for counters)
        if self.state.status.is_active() || self.state.gif_status.is_working() {
            ctx.request_repaint_after(Duration::from_millis(200));
        }

        let mut clicks = Clicks::default();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Silica Map Screenshot Tool");
            ui.add_space(12.0);

            egui::ScrollArea::vertical().show(ui, |ui| {
                render::render_settings(ui, &mut self.state);
                render::render_controls(ui, &self.state, &mut clicks);
                render::render_progress(ui, &self.state);
                render::render_actions(ui, &mut self.state, &mut clicks);
            });
        });

        if clicks.start {
            self.handle_start();
        }
        if clicks.stop {
            self.handle_stop();
        }
        if clicks.generate_gif {
            self.handle_generate_gif();
        }
        if clicks.open_folder {
            self.handle_open_folder();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(session) = self.session.take() {
            log::info!("GUI: Window closed, stopping session");
            session.join();
        }
    }
}

/// Run the GUI application.
/// This function blocks until the window is closed.
pub fn run_gui(config: AppConfig) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(Vec2::new(420.0, 560.0))
            .with_min_inner_size(Vec2::new(360.0, 420.0))
            .with_title("Silica Map Screenshot Tool"),
        ..Default::default()
    };

    log::info!("GUI: Starting control panel");

    eframe::run_native(
        "Silica Map Screenshot Tool",
        options,
        Box::new(|_cc| Ok(Box::new(GuiApp::new(config)))),
    )
}

