use std::{path::PathBuf, time::Instant};

use client_core::{
    AnalyzerSession, FileCandidate, Notifier, SelectionSource, TransportError,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::surface::{EguiNotifier, EguiSurface};
use crate::ui::widgets::{feature_bar, score_gauge, tier_color};

pub const SETTINGS_STORAGE_KEY: &str = "desktop_gui.settings";

const AUDIO_EXTENSIONS: &[&str] = &[
    "wav", "mp3", "flac", "ogg", "oga", "m4a", "aac", "aif", "aiff", "opus", "wma",
];
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";
const BAR_ANIMATION_SECONDS: f32 = 0.6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedDesktopSettings {
    pub last_browse_dir: Option<PathBuf>,
}

fn default_browse_dir() -> Option<PathBuf> {
    dirs::audio_dir()
        .or_else(dirs::download_dir)
        .or_else(dirs::home_dir)
}

/// Media type for a dropped file that arrived as bytes rather than a path.
fn dropped_media_type(file: &egui::DroppedFile) -> String {
    if !file.mime.is_empty() {
        return file.mime.clone();
    }
    mime_guess::from_path(&file.name)
        .first_raw()
        .unwrap_or(FALLBACK_MEDIA_TYPE)
        .to_string()
}

pub struct AnalyzerApp {
    session: AnalyzerSession<EguiSurface, EguiNotifier>,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    endpoint_label: String,
    settings: PersistedDesktopSettings,
    hovering_files: bool,
    /// Id of the most recent selection attempt; older load results are stale.
    latest_load_id: u64,
}

impl AnalyzerApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        csrf_token: String,
        endpoint_label: String,
        persisted_settings: Option<PersistedDesktopSettings>,
    ) -> Self {
        Self {
            session: AnalyzerSession::new(
                csrf_token,
                EguiSurface::default(),
                EguiNotifier::default(),
            ),
            cmd_tx,
            ui_rx,
            endpoint_label,
            settings: persisted_settings.unwrap_or_default(),
            hovering_files: false,
            latest_load_id: 0,
        }
    }

    fn next_load_id(&mut self) -> u64 {
        self.latest_load_id += 1;
        self.latest_load_id
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::FileLoaded {
                    load_id,
                    candidate,
                    source,
                } => {
                    if load_id != self.latest_load_id {
                        tracing::debug!(
                            load_id,
                            file = candidate.name(),
                            "ui: dropping stale load"
                        );
                        continue;
                    }
                    // Rejections are already reported through the notifier.
                    let _ = self.session.select_file(candidate, source);
                }
                UiEvent::FileLoadFailed {
                    load_id,
                    path,
                    reason,
                } => {
                    if load_id != self.latest_load_id {
                        tracing::debug!(
                            load_id,
                            path = %path.display(),
                            "ui: dropping stale load failure"
                        );
                        continue;
                    }
                    tracing::warn!(path = %path.display(), "ui: could not load file: {reason}");
                    self.session
                        .notifier_mut()
                        .notify(&format!("Could not open '{}': {reason}", path.display()));
                }
                UiEvent::SubmissionFinished(outcome) => {
                    self.session.finish_submit(outcome);
                }
                UiEvent::BackendFailed(reason) => {
                    self.session.notifier_mut().notify(&reason);
                }
            }
        }
    }

    fn browse(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("Audio", AUDIO_EXTENSIONS);
        if let Some(dir) = self
            .settings
            .last_browse_dir
            .clone()
            .or_else(default_browse_dir)
        {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.pick_file() {
            self.settings.last_browse_dir = path.parent().map(PathBuf::from);
            self.request_load(path, SelectionSource::Picker);
        }
    }

    fn request_load(&mut self, path: PathBuf, source: SelectionSource) {
        let load_id = self.next_load_id();
        let cmd = BackendCommand::LoadFile {
            load_id,
            path,
            source,
        };
        if let Err(reason) = dispatch_backend_command(&self.cmd_tx, cmd) {
            self.session.notifier_mut().notify(&reason);
        }
    }

    fn submit(&mut self) {
        let Some(request) = self.session.begin_submit() else {
            return;
        };
        if let Err(reason) =
            dispatch_backend_command(&self.cmd_tx, BackendCommand::Submit { request })
        {
            self.session.finish_submit(Err(TransportError::Worker(reason)));
        }
    }

    fn handle_file_drops(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|input| {
            (
                !input.raw.hovered_files.is_empty(),
                input.raw.dropped_files.clone(),
            )
        });

        if let Some(file) = dropped.into_iter().next() {
            self.hovering_files = false;
            if let Some(path) = file.path.clone() {
                self.request_load(path, SelectionSource::Drop);
            } else if let Some(bytes) = file.bytes.clone() {
                let candidate =
                    FileCandidate::new(file.name.clone(), dropped_media_type(&file), bytes);
                self.next_load_id();
                let _ = self.session.select_file(candidate, SelectionSource::Drop);
            }
            self.session.drag_leave();
            return;
        }

        if hovering != self.hovering_files {
            self.hovering_files = hovering;
            if hovering {
                self.session.drag_over();
            } else {
                self.session.drag_leave();
            }
        }
    }

    fn show_upload_panel(&mut self, ui: &mut egui::Ui) {
        let surface = self.session.surface();
        let stroke_color = if surface.drop_target_active {
            ui.visuals().selection.stroke.color
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };
        let selected_label = surface
            .selected_label
            .clone()
            .unwrap_or_else(|| "No file selected".to_string());
        let submit_enabled = surface.submit_enabled;
        let loading = surface.loading;

        let mut browse_clicked = false;
        egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(2.0, stroke_color))
            .inner_margin(egui::Margin::same(16))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label("Drop an audio file here or");
                    browse_clicked = ui.button("Browse...").clicked();
                    ui.add_space(4.0);
                    ui.label(egui::RichText::new(selected_label).italics());
                });
            });
        if browse_clicked {
            self.browse();
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let submit = ui.add_enabled(submit_enabled, egui::Button::new("Analyze"));
            if submit.clicked() {
                self.submit();
            }
            if loading {
                ui.add(egui::Spinner::new());
                ui.label("Analyzing...");
            }
        });
    }

    fn show_result_panel(&self, ui: &mut egui::Ui) {
        let surface = self.session.surface();
        if !surface.result_visible {
            return;
        }
        let Some(score) = &surface.score else {
            return;
        };

        ui.separator();
        ui.horizontal(|ui| {
            ui.heading(format!("Stress score: {}", score.score_text));
            ui.label(
                egui::RichText::new(score.tier_label())
                    .color(tier_color(score.tier))
                    .strong(),
            );
        });
        score_gauge(ui, score.fill_percent, score.tier);
        if let Some(at) = surface.rendered_at {
            ui.weak(format!("Analyzed at {}", at.format("%H:%M:%S")));
        }

        ui.add_space(8.0);
        ui.label(egui::RichText::new("Feature contributions").strong());
        let now = Instant::now();
        for (index, row) in surface.features.iter().enumerate() {
            let id = egui::Id::new(("feature_bar", surface.render_generation, index));
            let fraction = ui.ctx().animate_value_with_time(
                id,
                surface.bar_target(row, now),
                BAR_ANIMATION_SECONDS,
            );
            feature_bar(ui, row, fraction);
        }
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.session.notifier().current().map(str::to_string) else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                dismissed = ui.button("OK").clicked();
            });
        if dismissed {
            self.session.notifier_mut().dismiss();
        }
    }
}

impl eframe::App for AnalyzerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.handle_file_drops(ctx);

        let alert_open = self.session.notifier().current().is_some();
        egui::TopBottomPanel::bottom("endpoint_status").show(ctx, |ui| {
            ui.weak(format!("Endpoint: {}", self.endpoint_label));
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!alert_open, |ui| {
                ui.heading("Voice Stress Analyzer");
                ui.add_space(8.0);
                self.show_upload_panel(ui);
                self.show_result_panel(ui);
            });
        });
        self.show_alert(ctx);

        if let Some(remaining) = self.session.surface().animation_pending(Instant::now()) {
            ctx.request_repaint_after(remaining);
        }
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(serialized) = serde_json::to_string(&self.settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}
