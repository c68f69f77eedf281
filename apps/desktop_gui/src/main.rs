mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Result};
use clap::Parser;
use client_core::{config::load_settings, HttpScoreTransport};
use crossbeam_channel::bounded;
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{
    app::{PersistedDesktopSettings, SETTINGS_STORAGE_KEY},
    AnalyzerApp,
};

#[derive(Parser, Debug)]
#[command(about = "Desktop voice stress analyzer")]
struct Args {
    /// Overrides `endpoint_url` from analyzer.toml / environment.
    #[arg(long)]
    endpoint_url: Option<String>,
    #[arg(long)]
    csrf_token: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(endpoint_url) = args.endpoint_url {
        settings.endpoint_url = endpoint_url;
    }
    if let Some(csrf_token) = args.csrf_token {
        settings.csrf_token = csrf_token;
    }
    let endpoint = settings.endpoint()?;
    tracing::info!(endpoint = %endpoint, "desktop_gui: starting");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, HttpScoreTransport::new(endpoint.clone()));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Voice Stress Analyzer")
            .with_inner_size([560.0, 640.0])
            .with_min_inner_size([420.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    let csrf_token = settings.csrf_token;
    eframe::run_native(
        "Voice Stress Analyzer",
        options,
        Box::new(move |cc| {
            let persisted_settings = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedDesktopSettings>(&text).ok())
            });
            Ok(Box::new(AnalyzerApp::new(
                cmd_tx,
                ui_rx,
                csrf_token,
                endpoint.to_string(),
                persisted_settings,
            )))
        }),
    )
    .map_err(|err| anyhow!("failed to run desktop window: {err}"))
}
