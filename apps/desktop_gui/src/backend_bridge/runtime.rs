//! Worker thread owning the Tokio runtime; UI commands in, UI events out.

use std::{sync::Arc, thread};

use client_core::{FileCandidate, ScoreTransport};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub fn launch<T>(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, transport: T)
where
    T: ScoreTransport + 'static,
{
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::BackendFailed(format!(
                    "backend worker startup failure: {err}"
                )));
                return;
            }
        };

        // Commands run concurrently; the UI drops load results that a newer
        // selection has superseded.
        let transport = Arc::new(transport);
        while let Ok(cmd) = cmd_rx.recv() {
            let ui_tx = ui_tx.clone();
            let transport = Arc::clone(&transport);
            runtime.spawn(async move {
                let event = handle_command(cmd, transport.as_ref()).await;
                if ui_tx.send(event).is_err() {
                    tracing::warn!("backend: ui event queue closed");
                }
            });
        }
        tracing::info!("backend: command queue closed, worker exiting");
    });
}

pub async fn handle_command<T>(cmd: BackendCommand, transport: &T) -> UiEvent
where
    T: ScoreTransport + ?Sized,
{
    match cmd {
        BackendCommand::LoadFile {
            load_id,
            path,
            source,
        } => match FileCandidate::load(&path).await {
            Ok(candidate) => UiEvent::FileLoaded {
                load_id,
                candidate,
                source,
            },
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    load_id,
                    "backend: load_file failed: {err:#}"
                );
                UiEvent::FileLoadFailed {
                    load_id,
                    path,
                    reason: format!("{err:#}"),
                }
            }
        },
        BackendCommand::Submit { request } => {
            UiEvent::SubmissionFinished(transport.submit(request).await)
        }
    }
}
