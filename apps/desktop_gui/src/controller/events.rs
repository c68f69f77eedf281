//! Backend -> UI events.

use std::path::PathBuf;

use client_core::{FileCandidate, SelectionSource, TransportError};
use shared::protocol::UploadResponse;

pub enum UiEvent {
    FileLoaded {
        load_id: u64,
        candidate: FileCandidate,
        source: SelectionSource,
    },
    FileLoadFailed {
        load_id: u64,
        path: PathBuf,
        reason: String,
    },
    SubmissionFinished(Result<UploadResponse, TransportError>),
    BackendFailed(String),
}
