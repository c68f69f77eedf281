//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use client_core::{SelectionSource, UploadRequest};

pub enum BackendCommand {
    /// `load_id` comes back on the resulting event so late loads can be discarded.
    LoadFile {
        load_id: u64,
        path: PathBuf,
        source: SelectionSource,
    },
    Submit {
        request: UploadRequest,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadFile { .. } => "load_file",
            BackendCommand::Submit { .. } => "submit",
        }
    }
}
