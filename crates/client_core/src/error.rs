use shared::error::{ResponseShapeError, ServerRejection};
use thiserror::Error;

pub const INVALID_FILE_MESSAGE: &str = "Please select a valid audio file.";
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while analyzing the audio file.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{file_name}' is not an audio file (declared type '{media_type}')")]
pub struct ValidationError {
    pub file_name: String,
    pub media_type: String,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        INVALID_FILE_MESSAGE
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to scoring endpoint failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("scoring endpoint returned an unreadable body (status {status}): {source}")]
    Malformed {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Shape(#[from] ResponseShapeError),
    #[error("submission worker unavailable: {0}")]
    Worker(String),
}

/// Why a submission ended in `Failed`.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("server rejected the upload: {0}")]
    Rejected(#[from] ServerRejection),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SubmitError {
    /// Server messages are shown verbatim; transport detail stays in the log.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(rejection) => format!("Error: {}", rejection.message),
            Self::Transport(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}
