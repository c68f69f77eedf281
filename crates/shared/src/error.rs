use thiserror::Error;

/// Fallback when a rejection carries neither `errors` nor `error`.
pub const UNKNOWN_REJECTION_MESSAGE: &str = "Unknown error";

/// The endpoint answered with `success: false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServerRejection {
    pub message: String,
}

impl ServerRejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A success body that cannot be turned into a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseShapeError {
    #[error("success response is missing `{0}`")]
    MissingField(&'static str),
}
