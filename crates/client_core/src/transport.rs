use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::protocol::{UploadResponse, CSRF_FIELD, FILE_FIELD};
use tracing::{info, warn};
use url::Url;

use crate::{error::TransportError, selection::FileCandidate};

const FALLBACK_PART_MEDIA_TYPE: &str = "application/octet-stream";

/// Content type for the file part. Browsers send whatever type they sniffed;
/// one that does not parse as a MIME type goes out as an opaque octet stream.
fn part_media_type(declared: &str) -> &str {
    match declared.parse::<mime_guess::mime::Mime>() {
        Ok(_) => declared,
        Err(err) => {
            warn!(
                media_type = declared,
                "transport: unparseable media type, sending as octet-stream: {err}"
            );
            FALLBACK_PART_MEDIA_TYPE
        }
    }
}

/// Everything one submission sends.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file: FileCandidate,
    pub csrf_token: String,
}

#[async_trait]
pub trait ScoreTransport: Send + Sync {
    async fn submit(&self, request: UploadRequest) -> Result<UploadResponse, TransportError>;
}

/// Multipart POST to the scoring endpoint.
#[derive(Debug, Clone)]
pub struct HttpScoreTransport {
    http: Client,
    endpoint: Url,
}

impl HttpScoreTransport {
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(http: Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ScoreTransport for HttpScoreTransport {
    async fn submit(&self, request: UploadRequest) -> Result<UploadResponse, TransportError> {
        let UploadRequest { file, csrf_token } = request;
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(part_media_type(file.media_type()))?;
        let form = Form::new()
            .part(FILE_FIELD, part)
            .text(CSRF_FIELD, csrf_token);

        info!(
            endpoint = %self.endpoint,
            file = file.name(),
            size_bytes = file.len(),
            "transport: posting upload"
        );
        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        // The body decides the outcome; rejections may arrive with any status.
        let status = response.status();
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| TransportError::Malformed {
            status: status.as_u16(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
