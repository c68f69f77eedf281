use std::{path::Path, sync::Arc};

use anyhow::Context;
use tracing::{info, warn};

use crate::{error::ValidationError, surface::UiSurface};

const AUDIO_MEDIA_CLASS: &str = "audio/";
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Picker,
    Drop,
}

/// A file offered for analysis: display name, declared media type, bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
}

impl FileCandidate {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads `path` and declares its media type from the file extension.
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio")
            .to_string();
        let media_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(FALLBACK_MEDIA_TYPE);
        Ok(Self::new(name, media_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_audio(&self) -> bool {
        self.media_type
            .get(..AUDIO_MEDIA_CLASS.len())
            .is_some_and(|class| class.eq_ignore_ascii_case(AUDIO_MEDIA_CLASS))
    }
}

#[derive(Debug, Default)]
pub struct SelectionManager {
    current: Option<FileCandidate>,
    drop_target_active: bool,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&FileCandidate> {
        self.current.as_ref()
    }

    pub fn drop_target_active(&self) -> bool {
        self.drop_target_active
    }

    /// Picker and drop both land here. A rejected candidate leaves the
    /// previous selection in place.
    pub fn select_file<S: UiSurface + ?Sized>(
        &mut self,
        candidate: FileCandidate,
        source: SelectionSource,
        surface: &mut S,
    ) -> Result<&FileCandidate, ValidationError> {
        if source == SelectionSource::Drop {
            self.set_drop_target(false, surface);
        }

        if !candidate.is_audio() {
            warn!(
                file = candidate.name(),
                media_type = candidate.media_type(),
                ?source,
                "selection: rejected non-audio file"
            );
            return Err(ValidationError {
                file_name: candidate.name,
                media_type: candidate.media_type,
            });
        }

        info!(
            file = candidate.name(),
            media_type = candidate.media_type(),
            size_bytes = candidate.len(),
            ?source,
            "selection: file accepted"
        );
        surface.set_selected_file_label(candidate.name());
        Ok(self.current.insert(candidate))
    }

    pub fn drag_over<S: UiSurface + ?Sized>(&mut self, surface: &mut S) {
        self.set_drop_target(true, surface);
    }

    pub fn drag_leave<S: UiSurface + ?Sized>(&mut self, surface: &mut S) {
        self.set_drop_target(false, surface);
    }

    fn set_drop_target<S: UiSurface + ?Sized>(&mut self, active: bool, surface: &mut S) {
        if self.drop_target_active != active {
            self.drop_target_active = active;
            surface.set_drop_target_active(active);
        }
    }
}
