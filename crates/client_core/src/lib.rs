use shared::{domain::ScoreResult, protocol::UploadResponse};

pub mod config;
pub mod error;
pub mod render;
pub mod selection;
pub mod submission;
pub mod surface;
pub mod transport;

pub use error::{SubmitError, TransportError, ValidationError};
pub use render::{FeatureRow, ResultRenderer, ScoreView, BAR_ANIMATION_DELAY};
pub use selection::{FileCandidate, SelectionManager, SelectionSource};
pub use submission::{SubmissionController, SubmissionState};
pub use surface::{Notifier, UiSurface};
pub use transport::{HttpScoreTransport, ScoreTransport, UploadRequest};

/// Selection, submission and rendering wired to one UI surface.
///
/// Every method takes `&mut self`, so the selected file, the submission state
/// and the last result have a single writer. Hosts that run the network
/// exchange elsewhere call [`begin_submit`](Self::begin_submit) and
/// [`finish_submit`](Self::finish_submit) themselves; everyone else uses
/// [`submit`](Self::submit).
pub struct AnalyzerSession<S, N> {
    selection: SelectionManager,
    submission: SubmissionController,
    renderer: ResultRenderer,
    surface: S,
    notifier: N,
}

impl<S: UiSurface, N: Notifier> AnalyzerSession<S, N> {
    pub fn new(csrf_token: impl Into<String>, mut surface: S, notifier: N) -> Self {
        surface.set_submit_enabled(false);
        surface.set_loading_visible(false);
        surface.set_result_visible(false);
        Self {
            selection: SelectionManager::new(),
            submission: SubmissionController::new(csrf_token),
            renderer: ResultRenderer::new(),
            surface,
            notifier,
        }
    }

    pub fn select_file(
        &mut self,
        candidate: FileCandidate,
        source: SelectionSource,
    ) -> Result<(), ValidationError> {
        let selected = self
            .selection
            .select_file(candidate, source, &mut self.surface)
            .map(|_| ());
        match selected {
            Ok(()) => {
                let enabled = self.submission.can_submit(&self.selection);
                self.surface.set_submit_enabled(enabled);
                Ok(())
            }
            Err(err) => {
                self.notifier.notify(err.user_message());
                Err(err)
            }
        }
    }

    pub fn drag_over(&mut self) {
        self.selection.drag_over(&mut self.surface);
    }

    pub fn drag_leave(&mut self) {
        self.selection.drag_leave(&mut self.surface);
    }

    pub fn begin_submit(&mut self) -> Option<UploadRequest> {
        self.submission.begin(&self.selection, &mut self.surface)
    }

    pub fn finish_submit(
        &mut self,
        outcome: Result<UploadResponse, TransportError>,
    ) -> SubmissionState {
        self.submission.finish(
            outcome,
            &self.selection,
            &mut self.renderer,
            &mut self.surface,
            &mut self.notifier,
        )
    }

    /// One full cycle. Awaiting the transport is the only suspension point.
    pub async fn submit<T: ScoreTransport + ?Sized>(&mut self, transport: &T) -> SubmissionState {
        let Some(request) = self.begin_submit() else {
            return self.submission.state();
        };
        let outcome = transport.submit(request).await;
        self.finish_submit(outcome)
    }

    pub fn state(&self) -> SubmissionState {
        self.submission.state()
    }

    pub fn can_submit(&self) -> bool {
        self.submission.can_submit(&self.selection)
    }

    pub fn selected_file(&self) -> Option<&FileCandidate> {
        self.selection.current()
    }

    pub fn last_result(&self) -> Option<&ScoreResult> {
        self.renderer.last()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
