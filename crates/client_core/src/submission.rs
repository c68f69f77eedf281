use shared::protocol::{UploadResponse, UploadVerdict};
use tracing::{error, info, warn};

use crate::{
    error::{SubmitError, TransportError},
    render::ResultRenderer,
    selection::SelectionManager,
    surface::{Notifier, UiSurface},
    transport::UploadRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// Drives one submission at a time through `begin` and `finish`.
#[derive(Debug)]
pub struct SubmissionController {
    state: SubmissionState,
    csrf_token: String,
}

impl SubmissionController {
    pub fn new(csrf_token: impl Into<String>) -> Self {
        Self {
            state: SubmissionState::Idle,
            csrf_token: csrf_token.into(),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn can_submit(&self, selection: &SelectionManager) -> bool {
        selection.current().is_some() && self.state != SubmissionState::InFlight
    }

    /// Returns `None` without touching anything when no file is selected or
    /// a submission is already in flight.
    pub fn begin<S: UiSurface + ?Sized>(
        &mut self,
        selection: &SelectionManager,
        surface: &mut S,
    ) -> Option<UploadRequest> {
        if self.state == SubmissionState::InFlight {
            return None;
        }
        let file = selection.current()?.clone();

        self.state = SubmissionState::InFlight;
        surface.set_loading_visible(true);
        surface.set_result_visible(false);
        surface.set_submit_enabled(false);
        info!(
            file = file.name(),
            size_bytes = file.len(),
            "submission: started"
        );

        Some(UploadRequest {
            file,
            csrf_token: self.csrf_token.clone(),
        })
    }

    /// Applies the transport outcome. Loading is hidden and submit re-enabled
    /// on every path.
    pub fn finish<S, N>(
        &mut self,
        outcome: Result<UploadResponse, TransportError>,
        selection: &SelectionManager,
        renderer: &mut ResultRenderer,
        surface: &mut S,
        notifier: &mut N,
    ) -> SubmissionState
    where
        S: UiSurface + ?Sized,
        N: Notifier + ?Sized,
    {
        if self.state != SubmissionState::InFlight {
            warn!(state = ?self.state, "submission: ignoring completion with nothing in flight");
            return self.state;
        }

        let verdict = outcome.and_then(|response| response.into_verdict().map_err(Into::into));
        match verdict {
            Ok(UploadVerdict::Accepted(result)) => {
                info!(score = result.score, "submission: succeeded");
                self.state = SubmissionState::Succeeded;
                renderer.render(result, surface);
            }
            Ok(UploadVerdict::Rejected(rejection)) => {
                warn!(message = %rejection.message, "submission: rejected by server");
                self.fail(SubmitError::from(rejection), renderer, surface, notifier);
            }
            Err(err) => {
                error!(error = ?err, "submission: transport failure: {err}");
                self.fail(SubmitError::from(err), renderer, surface, notifier);
            }
        }

        surface.set_loading_visible(false);
        surface.set_submit_enabled(self.can_submit(selection));
        self.state
    }

    fn fail<S, N>(
        &mut self,
        err: SubmitError,
        renderer: &ResultRenderer,
        surface: &mut S,
        notifier: &mut N,
    ) where
        S: UiSurface + ?Sized,
        N: Notifier + ?Sized,
    {
        self.state = SubmissionState::Failed;
        notifier.notify(&err.user_message());
        // The previous result was only hidden for the duration of the request.
        if renderer.last().is_some() {
            surface.set_result_visible(true);
        }
    }
}
