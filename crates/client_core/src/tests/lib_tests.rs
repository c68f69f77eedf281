use super::*;
use crate::error::{GENERIC_FAILURE_MESSAGE, INVALID_FILE_MESSAGE};
use async_trait::async_trait;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

#[derive(Debug, Clone, PartialEq)]
enum SurfaceOp {
    Label(String),
    SubmitEnabled(bool),
    Loading(bool),
    ResultVisible(bool),
    DropTarget(bool),
    Score(ScoreView),
    ClearFeatures,
    Feature(FeatureRow),
    Animate(Duration),
}

#[derive(Debug, Default)]
struct RecordingSurface {
    ops: Vec<SurfaceOp>,
    label: Option<String>,
    submit_enabled: bool,
    loading: bool,
    result_visible: bool,
    drop_target: bool,
    score: Option<ScoreView>,
    features: Vec<FeatureRow>,
}

impl UiSurface for RecordingSurface {
    fn set_selected_file_label(&mut self, name: &str) {
        self.ops.push(SurfaceOp::Label(name.to_string()));
        self.label = Some(name.to_string());
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.ops.push(SurfaceOp::SubmitEnabled(enabled));
        self.submit_enabled = enabled;
    }

    fn set_loading_visible(&mut self, visible: bool) {
        self.ops.push(SurfaceOp::Loading(visible));
        self.loading = visible;
    }

    fn set_result_visible(&mut self, visible: bool) {
        self.ops.push(SurfaceOp::ResultVisible(visible));
        self.result_visible = visible;
    }

    fn set_drop_target_active(&mut self, active: bool) {
        self.ops.push(SurfaceOp::DropTarget(active));
        self.drop_target = active;
    }

    fn show_score(&mut self, view: &ScoreView) {
        self.ops.push(SurfaceOp::Score(view.clone()));
        self.score = Some(view.clone());
    }

    fn clear_features(&mut self) {
        self.ops.push(SurfaceOp::ClearFeatures);
        self.features.clear();
    }

    fn append_feature(&mut self, row: &FeatureRow) {
        self.ops.push(SurfaceOp::Feature(row.clone()));
        self.features.push(row.clone());
    }

    fn schedule_bar_animation(&mut self, delay: Duration) {
        self.ops.push(SurfaceOp::Animate(delay));
    }
}

#[derive(Debug, Default)]
struct RecordingNotifier {
    messages: Vec<String>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

enum Reply {
    Body(&'static str),
    Unreadable,
}

struct StubTransport {
    reply: Reply,
    calls: AtomicUsize,
    requests: Mutex<Vec<UploadRequest>>,
}

impl StubTransport {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreTransport for StubTransport {
    async fn submit(&self, request: UploadRequest) -> Result<UploadResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().expect("requests").push(request);
        let body = match self.reply {
            Reply::Body(body) => body,
            Reply::Unreadable => "<html>Internal Server Error</html>",
        };
        serde_json::from_str(body).map_err(|source| TransportError::Malformed {
            status: 500,
            source,
        })
    }
}

const SUCCESS_BODY: &str =
    r#"{"success": true, "score": 0.75, "features": {"pitch_variance": 0.4}}"#;

fn session() -> AnalyzerSession<RecordingSurface, RecordingNotifier> {
    AnalyzerSession::new(
        "csrf-123",
        RecordingSurface::default(),
        RecordingNotifier::default(),
    )
}

fn wav(name: &str) -> FileCandidate {
    FileCandidate::new(name, "audio/wav", b"RIFF".to_vec())
}

fn selected_session() -> AnalyzerSession<RecordingSurface, RecordingNotifier> {
    let mut session = session();
    session
        .select_file(wav("voice.wav"), SelectionSource::Picker)
        .expect("select");
    session
}

#[test]
fn new_session_starts_with_submit_disabled() {
    let session = session();
    assert_eq!(session.state(), SubmissionState::Idle);
    assert!(!session.surface().submit_enabled);
    assert!(!session.surface().loading);
    assert!(!session.surface().result_visible);
    assert!(!session.can_submit());
}

#[test]
fn non_audio_files_are_rejected_and_selection_is_kept() {
    let mut session = selected_session();
    for media_type in ["video/mp4", "image/png", "text/plain", "", "application/octet-stream"] {
        let err = session
            .select_file(
                FileCandidate::new("other.bin", media_type, b"x".to_vec()),
                SelectionSource::Picker,
            )
            .expect_err("must reject");
        assert_eq!(err.media_type, media_type);
        assert_eq!(
            session.selected_file().map(FileCandidate::name),
            Some("voice.wav")
        );
    }
    assert_eq!(session.notifier().messages.len(), 5);
    assert!(session
        .notifier()
        .messages
        .iter()
        .all(|message| message == INVALID_FILE_MESSAGE));
    assert_eq!(session.surface().label.as_deref(), Some("voice.wav"));
    assert!(session.surface().submit_enabled);
}

#[test]
fn rejected_first_selection_leaves_submit_disabled() {
    let mut session = session();
    session
        .select_file(
            FileCandidate::new("photo.png", "image/png", b"x".to_vec()),
            SelectionSource::Drop,
        )
        .expect_err("must reject");
    assert!(session.selected_file().is_none());
    assert!(!session.surface().submit_enabled);
    assert!(session.surface().label.is_none());
}

#[test]
fn audio_selection_updates_label_and_enables_submit() {
    let mut session = session();
    session
        .select_file(wav("first.wav"), SelectionSource::Picker)
        .expect("select");
    assert!(session.surface().submit_enabled);
    assert_eq!(session.surface().label.as_deref(), Some("first.wav"));

    session
        .select_file(
            FileCandidate::new("second.mp3", "audio/mpeg", b"ID3".to_vec()),
            SelectionSource::Picker,
        )
        .expect("select");
    let current = session.selected_file().expect("selected");
    assert_eq!(current.name(), "second.mp3");
    assert_eq!(current.bytes(), b"ID3");
    assert!(session.notifier().messages.is_empty());
}

#[test]
fn dropped_files_use_the_same_validation_and_clear_the_highlight() {
    let mut session = session();
    session.drag_over();
    assert!(session.surface().drop_target);

    session
        .select_file(
            FileCandidate::new("notes.txt", "text/plain", b"x".to_vec()),
            SelectionSource::Drop,
        )
        .expect_err("must reject");
    assert!(!session.surface().drop_target);
    assert_eq!(session.notifier().messages, vec![INVALID_FILE_MESSAGE]);

    session.drag_over();
    session
        .select_file(wav("dropped.wav"), SelectionSource::Drop)
        .expect("select");
    assert!(!session.surface().drop_target);
    assert_eq!(session.surface().label.as_deref(), Some("dropped.wav"));
    assert!(session.surface().submit_enabled);
}

#[test]
fn drag_highlight_has_no_selection_effect() {
    let mut session = session();
    session.drag_over();
    session.drag_over();
    session.drag_leave();

    let drop_ops: Vec<&SurfaceOp> = session
        .surface()
        .ops
        .iter()
        .filter(|op| matches!(op, SurfaceOp::DropTarget(_)))
        .collect();
    assert_eq!(
        drop_ops,
        vec![&SurfaceOp::DropTarget(true), &SurfaceOp::DropTarget(false)]
    );
    assert!(session.selected_file().is_none());
    assert!(session.notifier().messages.is_empty());
    assert!(!session.surface().submit_enabled);
}

#[tokio::test]
async fn submit_without_selection_is_a_noop() {
    let mut session = session();
    let transport = StubTransport::new(Reply::Body(SUCCESS_BODY));
    let ops_before = session.surface().ops.len();

    let state = session.submit(&transport).await;

    assert_eq!(state, SubmissionState::Idle);
    assert_eq!(transport.calls(), 0);
    assert_eq!(session.surface().ops.len(), ops_before);
}

#[tokio::test]
async fn submit_while_in_flight_is_a_noop() {
    let mut session = selected_session();
    let transport = StubTransport::new(Reply::Body(SUCCESS_BODY));

    let pending = session.begin_submit().expect("first submit starts");
    assert_eq!(session.state(), SubmissionState::InFlight);
    assert!(session.surface().loading);
    assert!(!session.surface().submit_enabled);
    let ops_before = session.surface().ops.len();

    assert!(session.begin_submit().is_none());
    let state = session.submit(&transport).await;

    assert_eq!(state, SubmissionState::InFlight);
    assert_eq!(transport.calls(), 0);
    assert_eq!(session.surface().ops.len(), ops_before);

    let outcome = transport.submit(pending).await;
    assert_eq!(session.finish_submit(outcome), SubmissionState::Succeeded);
    assert_eq!(transport.calls(), 1);
}

#[test]
fn selecting_during_in_flight_keeps_submit_disabled() {
    let mut session = selected_session();
    session.begin_submit().expect("submit starts");

    session
        .select_file(wav("b.wav"), SelectionSource::Picker)
        .expect("select");

    assert_eq!(session.surface().label.as_deref(), Some("b.wav"));
    assert!(!session.surface().submit_enabled);
    assert!(!session.can_submit());
    assert!(session.begin_submit().is_none());
    assert_eq!(session.state(), SubmissionState::InFlight);

    let response: UploadResponse = serde_json::from_str(SUCCESS_BODY).expect("body");
    let state = session.finish_submit(Ok(response));
    assert_eq!(state, SubmissionState::Succeeded);
    assert!(session.surface().submit_enabled);
    let next = session.begin_submit().expect("next submit starts");
    assert_eq!(next.file.name(), "b.wav");
}

#[tokio::test]
async fn successful_submission_renders_score_and_features() {
    let mut session = selected_session();
    let transport = StubTransport::new(Reply::Body(SUCCESS_BODY));

    let state = session.submit(&transport).await;

    assert_eq!(state, SubmissionState::Succeeded);
    let surface = session.surface();
    let score = surface.score.as_ref().expect("score");
    assert_eq!(score.score_text, "0.75");
    assert_eq!(score.fill_width(), "75%");
    assert_eq!(score.tier_label(), "High Stress");
    assert_eq!(surface.features.len(), 1);
    assert_eq!(surface.features[0].label, "Pitch Variance");
    assert_eq!(surface.features[0].percent_text, "40.0%");
    assert!(surface.result_visible);
    assert!(!surface.loading);
    assert!(surface.submit_enabled);

    let requests = transport.requests.lock().expect("requests");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].csrf_token, "csrf-123");
    assert_eq!(requests[0].file.name(), "voice.wav");
    assert_eq!(session.last_result().map(|result| result.score), Some(0.75));
}

#[tokio::test]
async fn result_is_shown_only_after_rows_are_populated() {
    let mut session = selected_session();
    let transport = StubTransport::new(Reply::Body(
        r#"{"success": true, "score": 0.1, "features": {"tempo": 0.2, "dissonance": 0.3}}"#,
    ));
    session.submit(&transport).await;

    let ops = &session.surface().ops;
    let shown_at = ops
        .iter()
        .rposition(|op| *op == SurfaceOp::ResultVisible(true))
        .expect("shown");
    let last_row_at = ops
        .iter()
        .rposition(|op| matches!(op, SurfaceOp::Feature(_)))
        .expect("rows");
    let animated_at = ops
        .iter()
        .rposition(|op| matches!(op, SurfaceOp::Animate(_)))
        .expect("animation");
    assert!(shown_at > last_row_at);
    assert!(animated_at > shown_at);
    assert_eq!(ops[animated_at], SurfaceOp::Animate(BAR_ANIMATION_DELAY));

    let labels: Vec<&str> = session
        .surface()
        .features
        .iter()
        .map(|row| row.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Tempo", "Dissonance"]);
}

#[tokio::test]
async fn server_rejection_keeps_previous_result() {
    let mut session = selected_session();
    session
        .submit(&StubTransport::new(Reply::Body(SUCCESS_BODY)))
        .await;
    let before = session.last_result().cloned();
    let features_before = session.surface().features.clone();

    let state = session
        .submit(&StubTransport::new(Reply::Body(
            r#"{"success": false, "error": "bad file"}"#,
        )))
        .await;

    assert_eq!(state, SubmissionState::Failed);
    assert_eq!(session.last_result().cloned(), before);
    assert_eq!(session.surface().features, features_before);
    assert_eq!(
        session.surface().score.as_ref().map(|s| s.score_text.as_str()),
        Some("0.75")
    );
    assert!(session.surface().result_visible);
    assert_eq!(session.notifier().messages.len(), 1);
    assert!(session.notifier().messages[0].contains("bad file"));
}

#[tokio::test]
async fn server_rejection_without_prior_result_renders_nothing() {
    let mut session = selected_session();
    let state = session
        .submit(&StubTransport::new(Reply::Body(
            r#"{"success": false, "errors": {"file": ["Unsupported format."]}}"#,
        )))
        .await;

    assert_eq!(state, SubmissionState::Failed);
    assert!(session.last_result().is_none());
    assert!(session.surface().score.is_none());
    assert!(!session.surface().result_visible);
    assert_eq!(
        session.notifier().messages,
        vec!["Error: file: Unsupported format."]
    );
}

#[tokio::test]
async fn transport_failure_reports_generic_message() {
    let mut session = selected_session();
    let state = session
        .submit(&StubTransport::new(Reply::Unreadable))
        .await;

    assert_eq!(state, SubmissionState::Failed);
    assert_eq!(session.notifier().messages, vec![GENERIC_FAILURE_MESSAGE]);
    assert!(session.last_result().is_none());
}

#[tokio::test]
async fn success_body_without_features_is_a_failure() {
    let mut session = selected_session();
    let state = session
        .submit(&StubTransport::new(Reply::Body(r#"{"success": true, "score": 0.5}"#)))
        .await;

    assert_eq!(state, SubmissionState::Failed);
    assert_eq!(session.notifier().messages, vec![GENERIC_FAILURE_MESSAGE]);
    assert!(session.surface().score.is_none());
}

#[tokio::test]
async fn cleanup_runs_after_every_outcome() {
    let replies = [
        Reply::Body(SUCCESS_BODY),
        Reply::Body(r#"{"success": false, "error": "bad file"}"#),
        Reply::Unreadable,
    ];
    for reply in replies {
        let mut session = selected_session();
        session.submit(&StubTransport::new(reply)).await;
        assert!(!session.surface().loading);
        assert!(session.surface().submit_enabled);
        assert!(session.can_submit());
        assert_ne!(session.state(), SubmissionState::InFlight);
    }
}

#[tokio::test]
async fn failed_submission_can_be_retried() {
    let mut session = selected_session();
    session
        .submit(&StubTransport::new(Reply::Unreadable))
        .await;
    assert_eq!(session.state(), SubmissionState::Failed);

    let transport = StubTransport::new(Reply::Body(SUCCESS_BODY));
    assert_eq!(session.submit(&transport).await, SubmissionState::Succeeded);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn rendering_identical_results_twice_is_idempotent() {
    let mut session = selected_session();
    let transport = StubTransport::new(Reply::Body(
        r#"{"success": true, "score": 0.42, "features": {"tempo": 0.2, "zero_crossing": 0.35}}"#,
    ));

    session.submit(&transport).await;
    let first_score = session.surface().score.clone();
    let first_rows = session.surface().features.clone();

    session.submit(&transport).await;
    assert_eq!(session.surface().score, first_score);
    assert_eq!(session.surface().features, first_rows);
    assert_eq!(session.surface().features.len(), 2);
    assert_eq!(
        first_score.map(|score| score.tier),
        Some(shared::domain::StressTier::Moderate)
    );
}

#[test]
fn completion_without_submission_is_ignored() {
    let mut session = selected_session();
    let ops_before = session.surface().ops.len();

    let state = session.finish_submit(Ok(UploadResponse::rejected("late")));

    assert_eq!(state, SubmissionState::Idle);
    assert_eq!(session.surface().ops.len(), ops_before);
    assert!(session.notifier().messages.is_empty());
}
