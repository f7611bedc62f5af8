//! Bridges the session reducer, backend client and feedback sink to the UI.
//!
//! Every public operation turns one user action into session events, applies
//! them through [`crate::session::reduce`], and records anything the user
//! should see in [`UiState`]. Failures never escape: they end up as a status
//! message or notice and a log line.

use std::path::{Path, PathBuf};

use rfd::FileDialog;
use uuid::Uuid;

use crate::backend::{BackendHealth, GENERIC_FAILURE_MESSAGE, InferenceBackend, PredictError};
use crate::egui_app::state::{StatusTone, UiState, health_tone, status_badge};
use crate::feedback::{FeedbackRecord, FeedbackSink};
use crate::session::{
    Feedback, SessionEvent, SessionPhase, SessionState, TransitionError, TumorLabel, reduce,
};
use crate::upload::{self, UploadedImage};

/// What happened to a prediction request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A prediction is now shown.
    Predicted,
    /// The backend rejected the image; a retry is offered.
    Rejected(String),
    /// Transport or server failure; only a generic message is shown.
    Failed(PredictError),
    /// The upload could not be re-encoded as JPEG; nothing was sent.
    EncodeFailed(String),
    /// Nothing to submit in the current phase.
    NotReady(TransitionError),
}

/// Maintains session state and performs the side effects behind UI events.
pub struct ClassifierController {
    pub ui: UiState,
    session: SessionState,
    session_id: Uuid,
    upload: Option<UploadedImage>,
    backend: Box<dyn InferenceBackend>,
    feedback_sink: Box<dyn FeedbackSink>,
    log_dir: Option<PathBuf>,
}

impl ClassifierController {
    pub fn new(
        backend: Box<dyn InferenceBackend>,
        feedback_sink: Box<dyn FeedbackSink>,
        backend_url: impl Into<String>,
    ) -> Self {
        let mut ui = UiState::default();
        ui.backend.url = backend_url.into();
        Self {
            ui,
            session: SessionState::default(),
            session_id: Uuid::new_v4(),
            upload: None,
            backend,
            feedback_sink,
            log_dir: None,
        }
    }

    /// Remember where run logs go so the sidebar can reveal them.
    pub fn set_log_dir(&mut self, dir: Option<PathBuf>) {
        self.log_dir = dir;
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn upload(&self) -> Option<&UploadedImage> {
        self.upload.as_ref()
    }

    /// Probe the backend root and update the sidebar indicator.
    pub fn check_backend_health(&mut self) -> BackendHealth {
        let health = self.backend.check_health();
        let text = match &health {
            BackendHealth::Healthy => health.headline().to_string(),
            BackendHealth::Degraded { status } => {
                format!("{} (HTTP {status})", health.headline())
            }
            BackendHealth::Unreachable { reason } => format!("{}: {reason}", health.headline()),
        };
        self.set_status(text, health_tone(&health));
        self.ui.backend.health = Some(health.clone());
        health
    }

    /// Ask the user for a JPEG file and load it.
    pub fn pick_image_via_dialog(&mut self) {
        let Some(path) = FileDialog::new()
            .add_filter("Brain MRI image", &upload::SUPPORTED_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        self.load_image_from_path(&path);
    }

    /// Accept an image file chosen through the picker or dropped on the window.
    pub fn load_image_from_path(&mut self, path: &Path) {
        match upload::load_upload(path) {
            Ok(image) => self.accept_upload(image),
            Err(err) => {
                tracing::warn!("Rejected upload {}: {err}", path.display());
                self.set_status(err.to_string(), StatusTone::Warning);
            }
        }
    }

    /// Accept an in-memory image named `name`.
    pub fn load_image_bytes(&mut self, name: &str, bytes: &[u8]) {
        match upload::decode_upload(name, bytes) {
            Ok(image) => self.accept_upload(image),
            Err(err) => {
                tracing::warn!("Rejected upload {name}: {err}");
                self.set_status(err.to_string(), StatusTone::Warning);
            }
        }
    }

    fn accept_upload(&mut self, image: UploadedImage) {
        if self.dispatch(SessionEvent::ImageUploaded).is_err() {
            return;
        }
        let (width, height) = image.dimensions();
        tracing::info!("Loaded {} ({width}x{height})", image.name());
        self.set_status(format!("Loaded {}", image.name()), StatusTone::Info);
        self.upload = Some(image);
        self.ui.notice = None;
        self.ui.preview_revision += 1;
    }

    /// Send the loaded image to the backend and apply the response.
    pub fn submit_image(&mut self) -> SubmitOutcome {
        let Some(upload) = self.upload.as_ref() else {
            return SubmitOutcome::NotReady(TransitionError::NoImage);
        };
        if self.session.validation_error.is_some() {
            return SubmitOutcome::NotReady(TransitionError::RetryPending);
        }
        let jpeg = match upload.to_jpeg() {
            Ok(jpeg) => jpeg,
            Err(err) => {
                tracing::error!("{err}");
                self.ui.notice = Some(err.to_string());
                self.set_status(GENERIC_FAILURE_MESSAGE, StatusTone::Error);
                return SubmitOutcome::EncodeFailed(err.to_string());
            }
        };
        self.ui.notice = None;
        match self.backend.predict(&jpeg) {
            Ok(result) => {
                let label = result.label.clone();
                self.close_replaced_review();
                if let Err(err) = self.dispatch(SessionEvent::PredictionSucceeded(result)) {
                    return SubmitOutcome::NotReady(err);
                }
                self.ui.result_revision += 1;
                self.set_status(format!("Prediction: {label}"), StatusTone::Info);
                SubmitOutcome::Predicted
            }
            Err(PredictError::Validation(message)) => {
                self.close_replaced_review();
                if let Err(err) = self.dispatch(SessionEvent::PredictionRejected {
                    message: message.clone(),
                }) {
                    return SubmitOutcome::NotReady(err);
                }
                self.set_status("Image rejected by the backend", StatusTone::Warning);
                SubmitOutcome::Rejected(message)
            }
            Err(err) => self.fail_submission(err),
        }
    }

    fn fail_submission(&mut self, err: PredictError) -> SubmitOutcome {
        self.ui.notice = Some(GENERIC_FAILURE_MESSAGE.to_string());
        self.set_status(GENERIC_FAILURE_MESSAGE, StatusTone::Error);
        SubmitOutcome::Failed(err)
    }

    /// Drop the rejected image and prompt for another upload.
    pub fn retry(&mut self) -> Result<(), TransitionError> {
        self.dispatch(SessionEvent::Retry)?;
        self.upload = None;
        self.ui.preview_revision += 1;
        self.set_status("Please upload an image to proceed.", StatusTone::Idle);
        Ok(())
    }

    /// Record whether the user agrees with the prediction.
    pub fn record_feedback(&mut self, is_correct: bool) -> Result<(), TransitionError> {
        self.dispatch(SessionEvent::FeedbackGiven { is_correct })?;
        if is_correct {
            self.set_status("Thank you for your feedback!", StatusTone::Info);
            self.forward_feedback();
        } else {
            self.set_status("Choose the correct label", StatusTone::Info);
        }
        Ok(())
    }

    /// Record the label the user says is correct; accepted once per review.
    pub fn record_correction(&mut self, label: TumorLabel) -> Result<(), TransitionError> {
        self.dispatch(SessionEvent::CorrectionChosen(label))?;
        self.set_status(format!("Feedback recorded: {label}"), StatusTone::Info);
        self.forward_feedback();
        Ok(())
    }

    /// Exit the current cycle and return to the upload prompt.
    pub fn reset(&mut self) {
        self.forward_unlabeled_rejection();
        if self.dispatch(SessionEvent::Reset).is_err() {
            return;
        }
        self.session_id = Uuid::new_v4();
        self.upload = None;
        self.ui.notice = None;
        self.ui.preview_revision += 1;
        self.ui.result_revision += 1;
        self.set_status("Please upload an image to proceed.", StatusTone::Idle);
    }

    /// Reveal the run log directory in the OS file browser.
    pub fn open_log_folder(&mut self) {
        let Some(dir) = self.log_dir.clone() else {
            self.set_status("Logging is disabled for this run", StatusTone::Warning);
            return;
        };
        if let Err(err) = open::that(&dir) {
            tracing::warn!("Failed to open {}: {err}", dir.display());
            self.set_status(format!("Failed to open log folder: {err}"), StatusTone::Error);
        }
    }

    fn dispatch(&mut self, event: SessionEvent) -> Result<(), TransitionError> {
        match reduce(&self.session, event) {
            Ok(next) => {
                self.session = next;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Ignored UI event: {err}");
                self.set_status(err.to_string(), StatusTone::Warning);
                Err(err)
            }
        }
    }

    /// Hand over a pending review before a new submission discards it.
    fn close_replaced_review(&mut self) {
        if self.session.prediction_result.is_none() {
            return;
        }
        self.forward_unlabeled_rejection();
        self.session_id = Uuid::new_v4();
    }

    /// A "no" without a corrected label is only complete once the review ends.
    fn forward_unlabeled_rejection(&mut self) {
        if self.session.feedback == Some(Feedback::No) && self.session.correct_label.is_none() {
            self.forward_feedback();
        }
    }

    fn forward_feedback(&mut self) {
        let Some(record) = FeedbackRecord::from_session(self.session_id, &self.session) else {
            return;
        };
        if let Err(err) = self.feedback_sink.submit(&record) {
            tracing::error!("{err}");
        }
    }

    fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        let (label, color) = status_badge(tone);
        self.ui.status.text = text.into();
        self.ui.status.badge_label = label;
        self.ui.status.badge_color = color;
    }
}
