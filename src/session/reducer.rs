use thiserror::Error;

use super::state::{Feedback, PredictionResult, SessionPhase, SessionState, TumorLabel};

/// UI events that move the session between phases.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// A new image was chosen and previewed.
    ImageUploaded,
    /// The backend classified the current image.
    PredictionSucceeded(PredictionResult),
    /// The backend rejected the image with HTTP 400.
    PredictionRejected { message: String },
    /// The user asked to pick another image after a rejection.
    Retry,
    FeedbackGiven { is_correct: bool },
    CorrectionChosen(TumorLabel),
    /// Exit: drop everything and return to the upload prompt.
    Reset,
}

/// A transition the current phase does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("No image is loaded")]
    NoImage,
    #[error("Retry before uploading a new image")]
    RetryPending,
    #[error("Nothing to retry")]
    NothingToRetry,
    #[error("No prediction to give feedback on")]
    NoPrediction,
    #[error("Feedback was already recorded")]
    FeedbackAlreadyGiven,
    #[error("A correction is only accepted after negative feedback")]
    CorrectionNotRequested,
    #[error("Correct label already recorded as {0}")]
    CorrectionAlreadyRecorded(TumorLabel),
}

/// Apply `event` to `state`, returning the next state or the rejected transition.
///
/// The input state is never modified; a rejected event leaves the caller's
/// state as it was.
pub fn reduce(state: &SessionState, event: SessionEvent) -> Result<SessionState, TransitionError> {
    let mut next = state.clone();
    match event {
        SessionEvent::ImageUploaded => {
            if state.phase() == SessionPhase::ValidationFailed {
                return Err(TransitionError::RetryPending);
            }
            next.image_available = true;
        }
        SessionEvent::PredictionSucceeded(result) => {
            require_submittable(state)?;
            next.prediction_result = Some(result);
            next.feedback = None;
            next.correct_label = None;
        }
        SessionEvent::PredictionRejected { message } => {
            require_submittable(state)?;
            next.prediction_result = None;
            next.feedback = None;
            next.correct_label = None;
            next.validation_error = Some(message);
        }
        SessionEvent::Retry => {
            if state.validation_error.is_none() {
                return Err(TransitionError::NothingToRetry);
            }
            next.validation_error = None;
            next.image_available = false;
        }
        SessionEvent::FeedbackGiven { is_correct } => {
            if state.prediction_result.is_none() || state.validation_error.is_some() {
                return Err(TransitionError::NoPrediction);
            }
            if state.feedback.is_some() {
                return Err(TransitionError::FeedbackAlreadyGiven);
            }
            next.feedback = Some(Feedback::from_is_correct(is_correct));
        }
        SessionEvent::CorrectionChosen(label) => {
            if state.feedback != Some(Feedback::No) || state.prediction_result.is_none() {
                return Err(TransitionError::CorrectionNotRequested);
            }
            if let Some(existing) = state.correct_label {
                return Err(TransitionError::CorrectionAlreadyRecorded(existing));
            }
            next.correct_label = Some(label);
        }
        SessionEvent::Reset => return Ok(SessionState::default()),
    }
    Ok(next)
}

fn require_submittable(state: &SessionState) -> Result<(), TransitionError> {
    if state.validation_error.is_some() {
        return Err(TransitionError::RetryPending);
    }
    if !state.image_available {
        return Err(TransitionError::NoImage);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn prediction(label: &str) -> PredictionResult {
        PredictionResult {
            label: label.to_string(),
            inference_image: RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])),
            boundaries_image: RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255])),
        }
    }

    fn run(events: impl IntoIterator<Item = SessionEvent>) -> SessionState {
        events
            .into_iter()
            .fold(SessionState::default(), |state, event| {
                reduce(&state, event).unwrap()
            })
    }

    #[test]
    fn walks_happy_path_through_phases() {
        let mut state = SessionState::default();
        assert_eq!(state.phase(), SessionPhase::NoImage);
        state = reduce(&state, SessionEvent::ImageUploaded).unwrap();
        assert_eq!(state.phase(), SessionPhase::ImageLoaded);
        state = reduce(&state, SessionEvent::PredictionSucceeded(prediction("glioma"))).unwrap();
        assert_eq!(state.phase(), SessionPhase::Predicted);
        state = reduce(&state, SessionEvent::FeedbackGiven { is_correct: false }).unwrap();
        assert_eq!(state.phase(), SessionPhase::FeedbackNo);
        state = reduce(&state, SessionEvent::CorrectionChosen(TumorLabel::Pituitary)).unwrap();
        assert_eq!(state.phase(), SessionPhase::FeedbackNoLabeled);
        state = reduce(&state, SessionEvent::Reset).unwrap();
        assert_eq!(state.phase(), SessionPhase::NoImage);
    }

    #[test]
    fn positive_feedback_lands_in_feedback_yes() {
        let state = run([
            SessionEvent::ImageUploaded,
            SessionEvent::PredictionSucceeded(prediction("meningioma")),
            SessionEvent::FeedbackGiven { is_correct: true },
        ]);
        assert_eq!(state.phase(), SessionPhase::FeedbackYes);
        assert_eq!(state.feedback, Some(Feedback::Yes));
        assert_eq!(
            reduce(&state, SessionEvent::CorrectionChosen(TumorLabel::Glioma)),
            Err(TransitionError::CorrectionNotRequested)
        );
    }

    #[test]
    fn correction_is_one_shot() {
        let state = run([
            SessionEvent::ImageUploaded,
            SessionEvent::PredictionSucceeded(prediction("glioma")),
            SessionEvent::FeedbackGiven { is_correct: false },
            SessionEvent::CorrectionChosen(TumorLabel::NoTumor),
        ]);
        for label in TumorLabel::ALL {
            let err = reduce(&state, SessionEvent::CorrectionChosen(label)).unwrap_err();
            assert_eq!(err, TransitionError::CorrectionAlreadyRecorded(TumorLabel::NoTumor));
        }
        assert_eq!(state.correct_label, Some(TumorLabel::NoTumor));
    }

    #[test]
    fn feedback_requires_prediction_and_is_not_repeatable() {
        let loaded = run([SessionEvent::ImageUploaded]);
        assert_eq!(
            reduce(&loaded, SessionEvent::FeedbackGiven { is_correct: true }),
            Err(TransitionError::NoPrediction)
        );
        let answered = run([
            SessionEvent::ImageUploaded,
            SessionEvent::PredictionSucceeded(prediction("glioma")),
            SessionEvent::FeedbackGiven { is_correct: true },
        ]);
        assert_eq!(
            reduce(&answered, SessionEvent::FeedbackGiven { is_correct: false }),
            Err(TransitionError::FeedbackAlreadyGiven)
        );
    }

    #[test]
    fn rejection_never_populates_prediction() {
        let state = run([
            SessionEvent::ImageUploaded,
            SessionEvent::PredictionSucceeded(prediction("glioma")),
            SessionEvent::FeedbackGiven { is_correct: true },
            SessionEvent::ImageUploaded,
            SessionEvent::PredictionRejected {
                message: "Not an MRI image".into(),
            },
        ]);
        assert_eq!(state.phase(), SessionPhase::ValidationFailed);
        assert!(state.prediction_result.is_none());
        assert!(state.feedback.is_none());
        assert_eq!(state.validation_error.as_deref(), Some("Not an MRI image"));
    }

    #[test]
    fn retry_clears_image_and_error() {
        let failed = run([
            SessionEvent::ImageUploaded,
            SessionEvent::PredictionRejected {
                message: "bad".into(),
            },
        ]);
        assert_eq!(
            reduce(&failed, SessionEvent::ImageUploaded),
            Err(TransitionError::RetryPending)
        );
        let retried = reduce(&failed, SessionEvent::Retry).unwrap();
        assert_eq!(retried, SessionState::default());
        assert_eq!(
            reduce(&retried, SessionEvent::Retry),
            Err(TransitionError::NothingToRetry)
        );
    }

    #[test]
    fn submission_requires_image() {
        let state = SessionState::default();
        assert_eq!(
            reduce(&state, SessionEvent::PredictionSucceeded(prediction("glioma"))),
            Err(TransitionError::NoImage)
        );
        assert_eq!(
            reduce(
                &state,
                SessionEvent::PredictionRejected {
                    message: "bad".into()
                }
            ),
            Err(TransitionError::NoImage)
        );
    }

    #[test]
    fn new_prediction_clears_previous_feedback() {
        let state = run([
            SessionEvent::ImageUploaded,
            SessionEvent::PredictionSucceeded(prediction("glioma")),
            SessionEvent::FeedbackGiven { is_correct: false },
            SessionEvent::CorrectionChosen(TumorLabel::Meningioma),
            SessionEvent::ImageUploaded,
            SessionEvent::PredictionSucceeded(prediction("pituitary")),
        ]);
        assert_eq!(state.phase(), SessionPhase::Predicted);
        assert_eq!(state.correct_label, None);
        assert_eq!(
            state.prediction_result.as_ref().map(|p| p.label.as_str()),
            Some("pituitary")
        );
    }

    #[test]
    fn reset_restores_initial_state_from_every_phase() {
        let states = [
            SessionState::default(),
            run([SessionEvent::ImageUploaded]),
            run([
                SessionEvent::ImageUploaded,
                SessionEvent::PredictionRejected {
                    message: "bad".into(),
                },
            ]),
            run([
                SessionEvent::ImageUploaded,
                SessionEvent::PredictionSucceeded(prediction("glioma")),
            ]),
            run([
                SessionEvent::ImageUploaded,
                SessionEvent::PredictionSucceeded(prediction("glioma")),
                SessionEvent::FeedbackGiven { is_correct: false },
            ]),
            run([
                SessionEvent::ImageUploaded,
                SessionEvent::PredictionSucceeded(prediction("glioma")),
                SessionEvent::FeedbackGiven { is_correct: false },
                SessionEvent::CorrectionChosen(TumorLabel::Glioma),
            ]),
        ];
        for state in states {
            assert_eq!(
                reduce(&state, SessionEvent::Reset).unwrap(),
                SessionState::default()
            );
        }
    }

    #[test]
    fn rejected_event_leaves_input_untouched() {
        let state = run([SessionEvent::ImageUploaded]);
        let before = state.clone();
        let _ = reduce(&state, SessionEvent::CorrectionChosen(TumorLabel::Glioma));
        assert_eq!(state, before);
    }
}
