use std::fmt;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Tumor classes a user can pick when correcting a prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TumorLabel {
    Glioma,
    Meningioma,
    NoTumor,
    Pituitary,
}

impl TumorLabel {
    /// Labels in the order they are offered.
    pub const ALL: [TumorLabel; 4] = [
        TumorLabel::Glioma,
        TumorLabel::Meningioma,
        TumorLabel::NoTumor,
        TumorLabel::Pituitary,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Glioma => "Glioma",
            Self::Meningioma => "Meningioma",
            Self::NoTumor => "No Tumor",
            Self::Pituitary => "Pituitary",
        }
    }
}

impl fmt::Display for TumorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The user's verdict on a prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    Yes,
    No,
}

impl Feedback {
    pub fn from_is_correct(is_correct: bool) -> Self {
        if is_correct { Self::Yes } else { Self::No }
    }
}

/// A decoded classification returned by the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionResult {
    pub label: String,
    /// Explanation overlay.
    pub inference_image: RgbaImage,
    /// Tumor outline overlay.
    pub boundaries_image: RgbaImage,
}

/// Everything the UI knows about the current interaction cycle.
///
/// Only [`super::reduce`] produces new values; the default is the state at
/// session start and after an exit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    pub image_available: bool,
    pub prediction_result: Option<PredictionResult>,
    pub feedback: Option<Feedback>,
    pub correct_label: Option<TumorLabel>,
    /// Message from a rejected (HTTP 400) submission awaiting retry.
    pub validation_error: Option<String>,
}

/// Named position in the session state machine, derived from [`SessionState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    NoImage,
    ImageLoaded,
    ValidationFailed,
    Predicted,
    FeedbackYes,
    FeedbackNo,
    FeedbackNoLabeled,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        if self.validation_error.is_some() {
            return SessionPhase::ValidationFailed;
        }
        if self.prediction_result.is_some() {
            return match (self.feedback, self.correct_label) {
                (None, _) => SessionPhase::Predicted,
                (Some(Feedback::Yes), _) => SessionPhase::FeedbackYes,
                (Some(Feedback::No), None) => SessionPhase::FeedbackNo,
                (Some(Feedback::No), Some(_)) => SessionPhase::FeedbackNoLabeled,
            };
        }
        if self.image_available {
            SessionPhase::ImageLoaded
        } else {
            SessionPhase::NoImage
        }
    }

    /// True while the upload prompt should be shown.
    pub fn awaiting_upload(&self) -> bool {
        !self.image_available
    }
}
