//! Destination for user feedback on predictions.
//!
//! No storage backend exists yet. [`UnwiredFeedbackSink`] is the explicit
//! placeholder: it logs each record and keeps nothing.

use serde::Serialize;
use uuid::Uuid;

use crate::session::{Feedback, SessionState, TumorLabel};

/// A completed review of one prediction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FeedbackRecord {
    pub session_id: Uuid,
    pub predicted_label: String,
    pub verdict: Feedback,
    pub corrected_label: Option<TumorLabel>,
}

impl FeedbackRecord {
    /// Build a record from the session, if it holds a prediction with feedback.
    pub fn from_session(session_id: Uuid, state: &SessionState) -> Option<Self> {
        let prediction = state.prediction_result.as_ref()?;
        let verdict = state.feedback?;
        Some(Self {
            session_id,
            predicted_label: prediction.label.clone(),
            verdict,
            corrected_label: state.correct_label,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedbackSinkError {
    #[error("Failed to serialize feedback: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Receives feedback once the user has finished reviewing a prediction.
pub trait FeedbackSink {
    fn submit(&self, record: &FeedbackRecord) -> Result<(), FeedbackSinkError>;
}

/// Sink with no storage behind it; records only reach the run log.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnwiredFeedbackSink;

impl FeedbackSink for UnwiredFeedbackSink {
    fn submit(&self, record: &FeedbackRecord) -> Result<(), FeedbackSinkError> {
        let json = serde_json::to_string(record)?;
        tracing::info!("Feedback not persisted (no sink configured): {json}");
        Ok(())
    }
}
