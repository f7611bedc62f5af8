//! Client for the separate inference service.
//!
//! The service exposes `GET /` for liveness and `POST /predict/` taking a
//! multipart JPEG upload. [`InferenceBackend`] is the seam the controller
//! talks to; [`HttpBackend`] is the real implementation.

mod api;
mod multipart;
mod wire;

pub use api::HttpBackend;

use crate::session::PredictionResult;

/// Generic message shown for failures that carry no structured detail.
pub const GENERIC_FAILURE_MESSAGE: &str = "Error: Could not get a prediction.";

/// Result of probing the backend root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendHealth {
    /// `GET /` answered 200.
    Healthy,
    /// The backend answered with any other status.
    Degraded { status: u16 },
    /// No HTTP exchange happened.
    Unreachable { reason: String },
}

impl BackendHealth {
    /// Short sidebar text for this state.
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Healthy => "Backend online",
            Self::Degraded { .. } => "Problem connecting",
            Self::Unreachable { .. } => "Backend offline",
        }
    }
}

/// Failures from `POST /predict/`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictError {
    /// HTTP 400 with the service's explanation; the user may retry.
    #[error("{0}")]
    Validation(String),
    /// Any other non-200 status.
    #[error("HTTP {0}")]
    Status(u16),
    /// Connection, timeout or body read failure.
    #[error("HTTP error: {0}")]
    Transport(String),
    /// A 200 whose body could not be decoded.
    #[error("Invalid prediction response: {0}")]
    InvalidResponse(String),
}

/// Operations the UI needs from the inference service.
pub trait InferenceBackend {
    fn check_health(&self) -> BackendHealth;
    /// Submit JPEG bytes for classification.
    fn predict(&self, jpeg: &[u8]) -> Result<PredictionResult, PredictError>;
}
