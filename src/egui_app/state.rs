//! View state consumed by the egui renderer.

use egui::Color32;

use crate::backend::BackendHealth;

/// Top-level UI model read by the renderer each frame.
#[derive(Clone, Debug)]
pub struct UiState {
    pub status: StatusBarState,
    pub backend: BackendPanelState,
    /// Message for failures that have no retry path.
    pub notice: Option<String>,
    /// Bumped whenever the preview image changes so textures re-upload.
    pub preview_revision: u64,
    /// Bumped whenever a new prediction arrives.
    pub result_revision: u64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            status: StatusBarState::idle(),
            backend: BackendPanelState::default(),
            notice: None,
            preview_revision: 0,
            result_revision: 0,
        }
    }
}

/// Status badge + text shown in the footer.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBarState {
    pub text: String,
    pub badge_label: String,
    pub badge_color: Color32,
}

impl StatusBarState {
    pub fn idle() -> Self {
        let (badge_label, badge_color) = status_badge(StatusTone::Idle);
        Self {
            text: "Upload a brain MRI image to get started".into(),
            badge_label,
            badge_color,
        }
    }
}

/// Sidebar summary of the last backend probe.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackendPanelState {
    pub url: String,
    pub health: Option<BackendHealth>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Idle,
    Info,
    Warning,
    Error,
}

pub(crate) fn status_badge(tone: StatusTone) -> (String, Color32) {
    match tone {
        StatusTone::Idle => ("Idle".into(), Color32::from_rgb(42, 42, 42)),
        StatusTone::Info => ("Info".into(), Color32::from_rgb(64, 140, 112)),
        StatusTone::Warning => ("Warning".into(), Color32::from_rgb(192, 138, 43)),
        StatusTone::Error => ("Error".into(), Color32::from_rgb(192, 57, 43)),
    }
}

/// Badge tone for a backend probe result.
pub(crate) fn health_tone(health: &BackendHealth) -> StatusTone {
    match health {
        BackendHealth::Healthy => StatusTone::Info,
        BackendHealth::Degraded { .. } => StatusTone::Warning,
        BackendHealth::Unreachable { .. } => StatusTone::Error,
    }
}
