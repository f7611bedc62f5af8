use eframe::egui::{Color32, Visuals};

use crate::backend::BackendHealth;

/// Colours with a fixed meaning in the classifier window.
#[derive(Clone, Copy)]
pub struct Palette {
    pub health_online: Color32,
    pub health_degraded: Color32,
    pub health_offline: Color32,
    /// Backend rejections and generic failures.
    pub rejection: Color32,
    /// Acknowledgement once feedback is recorded.
    pub acknowledged: Color32,
    /// Upload prompt shown while nothing is loaded.
    pub prompt: Color32,
    /// Image captions and secondary sidebar text.
    pub caption: Color32,
}

pub fn palette() -> Palette {
    Palette {
        health_online: Color32::from_rgb(88, 190, 120),
        health_degraded: Color32::from_rgb(230, 170, 60),
        health_offline: Color32::from_rgb(225, 80, 70),
        rejection: Color32::from_rgb(235, 95, 85),
        acknowledged: Color32::from_rgb(110, 200, 150),
        prompt: Color32::from_rgb(120, 180, 235),
        caption: Color32::from_gray(150),
    }
}

/// Stock dark theme with the warning and error text recoloured to match.
pub fn classifier_visuals() -> Visuals {
    let palette = palette();
    let mut visuals = Visuals::dark();
    visuals.error_fg_color = palette.rejection;
    visuals.warn_fg_color = palette.health_degraded;
    visuals.hyperlink_color = palette.prompt;
    visuals
}

/// Text color for a backend health headline.
pub fn health_color(health: &BackendHealth) -> Color32 {
    let palette = palette();
    match health {
        BackendHealth::Healthy => palette.health_online,
        BackendHealth::Degraded { .. } => palette.health_degraded,
        BackendHealth::Unreachable { .. } => palette.health_offline,
    }
}
