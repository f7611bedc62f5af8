use eframe::egui::{self, RichText};

use super::UiAction;
use super::style;
use super::textures::{Slot, TextureCache, show_captioned};
use crate::session::{SessionPhase, SessionState, TumorLabel};

/// Render the prediction, its overlays and the feedback controls.
pub(super) fn render(
    ui: &mut egui::Ui,
    state: &SessionState,
    revision: u64,
    textures: &mut TextureCache,
) -> Option<UiAction> {
    let prediction = state.prediction_result.as_ref()?;
    let palette = style::palette();
    let mut action = None;

    ui.add_space(12.0);
    ui.label(RichText::new(format!("Prediction: {}", prediction.label)).strong());
    let ctx = ui.ctx().clone();
    let inference = textures.get_or_upload(&ctx, Slot::Inference, revision, || {
        prediction.inference_image.clone()
    });
    let boundaries = textures.get_or_upload(&ctx, Slot::Boundaries, revision, || {
        prediction.boundaries_image.clone()
    });
    ui.columns(2, |cols| {
        show_captioned(&mut cols[0], &inference, "Explanation");
        show_captioned(&mut cols[1], &boundaries, "Marked Boundaries");
    });
    ui.add_space(12.0);

    match state.phase() {
        SessionPhase::Predicted => {
            ui.heading("Are you happy with the results?");
            ui.horizontal(|ui| {
                if ui.button("Yes").clicked() {
                    action = Some(UiAction::Feedback(true));
                }
                if ui.button("No").clicked() {
                    action = Some(UiAction::Feedback(false));
                }
            });
        }
        SessionPhase::FeedbackYes => {
            ui.label(RichText::new("Thank you for your feedback!").color(palette.acknowledged));
            if ui.button("Exit").clicked() {
                action = Some(UiAction::Exit);
            }
        }
        SessionPhase::FeedbackNo | SessionPhase::FeedbackNoLabeled => {
            ui.heading("What should the correct label be?");
            let locked = state.correct_label.is_some();
            ui.horizontal(|ui| {
                for label in TumorLabel::ALL {
                    let button = egui::Button::new(label.display_name())
                        .selected(state.correct_label == Some(label));
                    if ui.add_enabled(!locked, button).clicked() {
                        action = Some(UiAction::Correct(label));
                    }
                }
            });
            if ui.button("Exit").clicked() {
                action = Some(UiAction::Exit);
            }
        }
        SessionPhase::NoImage | SessionPhase::ImageLoaded | SessionPhase::ValidationFailed => {}
    }

    if let Some(label) = state.correct_label {
        ui.label(RichText::new(format!("Feedback recorded: {label}")).color(palette.acknowledged));
    }
    action
}
