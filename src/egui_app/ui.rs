//! egui renderer for the classifier window.
use std::path::PathBuf;

use eframe::egui::{self, Color32, Frame, RichText};

use crate::egui_app::controller::ClassifierController;
use crate::session::{SessionPhase, TumorLabel};

mod prediction_panel;
pub mod style;
mod textures;

use textures::{Slot, TextureCache, show_captioned};

/// Smallest window size that keeps both overlays side by side.
pub const MIN_VIEWPORT_SIZE: egui::Vec2 = egui::vec2(760.0, 560.0);

const INTRO_TEXT: &str = "This project classifies brain tumors from MRI images. \
Please upload a brain MRI image to get started.";

/// User intents collected while drawing, applied after the frame is laid out.
#[derive(Clone, Debug, PartialEq)]
pub(super) enum UiAction {
    PickImage,
    LoadDropped(PathBuf),
    Predict,
    Retry,
    Feedback(bool),
    Correct(TumorLabel),
    Exit,
    RecheckBackend,
    OpenLogs,
}

/// Renders the egui UI using the controller's state.
pub struct ClassifierApp {
    controller: ClassifierController,
    textures: TextureCache,
    visuals_set: bool,
}

impl ClassifierApp {
    pub fn new(controller: ClassifierController) -> Self {
        Self {
            controller,
            textures: TextureCache::default(),
            visuals_set: false,
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        ctx.set_visuals(style::classifier_visuals());
        self.visuals_set = true;
    }

    fn dropped_file(&self, ctx: &egui::Context) -> Option<UiAction> {
        let dropped_files = ctx.input(|i| i.raw.dropped_files.clone());
        dropped_files
            .into_iter()
            .find_map(|file| file.path)
            .map(UiAction::LoadDropped)
    }

    fn render_sidebar(&mut self, ctx: &egui::Context) -> Option<UiAction> {
        let mut action = None;
        egui::SidePanel::left("backend_sidebar")
            .resizable(false)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.label(RichText::new("Backend").strong());
                ui.label(
                    RichText::new(&self.controller.ui.backend.url)
                        .small()
                        .color(style::palette().caption),
                );
                ui.add_space(6.0);
                match &self.controller.ui.backend.health {
                    Some(health) => {
                        ui.label(RichText::new(health.headline()).color(style::health_color(health)));
                    }
                    None => {
                        ui.label("Not checked yet");
                    }
                }
                if ui.button("Check again").clicked() {
                    action = Some(UiAction::RecheckBackend);
                }
                ui.add_space(12.0);
                ui.separator();
                if ui.button("Open log folder").clicked() {
                    action = Some(UiAction::OpenLogs);
                }
            });
        action
    }

    fn render_status(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .frame(Frame::new().fill(Color32::from_rgb(0, 0, 0)))
            .show(ctx, |ui| {
                let status = &self.controller.ui.status;
                ui.horizontal(|ui| {
                    ui.add_space(8.0);
                    ui.painter().circle_filled(
                        ui.cursor().min + egui::vec2(9.0, 11.0),
                        9.0,
                        status.badge_color,
                    );
                    ui.add_space(24.0);
                    ui.label(RichText::new(&status.badge_label).color(Color32::WHITE));
                    ui.separator();
                    ui.label(RichText::new(&status.text).color(Color32::WHITE));
                });
            });
    }

    fn render_main(&mut self, ui: &mut egui::Ui) -> Option<UiAction> {
        let palette = style::palette();
        let mut action = None;
        ui.heading("Brain Tumor Classification");
        ui.add_space(4.0);
        ui.label(RichText::new("Introduction").strong());
        ui.label(INTRO_TEXT);
        ui.add_space(12.0);

        let phase = self.controller.phase();
        ui.horizontal(|ui| {
            ui.label("Upload a Brain MRI Image");
            let can_pick = phase != SessionPhase::ValidationFailed;
            if ui
                .add_enabled(can_pick, egui::Button::new("Choose image…"))
                .clicked()
            {
                action = Some(UiAction::PickImage);
            }
        });

        if let Some(upload) = self.controller.upload() {
            ui.add_space(8.0);
            ui.label("Preview Image");
            let ctx = ui.ctx().clone();
            let texture = self.textures.get_or_upload(
                &ctx,
                Slot::Preview,
                self.controller.ui.preview_revision,
                || upload.preview(),
            );
            show_captioned(ui, &texture, "Uploaded Image");
        }

        ui.add_space(8.0);
        let can_predict = self.controller.upload().is_some() && phase != SessionPhase::ValidationFailed;
        if ui
            .add_enabled(can_predict, egui::Button::new("Predict"))
            .clicked()
        {
            action = Some(UiAction::Predict);
        }

        if let Some(message) = &self.controller.session().validation_error {
            ui.label(RichText::new(message).color(palette.rejection));
            if ui.button("Retry").clicked() {
                action = Some(UiAction::Retry);
            }
        }
        if let Some(notice) = &self.controller.ui.notice {
            ui.label(RichText::new(notice).color(palette.rejection));
        }

        if let Some(panel_action) = prediction_panel::render(
            ui,
            self.controller.session(),
            self.controller.ui.result_revision,
            &mut self.textures,
        ) {
            action = Some(panel_action);
        }

        if self.controller.session().awaiting_upload() {
            ui.add_space(12.0);
            ui.label(RichText::new("Please upload an image to proceed.").color(palette.prompt));
        }
        action
    }

    fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::PickImage => self.controller.pick_image_via_dialog(),
            UiAction::LoadDropped(path) => self.controller.load_image_from_path(&path),
            UiAction::Predict => {
                self.controller.submit_image();
            }
            UiAction::Retry => {
                let _ = self.controller.retry();
            }
            UiAction::Feedback(is_correct) => {
                let _ = self.controller.record_feedback(is_correct);
            }
            UiAction::Correct(label) => {
                let _ = self.controller.record_correction(label);
            }
            UiAction::Exit => self.controller.reset(),
            UiAction::RecheckBackend => {
                self.controller.check_backend_health();
            }
            UiAction::OpenLogs => self.controller.open_log_folder(),
        }
    }
}

impl eframe::App for ClassifierApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_visuals(ctx);
        let mut actions = Vec::new();
        actions.extend(self.dropped_file(ctx));
        actions.extend(self.render_sidebar(ctx));
        self.render_status(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    actions.extend(self.render_main(ui));
                });
        });
        // Each action can change what the next frame shows.
        if !actions.is_empty() {
            for action in actions {
                self.apply_action(action);
            }
            ctx.request_repaint();
        }
    }
}
