#![deny(missing_docs)]
#![deny(warnings)]

//! Entry point for the brainscan classifier UI.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use brainscan::backend::{HttpBackend, InferenceBackend};
use brainscan::config::{self, ClientSettings};
use brainscan::egui_app::controller::ClassifierController;
use brainscan::egui_app::ui::{ClassifierApp, MIN_VIEWPORT_SIZE};
use brainscan::feedback::UnwiredFeedbackSink;
use brainscan::logging;
use eframe::egui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_error) = match config::load_or_default() {
        Ok(settings) => (settings, None),
        Err(err) => (ClientSettings::default(), Some(err)),
    };

    let log_session = match logging::init(settings.log_dir.as_deref()) {
        Ok(session) => Some(session),
        Err(err) => {
            eprintln!("Logging disabled: {err}");
            None
        }
    };
    match config_error {
        Some(err) => tracing::warn!("Using default settings: {err}"),
        None => match config::write_defaults_if_missing() {
            Ok(Some(path)) => tracing::info!("Wrote default settings to {}", path.display()),
            Ok(None) => {}
            Err(err) => tracing::warn!("Could not write default settings: {err}"),
        },
    }

    let backend = HttpBackend::new(&settings)?;
    let backend_url = backend.root().to_string();
    let mut controller = ClassifierController::new(
        Box::new(backend) as Box<dyn InferenceBackend>,
        Box::new(UnwiredFeedbackSink),
        backend_url,
    );
    controller.set_log_dir(log_session.and_then(|s| s.dir()).map(|dir| dir.to_path_buf()));
    controller.check_backend_health();

    let viewport = egui::ViewportBuilder::default()
        .with_title("Brain Tumor Classification")
        .with_inner_size(egui::vec2(960.0, 820.0))
        .with_min_inner_size(MIN_VIEWPORT_SIZE)
        .with_drag_and_drop(true);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Brain Tumor Classification",
        native_options,
        Box::new(move |_cc| Ok(Box::new(ClassifierApp::new(controller)))),
    )?;
    Ok(())
}
