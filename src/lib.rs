//! Desktop client for an MRI brain tumor classification service.
/// Application directory resolution.
pub mod app_dirs;
/// HTTP client for the inference service.
pub mod backend;
/// TOML client settings.
pub mod config;
/// egui front end.
pub mod egui_app;
/// Feedback records and the sink they are handed to.
pub mod feedback;
mod http_client;
/// Per-run file logger.
pub mod logging;
/// Session state machine.
pub mod session;
/// Upload filtering, preview and JPEG re-encoding.
pub mod upload;
