//! egui front end: controller, view state and renderer.

/// Applies UI events to the session and performs their side effects.
pub mod controller;
/// View state shared between the controller and renderer.
pub mod state;
/// egui rendering of the classifier window.
pub mod ui;
