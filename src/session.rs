//! Session state machine for one classify-and-review cycle.
//!
//! [`SessionState`] is plain data. Every UI event goes through [`reduce`],
//! which either returns the next state or rejects the transition, so the
//! guards live here rather than in disabled buttons.

mod reducer;
mod state;

pub use reducer::{SessionEvent, TransitionError, reduce};
pub use state::{Feedback, PredictionResult, SessionPhase, SessionState, TumorLabel};
