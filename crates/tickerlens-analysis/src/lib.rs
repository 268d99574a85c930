//! Per-request orchestration of the analysis pipeline.
//!
//! [`Analyzer`] runs fetch, compute and recommend in sequence for each
//! request, tracks an explicit [`RequestState`], honours caller
//! cancellation and assembles the final [`AnalysisReport`].

mod cancel;
mod engine;
mod report;
mod state;

pub use cancel::CancelToken;
pub use engine::{Analyzer, DEFAULT_HISTORY_DAYS};
pub use report::AnalysisReport;
pub use state::{InvalidTransition, RequestState, RequestTracker};
