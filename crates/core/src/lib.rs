//! dustguard engine: telemetry acquisition, verdict orchestration and
//! view synchronization for the street dust-cleaning dashboard.
//!
//! The pipeline is `telemetry` → `prediction` → `alert` → `view`; the
//! `runtime` module ties the stages together in a single event loop.

pub mod alert;
pub mod config;
pub mod prediction;
pub mod runtime;
pub mod telemetry;
pub mod types;
pub mod view;
