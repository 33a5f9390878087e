//! External-service seam for the dustguard engine.
//!
//! Defines the canonical sensor data model, the feed traits the engine
//! consumes (weather, air composition, classification), and their
//! reqwest-backed implementations.

pub mod http;
pub mod source;
