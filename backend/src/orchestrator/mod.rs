//! Orchestrator - main simulation loop
//!
//! Owns the facility, the clock, the RNG and the record streams, and runs the
//! fixed per-tick sequence over them.
//!
//! See `engine.rs` for full implementation.

pub mod engine;


// Re-export main types for convenience
pub use engine::{FacilityConfig, Orchestrator, RunOutcome, SimulationError, TickResult};
