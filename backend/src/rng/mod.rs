//! Deterministic random number generation
//!
//! Uses xorshift64* algorithm for fast, deterministic random number generation.
//! CRITICAL: All randomness in the simulator MUST go through this module.
//! Arrival counts and leave decisions both draw from the single `RngManager`
//! owned by the orchestrator, so a seed fully determines a run.

mod xorshift;

pub use xorshift::RngManager;
