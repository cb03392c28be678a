//! Admission Policy Module
//!
//! This module gates entry from the outside-waiting queues into the facility.
//!
//! # Overview
//!
//! Arrivals wait outside until admitted. Each tick the orchestrator runs one
//! admission pass per priority class, high priority first, then low priority.
//! The facility-wide count `|needy| + |served| + |content|` is re-read before
//! each pass, so room used by high-priority customers is no longer offered to
//! low-priority ones in the same tick.
//!
//! # Policy Interface
//!
//! All policies implement the `AdmissionPolicy` trait:
//! ```rust
//! use facility_sim_core::policy::AdmissionPolicy;
//!
//! /// Admit at most one customer per pass
//! struct OneAtATime;
//!
//! impl AdmissionPolicy for OneAtATime {
//!     fn quota(&self, _admitted_now: usize, waiting: usize) -> usize {
//!         waiting.min(1)
//!     }
//! }
//! ```
//!
//! Available policies:
//! 1. **CappedAdmission**: Global cap on admitted customers, or unbounded

pub mod admission;
pub mod capped;

pub use admission::{admit_waiting, AdmissionResult, Admitted};
pub use capped::CappedAdmission;

/// Decides how many outside-waiting customers may enter in one pass
pub trait AdmissionPolicy {
    /// Number of customers to admit from a queue of `waiting` customers
    /// when `admitted_now` are already inside.
    ///
    /// Implementations must never return more than `waiting`; callers clamp
    /// regardless.
    fn quota(&self, admitted_now: usize, waiting: usize) -> usize;
}
