//! Facility Simulator Core
//!
//! Tick-driven simulation of a multi-server facility with two priority
//! classes, a global admission cap and customers that may return for more
//! service, with deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Time management
//! - **models**: Domain types (Customer, Server, FacilityState, Event)
//! - **arrivals**: Poisson arrival generation
//! - **policy**: Admission control (priority order, global cap)
//! - **service**: Server assignment, service and content completion
//! - **stats**: Record streams and run summaries
//! - **orchestrator**: Main simulation loop
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Every present customer is in exactly one lifecycle container
//! 2. Admitted customers never exceed the admission cap
//! 3. All randomness is deterministic (seeded RNG)

// Module declarations
pub mod arrivals;
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod rng;
pub mod service;
pub mod stats;

// Re-exports for convenience
pub use arrivals::{ArrivalBatch, ArrivalConfig, ArrivalGenerator};
pub use crate::core::time::TimeManager;
pub use models::{
    customer::{Customer, CustomerError, CustomerId, CustomerParams, CustomerState, Priority},
    event::{Event, EventLog},
    server::Server,
    state::FacilityState,
};
pub use orchestrator::{FacilityConfig, Orchestrator, RunOutcome, SimulationError, TickResult};
pub use rng::RngManager;
pub use stats::{CustomerRecord, RunSummary, StatisticsCollector, StatisticsSink, TickRecord};
