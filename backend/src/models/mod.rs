//! Domain models for the facility simulator

pub mod customer;
pub mod event;
pub mod server;
pub mod state;

// Re-exports
pub use customer::{
    Customer, CustomerError, CustomerId, CustomerParams, CustomerState, Priority,
    ServiceCompletion,
};
pub use event::{Event, EventLog};
pub use server::Server;
pub use state::FacilityState;
