//! Service Module
//!
//! Moves admitted customers through the server pool:
//! - Assignment of needy customers to free servers (FIFO)
//! - Service completion with the stay/leave decision
//! - Content completion back into the needy queue
//!
//! # Critical Invariants
//!
//! 1. **Single Slot**: A server holds at most one customer
//! 2. **FIFO**: Needy customers are served in queue order; returning content
//!    customers join the tail
//! 3. **Server Order**: Free servers are filled, and completions checked, in
//!    server index order
//!
//! # Example
//!
//! ```rust
//! use facility_sim_core::{Customer, CustomerParams, FacilityState, Priority};
//! use facility_sim_core::policy::{admit_waiting, CappedAdmission};
//! use facility_sim_core::service;
//!
//! let mut state = FacilityState::new(1);
//! let params = CustomerParams { prob_stay: 0.0, mu: 2.0, delta: 1.0 };
//! state.add_arrival(Customer::new(0, Priority::High, params));
//! admit_waiting(&mut state, Priority::High, &CappedAdmission::new(None)).unwrap();
//!
//! let assignments = service::assign_needy(&mut state).unwrap();
//! assert_eq!(assignments.len(), 1);
//! assert_eq!(assignments[0].service_time_needed, 2.0);
//! assert_eq!(state.free_servers(), 0);
//! ```

pub mod assignment;
pub mod completion;

pub use assignment::{assign_needy, mark_waiting_inside, Assignment};
pub use completion::{
    complete_contents, complete_services, ContentCompletionDetail, ServiceCompletionDetail,
    ServiceCompletionResult,
};
