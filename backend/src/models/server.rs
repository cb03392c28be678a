//! Server model
//!
//! A single-slot resource. The server holds the arrival index of the customer
//! it serves, never the customer itself: the customer's lifetime belongs to
//! the facility arena, and it may later be served again by a different server.

use crate::models::customer::CustomerId;
use serde::{Deserialize, Serialize};

/// One server of the pool
///
/// `occupied` is derived from the slot, so a server can never be occupied
/// without a customer or hold a customer while free.
///
/// # Example
/// ```
/// use facility_sim_core::Server;
///
/// let mut server = Server::new();
/// assert!(!server.is_occupied());
///
/// server.assign(7);
/// assert_eq!(server.customer(), Some(7));
///
/// assert_eq!(server.release(), Some(7));
/// assert!(!server.is_occupied());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    customer: Option<CustomerId>,
}

impl Server {
    pub fn new() -> Self {
        Self { customer: None }
    }

    pub fn is_occupied(&self) -> bool {
        self.customer.is_some()
    }

    /// Customer currently being served
    pub fn customer(&self) -> Option<CustomerId> {
        self.customer
    }

    /// Bind a customer to this server
    ///
    /// # Panics
    /// Panics if the server is already occupied. The scheduler only hands
    /// customers to free servers, so this is a logic error.
    pub fn assign(&mut self, customer: CustomerId) {
        assert!(
            self.customer.is_none(),
            "server already occupied by customer {:?}",
            self.customer
        );
        self.customer = Some(customer);
    }

    /// Free the server, returning the customer it held
    pub fn release(&mut self) -> Option<CustomerId> {
        self.customer.take()
    }
}
