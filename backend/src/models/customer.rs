//! Customer model
//!
//! A customer arrives with a priority class, waits outside until admitted,
//! then cycles through NEEDY → SERVED → CONTENT → NEEDY until a leave
//! decision at the end of a service episode moves it to LEFT.
//!
//! ```text
//!                 admit                 start_service
//! WaitingOutside ───────▶ Needy ◀──────────────┐ ──────────▶ Served
//!                           ▲                  │                │
//!                           │ complete_content │                │ complete_service
//!                           │                  │                ▼
//!                         Content ◀────────────┴─── stay ── (decision) ── leave ──▶ Left
//! ```
//!
//! Every transition resets `time_counter`. Durations of finished episodes are
//! appended to the per-customer accumulators, which are summed for reporting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Customers are identified by their arrival index
pub type CustomerId = usize;

/// Priority class, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a customer
///
/// State-specific data lives in the variant, so a customer that is not being
/// served has no service time and no server to point at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CustomerState {
    /// Arrived, blocked outside the facility
    WaitingOutside,

    /// Admitted, waiting in the internal queue for a free server
    Needy,

    /// Occupying a server
    Served {
        /// Index of the server in the pool (back-reference only)
        server: usize,
        /// Congestion-scaled service duration fixed at assignment
        service_time_needed: f64,
    },

    /// Resting after service before becoming needy again
    Content {
        /// Congestion-scaled content duration fixed on entry
        content_time_needed: f64,
    },

    /// Departed; only seen on the value handed back at departure
    Left,
}

impl CustomerState {
    pub fn name(&self) -> &'static str {
        match self {
            CustomerState::WaitingOutside => "WAITING_OUTSIDE",
            CustomerState::Needy => "NEEDY",
            CustomerState::Served { .. } => "SERVED",
            CustomerState::Content { .. } => "CONTENT",
            CustomerState::Left => "LEFT",
        }
    }
}

/// Per-customer behavioral parameters (copied from the facility configuration)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomerParams {
    /// Probability of staying for another cycle after a service episode
    pub prob_stay: f64,
    /// Service-rate parameter
    pub mu: f64,
    /// Content-duration parameter
    pub delta: f64,
}

/// Errors raised by illegal customer transitions
///
/// These indicate a scheduling bug in the caller, never a runtime condition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CustomerError {
    #[error("customer {arrival_index}: cannot {action} while {state}")]
    InvalidTransition {
        arrival_index: CustomerId,
        action: &'static str,
        state: &'static str,
    },

    #[error("customer {arrival_index}: {state} episode not finished")]
    EpisodeNotFinished {
        arrival_index: CustomerId,
        state: &'static str,
    },
}

/// Outcome of a finished service episode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServiceCompletion {
    /// Customer left the facility
    Left,
    /// Customer became content for `content_time_needed`
    Content { content_time_needed: f64 },
}

/// Service time for a customer just bound to a server
///
/// `busy_servers` counts occupied servers including the new assignment.
/// Below saturation the time grows linearly with the count; at or above
/// `num_servers` it is capped at `num_servers * mu`.
pub fn congestion_service_time(busy_servers: usize, num_servers: usize, mu: f64) -> f64 {
    if busy_servers < num_servers {
        busy_servers as f64 * mu
    } else {
        num_servers as f64 * mu
    }
}

/// Content time for a customer entering CONTENT
///
/// `content_count` includes the customer itself.
pub fn congestion_content_time(content_count: usize, delta: f64) -> f64 {
    delta * content_count as f64
}

/// A customer of the facility
///
/// # Example
/// ```
/// use facility_sim_core::{Customer, CustomerParams, Priority};
///
/// let params = CustomerParams { prob_stay: 0.0, mu: 2.0, delta: 1.0 };
/// let mut customer = Customer::new(0, Priority::High, params);
/// customer.tick(0.5);
/// let waited = customer.admit().unwrap();
/// assert_eq!(waited, 0.5);
/// assert_eq!(customer.wait_time_to_enter(), Some(0.5));
/// assert_eq!(customer.time_counter(), 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    arrival_index: CustomerId,
    priority: Priority,
    params: CustomerParams,
    state: CustomerState,

    /// Elapsed time since entering the current state
    time_counter: f64,

    /// Set once, on admission
    wait_time_to_enter: Option<f64>,

    /// One entry per NEEDY episode
    wait_times_to_be_served: Vec<f64>,
    served_times: Vec<f64>,
    content_times: Vec<f64>,

    /// Ever blocked outside (sticky)
    waited_outside: bool,
    /// Ever queued inside without a free server (sticky)
    waited_inside: bool,
}

impl Customer {
    /// Create a newly arrived customer, waiting outside
    pub fn new(arrival_index: CustomerId, priority: Priority, params: CustomerParams) -> Self {
        Self {
            arrival_index,
            priority,
            params,
            state: CustomerState::WaitingOutside,
            time_counter: 0.0,
            wait_time_to_enter: None,
            wait_times_to_be_served: Vec::new(),
            served_times: Vec::new(),
            content_times: Vec::new(),
            waited_outside: false,
            waited_inside: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn arrival_index(&self) -> CustomerId {
        self.arrival_index
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn params(&self) -> &CustomerParams {
        &self.params
    }

    pub fn state(&self) -> &CustomerState {
        &self.state
    }

    pub fn time_counter(&self) -> f64 {
        self.time_counter
    }

    pub fn wait_time_to_enter(&self) -> Option<f64> {
        self.wait_time_to_enter
    }

    pub fn wait_times_to_be_served(&self) -> &[f64] {
        &self.wait_times_to_be_served
    }

    pub fn served_times(&self) -> &[f64] {
        &self.served_times
    }

    pub fn content_times(&self) -> &[f64] {
        &self.content_times
    }

    pub fn waited_outside(&self) -> bool {
        self.waited_outside
    }

    pub fn waited_inside(&self) -> bool {
        self.waited_inside
    }

    /// Service time fixed for the current SERVED episode
    pub fn service_time_needed(&self) -> Option<f64> {
        match self.state {
            CustomerState::Served {
                service_time_needed,
                ..
            } => Some(service_time_needed),
            _ => None,
        }
    }

    /// Content time fixed for the current CONTENT episode
    pub fn content_time_needed(&self) -> Option<f64> {
        match self.state {
            CustomerState::Content {
                content_time_needed,
            } => Some(content_time_needed),
            _ => None,
        }
    }

    /// Server currently bound to this customer
    pub fn server(&self) -> Option<usize> {
        match self.state {
            CustomerState::Served { server, .. } => Some(server),
            _ => None,
        }
    }

    /// Number of completed service episodes
    pub fn num_cycles(&self) -> usize {
        self.served_times.len()
    }

    // ========================================================================
    // Timers and flags
    // ========================================================================

    /// Advance the in-state timer by one tick of size `dt`
    pub fn tick(&mut self, dt: f64) {
        self.time_counter += dt;
    }

    /// Mark as blocked outside. Returns true if this is the first time.
    pub fn mark_waited_outside(&mut self) -> bool {
        let first = !self.waited_outside;
        self.waited_outside = true;
        first
    }

    /// Mark as queued inside. Returns true if this is the first time.
    pub fn mark_waited_inside(&mut self) -> bool {
        let first = !self.waited_inside;
        self.waited_inside = true;
        first
    }

    pub fn is_done_being_served(&self) -> bool {
        matches!(self.state, CustomerState::Served { service_time_needed, .. }
            if self.time_counter >= service_time_needed)
    }

    pub fn is_done_being_content(&self) -> bool {
        matches!(self.state, CustomerState::Content { content_time_needed }
            if self.time_counter >= content_time_needed)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn invalid(&self, action: &'static str) -> CustomerError {
        CustomerError::InvalidTransition {
            arrival_index: self.arrival_index,
            action,
            state: self.state.name(),
        }
    }

    fn enter(&mut self, state: CustomerState) {
        self.state = state;
        self.time_counter = 0.0;
    }

    /// WAITING_OUTSIDE → NEEDY. Finalizes and returns `wait_time_to_enter`.
    pub fn admit(&mut self) -> Result<f64, CustomerError> {
        if self.state != CustomerState::WaitingOutside {
            return Err(self.invalid("admit"));
        }
        let waited = self.time_counter;
        self.wait_time_to_enter = Some(waited);
        self.enter(CustomerState::Needy);
        Ok(waited)
    }

    /// NEEDY → SERVED on `server`
    ///
    /// `busy_servers` counts occupied servers including this assignment.
    /// Returns the congestion-scaled service time.
    pub fn start_service(
        &mut self,
        server: usize,
        busy_servers: usize,
        num_servers: usize,
    ) -> Result<f64, CustomerError> {
        if self.state != CustomerState::Needy {
            return Err(self.invalid("start service"));
        }
        let service_time_needed = congestion_service_time(busy_servers, num_servers, self.params.mu);
        self.wait_times_to_be_served.push(self.time_counter);
        self.enter(CustomerState::Served {
            server,
            service_time_needed,
        });
        Ok(service_time_needed)
    }

    /// End a finished SERVED episode
    ///
    /// `stays` is the outcome of the leave decision. When staying,
    /// `content_count` is the number of CONTENT customers including this one.
    pub fn complete_service(
        &mut self,
        stays: bool,
        content_count: usize,
    ) -> Result<ServiceCompletion, CustomerError> {
        let service_time_needed = match self.state {
            CustomerState::Served {
                service_time_needed,
                ..
            } => service_time_needed,
            _ => return Err(self.invalid("complete service")),
        };
        if self.time_counter < service_time_needed {
            return Err(CustomerError::EpisodeNotFinished {
                arrival_index: self.arrival_index,
                state: self.state.name(),
            });
        }

        self.served_times.push(service_time_needed);

        if stays {
            let content_time_needed = congestion_content_time(content_count, self.params.delta);
            self.enter(CustomerState::Content {
                content_time_needed,
            });
            Ok(ServiceCompletion::Content {
                content_time_needed,
            })
        } else {
            self.enter(CustomerState::Left);
            Ok(ServiceCompletion::Left)
        }
    }

    /// CONTENT → NEEDY once the content episode is over
    ///
    /// Returns the duration recorded for the finished episode.
    pub fn complete_content(&mut self) -> Result<f64, CustomerError> {
        let content_time_needed = match self.state {
            CustomerState::Content {
                content_time_needed,
            } => content_time_needed,
            _ => return Err(self.invalid("complete content")),
        };
        if self.time_counter < content_time_needed {
            return Err(CustomerError::EpisodeNotFinished {
                arrival_index: self.arrival_index,
                state: self.state.name(),
            });
        }

        self.content_times.push(content_time_needed);
        self.enter(CustomerState::Needy);
        Ok(content_time_needed)
    }
}
