//! Facility State
//!
//! Represents the complete state of the queueing facility: every customer
//! currently present, the five containers that place each of them in a
//! lifecycle state, and the server pool.
//!
//! # Ownership
//!
//! Customers live in an arena keyed by arrival index. Containers and servers
//! hold arrival indices only, so moving a customer between states never moves
//! the customer value, and a server never controls a customer's lifetime.
//! Departure removes the customer from the arena.
//!
//! # Critical Invariants
//!
//! 1. **Single Membership**: Every customer in the arena appears in exactly one container
//! 2. **State Agreement**: A customer's state matches the container holding it
//! 3. **Server Consistency**: An occupied server's customer is SERVED on that server,
//!    and every SERVED customer occupies exactly one server
//! 4. **Admission Cap**: `|needy| + |served| + |content| <= max_total_admitted` when bounded

use crate::models::customer::{Customer, CustomerId, CustomerState, Priority};
use crate::models::server::Server;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Complete facility state
///
/// # Example
///
/// ```rust
/// use facility_sim_core::{Customer, CustomerParams, FacilityState, Priority};
///
/// let mut state = FacilityState::new(2);
/// let params = CustomerParams { prob_stay: 0.0, mu: 1.0, delta: 1.0 };
/// state.add_arrival(Customer::new(0, Priority::High, params));
///
/// assert_eq!(state.num_servers(), 2);
/// assert_eq!(state.waiting_outside(Priority::High).len(), 1);
/// assert_eq!(state.num_admitted(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct FacilityState {
    /// Every customer present in the facility, by arrival index
    pub(crate) customers: BTreeMap<CustomerId, Customer>,

    /// Blocked arrivals, FIFO per priority class
    pub(crate) waiting_outside_low: VecDeque<CustomerId>,
    pub(crate) waiting_outside_high: VecDeque<CustomerId>,

    /// Admitted customers waiting for a server, FIFO
    pub(crate) needy: VecDeque<CustomerId>,

    /// Customers on a server, in assignment order
    pub(crate) served: Vec<CustomerId>,

    /// Customers resting after service, in entry order
    pub(crate) content: Vec<CustomerId>,

    pub(crate) servers: Vec<Server>,
}

impl FacilityState {
    /// Create an empty facility with `num_servers` free servers
    pub fn new(num_servers: usize) -> Self {
        Self {
            customers: BTreeMap::new(),
            waiting_outside_low: VecDeque::new(),
            waiting_outside_high: VecDeque::new(),
            needy: VecDeque::new(),
            served: Vec::new(),
            content: Vec::new(),
            servers: vec![Server::new(); num_servers],
        }
    }

    /// Place a newly created customer at the tail of its outside queue
    ///
    /// # Panics
    ///
    /// Panics if the arrival index is already present (indices are never reused)
    /// or the customer is not WAITING_OUTSIDE.
    pub fn add_arrival(&mut self, customer: Customer) {
        let id = customer.arrival_index();
        assert!(
            !self.customers.contains_key(&id),
            "Customer {} already exists",
            id
        );
        assert_eq!(
            customer.state(),
            &CustomerState::WaitingOutside,
            "new arrivals must be waiting outside"
        );
        match customer.priority() {
            Priority::Low => self.waiting_outside_low.push_back(id),
            Priority::High => self.waiting_outside_high.push_back(id),
        }
        self.customers.insert(id, customer);
    }

    /// Take a departed customer out of the arena
    pub(crate) fn remove_customer(&mut self, id: CustomerId) -> Option<Customer> {
        self.customers.remove(&id)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get_customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.get(&id)
    }

    /// All present customers, in arrival order
    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.customers.values()
    }

    pub fn num_customers(&self) -> usize {
        self.customers.len()
    }

    pub fn waiting_outside(&self, priority: Priority) -> &VecDeque<CustomerId> {
        match priority {
            Priority::Low => &self.waiting_outside_low,
            Priority::High => &self.waiting_outside_high,
        }
    }

    pub fn num_waiting_outside(&self) -> usize {
        self.waiting_outside_low.len() + self.waiting_outside_high.len()
    }

    pub fn needy(&self) -> &VecDeque<CustomerId> {
        &self.needy
    }

    pub fn served(&self) -> &[CustomerId] {
        &self.served
    }

    pub fn content(&self) -> &[CustomerId] {
        &self.content
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn num_servers(&self) -> usize {
        self.servers.len()
    }

    pub fn free_servers(&self) -> usize {
        self.servers.iter().filter(|s| !s.is_occupied()).count()
    }

    pub fn busy_servers(&self) -> usize {
        self.num_servers() - self.free_servers()
    }

    /// Customers inside the facility: `|needy| + |served| + |content|`
    pub fn num_admitted(&self) -> usize {
        self.needy.len() + self.served.len() + self.content.len()
    }

    /// True when no customer is in any container
    pub fn is_empty(&self) -> bool {
        self.num_admitted() == 0 && self.num_waiting_outside() == 0
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Advance every present customer's timer by `dt`
    ///
    /// The arena holds exactly the customers in the five containers, so this
    /// covers needy, served, content and both outside queues.
    pub fn advance_timers(&mut self, dt: f64) {
        for customer in self.customers.values_mut() {
            customer.tick(dt);
        }
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Verify the structural invariants listed in the module docs
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariants(&self, max_total_admitted: Option<usize>) -> Result<(), String> {
        if let Some(cap) = max_total_admitted {
            if self.num_admitted() > cap {
                return Err(format!(
                    "admitted {} customers, cap is {}",
                    self.num_admitted(),
                    cap
                ));
            }
        }

        let mut seen: HashMap<CustomerId, &'static str> = HashMap::new();
        let containers: [(&'static str, Vec<CustomerId>); 5] = [
            ("waiting_outside_low", self.waiting_outside_low.iter().copied().collect()),
            ("waiting_outside_high", self.waiting_outside_high.iter().copied().collect()),
            ("needy", self.needy.iter().copied().collect()),
            ("served", self.served.clone()),
            ("content", self.content.clone()),
        ];

        for (name, ids) in &containers {
            for id in ids {
                if let Some(other) = seen.insert(*id, *name) {
                    return Err(format!("customer {} in both {} and {}", id, other, name));
                }
                let customer = self
                    .customers
                    .get(id)
                    .ok_or_else(|| format!("customer {} in {} but not in arena", id, name))?;
                let agrees = match (*name, customer.state()) {
                    ("waiting_outside_low", CustomerState::WaitingOutside) => {
                        customer.priority() == Priority::Low
                    }
                    ("waiting_outside_high", CustomerState::WaitingOutside) => {
                        customer.priority() == Priority::High
                    }
                    ("needy", CustomerState::Needy) => true,
                    ("served", CustomerState::Served { .. }) => true,
                    ("content", CustomerState::Content { .. }) => true,
                    _ => false,
                };
                if !agrees {
                    return Err(format!(
                        "customer {} in {} has state {}",
                        id,
                        name,
                        customer.state().name()
                    ));
                }
            }
        }

        if seen.len() != self.customers.len() {
            return Err(format!(
                "{} customers in arena, {} in containers",
                self.customers.len(),
                seen.len()
            ));
        }

        let mut occupied = 0;
        for (index, server) in self.servers.iter().enumerate() {
            if let Some(id) = server.customer() {
                occupied += 1;
                let bound_here = self
                    .customers
                    .get(&id)
                    .map(|c| c.server() == Some(index))
                    .unwrap_or(false);
                if !bound_here {
                    return Err(format!(
                        "server {} holds customer {} which is not served there",
                        index, id
                    ));
                }
            }
        }
        if occupied != self.served.len() {
            return Err(format!(
                "{} occupied servers, {} served customers",
                occupied,
                self.served.len()
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::CustomerParams;

    fn params() -> CustomerParams {
        CustomerParams {
            prob_stay: 0.0,
            mu: 1.0,
            delta: 1.0,
        }
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = FacilityState::new(3);
        assert!(state.is_empty());
        assert_eq!(state.free_servers(), 3);
        assert_eq!(state.busy_servers(), 0);
        assert!(state.check_invariants(Some(1)).is_ok());
    }

    #[test]
    fn test_arrivals_split_by_priority() {
        let mut state = FacilityState::new(1);
        state.add_arrival(Customer::new(0, Priority::Low, params()));
        state.add_arrival(Customer::new(1, Priority::High, params()));
        state.add_arrival(Customer::new(2, Priority::Low, params()));

        assert_eq!(state.waiting_outside(Priority::Low), &VecDeque::from(vec![0, 2]));
        assert_eq!(state.waiting_outside(Priority::High), &VecDeque::from(vec![1]));
        assert_eq!(state.num_waiting_outside(), 3);
        assert!(state.check_invariants(None).is_ok());
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn test_duplicate_arrival_index_panics() {
        let mut state = FacilityState::new(1);
        state.add_arrival(Customer::new(0, Priority::Low, params()));
        state.add_arrival(Customer::new(0, Priority::High, params()));
    }

    #[test]
    fn test_detects_customer_in_two_containers() {
        let mut state = FacilityState::new(1);
        state.add_arrival(Customer::new(0, Priority::Low, params()));
        state.needy.push_back(0);

        let err = state.check_invariants(None).unwrap_err();
        assert!(err.contains("in both"), "unexpected message: {}", err);
    }

    #[test]
    fn test_detects_server_without_served_customer() {
        let mut state = FacilityState::new(1);
        state.add_arrival(Customer::new(0, Priority::Low, params()));
        state.servers[0].assign(0);

        let err = state.check_invariants(None).unwrap_err();
        assert!(err.contains("server 0"), "unexpected message: {}", err);
    }

    #[test]
    fn test_detects_cap_violation() {
        let mut state = FacilityState::new(1);
        let mut c0 = Customer::new(0, Priority::Low, params());
        let mut c1 = Customer::new(1, Priority::Low, params());
        c0.admit().unwrap();
        c1.admit().unwrap();
        state.customers.insert(0, c0);
        state.customers.insert(1, c1);
        state.needy.extend([0, 1]);

        assert!(state.check_invariants(Some(2)).is_ok());
        assert!(state.check_invariants(Some(1)).is_err());
    }

    #[test]
    fn test_advance_timers_touches_every_customer() {
        let mut state = FacilityState::new(1);
        state.add_arrival(Customer::new(0, Priority::Low, params()));
        state.add_arrival(Customer::new(1, Priority::High, params()));

        state.advance_timers(0.5);
        state.advance_timers(0.5);

        assert!(state.customers().all(|c| c.time_counter() == 1.0));
    }
}
