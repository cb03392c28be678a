//! Server assignment
//!
//! Binds the head of the needy queue to free servers until either runs out.
//! Service time is fixed at assignment and depends on how many servers are
//! busy once the new customer is seated.

use crate::models::customer::CustomerId;
use crate::models::state::FacilityState;
use crate::orchestrator::SimulationError;

/// A needy customer placed on a server
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub arrival_index: CustomerId,
    pub server: usize,
    /// Time spent needy before this assignment
    pub wait_time_to_be_served: f64,
    pub service_time_needed: f64,
}

/// Assign needy customers to free servers, FIFO, in server index order
///
/// # Errors
///
/// Returns an error if a needy index is missing from the arena or the
/// customer is not NEEDY.
pub fn assign_needy(state: &mut FacilityState) -> Result<Vec<Assignment>, SimulationError> {
    let num_servers = state.servers.len();
    let mut assignments = Vec::new();

    for index in 0..num_servers {
        if state.needy.is_empty() {
            break;
        }
        if state.servers[index].is_occupied() {
            continue;
        }
        let Some(id) = state.needy.pop_front() else {
            break;
        };

        state.servers[index].assign(id);
        let busy = state.servers.iter().filter(|s| s.is_occupied()).count();

        let customer = state
            .customers
            .get_mut(&id)
            .ok_or(SimulationError::CustomerNotFound(id))?;
        let wait_time_to_be_served = customer.time_counter();
        let service_time_needed = customer.start_service(index, busy, num_servers)?;
        state.served.push(id);

        assignments.push(Assignment {
            arrival_index: id,
            server: index,
            wait_time_to_be_served,
            service_time_needed,
        });
    }

    Ok(assignments)
}

/// Flag every customer still needy after assignment as having queued inside
///
/// Returns how many were flagged for the first time.
pub fn mark_waiting_inside(state: &mut FacilityState) -> Result<usize, SimulationError> {
    let mut newly_flagged = 0;
    for id in state.needy.iter() {
        let customer = state
            .customers
            .get_mut(id)
            .ok_or(SimulationError::CustomerNotFound(*id))?;
        if customer.mark_waited_inside() {
            newly_flagged += 1;
        }
    }
    Ok(newly_flagged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::{Customer, CustomerParams, Priority};
    use crate::policy::{admit_waiting, CappedAdmission};

    fn admitted_state(num_servers: usize, num_customers: usize, mu: f64) -> FacilityState {
        let mut state = FacilityState::new(num_servers);
        let params = CustomerParams {
            prob_stay: 0.0,
            mu,
            delta: 1.0,
        };
        for i in 0..num_customers {
            state.add_arrival(Customer::new(i, Priority::Low, params));
        }
        admit_waiting(&mut state, Priority::Low, &CappedAdmission::new(None)).unwrap();
        state
    }

    #[test]
    fn test_service_time_grows_with_busy_servers() {
        let mut state = admitted_state(3, 3, 2.0);
        let assignments = assign_needy(&mut state).unwrap();

        let times: Vec<f64> = assignments.iter().map(|a| a.service_time_needed).collect();
        assert_eq!(times, vec![2.0, 4.0, 6.0]);
        assert_eq!(assignments.iter().map(|a| a.server).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_leftover_needy_flagged_once() {
        let mut state = admitted_state(1, 3, 1.0);
        assign_needy(&mut state).unwrap();

        assert_eq!(mark_waiting_inside(&mut state).unwrap(), 2);
        assert_eq!(mark_waiting_inside(&mut state).unwrap(), 0);
        assert!(!state.get_customer(0).unwrap().waited_inside());
        assert!(state.get_customer(1).unwrap().waited_inside());
        assert!(state.check_invariants(None).is_ok());
    }

    #[test]
    fn test_skips_occupied_servers() {
        let mut state = admitted_state(2, 1, 1.0);
        assign_needy(&mut state).unwrap();

        let params = CustomerParams {
            prob_stay: 0.0,
            mu: 1.0,
            delta: 1.0,
        };
        state.add_arrival(Customer::new(1, Priority::Low, params));
        admit_waiting(&mut state, Priority::Low, &CappedAdmission::new(None)).unwrap();

        let second = assign_needy(&mut state).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].server, 1);
        assert_eq!(second[0].service_time_needed, 2.0);
    }
}
