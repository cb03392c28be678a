//! Service and content completion
//!
//! Service completion releases the server, records the served duration and
//! draws the stay/leave decision. Leaving customers are removed from the
//! arena and handed back to the caller for final reporting. Staying customers
//! become content for a duration that grows with the content population.
//!
//! Content completion returns customers to the tail of the needy queue.

use crate::models::customer::{Customer, CustomerId, ServiceCompletion};
use crate::models::state::FacilityState;
use crate::orchestrator::SimulationError;
use crate::rng::RngManager;

/// A finished service episode
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCompletionDetail {
    pub arrival_index: CustomerId,
    pub server: usize,
    pub served_time: f64,
    /// `Some` when the customer stayed and became content
    pub content_time_needed: Option<f64>,
}

/// A finished content episode
#[derive(Debug, Clone, PartialEq)]
pub struct ContentCompletionDetail {
    pub arrival_index: CustomerId,
    pub content_time: f64,
}

/// Everything that happened during one service completion pass
#[derive(Debug, Clone, Default)]
pub struct ServiceCompletionResult {
    /// Completed episodes, in server index order
    pub completed: Vec<ServiceCompletionDetail>,

    /// Customers that left, removed from the facility
    pub departed: Vec<Customer>,
}

/// Check every occupied server and finish episodes whose time is up
///
/// Servers are visited in index order. The leave decision draws one uniform
/// per completion from `rng`: the customer stays iff the draw is below its
/// `prob_stay`.
///
/// # Errors
///
/// Returns an error if a bound customer is missing from the arena or is not
/// in a state that can complete service.
pub fn complete_services(
    state: &mut FacilityState,
    rng: &mut RngManager,
) -> Result<ServiceCompletionResult, SimulationError> {
    let mut result = ServiceCompletionResult::default();

    for index in 0..state.servers.len() {
        let Some(id) = state.servers[index].customer() else {
            continue;
        };
        let customer = state
            .customers
            .get_mut(&id)
            .ok_or(SimulationError::CustomerNotFound(id))?;
        if !customer.is_done_being_served() {
            continue;
        }

        state.servers[index].release();
        state.served.retain(|served| *served != id);

        let stays = rng.bernoulli(customer.params().prob_stay);
        let content_count = state.content.len() + 1;
        let outcome = customer.complete_service(stays, content_count)?;
        let served_time = customer.served_times().last().copied().unwrap_or_default();

        match outcome {
            ServiceCompletion::Content {
                content_time_needed,
            } => {
                state.content.push(id);
                result.completed.push(ServiceCompletionDetail {
                    arrival_index: id,
                    server: index,
                    served_time,
                    content_time_needed: Some(content_time_needed),
                });
            }
            ServiceCompletion::Left => {
                result.completed.push(ServiceCompletionDetail {
                    arrival_index: id,
                    server: index,
                    served_time,
                    content_time_needed: None,
                });
                let departed = state
                    .remove_customer(id)
                    .ok_or(SimulationError::CustomerNotFound(id))?;
                result.departed.push(departed);
            }
        }
    }

    Ok(result)
}

/// Return every content customer whose episode is over to the needy queue
///
/// Customers are processed in content entry order and appended to the needy
/// tail in that order.
pub fn complete_contents(
    state: &mut FacilityState,
) -> Result<Vec<ContentCompletionDetail>, SimulationError> {
    let mut finished = Vec::new();

    for id in state.content.iter() {
        let customer = state
            .customers
            .get_mut(id)
            .ok_or(SimulationError::CustomerNotFound(*id))?;
        if customer.is_done_being_content() {
            let content_time = customer.complete_content()?;
            finished.push(ContentCompletionDetail {
                arrival_index: *id,
                content_time,
            });
        }
    }

    for detail in &finished {
        state.content.retain(|id| *id != detail.arrival_index);
        state.needy.push_back(detail.arrival_index);
    }

    Ok(finished)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::{CustomerParams, CustomerState, Priority};
    use crate::policy::{admit_waiting, CappedAdmission};
    use crate::service::assign_needy;

    fn served_state(num_customers: usize, prob_stay: f64) -> FacilityState {
        let mut state = FacilityState::new(num_customers);
        let params = CustomerParams {
            prob_stay,
            mu: 1.0,
            delta: 2.0,
        };
        for i in 0..num_customers {
            state.add_arrival(Customer::new(i, Priority::High, params));
        }
        admit_waiting(&mut state, Priority::High, &CappedAdmission::new(None)).unwrap();
        assign_needy(&mut state).unwrap();
        state
    }

    #[test]
    fn test_unfinished_service_left_alone() {
        let mut state = served_state(1, 0.0);
        let mut rng = RngManager::new(1);
        let before = rng.get_state();

        let result = complete_services(&mut state, &mut rng).unwrap();
        assert!(result.completed.is_empty());
        assert_eq!(state.busy_servers(), 1);
        assert_eq!(rng.get_state(), before);
    }

    #[test]
    fn test_leaving_customer_removed() {
        let mut state = served_state(1, 0.0);
        state.advance_timers(1.0);
        let mut rng = RngManager::new(1);

        let result = complete_services(&mut state, &mut rng).unwrap();
        assert_eq!(result.departed.len(), 1);
        assert_eq!(result.departed[0].served_times(), &[1.0]);
        assert_eq!(result.departed[0].state(), &CustomerState::Left);
        assert!(state.is_empty());
        assert_eq!(state.num_customers(), 0);
        assert_eq!(state.free_servers(), 1);
    }

    #[test]
    fn test_staying_customers_content_time_scales() {
        // Both served by the same tick; service times are 1.0 and 2.0
        let mut state = served_state(2, 1.0);
        state.advance_timers(2.0);
        let mut rng = RngManager::new(1);

        let result = complete_services(&mut state, &mut rng).unwrap();
        let content: Vec<Option<f64>> =
            result.completed.iter().map(|d| d.content_time_needed).collect();
        assert_eq!(content, vec![Some(2.0), Some(4.0)]);
        assert_eq!(state.content(), &[0, 1]);
        assert!(result.departed.is_empty());
        assert!(state.check_invariants(None).is_ok());
    }

    #[test]
    fn test_content_returns_to_needy_tail() {
        let mut state = served_state(2, 1.0);
        state.advance_timers(2.0);
        let mut rng = RngManager::new(1);
        complete_services(&mut state, &mut rng).unwrap();

        // Customer 0 needs 2.0 content time, customer 1 needs 4.0
        state.advance_timers(2.0);
        let finished = complete_contents(&mut state).unwrap();

        assert_eq!(
            finished,
            vec![ContentCompletionDetail {
                arrival_index: 0,
                content_time: 2.0
            }]
        );
        assert_eq!(state.needy().iter().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(state.content(), &[1]);
        assert!(state.check_invariants(None).is_ok());
    }
}
