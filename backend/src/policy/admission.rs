//! Admission pass
//!
//! Moves the head of one outside-waiting FIFO into the needy queue and marks
//! everyone left behind as blocked.

use super::AdmissionPolicy;
use crate::models::customer::{CustomerId, Priority};
use crate::models::state::FacilityState;
use crate::orchestrator::SimulationError;

/// A customer moved from outside into the needy queue
#[derive(Debug, Clone, PartialEq)]
pub struct Admitted {
    pub arrival_index: CustomerId,
    /// Finalized time spent waiting outside
    pub wait_time_to_enter: f64,
}

/// Outcome of one admission pass for a single priority class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdmissionResult {
    /// Customers admitted this pass, in FIFO order
    pub admitted: Vec<Admitted>,

    /// Customers left outside that were blocked for the first time
    pub newly_blocked: usize,

    /// Customers still waiting outside after the pass
    pub still_waiting: usize,
}

/// Run one admission pass for `priority`
///
/// The first `quota` customers of the outside queue are admitted: their
/// `wait_time_to_enter` is finalized, their timer reset, and they join the
/// tail of the needy queue. Every customer still outside afterwards gets its
/// sticky `waited_outside` flag set.
///
/// # Errors
///
/// Returns an error if a queued index is missing from the arena or a queued
/// customer is not WAITING_OUTSIDE. Both are logic bugs.
pub fn admit_waiting(
    state: &mut FacilityState,
    priority: Priority,
    policy: &dyn AdmissionPolicy,
) -> Result<AdmissionResult, SimulationError> {
    let admitted_now = state.num_admitted();
    let queue = match priority {
        Priority::Low => &mut state.waiting_outside_low,
        Priority::High => &mut state.waiting_outside_high,
    };
    let waiting = queue.len();
    let n_to_admit = policy.quota(admitted_now, waiting).min(waiting);

    let mut result = AdmissionResult::default();

    for id in queue.drain(..n_to_admit) {
        let customer = state
            .customers
            .get_mut(&id)
            .ok_or(SimulationError::CustomerNotFound(id))?;
        let wait_time_to_enter = customer.admit()?;
        state.needy.push_back(id);
        result.admitted.push(Admitted {
            arrival_index: id,
            wait_time_to_enter,
        });
    }

    for id in queue.iter() {
        let customer = state
            .customers
            .get_mut(id)
            .ok_or(SimulationError::CustomerNotFound(*id))?;
        if customer.mark_waited_outside() {
            result.newly_blocked += 1;
        }
    }
    result.still_waiting = queue.len();

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::{Customer, CustomerParams};
    use crate::policy::CappedAdmission;

    fn params() -> CustomerParams {
        CustomerParams {
            prob_stay: 0.0,
            mu: 1.0,
            delta: 1.0,
        }
    }

    fn state_with_outside(low: usize, high: usize) -> FacilityState {
        let mut state = FacilityState::new(1);
        let mut next = 0;
        for _ in 0..low {
            state.add_arrival(Customer::new(next, Priority::Low, params()));
            next += 1;
        }
        for _ in 0..high {
            state.add_arrival(Customer::new(next, Priority::High, params()));
            next += 1;
        }
        state
    }

    fn indices(result: &AdmissionResult) -> Vec<CustomerId> {
        result.admitted.iter().map(|a| a.arrival_index).collect()
    }

    #[test]
    fn test_admits_fifo_up_to_cap() {
        let mut state = state_with_outside(4, 0);
        let result = admit_waiting(&mut state, Priority::Low, &CappedAdmission::new(Some(2))).unwrap();

        assert_eq!(indices(&result), vec![0, 1]);
        assert_eq!(result.newly_blocked, 2);
        assert_eq!(result.still_waiting, 2);
        assert_eq!(state.needy().iter().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert!(state.get_customer(2).unwrap().waited_outside());
        assert!(!state.get_customer(0).unwrap().waited_outside());
    }

    #[test]
    fn test_blocked_counted_once() {
        let mut state = state_with_outside(2, 0);
        let policy = CappedAdmission::new(Some(1));

        let first = admit_waiting(&mut state, Priority::Low, &policy).unwrap();
        let second = admit_waiting(&mut state, Priority::Low, &policy).unwrap();

        assert_eq!(first.newly_blocked, 1);
        assert_eq!(second.newly_blocked, 0);
        assert!(second.admitted.is_empty());
        assert_eq!(second.still_waiting, 1);
    }

    #[test]
    fn test_only_touches_requested_priority() {
        let mut state = state_with_outside(1, 1);
        let result = admit_waiting(&mut state, Priority::High, &CappedAdmission::new(None)).unwrap();

        assert_eq!(indices(&result), vec![1]);
        assert_eq!(state.waiting_outside(Priority::Low).len(), 1);
        assert!(!state.get_customer(0).unwrap().waited_outside());
    }

    #[test]
    fn test_admitted_carry_finalized_wait() {
        let mut state = state_with_outside(2, 0);
        state.advance_timers(1.5);
        let policy = CappedAdmission::new(Some(1));

        let first = admit_waiting(&mut state, Priority::Low, &policy).unwrap();
        assert_eq!(
            first.admitted,
            vec![Admitted {
                arrival_index: 0,
                wait_time_to_enter: 1.5,
            }]
        );
        assert_eq!(state.get_customer(0).unwrap().wait_time_to_enter(), Some(1.5));
        assert_eq!(state.get_customer(1).unwrap().wait_time_to_enter(), None);
    }
}
