//! Capped admission
//!
//! Admits customers while the facility holds fewer than `max_total_admitted`.
//! With no cap every waiting customer is admitted immediately.

use super::AdmissionPolicy;
use serde::{Deserialize, Serialize};

/// Global admission cap
///
/// # Example
///
/// ```
/// use facility_sim_core::policy::{AdmissionPolicy, CappedAdmission};
///
/// let policy = CappedAdmission::new(Some(5));
/// assert_eq!(policy.quota(3, 10), 2);
/// assert_eq!(policy.quota(7, 10), 0);
///
/// let unbounded = CappedAdmission::new(None);
/// assert_eq!(unbounded.quota(1_000, 10), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CappedAdmission {
    max_total_admitted: Option<usize>,
}

impl CappedAdmission {
    pub fn new(max_total_admitted: Option<usize>) -> Self {
        Self { max_total_admitted }
    }

    pub fn max_total_admitted(&self) -> Option<usize> {
        self.max_total_admitted
    }
}

impl AdmissionPolicy for CappedAdmission {
    fn quota(&self, admitted_now: usize, waiting: usize) -> usize {
        match self.max_total_admitted {
            // Saturating: an over-full facility admits nobody
            Some(cap) => cap.saturating_sub(admitted_now).min(waiting),
            None => waiting,
        }
    }
}
