//! Run-level statistics
//!
//! Blocking probabilities, delay probabilities and mean waits per priority
//! class, plus time-averaged queue length and idle servers. The first
//! `num_burnin` customers, and the ticks before all of them had arrived, are
//! excluded to remove start-up bias.

use super::{CustomerRecord, TickRecord};
use crate::models::customer::Priority;
use serde::{Deserialize, Serialize};

/// Statistics over one group of customers
///
/// Ratios and means are `None` for an empty group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrioritySummary {
    pub count: usize,
    /// Fraction ever blocked outside
    pub prob_delay_outside: Option<f64>,
    /// Fraction that ever queued inside
    pub prob_delay_inside: Option<f64>,
    /// Fraction never delayed at all
    pub prob_no_delay: Option<f64>,
    pub mean_wait_to_enter: Option<f64>,
    pub mean_wait_to_be_served: Option<f64>,
    pub mean_served_time: Option<f64>,
}

impl PrioritySummary {
    fn from_records<'a>(records: impl Iterator<Item = &'a CustomerRecord>) -> Self {
        let mut count = 0usize;
        let mut outside = 0usize;
        let mut inside = 0usize;
        let mut no_delay = 0usize;
        let mut wait_enter = 0.0;
        let mut wait_served = 0.0;
        let mut served = 0.0;

        for r in records {
            count += 1;
            outside += usize::from(r.waited_outside);
            inside += usize::from(r.waited_inside);
            no_delay += usize::from(!r.waited_outside && !r.waited_inside);
            wait_enter += r.wait_time_to_enter;
            wait_served += r.wait_time_to_be_served;
            served += r.served_time;
        }

        let ratio = |n: usize| (count > 0).then(|| n as f64 / count as f64);
        let mean = |total: f64| (count > 0).then(|| total / count as f64);

        Self {
            count,
            prob_delay_outside: ratio(outside),
            prob_delay_inside: ratio(inside),
            prob_no_delay: ratio(no_delay),
            mean_wait_to_enter: mean(wait_enter),
            mean_wait_to_be_served: mean(wait_served),
            mean_served_time: mean(served),
        }
    }
}

/// Statistics for a whole run
///
/// # Example
///
/// ```
/// use facility_sim_core::stats::{CustomerRecord, RunSummary};
/// use facility_sim_core::Priority;
///
/// let record = CustomerRecord {
///     arrival_index: 0,
///     priority: Priority::High,
///     wait_time_to_enter: 0.0,
///     wait_time_to_be_served: 0.0,
///     served_time: 1.0,
///     content_time: 0.0,
///     waited_outside: false,
///     waited_inside: false,
///     num_cycles: 1,
///     departure_tick: 1,
/// };
///
/// let summary = RunSummary::from_records(&[record], &[], 0);
/// assert_eq!(summary.high.prob_no_delay, Some(1.0));
/// assert_eq!(summary.low.count, 0);
/// assert_eq!(summary.mean_needy_queue_length, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub num_burnin: usize,
    pub overall: PrioritySummary,
    pub low: PrioritySummary,
    pub high: PrioritySummary,
    /// Ticks counted after burn-in
    pub num_ticks: usize,
    pub mean_needy_queue_length: Option<f64>,
    pub mean_free_servers: Option<f64>,
}

impl RunSummary {
    pub fn from_records(customers: &[CustomerRecord], ticks: &[TickRecord], num_burnin: usize) -> Self {
        let kept: Vec<&CustomerRecord> = customers
            .iter()
            .filter(|r| r.arrival_index >= num_burnin)
            .collect();
        let by_priority = |p: Priority| {
            PrioritySummary::from_records(kept.iter().copied().filter(move |r| r.priority == p))
        };

        let kept_ticks: Vec<&TickRecord> = ticks
            .iter()
            .filter(|t| t.cumulative_arrivals >= num_burnin)
            .collect();
        let num_ticks = kept_ticks.len();
        let tick_mean = |f: fn(&TickRecord) -> usize| {
            (num_ticks > 0)
                .then(|| kept_ticks.iter().map(|t| f(t) as f64).sum::<f64>() / num_ticks as f64)
        };

        Self {
            num_burnin,
            overall: PrioritySummary::from_records(kept.iter().copied()),
            low: by_priority(Priority::Low),
            high: by_priority(Priority::High),
            num_ticks,
            mean_needy_queue_length: tick_mean(|t| t.needy_queue_length),
            mean_free_servers: tick_mean(|t| t.free_servers),
        }
    }
}
