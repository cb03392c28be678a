//! Statistics collection
//!
//! The orchestrator produces two record streams:
//! - one [`CustomerRecord`] per customer, emitted when it leaves
//! - one [`TickRecord`] per tick, snapshotted after admission and before
//!   server assignment
//!
//! Records go to a [`StatisticsSink`]. [`StatisticsCollector`] keeps them in
//! memory; the `summary` submodule turns them into run-level statistics.

pub mod summary;

pub use summary::{PrioritySummary, RunSummary};

use crate::models::customer::{Customer, CustomerId, Priority};
use serde::{Deserialize, Serialize};

/// Lifetime outcome of one departed customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub arrival_index: CustomerId,
    pub priority: Priority,
    pub wait_time_to_enter: f64,
    /// Sum over all needy episodes
    pub wait_time_to_be_served: f64,
    /// Sum over all service episodes
    pub served_time: f64,
    /// Sum over all content episodes
    pub content_time: f64,
    pub waited_outside: bool,
    pub waited_inside: bool,
    /// Completed service episodes
    pub num_cycles: usize,
    pub departure_tick: usize,
}

impl CustomerRecord {
    /// Summarize a departed customer
    pub fn from_customer(customer: &Customer, departure_tick: usize) -> Self {
        Self {
            arrival_index: customer.arrival_index(),
            priority: customer.priority(),
            wait_time_to_enter: customer.wait_time_to_enter().unwrap_or_default(),
            wait_time_to_be_served: customer.wait_times_to_be_served().iter().sum(),
            served_time: customer.served_times().iter().sum(),
            content_time: customer.content_times().iter().sum(),
            waited_outside: customer.waited_outside(),
            waited_inside: customer.waited_inside(),
            num_cycles: customer.num_cycles(),
            departure_tick,
        }
    }
}

/// Facility snapshot taken once per tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: usize,
    pub needy_queue_length: usize,
    pub free_servers: usize,
    pub cumulative_arrivals: usize,
    pub cumulative_departures: usize,
}

/// Consumer of the two record streams
pub trait StatisticsSink {
    fn record_customer(&mut self, record: CustomerRecord);
    fn record_tick(&mut self, record: TickRecord);
}

/// In-memory sink
#[derive(Debug, Clone, Default)]
pub struct StatisticsCollector {
    customers: Vec<CustomerRecord>,
    ticks: Vec<TickRecord>,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Customer records in departure order
    pub fn customers(&self) -> &[CustomerRecord] {
        &self.customers
    }

    /// Tick records in tick order
    pub fn ticks(&self) -> &[TickRecord] {
        &self.ticks
    }

    pub fn num_departures(&self) -> usize {
        self.customers.len()
    }

    /// Summarize everything recorded so far, skipping the burn-in prefix
    pub fn summary(&self, num_burnin: usize) -> RunSummary {
        RunSummary::from_records(&self.customers, &self.ticks, num_burnin)
    }
}

impl StatisticsSink for StatisticsCollector {
    fn record_customer(&mut self, record: CustomerRecord) {
        self.customers.push(record);
    }

    fn record_tick(&mut self, record: TickRecord) {
        self.ticks.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::CustomerParams;

    #[test]
    fn test_record_sums_every_episode() {
        let params = CustomerParams {
            prob_stay: 1.0,
            mu: 1.0,
            delta: 0.5,
        };
        let mut customer = Customer::new(7, Priority::Low, params);
        customer.tick(2.0);
        customer.mark_waited_outside();
        customer.admit().unwrap();

        // Two service episodes separated by one content episode
        customer.start_service(0, 1, 2).unwrap();
        customer.tick(1.0);
        customer.complete_service(true, 1).unwrap();
        customer.tick(0.5);
        customer.complete_content().unwrap();
        customer.tick(0.25);
        customer.start_service(1, 2, 2).unwrap();
        customer.tick(2.0);
        customer.complete_service(false, 0).unwrap();

        let record = CustomerRecord::from_customer(&customer, 12);
        assert_eq!(record.arrival_index, 7);
        assert_eq!(record.wait_time_to_enter, 2.0);
        assert_eq!(record.wait_time_to_be_served, 0.25);
        assert_eq!(record.served_time, 3.0);
        assert_eq!(record.content_time, 0.5);
        assert_eq!(record.num_cycles, 2);
        assert!(record.waited_outside);
        assert!(!record.waited_inside);
        assert_eq!(record.departure_tick, 12);
    }

    #[test]
    fn test_collector_keeps_order() {
        let mut collector = StatisticsCollector::new();
        for tick in 0..3 {
            collector.record_tick(TickRecord {
                tick,
                needy_queue_length: 0,
                free_servers: 1,
                cumulative_arrivals: tick,
                cumulative_departures: 0,
            });
        }
        let ticks: Vec<usize> = collector.ticks().iter().map(|t| t.tick).collect();
        assert_eq!(ticks, vec![0, 1, 2]);
        assert_eq!(collector.num_departures(), 0);
    }
}
