//! Arrival generation module for deterministic customer creation.
//!
//! Each tick draws independent Poisson counts of low- and high-priority
//! arrivals and creates one customer per unit. All generation is
//! deterministic given the RNG seed.
//!
//! # Key Principles
//!
//! 1. **Determinism**: Same seed + same config → same arrivals
//! 2. **Single Counter**: One arrival index sequence shared by both priorities,
//!    never reset and never reused
//! 3. **Budget Gate**: Draws happen only while fewer than the configured
//!    budget have been created; a tick's draw is always created in full
//!
//! # Example
//!
//! ```
//! use facility_sim_core::arrivals::{ArrivalConfig, ArrivalGenerator};
//! use facility_sim_core::{CustomerParams, RngManager};
//!
//! let mut rng = RngManager::new(42);
//! let config = ArrivalConfig {
//!     lambda_low: 0.5,
//!     lambda_high: 0.25,
//!     max_total_arrivals: 100,
//! };
//! let params = CustomerParams { prob_stay: 0.2, mu: 1.0, delta: 0.5 };
//! let mut generator = ArrivalGenerator::new(config, params);
//!
//! let batch = generator.generate(&mut rng);
//! assert_eq!(generator.total_created(), batch.len());
//! ```

use crate::models::customer::{Customer, CustomerParams, Priority};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Configuration for customer arrivals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrivalConfig {
    /// Expected low-priority arrivals per tick (Poisson λ)
    pub lambda_low: f64,

    /// Expected high-priority arrivals per tick (Poisson λ)
    pub lambda_high: f64,

    /// Arrivals are drawn while fewer than this many customers exist
    pub max_total_arrivals: usize,
}

/// Customers created in one tick, split by priority
#[derive(Debug, Clone, Default)]
pub struct ArrivalBatch {
    pub low: Vec<Customer>,
    pub high: Vec<Customer>,
}

impl ArrivalBatch {
    pub fn len(&self) -> usize {
        self.low.len() + self.high.len()
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_empty() && self.high.is_empty()
    }
}

/// Generator for customer arrivals
///
/// Owns the arrival-index counter; the orchestrator owns the generator.
#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    config: ArrivalConfig,

    /// Behavioral parameters stamped on every new customer
    params: CustomerParams,

    /// Next arrival index (also the number of customers created so far)
    next_arrival_index: usize,
}

impl ArrivalGenerator {
    pub fn new(config: ArrivalConfig, params: CustomerParams) -> Self {
        Self {
            config,
            params,
            next_arrival_index: 0,
        }
    }

    /// Number of customers created so far
    pub fn total_created(&self) -> usize {
        self.next_arrival_index
    }

    /// True once at least `max_total_arrivals` customers were created
    pub fn is_exhausted(&self) -> bool {
        self.next_arrival_index >= self.config.max_total_arrivals
    }

    pub fn config(&self) -> &ArrivalConfig {
        &self.config
    }

    /// Generate this tick's arrivals.
    ///
    /// Draws the low count, then the high count, and creates every drawn
    /// unit even when that takes the total past `max_total_arrivals`.
    /// Low-priority customers receive their indices before high-priority ones.
    ///
    /// Returns an empty batch without touching the RNG once exhausted.
    pub fn generate(&mut self, rng: &mut RngManager) -> ArrivalBatch {
        if self.is_exhausted() {
            return ArrivalBatch::default();
        }

        let n_low = rng.poisson(self.config.lambda_low) as usize;
        let n_high = rng.poisson(self.config.lambda_high) as usize;

        let low = (0..n_low).map(|_| self.create(Priority::Low)).collect();
        let high = (0..n_high).map(|_| self.create(Priority::High)).collect();

        ArrivalBatch { low, high }
    }

    fn create(&mut self, priority: Priority) -> Customer {
        let customer = Customer::new(self.next_arrival_index, priority, self.params);
        self.next_arrival_index += 1;
        customer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CustomerParams {
        CustomerParams {
            prob_stay: 0.0,
            mu: 1.0,
            delta: 1.0,
        }
    }

    #[test]
    fn test_generator_starts_at_zero() {
        let generator = ArrivalGenerator::new(
            ArrivalConfig {
                lambda_low: 1.0,
                lambda_high: 1.0,
                max_total_arrivals: 10,
            },
            params(),
        );

        assert_eq!(generator.total_created(), 0);
        assert!(!generator.is_exhausted());
    }

    #[test]
    fn test_zero_budget_draws_nothing() {
        let mut generator = ArrivalGenerator::new(
            ArrivalConfig {
                lambda_low: 5.0,
                lambda_high: 5.0,
                max_total_arrivals: 0,
            },
            params(),
        );
        let mut rng = RngManager::new(1);
        let before = rng.get_state();

        assert!(generator.generate(&mut rng).is_empty());
        assert_eq!(rng.get_state(), before);
    }

    #[test]
    fn test_draw_past_budget_is_created_in_full() {
        let mut generator = ArrivalGenerator::new(
            ArrivalConfig {
                lambda_low: 5.0,
                lambda_high: 5.0,
                max_total_arrivals: 1,
            },
            params(),
        );
        let mut rng = RngManager::new(3);
        let mut replay = rng.clone();
        let expected_low = replay.poisson(5.0) as usize;
        let expected_high = replay.poisson(5.0) as usize;

        let batch = generator.generate(&mut rng);
        assert_eq!(batch.low.len(), expected_low);
        assert_eq!(batch.high.len(), expected_high);
        assert_eq!(generator.total_created(), expected_low + expected_high);
        assert_eq!(rng.get_state(), replay.get_state());

        assert!(generator.total_created() > 1);
        assert!(generator.is_exhausted());

        let after = rng.get_state();
        assert!(generator.generate(&mut rng).is_empty());
        assert_eq!(rng.get_state(), after);
    }

    #[test]
    fn test_large_draw_overshoots_budget() {
        let mut generator = ArrivalGenerator::new(
            ArrivalConfig {
                lambda_low: 40.0,
                lambda_high: 40.0,
                max_total_arrivals: 3,
            },
            params(),
        );
        let mut rng = RngManager::new(9);

        let batch = generator.generate(&mut rng);
        assert!(batch.len() > 3);
        assert!(!batch.low.is_empty());
        assert_eq!(generator.total_created(), batch.len());
        assert!(generator.is_exhausted());
        assert!(generator.generate(&mut rng).is_empty());
    }
}
