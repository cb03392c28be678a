//! Time management for the simulation
//!
//! The simulation operates in discrete ticks of fixed size `dt`.
//! There is no next-event jumping: every tick advances the clock by exactly `dt`.

use serde::{Deserialize, Serialize};

/// Manages simulation time in discrete ticks of fixed size
///
/// # Example
/// ```
/// use facility_sim_core::TimeManager;
///
/// let mut time = TimeManager::new(0.5);
/// assert_eq!(time.current_tick(), 0);
///
/// time.advance_tick();
/// time.advance_tick();
/// assert_eq!(time.current_tick(), 2);
/// assert_eq!(time.elapsed(), 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeManager {
    /// Total ticks elapsed since simulation start
    current_tick: usize,
    /// Simulated duration of one tick
    dt: f64,
}

impl TimeManager {
    /// Create a new TimeManager
    ///
    /// # Arguments
    /// * `dt` - Simulated duration of one tick
    ///
    /// # Panics
    /// Panics if `dt` is not a positive finite number. Configuration
    /// validation rejects such values before a TimeManager is built.
    pub fn new(dt: f64) -> Self {
        assert!(dt > 0.0 && dt.is_finite(), "dt must be positive");
        Self { current_tick: 0, dt }
    }

    /// Advance time by one tick
    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }

    /// Get the current tick (total ticks since start)
    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    /// Get the tick size
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulated time elapsed since start (`current_tick * dt`)
    pub fn elapsed(&self) -> f64 {
        self.current_tick as f64 * self.dt
    }
}
