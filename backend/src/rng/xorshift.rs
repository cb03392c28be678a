//! xorshift64* random number generator
//!
//! This is a fast, high-quality PRNG that is deterministic and suitable
//! for simulation purposes.
//!
//! # Algorithm
//!
//! xorshift64* is a variant of xorshift that passes TestU01's BigCrush
//! statistical tests. It uses 64-bit state and produces 64-bit output.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. This is CRITICAL for:
//! - Debugging (reproduce exact simulation)
//! - Testing (verify behavior)
//! - Research (validate results)

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use facility_sim_core::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let arrivals = rng.poisson(1.5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// # Arguments
    /// * `seed` - Initial seed value (u64)
    ///
    /// # Example
    /// ```
    /// use facility_sim_core::RngManager;
    ///
    /// let rng = RngManager::new(12345);
    /// ```
    pub fn new(seed: u64) -> Self {
        // Ensure seed is never zero (xorshift requirement)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    ///
    /// This advances the internal state and returns a random value.
    ///
    /// # Example
    /// ```
    /// use facility_sim_core::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let value = rng.next();
    /// ```
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Get current RNG state (to resume the stream elsewhere)
    ///
    /// # Example
    /// ```
    /// use facility_sim_core::RngManager;
    ///
    /// let rng = RngManager::new(12345);
    /// let state = rng.get_state();
    ///
    /// // Later, can recreate RNG from this state
    /// let rng2 = RngManager::new(state);
    /// ```
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    ///
    /// Useful for sampling from probability distributions.
    ///
    /// # Example
    /// ```
    /// use facility_sim_core::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// let probability = rng.next_f64();
    /// assert!(probability >= 0.0 && probability < 1.0);
    /// ```
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Convert to [0.0, 1.0) by dividing by 2^64
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Sample a count from a Poisson distribution with mean `lambda`
    ///
    /// Uses Knuth's multiplication method. Large means are split into
    /// chunks of at most [`Self::POISSON_CHUNK`] and the partial counts summed,
    /// which keeps `exp(-lambda)` well away from underflow.
    ///
    /// Non-positive or non-finite `lambda` yields 0 without consuming randomness.
    ///
    /// # Example
    /// ```
    /// use facility_sim_core::RngManager;
    ///
    /// let mut rng = RngManager::new(12345);
    /// assert_eq!(rng.poisson(0.0), 0);
    /// let _arrivals = rng.poisson(2.5);
    /// ```
    pub fn poisson(&mut self, lambda: f64) -> u64 {
        if !(lambda > 0.0) || !lambda.is_finite() {
            return 0;
        }

        let mut remaining = lambda;
        let mut count = 0;
        while remaining > 0.0 {
            let chunk = remaining.min(Self::POISSON_CHUNK);
            remaining -= chunk;

            let threshold = (-chunk).exp();
            let mut product = self.next_f64();
            while product > threshold {
                count += 1;
                product *= self.next_f64();
            }
        }
        count
    }

    /// Largest mean sampled in a single Knuth pass by [`Self::poisson`]
    pub const POISSON_CHUNK: f64 = 30.0;

    /// Bernoulli trial: `true` with probability `p`
    ///
    /// Always draws exactly one value so the stream position does not depend
    /// on `p`. `p <= 0` is always false, `p >= 1` always true.
    pub fn bernoulli(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}
