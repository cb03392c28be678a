//! Orchestrator Engine
//!
//! Main simulation loop integrating all components:
//! - Customer arrivals (deterministic Poisson generation)
//! - Admission control (priority order, global cap)
//! - Server assignment (FIFO, congestion-scaled service time)
//! - Service and content completion
//! - Statistics and event logging
//!
//! # Architecture
//!
//! ```text
//! For each tick t:
//! 1. Generate arrivals (while the arrival budget lasts)
//! 2. Admit high priority, then low priority
//! 3. Snapshot per-tick statistics
//! 4. Assign needy customers to free servers
//! 5. Mark customers still needy as waited-inside
//! 6. Complete services (leave or become content)
//! 7. Complete contents (back to the needy queue)
//! 8. Check invariants, evaluate termination
//! 9. If still running, advance every customer's timer and the clock
//! ```
//!
//! The order is part of the model: high priority is always admitted before
//! low priority, and statistics are snapshotted before assignment shortens
//! the needy queue.
//!
//! # Example
//!
//! ```rust
//! use facility_sim_core::orchestrator::{FacilityConfig, Orchestrator};
//!
//! let config = FacilityConfig {
//!     servers_num: 2,
//!     max_total_arrivals: 20,
//!     max_total_admitted: Some(5),
//!     poisson_lambda_low_priority: 0.5,
//!     poisson_lambda_high_priority: 0.25,
//!     mu: 1.0,
//!     delta: 0.5,
//!     prob_stay: 0.3,
//!     dt: 0.5,
//!     num_burnin: 0,
//!     rng_seed: 12345,
//!     run_id: "example".to_string(),
//! };
//!
//! let mut orchestrator = Orchestrator::new(config).unwrap();
//! orchestrator.run().unwrap();
//!
//! assert!(orchestrator.is_terminated());
//! assert!(orchestrator.total_arrivals() >= 20);
//! assert_eq!(orchestrator.statistics().num_departures(), orchestrator.total_arrivals());
//! ```

use crate::arrivals::{ArrivalConfig, ArrivalGenerator};
use crate::core::time::TimeManager;
use crate::models::customer::{CustomerError, CustomerId, CustomerParams, Priority};
use crate::models::event::{Event, EventLog};
use crate::models::state::FacilityState;
use crate::policy::{admit_waiting, CappedAdmission};
use crate::rng::RngManager;
use crate::service::{assign_needy, complete_contents, complete_services, mark_waiting_inside};
use crate::stats::{CustomerRecord, RunSummary, StatisticsCollector, StatisticsSink, TickRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, trace};

// ============================================================================
// Configuration
// ============================================================================

fn default_run_id() -> String {
    "run".to_string()
}

/// Complete facility configuration
///
/// Field names follow the JSON configuration files read by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityConfig {
    /// Number of servers (must be > 0)
    pub servers_num: usize,

    /// Total number of customers created over the run
    pub max_total_arrivals: usize,

    /// Cap on `|needy| + |served| + |content|`; `None` means unbounded
    #[serde(default)]
    pub max_total_admitted: Option<usize>,

    /// Expected low-priority arrivals per tick
    pub poisson_lambda_low_priority: f64,

    /// Expected high-priority arrivals per tick
    pub poisson_lambda_high_priority: f64,

    /// Service time scale
    pub mu: f64,

    /// Content time scale
    pub delta: f64,

    /// Probability of staying after a service episode
    pub prob_stay: f64,

    /// Tick size
    pub dt: f64,

    /// Customers excluded from summary statistics
    #[serde(default)]
    pub num_burnin: usize,

    /// RNG seed for deterministic simulation
    #[serde(default)]
    pub rng_seed: u64,

    /// Label used for output files
    #[serde(default = "default_run_id")]
    pub run_id: String,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            servers_num: 1,
            max_total_arrivals: 100,
            max_total_admitted: None,
            poisson_lambda_low_priority: 0.5,
            poisson_lambda_high_priority: 0.5,
            mu: 1.0,
            delta: 1.0,
            prob_stay: 0.0,
            dt: 1.0,
            num_burnin: 0,
            rng_seed: 0,
            run_id: default_run_id(),
        }
    }
}

impl FacilityConfig {
    /// Reject configurations that make progress or termination impossible
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.servers_num == 0 {
            return Err(SimulationError::InvalidConfig(
                "servers_num must be > 0".to_string(),
            ));
        }

        if self.max_total_admitted == Some(0) {
            return Err(SimulationError::InvalidConfig(
                "max_total_admitted must be > 0 or null".to_string(),
            ));
        }

        for (name, rate) in [
            ("poisson_lambda_low_priority", self.poisson_lambda_low_priority),
            ("poisson_lambda_high_priority", self.poisson_lambda_high_priority),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} must be finite and >= 0, got {}",
                    name, rate
                )));
            }
        }

        for (name, value) in [("mu", self.mu), ("delta", self.delta), ("dt", self.dt)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimulationError::InvalidConfig(format!(
                    "{} must be finite and > 0, got {}",
                    name, value
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.prob_stay) {
            return Err(SimulationError::InvalidConfig(format!(
                "prob_stay must be in [0, 1], got {}",
                self.prob_stay
            )));
        }

        Ok(())
    }

    pub fn customer_params(&self) -> CustomerParams {
        CustomerParams {
            prob_stay: self.prob_stay,
            mu: self.mu,
            delta: self.delta,
        }
    }

    pub fn arrival_config(&self) -> ArrivalConfig {
        ArrivalConfig {
            lambda_low: self.poisson_lambda_low_priority,
            lambda_high: self.poisson_lambda_high_priority,
            max_total_arrivals: self.max_total_arrivals,
        }
    }
}

// ============================================================================
// Errors and Results
// ============================================================================

/// Simulation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Configuration validation error
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A container or server refers to a customer missing from the arena
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// A component asked a customer for a transition its state forbids
    #[error("Invalid transition: {0}")]
    InvalidTransition(#[from] CustomerError),

    /// End-of-tick structural check failed
    #[error("Invariant violated at tick {tick}: {detail}")]
    InvariantViolation { tick: usize, detail: String },
}

/// Result of a single tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    /// Tick number
    pub tick: usize,

    /// Customers created this tick
    pub num_arrivals: usize,

    pub num_admitted_high: usize,
    pub num_admitted_low: usize,

    /// Customers left outside that were blocked for the first time
    pub num_newly_blocked: usize,

    /// Needy customers placed on servers
    pub num_assignments: usize,

    pub num_services_completed: usize,

    /// Customers that left the facility
    pub num_departures: usize,

    pub num_contents_completed: usize,

    /// Whether the run ended on this tick (or earlier)
    pub terminated: bool,
}

/// How a bounded run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// The termination predicate held
    Terminated,
    /// The tick limit was reached first
    TickLimitReached,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Main orchestrator managing facility state and the tick loop
///
/// # Determinism
///
/// All randomness is via `rng_manager` with seeded xorshift64*.
/// Same seed + same config = identical results (deterministic replay).
pub struct Orchestrator {
    config: FacilityConfig,

    /// Facility state (customers, containers, servers)
    state: FacilityState,

    /// Time management
    time_manager: TimeManager,

    /// Deterministic RNG
    rng_manager: RngManager,

    /// Owns the arrival-index counter
    arrival_generator: ArrivalGenerator,

    admission: CappedAdmission,

    /// Customer and tick record streams
    stats: StatisticsCollector,

    /// Event log (all simulation events)
    event_log: EventLog,

    terminated: bool,

    /// First error returned by a tick; the run cannot continue after it
    failure: Option<SimulationError>,
}

impl Orchestrator {
    /// Create new orchestrator from configuration
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::InvalidConfig` if validation fails. No tick
    /// runs in that case.
    pub fn new(config: FacilityConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let state = FacilityState::new(config.servers_num);
        let time_manager = TimeManager::new(config.dt);
        let rng_manager = RngManager::new(config.rng_seed);
        let arrival_generator =
            ArrivalGenerator::new(config.arrival_config(), config.customer_params());
        let admission = CappedAdmission::new(config.max_total_admitted);

        debug!(
            run_id = %config.run_id,
            servers = config.servers_num,
            max_total_arrivals = config.max_total_arrivals,
            max_total_admitted = ?config.max_total_admitted,
            seed = config.rng_seed,
            "orchestrator created"
        );

        Ok(Self {
            config,
            state,
            time_manager,
            rng_manager,
            arrival_generator,
            admission,
            stats: StatisticsCollector::new(),
            event_log: EventLog::new(),
            terminated: false,
            failure: None,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &FacilityConfig {
        &self.config
    }

    /// Get current tick number
    pub fn current_tick(&self) -> usize {
        self.time_manager.current_tick()
    }

    /// Simulated time elapsed (`current_tick * dt`)
    pub fn elapsed_time(&self) -> f64 {
        self.time_manager.elapsed()
    }

    /// Get reference to facility state
    pub fn state(&self) -> &FacilityState {
        &self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// The error that stopped the run, if a tick failed
    pub fn failure(&self) -> Option<&SimulationError> {
        self.failure.as_ref()
    }

    /// Customers created so far
    pub fn total_arrivals(&self) -> usize {
        self.arrival_generator.total_created()
    }

    pub fn statistics(&self) -> &StatisticsCollector {
        &self.stats
    }

    /// Run summary with the configured burn-in applied
    pub fn summary(&self) -> RunSummary {
        self.stats.summary(self.config.num_burnin)
    }

    /// Get total events logged
    pub fn event_count(&self) -> usize {
        self.event_log.len()
    }

    /// Get reference to event log
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    fn log_event(&mut self, event: Event) {
        self.event_log.log(event);
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    /// Execute one simulation tick
    ///
    /// Once terminated, further calls change nothing and return a result
    /// with `terminated` set.
    ///
    /// # Errors
    ///
    /// Returns an error if a structural invariant fails. The facility is left
    /// as it was when the failure was detected and the orchestrator is marked
    /// failed: every later call returns the same error without running.
    pub fn tick(&mut self) -> Result<TickResult, SimulationError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        let result = self.run_tick();
        if let Err(e) = &result {
            error!(tick = self.current_tick(), error = %e, "tick failed");
            self.failure = Some(e.clone());
        }
        result
    }

    fn run_tick(&mut self) -> Result<TickResult, SimulationError> {
        let current_tick = self.current_tick();
        let mut result = TickResult {
            tick: current_tick,
            ..TickResult::default()
        };

        if self.terminated {
            result.terminated = true;
            return Ok(result);
        }

        // STEP 1: ARRIVALS
        if !self.arrival_generator.is_exhausted() {
            let batch = self.arrival_generator.generate(&mut self.rng_manager);
            result.num_arrivals = batch.len();

            for customer in batch.low.into_iter().chain(batch.high) {
                self.log_event(Event::Arrival {
                    tick: current_tick,
                    arrival_index: customer.arrival_index(),
                    priority: customer.priority(),
                });
                self.state.add_arrival(customer);
            }

            if result.num_arrivals > 0 {
                debug!(
                    tick = current_tick,
                    arrivals = result.num_arrivals,
                    total = self.arrival_generator.total_created(),
                    "arrivals"
                );
            }
        }

        // STEP 2: ADMISSION (high priority first)
        for priority in [Priority::High, Priority::Low] {
            let admission = admit_waiting(&mut self.state, priority, &self.admission)?;

            for admitted in &admission.admitted {
                self.log_event(Event::Admission {
                    tick: current_tick,
                    arrival_index: admitted.arrival_index,
                    priority,
                    wait_time_to_enter: admitted.wait_time_to_enter,
                });
            }

            match priority {
                Priority::High => result.num_admitted_high = admission.admitted.len(),
                Priority::Low => result.num_admitted_low = admission.admitted.len(),
            }
            result.num_newly_blocked += admission.newly_blocked;

            if !admission.admitted.is_empty() || admission.still_waiting > 0 {
                debug!(
                    tick = current_tick,
                    %priority,
                    admitted = admission.admitted.len(),
                    newly_blocked = admission.newly_blocked,
                    still_waiting = admission.still_waiting,
                    "admission"
                );
            }
        }

        // STEP 3: PER-TICK STATISTICS
        self.stats.record_tick(TickRecord {
            tick: current_tick,
            needy_queue_length: self.state.needy().len(),
            free_servers: self.state.free_servers(),
            cumulative_arrivals: self.arrival_generator.total_created(),
            cumulative_departures: self.stats.num_departures(),
        });

        // STEP 4: SERVER ASSIGNMENT
        let assignments = assign_needy(&mut self.state)?;
        result.num_assignments = assignments.len();
        for assignment in assignments {
            debug!(
                tick = current_tick,
                customer = assignment.arrival_index,
                server = assignment.server,
                service_time = assignment.service_time_needed,
                "service started"
            );
            self.log_event(Event::ServiceStart {
                tick: current_tick,
                arrival_index: assignment.arrival_index,
                server: assignment.server,
                service_time_needed: assignment.service_time_needed,
            });
        }

        // STEP 5: WAITED-INSIDE FLAGS
        mark_waiting_inside(&mut self.state)?;

        // STEP 6: SERVICE COMPLETION
        let completion = complete_services(&mut self.state, &mut self.rng_manager)?;
        result.num_services_completed = completion.completed.len();
        result.num_departures = completion.departed.len();

        for detail in completion.completed {
            self.log_event(Event::ServiceComplete {
                tick: current_tick,
                arrival_index: detail.arrival_index,
                server: detail.server,
                served_time: detail.served_time,
            });
            if let Some(content_time_needed) = detail.content_time_needed {
                debug!(
                    tick = current_tick,
                    customer = detail.arrival_index,
                    content_time = content_time_needed,
                    "customer stayed"
                );
                self.log_event(Event::ContentStart {
                    tick: current_tick,
                    arrival_index: detail.arrival_index,
                    content_time_needed,
                });
            }
        }

        for customer in completion.departed {
            debug!(
                tick = current_tick,
                customer = customer.arrival_index(),
                cycles = customer.num_cycles(),
                "customer left"
            );
            self.log_event(Event::Departure {
                tick: current_tick,
                arrival_index: customer.arrival_index(),
                priority: customer.priority(),
            });
            self.stats
                .record_customer(CustomerRecord::from_customer(&customer, current_tick));
        }

        // STEP 7: CONTENT COMPLETION
        let finished = complete_contents(&mut self.state)?;
        result.num_contents_completed = finished.len();
        for detail in finished {
            self.log_event(Event::ContentComplete {
                tick: current_tick,
                arrival_index: detail.arrival_index,
                content_time: detail.content_time,
            });
        }

        // STEP 8: INVARIANTS AND TERMINATION
        self.state
            .check_invariants(self.config.max_total_admitted)
            .map_err(|detail| SimulationError::InvariantViolation {
                tick: current_tick,
                detail,
            })?;

        trace!(
            tick = current_tick,
            waiting_low = self.state.waiting_outside(Priority::Low).len(),
            waiting_high = self.state.waiting_outside(Priority::High).len(),
            needy = self.state.needy().len(),
            served = self.state.served().len(),
            content = self.state.content().len(),
            "end of tick"
        );

        if self.arrival_generator.is_exhausted() && self.state.is_empty() {
            self.terminated = true;
            result.terminated = true;
            info!(
                tick = current_tick,
                arrivals = self.arrival_generator.total_created(),
                departures = self.stats.num_departures(),
                "simulation terminated"
            );
            return Ok(result);
        }

        // STEP 9: ADVANCE TIME
        self.state.advance_timers(self.time_manager.dt());
        self.time_manager.advance_tick();

        Ok(result)
    }

    /// Tick until the termination predicate holds
    ///
    /// There is no tick limit. A configuration where customers keep staying
    /// under unbounded admission may never return; use [`Self::run_for`] to
    /// guard against that.
    pub fn run(&mut self) -> Result<(), SimulationError> {
        while !self.terminated {
            self.tick()?;
        }
        Ok(())
    }

    /// Tick until termination or until `max_ticks` more ticks have run
    pub fn run_for(&mut self, max_ticks: usize) -> Result<RunOutcome, SimulationError> {
        for _ in 0..max_ticks {
            if self.terminated {
                break;
            }
            self.tick()?;
        }

        if self.terminated {
            Ok(RunOutcome::Terminated)
        } else {
            info!(
                tick = self.current_tick(),
                max_ticks,
                waiting_outside = self.state.num_waiting_outside(),
                admitted = self.state.num_admitted(),
                "tick limit reached before termination"
            );
            Ok(RunOutcome::TickLimitReached)
        }
    }
}

// Manual Debug implementation (keeps output short)
impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("run_id", &self.config.run_id)
            .field("current_tick", &self.current_tick())
            .field("total_arrivals", &self.total_arrivals())
            .field("num_customers", &self.state.num_customers())
            .field("departures", &self.stats.num_departures())
            .field("event_count", &self.event_count())
            .field("terminated", &self.terminated)
            .field("failed", &self.failure.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
