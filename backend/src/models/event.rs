//! Event logging for auditing a simulation run.
//!
//! This module defines the Event enum which captures every customer state
//! change during a run. Events enable:
//! - Debugging (understand what happened and when)
//! - Auditing (durations recorded on customers match completions logged here)
//! - Analysis (extract per-tick activity without re-running)
//!
//! # Event Types
//!
//! Events follow the customer lifecycle:
//! - **Arrival**: New customer created, waiting outside
//! - **Admission**: Customer entered the needy queue
//! - **ServiceStart / ServiceComplete**: Service episode on a server
//! - **ContentStart / ContentComplete**: Content episode
//! - **Departure**: Customer left the facility
//!
//! # Example
//!
//! ```rust
//! use facility_sim_core::models::Event;
//! use facility_sim_core::Priority;
//!
//! let event = Event::Arrival {
//!     tick: 10,
//!     arrival_index: 42,
//!     priority: Priority::High,
//! };
//!
//! println!("Event at tick {}: {:?}", event.tick(), event);
//! ```

use crate::models::customer::{CustomerId, Priority};
use serde::{Deserialize, Serialize};

/// Simulation event capturing a customer state change.
///
/// All events include a tick number for temporal ordering.
/// Events are logged in the order they occur within a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// New customer created by the arrival generator
    Arrival {
        tick: usize,
        arrival_index: CustomerId,
        priority: Priority,
    },

    /// Customer admitted from the outside queue into the needy queue
    Admission {
        tick: usize,
        arrival_index: CustomerId,
        priority: Priority,
        wait_time_to_enter: f64,
    },

    /// Customer bound to a server
    ServiceStart {
        tick: usize,
        arrival_index: CustomerId,
        server: usize,
        service_time_needed: f64,
    },

    /// Service episode finished and the server released
    ServiceComplete {
        tick: usize,
        arrival_index: CustomerId,
        server: usize,
        served_time: f64,
    },

    /// Customer stayed and became content
    ContentStart {
        tick: usize,
        arrival_index: CustomerId,
        content_time_needed: f64,
    },

    /// Content episode finished, customer re-entered the needy queue
    ContentComplete {
        tick: usize,
        arrival_index: CustomerId,
        content_time: f64,
    },

    /// Customer left the facility
    Departure {
        tick: usize,
        arrival_index: CustomerId,
        priority: Priority,
    },
}

impl Event {
    /// Get the tick number when this event occurred
    pub fn tick(&self) -> usize {
        match self {
            Event::Arrival { tick, .. } => *tick,
            Event::Admission { tick, .. } => *tick,
            Event::ServiceStart { tick, .. } => *tick,
            Event::ServiceComplete { tick, .. } => *tick,
            Event::ContentStart { tick, .. } => *tick,
            Event::ContentComplete { tick, .. } => *tick,
            Event::Departure { tick, .. } => *tick,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Arrival { .. } => "Arrival",
            Event::Admission { .. } => "Admission",
            Event::ServiceStart { .. } => "ServiceStart",
            Event::ServiceComplete { .. } => "ServiceComplete",
            Event::ContentStart { .. } => "ContentStart",
            Event::ContentComplete { .. } => "ContentComplete",
            Event::Departure { .. } => "Departure",
        }
    }

    /// Customer this event is about
    pub fn arrival_index(&self) -> CustomerId {
        match self {
            Event::Arrival { arrival_index, .. }
            | Event::Admission { arrival_index, .. }
            | Event::ServiceStart { arrival_index, .. }
            | Event::ServiceComplete { arrival_index, .. }
            | Event::ContentStart { arrival_index, .. }
            | Event::ContentComplete { arrival_index, .. }
            | Event::Departure { arrival_index, .. } => *arrival_index,
        }
    }
}

/// Event log for storing and querying simulation events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific tick
    pub fn events_at_tick(&self, tick: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get the full history of one customer
    pub fn events_for_customer(&self, arrival_index: CustomerId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.arrival_index() == arrival_index)
            .collect()
    }

    /// Sum of all served durations logged by service completions
    pub fn total_served_time(&self) -> f64 {
        self.events
            .iter()
            .map(|e| match e {
                Event::ServiceComplete { served_time, .. } => *served_time,
                _ => 0.0,
            })
            .sum()
    }

    /// Sum of all content durations logged by content completions
    pub fn total_content_time(&self) -> f64 {
        self.events
            .iter()
            .map(|e| match e {
                Event::ContentComplete { content_time, .. } => *content_time,
                _ => 0.0,
            })
            .sum()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
