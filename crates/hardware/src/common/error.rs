//! Fatal simulation errors.
//!
//! This module defines the error type surfaced by component ticks. It provides:
//! 1. **Protocol violations:** Responses for tags that were never allocated,
//!    traces routed to a unit that cannot service them.
//! 2. **Budget exhaustion:** The outer driver's cycle limit was reached.
//! 3. **Configuration errors:** Rejected parameter combinations.
//!
//! Backpressure (a full pending-load table) is *not* an error: the request
//! stays in its input port and retries naturally. Everything here aborts the
//! simulation with context.

use std::fmt;

/// A fatal simulation error.
///
/// Returned from `tick()` implementations and propagated unchanged through
/// the engine to the driver.
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    /// A memory response arrived carrying a tag with no pending request.
    ///
    /// The associated values are the reporting component, the tag, and the
    /// cycle at which the response was observed.
    UnknownTag {
        /// Name of the component that observed the response.
        component: String,
        /// The orphaned tag value.
        tag: u64,
        /// Cycle of observation.
        cycle: u64,
    },

    /// A response reported completion for a lane that was not in flight.
    ///
    /// The response mask must always be a subset of the remaining request
    /// mask for its tag.
    LaneMismatch {
        /// Name of the component that observed the response.
        component: String,
        /// The offending tag.
        tag: u64,
        /// Trace serial number for correlation.
        uuid: u64,
    },

    /// A trace reached a functional unit that cannot service its operation.
    MisroutedTrace {
        /// Name of the unit.
        component: String,
        /// Trace serial number for correlation.
        uuid: u64,
    },

    /// The driver's cycle budget was exhausted before all cores drained.
    CycleBudgetExceeded {
        /// The configured budget.
        budget: u64,
    },

    /// A configuration parameter combination was rejected.
    Config(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::UnknownTag {
                component,
                tag,
                cycle,
            } => write!(
                f,
                "{}: response for unknown tag {:#x} at cycle {}",
                component, tag, cycle
            ),
            SimError::LaneMismatch {
                component,
                tag,
                uuid,
            } => write!(
                f,
                "{}: response lane not in flight for tag {:#x} (#{})",
                component, tag, uuid
            ),
            SimError::MisroutedTrace { component, uuid } => {
                write!(f, "{}: trace #{} routed to wrong unit", component, uuid)
            }
            SimError::CycleBudgetExceeded { budget } => {
                write!(f, "cycle budget of {} exceeded", budget)
            }
            SimError::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}
