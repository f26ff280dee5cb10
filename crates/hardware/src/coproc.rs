//! Coprocessor dispatch interface.
//!
//! Texture, rasterizer, and output-merge units live outside the core
//! pipeline; only their dispatch surface is modeled here. A unit exposes an
//! input port the SFU pushes traces into and an output port the SFU drains,
//! filtering on the owning core id — units are shared device-wide.

use crate::common::SimError;
use crate::core::trace::TraceRef;
use crate::sim::{Clock, SimComponent, SimPort};

/// The dispatch surface of an external unit.
pub trait CoprocUnit: SimComponent {
    /// Port the SFU pushes traces into.
    fn input(&self) -> SimPort<TraceRef>;
    /// Port the SFU drains returned traces from.
    fn output(&self) -> SimPort<TraceRef>;
}

/// A stand-in external unit that returns every trace after a fixed delay.
///
/// Used wherever the real texture/raster/output-merge model is out of
/// scope: tests, the CLI demo, and as the reference for the dispatch
/// protocol.
pub struct FixedLatencyCoproc {
    name: String,
    /// Dispatch port.
    pub input: SimPort<TraceRef>,
    /// Return port.
    pub output: SimPort<TraceRef>,
    latency: u64,
    serviced: u64,
}

impl FixedLatencyCoproc {
    /// Creates a unit with the given service latency.
    pub fn new(clock: &Clock, name: &str, latency: u64) -> Self {
        assert!(latency >= 1, "coprocessor latency must be at least 1");
        Self {
            name: name.to_string(),
            input: SimPort::new(clock),
            output: SimPort::new(clock),
            latency,
            serviced: 0,
        }
    }

    /// Traces serviced so far.
    pub fn serviced(&self) -> u64 {
        self.serviced
    }
}

impl SimComponent for FixedLatencyCoproc {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.input.clear();
        self.output.clear();
        self.serviced = 0;
    }

    fn tick(&mut self) -> Result<(), SimError> {
        if let Some(trace) = self.input.pop() {
            self.output.push(trace, self.latency);
            self.serviced += 1;
        }
        Ok(())
    }
}

impl CoprocUnit for FixedLatencyCoproc {
    fn input(&self) -> SimPort<TraceRef> {
        self.input.clone()
    }

    fn output(&self) -> SimPort<TraceRef> {
        self.output.clone()
    }
}
