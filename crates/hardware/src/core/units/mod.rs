//! Functional units.
//!
//! This module provides the four execution pipelines of a core. It includes:
//! - [`alu`]: Integer operations with sub-kind-derived latency.
//! - [`fpu`]: Floating-point operations with sub-kind-derived latency.
//! - [`lsu`]: The load/store pipeline with fence locking and the
//!   pending-load table.
//! - [`sfu`]: Warp-control and coprocessor dispatch.
//!
//! Every unit exposes one input and one output port per issue slot; the
//! core feeds the inputs from dispatch and drains the outputs at commit.

/// Integer unit.
pub mod alu;
/// Floating-point unit.
pub mod fpu;
/// Load/store unit.
pub mod lsu;
/// Special-function unit.
pub mod sfu;

pub use alu::AluUnit;
pub use fpu::FpuUnit;
pub use lsu::{LsuChannel, LsuUnit};
pub use sfu::SfuUnit;

use crate::core::trace::TraceRef;
use crate::sim::{Clock, SimPort};

/// Per-issue-slot input and output ports shared by every functional unit.
pub struct IssueLanes {
    /// Dispatch queues, one per issue slot.
    pub inputs: Vec<SimPort<TraceRef>>,
    /// Commit queues, one per issue slot.
    pub outputs: Vec<SimPort<TraceRef>>,
}

impl IssueLanes {
    /// Creates `width` input/output port pairs.
    pub fn new(clock: &Clock, width: usize) -> Self {
        Self {
            inputs: (0..width).map(|_| SimPort::new(clock)).collect(),
            outputs: (0..width).map(|_| SimPort::new(clock)).collect(),
        }
    }

    /// Number of issue slots.
    pub fn width(&self) -> usize {
        self.inputs.len()
    }

    /// Empties every port.
    pub fn clear(&self) {
        for port in self.inputs.iter().chain(self.outputs.iter()) {
            port.clear();
        }
    }
}
