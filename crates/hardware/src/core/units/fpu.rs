//! Floating-point unit.
//!
//! Same shape as the integer unit, with latencies drawn from the FP
//! latency table. FP operations never set the fetch-stall flag in this
//! pipeline, so there is no warp resume here.

use crate::common::SimError;
use crate::config::LatencyConfig;
use crate::core::trace::{FpuOp, TraceOp};
use crate::core::units::IssueLanes;
use crate::core::CoreCtx;
use crate::sim::Clock;

/// Floating-point execution unit.
pub struct FpuUnit {
    name: String,
    /// Per-issue-slot ports.
    pub lanes: IssueLanes,
    latency_fma: u64,
    latency_fdiv: u64,
    latency_fsqrt: u64,
    latency_fcvt: u64,
}

impl FpuUnit {
    /// Creates an FPU with the given issue width and latency table.
    pub fn new(clock: &Clock, cid: usize, width: usize, latency: &LatencyConfig) -> Self {
        Self {
            name: format!("core{}-fpu-unit", cid),
            lanes: IssueLanes::new(clock, width),
            latency_fma: latency.fma as u64,
            latency_fdiv: latency.fdiv as u64,
            latency_fsqrt: latency.fsqrt as u64,
            latency_fcvt: latency.fcvt as u64,
        }
    }

    /// Component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Empties every port.
    pub fn reset(&mut self) {
        self.lanes.clear();
    }

    /// Services one trace per issue slot.
    pub fn tick(&mut self, ctx: &mut CoreCtx) -> Result<(), SimError> {
        for iw in 0..self.lanes.width() {
            let input = &self.lanes.inputs[iw];
            let Some(trace) = input.front() else {
                continue;
            };
            let output = &self.lanes.outputs[iw];
            let TraceOp::Fpu(op) = trace.op else {
                return Err(SimError::MisroutedTrace {
                    component: self.name.clone(),
                    uuid: trace.uuid,
                });
            };
            let delay = match op {
                FpuOp::Fncp => 4,
                FpuOp::Fma => self.latency_fma + 2,
                FpuOp::Fdiv => self.latency_fdiv + 2,
                FpuOp::Fsqrt => self.latency_fsqrt + 2,
                FpuOp::Fcvt => self.latency_fcvt + 2,
            };
            output.push(trace.clone(), delay);
            if ctx.trace_on {
                eprintln!("{}: op={}, {}", self.name, op, trace);
            }
            input.pop();
        }
        Ok(())
    }
}
