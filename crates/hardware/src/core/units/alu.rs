//! Integer unit.
//!
//! One trace per issue slot per cycle. The trace is forwarded to commit
//! with a latency derived from its sub-kind; an end-of-packet trace that
//! stalled its warp resumes it at dispatch so the scheduler can refill the
//! pipeline behind it.

use crate::common::SimError;
use crate::core::trace::{AluOp, TraceOp};
use crate::core::units::IssueLanes;
use crate::core::CoreCtx;
use crate::sim::Clock;

/// Integer execution unit.
pub struct AluUnit {
    name: String,
    /// Per-issue-slot ports.
    pub lanes: IssueLanes,
    latency_imul: u64,
    xlen: u64,
}

impl AluUnit {
    /// Creates an ALU with the given issue width and latency parameters.
    pub fn new(clock: &Clock, cid: usize, width: usize, latency_imul: u32, xlen: u32) -> Self {
        Self {
            name: format!("core{}-alu-unit", cid),
            lanes: IssueLanes::new(clock, width),
            latency_imul: latency_imul as u64,
            xlen: xlen as u64,
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
            let TraceOp::Alu(op) = trace.op else {
                return Err(SimError::MisroutedTrace {
                    component: self.name.clone(),
                    uuid: trace.uuid,
                });
            };
            let delay = match op {
                AluOp::Arith | AluOp::Branch | AluOp::Syscall => 4,
                AluOp::Imul => self.latency_imul + 2,
                AluOp::Idiv => self.xlen + 2,
            };
            output.push(trace.clone(), delay);
            if ctx.trace_on {
                eprintln!("{}: op={}, {}", self.name, op, trace);
            }
            if trace.eop && trace.fetch_stall {
                ctx.resume(trace.wid);
            }
            input.pop();
        }
        Ok(())
    }
}
