//! Special-function unit.
//!
//! Services warp-control operations locally and forwards coprocessor
//! operations (TEX/RASTER/OM) to the shared external units. Pending
//! coprocessor responses are drained before new inputs are dispatched;
//! the response ports are shared across cores, so the drain filters on
//! the owning core id.

use crate::common::SimError;
use crate::core::trace::{SfuOp, TraceData, TraceOp, TraceRef};
use crate::core::units::IssueLanes;
use crate::core::CoreCtx;
use crate::sim::{Clock, SimPort};

/// Special-function execution unit.
pub struct SfuUnit {
    name: String,
    cid: usize,
    /// Per-issue-slot ports.
    pub lanes: IssueLanes,
    coproc_inputs: Vec<SimPort<TraceRef>>,
    pending_rsps: Vec<SimPort<TraceRef>>,
}

impl SfuUnit {
    /// Creates an SFU with the given issue width and no coprocessors
    /// attached; wire them with [`SfuUnit::connect_coproc`].
    pub fn new(clock: &Clock, cid: usize, width: usize) -> Self {
        Self {
            name: format!("core{}-sfu-unit", cid),
            cid,
            lanes: IssueLanes::new(clock, width),
            coproc_inputs: Vec::new(),
            pending_rsps: Vec::new(),
        }
    }

    /// Component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches one coprocessor unit's dispatch and response ports.
    ///
    /// Units are addressed by attachment order; a trace's `Coproc { unit }`
    /// payload indexes into it.
    pub fn connect_coproc(&mut self, input: SimPort<TraceRef>, output: SimPort<TraceRef>) {
        self.coproc_inputs.push(input);
        self.pending_rsps.push(output);
    }

    /// Empties the issue ports. Coprocessor ports are owned by the
    /// external units and reset there.
    pub fn reset(&mut self) {
        self.lanes.clear();
    }

    /// Drains coprocessor responses, then services issue-slot inputs.
    pub fn tick(&mut self, ctx: &mut CoreCtx) -> Result<(), SimError> {
        let issue_width = self.lanes.width();

        // handle pending responses
        for pending_rsp in self.pending_rsps.iter() {
            let Some(trace) = pending_rsp.front() else {
                continue;
            };
            if trace.cid != self.cid {
                continue;
            }
            let iw = trace.wid % issue_width;
            self.lanes.outputs[iw].push(trace, 1);
            pending_rsp.pop();
        }

        // check input queue
        for iw in 0..issue_width {
            let input = &self.lanes.inputs[iw];
            let Some(trace) = input.front() else {
                continue;
            };
            let output = &self.lanes.outputs[iw];
            let TraceOp::Sfu(sfu_op) = trace.op else {
                return Err(SimError::MisroutedTrace {
                    component: self.name.clone(),
                    uuid: trace.uuid,
                });
            };
            let mut release_warp = trace.fetch_stall;
            match sfu_op {
                SfuOp::Wspawn => {
                    output.push(trace.clone(), 4);
                    if trace.eop {
                        let TraceData::Sfu { arg1, arg2 } = &trace.data else {
                            return Err(SimError::MisroutedTrace {
                                component: self.name.clone(),
                                uuid: trace.uuid,
                            });
                        };
                        release_warp = ctx.wspawn(*arg1 as usize, *arg2);
                    }
                }
                SfuOp::Tmc
                | SfuOp::Split
                | SfuOp::Join
                | SfuOp::Pred
                | SfuOp::Csrrw
                | SfuOp::Csrrs
                | SfuOp::Csrrc => {
                    output.push(trace.clone(), 4);
                }
                SfuOp::Bar => {
                    output.push(trace.clone(), 4);
                    if trace.eop {
                        let TraceData::Sfu { arg1, arg2 } = &trace.data else {
                            return Err(SimError::MisroutedTrace {
                                component: self.name.clone(),
                                uuid: trace.uuid,
                            });
                        };
                        release_warp = ctx.barrier(*arg1 as usize, *arg2 as u32, trace.wid);
                    }
                }
                SfuOp::Tex | SfuOp::Raster | SfuOp::Om => {
                    let TraceData::Coproc { unit } = &trace.data else {
                        return Err(SimError::MisroutedTrace {
                            component: self.name.clone(),
                            uuid: trace.uuid,
                        });
                    };
                    let coproc =
                        self.coproc_inputs
                            .get(*unit)
                            .ok_or(SimError::MisroutedTrace {
                                component: self.name.clone(),
                                uuid: trace.uuid,
                            })?;
                    // commits later, via the response drain
                    coproc.push(trace.clone(), 2);
                    ctx.perf.coproc_dispatches += 1;
                }
            }

            if ctx.trace_on {
                eprintln!("{}: op={}, {}", self.name, sfu_op, trace);
            }
            if trace.eop && release_warp {
                ctx.resume(trace.wid);
            }
            input.pop();
        }
        Ok(())
    }
}
