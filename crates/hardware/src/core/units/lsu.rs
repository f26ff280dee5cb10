//! Load/store unit.
//!
//! The most complex functional unit. Each block keeps a fence lock and a
//! bounded pending-load table correlating memory responses to their traces.
//! Responses are serviced before requests each cycle so a freed table slot
//! is visible to the request phase of the same cycle.
//!
//! Backpressure: a full pending table never drops a load — the trace stays
//! in its input port and retries next cycle, logging the event once.

use crate::common::{LaneMask, SimError, SlotTable};
use crate::core::trace::{LsuOp, TraceData, TraceOp, TraceRef};
use crate::core::units::IssueLanes;
use crate::core::CoreCtx;
use crate::mem::protocol::{LsuReq, LsuRsp};
use crate::sim::{Clock, SimPort};

/// The request/response port pair between one LSU block and its demux.
pub struct LsuChannel {
    /// Vector requests toward the block's demux.
    pub req: SimPort<LsuReq>,
    /// Vector responses from the block's demux.
    pub rsp: SimPort<LsuRsp>,
}

struct PendingEntry {
    trace: TraceRef,
    remaining: LaneMask,
}

struct BlockState {
    /// A latched FENCE trace; its presence locks the block.
    fence_trace: Option<TraceRef>,
    pending_rd_reqs: SlotTable<PendingEntry>,
}

impl BlockState {
    fn clear(&mut self) {
        self.fence_trace = None;
        self.pending_rd_reqs.clear();
    }
}

/// Load/store execution unit.
pub struct LsuUnit {
    name: String,
    clock: Clock,
    /// Per-issue-slot ports.
    pub lanes: IssueLanes,
    blocks: Vec<BlockState>,
    channels: Vec<LsuChannel>,
    num_lanes: usize,
    pending_loads: u64,
}

impl LsuUnit {
    /// Creates an LSU with the given geometry.
    ///
    /// `pending_size` bounds each block's pending-load table; the unit
    /// applies backpressure when a table fills.
    pub fn new(
        clock: &Clock,
        cid: usize,
        width: usize,
        num_blocks: usize,
        num_lanes: usize,
        pending_size: usize,
    ) -> Self {
        Self {
            name: format!("core{}-lsu-unit", cid),
            clock: clock.clone(),
            lanes: IssueLanes::new(clock, width),
            blocks: (0..num_blocks)
                .map(|_| BlockState {
                    fence_trace: None,
                    pending_rd_reqs: SlotTable::new(pending_size),
                })
                .collect(),
            channels: (0..num_blocks)
                .map(|_| LsuChannel {
                    req: SimPort::new(clock),
                    rsp: SimPort::new(clock),
                })
                .collect(),
            num_lanes,
            pending_loads: 0,
        }
    }

    /// Component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of LSU blocks.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Memory channel of the given block.
    pub fn channel(&self, block: usize) -> &LsuChannel {
        &self.channels[block]
    }

    /// Mutable memory channel of the given block (device wiring).
    pub fn channel_mut(&mut self, block: usize) -> &mut LsuChannel {
        &mut self.channels[block]
    }

    /// Occupancy of a block's pending-load table.
    pub fn pending_size(&self, block: usize) -> usize {
        self.blocks[block].pending_rd_reqs.size()
    }

    /// Clears all block state and ports.
    pub fn reset(&mut self) {
        self.lanes.clear();
        for block in self.blocks.iter_mut() {
            block.clear();
        }
        for channel in self.channels.iter() {
            channel.req.clear();
            channel.rsp.clear();
        }
        self.pending_loads = 0;
    }

    /// Services memory responses, then issue-slot requests.
    pub fn tick(&mut self, ctx: &mut CoreCtx) -> Result<(), SimError> {
        ctx.perf.load_latency += self.pending_loads;
        let issue_width = self.lanes.width();

        // handle memory responses
        for b in 0..self.blocks.len() {
            let Some(lsu_rsp) = self.channels[b].rsp.pop() else {
                continue;
            };
            if ctx.trace_on {
                eprintln!("{}-{}", self.name, lsu_rsp);
            }
            let state = &mut self.blocks[b];
            let tag = lsu_rsp.tag as usize;
            let entry = state
                .pending_rd_reqs
                .get_mut(tag)
                .ok_or_else(|| SimError::UnknownTag {
                    component: self.name.clone(),
                    tag: lsu_rsp.tag,
                    cycle: self.clock.now(),
                })?;
            if !lsu_rsp.mask.subset_of(entry.remaining) {
                return Err(SimError::LaneMismatch {
                    component: self.name.clone(),
                    tag: lsu_rsp.tag,
                    uuid: lsu_rsp.uuid,
                });
            }
            entry.remaining.subtract(lsu_rsp.mask); // track remaining
            if lsu_rsp.failed {
                entry.trace.mark_failed();
            }
            if entry.remaining.none() {
                // whole response received, release trace
                let entry = state.pending_rd_reqs.release(tag);
                let iw = entry.trace.wid % issue_width;
                self.lanes.outputs[iw].push(entry.trace, 1);
            }
            self.pending_loads -= lsu_rsp.mask.count() as u64;
        }

        // handle LSU requests
        for iw in 0..issue_width {
            let block_idx = iw % self.blocks.len();
            let state = &mut self.blocks[block_idx];
            if let Some(fence_trace) = &state.fence_trace {
                // wait for all pending memory operations to complete
                if !state.pending_rd_reqs.empty() {
                    continue;
                }
                let fence_trace = fence_trace.clone();
                if ctx.trace_on {
                    eprintln!("{}-fence-unlock: {}", self.name, fence_trace);
                }
                self.lanes.outputs[iw].push(fence_trace, 1);
                state.fence_trace = None;
            }

            // check input queue
            let input = &self.lanes.inputs[iw];
            let Some(trace) = input.front() else {
                continue;
            };

            let TraceOp::Lsu(op) = trace.op else {
                return Err(SimError::MisroutedTrace {
                    component: self.name.clone(),
                    uuid: trace.uuid,
                });
            };

            if op == LsuOp::Fence {
                // schedule fence lock
                if ctx.trace_on {
                    eprintln!("{}-fence-lock: {}", self.name, trace);
                }
                state.fence_trace = Some(trace);
                input.pop();
                continue;
            }

            let is_write = op == LsuOp::Store;

            // check pending queue capacity
            if !is_write && state.pending_rd_reqs.full() {
                if !trace.log_once(true) && ctx.trace_on {
                    eprintln!("*** {}-queue-full: {}", self.name, trace);
                }
                ctx.perf.lsu_stalls += 1;
                continue;
            } else {
                trace.log_once(false);
            }

            // build memory request
            let mut lsu_req = LsuReq::new(self.num_lanes);
            lsu_req.write = is_write;
            let TraceData::Mem { addrs } = &trace.data else {
                return Err(SimError::MisroutedTrace {
                    component: self.name.clone(),
                    uuid: trace.uuid,
                });
            };
            let t0 = trace.pid * self.num_lanes;
            for i in 0..self.num_lanes {
                if trace.tmask.test(t0 + i) {
                    lsu_req.mask.set(i);
                    lsu_req.addrs[i] = addrs[t0 + i].addr;
                }
            }
            let mut tag = 0;
            if !is_write {
                tag = state
                    .pending_rd_reqs
                    .allocate(PendingEntry {
                        trace: trace.clone(),
                        remaining: lsu_req.mask,
                    })
                    .expect("pending table capacity checked above") as u64;
            }
            lsu_req.tag = tag;
            lsu_req.cid = trace.cid;
            lsu_req.uuid = trace.uuid;

            // send memory request
            if ctx.trace_on {
                eprintln!("{}-{}", self.name, lsu_req);
            }
            let num_addrs = lsu_req.mask.count() as u64;
            self.channels[block_idx].req.push(lsu_req, 1);

            // update stats
            if is_write {
                ctx.perf.stores += num_addrs;
            } else {
                ctx.perf.loads += num_addrs;
                self.pending_loads += num_addrs;
            }

            // do not wait on writes
            if is_write {
                self.lanes.outputs[iw].push(trace.clone(), 1);
            }

            input.pop();
        }
        Ok(())
    }
}
