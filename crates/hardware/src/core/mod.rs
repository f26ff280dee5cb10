//! SIMT core.
//!
//! This module implements one core of the device: the warp table, the
//! round-robin scheduler, the per-unit dispatch queues, the four functional
//! units, and commit. It provides:
//! 1. **Tick phases:** commit → execute → issue/fetch, in reverse pipeline
//!    order so each stage observes the previous cycle's state.
//! 2. **Core services:** `resume`, `wspawn`, and `barrier`, callable both
//!    from outside (the ISA layer) and from the units mid-tick.
//! 3. **Frontend contract:** the [`TraceSource`] trait stands in for the
//!    ISA simulator above; the scheduler pulls one trace per cycle from it.

/// Warp scheduler.
pub mod scheduler;
/// In-flight instruction traces.
pub mod trace;
/// Functional units.
pub mod units;
/// Warp state and barrier tracking.
pub mod warp;

use std::rc::Rc;

use crate::common::{SimError, ThreadMask};
use crate::config::Config;
use crate::core::scheduler::WarpScheduler;
use crate::core::trace::{FuType, TraceRef};
use crate::core::units::{AluUnit, FpuUnit, LsuUnit, SfuUnit};
use crate::core::warp::{BarrierState, Warp};
use crate::sim::{Clock, SimComponent, SimPort};
use crate::stats::CorePerf;

/// The ISA simulator's side of the frontend: produces decoded traces for a
/// warp on demand.
///
/// Returning `None` retires the warp; it stays inactive until a later
/// `wspawn` reactivates it (at which point the source is consulted again).
pub trait TraceSource {
    /// Produces the next trace for the given warp, or `None` when the warp
    /// has no further work at this PC.
    fn fetch(&mut self, cid: usize, wid: usize, pc: u64, tmask: ThreadMask) -> Option<TraceRef>;

    /// Observes a committed trace (retirement hook).
    fn retire(&mut self, _trace: &TraceRef) {}

    /// Re-initializes the source for a fresh run.
    fn reset(&mut self) {}
}

/// The slice of core state the functional units may touch mid-tick.
///
/// Units run while the core's unit fields are mutably borrowed, so the
/// warp/barrier/stat state is lent to them through this view instead of
/// through the core itself.
pub struct CoreCtx<'a> {
    /// Owning core id.
    pub id: usize,
    /// Warp table.
    pub warps: &'a mut [Warp],
    /// Barrier arrival latches.
    pub barriers: &'a mut [BarrierState],
    /// Performance counters.
    pub perf: &'a mut CorePerf,
    /// Emit trace lines.
    pub trace_on: bool,
}

impl CoreCtx<'_> {
    /// Clears a warp's fetch stall so the scheduler can pick it again.
    pub fn resume(&mut self, wid: usize) {
        if self.trace_on && self.warps[wid].stalled {
            eprintln!("core{}: resume warp {}", self.id, wid);
        }
        self.warps[wid].stalled = false;
    }

    /// Activates warps `1..count` at the given PC.
    ///
    /// Already-active warps are left untouched. Returns whether the calling
    /// warp may resume immediately (always, for wspawn).
    pub fn wspawn(&mut self, count: usize, pc: u64) -> bool {
        let n = self.warps.len();
        for wid in 1..count.min(n) {
            if !self.warps[wid].active {
                self.warps[wid].activate(pc);
                if self.trace_on {
                    eprintln!("core{}: wspawn warp {} at pc={:#x}", self.id, wid, pc);
                }
            }
        }
        self.perf.wspawns += 1;
        true
    }

    /// Records a barrier arrival and returns whether the caller may resume.
    ///
    /// When the arrival count reaches `count`, every parked warp is resumed
    /// and the latch clears; the caller (the last arrival) resumes through
    /// the return value.
    ///
    /// # Panics
    ///
    /// Panics if `bar_id` is outside the configured barrier table — the
    /// ISA layer validates barrier ids before they reach the pipeline.
    pub fn barrier(&mut self, bar_id: usize, count: u32, wid: usize) -> bool {
        assert!(
            bar_id < self.barriers.len(),
            "barrier id {} outside table of {}",
            bar_id,
            self.barriers.len()
        );
        self.perf.barrier_arrivals += 1;
        let arrivals = self.barriers[bar_id].arrive(wid);
        if arrivals >= count {
            let released = self.barriers[bar_id].drain();
            for w in released.iter() {
                if w != wid {
                    self.resume(w);
                }
            }
            true
        } else {
            false
        }
    }
}

/// One SIMT core: warp table, scheduler, functional units, and commit.
pub struct Core {
    name: String,
    id: usize,
    config: Rc<Config>,
    warps: Vec<Warp>,
    barriers: Vec<BarrierState>,
    scheduler: WarpScheduler,
    /// Integer unit.
    pub alu: AluUnit,
    /// Floating-point unit.
    pub fpu: FpuUnit,
    /// Load/store unit.
    pub lsu: LsuUnit,
    /// Special-function unit.
    pub sfu: SfuUnit,
    source: Option<Box<dyn TraceSource>>,
    in_flight: u64,
    perf: CorePerf,
    trace_on: bool,
}

impl Core {
    /// Creates a core with warp 0 active at PC 0 and all others parked.
    pub fn new(clock: &Clock, id: usize, config: Rc<Config>) -> Self {
        let width = config.core.issue_width;
        let mut warps: Vec<Warp> = (0..config.core.num_warps)
            .map(|_| Warp::new(config.core.num_threads))
            .collect();
        warps[0].activate(0);
        let barriers = (0..config.core.num_barriers)
            .map(|_| BarrierState::new(config.core.num_warps))
            .collect();
        let alu = AluUnit::new(clock, id, width, config.latency.imul, config.core.xlen);
        let fpu = FpuUnit::new(clock, id, width, &config.latency);
        let lsu = LsuUnit::new(
            clock,
            id,
            width,
            config.lsu.num_blocks,
            config.lsu.num_lanes,
            config.lsu.pending_size,
        );
        let sfu = SfuUnit::new(clock, id, width);
        let trace_on = config.general.trace;
        Self {
            name: format!("core{}", id),
            id,
            config,
            warps,
            barriers,
            scheduler: WarpScheduler::new(),
            alu,
            fpu,
            lsu,
            sfu,
            source: None,
            in_flight: 0,
            perf: CorePerf::default(),
            trace_on,
        }
    }

    /// Core id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Installs the frontend trace source.
    pub fn set_source(&mut self, source: Box<dyn TraceSource>) {
        self.source = Some(source);
    }

    /// Returns the dispatch queue for the given unit and issue slot.
    ///
    /// External frontends push traces here directly.
    pub fn dispatch_port(&self, unit: FuType, slot: usize) -> SimPort<TraceRef> {
        let lanes = match unit {
            FuType::Alu => &self.alu.lanes,
            FuType::Fpu => &self.fpu.lanes,
            FuType::Lsu => &self.lsu.lanes,
            FuType::Sfu => &self.sfu.lanes,
        };
        lanes.inputs[slot].clone()
    }

    /// Clears a warp's fetch stall so the scheduler can pick it again.
    pub fn resume(&mut self, wid: usize) {
        self.ctx_less(|ctx| ctx.resume(wid));
    }

    /// Activates warps `1..count` at the given PC.
    pub fn wspawn(&mut self, count: usize, pc: u64) -> bool {
        self.ctx_less(|ctx| ctx.wspawn(count, pc))
    }

    /// Records a barrier arrival; returns whether the caller may resume.
    pub fn barrier(&mut self, bar_id: usize, count: u32, wid: usize) -> bool {
        self.ctx_less(|ctx| ctx.barrier(bar_id, count, wid))
    }

    /// Warp table entry (scheduling state inspection).
    pub fn warp(&self, wid: usize) -> &Warp {
        &self.warps[wid]
    }

    /// Traces fetched but not yet committed.
    pub fn in_flight(&self) -> u64 {
        self.in_flight
    }

    /// Performance counters.
    pub fn perf(&self) -> &CorePerf {
        &self.perf
    }

    /// Whether every warp has retired and the pipeline has drained.
    pub fn done(&self) -> bool {
        self.in_flight == 0
            && self
                .warps
                .iter()
                .all(|w| !w.active && w.ibuf.is_none())
    }

    fn ctx_less<R>(&mut self, f: impl FnOnce(&mut CoreCtx) -> R) -> R {
        let mut ctx = CoreCtx {
            id: self.id,
            warps: &mut self.warps,
            barriers: &mut self.barriers,
            perf: &mut self.perf,
            trace_on: self.trace_on,
        };
        f(&mut ctx)
    }

    /// Drains every unit's commit queues.
    fn commit(&mut self) {
        let mut committed: Vec<TraceRef> = Vec::new();
        let outputs = self
            .alu
            .lanes
            .outputs
            .iter()
            .chain(self.fpu.lanes.outputs.iter())
            .chain(self.lsu.lanes.outputs.iter())
            .chain(self.sfu.lanes.outputs.iter());
        for port in outputs {
            while let Some(trace) = port.pop() {
                committed.push(trace);
            }
        }
        for trace in committed {
            // externally dispatched traces are not counted at issue
            self.in_flight = self.in_flight.saturating_sub(1);
            self.perf.traces += 1;
            if trace.eop {
                self.perf.instrs += 1;
            }
            if trace.failed() {
                self.perf.failures += 1;
                if self.trace_on {
                    eprintln!("*** {}-commit-failed: {}", self.name, trace);
                }
            }
            if self.trace_on {
                eprintln!("{}-commit: {}", self.name, trace);
            }
            if let Some(source) = self.source.as_mut() {
                source.retire(&trace);
            }
        }
    }

    /// Ticks every functional unit against the shared core context.
    fn execute(&mut self) -> Result<(), SimError> {
        let mut ctx = CoreCtx {
            id: self.id,
            warps: &mut self.warps,
            barriers: &mut self.barriers,
            perf: &mut self.perf,
            trace_on: self.trace_on,
        };
        self.alu.tick(&mut ctx)?;
        self.fpu.tick(&mut ctx)?;
        self.lsu.tick(&mut ctx)?;
        self.sfu.tick(&mut ctx)?;
        Ok(())
    }

    /// Issues buffered traces and fetches from one ready warp.
    fn schedule(&mut self) {
        let depth = self.config.core.dispatch_depth;
        let issue_width = self.config.core.issue_width;

        // issue: move buffered traces into their unit's dispatch queue,
        // leaving them buffered while the queue is at capacity
        for wid in 0..self.warps.len() {
            let Some(trace) = self.warps[wid].ibuf.clone() else {
                continue;
            };
            let lanes = match trace.op.unit() {
                FuType::Alu => &self.alu.lanes,
                FuType::Fpu => &self.fpu.lanes,
                FuType::Lsu => &self.lsu.lanes,
                FuType::Sfu => &self.sfu.lanes,
            };
            let iw = wid % issue_width;
            if lanes.inputs[iw].len() < depth {
                lanes.inputs[iw].push(trace, 1);
                self.warps[wid].ibuf = None;
                self.in_flight += 1;
            }
        }

        // fetch: one ready warp per cycle
        let warps = &self.warps;
        let picked = self
            .scheduler
            .next_ready(warps, |wid| warps[wid].ibuf.is_none());
        match picked {
            Some(wid) => {
                let cid = self.id;
                let warp = &mut self.warps[wid];
                let (pc, tmask) = (warp.pc, warp.tmask);
                let fetched = self
                    .source
                    .as_mut()
                    .and_then(|s| s.fetch(cid, wid, pc, tmask));
                match fetched {
                    Some(trace) => {
                        if trace.eop {
                            warp.pc += 4;
                            if trace.fetch_stall {
                                // pause until a unit resumes the warp
                                warp.stalled = true;
                                self.perf.fetch_stalls += 1;
                            }
                        }
                        if self.trace_on {
                            eprintln!("{}-fetch: wid={}, {}", self.name, wid, trace);
                        }
                        warp.ibuf = Some(trace);
                    }
                    None => {
                        warp.active = false;
                    }
                }
            }
            None => {
                self.perf.sched_idle += 1;
            }
        }
    }
}

impl SimComponent for Core {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        for warp in self.warps.iter_mut() {
            warp.clear();
        }
        self.warps[0].activate(0);
        for barrier in self.barriers.iter_mut() {
            barrier.clear();
        }
        self.scheduler.reset();
        self.alu.reset();
        self.fpu.reset();
        self.lsu.reset();
        self.sfu.reset();
        self.in_flight = 0;
        self.perf = CorePerf::default();
        if let Some(source) = self.source.as_mut() {
            source.reset();
        }
    }

    fn tick(&mut self) -> Result<(), SimError> {
        self.commit();
        self.execute()?;
        self.schedule();
        Ok(())
    }
}
