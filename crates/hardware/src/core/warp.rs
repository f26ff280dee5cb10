//! Warp state and barrier tracking.
//!
//! This module holds the per-warp scheduling state and the barrier arrival
//! latches. It provides:
//! 1. **Warp slots:** Active bit, thread mask, PC, stall flag, and the
//!    fetched-but-not-issued buffer entry.
//! 2. **Barriers:** Per-id arrival masks; the last arrival drains the set.

use crate::common::{ThreadMask, WarpMask};
use crate::core::trace::TraceRef;

/// Scheduling state for one warp.
pub struct Warp {
    /// Warp participates in scheduling.
    pub active: bool,
    /// Fetch is paused until a unit resumes the warp.
    pub stalled: bool,
    /// Program counter, advanced per fetched instruction.
    pub pc: u64,
    /// Per-thread active mask.
    pub tmask: ThreadMask,
    /// Fetched trace waiting for dispatch-queue space.
    pub ibuf: Option<TraceRef>,
}

impl Warp {
    /// Creates an inactive warp with all threads masked off.
    pub fn new(num_threads: usize) -> Self {
        Self {
            active: false,
            stalled: false,
            pc: 0,
            tmask: ThreadMask::new(num_threads),
            ibuf: None,
        }
    }

    /// Activates the warp at the given PC with all threads enabled.
    pub fn activate(&mut self, pc: u64) {
        self.active = true;
        self.stalled = false;
        self.pc = pc;
        self.tmask = ThreadMask::full(self.tmask.width());
        self.ibuf = None;
    }

    /// Returns the warp to its post-construction state.
    pub fn clear(&mut self) {
        self.active = false;
        self.stalled = false;
        self.pc = 0;
        self.tmask.clear();
        self.ibuf = None;
    }
}

/// Arrival latch for one barrier id.
pub struct BarrierState {
    arrived: WarpMask,
}

impl BarrierState {
    /// Creates an empty latch sized for the warp count.
    pub fn new(num_warps: usize) -> Self {
        Self {
            arrived: WarpMask::new(num_warps),
        }
    }

    /// Records the arrival of a warp and returns the arrival count.
    pub fn arrive(&mut self, wid: usize) -> u32 {
        self.arrived.set(wid);
        self.arrived.count()
    }

    /// Takes the arrival set, leaving the latch empty.
    pub fn drain(&mut self) -> WarpMask {
        let arrived = self.arrived;
        self.arrived.clear();
        arrived
    }

    /// Empties the latch without reporting arrivals.
    pub fn clear(&mut self) {
        self.arrived.clear();
    }
}
