//! Warp scheduler.
//!
//! Each cycle the scheduler selects at most one ready warp to fetch from.
//! Selection rotates from just past the last scheduled warp, giving every
//! ready warp equal service — the loose round-robin baseline.

use crate::core::warp::Warp;

/// Rotating warp selector.
pub struct WarpScheduler {
    cursor: usize,
}

impl WarpScheduler {
    /// Creates a scheduler starting at warp zero.
    pub fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Picks the next ready warp, rotating from the last grant.
    ///
    /// A warp is ready when it is active, not stalled, and `ready(wid)`
    /// holds (the caller supplies the structural check — typically that
    /// the warp's fetch buffer is free).
    pub fn next_ready(&mut self, warps: &[Warp], ready: impl Fn(usize) -> bool) -> Option<usize> {
        let n = warps.len();
        for k in 1..=n {
            let wid = (self.cursor + k) % n;
            if warps[wid].active && !warps[wid].stalled && ready(wid) {
                self.cursor = wid;
                return Some(wid);
            }
        }
        None
    }

    /// Rewinds the cursor to warp zero.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl Default for WarpScheduler {
    fn default() -> Self {
        Self::new()
    }
}
