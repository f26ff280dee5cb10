//! Per-block local-memory demux.
//!
//! One instance sits between each LSU block and its two memory endpoints.
//! Each outgoing request is classified lane by lane: shared-memory lanes go
//! to the local-memory port, everything else to the data-cache port. A
//! request with a mix of both is split into two concurrent requests that
//! keep the original tag; their responses are merged by mask union before
//! being handed back upward, so the LSU sees at most one response per tag
//! from this component per split.

use std::collections::HashMap;

use crate::common::{LaneMask, MemoryMap, SimError};
use crate::mem::protocol::{LsuReq, LsuRsp};
use crate::sim::{Clock, SimComponent, SimPort};

struct SplitEntry {
    expected: LaneMask,
    acc: LaneMask,
    failed: bool,
}

/// Routes each LSU request lane to local memory or the cache hierarchy by
/// address range, splitting mixed requests and merging their responses.
pub struct LocalMemDemux {
    name: String,
    /// Requests from the LSU block.
    pub req_in: SimPort<LsuReq>,
    /// Responses back to the LSU block.
    pub rsp_in: SimPort<LsuRsp>,
    /// Requests toward local memory.
    pub req_lmem: SimPort<LsuReq>,
    /// Responses from local memory.
    pub rsp_lmem: SimPort<LsuRsp>,
    /// Requests toward the data cache.
    pub req_dc: SimPort<LsuReq>,
    /// Responses from the data cache.
    pub rsp_dc: SimPort<LsuRsp>,
    map: MemoryMap,
    delay: u64,
    splits: HashMap<u64, SplitEntry>,
}

impl LocalMemDemux {
    /// Creates a demux with the given one-way delay.
    pub fn new(clock: &Clock, name: &str, map: MemoryMap, delay: u64) -> Self {
        assert!(delay >= 1, "demux delay must be at least 1");
        Self {
            name: name.to_string(),
            req_in: SimPort::new(clock),
            rsp_in: SimPort::new(clock),
            req_lmem: SimPort::new(clock),
            rsp_lmem: SimPort::new(clock),
            req_dc: SimPort::new(clock),
            rsp_dc: SimPort::new(clock),
            map,
            delay,
            splits: HashMap::new(),
        }
    }

    fn forward_rsp(&mut self, rsp: LsuRsp) {
        let complete = match self.splits.get_mut(&rsp.tag) {
            Some(entry) => {
                entry.acc.union(rsp.mask);
                entry.failed |= rsp.failed;
                entry.acc == entry.expected
            }
            // unsplit request: hand the response up as-is
            None => {
                self.rsp_in.push(rsp, 1);
                return;
            }
        };
        if complete {
            let entry = self.splits.remove(&rsp.tag).expect("split entry checked above");
            let merged = LsuRsp {
                mask: entry.expected,
                tag: rsp.tag,
                cid: rsp.cid,
                uuid: rsp.uuid,
                failed: entry.failed,
            };
            self.rsp_in.push(merged, 1);
        }
    }
}

impl SimComponent for LocalMemDemux {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        for port in [&self.req_in, &self.req_lmem, &self.req_dc] {
            port.clear();
        }
        for port in [&self.rsp_in, &self.rsp_lmem, &self.rsp_dc] {
            port.clear();
        }
        self.splits.clear();
    }

    fn tick(&mut self) -> Result<(), SimError> {
        // responses first, one per sub-path per cycle
        if let Some(rsp) = self.rsp_lmem.pop() {
            self.forward_rsp(rsp);
        }
        if let Some(rsp) = self.rsp_dc.pop() {
            self.forward_rsp(rsp);
        }

        // classify the next request lane by lane
        if let Some(req) = self.req_in.pop() {
            let lanes = req.mask.width();
            let mut lmem_mask = LaneMask::new(lanes);
            for i in req.mask.iter() {
                if self.map.is_local(req.addrs[i]) {
                    lmem_mask.set(i);
                }
            }
            let mut dc_mask = req.mask;
            dc_mask.subtract(lmem_mask);

            if lmem_mask.any() && dc_mask.any() {
                // mixed request: split, remember the union for the merge
                if !req.write {
                    self.splits.insert(
                        req.tag,
                        SplitEntry {
                            expected: req.mask,
                            acc: LaneMask::new(lanes),
                            failed: false,
                        },
                    );
                }
                let mut lmem_req = req.clone();
                lmem_req.mask = lmem_mask;
                self.req_lmem.push(lmem_req, self.delay);
                let mut dc_req = req;
                dc_req.mask = dc_mask;
                self.req_dc.push(dc_req, self.delay);
            } else if lmem_mask.any() {
                self.req_lmem.push(req, self.delay);
            } else {
                self.req_dc.push(req, self.delay);
            }
        }
        Ok(())
    }
}
