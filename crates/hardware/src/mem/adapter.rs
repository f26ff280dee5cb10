//! Lane-to-bank memory adapter.
//!
//! Translates each vector `LsuReq` into per-lane scalar `MemReq`s scattered
//! across bank ports (`lane % banks`), and gathers the returning `MemRsp`s
//! back into a single `LsuRsp` per tag. A response is released upward only
//! once every expected lane has arrived — this adapter is the choice point
//! for partial delivery, and it chooses complete delivery; the pending
//! table upstream accepts partials regardless.
//!
//! A bank sees the lanes of one tag in request order, so each response on a
//! bank port completes the oldest outstanding lane for its tag on that bank.

use std::collections::{HashMap, VecDeque};

use crate::common::{LaneMask, MemoryMap, SimError};
use crate::mem::protocol::{LsuReq, LsuRsp, MemReq, MemRsp};
use crate::sim::{Clock, SimComponent, SimPort};

struct GatherEntry {
    expected: LaneMask,
    acc: LaneMask,
    cid: usize,
    uuid: u64,
    failed: bool,
    /// Outstanding lane indices per bank, oldest first.
    bank_fifo: Vec<VecDeque<usize>>,
}

/// Scatters vector requests into scalar bank transactions and gathers their
/// responses.
pub struct LsuMemAdapter {
    name: String,
    clock: Clock,
    /// Vector requests from the demux.
    pub req_in: SimPort<LsuReq>,
    /// Gathered vector responses back to the demux.
    pub rsp_in: SimPort<LsuRsp>,
    /// Scalar requests, one port per bank.
    pub req_out: Vec<SimPort<MemReq>>,
    /// Scalar responses, one port per bank.
    pub rsp_out: Vec<SimPort<MemRsp>>,
    map: MemoryMap,
    delay: u64,
    lanes: usize,
    gather: HashMap<u64, GatherEntry>,
}

impl LsuMemAdapter {
    /// Creates an adapter scattering `lanes` lanes over `banks` bank ports.
    pub fn new(
        clock: &Clock,
        name: &str,
        lanes: usize,
        banks: usize,
        map: MemoryMap,
        delay: u64,
    ) -> Self {
        assert!(delay >= 1, "adapter delay must be at least 1");
        assert!(banks >= 1 && lanes % banks == 0);
        Self {
            name: name.to_string(),
            clock: clock.clone(),
            req_in: SimPort::new(clock),
            rsp_in: SimPort::new(clock),
            req_out: (0..banks).map(|_| SimPort::new(clock)).collect(),
            rsp_out: (0..banks).map(|_| SimPort::new(clock)).collect(),
            map,
            delay,
            lanes,
            gather: HashMap::new(),
        }
    }
}

impl SimComponent for LsuMemAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.req_in.clear();
        self.rsp_in.clear();
        for port in self.req_out.iter() {
            port.clear();
        }
        for port in self.rsp_out.iter() {
            port.clear();
        }
        self.gather.clear();
    }

    fn tick(&mut self) -> Result<(), SimError> {
        // gather responses, one per bank per cycle
        for bank in 0..self.rsp_out.len() {
            let Some(rsp) = self.rsp_out[bank].pop() else {
                continue;
            };
            let name = &self.name;
            let entry = self
                .gather
                .get_mut(&rsp.tag)
                .ok_or_else(|| SimError::UnknownTag {
                    component: name.clone(),
                    tag: rsp.tag,
                    cycle: self.clock.now(),
                })?;
            let lane = entry.bank_fifo[bank]
                .pop_front()
                .ok_or_else(|| SimError::LaneMismatch {
                    component: name.clone(),
                    tag: rsp.tag,
                    uuid: rsp.uuid,
                })?;
            entry.acc.set(lane);
            entry.failed |= rsp.failed;
            if entry.acc == entry.expected {
                let entry = self
                    .gather
                    .remove(&rsp.tag)
                    .expect("gather entry checked above");
                let lsu_rsp = LsuRsp {
                    mask: entry.expected,
                    tag: rsp.tag,
                    cid: entry.cid,
                    uuid: entry.uuid,
                    failed: entry.failed,
                };
                self.rsp_in.push(lsu_rsp, 1);
            }
        }

        // scatter the next request across banks
        if let Some(req) = self.req_in.pop() {
            let banks = self.req_out.len();
            if !req.write {
                self.gather.insert(
                    req.tag,
                    GatherEntry {
                        expected: req.mask,
                        acc: LaneMask::new(self.lanes),
                        cid: req.cid,
                        uuid: req.uuid,
                        failed: false,
                        bank_fifo: vec![VecDeque::new(); banks],
                    },
                );
            }
            for lane in req.mask.iter() {
                let bank = lane % banks;
                let mem_req = MemReq {
                    addr: req.addrs[lane],
                    write: req.write,
                    space: self.map.classify(req.addrs[lane]),
                    tag: req.tag,
                    cid: req.cid,
                    uuid: req.uuid,
                };
                self.req_out[bank].push(mem_req, self.delay);
                if !req.write {
                    self.gather
                        .get_mut(&req.tag)
                        .expect("gather entry inserted above")
                        .bank_fifo[bank]
                        .push_back(lane);
                }
            }
        }
        Ok(())
    }
}
