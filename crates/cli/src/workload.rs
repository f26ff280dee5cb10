//! Built-in synthetic workloads.
//!
//! A deterministic trace generator standing in for the ISA simulator: each
//! warp runs a short program whose shape is selected on the command line.
//! Multi-packet memory instructions are split into one trace per lane
//! group, mirroring how a decoder packetizes wide warps.

use std::collections::VecDeque;

use gpgpu_core::common::ThreadMask;
use gpgpu_core::config::Config;
use gpgpu_core::core::trace::{
    AluOp, FpuOp, LsuOp, SfuOp, Trace, TraceData, TraceOp, TraceRef,
};
use gpgpu_core::core::TraceSource;
use gpgpu_core::mem::MemAddrSize;

/// Selectable workload shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkloadKind {
    /// Strided loads and stores with a trailing fence.
    Memcpy,
    /// Integer/floating compute chains, no memory traffic.
    Compute,
    /// Warp spawn, shared+global memory, coprocessor dispatch, barrier.
    Mixed,
}

impl std::str::FromStr for WorkloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memcpy" => Ok(WorkloadKind::Memcpy),
            "compute" => Ok(WorkloadKind::Compute),
            "mixed" => Ok(WorkloadKind::Mixed),
            other => Err(format!("unknown workload '{}'", other)),
        }
    }
}

/// Deterministic per-core trace source.
pub struct DemoWorkload {
    kind: WorkloadKind,
    iters: usize,
    num_threads: usize,
    num_lanes: usize,
    num_warps: usize,
    lmem_base: u64,
    next_uuid: u64,
    uuid_base: u64,
    /// Traces of the instruction currently being fetched, per warp.
    pending: Vec<VecDeque<TraceRef>>,
}

impl DemoWorkload {
    /// Creates a workload for one core.
    pub fn new(kind: WorkloadKind, cid: usize, iters: usize, config: &Config) -> Self {
        Self {
            kind,
            iters,
            num_threads: config.core.num_threads,
            num_lanes: config.lsu.num_lanes,
            num_warps: config.core.num_warps,
            lmem_base: config.memory.lmem_base,
            next_uuid: 0,
            uuid_base: (cid as u64) << 32,
            pending: (0..config.core.num_warps).map(|_| VecDeque::new()).collect(),
        }
    }

    fn uuid(&mut self) -> u64 {
        let uuid = self.uuid_base | self.next_uuid;
        self.next_uuid += 1;
        uuid
    }

    fn mem_payload(&self, base: u64, stride: u64) -> TraceData {
        let addrs = (0..self.num_threads)
            .map(|t| MemAddrSize {
                addr: base + t as u64 * stride,
                size: 4,
            })
            .collect();
        TraceData::Mem { addrs }
    }

    /// Splits one memory instruction into per-lane-group packet traces.
    fn push_mem(&mut self, wid: usize, cid: usize, op: LsuOp, base: u64) {
        let tmask = ThreadMask::full(self.num_threads);
        let packets = self.num_threads / self.num_lanes;
        let payload = self.mem_payload(base, 4);
        for pid in 0..packets {
            let uuid = self.uuid();
            let trace = Trace::new(uuid, cid, wid, tmask, TraceOp::Lsu(op))
                .with_pid(pid)
                .with_eop(pid + 1 == packets)
                .with_data(payload.clone())
                .into_ref();
            self.pending[wid].push_back(trace);
        }
    }

    fn push_simple(&mut self, wid: usize, cid: usize, op: TraceOp, stall: bool, data: TraceData) {
        let tmask = ThreadMask::full(self.num_threads);
        let uuid = self.uuid();
        let trace = Trace::new(uuid, cid, wid, tmask, op)
            .with_fetch_stall(stall)
            .with_data(data)
            .into_ref();
        self.pending[wid].push_back(trace);
    }

    /// Generates the instruction at `index` for warp `wid`.
    fn generate(&mut self, cid: usize, wid: usize, index: usize) -> bool {
        let global_base = 0x1000_0000 + (wid as u64) * 0x1000;
        match self.kind {
            WorkloadKind::Memcpy => {
                if index >= 2 * self.iters + 1 {
                    return false;
                }
                if index == 2 * self.iters {
                    self.push_simple(wid, cid, TraceOp::Lsu(LsuOp::Fence), false, TraceData::None);
                } else if index % 2 == 0 {
                    self.push_mem(wid, cid, LsuOp::Load, global_base + (index as u64) * 0x100);
                } else {
                    self.push_mem(wid, cid, LsuOp::Store, global_base + (index as u64) * 0x100);
                }
            }
            WorkloadKind::Compute => {
                if index >= 4 * self.iters {
                    return false;
                }
                let op = match index % 4 {
                    0 => TraceOp::Alu(AluOp::Arith),
                    1 => TraceOp::Alu(AluOp::Imul),
                    2 => TraceOp::Fpu(FpuOp::Fma),
                    _ => TraceOp::Fpu(FpuOp::Fncp),
                };
                self.push_simple(wid, cid, op, false, TraceData::None);
            }
            WorkloadKind::Mixed => {
                // warp 0 fans out to the full warp set first
                if wid == 0 && index == 0 {
                    self.push_simple(
                        wid,
                        cid,
                        TraceOp::Sfu(SfuOp::Wspawn),
                        true,
                        TraceData::Sfu {
                            arg1: self.num_warps as u64,
                            arg2: 4,
                        },
                    );
                    return true;
                }
                let body = 6 * self.iters;
                if index > body {
                    return false;
                }
                if index == body {
                    // all warps meet at the barrier before retiring
                    self.push_simple(
                        wid,
                        cid,
                        TraceOp::Sfu(SfuOp::Bar),
                        true,
                        TraceData::Sfu {
                            arg1: 0,
                            arg2: self.num_warps as u64,
                        },
                    );
                    return true;
                }
                match index % 6 {
                    0 => self.push_mem(wid, cid, LsuOp::Load, global_base),
                    1 => self.push_simple(wid, cid, TraceOp::Alu(AluOp::Arith), false, TraceData::None),
                    2 => self.push_mem(wid, cid, LsuOp::Store, self.lmem_base + (wid as u64) * 0x100),
                    3 => self.push_simple(wid, cid, TraceOp::Fpu(FpuOp::Fma), false, TraceData::None),
                    4 => self.push_simple(
                        wid,
                        cid,
                        TraceOp::Sfu(SfuOp::Tex),
                        false,
                        TraceData::Coproc { unit: 0 },
                    ),
                    _ => self.push_mem(wid, cid, LsuOp::Load, self.lmem_base + (wid as u64) * 0x100),
                }
            }
        }
        true
    }
}

impl TraceSource for DemoWorkload {
    fn fetch(&mut self, cid: usize, wid: usize, pc: u64, _tmask: ThreadMask) -> Option<TraceRef> {
        if self.pending[wid].is_empty() {
            let index = (pc / 4) as usize;
            if !self.generate(cid, wid, index) {
                return None;
            }
        }
        self.pending[wid].pop_front()
    }

    fn reset(&mut self) {
        self.next_uuid = 0;
        for queue in self.pending.iter_mut() {
            queue.clear();
        }
    }
}
