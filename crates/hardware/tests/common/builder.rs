//! Trace and mask construction helpers.
//!
//! Thin wrappers over the trace builder so tests read as one-liners. All
//! helpers default to core 0; chain the trace builder methods for anything
//! more exotic.

use gpgpu_core::common::ThreadMask;
use gpgpu_core::core::trace::{
    AluOp, FpuOp, LsuOp, SfuOp, Trace, TraceData, TraceOp, TraceRef,
};
use gpgpu_core::mem::MemAddrSize;

/// Builds a thread mask of the given width from raw bits.
pub fn tmask(bits: u64, width: usize) -> ThreadMask {
    ThreadMask::from_bits(bits, width)
}

/// Builds the per-thread address payload for a memory trace.
pub fn mem_data(addrs: &[u64]) -> TraceData {
    TraceData::Mem {
        addrs: addrs
            .iter()
            .map(|&addr| MemAddrSize { addr, size: 4 })
            .collect(),
    }
}

/// A LOAD trace for core 0.
pub fn load(uuid: u64, wid: usize, mask_bits: u64, addrs: &[u64]) -> TraceRef {
    Trace::new(
        uuid,
        0,
        wid,
        tmask(mask_bits, addrs.len()),
        TraceOp::Lsu(LsuOp::Load),
    )
    .with_data(mem_data(addrs))
    .into_ref()
}

/// A STORE trace for core 0.
pub fn store(uuid: u64, wid: usize, mask_bits: u64, addrs: &[u64]) -> TraceRef {
    Trace::new(
        uuid,
        0,
        wid,
        tmask(mask_bits, addrs.len()),
        TraceOp::Lsu(LsuOp::Store),
    )
    .with_data(mem_data(addrs))
    .into_ref()
}

/// A FENCE trace for core 0.
pub fn fence(uuid: u64, wid: usize) -> TraceRef {
    Trace::new(uuid, 0, wid, tmask(1, 1), TraceOp::Lsu(LsuOp::Fence)).into_ref()
}

/// An integer trace for core 0 with one active thread.
pub fn alu(uuid: u64, wid: usize, op: AluOp) -> TraceRef {
    Trace::new(uuid, 0, wid, tmask(1, 1), TraceOp::Alu(op)).into_ref()
}

/// A floating-point trace for core 0 with one active thread.
pub fn fpu(uuid: u64, wid: usize, op: FpuOp) -> TraceRef {
    Trace::new(uuid, 0, wid, tmask(1, 1), TraceOp::Fpu(op)).into_ref()
}

/// An SFU trace for core 0 with one active thread.
pub fn sfu(uuid: u64, wid: usize, op: SfuOp) -> TraceRef {
    Trace::new(uuid, 0, wid, tmask(1, 1), TraceOp::Sfu(op)).into_ref()
}

/// A BAR trace (stalls its warp until the barrier releases it).
pub fn bar(uuid: u64, wid: usize, bar_id: u64, count: u64) -> TraceRef {
    Trace::new(uuid, 0, wid, tmask(1, 1), TraceOp::Sfu(SfuOp::Bar))
        .with_fetch_stall(true)
        .with_data(TraceData::Sfu {
            arg1: bar_id,
            arg2: count,
        })
        .into_ref()
}

/// A WSPAWN trace (stalls its warp until serviced).
pub fn wspawn(uuid: u64, wid: usize, count: u64, pc: u64) -> TraceRef {
    Trace::new(uuid, 0, wid, tmask(1, 1), TraceOp::Sfu(SfuOp::Wspawn))
        .with_fetch_stall(true)
        .with_data(TraceData::Sfu {
            arg1: count,
            arg2: pc,
        })
        .into_ref()
}

/// A TEX trace for the given core and coprocessor unit.
pub fn tex(uuid: u64, cid: usize, wid: usize, unit: usize) -> TraceRef {
    Trace::new(uuid, cid, wid, tmask(1, 1), TraceOp::Sfu(SfuOp::Tex))
        .with_data(TraceData::Coproc { unit })
        .into_ref()
}
