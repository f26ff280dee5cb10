//! Memory path.
//!
//! This module implements everything between a core's LSU and the memory
//! endpoints. It provides:
//! 1. **Protocol:** Vector (`LsuReq`/`LsuRsp`) and scalar (`MemReq`/`MemRsp`)
//!    transactions, and the `Tagged` trait arbiters rely on.
//! 2. **Arbiters:** Generic `Mux` (request-only) and `Switch` (bidirectional
//!    with tag-prefix routing).
//! 3. **Routing:** Per-block local-memory demux and lane-to-bank adapter.
//! 4. **Endpoints:** Fixed-latency local and global memory models.

/// Lane-to-bank adapter (vector requests to scalar wire transactions).
pub mod adapter;
/// Generic Mux/Switch arbitration primitives.
pub mod arbiter;
/// Per-block local-memory demux.
pub mod demux;
/// Core-local shared memory endpoint.
pub mod lmem;
/// Global memory endpoint.
pub mod memsim;
/// Wire-level transaction types.
pub mod protocol;

pub use adapter::LsuMemAdapter;
pub use arbiter::{ArbiterPolicy, Mux, Switch};
pub use demux::LocalMemDemux;
pub use lmem::LocalMem;
pub use memsim::MainMemory;
pub use protocol::{LsuReq, LsuRsp, MemAddrSize, MemReq, MemRsp, Tagged};

/// The switch variant used on the global-memory path.
pub type MemSwitch = Switch<MemReq, MemRsp>;
