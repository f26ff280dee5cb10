//! Global simulator constants.
//!
//! This module defines hard limits baked into the data structures. It includes:
//! 1. **Structural limits:** Maximum cores, warps, threads, and barriers.
//! 2. **Arbiter limits:** Maximum port counts for Mux/Switch instances.

/// Maximum number of cores per device.
pub const MAX_NUM_CORES: usize = 1024;

/// Maximum number of warps per core (bounded by the warp-mask width).
pub const MAX_NUM_WARPS: usize = 64;

/// Maximum number of threads per warp (bounded by the thread-mask width).
pub const MAX_NUM_THREADS: usize = 64;

/// Maximum number of barrier slots per core.
pub const MAX_NUM_BARRIERS: usize = 16;

/// Maximum number of inputs or outputs on a single Mux/Switch instance.
pub const MAX_ARBITER_PORTS: usize = 32;
