//! GPGPU cycle-level simulator library.
//!
//! This crate implements a cycle-accurate microarchitectural simulator for a
//! multi-core RISC-V GPGPU with the following:
//! 1. **Kernel:** Event-driven cycle engine, typed ports with programmable delay.
//! 2. **Core:** Warp scheduler, per-unit dispatch, ALU/FPU/LSU/SFU, commit.
//! 3. **Memory path:** Local-memory demux, lane-to-bank adapter, pending-load table.
//! 4. **Interconnect:** Generic Mux/Switch arbiters with tag-prefix routing.
//! 5. **Simulation:** Device assembly, configuration, and statistics collection.

/// Common types and constants (masks, address spaces, errors, slot tables).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Coprocessor (texture/raster/output-merge) dispatch interface.
pub mod coproc;
/// SIMT core (warps, scheduler, functional units, commit).
pub mod core;
/// Device assembly and top-level run loop.
pub mod device;
/// Memory path (wire protocol, arbiters, demux, adapter, memory endpoints).
pub mod mem;
/// Simulation kernel (clock, ports, component trait, engine).
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Main core type; holds warps, scheduler, and functional units.
pub use crate::core::Core;
/// Top-level device (cores, memory path, coprocessors); construct with `Device::new`.
pub use crate::device::Device;
