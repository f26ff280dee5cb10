//! Configuration system for the GPGPU simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the simulator. It provides:
//! 1. **Defaults:** Baseline hardware constants (core geometry, latencies, memory map).
//! 2. **Structures:** Hierarchical config for general, core, LSU, latency, memory, and coprocessors.
//! 3. **Validation:** Structural checks rejecting geometries the pipeline cannot carry.
//!
//! Configuration is supplied via JSON (`Config::from_json`) or use
//! `Config::default()` for the CLI.

use serde::Deserialize;

use crate::common::constants::{MAX_NUM_BARRIERS, MAX_NUM_CORES, MAX_NUM_THREADS, MAX_NUM_WARPS};
use crate::common::SimError;
use crate::mem::arbiter::ArbiterPolicy;

/// Default configuration constants for the simulator.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden in a JSON configuration file.
mod defaults {
    /// Number of cores per device.
    pub const NUM_CORES: usize = 1;

    /// Number of warps per core.
    pub const NUM_WARPS: usize = 4;

    /// Number of threads per warp (SIMT lane count).
    pub const NUM_THREADS: usize = 4;

    /// Parallel issue slots per cycle per core.
    pub const ISSUE_WIDTH: usize = 2;

    /// Machine word width in bits; also the integer-divide latency base.
    pub const XLEN: u32 = 32;

    /// Per-(unit, issue-slot) dispatch queue depth before fetch stalls.
    pub const DISPATCH_DEPTH: usize = 2;

    /// Number of independent LSU blocks per core.
    pub const NUM_LSU_BLOCKS: usize = 1;

    /// Number of address lanes per LSU block.
    pub const NUM_LSU_LANES: usize = 4;

    /// Pending-load table capacity per LSU block.
    pub const LSU_PENDING_SIZE: usize = 8;

    /// Integer multiply latency in cycles.
    pub const LATENCY_IMUL: u32 = 4;

    /// Fused multiply-add latency in cycles.
    pub const LATENCY_FMA: u32 = 4;

    /// Floating divide latency in cycles.
    pub const LATENCY_FDIV: u32 = 16;

    /// Floating square-root latency in cycles.
    pub const LATENCY_FSQRT: u32 = 16;

    /// Floating convert latency in cycles.
    pub const LATENCY_FCVT: u32 = 8;

    /// Core-local shared memory access latency in cycles.
    pub const LATENCY_LMEM: u64 = 2;

    /// Global memory (DRAM stand-in) access latency in cycles.
    pub const LATENCY_DRAM: u64 = 40;

    /// Coprocessor (texture/raster/output-merge) service latency in cycles.
    pub const LATENCY_COPROC: u64 = 16;

    /// First IO address (inclusive).
    pub const IO_BASE_ADDR: u64 = 0x4000_0000;

    /// One past the last IO address.
    pub const IO_END_ADDR: u64 = 0x4100_0000;

    /// Base of the core-local shared-memory window.
    pub const LMEM_BASE_ADDR: u64 = 0x6000_0000;

    /// Log2 of the shared-memory window size (16 KiB).
    pub const LMEM_LOG_SIZE: u32 = 14;

    /// Size of the Global address space backed by memory (4 GiB).
    pub const RAM_SIZE: u64 = 1 << 32;

    /// One-way delay through the local-memory demux.
    pub const DEMUX_DELAY: u64 = 1;

    /// Request-path delay through Mux/Switch arbiters.
    pub const SWITCH_DELAY: u64 = 1;

    /// Number of shared coprocessor units per device.
    pub const NUM_COPROC_UNITS: usize = 1;

    /// Cycle budget before the driver aborts (0 disables the limit).
    pub const CYCLE_BUDGET: u64 = 0;
}

/// General simulation behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Emit per-cycle trace lines to stderr.
    pub trace: bool,
    /// Abort the run after this many cycles (0 = unlimited).
    pub cycle_budget: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace: false,
            cycle_budget: defaults::CYCLE_BUDGET,
        }
    }
}

/// SIMT core geometry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Number of cores per device.
    pub num_cores: usize,
    /// Warps per core.
    pub num_warps: usize,
    /// Threads per warp.
    pub num_threads: usize,
    /// Parallel issue slots per cycle.
    pub issue_width: usize,
    /// Machine word width in bits (also the IDIV latency base).
    pub xlen: u32,
    /// Dispatch queue depth per (unit, issue slot).
    pub dispatch_depth: usize,
    /// Barrier slots per core.
    pub num_barriers: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            num_cores: defaults::NUM_CORES,
            num_warps: defaults::NUM_WARPS,
            num_threads: defaults::NUM_THREADS,
            issue_width: defaults::ISSUE_WIDTH,
            xlen: defaults::XLEN,
            dispatch_depth: defaults::DISPATCH_DEPTH,
            num_barriers: MAX_NUM_BARRIERS,
        }
    }
}

/// Load/store unit partitioning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LsuConfig {
    /// Independent LSU blocks per core.
    pub num_blocks: usize,
    /// Address lanes per block.
    pub num_lanes: usize,
    /// Pending-load table capacity per block.
    pub pending_size: usize,
    /// Memory banks behind each block's adapter; lanes scatter `lane % banks`.
    pub num_banks: usize,
}

impl Default for LsuConfig {
    fn default() -> Self {
        Self {
            num_blocks: defaults::NUM_LSU_BLOCKS,
            num_lanes: defaults::NUM_LSU_LANES,
            pending_size: defaults::LSU_PENDING_SIZE,
            num_banks: defaults::NUM_LSU_LANES,
        }
    }
}

/// Functional unit latencies in cycles.
///
/// The fixed `+2` dispatch overhead the units add on top of these is part of
/// the pipeline model, not of this table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    /// Integer multiply.
    pub imul: u32,
    /// Fused multiply-add.
    pub fma: u32,
    /// Floating divide.
    pub fdiv: u32,
    /// Floating square root.
    pub fsqrt: u32,
    /// Floating convert.
    pub fcvt: u32,
    /// Core-local shared memory.
    pub lmem: u64,
    /// Global memory.
    pub dram: u64,
    /// Coprocessor units.
    pub coproc: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            imul: defaults::LATENCY_IMUL,
            fma: defaults::LATENCY_FMA,
            fdiv: defaults::LATENCY_FDIV,
            fsqrt: defaults::LATENCY_FSQRT,
            fcvt: defaults::LATENCY_FCVT,
            lmem: defaults::LATENCY_LMEM,
            dram: defaults::LATENCY_DRAM,
            coproc: defaults::LATENCY_COPROC,
        }
    }
}

/// Memory map and interconnect parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// First IO address (inclusive).
    pub io_base: u64,
    /// One past the last IO address.
    pub io_end: u64,
    /// Base of the core-local shared-memory window.
    pub lmem_base: u64,
    /// Log2 of the shared-memory window size.
    pub lmem_log_size: u32,
    /// Whether the shared-memory window exists at all.
    pub lmem_enabled: bool,
    /// Size of the Global address space backed by memory.
    pub ram_size: u64,
    /// One-way delay through the local-memory demux.
    pub demux_delay: u64,
    /// Request-path delay through Mux/Switch arbiters.
    pub switch_delay: u64,
    /// Arbitration policy for every Mux/Switch instance.
    pub arbiter: ArbiterPolicy,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            io_base: defaults::IO_BASE_ADDR,
            io_end: defaults::IO_END_ADDR,
            lmem_base: defaults::LMEM_BASE_ADDR,
            lmem_log_size: defaults::LMEM_LOG_SIZE,
            lmem_enabled: true,
            ram_size: defaults::RAM_SIZE,
            demux_delay: defaults::DEMUX_DELAY,
            switch_delay: defaults::SWITCH_DELAY,
            arbiter: ArbiterPolicy::RoundRobin,
        }
    }
}

/// Coprocessor pool parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoprocConfig {
    /// Number of shared units (texture/raster/output-merge stand-ins).
    pub num_units: usize,
}

impl Default for CoprocConfig {
    fn default() -> Self {
        Self {
            num_units: defaults::NUM_COPROC_UNITS,
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General simulation behavior.
    pub general: GeneralConfig,
    /// SIMT core geometry.
    pub core: CoreConfig,
    /// Load/store unit partitioning.
    pub lsu: LsuConfig,
    /// Functional unit latencies.
    pub latency: LatencyConfig,
    /// Memory map and interconnect.
    pub memory: MemoryConfig,
    /// Coprocessor pool.
    pub coproc: CoprocConfig,
}

impl Config {
    /// Parses a configuration from a JSON document and validates it.
    ///
    /// # Arguments
    ///
    /// * `json` - JSON text; absent fields take their defaults.
    ///
    /// # Returns
    ///
    /// The validated config, or `SimError::Config` with the parse or
    /// validation failure.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks structural constraints the pipeline relies on.
    ///
    /// The LSU packetizes each warp into groups of `num_lanes` threads, so
    /// the thread count must divide evenly; bank scatter requires the lane
    /// count to be a multiple of the bank count.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.core.num_cores == 0 || self.core.num_cores > MAX_NUM_CORES {
            return Err(SimError::Config(format!(
                "num_cores {} out of range 1..={}",
                self.core.num_cores, MAX_NUM_CORES
            )));
        }
        if self.core.num_warps == 0 || self.core.num_warps > MAX_NUM_WARPS {
            return Err(SimError::Config(format!(
                "num_warps {} out of range 1..={}",
                self.core.num_warps, MAX_NUM_WARPS
            )));
        }
        if self.core.num_threads == 0 || self.core.num_threads > MAX_NUM_THREADS {
            return Err(SimError::Config(format!(
                "num_threads {} out of range 1..={}",
                self.core.num_threads, MAX_NUM_THREADS
            )));
        }
        if self.core.issue_width == 0 {
            return Err(SimError::Config("issue_width must be nonzero".into()));
        }
        if self.lsu.num_blocks == 0 || self.lsu.num_lanes == 0 {
            return Err(SimError::Config(
                "lsu.num_blocks and lsu.num_lanes must be nonzero".into(),
            ));
        }
        if self.core.num_threads % self.lsu.num_lanes != 0 {
            return Err(SimError::Config(format!(
                "num_threads {} not divisible by lsu.num_lanes {}",
                self.core.num_threads, self.lsu.num_lanes
            )));
        }
        if self.lsu.num_banks == 0 || self.lsu.num_lanes % self.lsu.num_banks != 0 {
            return Err(SimError::Config(format!(
                "lsu.num_lanes {} not divisible by lsu.num_banks {}",
                self.lsu.num_lanes, self.lsu.num_banks
            )));
        }
        if !self.lsu.num_banks.is_power_of_two() {
            return Err(SimError::Config(format!(
                "lsu.num_banks {} must be a power of two",
                self.lsu.num_banks
            )));
        }
        if self.lsu.pending_size == 0 {
            return Err(SimError::Config("lsu.pending_size must be nonzero".into()));
        }
        if self.memory.demux_delay == 0 || self.memory.switch_delay == 0 {
            return Err(SimError::Config("port delays must be at least 1".into()));
        }
        Ok(())
    }
}
